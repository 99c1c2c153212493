use crate::error::SessionError;
use crate::game::Side;
use crate::session::Session;
use tracing::debug;

pub const HELP: &str = "\
help        print a list of commands
hint        print what the engine would play
exit        leave the program
version     print program version
new         start a new game
undo        undo previous move
remove      undo last two moves
setup       setup board with position string
show board  print the current board
show setup  print board as a position string
show moves  print possible moves
show eval   print position evaluation
show lines  print possible moves and their evaluations
strength    show/set engine strength
both        make engine play both players
go          make the engine play the colour that is on the move
force       set the engine to play neither colour
verbose     print the board after every move
quiet       do not print the board after every move";

/// What a command printed, and whether the caller should stop reading input
#[derive(Debug, Default, PartialEq)]
pub struct CommandOutput {
    pub lines: Vec<String>,
    pub quit: bool,
}

impl CommandOutput {
    fn push(&mut self, text: impl Into<String>) {
        self.lines.push(text.into());
    }

    fn push_block(&mut self, text: &str) {
        self.lines.extend(text.lines().map(str::to_string));
    }
}

/// Prompt shown before reading the next command
pub fn prompt(session: &Session) -> String {
    format!("{}. ", session.move_number())
}

/// Run one line of input against the session
pub fn execute(session: &mut Session, line: &str) -> CommandOutput {
    let line = line.trim();
    let mut out = CommandOutput::default();
    if line.is_empty() {
        return out;
    }

    let (word, arg) = match line.split_once(char::is_whitespace) {
        Some((word, arg)) => (word, arg.trim()),
        None => (line, ""),
    };
    debug!(command = word, "executing");

    let result = match session.position().parse_move(line) {
        Ok(mv) => session.play(mv).map_err(Failure::from),
        Err(_) => dispatch(session, word, arg, &mut out),
    };

    report(session, result, line, &mut out);
    out
}

/// Let automated sides move without any command, as at startup
pub fn autoplay(session: &mut Session) -> CommandOutput {
    let mut out = CommandOutput::default();
    let result = session.run_automated_turns().map_err(Failure::from);
    report(session, result, "autoplay", &mut out);
    out
}

fn report(session: &mut Session, result: Result<(), Failure>, line: &str, out: &mut CommandOutput) {
    // events come first: an error from autoplay happens after the moves
    // that preceded it
    for event in session.drain_events() {
        out.push_block(&event.to_string());
    }

    match result {
        Ok(()) => {}
        Err(Failure::Session(SessionError::NothingToUndo)) => out.push("Nothing to undo."),
        Err(Failure::Session(e)) => out.push(format!("Error ({}) : {}", e, line)),
        Err(Failure::Command(message)) => out.push(format!("Error ({}) : {}", message, line)),
    }
}

/// Why a command failed: either the session refused, or the command text
/// itself made no sense
enum Failure {
    Session(SessionError),
    Command(&'static str),
}

impl From<SessionError> for Failure {
    fn from(e: SessionError) -> Self {
        Failure::Session(e)
    }
}

fn dispatch(
    session: &mut Session,
    word: &str,
    arg: &str,
    out: &mut CommandOutput,
) -> Result<(), Failure> {
    match word {
        "both" => session.both()?,
        "exit" | "quit" => out.quit = true,
        "force" => session.force(),
        "go" => session.go()?,
        "help" => out.push_block(HELP),
        "hint" => {
            let mv = session.hint()?;
            out.push(session.position().move_string(mv));
        }
        "new" => session.new_game(),
        "setup" | "setboard" if arg.is_empty() => session.new_game(),
        "setup" | "setboard" => session.setup(arg)?,
        "remove" => session.remove()?,
        "show" => show(session, arg, out)?,
        "strength" => strength(session, arg, out)?,
        "undo" => session.undo()?,
        "verbose" => session.set_show_board(true),
        "quiet" => session.set_show_board(false),
        "version" => out.push(format!(
            "{} {}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        )),
        _ => return Err(Failure::Command("unknown command")),
    }
    Ok(())
}

fn show(session: &mut Session, what: &str, out: &mut CommandOutput) -> Result<(), Failure> {
    match what {
        "board" => out.push_block(&session.position().render()),
        "setup" => out.push(session.position().to_setup_string()),
        "moves" => {
            let position = *session.position();
            for mv in position.legal_moves() {
                out.push(position.move_string(mv));
            }
        }
        "eval" => {
            let evaluation = session.evaluate()?;
            out.push(evaluation.to_string());
        }
        "lines" => {
            let position = *session.position();
            for line in session.analyze()? {
                out.push(format!(
                    "{:<7}: {:<5} ({:5.2}%)",
                    position.move_string(line.mv),
                    line.evaluation.to_string(),
                    line.probability * 100.0
                ));
            }
        }
        _ => return Err(Failure::Command("unknown command")),
    }
    Ok(())
}

fn strength(session: &mut Session, arg: &str, out: &mut CommandOutput) -> Result<(), Failure> {
    let values: Vec<&str> = arg.split_whitespace().collect();
    let parsed: Result<Vec<f64>, _> = values.iter().take(2).map(|v| v.parse::<f64>()).collect();
    let Ok(parsed) = parsed else {
        return Err(Failure::Command("invalid strength"));
    };

    match parsed[..] {
        [] => {
            out.push(format!("Sente: {:6.2}", session.strength(Side::Sente)));
            out.push(format!("Gote:  {:6.2}", session.strength(Side::Gote)));
        }
        [both] => session.set_strength(both)?,
        [sente, gote, ..] => session.set_strengths(sente, gote)?,
    }
    Ok(())
}
