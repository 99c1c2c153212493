use clap::Parser;
use dobutsu_arena::commands::{self, CommandOutput};
use dobutsu_arena::web;
use dobutsu_arena::*;
use std::io::{self, BufRead, Write};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Play Dobutsu shogi against an oracle-driven engine
#[derive(Parser, Debug)]
#[command(name = "dobutsu-arena")]
#[command(version)]
struct Cli {
    /// Sides the engine plays: s/b for Sente, g/w for Gote
    #[arg(short = 'c', value_parser = parse_control)]
    control: Option<Control>,

    /// Engine strength, one value for both sides or SENTE,GOTE
    #[arg(short = 's', value_parser = parse_strengths, default_value = "1")]
    strength: (f64, f64),

    /// Oracle plugin library to load instead of the built-in search
    #[arg(short = 't', env = "DOBUTSU_ORACLE")]
    oracle: Option<PathBuf>,

    /// Search depth of the built-in oracle
    #[arg(short = 'd', default_value_t = 4)]
    depth: u32,

    /// Seed for the engine's move choice
    #[arg(long)]
    seed: Option<u64>,

    /// Print the board after every move
    #[arg(short = 'v', overrides_with = "quiet")]
    verbose: bool,

    /// Do not print the board after every move
    #[arg(short = 'q', overrides_with = "verbose")]
    quiet: bool,

    /// Serve the game over HTTP on this address instead of reading commands
    #[arg(long)]
    serve: Option<SocketAddr>,

    /// Directory of static files for the HTTP host
    #[arg(long, requires = "serve")]
    static_dir: Option<PathBuf>,
}

fn parse_control(letters: &str) -> Result<Control, String> {
    Control::from_letters(letters).map_err(|c| format!("unknown side: {}", c))
}

fn parse_strengths(text: &str) -> Result<(f64, f64), String> {
    let parse = |s: &str| {
        s.trim()
            .parse::<f64>()
            .map_err(|_| format!("invalid strength: {}", s))
    };
    match text.split_once(',') {
        Some((sente, gote)) => Ok((parse(sente)?, parse(gote)?)),
        None => parse(text).map(|s| (s, s)),
    }
}

fn load_oracle(cli: &Cli) -> Option<Box<dyn Oracle>> {
    match &cli.oracle {
        Some(path) => match PluginOracle::load(path) {
            Ok(oracle) => Some(Box::new(oracle)),
            Err(e) => {
                error!(path = %path.display(), error = %e, "could not load oracle plugin");
                eprintln!("Error ({}) : {}", e, path.display());
                None
            }
        },
        None => Some(Box::new(SearchOracle::new(cli.depth))),
    }
}

fn print_output(output: &CommandOutput) {
    for line in &output.lines {
        println!("{}", line);
    }
}

fn run_repl(mut session: Session) -> io::Result<()> {
    // automated sides given with -c move before the first prompt
    print_output(&commands::autoplay(&mut session));

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut line = String::new();

    loop {
        print!("{}", commands::prompt(&session));
        stdout.flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            return Ok(());
        }

        let output = commands::execute(&mut session, &line);
        print_output(&output);
        if output.quit {
            return Ok(());
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let (sente_strength, gote_strength) = cli.strength;
    let config = SessionConfig {
        control: cli.control.unwrap_or_default(),
        sente_strength,
        gote_strength,
        show_board: cli.verbose && !cli.quiet,
        seed: cli.seed,
    };

    let oracle = load_oracle(&cli);
    let session = match Session::new(config, oracle) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error ({})", e);
            return ExitCode::FAILURE;
        }
    };

    let result: Result<(), Box<dyn std::error::Error>> = match cli.serve {
        Some(addr) => {
            info!(%addr, "starting web host");
            tokio::runtime::Runtime::new()
                .map_err(Into::into)
                .and_then(|runtime| runtime.block_on(web::run_server(session, addr, cli.static_dir)))
        }
        None => run_repl(session).map_err(Into::into),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error ({})", e);
            ExitCode::FAILURE
        }
    }
}
