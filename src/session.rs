use crate::control::{Control, PlayerControl};
use crate::error::SessionError;
use crate::game::{Move, Position, Side};
use crate::history::{History, Snapshot};
use crate::oracle::{self, Analysis, Evaluation, Oracle};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fmt;
use tracing::{debug, info, warn};

pub struct SessionConfig {
    /// Sides played automatically once the session starts
    pub control: Control,
    pub sente_strength: f64,
    pub gote_strength: f64,
    /// Report the board after every move
    pub show_board: bool,
    /// Fixed seed for move selection; drawn from the OS when `None`
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            control: Control::None,
            sente_strength: 1.0,
            gote_strength: 1.0,
            show_board: false,
            seed: None,
        }
    }
}

/// Something the session reports to whoever is watching the game
#[derive(Debug, Clone, PartialEq)]
pub enum TurnEvent {
    /// An automated move, numbered by the ply it was played on
    EngineMove { number: u32, notation: String },
    Board(String),
    Won { winner: Side, automated: bool },
    Draw,
    NewGame,
}

impl fmt::Display for TurnEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnEvent::EngineMove { number, notation } => {
                write!(f, "My {}. move is : {}", number, notation)
            }
            TurnEvent::Board(board) => write!(f, "{}", board.trim_end()),
            TurnEvent::Won { automated: true, .. } => write!(f, "I win!"),
            TurnEvent::Won { automated: false, .. } => write!(f, "You win!"),
            TurnEvent::Draw => write!(f, "Draw by threefold repetition."),
            TurnEvent::NewGame => write!(f, "Starting new game."),
        }
    }
}

/// One game session: the move history, who plays automatically, and the
/// oracle used for automated moves
pub struct Session {
    history: History,
    players: PlayerControl,
    oracle: Option<Box<dyn Oracle>>,
    rng: StdRng,
    show_board: bool,
    events: Vec<TurnEvent>,
}

impl Session {
    /// Start a session on the default position. The configured control
    /// takes effect immediately, so automated moves may already be pending;
    /// call [`Session::run_automated_turns`] to play them.
    pub fn new(config: SessionConfig, oracle: Option<Box<dyn Oracle>>) -> Result<Self, SessionError> {
        let mut players = PlayerControl::new(config.control);
        players.set_strengths(config.sente_strength, config.gote_strength)?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        match &oracle {
            Some(oracle) => info!(oracle = oracle.name(), control = %config.control, "session started"),
            None => warn!("session started without an oracle"),
        }

        Ok(Session {
            history: History::new(Position::initial()),
            players,
            oracle,
            rng,
            show_board: config.show_board,
            events: Vec::new(),
        })
    }

    pub fn current(&self) -> &Snapshot {
        self.history.current()
    }

    pub fn position(&self) -> &Position {
        &self.history.current().position
    }

    pub fn move_number(&self) -> u32 {
        self.history.current().move_number
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn control(&self) -> Control {
        self.players.control()
    }

    pub fn strength(&self, side: Side) -> f64 {
        self.players.strength(side)
    }

    pub fn oracle_loaded(&self) -> bool {
        self.oracle.is_some()
    }

    pub fn show_board(&self) -> bool {
        self.show_board
    }

    pub fn set_show_board(&mut self, show_board: bool) {
        self.show_board = show_board;
    }

    /// Take the events reported since the last call
    pub fn drain_events(&mut self) -> Vec<TurnEvent> {
        std::mem::take(&mut self.events)
    }

    /// Throw away the current game and start over from `position`.
    /// Nobody plays automatically in the new game until told to.
    pub fn start(&mut self, position: Position) {
        self.history.start(position);
        self.players.set_control(Control::None);
        info!(setup = %position.to_setup_string(), "new game");
    }

    pub fn new_game(&mut self) {
        self.start(Position::initial());
    }

    /// Start a new game from a setup string. A bad setup leaves the current
    /// game alone.
    pub fn setup(&mut self, text: &str) -> Result<(), SessionError> {
        let position = Position::parse(text)?;
        self.start(position);
        Ok(())
    }

    /// Push `mv` and report it; returns true if the game ended and a new
    /// one was started
    fn record_move(&mut self, mv: Move, automated: bool) -> bool {
        let mover = self.position().side_to_move();
        let number = self.move_number();
        let notation = self.position().move_string(mv);

        let terminal = self.history.push(mv);
        debug!(number, mv = %notation, automated, terminal, "move played");

        if automated {
            self.events.push(TurnEvent::EngineMove { number, notation });
        }
        if self.show_board {
            self.events.push(TurnEvent::Board(self.position().render()));
        }

        if terminal {
            info!(winner = %mover, "game won");
            self.events.push(TurnEvent::Won {
                winner: mover,
                automated,
            });
        } else if self.history.is_threefold_repetition() {
            info!("draw by threefold repetition");
            self.events.push(TurnEvent::Draw);
        } else {
            return false;
        }

        self.events.push(TurnEvent::NewGame);
        self.new_game();
        true
    }

    /// Play a human move, which must be legal, then let automated sides reply
    pub fn play(&mut self, mv: Move) -> Result<(), SessionError> {
        if !self.record_move(mv, false) {
            self.run_automated_turns()?;
        }
        Ok(())
    }

    /// Parse and play a human move
    pub fn play_notation(&mut self, text: &str) -> Result<(), SessionError> {
        let mv = self.position().parse_move(text)?;
        self.play(mv)
    }

    /// Play automated moves until a human is to move or the game ends
    pub fn run_automated_turns(&mut self) -> Result<(), SessionError> {
        loop {
            let side = self.position().side_to_move();
            if !self.players.is_automated(side) {
                return Ok(());
            }

            let Some(oracle) = self.oracle.as_mut() else {
                warn!(%side, "oracle unavailable, switching to manual play");
                self.players.set_control(Control::None);
                return Err(SessionError::OracleUnavailable);
            };

            let position = self.history.current().position;
            let strength = self.players.strength(side);
            let mv = match oracle::select_move(oracle.as_mut(), &position, &mut self.rng, strength) {
                Ok(mv) => mv,
                Err(e) => {
                    warn!(%side, error = %e, "no automated move, switching to manual play");
                    self.players.set_control(Control::None);
                    return Err(e);
                }
            };

            if self.record_move(mv, true) {
                return Ok(());
            }
        }
    }

    /// Take back the last move, then let automated sides move again
    pub fn undo(&mut self) -> Result<(), SessionError> {
        if !self.history.pop() {
            return Err(SessionError::NothingToUndo);
        }
        self.run_automated_turns()
    }

    /// Take back the last two moves, e.g. a human move and the reply to it
    pub fn remove(&mut self) -> Result<(), SessionError> {
        if !(self.history.pop() && self.history.pop()) {
            return Err(SessionError::NothingToUndo);
        }
        self.run_automated_turns()
    }

    /// Automate the side to move, leaving the other side to the human
    pub fn go(&mut self) -> Result<(), SessionError> {
        let side = self.position().side_to_move();
        self.players.set_control(Control::for_side(side));
        self.run_automated_turns()
    }

    /// Automate both sides
    pub fn both(&mut self) -> Result<(), SessionError> {
        self.players.set_control(Control::Both);
        self.run_automated_turns()
    }

    /// Stop all automated play
    pub fn force(&mut self) {
        self.players.set_control(Control::None);
    }

    pub fn set_control(&mut self, control: Control) {
        self.players.set_control(control);
    }

    pub fn set_strength(&mut self, strength: f64) -> Result<(), SessionError> {
        self.players.set_strength(strength)
    }

    pub fn set_strengths(&mut self, sente: f64, gote: f64) -> Result<(), SessionError> {
        self.players.set_strengths(sente, gote)
    }

    fn oracle_mut(&mut self) -> Result<&mut Box<dyn Oracle>, SessionError> {
        self.oracle.as_mut().ok_or(SessionError::OracleUnavailable)
    }

    /// What the oracle would play for the side to move
    pub fn hint(&mut self) -> Result<Move, SessionError> {
        let position = *self.position();
        let strength = self.players.strength(position.side_to_move());
        let oracle = self.oracle.as_mut().ok_or(SessionError::OracleUnavailable)?;
        oracle::select_move(oracle.as_mut(), &position, &mut self.rng, strength)
    }

    /// Oracle evaluation of the current position for the side to move
    pub fn evaluate(&mut self) -> Result<Evaluation, SessionError> {
        let position = *self.position();
        Ok(self.oracle_mut()?.lookup(&position))
    }

    /// Every legal move with its evaluation and selection probability
    pub fn analyze(&mut self) -> Result<Vec<Analysis>, SessionError> {
        let position = *self.position();
        let strength = self.players.strength(position.side_to_move());
        let oracle = self.oracle_mut()?;
        Ok(oracle::analyze_position(oracle.as_mut(), &position, strength))
    }
}
