use crate::game::GameError;
use thiserror::Error;

/// Recoverable failures reported to whoever drives a session
#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("oracle unavailable")]
    OracleUnavailable,
    #[error("strength must be positive: {0}")]
    InvalidStrength(f64),
    #[error("no legal moves")]
    NoLegalMoves,
    #[error(transparent)]
    Game(#[from] GameError),
}
