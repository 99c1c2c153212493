pub mod commands;
pub mod control;
pub mod error;
pub mod game;
pub mod history;
pub mod oracle;
pub mod plugin;
pub mod session;
pub mod web;

pub use control::*;
pub use error::*;
pub use game::*;
pub use history::*;
pub use oracle::*;
pub use plugin::*;
pub use session::*;
