//! Rules engine for Backgammon: board legality, hits, bar entry, bear-off
//! and the turn state machine that sequences a game between two players.

pub mod backgammon;
pub mod error;
pub mod misc;
pub mod simulation;

pub use error::{ErrorKind, GameError, GameResult};
