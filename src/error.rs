use thiserror::Error;

use crate::backgammon::Color;

/// The three families of failure the engine reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A point index, pip or computed destination is out of bounds.
    Range,
    /// The caller handed in something malformed.
    InvalidArgument,
    /// The request is well formed but breaks a rule in the current state.
    InvalidState,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("point index {0} is outside 0..=23")]
    PointOutOfRange(u8),

    #[error("pip value {0} is outside 1..=6")]
    PipOutOfRange(u8),

    #[error("moving {pip} from {origin} leaves the board")]
    DestinationOffBoard { origin: u8, pip: u8 },

    #[error("unknown color tag {0:?}")]
    UnknownColor(String),

    #[error("malformed roll: {0}")]
    MalformedRoll(String),

    #[error("a player with color {0} already exists")]
    DuplicateColor(Color),

    #[error("invalid game record: {0}")]
    InvalidRecord(String),

    #[error("point {index} is blocked for {color}")]
    Blocked { index: u8, color: Color },

    #[error("no {color} checker on point {origin}")]
    NoCheckerAt { origin: u8, color: Color },

    #[error("{0} has checkers on the bar and must enter first")]
    CheckersOnBar(Color),

    #[error("{0} has no checkers on the bar")]
    EmptyBar(Color),

    #[error("moving {pip} from {origin} leaves the board, bear off instead")]
    LeavesBoard { origin: u8, pip: u8 },

    #[error("{color} cannot bear off from {origin} with {pip}")]
    BearOffNotAllowed { origin: u8, pip: u8, color: Color },

    #[error("pip {0} is not available this turn")]
    PipUnavailable(u8),

    #[error("{0} pips are still outstanding")]
    PipsOutstanding(usize),

    #[error("no players have been added")]
    NoPlayers,

    #[error("players cannot be added once play has started")]
    PlayStarted,
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::PointOutOfRange(_)
            | GameError::PipOutOfRange(_)
            | GameError::DestinationOffBoard { .. } => ErrorKind::Range,
            GameError::UnknownColor(_)
            | GameError::MalformedRoll(_)
            | GameError::DuplicateColor(_)
            | GameError::InvalidRecord(_) => ErrorKind::InvalidArgument,
            GameError::Blocked { .. }
            | GameError::NoCheckerAt { .. }
            | GameError::LeavesBoard { .. }
            | GameError::CheckersOnBar(_)
            | GameError::EmptyBar(_)
            | GameError::BearOffNotAllowed { .. }
            | GameError::PipUnavailable(_)
            | GameError::PipsOutstanding(_)
            | GameError::NoPlayers
            | GameError::PlayStarted => ErrorKind::InvalidState,
        }
    }
}

pub type GameResult<T> = Result<T, GameError>;
