use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::backgammon::{Destination, Origin};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveKind {
    Move,
    Enter,
    BearOff,
}

/// One checker moved by one pip.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HalfMove {
    from: Origin,
    to: Destination,
    pip: u8,
}

impl HalfMove {
    pub fn new(from: Origin, to: Destination, pip: u8) -> Self {
        HalfMove { from, to, pip }
    }

    pub fn from(&self) -> Origin {
        self.from
    }

    pub fn to(&self) -> Destination {
        self.to
    }

    pub fn pip(&self) -> u8 {
        self.pip
    }

    pub fn kind(&self) -> MoveKind {
        match (self.from, self.to) {
            (Origin::Bar, _) => MoveKind::Enter,
            (_, Destination::Off) => MoveKind::BearOff,
            _ => MoveKind::Move,
        }
    }
}

impl Debug for HalfMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}->{} (pip {})", self.from, self.to, self.pip)
    }
}
