use std::fmt::{self, Debug, Display};

use serde::{Deserialize, Serialize};

/// Where a checker starts a half move.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Bar,
    Point(u8),
}

/// Where a checker ends a half move. `Off` means borne off.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    Point(u8),
    Off,
}

impl Destination {
    pub fn index(&self) -> Option<u8> {
        match self {
            Destination::Point(index) => Some(*index),
            Destination::Off => None,
        }
    }
}

impl From<Option<u8>> for Destination {
    fn from(index: Option<u8>) -> Self {
        index.map_or(Destination::Off, Destination::Point)
    }
}

impl Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Bar => write!(f, "bar"),
            Origin::Point(index) => write!(f, "{index}"),
        }
    }
}

impl Debug for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Off => write!(f, "off"),
            Destination::Point(index) => write!(f, "{index}"),
        }
    }
}

impl Debug for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}
