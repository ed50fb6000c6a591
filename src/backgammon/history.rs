use std::{fmt::Debug, ops::Deref};

use serde::{Deserialize, Serialize};

use crate::{backgammon::{Color, HalfMove, MoveKind}, misc::TinyVec};

/// A half move that was actually played, with who played it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TurnRecord {
    half_move: HalfMove,
    color: Color,
    kind: MoveKind,
}

impl TurnRecord {
    pub fn new(half_move: HalfMove, color: Color) -> Self {
        TurnRecord { half_move, color, kind: half_move.kind() }
    }

    pub fn half_move(&self) -> &HalfMove {
        &self.half_move
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn kind(&self) -> MoveKind {
        self.kind
    }
}

impl Debug for TurnRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {:?}", self.color, self.half_move)
    }
}

/// Everything played since the current turn started. A turn consumes at
/// most four pips, so four records always fit.
#[derive(Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TurnHistory {
    records: TinyVec<TurnRecord, 4>,
}

impl TurnHistory {
    pub fn new() -> Self {
        TurnHistory { records: TinyVec::new() }
    }

    pub(crate) fn record(&mut self, record: TurnRecord) {
        if self.records.try_push(record).is_err() {
            log::warn!("turn history full, dropping {record:?}");
        }
    }

    pub(crate) fn clear(&mut self) {
        self.records.clear();
    }
}

impl Deref for TurnHistory {
    type Target = TinyVec<TurnRecord, 4>;

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}

impl Debug for TurnHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "History: ")?;
        for (i, record) in self.records.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}", record)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backgammon::{Destination, Origin};

    #[test]
    fn test_record_and_clear() {
        let mut history = TurnHistory::new();
        let half_move = HalfMove::new(Origin::Point(7), Destination::Point(4), 3);
        history.record(TurnRecord::new(half_move, Color::White));
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].kind(), MoveKind::Move);
        assert_eq!(format!("{history:?}"), "History: white 7->4 (pip 3)");
        history.clear();
        assert!(history.is_empty());
    }
}
