use log::warn;
use serde::{Deserialize, Serialize};

use crate::{
    backgammon::{
        Board, Color, Destination, Game, NUM_POINTS, Origin, Pips, Player, Roll, TurnHistory,
        TurnRecord,
    },
    error::{GameError, GameResult},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideCounts {
    pub white: u8,
    pub black: u8,
}

impl SideCounts {
    fn to_array(self) -> [u8; 2] {
        [self.white, self.black]
    }
}

/// Board contents in the signed point encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardRecord {
    pub points: [i8; NUM_POINTS as usize],
    pub bar: SideCounts,
    pub off: SideCounts,
}

/// Everything needed to rebuild a [`Game`] exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub players: Vec<Player>,
    pub current_player_index: usize,
    pub board: BoardRecord,
    pub last_roll: Option<[u8; 2]>,
    pub pips: Vec<u8>,
    #[serde(default)]
    pub turn_history: Vec<TurnRecord>,
    #[serde(default)]
    pub started: bool,
}

impl Board {
    pub fn to_record(&self) -> BoardRecord {
        BoardRecord {
            points: self.layout(),
            bar: SideCounts { white: self.bar_count(Color::White), black: self.bar_count(Color::Black) },
            off: SideCounts { white: self.off_count(Color::White), black: self.off_count(Color::Black) },
        }
    }

    pub fn from_record(record: &BoardRecord) -> GameResult<Self> {
        Board::from_layout(record.points, record.bar.to_array(), record.off.to_array())
    }
}

fn invalid(reason: impl Into<String>) -> GameError {
    GameError::InvalidRecord(reason.into())
}

/// A history entry must be a half move the current player could have made:
/// on-board endpoints, a real pip and a destination that follows from both.
fn check_history_entry(board: &Board, entry: &TurnRecord, mover: Option<Color>) -> GameResult<()> {
    let half_move = entry.half_move();
    let wrong = |what: &str| invalid(format!("history entry {entry:?}: {what}"));
    if mover != Some(entry.color()) {
        return Err(wrong("not played by the current player"));
    }
    if entry.kind() != half_move.kind() {
        return Err(wrong("wrong kind"));
    }
    let pip = half_move.pip();
    if !(1..=6).contains(&pip) {
        return Err(wrong("pip outside 1..=6"));
    }
    let color = entry.color();
    let expected = match (half_move.from(), half_move.to()) {
        (Origin::Bar, Destination::Point(_)) => board.entry_index(pip, color).ok(),
        (Origin::Point(origin), Destination::Point(_)) => board.dest_from(origin, pip, color).ok(),
        (Origin::Point(origin), Destination::Off) => {
            Board::home_range(color).contains(&origin).then_some(origin)
        }
        (Origin::Bar, Destination::Off) => None,
    };
    match (expected, half_move.to()) {
        (Some(dest), Destination::Point(index)) if dest == index => Ok(()),
        (Some(_), Destination::Off) => Ok(()),
        _ => Err(wrong("endpoints do not match the pip")),
    }
}

impl Game {
    pub fn to_record(&self) -> GameRecord {
        GameRecord {
            players: self.players().to_vec(),
            current_player_index: self.current_player_index(),
            board: self.board().to_record(),
            last_roll: self.last_roll().map(|roll| [roll.die1(), roll.die2()]),
            pips: self.pips().to_vec(),
            turn_history: self.turn_history().to_vec(),
            started: self.has_started(),
        }
    }

    /// Rebuilds a game, rejecting any record that could not have been
    /// produced by play.
    pub fn from_record(record: &GameRecord) -> GameResult<Self> {
        Self::validated(record).inspect_err(|err| warn!("rejected game record: {err}"))
    }

    fn validated(record: &GameRecord) -> GameResult<Self> {
        let board = Board::from_record(&record.board)?;

        let mut players: Vec<Player> = Vec::with_capacity(record.players.len());
        for player in &record.players {
            if players.iter().any(|p| p.color() == player.color()) {
                return Err(GameError::DuplicateColor(player.color()));
            }
            players.push(player.clone());
        }
        let index = record.current_player_index;
        if index >= players.len().max(1) {
            return Err(invalid(format!("player index {index} with {} players", players.len())));
        }

        let last_roll = record.last_roll
            .map(|[a, b]| Roll::new(a, b).map_err(|err| invalid(format!("last roll: {err}"))))
            .transpose()?;

        if record.turn_history.len() > 4 {
            return Err(invalid(format!("{} history entries in one turn", record.turn_history.len())));
        }
        let mover = players.get(index).map(Player::color);

        // played and remaining pips together must come out of the roll
        let mut granted = last_roll.map(|roll| roll.pips()).unwrap_or_default();
        let mut turn_history = TurnHistory::new();
        for entry in &record.turn_history {
            check_history_entry(&board, entry, mover)?;
            if !granted.remove_first(&entry.half_move().pip()) {
                return Err(invalid(format!("history entry {entry:?} used a pip the roll did not grant")));
            }
            turn_history.record(*entry);
        }

        let mut pips = Pips::new();
        for &pip in &record.pips {
            if !granted.remove_first(&pip) {
                return Err(invalid(format!("pip {pip} was not granted by the last roll")));
            }
            pips.try_push(pip).map_err(|pip| invalid(format!("no room for pip {pip}")))?;
        }

        Ok(Game::from_parts(
            board,
            players,
            index,
            last_roll,
            pips,
            turn_history,
            record.started || last_roll.is_some(),
        ))
    }
}
