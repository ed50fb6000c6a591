mod board;
pub use board::{Board, NUM_POINTS, Point};

mod player;
pub use player::{CHECKERS_PER_PLAYER, Color, Player};

mod position;
pub use position::{Destination, Origin};

mod game;
pub use game::{Game, TurnState};

mod halfmove;
pub use halfmove::{HalfMove, MoveKind};

mod history;
pub use history::{TurnHistory, TurnRecord};

mod dice;
pub use dice::{Dice, Pips, Roll};

mod record;
pub use record::{BoardRecord, GameRecord, SideCounts};
