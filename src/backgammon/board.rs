use std::{fmt, num::NonZeroU8, ops::RangeInclusive};

use log::trace;

use crate::{
    backgammon::{CHECKERS_PER_PLAYER, Color},
    error::{GameError, GameResult},
};

pub const NUM_POINTS: u8 = 24;

/// Contents of one point: nobody, or `count` checkers of one color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Point {
    #[default]
    Empty,
    Occupied { color: Color, count: NonZeroU8 },
}

impl Point {
    pub fn new(color: Color, count: u8) -> Self {
        match NonZeroU8::new(count) {
            Some(count) => Point::Occupied { color, count },
            None => Point::Empty,
        }
    }

    /// Decodes the signed form: positive White, negative Black, zero empty.
    pub fn from_signed(value: i8) -> Self {
        match value {
            0 => Point::Empty,
            v if v > 0 => Point::new(Color::White, v.unsigned_abs()),
            v => Point::new(Color::Black, v.unsigned_abs()),
        }
    }

    pub fn signed(&self) -> i8 {
        match self {
            Point::Empty => 0,
            Point::Occupied { color, count } => color.sign() * count.get() as i8,
        }
    }

    pub fn owner(&self) -> Option<Color> {
        match self {
            Point::Empty => None,
            Point::Occupied { color, .. } => Some(*color),
        }
    }

    pub fn count(&self) -> u8 {
        match self {
            Point::Empty => 0,
            Point::Occupied { count, .. } => count.get(),
        }
    }

    pub fn count_of(&self, color: Color) -> u8 {
        if self.owner() == Some(color) { self.count() } else { 0 }
    }

    /// Two or more opposing checkers.
    pub fn blocks(&self, mover: Color) -> bool {
        matches!(self, Point::Occupied { color, count } if *color != mover && count.get() >= 2)
    }

    fn is_blot_of(&self, color: Color) -> bool {
        matches!(self, Point::Occupied { color: c, count } if *c == color && count.get() == 1)
    }
}

/// The 24 points plus bar and borne-off counts for both colors.
///
/// Point indices run 0..=23. White moves towards 0 and bears off below it,
/// Black moves towards 23 and bears off above it. Every mutator validates
/// fully before touching any state, so a returned error means nothing changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    points: [Point; NUM_POINTS as usize],
    bar: [u8; 2],
    off: [u8; 2],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// An empty board with no checkers anywhere.
    pub fn new() -> Self {
        Board {
            points: [Point::Empty; NUM_POINTS as usize],
            bar: [0, 0],
            off: [0, 0],
        }
    }

    /// A board with the standard starting position.
    pub fn initial() -> Self {
        let mut board = Board::new();
        board.setup_initial();
        board
    }

    pub fn setup_initial(&mut self) {
        self.points = [Point::Empty; NUM_POINTS as usize];
        for (index, count) in [(23, 2), (12, 5), (7, 3), (5, 5)] {
            self.points[index] = Point::new(Color::White, count);
        }
        for (index, count) in [(0, 2), (11, 5), (16, 3), (18, 5)] {
            self.points[index] = Point::new(Color::Black, count);
        }
        self.bar = [0, 0];
        self.off = [0, 0];
        trace!("board set to the initial position");
    }

    /// Builds a board from the signed encoding, with `bar` and `off` given
    /// as `[white, black]`. Each color must account for exactly 15 checkers.
    /// The only exception is a board that was never set up, with no checkers
    /// of either color.
    pub fn from_layout(points: [i8; NUM_POINTS as usize], bar: [u8; 2], off: [u8; 2]) -> GameResult<Self> {
        let mut board = Board { points: [Point::Empty; NUM_POINTS as usize], bar, off };
        for (index, &value) in points.iter().enumerate() {
            if value.unsigned_abs() > CHECKERS_PER_PLAYER {
                return Err(GameError::InvalidRecord(format!(
                    "point {index} holds {} checkers", value.unsigned_abs()
                )));
            }
            board.points[index] = Point::from_signed(value);
        }
        let totals = Color::BOTH.map(|color| {
            let on_board: u32 = points.iter()
                .filter(|&&value| value.signum() == color.sign())
                .map(|&value| value.unsigned_abs() as u32)
                .sum();
            on_board + bar[color.slot()] as u32 + off[color.slot()] as u32
        });
        if totals == [0, 0] {
            return Ok(board);
        }
        for (color, total) in Color::BOTH.into_iter().zip(totals) {
            if total != CHECKERS_PER_PLAYER as u32 {
                return Err(GameError::InvalidRecord(format!(
                    "{color} accounts for {total} checkers, expected {CHECKERS_PER_PLAYER}"
                )));
            }
        }
        Ok(board)
    }

    /// The signed encoding of all points.
    pub fn layout(&self) -> [i8; NUM_POINTS as usize] {
        self.points.map(|point| point.signed())
    }

    fn check_index(index: u8) -> GameResult<usize> {
        if index < NUM_POINTS {
            Ok(index as usize)
        } else {
            Err(GameError::PointOutOfRange(index))
        }
    }

    fn check_pip(pip: u8) -> GameResult<()> {
        if (1..=6).contains(&pip) {
            Ok(())
        } else {
            Err(GameError::PipOutOfRange(pip))
        }
    }

    pub fn point(&self, index: u8) -> GameResult<Point> {
        Ok(self.points[Self::check_index(index)?])
    }

    /// Signed view of a point: positive White, negative Black.
    pub fn get_point(&self, index: u8) -> GameResult<i8> {
        self.point(index).map(|point| point.signed())
    }

    pub fn owner_at(&self, index: u8) -> GameResult<Option<Color>> {
        self.point(index).map(|point| point.owner())
    }

    pub fn count_at(&self, index: u8) -> GameResult<u8> {
        self.point(index).map(|point| point.count())
    }

    /// Checkers of `color` on the 24 points, excluding bar and off.
    pub fn count_total(&self, color: Color) -> u8 {
        self.points.iter().map(|point| point.count_of(color)).sum()
    }

    pub fn bar_count(&self, color: Color) -> u8 {
        self.bar[color.slot()]
    }

    pub fn off_count(&self, color: Color) -> u8 {
        self.off[color.slot()]
    }

    /// On board + bar + off. Constant under every mutator.
    pub fn checkers_total(&self, color: Color) -> u32 {
        self.count_total(color) as u32 + self.bar_count(color) as u32 + self.off_count(color) as u32
    }

    pub fn home_range(color: Color) -> RangeInclusive<u8> {
        match color {
            Color::White => 0..=5,
            Color::Black => 18..=23,
        }
    }

    pub fn is_blocked(&self, index: u8, mover: Color) -> GameResult<bool> {
        self.point(index).map(|point| point.blocks(mover))
    }

    /// Where a checker on `origin` lands after `pip` steps. Fails with a
    /// range error when that lies beyond either edge of the board.
    pub fn dest_from(&self, origin: u8, pip: u8, mover: Color) -> GameResult<u8> {
        Self::check_index(origin)?;
        Self::check_pip(pip)?;
        let dest = match mover {
            Color::White => origin as i16 - pip as i16,
            Color::Black => origin as i16 + pip as i16,
        };
        if (0..NUM_POINTS as i16).contains(&dest) {
            Ok(dest as u8)
        } else {
            Err(GameError::DestinationOffBoard { origin, pip })
        }
    }

    fn check_move(&self, origin: u8, pip: u8, mover: Color) -> GameResult<u8> {
        Self::check_index(origin)?;
        Self::check_pip(pip)?;
        if self.bar_count(mover) > 0 {
            return Err(GameError::CheckersOnBar(mover));
        }
        if self.points[origin as usize].owner() != Some(mover) {
            return Err(GameError::NoCheckerAt { origin, color: mover });
        }
        let dest = self.dest_from(origin, pip, mover)
            .map_err(|_| GameError::LeavesBoard { origin, pip })?;
        if self.points[dest as usize].blocks(mover) {
            return Err(GameError::Blocked { index: dest, color: mover });
        }
        Ok(dest)
    }

    /// A normal move: no checkers on the bar, an own checker on `origin`
    /// and an on-board destination that is not blocked.
    pub fn can_move(&self, origin: u8, pip: u8, mover: Color) -> bool {
        self.check_move(origin, pip, mover).is_ok()
    }

    /// The destination of a legal normal move, if the move is legal.
    pub fn legal_destination(&self, origin: u8, pip: u8, mover: Color) -> Option<u8> {
        self.check_move(origin, pip, mover).ok()
    }

    /// Moves one checker, hitting a lone opposing checker if one sits on the
    /// destination. Returns the destination.
    pub fn move_checker(&mut self, origin: u8, pip: u8, mover: Color) -> GameResult<u8> {
        let dest = self.check_move(origin, pip, mover)?;
        let from = &mut self.points[origin as usize];
        *from = Point::new(mover, from.count() - 1);
        self.land(dest, mover);
        trace!("{mover} moved {origin} -> {dest} with {pip}");
        Ok(dest)
    }

    /// Puts one checker of `mover` on `index`. The point is known not to be blocked.
    fn land(&mut self, index: u8, mover: Color) {
        let point = &mut self.points[index as usize];
        if point.is_blot_of(mover.opposite()) {
            *point = Point::new(mover, 1);
            self.bar[mover.opposite().slot()] += 1;
            trace!("{mover} hit a {} blot on {index}", mover.opposite());
        } else {
            *point = Point::new(mover, point.count_of(mover) + 1);
        }
    }

    /// White enters on 18..=23, Black on 0..=5.
    pub fn entry_index(&self, pip: u8, color: Color) -> GameResult<u8> {
        Self::check_pip(pip)?;
        Ok(match color {
            Color::White => NUM_POINTS - pip,
            Color::Black => pip - 1,
        })
    }

    fn check_enter(&self, pip: u8, color: Color) -> GameResult<u8> {
        let dest = self.entry_index(pip, color)?;
        if self.bar_count(color) == 0 {
            return Err(GameError::EmptyBar(color));
        }
        if self.points[dest as usize].blocks(color) {
            return Err(GameError::Blocked { index: dest, color });
        }
        Ok(dest)
    }

    pub fn can_enter(&self, pip: u8, color: Color) -> bool {
        self.check_enter(pip, color).is_ok()
    }

    pub fn enter_from_bar(&mut self, pip: u8, color: Color) -> GameResult<u8> {
        let dest = self.check_enter(pip, color)?;
        self.bar[color.slot()] -= 1;
        self.land(dest, color);
        trace!("{color} entered on {dest} with {pip}");
        Ok(dest)
    }

    /// No checkers on the bar and every on-board checker inside the home
    /// quadrant. Holds trivially once nothing is left on the board.
    pub fn all_in_home(&self, color: Color) -> bool {
        if self.bar_count(color) > 0 {
            return false;
        }
        let home = Self::home_range(color);
        self.points.iter()
            .enumerate()
            .all(|(index, point)| point.owner() != Some(color) || home.contains(&(index as u8)))
    }

    fn check_bear_off(&self, origin: u8, pip: u8, color: Color) -> GameResult<()> {
        Self::check_index(origin)?;
        Self::check_pip(pip)?;
        let not_allowed = GameError::BearOffNotAllowed { origin, pip, color };
        if self.points[origin as usize].owner() != Some(color) {
            return Err(GameError::NoCheckerAt { origin, color });
        }
        if !self.all_in_home(color) {
            return Err(not_allowed);
        }
        // steps needed to land exactly one past the exit edge
        let exact = match color {
            Color::White => origin + 1,
            Color::Black => NUM_POINTS - origin,
        };
        if pip < exact {
            return Err(not_allowed);
        }
        if pip == exact {
            return Ok(());
        }
        // overshoot: only from the point farthest from the exit edge
        let mut farther = match color {
            Color::White => origin + 1..=5,
            Color::Black => 18..=origin.saturating_sub(1),
        };
        if farther.any(|index| self.points[index as usize].owner() == Some(color)) {
            return Err(not_allowed);
        }
        Ok(())
    }

    /// Exact bear-off is always allowed once everything is home. An
    /// overshooting pip is allowed only when no own checker sits strictly
    /// farther from the exit edge than `origin`.
    pub fn can_bear_off(&self, origin: u8, pip: u8, color: Color) -> bool {
        self.check_bear_off(origin, pip, color).is_ok()
    }

    pub fn bear_off(&mut self, origin: u8, pip: u8, color: Color) -> GameResult<()> {
        self.check_bear_off(origin, pip, color)?;
        let from = &mut self.points[origin as usize];
        *from = Point::new(color, from.count() - 1);
        self.off[color.slot()] += 1;
        trace!("{color} bore off from {origin} with {pip}");
        Ok(())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let row = |indices: &mut dyn Iterator<Item = usize>| {
            indices.map(|i| format!("{:3}", self.points[i].signed())).collect::<Vec<_>>().join(" ")
        };
        writeln!(f, " 11  10   9   8   7   6 |   5   4   3   2   1   0")?;
        writeln!(f, "{} | {}", row(&mut (6..12).rev()), row(&mut (0..6).rev()))?;
        writeln!(f, "=================================================")?;
        writeln!(f, "{} | {}", row(&mut (12..18)), row(&mut (18..24)))?;
        writeln!(f, " 12  13  14  15  16  17 |  18  19  20  21  22  23")?;
        write!(
            f,
            "bar W:{} B:{}  off W:{} B:{}",
            self.bar_count(Color::White), self.bar_count(Color::Black),
            self.off_count(Color::White), self.off_count(Color::Black),
        )
    }
}
