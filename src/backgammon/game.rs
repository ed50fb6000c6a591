use log::debug;
use rand::Rng;

use crate::{
    backgammon::{
        Board, CHECKERS_PER_PLAYER, Color, Destination, Dice, HalfMove, NUM_POINTS, Origin, Pips,
        Player, Roll, TurnHistory, TurnRecord,
    },
    error::{GameError, GameResult},
};

/// Where the game is within a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// No roll on the table.
    Idle,
    /// Pips left to play.
    TurnActive,
    /// Every pip used, waiting for [`Game::end_turn`].
    TurnOver,
}

/// Sequences turns between the players on top of a [`Board`].
///
/// The board answers whether a checker may go somewhere. The game decides
/// whose turn it is, which pips are left and that checkers on the bar are
/// entered before anything else moves.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Game {
    board: Board,
    players: Vec<Player>,
    current_player_index: usize,
    dice: Dice,
    pips: Pips,
    turn_history: TurnHistory,
    started: bool,
}

impl Game {
    pub fn new() -> Self {
        Game {
            board: Board::new(),
            players: Vec::new(),
            current_player_index: 0,
            dice: Dice::new(),
            pips: Pips::new(),
            turn_history: TurnHistory::new(),
            started: false,
        }
    }

    pub(super) fn from_parts(
        board: Board,
        players: Vec<Player>,
        current_player_index: usize,
        last_roll: Option<Roll>,
        pips: Pips,
        turn_history: TurnHistory,
        started: bool,
    ) -> Self {
        let mut dice = Dice::new();
        if let Some(roll) = last_roll {
            dice.show(roll);
        }
        Game { board, players, current_player_index, dice, pips, turn_history, started }
    }

    /// Adds a participant. Colors must be distinct and the list is frozen
    /// once the first turn has started.
    pub fn add_player(&mut self, name: impl Into<String>, color: Color) -> GameResult<()> {
        if self.started {
            return Err(GameError::PlayStarted);
        }
        if self.players.iter().any(|player| player.color() == color) {
            return Err(GameError::DuplicateColor(color));
        }
        let player = Player::new(name, color);
        debug!("added player {} playing {}", player.name(), color);
        self.players.push(player);
        Ok(())
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn num_players(&self) -> usize {
        self.players.len()
    }

    pub fn current_player_index(&self) -> usize {
        self.current_player_index
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current_player_index)
    }

    pub fn current_color(&self) -> GameResult<Color> {
        self.current_player().map(Player::color).ok_or(GameError::NoPlayers)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn setup_board(&mut self) {
        self.board.setup_initial();
    }

    pub fn has_started(&self) -> bool {
        self.started
    }

    /// Starts a turn with `fixed` if given, otherwise with a fresh throw.
    pub fn start_turn(&mut self, fixed: Option<(u8, u8)>) -> GameResult<Roll> {
        self.current_color()?;
        let roll = match fixed {
            Some(pair) => Roll::try_from(pair)?,
            None => self.dice.roll(),
        };
        self.begin_turn(roll);
        Ok(roll)
    }

    /// Starts a turn with dice driven by `rng`.
    pub fn start_turn_with<R: Rng>(&mut self, rng: &mut R) -> GameResult<Roll> {
        self.current_color()?;
        let roll = self.dice.roll_with(rng);
        self.begin_turn(roll);
        Ok(roll)
    }

    fn begin_turn(&mut self, roll: Roll) {
        self.dice.show(roll);
        self.pips = roll.pips();
        self.turn_history.clear();
        self.started = true;
        debug!("turn started with {roll:?}, pips {:?}", self.pips);
    }

    pub fn last_roll(&self) -> Option<Roll> {
        self.dice.last_roll()
    }

    /// Pips still to play, in roll order.
    pub fn pips(&self) -> &[u8] {
        &self.pips
    }

    pub fn is_turn_over(&self) -> bool {
        self.pips.is_empty()
    }

    pub fn turn_state(&self) -> TurnState {
        match (self.last_roll(), self.pips.is_empty()) {
            (None, _) => TurnState::Idle,
            (Some(_), false) => TurnState::TurnActive,
            (Some(_), true) => TurnState::TurnOver,
        }
    }

    pub fn turn_history(&self) -> &TurnHistory {
        &self.turn_history
    }

    pub fn bar_count(&self, color: Color) -> u8 {
        self.board.bar_count(color)
    }

    fn has_pip(&self, pip: u8) -> bool {
        self.pips.contains(&pip)
    }

    /// Remaining pip values without repeats, smallest first.
    fn distinct_pips(&self) -> Vec<u8> {
        let mut pips = self.pips.to_vec();
        pips.sort_unstable();
        pips.dedup();
        pips
    }

    fn consume(&mut self, half_move: HalfMove, color: Color) {
        self.pips.remove_first(&half_move.pip());
        self.turn_history.record(TurnRecord::new(half_move, color));
    }

    /// Whether the current player may play `pip` from `origin` right now.
    pub fn can_play_move(&self, origin: Origin, pip: u8) -> bool {
        let Ok(color) = self.current_color() else {
            return false;
        };
        if !self.has_pip(pip) {
            return false;
        }
        match origin {
            Origin::Bar => self.board.can_enter(pip, color),
            Origin::Point(_) if self.board.bar_count(color) > 0 => false,
            Origin::Point(index) => {
                (self.board.all_in_home(color) && self.board.can_bear_off(index, pip, color))
                    || self.board.can_move(index, pip, color)
            }
        }
    }

    /// Whether the current player may enter from the bar with `pip`.
    pub fn can_enter(&self, pip: u8) -> bool {
        self.can_play_move(Origin::Bar, pip)
    }

    /// Plays `pip` from `origin`: entry from the bar, bear-off when every
    /// checker is home and the pip carries the checker off, a normal move
    /// otherwise. Returns the landing point, `None` for a bear-off.
    pub fn apply_move(&mut self, origin: Origin, pip: u8) -> GameResult<Option<u8>> {
        let color = self.current_color()?;
        if !self.has_pip(pip) {
            return Err(GameError::PipUnavailable(pip));
        }
        let to = match origin {
            Origin::Bar => Destination::Point(self.board.enter_from_bar(pip, color)?),
            Origin::Point(_) if self.board.bar_count(color) > 0 => {
                return Err(GameError::CheckersOnBar(color));
            }
            Origin::Point(index) => {
                if self.board.all_in_home(color) && self.board.can_bear_off(index, pip, color) {
                    self.board.bear_off(index, pip, color)?;
                    Destination::Off
                } else {
                    Destination::Point(self.board.move_checker(index, pip, color)?)
                }
            }
        };
        self.consume(HalfMove::new(origin, to, pip), color);
        Ok(to.index())
    }

    pub fn enter_from_bar(&mut self, pip: u8) -> GameResult<u8> {
        let color = self.current_color()?;
        if !self.has_pip(pip) {
            return Err(GameError::PipUnavailable(pip));
        }
        let dest = self.board.enter_from_bar(pip, color)?;
        self.consume(HalfMove::new(Origin::Bar, Destination::Point(dest), pip), color);
        Ok(dest)
    }

    pub fn bear_off(&mut self, origin: u8, pip: u8) -> GameResult<()> {
        let color = self.current_color()?;
        if !self.has_pip(pip) {
            return Err(GameError::PipUnavailable(pip));
        }
        if self.board.bar_count(color) > 0 {
            return Err(GameError::CheckersOnBar(color));
        }
        self.board.bear_off(origin, pip, color)?;
        self.consume(HalfMove::new(Origin::Point(origin), Destination::Off, pip), color);
        Ok(())
    }

    /// Entries while the bar holds a checker of the current color, normal
    /// moves otherwise. Bear-offs are listed by [`Self::bear_off_moves`].
    pub fn legal_moves(&self) -> Vec<HalfMove> {
        let Ok(color) = self.current_color() else {
            return Vec::new();
        };
        let pips = self.distinct_pips();
        if self.board.bar_count(color) > 0 {
            return pips.into_iter()
                .filter(|&pip| self.board.can_enter(pip, color))
                .filter_map(|pip| {
                    let dest = self.board.entry_index(pip, color).ok()?;
                    Some(HalfMove::new(Origin::Bar, Destination::Point(dest), pip))
                })
                .collect();
        }
        let mut moves = Vec::new();
        for origin in 0..NUM_POINTS {
            if self.board.owner_at(origin) != Ok(Some(color)) {
                continue;
            }
            for &pip in &pips {
                if let Some(dest) = self.board.legal_destination(origin, pip, color) {
                    moves.push(HalfMove::new(Origin::Point(origin), Destination::Point(dest), pip));
                }
            }
        }
        moves
    }

    pub fn bear_off_moves(&self) -> Vec<HalfMove> {
        let Ok(color) = self.current_color() else {
            return Vec::new();
        };
        if !self.board.all_in_home(color) {
            return Vec::new();
        }
        let pips = self.distinct_pips();
        Board::home_range(color)
            .flat_map(|origin| pips.iter().map(move |&pip| (origin, pip)))
            .filter(|&(origin, pip)| self.board.can_bear_off(origin, pip, color))
            .map(|(origin, pip)| HalfMove::new(Origin::Point(origin), Destination::Off, pip))
            .collect()
    }

    pub fn has_any_move(&self) -> bool {
        !self.legal_moves().is_empty() || !self.bear_off_moves().is_empty()
    }

    /// Ends the turn when nothing is playable, forfeiting the remaining
    /// pips. Returns whether the turn was ended.
    pub fn auto_end_turn(&mut self) -> GameResult<bool> {
        if self.has_any_move() {
            return Ok(false);
        }
        if !self.pips.is_empty() {
            debug!("no legal move, forfeiting pips {:?}", self.pips);
        }
        self.pips.clear();
        self.end_turn()?;
        Ok(true)
    }

    /// Passes the turn to the next player. Every pip must have been played.
    pub fn end_turn(&mut self) -> GameResult<()> {
        if !self.pips.is_empty() {
            return Err(GameError::PipsOutstanding(self.pips.len()));
        }
        if !self.players.is_empty() {
            self.current_player_index = (self.current_player_index + 1) % self.players.len();
        }
        self.dice.clear();
        self.pips.clear();
        self.turn_history.clear();
        debug!("turn ended, {:?} to play", self.current_player().map(Player::name));
        Ok(())
    }

    pub fn has_won(&self, color: Color) -> bool {
        self.board.off_count(color) == CHECKERS_PER_PLAYER
    }

    pub fn winner(&self) -> Option<Color> {
        Color::BOTH.into_iter().find(|&color| self.has_won(color))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backgammon::MoveKind;

    fn new_game() -> Game {
        let mut game = Game::new();
        game.add_player("Alice", Color::White).unwrap();
        game.add_player("Bob", Color::Black).unwrap();
        game.setup_board();
        game
    }

    #[test]
    fn test_players() {
        let mut game = Game::new();
        assert_eq!(game.current_player(), None);
        assert_eq!(game.current_color(), Err(GameError::NoPlayers));
        game.add_player("Alice", Color::White).unwrap();
        assert_eq!(game.add_player("Carol", Color::White), Err(GameError::DuplicateColor(Color::White)));
        game.add_player("Bob", Color::Black).unwrap();
        assert_eq!(game.num_players(), 2);
        assert_eq!(game.current_player().map(Player::name), Some("Alice"));
    }

    #[test]
    fn test_no_players_added_after_start() {
        let mut game = Game::new();
        game.add_player("Alice", Color::White).unwrap();
        game.start_turn(Some((3, 4))).unwrap();
        assert_eq!(game.add_player("Bob", Color::Black), Err(GameError::PlayStarted));
    }

    #[test]
    fn test_start_turn_requires_players() {
        let mut game = Game::new();
        assert_eq!(game.start_turn(Some((3, 4))), Err(GameError::NoPlayers));
        assert_eq!(game.turn_state(), TurnState::Idle);
    }

    #[test]
    fn test_start_turn_fixed() {
        let mut game = new_game();
        assert_eq!(game.turn_state(), TurnState::Idle);
        let roll = game.start_turn(Some((3, 4))).unwrap();
        assert_eq!(roll.as_pair(), (3, 4));
        assert_eq!(game.last_roll(), Some(roll));
        assert_eq!(game.pips(), &[3, 4]);
        assert_eq!(game.turn_state(), TurnState::TurnActive);
        assert_eq!(game.start_turn(Some((0, 4))), Err(GameError::PipOutOfRange(0)));
        assert_eq!(game.start_turn(Some((3, 9))), Err(GameError::PipOutOfRange(9)));
        // a rejected roll keeps the running turn
        assert_eq!(game.pips(), &[3, 4]);
    }

    #[test]
    fn test_start_turn_random() {
        let mut game = new_game();
        let roll = game.start_turn(None).unwrap();
        assert_eq!(game.pips().len(), if roll.is_double() { 4 } else { 2 });
    }

    #[test]
    fn test_apply_move_consumes_pip() {
        let mut game = new_game();
        game.start_turn(Some((3, 4))).unwrap();
        assert!(game.can_play_move(Origin::Point(7), 3));
        assert_eq!(game.apply_move(Origin::Point(7), 3), Ok(Some(4)));
        assert_eq!(game.board().get_point(7), Ok(2));
        assert_eq!(game.board().get_point(4), Ok(1));
        assert_eq!(game.pips(), &[4]);
        let history = game.turn_history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].color(), Color::White);
        assert_eq!(history[0].kind(), MoveKind::Move);
        assert_eq!(history[0].half_move().pip(), 3);
    }

    #[test]
    fn test_apply_move_rejects_missing_pip() {
        let mut game = new_game();
        game.start_turn(Some((3, 4))).unwrap();
        let before = game.clone();
        assert!(!game.can_play_move(Origin::Point(7), 6));
        assert_eq!(game.apply_move(Origin::Point(7), 6), Err(GameError::PipUnavailable(6)));
        assert_eq!(game, before);
    }

    #[test]
    fn test_apply_move_blocked_keeps_state() {
        let mut game = new_game();
        game.start_turn(Some((1, 2))).unwrap();
        let before = game.clone();
        assert_eq!(
            game.apply_move(Origin::Point(12), 1),
            Err(GameError::Blocked { index: 11, color: Color::White })
        );
        assert_eq!(game, before);
    }

    #[test]
    fn test_no_turn_no_moves() {
        let game = new_game();
        assert!(!game.can_play_move(Origin::Point(7), 3));
        assert!(game.legal_moves().is_empty());
        assert!(!game.has_any_move());
    }

    #[test]
    fn test_legal_moves_opening() {
        let mut game = new_game();
        game.start_turn(Some((3, 4))).unwrap();
        let moves = game.legal_moves();
        assert!(moves.contains(&HalfMove::new(Origin::Point(7), Destination::Point(4), 3)));
        assert!(moves.contains(&HalfMove::new(Origin::Point(23), Destination::Point(19), 4)));
        assert!(moves.contains(&HalfMove::new(Origin::Point(12), Destination::Point(8), 4)));
        assert!(moves.iter().all(|m| m.kind() == MoveKind::Move));
        assert!(game.bear_off_moves().is_empty());
        for m in &moves {
            let Origin::Point(origin) = m.from() else { panic!("no bar moves expected") };
            assert!(game.board().can_move(origin, m.pip(), Color::White));
        }
    }

    #[test]
    fn test_double_lists_each_candidate_once() {
        let mut game = new_game();
        game.start_turn(Some((5, 5))).unwrap();
        assert_eq!(game.pips(), &[5, 5, 5, 5]);
        let moves = game.legal_moves();
        let from_twelve = moves.iter().filter(|m| m.from() == Origin::Point(12)).count();
        assert_eq!(from_twelve, 1);
    }

    #[test]
    fn test_end_turn() {
        let mut game = new_game();
        game.start_turn(Some((3, 4))).unwrap();
        assert_eq!(game.end_turn(), Err(GameError::PipsOutstanding(2)));
        assert_eq!(game.current_player_index(), 0);
        game.apply_move(Origin::Point(7), 3).unwrap();
        game.apply_move(Origin::Point(5), 4).unwrap();
        assert_eq!(game.turn_state(), TurnState::TurnOver);
        game.end_turn().unwrap();
        assert_eq!(game.current_player_index(), 1);
        assert_eq!(game.current_color(), Ok(Color::Black));
        assert_eq!(game.last_roll(), None);
        assert!(game.pips().is_empty());
        assert!(game.turn_history().is_empty());
        assert_eq!(game.turn_state(), TurnState::Idle);
    }

    #[test]
    fn test_black_moves_upwards() {
        let mut game = new_game();
        game.start_turn(Some((1, 2))).unwrap();
        game.apply_move(Origin::Point(12), 2).unwrap();
        game.apply_move(Origin::Point(7), 1).unwrap();
        game.end_turn().unwrap();
        game.start_turn(Some((6, 5))).unwrap();
        assert_eq!(game.apply_move(Origin::Point(0), 6), Ok(Some(6)));
        assert_eq!(game.apply_move(Origin::Point(11), 5), Ok(Some(16)));
        assert_eq!(game.board().get_point(16), Ok(-4));
    }

    #[test]
    fn test_bar_precedence() {
        let mut points = Board::initial().layout();
        points[5] = 4;
        let board = Board::from_layout(points, [1, 0], [0, 0]).unwrap();
        let players = vec![Player::new("Alice", Color::White), Player::new("Bob", Color::Black)];
        let mut game = Game::from_parts(board, players, 0, None, Pips::new(), TurnHistory::new(), true);
        game.start_turn(Some((3, 4))).unwrap();
        assert!(!game.can_play_move(Origin::Point(7), 3));
        assert!(game.can_enter(3));
        assert!(game.can_enter(4));
        assert!(game.bear_off_moves().is_empty());
        let moves = game.legal_moves();
        assert_eq!(moves, vec![
            HalfMove::new(Origin::Bar, Destination::Point(21), 3),
            HalfMove::new(Origin::Bar, Destination::Point(20), 4),
        ]);
        let before = game.clone();
        assert_eq!(game.apply_move(Origin::Point(7), 3), Err(GameError::CheckersOnBar(Color::White)));
        assert_eq!(game.bear_off(3, 3), Err(GameError::CheckersOnBar(Color::White)));
        assert_eq!(game, before);
        assert_eq!(game.apply_move(Origin::Bar, 4), Ok(Some(20)));
        assert_eq!(game.turn_history()[0].kind(), MoveKind::Enter);
        // the bar is clear, normal moves are back
        assert!(game.can_play_move(Origin::Point(7), 3));
        assert!(!game.can_enter(3));
    }

    #[test]
    fn test_enter_from_bar_consumes_pip() {
        let mut points = Board::initial().layout();
        points[5] = 3;
        let board = Board::from_layout(points, [2, 0], [0, 0]).unwrap();
        let players = vec![Player::new("Alice", Color::White), Player::new("Bob", Color::Black)];
        let mut game = Game::from_parts(board, players, 0, None, Pips::new(), TurnHistory::new(), true);
        game.start_turn(Some((2, 2))).unwrap();
        let before = game.clone();
        assert_eq!(game.enter_from_bar(6), Err(GameError::PipUnavailable(6)));
        assert_eq!(game, before);
        assert_eq!(game.enter_from_bar(2), Ok(22));
        assert_eq!(game.enter_from_bar(2), Ok(22));
        let before = game.clone();
        assert_eq!(game.enter_from_bar(2), Err(GameError::EmptyBar(Color::White)));
        assert_eq!(game, before);
        assert_eq!(game.pips(), &[2, 2]);
        assert_eq!(game.turn_history().len(), 2);
        assert_eq!(game.board().get_point(22), Ok(2));
    }

    #[test]
    fn test_blocked_entry_keeps_state() {
        let mut points = Board::initial().layout();
        points[5] = 4;
        let board = Board::from_layout(points, [1, 0], [0, 0]).unwrap();
        let players = vec![Player::new("Alice", Color::White), Player::new("Bob", Color::Black)];
        let mut game = Game::from_parts(board, players, 0, None, Pips::new(), TurnHistory::new(), true);
        game.start_turn(Some((6, 6))).unwrap();
        // 18 holds five black checkers
        assert!(!game.can_enter(6));
        let before = game.clone();
        assert_eq!(game.enter_from_bar(6), Err(GameError::Blocked { index: 18, color: Color::White }));
        assert_eq!(game.apply_move(Origin::Bar, 6), Err(GameError::Blocked { index: 18, color: Color::White }));
        assert_eq!(game, before);
        assert!(!game.has_any_move());
    }

    #[test]
    fn test_bear_off_through_apply_move() {
        let mut points = [0; 24];
        for (index, count) in [(5, 2), (4, 5), (3, 3), (2, 3), (1, 2)] {
            points[index] = count;
        }
        points[23] = -15;
        let board = Board::from_layout(points, [0, 0], [0, 0]).unwrap();
        let players = vec![Player::new("Alice", Color::White), Player::new("Bob", Color::Black)];
        let mut game = Game::from_parts(board, players, 0, None, Pips::new(), TurnHistory::new(), true);
        game.start_turn(Some((6, 1))).unwrap();
        let bear_offs = game.bear_off_moves();
        assert_eq!(bear_offs, vec![HalfMove::new(Origin::Point(5), Destination::Off, 6)]);
        assert!(game.can_play_move(Origin::Point(5), 6));
        assert!(!game.can_play_move(Origin::Point(1), 6));
        assert_eq!(game.apply_move(Origin::Point(5), 6), Ok(None));
        assert_eq!(game.board().off_count(Color::White), 1);
        assert_eq!(game.turn_history()[0].kind(), MoveKind::BearOff);
        // exact bear-off from 1 needs a 2, so the 1 moves inside home
        assert_eq!(game.apply_move(Origin::Point(1), 1), Ok(Some(0)));
        assert!(game.is_turn_over());
    }

    #[test]
    fn test_game_bear_off() {
        let mut points = [0; 24];
        points[0] = 1;
        points[23] = -15;
        let board = Board::from_layout(points, [0, 0], [14, 0]).unwrap();
        let players = vec![Player::new("Alice", Color::White), Player::new("Bob", Color::Black)];
        let mut game = Game::from_parts(board, players, 0, None, Pips::new(), TurnHistory::new(), true);
        game.start_turn(Some((4, 2))).unwrap();
        assert_eq!(game.bear_off(0, 3), Err(GameError::PipUnavailable(3)));
        game.bear_off(0, 4).unwrap();
        assert!(game.has_won(Color::White));
        assert_eq!(game.winner(), Some(Color::White));
        assert!(!game.has_won(Color::Black));
        // nothing left to move, the 2 is forfeited
        assert_eq!(game.auto_end_turn(), Ok(true));
        assert_eq!(game.current_color(), Ok(Color::Black));
    }

    #[test]
    fn test_auto_end_turn_keeps_turn_with_moves() {
        let mut game = new_game();
        game.start_turn(Some((3, 4))).unwrap();
        assert_eq!(game.auto_end_turn(), Ok(false));
        assert_eq!(game.pips(), &[3, 4]);
        assert_eq!(game.current_player_index(), 0);
    }
}
