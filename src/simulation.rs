use std::fmt;

use hashbrown::HashMap;
use log::{debug, info};
use rand::{SeedableRng, rngs::StdRng, seq::IndexedRandom};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use thiserror::Error;

use crate::{
    backgammon::{CHECKERS_PER_PLAYER, Color, Game},
    error::GameError,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimulationError {
    #[error("engine error in game {seed}: {source}")]
    Engine { seed: u64, source: GameError },

    #[error("game {seed}, turn {turn}: {color} accounts for {total} checkers")]
    Conservation { seed: u64, turn: usize, color: Color, total: u32 },
}

#[derive(Debug, Clone, Copy)]
pub struct SimulationConfig {
    pub games: usize,
    pub seed: u64,
    pub max_turns: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig { games: 100, seed: 0, max_turns: 5000 }
    }
}

/// How one random game went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSummary {
    pub winner: Option<Color>,
    pub turns: usize,
    pub half_moves: usize,
    pub forfeited_turns: usize,
}

/// Plays one game in which every action is drawn uniformly from the legal
/// moves and bear-offs on offer. Deterministic for a given `seed`.
pub fn simulate_game(seed: u64, max_turns: usize) -> Result<GameSummary, SimulationError> {
    let engine = |source: GameError| SimulationError::Engine { seed, source };
    let mut rng = StdRng::seed_from_u64(seed);
    let mut game = Game::new();
    game.add_player("White", Color::White).map_err(engine)?;
    game.add_player("Black", Color::Black).map_err(engine)?;
    game.setup_board();

    let mut summary = GameSummary { winner: None, turns: 0, half_moves: 0, forfeited_turns: 0 };

    for turn in 0..max_turns {
        summary.turns = turn + 1;
        game.start_turn_with(&mut rng).map_err(engine)?;

        while !game.is_turn_over() {
            let mut candidates = game.legal_moves();
            candidates.extend(game.bear_off_moves());
            let Some(&choice) = candidates.choose(&mut rng) else {
                break;
            };
            game.apply_move(choice.from(), choice.pip()).map_err(engine)?;
            summary.half_moves += 1;

            for color in Color::BOTH {
                let total = game.board().checkers_total(color);
                if total != CHECKERS_PER_PLAYER as u32 {
                    return Err(SimulationError::Conservation { seed, turn, color, total });
                }
            }

            if let Some(winner) = game.winner() {
                debug!("game {seed}: {winner} won after {} turns", summary.turns);
                summary.winner = Some(winner);
                return Ok(summary);
            }
        }

        if game.is_turn_over() {
            game.end_turn().map_err(engine)?;
        } else {
            summary.forfeited_turns += 1;
            game.auto_end_turn().map_err(engine)?;
        }
    }

    debug!("game {seed}: no winner after {max_turns} turns");
    Ok(summary)
}

#[derive(Debug, Clone, Default)]
pub struct SimulationReport {
    pub games: usize,
    pub wins: HashMap<Color, usize>,
    pub unfinished: usize,
    pub total_turns: usize,
    pub total_half_moves: usize,
}

impl SimulationReport {
    pub fn wins(&self, color: Color) -> usize {
        self.wins.get(&color).copied().unwrap_or(0)
    }

    pub fn average_turns(&self) -> f32 {
        if self.games == 0 {
            return 0.0;
        }
        self.total_turns as f32 / self.games as f32
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "games: {}  white: {}  black: {}  unfinished: {}  avg turns: {:.1}  half moves: {}",
            self.games,
            self.wins(Color::White),
            self.wins(Color::Black),
            self.unfinished,
            self.average_turns(),
            self.total_half_moves,
        )
    }
}

/// Runs `config.games` random games in parallel. Game `i` uses seed
/// `config.seed + i`, so a report is reproducible.
pub fn run_simulations(config: SimulationConfig) -> Result<SimulationReport, SimulationError> {
    info!("simulating {} games from seed {}", config.games, config.seed);
    let summaries = (0..config.games)
        .into_par_iter()
        .map(|i| simulate_game(config.seed.wrapping_add(i as u64), config.max_turns))
        .collect::<Result<Vec<_>, _>>()?;

    let mut report = SimulationReport { games: summaries.len(), ..Default::default() };
    for summary in summaries {
        match summary.winner {
            Some(color) => *report.wins.entry(color).or_insert(0) += 1,
            None => report.unfinished += 1,
        }
        report.total_turns += summary.turns;
        report.total_half_moves += summary.half_moves;
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_game_finishes() {
        let summary = simulate_game(42, 5000).unwrap();
        assert!(summary.winner.is_some());
        assert!(summary.half_moves >= 15);
    }

    #[test]
    fn test_same_seed_same_game() {
        assert_eq!(simulate_game(7, 5000), simulate_game(7, 5000));
    }

    #[test]
    fn test_turn_cap() {
        let summary = simulate_game(3, 1).unwrap();
        assert_eq!(summary.winner, None);
        assert_eq!(summary.turns, 1);
    }

    #[test]
    fn test_report() {
        let report = run_simulations(SimulationConfig { games: 8, seed: 100, max_turns: 5000 }).unwrap();
        assert_eq!(report.games, 8);
        assert_eq!(report.wins(Color::White) + report.wins(Color::Black) + report.unfinished, 8);
        assert!(report.average_turns() > 0.0);
        assert!(report.to_string().starts_with("games: 8"));
    }
}
