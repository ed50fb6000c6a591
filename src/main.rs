//! Command line front-end: drives one game turn by turn from flags, or runs
//! batches of random games.

use std::{fs, path::{Path, PathBuf}};

use anyhow::{Context, Result};
use backgammon_rules::{
    backgammon::{Color, Destination, Game, GameRecord, Origin, Roll},
    simulation::{SimulationConfig, run_simulations},
};
use clap::{Args, Parser, Subcommand};
use log::{debug, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (use -vv for trace output)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply actions to a game, optionally loading and saving it as JSON
    Play(PlayArgs),
    /// Play random games and report who wins
    Simulate(SimulateArgs),
}

#[derive(Args, Debug)]
struct PlayArgs {
    /// Put the checkers on the standard starting position
    #[arg(long)]
    setup: bool,

    /// Resume a game saved with --save
    #[arg(long, value_name = "FILE")]
    load: Option<PathBuf>,

    /// Start a turn with a fixed roll instead of throwing the dice
    #[arg(long, value_name = "A,B", value_parser = Roll::parse)]
    roll: Option<Roll>,

    /// Start a turn with a random roll
    #[arg(long, conflicts_with = "roll")]
    throw: bool,

    /// Play a pip from a point, or from the bar with `bar,PIP` (repeatable)
    #[arg(long = "move", value_name = "ORIGIN,PIP", value_parser = parse_move)]
    moves: Vec<(Origin, u8)>,

    /// Print every legal move and bear-off for the current player
    #[arg(long)]
    list_moves: bool,

    /// Print what has been played this turn
    #[arg(long)]
    history: bool,

    /// Print the board, the player to move and the dice
    #[arg(long)]
    status: bool,

    /// End the turn; every pip must have been played
    #[arg(long)]
    end_turn: bool,

    /// End the turn only if no legal move remains
    #[arg(long, conflicts_with = "end_turn")]
    auto_end: bool,

    /// Write the game to this file as JSON
    #[arg(long, value_name = "FILE")]
    save: Option<PathBuf>,

    /// Name of the white player for a new game
    #[arg(long, default_value = "White")]
    white: String,

    /// Name of the black player for a new game
    #[arg(long, default_value = "Black")]
    black: String,
}

#[derive(Args, Debug)]
struct SimulateArgs {
    /// Number of games to play
    #[arg(short, long, default_value_t = SimulationConfig::default().games)]
    games: usize,

    /// Seed of the first game; game i uses seed + i
    #[arg(long, default_value_t = SimulationConfig::default().seed)]
    seed: u64,

    /// Give up on a game after this many turns
    #[arg(long, default_value_t = SimulationConfig::default().max_turns)]
    max_turns: usize,
}

fn parse_move(text: &str) -> Result<(Origin, u8), String> {
    let (origin, pip) = text
        .split_once(',')
        .ok_or_else(|| format!("expected ORIGIN,PIP, got {text:?}"))?;
    let origin = match origin.trim() {
        "bar" | "b" => Origin::Bar,
        index => Origin::Point(index.parse().map_err(|_| format!("{index:?} is not a point index"))?),
    };
    let pip = pip.trim().parse().map_err(|_| format!("{pip:?} is not a pip"))?;
    Ok((origin, pip))
}

fn load(path: &Path) -> Result<Game> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {path:?}"))?;
    let record: GameRecord = serde_json::from_str(&text).with_context(|| format!("Failed to parse {path:?}"))?;
    Game::from_record(&record).with_context(|| format!("Invalid game in {path:?}"))
}

fn save(game: &Game, path: &Path) -> Result<()> {
    let text = serde_json::to_string_pretty(&game.to_record())?;
    fs::write(path, text).with_context(|| format!("Failed to write {path:?}"))
}

fn player_to_move(game: &Game) -> String {
    match game.current_player() {
        Some(player) => format!("{} ({})", player.name(), player.color()),
        None => "nobody".to_string(),
    }
}

fn play(args: PlayArgs) -> Result<()> {
    let mut game = match &args.load {
        Some(path) => load(path)?,
        None => {
            let mut game = Game::new();
            game.add_player(args.white.as_str(), Color::White)?;
            game.add_player(args.black.as_str(), Color::Black)?;
            game
        }
    };
    if args.setup {
        game.setup_board();
    }

    if args.roll.is_some() || args.throw {
        let roll = game.start_turn(args.roll.map(|roll| roll.as_pair()))?;
        println!("Dice: {roll:?}");
        println!("Pips: {:?}", game.pips());
    }

    for &(origin, pip) in &args.moves {
        let dest = game.apply_move(origin, pip)
            .with_context(|| format!("Move {origin},{pip} rejected"))?;
        println!("Move: {origin}->{}", Destination::from(dest));
        debug!("pips left: {:?}", game.pips());
    }

    if args.list_moves {
        println!("Legal moves:");
        for half_move in game.legal_moves().iter().chain(game.bear_off_moves().iter()) {
            println!("  {half_move:?}");
        }
    }

    if args.history {
        println!("{:?}", game.turn_history());
    }

    if args.status {
        println!("Status:");
        println!("{}", game.board());
        println!("To move: {}", player_to_move(&game));
        println!("Dice: {:?}", game.last_roll());
        println!("Pips: {:?}", game.pips());
    }

    if args.end_turn {
        game.end_turn()?;
        println!("Turn now: {}", player_to_move(&game));
        println!("Pips: {:?}", game.pips());
    }

    if args.auto_end {
        if game.auto_end_turn()? {
            println!("No legal move, turn now: {}", player_to_move(&game));
        } else {
            println!("Moves remain for {}", player_to_move(&game));
        }
    }

    if let Some(winner) = game.winner() {
        println!("{winner} has borne off every checker");
    }

    if let Some(path) = &args.save {
        save(&game, path)?;
        info!("Game written to {path:?}");
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    match cli.command {
        Command::Play(args) => play(args),
        Command::Simulate(args) => {
            let config = SimulationConfig { games: args.games, seed: args.seed, max_turns: args.max_turns };
            let report = run_simulations(config).context("Simulation failed")?;
            println!("{report}");
            Ok(())
        }
    }
}
