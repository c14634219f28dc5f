//! Surround: offline inspection of server game snapshots.
//!
//! ## Usage
//!
//! - `surround replay game.json` - Rebuild the game and show board, status and clock
//! - `surround score game.json` - Score the final position under the game's rules
//! - `surround estimate game.json` - Show a Monte Carlo ownership map
//!
//! Set `RUST_LOG=debug` to watch the replay.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use surround::board::{Point, StoneColor};
use surround::clock::now_millis;
use surround::game::Game;
use surround::playout::EstimatorConfig;
use surround::score::PlayerScore;
use surround::snapshot::GameSnapshot;

/// Surround: Go rules and game state for remote games
#[derive(Parser)]
#[command(name = "surround")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a snapshot and print the resulting position
    Replay { snapshot: PathBuf },
    /// Score the position a snapshot ends in
    Score { snapshot: PathBuf },
    /// Estimate ownership of every point by random playouts
    Estimate {
        snapshot: PathBuf,
        /// Number of playouts to average
        #[arg(long, default_value_t = EstimatorConfig::default().playouts)]
        playouts: usize,
        /// Seed for a reproducible estimate
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Replay { snapshot } => replay(&snapshot),
        Commands::Score { snapshot } => score(&snapshot),
        Commands::Estimate {
            snapshot,
            playouts,
            seed,
        } => estimate(&snapshot, playouts, seed),
    }
}

fn load(path: &Path) -> Result<Game> {
    let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let snapshot = GameSnapshot::from_json(&json).with_context(|| format!("decoding {}", path.display()))?;
    Game::from_snapshot(snapshot).context("replaying snapshot")
}

fn replay(path: &Path) -> Result<()> {
    let mut game = load(path)?;
    let position = game.current_position();
    println!("Move {}, {} to play", position.last_move_number(), position.next_to_move());
    println!("{}", position.board());
    for color in [StoneColor::Black, StoneColor::White] {
        if let Some(player) = game.player(color) {
            println!(
                "{color}: {} [{}], {} captures",
                player.username,
                player.formatted_rank(),
                position.captures(color)
            );
        }
    }
    if let Some(status) = game.recompute_clock(now_millis()) {
        if let Some(clock) = game.clock() {
            println!("Clock ({status:?}): {} to move", clock.current_player);
            for color in [StoneColor::Black, StoneColor::White] {
                let time = clock.time(color);
                println!(
                    "  {color}: {:.1}s main, {:?} periods",
                    time.thinking_time_left.unwrap_or(0.0),
                    time.periods_left
                );
            }
        }
    }
    println!("{}", game.status());
    Ok(())
}

fn score(path: &Path) -> Result<()> {
    let game = load(path)?;
    let scores = game.compute_score().context("snapshot has no ruleset")?;
    println!("{:<8}{:>8}{:>8}{:>10}{:>6}{:>10}{:>8}", "", "stones", "terr.", "prisoners", "komi", "handicap", "total");
    print_row("Black", &scores.black);
    print_row("White", &scores.white);
    println!("Dame: {}", scores.dame.len());
    Ok(())
}

fn print_row(label: &str, score: &PlayerScore) {
    println!(
        "{label:<8}{:>8}{:>8}{:>10}{:>6}{:>10}{:>8.1}",
        score.stones, score.territory, score.prisoners, score.komi, score.handicap, score.total
    );
}

fn estimate(path: &Path, playouts: usize, seed: Option<u64>) -> Result<()> {
    let game = load(path)?;
    let config = EstimatorConfig {
        playouts,
        seed,
        ..EstimatorConfig::default()
    };
    let position = game.current_position();
    let ownership = position.estimate_territory(&config);
    for row in 0..ownership.height() {
        for column in 0..ownership.width() {
            let ch = match ownership.get(Point::new(row, column)) {
                Some(StoneColor::Black) => 'x',
                Some(StoneColor::White) => 'o',
                None => '.',
            };
            print!("{ch} ");
        }
        println!();
    }
    let komi = game.data().map_or(0.0, |d| d.komi);
    let black = ownership.count(StoneColor::Black) as f64;
    let white = ownership.count(StoneColor::White) as f64 + komi;
    println!("Black {black:.1}, White {white:.1} (komi {komi})");
    Ok(())
}
