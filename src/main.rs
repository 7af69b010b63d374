//! Carrom Core headless self-play
//!
//! Seats a computer player in every chair and plays one match at a
//! simulated 60 fps. Run with `RUST_LOG=info` (or `debug`) to follow it.
//!
//! Options: `--players N`, `--seed S`, `--max-shots N`,
//! `--config <json file>`, `--settings <json file>`

use std::error::Error;
use std::fmt::Display;
use std::str::FromStr;

use carrom_core::ai::AiPlayer;
use carrom_core::sim::{FrameClock, Game, GameEvent, GamePhase};
use carrom_core::{GameConfig, Settings};

/// Simulated display frame
const FRAME_TIME: f64 = 1.0 / 60.0;

#[derive(Debug)]
struct Args {
    players: usize,
    seed: u64,
    max_shots: u32,
    config: Option<String>,
    settings: Option<String>,
}

/// Parse a flag's value, falling back to `default` with a warning
fn parse_value<T>(flag: &str, value: Option<&String>, default: T) -> T
where
    T: FromStr + Display,
{
    match value {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            log::warn!("Invalid value {raw:?} for {flag}, using {default}");
            default
        }),
        None => {
            log::warn!("Missing value for {flag}, using {default}");
            default
        }
    }
}

fn parse_args(args: &[String]) -> Args {
    let mut parsed = Args {
        players: 2,
        seed: 12345,
        max_shots: 500,
        config: None,
        settings: None,
    };

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--players" => {
                i += 1;
                parsed.players = parse_value(flag, args.get(i), 2);
            }
            "--seed" => {
                i += 1;
                parsed.seed = parse_value(flag, args.get(i), 12345);
            }
            "--max-shots" => {
                i += 1;
                parsed.max_shots = parse_value(flag, args.get(i), 500);
            }
            "--config" => {
                i += 1;
                parsed.config = args.get(i).cloned();
            }
            "--settings" => {
                i += 1;
                parsed.settings = args.get(i).cloned();
            }
            other => log::warn!("Ignoring unknown argument {other}"),
        }
        i += 1;
    }
    parsed
}

fn report(event: &GameEvent) {
    match event {
        GameEvent::Collision { .. } => {}
        GameEvent::PiecePocketed(piece) => log::info!("Pocketed {:?}", piece.kind),
        GameEvent::TurnChanged(player) => log::info!("P{} to strike", player.0),
        GameEvent::Foul { player, dues } => log::info!("Foul by P{} ({} due)", player.0, dues),
        GameEvent::DueReturned { player, color } => {
            log::info!("P{} returned a {:?} to the center", player.0, color)
        }
        GameEvent::QueenCovered(player) => log::info!("Queen covered by P{}", player.0),
        GameEvent::QueenReturned => log::info!("Queen back on the board"),
        GameEvent::PhaseChanged { .. } => {}
        GameEvent::BoardEnded { players, winner, points } => {
            let scores: Vec<String> = players
                .iter()
                .map(|p| format!("{}={}", p.name, p.score))
                .collect();
            match winner {
                Some(w) => log::info!("Board to P{} for {} [{}]", w.0, points, scores.join(" ")),
                None => log::info!("Board ended [{}]", scores.join(" ")),
            }
        }
        GameEvent::MatchEnded { winner, .. } => log::info!("Match won by P{}", winner.0),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();

    let args = parse_args(&std::env::args().collect::<Vec<_>>());
    let config = match &args.config {
        Some(path) => GameConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => GameConfig::default(),
    };
    let settings = match &args.settings {
        Some(path) => Settings::from_json(&std::fs::read_to_string(path)?)?,
        None => Settings::default(),
    };

    log::info!(
        "Carrom self-play: {} players, {} AI, seed {}",
        args.players,
        settings.difficulty.as_str(),
        args.seed
    );

    let mut game = Game::new(config)?;
    game.start_match(args.players)?;
    let mut clock = FrameClock::new(&game.config().physics);
    let mut ais: Vec<AiPlayer> = (0..args.players as u64)
        .map(|seat| AiPlayer::new(settings.difficulty, args.seed.wrapping_add(seat)))
        .collect();

    let mut shots = 0;
    while game.phase() != GamePhase::GameOver && shots < args.max_shots {
        if game.phase() == GamePhase::Playing {
            let seat = game.turns().map_or(0, |t| t.active_index());
            let ai = &mut ais[seat];
            if !ai.is_thinking() {
                ai.start_turn(&game);
            }
            if ai.update(&mut game, FRAME_TIME) {
                shots += 1;
            }
        }

        clock.advance(&mut game, FRAME_TIME);
        for event in game.drain_events() {
            report(&event);
        }
    }

    println!("\n{} shots, {} simulation steps", shots, game.time_ticks());
    if let Some(turns) = game.turns() {
        for player in turns.players() {
            println!(
                "  {}: {} points, {} fouls, color {:?}",
                player.name, player.score, player.fouls, player.color
            );
        }
    }
    if game.phase() != GamePhase::GameOver {
        println!("Stopped after {} shots without a winner", args.max_shots);
    }
    Ok(())
}
