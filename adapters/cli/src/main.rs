#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Werian Defence session.

mod placement;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use werian_defence_simulation::{GameState, Intent, Simulation, SimulationConfig};
use werian_defence_world::query;

use crate::placement::PlacementRequest;

#[derive(Parser, Debug)]
#[command(name = "werian-defence")]
#[command(about = "Runs a headless Werian Defence session at a fixed tick rate")]
struct Args {
    /// TOML configuration file; built-in defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides the configured scheduler seed
    #[arg(long)]
    seed: Option<u64>,

    /// Number of ticks to simulate
    #[arg(long, default_value = "1800")]
    ticks: u64,

    /// Tower to buy before the run starts, as KIND@COLUMN,ROW (repeatable)
    #[arg(long = "place", value_name = "KIND@COLUMN,ROW")]
    placements: Vec<PlacementRequest>,
}

/// Entry point for the Werian Defence command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let mut simulation = Simulation::new(config).context("building simulation")?;
    println!("{}", query::welcome_banner(simulation.world()));

    for request in &args.placements {
        buy_tower(&mut simulation, request);
    }

    let _ = simulation.handle_intent(Intent::Start)?;
    let dt = simulation.config().tick_interval();
    for _ in 0..args.ticks {
        let report = simulation.tick(dt);
        if report.state == GameState::GameOver {
            warn!(now_ms = millis(&simulation), "run lost");
            break;
        }
    }

    let frame = simulation.presentation();
    info!(
        now_ms = millis(&simulation),
        wave = simulation.wave(),
        enemies = frame.enemies.len(),
        towers = frame.towers.len(),
        "session finished"
    );
    println!("state: {:?}", simulation.state());
    println!("time: {} ms", millis(&simulation));
    println!("wave: {}", simulation.wave());
    println!("score: {}", simulation.economy().score());
    println!("gold: {}", simulation.economy().gold());
    println!("enemies: {}", frame.enemies.len());
    println!("towers: {}", frame.towers.len());

    let _ = simulation.handle_intent(Intent::Quit)?;
    Ok(())
}

fn buy_tower(simulation: &mut Simulation, request: &PlacementRequest) {
    let price = request.kind.price();
    if !simulation.economy().can_afford(price) {
        warn!(
            kind = ?request.kind,
            price,
            gold = simulation.economy().gold(),
            "cannot afford tower"
        );
        return;
    }
    let anchor = request.anchor(simulation.config().level.cell_size);
    match simulation.request_placement(anchor, request.kind) {
        Ok(tower) => {
            let _ = simulation.economy_mut().spend(price);
            info!(tower = tower.get(), kind = ?request.kind, "tower bought");
        }
        Err(error) => warn!(kind = ?request.kind, %error, "placement refused"),
    }
}

fn millis(simulation: &Simulation) -> u64 {
    u64::try_from(simulation.now().as_millis()).unwrap_or(u64::MAX)
}
