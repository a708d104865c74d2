//! Ezam headless demo
//!
//! Builds a game from `EZAM_*` environment variables and runs it in real
//! time with an autopilot steering the player toward the nearest gold.

use std::time::Duration;

use anyhow::Context;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use ezam::{
    Cell, Direction, GameConfig, GameState, ObjectKind, Scheduler, TickStatus, VERSION,
    game::{events::GameEventData, input::handle_key},
};

/// Gap between autopilot key presses.
const AUTOPILOT_STEP: Duration = Duration::from_millis(150);

/// Give up after this much wall time.
const MAX_RUNTIME: Duration = Duration::from_secs(120);

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Ezam v{}", VERSION);

    let config = GameConfig::from_env().context("reading EZAM_* configuration")?;
    let mut state = GameState::new(&config).context("building game")?;
    let mut scheduler = Scheduler::from_config(&config).context("building scheduler")?;
    scheduler.attach(&state);

    let walls = state.maze.wall_segments();
    info!(
        "Maze {}x{}, seed {}, {} wall segments on a {}x{} px canvas",
        config.width,
        config.height,
        state.rng_seed,
        walls.len(),
        config.width as f32 * config.cell_size,
        config.height as f32 * config.cell_size,
    );
    if let Some(first) = walls.first() {
        debug!("First wall at {:?}", first.scaled(config.cell_size));
    }
    info!("\n{}", state.maze);
    info!(
        "Player at {}, {} enemies, {} gold, {} crystals, target {}",
        state.player.position,
        state.count_of(ObjectKind::Enemy),
        state.count_of(ObjectKind::Gold),
        state.count_of(ObjectKind::Crystal),
        state.gold_target
    );

    let status = run(&mut state, &mut scheduler, config.tick_interval()).await;

    let summary = serde_json::json!({
        "seed": state.rng_seed,
        "outcome": format!("{status:?}"),
        "ticks": state.tick,
        "gold": state.player.gold,
        "has_crystal": state.player.has_crystal,
        "position": state.player.position,
        "state_hash": hex::encode(state.compute_hash()),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}

/// Drive the scheduler from a tokio interval until the game ends.
async fn run(state: &mut GameState, scheduler: &mut Scheduler, tick: Duration) -> TickStatus {
    let mut ticker = interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let started = Instant::now();
    let mut last = started;
    let mut since_key = Duration::ZERO;

    loop {
        ticker.tick().await;
        let now = Instant::now();
        let elapsed = now - last;
        last = now;

        since_key += elapsed;
        if since_key >= AUTOPILOT_STEP {
            since_key = Duration::ZERO;
            if let Some(direction) = autopilot(state) {
                handle_key(state, direction.as_str());
            }
        }

        let report = scheduler.advance(state, elapsed);
        for event in &report.events {
            log_event(&event.data);
        }

        match report.status {
            TickStatus::Win => {
                info!("You win!");
                return report.status;
            }
            TickStatus::GameOver => {
                info!("You lose");
                return report.status;
            }
            TickStatus::Stopped => return report.status,
            TickStatus::Continue => {}
        }

        if now - started > MAX_RUNTIME {
            warn!("Demo timed out after {:?}", MAX_RUNTIME);
            scheduler.cancel();
            return TickStatus::Stopped;
        }
    }
}

/// Next step toward the nearest gold, holding still if an enemy is there.
fn autopilot(state: &GameState) -> Option<Direction> {
    let from = state.player.position;
    let path = state
        .objects
        .values()
        .filter(|o| o.kind == ObjectKind::Gold)
        .filter_map(|o| state.maze.path_between(from, o.position))
        .min_by_key(Vec::len)?;

    let direction = *path.first()?;
    let next: Cell = state.maze.neighbor(from, direction)?;
    let threatened = state
        .objects
        .values()
        .any(|o| o.kind == ObjectKind::Enemy && o.position.manhattan(next) <= 1);

    (!threatened).then_some(direction)
}

fn log_event(data: &GameEventData) {
    match data {
        GameEventData::GoldCollected { total_gold, .. } => {
            info!("Gold collected ({} total)", total_gold);
        }
        GameEventData::CrystalCollected { .. } => info!("Crystal collected"),
        GameEventData::PlayerCaught { enemy_id, at } => {
            info!("Caught by enemy {} at {}", enemy_id, at);
        }
        _ => {}
    }
}
