//! # Ezam
//!
//! Maze-chase simulation core: the player walks a randomly generated
//! perfect maze, collects gold and crystals, and avoids roaming enemies.
//! Rendering, widgets, and animation belong to the host.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          EZAM                                │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/            - Deterministic primitives                 │
//! │  ├── grid.rs      - Cell coordinates and directions          │
//! │  ├── rng.rs       - Seeded Xorshift128+ PRNG                 │
//! │  └── hash.rs      - State fingerprints                       │
//! │                                                              │
//! │  game/            - Simulation                               │
//! │  ├── maze.rs      - Perfect maze generation and queries      │
//! │  ├── state.rs     - Player, objects, game state              │
//! │  ├── movement.rs  - Player steps, enemy wandering            │
//! │  ├── collision.rs - Overlap and collision resolution         │
//! │  ├── tick.rs      - Main update loop                         │
//! │  ├── schedule.rs  - Main and per-enemy timers                │
//! │  ├── input.rs     - Key names to moves                       │
//! │  └── events.rs    - Host notifications                       │
//! │                                                              │
//! │  config.rs        - Game configuration                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Host loop
//!
//! ```
//! use std::time::Duration;
//! use ezam::{GameConfig, GameState, Scheduler};
//! use ezam::game::input::handle_key;
//!
//! let config = GameConfig { seed: Some(1), ..GameConfig::default() };
//! let mut state = GameState::new(&config).unwrap();
//! let mut scheduler = Scheduler::from_config(&config).unwrap();
//! scheduler.attach(&state);
//!
//! handle_key(&mut state, "up");
//! let report = scheduler.advance(&mut state, Duration::from_millis(16));
//! assert_eq!(report.ticks, 1);
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod game;

// Re-export commonly used types
pub use config::{ConfigError, GameConfig};
pub use crate::core::grid::{Cell, Direction};
pub use crate::core::rng::DeterministicRng;
pub use game::maze::{Maze, WallSegment};
pub use game::schedule::Scheduler;
pub use game::state::{GamePhase, GameState, ObjectId, ObjectKind};
pub use game::tick::{update, TickStatus};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
