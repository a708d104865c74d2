//! Game Logic Module
//!
//! Maze topology plus the per-tick simulation. Deterministic given a seed.
//!
//! ## Module Structure
//!
//! - `maze`: Perfect maze generation and movement queries
//! - `state`: Player, objects, and game state
//! - `movement`: Player steps and enemy wandering
//! - `collision`: Overlap tests and collision resolution
//! - `tick`: Main update loop
//! - `schedule`: Main and per-enemy timers
//! - `input`: Key names to player moves
//! - `events`: Notifications for the host

pub mod maze;
pub mod state;
pub mod movement;
pub mod collision;
pub mod tick;
pub mod schedule;
pub mod input;
pub mod events;

// Re-export key types
pub use maze::{Maze, MazeError, WallSegment};
pub use state::{GameObject, GamePhase, GameState, ObjectId, ObjectKind, PlayerState};
pub use tick::{update, TickResult, TickStatus};
pub use schedule::{FrameReport, Scheduler};
pub use events::{GameEvent, GameEventData};
