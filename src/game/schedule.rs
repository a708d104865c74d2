//! Timer Scheduling
//!
//! The host feeds elapsed wall time from a single tick source. The
//! scheduler decides which timers are due: the main update loop and one
//! slower timer per enemy. Timers fire in chronological order; when several
//! fall on the same instant, enemies move first (in id order) and then the
//! main tick runs, so a step onto the player is seen immediately.

use std::collections::BTreeMap;
use std::time::Duration;

use tracing::debug;

use crate::config::{ConfigError, GameConfig};
use crate::game::events::GameEvent;
use crate::game::movement::move_enemy;
use crate::game::state::{GameState, ObjectId};
use crate::game::tick::{update, TickStatus};

/// A repeating interval timer driven by elapsed-time bookkeeping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timer {
    interval: Duration,
    elapsed: Duration,
}

impl Timer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            elapsed: Duration::ZERO,
        }
    }

    /// Time left before the next firing.
    #[inline]
    pub fn until_due(&self) -> Duration {
        self.interval.saturating_sub(self.elapsed)
    }

    #[inline]
    pub fn is_due(&self) -> bool {
        self.elapsed >= self.interval
    }

    #[inline]
    fn advance(&mut self, dt: Duration) {
        self.elapsed += dt;
    }

    #[inline]
    fn fire(&mut self) {
        self.elapsed = self.elapsed.saturating_sub(self.interval);
    }
}

/// Everything that happened during one `advance` call.
#[derive(Debug, Default)]
pub struct FrameReport {
    /// Main ticks run
    pub ticks: u32,
    /// Enemy moves made
    pub enemy_moves: u32,
    /// Events from every tick, in order, then any moves made after the
    /// last one
    pub events: Vec<GameEvent>,
    /// `GameOver`/`Win` on the frame that ended the game, `Stopped` once
    /// cancelled, otherwise `Continue`
    pub status: TickStatus,
}

/// Main loop timer plus per-enemy timers.
#[derive(Debug)]
pub struct Scheduler {
    main: Timer,
    enemy_interval: Duration,
    enemies: BTreeMap<ObjectId, Timer>,
    cancelled: bool,
}

impl Scheduler {
    /// Create a scheduler with no enemy timers yet.
    pub fn new(tick_interval: Duration, enemy_interval: Duration) -> Result<Self, ConfigError> {
        if tick_interval.is_zero() {
            return Err(ConfigError::ZeroInterval { timer: "tick" });
        }
        if enemy_interval.is_zero() {
            return Err(ConfigError::ZeroInterval { timer: "enemy" });
        }

        Ok(Self {
            main: Timer::new(tick_interval),
            enemy_interval,
            enemies: BTreeMap::new(),
            cancelled: false,
        })
    }

    pub fn from_config(config: &GameConfig) -> Result<Self, ConfigError> {
        Self::new(config.tick_interval(), config.enemy_interval())
    }

    /// Start a timer for every live enemy that does not have one.
    pub fn attach(&mut self, state: &GameState) {
        if self.cancelled {
            return;
        }
        for id in state.enemy_ids() {
            self.enemies
                .entry(id)
                .or_insert_with(|| Timer::new(self.enemy_interval));
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Number of running enemy timers.
    pub fn enemy_timer_count(&self) -> usize {
        self.enemies.len()
    }

    /// Stop every timer. Only the first call has an effect.
    pub fn cancel(&mut self) {
        if self.cancelled {
            return;
        }
        self.cancelled = true;
        debug!(enemy_timers = self.enemies.len(), "timers cancelled");
        self.enemies.clear();
    }

    /// Run every timer that falls due within `elapsed`.
    pub fn advance(&mut self, state: &mut GameState, elapsed: Duration) -> FrameReport {
        let mut report = FrameReport::default();
        if self.cancelled {
            report.status = TickStatus::Stopped;
            return report;
        }

        let mut remaining = elapsed;
        loop {
            let next_enemy = self.enemies.values().map(Timer::until_due).min();
            let step = next_enemy.map_or(self.main.until_due(), |e| e.min(self.main.until_due()));

            if step > remaining {
                self.advance_all(remaining);
                break;
            }
            self.advance_all(step);
            remaining -= step;

            for (id, timer) in self.enemies.iter_mut() {
                if timer.is_due() {
                    timer.fire();
                    if move_enemy(state, *id) {
                        report.enemy_moves += 1;
                    }
                }
            }

            if self.main.is_due() {
                self.main.fire();
                let result = update(state);
                report.ticks += 1;
                report.events.extend(result.events);

                if result.status.is_terminal() || result.status == TickStatus::Stopped {
                    report.status = result.status;
                    self.cancel();
                    break;
                }

                // Removed enemies stop moving
                self.enemies.retain(|id, _| state.objects.contains_key(id));
            }
        }

        // Moves made after the last main tick of this frame
        report.events.extend(state.take_events());
        report
    }

    fn advance_all(&mut self, dt: Duration) {
        self.main.advance(dt);
        for timer in self.enemies.values_mut() {
            timer.advance(dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grid::{Cell, Direction};
    use crate::game::events::GameEventData;
    use crate::game::maze::Maze;
    use crate::game::state::ObjectKind;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn open_state() -> GameState {
        let mut maze = Maze::new(6, 1).unwrap();
        for x in 0..5 {
            maze.carve(Cell::new(x, 0), Direction::Right);
        }
        GameState::with_maze(maze, Cell::new(0, 0), 1, 3).unwrap()
    }

    #[test]
    fn test_zero_interval_rejected() {
        assert!(Scheduler::new(Duration::ZERO, ms(300)).is_err());
        assert!(Scheduler::new(ms(10), Duration::ZERO).is_err());
    }

    #[test]
    fn test_timer_bookkeeping() {
        let mut timer = Timer::new(ms(10));
        timer.advance(ms(7));
        assert!(!timer.is_due());
        assert_eq!(timer.until_due(), ms(3));
        timer.advance(ms(3));
        assert!(timer.is_due());
        timer.fire();
        assert_eq!(timer.until_due(), ms(10));
    }

    #[test]
    fn test_main_tick_cadence_carries_remainder() {
        let mut state = open_state();
        let mut scheduler = Scheduler::new(ms(10), ms(300)).unwrap();

        assert_eq!(scheduler.advance(&mut state, ms(25)).ticks, 2);
        assert_eq!(scheduler.advance(&mut state, ms(5)).ticks, 1);
        assert_eq!(state.tick, 3);
    }

    #[test]
    fn test_enemies_move_on_slower_cadence() {
        let mut state = open_state();
        state.spawn(ObjectKind::Enemy, Cell::new(5, 0)).unwrap();
        state.spawn(ObjectKind::Gold, Cell::new(3, 0)).unwrap();

        let mut scheduler = Scheduler::new(ms(10), ms(300)).unwrap();
        scheduler.attach(&state);
        assert_eq!(scheduler.enemy_timer_count(), 1);

        let report = scheduler.advance(&mut state, ms(299));
        assert_eq!(report.enemy_moves, 0);
        assert_eq!(report.ticks, 29);

        let report = scheduler.advance(&mut state, ms(1));
        assert_eq!(report.enemy_moves, 1);
        assert_eq!(report.ticks, 1);
    }

    #[test]
    fn test_attach_is_idempotent() {
        let mut state = open_state();
        state.spawn(ObjectKind::Enemy, Cell::new(5, 0)).unwrap();
        let mut scheduler = Scheduler::new(ms(10), ms(300)).unwrap();
        scheduler.attach(&state);
        scheduler.attach(&state);
        assert_eq!(scheduler.enemy_timer_count(), 1);
    }

    #[test]
    fn test_terminal_tick_cancels_everything_once() {
        let mut state = open_state();
        state.spawn(ObjectKind::Enemy, Cell::new(1, 0)).unwrap();
        let mut scheduler = Scheduler::new(ms(10), ms(300)).unwrap();
        scheduler.attach(&state);

        crate::game::movement::move_player(&mut state, Direction::Right);
        let report = scheduler.advance(&mut state, ms(1000));
        assert_eq!(report.status, TickStatus::GameOver);
        assert_eq!(report.ticks, 1);
        assert!(scheduler.is_cancelled());
        assert_eq!(scheduler.enemy_timer_count(), 0);
        assert_eq!(report.events.iter().filter(|e| e.is_terminal()).count(), 1);

        let tick = state.tick;
        let report = scheduler.advance(&mut state, ms(1000));
        assert_eq!(report.status, TickStatus::Stopped);
        assert_eq!(report.ticks, 0);
        assert!(report.events.is_empty());
        assert_eq!(state.tick, tick);
    }

    #[test]
    fn test_stepping_onto_enemy_is_caught_whichever_way_it_leaves() {
        for seed in 0..64 {
            let mut maze = Maze::new(3, 1).unwrap();
            maze.carve(Cell::new(0, 0), Direction::Right);
            maze.carve(Cell::new(1, 0), Direction::Right);
            let mut state = GameState::with_maze(maze, Cell::new(0, 0), 1, seed).unwrap();
            state.spawn(ObjectKind::Enemy, Cell::new(1, 0)).unwrap();

            let mut scheduler = Scheduler::new(ms(10), ms(300)).unwrap();
            scheduler.attach(&state);
            assert_eq!(scheduler.advance(&mut state, ms(295)).status, TickStatus::Continue);

            // Player walks in; the enemy timer fires before the next main tick
            assert!(crate::game::movement::move_player(&mut state, Direction::Right));
            let report = scheduler.advance(&mut state, ms(5));
            assert_eq!(report.enemy_moves, 1, "seed {seed}");
            assert_eq!(report.status, TickStatus::GameOver, "seed {seed}");
            assert!(state.player.is_marked_for_removal());
        }
    }

    #[test]
    fn test_enemy_move_after_last_tick_is_reported_same_frame() {
        let mut state = open_state();
        state.spawn(ObjectKind::Enemy, Cell::new(5, 0)).unwrap();
        let mut scheduler = Scheduler::new(ms(10), ms(15)).unwrap();
        scheduler.attach(&state);

        // Main tick at 10ms, enemy move at 15ms
        let report = scheduler.advance(&mut state, ms(15));
        assert_eq!(report.ticks, 1);
        assert_eq!(report.enemy_moves, 1);
        assert!(report
            .events
            .iter()
            .any(|e| matches!(e.data, GameEventData::EnemyMoved { .. })));

        let report = scheduler.advance(&mut state, ms(5));
        assert_eq!(report.ticks, 1);
        assert!(report.events.is_empty());
    }

    #[test]
    fn test_seeded_games_replay_identically() {
        let config = GameConfig {
            seed: Some(777),
            ..GameConfig::default()
        };

        let run = || {
            let mut state = GameState::new(&config).unwrap();
            let mut scheduler = Scheduler::from_config(&config).unwrap();
            scheduler.attach(&state);
            for _ in 0..200 {
                scheduler.advance(&mut state, ms(16));
            }
            state.compute_hash()
        };

        assert_eq!(run(), run());
    }
}
