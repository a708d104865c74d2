//! Simulation Update Loop
//!
//! One call per main-timer tick:
//!
//! 1. resolve collisions between the player and every live object,
//!    in insertion order
//! 2. check end conditions (loss before win)
//! 3. remove objects marked for removal
//! 4. remember this tick's positions for contact detection between ticks

use tracing::{debug, info};

use crate::game::collision::{check_all_collisions, collide, CollisionOutcome};
use crate::game::events::GameEvent;
use crate::game::state::{GamePhase, GameState, ObjectId};

/// Outcome signalled by a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TickStatus {
    /// Game goes on
    #[default]
    Continue,
    /// Player was caught this tick
    GameOver,
    /// Gold target reached this tick
    Win,
    /// Game had already ended; nothing happened
    Stopped,
}

impl TickStatus {
    /// Did this tick end the game?
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, TickStatus::GameOver | TickStatus::Win)
    }
}

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    pub status: TickStatus,
    /// Events since the previous tick, moves included
    pub events: Vec<GameEvent>,
}

/// Run one main-loop tick.
///
/// Game-over and win are each signalled exactly once; every later call
/// returns [`TickStatus::Stopped`] without touching the state.
pub fn update(state: &mut GameState) -> TickResult {
    if state.is_ended() {
        return TickResult {
            status: TickStatus::Stopped,
            events: Vec::new(),
        };
    }

    state.tick += 1;

    process_collisions(state);
    let status = check_end_conditions(state);
    remove_marked_objects(state);
    snapshot_positions(state);

    TickResult {
        status,
        events: state.take_events(),
    }
}

fn process_collisions(state: &mut GameState) {
    for id in check_all_collisions(state) {
        let Some(object) = state.objects.get_mut(&id) else {
            continue;
        };
        let at = object.position;

        let event = match collide(object, &mut state.player) {
            Some(CollisionOutcome::Caught) => GameEvent::player_caught(state.tick, id, at),
            Some(CollisionOutcome::GoldCollected(total)) => {
                GameEvent::gold_collected(state.tick, id, total)
            }
            Some(CollisionOutcome::CrystalCollected) => {
                GameEvent::crystal_collected(state.tick, id)
            }
            None => continue,
        };
        state.push_event(event);

        // A caught player takes no further part in this tick
        if state.player.is_marked_for_removal() {
            break;
        }
    }
}

fn check_end_conditions(state: &mut GameState) -> TickStatus {
    if state.player.is_marked_for_removal() {
        state.phase = GamePhase::Lost;
        info!(tick = state.tick, gold = state.player.gold, "game over");
        let event = GameEvent::game_over(state.tick, state.player.gold);
        state.push_event(event);
        return TickStatus::GameOver;
    }

    if state.gold_target_reached() {
        state.phase = GamePhase::Won;
        info!(tick = state.tick, gold = state.player.gold, "game won");
        let event = GameEvent::game_won(state.tick, state.player.gold);
        state.push_event(event);
        return TickStatus::Win;
    }

    TickStatus::Continue
}

fn remove_marked_objects(state: &mut GameState) {
    let marked: Vec<ObjectId> = state
        .objects
        .values()
        .filter(|o| o.is_marked_for_removal())
        .map(|o| o.id)
        .collect();

    for id in marked {
        if let Some(object) = state.objects.remove(&id) {
            debug!(object = %id, kind = ?object.kind, "object removed");
            let event = GameEvent::object_removed(state.tick, id, object.kind);
            state.push_event(event);
        }
    }
}

fn snapshot_positions(state: &mut GameState) {
    state.player.previous = state.player.position;
    for object in state.objects.values_mut() {
        object.previous = object.position;
    }
}
