//! Movement
//!
//! Every move is checked against the maze. Illegal moves change nothing and
//! report `false`; they are not errors.

use tracing::trace;

use crate::core::grid::{Cell, Direction};
use crate::core::rng::DeterministicRng;
use crate::game::events::GameEvent;
use crate::game::maze::Maze;
use crate::game::state::{GameObject, GameState, ObjectId, PlayerState};

impl PlayerState {
    /// Step one cell in `direction` if the maze allows it.
    pub fn try_move(&mut self, maze: &Maze, direction: Direction) -> bool {
        if self.is_marked_for_removal() || !maze.can_move(self.position, direction) {
            return false;
        }
        match maze.neighbor(self.position, direction) {
            Some(next) => {
                self.position = next;
                true
            }
            None => false,
        }
    }
}

impl GameObject {
    /// Step in a direction chosen uniformly among the open ones.
    ///
    /// Only enemies wander. Returns the `(from, to)` pair when the object
    /// moved; `None` for pickups, removed objects, or a sealed cell.
    pub fn wander(&mut self, maze: &Maze, rng: &mut DeterministicRng) -> Option<(Cell, Cell)> {
        if !self.kind.is_mobile() || self.is_marked_for_removal() {
            return None;
        }

        let open: Vec<Direction> = maze.open_directions(self.position).collect();
        let direction = *rng.choose(&open)?;
        let next = maze.neighbor(self.position, direction)?;

        let from = self.position;
        self.position = next;
        Some((from, next))
    }
}

/// Apply a directional input to the player.
///
/// Ignored once the game has ended.
pub fn move_player(state: &mut GameState, direction: Direction) -> bool {
    if state.is_ended() {
        return false;
    }

    let from = state.player.position;
    if !state.player.try_move(&state.maze, direction) {
        trace!(%from, %direction, "player move blocked");
        return false;
    }

    let to = state.player.position;
    trace!(%from, %to, "player moved");
    let event = GameEvent::player_moved(state.tick, from, to, direction);
    state.push_event(event);
    true
}

/// Move one enemy on its own timer.
///
/// Returns false for unknown ids, pickups, and after the game has ended.
pub fn move_enemy(state: &mut GameState, id: ObjectId) -> bool {
    if state.is_ended() {
        return false;
    }

    let Some(object) = state.objects.get_mut(&id) else {
        return false;
    };

    match object.wander(&state.maze, &mut state.rng) {
        Some((from, to)) => {
            trace!(enemy = %id, %from, %to, "enemy moved");
            let event = GameEvent::enemy_moved(state.tick, id, from, to);
            state.push_event(event);
            true
        }
        None => false,
    }
}

/// Move every live enemy once, in id order. Returns how many moved.
pub fn move_all_enemies(state: &mut GameState) -> usize {
    state
        .enemy_ids()
        .into_iter()
        .filter(|id| move_enemy(state, *id))
        .count()
}
