//! Input Handling
//!
//! Host key events arrive by name. Arrow keys map to directions and move
//! the player on the spot, with no queue or debounce. Any other key is
//! ignored.

use crate::core::grid::Direction;
use crate::game::movement::move_player;
use crate::game::state::GameState;

/// What a key press did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Not a movement key
    Ignored,
    /// Movement key, but a wall (or a finished game) blocked it
    Blocked(Direction),
    /// Player stepped in this direction
    Moved(Direction),
}

/// Map a host key name to a direction.
///
/// Accepts the arrow names `up`, `down`, `left`, `right`.
pub fn key_direction(key: &str) -> Option<Direction> {
    key.parse().ok()
}

/// Apply a key press to the game.
pub fn handle_key(state: &mut GameState, key: &str) -> KeyOutcome {
    let Some(direction) = key_direction(key) else {
        return KeyOutcome::Ignored;
    };

    if move_player(state, direction) {
        KeyOutcome::Moved(direction)
    } else {
        KeyOutcome::Blocked(direction)
    }
}
