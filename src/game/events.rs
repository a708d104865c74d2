//! Game Events
//!
//! Notifications the host consumes after each tick: moves to animate,
//! pickups, objects to drop from its widget tree, and the final outcome.

use serde::{Serialize, Deserialize};

use crate::core::grid::{Cell, Direction};
use crate::game::state::{ObjectId, ObjectKind};

/// Game event data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEventData {
    /// Player stepped to a neighboring cell
    PlayerMoved {
        from: Cell,
        to: Cell,
        direction: Direction,
    },

    /// Enemy wandered to a neighboring cell
    EnemyMoved {
        enemy_id: ObjectId,
        from: Cell,
        to: Cell,
    },

    /// Player picked up gold
    GoldCollected {
        object_id: ObjectId,
        total_gold: u32,
    },

    /// Player picked up a crystal
    CrystalCollected { object_id: ObjectId },

    /// Enemy reached the player
    PlayerCaught { enemy_id: ObjectId, at: Cell },

    /// Object left the live set; the host drops its widget
    ObjectRemoved { object_id: ObjectId, kind: ObjectKind },

    /// Gold target reached
    GameWon { gold: u32 },

    /// Player was caught
    GameOver { gold: u32 },
}

/// A game event stamped with the tick it happened in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    pub tick: u32,
    pub data: GameEventData,
}

impl GameEvent {
    pub fn new(tick: u32, data: GameEventData) -> Self {
        Self { tick, data }
    }

    pub fn player_moved(tick: u32, from: Cell, to: Cell, direction: Direction) -> Self {
        Self::new(tick, GameEventData::PlayerMoved { from, to, direction })
    }

    pub fn enemy_moved(tick: u32, enemy_id: ObjectId, from: Cell, to: Cell) -> Self {
        Self::new(tick, GameEventData::EnemyMoved { enemy_id, from, to })
    }

    pub fn gold_collected(tick: u32, object_id: ObjectId, total_gold: u32) -> Self {
        Self::new(tick, GameEventData::GoldCollected { object_id, total_gold })
    }

    pub fn crystal_collected(tick: u32, object_id: ObjectId) -> Self {
        Self::new(tick, GameEventData::CrystalCollected { object_id })
    }

    pub fn player_caught(tick: u32, enemy_id: ObjectId, at: Cell) -> Self {
        Self::new(tick, GameEventData::PlayerCaught { enemy_id, at })
    }

    pub fn object_removed(tick: u32, object_id: ObjectId, kind: ObjectKind) -> Self {
        Self::new(tick, GameEventData::ObjectRemoved { object_id, kind })
    }

    pub fn game_won(tick: u32, gold: u32) -> Self {
        Self::new(tick, GameEventData::GameWon { gold })
    }

    pub fn game_over(tick: u32, gold: u32) -> Self {
        Self::new(tick, GameEventData::GameOver { gold })
    }

    /// Does this event end the game?
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.data,
            GameEventData::GameWon { .. } | GameEventData::GameOver { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_events() {
        assert!(GameEvent::game_won(3, 5).is_terminal());
        assert!(GameEvent::game_over(3, 1).is_terminal());
        assert!(!GameEvent::gold_collected(3, ObjectId(1), 1).is_terminal());
    }

    #[test]
    fn test_event_json_shape() {
        let event = GameEvent::object_removed(12, ObjectId(4), ObjectKind::Gold);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["tick"], 12);
        assert_eq!(json["data"]["type"], "object_removed");
        assert_eq!(json["data"]["kind"], "gold");
    }
}
