//! Collision Detection
//!
//! Overlap is cell-based. The player and an object overlap when they share
//! a cell. For a mobile object, a move since the previous tick onto the
//! cell the other one held also counts: the player stepping into the cell
//! an enemy just left, an enemy stepping into the cell the player just
//! left, or both at once (passing through each other in a corridor).

use crate::game::state::{GameObject, GameState, ObjectId, ObjectKind, PlayerState};

/// What a collision did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollisionOutcome {
    /// Enemy caught the player
    Caught,
    /// Gold picked up, carrying the new total
    GoldCollected(u32),
    /// Crystal picked up
    CrystalCollected,
}

/// Do the player and an object overlap this tick?
pub fn overlaps(player: &PlayerState, object: &GameObject) -> bool {
    if object.position == player.position {
        return true;
    }

    object.kind.is_mobile()
        && (object.previous == player.position || object.position == player.previous)
}

/// Resolve a collision between the player and `object`.
///
/// Dispatches on the object's kind. Objects already marked for removal,
/// and a player who is already caught, produce nothing.
pub fn collide(object: &mut GameObject, player: &mut PlayerState) -> Option<CollisionOutcome> {
    if object.is_marked_for_removal() || player.is_marked_for_removal() {
        return None;
    }

    match object.kind {
        ObjectKind::Enemy => {
            player.mark_for_removal();
            Some(CollisionOutcome::Caught)
        }
        ObjectKind::Gold => {
            object.mark_for_removal();
            player.gold += 1;
            Some(CollisionOutcome::GoldCollected(player.gold))
        }
        ObjectKind::Crystal => {
            object.mark_for_removal();
            player.has_crystal = true;
            Some(CollisionOutcome::CrystalCollected)
        }
    }
}

/// Ids of live objects overlapping the player, in insertion order.
pub fn check_all_collisions(state: &GameState) -> Vec<ObjectId> {
    state
        .objects
        .values()
        .filter(|object| !object.is_marked_for_removal())
        .filter(|object| overlaps(&state.player, object))
        .map(|object| object.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grid::Cell;

    #[test]
    fn test_same_cell_overlaps() {
        let player = PlayerState::new(Cell::new(2, 2));
        let gold = GameObject::gold(ObjectId(0), Cell::new(2, 2));
        let far = GameObject::gold(ObjectId(1), Cell::new(2, 3));
        assert!(overlaps(&player, &gold));
        assert!(!overlaps(&player, &far));
    }

    #[test]
    fn test_swapped_cells_overlap_for_enemies() {
        let mut player = PlayerState::new(Cell::new(1, 0));
        player.previous = Cell::new(0, 0);

        let mut enemy = GameObject::enemy(ObjectId(0), Cell::new(0, 0));
        enemy.previous = Cell::new(1, 0);
        assert!(overlaps(&player, &enemy));

        // A stationary pickup cannot swap
        let mut gold = GameObject::gold(ObjectId(1), Cell::new(0, 0));
        gold.previous = Cell::new(1, 0);
        assert!(!overlaps(&player, &gold));
    }

    #[test]
    fn test_player_steps_into_cell_enemy_just_left() {
        let mut player = PlayerState::new(Cell::new(1, 0));
        player.previous = Cell::new(0, 0);

        let mut enemy = GameObject::enemy(ObjectId(0), Cell::new(2, 0));
        enemy.previous = Cell::new(1, 0);
        assert!(overlaps(&player, &enemy));
    }

    #[test]
    fn test_enemy_steps_into_cell_player_just_left() {
        let mut player = PlayerState::new(Cell::new(2, 0));
        player.previous = Cell::new(1, 0);

        let mut enemy = GameObject::enemy(ObjectId(0), Cell::new(1, 0));
        enemy.previous = Cell::new(0, 0);
        assert!(overlaps(&player, &enemy));
    }

    #[test]
    fn test_adjacent_stationary_enemy_does_not_overlap() {
        let player = PlayerState::new(Cell::new(0, 0));
        let enemy = GameObject::enemy(ObjectId(0), Cell::new(1, 0));
        assert!(!overlaps(&player, &enemy));

        // Moving apart is not contact
        let mut player = PlayerState::new(Cell::new(0, 0));
        player.previous = Cell::new(1, 0);
        let mut enemy = GameObject::enemy(ObjectId(0), Cell::new(3, 0));
        enemy.previous = Cell::new(2, 0);
        assert!(!overlaps(&player, &enemy));
    }

    #[test]
    fn test_gold_collision_counts_once() {
        let mut player = PlayerState::new(Cell::new(0, 0));
        let mut gold = GameObject::gold(ObjectId(0), Cell::new(0, 0));

        assert_eq!(collide(&mut gold, &mut player), Some(CollisionOutcome::GoldCollected(1)));
        assert!(gold.is_marked_for_removal());
        assert_eq!(player.gold, 1);

        assert_eq!(collide(&mut gold, &mut player), None);
        assert_eq!(player.gold, 1);
    }

    #[test]
    fn test_crystal_collision() {
        let mut player = PlayerState::new(Cell::new(0, 0));
        let mut crystal = GameObject::crystal(ObjectId(0), Cell::new(0, 0));

        assert_eq!(collide(&mut crystal, &mut player), Some(CollisionOutcome::CrystalCollected));
        assert!(player.has_crystal);
        assert!(crystal.is_marked_for_removal());
    }

    #[test]
    fn test_enemy_collision_marks_player() {
        let mut player = PlayerState::new(Cell::new(0, 0));
        let mut enemy = GameObject::enemy(ObjectId(0), Cell::new(0, 0));

        assert_eq!(collide(&mut enemy, &mut player), Some(CollisionOutcome::Caught));
        assert!(player.is_marked_for_removal());
        assert!(!enemy.is_marked_for_removal());

        // Caught players collect nothing
        let mut gold = GameObject::gold(ObjectId(1), Cell::new(0, 0));
        assert_eq!(collide(&mut gold, &mut player), None);
        assert_eq!(player.gold, 0);
    }
}
