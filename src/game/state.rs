//! Game State Definitions
//!
//! The player, the non-player objects, and the game that owns them.
//! Objects live in a BTreeMap keyed by insertion-ordered ids, so every
//! pass over them visits the same objects in the same order.

use std::collections::BTreeMap;

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::config::{ConfigError, GameConfig};
use crate::core::grid::Cell;
use crate::core::hash::{StateHash, compute_state_hash};
use crate::core::rng::DeterministicRng;
use crate::game::events::GameEvent;
use crate::game::maze::Maze;

// =============================================================================
// OBJECT ID
// =============================================================================

/// Identifier of a non-player object.
///
/// Assigned from a monotonic counter, so id order is insertion order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Variant of a non-player object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ObjectKind {
    /// Roams the maze; touching it ends the game.
    Enemy = 0,
    /// Stationary pickup counted toward the win target.
    Gold = 1,
    /// Stationary pickup that sets `has_crystal`.
    Crystal = 2,
}

impl ObjectKind {
    /// Does this kind move on its own timer?
    #[inline]
    pub fn is_mobile(self) -> bool {
        matches!(self, ObjectKind::Enemy)
    }
}

// =============================================================================
// PLAYER STATE
// =============================================================================

/// The player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Current cell
    pub position: Cell,

    /// Cell at the end of the previous tick
    pub previous: Cell,

    /// Gold pickups collected
    pub gold: u32,

    /// Has a crystal been collected?
    pub has_crystal: bool,

    marked_for_removal: bool,
}

impl PlayerState {
    /// Create a player standing on `position`.
    pub fn new(position: Cell) -> Self {
        Self {
            position,
            previous: position,
            gold: 0,
            has_crystal: false,
            marked_for_removal: false,
        }
    }

    /// Has the player been caught?
    #[inline]
    pub fn is_marked_for_removal(&self) -> bool {
        self.marked_for_removal
    }

    /// Set the one-way removal flag. Returns true only on the first call.
    pub fn mark_for_removal(&mut self) -> bool {
        !std::mem::replace(&mut self.marked_for_removal, true)
    }
}

// =============================================================================
// NON-PLAYER OBJECTS
// =============================================================================

/// An enemy or a pickup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameObject {
    pub id: ObjectId,
    pub kind: ObjectKind,

    /// Current cell
    pub position: Cell,

    /// Cell at the end of the previous tick
    pub previous: Cell,

    marked_for_removal: bool,
}

impl GameObject {
    pub fn new(id: ObjectId, kind: ObjectKind, position: Cell) -> Self {
        Self {
            id,
            kind,
            position,
            previous: position,
            marked_for_removal: false,
        }
    }

    pub fn enemy(id: ObjectId, position: Cell) -> Self {
        Self::new(id, ObjectKind::Enemy, position)
    }

    pub fn gold(id: ObjectId, position: Cell) -> Self {
        Self::new(id, ObjectKind::Gold, position)
    }

    pub fn crystal(id: ObjectId, position: Cell) -> Self {
        Self::new(id, ObjectKind::Crystal, position)
    }

    #[inline]
    pub fn is_marked_for_removal(&self) -> bool {
        self.marked_for_removal
    }

    /// Set the one-way removal flag. Returns true only on the first call.
    pub fn mark_for_removal(&mut self) -> bool {
        !std::mem::replace(&mut self.marked_for_removal, true)
    }
}

// =============================================================================
// GAME PHASE
// =============================================================================

/// Lifecycle of a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Default)]
pub enum GamePhase {
    /// Ticking
    #[default]
    Playing,
    /// Gold target reached
    Won,
    /// Player caught by an enemy
    Lost,
}

impl GamePhase {
    #[inline]
    pub fn is_terminal(self) -> bool {
        !matches!(self, GamePhase::Playing)
    }
}

// =============================================================================
// GAME STATE
// =============================================================================

/// Complete state of one game.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameState {
    /// Main-loop ticks run so far
    pub tick: u32,

    pub phase: GamePhase,

    /// Seed everything was generated from
    pub rng_seed: u64,

    /// Drives enemy wandering after setup
    pub rng: DeterministicRng,

    /// Read-only after generation
    pub maze: Maze,

    pub player: PlayerState,

    /// Live non-player objects, in insertion order
    pub objects: BTreeMap<ObjectId, GameObject>,

    /// Gold needed to win
    pub gold_target: u32,

    next_object_id: u32,

    #[serde(skip)]
    pending_events: Vec<GameEvent>,
}

impl GameState {
    /// Build a game from configuration.
    ///
    /// Generates the maze, then places the player, enemies, gold and
    /// crystals (in that order) on distinct cells drawn at random.
    pub fn new(config: &GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let rng_seed = config.seed.unwrap_or_else(DeterministicRng::entropy_seed);
        let mut rng = DeterministicRng::new(rng_seed);
        let maze = Maze::generate(config.width, config.height, &mut rng)?;

        let mut free = maze.empty_cells();
        rng.shuffle(&mut free);

        let player_cell = free.pop().ok_or(ConfigError::NotEnoughCells {
            needed: config.object_count() + 1,
            available: 0,
        })?;

        let mut state = Self {
            tick: 0,
            phase: GamePhase::Playing,
            rng_seed,
            rng,
            maze,
            player: PlayerState::new(player_cell),
            objects: BTreeMap::new(),
            gold_target: config.gold_target,
            next_object_id: 0,
            pending_events: Vec::new(),
        };

        let placements = [
            (ObjectKind::Enemy, config.enemies),
            (ObjectKind::Gold, config.gold),
            (ObjectKind::Crystal, config.crystals),
        ];
        for (kind, count) in placements {
            for _ in 0..count {
                let cell = free.pop().ok_or(ConfigError::NotEnoughCells {
                    needed: config.object_count() + 1,
                    available: state.maze.cell_count(),
                })?;
                state.spawn(kind, cell)?;
            }
        }

        debug!(
            seed = rng_seed,
            player = %player_cell,
            objects = state.objects.len(),
            "game populated"
        );

        Ok(state)
    }

    /// Build a game around an existing maze with only the player placed.
    ///
    /// Hosts and tests add objects with [`GameState::spawn`].
    pub fn with_maze(
        maze: Maze,
        player_cell: Cell,
        gold_target: u32,
        rng_seed: u64,
    ) -> Result<Self, ConfigError> {
        if gold_target == 0 {
            return Err(ConfigError::ZeroGoldTarget);
        }
        if !maze.contains(player_cell) {
            return Err(ConfigError::OutOfBounds { cell: player_cell });
        }

        Ok(Self {
            tick: 0,
            phase: GamePhase::Playing,
            rng_seed,
            rng: DeterministicRng::new(rng_seed),
            maze,
            player: PlayerState::new(player_cell),
            objects: BTreeMap::new(),
            gold_target,
            next_object_id: 0,
            pending_events: Vec::new(),
        })
    }

    /// Add a non-player object at `cell`.
    pub fn spawn(&mut self, kind: ObjectKind, cell: Cell) -> Result<ObjectId, ConfigError> {
        if !self.maze.contains(cell) {
            return Err(ConfigError::OutOfBounds { cell });
        }
        let id = ObjectId(self.next_object_id);
        self.next_object_id += 1;
        self.objects.insert(id, GameObject::new(id, kind, cell));
        Ok(id)
    }

    pub fn get_object(&self, id: ObjectId) -> Option<&GameObject> {
        self.objects.get(&id)
    }

    /// Ids of live enemies, in insertion order.
    pub fn enemy_ids(&self) -> Vec<ObjectId> {
        self.objects
            .values()
            .filter(|o| o.kind == ObjectKind::Enemy)
            .map(|o| o.id)
            .collect()
    }

    /// Number of live objects of a kind.
    pub fn count_of(&self, kind: ObjectKind) -> usize {
        self.objects.values().filter(|o| o.kind == kind).count()
    }

    #[inline]
    pub fn is_ended(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Has the player reached the gold target?
    #[inline]
    pub fn gold_target_reached(&self) -> bool {
        self.player.gold >= self.gold_target
    }

    /// Compute hash of current state for replay checks.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.tick, self.rng_seed, |hasher| {
            self.maze.hash_into(hasher);

            hasher.update_cell(self.player.position);
            hasher.update_u32(self.player.gold);
            hasher.update_bool(self.player.has_crystal);
            hasher.update_bool(self.player.is_marked_for_removal());

            for object in self.objects.values() {
                hasher.update_u32(object.id.0);
                hasher.update_u8(object.kind as u8);
                hasher.update_cell(object.position);
                hasher.update_bool(object.is_marked_for_removal());
            }

            hasher.update_u8(self.phase as u8);
        })
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Push a game event.
    pub fn push_event(&mut self, event: GameEvent) {
        self.pending_events.push(event);
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn config(seed: u64) -> GameConfig {
        GameConfig {
            seed: Some(seed),
            ..GameConfig::default()
        }
    }

    #[test]
    fn test_new_places_every_object_on_distinct_cells() {
        let state = GameState::new(&config(12345)).unwrap();

        assert_eq!(state.count_of(ObjectKind::Enemy), 5);
        assert_eq!(state.count_of(ObjectKind::Gold), 5);
        assert_eq!(state.count_of(ObjectKind::Crystal), 5);

        let mut cells: Vec<Cell> = state.objects.values().map(|o| o.position).collect();
        cells.push(state.player.position);
        let unique: std::collections::BTreeSet<_> = cells.iter().collect();
        assert_eq!(unique.len(), cells.len());
    }

    #[test]
    fn test_ids_follow_insertion_order() {
        let state = GameState::new(&config(7)).unwrap();
        let kinds: Vec<ObjectKind> = state.objects.values().map(|o| o.kind).collect();

        let mut sorted = kinds.clone();
        sorted.sort();
        assert_eq!(kinds, sorted, "enemies, then gold, then crystals");

        let ids: Vec<u32> = state.objects.keys().map(|id| id.0).collect();
        assert_eq!(ids, (0..15).collect::<Vec<_>>());
    }

    #[test]
    fn test_setup_determinism() {
        let a = GameState::new(&config(99)).unwrap();
        let b = GameState::new(&config(99)).unwrap();
        assert_eq!(a.player, b.player);
        assert_eq!(a.objects, b.objects);
        assert_eq!(a.compute_hash(), b.compute_hash());

        let c = GameState::new(&config(100)).unwrap();
        assert_ne!(a.compute_hash(), c.compute_hash());
    }

    #[test]
    fn test_too_many_objects_fails_fast() {
        let cfg = GameConfig {
            width: 2,
            height: 2,
            enemies: 2,
            gold: 2,
            crystals: 0,
            gold_target: 1,
            seed: Some(1),
            ..GameConfig::default()
        };
        assert!(matches!(
            GameState::new(&cfg),
            Err(ConfigError::NotEnoughCells { needed: 5, available: 4 })
        ));
    }

    #[test]
    fn test_spawn_out_of_bounds_rejected() {
        let maze = Maze::generate_seeded(3, 3, 1).unwrap();
        let mut state = GameState::with_maze(maze, Cell::new(0, 0), 1, 1).unwrap();
        assert!(state.spawn(ObjectKind::Gold, Cell::new(3, 0)).is_err());
        assert!(state.objects.is_empty());
    }

    #[test]
    fn test_with_maze_rejects_bad_player_cell() {
        let maze = Maze::generate_seeded(3, 3, 1).unwrap();
        assert!(matches!(
            GameState::with_maze(maze, Cell::new(5, 5), 1, 1),
            Err(ConfigError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_mark_for_removal_is_one_way() {
        let mut player = PlayerState::new(Cell::new(0, 0));
        assert!(!player.is_marked_for_removal());
        assert!(player.mark_for_removal());
        assert!(!player.mark_for_removal());
        assert!(player.is_marked_for_removal());

        let mut gold = GameObject::gold(ObjectId(0), Cell::new(1, 1));
        assert!(gold.mark_for_removal());
        assert!(!gold.mark_for_removal());
    }

    #[test]
    fn test_only_enemies_are_mobile() {
        assert!(ObjectKind::Enemy.is_mobile());
        assert!(!ObjectKind::Gold.is_mobile());
        assert!(!ObjectKind::Crystal.is_mobile());
    }
}
