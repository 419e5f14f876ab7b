//! Random streams that drive procedural tile generation.

use std::{collections::HashMap, fmt};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use skirmish_core::Position;

use crate::tiles::{BEAM_ROLL, SHOOTER_ROLL, WALKER_ROLLS, WALL_ROLL};

/// Largest terrain value a roll may carry.
pub const TERRAIN_SIDES: u32 = 4;

/// Largest spawn value a roll may carry.
pub const SPAWN_SIDES: u32 = 210;

/// Seed of the reserved spawn-pacing stream.
const PACING_SEED: u64 = 0;

/// The two draws consumed by a freshly generated tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileRoll {
    /// Value in `0..=TERRAIN_SIDES`; zero produces a wall.
    pub terrain: u32,
    /// Value in `0..=SPAWN_SIDES`; a few reserved values spawn enemies.
    pub spawn: u32,
}

impl TileRoll {
    /// Roll that produces an empty tile with nothing on it.
    pub const EMPTY: Self = Self {
        terrain: 1,
        spawn: 0,
    };

    /// Roll that produces a bare wall.
    pub const WALL: Self = Self {
        terrain: WALL_ROLL,
        spawn: 0,
    };

    /// Roll that spawns a walker on an otherwise empty tile.
    pub const WALKER: Self = Self {
        terrain: 1,
        spawn: *WALKER_ROLLS.start(),
    };

    /// Roll that spawns a shooter on an otherwise empty tile.
    pub const SHOOTER: Self = Self {
        terrain: 1,
        spawn: SHOOTER_ROLL,
    };

    /// Roll that spawns a beam enemy on an otherwise empty tile.
    pub const BEAM: Self = Self {
        terrain: 1,
        spawn: BEAM_ROLL,
    };
}

/// Source of the draws consumed by every freshly generated tile.
///
/// Generation asks for exactly one roll per new tile, whatever the outcome,
/// so two worlds fed the same sequence of rolls generate identical tiles in
/// the order they were first visited.
pub trait TileDice: fmt::Debug {
    /// Produces the roll for the tile about to be generated at `at`.
    fn roll(&mut self, at: Position) -> TileRoll;
}

/// Production dice backed by a seeded ChaCha stream.
///
/// The stream is positional only in the sense of visit order; the location
/// itself is ignored.
#[derive(Clone, Debug)]
pub struct SeededDice {
    rng: ChaCha8Rng,
}

impl SeededDice {
    /// Creates dice whose draws are fully determined by `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl TileDice for SeededDice {
    fn roll(&mut self, _at: Position) -> TileRoll {
        let terrain = self.rng.gen_range(0..=TERRAIN_SIDES);
        let spawn = self.rng.gen_range(0..=SPAWN_SIDES);
        TileRoll { terrain, spawn }
    }
}

/// Dice that return hand-placed rolls, used to build fixed layouts.
///
/// Every location without an explicit roll generates as [`TileRoll::EMPTY`].
#[derive(Clone, Debug, Default)]
pub struct ScriptedDice {
    rolls: HashMap<Position, TileRoll>,
    consumed: usize,
}

impl ScriptedDice {
    /// Creates dice that generate an open, empty board.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Places the provided roll at `at`.
    #[must_use]
    pub fn with_roll(mut self, at: Position, roll: TileRoll) -> Self {
        let _ = self.rolls.insert(at, roll);
        self
    }

    /// Places a wall at `at`.
    #[must_use]
    pub fn with_wall(self, at: Position) -> Self {
        self.with_roll(at, TileRoll::WALL)
    }

    /// Number of rolls handed out so far.
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.consumed
    }
}

impl TileDice for ScriptedDice {
    fn roll(&mut self, at: Position) -> TileRoll {
        self.consumed += 1;
        self.rolls.get(&at).copied().unwrap_or(TileRoll::EMPTY)
    }
}

/// Creates the reserved spawn-pacing stream.
///
/// No rule consumes it yet; it is kept separate from the tile dice so that
/// future pacing never perturbs terrain generation.
pub(crate) fn pacing_stream() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(PACING_SEED)
}
