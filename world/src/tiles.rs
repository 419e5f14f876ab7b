//! Sparse storage for generated tiles.

use std::{collections::HashMap, ops::RangeInclusive};

use skirmish_core::{EntityKind, Occupant, Position};

use crate::dice::TileRoll;

/// Terrain value that produces a wall.
pub(crate) const WALL_ROLL: u32 = 0;
/// Spawn value that places a shooter.
pub(crate) const SHOOTER_ROLL: u32 = 5;
/// Spawn value that places a beam enemy.
pub(crate) const BEAM_ROLL: u32 = 6;
/// Spawn values that place a walker.
pub(crate) const WALKER_ROLLS: RangeInclusive<u32> = 11..=13;

/// Persistent state of one generated grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tile {
    pub(crate) occupant: Occupant,
    pub(crate) beam_pending: bool,
    pub(crate) beam_active: bool,
}

impl Tile {
    fn from_roll(roll: TileRoll) -> Self {
        let occupant = if roll.terrain == WALL_ROLL {
            Occupant::Wall
        } else {
            Occupant::Empty
        };
        Self {
            occupant,
            beam_pending: false,
            beam_active: false,
        }
    }

    /// What the tile currently holds.
    #[must_use]
    pub const fn occupant(&self) -> Occupant {
        self.occupant
    }

    /// Whether the tile lies on a telegraphed beam that has not fired yet.
    #[must_use]
    pub const fn beam_pending(&self) -> bool {
        self.beam_pending
    }

    /// Whether the tile was swept by the most recent beam through it.
    #[must_use]
    pub const fn beam_active(&self) -> bool {
        self.beam_active
    }
}

/// Maps a spawn value to the enemy it places, if any.
pub(crate) fn spawn_for_roll(spawn: u32) -> Option<EntityKind> {
    match spawn {
        SHOOTER_ROLL => Some(EntityKind::SPAWNED_SHOOTER),
        BEAM_ROLL => Some(EntityKind::SPAWNED_BEAM),
        value if WALKER_ROLLS.contains(&value) => Some(EntityKind::SPAWNED_WALKER),
        _ => None,
    }
}

#[derive(Debug, Default)]
pub(crate) struct TileStore {
    tiles: HashMap<Position, Tile>,
}

impl TileStore {
    pub(crate) fn contains(&self, at: Position) -> bool {
        self.tiles.contains_key(&at)
    }

    /// Stores the terrain of a new tile and returns the enemy it spawns.
    pub(crate) fn generate(&mut self, at: Position, roll: TileRoll) -> Option<EntityKind> {
        debug_assert!(!self.contains(at), "tile {at:?} generated twice");
        let _ = self.tiles.insert(at, Tile::from_roll(roll));
        spawn_for_roll(roll.spawn)
    }

    pub(crate) fn get(&self, at: Position) -> Option<&Tile> {
        self.tiles.get(&at)
    }

    pub(crate) fn get_mut(&mut self, at: Position) -> Option<&mut Tile> {
        self.tiles.get_mut(&at)
    }

    pub(crate) fn len(&self) -> usize {
        self.tiles.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (Position, Tile)> + '_ {
        self.tiles.iter().map(|(at, tile)| (*at, *tile))
    }
}
