#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Skirmish.
//!
//! The world owns two stores that reference each other: the sparse tile
//! map, which records what stands on each visited cell, and the entity
//! registry, which records where each entity is and what it is doing. Every
//! mutation goes through [`apply`] so that the two stay consistent: a live
//! entity is referenced by exactly one tile, the one at its position.
//!
//! Tiles are generated lazily the first time they are looked at, including
//! by read-only callers such as the renderer, so even reads take `&mut World`.

mod dice;
mod registry;
mod tiles;

use rand_chacha::ChaCha8Rng;
use skirmish_core::{
    Axis, Command, Direction, EntityKind, EntitySlot, Event, Occupant, Position, SAFE_ZONE_RADIUS,
    VIEW_RADIUS,
};
use tracing::{debug, trace};

pub use dice::{ScriptedDice, SeededDice, TileDice, TileRoll, SPAWN_SIDES, TERRAIN_SIDES};
pub use tiles::Tile;

use self::registry::{Entity, EntityRegistry};
use self::tiles::TileStore;

/// Represents the authoritative Skirmish world state.
#[derive(Debug)]
pub struct World {
    tiles: TileStore,
    entities: EntityRegistry,
    dice: Box<dyn TileDice>,
    pacing: ChaCha8Rng,
    needs_redraw: bool,
    pending_events: Vec<Event>,
}

impl World {
    /// Creates a world whose terrain is generated from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::with_dice(Box::new(SeededDice::new(seed)))
    }

    /// Creates a world whose terrain is generated from the provided dice.
    ///
    /// The player is placed at the origin and every tile within
    /// [`SAFE_ZONE_RADIUS`] of it is cleared, so the first turns are never
    /// spent boxed in. Kills made while clearing are not reported.
    #[must_use]
    pub fn with_dice(dice: Box<dyn TileDice>) -> Self {
        let player = Entity::spawned(EntityKind::Player { aiming: false }, Position::ORIGIN);
        let mut world = Self {
            tiles: TileStore::default(),
            entities: EntityRegistry::with_player(player),
            dice,
            pacing: dice::pacing_stream(),
            needs_redraw: true,
            pending_events: Vec::new(),
        };

        world.kill(Position::ORIGIN);
        world.tile_mut(Position::ORIGIN).occupant = Occupant::Entity(EntitySlot::PLAYER);
        for x in -SAFE_ZONE_RADIUS..=SAFE_ZONE_RADIUS {
            for y in -SAFE_ZONE_RADIUS..=SAFE_ZONE_RADIUS {
                if x != 0 || y != 0 {
                    world.kill(Position::new(x, y));
                }
            }
        }
        world.pending_events.clear();
        world
    }

    /// Returns the tile at `at`, generating it on first access.
    ///
    /// Generating a tile may spawn an enemy on it; the resulting events are
    /// delivered by the next call to [`apply`].
    pub fn tile(&mut self, at: Position) -> Tile {
        self.ensure_tile(at);
        *self
            .tiles
            .get(at)
            .expect("tile exists once it has been generated")
    }

    /// Reserved random stream for spawn pacing. No rule consumes it yet.
    pub fn pacing_rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.pacing
    }

    fn ensure_tile(&mut self, at: Position) {
        if self.tiles.contains(at) {
            return;
        }

        let roll = self.dice.roll(at);
        trace!(?at, terrain = roll.terrain, spawn = roll.spawn, "tile generated");
        if let Some(kind) = self.tiles.generate(at, roll) {
            let _ = self.insert_entity(kind, at, EntitySlot::FIRST_ENEMY);
        }
    }

    fn tile_mut(&mut self, at: Position) -> &mut Tile {
        self.ensure_tile(at);
        let player = self.entities.get(EntitySlot::PLAYER).position;
        if player.chebyshev_distance(at) <= VIEW_RADIUS.unsigned_abs() {
            self.needs_redraw = true;
        }
        self.tiles
            .get_mut(at)
            .expect("tile exists once it has been generated")
    }

    fn insert_entity(&mut self, kind: EntityKind, at: Position, start: EntitySlot) -> EntitySlot {
        self.kill(at);
        let slot = self.entities.claim(start, Entity::spawned(kind, at));
        self.tile_mut(at).occupant = Occupant::Entity(slot);
        debug!(slot = slot.get(), ?kind, ?at, "entity spawned");
        self.pending_events
            .push(Event::EntitySpawned { slot, kind, at });
        slot
    }

    fn move_to(&mut self, slot: EntitySlot, to: Position) -> bool {
        let from = self.entities.get(slot).position;
        debug_assert!(!self.entities.get(slot).dead, "dead entities never move");

        if !self.tile(to).occupant.is_empty() {
            self.pending_events.push(Event::MoveBlocked { slot, to });
            return false;
        }

        self.tile_mut(from).occupant = Occupant::Empty;
        self.entities.get_mut(slot).position = to;
        self.tile_mut(to).occupant = Occupant::Entity(slot);
        self.needs_redraw = true;
        self.pending_events
            .push(Event::EntityMoved { slot, from, to });
        true
    }

    fn move_or_die(&mut self, slot: EntitySlot, to: Position) {
        if !self.move_to(slot, to) {
            let from = self.entities.get(slot).position;
            debug!(slot = slot.get(), ?from, ?to, "contact kill");
            self.kill(from);
            self.kill(to);
        }
    }

    fn kill(&mut self, at: Position) {
        match self.tile(at).occupant {
            Occupant::Entity(slot) => {
                let entity = self.entities.get_mut(slot);
                debug_assert!(!entity.dead, "tiles never reference dead entities");
                if !entity.dead {
                    entity.dead = true;
                    let kind = entity.kind;
                    debug!(slot = slot.get(), ?kind, ?at, "entity killed");
                    self.pending_events
                        .push(Event::EntityKilled { slot, kind, at });
                }
            }
            Occupant::Wall => self.pending_events.push(Event::WallDestroyed { at }),
            Occupant::Empty => {}
        }
        self.tile_mut(at).occupant = Occupant::Empty;
    }

    fn set_kind(&mut self, slot: EntitySlot, kind: EntityKind) {
        let entity = self.entities.get_mut(slot);
        let from = entity.kind;
        entity.kind = kind;
        if from != kind {
            self.pending_events.push(Event::KindChanged {
                slot,
                from,
                to: kind,
            });
        }
    }

    fn clear_beam_trail(&mut self, origin: Position, axis: Axis) {
        for direction in axis.directions() {
            let mut cursor = origin.step(direction);
            loop {
                let tile = self.tile(cursor);
                if !tile.beam_active && !tile.beam_pending {
                    break;
                }
                let tile = self.tile_mut(cursor);
                tile.beam_active = false;
                tile.beam_pending = false;
                cursor = cursor.step(direction);
            }
        }
    }

    fn telegraph_beam(&mut self, origin: Position, direction: Direction) {
        let mut cursor = origin.step(direction);
        let mut length = 0;
        while !self.tile(cursor).occupant.is_wall() {
            self.tile_mut(cursor).beam_pending = true;
            length += 1;
            cursor = cursor.step(direction);
        }
        self.pending_events.push(Event::BeamTelegraphed {
            origin,
            direction,
            length,
        });
    }

    fn fire_beam(&mut self, origin: Position, direction: Direction) {
        let mut cursor = origin.step(direction);
        let mut length = 0;
        while !self.tile(cursor).occupant.is_wall() {
            self.kill(cursor);
            let tile = self.tile_mut(cursor);
            tile.beam_pending = false;
            tile.beam_active = true;
            length += 1;
            cursor = cursor.step(direction);
        }
        self.kill(cursor);
        length += 1;
        debug!(?origin, ?direction, length, "beam fired");
        self.pending_events.push(Event::BeamFired {
            origin,
            direction,
            length,
        });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Events raised by the command, and by any tile generation that happened
/// since the previous call, are appended to `out_events` in the order they
/// occurred.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Spawn { kind, at } => {
            let _ = world.insert_entity(kind, at, EntitySlot::FIRST_ENEMY);
        }
        Command::MoveTo { slot, to } => {
            let _ = world.move_to(slot, to);
        }
        Command::MoveOrDie { slot, to } => world.move_or_die(slot, to),
        Command::Kill { at } => world.kill(at),
        Command::SetKind { slot, kind } => world.set_kind(slot, kind),
        Command::ClearBeamTrail { origin, axis } => world.clear_beam_trail(origin, axis),
        Command::TelegraphBeam { origin, direction } => world.telegraph_beam(origin, direction),
        Command::FireBeam { origin, direction } => world.fire_beam(origin, direction),
        Command::SettleSpawn { slot } => world.entities.get_mut(slot).just_spawned = false,
        Command::AcknowledgeRedraw => world.needs_redraw = false,
    }
    out_events.append(&mut world.pending_events);
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use skirmish_core::{EntityKind, EntitySlot, Position};

    use super::{Tile, World};

    /// Immutable representation of a single entity's state used for queries.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct EntitySnapshot {
        /// Registry slot holding the entity.
        pub slot: EntitySlot,
        /// Cell the entity occupies, or last occupied if it is dead.
        pub position: Position,
        /// Archetype and phase of the entity.
        pub kind: EntityKind,
        /// Set until the end of the turn the entity was created in.
        pub just_spawned: bool,
        /// Tombstone marker; the slot may be reused.
        pub dead: bool,
    }

    /// Captures the state of the entity in `slot`.
    ///
    /// # Panics
    ///
    /// Panics if `slot` lies past the end of the registry.
    #[must_use]
    pub fn entity(world: &World, slot: EntitySlot) -> EntitySnapshot {
        let entity = world.entities.get(slot);
        EntitySnapshot {
            slot,
            position: entity.position,
            kind: entity.kind,
            just_spawned: entity.just_spawned,
            dead: entity.dead,
        }
    }

    /// Captures the state of the player.
    #[must_use]
    pub fn player(world: &World) -> EntitySnapshot {
        entity(world, EntitySlot::PLAYER)
    }

    /// Number of slots in the registry, dead ones included.
    #[must_use]
    pub fn entity_count(world: &World) -> usize {
        world.entities.len()
    }

    /// Captures every live entity in ascending slot order.
    #[must_use]
    pub fn live_entities(world: &World) -> Vec<EntitySnapshot> {
        (0..world.entities.len())
            .filter_map(|index| u32::try_from(index).ok())
            .map(|raw| entity(world, EntitySlot::new(raw)))
            .filter(|snapshot| !snapshot.dead)
            .collect()
    }

    /// Returns the tile at `at` without generating it.
    #[must_use]
    pub fn peek_tile(world: &World, at: Position) -> Option<Tile> {
        world.tiles.get(at).copied()
    }

    /// Number of tiles generated so far.
    #[must_use]
    pub fn generated_tile_count(world: &World) -> usize {
        world.tiles.len()
    }

    /// Iterates over every generated tile in unspecified order.
    pub fn tiles(world: &World) -> impl Iterator<Item = (Position, Tile)> + '_ {
        world.tiles.iter()
    }

    /// Reports whether something within view changed since the last redraw.
    #[must_use]
    pub fn needs_redraw(world: &World) -> bool {
        world.needs_redraw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::Phase;

    fn open_world() -> World {
        World::with_dice(Box::new(ScriptedDice::new()))
    }

    fn run(world: &mut World, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, command, &mut events);
        events
    }

    #[test]
    fn construction_places_player_and_clears_safe_zone() {
        let dice = ScriptedDice::new()
            .with_wall(Position::new(2, 2))
            .with_roll(Position::new(-3, 1), TileRoll::SHOOTER);
        let mut world = World::with_dice(Box::new(dice));

        let player = query::player(&world);
        assert_eq!(player.position, Position::ORIGIN);
        assert_eq!(
            world.tile(Position::ORIGIN).occupant(),
            Occupant::Entity(EntitySlot::PLAYER)
        );
        assert_eq!(world.tile(Position::new(2, 2)).occupant(), Occupant::Empty);
        assert_eq!(world.tile(Position::new(-3, 1)).occupant(), Occupant::Empty);
        assert_eq!(query::live_entities(&world).len(), 1);

        let side = usize::try_from(2 * SAFE_ZONE_RADIUS + 1).expect("positive");
        assert_eq!(query::generated_tile_count(&world), side * side);
        assert!(run(&mut world, Command::AcknowledgeRedraw).is_empty());
    }

    #[test]
    fn generation_is_memoised() {
        let mut world = World::new(7);
        let far = Position::new(40, -40);
        let first = world.tile(far);
        for offset in 0..50 {
            let _ = world.tile(Position::new(100 + offset, 3));
        }
        assert_eq!(world.tile(far), first);
    }

    #[test]
    fn generation_spawns_enemy_over_rolled_terrain() {
        let spawn_at = Position::new(20, 0);
        let roll = TileRoll {
            terrain: 0,
            spawn: TileRoll::SHOOTER.spawn,
        };
        let mut world = World::with_dice(Box::new(ScriptedDice::new().with_roll(spawn_at, roll)));

        let tile = world.tile(spawn_at);
        let slot = tile.occupant().slot().expect("shooter spawned on the tile");
        assert_eq!(query::entity(&world, slot).kind, EntityKind::SPAWNED_SHOOTER);
        assert!(query::entity(&world, slot).just_spawned);

        let events = run(&mut world, Command::AcknowledgeRedraw);
        assert!(events.contains(&Event::EntitySpawned {
            slot,
            kind: EntityKind::SPAWNED_SHOOTER,
            at: spawn_at,
        }));
    }

    #[test]
    fn pacing_stream_does_not_depend_on_the_terrain_seed() {
        use rand::RngCore;

        let mut first = World::new(1);
        let mut second = World::new(2);
        assert_eq!(first.pacing_rng().next_u64(), second.pacing_rng().next_u64());
    }

    #[test]
    fn move_into_wall_fails_without_mutation() {
        let wall = Position::new(10, 0);
        let mut world = World::with_dice(Box::new(ScriptedDice::new().with_wall(wall)));
        let slot = EntitySlot::new(1);
        let _ = run(
            &mut world,
            Command::Spawn {
                kind: EntityKind::SPAWNED_WALKER,
                at: Position::new(9, 0),
            },
        );

        let events = run(&mut world, Command::MoveTo { slot, to: wall });
        assert_eq!(events, vec![Event::MoveBlocked { slot, to: wall }]);
        assert_eq!(query::entity(&world, slot).position, Position::new(9, 0));
        assert_eq!(world.tile(wall).occupant(), Occupant::Wall);
    }

    #[test]
    fn successful_move_updates_both_tiles() {
        let mut world = open_world();
        let from = Position::new(8, 8);
        let to = Position::new(9, 9);
        let _ = run(
            &mut world,
            Command::Spawn {
                kind: EntityKind::SPAWNED_WALKER,
                at: from,
            },
        );
        let slot = EntitySlot::new(1);

        let events = run(&mut world, Command::MoveTo { slot, to });
        assert_eq!(events, vec![Event::EntityMoved { slot, from, to }]);
        assert_eq!(world.tile(from).occupant(), Occupant::Empty);
        assert_eq!(world.tile(to).occupant(), Occupant::Entity(slot));
        let references = query::tiles(&world)
            .filter(|(_, tile)| tile.occupant() == Occupant::Entity(slot))
            .count();
        assert_eq!(references, 1);
    }

    #[test]
    fn move_or_die_into_wall_kills_mover_and_destroys_wall() {
        let wall = Position::new(10, 0);
        let mut world = World::with_dice(Box::new(ScriptedDice::new().with_wall(wall)));
        let _ = run(
            &mut world,
            Command::Spawn {
                kind: EntityKind::Walker(Phase::Telegraph),
                at: Position::new(9, 0),
            },
        );
        let slot = EntitySlot::new(1);

        let events = run(&mut world, Command::MoveOrDie { slot, to: wall });
        assert!(events.contains(&Event::WallDestroyed { at: wall }));
        assert!(query::entity(&world, slot).dead);
        assert_eq!(world.tile(wall).occupant(), Occupant::Empty);
        assert_eq!(world.tile(Position::new(9, 0)).occupant(), Occupant::Empty);
    }

    #[test]
    fn spawn_kills_previous_occupant_and_reuses_its_slot() {
        let mut world = open_world();
        let at = Position::new(3, 0);
        let _ = run(
            &mut world,
            Command::Spawn {
                kind: EntityKind::SPAWNED_SHOOTER,
                at,
            },
        );
        let events = run(
            &mut world,
            Command::Spawn {
                kind: EntityKind::Projectile(Direction::Right),
                at,
            },
        );

        let first = EntitySlot::new(1);
        let second = EntitySlot::new(2);
        assert_eq!(
            events,
            vec![
                Event::EntityKilled {
                    slot: first,
                    kind: EntityKind::SPAWNED_SHOOTER,
                    at,
                },
                Event::EntitySpawned {
                    slot: first,
                    kind: EntityKind::Projectile(Direction::Right),
                    at,
                },
            ]
        );
        assert_eq!(world.tile(at).occupant(), Occupant::Entity(first));
        assert_eq!(query::entity_count(&world), 2);

        let _ = run(
            &mut world,
            Command::Spawn {
                kind: EntityKind::SPAWNED_WALKER,
                at: Position::new(4, 0),
            },
        );
        assert_eq!(world.tile(Position::new(4, 0)).occupant(), Occupant::Entity(second));
    }

    #[test]
    fn fire_beam_sweeps_until_and_including_wall() {
        // Beyond the safe zone so the wall survives construction.
        let wall = Position::new(0, -9);
        let mut world = World::with_dice(Box::new(ScriptedDice::new().with_wall(wall)));
        let _ = run(
            &mut world,
            Command::Spawn {
                kind: EntityKind::SPAWNED_WALKER,
                at: Position::new(0, -8),
            },
        );

        let origin = Position::new(0, -1);
        let events = run(
            &mut world,
            Command::FireBeam {
                origin,
                direction: Direction::Up,
            },
        );

        assert!(events.contains(&Event::WallDestroyed { at: wall }));
        assert!(events.contains(&Event::BeamFired {
            origin,
            direction: Direction::Up,
            length: 8,
        }));
        assert!(query::entity(&world, EntitySlot::new(1)).dead);
        for y in -8..=-2 {
            let tile = world.tile(Position::new(0, y));
            assert!(tile.beam_active());
            assert_eq!(tile.occupant(), Occupant::Empty);
        }
        assert_eq!(world.tile(wall).occupant(), Occupant::Empty);
        assert!(!world.tile(wall).beam_active());
    }

    #[test]
    fn telegraph_flags_cells_and_trail_clearing_removes_them() {
        let wall = Position::new(0, 9);
        let mut world = World::with_dice(Box::new(ScriptedDice::new().with_wall(wall)));
        let origin = Position::new(0, 2);
        let events = run(
            &mut world,
            Command::TelegraphBeam {
                origin,
                direction: Direction::Down,
            },
        );
        assert_eq!(
            events,
            vec![Event::BeamTelegraphed {
                origin,
                direction: Direction::Down,
                length: 6,
            }]
        );
        assert!(world.tile(Position::new(0, 8)).beam_pending());
        assert!(!world.tile(wall).beam_pending());

        let _ = run(
            &mut world,
            Command::ClearBeamTrail {
                origin,
                axis: Axis::Vertical,
            },
        );
        for y in 3..=8 {
            assert!(!world.tile(Position::new(0, y)).beam_pending());
        }
    }

    #[test]
    fn redraw_gate_tracks_writes_near_the_player() {
        let mut world = open_world();
        assert!(query::needs_redraw(&world));
        let _ = run(&mut world, Command::AcknowledgeRedraw);
        assert!(!query::needs_redraw(&world));

        let _ = run(
            &mut world,
            Command::Kill {
                at: Position::new(-40, 0),
            },
        );
        assert!(!query::needs_redraw(&world));

        let _ = run(
            &mut world,
            Command::Kill {
                at: Position::new(-VIEW_RADIUS, VIEW_RADIUS),
            },
        );
        assert!(query::needs_redraw(&world));
    }
}
