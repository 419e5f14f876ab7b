#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Skirmish engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and the turn systems. Systems submit [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then reports [`Event`] values that scoring and
//! presentation react to. Nothing in here owns state; every type is a plain
//! value that can be copied between crates.

use serde::{Deserialize, Serialize};

/// Number of cells visible on either side of the player along each axis.
pub const VIEW_RADIUS: i32 = 12;

/// Half-width of the square around the origin that is cleared at world creation.
pub const SAFE_ZONE_RADIUS: i32 = VIEW_RADIUS / 2;

/// Location of a single grid cell on the unbounded board.
///
/// Coordinates wrap on overflow so that stepping past `i32::MAX` lands on
/// `i32::MIN`; equality and distances always use the signed difference, which
/// keeps the board consistent across the seam.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    /// Starting cell of the player.
    pub const ORIGIN: Self = Self::new(0, 0);

    /// Creates a new grid position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column of the cell.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row of the cell. Rows grow downwards.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the position displaced by the provided offsets.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.wrapping_add(dx),
            y: self.y.wrapping_add(dy),
        }
    }

    /// Returns the neighbouring cell in the provided direction.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        self.offset(dx, dy)
    }

    /// Signed displacement required to travel from `self` to `other`.
    #[must_use]
    pub const fn delta_to(self, other: Position) -> (i32, i32) {
        (other.x.wrapping_sub(self.x), other.y.wrapping_sub(self.y))
    }

    /// Neighbouring cell that approaches `target` on both axes at once.
    ///
    /// Each axis moves by the sign of its delta, so the step is diagonal
    /// unless the cells already share a row or column.
    #[must_use]
    pub const fn step_toward(self, target: Position) -> Self {
        let (dx, dy) = self.delta_to(target);
        self.offset(dx.signum(), dy.signum())
    }

    /// Neighbouring cell that approaches `target` along a single axis.
    #[must_use]
    pub const fn step_toward_along(self, target: Position, axis: Axis) -> Self {
        let (dx, dy) = self.delta_to(target);
        match axis {
            Axis::Horizontal => self.offset(dx.signum(), 0),
            Axis::Vertical => self.offset(0, dy.signum()),
        }
    }

    /// Largest per-axis distance between the two cells.
    #[must_use]
    pub fn chebyshev_distance(self, other: Position) -> u32 {
        let (dx, dy) = self.delta_to(other);
        dx.unsigned_abs().max(dy.unsigned_abs())
    }

    /// Axis along which `target` lies furthest away.
    ///
    /// The horizontal axis only wins when its distance is strictly larger;
    /// ties resolve to [`Axis::Vertical`].
    #[must_use]
    pub fn dominant_axis(self, target: Position) -> Axis {
        let (dx, dy) = self.delta_to(target);
        if dx.unsigned_abs() > dy.unsigned_abs() {
            Axis::Horizontal
        } else {
            Axis::Vertical
        }
    }
}

/// Cardinal directions used by the player and by projectiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing rows.
    Up,
    /// Movement toward increasing rows.
    Down,
    /// Movement toward decreasing columns.
    Left,
    /// Movement toward increasing columns.
    Right,
}

impl Direction {
    /// Every direction, in the order the keyboard lists them.
    pub const ALL: [Direction; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Unit displacement of a single step.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// Axis the direction travels along.
    #[must_use]
    pub const fn axis(self) -> Axis {
        match self {
            Self::Up | Self::Down => Axis::Vertical,
            Self::Left | Self::Right => Axis::Horizontal,
        }
    }

    /// Direction along `axis` that faces a target `delta` cells away.
    ///
    /// A zero delta faces the negative end of the axis.
    #[must_use]
    pub const fn facing(axis: Axis, delta: i32) -> Self {
        match axis {
            Axis::Horizontal if delta > 0 => Self::Right,
            Axis::Horizontal => Self::Left,
            Axis::Vertical if delta > 0 => Self::Down,
            Axis::Vertical => Self::Up,
        }
    }

    /// Direction along `axis` that strictly approaches a target `delta` cells
    /// away, or `None` when the target is already level on that axis.
    #[must_use]
    pub const fn toward(axis: Axis, delta: i32) -> Option<Self> {
        if delta == 0 {
            None
        } else {
            Some(Self::facing(axis, delta))
        }
    }
}

/// The two grid axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Columns change, rows stay fixed.
    Horizontal,
    /// Rows change, columns stay fixed.
    Vertical,
}

impl Axis {
    /// The perpendicular axis.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }

    /// Selects this axis' component of a displacement.
    #[must_use]
    pub const fn component(self, (dx, dy): (i32, i32)) -> i32 {
        match self {
            Self::Horizontal => dx,
            Self::Vertical => dy,
        }
    }

    /// The two directions that travel along this axis.
    #[must_use]
    pub const fn directions(self) -> [Direction; 2] {
        match self {
            Self::Horizontal => [Direction::Left, Direction::Right],
            Self::Vertical => [Direction::Up, Direction::Down],
        }
    }
}

/// Stable identity of an entity inside the registry.
///
/// Slots are reused once the entity that held them dies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntitySlot(u32);

impl EntitySlot {
    /// Slot reserved for the player.
    pub const PLAYER: Self = Self(0);

    /// First slot the registry scans when placing a non-player entity.
    pub const FIRST_ENEMY: Self = Self(1);

    /// Creates a new slot wrapper.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the slot.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Index of the slot inside dense storage.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// Reports whether the slot denotes the player.
    #[must_use]
    pub const fn is_player(&self) -> bool {
        self.0 == Self::PLAYER.0
    }
}

/// Half of an enemy's two-turn behaviour cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Warm-up half: walkers pause, shooters reposition, beams charge.
    Telegraph,
    /// Striking half: walkers step, shooters fire, beams sweep.
    Armed,
}

impl Phase {
    /// Phase the entity moves to after acting.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Telegraph => Self::Armed,
            Self::Armed => Self::Telegraph,
        }
    }

    /// Whether the phase is rendered with the alert colour.
    #[must_use]
    pub const fn is_alert(self) -> bool {
        matches!(self, Self::Armed)
    }
}

/// Archetype and behaviour state of an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// The player, optionally holding a shot until the next direction key.
    Player {
        /// Set after the fire key; the next direction key launches a projectile.
        aiming: bool,
    },
    /// Melee enemy that steps toward the player every other turn.
    Walker(Phase),
    /// Ranged enemy that alternates between repositioning and firing.
    Shooter(Phase),
    /// Enemy that aligns with the player and sweeps a destructive beam.
    Beam(Phase),
    /// Ammunition that travels in a straight line until it hits something.
    Projectile(Direction),
}

impl EntityKind {
    /// Kind assigned to a freshly generated walker.
    pub const SPAWNED_WALKER: Self = Self::Walker(Phase::Armed);
    /// Kind assigned to a freshly generated shooter.
    pub const SPAWNED_SHOOTER: Self = Self::Shooter(Phase::Armed);
    /// Kind assigned to a freshly generated beam enemy.
    pub const SPAWNED_BEAM: Self = Self::Beam(Phase::Telegraph);

    /// Reports whether the kind describes the player.
    #[must_use]
    pub const fn is_player(&self) -> bool {
        matches!(self, Self::Player { .. })
    }

    /// Behaviour phase for enemies, `None` for the player and projectiles.
    #[must_use]
    pub const fn phase(&self) -> Option<Phase> {
        match self {
            Self::Walker(phase) | Self::Shooter(phase) | Self::Beam(phase) => Some(*phase),
            Self::Player { .. } | Self::Projectile(_) => None,
        }
    }

    /// Same archetype moved to the provided phase; kinds without phases are
    /// returned unchanged.
    #[must_use]
    pub const fn with_phase(self, phase: Phase) -> Self {
        match self {
            Self::Walker(_) => Self::Walker(phase),
            Self::Shooter(_) => Self::Shooter(phase),
            Self::Beam(_) => Self::Beam(phase),
            other => other,
        }
    }
}

/// What a tile currently holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Occupant {
    /// Nothing; entities may move in.
    Empty,
    /// Terrain that blocks movement until destroyed.
    Wall,
    /// Back-reference to the registry slot of the entity standing here.
    Entity(EntitySlot),
}

impl Occupant {
    /// Reports whether the tile is free for movement.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Reports whether the tile is terrain.
    #[must_use]
    pub const fn is_wall(&self) -> bool {
        matches!(self, Self::Wall)
    }

    /// Registry slot referenced by the tile, if any.
    #[must_use]
    pub const fn slot(&self) -> Option<EntitySlot> {
        match self {
            Self::Entity(slot) => Some(*slot),
            Self::Empty | Self::Wall => None,
        }
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Places a new entity, killing whatever occupied the destination first.
    Spawn {
        /// Archetype and phase of the new entity.
        kind: EntityKind,
        /// Cell the entity appears in.
        at: Position,
    },
    /// Moves an entity into an empty neighbouring cell, or does nothing.
    MoveTo {
        /// Entity attempting to move.
        slot: EntitySlot,
        /// Destination cell.
        to: Position,
    },
    /// Moves an entity, killing both it and the blocker when the move fails.
    MoveOrDie {
        /// Entity attempting to move.
        slot: EntitySlot,
        /// Destination cell.
        to: Position,
    },
    /// Kills the occupant of a cell; walls are destroyed.
    Kill {
        /// Cell to clear.
        at: Position,
    },
    /// Replaces an entity's kind, typically to advance its phase.
    SetKind {
        /// Entity being updated.
        slot: EntitySlot,
        /// Kind to store.
        kind: EntityKind,
    },
    /// Clears leftover beam flags on both sides of `origin` along `axis`.
    ClearBeamTrail {
        /// Cell the scan starts next to.
        origin: Position,
        /// Axis scanned in both directions.
        axis: Axis,
    },
    /// Flags every non-wall cell from `origin` toward the first wall as
    /// about to be swept.
    TelegraphBeam {
        /// Cell the beam starts next to.
        origin: Position,
        /// Direction the beam travels.
        direction: Direction,
    },
    /// Sweeps a beam from `origin`, killing every cell up to and including
    /// the first wall.
    FireBeam {
        /// Cell the beam starts next to.
        origin: Position,
        /// Direction the beam travels.
        direction: Direction,
    },
    /// Ends the grace turn of a freshly spawned entity.
    SettleSpawn {
        /// Entity whose spawn marker is cleared.
        slot: EntitySlot,
    },
    /// Records that the presenter redrew the visible window.
    AcknowledgeRedraw,
}

/// Events reported by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// An entity was placed into the registry.
    EntitySpawned {
        /// Slot assigned to the entity.
        slot: EntitySlot,
        /// Archetype and phase of the entity.
        kind: EntityKind,
        /// Cell the entity occupies.
        at: Position,
    },
    /// An entity moved between two cells.
    EntityMoved {
        /// Entity that moved.
        slot: EntitySlot,
        /// Cell the entity left.
        from: Position,
        /// Cell the entity now occupies.
        to: Position,
    },
    /// A move was refused because the destination was occupied.
    MoveBlocked {
        /// Entity that tried to move.
        slot: EntitySlot,
        /// Destination that refused the entity.
        to: Position,
    },
    /// An entity died.
    EntityKilled {
        /// Slot of the dead entity; it is free for reuse from now on.
        slot: EntitySlot,
        /// Kind of the entity at the moment it died.
        kind: EntityKind,
        /// Cell it died in.
        at: Position,
    },
    /// A wall tile was destroyed.
    WallDestroyed {
        /// Cell that held the wall.
        at: Position,
    },
    /// An entity's kind changed.
    KindChanged {
        /// Entity that changed.
        slot: EntitySlot,
        /// Kind before the change.
        from: EntityKind,
        /// Kind after the change.
        to: EntityKind,
    },
    /// Cells were flagged as about to be swept by a beam.
    BeamTelegraphed {
        /// Cell the beam starts next to.
        origin: Position,
        /// Direction the beam travels.
        direction: Direction,
        /// Number of cells flagged.
        length: u32,
    },
    /// A beam swept across the board.
    BeamFired {
        /// Cell the beam starts next to.
        origin: Position,
        /// Direction the beam travels.
        direction: Direction,
        /// Number of cells swept, the destroyed wall included.
        length: u32,
    },
}

/// Everything the player can ask for in a single key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayerAction {
    /// Step in a direction, or release an aimed shot in that direction.
    Move(Direction),
    /// Hold the next direction key as a shot.
    Aim,
    /// Spend the turn without acting.
    Pass,
    /// Throw away the current game and start a new one.
    Restart,
    /// Leave the game.
    Quit,
    /// Show the key reference.
    Help,
}

impl PlayerAction {
    /// Whether performing the action advances the turn counter and lets
    /// enemies act.
    #[must_use]
    pub const fn spends_turn(&self) -> bool {
        matches!(self, Self::Move(_) | Self::Aim | Self::Pass)
    }
}
