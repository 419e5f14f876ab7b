#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy behaviour system that advances a single entity by one update.
//!
//! Every enemy alternates between two phases. The system reads the entity
//! and the player through world queries, then issues the commands that
//! realise the transition. Commands are applied one at a time because later
//! decisions depend on earlier outcomes: a shooter only falls back to a
//! straight step when its diagonal step was refused, and a beam enemy only
//! telegraphs once its move has brought it level with the player.

use skirmish_core::{Axis, Command, Direction, EntityKind, EntitySlot, Event, Phase, Position};
use skirmish_world::{self as world, query, World};
use tracing::trace;

/// Axis a beam enemy walks along while lining up its shot.
pub const BEAM_TRAVEL_AXIS: Axis = Axis::Horizontal;

/// Axis a beam enemy fires along, perpendicular to its travel.
pub const BEAM_FIRE_AXIS: Axis = BEAM_TRAVEL_AXIS.other();

/// System that runs the per-entity state machine.
#[derive(Debug, Default)]
pub struct EnemyAi;

impl EnemyAi {
    /// Creates the behaviour system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Advances the entity in `slot` by one update, targeting the player's
    /// current position.
    ///
    /// Dead entities and the player are left untouched. Events raised by the
    /// issued commands are appended to `out_events`.
    pub fn update(&self, world: &mut World, slot: EntitySlot, out_events: &mut Vec<Event>) {
        let entity = query::entity(world, slot);
        if entity.dead {
            return;
        }

        let target = query::player(world).position;
        let mut actor = Actor {
            world,
            slot,
            position: entity.position,
            out_events,
        };
        trace!(slot = slot.get(), kind = ?entity.kind, "enemy update");

        match entity.kind {
            EntityKind::Player { .. } => {}
            EntityKind::Walker(phase) => actor.walker(phase, target),
            EntityKind::Projectile(direction) => {
                let to = actor.position.step(direction);
                actor.issue(Command::MoveOrDie { slot, to });
            }
            EntityKind::Shooter(phase) => actor.shooter(phase, target),
            EntityKind::Beam(phase) => actor.beam(phase, target),
        }
    }
}

struct Actor<'a> {
    world: &'a mut World,
    slot: EntitySlot,
    position: Position,
    out_events: &'a mut Vec<Event>,
}

impl Actor<'_> {
    fn issue(&mut self, command: Command) {
        world::apply(self.world, command, self.out_events);
    }

    fn set_kind(&mut self, kind: EntityKind) {
        let slot = self.slot;
        self.issue(Command::SetKind { slot, kind });
    }

    /// Moves into `to` if it is empty and reports whether the move happened.
    fn try_move(&mut self, to: Position) -> bool {
        if to == self.position {
            return false;
        }

        let slot = self.slot;
        self.issue(Command::MoveTo { slot, to });
        self.position = query::entity(self.world, slot).position;
        self.position == to
    }

    fn walker(&mut self, phase: Phase, target: Position) {
        self.set_kind(EntityKind::Walker(phase.next()));
        if phase == Phase::Armed {
            let slot = self.slot;
            let to = self.position.step_toward(target);
            self.issue(Command::MoveOrDie { slot, to });
        }
    }

    fn shooter(&mut self, phase: Phase, target: Position) {
        self.set_kind(EntityKind::Shooter(phase.next()));
        let axis = self.position.dominant_axis(target);

        match phase {
            Phase::Telegraph => {
                if self.try_move(self.position.step_toward(target)) {
                    return;
                }
                for axis in [axis, axis.other()] {
                    if self.try_move(self.position.step_toward_along(target, axis)) {
                        return;
                    }
                }
            }
            Phase::Armed => {
                let delta = axis.component(self.position.delta_to(target));
                let direction = Direction::facing(axis, delta);
                let at = self.position.step(direction);
                self.issue(Command::Spawn {
                    kind: EntityKind::Projectile(direction),
                    at,
                });
            }
        }
    }

    fn beam(&mut self, phase: Phase, target: Position) {
        match phase {
            Phase::Telegraph => {
                let origin = self.position;
                self.issue(Command::ClearBeamTrail {
                    origin,
                    axis: BEAM_FIRE_AXIS,
                });
                let _ = self.try_move(origin.step_toward_along(target, BEAM_TRAVEL_AXIS));

                let delta = self.position.delta_to(target);
                if BEAM_TRAVEL_AXIS.component(delta) != 0 {
                    return;
                }
                let along = BEAM_FIRE_AXIS.component(delta);
                let Some(direction) = Direction::toward(BEAM_FIRE_AXIS, along) else {
                    return;
                };
                let origin = self.position;
                self.issue(Command::TelegraphBeam { origin, direction });
                self.set_kind(EntityKind::Beam(Phase::Armed));
            }
            Phase::Armed => {
                let delta = self.position.delta_to(target);
                if let Some(direction) =
                    Direction::toward(BEAM_FIRE_AXIS, BEAM_FIRE_AXIS.component(delta))
                {
                    let origin = self.position;
                    self.issue(Command::FireBeam { origin, direction });
                }
                self.set_kind(EntityKind::Beam(Phase::Telegraph));
            }
        }
    }
}
