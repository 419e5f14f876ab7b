use skirmish_core::{Command, Direction, EntityKind, EntitySlot, Event, Occupant, Phase, Position};
use skirmish_system_enemy_ai::EnemyAi;
use skirmish_system_scoring::Scoring;
use skirmish_world::{self as world, query, ScriptedDice, World};

fn world_with(dice: ScriptedDice) -> World {
    World::with_dice(Box::new(dice))
}

fn spawn(world: &mut World, kind: EntityKind, at: Position) -> EntitySlot {
    let mut events = Vec::new();
    world::apply(world, Command::Spawn { kind, at }, &mut events);
    events
        .iter()
        .find_map(|event| match event {
            Event::EntitySpawned { slot, at: spawned, .. } if *spawned == at => Some(*slot),
            _ => None,
        })
        .expect("spawn command reports the new slot")
}

fn update(world: &mut World, slot: EntitySlot) -> Vec<Event> {
    let mut events = Vec::new();
    EnemyAi::new().update(world, slot, &mut events);
    events
}

#[test]
fn armed_walker_steps_toward_player_and_flips_phase() {
    let mut world = world_with(ScriptedDice::new());
    let walker = spawn(&mut world, EntityKind::SPAWNED_WALKER, Position::new(2, 0));

    let _ = update(&mut world, walker);

    let snapshot = query::entity(&world, walker);
    assert_eq!(snapshot.position, Position::new(1, 0));
    assert_eq!(snapshot.kind, EntityKind::Walker(Phase::Telegraph));
    assert_eq!(world.tile(Position::new(2, 0)).occupant(), Occupant::Empty);
    assert_eq!(world.tile(Position::new(1, 0)).occupant(), Occupant::Entity(walker));
}

#[test]
fn telegraphing_walker_only_changes_phase() {
    let mut world = world_with(ScriptedDice::new());
    let walker = spawn(
        &mut world,
        EntityKind::Walker(Phase::Telegraph),
        Position::new(-3, 4),
    );

    let events = update(&mut world, walker);

    assert_eq!(
        events,
        vec![Event::KindChanged {
            slot: walker,
            from: EntityKind::Walker(Phase::Telegraph),
            to: EntityKind::Walker(Phase::Armed),
        }]
    );
    assert_eq!(query::entity(&world, walker).position, Position::new(-3, 4));
}

#[test]
fn blocked_walker_dies_with_its_blocker_and_pays_out() {
    let mut world = world_with(ScriptedDice::new());
    let shooter = spawn(&mut world, EntityKind::SPAWNED_SHOOTER, Position::new(1, 0));
    let walker = spawn(&mut world, EntityKind::SPAWNED_WALKER, Position::new(2, 0));

    let events = update(&mut world, walker);
    let mut scoring = Scoring::new();
    scoring.handle(&events);

    assert!(query::entity(&world, walker).dead);
    assert!(query::entity(&world, shooter).dead);
    assert_eq!(world.tile(Position::new(1, 0)).occupant(), Occupant::Empty);
    assert_eq!(world.tile(Position::new(2, 0)).occupant(), Occupant::Empty);
    assert_eq!(scoring.total(), 45 + 85);
}

#[test]
fn walker_running_into_wall_destroys_it() {
    let wall = Position::new(19, 0);
    let mut world = world_with(ScriptedDice::new().with_wall(wall));
    let walker = spawn(&mut world, EntityKind::SPAWNED_WALKER, Position::new(20, 0));

    let events = update(&mut world, walker);

    assert!(events.contains(&Event::WallDestroyed { at: wall }));
    assert!(query::entity(&world, walker).dead);
    assert_eq!(world.tile(wall).occupant(), Occupant::Empty);
}

#[test]
fn projectile_travels_until_it_hits_something() {
    let wall = Position::new(10, 3);
    let mut world = world_with(ScriptedDice::new().with_wall(wall));
    let bullet = spawn(
        &mut world,
        EntityKind::Projectile(Direction::Right),
        Position::new(8, 3),
    );

    let _ = update(&mut world, bullet);
    assert_eq!(query::entity(&world, bullet).position, Position::new(9, 3));
    assert_eq!(
        query::entity(&world, bullet).kind,
        EntityKind::Projectile(Direction::Right)
    );

    let _ = update(&mut world, bullet);
    assert!(query::entity(&world, bullet).dead);
    assert_eq!(world.tile(wall).occupant(), Occupant::Empty);
}

#[test]
fn projectile_kills_the_player_on_contact() {
    let mut world = world_with(ScriptedDice::new());
    let bullet = spawn(
        &mut world,
        EntityKind::Projectile(Direction::Up),
        Position::new(0, 1),
    );

    let events = update(&mut world, bullet);

    assert!(query::player(&world).dead);
    assert!(query::entity(&world, bullet).dead);
    assert!(events.iter().any(|event| matches!(
        event,
        Event::EntityKilled { slot, .. } if *slot == EntitySlot::PLAYER
    )));
}

#[test]
fn telegraphing_shooter_closes_diagonally() {
    let mut world = world_with(ScriptedDice::new());
    let shooter = spawn(
        &mut world,
        EntityKind::Shooter(Phase::Telegraph),
        Position::new(4, 3),
    );

    let _ = update(&mut world, shooter);

    let snapshot = query::entity(&world, shooter);
    assert_eq!(snapshot.position, Position::new(3, 2));
    assert_eq!(snapshot.kind, EntityKind::Shooter(Phase::Armed));
}

#[test]
fn blocked_shooter_falls_back_to_dominant_axis_then_the_other() {
    let mut world = world_with(ScriptedDice::new());
    let shooter = spawn(
        &mut world,
        EntityKind::Shooter(Phase::Telegraph),
        Position::new(5, 2),
    );
    let _ = spawn(&mut world, EntityKind::SPAWNED_WALKER, Position::new(4, 1));

    let _ = update(&mut world, shooter);
    assert_eq!(query::entity(&world, shooter).position, Position::new(4, 2));

    let mut world = world_with(ScriptedDice::new());
    let shooter = spawn(
        &mut world,
        EntityKind::Shooter(Phase::Telegraph),
        Position::new(5, 2),
    );
    let _ = spawn(&mut world, EntityKind::SPAWNED_WALKER, Position::new(4, 1));
    let _ = spawn(&mut world, EntityKind::SPAWNED_WALKER, Position::new(4, 2));

    let _ = update(&mut world, shooter);
    assert_eq!(query::entity(&world, shooter).position, Position::new(5, 1));
}

#[test]
fn armed_shooter_fires_along_the_dominant_axis() {
    let mut world = world_with(ScriptedDice::new());
    let shooter = spawn(&mut world, EntityKind::SPAWNED_SHOOTER, Position::new(1, -5));

    let events = update(&mut world, shooter);

    let spawned = Position::new(1, -4);
    let bullet = world
        .tile(spawned)
        .occupant()
        .slot()
        .expect("projectile placed next to the shooter");
    assert_eq!(
        query::entity(&world, bullet).kind,
        EntityKind::Projectile(Direction::Down)
    );
    assert!(query::entity(&world, bullet).just_spawned);
    assert_eq!(
        query::entity(&world, shooter).kind,
        EntityKind::Shooter(Phase::Telegraph)
    );
    assert_eq!(query::entity(&world, shooter).position, Position::new(1, -5));
    assert!(events.contains(&Event::EntitySpawned {
        slot: bullet,
        kind: EntityKind::Projectile(Direction::Down),
        at: spawned,
    }));
}

#[test]
fn beam_enemy_aligns_telegraphs_and_fires() {
    let wall = Position::new(0, 9);
    let mut world = world_with(ScriptedDice::new().with_wall(wall));
    let beam = spawn(&mut world, EntityKind::SPAWNED_BEAM, Position::new(1, -8));
    let bystander = spawn(
        &mut world,
        EntityKind::Walker(Phase::Telegraph),
        Position::new(0, -4),
    );

    let _ = update(&mut world, beam);

    let snapshot = query::entity(&world, beam);
    assert_eq!(snapshot.position, Position::new(0, -8));
    assert_eq!(snapshot.kind, EntityKind::Beam(Phase::Armed));
    for y in -7..=8 {
        assert!(world.tile(Position::new(0, y)).beam_pending(), "row {y}");
    }
    assert!(!world.tile(wall).beam_pending());

    let events = update(&mut world, beam);
    let mut scoring = Scoring::new();
    scoring.handle(&events);

    assert!(query::player(&world).dead);
    assert!(query::entity(&world, bystander).dead);
    assert!(scoring.player_killed());
    assert_eq!(scoring.total(), 45);
    assert_eq!(world.tile(wall).occupant(), Occupant::Empty);
    for y in -7..=8 {
        let tile = world.tile(Position::new(0, y));
        assert!(tile.beam_active());
        assert!(!tile.beam_pending());
    }
    assert_eq!(
        query::entity(&world, beam).kind,
        EntityKind::Beam(Phase::Telegraph)
    );
}

#[test]
fn charging_beam_enemy_out_of_line_keeps_charging() {
    let mut world = world_with(ScriptedDice::new());
    let beam = spawn(&mut world, EntityKind::SPAWNED_BEAM, Position::new(5, 5));

    let events = update(&mut world, beam);

    assert_eq!(query::entity(&world, beam).position, Position::new(4, 5));
    assert_eq!(
        query::entity(&world, beam).kind,
        EntityKind::Beam(Phase::Telegraph)
    );
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::BeamTelegraphed { .. })));
}

#[test]
fn charging_clears_the_previous_sweep() {
    // The first wall is consumed by the shot; the second bounds the next telegraph.
    let dice = ScriptedDice::new()
        .with_wall(Position::new(0, 9))
        .with_wall(Position::new(0, 12));
    let mut world = world_with(dice);
    let beam = spawn(&mut world, EntityKind::SPAWNED_BEAM, Position::new(0, -8));

    let _ = update(&mut world, beam);
    let _ = update(&mut world, beam);
    assert!(world.tile(Position::new(0, 3)).beam_active());

    let _ = update(&mut world, beam);
    for y in -7..=8 {
        let tile = world.tile(Position::new(0, y));
        assert!(!tile.beam_active(), "row {y}");
    }
}

#[test]
fn dead_entities_are_skipped() {
    let mut world = world_with(ScriptedDice::new());
    let walker = spawn(&mut world, EntityKind::SPAWNED_WALKER, Position::new(3, 3));
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::Kill {
            at: Position::new(3, 3),
        },
        &mut events,
    );

    assert!(update(&mut world, walker).is_empty());
}
