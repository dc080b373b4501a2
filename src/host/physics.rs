//! Rapier as the broad phase.
//!
//! Rapier does no dynamics here. The character is a kinematic ball sensor
//! whose transform is copied from the core every frame; enemies, collectibles
//! and gates are fixed sensors tagged with [`LevelBody`]. The only output
//! used is `CollisionEvent::Started`, which becomes a core overlap.
//!
//! ## Collision groups
//!
//! | Layer | Group | Collides with |
//! |-------|-------|---------------|
//! | Character | GROUP_1 | GROUP_2 |
//! | Level bodies | GROUP_2 | GROUP_1 |
//!
//! Level bodies never report overlaps with each other.

use bevy::prelude::*;
use bevy_rapier2d::geometry::Group;
use bevy_rapier2d::prelude::*;

use super::{to_world, ActiveRun};
use crate::config::TuningConfig;
use crate::constants::{
    CHARACTER_RADIUS, COLLECTIBLE_RADIUS, ENEMY_RADIUS, GATE_HALF_HEIGHT, GATE_HALF_WIDTH,
};
use crate::level::{BodyRef, Level};

/// Marker for the single launched character.
#[derive(Component)]
pub struct Character;

/// Links a sensor entity to the level body it stands for.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelBody(pub BodyRef);

/// Level generation the current sensor entities were built from.
#[derive(Resource, Default, Debug)]
pub struct SpawnedLevel(pub Option<u64>);

fn character_groups() -> CollisionGroups {
    CollisionGroups::new(Group::GROUP_1, Group::GROUP_2)
}

fn level_body_groups() -> CollisionGroups {
    CollisionGroups::new(Group::GROUP_2, Group::GROUP_1)
}

// ── Spawning ──────────────────────────────────────────────────────────────────

pub fn spawn_character(mut commands: Commands, run: Res<ActiveRun>) {
    let position = to_world(run.0.state().character.position);
    commands.spawn((
        Character,
        Transform::from_translation(position.extend(1.0)),
        Visibility::default(),
        RigidBody::KinematicPositionBased,
        Collider::ball(CHARACTER_RADIUS),
        Sensor,
        character_groups(),
        // Kinematic character against collider-only (fixed) level sensors.
        ActiveCollisionTypes::KINEMATIC_STATIC,
        ActiveEvents::COLLISION_EVENTS,
    ));
}

fn spawn_level_body(commands: &mut Commands, body: BodyRef, position: Vec2, collider: Collider) {
    commands.spawn((
        LevelBody(body),
        Transform::from_translation(position.extend(0.0)),
        Visibility::default(),
        collider,
        Sensor,
        level_body_groups(),
        ActiveCollisionTypes::KINEMATIC_STATIC,
        ActiveEvents::COLLISION_EVENTS,
    ));
}

fn spawn_level(commands: &mut Commands, level: &Level, config: &TuningConfig) {
    for (i, enemy) in level.enemies.iter().enumerate().filter(|(_, e)| e.active) {
        spawn_level_body(
            commands,
            BodyRef::Enemy(i),
            to_world(enemy.position),
            Collider::ball(ENEMY_RADIUS),
        );
    }
    for (i, collectible) in level.collectibles.iter().enumerate().filter(|(_, c)| c.active) {
        spawn_level_body(
            commands,
            BodyRef::Collectible(i),
            to_world(collectible.position),
            Collider::ball(COLLECTIBLE_RADIUS),
        );
    }
    let gate_center_y = config.window_height as f32 / 2.0;
    for (i, gate) in level.gates.iter().enumerate().filter(|(_, g)| g.active) {
        spawn_level_body(
            commands,
            BodyRef::Gate(i),
            to_world(Vec2::new(gate.boundary_position, gate_center_y)),
            Collider::cuboid(GATE_HALF_WIDTH, GATE_HALF_HEIGHT),
        );
    }
}

/// Rebuild all level sensors whenever the run switches to a new level.
pub fn respawn_level_system(
    mut commands: Commands,
    run: Res<ActiveRun>,
    mut spawned: ResMut<SpawnedLevel>,
    q_bodies: Query<Entity, With<LevelBody>>,
) {
    let generation = run.0.level_generation();
    if spawned.0 == Some(generation) {
        return;
    }

    for entity in q_bodies.iter() {
        commands.entity(entity).despawn();
    }
    spawn_level(&mut commands, run.0.level(), run.0.config());
    spawned.0 = Some(generation);
    debug!("Spawned level generation {generation}");
}

// ── Sync ──────────────────────────────────────────────────────────────────────

/// Despawn sensors for bodies the core has deactivated and move the rest
/// (collectibles drift under the magnet).
pub fn sync_level_bodies_system(
    mut commands: Commands,
    run: Res<ActiveRun>,
    mut q_bodies: Query<(Entity, &LevelBody, &mut Transform)>,
) {
    let level = run.0.level();
    for (entity, body, mut transform) in q_bodies.iter_mut() {
        if !level.is_active(body.0) {
            commands.entity(entity).despawn();
            continue;
        }
        if let (BodyRef::Collectible(_), Some(position)) = (body.0, level.position_of(body.0)) {
            let world = to_world(position);
            if transform.translation.truncate() != world {
                transform.translation.x = world.x;
                transform.translation.y = world.y;
            }
        }
    }
}

pub fn sync_character_system(
    run: Res<ActiveRun>,
    mut q_character: Query<&mut Transform, With<Character>>,
) {
    let Ok(mut transform) = q_character.single_mut() else {
        return;
    };
    let world = to_world(run.0.state().character.position);
    transform.translation.x = world.x;
    transform.translation.y = world.y;
}

// ── Overlaps ──────────────────────────────────────────────────────────────────

/// Turn character ↔ level-body contacts into core overlap reports.
pub fn overlap_event_system(
    mut collision_events: MessageReader<CollisionEvent>,
    q_character: Query<Entity, With<Character>>,
    q_bodies: Query<&LevelBody>,
    mut run: ResMut<ActiveRun>,
) {
    let Ok(character) = q_character.single() else {
        return;
    };

    for event in collision_events.read() {
        let (e1, e2) = match event {
            CollisionEvent::Started(e1, e2, _) => (*e1, *e2),
            CollisionEvent::Stopped(..) => continue,
        };

        let other = if e1 == character {
            e2
        } else if e2 == character {
            e1
        } else {
            continue;
        };

        if let Ok(body) = q_bodies.get(other) {
            run.0.on_overlap(body.0);
        }
    }
}
