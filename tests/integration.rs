//! Integration tests for the controller on the Rapier2D backend.
//!
//! These tests run the full plugin stack against real Rapier colliders.
//! Frame pacing follows the app clock, so assertions check where bodies come
//! to rest rather than per-tick motion.

use bevy::prelude::*;
use bevy::time::Virtual;
use bevy_rapier2d::prelude::*;
use raycast_controller_2d::prelude::*;

#[cfg(feature = "rapier2d")]
use raycast_controller_2d::rapier::{Rapier2dBackend, Rapier2dCharacterBundle};

const HALF_EXTENTS: Vec2 = Vec2::new(0.5, 1.0);

/// Create a minimal test app with physics and character controller.
fn create_test_app() -> App {
    let mut app = App::new();

    app.add_plugins(MinimalPlugins);
    app.add_plugins(TransformPlugin);
    app.add_plugins(RapierPhysicsPlugin::<NoUserData>::default());
    app.add_plugins(RaycastControllerPlugin::<Rapier2dBackend>::default());
    app.insert_resource(Time::<Fixed>::from_hz(60.0));

    app.finish();
    app.cleanup();
    app
}

/// Spawn a static box collider.
fn spawn_box(app: &mut App, center: Vec2, half_size: Vec2) -> Entity {
    let transform = Transform::from_translation(center.extend(0.0));
    app.world_mut()
        .spawn((
            transform,
            GlobalTransform::from(transform),
            RigidBody::Fixed,
            Collider::cuboid(half_size.x, half_size.y),
        ))
        .id()
}

/// Spawn a static ground whose top surface is at `top`.
fn spawn_ground(app: &mut App, top: f32) -> Entity {
    spawn_box(app, Vec2::new(0.0, top - 0.5), Vec2::new(50.0, 0.5))
}

/// Spawn a player driven by the platformer integrator.
fn spawn_player(app: &mut App, position: Vec2) -> Entity {
    let transform = Transform::from_translation(position.extend(0.0));
    app.world_mut()
        .spawn((
            transform,
            GlobalTransform::from(transform),
            PlatformerConfig::default(),
            Rapier2dCharacterBundle::new(),
            Collider::cuboid(HALF_EXTENTS.x, HALF_EXTENTS.y),
        ))
        .id()
}

/// Run one physics frame.
fn tick(app: &mut App) {
    let timestep = std::time::Duration::from_secs_f64(1.0 / 60.0);
    app.world_mut()
        .resource_mut::<Time<Virtual>>()
        .advance_by(timestep);
    app.update();
    app.world_mut().run_schedule(bevy::prelude::FixedUpdate);
    app.update();
}

/// Run the app for N physics frames.
fn run_frames(app: &mut App, frames: usize) {
    for _ in 0..frames {
        tick(app);
    }
}

fn position(app: &App, entity: Entity) -> Vec2 {
    app.world()
        .get::<Transform>(entity)
        .unwrap()
        .translation
        .xy()
}

fn set_input(app: &mut App, entity: Entity, input: Vec2) {
    app.world_mut()
        .get_mut::<PlatformerIntent>(entity)
        .unwrap()
        .set_input(input);
}

mod setup {
    use super::*;

    #[test]
    fn bounds_and_spacing_follow_collider() {
        let mut app = create_test_app();
        let player = spawn_player(&mut app, Vec2::new(2.0, 5.0));

        tick(&mut app);

        let world = app.world();
        let bounds = world.get::<BodyBounds>(player).unwrap();
        assert!((bounds.half_extents - HALF_EXTENTS).abs().max_element() < 1e-4);
        assert!(world.get::<RaySpacing>(player).is_some());
    }
}

mod ground {
    use super::*;

    #[test]
    fn falling_player_lands_on_ground() {
        let mut app = create_test_app();
        spawn_ground(&mut app, 0.0);
        let player = spawn_player(&mut app, Vec2::new(0.0, 3.0));

        run_frames(&mut app, 180);

        let pos = position(&app, player);
        assert!(
            (pos.y - HALF_EXTENTS.y).abs() < 0.02,
            "feet should rest on the ground, got center y = {}",
            pos.y
        );

        let world = app.world();
        assert!(world.get::<Grounded>(player).is_some());
        assert!(world.get::<Airborne>(player).is_none());
    }

    #[test]
    fn player_over_empty_space_keeps_falling() {
        let mut app = create_test_app();
        let player = spawn_player(&mut app, Vec2::new(0.0, 0.0));

        run_frames(&mut app, 30);

        assert!(position(&app, player).y < -0.5);
        assert!(app.world().get::<Airborne>(player).is_some());
    }

    #[test]
    fn sensors_do_not_block() {
        let mut app = create_test_app();
        spawn_ground(&mut app, 0.0);
        let transform = Transform::from_xyz(0.0, 1.5, 0.0);
        app.world_mut().spawn((
            transform,
            GlobalTransform::from(transform),
            RigidBody::Fixed,
            Collider::cuboid(5.0, 0.25),
            Sensor,
        ));
        let player = spawn_player(&mut app, Vec2::new(0.0, 4.0));

        run_frames(&mut app, 180);

        assert!((position(&app, player).y - HALF_EXTENTS.y).abs() < 0.02);
    }
}

mod walls {
    use super::*;

    #[test]
    fn wall_on_right_blocks_walking() {
        let mut app = create_test_app();
        spawn_ground(&mut app, 0.0);
        spawn_box(&mut app, Vec2::new(3.5, 2.0), Vec2::new(0.5, 2.0));
        let player = spawn_player(&mut app, Vec2::new(0.0, HALF_EXTENTS.y));

        set_input(&mut app, player, Vec2::X);
        run_frames(&mut app, 180);

        let pos = position(&app, player);
        assert!(
            (pos.x - 2.5).abs() < 0.02,
            "player should stop at the wall, got x = {}",
            pos.x
        );

        let wall = app
            .world()
            .get::<TouchingWall>(player)
            .expect("player should touch the wall");
        assert!(wall.is_right());
    }

    #[test]
    fn wall_on_left_blocks_walking() {
        let mut app = create_test_app();
        spawn_ground(&mut app, 0.0);
        spawn_box(&mut app, Vec2::new(-3.5, 2.0), Vec2::new(0.5, 2.0));
        let player = spawn_player(&mut app, Vec2::new(0.0, HALF_EXTENTS.y));

        set_input(&mut app, player, Vec2::NEG_X);
        run_frames(&mut app, 180);

        assert!((position(&app, player).x + 2.5).abs() < 0.02);
        assert!(app.world().get::<TouchingWall>(player).unwrap().is_left());
    }
}

mod one_way {
    use super::*;

    fn spawn_one_way(app: &mut App, top: f32) -> Entity {
        let platform = spawn_box(app, Vec2::new(0.0, top - 0.05), Vec2::new(5.0, 0.05));
        app.world_mut().entity_mut(platform).insert(OneWayPlatform);
        platform
    }

    #[test]
    fn player_lands_on_one_way_platform() {
        let mut app = create_test_app();
        spawn_ground(&mut app, -3.0);
        spawn_one_way(&mut app, 0.0);
        let player = spawn_player(&mut app, Vec2::new(0.0, 3.0));

        run_frames(&mut app, 180);

        assert!((position(&app, player).y - HALF_EXTENTS.y).abs() < 0.02);
        assert!(app.world().get::<Grounded>(player).is_some());
    }

    #[test]
    fn holding_down_drops_through() {
        let mut app = create_test_app();
        spawn_ground(&mut app, -3.0);
        spawn_one_way(&mut app, 0.0);
        let player = spawn_player(&mut app, Vec2::new(0.0, 2.0));
        run_frames(&mut app, 120);
        assert!((position(&app, player).y - HALF_EXTENTS.y).abs() < 0.02);

        set_input(&mut app, player, Vec2::NEG_Y);
        run_frames(&mut app, 180);

        let pos = position(&app, player);
        assert!(
            (pos.y - (-3.0 + HALF_EXTENTS.y)).abs() < 0.02,
            "player should end on the ground below, got y = {}",
            pos.y
        );
    }

    #[test]
    fn solid_ground_is_never_dropped_through() {
        let mut app = create_test_app();
        spawn_ground(&mut app, 0.0);
        let player = spawn_player(&mut app, Vec2::new(0.0, HALF_EXTENTS.y));

        set_input(&mut app, player, Vec2::NEG_Y);
        run_frames(&mut app, 120);

        assert!((position(&app, player).y - HALF_EXTENTS.y).abs() < 0.02);
        assert!(app.world().get::<Grounded>(player).is_some());
    }
}
