//! Rapier2D physics backend implementation.
//!
//! This module provides the physics backend for Bevy Rapier2D.
//! Enable with the `rapier2d` feature.
//!
//! Controlled bodies are kinematic: Rapier only answers ray casts against
//! the level colliders, and the controller moves the body's `Transform`
//! itself. Colliders tagged with [`OneWayPlatform`] are reported as one-way
//! surfaces.

use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

use crate::backend::{CharacterPhysicsBackend, RaycastQuery};
use crate::collision::{OneWayPlatform, RayHit, SurfaceKind};
use crate::config::ControllerConfig;
use crate::intent::{MoveRequest, ResolvedMove};
use crate::spacing::{BodyBounds, RaySpacing};
use crate::state::CollisionState;
use crate::systems::resolve_request;
use crate::ControllerSet;

/// Longest ray handed to Rapier. Unbounded casts are clamped to it.
pub const MAX_RAY_DISTANCE: f32 = 1.0e6;

/// Rapier2D physics backend for the raycast controller.
///
/// Bounds come from the body's [`Collider`], ray casts go through the
/// [`RapierContext`] with the body itself and all sensors excluded.
pub struct Rapier2dBackend;

impl CharacterPhysicsBackend for Rapier2dBackend {
    fn plugin() -> impl Plugin {
        Rapier2dBackendPlugin
    }
}

/// Plugin that sets up Rapier2D-specific systems for the character controller.
pub struct Rapier2dBackendPlugin;

impl Plugin for Rapier2dBackendPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<OneWayPlatform>();

        app.add_systems(
            FixedUpdate,
            sync_collider_bounds
                .in_set(ControllerSet::Prepare)
                .before(crate::systems::refresh_ray_spacing),
        );
        app.add_systems(FixedUpdate, rapier_resolve.in_set(ControllerSet::Resolve));
    }
}

/// Local axis-aligned box of a collider: center offset and half extents.
///
/// Uses the collider's scaled shape, so a scaled entity gets scaled bounds
/// once Rapier has synced the scale.
pub fn collider_local_bounds(collider: &Collider) -> (Vec2, Vec2) {
    let aabb = collider.raw.compute_local_aabb();
    let center = aabb.center();
    let half_extents = aabb.half_extents();
    (
        Vec2::new(center.x, center.y),
        Vec2::new(half_extents.x, half_extents.y),
    )
}

/// Write [`BodyBounds`] from each controlled body's collider.
pub fn sync_collider_bounds(
    mut q_bodies: Query<(&Transform, &Collider, &mut BodyBounds), With<ControllerConfig>>,
) {
    for (transform, collider, mut bounds) in &mut q_bodies {
        let (offset, half_extents) = collider_local_bounds(collider);
        *bounds = BodyBounds::new(transform.translation.xy() + offset, half_extents);
    }
}

/// [`RaycastQuery`] over a Rapier physics world.
pub struct RapierRayQuery<'a> {
    context: &'a RapierContext<'a>,
    filter: QueryFilter<'a>,
    is_one_way: &'a dyn Fn(Entity) -> bool,
}

impl<'a> RapierRayQuery<'a> {
    /// Query `context` through `filter`; `is_one_way` tags hit entities.
    pub fn new(
        context: &'a RapierContext<'a>,
        filter: QueryFilter<'a>,
        is_one_way: &'a dyn Fn(Entity) -> bool,
    ) -> Self {
        Self {
            context,
            filter,
            is_one_way,
        }
    }
}

impl RaycastQuery for RapierRayQuery<'_> {
    fn cast_ray(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Option<RayHit> {
        self.context
            .cast_ray_and_get_normal(
                origin,
                direction,
                max_distance.min(MAX_RAY_DISTANCE),
                true, // solid: a ray starting inside reports distance zero
                self.filter,
            )
            .map(|(hit_entity, intersection)| {
                let surface = if (self.is_one_way)(hit_entity) {
                    SurfaceKind::OneWay
                } else {
                    SurfaceKind::Solid
                };
                RayHit::new(
                    intersection.time_of_impact,
                    intersection.normal,
                    intersection.point,
                    Some(hit_entity),
                )
                .with_surface(surface)
            })
    }
}

/// Ray filter for a controlled body: skip itself and all sensors, and use
/// its collision groups when it has any.
pub fn body_filter<'a>(entity: Entity, collision_groups: Option<&CollisionGroups>) -> QueryFilter<'a> {
    let mut filter = QueryFilter::default()
        .exclude_rigid_body(entity)
        .exclude_collider(entity)
        .exclude_sensors();

    if let Some(groups) = collision_groups {
        filter = filter.groups(CollisionGroups::new(groups.memberships, groups.filters));
    }
    filter
}

/// Resolve every pending move against the Rapier world.
fn rapier_resolve(
    rapier_context: ReadRapierContext,
    time: Res<Time>,
    q_one_way: Query<(), With<OneWayPlatform>>,
    mut q_bodies: Query<(
        Entity,
        &ControllerConfig,
        &BodyBounds,
        &RaySpacing,
        &MoveRequest,
        &mut CollisionState,
        &mut ResolvedMove,
        Option<&CollisionGroups>,
    )>,
) {
    let Ok(context) = rapier_context.single() else {
        return;
    };

    let now = time.elapsed_secs_f64();
    let is_one_way = |entity: Entity| q_one_way.contains(entity);

    for (entity, config, bounds, spacing, request, mut state, mut resolved, collision_groups) in
        &mut q_bodies
    {
        let query = RapierRayQuery::new(&context, body_filter(entity, collision_groups), &is_one_way);
        *resolved = resolve_request(&query, config, bounds, spacing, request, &mut state, now);
    }
}

/// Bundle for creating a controlled body with Rapier2D physics.
///
/// The body is kinematic and moved by position: Rapier never pushes it, and
/// other dynamic bodies still collide with it.
///
/// # Example
///
/// ```ignore
/// use bevy::prelude::*;
/// use bevy_rapier2d::prelude::*;
/// use raycast_controller_2d::prelude::*;
/// use raycast_controller_2d::rapier::Rapier2dCharacterBundle;
///
/// fn spawn_player(mut commands: Commands) {
///     commands.spawn((
///         Transform::from_xyz(0.0, 2.0, 0.0),
///         // Controller components
///         PlatformerConfig::default(),
///         // Physics bundle
///         Rapier2dCharacterBundle::new(),
///         // Collider shape: its bounding box is what the rays are cast from
///         Collider::cuboid(0.5, 1.0),
///     ));
/// }
/// ```
#[derive(Bundle)]
pub struct Rapier2dCharacterBundle {
    /// Should stay kinematic; dynamic bodies would fight the controller.
    pub rigid_body: RigidBody,
    /// Keeps the collider upright; the ray layout assumes an unrotated box.
    pub locked_axes: LockedAxes,
}

impl Default for Rapier2dCharacterBundle {
    fn default() -> Self {
        Self::new()
    }
}

impl Rapier2dCharacterBundle {
    /// Create a kinematic, rotation locked body.
    pub fn new() -> Self {
        Self {
            rigid_body: RigidBody::KinematicPositionBased,
            locked_axes: LockedAxes::ROTATION_LOCKED,
        }
    }

    /// Set the rigid body type for the character.
    pub fn with_body(mut self, body: RigidBody) -> Self {
        self.rigid_body = body;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a - b).abs().max_element() < 1e-5
    }

    #[test]
    fn cuboid_bounds() {
        let (offset, half_extents) = collider_local_bounds(&Collider::cuboid(0.5, 1.0));
        assert!(approx(offset, Vec2::ZERO));
        assert!(approx(half_extents, Vec2::new(0.5, 1.0)));
    }

    #[test]
    fn capsule_and_ball_bounds() {
        let (_, half_extents) = collider_local_bounds(&Collider::capsule_y(0.5, 0.25));
        assert!(approx(half_extents, Vec2::new(0.25, 0.75)));

        let (_, half_extents) = collider_local_bounds(&Collider::ball(0.3));
        assert!(approx(half_extents, Vec2::splat(0.3)));
    }

    #[test]
    fn offset_shapes_report_their_center() {
        let collider = Collider::compound(vec![(
            Vec2::new(0.0, 1.0),
            0.0,
            Collider::cuboid(0.5, 0.5),
        )]);
        let (offset, half_extents) = collider_local_bounds(&collider);
        assert!(approx(offset, Vec2::new(0.0, 1.0)));
        assert!(approx(half_extents, Vec2::splat(0.5)));
    }

    #[test]
    fn bounds_follow_transform() {
        let mut app = App::new();
        app.add_systems(Update, sync_collider_bounds);

        let entity = app
            .world_mut()
            .spawn((
                Transform::from_xyz(3.0, 4.0, 0.0),
                ControllerConfig::default(),
                Collider::cuboid(0.5, 1.0),
            ))
            .id();

        app.update();

        let bounds = app.world().get::<BodyBounds>(entity).unwrap();
        assert!(approx(bounds.center, Vec2::new(3.0, 4.0)));
        assert!(approx(bounds.half_extents, Vec2::new(0.5, 1.0)));
    }

    #[test]
    fn character_bundle_is_kinematic() {
        let bundle = Rapier2dCharacterBundle::new();
        assert_eq!(bundle.rigid_body, RigidBody::KinematicPositionBased);
        assert_eq!(bundle.locked_axes, LockedAxes::ROTATION_LOCKED);

        let bundle = Rapier2dCharacterBundle::new().with_body(RigidBody::KinematicVelocityBased);
        assert_eq!(bundle.rigid_body, RigidBody::KinematicVelocityBased);
    }
}
