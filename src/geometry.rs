//! Built-in static collision world.
//!
//! [`StaticGeometry`] is a plain list of convex solids and one-way segments,
//! queried by straight ray casts. It needs no physics engine, which makes it
//! the backend of choice for headless simulations, replays and tests.
//! [`SegmentBackend`] plugs it into the controller schedule.

use bevy::prelude::*;

use crate::backend::{CharacterPhysicsBackend, RaycastQuery};
use crate::collision::{RayHit, SurfaceKind};
use crate::config::ControllerConfig;
use crate::intent::{MoveRequest, ResolvedMove};
use crate::spacing::{BodyBounds, RaySpacing};
use crate::state::CollisionState;
use crate::systems::resolve_request;
use crate::ControllerSet;

/// Convex polygon with counter-clockwise vertices.
#[derive(Debug, Clone, PartialEq)]
struct ConvexSolid {
    vertices: Vec<Vec2>,
    /// Outward normal of the edge starting at the same index.
    normals: Vec<Vec2>,
    entity: Option<Entity>,
}

impl ConvexSolid {
    fn new(mut vertices: Vec<Vec2>, entity: Option<Entity>) -> Self {
        if signed_area(&vertices) < 0.0 {
            vertices.reverse();
        }
        let normals = (0..vertices.len())
            .map(|i| {
                let edge = vertices[(i + 1) % vertices.len()] - vertices[i];
                Vec2::new(edge.y, -edge.x).normalize_or_zero()
            })
            .collect();
        Self {
            vertices,
            normals,
            entity,
        }
    }

    /// Clip the ray against every edge half-plane.
    fn cast_ray(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Option<RayHit> {
        let mut t_enter = 0.0_f32;
        let mut t_exit = max_distance;
        // Ray starting inside reports the reversed direction.
        let mut normal = -direction;

        for (vertex, edge_normal) in self.vertices.iter().zip(&self.normals) {
            let numerator = edge_normal.dot(*vertex - origin);
            let denominator = edge_normal.dot(direction);

            if denominator == 0.0 {
                if numerator < 0.0 {
                    return None;
                }
                continue;
            }

            let t = numerator / denominator;
            if denominator < 0.0 {
                if t >= t_enter {
                    t_enter = t;
                    normal = *edge_normal;
                }
            } else {
                t_exit = t_exit.min(t);
            }

            if t_enter > t_exit {
                return None;
            }
        }

        Some(RayHit::new(
            t_enter,
            normal,
            origin + direction * t_enter,
            self.entity,
        ))
    }
}

/// One-way platform surface.
#[derive(Debug, Clone, Copy, PartialEq)]
struct OneWaySegment {
    start: Vec2,
    end: Vec2,
    /// Upward-facing normal.
    normal: Vec2,
    entity: Option<Entity>,
}

impl OneWaySegment {
    fn new(start: Vec2, end: Vec2, entity: Option<Entity>) -> Self {
        let edge = end - start;
        let mut normal = Vec2::new(-edge.y, edge.x).normalize_or_zero();
        if normal.y < 0.0 {
            normal = -normal;
        }
        Self {
            start,
            end,
            normal,
            entity,
        }
    }

    fn cast_ray(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Option<RayHit> {
        let edge = self.end - self.start;
        let denominator = direction.perp_dot(edge);
        if denominator == 0.0 {
            return None;
        }

        let to_start = self.start - origin;
        let t = to_start.perp_dot(edge) / denominator;
        let s = to_start.perp_dot(direction) / denominator;
        if !(0.0..=max_distance).contains(&t) || !(0.0..=1.0).contains(&s) {
            return None;
        }

        Some(
            RayHit::new(t, self.normal, origin + direction * t, self.entity)
                .with_surface(SurfaceKind::OneWay),
        )
    }
}

/// Static level geometry answering ray casts.
///
/// Solids must be convex; build concave shapes from several solids.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use raycast_controller_2d::prelude::*;
///
/// let mut geometry = StaticGeometry::new();
/// geometry
///     .add_box(Vec2::new(0.0, -0.5), Vec2::new(10.0, 0.5))
///     .add_one_way_segment(Vec2::new(-2.0, 3.0), Vec2::new(2.0, 3.0));
///
/// let hit = geometry.cast_ray(Vec2::new(0.0, 1.0), Vec2::NEG_Y, 5.0).unwrap();
/// assert!((hit.distance - 1.0).abs() < 1e-5);
/// assert_eq!(hit.normal, Vec2::Y);
/// ```
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct StaticGeometry {
    solids: Vec<ConvexSolid>,
    one_way: Vec<OneWaySegment>,
}

impl StaticGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an axis-aligned solid box.
    pub fn add_box(&mut self, center: Vec2, half_extents: Vec2) -> &mut Self {
        let min = center - half_extents;
        let max = center + half_extents;
        self.add_polygon([min, Vec2::new(max.x, min.y), max, Vec2::new(min.x, max.y)])
    }

    /// Add a convex solid polygon. Vertex winding does not matter.
    pub fn add_polygon(&mut self, vertices: impl IntoIterator<Item = Vec2>) -> &mut Self {
        self.add_polygon_for(vertices, None)
    }

    /// Add a convex solid polygon reported as `entity` in hits.
    pub fn add_polygon_for(
        &mut self,
        vertices: impl IntoIterator<Item = Vec2>,
        entity: Option<Entity>,
    ) -> &mut Self {
        let vertices: Vec<Vec2> = vertices.into_iter().collect();
        if vertices.len() >= 3 {
            self.solids.push(ConvexSolid::new(vertices, entity));
        }
        self
    }

    /// Add a right-triangle ramp rising from `foot` to `top`.
    ///
    /// The vertical side sits below `top`; the bottom side is level with
    /// `foot`. Works for ramps rising to either side.
    pub fn add_ramp(&mut self, foot: Vec2, top: Vec2) -> &mut Self {
        self.add_polygon([foot, Vec2::new(top.x, foot.y), top])
    }

    /// Add a one-way platform from `start` to `end`.
    pub fn add_one_way_segment(&mut self, start: Vec2, end: Vec2) -> &mut Self {
        self.one_way.push(OneWaySegment::new(start, end, None));
        self
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.solids.clear();
        self.one_way.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.solids.is_empty() && self.one_way.is_empty()
    }
}

impl RaycastQuery for StaticGeometry {
    fn cast_ray(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Option<RayHit> {
        let solids = self
            .solids
            .iter()
            .filter_map(|solid| solid.cast_ray(origin, direction, max_distance));
        let one_way = self
            .one_way
            .iter()
            .filter_map(|segment| segment.cast_ray(origin, direction, max_distance));

        solids
            .chain(one_way)
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

fn signed_area(vertices: &[Vec2]) -> f32 {
    let n = vertices.len();
    (0..n)
        .map(|i| vertices[i].perp_dot(vertices[(i + 1) % n]))
        .sum::<f32>()
        * 0.5
}

/// Size of a body simulated against [`StaticGeometry`].
///
/// The box is centered on the entity's `Transform` translation.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct BoxBody {
    pub half_extents: Vec2,
}

impl BoxBody {
    pub fn new(half_extents: Vec2) -> Self {
        Self { half_extents }
    }
}

/// Backend resolving moves against the [`StaticGeometry`] resource.
pub struct SegmentBackend;

impl CharacterPhysicsBackend for SegmentBackend {
    fn plugin() -> impl Plugin {
        SegmentBackendPlugin
    }
}

/// Plugin that sets up the [`StaticGeometry`] systems for the controller.
pub struct SegmentBackendPlugin;

impl Plugin for SegmentBackendPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<StaticGeometry>();
        app.register_type::<BoxBody>();

        app.add_systems(
            FixedUpdate,
            sync_box_bounds
                .in_set(ControllerSet::Prepare)
                .before(crate::systems::refresh_ray_spacing),
        );
        app.add_systems(
            FixedUpdate,
            resolve_against_static_geometry.in_set(ControllerSet::Resolve),
        );
    }
}

/// Write [`BodyBounds`] from the box size and current translation.
pub fn sync_box_bounds(mut q_bodies: Query<(&Transform, &BoxBody, &mut BodyBounds)>) {
    for (transform, body, mut bounds) in &mut q_bodies {
        let half_extents = body.half_extents * transform.scale.xy().abs();
        *bounds = BodyBounds::new(transform.translation.xy(), half_extents);
    }
}

fn resolve_against_static_geometry(
    time: Res<Time>,
    geometry: Res<StaticGeometry>,
    mut q_bodies: Query<(
        &ControllerConfig,
        &BodyBounds,
        &RaySpacing,
        &MoveRequest,
        &mut CollisionState,
        &mut ResolvedMove,
    )>,
) {
    let now = time.elapsed_secs_f64();
    for (config, bounds, spacing, request, mut state, mut resolved) in &mut q_bodies {
        *resolved = resolve_request(&*geometry, config, bounds, spacing, request, &mut state, now);
    }
}
