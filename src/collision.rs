//! Ray hit data returned by geometry queries.

use bevy::prelude::*;

/// How a surface takes part in collision resolution.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    /// Blocks from every side.
    #[default]
    Solid,
    /// One-way "through" platform: blocks only when landed on from above,
    /// and can be dropped through on request.
    OneWay,
}

/// Marker component for colliders that act as one-way platforms.
///
/// Physics backends report hits on entities with this marker as
/// [`SurfaceKind::OneWay`].
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct OneWayPlatform;

/// Information about the nearest hit of a raycast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance from the ray origin to the hit point.
    pub distance: f32,
    /// Normal of the surface at the hit point.
    pub normal: Vec2,
    /// World position of the hit point.
    pub point: Vec2,
    /// Entity that was hit (if any).
    pub entity: Option<Entity>,
    /// Surface tag of the hit collider.
    pub surface: SurfaceKind,
}

impl RayHit {
    /// Create a hit against a solid surface.
    pub fn new(distance: f32, normal: Vec2, point: Vec2, entity: Option<Entity>) -> Self {
        Self {
            distance,
            normal,
            point,
            entity,
            surface: SurfaceKind::Solid,
        }
    }

    /// Builder: tag the hit with a surface kind.
    pub fn with_surface(mut self, surface: SurfaceKind) -> Self {
        self.surface = surface;
        self
    }

    /// Angle between the hit normal and world up, in degrees.
    #[inline]
    pub fn surface_angle(&self) -> f32 {
        surface_angle(self.normal)
    }

    /// Check if the ray started inside or touching the surface.
    #[inline]
    pub fn is_overlapping(&self) -> bool {
        self.distance == 0.0
    }

    /// Check if this is a one-way platform.
    #[inline]
    pub fn is_one_way(&self) -> bool {
        self.surface == SurfaceKind::OneWay
    }
}

/// Unsigned angle between `normal` and `Vec2::Y`, in degrees (0..=180).
///
/// A zero-length normal reports 0 (flat).
pub fn surface_angle(normal: Vec2) -> f32 {
    let n = normal.normalize_or_zero();
    if n == Vec2::ZERO {
        return 0.0;
    }
    n.dot(Vec2::Y).clamp(-1.0, 1.0).acos().to_degrees()
}
