//! Physics backend abstraction.
//!
//! The resolver only needs one capability from the physics world: cast a
//! ray and report the nearest hit. [`RaycastQuery`] is that seam.
//! [`CharacterPhysicsBackend`] wires a concrete engine (Rapier2D, the
//! built-in segment world, a custom one) into the plugin's system sets.

use bevy::prelude::*;

use crate::collision::RayHit;

/// Read-only geometry query used by the sweeps.
///
/// Implementations own the collision filter: which layers are hit and which
/// body is excluded (usually the one being moved).
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use raycast_controller_2d::prelude::*;
///
/// /// Infinite floor at y = 0.
/// struct Floor;
///
/// impl RaycastQuery for Floor {
///     fn cast_ray(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Option<RayHit> {
///         if direction.y >= 0.0 || origin.y < 0.0 {
///             return None;
///         }
///         let distance = origin.y / -direction.y;
///         (distance <= max_distance).then(|| {
///             RayHit::new(distance, Vec2::Y, origin + direction * distance, None)
///         })
///     }
/// }
/// ```
pub trait RaycastQuery {
    /// Cast a ray and return the nearest hit within `max_distance`.
    ///
    /// `direction` is normalized. A ray starting inside solid geometry
    /// reports a hit at distance zero.
    fn cast_ray(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Option<RayHit>;
}

impl<T: RaycastQuery + ?Sized> RaycastQuery for &T {
    fn cast_ray(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Option<RayHit> {
        (**self).cast_ray(origin, direction, max_distance)
    }
}

/// Trait for physics backend implementations.
///
/// A backend's plugin is expected to add two systems:
/// - one in [`ControllerSet::Prepare`](crate::ControllerSet::Prepare) that
///   writes every controlled body's [`BodyBounds`](crate::spacing::BodyBounds)
///   from its collider;
/// - one in [`ControllerSet::Resolve`](crate::ControllerSet::Resolve) that
///   builds a [`RaycastQuery`] for each body, runs
///   [`resolve_request`](crate::systems::resolve_request) and stores the
///   result in [`ResolvedMove`](crate::intent::ResolvedMove).
///
/// For an example implementation, see the `rapier` module's
/// `Rapier2dBackend`, or [`SegmentBackend`](crate::geometry::SegmentBackend).
pub trait CharacterPhysicsBackend: 'static + Send + Sync {
    /// Returns the plugin that sets up this backend.
    fn plugin() -> impl Plugin;
}
