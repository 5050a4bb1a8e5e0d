//! Raycast collision resolution.
//!
//! [`CollisionResolver::resolve`] turns a requested displacement into the
//! displacement the body can actually travel this tick. The work is split
//! into steps that each take the current [`Motion`] and return the next one:
//!
//! 1. descend pre-pass (only when moving down)
//! 2. horizontal sweep (may start climbing a slope)
//! 3. vertical sweep (may re-track the slope underfoot)
//!
//! Rays within a sweep are cast in order, because each hit shortens the ray
//! length and displacement seen by the next ray.

mod horizontal;
mod slope;
mod vertical;

use bevy::prelude::*;

use crate::backend::RaycastQuery;
use crate::collision::RayHit;
use crate::config::ControllerConfig;
use crate::intent::MoveRequest;
use crate::spacing::{BodyBounds, RaySpacing, SweepOrigins};
use crate::state::{CollisionState, Contacts, SlopeInteraction};

pub use slope::climb_slope;

/// Displacement plus the per-tick state built up while resolving it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    /// Displacement corrected so far.
    pub displacement: Vec2,
    /// Contacts found so far.
    pub contacts: Contacts,
    /// Slope interaction found so far.
    pub slope: SlopeInteraction,
    /// Drop-through deadline, possibly started during this tick.
    pub falling_through_until: Option<f64>,
}

impl Motion {
    /// Fresh motion for a tick: nothing detected yet.
    pub fn new(displacement: Vec2) -> Self {
        Self {
            displacement,
            contacts: Contacts::default(),
            slope: SlopeInteraction::None,
            falling_through_until: None,
        }
    }
}

/// Everything that stays fixed while one move is resolved.
struct Sweep<'a, Q: ?Sized> {
    query: &'a Q,
    config: &'a ControllerConfig,
    spacing: &'a RaySpacing,
    origins: SweepOrigins,
    /// Displacement as requested, before any correction.
    requested: Vec2,
    /// Slope angle tracked on the previous tick.
    slope_angle_old: Option<f32>,
    drop_through: bool,
    now: f64,
}

impl<Q: RaycastQuery + ?Sized> Sweep<'_, Q> {
    #[inline]
    fn cast(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Option<RayHit> {
        self.query.cast_ray(origin, direction, max_distance)
    }
}

/// Resolves moves against static geometry for one body.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use raycast_controller_2d::prelude::*;
///
/// let mut geometry = StaticGeometry::new();
/// geometry.add_box(Vec2::new(0.0, -0.5), Vec2::new(10.0, 0.5));
///
/// let config = ControllerConfig::default();
/// let bounds = BodyBounds::new(Vec2::new(0.0, 1.0), Vec2::new(0.5, 1.0));
/// let spacing = RaySpacing::compute(&bounds, config.skin_width, config.max_ray_spacing).unwrap();
/// let mut state = CollisionState::new();
///
/// let resolver = CollisionResolver::new(&geometry, &config, &spacing);
/// let moved = resolver.resolve(&bounds, &mut state, &MoveRequest::new(Vec2::new(0.0, -0.5)), 0.0);
///
/// // Already standing on the floor: no further fall.
/// assert!(moved.y.abs() < 1e-4);
/// assert!(state.below());
/// ```
pub struct CollisionResolver<'a, Q: ?Sized> {
    query: &'a Q,
    config: &'a ControllerConfig,
    spacing: &'a RaySpacing,
}

impl<'a, Q: RaycastQuery + ?Sized> CollisionResolver<'a, Q> {
    pub fn new(query: &'a Q, config: &'a ControllerConfig, spacing: &'a RaySpacing) -> Self {
        Self {
            query,
            config,
            spacing,
        }
    }

    /// Resolve `request` for a body currently occupying `bounds`.
    ///
    /// `now` is the simulation time in seconds; it drives the drop-through
    /// deadline. Returns the corrected displacement; the caller applies it.
    pub fn resolve(
        &self,
        bounds: &BodyBounds,
        state: &mut CollisionState,
        request: &MoveRequest,
        now: f64,
    ) -> Vec2 {
        let requested = request.displacement;
        state.begin_tick(requested, now);

        let sweep = Sweep {
            query: self.query,
            config: self.config,
            spacing: self.spacing,
            origins: SweepOrigins::from_bounds(bounds, self.config.skin_width),
            requested,
            slope_angle_old: state.slope_angle_old,
            drop_through: request.wants_drop_through(),
            now,
        };

        let mut motion = Motion {
            falling_through_until: state.falling_through_until,
            ..Motion::new(requested)
        };

        if motion.displacement.y < 0.0 {
            motion = sweep.descend_slope(motion);
        }

        if motion.displacement.x != 0.0 {
            state.face_dir = motion.displacement.x.signum();
        }

        motion = sweep.horizontal_collisions(motion, state.face_dir);

        if motion.displacement.y != 0.0 {
            motion = sweep.vertical_collisions(motion);
        }

        if request.standing_on_platform {
            motion.contacts.below = true;
        }

        trace!(
            "resolved move {:?} -> {:?} ({:?}, {:?})",
            requested,
            motion.displacement,
            motion.contacts,
            motion.slope
        );

        state.contacts = motion.contacts;
        state.slope = motion.slope;
        state.falling_through_until = motion.falling_through_until;
        motion.displacement
    }
}
