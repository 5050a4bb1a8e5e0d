//! Controller configuration components.
//!
//! This module defines the tunable constants of the raycast controller:
//! skin width, ray density, the walkable slope limit and the drop-through
//! delay for one-way platforms. These are set once and never re-derived at
//! runtime.

use bevy::prelude::*;

use crate::error::ControllerError;
use crate::intent::{MoveRequest, ResolvedMove};
use crate::spacing::BodyBounds;
use crate::state::CollisionState;

/// Configuration parameters for the raycast character controller.
///
/// All sweep ray lengths are DERIVED from the requested displacement and
/// `skin_width`. No other magic numbers.
///
/// Adding this component makes the entity a controlled body: the per-body
/// state, bounds and move components are inserted with it.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
#[require(CollisionState, BodyBounds, MoveRequest, ResolvedMove)]
pub struct ControllerConfig {
    /// Inward offset from the collider hull where rays start.
    ///
    /// Keeps probe rays from starting inside geometry the body is touching.
    pub skin_width: f32,

    /// Upper bound on the distance between two neighbouring rays.
    ///
    /// The actual spacing is derived from the body size so that the extreme
    /// corners are always probed.
    pub max_ray_spacing: f32,

    /// Steepest surface (degrees from up) the body can walk on.
    ///
    /// Anything steeper is a wall when moving sideways, and a slide surface
    /// when falling onto it.
    pub max_slope_angle: f32,

    /// Seconds of simulation time a one-way platform stays ignored after a
    /// drop-through was requested.
    pub platform_drop_delay: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            skin_width: 0.015,
            max_ray_spacing: 0.25,
            max_slope_angle: 80.0,
            platform_drop_delay: 0.5,
        }
    }
}

impl ControllerConfig {
    /// Create a config for worlds measured in pixels rather than meters.
    ///
    /// Skin width and ray spacing are scaled so a 32px tall body still casts
    /// a handful of rays per side.
    pub fn pixels() -> Self {
        Self {
            skin_width: 0.5,
            max_ray_spacing: 8.0,
            ..default()
        }
    }

    /// Check every constant for a usable value.
    pub fn validate(&self) -> Result<(), ControllerError> {
        if !(self.skin_width.is_finite() && self.skin_width > 0.0) {
            return Err(ControllerError::InvalidSkinWidth(self.skin_width));
        }
        if !(self.max_ray_spacing.is_finite() && self.max_ray_spacing > 0.0) {
            return Err(ControllerError::InvalidRaySpacing(self.max_ray_spacing));
        }
        if !(self.max_slope_angle.is_finite() && (0.0..90.0).contains(&self.max_slope_angle)) {
            return Err(ControllerError::InvalidSlopeLimit(self.max_slope_angle));
        }
        if !(self.platform_drop_delay.is_finite() && self.platform_drop_delay >= 0.0) {
            return Err(ControllerError::InvalidDropDelay(self.platform_drop_delay));
        }
        Ok(())
    }

    /// Whether a surface at `angle` degrees from up can be walked on.
    #[inline]
    pub fn is_walkable(&self, angle: f32) -> bool {
        angle <= self.max_slope_angle
    }

    /// Builder: set skin width.
    pub fn with_skin_width(mut self, skin_width: f32) -> Self {
        self.skin_width = skin_width;
        self
    }

    /// Builder: set the maximum distance between rays.
    pub fn with_max_ray_spacing(mut self, spacing: f32) -> Self {
        self.max_ray_spacing = spacing;
        self
    }

    /// Builder: set the walkable slope limit (degrees).
    pub fn with_max_slope_angle(mut self, degrees: f32) -> Self {
        self.max_slope_angle = degrees;
        self
    }

    /// Builder: set the drop-through delay (seconds).
    pub fn with_platform_drop_delay(mut self, seconds: f32) -> Self {
        self.platform_drop_delay = seconds;
        self
    }
}
