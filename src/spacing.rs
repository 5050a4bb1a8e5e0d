//! Ray layout for the moving body.
//!
//! [`RaySpacing`] decides how many rays are cast per axis and how far apart
//! they are; [`SweepOrigins`] gives the four corners the rays fan out from.
//! Both work on the body bounds shrunk inward by the skin width, so probe
//! rays always start just inside the hull.

use bevy::prelude::*;

use crate::error::ControllerError;

/// Minimum rays per axis. Always covers both extreme corners.
pub const MIN_RAY_COUNT: u32 = 2;

/// Axis-aligned world-space bounds of the moving body.
///
/// Kept current by the physics backend before every move.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq, Default)]
#[reflect(Component)]
pub struct BodyBounds {
    /// Center of the box in world space.
    pub center: Vec2,
    /// Half of the box size along each axis.
    pub half_extents: Vec2,
}

impl BodyBounds {
    /// Create bounds from center and half extents.
    pub fn new(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    /// Create bounds from two opposite corners.
    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self {
            center: (min + max) * 0.5,
            half_extents: (max - min).abs() * 0.5,
        }
    }

    /// Lower-left corner.
    #[inline]
    pub fn min(&self) -> Vec2 {
        self.center - self.half_extents
    }

    /// Upper-right corner.
    #[inline]
    pub fn max(&self) -> Vec2 {
        self.center + self.half_extents
    }

    /// Full width and height.
    #[inline]
    pub fn size(&self) -> Vec2 {
        self.half_extents * 2.0
    }

    /// Size after shrinking by `skin_width` on every side.
    #[inline]
    pub fn shrunk_size(&self, skin_width: f32) -> Vec2 {
        self.size() - Vec2::splat(2.0 * skin_width)
    }

    /// Same bounds moved by `offset`.
    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            center: self.center + offset,
            ..*self
        }
    }
}

/// Corner points the sweep rays are cast from.
///
/// Recomputed before every move; never carried across ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepOrigins {
    pub bottom_left: Vec2,
    pub bottom_right: Vec2,
    pub top_left: Vec2,
    pub top_right: Vec2,
}

impl SweepOrigins {
    /// Corners of `bounds` shrunk inward by `skin_width`.
    pub fn from_bounds(bounds: &BodyBounds, skin_width: f32) -> Self {
        let inset = Vec2::splat(skin_width);
        let min = bounds.min() + inset;
        let max = bounds.max() - inset;
        Self {
            bottom_left: min,
            bottom_right: Vec2::new(max.x, min.y),
            top_left: Vec2::new(min.x, max.y),
            top_right: max,
        }
    }

    /// Bottom corner on the `direction` side (negative = left).
    #[inline]
    pub fn bottom(&self, direction: f32) -> Vec2 {
        if direction < 0.0 {
            self.bottom_left
        } else {
            self.bottom_right
        }
    }
}

/// Number of rays per axis and the distance between them.
///
/// Horizontal rays are stacked along the body height; vertical rays are
/// spread along its width.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct RaySpacing {
    /// Rays cast sideways, spaced along the vertical axis.
    pub horizontal_ray_count: u32,
    /// Rays cast up or down, spaced along the horizontal axis.
    pub vertical_ray_count: u32,
    /// Vertical distance between two horizontal rays.
    pub horizontal_spacing: f32,
    /// Horizontal distance between two vertical rays.
    pub vertical_spacing: f32,
    /// Shrunk body size this layout was computed for.
    pub size: Vec2,
}

impl RaySpacing {
    /// Lay out rays for `bounds`, with neighbouring rays at most
    /// `max_spacing` apart.
    pub fn compute(
        bounds: &BodyBounds,
        skin_width: f32,
        max_spacing: f32,
    ) -> Result<Self, ControllerError> {
        if !(max_spacing.is_finite() && max_spacing > 0.0) {
            return Err(ControllerError::InvalidRaySpacing(max_spacing));
        }

        let size = bounds.shrunk_size(skin_width);
        if !(size.is_finite() && size.x > 0.0 && size.y > 0.0) {
            return Err(ControllerError::DegenerateBounds {
                size: bounds.size(),
                skin_width,
            });
        }

        let horizontal_ray_count = ray_count(size.y, max_spacing);
        let vertical_ray_count = ray_count(size.x, max_spacing);

        Ok(Self {
            horizontal_ray_count,
            vertical_ray_count,
            horizontal_spacing: size.y / (horizontal_ray_count - 1) as f32,
            vertical_spacing: size.x / (vertical_ray_count - 1) as f32,
            size,
        })
    }

    /// Check if `bounds` changed size since this layout was computed.
    pub fn needs_refresh(&self, bounds: &BodyBounds, skin_width: f32) -> bool {
        let size = bounds.shrunk_size(skin_width);
        (size - self.size).abs().max_element() > 1e-5
    }
}

fn ray_count(extent: f32, max_spacing: f32) -> u32 {
    // Ties round to even.
    let count = (extent / max_spacing).round_ties_even();
    (count as u32).max(MIN_RAY_COUNT)
}
