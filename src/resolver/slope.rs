//! Slope climb, descend and max-slope slide.

use bevy::prelude::*;

use super::{Motion, Sweep};
use crate::backend::RaycastQuery;
use crate::collision::RayHit;
use crate::state::{SlopeContact, SlopeInteraction};

/// Follow a walkable slope upward.
///
/// The horizontal travel distance is laid along the slope surface: the rise
/// is `sin(angle) * |dx|` and the run becomes `cos(angle) * |dx|`. Nothing
/// changes when the body already rises faster than the slope (jumping over
/// it).
pub fn climb_slope(mut motion: Motion, slope: SlopeContact) -> Motion {
    let move_distance = motion.displacement.x.abs();
    let (sin, cos) = slope.angle.to_radians().sin_cos();
    let climb_y = sin * move_distance;

    if motion.displacement.y <= climb_y {
        motion.displacement.y = climb_y;
        motion.displacement.x = cos * move_distance * motion.displacement.x.signum();
        motion.contacts.below = true;
        motion.slope = SlopeInteraction::Climbing(slope);
    }

    motion
}

impl<Q: RaycastQuery + ?Sized> Sweep<'_, Q> {
    /// Pre-pass run before the sweeps whenever the body moves down.
    ///
    /// First checks for a slope steeper than walkable under exactly one of
    /// the bottom corners, then for a walkable slope to follow downhill.
    pub(super) fn descend_slope(&self, mut motion: Motion) -> Motion {
        let skin = self.config.skin_width;
        let probe_length = motion.displacement.y.abs() + skin;

        let hit_left = self.cast(self.origins.bottom_left, Vec2::NEG_Y, probe_length);
        let hit_right = self.cast(self.origins.bottom_right, Vec2::NEG_Y, probe_length);
        if hit_left.is_some() != hit_right.is_some() {
            for hit in hit_left.iter().chain(hit_right.iter()) {
                motion = self.slide_down_max_slope(motion, hit);
            }
        }

        if motion.slope.is_sliding_max() {
            return motion;
        }

        let direction_x = motion.displacement.x.signum();
        // Trailing corner: the one still over the slope when walking downhill.
        let origin = if direction_x < 0.0 {
            self.origins.bottom_right
        } else {
            self.origins.bottom_left
        };
        let Some(hit) = self.cast(origin, Vec2::NEG_Y, f32::MAX) else {
            return motion;
        };

        let angle = hit.surface_angle();
        if angle <= 0.0 || !self.config.is_walkable(angle) {
            return motion;
        }
        // Only a slope falling away in the direction of travel.
        if hit.normal.x.signum() != direction_x {
            return motion;
        }

        let move_distance = motion.displacement.x.abs();
        let (sin, cos) = angle.to_radians().sin_cos();
        if hit.distance - skin > angle.to_radians().tan() * move_distance {
            return motion;
        }

        motion.displacement.y -= sin * move_distance;
        motion.displacement.x = cos * move_distance * direction_x;
        motion.slope = SlopeInteraction::Descending(SlopeContact::new(angle, hit.normal));
        motion.contacts.below = true;
        motion
    }

    /// Slide along a surface steeper than the walkable limit.
    ///
    /// The horizontal displacement is replaced by the slope's run over the
    /// remaining fall, pushed away from the surface.
    pub(super) fn slide_down_max_slope(&self, mut motion: Motion, hit: &RayHit) -> Motion {
        let angle = hit.surface_angle();
        // Vertical or overhanging surfaces have no run to follow.
        if self.config.is_walkable(angle) || angle >= 90.0 {
            return motion;
        }

        motion.displacement.x =
            hit.normal.x * (motion.displacement.y.abs() - hit.distance) / angle.to_radians().tan();
        motion.slope = SlopeInteraction::SlidingMax(SlopeContact::new(angle, hit.normal));
        motion
    }
}
