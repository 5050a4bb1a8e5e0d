use bevy::prelude::*;

use super::slope::climb_slope;
use super::{Motion, Sweep};
use crate::backend::RaycastQuery;
use crate::state::{SlopeContact, SlopeInteraction};

impl<Q: RaycastQuery + ?Sized> Sweep<'_, Q> {
    /// Sideways sweep in the facing direction.
    ///
    /// Uses `direction_x` (the facing) rather than the sign of the
    /// displacement so a body standing still still detects the wall it is
    /// pressed against.
    pub(super) fn horizontal_collisions(&self, mut motion: Motion, direction_x: f32) -> Motion {
        let skin = self.config.skin_width;
        let mut ray_length = motion.displacement.x.abs() + skin;
        if motion.displacement.x.abs() < skin {
            ray_length = 2.0 * skin;
        }

        let direction = Vec2::X * direction_x;
        let base = self.origins.bottom(direction_x);

        for i in 0..self.spacing.horizontal_ray_count {
            let origin = base + Vec2::Y * (self.spacing.horizontal_spacing * i as f32);
            let Some(hit) = self.cast(origin, direction, ray_length) else {
                continue;
            };

            if hit.is_overlapping() {
                continue;
            }

            let slope_angle = hit.surface_angle();
            let walkable = self.config.is_walkable(slope_angle);

            if i == 0 && walkable {
                if motion.slope.is_descending() {
                    // Walked into a rising slope while following one down.
                    // The descend angle is dropped even if the climb below is rejected.
                    motion.slope = SlopeInteraction::None;
                    motion.displacement = self.requested;
                }

                // A new slope starts some way ahead: climb only from its foot.
                let mut distance_to_slope_start = 0.0;
                if self.slope_angle_old != Some(slope_angle) {
                    distance_to_slope_start = hit.distance - skin;
                    motion.displacement.x -= distance_to_slope_start * direction_x;
                }
                motion = climb_slope(motion, SlopeContact::new(slope_angle, hit.normal));
                motion.displacement.x += distance_to_slope_start * direction_x;
            }

            if !motion.slope.is_climbing() || !walkable {
                motion.displacement.x = (hit.distance - skin) * direction_x;
                ray_length = hit.distance;

                if let SlopeInteraction::Climbing(slope) = motion.slope {
                    motion.displacement.y =
                        slope.angle.to_radians().tan() * motion.displacement.x.abs();
                }

                motion.contacts.left = direction_x < 0.0;
                motion.contacts.right = direction_x > 0.0;
            }
        }

        motion
    }
}
