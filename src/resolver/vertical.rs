use bevy::prelude::*;

use super::{Motion, Sweep};
use crate::backend::RaycastQuery;
use crate::state::{SlopeContact, SlopeInteraction};

impl<Q: RaycastQuery + ?Sized> Sweep<'_, Q> {
    /// Up or down sweep for a nonzero vertical displacement.
    ///
    /// Rays are offset by the horizontal displacement already resolved, so
    /// they probe where the body will be rather than where it is.
    pub(super) fn vertical_collisions(&self, mut motion: Motion) -> Motion {
        let skin = self.config.skin_width;
        let direction_y = motion.displacement.y.signum();
        let mut ray_length = motion.displacement.y.abs() + skin;

        let direction = Vec2::Y * direction_y;
        let base = if direction_y < 0.0 {
            self.origins.bottom_left
        } else {
            self.origins.top_left
        };

        for i in 0..self.spacing.vertical_ray_count {
            let origin = base
                + Vec2::X * (self.spacing.vertical_spacing * i as f32 + motion.displacement.x);
            let Some(hit) = self.cast(origin, direction, ray_length) else {
                continue;
            };

            if hit.is_one_way() {
                // Passable from below and from inside.
                if direction_y > 0.0 || hit.is_overlapping() {
                    continue;
                }
                if motion.falling_through_until.is_some() {
                    continue;
                }
                if self.drop_through {
                    let until = self.now + f64::from(self.config.platform_drop_delay);
                    debug!("dropping through one-way platform until t={until:.3}");
                    motion.falling_through_until = Some(until);
                    continue;
                }
            }

            motion.displacement.y = (hit.distance - skin) * direction_y;
            ray_length = hit.distance;

            if let SlopeInteraction::Climbing(slope) = motion.slope {
                if slope.angle > 0.0 {
                    motion.displacement.x = motion.displacement.y / slope.angle.to_radians().tan()
                        * motion.displacement.x.signum();
                }
            }

            motion.contacts.below = direction_y < 0.0;
            motion.contacts.above = direction_y > 0.0;
        }

        if let SlopeInteraction::Climbing(slope) = motion.slope {
            motion = self.retrack_climb(motion, slope);
        }

        motion
    }

    /// While climbing, look ahead from the corrected height for a change of
    /// slope and stop at its start.
    fn retrack_climb(&self, mut motion: Motion, slope: SlopeContact) -> Motion {
        let skin = self.config.skin_width;
        let direction_x = motion.displacement.x.signum();
        let ray_length = motion.displacement.x.abs() + skin;
        let origin = self.origins.bottom(direction_x) + Vec2::Y * motion.displacement.y;

        let Some(hit) = self.cast(origin, Vec2::X * direction_x, ray_length) else {
            return motion;
        };

        let slope_angle = hit.surface_angle();
        if slope_angle != slope.angle {
            motion.displacement.x = (hit.distance - skin) * direction_x;
            // Too steep to climb: stop at it but keep following the current slope.
            if self.config.is_walkable(slope_angle) {
                motion.slope =
                    SlopeInteraction::Climbing(SlopeContact::new(slope_angle, hit.normal));
            }
        }

        motion
    }
}
