//! Optional platformer movement integrator.
//!
//! Turns [`PlatformerIntent`] into a [`MoveRequest`] every fixed tick:
//! smoothed horizontal acceleration, gravity derived from a jump profile,
//! variable jump height, wall sliding and three kinds of wall jump. It reads
//! the contacts of the previous resolve and never casts rays itself, so the
//! resolver works the same with or without it.

use bevy::prelude::*;

use crate::config::ControllerConfig;
use crate::intent::{MoveRequest, PlatformerIntent};
use crate::state::{CollisionState, Contacts};

/// Jump shape, from which gravity and jump velocities are derived.
///
/// # Example
///
/// ```rust
/// use raycast_controller_2d::prelude::*;
///
/// // 4 units high, apex after 0.4 s
/// let jump = JumpProfile::default();
/// assert!((jump.gravity() + 50.0).abs() < 1e-3);
/// assert!((jump.max_jump_velocity() - 20.0).abs() < 1e-3);
/// assert!((jump.min_jump_velocity() - 10.0).abs() < 1e-3);
/// ```
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct JumpProfile {
    /// Apex height of a jump with the button held.
    pub max_jump_height: f32,
    /// Apex height of a jump released immediately.
    pub min_jump_height: f32,
    /// Seconds from takeoff to the apex of a full jump.
    pub time_to_jump_apex: f32,
}

impl Default for JumpProfile {
    fn default() -> Self {
        Self {
            max_jump_height: 4.0,
            min_jump_height: 1.0,
            time_to_jump_apex: 0.4,
        }
    }
}

impl JumpProfile {
    /// Vertical acceleration (negative).
    pub fn gravity(&self) -> f32 {
        -(2.0 * self.max_jump_height) / self.time_to_jump_apex.powi(2)
    }

    /// Takeoff speed of a full jump.
    pub fn max_jump_velocity(&self) -> f32 {
        self.gravity().abs() * self.time_to_jump_apex
    }

    /// Upward speed a released jump is cut down to.
    pub fn min_jump_velocity(&self) -> f32 {
        (2.0 * self.gravity().abs() * self.min_jump_height).sqrt()
    }
}

/// Tuning for the platformer integrator.
///
/// Wall jump vectors are given for a wall on the left of the body; they are
/// mirrored for walls on the right.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
#[require(ControllerConfig, PlatformerIntent, PlatformerMotion)]
pub struct PlatformerConfig {
    pub jump: JumpProfile,
    /// Horizontal speed at full input.
    pub move_speed: f32,
    /// Smoothing time of horizontal speed changes while grounded.
    pub acceleration_time_grounded: f32,
    /// Smoothing time of horizontal speed changes while airborne.
    pub acceleration_time_airborne: f32,
    /// Fastest fall while sliding down a wall.
    pub wall_slide_speed_max: f32,
    /// Seconds of input away from a wall before the body lets go of it.
    pub wall_stick_time: f32,
    /// Jump while pushing toward the wall.
    pub wall_jump_climb: Vec2,
    /// Jump without horizontal input.
    pub wall_jump_off: Vec2,
    /// Jump while pushing away from the wall.
    pub wall_leap: Vec2,
}

impl Default for PlatformerConfig {
    fn default() -> Self {
        Self {
            jump: JumpProfile::default(),
            move_speed: 6.0,
            acceleration_time_grounded: 0.1,
            acceleration_time_airborne: 0.2,
            wall_slide_speed_max: 2.5,
            wall_stick_time: 0.25,
            wall_jump_climb: Vec2::new(7.5, 16.0),
            wall_jump_off: Vec2::new(8.5, 7.0),
            wall_leap: Vec2::new(18.0, 17.0),
        }
    }
}

impl PlatformerConfig {
    /// Builder: set the jump profile.
    pub fn with_jump(mut self, jump: JumpProfile) -> Self {
        self.jump = jump;
        self
    }

    /// Builder: set the horizontal speed.
    pub fn with_move_speed(mut self, speed: f32) -> Self {
        self.move_speed = speed;
        self
    }
}

/// Velocity state of the platformer integrator.
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq)]
#[reflect(Component)]
pub struct PlatformerMotion {
    /// Current velocity in units per second.
    pub velocity: Vec2,
    /// Smoothing state of the horizontal velocity.
    pub velocity_x_smoothing: f32,
    /// Seconds left before a stuck wall slide lets go.
    pub time_to_wall_unstick: f32,
    /// Whether the last step was a wall slide.
    pub wall_sliding: bool,
}

impl PlatformerMotion {
    /// Advance the velocity by `dt` and return the displacement to request.
    ///
    /// `contacts` are those of the previous resolve.
    pub fn step(
        &mut self,
        config: &PlatformerConfig,
        intent: &PlatformerIntent,
        contacts: &Contacts,
        dt: f32,
    ) -> Vec2 {
        let input_x = axis_direction(intent.input.x);
        let wall_dir_x = if contacts.left { -1.0 } else { 1.0 };

        let target_velocity_x = intent.input.x * config.move_speed;
        let smooth_time = if contacts.below {
            config.acceleration_time_grounded
        } else {
            config.acceleration_time_airborne
        };
        self.velocity.x = smooth_damp(
            self.velocity.x,
            target_velocity_x,
            &mut self.velocity_x_smoothing,
            smooth_time,
            dt,
        );

        self.wall_sliding = contacts.any_side() && !contacts.below && self.velocity.y < 0.0;
        if self.wall_sliding {
            self.velocity.y = self.velocity.y.max(-config.wall_slide_speed_max);

            if self.time_to_wall_unstick > 0.0 {
                self.velocity_x_smoothing = 0.0;
                self.velocity.x = 0.0;

                if input_x != wall_dir_x && input_x != 0.0 {
                    self.time_to_wall_unstick -= dt;
                } else {
                    self.time_to_wall_unstick = config.wall_stick_time;
                }
            } else {
                self.time_to_wall_unstick = config.wall_stick_time;
            }
        }

        if intent.jump_just_pressed() {
            if self.wall_sliding {
                let kick = if input_x == wall_dir_x {
                    config.wall_jump_climb
                } else if input_x == 0.0 {
                    config.wall_jump_off
                } else {
                    config.wall_leap
                };
                self.velocity = Vec2::new(-wall_dir_x * kick.x, kick.y);
            }
            if contacts.below {
                self.velocity.y = config.jump.max_jump_velocity();
            }
        }
        if intent.jump_just_released() {
            self.velocity.y = self.velocity.y.min(config.jump.min_jump_velocity());
        }

        self.velocity.y += config.jump.gravity() * dt;
        self.velocity * dt
    }

    /// Stop vertical motion after landing or hitting a ceiling.
    pub fn settle(&mut self, contacts: &Contacts) {
        if contacts.any_vertical() {
            self.velocity.y = 0.0;
        }
    }
}

/// -1, 0 or 1.
fn axis_direction(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Critically damped approach of `current` toward `target`.
///
/// `velocity` carries the rate of change between calls. Never overshoots
/// the target.
pub fn smooth_damp(current: f32, target: f32, velocity: &mut f32, smooth_time: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return current;
    }

    let smooth_time = smooth_time.max(1e-4);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * decay;
    let mut output = target + (change + temp) * decay;

    // Crossed the target: stop on it
    if (target - current > 0.0) == (output > target) {
        output = target;
        *velocity = (output - target) / dt;
    }
    output
}

/// Write each platformer body's [`MoveRequest`] for this tick.
pub fn integrate_platformer_motion(
    time: Res<Time>,
    mut q_bodies: Query<(
        &PlatformerConfig,
        &mut PlatformerIntent,
        &mut PlatformerMotion,
        &CollisionState,
        &mut MoveRequest,
    )>,
) {
    let dt = time.delta_secs();
    for (config, mut intent, mut motion, state, mut request) in &mut q_bodies {
        let displacement = motion.step(config, &intent, &state.contacts, dt);
        request.displacement = displacement;
        request.input = intent.input;
        intent.latch();
    }
}

/// Zero vertical velocity of bodies that landed or bumped a ceiling.
pub fn settle_platformer_velocity(mut q_bodies: Query<(&CollisionState, &mut PlatformerMotion)>) {
    for (state, mut motion) in &mut q_bodies {
        motion.settle(&state.contacts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn grounded() -> Contacts {
        Contacts {
            below: true,
            ..default()
        }
    }

    #[test]
    fn jump_profile_derivations() {
        let jump = JumpProfile {
            max_jump_height: 2.0,
            min_jump_height: 0.5,
            time_to_jump_apex: 0.5,
        };
        assert!((jump.gravity() - -16.0).abs() < 1e-5);
        assert!((jump.max_jump_velocity() - 8.0).abs() < 1e-5);
        assert!((jump.min_jump_velocity() - 4.0).abs() < 1e-5);
    }

    #[test]
    fn smooth_damp_approaches_without_overshoot() {
        let mut velocity = 0.0;
        let mut value = 0.0;
        for _ in 0..120 {
            let next = smooth_damp(value, 6.0, &mut velocity, 0.1, DT);
            assert!(next >= value);
            assert!(next <= 6.0);
            value = next;
        }
        assert!((value - 6.0).abs() < 1e-3);
    }

    #[test]
    fn smooth_damp_ignores_zero_dt() {
        let mut velocity = 1.0;
        assert_eq!(smooth_damp(2.0, 6.0, &mut velocity, 0.1, 0.0), 2.0);
        assert_eq!(velocity, 1.0);
    }

    #[test]
    fn gravity_accumulates_in_the_air() {
        let config = PlatformerConfig::default();
        let intent = PlatformerIntent::new();
        let mut motion = PlatformerMotion::default();

        let displacement = motion.step(&config, &intent, &Contacts::default(), DT);

        let vy = config.jump.gravity() * DT;
        assert!((motion.velocity.y - vy).abs() < 1e-5);
        assert!((displacement.y - vy * DT).abs() < 1e-6);
        assert_eq!(displacement.x, 0.0);
    }

    #[test]
    fn jump_from_ground_uses_full_velocity() {
        let config = PlatformerConfig::default();
        let mut intent = PlatformerIntent::new();
        intent.set_jump_pressed(true);
        let mut motion = PlatformerMotion::default();

        motion.step(&config, &intent, &grounded(), DT);

        let expected = config.jump.max_jump_velocity() + config.jump.gravity() * DT;
        assert!((motion.velocity.y - expected).abs() < 1e-4);
    }

    #[test]
    fn jump_needs_ground() {
        let config = PlatformerConfig::default();
        let mut intent = PlatformerIntent::new();
        intent.set_jump_pressed(true);
        let mut motion = PlatformerMotion::default();

        motion.step(&config, &intent, &Contacts::default(), DT);

        assert!(motion.velocity.y < 0.0);
    }

    #[test]
    fn releasing_jump_cuts_rise() {
        let config = PlatformerConfig::default();
        let mut intent = PlatformerIntent::new();
        intent.set_jump_pressed(true);
        let mut motion = PlatformerMotion::default();
        motion.step(&config, &intent, &grounded(), DT);
        intent.latch();

        intent.set_jump_pressed(false);
        motion.step(&config, &intent, &Contacts::default(), DT);

        let expected = config.jump.min_jump_velocity() + config.jump.gravity() * DT;
        assert!((motion.velocity.y - expected).abs() < 1e-4);
    }

    #[test]
    fn walking_accelerates_toward_move_speed() {
        let config = PlatformerConfig::default();
        let mut intent = PlatformerIntent::new();
        intent.set_input(Vec2::new(1.0, 0.0));
        let mut motion = PlatformerMotion::default();

        for _ in 0..60 {
            motion.step(&config, &intent, &grounded(), DT);
            motion.settle(&grounded());
        }

        assert!((motion.velocity.x - config.move_speed).abs() < 1e-2);
        assert_eq!(motion.velocity.y, 0.0);
    }

    #[test]
    fn wall_slide_caps_fall_speed() {
        let config = PlatformerConfig::default();
        let intent = PlatformerIntent::new();
        let mut motion = PlatformerMotion {
            velocity: Vec2::new(0.0, -10.0),
            ..default()
        };
        let on_wall = Contacts {
            right: true,
            ..default()
        };

        motion.step(&config, &intent, &on_wall, DT);

        assert!(motion.wall_sliding);
        let expected = -config.wall_slide_speed_max + config.jump.gravity() * DT;
        assert!((motion.velocity.y - expected).abs() < 1e-4);
        assert_eq!(motion.time_to_wall_unstick, config.wall_stick_time);
    }

    #[test]
    fn wall_stick_holds_until_timer_runs_out() {
        let config = PlatformerConfig::default();
        let mut intent = PlatformerIntent::new();
        // Pushing away from a wall on the right
        intent.set_input(Vec2::new(-1.0, 0.0));
        let on_wall = Contacts {
            right: true,
            ..default()
        };
        let mut motion = PlatformerMotion {
            velocity: Vec2::new(0.0, -1.0),
            time_to_wall_unstick: config.wall_stick_time,
            ..default()
        };

        motion.step(&config, &intent, &on_wall, DT);

        assert_eq!(motion.velocity.x, 0.0);
        assert!((motion.time_to_wall_unstick - (config.wall_stick_time - DT)).abs() < 1e-6);
    }

    #[test]
    fn wall_jump_variants() {
        let config = PlatformerConfig::default();
        let on_right_wall = Contacts {
            right: true,
            ..default()
        };
        let sliding = PlatformerMotion {
            velocity: Vec2::new(0.0, -1.0),
            ..default()
        };
        let gravity_step = config.jump.gravity() * DT;

        let cases = [
            (1.0, config.wall_jump_climb),
            (0.0, config.wall_jump_off),
            (-1.0, config.wall_leap),
        ];
        for (input_x, kick) in cases {
            let mut intent = PlatformerIntent::new();
            intent.set_input(Vec2::new(input_x, 0.0));
            intent.set_jump_pressed(true);
            let mut motion = sliding;

            motion.step(&config, &intent, &on_right_wall, DT);

            // Pushed away from the wall on the right
            assert_eq!(motion.velocity.x, -kick.x, "input {input_x}");
            assert!((motion.velocity.y - (kick.y + gravity_step)).abs() < 1e-4);
        }
    }

    #[test]
    fn wall_jump_from_left_wall_goes_right() {
        let config = PlatformerConfig::default();
        let on_left_wall = Contacts {
            left: true,
            ..default()
        };
        let mut intent = PlatformerIntent::new();
        intent.set_jump_pressed(true);
        let mut motion = PlatformerMotion {
            velocity: Vec2::new(0.0, -1.0),
            ..default()
        };

        motion.step(&config, &intent, &on_left_wall, DT);

        assert_eq!(motion.velocity.x, config.wall_jump_off.x);
    }

    #[test]
    fn settle_on_vertical_contacts_only() {
        let mut motion = PlatformerMotion {
            velocity: Vec2::new(3.0, -5.0),
            ..default()
        };

        motion.settle(&Contacts {
            left: true,
            ..default()
        });
        assert_eq!(motion.velocity.y, -5.0);

        motion.settle(&Contacts {
            above: true,
            ..default()
        });
        assert_eq!(motion.velocity, Vec2::new(3.0, 0.0));
    }
}
