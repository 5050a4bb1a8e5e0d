//! Movement request and intent components.
//!
//! [`MoveRequest`] is what the resolver consumes: a displacement for this
//! tick plus the directional input that drives one-way platform drop-through.
//! [`PlatformerIntent`] is the higher-level input read by the optional
//! platformer integrator, which turns it into a `MoveRequest`.

use bevy::prelude::*;

/// Displacement the body wants to travel this tick.
///
/// Written by the integrator (or any gameplay system) before
/// [`ControllerSet::Resolve`](crate::ControllerSet::Resolve); consumed by
/// [`apply_resolved_move`](crate::systems::apply_resolved_move).
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use raycast_controller_2d::prelude::*;
///
/// // Fall a little while holding down: drop through one-way platforms.
/// let request = MoveRequest::new(Vec2::new(0.0, -0.1)).with_input(Vec2::new(0.0, -1.0));
/// assert!(request.wants_drop_through());
///
/// let request = MoveRequest::new(Vec2::new(0.1, 0.0));
/// assert!(!request.wants_drop_through());
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq)]
#[reflect(Component)]
pub struct MoveRequest {
    /// Requested displacement in world units.
    pub displacement: Vec2,
    /// Directional input, each axis in `-1.0..=1.0`.
    pub input: Vec2,
    /// Caller knows the body stands on a moving platform: report `below`
    /// regardless of the sweeps.
    pub standing_on_platform: bool,
}

impl MoveRequest {
    /// Request a displacement with no directional input.
    pub fn new(displacement: Vec2) -> Self {
        Self {
            displacement,
            ..default()
        }
    }

    /// Builder: attach directional input (clamped per axis).
    pub fn with_input(mut self, input: Vec2) -> Self {
        self.input = input.clamp(Vec2::NEG_ONE, Vec2::ONE);
        self
    }

    /// Builder: mark the body as carried by a platform.
    pub fn on_platform(mut self) -> Self {
        self.standing_on_platform = true;
        self
    }

    /// Check if the input asks to drop through one-way platforms.
    #[inline]
    pub fn wants_drop_through(&self) -> bool {
        self.input.y <= -1.0
    }
}

/// Corrected displacement produced by the last resolve.
///
/// Left on the entity after the move is applied so observers can read what
/// actually happened this tick.
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq)]
#[reflect(Component)]
pub struct ResolvedMove {
    pub displacement: Vec2,
}

impl ResolvedMove {
    pub fn new(displacement: Vec2) -> Self {
        Self { displacement }
    }
}

/// Player or AI input for the platformer integrator.
///
/// You handle input detection in your code and set plain values here; the
/// integrator handles edge detection of the jump button.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use raycast_controller_2d::prelude::*;
///
/// let mut intent = PlatformerIntent::new();
/// intent.set_input(Vec2::new(2.0, 0.0));
/// assert_eq!(intent.input.x, 1.0);
///
/// intent.set_jump_pressed(true);
/// assert!(intent.jump_just_pressed());
/// ```
#[derive(Component, Reflect, Debug, Clone, Default, PartialEq)]
#[reflect(Component)]
pub struct PlatformerIntent {
    /// Directional input, each axis in `-1.0..=1.0`.
    pub input: Vec2,
    /// Whether the jump button is held this tick.
    pub jump_pressed: bool,
    /// Jump state seen by the previous tick.
    /// This is managed internally by the integrator.
    pub(crate) jump_pressed_prev: bool,
}

impl PlatformerIntent {
    /// Create a new empty intent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the directional input (clamped per axis).
    pub fn set_input(&mut self, input: Vec2) {
        self.input = input.clamp(Vec2::NEG_ONE, Vec2::ONE);
    }

    /// Set whether the jump button is held.
    pub fn set_jump_pressed(&mut self, pressed: bool) {
        self.jump_pressed = pressed;
    }

    /// Check if jump went from released to held since the last tick.
    pub fn jump_just_pressed(&self) -> bool {
        self.jump_pressed && !self.jump_pressed_prev
    }

    /// Check if jump went from held to released since the last tick.
    pub fn jump_just_released(&self) -> bool {
        !self.jump_pressed && self.jump_pressed_prev
    }

    /// Clear directional input.
    pub fn clear(&mut self) {
        self.input = Vec2::ZERO;
    }

    /// Remember this tick's jump state for edge detection.
    pub(crate) fn latch(&mut self) {
        self.jump_pressed_prev = self.jump_pressed;
    }
}
