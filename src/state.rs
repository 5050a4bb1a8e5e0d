//! Per-body collision state and state marker components.
//!
//! [`CollisionState`] is owned by the moving body and rewritten by every
//! move. The marker components mirror it for ECS queries and are synced
//! automatically after each resolve.

use bevy::prelude::*;

/// Blocking contacts detected by this tick's sweeps.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Contacts {
    pub above: bool,
    pub below: bool,
    pub left: bool,
    pub right: bool,
}

impl Contacts {
    /// Check if blocked on either side.
    #[inline]
    pub fn any_side(&self) -> bool {
        self.left || self.right
    }

    /// Check if blocked vertically (floor or ceiling).
    #[inline]
    pub fn any_vertical(&self) -> bool {
        self.above || self.below
    }
}

/// Slope surface tracked during a move.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct SlopeContact {
    /// Angle between the surface normal and up, in degrees.
    pub angle: f32,
    /// Surface normal.
    pub normal: Vec2,
}

impl SlopeContact {
    pub fn new(angle: f32, normal: Vec2) -> Self {
        Self { angle, normal }
    }
}

/// How the body interacts with a slope this tick.
///
/// Exactly one variant holds at a time; the payload is the slope being
/// followed.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq)]
pub enum SlopeInteraction {
    #[default]
    None,
    /// Walking up a walkable slope.
    Climbing(SlopeContact),
    /// Following a walkable slope downhill.
    Descending(SlopeContact),
    /// Sliding down a slope steeper than the walkable limit.
    SlidingMax(SlopeContact),
}

impl SlopeInteraction {
    /// The slope being followed, if any.
    pub fn contact(&self) -> Option<SlopeContact> {
        match *self {
            SlopeInteraction::None => None,
            SlopeInteraction::Climbing(c)
            | SlopeInteraction::Descending(c)
            | SlopeInteraction::SlidingMax(c) => Some(c),
        }
    }

    #[inline]
    pub fn angle(&self) -> Option<f32> {
        self.contact().map(|c| c.angle)
    }

    #[inline]
    pub fn is_climbing(&self) -> bool {
        matches!(self, SlopeInteraction::Climbing(_))
    }

    #[inline]
    pub fn is_descending(&self) -> bool {
        matches!(self, SlopeInteraction::Descending(_))
    }

    #[inline]
    pub fn is_sliding_max(&self) -> bool {
        matches!(self, SlopeInteraction::SlidingMax(_))
    }
}

/// Collision state of a moving body.
///
/// Created once at spawn, mutated only by the resolver, read by the movement
/// integrator and any other observer (jump logic, animation).
#[derive(Component, Reflect, Debug, Clone, PartialEq)]
#[reflect(Component)]
pub struct CollisionState {
    /// Sides blocked this tick.
    pub contacts: Contacts,
    /// Slope interaction this tick.
    pub slope: SlopeInteraction,
    /// Slope angle of the previous tick (`None` = no slope was tracked).
    pub slope_angle_old: Option<f32>,
    /// Displacement requested at the start of this tick, before any
    /// correction.
    pub move_amount_old: Vec2,
    /// Last nonzero horizontal direction: `1.0` (right) or `-1.0` (left).
    pub face_dir: f32,
    /// Simulation time (seconds) until which one-way platforms are ignored.
    pub falling_through_until: Option<f64>,
}

impl Default for CollisionState {
    fn default() -> Self {
        Self {
            contacts: Contacts::default(),
            slope: SlopeInteraction::None,
            slope_angle_old: None,
            move_amount_old: Vec2::ZERO,
            face_dir: 1.0,
            falling_through_until: None,
        }
    }
}

impl CollisionState {
    /// Create a new state facing right.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset per-tick data before a move.
    ///
    /// The previous slope angle is kept in `slope_angle_old` so a slope
    /// change can be detected within the tick. An expired drop-through
    /// deadline is cleared here.
    pub fn begin_tick(&mut self, requested: Vec2, now: f64) {
        self.slope_angle_old = self.slope.angle();
        self.slope = SlopeInteraction::None;
        self.contacts = Contacts::default();
        self.move_amount_old = requested;

        if self.falling_through_until.is_some_and(|until| now >= until) {
            self.falling_through_until = None;
        }
    }

    #[inline]
    pub fn above(&self) -> bool {
        self.contacts.above
    }

    #[inline]
    pub fn below(&self) -> bool {
        self.contacts.below
    }

    #[inline]
    pub fn left(&self) -> bool {
        self.contacts.left
    }

    #[inline]
    pub fn right(&self) -> bool {
        self.contacts.right
    }

    #[inline]
    pub fn climbing_slope(&self) -> bool {
        self.slope.is_climbing()
    }

    #[inline]
    pub fn descending_slope(&self) -> bool {
        self.slope.is_descending()
    }

    #[inline]
    pub fn sliding_down_max_slope(&self) -> bool {
        self.slope.is_sliding_max()
    }

    /// Angle of the tracked slope this tick, in degrees.
    #[inline]
    pub fn slope_angle(&self) -> Option<f32> {
        self.slope.angle()
    }

    /// Normal of the tracked slope, or zero when none.
    #[inline]
    pub fn slope_normal(&self) -> Vec2 {
        self.slope.contact().map(|c| c.normal).unwrap_or(Vec2::ZERO)
    }

    /// Check if one-way platforms are currently being dropped through.
    #[inline]
    pub fn falling_through_platform(&self) -> bool {
        self.falling_through_until.is_some()
    }
}

/// Marker component indicating the body is standing on something.
///
/// This is a marker component - it has no data, just indicates state.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use raycast_controller_2d::prelude::*;
///
/// fn check_grounded(grounded: Option<&Grounded>) -> bool {
///     grounded.is_some()
/// }
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Grounded;

/// Marker component indicating the body has nothing below it.
///
/// Mutually exclusive with [`Grounded`].
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Airborne;

/// Marker component indicating the body is pressed against a wall.
#[derive(Component, Reflect, Debug, Clone, Copy)]
#[reflect(Component)]
pub struct TouchingWall {
    /// Side of the wall: `-1.0` left, `1.0` right.
    pub direction: f32,
}

impl Default for TouchingWall {
    fn default() -> Self {
        Self { direction: 1.0 }
    }
}

impl TouchingWall {
    /// Create a new wall touch state.
    pub fn new(direction: f32) -> Self {
        Self { direction }
    }

    /// Check if the wall is on the left side.
    pub fn is_left(&self) -> bool {
        self.direction < 0.0
    }

    /// Check if the wall is on the right side.
    pub fn is_right(&self) -> bool {
        self.direction > 0.0
    }
}

/// Marker component indicating the body bumped a ceiling.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct TouchingCeiling;
