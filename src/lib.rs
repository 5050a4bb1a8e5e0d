//! # `raycast_controller_2d`
//!
//! A 2D kinematic character controller for Bevy that resolves movement with
//! raycasts instead of a physics simulation.
//!
//! Each fixed tick the controller takes the displacement a body *wants* to
//! travel and returns the displacement it *can* travel:
//! - Fans rays out from the body's bounds, shrunk by a small skin width
//! - Stops at walls and ceilings and lands on floors
//! - Walks up and down slopes up to a configurable angle
//! - Slides down slopes that are too steep to stand on
//! - Handles one-way platforms, including dropping through them on request
//! - Abstracts the geometry query so any physics engine can back it
//!   (Rapier2D and a built-in static geometry world included)
//!
//! ## Architecture
//!
//! The work is split over four system sets, chained in `FixedUpdate`:
//! 1. [`ControllerSet::Integrate`]: gameplay writes a [`MoveRequest`](intent::MoveRequest)
//!    (the optional platformer integrator does this from input)
//! 2. [`ControllerSet::Prepare`]: the backend refreshes body bounds, then
//!    the ray layout is recomputed if the body changed size
//! 3. [`ControllerSet::Resolve`]: the backend resolves every request
//! 4. [`ControllerSet::Apply`]: the body is moved and state markers synced
//!
//! The resolver itself ([`resolver::CollisionResolver`]) is plain Rust and
//! can be used without the ECS.
//!
//! ## Usage
//!
//! ```rust
//! use bevy::prelude::*;
//! use raycast_controller_2d::prelude::*;
//!
//! let mut app = App::new();
//! app.add_plugins(MinimalPlugins)
//!     .add_plugins(RaycastControllerPlugin::<SegmentBackend>::default());
//!
//! app.world_mut()
//!     .resource_mut::<StaticGeometry>()
//!     .add_box(Vec2::new(0.0, -0.5), Vec2::new(20.0, 0.5));
//!
//! app.world_mut().spawn((
//!     Transform::from_xyz(0.0, 1.0, 0.0),
//!     BoxBody::new(Vec2::new(0.5, 1.0)),
//!     PlatformerConfig::default(),
//! ));
//! ```

use bevy::prelude::*;

pub mod backend;
pub mod collision;
pub mod config;
pub mod error;
pub mod geometry;
pub mod intent;
pub mod motion;
pub mod resolver;
pub mod spacing;
pub mod state;
pub mod systems;

#[cfg(feature = "rapier2d")]
pub mod rapier;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::backend::{CharacterPhysicsBackend, RaycastQuery};
    pub use crate::collision::{OneWayPlatform, RayHit, SurfaceKind};
    pub use crate::config::ControllerConfig;
    pub use crate::error::ControllerError;
    pub use crate::geometry::{BoxBody, SegmentBackend, StaticGeometry};
    pub use crate::intent::{MoveRequest, PlatformerIntent, ResolvedMove};
    pub use crate::motion::{JumpProfile, PlatformerConfig, PlatformerMotion};
    pub use crate::resolver::CollisionResolver;
    pub use crate::spacing::{BodyBounds, RaySpacing};
    pub use crate::state::{
        Airborne, CollisionState, Contacts, Grounded, SlopeContact, SlopeInteraction,
        TouchingCeiling, TouchingWall,
    };
    pub use crate::{ControllerSet, RaycastControllerPlugin};

    #[cfg(feature = "rapier2d")]
    pub use crate::rapier::Rapier2dBackend;
}

/// System sets of the controller, run in order in `FixedUpdate`.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerSet {
    /// Produce this tick's move requests.
    Integrate,
    /// Refresh bounds and ray layout.
    Prepare,
    /// Resolve requests against the geometry.
    Resolve,
    /// Move bodies and publish the results.
    Apply,
}

/// Main plugin for the raycast controller.
///
/// This plugin is generic over a physics backend `B` which provides the
/// geometry the rays are cast against.
///
/// # Type Parameters
/// - `B`: The physics backend implementation (e.g., `Rapier2dBackend`)
///
/// # Examples
///
/// With Rapier2D backend:
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_rapier2d::prelude::*;
/// use raycast_controller_2d::prelude::*;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
///     .add_plugins(RaycastControllerPlugin::<Rapier2dBackend>::default())
///     .run();
/// ```
pub struct RaycastControllerPlugin<B: backend::CharacterPhysicsBackend> {
    _marker: std::marker::PhantomData<B>,
}

impl<B: backend::CharacterPhysicsBackend> Default for RaycastControllerPlugin<B> {
    fn default() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<B: backend::CharacterPhysicsBackend> Plugin for RaycastControllerPlugin<B> {
    fn build(&self, app: &mut App) {
        // Register core types
        app.register_type::<config::ControllerConfig>();
        app.register_type::<collision::SurfaceKind>();
        app.register_type::<spacing::BodyBounds>();
        app.register_type::<spacing::RaySpacing>();
        app.register_type::<state::CollisionState>();
        app.register_type::<state::Grounded>();
        app.register_type::<state::Airborne>();
        app.register_type::<state::TouchingWall>();
        app.register_type::<state::TouchingCeiling>();
        app.register_type::<intent::MoveRequest>();
        app.register_type::<intent::ResolvedMove>();
        app.register_type::<intent::PlatformerIntent>();
        app.register_type::<motion::PlatformerConfig>();
        app.register_type::<motion::PlatformerMotion>();

        app.configure_sets(
            FixedUpdate,
            (
                ControllerSet::Integrate,
                ControllerSet::Prepare,
                ControllerSet::Resolve,
                ControllerSet::Apply,
            )
                .chain(),
        );

        // Add the physics backend plugin
        app.add_plugins(B::plugin());

        app.add_systems(
            FixedUpdate,
            motion::integrate_platformer_motion.in_set(ControllerSet::Integrate),
        );
        app.add_systems(
            FixedUpdate,
            systems::refresh_ray_spacing.in_set(ControllerSet::Prepare),
        );
        app.add_systems(
            FixedUpdate,
            (
                systems::apply_resolved_move,
                systems::sync_state_markers,
                motion::settle_platformer_velocity,
            )
                .in_set(ControllerSet::Apply),
        );
    }
}
