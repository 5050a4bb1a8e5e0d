//! Error types for controller configuration and body geometry.
//!
//! All of these are contract violations detected up front, when a config is
//! validated or ray spacing is computed. They never surface mid-sweep.

use bevy::prelude::*;
use thiserror::Error;

/// Errors raised while validating a controller setup.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ControllerError {
    /// The body's bounds have no usable area once shrunk by the skin width.
    #[error("body bounds {size} are degenerate after shrinking by skin width {skin_width}")]
    DegenerateBounds {
        /// Raw bounds size (full width and height).
        size: Vec2,
        /// Skin width the bounds were shrunk by on each side.
        skin_width: f32,
    },
    /// Skin width must be a small positive finite value.
    #[error("skin width must be positive and finite, got {0}")]
    InvalidSkinWidth(f32),
    /// Target ray spacing must be positive and finite.
    #[error("max ray spacing must be positive and finite, got {0}")]
    InvalidRaySpacing(f32),
    /// Walkable slope limit must lie in `[0, 90)` degrees.
    #[error("max slope angle must be within [0, 90) degrees, got {0}")]
    InvalidSlopeLimit(f32),
    /// Drop-through delay must be non-negative and finite.
    #[error("platform drop delay must be non-negative and finite, got {0}")]
    InvalidDropDelay(f32),
}
