//! Core controller systems.
//!
//! These systems are backend independent: they keep the ray layout current,
//! apply resolved moves and mirror the collision state into marker
//! components. The backend contributes the resolve system itself.

use bevy::prelude::*;

use crate::backend::RaycastQuery;
use crate::config::ControllerConfig;
use crate::intent::{MoveRequest, ResolvedMove};
use crate::resolver::CollisionResolver;
use crate::spacing::{BodyBounds, RaySpacing};
use crate::state::{Airborne, CollisionState, Grounded, TouchingCeiling, TouchingWall};

/// Resolve one body's pending request against `query`.
///
/// Shared by every backend's resolve system.
pub fn resolve_request<Q: RaycastQuery + ?Sized>(
    query: &Q,
    config: &ControllerConfig,
    bounds: &BodyBounds,
    spacing: &RaySpacing,
    request: &MoveRequest,
    state: &mut CollisionState,
    now: f64,
) -> ResolvedMove {
    let resolver = CollisionResolver::new(query, config, spacing);
    ResolvedMove::new(resolver.resolve(bounds, state, request, now))
}

/// Keep each body's [`RaySpacing`] in step with its bounds.
///
/// Spacing is recomputed only when the body changes size. Bodies with an
/// invalid config or degenerate bounds are logged and left without spacing,
/// which keeps them out of the resolve step.
pub fn refresh_ray_spacing(
    mut commands: Commands,
    mut q_bodies: Query<(Entity, &ControllerConfig, &BodyBounds, Option<&RaySpacing>)>,
) {
    for (entity, config, bounds, spacing) in &mut q_bodies {
        if spacing.is_some_and(|s| !s.needs_refresh(bounds, config.skin_width)) {
            continue;
        }

        let computed = config.validate().and_then(|()| {
            RaySpacing::compute(bounds, config.skin_width, config.max_ray_spacing)
        });

        match computed {
            Ok(spacing) => {
                debug!(
                    "ray spacing for {entity}: {}x{} rays",
                    spacing.horizontal_ray_count, spacing.vertical_ray_count
                );
                commands.entity(entity).insert(spacing);
            }
            Err(err) => {
                error!("cannot lay out rays for {entity}: {err}");
                if spacing.is_some() {
                    commands.entity(entity).remove::<RaySpacing>();
                }
            }
        }
    }
}

/// Translate each body by its resolved displacement and consume the request.
///
/// Only moves resolved since the last run are applied. The request keeps its
/// input and platform flag; only the displacement is cleared, so a body
/// nobody drives still gets a zero move every tick.
pub fn apply_resolved_move(
    mut q_bodies: Query<(&mut Transform, Ref<ResolvedMove>, &mut MoveRequest), With<RaySpacing>>,
) {
    for (mut transform, resolved, mut request) in &mut q_bodies {
        if !resolved.is_changed() {
            continue;
        }
        transform.translation += resolved.displacement.extend(0.0);
        request.displacement = Vec2::ZERO;
    }
}

/// Sync state marker components from the latest [`CollisionState`].
pub fn sync_state_markers(
    mut commands: Commands,
    q_bodies: Query<(
        Entity,
        &CollisionState,
        Option<&TouchingWall>,
        Has<Grounded>,
        Has<Airborne>,
        Has<TouchingCeiling>,
    )>,
) {
    for (entity, state, wall, has_grounded, has_airborne, has_ceiling) in &q_bodies {
        // Sync Grounded/Airborne
        if state.below() && !has_grounded {
            commands.entity(entity).insert(Grounded);
            commands.entity(entity).remove::<Airborne>();
        } else if !state.below() && has_grounded {
            commands.entity(entity).remove::<Grounded>();
            commands.entity(entity).insert(Airborne);
        } else if !state.below() && !has_airborne && !has_grounded {
            commands.entity(entity).insert(Airborne);
        }

        // Sync TouchingWall, updating the side if it flipped
        let wall_direction = if state.left() {
            Some(-1.0)
        } else if state.right() {
            Some(1.0)
        } else {
            None
        };
        match (wall_direction, wall) {
            (Some(direction), Some(wall)) if wall.direction == direction => {}
            (Some(direction), _) => {
                commands.entity(entity).insert(TouchingWall::new(direction));
            }
            (None, Some(_)) => {
                commands.entity(entity).remove::<TouchingWall>();
            }
            (None, None) => {}
        }

        // Sync TouchingCeiling
        if state.above() && !has_ceiling {
            commands.entity(entity).insert(TouchingCeiling);
        } else if !state.above() && has_ceiling {
            commands.entity(entity).remove::<TouchingCeiling>();
        }
    }
}
