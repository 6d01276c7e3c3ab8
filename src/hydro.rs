//! Hydrodynamic model for swimming.
//!
//! While swimming, the angle of attack between the planar velocity and the
//! body's up axis drives a lift force perpendicular to the velocity. It is
//! strongest at ±90° and vanishes when moving along the body axis. Speed also
//! feeds the bubble trail's spawn rate.

use bevy::prelude::*;

use crate::error::HydroError;

/// Velocities and axes shorter than this are treated as zero.
const DEGENERATE_LENGTH_SQ: f32 = 1e-8;

/// Inverse cosine with the argument clamped to `[0, 1]`.
///
/// Floating point overshoot past 1 (e.g. `1.0000001`) yields 0 instead of NaN.
#[inline]
pub fn alpha_from_cosine(cosine: f32) -> f32 {
    cosine.clamp(0.0, 1.0).acos()
}

/// Signed angle of attack between `velocity` and the body `up` axis.
///
/// Returns `Ok(0.0)` when either vector is degenerate. The sign follows the
/// out-of-plane component of `velocity × up`.
pub fn try_angle_of_attack(velocity: Vec2, up: Vec2) -> Result<f32, HydroError> {
    if velocity.length_squared() < DEGENERATE_LENGTH_SQ || up.length_squared() < DEGENERATE_LENGTH_SQ
    {
        return Ok(0.0);
    }

    let cosine = velocity.normalize().dot(up.normalize());
    let alpha = alpha_from_cosine(cosine);
    if !alpha.is_finite() {
        return Err(HydroError::NonFiniteAngle { cosine });
    }

    if velocity.perp_dot(up) < 0.0 {
        Ok(-alpha)
    } else {
        Ok(alpha)
    }
}

/// Angle of attack with the range error logged and replaced by 0.
pub fn angle_of_attack(velocity: Vec2, up: Vec2) -> f32 {
    try_angle_of_attack(velocity, up).unwrap_or_else(|err| {
        warn!(%err, "substituting zero angle of attack");
        0.0
    })
}

/// Lift vector for an angle of attack: the velocity's perpendicular scaled by
/// `sin(alpha)`.
///
/// Zero for a non-finite velocity or angle, so a corrupted body state never
/// reaches the physics engine as a force.
#[inline]
pub fn hydro_lift(velocity: Vec2, alpha: f32) -> Vec2 {
    if !velocity.is_finite() || !alpha.is_finite() || alpha == 0.0 {
        return Vec2::ZERO;
    }
    velocity.perp() * alpha.sin()
}

/// Squared speed relative to the squared swim speed. Not clamped above 1.
pub fn normalized_speed(velocity: Vec2, swim_speed: f32) -> Result<f32, HydroError> {
    let speed_sq = velocity.length_squared();
    let ratio = speed_sq / (swim_speed * swim_speed);
    if ratio.is_finite() {
        Ok(ratio)
    } else {
        Err(HydroError::NonFiniteSpeedRatio {
            speed_sq,
            swim_speed,
        })
    }
}

/// Signed body pitch relative to world up, counter-clockwise positive.
#[inline]
pub fn body_pitch(up: Vec2) -> f32 {
    (-up.x).atan2(up.y)
}

/// Mirroring the sprite should take after a swim roll, if it must change.
///
/// Pitched past `+flip_angle` the sprite faces left (mirrored); past
/// `-flip_angle` it faces right again.
pub fn swim_flip(pitch: f32, flip_angle: f32, mirrored: bool) -> Option<bool> {
    if pitch > flip_angle && !mirrored {
        Some(true)
    } else if pitch < -flip_angle && mirrored {
        Some(false)
    } else {
        None
    }
}

/// Bubble trail emitter driven by the controller.
///
/// The particle host reads `active` and `spawn_rate`; the controller only
/// toggles the emitter on liquid enter/exit and feeds the rate while swimming.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct BubbleEmitter {
    pub active: bool,
    pub spawn_rate: f32,
}

impl BubbleEmitter {
    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn set_spawn_rate(&mut self, rate: f32) {
        self.spawn_rate = rate;
    }
}
