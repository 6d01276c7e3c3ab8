//! Recoverable error conditions.
//!
//! None of these ever escape a tick. Systems log them and substitute a safe
//! value or skip the affected update.

use thiserror::Error;

/// Numeric range errors from the hydrodynamic model.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum HydroError {
    /// The inverse cosine produced a non-finite angle.
    #[error("angle of attack is not finite (cosine {cosine})")]
    NonFiniteAngle { cosine: f32 },

    /// The normalized swim speed is not finite, usually a zero reference speed.
    #[error("normalized swim speed is not finite (speed² {speed_sq}, swim speed {swim_speed})")]
    NonFiniteSpeedRatio { speed_sq: f32, swim_speed: f32 },
}
