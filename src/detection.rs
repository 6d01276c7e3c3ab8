//! Contact probes and locomotion classification.
//!
//! Four short-radius overlap probes sit at the feet, head and both flanks of
//! the body. Backends compute the probe sites with [`ProbeSites::compute`],
//! run the overlaps against static geometry and store the results in
//! [`ContactProbes`]. [`classify`] turns those results into a
//! [`LocomotionState`].

use bevy::prelude::*;

use crate::config::PenguinConfig;
use crate::state::LocomotionState;

/// One overlap probe: an origin and a radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactProbe {
    /// Probe centre in world space.
    pub origin: Vec2,
    /// Probe radius.
    pub radius: f32,
}

/// The four probe sites for one tick.
///
/// These are recomputed from the body pose every tick and never cached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeSites {
    pub feet: ContactProbe,
    pub head: ContactProbe,
    pub belly_left: ContactProbe,
    pub belly_right: ContactProbe,
}

impl ProbeSites {
    /// Compute the probe sites for a body.
    ///
    /// `rotation` is the body rotation in radians. The body's forward axis is
    /// `(cos, sin)` of it and its up axis is the forward axis rotated a
    /// quarter turn counter-clockwise.
    pub fn compute(position: Vec2, rotation: f32, config: &PenguinConfig) -> Self {
        let forward = body_forward(rotation);
        let up = forward.perp();
        let extents = config.half_extents;
        let vertical_radius = config.vertical_probe_radius();
        let flank_radius = config.flank_probe_radius();

        Self {
            feet: ContactProbe {
                origin: position - up * extents.y,
                radius: vertical_radius,
            },
            head: ContactProbe {
                origin: position + up * extents.y,
                radius: vertical_radius,
            },
            belly_left: ContactProbe {
                origin: position - forward * extents.x,
                radius: flank_radius,
            },
            belly_right: ContactProbe {
                origin: position + forward * extents.x,
                radius: flank_radius,
            },
        }
    }
}

/// Body forward axis for a rotation.
#[inline]
pub fn body_forward(rotation: f32) -> Vec2 {
    Vec2::from_angle(rotation)
}

/// Body up axis for a rotation.
#[inline]
pub fn body_up(rotation: f32) -> Vec2 {
    body_forward(rotation).perp()
}

/// Probe results for the current tick.
///
/// Written by the backend's sensor system. A probe that could not run (no
/// physics world) reads as a miss.
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[reflect(Component)]
pub struct ContactProbes {
    pub feet: bool,
    pub head: bool,
    pub belly_left: bool,
    pub belly_right: bool,
}

impl ContactProbes {
    /// Whether any probe hit.
    pub fn any(&self) -> bool {
        self.feet || self.head || self.belly_left || self.belly_right
    }

    /// Reset every probe to a miss.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Classification rules, lowest priority first.
///
/// Each matching rule overrides the ones before it, so when several probes
/// hit at once the feet win over the flanks, the right flank wins over the
/// left, and every flank wins over the head.
const CONTACT_RULES: [(fn(&ContactProbes) -> bool, LocomotionState); 4] = [
    (|p| p.head, LocomotionState::OnHead),
    (|p| p.belly_left, LocomotionState::OnBellyLeft),
    (|p| p.belly_right, LocomotionState::OnBellyRight),
    (|p| p.feet, LocomotionState::OnFeet),
];

/// Resolve the locomotion state for this tick.
///
/// Defaults to `Falling`. Liquid membership overrides every contact.
pub fn classify(probes: &ContactProbes, in_liquid: bool) -> LocomotionState {
    if in_liquid {
        return LocomotionState::Swimming;
    }

    CONTACT_RULES
        .iter()
        .filter(|(hit, _)| hit(probes))
        .map(|(_, state)| *state)
        .last()
        .unwrap_or(LocomotionState::Falling)
}
