//! Locomotion state component.
//!
//! The state is recomputed from scratch every fixed tick by the contact
//! classifier. Exactly one variant holds at any sampled instant.

use bevy::prelude::*;

/// Discrete locomotion state of a penguin.
///
/// `Falling` is the fallback when no contact probe hits and the character is
/// not inside a liquid volume. `Swimming` overrides every contact-derived
/// state.
///
/// # Example
///
/// ```rust
/// use penguin_controller::prelude::*;
///
/// let state = LocomotionState::default();
/// assert_eq!(state, LocomotionState::Falling);
/// assert!(!state.is_grounded());
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[reflect(Component)]
pub enum LocomotionState {
    /// No probe hit, not in liquid.
    #[default]
    Falling,
    /// Upright, feet probe touching ground.
    OnFeet,
    /// Lying with the left flank on the ground.
    OnBellyLeft,
    /// Lying with the right flank on the ground.
    OnBellyRight,
    /// Standing on the head.
    OnHead,
    /// Inside a liquid volume.
    Swimming,
}

impl LocomotionState {
    /// Every variant, in declaration order.
    pub const ALL: [LocomotionState; 6] = [
        LocomotionState::Falling,
        LocomotionState::OnFeet,
        LocomotionState::OnBellyLeft,
        LocomotionState::OnBellyRight,
        LocomotionState::OnHead,
        LocomotionState::Swimming,
    ];

    /// Whether any contact probe supports the body.
    pub fn is_grounded(&self) -> bool {
        matches!(
            self,
            LocomotionState::OnFeet
                | LocomotionState::OnBellyLeft
                | LocomotionState::OnBellyRight
                | LocomotionState::OnHead
        )
    }

    /// Whether the penguin is lying on either flank.
    pub fn is_on_belly(&self) -> bool {
        matches!(
            self,
            LocomotionState::OnBellyLeft | LocomotionState::OnBellyRight
        )
    }

    /// Short name used in logs and diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            LocomotionState::Falling => "falling",
            LocomotionState::OnFeet => "on_feet",
            LocomotionState::OnBellyLeft => "on_belly_left",
            LocomotionState::OnBellyRight => "on_belly_right",
            LocomotionState::OnHead => "on_head",
            LocomotionState::Swimming => "swimming",
        }
    }
}
