//! Player input components.
//!
//! Input arrives as a continuous horizontal axis and discrete jump
//! press/release edges. The controller reads this component every tick;
//! you handle the device side (keyboard, gamepad, network) in your own code.

use bevy::prelude::*;

/// Edge state of a button across fixed ticks.
///
/// `Entered` lasts for exactly one tick: the controller ages it to `Held` at
/// the end of the tick in which it was observed, so one-shot actions fire
/// once per press.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonEdgeState {
    /// Button is up.
    #[default]
    Released,
    /// Button went down this tick.
    Entered,
    /// Button has been down for at least one full tick.
    Held,
}

impl ButtonEdgeState {
    /// Whether the button is currently down (just pressed or held).
    #[inline]
    pub fn is_down(&self) -> bool {
        !matches!(self, ButtonEdgeState::Released)
    }

    /// Whether the button went down this tick.
    #[inline]
    pub fn just_entered(&self) -> bool {
        matches!(self, ButtonEdgeState::Entered)
    }
}

/// Per-character input state.
///
/// # Example
///
/// ```rust
/// use penguin_controller::prelude::*;
///
/// let mut input = PenguinInput::default();
/// input.on_jump_pressed();
/// assert_eq!(input.jump, ButtonEdgeState::Entered);
///
/// // End of the fixed tick
/// input.end_tick();
/// assert_eq!(input.jump, ButtonEdgeState::Held);
///
/// // Key repeat does not re-trigger the edge
/// input.on_jump_pressed();
/// assert_eq!(input.jump, ButtonEdgeState::Held);
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct PenguinInput {
    /// Horizontal axis value (-1.0 = left, 1.0 = right).
    pub horizontal: f32,
    /// Jump button edge state.
    pub jump: ButtonEdgeState,
    /// Set by a jump launched from the feet, cleared on release.
    ///
    /// While set, a falling penguin is rotated by the air-righting torque.
    pub has_jumped: bool,
}

impl PenguinInput {
    /// Create an idle input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the horizontal axis value. Clamped to `[-1, 1]`.
    pub fn on_horizontal(&mut self, value: f32) {
        self.horizontal = if value.is_finite() {
            value.clamp(-1.0, 1.0)
        } else {
            0.0
        };
    }

    /// Record a jump button-down event.
    ///
    /// Only a transition out of `Released` produces `Entered`; repeated
    /// presses without a release leave the state untouched.
    pub fn on_jump_pressed(&mut self) {
        if self.jump == ButtonEdgeState::Released {
            self.jump = ButtonEdgeState::Entered;
        }
    }

    /// Record a jump button-up event. Clears the has-jumped latch.
    pub fn on_jump_released(&mut self) {
        self.jump = ButtonEdgeState::Released;
        self.has_jumped = false;
    }

    /// Age the jump edge at the end of a fixed tick.
    pub fn end_tick(&mut self) {
        if self.jump == ButtonEdgeState::Entered {
            self.jump = ButtonEdgeState::Held;
        }
    }

    /// Whether the horizontal axis is outside the dead zone.
    #[inline]
    pub fn is_steering(&self, dead_zone: f32) -> bool {
        self.horizontal.abs() > dead_zone
    }
}
