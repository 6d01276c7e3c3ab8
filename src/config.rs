//! Controller configuration components.
//!
//! This module defines the per-character hub component that systems share
//! during a tick and the immutable tuning parameters for a penguin.

use bevy::prelude::*;

/// Core penguin controller component.
///
/// This is the **central hub** for state that outlives a single system within
/// a tick: the liquid-volume flag set by trigger events and the force/torque
/// accumulators that physics backends flush at the end of the tick.
#[derive(Component, Reflect, Debug, Clone, Default)]
#[reflect(Component)]
pub struct PenguinController {
    /// Whether the penguin currently overlaps a liquid volume.
    ///
    /// Set and cleared by [`LiquidEvent`](crate::events::LiquidEvent)s.
    /// Read at the start of the next classification.
    pub in_liquid: bool,

    // === Force accumulation ===
    /// Forces accumulated this tick.
    pub(crate) accumulated_force: Vec2,
    /// Torque accumulated this tick.
    pub(crate) accumulated_torque: f32,
    /// Force written to the physics body last tick.
    pub(crate) applied_force: Vec2,
    /// Torque written to the physics body last tick.
    pub(crate) applied_torque: f32,
}

impl PenguinController {
    /// Create a new controller, out of any liquid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a force for this tick.
    pub fn add_force(&mut self, force: Vec2) {
        self.accumulated_force += force;
    }

    /// Add a torque for this tick.
    pub fn add_torque(&mut self, torque: f32) {
        self.accumulated_torque += torque;
    }

    /// Force accumulated so far this tick.
    pub fn accumulated_force(&self) -> Vec2 {
        self.accumulated_force
    }

    /// Torque accumulated so far this tick.
    pub fn accumulated_torque(&self) -> f32 {
        self.accumulated_torque
    }

    /// Start a new tick.
    ///
    /// Returns what was applied last tick so the backend can remove it from
    /// the body, and clears the accumulators.
    pub(crate) fn prepare_new_frame(&mut self) -> (Vec2, f32) {
        let previous = (self.applied_force, self.applied_torque);
        self.applied_force = Vec2::ZERO;
        self.applied_torque = 0.0;
        self.accumulated_force = Vec2::ZERO;
        self.accumulated_torque = 0.0;
        previous
    }

    /// Finish the tick.
    ///
    /// Returns the accumulated force and torque and remembers them for
    /// subtraction at the start of the next tick.
    pub(crate) fn finalize_frame(&mut self) -> (Vec2, f32) {
        self.applied_force = self.accumulated_force;
        self.applied_torque = self.accumulated_torque;
        (self.accumulated_force, self.accumulated_torque)
    }
}

/// Tuning parameters for a penguin.
///
/// Speeds are in world units per second. Every force, impulse and torque
/// magnitude is multiplied by the body mass when applied, so the defaults
/// produce the same acceleration regardless of collider density. The hydro
/// lift is the exception: it is scaled by [`hydro_lift_scale`] only.
///
/// [`hydro_lift_scale`]: PenguinConfig::hydro_lift_scale
///
/// # Example
///
/// ```rust
/// use penguin_controller::prelude::*;
///
/// let config = PenguinConfig::default()
///     .with_walk_speed(200.0)
///     .with_jump_impulse(900.0);
/// assert_eq!(config.walk_speed, 200.0);
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy)]
#[reflect(Component)]
pub struct PenguinConfig {
    // === Body ===
    /// Half extents of the body box (x = flank, y = feet/head).
    pub half_extents: Vec2,
    /// Probe radius = half extent of the probed axis / this divisor.
    pub probe_radius_divisor: f32,
    /// Horizontal input magnitude below which the axis is ignored.
    pub dead_zone: f32,

    // === Speed caps ===
    /// Walking force is only applied below this speed.
    pub walk_speed: f32,
    /// Above this speed a resting belly slide shows the fast slide clip.
    pub slide_fast_speed: f32,
    /// Push-starts are only possible below this speed.
    pub slide_push_max_speed: f32,
    /// Swim thrust is only applied below this speed. Also the reference
    /// speed for the bubble spawn rate.
    pub swim_speed: f32,

    // === Forces and impulses ===
    /// Horizontal walking force per unit of input.
    pub walk_force: f32,
    /// Upward impulse of a jump from the feet.
    pub jump_impulse: f32,
    /// Upward impulse of a push-start from the belly.
    pub push_impulse: f32,
    /// Downward impulse of a jump off the head.
    pub head_jump_impulse: f32,
    /// Forward thrust while swimming with the jump button down.
    pub swim_thrust: f32,

    // === Torques ===
    /// Torque used to push off the ground from a belly.
    pub stand_up_torque: f32,
    /// Torque rotating an airborne penguin while the jump button is held.
    pub air_righting_torque: f32,
    /// Steering torque per unit of input while swimming.
    pub swim_steer_torque: f32,
    /// Angular impulse flipping the penguin off a head stand.
    pub head_flip_impulse: f32,

    // === Hydrodynamics ===
    /// Multiplier applied to the hydrodynamic lift vector.
    pub hydro_lift_scale: f32,
    /// Bubble spawn rate at swim speed.
    pub bubble_spawn_rate: f32,
    /// Pitch (radians) beyond which the sprite is re-mirrored while swimming.
    pub swim_flip_angle: f32,

    // === Damping and gravity ===
    /// Linear damping while swimming.
    pub swim_linear_damping: f32,
    /// Angular damping while swimming.
    pub swim_angular_damping: f32,
    /// Linear damping out of liquid.
    pub dry_linear_damping: f32,
    /// Angular damping out of liquid.
    pub dry_angular_damping: f32,
    /// Gravity scale restored when leaving liquid.
    pub gravity_scale: f32,
}

impl Default for PenguinConfig {
    fn default() -> Self {
        Self {
            // Body
            half_extents: Vec2::new(42.0, 58.0),
            probe_radius_divisor: 3.0,
            dead_zone: 0.1,
            // Speed caps
            walk_speed: 150.0,
            slide_fast_speed: 400.0,
            slide_push_max_speed: 550.0,
            swim_speed: 2400.0,
            // Forces and impulses
            walk_force: 1500.0,
            jump_impulse: 750.0,
            push_impulse: 665.0,
            head_jump_impulse: 750.0,
            swim_thrust: 1200.0,
            // Torques
            stand_up_torque: 130_000.0,
            air_righting_torque: 30_000.0,
            swim_steer_torque: 14_000.0,
            head_flip_impulse: 12_000.0,
            // Hydrodynamics
            hydro_lift_scale: 30.0,
            bubble_spawn_rate: 250.0,
            swim_flip_angle: 30f32.to_radians(),
            // Damping and gravity
            swim_linear_damping: 0.65,
            swim_angular_damping: 1.5,
            dry_linear_damping: 0.01,
            dry_angular_damping: 0.0,
            gravity_scale: 1.0,
        }
    }
}

impl PenguinConfig {
    /// Set the body half extents.
    pub fn with_half_extents(mut self, half_extents: Vec2) -> Self {
        self.half_extents = half_extents;
        self
    }

    /// Set the horizontal input dead zone.
    pub fn with_dead_zone(mut self, dead_zone: f32) -> Self {
        self.dead_zone = dead_zone.max(0.0);
        self
    }

    /// Set the walking speed cap.
    pub fn with_walk_speed(mut self, speed: f32) -> Self {
        self.walk_speed = speed;
        self
    }

    /// Set the slide speed thresholds (fast-slide clip, push-start cap).
    pub fn with_slide_speeds(mut self, fast: f32, push_max: f32) -> Self {
        self.slide_fast_speed = fast;
        self.slide_push_max_speed = push_max;
        self
    }

    /// Set the swim speed cap.
    pub fn with_swim_speed(mut self, speed: f32) -> Self {
        self.swim_speed = speed;
        self
    }

    /// Set the jump impulse.
    pub fn with_jump_impulse(mut self, impulse: f32) -> Self {
        self.jump_impulse = impulse;
        self
    }

    /// Set the push-start impulse.
    pub fn with_push_impulse(mut self, impulse: f32) -> Self {
        self.push_impulse = impulse;
        self
    }

    /// Set the swim thrust and steering torque.
    pub fn with_swimming(mut self, thrust: f32, steer_torque: f32) -> Self {
        self.swim_thrust = thrust;
        self.swim_steer_torque = steer_torque;
        self
    }

    /// Set the bubble spawn rate at swim speed.
    pub fn with_bubble_spawn_rate(mut self, rate: f32) -> Self {
        self.bubble_spawn_rate = rate;
        self
    }

    /// Set the swim flip angle in degrees.
    pub fn with_swim_flip_angle_degrees(mut self, degrees: f32) -> Self {
        self.swim_flip_angle = degrees.to_radians();
        self
    }

    /// Probe radius for the feet and head probes.
    #[inline]
    pub fn vertical_probe_radius(&self) -> f32 {
        self.half_extents.y / self.probe_radius_divisor
    }

    /// Probe radius for the flank probes.
    #[inline]
    pub fn flank_probe_radius(&self) -> f32 {
        self.half_extents.x / self.probe_radius_divisor
    }
}
