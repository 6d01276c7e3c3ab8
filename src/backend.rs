//! Physics backend abstraction.
//!
//! This module defines the trait that physics backends must implement to
//! drive a penguin. Backends also own contact probing: they install a sensor
//! system that fills [`ContactProbes`](crate::detection::ContactProbes) in
//! [`PenguinControllerSet::Sensors`](crate::PenguinControllerSet::Sensors).

use bevy::prelude::*;

/// Trait for physics backend implementations.
///
/// All vectors are in the 2D world plane. Torques and angular impulses are
/// scalars, positive counter-clockwise.
///
/// For an example implementation, see the `rapier` module's
/// `Rapier2dBackend`.
pub trait PenguinPhysicsBackend: 'static + Send + Sync {
    /// Returns the plugin that sets up this backend.
    fn plugin() -> impl Plugin;

    /// Get the current linear velocity of an entity.
    fn get_velocity(world: &World, entity: Entity) -> Vec2;

    /// Get the current rotation angle of an entity (in radians).
    fn get_rotation(world: &World, entity: Entity) -> f32;

    /// Get the mass of an entity.
    ///
    /// Every controller force is multiplied by this.
    fn get_mass(_world: &World, _entity: Entity) -> f32 {
        1.0
    }

    /// Apply a force for the current physics step.
    fn apply_force(world: &mut World, entity: Entity, force: Vec2);

    /// Apply an instantaneous change in momentum.
    fn apply_impulse(world: &mut World, entity: Entity, impulse: Vec2);

    /// Apply a torque for the current physics step.
    fn apply_torque(world: &mut World, entity: Entity, torque: f32);

    /// Apply an instantaneous change in angular momentum.
    fn apply_angular_impulse(world: &mut World, entity: Entity, impulse: f32);

    /// Enable or disable gravity on an entity.
    ///
    /// `scale` is the gravity scale to restore when enabling.
    fn set_gravity_enabled(world: &mut World, entity: Entity, enabled: bool, scale: f32);

    /// Set the linear damping of an entity.
    fn set_linear_damping(world: &mut World, entity: Entity, damping: f32);

    /// Set the angular damping of an entity.
    fn set_angular_damping(world: &mut World, entity: Entity, damping: f32);
}

/// Empty plugin for backends that don't need additional setup.
pub struct NoOpBackendPlugin;

impl Plugin for NoOpBackendPlugin {
    fn build(&self, _app: &mut App) {}
}
