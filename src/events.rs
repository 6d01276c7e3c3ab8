//! Asynchronous notifications.
//!
//! Both events only flip a latch that the next fixed tick reads, so they are
//! consumed in `Update` regardless of where the fixed schedule is.

use bevy::prelude::*;

/// A penguin entered or left a liquid volume.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiquidEvent {
    Entered(Entity),
    Exited(Entity),
}

impl LiquidEvent {
    pub fn entity(&self) -> Entity {
        match self {
            LiquidEvent::Entered(entity) | LiquidEvent::Exited(entity) => *entity,
        }
    }
}

/// A non-looping flipbook clip reached its last frame.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlipbookFinished {
    pub entity: Entity,
}

/// Marker for sensor colliders that count as liquid.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct LiquidVolume;
