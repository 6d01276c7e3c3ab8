//! # `penguin_controller`
//!
//! A physics-driven locomotion state machine for a 2D flipbook penguin, with
//! physics backend abstraction.
//!
//! Every fixed tick the controller:
//! 1. Probes the feet, head and both flanks for static geometry
//! 2. Classifies the penguin as falling, upright, on a belly, on its head or
//!    swimming (liquid volumes override every contact)
//! 3. Applies state-dependent forces, impulses and torques: walking,
//!    standing up, push-starts, head flips, swim thrust and steering
//! 4. Runs a hydrodynamic lift model and feeds the bubble trail while swimming
//! 5. Selects one of nine flipbook clips, respecting unfinished one-shots
//!
//! ## Usage
//!
//! ```rust
//! use bevy::prelude::*;
//! use penguin_controller::prelude::*;
//!
//! // Core components for one penguin
//! let bundle = PenguinBundle::new(PenguinConfig::default());
//! assert_eq!(bundle.state, LocomotionState::Falling);
//! ```
//!
//! With Rapier2D:
//!
//! ```rust,no_run
//! use bevy::prelude::*;
//! use bevy_rapier2d::prelude::*;
//! use penguin_controller::prelude::*;
//!
//! App::new()
//!     .add_plugins(DefaultPlugins)
//!     .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
//!     .add_plugins(PenguinControllerPlugin::<Rapier2dBackend>::default())
//!     .run();
//! ```

use bevy::prelude::*;

use config::{PenguinConfig, PenguinController};
use input::PenguinInput;

pub mod animation;
pub mod backend;
pub mod config;
pub mod detection;
pub mod error;
pub mod events;
pub mod flipbook;
pub mod hydro;
pub mod input;
pub mod state;
pub mod systems;

#[cfg(feature = "rapier2d")]
pub mod rapier;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::animation::{ClipRequest, FlipbookAnimator, PenguinClip};
    pub use crate::backend::PenguinPhysicsBackend;
    pub use crate::config::{PenguinConfig, PenguinController};
    pub use crate::detection::{ContactProbes, ProbeSites};
    pub use crate::error::HydroError;
    pub use crate::events::{FlipbookFinished, LiquidEvent, LiquidVolume};
    pub use crate::flipbook::{ClipFrames, FlipbookLibrary};
    pub use crate::hydro::BubbleEmitter;
    pub use crate::input::{ButtonEdgeState, PenguinInput};
    pub use crate::state::LocomotionState;
    pub use crate::{PenguinBundle, PenguinControllerPlugin, PenguinControllerSet};

    #[cfg(feature = "rapier2d")]
    pub use crate::rapier::{Rapier2dBackend, Rapier2dPenguinBundle};
}

/// System sets for the fixed-tick controller pipeline, run in order.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum PenguinControllerSet {
    /// Backend bookkeeping before any force is added.
    Preparation,
    /// Contact probes.
    Sensors,
    /// Locomotion state resolution.
    Classification,
    /// Forces, impulses, torques and animation selection.
    Movement,
    /// Backend flushes accumulated forces to the physics body.
    FinalApplication,
}

/// Core components of a penguin.
///
/// Physics body components come from the backend (see
/// `Rapier2dPenguinBundle`).
#[derive(Bundle, Default)]
pub struct PenguinBundle {
    pub controller: PenguinController,
    pub config: PenguinConfig,
    pub input: PenguinInput,
    pub probes: detection::ContactProbes,
    pub state: state::LocomotionState,
    pub animator: animation::FlipbookAnimator,
    pub bubbles: hydro::BubbleEmitter,
}

impl PenguinBundle {
    pub fn new(config: PenguinConfig) -> Self {
        Self {
            config,
            ..default()
        }
    }
}

/// Main plugin for the penguin controller.
///
/// This plugin is generic over a physics backend `B` which provides the actual
/// physics operations (force application, contact probes, etc.).
pub struct PenguinControllerPlugin<B: backend::PenguinPhysicsBackend> {
    _marker: std::marker::PhantomData<B>,
}

impl<B: backend::PenguinPhysicsBackend> Default for PenguinControllerPlugin<B> {
    fn default() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<B: backend::PenguinPhysicsBackend> Plugin for PenguinControllerPlugin<B> {
    fn build(&self, app: &mut App) {
        app.register_type::<config::PenguinController>();
        app.register_type::<config::PenguinConfig>();
        app.register_type::<input::PenguinInput>();
        app.register_type::<detection::ContactProbes>();
        app.register_type::<state::LocomotionState>();
        app.register_type::<animation::FlipbookAnimator>();
        app.register_type::<hydro::BubbleEmitter>();
        app.register_type::<events::LiquidVolume>();

        app.add_event::<events::LiquidEvent>();
        app.add_event::<events::FlipbookFinished>();
        app.init_resource::<flipbook::FlipbookLibrary>();

        app.configure_sets(
            FixedUpdate,
            (
                PenguinControllerSet::Preparation,
                PenguinControllerSet::Sensors,
                PenguinControllerSet::Classification,
                PenguinControllerSet::Movement,
                PenguinControllerSet::FinalApplication,
            )
                .chain(),
        );

        // Add the physics backend plugin
        app.add_plugins(B::plugin());

        app.add_systems(
            FixedUpdate,
            systems::classify_locomotion.in_set(PenguinControllerSet::Classification),
        );

        app.add_systems(
            FixedUpdate,
            (
                systems::apply_medium::<B>,
                systems::apply_air_righting::<B>,
                systems::apply_horizontal_movement::<B>,
                systems::apply_jump_movement::<B>,
                systems::apply_swimming::<B>,
            )
                .chain()
                .in_set(PenguinControllerSet::Movement),
        );

        // Age jump edges once the whole fixed tick has seen them
        app.add_systems(FixedPostUpdate, systems::end_input_tick);

        // Asynchronous notifications and playback
        app.add_systems(
            Update,
            (
                systems::apply_liquid_events,
                flipbook::advance_flipbooks,
                flipbook::apply_flipbook_finished,
                flipbook::sync_flipbook_sprites,
            )
                .chain(),
        );
    }
}
