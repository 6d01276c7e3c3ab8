//! Core controller systems.
//!
//! These systems implement the per-tick locomotion state machine. They are
//! generic over the physics backend to allow different physics engines to
//! be used.

use bevy::log::warn_once;
use bevy::prelude::*;

use crate::animation::{self, ClipRequest, FlipbookAnimator, PenguinClip};
use crate::backend::PenguinPhysicsBackend;
use crate::config::{PenguinConfig, PenguinController};
use crate::detection::{body_up, classify, ContactProbes};
use crate::events::LiquidEvent;
use crate::hydro::{self, BubbleEmitter};
use crate::input::PenguinInput;
use crate::state::LocomotionState;

/// What the force systems need to know about one penguin this tick.
#[derive(Debug, Clone, Copy)]
struct PenguinSnapshot {
    entity: Entity,
    config: PenguinConfig,
    state: LocomotionState,
    input: PenguinInput,
}

fn collect_penguins(world: &mut World) -> Vec<PenguinSnapshot> {
    world
        .query_filtered::<(
            Entity,
            &PenguinConfig,
            &LocomotionState,
            Option<&PenguinInput>,
        ), With<PenguinController>>()
        .iter(world)
        .map(|(entity, config, state, input)| PenguinSnapshot {
            entity,
            config: *config,
            state: *state,
            input: input.copied().unwrap_or_default(),
        })
        .collect()
}

fn with_animator(world: &mut World, entity: Entity, f: impl FnOnce(&mut FlipbookAnimator)) {
    if let Some(mut animator) = world.get_mut::<FlipbookAnimator>(entity) {
        f(&mut *animator);
    }
}

fn facing_sign(world: &World, entity: Entity) -> f32 {
    world
        .get::<FlipbookAnimator>(entity)
        .map(FlipbookAnimator::facing_sign)
        .unwrap_or(1.0)
}

/// Apply liquid enter/exit notifications.
///
/// Sets the liquid flag read by the next classification and toggles the
/// bubble trail.
pub fn apply_liquid_events(
    mut events: EventReader<LiquidEvent>,
    mut q_penguins: Query<(&mut PenguinController, Option<&mut BubbleEmitter>)>,
) {
    for event in events.read() {
        let Ok((mut controller, emitter)) = q_penguins.get_mut(event.entity()) else {
            continue;
        };
        let entered = matches!(event, LiquidEvent::Entered(_));
        controller.in_liquid = entered;
        if let Some(mut emitter) = emitter {
            if entered {
                emitter.activate();
            } else {
                emitter.deactivate();
            }
        }
        debug!(entity = ?event.entity(), entered, "liquid volume overlap changed");
    }
}

/// Resolve this tick's locomotion state from the probes and liquid flag.
pub fn classify_locomotion(
    mut q_penguins: Query<(
        Entity,
        &PenguinController,
        &ContactProbes,
        &mut LocomotionState,
    )>,
) {
    for (entity, controller, probes, mut state) in &mut q_penguins {
        let next = classify(probes, controller.in_liquid);
        if *state != next {
            debug!(
                ?entity,
                from = state.label(),
                to = next.label(),
                "locomotion state changed"
            );
            *state = next;
        }
    }
}

/// Switch gravity and damping between swimming and dry-land values.
pub fn apply_medium<B: PenguinPhysicsBackend>(world: &mut World) {
    for penguin in collect_penguins(world) {
        let config = &penguin.config;
        let entity = penguin.entity;

        if penguin.state == LocomotionState::Swimming {
            B::set_gravity_enabled(world, entity, false, config.gravity_scale);
            B::set_linear_damping(world, entity, config.swim_linear_damping);
            B::set_angular_damping(world, entity, config.swim_angular_damping);
        } else {
            B::set_gravity_enabled(world, entity, true, config.gravity_scale);
            B::set_linear_damping(world, entity, config.dry_linear_damping);
            B::set_angular_damping(world, entity, config.dry_angular_damping);
        }
    }
}

/// Rotate a falling penguin while the jump that launched it is still held.
///
/// The torque flips the body forward in the facing direction, so it lands
/// the right way up after a long fall.
pub fn apply_air_righting<B: PenguinPhysicsBackend>(world: &mut World) {
    for penguin in collect_penguins(world) {
        if penguin.state != LocomotionState::Falling || !penguin.input.has_jumped {
            continue;
        }

        let entity = penguin.entity;
        let velocity = B::get_velocity(world, entity);
        if velocity.y >= 0.0 {
            continue;
        }

        let mass = B::get_mass(world, entity);
        let facing = facing_sign(world, entity);
        B::apply_torque(
            world,
            entity,
            -facing * penguin.config.air_righting_torque * mass,
        );
    }
}

/// Apply horizontal input: walking, standing up from a belly, swim steering,
/// and the matching animation.
pub fn apply_horizontal_movement<B: PenguinPhysicsBackend>(world: &mut World) {
    for penguin in collect_penguins(world) {
        let PenguinSnapshot {
            entity,
            config,
            state,
            input,
        } = penguin;

        let velocity = B::get_velocity(world, entity);
        let speed_sq = velocity.length_squared();

        if state == LocomotionState::Falling {
            with_animator(world, entity, |animator| {
                animator.request(animation::falling_clip());
            });
        }

        if !input.is_steering(config.dead_zone) {
            if let Some(request) = animation::resting_clip(state, speed_sq, &config) {
                with_animator(world, entity, |animator| {
                    animator.request(request);
                    if state.is_on_belly() {
                        animator.set_mirrored(state == LocomotionState::OnBellyLeft);
                    }
                });
            }
            continue;
        }

        let value = input.horizontal;
        let mass = B::get_mass(world, entity);

        match state {
            LocomotionState::OnFeet => {
                if speed_sq < config.walk_speed * config.walk_speed {
                    B::apply_force(world, entity, Vec2::X * config.walk_force * value * mass);
                }
                let mirrored = value < -config.dead_zone;
                with_animator(world, entity, |animator| {
                    if let Some(request) = animation::steering_clip(state) {
                        animator.request(request);
                    }
                    animator.set_mirrored(mirrored);
                });
            }
            // Lying on the left flank rotates clockwise back onto the feet
            LocomotionState::OnBellyLeft if value > 0.0 => {
                B::apply_torque(world, entity, -config.stand_up_torque * mass);
            }
            LocomotionState::OnBellyRight if value < 0.0 => {
                B::apply_torque(world, entity, config.stand_up_torque * mass);
            }
            // Positive input steers clockwise
            LocomotionState::Swimming => {
                B::apply_torque(world, entity, -config.swim_steer_torque * value * mass);
            }
            _ => {}
        }
    }
}

/// Fire the one-shot jump movement on the tick the jump button went down.
pub fn apply_jump_movement<B: PenguinPhysicsBackend>(world: &mut World) {
    for penguin in collect_penguins(world) {
        if !penguin.input.jump.just_entered() {
            continue;
        }

        let PenguinSnapshot {
            entity,
            config,
            state,
            ..
        } = penguin;

        let up = body_up(B::get_rotation(world, entity));
        let mass = B::get_mass(world, entity);

        match state {
            LocomotionState::OnFeet => {
                B::apply_impulse(world, entity, up * config.jump_impulse * mass);
                if let Some(mut input) = world.get_mut::<PenguinInput>(entity) {
                    input.has_jumped = true;
                }
            }
            LocomotionState::OnBellyLeft | LocomotionState::OnBellyRight => {
                let speed_sq = B::get_velocity(world, entity).length_squared();
                if speed_sq >= config.slide_push_max_speed * config.slide_push_max_speed {
                    continue;
                }
                B::apply_impulse(world, entity, up * config.push_impulse * mass);
                // Bounce through the fast slide so the push clip starts from
                // frame zero even when it is already playing
                with_animator(world, entity, |animator| {
                    animator.request(ClipRequest::forced(PenguinClip::BellyFast));
                    animator.request(ClipRequest::one_shot(PenguinClip::SlidePush));
                });
            }
            LocomotionState::OnHead => {
                let facing = facing_sign(world, entity);
                B::apply_impulse(world, entity, -up * config.head_jump_impulse * mass);
                B::apply_angular_impulse(
                    world,
                    entity,
                    -facing * config.head_flip_impulse * mass,
                );
            }
            LocomotionState::Falling | LocomotionState::Swimming => {}
        }
    }
}

/// Swimming: thrust, hydrodynamic lift, bubble rate and sprite facing.
pub fn apply_swimming<B: PenguinPhysicsBackend>(world: &mut World) {
    for penguin in collect_penguins(world) {
        if penguin.state != LocomotionState::Swimming {
            continue;
        }

        let PenguinSnapshot {
            entity,
            config,
            input,
            ..
        } = penguin;

        let velocity = B::get_velocity(world, entity);
        let up = body_up(B::get_rotation(world, entity));
        let mass = B::get_mass(world, entity);

        match hydro::normalized_speed(velocity, config.swim_speed) {
            Ok(ratio) => {
                if let Some(mut emitter) = world.get_mut::<BubbleEmitter>(entity) {
                    emitter.set_spawn_rate(config.bubble_spawn_rate * ratio);
                }
            }
            Err(err) => {
                warn_once!("skipping bubble spawn rate update: {err}");
            }
        }

        let alpha = hydro::angle_of_attack(velocity, up);
        let lift = hydro::hydro_lift(velocity, alpha) * config.hydro_lift_scale;
        if lift.is_finite() {
            B::apply_force(world, entity, lift);
        }

        let thrusting = input.jump.is_down();
        if thrusting && velocity.length_squared() < config.swim_speed * config.swim_speed {
            B::apply_force(world, entity, up * config.swim_thrust * mass);
        }

        let pitch = hydro::body_pitch(up);
        with_animator(world, entity, |animator| {
            animator.request(animation::swimming_clip(thrusting));
            if let Some(mirrored) =
                hydro::swim_flip(pitch, config.swim_flip_angle, animator.is_mirrored())
            {
                animator.set_mirrored(mirrored);
            }
        });
    }
}

/// Age jump edges at the end of the fixed tick.
pub fn end_input_tick(mut q_inputs: Query<&mut PenguinInput>) {
    for mut input in &mut q_inputs {
        if input.jump.just_entered() {
            input.end_tick();
        }
    }
}
