//! State machine tests against a recording backend.
//!
//! No physics engine runs here: probes are written directly and the backend
//! records every force, impulse and medium change the controller asks for.
//! Each test checks the exact request against the default tuning.

use bevy::prelude::*;
use penguin_controller::backend::NoOpBackendPlugin;
use penguin_controller::prelude::*;

const MASS: f32 = 2.0;

/// Body state and every controller request for one entity.
#[derive(Component, Debug, Default)]
struct Recorder {
    velocity: Vec2,
    rotation: f32,
    forces: Vec<Vec2>,
    impulses: Vec<Vec2>,
    torques: Vec<f32>,
    angular_impulses: Vec<f32>,
    gravity: Option<bool>,
    linear_damping: Option<f32>,
    angular_damping: Option<f32>,
}

struct RecordingBackend;

fn record(world: &mut World, entity: Entity, f: impl FnOnce(&mut Recorder)) {
    if let Some(mut recorder) = world.get_mut::<Recorder>(entity) {
        f(&mut *recorder);
    }
}

impl PenguinPhysicsBackend for RecordingBackend {
    fn plugin() -> impl Plugin {
        NoOpBackendPlugin
    }

    fn get_velocity(world: &World, entity: Entity) -> Vec2 {
        world
            .get::<Recorder>(entity)
            .map(|r| r.velocity)
            .unwrap_or(Vec2::ZERO)
    }

    fn get_rotation(world: &World, entity: Entity) -> f32 {
        world.get::<Recorder>(entity).map(|r| r.rotation).unwrap_or(0.0)
    }

    fn get_mass(_world: &World, _entity: Entity) -> f32 {
        MASS
    }

    fn apply_force(world: &mut World, entity: Entity, force: Vec2) {
        record(world, entity, |r| r.forces.push(force));
    }

    fn apply_impulse(world: &mut World, entity: Entity, impulse: Vec2) {
        record(world, entity, |r| r.impulses.push(impulse));
    }

    fn apply_torque(world: &mut World, entity: Entity, torque: f32) {
        record(world, entity, |r| r.torques.push(torque));
    }

    fn apply_angular_impulse(world: &mut World, entity: Entity, impulse: f32) {
        record(world, entity, |r| r.angular_impulses.push(impulse));
    }

    fn set_gravity_enabled(world: &mut World, entity: Entity, enabled: bool, _scale: f32) {
        record(world, entity, |r| r.gravity = Some(enabled));
    }

    fn set_linear_damping(world: &mut World, entity: Entity, damping: f32) {
        record(world, entity, |r| r.linear_damping = Some(damping));
    }

    fn set_angular_damping(world: &mut World, entity: Entity, damping: f32) {
        record(world, entity, |r| r.angular_damping = Some(damping));
    }
}

fn create_test_app() -> App {
    let mut app = App::new();
    app.init_resource::<Time>();
    app.add_plugins(PenguinControllerPlugin::<RecordingBackend>::default());
    app
}

fn spawn_penguin(app: &mut App, probes: ContactProbes) -> Entity {
    app.world_mut()
        .spawn((
            PenguinBundle {
                probes,
                ..default()
            },
            Recorder::default(),
        ))
        .id()
}

/// Run one fixed tick, then the post-tick input aging.
fn tick(app: &mut App) {
    app.world_mut().run_schedule(FixedUpdate);
    app.world_mut().run_schedule(FixedPostUpdate);
}

fn feet() -> ContactProbes {
    ContactProbes {
        feet: true,
        ..default()
    }
}

fn input(app: &mut App, entity: Entity) -> Mut<'_, PenguinInput> {
    app.world_mut().get_mut::<PenguinInput>(entity).unwrap()
}

fn recorder(app: &App, entity: Entity) -> &Recorder {
    app.world().get::<Recorder>(entity).unwrap()
}

fn animator(app: &App, entity: Entity) -> &FlipbookAnimator {
    app.world().get::<FlipbookAnimator>(entity).unwrap()
}

fn state(app: &App, entity: Entity) -> LocomotionState {
    *app.world().get::<LocomotionState>(entity).unwrap()
}

fn clear_recorder(app: &mut App, entity: Entity) {
    let mut recorder = app.world_mut().get_mut::<Recorder>(entity).unwrap();
    recorder.forces.clear();
    recorder.impulses.clear();
    recorder.torques.clear();
    recorder.angular_impulses.clear();
}

fn total_force(recorder: &Recorder) -> Vec2 {
    recorder.forces.iter().copied().sum()
}

// ==================== Walking ====================

#[test]
fn walking_right_pushes_along_input() {
    let mut app = create_test_app();
    let penguin = spawn_penguin(&mut app, feet());
    input(&mut app, penguin).on_horizontal(0.5);

    tick(&mut app);

    assert_eq!(state(&app, penguin), LocomotionState::OnFeet);
    let force = total_force(recorder(&app, penguin));
    let expected = 1500.0 * 0.5 * MASS;
    assert!((force.x - expected).abs() < 1e-3, "force.x = {}", force.x);
    assert!(force.y.abs() < 1e-6);

    let animator = animator(&app, penguin);
    assert_eq!(animator.clip(), PenguinClip::Waddle);
    assert!(!animator.is_mirrored());
}

#[test]
fn walking_left_mirrors_the_sprite() {
    let mut app = create_test_app();
    let penguin = spawn_penguin(&mut app, feet());
    input(&mut app, penguin).on_horizontal(-1.0);

    tick(&mut app);

    assert!(total_force(recorder(&app, penguin)).x < 0.0);
    assert!(animator(&app, penguin).is_mirrored());
}

#[test]
fn walking_force_stops_at_speed_cap() {
    let mut app = create_test_app();
    let penguin = spawn_penguin(&mut app, feet());
    input(&mut app, penguin).on_horizontal(1.0);
    app.world_mut()
        .get_mut::<Recorder>(penguin)
        .unwrap()
        .velocity = Vec2::new(150.0, 0.0);

    tick(&mut app);

    assert!(recorder(&app, penguin).forces.is_empty());
    // The walk clip is still selected
    assert_eq!(animator(&app, penguin).clip(), PenguinClip::Waddle);
}

#[test]
fn input_inside_dead_zone_idles() {
    let mut app = create_test_app();
    let penguin = spawn_penguin(&mut app, feet());
    input(&mut app, penguin).on_horizontal(0.05);

    tick(&mut app);

    assert!(recorder(&app, penguin).forces.is_empty());
    assert_eq!(animator(&app, penguin).clip(), PenguinClip::Idle);
}

// ==================== Jumping ====================

#[test]
fn jump_fires_once_per_press() {
    let mut app = create_test_app();
    let penguin = spawn_penguin(&mut app, feet());
    input(&mut app, penguin).on_jump_pressed();

    tick(&mut app);

    let impulses = &recorder(&app, penguin).impulses;
    assert_eq!(impulses.len(), 1);
    assert!((impulses[0] - Vec2::new(0.0, 750.0 * MASS)).length() < 1e-3);

    let current = *app.world().get::<PenguinInput>(penguin).unwrap();
    assert!(current.has_jumped);
    assert_eq!(current.jump, ButtonEdgeState::Held);

    // Holding the button does not jump again
    tick(&mut app);
    tick(&mut app);
    assert_eq!(recorder(&app, penguin).impulses.len(), 1);

    // Release and press again
    input(&mut app, penguin).on_jump_released();
    input(&mut app, penguin).on_jump_pressed();
    tick(&mut app);
    assert_eq!(recorder(&app, penguin).impulses.len(), 2);
}

#[test]
fn jump_follows_body_up_axis() {
    let mut app = create_test_app();
    let penguin = spawn_penguin(&mut app, feet());
    app.world_mut()
        .get_mut::<Recorder>(penguin)
        .unwrap()
        .rotation = std::f32::consts::FRAC_PI_2;
    input(&mut app, penguin).on_jump_pressed();

    tick(&mut app);

    // Rotated a quarter turn counter-clockwise, up points along -x
    let impulse = recorder(&app, penguin).impulses[0];
    assert!((impulse - Vec2::new(-750.0 * MASS, 0.0)).length() < 1e-2);
}

#[test]
fn release_clears_has_jumped() {
    let mut app = create_test_app();
    let penguin = spawn_penguin(&mut app, feet());
    input(&mut app, penguin).on_jump_pressed();
    tick(&mut app);

    input(&mut app, penguin).on_jump_released();
    assert!(!app.world().get::<PenguinInput>(penguin).unwrap().has_jumped);
}

// ==================== Belly ====================

#[test]
fn push_start_plays_slide_push_once() {
    let mut app = create_test_app();
    let penguin = spawn_penguin(
        &mut app,
        ContactProbes {
            belly_left: true,
            ..default()
        },
    );
    input(&mut app, penguin).on_jump_pressed();

    tick(&mut app);

    assert_eq!(state(&app, penguin), LocomotionState::OnBellyLeft);
    let impulses = &recorder(&app, penguin).impulses;
    assert_eq!(impulses.len(), 1);
    assert!((impulses[0] - Vec2::new(0.0, 665.0 * MASS)).length() < 1e-3);

    let current = animator(&app, penguin);
    assert_eq!(current.clip(), PenguinClip::SlidePush);
    assert!(current.is_busy_with_one_shot());
    assert!(!current.is_looping());

    // The resting belly clip cannot interrupt the push
    tick(&mut app);
    assert_eq!(animator(&app, penguin).clip(), PenguinClip::SlidePush);

    // Until playback reports it finished
    app.world_mut()
        .get_mut::<FlipbookAnimator>(penguin)
        .unwrap()
        .on_playback_finished();
    tick(&mut app);
    assert_eq!(animator(&app, penguin).clip(), PenguinClip::Belly);
}

#[test]
fn push_start_needs_low_speed() {
    let mut app = create_test_app();
    let penguin = spawn_penguin(
        &mut app,
        ContactProbes {
            belly_right: true,
            ..default()
        },
    );
    app.world_mut()
        .get_mut::<Recorder>(penguin)
        .unwrap()
        .velocity = Vec2::new(600.0, 0.0);
    input(&mut app, penguin).on_jump_pressed();

    tick(&mut app);

    assert!(recorder(&app, penguin).impulses.is_empty());
    // Sliding fast with no input shows the fast slide
    assert_eq!(animator(&app, penguin).clip(), PenguinClip::BellyFast);
}

#[test]
fn stand_up_torque_rotates_toward_the_feet() {
    let mut app = create_test_app();
    let left = spawn_penguin(
        &mut app,
        ContactProbes {
            belly_left: true,
            ..default()
        },
    );
    let right = spawn_penguin(
        &mut app,
        ContactProbes {
            belly_right: true,
            ..default()
        },
    );
    input(&mut app, left).on_horizontal(1.0);
    input(&mut app, right).on_horizontal(-1.0);

    tick(&mut app);

    assert_eq!(recorder(&app, left).torques, vec![-130_000.0 * MASS]);
    assert_eq!(recorder(&app, right).torques, vec![130_000.0 * MASS]);
}

#[test]
fn stand_up_ignores_input_away_from_the_feet() {
    let mut app = create_test_app();
    let penguin = spawn_penguin(
        &mut app,
        ContactProbes {
            belly_left: true,
            ..default()
        },
    );
    input(&mut app, penguin).on_horizontal(-1.0);

    tick(&mut app);

    assert!(recorder(&app, penguin).torques.is_empty());
}

#[test]
fn resting_on_left_belly_mirrors() {
    let mut app = create_test_app();
    let penguin = spawn_penguin(
        &mut app,
        ContactProbes {
            belly_left: true,
            ..default()
        },
    );

    tick(&mut app);

    assert_eq!(animator(&app, penguin).clip(), PenguinClip::Belly);
    assert!(animator(&app, penguin).is_mirrored());
}

// ==================== Head ====================

#[test]
fn head_jump_pushes_down_and_flips() {
    let mut app = create_test_app();
    let penguin = spawn_penguin(
        &mut app,
        ContactProbes {
            head: true,
            ..default()
        },
    );
    input(&mut app, penguin).on_jump_pressed();

    tick(&mut app);

    assert_eq!(state(&app, penguin), LocomotionState::OnHead);
    let recorder = recorder(&app, penguin);
    assert_eq!(recorder.impulses.len(), 1);
    assert!((recorder.impulses[0] - Vec2::new(0.0, -750.0 * MASS)).length() < 1e-3);
    assert_eq!(recorder.angular_impulses, vec![-12_000.0 * MASS]);
}

// ==================== Falling ====================

#[test]
fn air_righting_after_jump_while_descending() {
    let mut app = create_test_app();
    let penguin = spawn_penguin(&mut app, ContactProbes::default());
    {
        let mut input = input(&mut app, penguin);
        input.on_jump_pressed();
        input.has_jumped = true;
    }
    app.world_mut()
        .get_mut::<Recorder>(penguin)
        .unwrap()
        .velocity = Vec2::new(0.0, -10.0);

    tick(&mut app);

    assert_eq!(state(&app, penguin), LocomotionState::Falling);
    assert_eq!(recorder(&app, penguin).torques, vec![-30_000.0 * MASS]);
    assert_eq!(animator(&app, penguin).clip(), PenguinClip::Falling);
}

#[test]
fn no_air_righting_while_rising() {
    let mut app = create_test_app();
    let penguin = spawn_penguin(&mut app, ContactProbes::default());
    input(&mut app, penguin).has_jumped = true;
    app.world_mut()
        .get_mut::<Recorder>(penguin)
        .unwrap()
        .velocity = Vec2::new(0.0, 10.0);

    tick(&mut app);

    assert!(recorder(&app, penguin).torques.is_empty());
}

// ==================== Swimming ====================

fn spawn_swimmer(app: &mut App) -> Entity {
    let penguin = spawn_penguin(app, feet());
    app.world_mut()
        .get_mut::<PenguinController>(penguin)
        .unwrap()
        .in_liquid = true;
    penguin
}

#[test]
fn liquid_overrides_contacts() {
    let mut app = create_test_app();
    let penguin = spawn_swimmer(&mut app);

    tick(&mut app);

    assert_eq!(state(&app, penguin), LocomotionState::Swimming);
    let recorder = recorder(&app, penguin);
    assert_eq!(recorder.gravity, Some(false));
    assert_eq!(recorder.linear_damping, Some(0.65));
    assert_eq!(recorder.angular_damping, Some(1.5));
    assert_eq!(animator(&app, penguin).clip(), PenguinClip::InWater);
}

#[test]
fn dry_land_restores_gravity_and_damping() {
    let mut app = create_test_app();
    let penguin = spawn_penguin(&mut app, feet());

    tick(&mut app);

    let recorder = recorder(&app, penguin);
    assert_eq!(recorder.gravity, Some(true));
    assert_eq!(recorder.linear_damping, Some(0.01));
    assert_eq!(recorder.angular_damping, Some(0.0));
}

#[test]
fn swim_thrust_while_jump_is_held() {
    let mut app = create_test_app();
    let penguin = spawn_swimmer(&mut app);
    input(&mut app, penguin).on_jump_pressed();

    tick(&mut app);
    clear_recorder(&mut app, penguin);

    // Held, not just pressed: thrust continues
    tick(&mut app);

    let force = total_force(recorder(&app, penguin));
    assert!((force - Vec2::new(0.0, 1200.0 * MASS)).length() < 1e-3);
    assert_eq!(animator(&app, penguin).clip(), PenguinClip::Swimming);
    // No jump impulse in water
    assert!(recorder(&app, penguin).impulses.is_empty());
}

#[test]
fn swim_thrust_stops_at_swim_speed() {
    let mut app = create_test_app();
    let penguin = spawn_swimmer(&mut app);
    input(&mut app, penguin).on_jump_pressed();
    // Moving along the body axis: no lift, only the capped thrust
    app.world_mut()
        .get_mut::<Recorder>(penguin)
        .unwrap()
        .velocity = Vec2::new(0.0, 2400.0);

    tick(&mut app);

    let force = total_force(recorder(&app, penguin));
    assert!(force.length() < 1e-2, "force = {force:?}");
}

#[test]
fn swim_steering_torque() {
    let mut app = create_test_app();
    let penguin = spawn_swimmer(&mut app);
    input(&mut app, penguin).on_horizontal(1.0);

    tick(&mut app);

    assert_eq!(recorder(&app, penguin).torques, vec![-14_000.0 * MASS]);
}

#[test]
fn bubble_rate_follows_speed() {
    let mut app = create_test_app();
    let penguin = spawn_swimmer(&mut app);
    app.world_mut()
        .get_mut::<Recorder>(penguin)
        .unwrap()
        .velocity = Vec2::new(0.0, 1200.0);

    tick(&mut app);

    // Half the swim speed: a quarter of the squared reference
    let emitter = app.world().get::<BubbleEmitter>(penguin).unwrap();
    assert!((emitter.spawn_rate - 62.5).abs() < 1e-2);
}

#[test]
fn bubble_rate_kept_when_swim_speed_is_zero() {
    let mut app = create_test_app();
    let penguin = spawn_swimmer(&mut app);
    app.world_mut()
        .get_mut::<PenguinConfig>(penguin)
        .unwrap()
        .swim_speed = 0.0;
    app.world_mut()
        .get_mut::<BubbleEmitter>(penguin)
        .unwrap()
        .spawn_rate = 42.0;
    app.world_mut()
        .get_mut::<Recorder>(penguin)
        .unwrap()
        .velocity = Vec2::new(100.0, 0.0);

    tick(&mut app);

    let emitter = app.world().get::<BubbleEmitter>(penguin).unwrap();
    assert_eq!(emitter.spawn_rate, 42.0);
}

#[test]
fn sideways_swimmer_gets_scaled_lift() {
    let mut app = create_test_app();
    let penguin = spawn_swimmer(&mut app);
    app.world_mut()
        .get_mut::<Recorder>(penguin)
        .unwrap()
        .velocity = Vec2::new(100.0, 0.0);

    tick(&mut app);

    // Ninety degrees off the body axis: full lift, not mass scaled
    let velocity = Vec2::new(100.0, 0.0);
    let expected = velocity.perp() * std::f32::consts::FRAC_PI_2.sin() * 30.0;
    let force = total_force(recorder(&app, penguin));
    assert!((force - expected).length() < 1e-2, "force = {force:?}");
    assert!((force - Vec2::new(0.0, 3000.0)).length() < 1e-2);
}

#[test]
fn non_finite_velocity_never_reaches_the_body() {
    let mut app = create_test_app();
    let penguin = spawn_swimmer(&mut app);
    input(&mut app, penguin).on_jump_pressed();
    app.world_mut()
        .get_mut::<Recorder>(penguin)
        .unwrap()
        .velocity = Vec2::new(f32::NAN, 5.0);

    tick(&mut app);

    let recorder = recorder(&app, penguin);
    assert!(
        recorder.forces.iter().all(|force| force.is_finite()),
        "forces = {:?}",
        recorder.forces
    );
}

#[test]
fn pitched_swimmer_flips_sprite() {
    let mut app = create_test_app();
    let penguin = spawn_swimmer(&mut app);
    app.world_mut()
        .get_mut::<Recorder>(penguin)
        .unwrap()
        .rotation = 45f32.to_radians();

    tick(&mut app);
    assert!(animator(&app, penguin).is_mirrored());

    app.world_mut()
        .get_mut::<Recorder>(penguin)
        .unwrap()
        .rotation = -45f32.to_radians();

    tick(&mut app);
    assert!(!animator(&app, penguin).is_mirrored());
}

// ==================== Liquid events ====================

#[test]
fn liquid_events_toggle_swimming_and_bubbles() {
    let mut app = create_test_app();
    let penguin = spawn_penguin(&mut app, ContactProbes::default());

    app.world_mut().send_event(LiquidEvent::Entered(penguin));
    app.update();

    assert!(app.world().get::<PenguinController>(penguin).unwrap().in_liquid);
    assert!(app.world().get::<BubbleEmitter>(penguin).unwrap().active);

    tick(&mut app);
    assert_eq!(state(&app, penguin), LocomotionState::Swimming);

    app.world_mut().send_event(LiquidEvent::Exited(penguin));
    app.update();
    tick(&mut app);

    assert_eq!(state(&app, penguin), LocomotionState::Falling);
    assert!(!app.world().get::<BubbleEmitter>(penguin).unwrap().active);
    assert_eq!(recorder(&app, penguin).gravity, Some(true));
}
