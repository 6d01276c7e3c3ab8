//! Rapier2D physics backend implementation.
//!
//! This module provides the physics backend for Bevy Rapier2D.
//! Enable with the `rapier2d` feature.

use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

use crate::backend::PenguinPhysicsBackend;
use crate::config::{PenguinConfig, PenguinController};
use crate::detection::{ContactProbe, ContactProbes, ProbeSites};
use crate::events::{LiquidEvent, LiquidVolume};

/// Rapier2D physics backend for the penguin controller.
///
/// Forces and torques are accumulated on [`PenguinController`] and flushed
/// into `ExternalForce` once per tick. Impulses go straight into
/// `ExternalImpulse`, which Rapier consumes on its next step. Contact probes
/// and liquid volumes are handled by dedicated Rapier systems.
pub struct Rapier2dBackend;

impl PenguinPhysicsBackend for Rapier2dBackend {
    fn plugin() -> impl Plugin {
        Rapier2dBackendPlugin
    }

    fn get_velocity(world: &World, entity: Entity) -> Vec2 {
        world
            .get::<Velocity>(entity)
            .map(|v| v.linvel)
            .unwrap_or(Vec2::ZERO)
    }

    fn get_rotation(world: &World, entity: Entity) -> f32 {
        world
            .get::<Transform>(entity)
            .map(|t| rotation_angle(t.rotation))
            .or_else(|| {
                world.get::<GlobalTransform>(entity).map(|t| {
                    let (_, rotation, _) = t.to_scale_rotation_translation();
                    rotation_angle(rotation)
                })
            })
            .unwrap_or(0.0)
    }

    fn get_mass(world: &World, entity: Entity) -> f32 {
        // Rapier fills this in after the first step; until then the body
        // reports zero mass and the unit fallback keeps forces non-zero.
        world
            .get::<ReadMassProperties>(entity)
            .map(|props| props.mass)
            .filter(|mass| *mass > 0.0 && mass.is_finite())
            .unwrap_or(1.0)
    }

    fn apply_force(world: &mut World, entity: Entity, force: Vec2) {
        // Flushed into ExternalForce by apply_controller_forces
        if let Some(mut controller) = world.get_mut::<PenguinController>(entity) {
            controller.add_force(force);
        }
    }

    fn apply_impulse(world: &mut World, entity: Entity, impulse: Vec2) {
        if let Some(mut ext_impulse) = world.get_mut::<ExternalImpulse>(entity) {
            ext_impulse.impulse += impulse;
        } else {
            // Fallback: apply as velocity change if no ExternalImpulse component
            let mass = Self::get_mass(world, entity);
            if let Some(mut vel) = world.get_mut::<Velocity>(entity) {
                vel.linvel += impulse / mass;
            }
        }
    }

    fn apply_torque(world: &mut World, entity: Entity, torque: f32) {
        if let Some(mut controller) = world.get_mut::<PenguinController>(entity) {
            controller.add_torque(torque);
        }
    }

    fn apply_angular_impulse(world: &mut World, entity: Entity, impulse: f32) {
        if let Some(mut ext_impulse) = world.get_mut::<ExternalImpulse>(entity) {
            ext_impulse.torque_impulse += impulse;
        } else {
            let inertia = Self::get_inertia(world, entity);
            if let Some(mut vel) = world.get_mut::<Velocity>(entity) {
                vel.angvel += impulse / inertia;
            }
        }
    }

    fn set_gravity_enabled(world: &mut World, entity: Entity, enabled: bool, scale: f32) {
        let target = if enabled { scale } else { 0.0 };
        match world.get_mut::<GravityScale>(entity) {
            Some(mut gravity) => {
                if gravity.0 != target {
                    gravity.0 = target;
                }
            }
            None => {
                world.entity_mut(entity).insert(GravityScale(target));
            }
        }
    }

    fn set_linear_damping(world: &mut World, entity: Entity, damping: f32) {
        if let Some(mut d) = world.get_mut::<Damping>(entity) {
            if d.linear_damping != damping {
                d.linear_damping = damping;
            }
        }
    }

    fn set_angular_damping(world: &mut World, entity: Entity, damping: f32) {
        if let Some(mut d) = world.get_mut::<Damping>(entity) {
            if d.angular_damping != damping {
                d.angular_damping = damping;
            }
        }
    }
}

impl Rapier2dBackend {
    /// Principal angular inertia, with the same unit fallback as the mass.
    fn get_inertia(world: &World, entity: Entity) -> f32 {
        world
            .get::<ReadMassProperties>(entity)
            .map(|props| props.principal_inertia)
            .filter(|inertia| *inertia > 0.0 && inertia.is_finite())
            .unwrap_or(1.0)
    }
}

/// Rotation about the z axis, in radians.
fn rotation_angle(rotation: Quat) -> f32 {
    let (_, _, z) = rotation.to_euler(EulerRot::XYZ);
    z
}

/// Plugin that sets up Rapier2D-specific systems for the penguin controller.
pub struct Rapier2dBackendPlugin;

impl Plugin for Rapier2dBackendPlugin {
    fn build(&self, app: &mut App) {
        use crate::PenguinControllerSet;

        // Remove last tick's forces before any system adds new ones
        app.add_systems(
            FixedUpdate,
            clear_controller_forces.in_set(PenguinControllerSet::Preparation),
        );

        app.add_systems(
            FixedUpdate,
            rapier_contact_probes.in_set(PenguinControllerSet::Sensors),
        );

        app.add_systems(
            FixedUpdate,
            apply_controller_forces.in_set(PenguinControllerSet::FinalApplication),
        );

        app.add_systems(
            Update,
            rapier_liquid_events.before(crate::systems::apply_liquid_events),
        );
    }
}

/// Overlap one probe against fixed, non-sensor geometry.
fn rapier_probe(context: &RapierContext, probe: ContactProbe, exclude_entity: Entity) -> bool {
    let filter = QueryFilter::only_fixed()
        .exclude_sensors()
        .exclude_rigid_body(exclude_entity);

    context
        .query_pipeline
        .intersection_with_shape(
            context.colliders,
            context.rigidbody_set,
            probe.origin,
            0.0,
            &Collider::ball(probe.radius),
            filter,
        )
        .is_some()
}

/// Rapier-specific contact probing.
///
/// Probe sites follow the body's actual rotation, so a penguin lying on its
/// side touches the ground with a flank probe rather than its feet.
fn rapier_contact_probes(
    rapier_context: ReadRapierContext,
    mut q_penguins: Query<(Entity, &GlobalTransform, &PenguinConfig, &mut ContactProbes)>,
) {
    let Ok(context) = rapier_context.single() else {
        // No physics world: every probe misses
        for (_, _, _, mut probes) in &mut q_penguins {
            probes.clear();
        }
        return;
    };

    for (entity, transform, config, mut probes) in &mut q_penguins {
        let (_, rotation, translation) = transform.to_scale_rotation_translation();
        let sites = ProbeSites::compute(translation.xy(), rotation_angle(rotation), config);

        *probes = ContactProbes {
            feet: rapier_probe(&context, sites.feet, entity),
            head: rapier_probe(&context, sites.head, entity),
            belly_left: rapier_probe(&context, sites.belly_left, entity),
            belly_right: rapier_probe(&context, sites.belly_right, entity),
        };
    }
}

/// Translate Rapier collision events between a penguin and a
/// [`LiquidVolume`] into [`LiquidEvent`]s.
///
/// Either collider needs `ActiveEvents::COLLISION_EVENTS` for Rapier to
/// report the overlap; [`Rapier2dPenguinBundle`] sets it on the penguin.
pub fn rapier_liquid_events(
    mut collisions: EventReader<CollisionEvent>,
    q_liquids: Query<(), With<LiquidVolume>>,
    q_penguins: Query<(), With<PenguinController>>,
    mut liquid_events: EventWriter<LiquidEvent>,
) {
    for collision in collisions.read() {
        let (a, b, entered) = match *collision {
            CollisionEvent::Started(a, b, _) => (a, b, true),
            CollisionEvent::Stopped(a, b, _) => (a, b, false),
        };

        let penguin = if q_liquids.contains(a) && q_penguins.contains(b) {
            b
        } else if q_liquids.contains(b) && q_penguins.contains(a) {
            a
        } else {
            continue;
        };

        liquid_events.write(if entered {
            LiquidEvent::Entered(penguin)
        } else {
            LiquidEvent::Exited(penguin)
        });
    }
}

/// Clear controller forces at the start of each tick.
///
/// This system runs BEFORE any controller force systems. It:
/// 1. Subtracts the forces we applied last tick from ExternalForce
/// 2. Clears the accumulators for the new tick
///
/// External user forces on the same body are preserved.
pub fn clear_controller_forces(mut q: Query<(&mut ExternalForce, &mut PenguinController)>) {
    for (mut ext_force, mut controller) in &mut q {
        let (force_to_subtract, torque_to_subtract) = controller.prepare_new_frame();
        ext_force.force -= force_to_subtract;
        ext_force.torque -= torque_to_subtract;
    }
}

/// Apply controller forces at the end of each tick.
///
/// Stores what was applied so the next tick can subtract it again.
pub fn apply_controller_forces(mut q: Query<(&mut ExternalForce, &mut PenguinController)>) {
    for (mut ext_force, mut controller) in &mut q {
        let (force_to_apply, torque_to_apply) = controller.finalize_frame();
        ext_force.force += force_to_apply;
        ext_force.torque += torque_to_apply;
    }
}

/// Bundle of Rapier2D components for a penguin body.
///
/// Add a `Collider` alongside it; the penguin needs free rotation to tip onto
/// its belly or head, so rotation is never locked.
///
/// # Example
///
/// ```ignore
/// use bevy::prelude::*;
/// use bevy_rapier2d::prelude::*;
/// use penguin_controller::prelude::*;
///
/// fn spawn_penguin(mut commands: Commands) {
///     let config = PenguinConfig::default();
///     commands.spawn((
///         Transform::from_xyz(0.0, 100.0, 0.0),
///         PenguinBundle::new(config),
///         Rapier2dPenguinBundle::new(),
///         Collider::cuboid(config.half_extents.x, config.half_extents.y),
///     ));
/// }
/// ```
///
/// # Defaults
///
/// - `rigid_body`: [`RigidBody::Dynamic`]
/// - `damping`: the dry-land damping of [`PenguinConfig::default`]
/// - `gravity_scale`: 1.0, switched off while swimming
/// - `active_events`: collision events, needed for liquid volumes
#[derive(Bundle)]
pub struct Rapier2dPenguinBundle {
    pub rigid_body: RigidBody,
    pub velocity: Velocity,
    /// Controller forces are flushed into this once per tick.
    pub external_force: ExternalForce,
    /// Jumps, push-starts and head flips.
    pub external_impulse: ExternalImpulse,
    pub damping: Damping,
    pub gravity_scale: GravityScale,
    /// Computed mass properties. Rapier updates this based on the collider.
    pub mass_properties: ReadMassProperties,
    pub active_events: ActiveEvents,
}

impl Default for Rapier2dPenguinBundle {
    fn default() -> Self {
        Self::new()
    }
}

impl Rapier2dPenguinBundle {
    pub fn new() -> Self {
        let config = PenguinConfig::default();
        Self {
            rigid_body: RigidBody::Dynamic,
            velocity: Velocity::default(),
            external_force: ExternalForce::default(),
            external_impulse: ExternalImpulse::default(),
            damping: Damping {
                linear_damping: config.dry_linear_damping,
                angular_damping: config.dry_angular_damping,
            },
            gravity_scale: GravityScale(config.gravity_scale),
            mass_properties: ReadMassProperties::default(),
            active_events: ActiveEvents::COLLISION_EVENTS,
        }
    }

    /// Set the damping coefficients out of liquid.
    ///
    /// Overwritten by the controller every tick from [`PenguinConfig`], so
    /// this only matters before the first tick.
    pub fn with_damping(mut self, linear: f32, angular: f32) -> Self {
        self.damping = Damping {
            linear_damping: linear,
            angular_damping: angular,
        };
        self
    }
}
