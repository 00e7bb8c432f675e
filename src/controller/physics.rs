use glam::Vec3;
use rapier3d::na::Vector3;
use rapier3d::prelude::{
    CCDSolver, ColliderBuilder, ColliderHandle, ColliderSet, DefaultBroadPhase, ImpulseJointSet,
    IntegrationParameters, IslandManager, MultibodyJointSet, NarrowPhase, PhysicsPipeline,
    RigidBodyBuilder, RigidBodyHandle, RigidBodySet, SharedShape,
};

/// Internal fixed step; callers hand in variable deltas
pub const FIXED_TIME_STEP: f32 = 1.0 / 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    /// `size` holds the half extents
    Box,
    /// `size.x` holds the radius
    Sphere,
}

impl ShapeKind {
    fn shared_shape(self, size: Vec3, scale: f32) -> SharedShape {
        match self {
            ShapeKind::Box => SharedShape::cuboid(size.x * scale, size.y * scale, size.z * scale),
            ShapeKind::Sphere => SharedShape::ball(size.x * scale),
        }
    }
}

/// Parameters for [`PhysicsWorld::create_rigid_body`]. A mass of zero makes the body static.
#[derive(Debug, Clone)]
pub struct BodyDesc {
    pub shape: ShapeKind,
    pub position: Vec3,
    pub size: Vec3,
    /// Axis-angle rotation
    pub rotation: Vec3,
    pub mass: f32,
    pub friction: f32,
    pub restitution: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

struct CollisionObject {
    body: RigidBodyHandle,
    collider: ColliderHandle,
    shape: ShapeKind,
    size: Vec3,
    scale: f32,
    /// Translation before the most recent internal step
    previous: Vec3,
}

/// Rigid-body world. Collision objects are addressed by creation index, which
/// never changes because objects are never removed.
pub struct PhysicsWorld {
    gravity: Vector3<f32>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    objects: Vec<CollisionObject>,
    accumulator: f32,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

fn to_na(v: Vec3) -> Vector3<f32> {
    Vector3::new(v.x, v.y, v.z)
}

fn to_glam(v: &Vector3<f32>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

impl PhysicsWorld {
    pub fn new() -> Self {
        let integration_parameters = IntegrationParameters {
            dt: FIXED_TIME_STEP,
            ..IntegrationParameters::default()
        };

        Self {
            gravity: Vector3::new(0.0, -9.82, 0.0),
            integration_parameters,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            objects: Vec::new(),
            accumulator: 0.0,
        }
    }

    /// Create a body with a single collider and return its collision object index
    pub fn create_rigid_body(&mut self, desc: &BodyDesc) -> usize {
        let builder = if desc.mass > 0.0 {
            RigidBodyBuilder::dynamic()
        } else {
            RigidBodyBuilder::fixed()
        };
        let body = builder
            .translation(to_na(desc.position))
            .rotation(to_na(desc.rotation))
            .build();
        let body = self.bodies.insert(body);

        let mut collider = ColliderBuilder::new(desc.shape.shared_shape(desc.size, 1.0))
            .friction(desc.friction)
            .restitution(desc.restitution);
        if desc.mass > 0.0 {
            collider = collider.mass(desc.mass);
        }
        let collider = self
            .colliders
            .insert_with_parent(collider.build(), body, &mut self.bodies);

        self.objects.push(CollisionObject {
            body,
            collider,
            shape: desc.shape,
            size: desc.size,
            scale: 1.0,
            previous: desc.position,
        });
        self.objects.len() - 1
    }

    /// Advance by `dt` in fixed internal steps, running at most `max_sub_steps`
    /// of them. Time beyond that budget is dropped; time short of a full step
    /// stays in the accumulator and drives [`PhysicsWorld::interpolated_position`].
    /// Returns the steps taken.
    pub fn step_simulation(&mut self, dt: f32, max_sub_steps: u32) -> u32 {
        self.accumulator += dt.max(0.0);
        // Small slack so a delta of exactly one fixed step is not lost to rounding
        let wanted = ((self.accumulator + 1e-6) / FIXED_TIME_STEP).floor() as u32;
        let steps = wanted.min(max_sub_steps);
        if wanted > max_sub_steps {
            self.accumulator = 0.0;
        } else {
            self.accumulator = (self.accumulator - steps as f32 * FIXED_TIME_STEP).max(0.0);
        }

        for _ in 0..steps {
            for obj in &mut self.objects {
                if let Some(body) = self.bodies.get(obj.body) {
                    obj.previous = to_glam(body.translation());
                }
            }
            self.pipeline.step(
                &self.gravity,
                &self.integration_parameters,
                &mut self.islands,
                &mut self.broad_phase,
                &mut self.narrow_phase,
                &mut self.bodies,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                &mut self.ccd_solver,
                None,
                &(),
                &(),
            );
        }
        steps
    }

    pub fn num_collision_objects(&self) -> usize {
        self.objects.len()
    }

    pub fn shape(&self, index: usize) -> Option<ShapeKind> {
        self.objects.get(index).map(|o| o.shape)
    }

    /// Translation after the most recent internal step
    pub fn world_position(&self, index: usize) -> Option<Vec3> {
        let obj = self.objects.get(index)?;
        Some(to_glam(self.bodies.get(obj.body)?.translation()))
    }

    /// Translation blended between the last two internal steps by the time
    /// left in the accumulator, so frames faster than the fixed step still
    /// see motion.
    pub fn interpolated_position(&self, index: usize) -> Option<Vec3> {
        let obj = self.objects.get(index)?;
        let current = self.world_position(index)?;
        let alpha = (self.accumulator / FIXED_TIME_STEP).clamp(0.0, 1.0);
        Some(obj.previous.lerp(current, alpha))
    }

    /// Uniformly scale the object's collision shape relative to its creation size
    pub fn set_local_scaling(&mut self, index: usize, scale: f32) {
        let Some(obj) = self.objects.get_mut(index) else {
            return;
        };
        if obj.scale == scale {
            return;
        }
        if let Some(collider) = self.colliders.get_mut(obj.collider) {
            collider.set_shape(obj.shape.shared_shape(obj.size, scale));
            obj.scale = scale;
        }
    }

    pub fn local_scaling(&self, index: usize) -> Option<f32> {
        self.objects.get(index).map(|o| o.scale)
    }

    /// Radius of a sphere collider, `None` for boxes
    pub fn collision_radius(&self, index: usize) -> Option<f32> {
        let obj = self.objects.get(index)?;
        let collider = self.colliders.get(obj.collider)?;
        collider.shape().as_ball().map(|ball| ball.radius)
    }

    /// Flag the object's collider as changed so the broad phase re-inserts
    /// its bounding box on the next step, even if the body is asleep.
    pub fn refresh_bounds(&mut self, index: usize) {
        let Some(obj) = self.objects.get(index) else {
            return;
        };
        if let Some(collider) = self.colliders.get_mut(obj.collider) {
            let shape = collider.shared_shape().clone();
            collider.set_shape(shape);
        }
    }

    /// World-space bounding box of the object's current shape
    pub fn bounds(&self, index: usize) -> Option<Bounds> {
        let obj = self.objects.get(index)?;
        let aabb = self.colliders.get(obj.collider)?.compute_aabb();
        Some(Bounds {
            min: Vec3::new(aabb.mins.x, aabb.mins.y, aabb.mins.z),
            max: Vec3::new(aabb.maxs.x, aabb.maxs.y, aabb.maxs.z),
        })
    }

    /// Wakes the body and applies `impulse` at its centre of mass
    pub fn apply_central_impulse(&mut self, index: usize, impulse: Vec3) {
        let Some(obj) = self.objects.get(index) else {
            return;
        };
        if let Some(body) = self.bodies.get_mut(obj.body) {
            body.apply_impulse(to_na(impulse), true);
        }
    }

    pub fn linear_velocity(&self, index: usize) -> Option<Vec3> {
        let obj = self.objects.get(index)?;
        Some(to_glam(self.bodies.get(obj.body)?.linvel()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sphere_at(position: Vec3) -> BodyDesc {
        BodyDesc {
            shape: ShapeKind::Sphere,
            position,
            size: Vec3::ONE,
            rotation: Vec3::ZERO,
            mass: 1.0,
            friction: 0.3,
            restitution: 0.9,
        }
    }

    #[test]
    fn objects_are_indexed_in_creation_order() {
        let mut world = PhysicsWorld::new();
        let floor = world.create_rigid_body(&BodyDesc {
            shape: ShapeKind::Box,
            position: Vec3::new(0.0, -5.0, 0.0),
            size: Vec3::new(8.0, 2.0, 8.0),
            rotation: Vec3::ZERO,
            mass: 0.0,
            friction: 0.3,
            restitution: 0.9,
        });
        let ball = world.create_rigid_body(&sphere_at(Vec3::new(0.0, 2.0, 0.0)));

        assert_eq!((floor, ball), (0, 1));
        assert_eq!(world.num_collision_objects(), 2);
        assert_eq!(world.shape(0), Some(ShapeKind::Box));
        assert_eq!(world.collision_radius(0), None);
        assert_eq!(world.world_position(1), Some(Vec3::new(0.0, 2.0, 0.0)));
    }

    #[test]
    fn substeps_are_capped() {
        let mut world = PhysicsWorld::new();
        assert_eq!(world.step_simulation(FIXED_TIME_STEP, 10), 1);
        assert_eq!(world.step_simulation(0.001, 10), 0);
        assert_eq!(world.step_simulation(1.0, 10), 10);
        // Excess time was dropped, not carried over
        assert_eq!(world.step_simulation(0.0, 10), 0);
    }

    #[test]
    fn dynamic_sphere_falls() {
        let mut world = PhysicsWorld::new();
        let ball = world.create_rigid_body(&sphere_at(Vec3::new(0.0, 5.0, 0.0)));
        for _ in 0..30 {
            world.step_simulation(FIXED_TIME_STEP, 10);
        }
        let y = world.world_position(ball).map(|p| p.y).unwrap_or(f32::MAX);
        assert!(y < 5.0, "ball should fall under gravity, y = {y}");
    }

    #[test]
    fn scaling_changes_radius_and_bounds() {
        let mut world = PhysicsWorld::new();
        let ball = world.create_rigid_body(&sphere_at(Vec3::ZERO));
        world.set_local_scaling(ball, 0.3);

        assert_eq!(world.local_scaling(ball), Some(0.3));
        let radius = world.collision_radius(ball).unwrap_or_default();
        assert!((radius - 0.3).abs() < 1e-6);

        world.refresh_bounds(ball);
        let bounds = world.bounds(ball).expect("ball exists");
        assert!((bounds.max.x - bounds.min.x - 0.6).abs() < 1e-3);
    }

    fn touching(world: &PhysicsWorld, a: usize, b: usize) -> bool {
        let (a, b) = (world.objects[a].collider, world.objects[b].collider);
        world
            .narrow_phase
            .contact_pair(a, b)
            .is_some_and(|pair| pair.has_any_active_contact)
    }

    #[test]
    fn rescaled_ball_collides_at_new_radius() {
        let mut world = PhysicsWorld::new();
        let floor = world.create_rigid_body(&BodyDesc {
            shape: ShapeKind::Box,
            position: Vec3::new(0.0, -1.0, 0.0),
            size: Vec3::new(5.0, 1.0, 5.0),
            rotation: Vec3::ZERO,
            mass: 0.0,
            friction: 0.3,
            restitution: 0.9,
        });
        // Floor top is at y = 0, ball centre 1.2 above it
        let ball = world.create_rigid_body(&sphere_at(Vec3::new(0.0, 1.2, 0.0)));

        world.set_local_scaling(ball, 0.3);
        world.refresh_bounds(ball);
        world.step_simulation(FIXED_TIME_STEP, 10);
        assert!(!touching(&world, floor, ball));

        world.set_local_scaling(ball, 2.0);
        world.refresh_bounds(ball);
        world.step_simulation(FIXED_TIME_STEP, 10);
        assert!(touching(&world, floor, ball));
    }

    #[test]
    fn refresh_keeps_shape() {
        let mut world = PhysicsWorld::new();
        let ball = world.create_rigid_body(&sphere_at(Vec3::ZERO));
        world.set_local_scaling(ball, 0.5);
        world.refresh_bounds(ball);
        let radius = world.collision_radius(ball).unwrap_or_default();
        assert!((radius - 0.5).abs() < 1e-6);
    }

    #[test]
    fn positions_interpolate_between_steps() {
        let mut world = PhysicsWorld::new();
        let ball = world.create_rigid_body(&sphere_at(Vec3::new(0.0, 5.0, 0.0)));
        for _ in 0..3 {
            world.step_simulation(FIXED_TIME_STEP, 10);
        }
        let height = |world: &PhysicsWorld| world.interpolated_position(ball).map(|p| p.y).unwrap_or_default();

        let start = height(&world);
        assert_eq!(world.step_simulation(0.005, 10), 0);
        let mid = height(&world);
        assert_eq!(world.step_simulation(0.005, 10), 0);
        let later = height(&world);

        assert!(mid < start, "{mid} should be below {start}");
        assert!(later < mid, "{later} should be below {mid}");
        let stepped = world.world_position(ball).map(|p| p.y).unwrap_or_default();
        assert!(later > stepped, "blend stays behind the last step");
    }

    #[test]
    fn impulse_pushes_ball() {
        let mut world = PhysicsWorld::new();
        let ball = world.create_rigid_body(&sphere_at(Vec3::ZERO));
        world.step_simulation(FIXED_TIME_STEP, 10);
        world.apply_central_impulse(ball, Vec3::new(2.0, 0.0, 0.0));
        world.step_simulation(FIXED_TIME_STEP, 10);

        let x = world.world_position(ball).map(|p| p.x).unwrap_or_default();
        assert!(x > 0.0);
        let vx = world.linear_velocity(ball).map(|v| v.x).unwrap_or_default();
        assert!(vx > 1.0);
    }

    #[test]
    fn out_of_range_indices_are_ignored() {
        let mut world = PhysicsWorld::new();
        world.apply_central_impulse(3, Vec3::ONE);
        world.set_local_scaling(3, 2.0);
        assert_eq!(world.world_position(3), None);
        world.refresh_bounds(3);
        assert_eq!(world.bounds(3), None);
        assert_eq!(world.interpolated_position(3), None);
    }
}
