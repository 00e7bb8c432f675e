use glam::Vec3;
use tracing::{debug, warn};

use crate::controller::physics::{BodyDesc, PhysicsWorld, ShapeKind};
use crate::error::SceneError;
use crate::model::SceneSettings;

/// Static boundary walls occupy the first collision object indices
pub const WALL_COUNT: usize = 6;

/// Most balls the scene will ever hold
pub const BALL_CAPACITY: usize = 100;

/// Where reconciliation drops new balls
pub const SPAWN_POINT: Vec3 = Vec3::new(0.0, 2.0, 0.0);

const WALL_FRICTION: f32 = 0.3;
const WALL_RESTITUTION: f32 = 0.9;
const BALL_MASS: f32 = 1.0;
const BALL_FRICTION: f32 = 0.3;
const BALL_RESTITUTION: f32 = 0.9;

/// (centre, half extents) of the six walls enclosing the balls
const WALLS: [(Vec3, Vec3); WALL_COUNT] = [
    (Vec3::new(5.0, 0.0, 0.0), Vec3::new(2.0, 8.0, 8.0)),
    (Vec3::new(-5.0, 0.0, 0.0), Vec3::new(2.0, 8.0, 8.0)),
    (Vec3::new(0.0, 5.0, 0.0), Vec3::new(8.0, 2.0, 8.0)),
    (Vec3::new(0.0, -5.0, 0.0), Vec3::new(8.0, 2.0, 8.0)),
    (Vec3::new(0.0, 0.0, 5.0), Vec3::new(8.0, 8.0, 2.0)),
    (Vec3::new(0.0, 0.0, -5.0), Vec3::new(8.0, 8.0, 2.0)),
];

/// Bookkeeping for the bouncy balls scene: ball bodies live in the physics
/// world, their positions are mirrored here for the shader.
pub struct BouncyBalls {
    positions: Vec<Vec3>,
    rng: fastrand::Rng,
    capacity_reported: bool,
}

impl BouncyBalls {
    /// Build the walls and the starting grid of balls
    pub fn setup(physics: &mut PhysicsWorld, collision_size: f32, rng: fastrand::Rng) -> Self {
        debug_assert_eq!(physics.num_collision_objects(), 0, "walls must come first");

        for (position, half_extents) in WALLS {
            physics.create_rigid_body(&BodyDesc {
                shape: ShapeKind::Box,
                position,
                size: half_extents,
                rotation: Vec3::ZERO,
                mass: 0.0,
                friction: WALL_FRICTION,
                restitution: WALL_RESTITUTION,
            });
        }

        let mut balls = Self {
            positions: Vec::with_capacity(BALL_CAPACITY),
            rng,
            capacity_reported: false,
        };

        for i in -1..2 {
            for j in -1..2 {
                for k in -1..1 {
                    let position = Vec3::new(i as f32, j as f32, k as f32);
                    // The grid is far below capacity
                    let _ = balls.spawn_ball(physics, position, collision_size);
                }
            }
        }
        balls
    }

    pub fn live_balls(physics: &PhysicsWorld) -> usize {
        physics.num_collision_objects().saturating_sub(WALL_COUNT)
    }

    pub fn spawn_ball(
        &mut self,
        physics: &mut PhysicsWorld,
        position: Vec3,
        collision_size: f32,
    ) -> Result<usize, SceneError> {
        if Self::live_balls(physics) >= BALL_CAPACITY {
            return Err(SceneError::BallCapacityReached {
                capacity: BALL_CAPACITY,
            });
        }
        let index = physics.create_rigid_body(&BodyDesc {
            shape: ShapeKind::Sphere,
            position,
            size: Vec3::ONE,
            rotation: Vec3::ZERO,
            mass: BALL_MASS,
            friction: BALL_FRICTION,
            restitution: BALL_RESTITUTION,
        });
        physics.set_local_scaling(index, collision_size);
        Ok(index)
    }

    /// Spawn at most one ball if fewer than `target` are alive.
    /// Returns whether a ball was created.
    pub fn reconcile(&mut self, physics: &mut PhysicsWorld, target: usize, collision_size: f32) -> bool {
        if Self::live_balls(physics) >= target {
            self.capacity_reported = false;
            return false;
        }

        match self.spawn_ball(physics, SPAWN_POINT, collision_size) {
            Ok(index) => {
                debug!(index, live = Self::live_balls(physics), wanted = target, "spawned ball");
                true
            }
            Err(err) => {
                if !self.capacity_reported {
                    warn!(wanted = target, "{err}");
                    self.capacity_reported = true;
                }
                false
            }
        }
    }

    /// Re-apply the collision size to every ball, optionally kick them, and
    /// copy their positions out of the physics world.
    pub fn sync(&mut self, physics: &mut PhysicsWorld, collision_size: f32, bounce: bool) {
        self.positions.clear();
        for index in WALL_COUNT..physics.num_collision_objects() {
            physics.set_local_scaling(index, collision_size);
            physics.refresh_bounds(index);

            if bounce {
                let impulse = Vec3::new(
                    self.rng.i32(-2..=2) as f32,
                    self.rng.i32(-2..=2) as f32,
                    self.rng.i32(-2..=2) as f32,
                );
                physics.apply_central_impulse(index, impulse);
            }

            if let Some(position) = physics.interpolated_position(index) {
                self.positions.push(position);
            }
        }
    }

    /// One frame of the scene: reconcile, then sync
    pub fn update(&mut self, physics: &mut PhysicsWorld, settings: &SceneSettings, bounce: bool) {
        let target = settings.ball_amount.max(0) as usize;
        self.reconcile(physics, target, settings.collision_size);
        self.sync(physics, settings.collision_size, bounce);
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Number of positions the shader should read
    pub fn shader_ball_count(&self, settings: &SceneSettings) -> i32 {
        settings.ball_amount.clamp(0, self.positions.len() as i32)
    }
}
