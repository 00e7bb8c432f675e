use glam::Vec3;
use tracing::debug;

use crate::config::{MAX_PHYSICS_STEP, PHYSICS_SUB_STEPS};
use crate::controller::bouncy_balls::BouncyBalls;
use crate::controller::camera_controller::CameraController;
use crate::controller::input::{CursorMode, InputEvent, InputProcessor, InputQueue, InputState, KeyBindings};
use crate::controller::physics::PhysicsWorld;
use crate::model::{Camera, CommonUniforms, SceneId, SceneSettings, SceneUniforms, UniformUpdate};

/// Length of the FPS averaging window in seconds
const FPS_WINDOW: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTiming {
    /// Seconds since startup
    pub now: f32,
    /// Real time since the previous frame
    pub delta: f32,
    /// `delta` capped at [`MAX_PHYSICS_STEP`]
    pub physics_delta: f32,
}

#[derive(Debug, Default)]
pub struct FrameClock {
    last_frame: f32,
}

impl FrameClock {
    pub fn new(start: f32) -> Self {
        Self { last_frame: start }
    }

    pub fn tick(&mut self, now: f32) -> FrameTiming {
        let delta = (now - self.last_frame).max(0.0);
        self.last_frame = now;
        FrameTiming {
            now,
            delta,
            physics_delta: delta.min(MAX_PHYSICS_STEP),
        }
    }
}

/// Running FPS average, restarted every [`FPS_WINDOW`] seconds
#[derive(Debug, Default)]
pub struct FpsCounter {
    window_start: f32,
    samples: u32,
    fps: f32,
}

impl FpsCounter {
    pub fn record(&mut self, now: f32, delta: f32) {
        if now - self.window_start > FPS_WINDOW {
            debug!(fps = self.fps, frames = self.samples, "fps window");
            self.samples = 0;
            self.fps = 0.0;
            self.window_start = now;
        } else if delta > 0.0 {
            let n = self.samples as f32;
            self.fps = (self.fps * n + 1.0 / delta) / (n + 1.0);
            self.samples += 1;
        }
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

/// Result of one coordinator tick, consumed by the window/GPU side
#[derive(Debug, Clone)]
pub struct FrameOutput {
    pub scene: SceneId,
    pub uniforms: UniformUpdate,
    /// Set when the menu toggle fired this frame
    pub cursor_mode: Option<CursorMode>,
    pub close_requested: bool,
    pub timing: FrameTiming,
    pub physics_steps: u32,
}

/// Owns all per-frame simulation state and runs the update half of the loop
pub struct FrameLoopContext {
    pub camera: Camera,
    pub camera_controller: CameraController,
    pub input_state: InputState,
    pub input_processor: InputProcessor,
    pub events: InputQueue,
    pub physics: PhysicsWorld,
    pub balls: BouncyBalls,
    pub settings: SceneSettings,
    pub current_scene: SceneId,
    pub clock: FrameClock,
    pub fps: FpsCounter,
}

impl FrameLoopContext {
    pub fn new(start: f32) -> Self {
        Self::with_rng(start, fastrand::Rng::new())
    }

    /// Same as [`FrameLoopContext::new`] with a caller-supplied RNG for the ball impulses
    pub fn with_rng(start: f32, rng: fastrand::Rng) -> Self {
        let bindings = KeyBindings::default();
        let settings = SceneSettings::default();
        let mut physics = PhysicsWorld::new();
        let balls = BouncyBalls::setup(&mut physics, settings.collision_size, rng);

        Self {
            camera: Camera::default(),
            camera_controller: CameraController::new(),
            input_state: InputState::new(&bindings),
            input_processor: InputProcessor::new(bindings),
            events: InputQueue::new(),
            physics,
            balls,
            settings,
            current_scene: SceneId::default(),
            clock: FrameClock::new(start),
            fps: FpsCounter {
                window_start: start,
                ..FpsCounter::default()
            },
        }
    }

    pub fn push_event(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Advance one frame: time, physics, FPS, input, scene selection and
    /// ball reconciliation. Returns the uniforms for the active scene.
    pub fn update(&mut self, now: f32, resolution: (u32, u32)) -> FrameOutput {
        let timing = self.clock.tick(now);
        let physics_steps = self
            .physics
            .step_simulation(timing.physics_delta, PHYSICS_SUB_STEPS);
        self.fps.record(timing.now, timing.delta);

        for event in self.events.drain() {
            self.input_state.process_event(&event);
        }

        // Camera moves with real time, not the clamped physics delta
        self.camera_controller.apply_movements(
            &mut self.camera,
            &self.input_processor,
            &self.input_state,
            timing.delta,
        );
        let (dx, dy) = self.input_state.consume_look();
        if !self.input_state.menu_mode_on {
            self.camera_controller.apply_look(&mut self.camera, dx, dy);
        }

        let cursor_mode = self.input_state.take_menu_toggle();
        if let Some(mode) = cursor_mode {
            debug!(?mode, "menu toggled");
        }

        let scene = self
            .input_processor
            .select_scene(&self.input_state, self.current_scene);
        if scene != self.current_scene {
            debug!(from = self.current_scene.number(), to = scene.number(), "scene switched");
            self.current_scene = scene;
        }

        let scene_uniforms = match scene {
            SceneId::BouncyBalls => {
                let bounce = self.input_processor.is_bouncing(&self.input_state);
                self.balls.update(&mut self.physics, &self.settings, bounce);
                SceneUniforms::BouncyBalls {
                    ball_pos: self.balls.positions().to_vec(),
                    ball_amount: self.balls.shader_ball_count(&self.settings),
                    visible_size: self.settings.visible_size,
                    blending: self.settings.blending,
                }
            }
            SceneId::Fractal => SceneUniforms::Fractal {
                fractal_iteration: self.settings.fractal_iteration,
            },
            SceneId::Test => SceneUniforms::Test,
        };

        let uniforms = UniformUpdate {
            common: CommonUniforms {
                resolution: Vec3::new(resolution.0 as f32, resolution.1 as f32, 0.0),
                cam_pos: self.camera.eye,
                cam_dir: self.camera.forward(),
                transposed_cam_view: self.camera.view_matrix().transpose(),
                time: timing.now,
            },
            scene: scene_uniforms,
        };

        FrameOutput {
            scene,
            uniforms,
            cursor_mode,
            close_requested: self.input_state.close_requested,
            timing,
            physics_steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn physics_delta_is_clamped() {
        let mut clock = FrameClock::new(0.0);
        let t = clock.tick(0.005);
        assert_eq!(t.physics_delta, t.delta);

        let stalled = clock.tick(1.005);
        assert!((stalled.delta - 1.0).abs() < 1e-4);
        assert_eq!(stalled.physics_delta, MAX_PHYSICS_STEP);
    }

    #[test]
    fn clock_never_goes_backwards() {
        let mut clock = FrameClock::new(2.0);
        assert_eq!(clock.tick(1.0).delta, 0.0);
    }

    #[test]
    fn fps_averages_within_window_and_resets() {
        let mut fps = FpsCounter::default();
        fps.record(0.5, 0.01);
        fps.record(1.0, 0.02);
        assert!((fps.fps() - 75.0).abs() < 1e-3);

        fps.record(2.5, 0.01);
        assert_eq!(fps.fps(), 0.0);
        fps.record(2.6, 0.1);
        assert!((fps.fps() - 10.0).abs() < 1e-3);
    }
}
