// CONTROLLER: Input, physics and the per-frame update loop
pub mod input;
pub mod physics;
pub mod bouncy_balls;
pub mod camera_controller;
pub mod frame_loop;

pub use input::{CursorMode, InputEvent, InputProcessor, InputQueue, InputState, Key, KeyBindings, MouseButton};
pub use physics::{BodyDesc, Bounds, PhysicsWorld, ShapeKind};
pub use bouncy_balls::BouncyBalls;
pub use camera_controller::CameraController;
pub use frame_loop::{FpsCounter, FrameClock, FrameLoopContext, FrameOutput, FrameTiming};
