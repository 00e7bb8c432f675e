use crate::controller::input::{InputProcessor, InputState};
use crate::model::Camera;

/// Applies held keys and mouse motion to the camera
#[derive(Debug, Default)]
pub struct CameraController;

impl CameraController {
    pub fn new() -> Self {
        Self
    }

    /// Apply mouse look delta to camera. `dy` is screen-space (down is positive).
    pub fn apply_look(&self, camera: &mut Camera, dx: f32, dy: f32) {
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        camera.process_mouse_movement(dx, -dy);
    }

    /// Move once per held direction; simultaneous keys add up.
    pub fn apply_movements(
        &self,
        camera: &mut Camera,
        processor: &InputProcessor,
        input: &InputState,
        dt: f32,
    ) {
        for direction in processor.held_directions(input) {
            camera.process_keyboard(direction, dt);
        }
    }
}
