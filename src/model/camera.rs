use glam::{Mat4, Vec3};

/// Pitch limit, a little short of straight up/down
const MAX_PITCH: f32 = 89.0 * std::f32::consts::PI / 180.0;

/// Keyboard movement directions understood by [`Camera::process_keyboard`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// Free-flying camera. The fragment shaders build their rays from its position,
/// forward vector and view matrix.
pub struct Camera {
    pub eye: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub world_up: Vec3,
    /// Units per second
    pub move_speed: f32,
    /// Radians per pixel of mouse travel
    pub mouse_sensitivity: f32,
}

impl Camera {
    pub fn new(eye: Vec3) -> Self {
        Self {
            eye,
            yaw: -std::f32::consts::FRAC_PI_2,
            pitch: 0.0,
            world_up: Vec3::Y,
            move_speed: 3.0,
            mouse_sensitivity: 0.004,
        }
    }

    pub fn forward(&self) -> Vec3 {
        let cy = self.yaw;
        let cp = self.pitch.clamp(-MAX_PITCH, MAX_PITCH);
        Vec3::new(cy.cos() * cp.cos(), cp.sin(), cy.sin() * cp.cos()).normalize()
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(self.world_up).normalize()
    }

    pub fn set_look_at(&mut self, target: Vec3) {
        let dir = (target - self.eye).normalize();
        self.yaw = dir.z.atan2(dir.x);
        self.pitch = dir.y.asin().clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Move `move_speed * dt` units in one direction
    pub fn process_keyboard(&mut self, direction: Direction, dt: f32) {
        let velocity = self.move_speed * dt;
        let offset = match direction {
            Direction::Forward => self.forward(),
            Direction::Backward => -self.forward(),
            Direction::Left => -self.right(),
            Direction::Right => self.right(),
            Direction::Up => self.world_up,
            Direction::Down => -self.world_up,
        };
        self.eye += offset * velocity;
    }

    /// Offsets are in pixels; positive `y_offset` looks up.
    pub fn process_mouse_movement(&mut self, x_offset: f32, y_offset: f32) {
        self.yaw += x_offset * self.mouse_sensitivity;
        self.pitch = (self.pitch + y_offset * self.mouse_sensitivity).clamp(-MAX_PITCH, MAX_PITCH);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.eye + self.forward(), self.world_up)
    }
}

impl Default for Camera {
    fn default() -> Self {
        let mut camera = Camera::new(Vec3::new(0.0, 0.0, -7.0));
        camera.set_look_at(Vec3::ZERO);
        camera
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec_eq(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-5, "{a:?} != {b:?}");
    }

    #[test]
    fn default_camera_faces_origin() {
        let cam = Camera::default();
        assert_vec_eq(cam.forward(), Vec3::Z);
        assert_vec_eq(cam.eye, Vec3::new(0.0, 0.0, -7.0));
    }

    #[test]
    fn keyboard_moves_scale_with_time() {
        let mut cam = Camera::default();
        cam.process_keyboard(Direction::Forward, 0.5);
        assert_vec_eq(cam.eye, Vec3::new(0.0, 0.0, -7.0 + 1.5));

        cam.process_keyboard(Direction::Up, 1.0);
        assert_vec_eq(cam.eye, Vec3::new(0.0, 3.0, -5.5));
    }

    #[test]
    fn opposite_directions_cancel() {
        let mut cam = Camera::default();
        cam.process_keyboard(Direction::Left, 0.25);
        cam.process_keyboard(Direction::Right, 0.25);
        cam.process_keyboard(Direction::Down, 0.25);
        cam.process_keyboard(Direction::Up, 0.25);
        assert_vec_eq(cam.eye, Vec3::new(0.0, 0.0, -7.0));
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = Camera::default();
        cam.process_mouse_movement(0.0, 100_000.0);
        assert!((cam.pitch - MAX_PITCH).abs() < 1e-6);
        cam.process_mouse_movement(0.0, -1_000_000.0);
        assert!((cam.pitch + MAX_PITCH).abs() < 1e-6);
    }

    #[test]
    fn view_matrix_rows_hold_camera_basis() {
        let cam = Camera::default();
        let transposed = cam.view_matrix().transpose();
        // Columns of the transposed view are right, up and -forward
        assert_vec_eq(transposed.x_axis.truncate(), cam.right());
        assert_vec_eq(transposed.z_axis.truncate(), -cam.forward());
    }
}
