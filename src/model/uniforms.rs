use glam::{Mat4, Vec3};

/// Length of the `ballPos` array declared by the shaders
pub const MAX_SHADER_BALLS: usize = 100;

/// CPU mirror of the `Uniforms` struct every WGSL scene declares at
/// `@group(0) @binding(0)`. Field order and padding follow WGSL uniform layout
/// rules; `tests/shader_compile.rs` checks the offsets against the shaders.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShaderUniforms {
    pub transposed_cam_view: [[f32; 4]; 4],
    pub resolution: [f32; 3],
    pub time: f32,
    pub cam_pos: [f32; 3],
    pub visible_size: f32,
    pub cam_dir: [f32; 3],
    pub blending: f32,
    pub ball_amount: i32,
    pub fractal_iteration: i32,
    pub _pad: [i32; 2],
    pub ball_pos: [[f32; 4]; MAX_SHADER_BALLS],
}

/// Values every scene receives each frame
#[derive(Debug, Clone, PartialEq)]
pub struct CommonUniforms {
    pub resolution: Vec3,
    pub cam_pos: Vec3,
    pub cam_dir: Vec3,
    pub transposed_cam_view: Mat4,
    /// Unclamped seconds since startup
    pub time: f32,
}

/// Values only the active scene receives
#[derive(Debug, Clone, PartialEq)]
pub enum SceneUniforms {
    BouncyBalls {
        ball_pos: Vec<Vec3>,
        ball_amount: i32,
        visible_size: f32,
        blending: f32,
    },
    Fractal {
        fractal_iteration: i32,
    },
    Test,
}

/// Everything pushed to the active program in one frame
#[derive(Debug, Clone, PartialEq)]
pub struct UniformUpdate {
    pub common: CommonUniforms,
    pub scene: SceneUniforms,
}

impl Default for ShaderUniforms {
    fn default() -> Self {
        bytemuck::Zeroable::zeroed()
    }
}

impl ShaderUniforms {
    /// Overwrite the fields carried by `update`. Fields belonging to other
    /// scenes keep whatever was last written to them.
    pub fn apply(&mut self, update: &UniformUpdate) {
        let common = &update.common;
        self.resolution = common.resolution.to_array();
        self.cam_pos = common.cam_pos.to_array();
        self.cam_dir = common.cam_dir.to_array();
        self.transposed_cam_view = common.transposed_cam_view.to_cols_array_2d();
        self.time = common.time;

        match &update.scene {
            SceneUniforms::BouncyBalls {
                ball_pos,
                ball_amount,
                visible_size,
                blending,
            } => {
                for (slot, pos) in self.ball_pos.iter_mut().zip(ball_pos.iter()) {
                    *slot = pos.extend(0.0).to_array();
                }
                self.ball_amount = (*ball_amount).clamp(0, MAX_SHADER_BALLS as i32);
                self.visible_size = *visible_size;
                self.blending = *blending;
            }
            SceneUniforms::Fractal { fractal_iteration } => {
                self.fractal_iteration = *fractal_iteration;
            }
            SceneUniforms::Test => {}
        }
    }
}
