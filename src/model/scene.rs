/// The three hardcoded raymarching scenes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SceneId {
    #[default]
    BouncyBalls,
    Fractal,
    Test,
}

impl SceneId {
    pub const ALL: [SceneId; 3] = [SceneId::BouncyBalls, SceneId::Fractal, SceneId::Test];

    /// Number shown to the user and bound to the digit keys
    pub fn number(self) -> u8 {
        match self {
            SceneId::BouncyBalls => 1,
            SceneId::Fractal => 2,
            SceneId::Test => 3,
        }
    }

    pub fn fragment_shader(self) -> &'static str {
        match self {
            SceneId::BouncyBalls => "bouncy_balls.wgsl",
            SceneId::Fractal => "fractal_scene.wgsl",
            SceneId::Test => "test_scene.wgsl",
        }
    }

    /// Title of the scene's UI panel
    pub fn label(self) -> &'static str {
        match self {
            SceneId::BouncyBalls => "Bouncy Balls",
            SceneId::Fractal => "Fractal",
            SceneId::Test => "Test Scene",
        }
    }
}

/// Vertex stage shared by every scene
pub const VERTEX_SHADER: &str = "basic_vert.wgsl";

/// Values bound to the UI sliders
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSettings {
    /// Target number of balls; the slider range is [`BALL_AMOUNT_RANGE`]
    pub ball_amount: i32,
    /// Radius the shader draws each ball with
    pub visible_size: f32,
    /// Radius the physics world simulates each ball with
    pub collision_size: f32,
    /// Smooth-union factor between neighbouring balls
    pub blending: f32,
    pub fractal_iteration: i32,
}

pub const BALL_AMOUNT_RANGE: std::ops::RangeInclusive<i32> = 5..=101;
pub const SIZE_RANGE: std::ops::RangeInclusive<f32> = 0.1..=3.0;
pub const BLENDING_RANGE: std::ops::RangeInclusive<f32> = 0.0..=2.0;
pub const FRACTAL_ITERATION_RANGE: std::ops::RangeInclusive<i32> = 0..=20;

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            ball_amount: 5,
            visible_size: 0.7,
            collision_size: 0.3,
            blending: 1.0,
            fractal_iteration: 0,
        }
    }
}
