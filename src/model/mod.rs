// MODEL: Scene data, camera and shader-facing values
pub mod camera;
pub mod scene;
pub mod uniforms;

pub use camera::{Camera, Direction};
pub use scene::{SceneId, SceneSettings, VERTEX_SHADER};
pub use uniforms::{CommonUniforms, SceneUniforms, ShaderUniforms, UniformUpdate, MAX_SHADER_BALLS};
