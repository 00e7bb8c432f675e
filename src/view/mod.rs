// VIEW: GPU setup, shader programs and frame drawing
pub mod gpu_init;
pub mod render;
pub mod shader;

pub use gpu_init::GpuContext;
pub use render::{EguiFrame, RenderState, DEPTH_FORMAT};
pub use shader::{ScenePrograms, ShaderProgram};
