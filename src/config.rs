use std::path::PathBuf;

/// Largest time step handed to the physics world per frame
pub const MAX_PHYSICS_STEP: f32 = 1.0 / 60.0;

/// Substep budget for one physics step
pub const PHYSICS_SUB_STEPS: u32 = 10;

/// Application-wide defaults. There are no CLI flags; everything is fixed at build time.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub shader_dir: PathBuf,
    pub clear_color: wgpu::Color,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "RayMarching".to_string(),
            window_width: 900,
            window_height: 900,
            shader_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders")),
            clear_color: wgpu::Color {
                r: 0.2,
                g: 0.3,
                b: 0.3,
                a: 1.0,
            },
        }
    }
}
