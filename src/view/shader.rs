use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::ShaderError;
use crate::model::{SceneId, ShaderUniforms, UniformUpdate, VERTEX_SHADER};
use crate::utils::Vertex;

/// Read a WGSL source file
pub fn read_source(path: &Path) -> Result<String, ShaderError> {
    fs::read_to_string(path).map_err(|source| ShaderError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// One vertex + fragment pair with its own uniform block. Uniform values
/// persist between frames; a push only overwrites what the update carries.
pub struct ShaderProgram {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    uniforms: ShaderUniforms,
}

impl ShaderProgram {
    pub fn from_files(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
        vertex_path: &Path,
        fragment_path: &Path,
    ) -> Result<Self, ShaderError> {
        let vertex_source = read_source(vertex_path)?;
        let fragment_source = read_source(fragment_path)?;
        let name = fragment_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "shader".to_string());

        let vertex_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{name}_vertex")),
            source: wgpu::ShaderSource::Wgsl(vertex_source.into()),
        });
        let fragment_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{name}_fragment")),
            source: wgpu::ShaderSource::Wgsl(fragment_source.into()),
        });

        let uniforms = ShaderUniforms::default();
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{name}_uniforms")),
            size: std::mem::size_of::<ShaderUniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("{name}_bind_group_layout")),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{name}_bind_group")),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{name}_pipeline_layout")),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("{name}_pipeline")),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &vertex_module,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // The quad is wound clockwise
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: depth_format,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        info!(program = %name, vertex = %vertex_path.display(), fragment = %fragment_path.display(), "built shader program");

        Ok(Self {
            pipeline,
            uniform_buffer,
            bind_group,
            uniforms,
        })
    }

    /// Merge `update` into the stored block and upload it
    pub fn push(&mut self, queue: &wgpu::Queue, update: &UniformUpdate) {
        self.uniforms.apply(update);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&self.uniforms));
    }

    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
    }
}

/// Path of a shader file inside the shader directory
pub fn shader_path(shader_dir: &Path, file: &str) -> PathBuf {
    shader_dir.join(file)
}

/// The three scene programs, all sharing the fullscreen vertex stage
pub struct ScenePrograms {
    bouncy_balls: ShaderProgram,
    fractal: ShaderProgram,
    test: ShaderProgram,
}

impl ScenePrograms {
    pub fn load(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
        shader_dir: &Path,
    ) -> Result<Self, ShaderError> {
        let vertex = shader_path(shader_dir, VERTEX_SHADER);
        let build = |scene: SceneId| {
            ShaderProgram::from_files(
                device,
                color_format,
                depth_format,
                &vertex,
                &shader_path(shader_dir, scene.fragment_shader()),
            )
        };

        Ok(Self {
            bouncy_balls: build(SceneId::BouncyBalls)?,
            fractal: build(SceneId::Fractal)?,
            test: build(SceneId::Test)?,
        })
    }

    pub fn get(&self, scene: SceneId) -> &ShaderProgram {
        match scene {
            SceneId::BouncyBalls => &self.bouncy_balls,
            SceneId::Fractal => &self.fractal,
            SceneId::Test => &self.test,
        }
    }

    pub fn get_mut(&mut self, scene: SceneId) -> &mut ShaderProgram {
        match scene {
            SceneId::BouncyBalls => &mut self.bouncy_balls,
            SceneId::Fractal => &mut self.fractal,
            SceneId::Test => &mut self.test,
        }
    }
}
