use wgpu::{
    CommandEncoderDescriptor, Operations, RenderPassColorAttachment, RenderPassDepthStencilAttachment,
    RenderPassDescriptor, TextureView,
};

use crate::utils::{create_fullscreen_quad, MeshBuffer};
use crate::view::shader::ShaderProgram;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

pub fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> (wgpu::Texture, wgpu::TextureView) {
    let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());
    (depth_texture, depth_view)
}

/// Tessellated UI for one frame
pub struct EguiFrame {
    pub primitives: Vec<egui::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
    pub screen_descriptor: egui_wgpu::ScreenDescriptor,
}

pub struct RenderState {
    pub config: wgpu::SurfaceConfiguration,
    pub clear_color: wgpu::Color,
    pub quad: MeshBuffer,
    depth_view: TextureView,
    pub egui_renderer: egui_wgpu::Renderer,
}

impl RenderState {
    pub fn new(device: &wgpu::Device, config: wgpu::SurfaceConfiguration, clear_color: wgpu::Color) -> Self {
        let (_, depth_view) = create_depth_texture(device, config.width, config.height);
        let quad = create_fullscreen_quad().upload(device);
        let egui_renderer = egui_wgpu::Renderer::new(device, config.format, egui_wgpu::RendererOptions::default());

        Self {
            config,
            clear_color,
            quad,
            depth_view,
            egui_renderer,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Reconfigure the surface, e.g. after it was lost. Zero sizes are ignored.
    pub fn resize(&mut self, device: &wgpu::Device, surface: &wgpu::Surface, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        surface.configure(device, &self.config);

        let (_, depth_view) = create_depth_texture(device, width, height);
        self.depth_view = depth_view;
    }

    pub fn reconfigure(&mut self, device: &wgpu::Device, surface: &wgpu::Surface) {
        let (width, height) = self.size();
        self.resize(device, surface, width, height);
    }

    /// Clear, draw the quad with `program`, then draw the UI on top and present
    pub fn draw_frame(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface: &wgpu::Surface,
        program: &ShaderProgram,
        egui_frame: EguiFrame,
    ) -> Result<(), wgpu::SurfaceError> {
        let frame = surface.get_current_texture()?;
        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("frame_encoder"),
        });

        {
            let mut rp = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            program.bind(&mut rp);
            rp.set_vertex_buffer(0, self.quad.vertex_buffer.slice(..));
            rp.set_index_buffer(self.quad.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            rp.draw_indexed(0..self.quad.index_count, 0, 0..1);
        }

        // Upload egui textures
        for (id, image_delta) in &egui_frame.textures_delta.set {
            self.egui_renderer.update_texture(device, queue, *id, image_delta);
        }
        self.egui_renderer.update_buffers(
            device,
            queue,
            &mut encoder,
            &egui_frame.primitives,
            &egui_frame.screen_descriptor,
        );

        {
            let egui_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("egui_render_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.egui_renderer.render(
                &mut egui_pass.forget_lifetime(),
                &egui_frame.primitives,
                &egui_frame.screen_descriptor,
            );
        }

        for id in &egui_frame.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}
