use std::sync::Arc;
use std::time::Instant;

use anyhow::Context as _;
use tracing::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{CursorGrabMode, Window, WindowId},
};

// Import from the library crate
use raymarching::{config::AppConfig, controller, error::InitError, logging, ui, view};

use controller::input::native;
use controller::{CursorMode, FrameLoopContext, InputEvent};
use view::{EguiFrame, GpuContext, RenderState, ScenePrograms, DEPTH_FORMAT};

/// Everything that exists once the window is up
struct AppState {
    window: Arc<Window>,
    gpu: GpuContext,
    render_state: RenderState,
    programs: ScenePrograms,
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    frame_ctx: FrameLoopContext,
}

enum Redraw {
    Continue,
    Exit,
}

fn apply_cursor_mode(window: &Window, mode: CursorMode) {
    match mode {
        CursorMode::Captured => {
            // Not every platform supports locking; confining is close enough
            let grabbed = window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
            if let Err(err) = grabbed {
                warn!(error = %err, "could not capture cursor");
            }
            window.set_cursor_visible(false);
        }
        CursorMode::Free => {
            if let Err(err) = window.set_cursor_grab(CursorGrabMode::None) {
                warn!(error = %err, "could not release cursor");
            }
            window.set_cursor_visible(true);
        }
    }
}

impl AppState {
    fn new(event_loop: &ActiveEventLoop, config: &AppConfig, now: f32) -> Result<Self, InitError> {
        let window_attributes = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(config.window_width, config.window_height))
            .with_resizable(false);
        let window = Arc::new(event_loop.create_window(window_attributes)?);
        info!(width = config.window_width, height = config.window_height, "window created");

        let gpu = pollster::block_on(GpuContext::new(window.clone()))?;
        let programs = ScenePrograms::load(&gpu.device, gpu.format, DEPTH_FORMAT, &config.shader_dir)?;
        let render_state = RenderState::new(&gpu.device, gpu.config.clone(), config.clear_color);

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            None,
            None,
            None,
        );

        let frame_ctx = FrameLoopContext::new(now);
        apply_cursor_mode(&window, frame_ctx.input_state.cursor_mode());

        Ok(Self {
            window,
            gpu,
            render_state,
            programs,
            egui_ctx,
            egui_state,
            frame_ctx,
        })
    }

    fn handle_window_event(&mut self, event: &WindowEvent) {
        let response = self.egui_state.on_window_event(self.window.as_ref(), event);

        match event {
            WindowEvent::Resized(size) => {
                self.render_state
                    .resize(&self.gpu.device, &self.gpu.surface, size.width, size.height);
            }
            WindowEvent::Focused(false) => self.frame_ctx.push_event(InputEvent::FocusLost),
            WindowEvent::KeyboardInput { event, .. } => {
                // Releases always get through so nothing stays held
                if !response.consumed || event.state == ElementState::Released {
                    if let Some(input) = native::keyboard_to_input(event.physical_key, event.state) {
                        self.frame_ctx.push_event(input);
                    }
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(input) = native::mouse_button_to_input(*button, *state) {
                    self.frame_ctx.push_event(input);
                }
            }
            _ => {}
        }
    }

    fn redraw(&mut self, now: f32) -> Redraw {
        let output = self.frame_ctx.update(now, self.render_state.size());
        if output.close_requested {
            return Redraw::Exit;
        }
        if let Some(mode) = output.cursor_mode {
            apply_cursor_mode(&self.window, mode);
        }

        self.programs
            .get_mut(output.scene)
            .push(&self.gpu.queue, &output.uniforms);

        let raw_input = self.egui_state.take_egui_input(&self.window);
        let full_output = ui::build_ui(
            &self.egui_ctx,
            raw_input,
            output.scene,
            &mut self.frame_ctx.settings,
            self.frame_ctx.fps.fps(),
        );
        self.egui_state
            .handle_platform_output(&self.window, full_output.platform_output);

        let pixels_per_point = full_output.pixels_per_point;
        let (width, height) = self.render_state.size();
        let egui_frame = EguiFrame {
            primitives: self.egui_ctx.tessellate(full_output.shapes, pixels_per_point),
            textures_delta: full_output.textures_delta,
            screen_descriptor: egui_wgpu::ScreenDescriptor {
                size_in_pixels: [width, height],
                pixels_per_point,
            },
        };

        match self.render_state.draw_frame(
            &self.gpu.device,
            &self.gpu.queue,
            &self.gpu.surface,
            self.programs.get(output.scene),
            egui_frame,
        ) {
            Ok(()) => Redraw::Continue,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.render_state.reconfigure(&self.gpu.device, &self.gpu.surface);
                Redraw::Continue
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("GPU out of memory");
                Redraw::Exit
            }
            Err(err) => {
                warn!(error = %err, "dropped frame");
                Redraw::Continue
            }
        }
    }
}

struct App {
    config: AppConfig,
    start: Instant,
    state: Option<AppState>,
    fatal: Option<anyhow::Error>,
}

impl App {
    fn new(config: AppConfig) -> Self {
        Self {
            config,
            start: Instant::now(),
            state: None,
            fatal: None,
        }
    }

    fn now(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        match AppState::new(event_loop, &self.config, self.now()) {
            Ok(state) => self.state = Some(state),
            Err(err) => {
                self.fatal = Some(anyhow::Error::new(err).context("failed to initialise renderer"));
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let now = self.now();
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if window_id != state.window.id() {
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::RedrawRequested => {
                if let Redraw::Exit = state.redraw(now) {
                    event_loop.exit();
                }
            }
            other => state.handle_window_event(&other),
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let (Some(state), DeviceEvent::MouseMotion { delta }) = (self.state.as_mut(), event) {
            state.frame_ctx.push_event(native::mouse_motion_to_input(delta));
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }
}

fn run() -> anyhow::Result<()> {
    let event_loop = EventLoop::new()
        .map_err(InitError::from)
        .context("failed to start event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(AppConfig::default());
    event_loop
        .run_app(&mut app)
        .context("event loop exited with an error")?;

    match app.fatal.take() {
        Some(err) => Err(err),
        None => {
            info!("shutting down");
            Ok(())
        }
    }
}

fn main() {
    logging::init();

    if let Err(err) = run() {
        error!("{err:#}");
        println!("error: {err:?}");
        std::process::exit(1);
    }
}
