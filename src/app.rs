use std::sync::Arc;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::camera::Camera;
use crate::context::RenderContext;
use crate::emitter::{Emitted, UniformSink};
use crate::gpu::{GpuContext, GpuError};
use crate::logging::{LoggingConfig, init_logging};
use crate::pipeline::PipelineConfig;
use crate::renderer::BatchRenderer;
use crate::texture::{Texture, TextureError};

/// Failures that stop the run loop.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error(transparent)]
    Gpu(#[from] GpuError),
}

/// Window and renderer settings for [`run_with_config`].
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub clear_color: wgpu::Color,
    /// `Immediate` redraws as fast as the loop spins; unsupported modes fall back to `Fifo`.
    pub present_mode: wgpu::PresentMode,
    pub camera: Camera,
    pub pipeline: PipelineConfig,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "immgl".to_string(),
            width: 800,
            height: 600,
            clear_color: wgpu::Color::BLACK,
            present_mode: wgpu::PresentMode::Immediate,
            camera: Camera::default(),
            pipeline: PipelineConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn clear_color(mut self, r: f64, g: f64, b: f64) -> Self {
        self.clear_color = wgpu::Color { r, g, b, a: 1.0 };
        self
    }

    pub fn present_mode(mut self, mode: wgpu::PresentMode) -> Self {
        self.present_mode = mode;
        self
    }

    pub fn camera(mut self, camera: Camera) -> Self {
        self.camera = camera;
        self
    }

    pub fn pipeline(mut self, pipeline: PipelineConfig) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }
}

/// Context provided during app setup.
pub struct SetupContext<'a> {
    pub renderer: &'a mut BatchRenderer,
    pub gl: &'a mut RenderContext,
    pub camera: &'a mut Camera,
}

impl SetupContext<'_> {
    /// Load an image file and bind it for every following draw.
    pub fn load_texture(&mut self, path: &str) -> Result<(), TextureError> {
        let texture = Texture::from_file(self.renderer.gpu(), path)?;
        self.renderer.bind_texture(&texture);
        Ok(())
    }

    /// Bind a procedural checkerboard.
    pub fn checkerboard(&mut self, size: u32, cells: u32) {
        let texture = Texture::checkerboard(
            self.renderer.gpu(),
            size,
            cells,
            [235, 235, 235],
            [40, 90, 160],
        );
        self.renderer.bind_texture(&texture);
    }
}

/// Per-frame context handed to the frame closure.
///
/// Uniforms are already set and the target is cleared when the closure runs;
/// it only has to issue batches.
pub struct Frame<'a> {
    pub gl: &'a mut RenderContext,
    pub renderer: &'a mut BatchRenderer,
    /// Number of frames drawn before this one.
    pub frame_index: u64,
    /// Seconds since the loop started.
    pub time: f32,
    /// Seconds since the previous frame.
    pub dt: f32,
}

impl Frame<'_> {
    /// Close the open batch and draw it.
    pub fn end(&mut self) -> Option<Emitted> {
        self.gl.end(&mut *self.renderer)
    }
}

/// Run with the default configuration.
pub fn run<S, F>(setup: S) -> Result<(), AppError>
where
    S: FnOnce(&mut SetupContext) -> F + 'static,
    F: FnMut(&mut Frame) + 'static,
{
    run_with_config(AppConfig::default(), setup)
}

/// Open a window and drive the frame loop until it is closed.
///
/// Each iteration: clear the target, set the model/view/projection uniforms
/// (model is the context's current matrix), run the frame closure, present.
/// The loop polls continuously; pacing comes only from the present mode.
///
/// # Example
/// ```no_run
/// use immgl::{AppConfig, Topology, run_with_config};
///
/// run_with_config(AppConfig::new().title("Triangle"), |_ctx| {
///     move |frame| {
///         frame.gl.begin(Topology::Triangles);
///         frame.gl.color3(1.0, 0.0, 0.0);
///         frame.gl.vertex3(0.0, 0.5, 0.0);
///         frame.gl.vertex3(-0.5, -0.5, 0.0);
///         frame.gl.vertex3(0.5, -0.5, 0.0);
///         frame.end();
///     }
/// })
/// .unwrap();
/// ```
pub fn run_with_config<S, F>(config: AppConfig, setup: S) -> Result<(), AppError>
where
    S: FnOnce(&mut SetupContext) -> F + 'static,
    F: FnMut(&mut Frame) + 'static,
{
    init_logging(config.logging.clone());

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::Pending {
        config,
        setup: Some(Box::new(
            move |ctx: &mut SetupContext<'_>| -> Box<dyn FnMut(&mut Frame)> {
                Box::new(setup(ctx))
            },
        )),
    };

    event_loop.run_app(&mut app)?;

    match app {
        App::Failed(error) => Err(error),
        _ => Ok(()),
    }
}

type SetupFn = Box<dyn FnOnce(&mut SetupContext) -> Box<dyn FnMut(&mut Frame)>>;

enum App {
    Pending {
        config: AppConfig,
        setup: Option<SetupFn>,
    },
    Running(Box<Running>),
    Failed(AppError),
}

struct Running {
    window: Arc<Window>,
    renderer: BatchRenderer,
    gl: RenderContext,
    camera: Camera,
    clear_color: wgpu::Color,
    frame_fn: Box<dyn FnMut(&mut Frame)>,
    frame_index: u64,
    start_time: Instant,
    last_frame: Instant,
}

impl Running {
    fn start(
        event_loop: &ActiveEventLoop,
        config: &AppConfig,
        setup: SetupFn,
    ) -> Result<Self, AppError> {
        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let gpu = GpuContext::new(window.clone(), config.present_mode)?;
        let mut renderer = BatchRenderer::new(gpu, &config.pipeline);
        let mut gl = RenderContext::new();
        let mut camera = config.camera;

        let frame_fn = setup(&mut SetupContext {
            renderer: &mut renderer,
            gl: &mut gl,
            camera: &mut camera,
        });

        Ok(Self {
            window,
            renderer,
            gl,
            camera,
            clear_color: config.clear_color,
            frame_fn,
            frame_index: 0,
            start_time: Instant::now(),
            last_frame: Instant::now(),
        })
    }

    fn redraw(&mut self) {
        if !self.renderer.begin_frame(self.clear_color) {
            return;
        }

        let now = Instant::now();
        let time = self.start_time.elapsed().as_secs_f32();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        let aspect = self.renderer.gpu().aspect();
        set_frame_uniforms(&mut self.renderer, &self.gl, &self.camera, aspect);

        let mut frame = Frame {
            gl: &mut self.gl,
            renderer: &mut self.renderer,
            frame_index: self.frame_index,
            time,
            dt,
        };
        (self.frame_fn)(&mut frame);

        if self.gl.is_open() {
            log::warn!("frame {} ended with an open batch", self.frame_index);
        }

        self.renderer.present();
        self.frame_index += 1;
    }
}

/// Model comes from the context's current matrix, view and projection from
/// the camera.
fn set_frame_uniforms(
    sink: &mut impl UniformSink,
    gl: &RenderContext,
    camera: &Camera,
    aspect: f32,
) {
    sink.set_matrices(
        gl.model_matrix(),
        camera.view_matrix(),
        camera.projection_matrix(aspect),
    );
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let App::Pending { config, setup } = self else {
            return;
        };
        let Some(setup) = setup.take() else {
            return;
        };

        match Running::start(event_loop, config, setup) {
            Ok(running) => {
                log::info!("window '{}' ready", config.title);
                *self = App::Running(Box::new(running));
            }
            Err(error) => {
                log::error!("startup failed: {error}");
                *self = App::Failed(error);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let App::Running(running) = self else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                running.renderer.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                running.redraw();
                running.window.request_redraw();
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::{Command, RecordingSink};
    use glam::{Mat4, Vec3};

    #[test]
    fn config_builder_overrides_defaults() {
        let config = AppConfig::new()
            .title("Cube")
            .size(1280, 720)
            .clear_color(0.1, 0.2, 0.3)
            .present_mode(wgpu::PresentMode::Fifo);

        assert_eq!(config.title, "Cube");
        assert_eq!((config.width, config.height), (1280, 720));
        assert_eq!(config.clear_color.b, 0.3);
        assert_eq!(config.clear_color.a, 1.0);
        assert_eq!(config.present_mode, wgpu::PresentMode::Fifo);
    }

    #[test]
    fn frame_uniforms_take_model_from_context() {
        let mut gl = RenderContext::new();
        gl.translate(1.0, 2.0, 3.0);
        gl.rotate(30.0, 0.0, 0.0, 1.0);

        let camera = Camera::default();
        let mut sink = RecordingSink::new();
        set_frame_uniforms(&mut sink, &gl, &camera, 4.0 / 3.0);

        assert_eq!(
            sink.commands,
            vec![Command::Matrices {
                model: gl.model_matrix(),
                view: Mat4::look_at_rh(Vec3::new(0.0, 0.0, 3.0), Vec3::ZERO, Vec3::Y),
                projection: Mat4::perspective_rh(45f32.to_radians(), 4.0 / 3.0, 0.1, 100.0),
            }]
        );
    }

    #[test]
    fn default_config_matches_classic_window() {
        let config = AppConfig::default();
        assert_eq!((config.width, config.height), (800, 600));
        assert_eq!(config.camera.position, glam::Vec3::new(0.0, 0.0, 3.0));
    }
}
