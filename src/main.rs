//! FBO Particle Simulation
//!
//! A grid of particles whose state lives in a pair of float textures. Every
//! frame a full-screen pass computes the next state from the previous one,
//! the result is drawn as points, and the textures swap roles.

use glam::Vec2;
use particle_core::{
    run_forever, seed_info, seed_positions, DisplaySync, ExperienceConfig, FramePasses,
    FrameUniforms, GridError, OrbitRule, PingPong, Simulation, SimulationStep, SystemClock,
    Viewport,
};
use particle_renderer::{themed_shading, Camera, ParticleRenderer};
use particle_simulation::{check_grid_fits, SimulationError, SimulationPass, StateTexture};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    platform::pump_events::{EventLoopExtPumpEvents, PumpStatus},
    window::{Window, WindowId},
};

/// Fatal startup errors
#[derive(Error, Debug)]
enum AppError {
    #[error("Failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("Failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("No suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("Failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("Surface reports no supported formats")]
    SurfaceUnsupported,

    #[error("Window has zero size ({width}x{height})")]
    ZeroSizedSurface { width: u32, height: u32 },

    #[error("Invalid particle grid: {0}")]
    Grid(#[from] GridError),

    #[error(transparent)]
    Simulation(#[from] SimulationError),
}

/// The simulation pass, borrowed from `GpuState`. Enough to prime the state.
struct GpuSimulation<'a> {
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    pass: &'a SimulationPass,
    info: &'a StateTexture,
}

impl SimulationStep<StateTexture> for GpuSimulation<'_> {
    fn simulate(
        &mut self,
        previous: &StateTexture,
        next: &mut StateTexture,
        uniforms: &FrameUniforms,
    ) {
        self.pass.run(
            self.device,
            self.queue,
            previous.view(),
            self.info.view(),
            next.view(),
            uniforms,
        );
    }
}

/// Both passes of a presented frame.
struct GpuFrame<'a> {
    simulation: GpuSimulation<'a>,
    renderer: &'a ParticleRenderer,
    camera: &'a Camera,
    viewport: Viewport,
    surface_view: &'a wgpu::TextureView,
}

impl SimulationStep<StateTexture> for GpuFrame<'_> {
    fn simulate(
        &mut self,
        previous: &StateTexture,
        next: &mut StateTexture,
        uniforms: &FrameUniforms,
    ) {
        self.simulation.simulate(previous, next, uniforms);
    }
}

impl FramePasses<StateTexture> for GpuFrame<'_> {
    fn render(&mut self, latest: &StateTexture, uniforms: &FrameUniforms) {
        self.renderer.render(
            self.simulation.device,
            self.simulation.queue,
            self.surface_view,
            self.camera,
            latest.view(),
            uniforms,
            &self.viewport,
        );
    }
}

struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    simulation: Simulation<StateTexture, SystemClock>,
    simulation_pass: SimulationPass,
    info: StateTexture,
    renderer: ParticleRenderer,
    camera: Camera,

    frame_times: VecDeque<f32>,
    last_frame_time: Instant,
}

impl GpuState {
    async fn new(window: Arc<Window>, settings: &ExperienceConfig) -> Result<Self, AppError> {
        let size = window.inner_size();
        if size.width == 0 || size.height == 0 {
            return Err(AppError::ZeroSizedSurface {
                width: size.width,
                height: size.height,
            });
        }
        let viewport = Viewport::from_physical(size.width, size.height, window.scale_factor());
        let (width, height) = viewport.physical_size();

        // Create wgpu instance
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

        let surface = instance.create_surface(window.clone())?;

        // Request adapter
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        log::info!("✓ Using GPU: {}", adapter.get_info().name);

        // Create device and queue
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        // Configure surface
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(AppError::SurfaceUnsupported)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            // Redraws pace to the display refresh
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        // Seed the particle grid
        let grid = settings.grid()?;
        check_grid_fits(&device, &grid)?;
        let mut rng = rand::rng();
        let positions = seed_positions(&grid, &mut rng);
        let info_texels = seed_info(&grid, &mut rng);
        log::info!("✓ Seeded {} particles", grid.count());

        let seed =
            StateTexture::with_data(&device, &queue, &grid, "Seed Positions", &positions).await?;
        let info =
            StateTexture::with_data(&device, &queue, &grid, "Particle Info", &info_texels).await?;
        let first = StateTexture::render_target(&device, &grid, "Particle State A").await?;
        let second = StateTexture::render_target(&device, &grid, "Particle State B").await?;

        let simulation_pass = SimulationPass::new(&device, &grid, &OrbitRule::default());
        let renderer = ParticleRenderer::new(
            &device,
            &config,
            &grid,
            &themed_shading(),
            settings.point_size,
        );
        let camera = Camera::new(width, height);

        let mut simulation = Simulation::new(
            grid,
            PingPong::new(first, second),
            SystemClock::new(),
            viewport,
        );

        simulation.prime(
            &mut GpuSimulation {
                device: &device,
                queue: &queue,
                pass: &simulation_pass,
                info: &info,
            },
            &seed,
        );
        log::info!("✓ State textures primed");

        Ok(Self {
            surface,
            device,
            queue,
            config,
            simulation,
            simulation_pass,
            info,
            renderer,
            camera,
            frame_times: VecDeque::with_capacity(100),
            last_frame_time: Instant::now(),
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>, scale_factor: f64) {
        if new_size.width > 0 && new_size.height > 0 {
            let viewport = self
                .simulation
                .resize(Viewport::from_physical(new_size.width, new_size.height, scale_factor));
            let (width, height) = viewport.physical_size();

            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            self.renderer.resize(&self.device, &self.config);
            self.camera.resize(width, height);
        }
    }

    fn pointer_moved(&mut self, position: winit::dpi::PhysicalPosition<f64>, scale_factor: f64) {
        let logical = position.to_logical::<f32>(scale_factor);
        let inverse_view_proj = self.camera.inverse_view_projection();
        self.simulation
            .pointer_moved(Vec2::new(logical.x, logical.y), &inverse_view_proj);
    }

    fn render(&mut self) -> Result<(f32, f32), wgpu::SurfaceError> {
        // Track frame time
        let now = Instant::now();
        let frame_time = (now - self.last_frame_time).as_secs_f32() * 1000.0;
        self.last_frame_time = now;

        self.frame_times.push_back(frame_time);
        if self.frame_times.len() > 100 {
            self.frame_times.pop_front();
        }

        let avg_frame_time = self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32;
        let fps = 1000.0 / avg_frame_time;

        self.camera.update();

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut frame = GpuFrame {
            simulation: GpuSimulation {
                device: &self.device,
                queue: &self.queue,
                pass: &self.simulation_pass,
                info: &self.info,
            },
            renderer: &self.renderer,
            camera: &self.camera,
            viewport: *self.simulation.viewport(),
            surface_view: &view,
        };
        self.simulation.tick(&mut frame);

        output.present();
        Ok((fps, avg_frame_time))
    }
}

#[derive(Default)]
struct App {
    settings: ExperienceConfig,
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    mouse_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
    /// Set by `RedrawRequested`, cleared by `frame`
    redraw_pending: bool,
    exit_requested: bool,
}

impl App {
    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let window_attributes = Window::default_attributes()
            .with_title("FBO Particles")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        self.window = Some(window.clone());
        self.gpu_state = Some(pollster::block_on(GpuState::new(window.clone(), &self.settings))?);
        window.request_redraw();
        Ok(())
    }

    /// Render and present one frame, then ask for the next refresh.
    fn frame(&mut self) {
        self.redraw_pending = false;
        let (Some(window), Some(gpu_state)) = (&self.window, &mut self.gpu_state) else {
            return;
        };

        match gpu_state.render() {
            Ok((fps, frame_time)) => {
                window.set_title(&format!(
                    "FBO Particles - {:.0} FPS ({:.2}ms) - {} particles",
                    fps,
                    frame_time,
                    gpu_state.simulation.particle_count()
                ));
            }
            Err(wgpu::SurfaceError::Lost) => {
                gpu_state.resize(window.inner_size(), window.scale_factor())
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Surface out of memory");
                self.exit_requested = true;
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }

        window.request_redraw();
    }
}

/// Display refreshes, delivered by pumping the winit event loop.
struct WindowDisplay {
    event_loop: EventLoop<()>,
    app: App,
}

impl DisplaySync for WindowDisplay {
    fn wait_for_refresh(&mut self) -> bool {
        while !self.app.redraw_pending {
            if let PumpStatus::Exit(code) = self.event_loop.pump_app_events(None, &mut self.app) {
                log::info!("Event loop exited with code {}", code);
                return false;
            }
            if self.app.exit_requested {
                return false;
            }
        }
        !self.app.exit_requested
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init(event_loop) {
                log::error!("Startup failed: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),

            WindowEvent::Resized(physical_size) => {
                if let (Some(window), Some(gpu_state)) = (&self.window, &mut self.gpu_state) {
                    gpu_state.resize(physical_size, window.scale_factor());
                }
            }

            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let (Some(window), Some(gpu_state)) = (&self.window, &mut self.gpu_state) {
                    gpu_state.resize(window.inner_size(), scale_factor);
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Right {
                    self.mouse_pressed = state == ElementState::Pressed;
                    if !self.mouse_pressed {
                        self.last_mouse_pos = None;
                    }
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                if let (Some(window), Some(gpu_state)) = (&self.window, &mut self.gpu_state) {
                    gpu_state.pointer_moved(position, window.scale_factor());

                    if self.mouse_pressed {
                        if let Some(last_pos) = self.last_mouse_pos {
                            let delta_x = (position.x - last_pos.0) as f32;
                            let delta_y = (position.y - last_pos.1) as f32;
                            gpu_state.camera.rotate(-delta_x * 0.005, delta_y * 0.005);
                        }
                        self.last_mouse_pos = Some((position.x, position.y));
                    }
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_x, y) => y * 10.0,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                };

                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state
                        .camera
                        .zoom(-scroll * gpu_state.camera.distance / 100.0);
                }
            }

            WindowEvent::RedrawRequested => self.redraw_pending = true,

            _ => {}
        }
    }
}

fn main() -> Result<(), winit::error::EventLoopError> {
    // Initialize logger (RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting FBO particle simulation...");

    let settings = ExperienceConfig::from_env();
    log::info!(
        "Grid {}x{}, point size {}",
        settings.grid_size,
        settings.grid_size,
        settings.point_size
    );

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut display = WindowDisplay {
        event_loop,
        app: App {
            settings,
            ..Default::default()
        },
    };

    run_forever(&mut display, |display| display.app.frame());
    Ok(())
}
