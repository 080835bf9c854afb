use std::sync::Arc;
use std::time::Instant;

use field_core::gpu::SphereRenderer;
use field_core::{
    AnimationDriver, FrameClient, FrameInfo, FrameScheduler, SphereConfig, SphereField,
    SpherePointer, Viewport,
};
use glam::Vec2;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: SphereRenderer,
}

impl GpuState {
    async fn new(window: Arc<Window>, field: &SphereField) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window)?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No GPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps
            .formats
            .first()
            .copied()
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            desired_maximum_frame_latency: 2,
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let frame = field.frame();
        let renderer = SphereRenderer::new(
            &device,
            format,
            frame.points.len(),
            frame.line_vertices.len(),
        );
        log::info!("gpu ready: {:?} {}x{}", format, config.width, config.height);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            renderer,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
    }

    fn render(&mut self, field: &SphereField) -> Result<(), wgpu::SurfaceError> {
        self.renderer.upload(&self.device, &self.queue, &field.frame());
        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("sphere_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.renderer.draw(&mut rpass);
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

/// Frames come from winit redraw requests. A request cannot be withdrawn,
/// so `cancel` leaves it to the driver to drop the stale token.
struct RedrawScheduler {
    window: Arc<Window>,
    next: u64,
}

impl FrameScheduler for RedrawScheduler {
    type Token = u64;

    fn schedule(&mut self) -> u64 {
        let token = self.next;
        self.next += 1;
        self.window.request_redraw();
        token
    }

    fn cancel(&mut self, _token: u64) {}
}

struct SphereClient {
    field: SphereField,
    gpu: GpuState,
    pointer: SpherePointer,
    out_of_memory: bool,
}

impl FrameClient for SphereClient {
    fn step(&mut self, frame: &FrameInfo) {
        self.field.step(self.pointer, frame.dt_sec);
        match self.gpu.render(&self.field) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let (w, h) = (self.gpu.config.width, self.gpu.config.height);
                self.gpu.resize(w, h);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => self.out_of_memory = true,
            Err(e) => log::warn!("frame skipped: {:?}", e),
        }
    }

    fn resize(&mut self, viewport: Viewport) {
        self.field.resize(viewport);
        self.gpu.resize(viewport.width as u32, viewport.height as u32);
    }
}

/// Sphere config from the JSON file named on the command line, else the
/// landing-page preset.
fn load_config() -> anyhow::Result<SphereConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)?;
            log::info!("config from {path}");
            Ok(SphereConfig::from_json(&json)?)
        }
        None => Ok(SphereConfig::hero()),
    }
}

#[inline]
fn cursor_ndc(x: f64, y: f64, width: u32, height: u32) -> Option<Vec2> {
    if width == 0 || height == 0 {
        return None;
    }
    Some(Vec2::new(
        (x / width as f64 * 2.0 - 1.0) as f32,
        (1.0 - y / height as f64 * 2.0) as f32,
    ))
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let config = load_config()?;
    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Particle sphere (native)")
            .build(&event_loop)?,
    );

    let size = window.inner_size();
    let mut field = SphereField::new(config)?;
    field.resize(Viewport::new(size.width as f32, size.height as f32));
    let gpu = pollster::block_on(GpuState::new(Arc::clone(&window), &field))?;
    log::info!(
        "{} particles, {} edges",
        field.positions().len(),
        field.edges().len()
    );

    let mut driver = AnimationDriver::new(
        RedrawScheduler {
            window: Arc::clone(&window),
            next: 0,
        },
        SphereClient {
            field,
            gpu,
            pointer: SpherePointer::NONE,
            out_of_memory: false,
        },
    );
    let start = Instant::now();
    driver.start();

    event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Wait);
        match event {
            Event::WindowEvent {
                event: WindowEvent::Resized(size),
                ..
            } => driver.resize(Viewport::new(size.width as f32, size.height as f32)),
            Event::WindowEvent {
                event: WindowEvent::CursorMoved { position, .. },
                ..
            } => {
                let size = window.inner_size();
                driver.client_mut().pointer =
                    SpherePointer(cursor_ndc(position.x, position.y, size.width, size.height));
            }
            Event::WindowEvent {
                event: WindowEvent::CursorLeft { .. },
                ..
            } => driver.client_mut().pointer = SpherePointer::NONE,
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => {
                driver.stop();
                elwt.exit();
            }
            Event::WindowEvent {
                event: WindowEvent::RedrawRequested,
                ..
            } => {
                if let Some(token) = driver.pending() {
                    driver.on_frame(token, start.elapsed().as_secs_f64() * 1000.0);
                }
                if driver.client().out_of_memory {
                    log::error!("surface out of memory");
                    driver.stop();
                    elwt.exit();
                }
            }
            _ => {}
        }
    })?;
    Ok(())
}
