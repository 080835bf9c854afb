use crate::constants::SPHERE_CLEAR_RGBA;
use crate::dom;
use crate::events::{self, Mounted};
use crate::frame;
use anyhow::anyhow;
use field_core::gpu::SphereRenderer;
use field_core::{
    FrameClient, FrameInfo, SphereConfig, SphereField, SphereFrame, SpherePointer, Viewport,
};
use std::cell::Cell;
use std::rc::Rc;
use web_sys as web;

pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: SphereRenderer,
    clear_color: wgpu::Color,
}

impl GpuState {
    pub async fn new(canvas: &web::HtmlCanvasElement, field: &SphereField) -> anyhow::Result<Self> {
        let width = canvas.width().max(1);
        let height = canvas.height().max(1);

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow!("No WebGPU adapter"))?;
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
            .await
            .map_err(|e| anyhow!("request_device error: {:?}", e))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8UnormSrgb | wgpu::TextureFormat::Rgba8UnormSrgb
                )
            })
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow!("surface reports no formats"))?;
        // The page shows through the cleared areas.
        let alpha_mode = if caps
            .alpha_modes
            .contains(&wgpu::CompositeAlphaMode::PreMultiplied)
        {
            wgpu::CompositeAlphaMode::PreMultiplied
        } else {
            caps.alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto)
        };
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let frame = field.frame();
        let renderer = SphereRenderer::new(
            &device,
            format,
            frame.points.len(),
            frame.line_vertices.len(),
        );
        let [r, g, b, a] = SPHERE_CLEAR_RGBA;
        log::info!(
            "sphere gpu ready: {:?} {}x{} alpha {:?}",
            format,
            width,
            height,
            alpha_mode
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            renderer,
            clear_color: wgpu::Color { r, g, b, a },
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width != self.config.width || height != self.config.height {
            self.config.width = width;
            self.config.height = height;
            self.reconfigure();
        }
    }

    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn render(&mut self, frame: &SphereFrame) -> Result<(), wgpu::SurfaceError> {
        self.renderer.upload(&self.device, &self.queue, frame);
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("sphere_encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("sphere_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.renderer.draw(&mut pass);
        }
        self.queue.submit(Some(encoder.finish()));
        output.present();
        Ok(())
    }
}

pub struct SphereClient {
    field: SphereField,
    canvas: web::HtmlCanvasElement,
    // Dropped after an out-of-memory surface error; the field keeps stepping.
    gpu: Option<GpuState>,
    pointer: Rc<Cell<SpherePointer>>,
}

impl FrameClient for SphereClient {
    fn step(&mut self, frame: &FrameInfo) {
        self.field.step(self.pointer.get(), frame.dt_sec);
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        match gpu.render(&self.field.frame()) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => gpu.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("sphere surface out of memory; rendering stopped");
                self.gpu = None;
            }
            Err(e) => log::warn!("sphere frame skipped: {:?}", e),
        }
    }

    fn resize(&mut self, viewport: Viewport) {
        self.field.resize(viewport);
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.resize(self.canvas.width(), self.canvas.height());
        }
    }
}

/// Mount the spherical field on `canvas_id` once WebGPU is ready.
pub async fn mount(canvas_id: &str, config: SphereConfig) -> anyhow::Result<Mounted> {
    let window = web::window().ok_or_else(|| anyhow!("no window"))?;
    let canvas = dom::canvas_by_id(canvas_id)?;
    let viewport = dom::sync_canvas_backing_size(&canvas);

    let mut field = SphereField::new(config)?;
    field.resize(viewport);
    let gpu = GpuState::new(&canvas, &field).await?;
    log::info!(
        "spherical field on #{canvas_id}: {} particles, {} edges",
        field.positions().len(),
        field.edges().len()
    );

    let pointer = Rc::new(Cell::new(SpherePointer::NONE));
    let mut listeners = events::wire_sphere_pointer(&window, &canvas, pointer.clone())?;
    let driver = frame::start_loop(
        window.clone(),
        SphereClient {
            field,
            canvas: canvas.clone(),
            gpu: Some(gpu),
            pointer,
        },
    );
    listeners.push(events::wire_resize(&window, &canvas, &driver)?);
    Ok(Mounted::new(driver, listeners))
}
