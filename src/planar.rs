use crate::dom;
use crate::events::{self, Mounted};
use crate::frame;
use anyhow::anyhow;
use field_core::{
    FieldError, FrameClient, FrameInfo, PlanarConfig, PlanarField, PlanarPointer, PlanarSurface,
    Rgba, Viewport,
};
use glam::Vec2;
use std::cell::Cell;
use std::f64::consts::TAU;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Canvas 2D context drawing in CSS pixels over a devicePixelRatio-sized
/// backing store.
pub struct Canvas2dSurface {
    canvas: web::HtmlCanvasElement,
    ctx: web::CanvasRenderingContext2d,
}

impl Canvas2dSurface {
    pub fn new(canvas: &web::HtmlCanvasElement) -> anyhow::Result<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| anyhow!("getContext('2d'): {e:?}"))?
            .ok_or_else(|| FieldError::MissingContext("canvas 2d context".into()))?
            .dyn_into::<web::CanvasRenderingContext2d>()
            .map_err(|_| anyhow!("2d context has an unexpected type"))?;
        Ok(Self {
            canvas: canvas.clone(),
            ctx,
        })
    }
}

impl PlanarSurface for Canvas2dSurface {
    fn clear(&mut self, width: f32, height: f32) {
        let sx = self.canvas.width() as f64 / width.max(1.0) as f64;
        let sy = self.canvas.height() as f64 / height.max(1.0) as f64;
        _ = self.ctx.set_transform(sx, 0.0, 0.0, sy, 0.0, 0.0);
        self.ctx.clear_rect(0.0, 0.0, width as f64, height as f64);
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Rgba, width: f32) {
        self.ctx.begin_path();
        self.ctx.move_to(from.x as f64, from.y as f64);
        self.ctx.line_to(to.x as f64, to.y as f64);
        self.ctx.set_stroke_style_str(&color.css());
        self.ctx.set_line_width(width as f64);
        self.ctx.stroke();
    }

    fn fill_disc(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.ctx.begin_path();
        _ = self
            .ctx
            .arc(center.x as f64, center.y as f64, radius as f64, 0.0, TAU);
        self.ctx.set_fill_style_str(&color.css());
        self.ctx.fill();
    }

    fn fill_glow(&mut self, center: Vec2, radius: f32, inner: Rgba, outer: Rgba) {
        let (x, y, r) = (center.x as f64, center.y as f64, radius as f64);
        let Ok(gradient) = self.ctx.create_radial_gradient(x, y, 0.0, x, y, r) else {
            return;
        };
        _ = gradient.add_color_stop(0.0, &inner.css());
        _ = gradient.add_color_stop(1.0, &outer.css());
        self.ctx.begin_path();
        _ = self.ctx.arc(x, y, r, 0.0, TAU);
        self.ctx.set_fill_style_canvas_gradient(&gradient);
        self.ctx.fill();
    }
}

pub struct PlanarClient {
    field: PlanarField,
    surface: Canvas2dSurface,
    pointer: Rc<Cell<PlanarPointer>>,
}

impl FrameClient for PlanarClient {
    fn step(&mut self, _frame: &FrameInfo) {
        let pointer = self.pointer.get();
        self.field.step(pointer);
        self.field.render(pointer, &mut self.surface);
    }

    fn resize(&mut self, viewport: Viewport) {
        self.field.reseed(viewport);
    }
}

/// Mount the planar field on `canvas_id` and start its loop.
pub fn mount(canvas_id: &str, config: PlanarConfig) -> anyhow::Result<Mounted> {
    let window = web::window().ok_or_else(|| anyhow!("no window"))?;
    let canvas = dom::canvas_by_id(canvas_id)?;
    let surface = Canvas2dSurface::new(&canvas)?;
    let viewport = dom::sync_canvas_backing_size(&canvas);

    let seed = config.seed.unwrap_or_else(rand::random);
    let field = PlanarField::new(config, viewport, seed)?;
    log::info!(
        "planar field on #{canvas_id}: {} nodes, {}x{} css px, seed {seed}",
        field.nodes().len(),
        viewport.width,
        viewport.height
    );

    let pointer = Rc::new(Cell::new(PlanarPointer::NONE));
    let mut listeners = events::wire_planar_pointer(&canvas, pointer.clone())?;
    let driver = frame::start_loop(
        window.clone(),
        PlanarClient {
            field,
            surface,
            pointer,
        },
    );
    listeners.push(events::wire_resize(&window, &canvas, &driver)?);
    Ok(Mounted::new(driver, listeners))
}
