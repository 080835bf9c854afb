use crate::dom::{self, Listener};
use crate::frame::RafDriver;
use crate::input::{client_to_local, client_to_ndc};
use field_core::{FrameClient, PlanarPointer, SpherePointer};
use glam::Vec2;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

/// A running field: its driver's stop hook plus every listener it added.
///
/// Dropping it stops the driver before the listeners detach, so no frame
/// runs against a half-torn-down field.
pub struct Mounted {
    stop: Box<dyn Fn()>,
    listeners: Vec<Listener>,
}

impl Mounted {
    pub fn new<C: FrameClient + 'static>(
        driver: Rc<RefCell<RafDriver<C>>>,
        listeners: Vec<Listener>,
    ) -> Self {
        Self {
            stop: Box::new(move || driver.borrow_mut().stop()),
            listeners,
        }
    }
}

impl Drop for Mounted {
    fn drop(&mut self) {
        (self.stop)();
        self.listeners.clear();
    }
}

#[inline]
fn client_point(event: &web::Event) -> Option<Vec2> {
    event
        .dyn_ref::<web::MouseEvent>()
        .map(|e| Vec2::new(e.client_x() as f32, e.client_y() as f32))
}

/// Pointer tracking local to the planar canvas, in CSS pixels.
pub fn wire_planar_pointer(
    canvas: &web::HtmlCanvasElement,
    pointer: Rc<Cell<PlanarPointer>>,
) -> anyhow::Result<Vec<Listener>> {
    let canvas_move = canvas.clone();
    let pointer_move = pointer.clone();
    let on_move = Listener::new(canvas, "pointermove", move |event| {
        if let Some(client) = client_point(&event) {
            let rect = dom::client_rect(&canvas_move);
            pointer_move.set(PlanarPointer(Some(client_to_local(client, &rect))));
        }
    })?;
    let on_leave = Listener::new(canvas, "pointerleave", move |_| {
        pointer.set(PlanarPointer::NONE);
    })?;
    Ok(vec![on_move, on_leave])
}

/// Window-wide pointer tracking in NDC of the sphere canvas; leaving the
/// document clears it.
pub fn wire_sphere_pointer(
    window: &web::Window,
    canvas: &web::HtmlCanvasElement,
    pointer: Rc<Cell<SpherePointer>>,
) -> anyhow::Result<Vec<Listener>> {
    let canvas_move = canvas.clone();
    let pointer_move = pointer.clone();
    let mut listeners = vec![Listener::new(window, "pointermove", move |event| {
        if let Some(client) = client_point(&event) {
            let rect = dom::client_rect(&canvas_move);
            pointer_move.set(SpherePointer(client_to_ndc(client, &rect)));
        }
    })?];
    if let Some(root) = window.document().and_then(|d| d.document_element()) {
        listeners.push(Listener::new(&root, "mouseleave", move |_| {
            pointer.set(SpherePointer::NONE);
        })?);
    }
    Ok(listeners)
}

/// Keep the canvas backing store in sync with its layout size and forward
/// the new CSS size to the driver.
pub fn wire_resize<C: FrameClient + 'static>(
    window: &web::Window,
    canvas: &web::HtmlCanvasElement,
    driver: &Rc<RefCell<RafDriver<C>>>,
) -> anyhow::Result<Listener> {
    let canvas = canvas.clone();
    let driver = driver.clone();
    Listener::new(window, "resize", move |_| {
        let viewport = dom::sync_canvas_backing_size(&canvas);
        driver.borrow_mut().resize(viewport);
    })
}
