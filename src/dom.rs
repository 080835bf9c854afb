use crate::constants::{MAX_DEVICE_PIXEL_RATIO, MIN_BACKING_PX};
use crate::input::{backing_size, clamp_pixel_ratio, ClientRect};
use anyhow::anyhow;
use field_core::{FieldError, Viewport};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

pub fn canvas_by_id(id: &str) -> anyhow::Result<web::HtmlCanvasElement> {
    let document = window_document().ok_or_else(|| anyhow!("no document"))?;
    let el = document
        .get_element_by_id(id)
        .ok_or_else(|| FieldError::MissingContext(format!("missing #{id}")))?;
    el.dyn_into::<web::HtmlCanvasElement>()
        .map_err(|_| anyhow!("#{id} is not a canvas"))
}

#[inline]
pub fn client_rect(el: &web::Element) -> ClientRect {
    let rect = el.get_bounding_client_rect();
    ClientRect {
        left: rect.left() as f32,
        top: rect.top() as f32,
        width: rect.width() as f32,
        height: rect.height() as f32,
    }
}

/// Match the canvas backing store to its CSS size times devicePixelRatio and
/// return the CSS size, which is what the fields simulate in.
pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) -> Viewport {
    let rect = canvas.get_bounding_client_rect();
    let dpr = web::window()
        .map(|w| clamp_pixel_ratio(w.device_pixel_ratio(), MAX_DEVICE_PIXEL_RATIO))
        .unwrap_or(1.0);
    let (w_px, h_px) = backing_size(rect.width(), rect.height(), dpr, MIN_BACKING_PX);
    if canvas.width() != w_px {
        canvas.set_width(w_px);
    }
    if canvas.height() != h_px {
        canvas.set_height(h_px);
    }
    Viewport::new(rect.width() as f32, rect.height() as f32)
}

/// DOM event listener that detaches itself when dropped.
pub struct Listener {
    target: web::EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(web::Event)>,
}

impl Listener {
    pub fn new(
        target: &web::EventTarget,
        event: &'static str,
        handler: impl FnMut(web::Event) + 'static,
    ) -> anyhow::Result<Self> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web::Event)>);
        target
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(|e| anyhow!("add {event} listener: {e:?}"))?;
        Ok(Self {
            target: target.clone(),
            event,
            closure,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref());
    }
}
