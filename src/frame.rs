use field_core::{AnimationDriver, FrameClient, FrameScheduler};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub type RafDriver<C> = AnimationDriver<RafScheduler<C>, C>;

/// `requestAnimationFrame` behind the driver's scheduler seam.
///
/// Each request carries its own token; the rAF handle is only kept so a
/// pending request can be cancelled.
pub struct RafScheduler<C: FrameClient + 'static> {
    window: web::Window,
    driver: Weak<RefCell<RafDriver<C>>>,
    next: u64,
    pending: Option<(u64, i32)>,
}

impl<C: FrameClient + 'static> FrameScheduler for RafScheduler<C> {
    type Token = u64;

    fn schedule(&mut self) -> u64 {
        let token = self.next;
        self.next += 1;
        let driver = self.driver.clone();
        let callback = Closure::once_into_js(move |timestamp_ms: f64| {
            let Some(driver) = driver.upgrade() else {
                return;
            };
            match driver.try_borrow_mut() {
                Ok(mut d) => d.on_frame(token, timestamp_ms),
                Err(_) => log::warn!("frame {token} skipped: driver busy"),
            };
        });
        match self
            .window
            .request_animation_frame(callback.unchecked_ref::<js_sys::Function>())
        {
            Ok(handle) => self.pending = Some((token, handle)),
            Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
        }
        token
    }

    fn cancel(&mut self, token: u64) {
        if let Some((pending, handle)) = self.pending {
            if pending == token {
                _ = self.window.cancel_animation_frame(handle);
                self.pending = None;
            }
        }
    }
}

/// Build a driver for `client` on the window's display loop and start it.
pub fn start_loop<C: FrameClient + 'static>(
    window: web::Window,
    client: C,
) -> Rc<RefCell<RafDriver<C>>> {
    let driver = Rc::new_cyclic(|weak| {
        RefCell::new(AnimationDriver::new(
            RafScheduler {
                window,
                driver: weak.clone(),
                next: 0,
                pending: None,
            },
            client,
        ))
    });
    driver.borrow_mut().start();
    driver
}
