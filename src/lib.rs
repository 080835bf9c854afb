#![cfg(target_arch = "wasm32")]
use field_core::{PlanarConfig, SphereConfig};
use std::cell::RefCell;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

mod constants;
mod dom;
mod events;
mod frame;
mod input;
mod mount;
mod planar;
mod spherical;

use constants::{CONFIG_ATTRIBUTE, PLANAR_CANVAS_ID, SPHERE_CANVAS_ID};
use events::Mounted;

thread_local! {
    // Fields mounted from markup live as long as the page.
    static AUTO_MOUNTED: RefCell<Vec<Mounted>> = const { RefCell::new(Vec::new()) };
}

/// A mounted field. `destroy` (or `free` from JS) stops its animation loop
/// and removes its listeners.
#[wasm_bindgen]
pub struct FieldHandle {
    mounted: Option<Mounted>,
}

#[wasm_bindgen]
impl FieldHandle {
    pub fn destroy(&mut self) {
        if self.mounted.take().is_some() {
            log::info!("field destroyed");
        }
    }

    #[wasm_bindgen(getter)]
    pub fn active(&self) -> bool {
        self.mounted.is_some()
    }
}

fn to_js(e: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{e:#}"))
}

fn planar_config(json: Option<&str>) -> anyhow::Result<PlanarConfig> {
    Ok(match json {
        Some(j) => PlanarConfig::from_json(j)?,
        None => PlanarConfig::default(),
    })
}

fn sphere_config(json: Option<&str>, fallback: SphereConfig) -> anyhow::Result<SphereConfig> {
    Ok(match json {
        Some(j) => SphereConfig::from_json(j)?,
        None => fallback,
    })
}

/// Mount the planar (Canvas 2D) field on the canvas with id `canvas_id`.
#[wasm_bindgen]
pub fn mount_planar_field(
    canvas_id: &str,
    config_json: Option<String>,
) -> Result<FieldHandle, JsValue> {
    let config = planar_config(config_json.as_deref()).map_err(to_js)?;
    let mounted = planar::mount(canvas_id, config).map_err(to_js)?;
    Ok(FieldHandle {
        mounted: Some(mounted),
    })
}

/// Mount the spherical (WebGPU) field; resolves once the GPU device is ready.
#[wasm_bindgen]
pub async fn mount_spherical_field(
    canvas_id: String,
    config_json: Option<String>,
) -> Result<FieldHandle, JsValue> {
    let config = sphere_config(config_json.as_deref(), SphereConfig::default()).map_err(to_js)?;
    let mounted = spherical::mount(&canvas_id, config).await.map_err(to_js)?;
    Ok(FieldHandle {
        mounted: Some(mounted),
    })
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("particle-field starting");

    spawn_local(async move {
        if let Err(e) = auto_mount().await {
            log::error!("auto-mount error: {:?}", e);
        }
    });
    Ok(())
}

/// Mount fields on the well-known canvas ids when the page carries them.
/// A `data-field-config` attribute overrides the defaults; the sphere falls
/// back to the hero preset. Each canvas mounts independently.
async fn auto_mount() -> anyhow::Result<()> {
    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;

    if let Some(el) = document.get_element_by_id(PLANAR_CANVAS_ID) {
        let json = el.get_attribute(CONFIG_ATTRIBUTE);
        let result = planar_config(json.as_deref())
            .and_then(|config| planar::mount(PLANAR_CANVAS_ID, config));
        if let Some(mounted) = mount::settle(PLANAR_CANVAS_ID, result) {
            keep(mounted);
        }
    }
    if let Some(el) = document.get_element_by_id(SPHERE_CANVAS_ID) {
        let json = el.get_attribute(CONFIG_ATTRIBUTE);
        let result = match sphere_config(json.as_deref(), SphereConfig::hero()) {
            Ok(config) => spherical::mount(SPHERE_CANVAS_ID, config).await,
            Err(e) => Err(e),
        };
        if let Some(mounted) = mount::settle(SPHERE_CANVAS_ID, result) {
            keep(mounted);
        }
    }
    Ok(())
}

fn keep(mounted: Mounted) {
    AUTO_MOUNTED.with(|m| m.borrow_mut().push(mounted));
}
