// Browser-side mounting constants. Simulation tuning lives in
// `field_core::constants`.

// Canvases mounted automatically at startup when present in the page
pub const PLANAR_CANVAS_ID: &str = "planar-field";
pub const SPHERE_CANVAS_ID: &str = "sphere-field";

// Attribute holding a JSON config for auto-mounted canvases
pub const CONFIG_ATTRIBUTE: &str = "data-field-config";

// Upper bound on devicePixelRatio used for backing stores (keeps 4x phones cheap)
pub const MAX_DEVICE_PIXEL_RATIO: f64 = 2.0;

// Smallest backing store dimension in device pixels
pub const MIN_BACKING_PX: u32 = 1;

// Sphere surface clear colour (transparent; the page shows through)
pub const SPHERE_CLEAR_RGBA: [f64; 4] = [0.0, 0.0, 0.0, 0.0];
