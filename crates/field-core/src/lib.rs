pub mod config;
pub mod constants;
pub mod driver;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod planar;
pub mod spherical;
pub mod surface;

#[cfg(feature = "gpu")]
pub mod gpu;

pub use config::*;
pub use constants::*;
pub use driver::{AnimationDriver, FrameClient, FrameInfo, FrameScheduler, ManualScheduler};
pub use error::FieldError;
pub use geometry::{Camera, Ray};
pub use planar::{PlanarField, PlanarPointer};
pub use spherical::{SphereField, SphereFrame, SpherePointer, SphereTarget};
pub use surface::{PlanarSurface, Rgba};

// Shaders bundled as string constants
pub static SPHERE_WGSL: &str = include_str!("../shaders/sphere.wgsl");

/// Drawing-surface size in the units the field simulates in (CSS pixels for
/// the planar field).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True when either side is zero, negative, or not finite.
    pub fn is_empty(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height.max(1.0)
    }
}
