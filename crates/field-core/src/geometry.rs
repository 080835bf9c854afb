//! Ray and sphere geometry shared by the spherical field and the front-ends.
//!
//! These helpers avoid platform-specific APIs; the web and native frontends
//! build their camera matrices from the same `Camera` the simulation casts
//! pointer rays through.

use crate::constants::{CAMERA_ZFAR, CAMERA_ZNEAR};
use glam::{Mat4, Vec2, Vec3, Vec4};

/// Half-line `origin + t * direction`, `t >= 0`. `direction` is unit length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Builds a ray, normalising `direction`. Returns `None` for a zero direction.
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        let direction = direction.try_normalize()?;
        Some(Self { origin, direction })
    }

    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Simple right-handed camera description with perspective projection.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    /// Camera on the +Z axis at `distance`, looking at the origin.
    pub fn looking_at_origin(distance: f32, fov_degrees: f32, aspect: f32) -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, distance),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect,
            fovy_radians: fov_degrees.to_radians(),
            znear: CAMERA_ZNEAR,
            zfar: CAMERA_ZFAR,
        }
    }

    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }

    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// World-space ray from the eye through a point in normalized device
    /// coordinates (`x`, `y` in [-1, 1], +Y up).
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inv = (self.projection_matrix() * self.view_matrix()).inverse();
        let p_far = inv * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
        let p1: Vec3 = p_far.truncate() / p_far.w;
        let direction = (p1 - self.eye)
            .try_normalize()
            .unwrap_or_else(|| (self.target - self.eye).normalize_or_zero());
        Ray {
            origin: self.eye,
            direction,
        }
    }
}

/// Distance along `ray` to the first intersection with the sphere, or `None`
/// on a miss. When the origin is inside the sphere the exit point is returned.
#[inline]
pub fn ray_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let b = oc.dot(ray.direction);
    let c = oc.dot(oc) - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let root = disc.sqrt();
    let near = -b - root;
    if near >= 0.0 {
        return Some(near);
    }
    let far = -b + root;
    (far >= 0.0).then_some(far)
}

/// Ray parameter and position of the point on `ray` closest to `point`.
/// The parameter is clamped at zero, so points behind the origin map to it.
#[inline]
pub fn closest_point_on_ray(ray: &Ray, point: Vec3) -> (f32, Vec3) {
    let t = (point - ray.origin).dot(ray.direction).max(0.0);
    (t, ray.at(t))
}

/// `count` points spread over a sphere of `radius` with the golden-angle
/// (Fibonacci) lattice. Deterministic and O(n); density is near uniform
/// without any relaxation pass.
pub fn fibonacci_sphere(count: usize, radius: f32) -> Vec<Vec3> {
    let golden_angle = std::f32::consts::PI * (3.0 - 5.0_f32.sqrt());
    let last = count.saturating_sub(1).max(1) as f32;
    (0..count)
        .map(|i| {
            let y = 1.0 - (i as f32 / last) * 2.0;
            let ring = (1.0 - y * y).max(0.0).sqrt();
            let theta = golden_angle * i as f32;
            Vec3::new(theta.cos() * ring, y, theta.sin() * ring) * radius
        })
        .collect()
}
