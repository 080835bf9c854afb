//! Spherical point field.
//!
//! Particles sit on a Fibonacci lattice over a sphere shell and are linked
//! by a fixed proximity topology. Each frame the whole group turns slowly
//! about +Y; a ray cast from the pointer picks a target on or just outside
//! the shell, and front-facing particles near it are displaced toward it.
//! Displacements decay back to zero and are capped in magnitude.

use crate::config::SphereConfig;
use crate::constants::{ATTRACTION_GAIN, MIN_ATTRACTION_DISTANCE};
use crate::error::FieldError;
use crate::geometry::{closest_point_on_ray, fibonacci_sphere, ray_sphere, Camera, Ray};
use crate::grid::{proximity_pairs, SpatialHash};
use crate::Viewport;
use glam::{Mat4, Quat, Vec2, Vec3};

/// Pointer in normalized device coordinates; `None` after pointer-leave.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SpherePointer(pub Option<Vec2>);

impl SpherePointer {
    pub const NONE: Self = Self(None);

    pub fn at(x: f32, y: f32) -> Self {
        Self(Some(Vec2::new(x, y)))
    }
}

/// World-space attraction target for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SphereTarget {
    /// Near intersection of the pointer ray with the shell.
    Surface(Vec3),
    /// Closest approach of a missing ray, within reach outside the shell.
    Outside(Vec3),
}

impl SphereTarget {
    pub fn point(&self) -> Vec3 {
        match self {
            SphereTarget::Surface(p) | SphereTarget::Outside(p) => *p,
        }
    }
}

/// Persistent link between two particles, `[a, b]` with `a < b`.
pub type Edge = [u32; 2];

/// Everything a renderer needs for one frame.
pub struct SphereFrame<'a> {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
    pub points: &'a [Vec3],
    /// Two vertices per edge, in edge order.
    pub line_vertices: &'a [Vec3],
}

/// Target for a ray against a sphere of `radius` at the origin: the near hit,
/// else the ray's closest approach when it lies ahead of the ray origin, on
/// the viewer's side (z > 0) and within `radius + influence` of the centre.
pub fn resolve_ray_target(ray: &Ray, radius: f32, influence: f32) -> Option<SphereTarget> {
    if let Some(t) = ray_sphere(ray, Vec3::ZERO, radius) {
        return Some(SphereTarget::Surface(ray.at(t)));
    }
    let (t, closest) = closest_point_on_ray(ray, Vec3::ZERO);
    (t > 0.0 && closest.z > 0.0 && closest.length() < radius + influence)
        .then_some(SphereTarget::Outside(closest))
}

pub struct SphereField {
    config: SphereConfig,
    camera: Camera,
    homes: Vec<Vec3>,
    displacements: Vec<Vec3>,
    positions: Vec<Vec3>,
    edges: Vec<Edge>,
    line_vertices: Vec<Vec3>,
    rotation_y: f32,
}

impl SphereField {
    pub fn new(config: SphereConfig) -> Result<Self, FieldError> {
        config.validate()?;
        let homes = fibonacci_sphere(config.count, config.radius);

        let mut pairs = Vec::new();
        let mut hash = SpatialHash::default();
        proximity_pairs(
            &homes,
            config.edge_fraction * config.radius,
            &mut hash,
            &mut pairs,
        );
        let edges: Vec<Edge> = pairs.iter().map(|p| [p.a, p.b]).collect();
        let line_vertices = edges
            .iter()
            .flat_map(|[a, b]| [homes[*a as usize], homes[*b as usize]])
            .collect();

        log::debug!(
            "spherical field: {} particles, {} edges, radius {}",
            homes.len(),
            edges.len(),
            config.radius
        );

        Ok(Self {
            camera: Camera::looking_at_origin(config.camera_z, config.fov_degrees, 1.0),
            displacements: vec![Vec3::ZERO; homes.len()],
            positions: homes.clone(),
            homes,
            edges,
            line_vertices,
            rotation_y: 0.0,
            config,
        })
    }

    /// Only the camera aspect depends on the surface; particle homes are
    /// body-relative and stay put.
    pub fn resize(&mut self, viewport: Viewport) {
        if viewport.is_empty() {
            return;
        }
        self.camera.aspect = viewport.aspect();
        log::debug!("spherical field: aspect {}", self.camera.aspect);
    }

    /// Group transform (rotation about +Y).
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_quat(self.rotation())
    }

    fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.rotation_y)
    }

    /// Resolve the pointer into a world-space target for this frame.
    pub fn resolve_target(&self, pointer: SpherePointer) -> Option<SphereTarget> {
        let ndc = pointer.0?;
        let ray = self.camera.ray_from_ndc(ndc);
        resolve_ray_target(&ray, self.config.radius, self.config.mouse_influence)
    }

    /// Advance one frame; `dt_sec` only drives the ambient rotation.
    pub fn step(&mut self, pointer: SpherePointer, dt_sec: f32) {
        self.rotation_y =
            (self.rotation_y + dt_sec * self.config.rotation_speed) % std::f32::consts::TAU;

        let rotation = self.rotation();
        let local_target = self
            .resolve_target(pointer)
            .map(|t| rotation.inverse() * t.point());

        let influence = self.config.mouse_influence;
        let decay = 1.0 - self.config.return_speed;
        let cap = self.config.max_displacement;

        for ((home, disp), pos) in self
            .homes
            .iter()
            .zip(self.displacements.iter_mut())
            .zip(self.positions.iter_mut())
        {
            if let Some(target) = local_target {
                let current = *home + *disp;
                let front_facing = (rotation * current).z > 0.0;
                let to_target = target - current;
                let distance = to_target.length();
                if front_facing && distance < influence && distance > MIN_ATTRACTION_DISTANCE {
                    let falloff = 1.0 - distance / influence;
                    *disp += to_target / distance * (falloff * falloff * ATTRACTION_GAIN);
                }
            }

            *disp *= decay;

            let magnitude = disp.length();
            if magnitude > cap {
                *disp *= cap / magnitude;
            }

            *pos = *home + *disp;
        }

        for (edge, segment) in self.edges.iter().zip(self.line_vertices.chunks_exact_mut(2)) {
            segment[0] = self.positions[edge[0] as usize];
            segment[1] = self.positions[edge[1] as usize];
        }
    }

    pub fn frame(&self) -> SphereFrame<'_> {
        SphereFrame {
            model: self.model_matrix(),
            view: self.camera.view_matrix(),
            projection: self.camera.projection_matrix(),
            points: &self.positions,
            line_vertices: &self.line_vertices,
        }
    }

    pub fn homes(&self) -> &[Vec3] {
        &self.homes
    }

    pub fn displacements(&self) -> &[Vec3] {
        &self.displacements
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn rotation_y(&self) -> f32 {
        self.rotation_y
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn config(&self) -> &SphereConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> SphereConfig {
        SphereConfig {
            count: 300,
            ..SphereConfig::default()
        }
    }

    #[test]
    fn new_starts_at_home() {
        let field = SphereField::new(small()).unwrap();
        assert_eq!(field.homes().len(), 300);
        assert_eq!(field.positions(), field.homes());
        assert!(field.displacements().iter().all(|d| *d == Vec3::ZERO));
        assert_eq!(field.frame().line_vertices.len(), field.edges().len() * 2);
    }

    #[test]
    fn edges_are_shorter_than_threshold() {
        let field = SphereField::new(small()).unwrap();
        let limit = 0.25 * 3.0;
        assert!(!field.edges().is_empty());
        for [a, b] in field.edges() {
            assert!(a < b);
            let d = field.homes()[*a as usize].distance(field.homes()[*b as usize]);
            assert!(d < limit);
        }
    }

    #[test]
    fn rotation_advances_without_pointer() {
        let mut field = SphereField::new(small()).unwrap();
        field.step(SpherePointer::NONE, 1.0);
        assert!((field.rotation_y() - 0.15).abs() < 1e-6);
        assert!(field.displacements().iter().all(|d| *d == Vec3::ZERO));
    }

    #[test]
    fn centre_pointer_hits_front_of_sphere() {
        let field = SphereField::new(small()).unwrap();
        match field.resolve_target(SpherePointer::at(0.0, 0.0)) {
            Some(SphereTarget::Surface(p)) => assert!((p - Vec3::new(0.0, 0.0, 3.0)).length() < 1e-4),
            other => panic!("expected surface hit, got {other:?}"),
        }
    }

    #[test]
    fn far_corner_pointer_has_no_target() {
        let field = SphereField::new(small()).unwrap();
        assert!(field.resolve_target(SpherePointer::at(1.0, 1.0)).is_none());
        assert!(field.resolve_target(SpherePointer::NONE).is_none());
    }

    #[test]
    fn pointer_pulls_front_particles_only() {
        let mut field = SphereField::new(small()).unwrap();
        field.step(SpherePointer::at(0.0, 0.0), 0.0);
        let moved: Vec<usize> = field
            .displacements()
            .iter()
            .enumerate()
            .filter(|(_, d)| d.length() > 0.0)
            .map(|(i, _)| i)
            .collect();
        assert!(!moved.is_empty());
        for i in moved {
            assert!(field.homes()[i].z > 0.0, "back particle {i} moved");
        }
    }

    #[test]
    fn resize_only_touches_aspect() {
        let mut field = SphereField::new(small()).unwrap();
        let homes = field.homes().to_vec();
        field.resize(Viewport::new(1600.0, 800.0));
        assert!((field.camera().aspect - 2.0).abs() < 1e-6);
        assert_eq!(field.homes(), &homes[..]);
        field.resize(Viewport::new(0.0, 0.0));
        assert!((field.camera().aspect - 2.0).abs() < 1e-6);
    }
}
