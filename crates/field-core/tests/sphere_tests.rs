// Frame-level properties of the spherical field and its geometry.

use field_core::geometry::{fibonacci_sphere, ray_sphere};
use field_core::spherical::resolve_ray_target;
use field_core::{Ray, SphereConfig, SphereField, SpherePointer, SphereTarget};
use glam::{Quat, Vec2, Vec3};
use proptest::prelude::*;
use rand::prelude::*;
use rand::Rng;

fn config() -> SphereConfig {
    SphereConfig {
        count: 600,
        ..SphereConfig::hero()
    }
}

/// Pointer sweeping across the sphere's silhouette and beyond.
fn sweep(frame: usize) -> SpherePointer {
    let t = frame as f32 * 0.05;
    SpherePointer::at(0.45 * t.cos(), 0.45 * (1.3 * t).sin())
}

#[test]
fn displacement_never_exceeds_cap() {
    let cfg = SphereConfig {
        max_displacement: 0.05,
        ..config()
    };
    let cap = cfg.max_displacement;
    let mut field = SphereField::new(cfg).unwrap();
    let mut reached_cap = false;
    for frame in 0..600 {
        field.step(SpherePointer::at(0.02, 0.01), 1.0 / 60.0);
        for d in field.displacements() {
            assert!(d.length() <= cap + 1e-6, "frame {frame}: |d| = {}", d.length());
            reached_cap |= d.length() > cap * 0.99;
        }
    }
    assert!(reached_cap, "pointer never drove a particle to the cap");
}

#[test]
fn topology_is_fixed_after_construction() {
    let mut field = SphereField::new(config()).unwrap();
    let initial = field.edges().to_vec();
    assert!(!initial.is_empty());
    for frame in 0..400 {
        field.step(sweep(frame), 1.0 / 60.0);
    }
    assert_eq!(field.edges(), &initial[..]);
}

#[test]
fn line_vertices_follow_particles() {
    let mut field = SphereField::new(config()).unwrap();
    for frame in 0..30 {
        field.step(sweep(frame), 1.0 / 60.0);
    }
    let frame = field.frame();
    for (edge, seg) in field.edges().iter().zip(frame.line_vertices.chunks_exact(2)) {
        assert_eq!(seg[0], field.positions()[edge[0] as usize]);
        assert_eq!(seg[1], field.positions()[edge[1] as usize]);
    }
    for ((home, disp), pos) in field
        .homes()
        .iter()
        .zip(field.displacements())
        .zip(field.positions())
    {
        assert_eq!(*home + *disp, *pos);
    }
}

#[test]
fn displacement_decays_monotonically_once_pointer_leaves() {
    let mut field = SphereField::new(config()).unwrap();
    for _ in 0..40 {
        field.step(SpherePointer::at(0.0, 0.0), 1.0 / 60.0);
    }
    assert!(field.displacements().iter().any(|d| d.length() > 0.0));

    let mut prev: Vec<f32> = field.displacements().iter().map(|d| d.length()).collect();
    for _ in 0..400 {
        field.step(SpherePointer::NONE, 1.0 / 60.0);
        for (d, p) in field.displacements().iter().zip(&prev) {
            assert!(d.length() <= *p);
        }
        prev = field.displacements().iter().map(|d| d.length()).collect();
    }
    assert!(prev.iter().all(|m| *m < 1e-6));
}

#[test]
fn homes_never_move() {
    let mut field = SphereField::new(config()).unwrap();
    let homes = field.homes().to_vec();
    for frame in 0..120 {
        field.step(sweep(frame), 1.0 / 60.0);
    }
    assert_eq!(field.homes(), &homes[..]);
}

#[test]
fn identical_pointer_paths_replay_exactly() {
    let run = || {
        let mut field = SphereField::new(config()).unwrap();
        let mut history = Vec::new();
        for frame in 0..200 {
            field.step(sweep(frame), 1.0 / 60.0);
            history.push(field.positions().to_vec());
        }
        history
    };
    assert_eq!(run(), run());
}

#[test]
fn fibonacci_points_lie_on_the_sphere() {
    let pts = fibonacci_sphere(1000, 1.0);
    assert_eq!(pts.len(), 1000);
    for p in &pts {
        assert!((p.length() - 1.0).abs() < 1e-5, "norm {}", p.length());
    }
}

fn nearest_neighbour_cv(points: &[Vec3]) -> f32 {
    let nn: Vec<f32> = points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            points
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, q)| p.distance(*q))
                .fold(f32::MAX, f32::min)
        })
        .collect();
    let mean = nn.iter().sum::<f32>() / nn.len() as f32;
    let var = nn.iter().map(|d| (d - mean) * (d - mean)).sum::<f32>() / nn.len() as f32;
    var.sqrt() / mean
}

#[test]
fn fibonacci_density_is_more_uniform_than_random_scatter() {
    let lattice = fibonacci_sphere(1000, 1.0);
    let mut rng = StdRng::seed_from_u64(2024);
    let scatter: Vec<Vec3> = (0..1000)
        .map(|_| loop {
            let v = Vec3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            if let Some(n) = v.try_normalize() {
                if v.length() <= 1.0 {
                    break n;
                }
            }
        })
        .collect();
    let lattice_cv = nearest_neighbour_cv(&lattice);
    let scatter_cv = nearest_neighbour_cv(&scatter);
    assert!(lattice_cv < 0.15, "lattice spread {lattice_cv}");
    assert!(
        lattice_cv * 3.0 < scatter_cv,
        "lattice {lattice_cv} vs scatter {scatter_cv}"
    );
}

#[test]
fn axial_ray_hits_at_distance_minus_radius() {
    for radius in [0.5f32, 1.0, 2.8, 3.0, 7.5] {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z).unwrap();
        let t = ray_sphere(&ray, Vec3::ZERO, radius).expect("axial ray must hit");
        assert!((t - (10.0 - radius)).abs() < 1e-5, "radius {radius}: t = {t}");
        match resolve_ray_target(&ray, radius, 1.0) {
            Some(SphereTarget::Surface(p)) => {
                assert!((p - Vec3::new(0.0, 0.0, radius)).length() < 1e-5)
            }
            other => panic!("expected surface hit, got {other:?}"),
        }
    }
}

#[test]
fn ray_just_outside_tangent_uses_closest_point() {
    let radius = 2.0;
    let eps = 1e-2;
    // Closest approach q sits just outside the shell on the viewer's side;
    // the ray runs perpendicular to q through it.
    let theta = 0.3f32;
    let q = Vec3::new(theta.cos(), 0.0, theta.sin()) * (radius + eps);
    let dir = Vec3::new(theta.sin(), 0.0, -theta.cos());
    let ray = Ray::new(q - dir * 10.0, dir).unwrap();

    assert!(ray_sphere(&ray, Vec3::ZERO, radius).is_none());
    match resolve_ray_target(&ray, radius, 0.5) {
        Some(SphereTarget::Outside(p)) => assert!((p - q).length() < 1e-4, "got {p}"),
        other => panic!("expected closest-point target, got {other:?}"),
    }
    // Out of reach once the influence shell is thinner than the gap.
    assert!(resolve_ray_target(&ray, radius, eps * 0.5).is_none());
}

#[test]
fn closest_point_behind_viewer_is_rejected() {
    // Passes the sphere on the far side (z < 0).
    let ray = Ray::new(Vec3::new(-10.0, 0.0, -2.5), Vec3::X).unwrap();
    assert!(resolve_ray_target(&ray, 2.0, 1.0).is_none());
}

#[test]
fn rotated_field_pulls_particles_facing_the_camera_now() {
    // A quarter turn puts the pointer's local target on the old +X/-X rim.
    let cfg = SphereConfig {
        rotation_speed: std::f32::consts::FRAC_PI_2,
        ..config()
    };
    let mut field = SphereField::new(cfg).unwrap();
    field.step(SpherePointer::NONE, 1.0);
    let rotation = Quat::from_rotation_y(field.rotation_y());

    let pointer = SpherePointer::at(0.0, 0.0);
    let target = rotation.inverse() * field.resolve_target(pointer).unwrap().point();
    field.step(pointer, 0.0);

    let influence = field.config().mouse_influence;
    let mut pulled_from_back_half = 0;
    for (home, disp) in field.homes().iter().zip(field.displacements()) {
        let distance = (target - *home).length();
        let expected =
            (rotation * *home).z > 0.0 && distance < influence && distance > 0.01;
        assert_eq!(*disp != Vec3::ZERO, expected, "home {home}");
        if expected && home.z < 0.0 {
            pulled_from_back_half += 1;
        }
    }
    assert!(pulled_from_back_half > 0);
}

#[test]
fn outside_target_draws_particles_beyond_the_shell() {
    let cfg = SphereConfig {
        rotation_speed: 0.0,
        ..config()
    };
    let radius = cfg.radius;
    let mut field = SphereField::new(cfg).unwrap();
    let pointer = SpherePointer::at(0.675, 0.0);
    assert!(matches!(
        field.resolve_target(pointer),
        Some(SphereTarget::Outside(_))
    ));

    for _ in 0..200 {
        field.step(pointer, 1.0 / 60.0);
    }
    let furthest = field
        .positions()
        .iter()
        .map(|p| p.length())
        .fold(0.0f32, f32::max);
    assert!(furthest > radius, "furthest particle at {furthest}");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn clamp_holds_for_arbitrary_pointer_paths(
        cap in 0.01f32..1.5,
        path in prop::collection::vec(
            prop::option::of((-1.0f32..1.0, -1.0f32..1.0)),
            1..80,
        ),
    ) {
        let cfg = SphereConfig { count: 300, max_displacement: cap, ..SphereConfig::hero() };
        let mut field = SphereField::new(cfg).unwrap();
        for p in path {
            field.step(SpherePointer(p.map(|(x, y)| Vec2::new(x, y))), 1.0 / 60.0);
            for d in field.displacements() {
                prop_assert!(d.length() <= cap * (1.0 + 1e-5));
            }
        }
    }
}
