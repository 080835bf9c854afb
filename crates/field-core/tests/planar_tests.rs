// Frame-level properties of the planar field.

use field_core::planar::Node;
use field_core::surface::CommandRecorder;
use field_core::{PlanarConfig, PlanarField, PlanarPointer, Viewport};
use glam::Vec2;
use proptest::prelude::*;

fn still(x: f32, y: f32) -> Node {
    Node {
        position: Vec2::new(x, y),
        velocity: Vec2::ZERO,
        radius: 2.0,
        brightness: 1.0,
    }
}

fn assert_in_bounds(field: &PlanarField) {
    let vp = field.viewport();
    for (i, n) in field.nodes().iter().enumerate() {
        assert!(
            (0.0..=vp.width).contains(&n.position.x) && (0.0..=vp.height).contains(&n.position.y),
            "node {i} escaped to {:?}",
            n.position
        );
    }
}

#[test]
fn positions_stay_in_viewport_with_orbiting_pointer() {
    let vp = Viewport::new(800.0, 600.0);
    let mut field = PlanarField::new(PlanarConfig::default(), vp, 99).unwrap();
    for frame in 0..2000 {
        let t = frame as f32 * 0.01;
        let pointer = if frame % 300 < 200 {
            PlanarPointer::at(400.0 + 390.0 * t.cos(), 300.0 + 290.0 * t.sin())
        } else {
            PlanarPointer::NONE
        };
        field.step(pointer);
        assert_in_bounds(&field);
    }
}

#[test]
fn brightness_decays_monotonically_to_floor_without_pointer() {
    let mut field =
        PlanarField::new(PlanarConfig::default(), Viewport::new(500.0, 500.0), 5).unwrap();
    let mut prev: Vec<f32> = field.nodes().iter().map(|n| n.brightness).collect();
    for _ in 0..60 {
        field.step(PlanarPointer::NONE);
        for (n, p) in field.nodes().iter().zip(&prev) {
            assert!(n.brightness <= *p);
            assert!(n.brightness >= 0.5);
        }
        prev = field.nodes().iter().map(|n| n.brightness).collect();
    }
    assert!(field.nodes().iter().all(|n| n.brightness == 0.5));
}

#[test]
fn edge_threshold_is_strict() {
    let cfg = PlanarConfig::default();
    let d = cfg.connection_distance;
    let eps = 0.01;
    let vp = Viewport::new(800.0, 600.0);

    let inside = PlanarField::with_nodes(
        cfg.clone(),
        vp,
        vec![still(100.0, 300.0), still(100.0 + d - eps, 300.0)],
        0,
    )
    .unwrap();
    assert_eq!(inside.edges().len(), 1);

    let outside = PlanarField::with_nodes(
        cfg,
        vp,
        vec![still(100.0, 300.0), still(100.0 + d + eps, 300.0)],
        0,
    )
    .unwrap();
    assert!(outside.edges().is_empty());
}

#[test]
fn large_fields_link_the_same_pairs_as_small_scans() {
    // 400 nodes goes through the spatial hash; compare against a direct scan.
    let cfg = PlanarConfig {
        node_count: 400,
        ..PlanarConfig::default()
    };
    let mut field = PlanarField::new(cfg, Viewport::new(1400.0, 900.0), 21).unwrap();
    field.step(PlanarPointer::at(700.0, 450.0));
    let nodes = field.nodes();
    let mut expected = Vec::new();
    for i in 0..nodes.len() {
        for j in i + 1..nodes.len() {
            let d = nodes[i].position.distance(nodes[j].position);
            if d < 150.0 {
                expected.push((i as u32, j as u32));
            }
        }
    }
    let got: Vec<(u32, u32)> = field.edges().iter().map(|e| (e.a, e.b)).collect();
    assert_eq!(got, expected);
}

#[test]
fn identical_seeds_and_pointer_paths_replay_exactly() {
    let run = || {
        let mut field =
            PlanarField::new(PlanarConfig::default(), Viewport::new(1024.0, 768.0), 1234).unwrap();
        let mut history = Vec::new();
        for frame in 0..300 {
            let pointer = PlanarPointer::at((frame * 3 % 1024) as f32, (frame * 7 % 768) as f32);
            field.step(pointer);
            history.push(field.nodes().to_vec());
        }
        history
    };
    assert_eq!(run(), run());
}

#[test]
fn reseed_keeps_count_and_fits_new_viewport() {
    let mut field =
        PlanarField::new(PlanarConfig::default(), Viewport::new(1920.0, 1080.0), 8).unwrap();
    field.reseed(Viewport::new(320.0, 240.0));
    assert_eq!(field.nodes().len(), 80);
    assert_in_bounds(&field);

    // Hidden canvases report an empty size; the previous layout is kept.
    let before = field.nodes().to_vec();
    field.reseed(Viewport::new(0.0, 0.0));
    assert_eq!(field.nodes(), &before[..]);
}

#[test]
fn render_draws_every_edge_and_node() {
    let field =
        PlanarField::new(PlanarConfig::default(), Viewport::new(600.0, 400.0), 77).unwrap();
    let mut rec = CommandRecorder::default();
    field.render(PlanarPointer::NONE, &mut rec);
    assert_eq!(rec.lines().count(), field.edges().len());
    assert_eq!(rec.discs().count(), field.nodes().len());
    assert_eq!(rec.glows().count(), 0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn bounds_hold_for_arbitrary_pointer_paths(
        seed in any::<u64>(),
        path in prop::collection::vec(
            prop::option::of((-200.0f32..1000.0, -200.0f32..800.0)),
            1..120,
        ),
    ) {
        let mut field = PlanarField::new(PlanarConfig::default(), Viewport::new(800.0, 600.0), seed).unwrap();
        for p in path {
            let pointer = PlanarPointer(p.map(|(x, y)| Vec2::new(x, y)));
            field.step(pointer);
            for n in field.nodes() {
                prop_assert!((0.0..=800.0).contains(&n.position.x));
                prop_assert!((0.0..=600.0).contains(&n.position.y));
                prop_assert!((0.5..=1.0).contains(&n.brightness));
            }
        }
    }
}
