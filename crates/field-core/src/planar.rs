//! Planar point-and-edge field.
//!
//! Points drift across the viewport, bounce off its borders, are pulled
//! gently toward the pointer and link up with every neighbour closer than
//! the connection distance. Positions are in CSS pixels; motion is integrated
//! once per frame without wall-clock scaling.

use crate::config::PlanarConfig;
use crate::constants::*;
use crate::error::FieldError;
use crate::grid::{proximity_pairs, Pair, SpatialHash};
use crate::surface::{PlanarSurface, Rgba};
use crate::Viewport;
use glam::Vec2;
use rand::prelude::*;

/// Last known pointer position in surface pixels; `None` after pointer-leave.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlanarPointer(pub Option<Vec2>);

impl PlanarPointer {
    pub const NONE: Self = Self(None);

    pub fn at(x: f32, y: f32) -> Self {
        Self(Some(Vec2::new(x, y)))
    }

    /// Distance from the pointer to `p`, `None` when there is no pointer.
    #[inline]
    pub fn distance_to(&self, p: Vec2) -> Option<f32> {
        self.0.map(|m| m.distance(p))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Node {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    /// Disc opacity, always within [brightness_floor, 1] after a step.
    pub brightness: f32,
}

pub type Edge = Pair;

pub struct PlanarField {
    config: PlanarConfig,
    viewport: Viewport,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    // scratch buffers reused every frame
    positions: Vec<Vec2>,
    hash: SpatialHash,
    rng: StdRng,
}

impl PlanarField {
    pub fn new(config: PlanarConfig, viewport: Viewport, seed: u64) -> Result<Self, FieldError> {
        config.validate()?;
        if viewport.is_empty() {
            return Err(FieldError::EmptyViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        let mut field = Self {
            nodes: Vec::with_capacity(config.node_count),
            edges: Vec::new(),
            positions: Vec::with_capacity(config.node_count),
            hash: SpatialHash::new(config.connection_distance),
            rng: StdRng::seed_from_u64(seed),
            viewport,
            config,
        };
        field.scatter();
        log::debug!(
            "planar field: {} nodes over {}x{}",
            field.nodes.len(),
            viewport.width,
            viewport.height
        );
        Ok(field)
    }

    /// Field with caller-placed nodes; the node count is fixed from here on.
    pub fn with_nodes(
        config: PlanarConfig,
        viewport: Viewport,
        nodes: Vec<Node>,
        seed: u64,
    ) -> Result<Self, FieldError> {
        let config = PlanarConfig {
            node_count: nodes.len(),
            ..config
        };
        config.validate()?;
        if viewport.is_empty() {
            return Err(FieldError::EmptyViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        let mut field = Self {
            positions: Vec::with_capacity(nodes.len()),
            hash: SpatialHash::new(config.connection_distance),
            rng: StdRng::seed_from_u64(seed),
            edges: Vec::new(),
            nodes,
            viewport,
            config,
        };
        field.update_edges();
        Ok(field)
    }

    /// Scatter all nodes afresh over a new viewport. Empty viewports are
    /// ignored so a hidden canvas keeps its last layout.
    pub fn reseed(&mut self, viewport: Viewport) {
        if viewport.is_empty() {
            log::debug!(
                "planar field: ignoring empty viewport {}x{}",
                viewport.width,
                viewport.height
            );
            return;
        }
        self.viewport = viewport;
        self.scatter();
    }

    fn scatter(&mut self) {
        let Viewport { width, height } = self.viewport;
        let rng = &mut self.rng;
        self.nodes.clear();
        self.nodes.extend((0..self.config.node_count).map(|_| Node {
            position: Vec2::new(rng.gen::<f32>() * width, rng.gen::<f32>() * height),
            velocity: Vec2::new(
                (rng.gen::<f32>() - 0.5) * PLANAR_SPEED_SPAN,
                (rng.gen::<f32>() - 0.5) * PLANAR_SPEED_SPAN,
            ),
            radius: rng.gen::<f32>() * PLANAR_RADIUS_SPAN + PLANAR_RADIUS_MIN,
            brightness: rng.gen::<f32>() * 0.5 + 0.5,
        }));
        self.update_edges();
    }

    /// Advance one frame: integrate, reflect, attract, damp, relink.
    pub fn step(&mut self, pointer: PlanarPointer) {
        let Viewport { width, height } = self.viewport;
        let cfg = &self.config;

        for node in &mut self.nodes {
            node.position += node.velocity;

            if node.position.x < 0.0 || node.position.x > width {
                node.velocity.x = -node.velocity.x;
            }
            if node.position.y < 0.0 || node.position.y > height {
                node.velocity.y = -node.velocity.y;
            }
            node.position.x = node.position.x.clamp(0.0, width);
            node.position.y = node.position.y.clamp(0.0, height);

            let in_range = match pointer.0 {
                Some(mouse) => {
                    let to_mouse = mouse - node.position;
                    let distance = to_mouse.length();
                    if distance < cfg.pointer_radius && distance > 0.0 {
                        let force = (cfg.pointer_radius - distance) / cfg.pointer_radius
                            * cfg.attraction;
                        node.velocity += to_mouse / distance * force;
                        true
                    } else {
                        false
                    }
                }
                None => false,
            };
            node.brightness = if in_range {
                (node.brightness + PLANAR_BRIGHTNESS_RISE).min(1.0)
            } else {
                (node.brightness - PLANAR_BRIGHTNESS_DECAY).max(cfg.brightness_floor)
            };

            node.velocity *= cfg.friction;
        }

        self.update_edges();
    }

    /// Rebuild the edge list from current positions.
    pub fn update_edges(&mut self) {
        self.positions.clear();
        self.positions.extend(self.nodes.iter().map(|n| n.position));
        proximity_pairs(
            &self.positions,
            self.config.connection_distance,
            &mut self.hash,
            &mut self.edges,
        );
    }

    /// Draw the current state: edges first, then glows and discs on top.
    pub fn render<S: PlanarSurface>(&self, pointer: PlanarPointer, surface: &mut S) {
        let cfg = &self.config;
        surface.clear(self.viewport.width, self.viewport.height);

        for edge in &self.edges {
            let a = self.nodes[edge.a as usize].position;
            let b = self.nodes[edge.b as usize].position;
            let opacity = (1.0 - edge.distance / cfg.connection_distance) * EDGE_OPACITY_SCALE;
            let highlighted = pointer
                .distance_to((a + b) * 0.5)
                .is_some_and(|d| d < cfg.highlight_radius);
            let (alpha, width) = if highlighted {
                (opacity * EDGE_HIGHLIGHT_GAIN, EDGE_HIGHLIGHT_WIDTH)
            } else {
                (opacity, EDGE_WIDTH)
            };
            surface.stroke_line(a, b, Rgba::new(FIELD_CYAN, alpha), width);
        }

        for node in &self.nodes {
            let distance = pointer.distance_to(node.position);
            if let Some(d) = distance.filter(|d| *d < cfg.glow_radius) {
                let glow = (1.0 - d / cfg.glow_radius) * GLOW_MAX_RADIUS;
                if glow > 0.0 {
                    surface.fill_glow(
                        node.position,
                        glow,
                        Rgba::new(FIELD_CYAN, GLOW_ALPHA),
                        Rgba::new(FIELD_CYAN, 0.0),
                    );
                }
            }
            let scale = if distance.is_some_and(|d| d < cfg.highlight_radius) {
                NODE_HIGHLIGHT_SCALE
            } else {
                1.0
            };
            surface.fill_disc(
                node.position,
                node.radius * scale,
                Rgba::new(FIELD_CYAN, node.brightness),
            );
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Indices currently linked to node `i`.
    pub fn neighbors(&self, i: u32) -> impl Iterator<Item = u32> + '_ {
        self.edges.iter().filter_map(move |e| {
            if e.a == i {
                Some(e.b)
            } else if e.b == i {
                Some(e.a)
            } else {
                None
            }
        })
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn config(&self) -> &PlanarConfig {
        &self.config
    }
}
