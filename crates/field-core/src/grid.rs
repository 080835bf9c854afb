//! Proximity pair search used to build edges for both fields.
//!
//! Small point sets are scanned pair by pair. Larger sets go through a
//! uniform spatial hash whose cell size equals the search distance, so only
//! the 3^d neighbouring cells need checking. Both paths emit the same pairs,
//! sorted by `(a, b)` with `a < b`.

use crate::constants::GRID_THRESHOLD;
use fnv::FnvHashMap;
use glam::{Vec2, Vec3};
use smallvec::SmallVec;

/// A position the spatial hash can bucket.
pub trait GridPoint: Copy {
    fn cell(&self, cell_size: f32) -> [i32; 3];
    fn distance(&self, other: &Self) -> f32;
    /// Offsets of the cells to visit around a cell (itself included).
    fn neighbourhood() -> &'static [[i32; 3]];
}

const NEIGHBOURS_2D: [[i32; 3]; 9] = [
    [-1, -1, 0],
    [0, -1, 0],
    [1, -1, 0],
    [-1, 0, 0],
    [0, 0, 0],
    [1, 0, 0],
    [-1, 1, 0],
    [0, 1, 0],
    [1, 1, 0],
];

const fn neighbours_3d() -> [[i32; 3]; 27] {
    let mut out = [[0; 3]; 27];
    let mut i = 0;
    while i < 27 {
        out[i] = [(i % 3) as i32 - 1, ((i / 3) % 3) as i32 - 1, (i / 9) as i32 - 1];
        i += 1;
    }
    out
}

const NEIGHBOURS_3D: [[i32; 3]; 27] = neighbours_3d();

impl GridPoint for Vec2 {
    #[inline]
    fn cell(&self, cell_size: f32) -> [i32; 3] {
        [
            (self.x / cell_size).floor() as i32,
            (self.y / cell_size).floor() as i32,
            0,
        ]
    }

    #[inline]
    fn distance(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    fn neighbourhood() -> &'static [[i32; 3]] {
        &NEIGHBOURS_2D
    }
}

impl GridPoint for Vec3 {
    #[inline]
    fn cell(&self, cell_size: f32) -> [i32; 3] {
        [
            (self.x / cell_size).floor() as i32,
            (self.y / cell_size).floor() as i32,
            (self.z / cell_size).floor() as i32,
        ]
    }

    #[inline]
    fn distance(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    fn neighbourhood() -> &'static [[i32; 3]] {
        &NEIGHBOURS_3D
    }
}

/// Unordered pair `a < b` closer than the search distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pair {
    pub a: u32,
    pub b: u32,
    pub distance: f32,
}

/// Bucketed point indices, reused across frames to avoid reallocation.
#[derive(Default)]
pub struct SpatialHash {
    cell_size: f32,
    cells: FnvHashMap<[i32; 3], SmallVec<[u32; 8]>>,
}

impl SpatialHash {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: FnvHashMap::default(),
        }
    }

    pub fn clear(&mut self) {
        for bucket in self.cells.values_mut() {
            bucket.clear();
        }
    }

    pub fn rebuild<P: GridPoint>(&mut self, points: &[P], cell_size: f32) {
        if cell_size != self.cell_size {
            self.cells.clear();
            self.cell_size = cell_size;
        } else {
            self.clear();
        }
        for (i, p) in points.iter().enumerate() {
            self.cells
                .entry(p.cell(cell_size))
                .or_default()
                .push(i as u32);
        }
    }

    /// Pairs closer than `max_distance`; `rebuild` must have been called with
    /// the same points and `max_distance` as the cell size.
    pub fn pairs_within<P: GridPoint>(&self, points: &[P], max_distance: f32, out: &mut Vec<Pair>) {
        for (i, p) in points.iter().enumerate() {
            let [cx, cy, cz] = p.cell(self.cell_size);
            for [dx, dy, dz] in P::neighbourhood() {
                let Some(bucket) = self.cells.get(&[cx + dx, cy + dy, cz + dz]) else {
                    continue;
                };
                for &j in bucket.iter().filter(|&&j| j as usize > i) {
                    let distance = p.distance(&points[j as usize]);
                    if distance < max_distance {
                        out.push(Pair {
                            a: i as u32,
                            b: j,
                            distance,
                        });
                    }
                }
            }
        }
        out.sort_unstable_by_key(|pair| (pair.a, pair.b));
    }
}

/// Pair-by-pair scan, in `(a, b)` order.
pub fn brute_force_pairs<P: GridPoint>(points: &[P], max_distance: f32, out: &mut Vec<Pair>) {
    for (i, p) in points.iter().enumerate() {
        for (j, q) in points.iter().enumerate().skip(i + 1) {
            let distance = p.distance(q);
            if distance < max_distance {
                out.push(Pair {
                    a: i as u32,
                    b: j as u32,
                    distance,
                });
            }
        }
    }
}

/// Clears `out` and fills it with every pair closer than `max_distance`,
/// picking the scan strategy by point count.
pub fn proximity_pairs<P: GridPoint>(
    points: &[P],
    max_distance: f32,
    hash: &mut SpatialHash,
    out: &mut Vec<Pair>,
) {
    out.clear();
    if points.len() < GRID_THRESHOLD {
        brute_force_pairs(points, max_distance, out);
    } else {
        hash.rebuild(points, max_distance);
        hash.pairs_within(points, max_distance, out);
    }
}
