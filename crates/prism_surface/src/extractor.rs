//! Isosurface extraction
//!
//! [`SurfaceExtractor`] is the seam between the compute pipeline and the
//! polygoniser. The pipeline only relies on the contract: after `extract`
//! returns, the mesh holds a complete triangle list for the iso level
//! within the configured cube, with outward normals and counter-clockwise
//! front faces.

use prism_field::{ScalarField, Vec3};

use crate::grid::ScalarGrid;
use crate::lookup_tables::{polygon_len, CUBE_CORNERS, CUBE_TETRAHEDRA, EDGES, POLYGON_TABLE};
use crate::{Mesh, MeshVertex, SurfaceError};

/// Turns a scalar field into a triangle mesh over a cubic grid
pub trait SurfaceExtractor: Send {
    /// Set the grid: `resolution` cells per axis starting at `origin`
    fn configure(
        &mut self,
        resolution: usize,
        cell_size: f32,
        origin: Vec3,
    ) -> Result<(), SurfaceError>;

    /// Cells per axis
    fn resolution(&self) -> usize;

    /// Polygonise `field`, replacing the contents of `mesh`
    ///
    /// `seeds` are points believed to lie inside the surface; they let the
    /// extractor skip empty space.
    fn extract(&mut self, field: &dyn ScalarField, seeds: &[Vec3], mesh: &mut Mesh);
}

/// Surface-following tetrahedral extractor
///
/// Starting from each seed it walks along +x until it meets a cell the
/// surface passes through, then flood-fills across face neighbours that
/// are also crossed. Cells on the volume boundary are swept too so that
/// surface pieces clipped by the cube are not missed. With no seeds it
/// falls back to scanning every cell.
pub struct CrawlingExtractor {
    iso_level: f32,
    resolution: usize,
    cell_size: f32,
    origin: Vec3,
    normal_step: f32,
    corners: ScalarGrid,
    visited: Vec<u32>,
    visit_stamp: u32,
    frontier: Vec<[usize; 3]>,
}

impl CrawlingExtractor {
    /// Create an unconfigured extractor for the given iso level
    pub fn new(iso_level: f32) -> Self {
        Self {
            iso_level,
            resolution: 0,
            cell_size: 1.0,
            origin: Vec3::ZERO,
            normal_step: 0.25,
            corners: ScalarGrid::new(0),
            visited: Vec::new(),
            visit_stamp: 1,
            frontier: Vec::new(),
        }
    }

    #[inline]
    pub fn iso_level(&self) -> f32 {
        self.iso_level
    }

    #[inline]
    fn corner_position(&self, i: usize, j: usize, k: usize) -> Vec3 {
        self.origin + Vec3::new(i as f32, j as f32, k as f32) * self.cell_size
    }

    fn corner_value(&mut self, field: &dyn ScalarField, i: usize, j: usize, k: usize) -> f32 {
        let p = self.corner_position(i, j, k);
        self.corners
            .get_or_insert_with(i, j, k, || field.value(p))
            .unwrap_or(0.0)
    }

    /// Bitmask of corners above the iso level
    fn cell_case(&mut self, field: &dyn ScalarField, cell: [usize; 3]) -> u8 {
        let mut case = 0u8;
        for (c, offset) in CUBE_CORNERS.iter().enumerate() {
            let v = self.corner_value(
                field,
                cell[0] + offset[0],
                cell[1] + offset[1],
                cell[2] + offset[2],
            );
            if v > self.iso_level {
                case |= 1 << c;
            }
        }
        case
    }

    #[inline]
    fn is_crossing(&mut self, field: &dyn ScalarField, cell: [usize; 3]) -> bool {
        let case = self.cell_case(field, cell);
        case != 0 && case != 0xff
    }

    #[inline]
    fn cell_index(&self, cell: [usize; 3]) -> usize {
        (cell[0] * self.resolution + cell[1]) * self.resolution + cell[2]
    }

    /// Mark a cell examined; returns false if it already was this pass
    fn mark_visited(&mut self, cell: [usize; 3]) -> bool {
        let idx = self.cell_index(cell);
        if self.visited[idx] == self.visit_stamp {
            false
        } else {
            self.visited[idx] = self.visit_stamp;
            true
        }
    }

    fn begin_pass(&mut self) {
        self.corners.reset();
        self.frontier.clear();
        self.visit_stamp = self.visit_stamp.wrapping_add(1);
        if self.visit_stamp == 0 {
            self.visited.fill(0);
            self.visit_stamp = 1;
        }
    }

    fn enqueue_if_crossing(&mut self, field: &dyn ScalarField, cell: [usize; 3]) {
        if self.mark_visited(cell) && self.is_crossing(field, cell) {
            self.frontier.push(cell);
        }
    }

    fn seed_cell(&self, seed: Vec3) -> [usize; 3] {
        let max = (self.resolution - 1) as f32;
        let local = (seed - self.origin) / self.cell_size;
        let to_cell = |v: f32| v.floor().clamp(0.0, max) as usize;
        [to_cell(local.x), to_cell(local.y), to_cell(local.z)]
    }

    /// Walk +x from a seed until the first crossed cell
    fn walk_from_seed(&mut self, field: &dyn ScalarField, seed: Vec3) {
        let [start, j, k] = self.seed_cell(seed);
        for i in start..self.resolution {
            let cell = [i, j, k];
            let crossing = self.is_crossing(field, cell);
            if self.mark_visited(cell) && crossing {
                self.frontier.push(cell);
            }
            if crossing {
                break;
            }
        }
    }

    fn sweep_boundary(&mut self, field: &dyn ScalarField) {
        let n = self.resolution;
        for i in 0..n {
            for j in 0..n {
                if i == 0 || i == n - 1 || j == 0 || j == n - 1 {
                    for k in 0..n {
                        self.enqueue_if_crossing(field, [i, j, k]);
                    }
                } else {
                    self.enqueue_if_crossing(field, [i, j, 0]);
                    self.enqueue_if_crossing(field, [i, j, n - 1]);
                }
            }
        }
    }

    fn crawl(&mut self, field: &dyn ScalarField, mesh: &mut Mesh) {
        let n = self.resolution;
        while let Some(cell) = self.frontier.pop() {
            self.polygonize_cell(field, cell, mesh);

            let [i, j, k] = cell;
            let neighbours = [
                (i > 0).then(|| [i - 1, j, k]),
                (i + 1 < n).then(|| [i + 1, j, k]),
                (j > 0).then(|| [i, j - 1, k]),
                (j + 1 < n).then(|| [i, j + 1, k]),
                (k > 0).then(|| [i, j, k - 1]),
                (k + 1 < n).then(|| [i, j, k + 1]),
            ];
            for neighbour in neighbours.into_iter().flatten() {
                self.enqueue_if_crossing(field, neighbour);
            }
        }
    }

    fn scan_all(&mut self, field: &dyn ScalarField, mesh: &mut Mesh) {
        let n = self.resolution;
        for i in 0..n {
            for j in 0..n {
                for k in 0..n {
                    if self.is_crossing(field, [i, j, k]) {
                        self.polygonize_cell(field, [i, j, k], mesh);
                    }
                }
            }
        }
    }

    fn polygonize_cell(&mut self, field: &dyn ScalarField, cell: [usize; 3], mesh: &mut Mesh) {
        let mut values = [0.0f32; 8];
        let mut positions = [Vec3::ZERO; 8];
        for (c, offset) in CUBE_CORNERS.iter().enumerate() {
            let (i, j, k) = (cell[0] + offset[0], cell[1] + offset[1], cell[2] + offset[2]);
            values[c] = self.corner_value(field, i, j, k);
            positions[c] = self.corner_position(i, j, k);
        }

        for tet in CUBE_TETRAHEDRA.iter() {
            let mut case = 0usize;
            for (v, &corner) in tet.iter().enumerate() {
                if values[corner] > self.iso_level {
                    case |= 1 << v;
                }
            }

            let len = polygon_len(case);
            if len == 0 {
                continue;
            }

            let mut points = [(Vec3::ZERO, Vec3::ZERO); 4];
            for (n, point) in points.iter_mut().enumerate().take(len) {
                let edge = EDGES[POLYGON_TABLE[case][n] as usize];
                let (a, b) = (tet[edge[0]], tet[edge[1]]);
                *point = self.edge_vertex(field, positions[a], values[a], positions[b], values[b]);
            }

            emit_triangle(mesh, points[0], points[1], points[2]);
            if len == 4 {
                emit_triangle(mesh, points[0], points[2], points[3]);
            }
        }
    }

    fn edge_vertex(
        &self,
        field: &dyn ScalarField,
        p0: Vec3,
        v0: f32,
        p1: Vec3,
        v1: f32,
    ) -> (Vec3, Vec3) {
        let dv = v1 - v0;
        let t = if dv.abs() < 1e-8 {
            0.5
        } else {
            ((self.iso_level - v0) / dv).clamp(0.0, 1.0)
        };
        let p = p0.lerp(p1, t);
        (p, self.normal_at(field, p))
    }

    /// Outward normal: the field decreases away from the surface interior
    fn normal_at(&self, field: &dyn ScalarField, p: Vec3) -> Vec3 {
        let h = self.normal_step;
        let gradient = Vec3::new(
            field.value(p + Vec3::X * h) - field.value(p - Vec3::X * h),
            field.value(p + Vec3::Y * h) - field.value(p - Vec3::Y * h),
            field.value(p + Vec3::Z * h) - field.value(p - Vec3::Z * h),
        );
        let len = gradient.length();
        if len > 1e-8 && len.is_finite() {
            -gradient / len
        } else {
            Vec3::ZERO
        }
    }
}

/// Push a triangle wound counter-clockwise as seen along its normals
fn emit_triangle(mesh: &mut Mesh, a: (Vec3, Vec3), b: (Vec3, Vec3), c: (Vec3, Vec3)) {
    let face = (b.0 - a.0).cross(c.0 - a.0);
    let face_len = face.length();
    if face_len < 1e-12 {
        return;
    }

    let (b, c) = if face.dot(a.1 + b.1 + c.1) < 0.0 { (c, b) } else { (b, c) };
    let face_normal = (b.0 - a.0).cross(c.0 - a.0) / face_len;

    let vertex = |(p, n): (Vec3, Vec3)| {
        let n = if n == Vec3::ZERO { face_normal } else { n };
        MeshVertex::new(p.to_array(), n.to_array())
    };
    mesh.push_triangle([vertex(a), vertex(b), vertex(c)]);
}

impl SurfaceExtractor for CrawlingExtractor {
    fn configure(
        &mut self,
        resolution: usize,
        cell_size: f32,
        origin: Vec3,
    ) -> Result<(), SurfaceError> {
        if resolution == 0 {
            return Err(SurfaceError::InvalidResolution(resolution));
        }
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(SurfaceError::InvalidCellSize(cell_size));
        }

        if resolution != self.resolution {
            self.corners.resize(resolution + 1);
            self.visited.clear();
            self.visited.resize(resolution * resolution * resolution, 0);
            self.visit_stamp = 1;
            log::debug!("Crawling extractor resized to {}^3 cells", resolution);
        }
        self.resolution = resolution;
        self.cell_size = cell_size;
        self.origin = origin;
        self.normal_step = cell_size * 0.25;
        Ok(())
    }

    fn resolution(&self) -> usize {
        self.resolution
    }

    fn extract(&mut self, field: &dyn ScalarField, seeds: &[Vec3], mesh: &mut Mesh) {
        mesh.begin();
        if self.resolution == 0 {
            mesh.finish();
            return;
        }

        self.begin_pass();
        if seeds.is_empty() {
            self.scan_all(field, mesh);
        } else {
            for &seed in seeds {
                self.walk_from_seed(field, seed);
            }
            self.sweep_boundary(field);
            self.crawl(field, mesh);
        }
        mesh.finish();
    }
}
