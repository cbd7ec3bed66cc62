//! Kaleidoscope tiling
//!
//! The kaleidoscope volume is one octant, `[0,1]^3`. Mirroring it through
//! every combination of the three axis planes gives a 2-unit cell centred on
//! the origin; the cell is then repeated on an even-coordinate lattice
//! around the camera.
//!
//! Culling happens twice: once per cell with its bounding sphere, and once
//! per octant, since a cell straddling the frustum edge is rarely visible
//! in all eight of its octants.

use prism_math::{mat4, Mat4, Vec3};
use prism_surface::{Lod, Mesh};

use crate::frustum::FrustumCuller;
use crate::renderer::{Renderer, Winding};

/// Bounding radius of a 2-unit cell
const CELL_RADIUS: f32 = 1.732_050_8;
/// Bounding radius of a unit octant
const OCTANT_RADIUS: f32 = 0.866_025_4;

/// One octant to draw
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OctantDraw {
    /// Lattice coordinates of the cell
    pub cell: [i32; 3],
    /// Bit i set if axis i is mirrored
    pub octant: u8,
    pub lod: Lod,
    pub model: Mat4,
    pub winding: Winding,
}

/// Per-frame tiling statistics
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TileStats {
    pub cells_visited: u32,
    pub cells_culled: u32,
    pub octants_culled: u32,
    pub octants_drawn: u32,
    /// Octants drawn at full, medium and low detail
    pub per_lod: [u32; 3],
}

/// Replicates the mirrored unit cell across the visible lattice
#[derive(Clone, Debug, PartialEq)]
pub struct KaleidoscopeTiler {
    draw_depth: u32,
    /// Squared distances below which full and medium detail are used
    lod_thresholds: [f32; 2],
}

impl KaleidoscopeTiler {
    pub fn new(draw_depth: u32) -> Self {
        Self {
            draw_depth,
            lod_thresholds: [16.0, 36.0],
        }
    }

    /// Override the squared LOD distances (full, medium)
    pub fn with_lod_thresholds(mut self, full: f32, medium: f32) -> Self {
        self.lod_thresholds = [full, medium];
        self
    }

    #[inline]
    pub fn draw_depth(&self) -> u32 {
        self.draw_depth
    }

    /// Cell containing a world position
    pub fn camera_cell(eye: Vec3) -> [i32; 3] {
        let c = (eye * 0.5).round();
        [c.x as i32, c.y as i32, c.z as i32]
    }

    /// Level of detail for a squared distance
    #[inline]
    pub fn lod_for(&self, distance_squared: f32) -> Lod {
        if distance_squared < self.lod_thresholds[0] {
            Lod::Full
        } else if distance_squared < self.lod_thresholds[1] {
            Lod::Medium
        } else {
            Lod::Low
        }
    }

    /// Decide every octant to draw this frame
    ///
    /// `out` is cleared first and may be reused across frames.
    pub fn plan(&self, culler: &FrustumCuller, out: &mut Vec<OctantDraw>) -> TileStats {
        out.clear();
        let mut stats = TileStats::default();
        let eye = culler.camera().eye;
        let origin = Self::camera_cell(eye);
        let d = self.draw_depth as i32;

        for di in -d..=d {
            for dj in -d..=d {
                for dk in -d..=d {
                    let cell = [origin[0] + di, origin[1] + dj, origin[2] + dk];
                    let offset = Vec3::new(cell[0] as f32, cell[1] as f32, cell[2] as f32) * 2.0;
                    stats.cells_visited += 1;

                    if !culler.contains_sphere(offset, CELL_RADIUS) {
                        stats.cells_culled += 1;
                        continue;
                    }

                    let local_eye = eye - offset;
                    for octant in 0..8u8 {
                        let signs = octant_signs(octant);
                        let half = signs * 0.5;

                        if !culler.contains_sphere(offset + half, OCTANT_RADIUS) {
                            stats.octants_culled += 1;
                            continue;
                        }

                        let lod = self.lod_for((local_eye - half).length_squared());
                        stats.octants_drawn += 1;
                        stats.per_lod[lod.index()] += 1;
                        out.push(OctantDraw {
                            cell,
                            octant,
                            lod,
                            model: mat4::translation_scale(offset, signs),
                            winding: Winding::for_negative_axes(octant.count_ones()),
                        });
                    }
                }
            }
        }

        stats
    }

    /// Plan and issue the draws
    ///
    /// `meshes` holds the full, medium and low detail meshes in that order.
    pub fn draw(
        &self,
        culler: &FrustumCuller,
        meshes: [&Mesh; 3],
        renderer: &mut dyn Renderer,
        scratch: &mut Vec<OctantDraw>,
    ) -> TileStats {
        let stats = self.plan(culler, scratch);
        for octant in scratch.iter() {
            let mesh = meshes[octant.lod.index()];
            if !mesh.is_empty() {
                renderer.draw(mesh, &octant.model, octant.winding);
            }
        }
        stats
    }
}

/// Per-axis mirror signs for an octant index
#[inline]
fn octant_signs(octant: u8) -> Vec3 {
    let sign = |bit: u8| if octant & (1 << bit) != 0 { -1.0 } else { 1.0 };
    Vec3::new(sign(0), sign(1), sign(2))
}
