//! Kaleidoscope tiling and frustum properties

use std::collections::HashSet;

use prism_math::{mat4, Vec3};
use prism_render::{
    CameraView, FrustumCuller, FrustumParams, KaleidoscopeTiler, OctantDraw, RecordingRenderer,
    Winding,
};
use prism_surface::{Lod, Mesh, MeshId, MeshVertex};

fn culler(view: CameraView) -> FrustumCuller {
    let mut c = FrustumCuller::new(FrustumParams {
        fov_y: 70f32.to_radians(),
        aspect: 16.0 / 9.0,
        near: 0.01,
        far: 30.0,
    });
    c.set_camera(view);
    c
}

fn cameras() -> Vec<CameraView> {
    vec![
        CameraView::look_at(Vec3::ZERO, -Vec3::Z, Vec3::Y),
        CameraView::look_at(Vec3::new(0.5, 0.5, 0.5), Vec3::new(3.0, 1.0, -2.0), Vec3::Y),
        CameraView::look_at(Vec3::new(7.3, -2.1, 11.9), Vec3::new(0.0, 0.0, 0.0), Vec3::Y),
        CameraView::look_at(Vec3::new(-3.0, 4.0, 1.0), Vec3::new(-3.5, -4.0, 1.2), Vec3::Z),
    ]
}

fn plan(tiler: &KaleidoscopeTiler, view: CameraView) -> Vec<OctantDraw> {
    let mut out = Vec::new();
    tiler.plan(&culler(view), &mut out);
    out
}

fn marker_mesh(slot: u8) -> Mesh {
    let mut mesh = Mesh::new(MeshId { slot, buffer: 0 });
    mesh.begin();
    let v = MeshVertex::new([0.5, 0.5, 0.5], [0.0, 0.0, 1.0]);
    mesh.push_triangle([v; 3]);
    mesh.finish();
    mesh
}

#[test]
fn test_depth_zero_draws_eight_octants_of_camera_cell() {
    // Eyes at cell centres, so every octant touches the camera
    let views = [
        CameraView::look_at(Vec3::ZERO, -Vec3::Z, Vec3::Y),
        CameraView::look_at(Vec3::new(4.0, -2.0, 6.0), Vec3::new(5.0, -2.0, 6.0), Vec3::Y),
    ];
    let tiler = KaleidoscopeTiler::new(0);
    for view in views {
        let draws = plan(&tiler, view);
        let cell = KaleidoscopeTiler::camera_cell(view.eye);
        assert_eq!(draws.len(), 8, "camera at {:?}", view.eye);
        for d in &draws {
            assert_eq!(d.cell, cell);
        }
        let octants: HashSet<u8> = draws.iter().map(|d| d.octant).collect();
        assert_eq!(octants.len(), 8);
    }
}

#[test]
fn test_depth_zero_only_draws_camera_cell() {
    let tiler = KaleidoscopeTiler::new(0);
    for view in cameras() {
        let draws = plan(&tiler, view);
        let cell = KaleidoscopeTiler::camera_cell(view.eye);
        assert!(!draws.is_empty() && draws.len() <= 8);
        assert!(draws.iter().all(|d| d.cell == cell));
    }
}

#[test]
fn test_no_cell_octant_pair_drawn_twice() {
    let tiler = KaleidoscopeTiler::new(4);
    for view in cameras() {
        let draws = plan(&tiler, view);
        let mut seen = HashSet::new();
        for d in &draws {
            assert!(seen.insert((d.cell, d.octant)), "duplicate {:?}/{}", d.cell, d.octant);
        }
    }
}

#[test]
fn test_cells_stay_within_draw_depth() {
    let depth = 3;
    let tiler = KaleidoscopeTiler::new(depth);
    for view in cameras() {
        let origin = KaleidoscopeTiler::camera_cell(view.eye);
        for d in plan(&tiler, view) {
            for axis in 0..3 {
                assert!((d.cell[axis] - origin[axis]).abs() <= depth as i32);
            }
        }
    }
}

#[test]
fn test_winding_matches_mirror_parity() {
    let tiler = KaleidoscopeTiler::new(2);
    for d in plan(&tiler, cameras()[1]) {
        let det = d.model[0][0] * d.model[1][1] * d.model[2][2];
        let expected = if det < 0.0 { Winding::Cw } else { Winding::Ccw };
        assert_eq!(d.winding, expected);
    }
}

#[test]
fn test_octant_models_tile_the_cell() {
    let tiler = KaleidoscopeTiler::new(0);
    let draws = plan(&tiler, cameras()[0]);
    // The unit volume's far corner lands on every corner of the 2-unit cell
    let corners: HashSet<[i32; 3]> = draws
        .iter()
        .map(|d| {
            let p = mat4::transform_point(&d.model, Vec3::ONE);
            [p.x.round() as i32, p.y.round() as i32, p.z.round() as i32]
        })
        .collect();
    assert_eq!(corners.len(), 8);
    for c in corners {
        assert!(c.iter().all(|v| v.abs() == 1));
    }
}

#[test]
fn test_lod_falls_off_with_distance() {
    let tiler = KaleidoscopeTiler::new(5);
    let view = cameras()[0];
    let draws = plan(&tiler, view);

    let mut lods = HashSet::new();
    for d in &draws {
        let center = Vec3::new(d.cell[0] as f32, d.cell[1] as f32, d.cell[2] as f32) * 2.0;
        let octant_center = mat4::transform_point(&d.model, Vec3::splat(0.5));
        let dist2 = (view.eye - octant_center).length_squared();
        assert_eq!(tiler.lod_for(dist2), d.lod, "cell {:?}", d.cell);
        assert!((octant_center - center).length() < 1.0);
        lods.insert(d.lod);
    }
    assert_eq!(lods.len(), 3, "expected all three detail levels at depth 5");
}

#[test]
fn test_looking_away_culls_cells() {
    let tiler = KaleidoscopeTiler::new(3);
    let mut out = Vec::new();
    let stats = tiler.plan(&culler(cameras()[0]), &mut out);
    assert_eq!(stats.cells_visited, 7 * 7 * 7);
    assert!(stats.cells_culled > 0);
    assert!(stats.octants_culled > 0);
    assert_eq!(stats.octants_drawn as usize, out.len());
    assert_eq!(stats.per_lod.iter().sum::<u32>(), stats.octants_drawn);
}

#[test]
fn test_draw_uses_lod_meshes() {
    let tiler = KaleidoscopeTiler::new(4);
    let meshes = [marker_mesh(0), marker_mesh(1), marker_mesh(2)];
    let mut renderer = RecordingRenderer::default();
    let mut scratch = Vec::new();
    let c = culler(cameras()[0]);

    let stats = tiler.draw(&c, [&meshes[0], &meshes[1], &meshes[2]], &mut renderer, &mut scratch);

    assert_eq!(renderer.draws().len() as u32, stats.octants_drawn);
    for (call, planned) in renderer.draws().iter().zip(&scratch) {
        assert_eq!(call.mesh.slot as usize, planned.lod.index());
        assert_eq!(call.model, planned.model);
        assert_eq!(call.winding, planned.winding);
    }
    let full = renderer.draws().iter().filter(|c| c.mesh.slot == 0).count() as u32;
    assert_eq!(full, stats.per_lod[Lod::Full.index()]);
}

#[test]
fn test_empty_meshes_are_not_drawn() {
    let tiler = KaleidoscopeTiler::new(1);
    let empty = Mesh::new(MeshId { slot: 0, buffer: 0 });
    let mut renderer = RecordingRenderer::default();
    let mut scratch = Vec::new();
    let stats = tiler.draw(&culler(cameras()[0]), [&empty, &empty, &empty], &mut renderer, &mut scratch);
    assert!(stats.octants_drawn > 0);
    assert!(renderer.draws().is_empty());
}

#[test]
fn test_camera_always_inside_frustum() {
    for view in cameras() {
        assert!(culler(view).contains_sphere(view.eye, 0.0));
    }
}

#[test]
fn test_beyond_far_is_culled() {
    for view in cameras() {
        let c = culler(view);
        for r in [0.0, 0.5, 3.0] {
            let center = view.eye + view.forward * (30.0 + r + 0.01);
            assert!(!c.contains_sphere(center, r));
        }
    }
}
