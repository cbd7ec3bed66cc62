//! Generator frame-loop behaviour
//!
//! Runs the whole stack headless against a recording renderer.

use prism::config::{AppConfig, ModesConfig};
use prism::{Generator, GeneratorError, ModeController};
use prism_field::{GizmoLibrary, SceneMode, Vec3};
use prism_render::{RecordingRenderer, Winding};
use prism_surface::{Lod, PipelineError};

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.surface.resolutions = [16, 10, 6];
    config.kaleidoscope.draw_depth = 2;
    config.modes.seed = Some(7);
    config
}

fn read_bytes(generator: &Generator) -> Vec<Vec<u8>> {
    generator
        .pipeline()
        .read_meshes()
        .iter()
        .map(|m| m.as_bytes().to_vec())
        .collect()
}

#[test]
fn test_tick_zero_is_idempotent() {
    for threaded in [false, true] {
        let mut config = test_config();
        config.surface.threaded = threaded;
        let mut generator = Generator::new(&config).unwrap();
        let mut renderer = RecordingRenderer::default();

        // Grow the first gizmo in fully
        for _ in 0..6 {
            generator.tick(0.5, &mut renderer).unwrap();
        }
        assert_eq!(generator.controller().transition(), 1.0);

        generator.tick(0.0, &mut renderer).unwrap();
        let first = read_bytes(&generator);
        generator.tick(0.0, &mut renderer).unwrap();
        let second = read_bytes(&generator);

        assert!(!first[0].is_empty(), "gizmo produced no surface");
        assert_eq!(first, second, "threaded = {}", threaded);
    }
}

#[test]
fn test_single_mode_draws_full_mesh_unmirrored() {
    let mut generator = Generator::new(&test_config()).unwrap();
    let mut renderer = RecordingRenderer::default();
    for _ in 0..5 {
        renderer.clear();
        let stats = generator.tick(0.5, &mut renderer).unwrap();
        assert_eq!(stats.mode, SceneMode::Single);
        assert!(stats.tiles.is_none());
    }

    let draws = renderer.draws();
    assert_eq!(draws.len(), 1);
    assert_eq!(draws[0].mesh.slot, 0);
    assert_eq!(draws[0].winding, Winding::Ccw);
    assert_eq!(draws[0].model, prism_math::mat4::IDENTITY);
    assert!(renderer.camera().is_some());
}

#[test]
fn test_kaleidoscope_mode_tiles_mirrored_octants() {
    let mut config = test_config();
    config.modes.single = false;
    let mut generator = Generator::new(&config).unwrap();
    let mut renderer = RecordingRenderer::default().without_checksums();

    let mut stats = None;
    for _ in 0..6 {
        renderer.clear();
        stats = Some(generator.tick(0.5, &mut renderer).unwrap());
    }
    let stats = stats.unwrap();
    assert_eq!(stats.mode, SceneMode::Kaleidoscope);
    let tiles = stats.tiles.expect("kaleidoscope frames report tiling");
    assert_eq!(tiles.cells_visited, 5 * 5 * 5);
    assert!(tiles.octants_drawn > 0);

    let draws = renderer.draws();
    assert!(!draws.is_empty());
    assert!(draws.iter().any(|d| d.winding == Winding::Cw));
    assert!(draws.iter().any(|d| d.winding == Winding::Ccw));
    assert!(draws.iter().all(|d| d.mesh.slot < 3));
}

#[test]
fn test_mode_change_reprimes_pipeline() {
    let mut config = test_config();
    config.modes.single_duration = 0.5;
    config.modes.kaleidoscope_duration = 0.5;
    config.modes.transition_time = 0.2;
    let mut generator = Generator::new(&config).unwrap();
    let mut renderer = RecordingRenderer::default().without_checksums();

    let mut history = Vec::new();
    for _ in 0..40 {
        history.push(generator.tick(0.1, &mut renderer).unwrap());
    }

    assert!(history[0].primed && history[1].primed);
    assert!(!history[2].primed);

    let mut switches = 0;
    for i in 1..history.len() - 1 {
        if history[i].mode != history[i - 1].mode {
            switches += 1;
            assert!(history[i].primed, "frame {} switched mode without priming", i);
            assert!(history[i + 1].primed);
        }
    }
    assert!(switches >= 2);
    assert!(history.iter().any(|s| s.mode == SceneMode::Kaleidoscope));
}

#[test]
fn test_jump_request_changes_gizmo() {
    let mut generator = Generator::new(&test_config()).unwrap();
    let mut renderer = RecordingRenderer::default().without_checksums();
    generator.tick(0.5, &mut renderer).unwrap();

    let target = (generator.controller().active_gizmo() + 3) % generator.controller().library().len();
    assert!(generator.controller_mut().jump_to(target));
    let mut shown = false;
    for _ in 0..20 {
        generator.tick(0.25, &mut renderer).unwrap();
        if generator.controller().active_gizmo() == target {
            shown = true;
            break;
        }
    }
    assert!(shown);
}

#[test]
fn test_tick_after_shutdown_fails() {
    let mut generator = Generator::new(&test_config()).unwrap();
    let mut renderer = RecordingRenderer::default();
    generator.tick(0.1, &mut renderer).unwrap();
    generator.shutdown();
    assert!(matches!(
        generator.tick(0.1, &mut renderer),
        Err(GeneratorError::Pipeline(PipelineError::ShutDown))
    ));
}

#[test]
fn test_invalid_config_is_rejected_at_construction() {
    let mut config = test_config();
    config.surface.resolutions = [16, 0, 6];
    assert!(matches!(Generator::new(&config), Err(GeneratorError::Config(_))));
}

#[test]
fn test_single_only_pipeline_has_no_lower_lods() {
    let mut config = test_config();
    config.modes.kaleidoscope = false;
    let generator = Generator::new(&config).unwrap();
    assert!(!generator.pipeline().supports_kaleidoscope());
    assert!(generator.pipeline().slot(Lod::Medium).is_none());
}

/// Sweeping the transition upward never makes the field smaller once the
/// gate has stopped clipping it to zero
#[test]
fn test_transition_sweep_is_monotone_once_unclipped() {
    let modes = ModesConfig {
        kaleidoscope: false,
        single_duration: 100.0,
        transition_time: 1.0,
        gizmo_speed: 0.0,
        seed: Some(3),
        ..ModesConfig::default()
    };
    let mut controller = ModeController::new(GizmoLibrary::standard(), &modes);
    let eye = Vec3::new(0.0, 0.0, 3.0);
    let points = [
        Vec3::new(5.0, 0.0, 0.0),
        Vec3::new(5.0, 0.3, -0.2),
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(-0.6, 0.2, 0.1),
        Vec3::new(0.4, -0.3, 0.5),
    ];

    let mut last: Vec<Option<f32>> = vec![None; points.len()];
    let mut far_values = Vec::new();
    while controller.transition() < 1.0 {
        controller.update(0.01);
        let field = controller.field(eye);
        let t = field.params().transition;
        for (i, &p) in points.iter().enumerate() {
            let base = ((t - 0.5) * 1.5 + p.x) * 10.0;
            let clipped = t < 1.0 && base * base * base <= -50.0;
            let value = field.value(p);
            if clipped {
                assert_eq!(value, 0.0);
                continue;
            }
            if let Some(prev) = last[i] {
                assert!(value >= prev, "field fell at {:?}: {} -> {} (t = {})", p, prev, value, t);
            }
            last[i] = Some(value);
        }
        far_values.push(field.value(points[0]));
    }

    // Far ahead of the sweep the new gizmo is shown unchanged throughout
    let full = controller.field(eye).value(points[0]);
    assert!(far_values.iter().all(|&v| v == full));
    assert!(last.iter().all(Option::is_some));
}
