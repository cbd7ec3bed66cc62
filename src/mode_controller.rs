//! Gizmo rotation and mode switching
//!
//! Each phase shows one gizmo in one mode. The phase starts with the
//! transition ramping up from 0 to 1 (the gizmo grows in), holds at 1
//! until the mode's duration has elapsed, then ramps back down. When the
//! transition reaches 0 the mode flips (if both modes are enabled) and a
//! new gizmo is picked.

use bitflags::bitflags;
use prism_field::{
    fold_into_octant, FieldParameters, GizmoConfig, GizmoLibrary, ImplicitField, SceneMode, Vec3,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::ModesConfig;

bitflags! {
    /// Scene modes the controller may switch between
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct ModeFlags: u8 {
        const SINGLE = 1 << 0;
        const KALEIDOSCOPE = 1 << 1;
        const ALL = Self::SINGLE.bits() | Self::KALEIDOSCOPE.bits();
    }
}

impl ModeFlags {
    pub fn from_config(config: &ModesConfig) -> Self {
        let mut flags = ModeFlags::empty();
        flags.set(ModeFlags::SINGLE, config.single);
        flags.set(ModeFlags::KALEIDOSCOPE, config.kaleidoscope);
        flags
    }

    /// Whether `mode` may be shown
    pub fn allows(self, mode: SceneMode) -> bool {
        match mode {
            SceneMode::Single => self.contains(ModeFlags::SINGLE),
            SceneMode::Kaleidoscope => self.contains(ModeFlags::KALEIDOSCOPE),
        }
    }
}

/// Direction the transition is moving in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Ramp {
    Rising,
    Falling,
}

/// What changed during one update
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ModeUpdate {
    pub mode_changed: bool,
    pub gizmo_changed: bool,
}

/// Owns the gizmo library and decides what is shown
pub struct ModeController {
    library: GizmoLibrary,
    flags: ModeFlags,
    gizmo_config: GizmoConfig,
    single_duration: f32,
    kaleidoscope_duration: f32,
    transition_time: f32,
    easter_egg_warmup: f32,

    mode: SceneMode,
    active: usize,
    transition: f32,
    ramp: Ramp,
    phase_time: f32,
    total_time: f32,
    pending_jump: Option<usize>,
    rng: StdRng,
}

impl ModeController {
    /// Create a controller and pick the first gizmo
    ///
    /// The first mode is single if enabled, kaleidoscope otherwise.
    pub fn new(library: GizmoLibrary, config: &ModesConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let flags = ModeFlags::from_config(config);
        let mode = if flags.allows(SceneMode::Single) {
            SceneMode::Single
        } else {
            SceneMode::Kaleidoscope
        };

        let mut controller = Self {
            library,
            flags,
            gizmo_config: GizmoConfig {
                speed: config.gizmo_speed,
            },
            single_duration: config.single_duration,
            kaleidoscope_duration: config.kaleidoscope_duration,
            transition_time: config.transition_time,
            easter_egg_warmup: config.easter_egg_warmup,
            mode,
            active: 0,
            transition: 0.0,
            ramp: Ramp::Rising,
            phase_time: 0.0,
            total_time: 0.0,
            pending_jump: None,
            rng,
        };
        if let Some(first) = controller.pick_gizmo(None) {
            controller.active = first;
        }
        log::info!(
            "Starting with '{}' in {:?} mode",
            controller.active_name(),
            controller.mode
        );
        controller
    }

    #[inline]
    pub fn mode(&self) -> SceneMode {
        self.mode
    }

    #[inline]
    pub fn flags(&self) -> ModeFlags {
        self.flags
    }

    /// Crossfade progress in [0, 1]
    #[inline]
    pub fn transition(&self) -> f32 {
        self.transition
    }

    /// True while the current gizmo is shrinking out
    #[inline]
    pub fn is_fading_out(&self) -> bool {
        self.ramp == Ramp::Falling
    }

    /// Index of the active gizmo
    #[inline]
    pub fn active_gizmo(&self) -> usize {
        self.active
    }

    pub fn active_name(&self) -> &'static str {
        self.library.name(self.active).unwrap_or("none")
    }

    #[inline]
    pub fn library(&self) -> &GizmoLibrary {
        &self.library
    }

    #[inline]
    pub fn gizmo_config(&self) -> &GizmoConfig {
        &self.gizmo_config
    }

    /// Seconds since the controller was created
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.total_time
    }

    /// Seconds the current gizmo stays at full size in the current mode
    pub fn phase_duration(&self) -> f32 {
        match self.mode {
            SceneMode::Single => self.single_duration,
            SceneMode::Kaleidoscope => self.kaleidoscope_duration,
        }
    }

    /// Shrink out now and show gizmo `index` next
    ///
    /// Returns false for an index outside the library.
    pub fn jump_to(&mut self, index: usize) -> bool {
        if index >= self.library.len() {
            log::warn!("No gizmo {} (library has {})", index, self.library.len());
            return false;
        }
        log::info!("Jumping to '{}'", self.library.name(index).unwrap_or("?"));
        self.pending_jump = Some(index);
        self.ramp = Ramp::Falling;
        true
    }

    /// Shrink out now and move on to the next phase
    pub fn force_mode_switch(&mut self) {
        self.ramp = Ramp::Falling;
    }

    /// Advance timers and animate the active gizmo
    pub fn update(&mut self, dt: f32) -> ModeUpdate {
        let mut update = ModeUpdate::default();
        self.total_time += dt;
        self.phase_time += dt;

        let step = dt / self.transition_time;
        match self.ramp {
            Ramp::Rising => {
                self.transition = (self.transition + step).min(1.0);
                if self.phase_time >= self.phase_duration() {
                    self.ramp = Ramp::Falling;
                }
            }
            Ramp::Falling => {
                self.transition = (self.transition - step).max(0.0);
                if self.transition <= 0.0 {
                    update = self.next_phase();
                }
            }
        }

        self.library.update(self.active, dt, &self.gizmo_config);
        update
    }

    /// Parameters for this frame's field
    ///
    /// In kaleidoscope mode the eye is folded into the mirrored octant the
    /// surface is extracted in.
    pub fn field_parameters(&self, eye: Vec3) -> FieldParameters {
        let eye = match self.mode {
            SceneMode::Single => eye,
            SceneMode::Kaleidoscope => fold_into_octant(eye),
        };
        FieldParameters {
            mode: self.mode,
            transition: self.transition,
            eye,
        }
    }

    /// Freeze the active gizmo and this frame's parameters into a field
    pub fn field(&self, eye: Vec3) -> ImplicitField {
        ImplicitField::new(self.library.snapshot(self.active), self.field_parameters(eye))
    }

    fn next_phase(&mut self) -> ModeUpdate {
        let mut update = ModeUpdate::default();

        if self.flags.contains(ModeFlags::ALL) {
            self.mode = self.mode.toggled();
            update.mode_changed = true;
        }

        let next = match self.pending_jump.take() {
            Some(index) => Some(index),
            None => self.pick_gizmo(Some(self.active)),
        };
        if let Some(next) = next {
            if next != self.active {
                self.active = next;
                update.gizmo_changed = true;
            }
        }

        self.transition = 0.0;
        self.ramp = Ramp::Rising;
        self.phase_time = 0.0;

        log::info!("Showing '{}' in {:?} mode", self.active_name(), self.mode);
        update
    }

    /// Uniform pick excluding `exclude` and, during warm-up, the easter egg
    fn pick_gizmo(&mut self, exclude: Option<usize>) -> Option<usize> {
        let hidden_egg = if self.total_time < self.easter_egg_warmup {
            self.library.easter_egg()
        } else {
            None
        };
        let candidates: Vec<usize> = (0..self.library.len())
            .filter(|&i| Some(i) != exclude && Some(i) != hidden_egg)
            .collect();
        if candidates.is_empty() {
            return None;
        }
        Some(candidates[self.rng.gen_range(0..candidates.len())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modes(seed: u64) -> ModesConfig {
        ModesConfig {
            single_duration: 3.0,
            kaleidoscope_duration: 5.0,
            transition_time: 1.0,
            easter_egg_warmup: 1000.0,
            seed: Some(seed),
            ..ModesConfig::default()
        }
    }

    /// Run until the next phase starts
    fn run_phase(c: &mut ModeController, dt: f32) -> ModeUpdate {
        for _ in 0..10_000 {
            let u = c.update(dt);
            if u.mode_changed || u.gizmo_changed {
                return u;
            }
        }
        panic!("phase never ended");
    }

    #[test]
    fn test_mode_flags_from_config() {
        let mut config = ModesConfig::default();
        assert_eq!(ModeFlags::from_config(&config), ModeFlags::ALL);
        config.single = false;
        let flags = ModeFlags::from_config(&config);
        assert!(!flags.allows(SceneMode::Single));
        assert!(flags.allows(SceneMode::Kaleidoscope));
    }

    #[test]
    fn test_starts_in_single_mode_growing_in() {
        let c = ModeController::new(GizmoLibrary::standard(), &modes(1));
        assert_eq!(c.mode(), SceneMode::Single);
        assert_eq!(c.transition(), 0.0);
        assert!(!c.is_fading_out());
    }

    #[test]
    fn test_kaleidoscope_only_starts_in_kaleidoscope() {
        let config = ModesConfig {
            single: false,
            ..modes(1)
        };
        let c = ModeController::new(GizmoLibrary::standard(), &config);
        assert_eq!(c.mode(), SceneMode::Kaleidoscope);
    }

    #[test]
    fn test_transition_ramps_holds_and_falls() {
        let mut c = ModeController::new(GizmoLibrary::standard(), &modes(2));
        c.update(0.5);
        assert!((c.transition() - 0.5).abs() < 1e-6);
        c.update(0.75);
        assert_eq!(c.transition(), 1.0);
        // Hold until 3s into the phase
        c.update(1.5);
        assert_eq!(c.transition(), 1.0);
        assert!(!c.is_fading_out());
        c.update(0.5);
        assert!(c.is_fading_out());
        c.update(0.25);
        assert!((c.transition() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_phase_end_flips_mode_and_changes_gizmo() {
        let mut c = ModeController::new(GizmoLibrary::standard(), &modes(3));
        let first = c.active_gizmo();
        let u = run_phase(&mut c, 0.1);
        assert!(u.mode_changed);
        assert!(u.gizmo_changed);
        assert_eq!(c.mode(), SceneMode::Kaleidoscope);
        assert_ne!(c.active_gizmo(), first);
        assert_eq!(c.transition(), 0.0);

        let u = run_phase(&mut c, 0.1);
        assert!(u.mode_changed);
        assert_eq!(c.mode(), SceneMode::Single);
    }

    #[test]
    fn test_single_mode_only_never_flips() {
        let config = ModesConfig {
            kaleidoscope: false,
            ..modes(4)
        };
        let mut c = ModeController::new(GizmoLibrary::standard(), &config);
        for _ in 0..5 {
            let u = run_phase(&mut c, 0.1);
            assert!(!u.mode_changed);
            assert_eq!(c.mode(), SceneMode::Single);
        }
    }

    #[test]
    fn test_never_repeats_or_shows_easter_egg_during_warmup() {
        let mut c = ModeController::new(GizmoLibrary::standard(), &modes(5));
        let egg = c.library().easter_egg();
        assert!(egg.is_some());
        let mut last = c.active_gizmo();
        assert_ne!(Some(last), egg);
        for _ in 0..40 {
            run_phase(&mut c, 0.25);
            assert_ne!(c.active_gizmo(), last);
            assert_ne!(Some(c.active_gizmo()), egg);
            last = c.active_gizmo();
        }
    }

    #[test]
    fn test_easter_egg_appears_after_warmup() {
        let config = ModesConfig {
            easter_egg_warmup: 0.0,
            ..modes(6)
        };
        let mut c = ModeController::new(GizmoLibrary::standard(), &config);
        let egg = c.library().easter_egg();
        let seen = (0..200).any(|_| {
            run_phase(&mut c, 0.5);
            Some(c.active_gizmo()) == egg
        });
        assert!(seen);
    }

    #[test]
    fn test_jump_short_circuits_timer() {
        let mut c = ModeController::new(GizmoLibrary::standard(), &modes(7));
        c.update(1.0);
        let target = (c.active_gizmo() + 1) % c.library().len();
        assert!(c.jump_to(target));
        assert!(c.is_fading_out());
        // One transition time is enough to shrink out
        let u = c.update(1.0);
        assert!(u.gizmo_changed);
        assert_eq!(c.active_gizmo(), target);
    }

    #[test]
    fn test_jump_to_unknown_gizmo_is_refused() {
        let mut c = ModeController::new(GizmoLibrary::standard(), &modes(8));
        assert!(!c.jump_to(99));
        assert!(!c.is_fading_out());
    }

    #[test]
    fn test_force_mode_switch() {
        let mut c = ModeController::new(GizmoLibrary::standard(), &modes(9));
        c.update(1.0);
        c.force_mode_switch();
        let u = c.update(1.0);
        assert!(u.mode_changed);
        assert_eq!(c.mode(), SceneMode::Kaleidoscope);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let sequence = |seed| {
            let mut c = ModeController::new(GizmoLibrary::standard(), &modes(seed));
            (0..10)
                .map(|_| {
                    run_phase(&mut c, 0.2);
                    c.active_gizmo()
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(sequence(42), sequence(42));
    }

    #[test]
    fn test_field_parameters_fold_eye_in_kaleidoscope() {
        let mut c = ModeController::new(GizmoLibrary::standard(), &modes(10));
        let eye = Vec3::new(2.3, -0.4, 5.0);
        assert_eq!(c.field_parameters(eye).eye, eye);
        run_phase(&mut c, 0.1);
        let params = c.field_parameters(eye);
        assert_eq!(params.mode, SceneMode::Kaleidoscope);
        assert_eq!(params.eye, fold_into_octant(eye));
    }

    #[test]
    fn test_field_uses_active_gizmo() {
        let c = ModeController::new(GizmoLibrary::standard(), &modes(11));
        let field = c.field(Vec3::new(0.0, 0.0, 3.0));
        assert_eq!(field.gizmo_name(), c.active_name());
        assert_eq!(field.params().transition, c.transition());
    }
}
