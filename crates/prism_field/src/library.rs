//! Gizmo catalog
//!
//! All gizmos are constructed once at startup and live until shutdown.
//! Selection is by index; exactly one is active at a time, but the library
//! keeps ownership of all of them.

use crate::gizmos::{Bloom, Gyroscope, Helix, Jacks, Links, Orbiters, Pendulum, Smiley};
use crate::{Gizmo, GizmoConfig, GizmoSnapshot};

/// The fixed set of gizmos available to the mode controller
pub struct GizmoLibrary {
    gizmos: Vec<Box<dyn Gizmo>>,
    easter_egg: Option<usize>,
}

impl GizmoLibrary {
    /// Build a library from an explicit list
    ///
    /// `easter_egg` names the reserved gizmo that stays hidden until the
    /// warm-up timer elapses.
    pub fn new(gizmos: Vec<Box<dyn Gizmo>>, easter_egg: Option<usize>) -> Self {
        let easter_egg = easter_egg.filter(|&i| {
            let valid = i < gizmos.len();
            if !valid {
                log::warn!("Easter egg index {} out of range, ignoring", i);
            }
            valid
        });
        log::debug!("Gizmo library with {} gizmos", gizmos.len());
        Self { gizmos, easter_egg }
    }

    /// The built-in catalog, with the smiley reserved as the easter egg
    pub fn standard() -> Self {
        let gizmos: Vec<Box<dyn Gizmo>> = vec![
            Box::new(Orbiters::new()),
            Box::new(Gyroscope::new()),
            Box::new(Jacks::new()),
            Box::new(Bloom::new()),
            Box::new(Links::new()),
            Box::new(Pendulum::new()),
            Box::new(Helix::new()),
            Box::new(Smiley::new()),
        ];
        let easter_egg = Some(gizmos.len() - 1);
        Self::new(gizmos, easter_egg)
    }

    /// Number of gizmos
    #[inline]
    pub fn len(&self) -> usize {
        self.gizmos.len()
    }

    /// Check if the library is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.gizmos.is_empty()
    }

    /// Index of the reserved easter-egg gizmo
    #[inline]
    pub fn easter_egg(&self) -> Option<usize> {
        self.easter_egg
    }

    /// Get a gizmo by index
    pub fn get(&self, index: usize) -> Option<&dyn Gizmo> {
        self.gizmos.get(index).map(|g| g.as_ref())
    }

    /// Display name of a gizmo
    pub fn name(&self, index: usize) -> Option<&'static str> {
        self.gizmos.get(index).map(|g| g.name())
    }

    /// Find a gizmo by name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.gizmos.iter().position(|g| g.name() == name)
    }

    /// Advance one gizmo's animation
    pub fn update(&mut self, index: usize, dt: f32, config: &GizmoConfig) {
        if let Some(g) = self.gizmos.get_mut(index) {
            g.update(dt, config);
        }
    }

    /// Freeze one gizmo's pose (empty snapshot for an unknown index)
    pub fn snapshot(&self, index: usize) -> GizmoSnapshot {
        self.gizmos
            .get(index)
            .map(|g| g.snapshot())
            .unwrap_or_else(GizmoSnapshot::empty)
    }

    /// Iterate over all gizmo names in index order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.gizmos.iter().map(|g| g.name())
    }
}
