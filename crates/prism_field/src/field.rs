//! The composed scalar field
//!
//! An [`ImplicitField`] is built by the main thread once per frame from a
//! gizmo snapshot and the frame's [`FieldParameters`], then shared read-only
//! with the surface workers. Evaluation is a pure function of that data.

use prism_math::Vec3;

use crate::GizmoSnapshot;

/// Field value at which the surface is extracted
pub const ISO_LEVEL: f32 = 1.0;

/// Gate values at or below this force the whole field to zero
pub const TRANSITION_CLIP: f32 = -50.0;

/// Eye-hole distances are clamped to at least this (squared)
const MIN_EYE_DISTANCE_SQUARED: f32 = 1e-4;

/// Which of the two scene layouts is being rendered
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SceneMode {
    /// One gizmo centred at the origin
    #[default]
    Single,
    /// A mirrored unit cell tiled across the visible lattice
    Kaleidoscope,
}

impl SceneMode {
    /// Minimum corner of the volume polygonised in this mode
    pub fn volume_origin(self) -> Vec3 {
        match self {
            SceneMode::Single => Vec3::splat(-1.0),
            SceneMode::Kaleidoscope => Vec3::ZERO,
        }
    }

    /// Edge length of the (cubic) volume polygonised in this mode
    pub fn volume_extent(self) -> f32 {
        match self {
            SceneMode::Single => 2.0,
            SceneMode::Kaleidoscope => 1.0,
        }
    }

    /// The other mode
    pub fn toggled(self) -> Self {
        match self {
            SceneMode::Single => SceneMode::Kaleidoscope,
            SceneMode::Kaleidoscope => SceneMode::Single,
        }
    }
}

/// Per-frame parameters, frozen for the duration of one compute phase
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldParameters {
    pub mode: SceneMode,
    /// Crossfade progress in [0, 1]; 1 means fully shown
    pub transition: f32,
    /// Eye position in field space (already folded in kaleidoscope mode)
    pub eye: Vec3,
}

impl Default for FieldParameters {
    fn default() -> Self {
        Self {
            mode: SceneMode::Single,
            transition: 1.0,
            eye: Vec3::new(0.0, 0.0, 3.0),
        }
    }
}

/// Anything that can be sampled at a 3D point
pub trait ScalarField: Send + Sync {
    fn value(&self, p: Vec3) -> f32;
}

impl<F> ScalarField for F
where
    F: Fn(Vec3) -> f32 + Send + Sync,
{
    fn value(&self, p: Vec3) -> f32 {
        self(p)
    }
}

/// One frame's field: a frozen gizmo pose plus the frame parameters
#[derive(Clone, Debug)]
pub struct ImplicitField {
    gizmo: GizmoSnapshot,
    params: FieldParameters,
}

impl ImplicitField {
    pub fn new(gizmo: GizmoSnapshot, params: FieldParameters) -> Self {
        Self { gizmo, params }
    }

    /// The frame parameters this field was built with
    #[inline]
    pub fn params(&self) -> &FieldParameters {
        &self.params
    }

    /// Crawl seeds supplied by the active gizmo
    #[inline]
    pub fn seeds(&self) -> &[Vec3] {
        &self.gizmo.seeds
    }

    /// Name of the gizmo this field was built from
    #[inline]
    pub fn gizmo_name(&self) -> &'static str {
        self.gizmo.name
    }

    /// Evaluate the composed field at `p`
    pub fn value(&self, p: Vec3) -> f32 {
        let mut value = self.gizmo.value(p);

        if self.params.mode == SceneMode::Kaleidoscope {
            value -= eye_hole(p, self.params.eye);
        }

        if self.params.transition < 1.0 {
            match transition_gate(self.params.transition, p.x) {
                Some(gate) => value += gate,
                None => return 0.0,
            }
        }

        value
    }
}

impl ScalarField for ImplicitField {
    fn value(&self, p: Vec3) -> f32 {
        ImplicitField::value(self, p)
    }
}

/// Saturating term carving the surface away around the eye
#[inline]
pub(crate) fn eye_hole(p: Vec3, eye: Vec3) -> f32 {
    let d2 = (p - eye).length_squared().max(MIN_EYE_DISTANCE_SQUARED);
    let h = (1.0 / d2 - 1.0).max(0.0);
    h * h
}

/// Cubic gate sweeping along x as the transition progresses
///
/// Returns `None` where the field must be clipped to zero.
#[inline]
pub(crate) fn transition_gate(transition: f32, x: f32) -> Option<f32> {
    let base = ((transition - 0.5) * 1.5 + x) * 10.0;
    let trans = base * base * base;
    if trans <= TRANSITION_CLIP {
        None
    } else {
        Some(trans.min(0.0))
    }
}

/// Fold a world position into the positive octant of its mirrored cell
///
/// Cells are 2 units wide and centred on even coordinates; each cell is
/// mirrored about its centre, so the fold is `|p - 2 * round(p / 2)|`.
pub fn fold_into_octant(p: Vec3) -> Vec3 {
    (p - (p * 0.5).round() * 2.0).abs()
}
