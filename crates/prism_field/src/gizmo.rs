//! Gizmo abstraction
//!
//! A gizmo owns its primitives and its own animation clock. The main thread
//! calls [`Gizmo::update`] once per frame and then freezes the result into a
//! [`GizmoSnapshot`] that background workers can read without locking.

use prism_math::Vec3;

use crate::Primitive;

/// Animation settings handed down to every gizmo on update
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GizmoConfig {
    /// Multiplier applied to the frame time before animating
    pub speed: f32,
}

impl Default for GizmoConfig {
    fn default() -> Self {
        Self { speed: 1.0 }
    }
}

/// A named, self-animating collection of implicit primitives
pub trait Gizmo: Send {
    /// Stable display name
    fn name(&self) -> &'static str;

    /// Advance the animation by `dt` seconds
    fn update(&mut self, dt: f32, config: &GizmoConfig);

    /// Current primitive poses
    fn primitives(&self) -> &[Primitive];

    /// Sum of every primitive's contribution at `p`
    fn value(&self, p: Vec3) -> f32 {
        self.primitives().iter().map(|prim| prim.value(p)).sum()
    }

    /// Append one crawl seed per primitive
    fn collect_seed_points(&self, out: &mut Vec<Vec3>) {
        out.extend(self.primitives().iter().map(Primitive::seed_point));
    }

    /// Freeze the current pose
    fn snapshot(&self) -> GizmoSnapshot {
        let mut seeds = Vec::with_capacity(self.primitives().len());
        self.collect_seed_points(&mut seeds);
        GizmoSnapshot {
            name: self.name(),
            primitives: self.primitives().to_vec(),
            seeds,
        }
    }
}

/// Immutable copy of a gizmo's pose for one frame
#[derive(Clone, Debug, PartialEq)]
pub struct GizmoSnapshot {
    pub name: &'static str,
    pub primitives: Vec<Primitive>,
    pub seeds: Vec<Vec3>,
}

impl GizmoSnapshot {
    /// A snapshot with no primitives (evaluates to zero everywhere)
    pub fn empty() -> Self {
        Self {
            name: "empty",
            primitives: Vec::new(),
            seeds: Vec::new(),
        }
    }

    /// Sum of every primitive's contribution at `p`
    #[inline]
    pub fn value(&self, p: Vec3) -> f32 {
        self.primitives.iter().map(|prim| prim.value(p)).sum()
    }
}
