//! Scalar-field composition for the Prism generator
//!
//! This crate provides everything that decides *what* surface is extracted:
//!
//! - [`Primitive`] - An implicit shape contributing additively to the field
//! - [`Gizmo`] - A named, self-animating collection of primitives
//! - [`GizmoLibrary`] - The fixed catalog of gizmos built at startup
//! - [`ImplicitField`] - One frame's frozen field: gizmo snapshot + [`FieldParameters`]
//! - [`ScalarField`] - Anything that can be sampled at a 3D point

mod primitive;
mod gizmo;
mod gizmos;
mod library;
mod field;

pub use primitive::Primitive;
pub use gizmo::{Gizmo, GizmoConfig, GizmoSnapshot};
pub use library::GizmoLibrary;
pub use field::{
    fold_into_octant, FieldParameters, ImplicitField, ScalarField, SceneMode,
    ISO_LEVEL, TRANSITION_CLIP,
};

// Re-export commonly used math types for convenience
pub use prism_math::{Mat3, Vec3};
