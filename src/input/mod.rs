//! Keyboard controls
//!
//! Keys steer the generator; nothing else reads raw input.

mod input_mapper;

pub use input_mapper::{InputAction, InputMapper};
