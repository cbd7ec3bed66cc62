//! Prism - procedural implicit-surface generator
//!
//! The library wires the domain crates into a host-driven frame loop:
//! [`config::AppConfig`] is loaded once, [`generator::Generator::tick`] is
//! called every frame with a [`prism_render::Renderer`] to draw into.

pub mod config;
pub mod mode_controller;
pub mod generator;

pub use config::{AppConfig, ConfigError};
pub use mode_controller::{ModeController, ModeFlags, ModeUpdate};
pub use generator::{FrameStats, Generator, GeneratorError};
