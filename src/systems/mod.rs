//! Application systems
//!
//! Window, GPU and frame-clock plumbing around the generator.

mod render;
mod simulation;
mod window;

pub use render::RenderSystem;
pub use simulation::SimulationSystem;
pub use window::WindowSystem;
