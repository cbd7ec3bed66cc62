//! Prism - procedural implicit-surface generator
//!
//! Opens a window and lets the generator run: gizmos grow in, animate,
//! shrink out, and alternate between single and kaleidoscope modes.

mod input;
mod systems;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::WindowId,
};

use prism::{AppConfig, Generator};
use prism_render::RenderError;

use input::{InputAction, InputMapper};
use systems::{RenderSystem, SimulationSystem, WindowSystem};

/// Main application state
struct App {
    /// Application configuration
    config: AppConfig,
    generator: Generator,
    window_system: Option<WindowSystem>,
    render_system: Option<RenderSystem>,
    simulation: SimulationSystem,
}

impl App {
    fn new(config: AppConfig, generator: Generator) -> Self {
        Self {
            config,
            generator,
            window_system: None,
            render_system: None,
            simulation: SimulationSystem::new(),
        }
    }

    fn handle_action(&mut self, event_loop: &ActiveEventLoop, action: InputAction) {
        match action {
            InputAction::Exit => event_loop.exit(),
            InputAction::ToggleFullscreen => {
                if let Some(window) = &self.window_system {
                    window.toggle_fullscreen();
                }
            }
            InputAction::JumpToGizmo(index) => {
                self.generator.controller_mut().jump_to(index);
            }
            InputAction::SwitchMode => {
                log::info!("Switching mode");
                self.generator.controller_mut().force_mode_switch();
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(render) = self.render_system.as_mut() else {
            return;
        };

        render.begin_frame();
        let stats = match self.simulation.update(&mut self.generator, render) {
            Ok(stats) => stats,
            Err(e) => {
                log::error!("Generator failed: {}", e);
                event_loop.exit();
                return;
            }
        };
        log::trace!("{} draws queued", render.queued_draws());

        match render.render_frame() {
            Ok(()) => {}
            Err(RenderError::SurfaceLost) => log::debug!("Surface lost, reconfigured"),
            Err(RenderError::OutOfMemory) => {
                log::error!("GPU out of memory");
                event_loop.exit();
                return;
            }
            Err(e) => log::warn!("{}", e),
        }

        if let Some(window) = &self.window_system {
            window.update_title(stats.gizmo, stats.mode, self.simulation.fps());
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window_system.is_some() {
            return;
        }

        let window_system = match WindowSystem::create(event_loop, &self.config.window) {
            Ok(w) => w,
            Err(e) => {
                log::error!("{}", e);
                event_loop.exit();
                return;
            }
        };

        let render_system = match RenderSystem::new(
            window_system.window().clone(),
            self.config.rendering.clone(),
            self.config.camera.clone(),
            self.config.window.vsync,
        ) {
            Ok(r) => r,
            Err(e) => {
                log::error!("Failed to initialise rendering: {}", e);
                event_loop.exit();
                return;
            }
        };

        window_system.request_redraw();
        self.window_system = Some(window_system);
        self.render_system = Some(render_system);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                if let Some(render) = &mut self.render_system {
                    render.resize(physical_size.width, physical_size.height);
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    if let Some(action) = InputMapper::map_keyboard(key, event.state) {
                        self.handle_action(event_loop, action);
                    }
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // Workers are joined before the window and GPU state go away
        self.generator.shutdown();
    }
}

fn main() {
    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("{}. Using defaults.", e);
        AppConfig::default()
    });

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.debug.log_level.as_str()),
    )
    .init();
    log::info!("Starting Prism");

    let generator = match Generator::new(&config) {
        Ok(g) => g,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            log::error!("Failed to create event loop: {}", e);
            std::process::exit(1);
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, generator);
    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {}", e);
    }
}
