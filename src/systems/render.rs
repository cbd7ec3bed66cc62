//! GPU rendering system
//!
//! Manages GPU rendering including:
//! - Render context and surface
//! - The mesh pipeline the generator draws into
//! - Frame submission

use std::sync::Arc;
use winit::window::Window;
use prism_math::{mat4, Mat4};
use prism_render::{
    context::RenderContext,
    pipeline::{FrameUniforms, MeshPipeline},
    CameraView, FrustumParams, RenderError, Renderer, Winding,
};
use prism_surface::Mesh;
use prism::config::{CameraConfig, RenderingConfig};

/// Manages GPU rendering
///
/// Draws issued by the generator are queued while its meshes are stable,
/// then replayed in a single pass by [`RenderSystem::render_frame`].
pub struct RenderSystem {
    context: RenderContext,
    mesh_pipeline: MeshPipeline,
    render_config: RenderingConfig,
    camera_config: CameraConfig,
    view: CameraView,
}

impl RenderSystem {
    /// Create render system from window and config
    pub fn new(
        window: Arc<Window>,
        render_config: RenderingConfig,
        camera_config: CameraConfig,
        vsync: bool,
    ) -> Result<Self, RenderError> {
        let context = pollster::block_on(RenderContext::new(window, vsync))?;

        let mut mesh_pipeline = MeshPipeline::new(&context.device, context.config.format);
        mesh_pipeline.ensure_depth_texture(
            &context.device,
            context.size.width,
            context.size.height,
        );

        Ok(Self {
            context,
            mesh_pipeline,
            render_config,
            camera_config,
            view: CameraView::default(),
        })
    }

    /// Handle window resize
    pub fn resize(&mut self, width: u32, height: u32) {
        self.context
            .resize(winit::dpi::PhysicalSize::new(width, height));
        self.mesh_pipeline.ensure_depth_texture(&self.context.device, width, height);
    }

    /// Drop the previous frame's queued draws
    pub fn begin_frame(&mut self) {
        self.mesh_pipeline.begin_frame();
    }

    /// Number of draws queued so far this frame
    pub fn queued_draws(&self) -> usize {
        self.mesh_pipeline.queued_draws()
    }

    /// Render the queued draws and present
    pub fn render_frame(&mut self) -> Result<(), RenderError> {
        let params = self.frustum_params();
        let uniforms = FrameUniforms {
            view_matrix: self.view.view_matrix(),
            projection_matrix: mat4::perspective(params.fov_y, params.aspect, params.near, params.far),
            light_dir: self.render_config.light_dir,
            ambient_strength: self.render_config.ambient_strength,
            base_color: self.render_config.base_color,
            diffuse_strength: self.render_config.diffuse_strength,
        };
        self.mesh_pipeline
            .update_uniforms(&self.context.queue, &uniforms);

        // Get surface texture
        let output = match self.context.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.context.reconfigure();
                return Err(RenderError::SurfaceLost);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(RenderError::OutOfMemory),
            Err(e) => return Err(RenderError::Other(format!("{:?}", e))),
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let bg = &self.render_config.background_color;
        self.mesh_pipeline.render(
            &self.context.device,
            &self.context.queue,
            &mut encoder,
            &view,
            wgpu::Color {
                r: bg[0] as f64,
                g: bg[1] as f64,
                b: bg[2] as f64,
                a: bg[3] as f64,
            },
        );

        self.context.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

impl Renderer for RenderSystem {
    fn frustum_params(&self) -> FrustumParams {
        FrustumParams {
            fov_y: self.camera_config.fov.to_radians(),
            aspect: self.context.aspect_ratio(),
            near: self.camera_config.near,
            far: self.camera_config.far,
        }
    }

    fn set_camera(&mut self, view: &CameraView) {
        self.view = *view;
    }

    fn draw(&mut self, mesh: &Mesh, model: &Mat4, winding: Winding) {
        self.mesh_pipeline.queue_draw(
            &self.context.device,
            &self.context.queue,
            mesh,
            model,
            winding,
        );
    }
}
