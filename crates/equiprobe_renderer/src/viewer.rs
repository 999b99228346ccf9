use equiprobe_core::{PreviewMode, RendererConfig, ViewState};
use glam::{UVec2, Vec2};
use wgpu::util::DeviceExt;

use crate::{
    context::GpuContext,
    error::RenderError,
    host::SurfaceTarget,
    programs::{GpuProgram, GpuProgramRenderContext, PreviewProgram, PreviewUniform},
};

/// Textures the preview reads. Borrowed for one frame.
pub struct PreviewSources<'a> {
    pub target: &'a wgpu::TextureView,
    pub target_size: UVec2,
    pub probe: &'a wgpu::TextureView,
}

/// Shows the baked target (or the raw probe) on the host surface.
///
/// Read-only with respect to the target: pointer moves and resizes only
/// change what is displayed.
pub struct InteractiveViewer {
    program: PreviewProgram,
    uniform_buffer: wgpu::Buffer,
    view: ViewState,
    mode: PreviewMode,
    viewport: UVec2,
    exposure: f32,
    clear_color: wgpu::Color,
}

impl InteractiveViewer {
    pub fn new(
        ctx: &GpuContext,
        surface: &SurfaceTarget,
        config: &RendererConfig,
    ) -> Result<Self, RenderError> {
        let program = Self::create_program(ctx, surface.format)?;
        let view = ViewState::new(config.preview_zoom, config.preview_fov);
        let uniform = PreviewUniform::new(
            &view,
            config.preview_mode,
            surface.size(),
            config.target_size,
            config.preview_exposure,
            !surface.format.is_srgb(),
        );
        let uniform_buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Preview Uniform Buffer"),
                contents: bytemuck::bytes_of(&uniform),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let [r, g, b, a] = config.clear_color;

        Ok(Self {
            program,
            uniform_buffer,
            view,
            mode: config.preview_mode,
            viewport: surface.size(),
            exposure: config.preview_exposure,
            clear_color: wgpu::Color { r, g, b, a },
        })
    }

    fn create_program(
        ctx: &GpuContext,
        format: wgpu::TextureFormat,
    ) -> Result<PreviewProgram, RenderError> {
        log::info!("Creating preview pipeline for {format:?}");
        ctx.validated("preview pipeline", |device| {
            PreviewProgram::new(
                &GpuProgramRenderContext {
                    device,
                    queue: &ctx.queue,
                    format,
                },
                &(),
            )
        })
    }

    pub fn on_pointer_move(&mut self, coord: Vec2) {
        self.view.on_pointer_move(coord, self.viewport.as_vec2());
        log::trace!(
            "Pointer at {coord}, yaw {:.3} pitch {:.3}",
            self.view.yaw(),
            self.view.pitch()
        );
    }

    /// New surface size (and possibly format). The target is not touched.
    /// A rejected pipeline for a new format keeps the old one.
    pub fn resize(&mut self, ctx: &GpuContext, surface: &SurfaceTarget) -> Result<(), RenderError> {
        if surface.format != self.program.format() {
            self.program = Self::create_program(ctx, surface.format)?;
        }
        self.viewport = surface.size();
        log::debug!("Preview viewport is now {}x{}", surface.width, surface.height);
        Ok(())
    }

    pub fn set_mode(&mut self, mode: PreviewMode) {
        if mode != self.mode {
            log::info!("Preview mode: {mode}");
        }
        self.mode = mode;
    }

    pub fn mode(&self) -> PreviewMode {
        self.mode
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    /// The parameters the next frame will be drawn with.
    pub fn uniform(&self, target_size: UVec2) -> PreviewUniform {
        PreviewUniform::new(
            &self.view,
            self.mode,
            self.viewport,
            target_size,
            self.exposure,
            !self.program.format().is_srgb(),
        )
    }

    /// Renders one preview frame into `output`.
    pub fn draw(&self, ctx: &GpuContext, output: &wgpu::TextureView, sources: PreviewSources<'_>) {
        let uniform = self.uniform(sources.target_size);
        ctx.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniform));

        let bind_group = self.program.create_bind_group(
            &ctx.device,
            &self.uniform_buffer,
            sources.target,
            sources.probe,
        );

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Preview Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Preview Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: output,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                ..Default::default()
            });
            self.program.record(&mut render_pass, &bind_group);
        }
        ctx.queue.submit(std::iter::once(encoder.finish()));
    }
}
