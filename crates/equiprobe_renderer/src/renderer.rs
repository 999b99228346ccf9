use std::path::Path;

use equiprobe_core::{HdrImage, PreviewMode, ProbeMapping, RendererConfig};
use glam::{UVec2, Vec2};

use crate::{
    compositor::{BakePath, OffscreenCompositor},
    context::GpuContext,
    error::RenderError,
    exporter::{ExportFormat, HdrExporter},
    host::{HostView, SurfaceTarget},
    texture::ProbeTexture,
    viewer::{InteractiveViewer, PreviewSources},
};

/// Single entry point for hosts: owns the compositor and the viewer and
/// sequences bake, preview and export on one GPU context.
///
/// Bakes are lazy. Supplying a probe or changing the mapping marks the target
/// dirty and the next [`draw`](Self::draw) (or [`bake_now`](Self::bake_now))
/// rebakes it. Pointer moves, mode switches and resizes never do.
pub struct ProbeRenderer {
    gpu: GpuContext,
    config: RendererConfig,
    compositor: OffscreenCompositor,
    viewer: InteractiveViewer,
    probe: Option<ProbeTexture>,
    placeholder: ProbeTexture,
    dirty: bool,
}

impl ProbeRenderer {
    pub fn new(
        gpu: GpuContext,
        host: &impl HostView,
        config: RendererConfig,
    ) -> Result<Self, RenderError> {
        let problems = config.problems();
        if !problems.is_empty() {
            return Err(RenderError::InvalidConfig(problems.join("; ")));
        }

        let surface = host.surface_target();
        let compositor = OffscreenCompositor::new(&gpu, config.target_size)?;
        let viewer = InteractiveViewer::new(&gpu, &surface, &config)?;
        let placeholder = ProbeTexture::placeholder(&gpu.device, &gpu.queue)?;

        log::info!(
            "Renderer ready: {}x{} target, {}x{} surface",
            config.target_size.x,
            config.target_size.y,
            surface.width,
            surface.height
        );

        Ok(Self {
            gpu,
            config,
            compositor,
            viewer,
            probe: None,
            placeholder,
            dirty: false,
        })
    }

    pub fn gpu(&self) -> &GpuContext {
        &self.gpu
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Follows the host surface. The bake resolution stays as configured.
    pub fn resize(&mut self, surface: SurfaceTarget) -> Result<(), RenderError> {
        self.viewer.resize(&self.gpu, &surface)
    }

    pub fn set_probe(&mut self, probe: ProbeTexture) {
        self.config.mapping = probe.mapping();
        self.probe = Some(probe);
        self.dirty = true;
    }

    /// Uploads `image` and uses it as the probe, tagged with the configured
    /// mapping.
    pub fn set_probe_image(&mut self, image: &HdrImage) -> Result<(), RenderError> {
        let probe = ProbeTexture::from_image(
            &self.gpu.device,
            &self.gpu.queue,
            image,
            self.config.mapping,
            Some("Light Probe"),
        )?;
        self.set_probe(probe);
        Ok(())
    }

    /// Retags the probe. An invalid mapping is reported by the next bake.
    pub fn set_mapping(&mut self, mapping: ProbeMapping) {
        self.config.mapping = mapping;
        if let Some(probe) = self.probe.as_mut() {
            probe.set_mapping(mapping);
        }
        self.dirty = true;
    }

    pub fn probe(&self) -> Option<&ProbeTexture> {
        self.probe.as_ref()
    }

    pub fn on_pointer_move(&mut self, coord: Vec2) {
        self.viewer.on_pointer_move(coord);
    }

    pub fn set_preview_mode(&mut self, mode: PreviewMode) {
        self.viewer.set_mode(mode);
    }

    pub fn preview_mode(&self) -> PreviewMode {
        self.viewer.mode()
    }

    pub fn viewer(&self) -> &InteractiveViewer {
        &self.viewer
    }

    /// Bakes now, whether or not anything changed. Clears the dirty flag even
    /// on failure; a failed bake keeps the previous target.
    pub fn bake_now(&mut self) -> Result<(), RenderError> {
        self.dirty = false;
        let probe = self.probe.as_ref().ok_or(RenderError::MissingProbe)?;
        self.compositor.bake(&self.gpu, probe)
    }

    /// One frame: rebake if dirty, then draw the preview into `output`.
    ///
    /// A failed bake still draws the last good target before its error is
    /// returned.
    pub fn draw(&mut self, output: &wgpu::TextureView) -> Result<(), RenderError> {
        let baked = if self.dirty { self.bake_now() } else { Ok(()) };
        if let Err(err) = &baked {
            log::warn!("Bake failed, showing the previous target: {err}");
        }

        let probe = self.probe.as_ref().unwrap_or(&self.placeholder);
        self.viewer.draw(
            &self.gpu,
            output,
            PreviewSources {
                target: self.compositor.view(),
                target_size: self.compositor.resolution(),
                probe: probe.view(),
            },
        );
        baked
    }

    /// Reads the target back and writes it to `path`, format by extension.
    pub fn export_to(&self, path: impl AsRef<Path>) -> Result<ExportFormat, RenderError> {
        HdrExporter::export_to(&self.gpu, &self.compositor, path)
    }

    pub fn read_back(&self) -> Result<HdrImage, RenderError> {
        HdrExporter::read_back(&self.gpu, &self.compositor)
    }

    pub fn target_resolution(&self) -> UVec2 {
        self.compositor.resolution()
    }

    pub fn bake_path(&self) -> BakePath {
        self.compositor.bake_path()
    }

    pub fn is_baked(&self) -> bool {
        self.compositor.is_baked()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}
