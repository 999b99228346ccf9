use glam::UVec2;

use crate::{probe::ProbeMapping, view::PreviewMode};

/// Everything the renderer needs to know up front. Built in code or from
/// command line flags; nothing is persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct RendererConfig {
    /// Resolution of the baked equirect image. Fixed for the renderer's lifetime.
    pub target_size: UVec2,
    pub mapping: ProbeMapping,
    pub preview_mode: PreviewMode,
    pub preview_zoom: f32,
    /// Vertical field of view of the panorama preview, in radians.
    pub preview_fov: f32,
    /// Multiplier applied before the preview tone curve. Never touches the bake.
    pub preview_exposure: f32,
    pub clear_color: [f64; 4],
}

impl RendererConfig {
    pub const DEFAULT_TARGET_SIZE: u32 = 1024;

    pub fn with_target_size(mut self, width: u32, height: u32) -> Self {
        self.target_size = UVec2::new(width, height);
        self
    }

    pub fn with_mapping(mut self, mapping: impl Into<ProbeMapping>) -> Self {
        self.mapping = mapping.into();
        self
    }

    pub fn with_preview_mode(mut self, mode: PreviewMode) -> Self {
        self.preview_mode = mode;
        self
    }

    pub fn with_preview_zoom(mut self, zoom: f32) -> Self {
        self.preview_zoom = zoom;
        self
    }

    pub fn with_preview_exposure(mut self, exposure: f32) -> Self {
        self.preview_exposure = exposure;
        self
    }

    /// Reasons this configuration cannot drive a renderer, if any.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.target_size.x == 0 || self.target_size.y == 0 {
            problems.push(format!(
                "target size must be non-zero, got {}x{}",
                self.target_size.x, self.target_size.y
            ));
        }
        if let Err(err) = self.mapping.validate() {
            problems.push(err.to_string());
        }
        if !(self.preview_zoom.is_finite() && self.preview_zoom > 0.0) {
            problems.push(format!("preview zoom must be positive, got {}", self.preview_zoom));
        }
        if !(self.preview_exposure.is_finite() && self.preview_exposure >= 0.0) {
            problems.push(format!(
                "preview exposure must be non-negative, got {}",
                self.preview_exposure
            ));
        }
        problems
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            target_size: UVec2::splat(Self::DEFAULT_TARGET_SIZE),
            mapping: ProbeMapping::default(),
            preview_mode: PreviewMode::default(),
            preview_zoom: 1.0,
            preview_fov: crate::view::ViewState::DEFAULT_FOV,
            preview_exposure: 1.0,
            clear_color: [0.1, 0.2, 0.3, 1.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::ProbeKind;

    #[test]
    fn defaults_bake_a_square_mirror_ball() {
        let config = RendererConfig::default();
        assert_eq!(config.target_size, UVec2::new(1024, 1024));
        assert_eq!(config.mapping.kind, ProbeKind::MirrorBall);
        assert!(config.problems().is_empty());
    }

    #[test]
    fn reports_every_problem() {
        let config = RendererConfig::default()
            .with_target_size(0, 512)
            .with_mapping(ProbeMapping::fisheye(-1.0))
            .with_preview_zoom(0.0);
        let problems = config.problems();
        assert_eq!(problems.len(), 3, "{problems:?}");
        assert!(problems[0].contains("0x512"));
    }
}
