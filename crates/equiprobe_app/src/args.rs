//! Command line flags, parsed with clap.

use std::path::PathBuf;

use clap::Parser;
use equiprobe_core::{PreviewMode, ProbeKind, ProbeMapping, RendererConfig};

/// Light probe projection, named for the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CliProbeKind {
    /// Photograph of a mirrored sphere, camera looking down -Z.
    #[default]
    MirrorBall,
    /// Six faces in one horizontal strip: +X, -X, +Y, -Y, +Z, -Z.
    CubeMap,
    /// Equidistant fisheye; see --fisheye-fov.
    Fisheye,
}

impl From<CliProbeKind> for ProbeKind {
    fn from(cli: CliProbeKind) -> Self {
        match cli {
            CliProbeKind::MirrorBall => ProbeKind::MirrorBall,
            CliProbeKind::CubeMap => ProbeKind::CubeMap,
            CliProbeKind::Fisheye => ProbeKind::Fisheye,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CliPreviewMode {
    #[default]
    Flat,
    Panorama,
    Probe,
}

impl From<CliPreviewMode> for PreviewMode {
    fn from(cli: CliPreviewMode) -> Self {
        match cli {
            CliPreviewMode::Flat => PreviewMode::Flat,
            CliPreviewMode::Panorama => PreviewMode::Panorama,
            CliPreviewMode::Probe => PreviewMode::Probe,
        }
    }
}

/// Convert a light probe into an equirectangular HDR environment map.
///
/// # Examples
///
/// ```bash
/// # Preview a mirror ball, press S to save
/// equiprobe probe.hdr
///
/// # Bake a 360° angular map straight to OpenEXR
/// equiprobe probe.exr --kind fisheye --fisheye-fov 360 --headless -o env.exr
/// ```
#[derive(Debug, Clone, Parser)]
#[command(name = "equiprobe", version, about)]
pub struct Args {
    /// Light probe image (.hdr, .exr or anything the image crate reads).
    pub probe: PathBuf,

    /// How the probe image maps onto the sphere.
    #[arg(long, value_enum, default_value_t = CliProbeKind::MirrorBall)]
    pub kind: CliProbeKind,

    /// Fisheye field of view in degrees (360 for an angular map).
    #[arg(long, default_value_t = 180.0)]
    pub fisheye_fov: f32,

    /// Width of the baked equirect image.
    #[arg(long, default_value_t = RendererConfig::DEFAULT_TARGET_SIZE)]
    pub width: u32,

    /// Height of the baked equirect image.
    #[arg(long, default_value_t = RendererConfig::DEFAULT_TARGET_SIZE)]
    pub height: u32,

    /// Export destination; `.exr` writes OpenEXR, anything else Radiance.
    #[arg(short, long, default_value = "environment.hdr")]
    pub output: PathBuf,

    /// Bake and export without opening a window.
    #[arg(long)]
    pub headless: bool,

    /// Initial preview mode (Tab cycles).
    #[arg(long, value_enum, default_value_t = CliPreviewMode::Flat)]
    pub preview: CliPreviewMode,

    /// Preview exposure multiplier. Does not affect the export.
    #[arg(long, default_value_t = 1.0)]
    pub exposure: f32,
}

impl Args {
    pub fn mapping(&self) -> ProbeMapping {
        ProbeMapping::new(self.kind.into()).with_fisheye_fov(self.fisheye_fov.to_radians())
    }

    pub fn renderer_config(&self) -> RendererConfig {
        RendererConfig::default()
            .with_target_size(self.width, self.height)
            .with_mapping(self.mapping())
            .with_preview_mode(self.preview.into())
            .with_preview_exposure(self.exposure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["equiprobe", "probe.hdr"]).unwrap();
        assert!(!args.headless);
        assert_eq!(args.output, PathBuf::from("environment.hdr"));
        let config = args.renderer_config();
        let default = RendererConfig::default();
        assert_eq!(config.target_size, default.target_size);
        assert_eq!(config.mapping.kind, ProbeKind::MirrorBall);
        assert!((config.mapping.fisheye_fov - ProbeMapping::DEFAULT_FISHEYE_FOV).abs() < 1e-6);
        assert_eq!(config.preview_mode, PreviewMode::Flat);
    }

    #[rstest]
    #[case("mirror-ball", ProbeKind::MirrorBall)]
    #[case("cube-map", ProbeKind::CubeMap)]
    #[case("fisheye", ProbeKind::Fisheye)]
    fn kinds(#[case] flag: &str, #[case] kind: ProbeKind) {
        let args = Args::try_parse_from(["equiprobe", "p.hdr", "--kind", flag]).unwrap();
        assert_eq!(args.mapping().kind, kind);
    }

    #[test]
    fn angular_map() {
        let args = Args::try_parse_from([
            "equiprobe",
            "p.exr",
            "--kind",
            "fisheye",
            "--fisheye-fov",
            "360",
            "--width",
            "2048",
            "--height",
            "1024",
            "--headless",
            "-o",
            "env.exr",
        ])
        .unwrap();
        let config = args.renderer_config();
        assert!((config.mapping.fisheye_fov - std::f32::consts::TAU).abs() < 1e-5);
        assert_eq!((config.target_size.x, config.target_size.y), (2048, 1024));
        assert!(config.problems().is_empty());
        assert!(args.headless);
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!(Args::try_parse_from(["equiprobe", "p.hdr", "--kind", "dome"]).is_err());
    }

    #[test]
    fn zero_width_surfaces_as_a_config_problem() {
        let args = Args::try_parse_from(["equiprobe", "p.hdr", "--width", "0"]).unwrap();
        assert_eq!(args.renderer_config().problems().len(), 1);
    }
}
