use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use equiprobe_core::HdrImage;
use image::{Rgb, codecs::hdr::HdrEncoder};

use crate::{compositor::OffscreenCompositor, context::GpuContext, error::RenderError, readback};

/// File format chosen from the destination's extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    /// Radiance RGBE with run-length-encoded scanlines.
    Radiance,
    /// OpenEXR, 32-bit float RGB.
    OpenExr,
}

impl ExportFormat {
    /// `.exr` (any case) selects OpenEXR; everything else is written as Radiance.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("exr") => ExportFormat::OpenExr,
            _ => ExportFormat::Radiance,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ExportFormat::Radiance => "Radiance HDR",
            ExportFormat::OpenExr => "OpenEXR",
        }
    }
}

/// Reads the baked target back and writes it to disk. Values are linear and
/// unclamped; rows are written top row first.
pub struct HdrExporter;

impl HdrExporter {
    /// Full synchronous readback of the target.
    pub fn read_back(
        ctx: &GpuContext,
        compositor: &OffscreenCompositor,
    ) -> Result<HdrImage, RenderError> {
        if !compositor.is_baked() {
            return Err(RenderError::NotBaked);
        }
        readback::read_rgba32f(&ctx.device, &ctx.queue, compositor.texture())
    }

    pub fn export_to(
        ctx: &GpuContext,
        compositor: &OffscreenCompositor,
        path: impl AsRef<Path>,
    ) -> Result<ExportFormat, RenderError> {
        let path = path.as_ref();
        // Checked before anything touches the filesystem.
        let image = Self::read_back(ctx, compositor)?;
        let format = Self::write_image(&image, path)?;
        log::info!(
            "Exported {}x{} {} to {}",
            image.width(),
            image.height(),
            format.name(),
            path.display()
        );
        Ok(format)
    }

    /// Writes `image` to `path` through a sibling temporary file, so a failed
    /// write never leaves a partial destination behind.
    pub fn write_image(image: &HdrImage, path: &Path) -> Result<ExportFormat, RenderError> {
        let format = ExportFormat::from_path(path);
        let temp = temp_sibling(path);

        let written = match format {
            ExportFormat::Radiance => write_radiance_file(image, &temp),
            ExportFormat::OpenExr => write_openexr(image, &temp).map_err(|message| {
                RenderError::Encode {
                    path: path.to_path_buf(),
                    message,
                }
            }),
        };

        if let Err(err) = written.and_then(|()| {
            std::fs::rename(&temp, path).map_err(|source| RenderError::io(path, source))
        }) {
            log::warn!("Export to {} failed: {err}", path.display());
            let _ = std::fs::remove_file(&temp);
            return Err(err);
        }
        Ok(format)
    }
}

/// Encodes `image` as Radiance RGBE. Alpha is dropped.
pub fn write_radiance<W: Write>(image: &HdrImage, writer: W) -> Result<(), image::ImageError> {
    let rgb: Vec<Rgb<f32>> = image.rgb().map(Rgb).collect();
    HdrEncoder::new(writer).encode(&rgb, image.width() as usize, image.height() as usize)
}

fn write_radiance_file(image: &HdrImage, temp: &Path) -> Result<(), RenderError> {
    let file = File::create(temp).map_err(|source| RenderError::io(temp, source))?;
    let mut writer = BufWriter::new(file);
    write_radiance(image, &mut writer).map_err(|err| match err {
        image::ImageError::IoError(source) => RenderError::io(temp, source),
        other => RenderError::Encode {
            path: temp.to_path_buf(),
            message: other.to_string(),
        },
    })?;
    writer.flush().map_err(|source| RenderError::io(temp, source))
}

fn write_openexr(image: &HdrImage, temp: &Path) -> Result<(), String> {
    let width = image.width() as usize;
    let pixels = image.pixels();
    exr::prelude::write_rgb_file(temp, width, image.height() as usize, |x, y| {
        let [r, g, b, _] = pixels[y * width + x];
        (r, g, b)
    })
    .map_err(|err| err.to_string())
}

/// `dir/.name.tmp` next to the destination.
fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "export".to_owned());
    path.with_file_name(format!(".{name}.tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn gradient(width: u32, height: u32) -> HdrImage {
        let mut pixels = Vec::new();
        for y in 0..height {
            for x in 0..width {
                pixels.push([x as f32 * 0.5, y as f32 * 10.0, 1.0, 1.0]);
            }
        }
        HdrImage::new(width, height, pixels).unwrap()
    }

    #[rstest]
    #[case("out.hdr", ExportFormat::Radiance)]
    #[case("out.HDR", ExportFormat::Radiance)]
    #[case("out.exr", ExportFormat::OpenExr)]
    #[case("OUT.EXR", ExportFormat::OpenExr)]
    #[case("out.pic", ExportFormat::Radiance)]
    #[case("out", ExportFormat::Radiance)]
    fn format_follows_extension(#[case] name: &str, #[case] expected: ExportFormat) {
        assert_eq!(ExportFormat::from_path(Path::new(name)), expected);
    }

    #[test]
    fn radiance_header_carries_the_resolution() {
        let mut bytes = Vec::new();
        write_radiance(&gradient(16, 4), &mut bytes).unwrap();
        let header = String::from_utf8_lossy(&bytes[..bytes.len().min(128)]).into_owned();
        assert!(header.starts_with("#?RADIANCE"), "{header}");
        assert!(header.contains("FORMAT=32-bit_rle_rgbe"), "{header}");
        assert!(header.contains("-Y 4 +X 16"), "{header}");
    }

    #[test]
    fn radiance_file_decodes_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("probe.hdr");
        let source = gradient(16, 4);
        assert_eq!(HdrExporter::write_image(&source, &path).unwrap(), ExportFormat::Radiance);

        let decoded = image::open(&path).unwrap().into_rgb32f();
        assert_eq!(decoded.dimensions(), (16, 4));
        for (x, y, px) in decoded.enumerate_pixels() {
            let want = source.pixel(x, y).unwrap();
            for c in 0..3 {
                // RGBE keeps 8 bits of mantissa per pixel.
                let tolerance = want[c].abs().max(want[0].max(want[1]).max(want[2])) / 128.0;
                assert!((px[c] - want[c]).abs() <= tolerance, "({x},{y}) {px:?} vs {want:?}");
            }
        }
        // Only the destination is left behind.
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn openexr_keeps_full_float_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("probe.exr");
        let source = HdrImage::uniform(8, 4, [1234.5, 0.001, 7.25, 1.0]);
        assert_eq!(HdrExporter::write_image(&source, &path).unwrap(), ExportFormat::OpenExr);

        let decoded = image::open(&path).unwrap().into_rgb32f();
        assert_eq!(decoded.dimensions(), (8, 4));
        assert!(decoded.pixels().all(|p| p.0 == [1234.5, 0.001, 7.25]));
    }

    #[test]
    fn unwritable_destination_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("probe.hdr");
        let err = HdrExporter::write_image(&gradient(8, 2), &path).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
        assert!(!path.exists());
    }
}
