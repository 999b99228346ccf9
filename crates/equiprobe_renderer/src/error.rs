use std::path::PathBuf;

use equiprobe_core::{MappingError, PixelBufferError};
use thiserror::Error;

/// Broad class of a [`RenderError`], for hosts that react per category.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad probe or configuration; rejected before any GPU work.
    Input,
    /// The GPU could not provide what was asked for. Not retried.
    Resource,
    /// The call is not valid in the renderer's current state.
    State,
    /// The destination could not be written.
    Io,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no light probe has been supplied")]
    MissingProbe,

    #[error("light probe is empty ({width}x{height})")]
    EmptyProbe { width: u32, height: u32 },

    #[error("unsupported light probe format {0:?}, expected a float RGB(A) format")]
    UnsupportedProbeFormat(wgpu::TextureFormat),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    PixelBuffer(#[from] PixelBufferError),

    #[error("invalid renderer configuration: {0}")]
    InvalidConfig(String),

    #[error("no suitable GPU adapter: {0}")]
    Adapter(String),

    #[error("failed to open GPU device: {0}")]
    Device(String),

    #[error("a {width}x{height} target exceeds the device limit of {limit} texels per side")]
    TargetTooLarge { width: u32, height: u32, limit: u32 },

    #[error("the adapter can neither render nor store to a {format:?} target (allowed: {usages:?})")]
    UnsupportedTarget {
        format: wgpu::TextureFormat,
        usages: wgpu::TextureUsages,
    },

    #[error("GPU pipeline creation failed: {0}")]
    Pipeline(String),

    #[error("GPU allocation failed: {0}")]
    Allocation(String),

    #[error("GPU readback failed: {0}")]
    Readback(String),

    #[error("nothing to export: no bake has completed yet")]
    NotBaked,

    #[error("cannot write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot encode {}: {message}", path.display())]
    Encode { path: PathBuf, message: String },
}

impl RenderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RenderError::MissingProbe
            | RenderError::EmptyProbe { .. }
            | RenderError::UnsupportedProbeFormat(_)
            | RenderError::Mapping(_)
            | RenderError::PixelBuffer(_)
            | RenderError::InvalidConfig(_) => ErrorKind::Input,
            RenderError::Adapter(_)
            | RenderError::Device(_)
            | RenderError::TargetTooLarge { .. }
            | RenderError::UnsupportedTarget { .. }
            | RenderError::Pipeline(_)
            | RenderError::Allocation(_)
            | RenderError::Readback(_) => ErrorKind::Resource,
            RenderError::NotBaked => ErrorKind::State,
            RenderError::Io { .. } | RenderError::Encode { .. } => ErrorKind::Io,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RenderError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_failure_has_a_category() {
        assert_eq!(RenderError::MissingProbe.kind(), ErrorKind::Input);
        assert_eq!(
            RenderError::from(MappingError::UnsupportedKindTag(9)).kind(),
            ErrorKind::Input
        );
        assert_eq!(
            RenderError::Allocation("out of memory".into()).kind(),
            ErrorKind::Resource
        );
        assert_eq!(
            RenderError::UnsupportedTarget {
                format: wgpu::TextureFormat::Rgba32Float,
                usages: wgpu::TextureUsages::COPY_SRC,
            }
            .kind(),
            ErrorKind::Resource
        );
        assert_eq!(RenderError::Pipeline("rejected".into()).kind(), ErrorKind::Resource);
        assert_eq!(RenderError::NotBaked.kind(), ErrorKind::State);
        let io = RenderError::io(
            "/nowhere/out.hdr",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert_eq!(io.kind(), ErrorKind::Io);
        assert_eq!(io.to_string(), "cannot write /nowhere/out.hdr: missing");
    }
}
