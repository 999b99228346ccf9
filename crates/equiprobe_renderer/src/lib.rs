//! GPU side of equiprobe: bakes a light probe into a fixed-size equirect
//! target, previews it on a host surface and exports it as HDR.

pub mod compositor;
pub mod context;
pub mod error;
pub mod exporter;
pub mod host;
pub mod programs;
pub mod readback;
pub mod renderer;
pub mod texture;
pub mod viewer;

pub use compositor::{BakePath, OffscreenCompositor};
pub use context::GpuContext;
pub use error::{ErrorKind, RenderError};
pub use exporter::{ExportFormat, HdrExporter};
pub use host::{HostView, OffscreenHost, SurfaceTarget};
pub use renderer::ProbeRenderer;
pub use texture::{ProbeTexture, TextureHelper};
pub use viewer::{InteractiveViewer, PreviewSources};

pub use equiprobe_core as core;
