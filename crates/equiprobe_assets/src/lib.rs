//! Decodes light probe images from disk into [`HdrImage`]s.

pub mod error;
pub mod probe_loader;

pub use equiprobe_core::HdrImage;
pub use error::AssetError;
pub use probe_loader::{ProbeFileKind, load_probe};
