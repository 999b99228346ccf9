use std::path::PathBuf;

use equiprobe_core::PixelBufferError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot decode OpenEXR file {}: {message}", path.display())]
    Exr { path: PathBuf, message: String },

    #[error("cannot decode image {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("{} has no pixels", path.display())]
    Empty { path: PathBuf },

    #[error(transparent)]
    PixelBuffer(#[from] PixelBufferError),
}
