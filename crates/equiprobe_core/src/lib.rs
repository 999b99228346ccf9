//! GPU-free building blocks for converting light probes into equirectangular
//! environment maps: direction math, probe descriptions, preview view state,
//! renderer configuration and a CPU reference resampler.

pub mod config;
pub mod error;
pub mod hdr_image;
pub mod mapping;
pub mod probe;
pub mod reference;
pub mod view;

pub use config::RendererConfig;
pub use error::{MappingError, PixelBufferError};
pub use hdr_image::HdrImage;
pub use mapping::{
    CubeFace, direction_from_equirect, direction_from_probe_coord, equirect_from_direction,
    probe_coord_from_direction, sampling_coord,
};
pub use probe::{ProbeKind, ProbeMapping};
pub use view::{PreviewMode, ViewState};
