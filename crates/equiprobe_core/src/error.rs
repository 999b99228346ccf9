use thiserror::Error;

/// Rejections raised while describing how a probe maps onto the sphere.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MappingError {
    #[error("unsupported probe kind tag {0}")]
    UnsupportedKindTag(u32),

    #[error("unknown probe kind \"{0}\" (expected mirror-ball, cube-map or fisheye)")]
    UnknownKindName(String),

    #[error("fisheye field of view must be in (0, 360] degrees, got {degrees}")]
    InvalidFisheyeFov { degrees: f32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PixelBufferError {
    #[error("pixel buffer holds {actual} values, {width}x{height} needs {expected}")]
    SizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        assert_eq!(
            MappingError::UnsupportedKindTag(7).to_string(),
            "unsupported probe kind tag 7"
        );

        let err = MappingError::InvalidFisheyeFov { degrees: 0.0 };
        assert!(err.to_string().contains("got 0"));
    }
}
