use std::{f32::consts::PI, fmt, str::FromStr};

use crate::error::MappingError;

/// How the light probe image was captured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ProbeKind {
    /// Orthographic photograph of a chrome ball; the camera sits on +Z.
    #[default]
    MirrorBall,
    /// Six faces side by side: +X, -X, +Y, -Y, +Z, -Z.
    CubeMap,
    /// Equidistant fisheye looking down +Z.
    Fisheye,
}

impl ProbeKind {
    pub const ALL: [ProbeKind; 3] = [ProbeKind::MirrorBall, ProbeKind::CubeMap, ProbeKind::Fisheye];

    /// Numeric tag shared with the shaders.
    pub fn tag(self) -> u32 {
        match self {
            ProbeKind::MirrorBall => 0,
            ProbeKind::CubeMap => 1,
            ProbeKind::Fisheye => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ProbeKind::MirrorBall => "mirror-ball",
            ProbeKind::CubeMap => "cube-map",
            ProbeKind::Fisheye => "fisheye",
        }
    }
}

impl TryFrom<u32> for ProbeKind {
    type Error = MappingError;

    fn try_from(tag: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.tag() == tag)
            .ok_or(MappingError::UnsupportedKindTag(tag))
    }
}

impl FromStr for ProbeKind {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "mirror-ball" | "mirrorball" | "sphere" => Ok(ProbeKind::MirrorBall),
            "cube-map" | "cubemap" | "cube" => Ok(ProbeKind::CubeMap),
            "fisheye" | "fish-eye" => Ok(ProbeKind::Fisheye),
            _ => Err(MappingError::UnknownKindName(s.to_string())),
        }
    }
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Probe kind plus the parameters its projection needs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProbeMapping {
    pub kind: ProbeKind,
    /// Full field of view of a fisheye probe, in radians. Ignored by the other kinds.
    pub fisheye_fov: f32,
}

impl ProbeMapping {
    pub const DEFAULT_FISHEYE_FOV: f32 = PI;

    pub fn new(kind: ProbeKind) -> Self {
        Self {
            kind,
            fisheye_fov: Self::DEFAULT_FISHEYE_FOV,
        }
    }

    pub fn fisheye(fov_radians: f32) -> Self {
        Self::new(ProbeKind::Fisheye).with_fisheye_fov(fov_radians)
    }

    pub fn with_fisheye_fov(mut self, fov_radians: f32) -> Self {
        self.fisheye_fov = fov_radians;
        self
    }

    pub fn fisheye_half_fov(&self) -> f32 {
        0.5 * self.fisheye_fov
    }

    pub fn validate(&self) -> Result<(), MappingError> {
        let fov = self.fisheye_fov;
        if self.kind == ProbeKind::Fisheye && !(fov.is_finite() && fov > 0.0 && fov <= 2.0 * PI + 1e-5)
        {
            return Err(MappingError::InvalidFisheyeFov {
                degrees: fov.to_degrees(),
            });
        }
        Ok(())
    }
}

impl Default for ProbeMapping {
    fn default() -> Self {
        Self::new(ProbeKind::default())
    }
}

impl From<ProbeKind> for ProbeMapping {
    fn from(kind: ProbeKind) -> Self {
        Self::new(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("mirror-ball", ProbeKind::MirrorBall)]
    #[case("MirrorBall", ProbeKind::MirrorBall)]
    #[case("cube_map", ProbeKind::CubeMap)]
    #[case("cubemap", ProbeKind::CubeMap)]
    #[case(" fisheye ", ProbeKind::Fisheye)]
    fn parses_kind_names(#[case] input: &str, #[case] expected: ProbeKind) {
        assert_eq!(input.parse::<ProbeKind>().unwrap(), expected);
    }

    #[test]
    fn rejects_unknown_names_and_tags() {
        assert!(matches!(
            "latlong".parse::<ProbeKind>(),
            Err(MappingError::UnknownKindName(name)) if name == "latlong"
        ));
        assert_eq!(
            ProbeKind::try_from(3),
            Err(MappingError::UnsupportedKindTag(3))
        );
    }

    #[test]
    fn tags_round_trip() {
        for kind in ProbeKind::ALL {
            assert_eq!(ProbeKind::try_from(kind.tag()).unwrap(), kind);
            assert_eq!(kind.to_string().parse::<ProbeKind>().unwrap(), kind);
        }
    }

    #[test]
    fn fisheye_fov_is_validated() {
        assert!(ProbeMapping::fisheye(PI).validate().is_ok());
        assert!(ProbeMapping::fisheye(2.0 * PI).validate().is_ok());
        assert!(ProbeMapping::fisheye(0.0).validate().is_err());
        assert!(ProbeMapping::fisheye(f32::NAN).validate().is_err());
        assert!(ProbeMapping::fisheye(7.0).validate().is_err());

        // Only fisheye probes care about the angle.
        let ball = ProbeMapping::new(ProbeKind::MirrorBall).with_fisheye_fov(0.0);
        assert!(ball.validate().is_ok());
    }
}
