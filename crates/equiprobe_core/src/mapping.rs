//! Direction math shared by the bake pass, the preview pass and the CPU
//! reference resampler. `shaders/mapping.wgsl` in the renderer mirrors every
//! function here; keep the two in step.
//!
//! Conventions:
//! - Directions are right-handed, +Y up. The centre of the equirectangular
//!   image (u = 0.5, v = 0.5) looks down +Z and u grows towards +X.
//! - Texture coordinates have their origin in the top-left corner, so `t`/`v`
//!   grow downwards.

use std::f32::consts::{PI, TAU};

use glam::{UVec2, Vec2, Vec3};

use crate::probe::{ProbeKind, ProbeMapping};

/// Below this the horizontal extent of a direction is treated as zero.
pub const POLE_EPSILON: f32 = 1.0e-6;

/// Cube faces in the order they appear in a horizontal strip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CubeFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubeFace {
    pub const COUNT: u32 = 6;

    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];

    pub fn index(self) -> u32 {
        self as u32
    }

    pub fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Face hit by `dir`; ties go to X, then Y.
    pub fn dominant(dir: Vec3) -> Self {
        let a = dir.abs();
        if a.x >= a.y && a.x >= a.z {
            if dir.x >= 0.0 { CubeFace::PositiveX } else { CubeFace::NegativeX }
        } else if a.y >= a.z {
            if dir.y >= 0.0 { CubeFace::PositiveY } else { CubeFace::NegativeY }
        } else if dir.z >= 0.0 {
            CubeFace::PositiveZ
        } else {
            CubeFace::NegativeZ
        }
    }

    /// (sc, tc, ma) from the usual cube map selection table.
    fn project(self, d: Vec3) -> (f32, f32, f32) {
        match self {
            CubeFace::PositiveX => (-d.z, -d.y, d.x),
            CubeFace::NegativeX => (d.z, -d.y, -d.x),
            CubeFace::PositiveY => (d.x, d.z, d.y),
            CubeFace::NegativeY => (d.x, -d.z, -d.y),
            CubeFace::PositiveZ => (d.x, -d.y, d.z),
            CubeFace::NegativeZ => (-d.x, -d.y, -d.z),
        }
    }

    fn unproject(self, sc: f32, tc: f32) -> Vec3 {
        match self {
            CubeFace::PositiveX => Vec3::new(1.0, -tc, -sc),
            CubeFace::NegativeX => Vec3::new(-1.0, -tc, sc),
            CubeFace::PositiveY => Vec3::new(sc, 1.0, tc),
            CubeFace::NegativeY => Vec3::new(sc, -1.0, -tc),
            CubeFace::PositiveZ => Vec3::new(sc, -tc, 1.0),
            CubeFace::NegativeZ => Vec3::new(-sc, -tc, -1.0),
        }
    }
}

/// Unit direction for an equirectangular coordinate.
///
/// `u` in [0, 1) spans longitude -π..π, `v` in [0, 1] spans latitude π/2..-π/2.
/// At the poles the horizontal part is snapped to zero so the result is
/// exactly (0, ±1, 0) whatever `u` is.
pub fn direction_from_equirect(uv: Vec2) -> Vec3 {
    let theta = TAU * (uv.x - 0.5);
    let phi = PI * (0.5 - uv.y);
    let (sin_phi, cos_phi) = phi.sin_cos();
    let (sin_theta, cos_theta) = theta.sin_cos();
    let horizontal = if cos_phi.abs() < POLE_EPSILON { 0.0 } else { cos_phi };
    Vec3::new(horizontal * sin_theta, sin_phi, horizontal * cos_theta)
}

/// Inverse of [`direction_from_equirect`]. Poles land on the centre column.
pub fn equirect_from_direction(dir: Vec3) -> Vec2 {
    let d = dir.normalize_or(Vec3::Z);
    let horizontal = (d.x * d.x + d.z * d.z).sqrt();
    let theta = if horizontal < POLE_EPSILON { 0.0 } else { d.x.atan2(d.z) };
    let phi = d.y.clamp(-1.0, 1.0).asin();
    Vec2::new(theta / TAU + 0.5, 0.5 - phi / PI)
}

/// Where to sample the probe image for light arriving from `dir`.
///
/// The result is in [0, 1]² for every direction a probe can record. Fisheye
/// directions outside the lens land outside that range and rely on the
/// lookup clamping to the edge.
pub fn probe_coord_from_direction(dir: Vec3, mapping: &ProbeMapping) -> Vec2 {
    let d = dir.normalize_or(Vec3::Z);
    match mapping.kind {
        ProbeKind::MirrorBall => mirror_ball_coord(d),
        ProbeKind::CubeMap => cube_strip_coord(d, None),
        ProbeKind::Fisheye => fisheye_coord(d, mapping.fisheye_half_fov()),
    }
}

/// Like [`probe_coord_from_direction`] but keeps cube map lookups half a
/// texel inside their face so bilinear filtering never reads a neighbour face.
pub fn sampling_coord(dir: Vec3, mapping: &ProbeMapping, probe_size: UVec2) -> Vec2 {
    match mapping.kind {
        ProbeKind::CubeMap => {
            let face_size = Vec2::new(
                probe_size.x as f32 / CubeFace::COUNT as f32,
                probe_size.y as f32,
            );
            cube_strip_coord(dir.normalize_or(Vec3::Z), Some(face_size))
        }
        _ => probe_coord_from_direction(dir, mapping),
    }
}

/// Direction recorded at probe coordinate `st`, or `None` outside the ball or lens.
pub fn direction_from_probe_coord(st: Vec2, mapping: &ProbeMapping) -> Option<Vec3> {
    match mapping.kind {
        ProbeKind::MirrorBall => mirror_ball_direction(st),
        ProbeKind::CubeMap => cube_strip_direction(st),
        ProbeKind::Fisheye => fisheye_direction(st, mapping.fisheye_half_fov()),
    }
}

/// Split a direction into its cube face and face-local (s, t) in [0, 1]².
pub fn cube_face_coord(dir: Vec3) -> (CubeFace, Vec2) {
    let face = CubeFace::dominant(dir);
    let (sc, tc, ma) = face.project(dir);
    let ma = ma.max(POLE_EPSILON);
    (face, Vec2::new(0.5 * (sc / ma + 1.0), 0.5 * (tc / ma + 1.0)))
}

/// Unit vector of the (x, y) part of `d`, falling back to +X when it vanishes.
fn planar_azimuth(d: Vec3) -> Vec2 {
    let len = (d.x * d.x + d.y * d.y).sqrt();
    if len < POLE_EPSILON {
        Vec2::X
    } else {
        Vec2::new(d.x, d.y) / len
    }
}

/// Disk coordinate (x right, y up, radius 1 at the rim) to texture space.
fn disk_to_texture(p: Vec2) -> Vec2 {
    Vec2::new(0.5 + 0.5 * p.x, 0.5 - 0.5 * p.y)
}

fn texture_to_disk(st: Vec2) -> Vec2 {
    Vec2::new(2.0 * st.x - 1.0, 1.0 - 2.0 * st.y)
}

// Ball normal bisects the direction and the view axis, so the image radius is
// sin(angle / 2) with angle = acos(z); sqrt((1 - z) / 2) is the same thing
// without the trig round trip.
fn mirror_ball_coord(d: Vec3) -> Vec2 {
    let radius = ((1.0 - d.z) * 0.5).max(0.0).sqrt();
    disk_to_texture(planar_azimuth(d) * radius)
}

fn mirror_ball_direction(st: Vec2) -> Option<Vec3> {
    let p = texture_to_disk(st);
    let r2 = p.length_squared();
    if r2 > 1.0 {
        return None;
    }
    let normal = Vec3::new(p.x, p.y, (1.0 - r2).sqrt());
    // Reflect the view ray (travelling down -Z) about the ball normal.
    Some((2.0 * normal.z * normal - Vec3::Z).normalize_or(Vec3::NEG_Z))
}

fn fisheye_coord(d: Vec3, half_fov: f32) -> Vec2 {
    let angle = d.z.clamp(-1.0, 1.0).acos();
    let rho = angle / half_fov.max(POLE_EPSILON);
    disk_to_texture(planar_azimuth(d) * rho)
}

fn fisheye_direction(st: Vec2, half_fov: f32) -> Option<Vec3> {
    let p = texture_to_disk(st);
    let rho = p.length();
    let angle = rho * half_fov;
    if rho > 1.0 || angle > PI {
        return None;
    }
    let azimuth = if rho < POLE_EPSILON { Vec2::X } else { p / rho };
    let (sin_a, cos_a) = angle.sin_cos();
    Some(Vec3::new(sin_a * azimuth.x, sin_a * azimuth.y, cos_a))
}

fn cube_strip_coord(d: Vec3, face_size: Option<Vec2>) -> Vec2 {
    let (face, mut local) = cube_face_coord(d);
    if let Some(size) = face_size {
        let inset = Vec2::splat(0.5) / size.max(Vec2::ONE);
        local = local.clamp(inset, Vec2::ONE - inset);
    }
    Vec2::new(
        (face.index() as f32 + local.x) / CubeFace::COUNT as f32,
        local.y,
    )
}

fn cube_strip_direction(st: Vec2) -> Option<Vec3> {
    if !(0.0..=1.0).contains(&st.x) || !(0.0..=1.0).contains(&st.y) {
        return None;
    }
    let scaled = st.x * CubeFace::COUNT as f32;
    let index = (scaled.floor() as u32).min(CubeFace::COUNT - 1);
    let face = CubeFace::from_index(index)?;
    let local = Vec2::new(scaled - index as f32, st.y);
    let sc = 2.0 * local.x - 1.0;
    let tc = 2.0 * local.y - 1.0;
    Some(face.unproject(sc, tc).normalize())
}
