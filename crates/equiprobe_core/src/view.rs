use std::{
    f32::consts::{FRAC_PI_2, PI, TAU},
    fmt,
};

use glam::{Mat3, Quat, Vec2, Vec3};

/// What the interactive preview shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PreviewMode {
    /// The baked equirect image, panned and zoomed.
    #[default]
    Flat,
    /// A perspective look-around inside the baked environment.
    Panorama,
    /// The untouched light probe.
    Probe,
}

impl PreviewMode {
    pub fn tag(self) -> u32 {
        match self {
            PreviewMode::Flat => 0,
            PreviewMode::Panorama => 1,
            PreviewMode::Probe => 2,
        }
    }

    pub fn next(self) -> Self {
        match self {
            PreviewMode::Flat => PreviewMode::Panorama,
            PreviewMode::Panorama => PreviewMode::Probe,
            PreviewMode::Probe => PreviewMode::Flat,
        }
    }
}

impl fmt::Display for PreviewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PreviewMode::Flat => "flat",
            PreviewMode::Panorama => "panorama",
            PreviewMode::Probe => "probe",
        })
    }
}

// Keeps the panorama camera from flipping over the poles.
const MAX_PITCH: f32 = FRAC_PI_2 - 0.01;

/// Preview camera driven by the pointer.
///
/// The pointer position within the viewport maps directly onto a rotation:
/// the full width sweeps 360° of yaw and the full height 180° of pitch, with
/// the centre of the viewport looking straight down +Z. Zoom is fixed when the
/// state is created.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewState {
    pointer: Option<Vec2>,
    yaw: f32,
    pitch: f32,
    zoom: f32,
    fov: f32,
}

impl ViewState {
    pub const DEFAULT_FOV: f32 = 75.0 * PI / 180.0;

    pub fn new(zoom: f32, fov: f32) -> Self {
        Self {
            pointer: None,
            yaw: 0.0,
            pitch: 0.0,
            zoom: if zoom.is_finite() { zoom.max(0.01) } else { 1.0 },
            fov: if fov.is_finite() { fov.clamp(0.01, PI - 0.01) } else { Self::DEFAULT_FOV },
        }
    }

    /// Records a pointer position (pixels, origin top-left) and re-derives
    /// the view rotation. An empty viewport only records the position.
    pub fn on_pointer_move(&mut self, coord: Vec2, viewport: Vec2) {
        self.pointer = Some(coord);
        if viewport.x <= 0.0 || viewport.y <= 0.0 || !coord.is_finite() {
            return;
        }
        let n = (coord / viewport).clamp(Vec2::ZERO, Vec2::ONE);
        self.yaw = (n.x - 0.5) * TAU;
        self.pitch = ((0.5 - n.y) * PI).clamp(-MAX_PITCH, MAX_PITCH);
    }

    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Vertical field of view of the panorama camera after zoom.
    pub fn fov(&self) -> f32 {
        (self.fov / self.zoom).clamp(0.01, PI - 0.01)
    }

    /// Offset in texture space applied by the flat and probe previews.
    pub fn pan(&self) -> Vec2 {
        Vec2::new(self.yaw / TAU, -self.pitch / PI)
    }

    /// Texture coordinate shown at `screen_uv` in the flat preview.
    /// Longitude wraps, latitude clamps.
    pub fn flat_uv(&self, screen_uv: Vec2) -> Vec2 {
        let uv = (screen_uv - 0.5) / self.zoom + 0.5 + self.pan();
        Vec2::new(uv.x.rem_euclid(1.0), uv.y.clamp(0.0, 1.0))
    }

    /// Camera-to-world rotation for the panorama preview.
    pub fn rotation(&self) -> Mat3 {
        Mat3::from_quat(Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(-self.pitch))
    }

    /// World-space ray through `ndc` (x right, y up, both in [-1, 1]).
    /// Screen right is +X so the panorama is not mirrored against the flat view.
    pub fn panorama_ray(&self, ndc: Vec2, aspect: f32) -> Vec3 {
        let tan_half = (0.5 * self.fov()).tan();
        let local = Vec3::new(ndc.x * tan_half * aspect, ndc.y * tan_half, 1.0).normalize();
        self.rotation() * local
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(1.0, Self::DEFAULT_FOV)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::equirect_from_direction;

    #[test]
    fn centre_of_viewport_looks_forward() {
        let mut view = ViewState::default();
        view.on_pointer_move(Vec2::new(400.0, 300.0), Vec2::new(800.0, 600.0));
        assert_eq!(view.yaw(), 0.0);
        assert_eq!(view.pitch(), 0.0);
        let ray = view.panorama_ray(Vec2::ZERO, 4.0 / 3.0);
        assert!(ray.abs_diff_eq(Vec3::Z, 1e-6));
        assert!(equirect_from_direction(ray).abs_diff_eq(Vec2::splat(0.5), 1e-6));
    }

    #[test]
    fn pointer_right_turns_towards_positive_x() {
        let mut view = ViewState::default();
        view.on_pointer_move(Vec2::new(600.0, 300.0), Vec2::new(800.0, 600.0));
        assert!((view.yaw() - TAU * 0.25).abs() < 1e-5);
        let ray = view.panorama_ray(Vec2::ZERO, 1.0);
        assert!(ray.abs_diff_eq(Vec3::X, 1e-5), "{ray:?}");
        assert!((view.pan().x - 0.25).abs() < 1e-6);
    }

    #[test]
    fn pitch_is_clamped_short_of_the_pole() {
        let mut view = ViewState::default();
        view.on_pointer_move(Vec2::new(0.0, -50.0), Vec2::new(100.0, 100.0));
        assert!(view.pitch() < FRAC_PI_2);
        assert!(view.panorama_ray(Vec2::ZERO, 1.0).y > 0.99);
    }

    #[test]
    fn empty_viewport_records_pointer_only() {
        let mut view = ViewState::default();
        view.on_pointer_move(Vec2::new(10.0, 10.0), Vec2::ZERO);
        assert_eq!(view.pointer(), Some(Vec2::new(10.0, 10.0)));
        assert_eq!(view.yaw(), 0.0);
    }

    #[test]
    fn flat_uv_wraps_longitude() {
        let mut view = ViewState::new(2.0, ViewState::DEFAULT_FOV);
        assert!(view.flat_uv(Vec2::splat(0.5)).abs_diff_eq(Vec2::splat(0.5), 1e-6));
        assert!(view.flat_uv(Vec2::ZERO).abs_diff_eq(Vec2::splat(0.25), 1e-6));

        view.on_pointer_move(Vec2::new(100.0, 50.0), Vec2::new(100.0, 100.0));
        let uv = view.flat_uv(Vec2::new(1.0, 0.5));
        assert!((0.0..1.0).contains(&uv.x));
        assert!((uv.x - 0.25).abs() < 1e-5, "{uv:?}");
    }

    #[test]
    fn modes_cycle() {
        let mut mode = PreviewMode::default();
        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(mode);
            mode = mode.next();
        }
        assert_eq!(mode, PreviewMode::Flat);
        assert_eq!(seen, [PreviewMode::Flat, PreviewMode::Panorama, PreviewMode::Probe]);
    }
}
