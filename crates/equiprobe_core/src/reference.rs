//! CPU rendition of the bake pass. Slow, but it needs no adapter, which makes
//! it the yardstick the GPU output is checked against.

use glam::{UVec2, Vec2};

use crate::{
    hdr_image::HdrImage,
    mapping::{direction_from_equirect, sampling_coord},
    probe::ProbeMapping,
};

/// Bilinear lookup with clamp-to-edge addressing and texel centres at
/// `(i + 0.5) / size`, the same footprint the bake pass loads.
pub fn sample_bilinear_clamped(image: &HdrImage, st: Vec2) -> [f32; 4] {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return [0.0; 4];
    }

    let x = (st.x * width as f32 - 0.5).clamp(0.0, (width - 1) as f32);
    let y = (st.y * height as f32 - 0.5).clamp(0.0, (height - 1) as f32);

    let x_l = x.floor() as u32;
    let x_r = (x_l + 1).min(width - 1);
    let y_t = y.floor() as u32;
    let y_b = (y_t + 1).min(height - 1);

    let w_x = x - x.floor();
    let w_y = y - y.floor();

    let texel = |px: u32, py: u32| image.pixels()[(py * width + px) as usize];
    let p00 = texel(x_l, y_t);
    let p10 = texel(x_r, y_t);
    let p01 = texel(x_l, y_b);
    let p11 = texel(x_r, y_b);

    let mut result = [0.0; 4];
    for i in 0..4 {
        let top = p00[i] * (1.0 - w_x) + p10[i] * w_x;
        let bot = p01[i] * (1.0 - w_x) + p11[i] * w_x;
        result[i] = top * (1.0 - w_y) + bot * w_y;
    }
    result
}

/// Resamples `probe` into a `size` equirect image, one sample per pixel centre.
/// Alpha is forced to 1 like the GPU pass.
pub fn resample_to_equirect(probe: &HdrImage, mapping: &ProbeMapping, size: UVec2) -> HdrImage {
    let probe_size = UVec2::new(probe.width(), probe.height());
    let mut pixels = Vec::with_capacity(size.x as usize * size.y as usize);

    for y in 0..size.y {
        for x in 0..size.x {
            let uv = (Vec2::new(x as f32, y as f32) + 0.5) / size.as_vec2();
            let dir = direction_from_equirect(uv);
            let st = sampling_coord(dir, mapping, probe_size);
            let [r, g, b, _] = sample_bilinear_clamped(probe, st);
            pixels.push([r, g, b, 1.0]);
        }
    }

    HdrImage::from_vec(size.x, size.y, pixels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::ProbeKind;
    use rstest::rstest;

    fn gradient(width: u32, height: u32) -> HdrImage {
        let mut pixels = Vec::new();
        for y in 0..height {
            for x in 0..width {
                pixels.push([x as f32, y as f32, 2.0, 1.0]);
            }
        }
        HdrImage::new(width, height, pixels).unwrap()
    }

    #[test]
    fn texel_centres_are_exact() {
        let image = gradient(4, 2);
        assert_eq!(sample_bilinear_clamped(&image, Vec2::new(0.125, 0.25)), [0.0, 0.0, 2.0, 1.0]);
        assert_eq!(sample_bilinear_clamped(&image, Vec2::new(0.875, 0.75)), [3.0, 1.0, 2.0, 1.0]);
        assert_eq!(sample_bilinear_clamped(&image, Vec2::new(0.25, 0.25)), [0.5, 0.0, 2.0, 1.0]);
    }

    #[test]
    fn clamps_instead_of_wrapping() {
        let image = gradient(4, 2);
        assert_eq!(sample_bilinear_clamped(&image, Vec2::new(-3.0, 0.25))[0], 0.0);
        assert_eq!(sample_bilinear_clamped(&image, Vec2::new(5.0, 9.0)), [3.0, 1.0, 2.0, 1.0]);
    }

    #[rstest]
    #[case(ProbeKind::MirrorBall)]
    #[case(ProbeKind::CubeMap)]
    #[case(ProbeKind::Fisheye)]
    fn uniform_probe_gives_uniform_target(#[case] kind: ProbeKind) {
        let radiance = [1.5, 0.25, 40.0, 1.0];
        let probe = HdrImage::uniform(12, 12, radiance);
        let out = resample_to_equirect(&probe, &kind.into(), UVec2::new(32, 16));
        assert_eq!((out.width(), out.height()), (32, 16));
        for p in out.pixels() {
            for (got, want) in p.iter().zip(radiance) {
                assert!((got - want).abs() <= want.abs() * 1e-6, "{p:?}");
            }
        }
    }

    #[test]
    fn single_texel_probe() {
        let probe = HdrImage::uniform(1, 1, [0.5, 0.5, 0.5, 0.0]);
        let out = resample_to_equirect(&probe, &ProbeMapping::default(), UVec2::new(8, 8));
        assert!(out.pixels().iter().all(|p| *p == [0.5, 0.5, 0.5, 1.0]));
    }

    #[test]
    fn mirror_ball_centre_lands_in_the_middle() {
        // Hot centre texel, dark everywhere else.
        let mut pixels = vec![[0.0, 0.0, 0.0, 1.0]; 9];
        pixels[4] = [100.0, 100.0, 100.0, 1.0];
        let probe = HdrImage::new(3, 3, pixels).unwrap();
        let out = resample_to_equirect(&probe, &ProbeMapping::default(), UVec2::new(64, 32));

        let centre = out.pixel(32, 16).unwrap();
        let back = out.pixel(0, 16).unwrap();
        assert!(centre[0] > 50.0, "{centre:?}");
        assert_eq!(back[0], 0.0);
    }
}
