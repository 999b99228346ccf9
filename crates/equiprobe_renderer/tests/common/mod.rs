#![allow(dead_code)]

use equiprobe_core::{HdrImage, RendererConfig};
use equiprobe_renderer::{GpuContext, OffscreenHost, ProbeRenderer};

/// Headless device, or `None` (with a note on stderr) when the machine has
/// no adapter at all.
pub fn any_gpu() -> Option<GpuContext> {
    match GpuContext::headless() {
        Ok(ctx) => Some(ctx),
        Err(err) => {
            eprintln!("No GPU adapter available ({err}), skipping");
            None
        }
    }
}

/// Like [`any_gpu`], but also skips adapters that cannot write an
/// `Rgba32Float` target by any path.
pub fn gpu() -> Option<GpuContext> {
    let ctx = any_gpu()?;
    if ctx.bake_path().is_none() {
        eprintln!(
            "Adapter cannot write the equirect target ({:?}), skipping",
            ctx.target_usages
        );
        return None;
    }
    Some(ctx)
}

pub fn renderer_with(ctx: GpuContext, config: RendererConfig) -> (ProbeRenderer, OffscreenHost) {
    let host = OffscreenHost::new(&ctx.device, 160, 120);
    let renderer = ProbeRenderer::new(ctx, &host, config).expect("renderer");
    (renderer, host)
}

pub fn renderer(config: RendererConfig) -> Option<(ProbeRenderer, OffscreenHost)> {
    Some(renderer_with(gpu()?, config))
}

/// Smooth ramp: red follows s, green follows t.
pub fn ramp_probe(width: u32, height: u32) -> HdrImage {
    let mut pixels = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        for x in 0..width {
            let s = (x as f32 + 0.5) / width as f32;
            let t = (y as f32 + 0.5) / height as f32;
            pixels.push([s, t, 0.5, 1.0]);
        }
    }
    HdrImage::new(width, height, pixels).expect("ramp")
}

pub fn assert_close(got: [f32; 4], want: [f32; 3], rel: f32) {
    for c in 0..3 {
        assert!(
            (got[c] - want[c]).abs() <= want[c].abs() * rel + 1e-6,
            "{got:?} vs {want:?}"
        );
    }
}
