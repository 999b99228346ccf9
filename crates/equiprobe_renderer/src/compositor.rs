use bytemuck::Zeroable;
use glam::UVec2;
use wgpu::util::DeviceExt;

use crate::{
    context::GpuContext,
    error::RenderError,
    programs::{
        BakeUniform, EquirectComputeProgram, EquirectProgram, GpuProgram, GpuProgramRenderContext,
    },
    texture::{EquirectTarget, ProbeTexture, TextureHelper},
};

/// How a bake writes the equirect target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BakePath {
    /// Fullscreen triangle into a color attachment.
    Render,
    /// One compute invocation per texel into a storage texture.
    Compute,
}

impl BakePath {
    /// Prefers rendering; falls back to storage writes. `None` when the target
    /// format allows neither.
    pub fn select(target_usages: wgpu::TextureUsages) -> Option<Self> {
        if target_usages.contains(wgpu::TextureUsages::RENDER_ATTACHMENT) {
            Some(BakePath::Render)
        } else if target_usages.contains(wgpu::TextureUsages::STORAGE_BINDING) {
            Some(BakePath::Compute)
        } else {
            None
        }
    }

    /// The usage the target needs for this path to write it.
    pub fn target_usage(self) -> wgpu::TextureUsages {
        match self {
            BakePath::Render => wgpu::TextureUsages::RENDER_ATTACHMENT,
            BakePath::Compute => wgpu::TextureUsages::STORAGE_BINDING,
        }
    }
}

enum BakeProgram {
    Render(EquirectProgram),
    Compute(EquirectComputeProgram),
}

/// Owns the equirect target and bakes light probes into it.
///
/// The target's resolution is fixed at construction and never follows the
/// window. A bake renders into a fresh texture that replaces the current one
/// only once the GPU accepted every command, so a failed bake leaves the last
/// good image in place.
pub struct OffscreenCompositor {
    program: BakeProgram,
    path: BakePath,
    uniform_buffer: wgpu::Buffer,
    target: EquirectTarget,
    baked: bool,
}

impl OffscreenCompositor {
    pub fn new(ctx: &GpuContext, size: UVec2) -> Result<Self, RenderError> {
        if size.x == 0 || size.y == 0 {
            return Err(RenderError::InvalidConfig(format!(
                "target size must be non-zero, got {}x{}",
                size.x, size.y
            )));
        }
        let limit = ctx.device.limits().max_texture_dimension_2d;
        if size.x > limit || size.y > limit {
            return Err(RenderError::TargetTooLarge {
                width: size.x,
                height: size.y,
                limit,
            });
        }

        let path = ctx.bake_path().ok_or(RenderError::UnsupportedTarget {
            format: TextureHelper::TARGET_FORMAT,
            usages: ctx.target_usages,
        })?;

        let program = match path {
            BakePath::Render => BakeProgram::Render(ctx.validated("equirect bake pipeline", |device| {
                EquirectProgram::new(
                    &GpuProgramRenderContext {
                        device,
                        queue: &ctx.queue,
                        format: TextureHelper::TARGET_FORMAT,
                    },
                    &(),
                )
            })?),
            BakePath::Compute => BakeProgram::Compute(
                ctx.validated("equirect compute pipeline", EquirectComputeProgram::new)?,
            ),
        };

        let uniform_buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Bake Uniform Buffer"),
                contents: bytemuck::bytes_of(&BakeUniform::zeroed()),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });

        let target = allocate_target(ctx, size, path)?;
        log::debug!("Allocated {}x{} equirect target, {path:?} bake", size.x, size.y);

        Ok(Self {
            program,
            path,
            uniform_buffer,
            target,
            baked: false,
        })
    }

    /// Resamples `probe` into the target. Deterministic: the same probe and
    /// mapping always produce the same texels.
    pub fn bake(&mut self, ctx: &GpuContext, probe: &ProbeTexture) -> Result<(), RenderError> {
        // Input problems never reach the GPU.
        probe.mapping().validate()?;
        let probe_size = probe.size();
        if probe_size.x == 0 || probe_size.y == 0 {
            return Err(RenderError::EmptyProbe {
                width: probe_size.x,
                height: probe_size.y,
            });
        }

        let size = self.resolution();
        let fresh = allocate_target(ctx, size, self.path)?;

        ctx.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let uniform = BakeUniform::new(size, probe);
        ctx.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniform));

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Equirect Bake Encoder"),
            });
        match &self.program {
            BakeProgram::Render(program) => {
                let bind_group =
                    program.create_bind_group(&ctx.device, &self.uniform_buffer, probe);
                let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Equirect Bake Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &fresh.view,
                        resolve_target: None,
                        depth_slice: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    ..Default::default()
                });
                program.record(&mut render_pass, &bind_group);
            }
            BakeProgram::Compute(program) => {
                let bind_group = program.create_bind_group(
                    &ctx.device,
                    &self.uniform_buffer,
                    probe,
                    &fresh.view,
                );
                let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                    label: Some("Equirect Bake Compute Pass"),
                    timestamp_writes: None,
                });
                program.dispatch(&mut cpass, &bind_group, size);
            }
        }
        ctx.queue.submit(std::iter::once(encoder.finish()));

        if let Some(err) = pollster::block_on(ctx.device.pop_error_scope()) {
            log::error!("Equirect bake rejected by the device: {err}");
            return Err(RenderError::Allocation(err.to_string()));
        }

        self.target = fresh;
        self.baked = true;
        log::info!(
            "Baked {}x{} {} probe into {}x{} equirect",
            probe_size.x,
            probe_size.y,
            probe.mapping().kind,
            size.x,
            size.y
        );
        Ok(())
    }

    /// True once a bake has completed. Stays true after later failures.
    pub fn is_baked(&self) -> bool {
        self.baked
    }

    pub fn bake_path(&self) -> BakePath {
        self.path
    }

    pub fn resolution(&self) -> UVec2 {
        self.target.size()
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.target.view
    }

    pub fn texture(&self) -> &wgpu::Texture {
        &self.target.texture
    }
}

/// Creates a target, turning an out-of-memory device error into a
/// [`RenderError::Allocation`].
fn allocate_target(
    ctx: &GpuContext,
    size: UVec2,
    path: BakePath,
) -> Result<EquirectTarget, RenderError> {
    ctx.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    let target = EquirectTarget::new(&ctx.device, size, path);
    match pollster::block_on(ctx.device.pop_error_scope()) {
        Some(err) => Err(RenderError::Allocation(format!(
            "{}x{} equirect target: {err}",
            size.x, size.y
        ))),
        None => Ok(target),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use wgpu::TextureUsages as U;

    #[rstest]
    #[case::renderable(U::RENDER_ATTACHMENT | U::STORAGE_BINDING | U::COPY_SRC, Some(BakePath::Render))]
    #[case::storage_only(U::STORAGE_BINDING | U::TEXTURE_BINDING | U::COPY_SRC | U::COPY_DST, Some(BakePath::Compute))]
    #[case::neither(U::TEXTURE_BINDING | U::COPY_SRC, None)]
    fn bake_path_follows_target_usages(#[case] usages: U, #[case] expected: Option<BakePath>) {
        assert_eq!(BakePath::select(usages), expected);
    }

    #[test]
    fn each_path_writes_through_its_own_usage() {
        assert_eq!(BakePath::Render.target_usage(), U::RENDER_ATTACHMENT);
        assert_eq!(BakePath::Compute.target_usage(), U::STORAGE_BINDING);
    }
}
