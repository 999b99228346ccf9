use glam::UVec2;
use wgpu::{BindGroupLayout, RenderPipeline};

use crate::programs::{GpuProgram, GpuProgramRenderContext, fullscreen_primitive, shader_source};
use crate::texture::ProbeTexture;

/// Per-bake parameters. Layout matches `BakeUniform` in `bake.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BakeUniform {
    pub target_size: [f32; 2],
    pub probe_size: [f32; 2],
    pub kind: u32,
    pub fisheye_half_fov: f32,
    pub _pad: [f32; 2],
}

impl BakeUniform {
    pub fn new(target_size: UVec2, probe: &ProbeTexture) -> Self {
        let mapping = probe.mapping();
        Self {
            target_size: target_size.as_vec2().to_array(),
            probe_size: probe.size().as_vec2().to_array(),
            kind: mapping.kind.tag(),
            fisheye_half_fov: mapping.fisheye_half_fov(),
            _pad: [0.0; 2],
        }
    }
}

/// Uniform and probe entries both bake flavours share, visible to `stage`.
pub(crate) fn bake_layout_entries(stage: wgpu::ShaderStages) -> [wgpu::BindGroupLayoutEntry; 2] {
    [
        // 0: Bake parameters
        wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: stage,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<BakeUniform>() as u64),
            },
            count: None,
        },
        // 1: Light probe, filtered by hand
        wgpu::BindGroupLayoutEntry {
            binding: 1,
            visibility: stage,
            ty: wgpu::BindingType::Texture {
                multisampled: false,
                view_dimension: wgpu::TextureViewDimension::D2,
                sample_type: wgpu::TextureSampleType::Float { filterable: false },
            },
            count: None,
        },
    ]
}

/// Resamples a light probe into the equirect target with a single fullscreen
/// triangle.
pub struct EquirectProgram {
    pipeline: RenderPipeline,
    bind_group_layout: BindGroupLayout,
}

impl EquirectProgram {
    /// Bind group for one bake: uniform and probe view.
    pub fn create_bind_group(
        &self,
        device: &wgpu::Device,
        uniform: &wgpu::Buffer,
        probe: &ProbeTexture,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Equirect Bake Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(probe.view()),
                },
            ],
        })
    }
}

impl GpuProgram for EquirectProgram {
    type InitData = ();

    type DrawData<'a> = &'a wgpu::BindGroup;

    fn new(ctx: &GpuProgramRenderContext, _init_data: &Self::InitData) -> Self {
        let shader = ctx
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Equirect Bake Shader"),
                source: wgpu::ShaderSource::Wgsl(
                    shader_source(&[
                        include_str!("../shaders/bake.wgsl"),
                        include_str!("../shaders/equirect.wgsl"),
                    ])
                    .into(),
                ),
            });

        let bind_group_layout = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Equirect Bake Layout"),
                entries: &bake_layout_entries(wgpu::ShaderStages::FRAGMENT),
            });

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Equirect Bake Pipeline Layout"),
                bind_group_layouts: &[&bind_group_layout],
                push_constant_ranges: &[],
            });

        let pipeline = ctx
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                cache: None,
                label: Some("Equirect Bake Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: ctx.format,
                        // Overwrite, radiance is never blended
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: fullscreen_primitive(),
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
            });

        Self {
            pipeline,
            bind_group_layout,
        }
    }

    fn record<'a>(&'a self, render_pass: &mut wgpu::RenderPass<'a>, bind_group: Self::DrawData<'a>) {
        // 1. Set Pipeline
        render_pass.set_pipeline(&self.pipeline);

        // 2. Bind probe + parameters (Group 0)
        render_pass.set_bind_group(0, bind_group, &[]);

        // 3. Fullscreen triangle
        render_pass.draw(0..3, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_matches_shader_layout() {
        assert_eq!(std::mem::size_of::<BakeUniform>(), 32);
        assert_eq!(std::mem::size_of::<BakeUniform>() % 16, 0);
    }
}
