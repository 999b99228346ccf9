use glam::UVec2;
use wgpu::{BindGroupLayout, ComputePipeline};

use crate::programs::equirect_program::bake_layout_entries;
use crate::programs::shader_source;
use crate::texture::{ProbeTexture, TextureHelper};

/// Side of the square workgroup in `equirect_compute.wgsl`.
pub const BAKE_WORKGROUP: u32 = 8;

/// The bake for adapters that cannot render to `Rgba32Float`: one invocation
/// per target texel, stored straight into the target.
pub struct EquirectComputeProgram {
    pipeline: ComputePipeline,
    bind_group_layout: BindGroupLayout,
}

impl EquirectComputeProgram {
    pub fn new(device: &wgpu::Device) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Equirect Bake Compute Shader"),
            source: wgpu::ShaderSource::Wgsl(
                shader_source(&[
                    include_str!("../shaders/bake.wgsl"),
                    include_str!("../shaders/equirect_compute.wgsl"),
                ])
                .into(),
            ),
        });

        let [uniform_entry, probe_entry] = bake_layout_entries(wgpu::ShaderStages::COMPUTE);
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Equirect Bake Compute Layout"),
            entries: &[
                uniform_entry,
                probe_entry,
                // 2: The fresh target
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format: TextureHelper::TARGET_FORMAT,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Equirect Bake Compute Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Equirect Bake Compute Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("cs_main"),
            compilation_options: Default::default(),
            cache: None,
        });

        Self {
            pipeline,
            bind_group_layout,
        }
    }

    pub fn create_bind_group(
        &self,
        device: &wgpu::Device,
        uniform: &wgpu::Buffer,
        probe: &ProbeTexture,
        target: &wgpu::TextureView,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Equirect Bake Compute Bind Group"),
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
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(target),
                },
            ],
        })
    }

    pub fn dispatch(&self, cpass: &mut wgpu::ComputePass<'_>, bind_group: &wgpu::BindGroup, size: UVec2) {
        let groups = workgroups_for(size);
        cpass.set_pipeline(&self.pipeline);
        cpass.set_bind_group(0, bind_group, &[]);
        cpass.dispatch_workgroups(groups.x, groups.y, 1);
    }
}

/// Workgroups covering every texel of a `size` target.
pub fn workgroups_for(size: UVec2) -> UVec2 {
    UVec2::new(
        size.x.div_ceil(BAKE_WORKGROUP),
        size.y.div_ceil(BAKE_WORKGROUP),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(UVec2::new(1, 1), UVec2::new(1, 1))]
    #[case(UVec2::new(64, 32), UVec2::new(8, 4))]
    #[case(UVec2::new(1024, 1023), UVec2::new(128, 128))]
    fn dispatch_covers_the_target(#[case] size: UVec2, #[case] groups: UVec2) {
        assert_eq!(workgroups_for(size), groups);
    }
}
