use equiprobe_core::{PreviewMode, ViewState};
use glam::{UVec2, Vec2};
use wgpu::{BindGroupLayout, RenderPipeline};

use crate::programs::{GpuProgram, GpuProgramRenderContext, fullscreen_primitive, shader_source};

/// Layout matches `PreviewUniform` in `preview.wgsl`. The rotation is stored
/// as three padded columns.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PreviewUniform {
    pub viewport: [f32; 2],
    pub target_size: [f32; 2],
    pub pan: [f32; 2],
    pub zoom: f32,
    pub aspect: f32,
    pub rotation: [[f32; 4]; 3],
    pub tan_half_fov: f32,
    pub exposure: f32,
    pub mode: u32,
    pub encode_srgb: u32,
}

impl PreviewUniform {
    pub fn new(
        view: &ViewState,
        mode: PreviewMode,
        viewport: UVec2,
        target_size: UVec2,
        exposure: f32,
        encode_srgb: bool,
    ) -> Self {
        let viewport = viewport.max(UVec2::ONE).as_vec2();
        let rotation = view.rotation();
        let column = |c: glam::Vec3| [c.x, c.y, c.z, 0.0];
        Self {
            viewport: viewport.to_array(),
            target_size: target_size.max(UVec2::ONE).as_vec2().to_array(),
            pan: view.pan().to_array(),
            zoom: view.zoom(),
            aspect: viewport.x / viewport.y,
            rotation: [
                column(rotation.x_axis),
                column(rotation.y_axis),
                column(rotation.z_axis),
            ],
            tan_half_fov: (0.5 * view.fov()).tan(),
            exposure,
            mode: mode.tag(),
            encode_srgb: encode_srgb as u32,
        }
    }

    pub fn pan(&self) -> Vec2 {
        Vec2::from_array(self.pan)
    }
}

/// Draws the preview into the host's color attachment.
pub struct PreviewProgram {
    pipeline: RenderPipeline,
    bind_group_layout: BindGroupLayout,
    format: wgpu::TextureFormat,
}

impl PreviewProgram {
    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn create_bind_group(
        &self,
        device: &wgpu::Device,
        uniform: &wgpu::Buffer,
        target: &wgpu::TextureView,
        probe: &wgpu::TextureView,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Preview Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(target),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(probe),
                },
            ],
        })
    }

    fn create_bind_group_layout(device: &wgpu::Device) -> BindGroupLayout {
        // Both textures are read with textureLoad, so float32 formats bind.
        let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                multisampled: false,
                view_dimension: wgpu::TextureViewDimension::D2,
                sample_type: wgpu::TextureSampleType::Float { filterable: false },
            },
            count: None,
        };

        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Preview Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<PreviewUniform>() as u64,
                        ),
                    },
                    count: None,
                },
                // 1: Equirect target, 2: light probe
                texture_entry(1),
                texture_entry(2),
            ],
        })
    }
}

impl GpuProgram for PreviewProgram {
    type InitData = ();

    type DrawData<'a> = &'a wgpu::BindGroup;

    fn new(ctx: &GpuProgramRenderContext, _init_data: &Self::InitData) -> Self {
        let shader = ctx
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Preview Shader"),
                source: wgpu::ShaderSource::Wgsl(
                    shader_source(&[include_str!("../shaders/preview.wgsl")]).into(),
                ),
            });

        let bind_group_layout = Self::create_bind_group_layout(ctx.device);

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Preview Pipeline Layout"),
                bind_group_layouts: &[&bind_group_layout],
                push_constant_ranges: &[],
            });

        let pipeline = ctx
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                cache: None,
                label: Some("Preview Pipeline"),
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
                        blend: Some(wgpu::BlendState::REPLACE),
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
            format: ctx.format,
        }
    }

    fn record<'a>(&'a self, render_pass: &mut wgpu::RenderPass<'a>, bind_group: Self::DrawData<'a>) {
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, bind_group, &[]);
        render_pass.draw(0..3, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_matches_shader_layout() {
        assert_eq!(std::mem::size_of::<PreviewUniform>(), 96);
        assert_eq!(std::mem::offset_of!(PreviewUniform, rotation), 32);
        assert_eq!(std::mem::offset_of!(PreviewUniform, tan_half_fov), 80);
    }

    #[test]
    fn pointer_moves_reach_the_uniform() {
        let mut view = ViewState::default();
        let still = PreviewUniform::new(
            &view,
            PreviewMode::Flat,
            UVec2::new(800, 600),
            UVec2::new(1024, 1024),
            1.0,
            true,
        );
        view.on_pointer_move(Vec2::new(700.0, 100.0), Vec2::new(800.0, 600.0));
        let moved = PreviewUniform::new(
            &view,
            PreviewMode::Flat,
            UVec2::new(800, 600),
            UVec2::new(1024, 1024),
            1.0,
            true,
        );
        assert_ne!(still.pan(), moved.pan());
        assert_ne!(still.rotation, moved.rotation);
        assert_eq!(moved.aspect, 800.0 / 600.0);
    }
}
