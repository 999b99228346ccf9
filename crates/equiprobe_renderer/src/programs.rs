pub mod equirect_compute_program;
pub mod equirect_program;
pub mod preview_program;

pub use equirect_compute_program::EquirectComputeProgram;
pub use equirect_program::{BakeUniform, EquirectProgram};
pub use preview_program::{PreviewProgram, PreviewUniform};

/// Holds common WGPU references to simplify function signatures.
pub struct GpuProgramRenderContext<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub format: wgpu::TextureFormat, // The color attachment this program writes
}

pub trait GpuProgram {
    /// Data required to initialize the pipeline
    type InitData;

    /// Data required to draw a frame (bind group built for this pass)
    type DrawData<'a>
    where
        Self: 'a;

    /// 1. INIT: Compiles shaders, creates pipeline layouts and the pipeline itself.
    fn new(ctx: &GpuProgramRenderContext, init_data: &Self::InitData) -> Self;

    /// 2. RECORD: Encodes commands into the RenderPass.
    fn record<'a>(&'a self, rpass: &mut wgpu::RenderPass<'a>, data: Self::DrawData<'a>);
}

/// Shader source for a pass: the shared mapping functions followed by the
/// pass's own parts in order.
pub(crate) fn shader_source(parts: &[&str]) -> String {
    let mut source = String::from(include_str!("shaders/mapping.wgsl"));
    for part in parts {
        source.push('\n');
        source.push_str(part);
    }
    source
}

/// Both passes draw one oversized triangle and shade per pixel.
pub(crate) fn fullscreen_primitive() -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleList,
        strip_index_format: None,
        front_face: wgpu::FrontFace::Ccw,
        cull_mode: None,
        polygon_mode: wgpu::PolygonMode::Fill,
        unclipped_depth: false,
        conservative: false,
    }
}
