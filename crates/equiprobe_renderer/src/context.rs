use crate::{compositor::BakePath, error::RenderError, texture::TextureHelper};

/// Device and queue every component records into. One per renderer; all work
/// goes through this single command stream.
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    /// What the adapter lets the equirect target be used for. Decides how
    /// bakes write it.
    pub target_usages: wgpu::TextureUsages,
}

impl GpuContext {
    /// Wraps a device the host created. Assumes the WebGPU baseline for
    /// `Rgba32Float`, which can be rendered to and stored into.
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self {
            device,
            queue,
            target_usages: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::STORAGE_BINDING
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::COPY_DST,
        }
    }

    /// Adapter + device without any window, for batch bakes and tests.
    pub fn headless() -> Result<Self, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = Self::request_adapter(&instance, None)?;
        Self::from_adapter(&adapter)
    }

    /// We use 'pollster' to block on the async adapter request.
    pub fn request_adapter(
        instance: &wgpu::Instance,
        compatible_surface: Option<&wgpu::Surface<'_>>,
    ) -> Result<wgpu::Adapter, RenderError> {
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface,
            force_fallback_adapter: false,
        }))
        .map_err(|err| RenderError::Adapter(err.to_string()))?;

        let info = adapter.get_info();
        log::info!("Using GPU adapter {} ({:?})", info.name, info.backend);
        Ok(adapter)
    }

    pub fn from_adapter(adapter: &wgpu::Adapter) -> Result<Self, RenderError> {
        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Equiprobe Device"),
            ..Default::default()
        }))
        .map_err(|err| RenderError::Device(err.to_string()))?;

        let mut target_usages = adapter
            .get_texture_format_features(TextureHelper::TARGET_FORMAT)
            .allowed_usages;
        if !adapter
            .get_downlevel_capabilities()
            .flags
            .contains(wgpu::DownlevelFlags::COMPUTE_SHADERS)
        {
            // Storage writes are only reachable from compute.
            target_usages.remove(wgpu::TextureUsages::STORAGE_BINDING);
        }
        log::debug!(
            "{:?} target usages: {target_usages:?}",
            TextureHelper::TARGET_FORMAT
        );

        Ok(Self {
            device,
            queue,
            target_usages,
        })
    }

    /// How this device bakes, or `None` when it cannot write the target at all.
    pub fn bake_path(&self) -> Option<BakePath> {
        BakePath::select(self.target_usages)
    }

    /// Runs `build` inside a validation error scope so a rejected pipeline
    /// comes back as an error instead of reaching the uncaptured handler.
    pub(crate) fn validated<T>(
        &self,
        what: &str,
        build: impl FnOnce(&wgpu::Device) -> T,
    ) -> Result<T, RenderError> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let built = build(&self.device);
        match pollster::block_on(self.device.pop_error_scope()) {
            Some(err) => {
                log::error!("{what} rejected by the device: {err}");
                Err(RenderError::Pipeline(format!("{what}: {err}")))
            }
            None => Ok(built),
        }
    }
}
