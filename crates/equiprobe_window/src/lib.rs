use std::{path::PathBuf, sync::Arc};

use equiprobe_core::{HdrImage, RendererConfig};
use equiprobe_renderer::{GpuContext, HostView, ProbeRenderer, RenderError, SurfaceTarget};
use glam::Vec2;
use thiserror::Error;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

#[derive(Debug, Error)]
pub enum WindowError {
    #[error("event loop failed: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("cannot open window: {0}")]
    CreateWindow(#[from] winit::error::OsError),

    #[error("cannot create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("surface does not support any format")]
    NoSurfaceFormat,

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// What the viewer window shows and where `S` writes to.
pub struct ViewerOptions {
    pub title: String,
    pub probe: HdrImage,
    pub config: RendererConfig,
    pub export_path: PathBuf,
}

/// Keyboard commands the window understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shortcut {
    CyclePreviewMode,
    Export,
    Exit,
}

impl Shortcut {
    pub fn from_key(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::Tab => Some(Shortcut::CyclePreviewMode),
            KeyCode::KeyS => Some(Shortcut::Export),
            KeyCode::Escape => Some(Shortcut::Exit),
            _ => None,
        }
    }
}

/// The window as the renderer sees it.
struct WindowHost {
    window: Arc<Window>,
    surface_config: wgpu::SurfaceConfiguration,
}

impl HostView for WindowHost {
    fn surface_target(&self) -> SurfaceTarget {
        SurfaceTarget::new(
            self.surface_config.format,
            self.surface_config.width,
            self.surface_config.height,
        )
    }

    fn request_redraw(&self) {
        self.window.request_redraw();
    }
}

struct ViewerState {
    host: WindowHost,
    surface: wgpu::Surface<'static>,
    renderer: ProbeRenderer,
}

impl ViewerState {
    fn new(event_loop: &ActiveEventLoop, options: &ViewerOptions) -> Result<Self, WindowError> {
        // 1. Create the Window
        let window = Arc::new(
            event_loop.create_window(
                Window::default_attributes()
                    .with_title(options.title.clone())
                    .with_inner_size(LogicalSize::new(1280.0, 720.0)),
            )?,
        );

        // 2. Create the Surface (the canvas on the window)
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance.create_surface(window.clone())?;

        // 3. Adapter + Device that can present to it
        let adapter = GpuContext::request_adapter(&instance, Some(&surface))?;
        let gpu = GpuContext::from_adapter(&adapter)?;

        // 4. Configure the Surface
        let size = window.inner_size();
        let caps = surface.get_capabilities(&adapter);
        let format = *caps.formats.first().ok_or(WindowError::NoSurfaceFormat)?;
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format, // Usually sRGB; the preview encodes by hand otherwise
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo, // VSync On
            desired_maximum_frame_latency: 2,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
        };
        surface.configure(&gpu.device, &surface_config);

        let host = WindowHost {
            window,
            surface_config,
        };

        // 5. Renderer + probe
        let mut renderer = ProbeRenderer::new(gpu, &host, options.config.clone())?;
        renderer.set_probe_image(&options.probe)?;

        Ok(Self {
            host,
            surface,
            renderer,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            // Minimised; keep the old configuration.
            return;
        }
        self.host.surface_config.width = width;
        self.host.surface_config.height = height;
        self.surface
            .configure(&self.renderer.gpu().device, &self.host.surface_config);
        if let Err(err) = self.renderer.resize(self.host.surface_target()) {
            self.report(&err);
        }
        self.host.request_redraw();
    }

    fn redraw(&mut self) {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface
                    .configure(&self.renderer.gpu().device, &self.host.surface_config);
                self.host.request_redraw();
                return;
            }
            Err(err) => {
                log::warn!("Skipping frame: {err}");
                return;
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        if let Err(err) = self.renderer.draw(&view) {
            self.report(&err);
        }
        self.host.window.pre_present_notify();
        frame.present();
    }

    fn shortcut(&mut self, shortcut: Shortcut, options: &ViewerOptions, event_loop: &ActiveEventLoop) {
        match shortcut {
            Shortcut::CyclePreviewMode => {
                let mode = self.renderer.preview_mode().next();
                self.renderer.set_preview_mode(mode);
                self.host
                    .window
                    .set_title(&format!("{} [{mode}]", options.title));
                self.host.request_redraw();
            }
            Shortcut::Export => match self.renderer.export_to(&options.export_path) {
                Ok(format) => self.host.window.set_title(&format!(
                    "{} (saved {} to {})",
                    options.title,
                    format.name(),
                    options.export_path.display()
                )),
                Err(err) => self.report(&err),
            },
            Shortcut::Exit => event_loop.exit(),
        }
    }

    /// Keeps the window alive and shows the failure in its title.
    fn report(&self, err: &RenderError) {
        log::error!("{err}");
        self.host.window.set_title(&format!("equiprobe: {err}"));
    }
}

// The State Machine that holds the renderer while waiting for the OS
struct ViewerRunner {
    options: ViewerOptions,
    state: Option<ViewerState>,
    error: Option<WindowError>,
}

impl ApplicationHandler for ViewerRunner {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        match ViewerState::new(event_loop, &self.options) {
            Ok(state) => {
                state.host.request_redraw();
                self.state = Some(state);
            }
            Err(err) => {
                log::error!("Viewer start-up failed: {err}");
                self.error = Some(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Window closed; stopping");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::CursorMoved { position, .. } => {
                state
                    .renderer
                    .on_pointer_move(Vec2::new(position.x as f32, position.y as f32));
                state.host.request_redraw();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if let Some(shortcut) = Shortcut::from_key(code) {
                    state.shortcut(shortcut, &self.options, event_loop);
                }
            }
            WindowEvent::RedrawRequested => state.redraw(),
            _ => (),
        }
    }
}

/// Opens the preview window and blocks until it is closed.
pub fn run_viewer(options: ViewerOptions) -> Result<(), WindowError> {
    let event_loop = EventLoop::new()?;

    // The preview only changes on input, so sleep between events.
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut runner = ViewerRunner {
        options,
        state: None,
        error: None,
    };
    event_loop.run_app(&mut runner)?;

    match runner.error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(KeyCode::Tab, Some(Shortcut::CyclePreviewMode))]
    #[case(KeyCode::KeyS, Some(Shortcut::Export))]
    #[case(KeyCode::Escape, Some(Shortcut::Exit))]
    #[case(KeyCode::KeyA, None)]
    fn shortcuts(#[case] code: KeyCode, #[case] expected: Option<Shortcut>) {
        assert_eq!(Shortcut::from_key(code), expected);
    }
}
