mod args;

use std::process::ExitCode;

use clap::Parser;
use equiprobe_assets::AssetError;
use equiprobe_renderer::{GpuContext, OffscreenHost, ProbeRenderer, RenderError};
use equiprobe_window::{ViewerOptions, WindowError, run_viewer};
use thiserror::Error;

use crate::args::Args;

#[derive(Debug, Error)]
enum AppError {
    #[error("cannot load probe: {0}")]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Window(#[from] WindowError),
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            let mut source = std::error::Error::source(&err);
            while let Some(cause) = source {
                log::error!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), AppError> {
    let config = args.renderer_config();
    let probe = equiprobe_assets::load_probe(&args.probe)?;

    if args.headless {
        return bake_headless(args, config, &probe);
    }

    run_viewer(ViewerOptions {
        title: format!("equiprobe - {}", args.probe.display()),
        probe,
        config,
        export_path: args.output.clone(),
    })?;
    Ok(())
}

/// Bake once and write the result; no window, no surface.
fn bake_headless(
    args: &Args,
    config: equiprobe_core::RendererConfig,
    probe: &equiprobe_core::HdrImage,
) -> Result<(), AppError> {
    let gpu = GpuContext::headless()?;
    let host = OffscreenHost::new(&gpu.device, 1, 1);
    let mut renderer = ProbeRenderer::new(gpu, &host, config)?;

    renderer.set_probe_image(probe)?;
    renderer.bake_now()?;
    let format = renderer.export_to(&args.output)?;

    log::info!("Wrote {} ({})", args.output.display(), format.name());
    Ok(())
}
