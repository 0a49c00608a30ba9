use std::path::Path;

use anyhow::Result;
use renderer::{load_fragment, validate, wrap_fragment, Renderer, ShaderStage};
use tracing_subscriber::EnvFilter;

use crate::cli::RunArgs;
use crate::config;

pub fn run(args: RunArgs) -> Result<()> {
    let file_config = config::discover(args.config.as_deref())?;
    let renderer_config = config::build_renderer_config(&args, &file_config)?;
    tracing::debug!(config = ?renderer_config, "resolved fragrun configuration");

    let mut renderer = Renderer::new(renderer_config);
    renderer.run()
}

/// Wraps and validates the shader without touching the GPU.
pub fn check(shader: &Path) -> Result<()> {
    let body = load_fragment(shader)?;
    validate(ShaderStage::Fragment, &wrap_fragment(&body))?;
    println!("shader OK");
    Ok(())
}

pub fn wrap(shader: &Path) -> Result<()> {
    let body = load_fragment(shader)?;
    print!("{}", wrap_fragment(&body));
    Ok(())
}

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
