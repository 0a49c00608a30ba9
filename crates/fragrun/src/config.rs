use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use directories_next::ProjectDirs;
use renderer::RendererConfig;
use serde::Deserialize;

use crate::cli::RunArgs;

const QUALIFIER: &str = "org";
const ORGANISATION: &str = "fragrun";
const APPLICATION: &str = "fragrun";
const CONFIG_FILE: &str = "config.toml";

/// Settings read from `config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub shader: Option<PathBuf>,
    pub size: Option<String>,
    pub title: Option<String>,
    pub fps: Option<f32>,
    pub vsync: Option<bool>,
}

impl FileConfig {
    /// Reads and parses `path`. Relative shader paths are resolved against
    /// the directory holding the file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file at {}", path.display()))?;
        let mut config: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file at {}", path.display()))?;

        if let (Some(shader), Some(dir)) = (config.shader.as_mut(), path.parent()) {
            if shader.is_relative() {
                *shader = dir.join(&*shader);
            }
        }
        Ok(config)
    }

    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Per-user config file location, e.g. `~/.config/fragrun/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from(QUALIFIER, ORGANISATION, APPLICATION)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

/// Loads the file named on the command line, which must exist, or else the
/// per-user file when present.
pub fn discover(explicit: Option<&Path>) -> Result<FileConfig> {
    if let Some(path) = explicit {
        return FileConfig::load(path);
    }
    match default_config_path() {
        Some(path) => {
            tracing::debug!(path = %path.display(), "looking for config file");
            FileConfig::load_or_default(&path)
        }
        None => Ok(FileConfig::default()),
    }
}

/// Merges command line flags over the config file over built-in defaults.
pub fn build_renderer_config(args: &RunArgs, file: &FileConfig) -> Result<RendererConfig> {
    let defaults = RendererConfig::default();

    let surface_size = match args.size.as_deref().or(file.size.as_deref()) {
        Some(value) => parse_window_size(value)
            .with_context(|| format!("invalid window size '{value}'"))?,
        None => defaults.surface_size,
    };
    let target_fps = args
        .fps
        .or(file.fps)
        .filter(|fps| fps.is_finite() && *fps > 0.0);

    Ok(RendererConfig {
        surface_size,
        shader_source: args
            .shader
            .clone()
            .or_else(|| file.shader.clone())
            .unwrap_or(defaults.shader_source),
        title: args
            .title
            .clone()
            .or_else(|| file.title.clone())
            .unwrap_or(defaults.title),
        target_fps,
        vsync: !args.no_vsync && file.vsync.unwrap_or(defaults.vsync),
        start_paused: args.paused,
    })
}

/// Parses `--size` / `size = "..."` values such as `1280x720`.
pub fn parse_window_size(value: &str) -> Result<(u32, u32)> {
    let Some((width, height)) = value.trim().split_once(['x', 'X', '×']) else {
        bail!("window size must look like WIDTHxHEIGHT, e.g. 800x600");
    };
    Ok((
        parse_dimension(width, "width")?,
        parse_dimension(height, "height")?,
    ))
}

fn parse_dimension(value: &str, axis: &str) -> Result<u32> {
    match value.trim().parse::<u32>() {
        Ok(0) => bail!("window {axis} must be at least one pixel"),
        Ok(pixels) => Ok(pixels),
        Err(_) => bail!("window {axis} '{}' is not a pixel count", value.trim()),
    }
}
