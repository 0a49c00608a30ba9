use std::path::PathBuf;

/// ShaderToy exposes four optional input channels (`iChannel0-3`).
pub const CHANNEL_COUNT: usize = 4;

/// Sample rate reported through `iSampleRate`.
pub const SAMPLE_RATE: f32 = 44_100.0;

/// Immutable configuration passed to the renderer at start-up.
///
/// `RendererConfig` mirrors the resolved CLI/config-file values and tells the
/// renderer which shader file to compile and how to present it.
#[derive(Clone, Debug, PartialEq)]
pub struct RendererConfig {
    /// Initial window size in physical pixels.
    pub surface_size: (u32, u32),
    /// Path to the file holding the `mainImage` body.
    pub shader_source: PathBuf,
    /// Window title.
    pub title: String,
    /// Optional FPS cap; None renders as fast as presentation allows.
    pub target_fps: Option<f32>,
    /// Wait for vertical blank when presenting.
    pub vsync: bool,
    /// Start with the clock paused at zero.
    pub start_paused: bool,
}

impl Default for RendererConfig {
    /// An 800x600 vsynced window rendering `shd.frag`.
    fn default() -> Self {
        Self {
            surface_size: (800, 600),
            shader_source: PathBuf::from("shd.frag"),
            title: "fragrun".to_string(),
            target_fps: None,
            vsync: true,
            start_paused: false,
        }
    }
}
