//! Renderer crate for fragrun.
//!
//! Glues the `winit` window, the `wgpu` pipeline and ShaderToy-style shader
//! wrapping together. The overall flow is:
//!
//! ```text
//!   fragrun CLI
//!        │ RendererConfig
//!        ▼
//!   Renderer::run ──▶ load_fragment ──▶ WindowState ──▶ winit event loop
//!                                           │                 │
//!                                           │                 └─▶ render_frame()
//!                                           └─▶ GpuState (quad, pipeline, uniforms)
//! ```
//!
//! The user file only supplies `mainImage`; [`wrap_fragment`] adds the
//! uniform declarations and the `main()` trampoline before compilation.

mod compile;
mod gpu;
mod runtime;
mod types;
mod window;

use anyhow::Result;

pub use compile::{load_fragment, validate, wrap_fragment, ShaderError, ShaderStage};
pub use runtime::{FrameClock, FrameScheduler, TimeSample};
pub use types::{RendererConfig, CHANNEL_COUNT, SAMPLE_RATE};

/// Entry point that owns the configuration for one preview session.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Reads the shader, opens the window and renders until it is closed.
    ///
    /// The shader file is read before any window exists, so a missing file
    /// fails fast. Compile and link failures are returned with the
    /// [`ShaderError`] in the error chain.
    pub fn run(&mut self) -> Result<()> {
        let body = load_fragment(&self.config.shader_source)?;
        window::run(&self.config, &body)
    }
}
