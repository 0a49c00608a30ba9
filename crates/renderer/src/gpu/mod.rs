//! GPU orchestration for the single-pass quad renderer.
//!
//! - `context` owns wgpu instance/device/surface wiring and rebuilds the
//!   swapchain when the window resizes.
//! - `canvas` uploads the full-screen quad's vertex and index buffers.
//! - `channels` creates the placeholder textures behind `iChannel0-3`.
//! - `pipeline` links the wrapped fragment shader with the quad vertex shader.
//! - `uniforms` mirrors the injected uniform block.
//! - `state` glues everything together and exposes the `GpuState` API used by
//!   `window`.

mod canvas;
mod channels;
mod context;
mod pipeline;
mod state;
mod uniforms;

pub(crate) use state::GpuState;
