use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use tracing::{error, info, warn};
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowBuilder};

use crate::compile::load_fragment;
use crate::gpu::GpuState;
use crate::runtime::{FrameClock, FrameScheduler};
use crate::types::RendererConfig;

/// Aggregates GPU state, timing and input for the preview window.
///
/// `gpu` is declared before `window` so the surface is dropped first.
pub(crate) struct WindowState {
    gpu: GpuState,
    window: Arc<Window>,
    clock: FrameClock,
    scheduler: FrameScheduler,
    mouse: MouseState,
}

impl WindowState {
    pub(crate) fn new(window: Arc<Window>, config: &RendererConfig, body: &str) -> Result<Self> {
        let size = window.inner_size();
        let gpu = GpuState::new(window.as_ref(), size, body, config.vsync)?;
        Ok(Self {
            gpu,
            window,
            clock: FrameClock::new(config.start_paused),
            scheduler: FrameScheduler::new(config.target_fps),
            mouse: MouseState::default(),
        })
    }

    pub(crate) fn window(&self) -> &Window {
        self.window.as_ref()
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.gpu.size()
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.gpu.resize(new_size);
    }

    pub(crate) fn render_frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        let now = Instant::now();
        let sample = self.clock.tick(now);
        let mouse = self.mouse.as_uniform(self.size().height.max(1) as f32);
        self.gpu.render(sample, mouse)?;
        self.mouse.end_frame();
        self.scheduler.mark_rendered(now);
        Ok(())
    }

    /// Recompiles the shader file; the running program survives failures.
    pub(crate) fn reload(&mut self, path: &Path) {
        let body = match load_fragment(path) {
            Ok(body) => body,
            Err(err) => {
                error!(path = %path.display(), "{err}");
                return;
            }
        };
        match self.gpu.reload(&body) {
            Ok(()) => info!(path = %path.display(), "shader reloaded"),
            Err(err) => error!("{err}\nkeeping previous shader"),
        }
    }

    fn apply(&mut self, command: InputCommand, config: &RendererConfig) {
        match command {
            InputCommand::Reload => self.reload(&config.shader_source),
            InputCommand::TogglePause => {
                let paused = self.clock.toggle_pause();
                info!(paused, "toggled playback");
            }
            InputCommand::ResetTime => {
                self.clock.reset();
                self.scheduler.reset();
                info!(paused = self.clock.is_paused(), "playback time reset");
            }
            InputCommand::Exit => {}
        }
    }
}

/// Opens the window, builds the GPU state and drives the event loop until
/// the window closes.
///
/// The window stays hidden until the shader compiled and linked, so a broken
/// shader never flashes an empty window.
pub(crate) fn run(config: &RendererConfig, body: &str) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to initialize event loop")?;
    let window_size = PhysicalSize::new(config.surface_size.0, config.surface_size.1);
    let window = WindowBuilder::new()
        .with_title(config.title.as_str())
        .with_inner_size(window_size)
        .with_visible(false)
        .build(&event_loop)
        .context("failed to create window")?;

    let mut state = WindowState::new(Arc::new(window), config, body)?;
    state.window().set_visible(true);
    state.window().request_redraw();
    info!(
        shader = %config.shader_source.display(),
        width = window_size.width,
        height = window_size.height,
        paused = state.clock.is_paused(),
        fps_capped = state.scheduler.is_capped(),
        "rendering shader"
    );

    let config = config.clone();
    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
                match event {
                    WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                        elwt.exit();
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        if event.state != ElementState::Pressed || event.repeat {
                            return;
                        }
                        match command_for_key(&event.logical_key) {
                            Some(InputCommand::Exit) => elwt.exit(),
                            Some(command) => {
                                state.apply(command, &config);
                                state.window().request_redraw();
                            }
                            None => {}
                        }
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        state.mouse.handle_cursor_moved(position);
                    }
                    WindowEvent::MouseInput {
                        state: button_state,
                        button: MouseButton::Left,
                        ..
                    } => {
                        state.mouse.handle_button(button_state);
                    }
                    WindowEvent::Resized(new_size) => {
                        state.resize(new_size);
                    }
                    WindowEvent::RedrawRequested => match state.render_frame() {
                        Ok(()) => {}
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            state.gpu.recover_surface();
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            error!("surface out of memory; exiting");
                            elwt.exit();
                        }
                        Err(wgpu::SurfaceError::Timeout) => {
                            warn!("surface timeout; retrying next frame");
                        }
                        Err(other) => {
                            warn!("surface error: {other:?}; retrying next frame");
                        }
                    },
                    _ => {}
                }
            }
            Event::AboutToWait => {
                let now = Instant::now();
                if state.scheduler.ready_for_frame(now) {
                    state.window().request_redraw();
                    elwt.set_control_flow(ControlFlow::Wait);
                } else if let Some(deadline) = state.scheduler.next_deadline() {
                    elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
                } else {
                    elwt.set_control_flow(ControlFlow::Wait);
                }
            }
            _ => {}
        })
        .map_err(|err| anyhow!("event loop error: {err}"))
}

/// Actions bound to keys in the preview window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputCommand {
    Reload,
    TogglePause,
    ResetTime,
    Exit,
}

pub(crate) fn command_for_key(key: &Key) -> Option<InputCommand> {
    match key {
        Key::Named(NamedKey::Escape) => Some(InputCommand::Exit),
        Key::Named(NamedKey::F5) => Some(InputCommand::Reload),
        Key::Named(NamedKey::Space) => Some(InputCommand::TogglePause),
        Key::Named(NamedKey::Backspace) => Some(InputCommand::ResetTime),
        Key::Character(value) => match value.as_str() {
            "r" | "R" => Some(InputCommand::Reload),
            " " => Some(InputCommand::TogglePause),
            _ => None,
        },
        _ => None,
    }
}

/// Tracks the left button for `iMouse`.
///
/// Follows ShaderToy: `xy` is the cursor while the button is held, `zw` the
/// click position. `z` is negative once the button is released and `w` is
/// positive only on the frame right after the click.
#[derive(Debug, Default)]
pub(crate) struct MouseState {
    position: Option<PhysicalPosition<f64>>,
    drag: Option<PhysicalPosition<f64>>,
    click: Option<PhysicalPosition<f64>>,
    is_pressed: bool,
    click_pending: bool,
}

impl MouseState {
    pub(crate) fn handle_cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        self.position = Some(position);
        if self.is_pressed {
            self.drag = Some(position);
        }
    }

    pub(crate) fn handle_button(&mut self, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.is_pressed = true;
                if let Some(pos) = self.position {
                    self.drag = Some(pos);
                    self.click = Some(pos);
                    self.click_pending = true;
                }
            }
            ElementState::Released => {
                self.is_pressed = false;
            }
        }
    }

    pub(crate) fn as_uniform(&self, height: f32) -> [f32; 4] {
        let mut data = [0.0; 4];

        if let Some(pos) = self.drag {
            data[0] = pos.x as f32;
            data[1] = height - pos.y as f32;
        }

        if let Some(click) = self.click {
            let x = click.x as f32;
            let y = height - click.y as f32;
            data[2] = if self.is_pressed { x } else { -x };
            data[3] = if self.click_pending { y } else { -y };
        }

        data
    }

    /// Clears the one-frame click flag after a frame was presented.
    pub(crate) fn end_frame(&mut self) {
        self.click_pending = false;
    }
}
