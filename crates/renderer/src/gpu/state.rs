use anyhow::Result;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::dpi::PhysicalSize;

use crate::compile::ShaderError;
use crate::runtime::TimeSample;

use super::canvas::Canvas;
use super::context::GpuContext;
use super::pipeline::{PipelineLayouts, ShaderPipeline};
use super::uniforms::ShadertoyUniforms;

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.1,
    g: 0.1,
    b: 0.1,
    a: 1.0,
};

/// Owns every GPU resource needed to present a frame.
pub(crate) struct GpuState {
    context: GpuContext,
    layouts: PipelineLayouts,
    pipeline: ShaderPipeline,
    canvas: Canvas,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniforms: ShadertoyUniforms,
}

impl GpuState {
    /// Sets up the device and links `fragment_body`. Compile and link
    /// failures surface as [`ShaderError`] inside the returned error.
    pub(crate) fn new<T>(
        target: &T,
        initial_size: PhysicalSize<u32>,
        fragment_body: &str,
        vsync: bool,
    ) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let context = GpuContext::new(target, initial_size, vsync)?;
        let layouts = PipelineLayouts::new(&context.device)?;
        let pipeline = ShaderPipeline::new(
            &context.device,
            &context.queue,
            &layouts,
            context.surface_format,
            fragment_body,
        )?;
        let canvas = Canvas::new(&context.device);

        let uniform_buffer = context.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniform buffer"),
            size: std::mem::size_of::<ShadertoyUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = context
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("uniform bind group"),
                layout: &layouts.uniform_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });

        let uniforms = ShadertoyUniforms::new(context.size.width, context.size.height);
        context
            .queue
            .write_buffer(&uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        Ok(Self {
            context,
            layouts,
            pipeline,
            canvas,
            uniform_buffer,
            uniform_bind_group,
            uniforms,
        })
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.context.resize(new_size);
        self.uniforms.set_resolution(new_size.width, new_size.height);
    }

    /// Rebuilds the swapchain after it was lost or became outdated.
    pub(crate) fn recover_surface(&mut self) {
        self.context.reconfigure();
    }

    /// Replaces the active program. On failure the previous one keeps running.
    pub(crate) fn reload(&mut self, fragment_body: &str) -> Result<(), ShaderError> {
        let pipeline = ShaderPipeline::new(
            &self.context.device,
            &self.context.queue,
            &self.layouts,
            self.context.surface_format,
            fragment_body,
        )?;
        self.pipeline = pipeline;
        Ok(())
    }

    /// Uploads this frame's uniforms, draws the quad and presents.
    pub(crate) fn render(
        &mut self,
        sample: TimeSample,
        mouse: [f32; 4],
    ) -> Result<(), wgpu::SurfaceError> {
        self.uniforms.apply_time(sample);
        self.uniforms.set_mouse(mouse);
        self.uniforms.refresh_date();
        self.context.queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&self.uniforms),
        );

        let frame = self.context.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("render pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_pipeline(&self.pipeline.pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            render_pass.set_bind_group(1, &self.pipeline.channel_bind_group, &[]);
            self.canvas.draw(&mut render_pass);
        }

        self.context.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}
