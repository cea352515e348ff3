/*
MIT License

Copyright (c) 2025 Vincent Hiribarren

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

use std::rc::Rc;

use cgmath::{Deg, Matrix4};
use web_time::Instant;
use wgpu::util::DeviceExt;

use crate::frame_loop::FrameLoop;
use crate::gpu_context::GpuContext;
use crate::sample::{Sample, SampleContext, ShaderMap};
use crate::samples::GpuCaps;
use crate::shader::ShaderError;

const SHADER_NAME: &str = "Orbit";
const DEFAULT_SHADER: &str = include_str!("shaders/orbit.wgsl");
const ENTRY_POINTS: &[&str] = &["vs_main", "fs_main"];
const ROTATION_DEG_PER_S: f32 = 45.0;

/// Rotating triangle driven by a transform uniform. Starts its animation
/// loop during initialization and keeps spinning until superseded.
pub struct Orbit {
    gpu: Rc<GpuContext>,
    frame_loop: Rc<FrameLoop>,
    sources: ShaderMap,
    started: Instant,
    aspect_ratio: f32,
    pipeline: Option<wgpu::RenderPipeline>,
    transform: Option<TransformBinding>,
}

struct TransformBinding {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    pipeline_layout: wgpu::PipelineLayout,
}

impl Orbit {
    pub fn build(ctx: SampleContext<GpuCaps>) -> Box<dyn Sample> {
        let aspect_ratio = ctx.caps.surface_ratio();
        Box::new(Self {
            gpu: ctx.caps,
            frame_loop: ctx.frame_loop,
            sources: ShaderMap::default(),
            started: Instant::now(),
            aspect_ratio,
            pipeline: None,
            transform: None,
        })
    }

    fn transform_matrix(&self) -> [[f32; 4]; 4] {
        let angle = ROTATION_DEG_PER_S * self.started.elapsed().as_secs_f32();
        let widen = if self.aspect_ratio > 0.0 {
            1.0 / self.aspect_ratio
        } else {
            1.0
        };
        (Matrix4::from_nonuniform_scale(widen, 1.0, 1.0) * Matrix4::from_angle_z(Deg(angle)))
            .into()
    }
}

impl Sample for Orbit {
    fn initialize(&mut self) -> anyhow::Result<()> {
        let device = &self.gpu.device;
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("orbit transform buffer"),
            contents: bytemuck::cast_slice(&[self.transform_matrix()]),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::UNIFORM,
        });
        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("orbit bind group layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("orbit bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("orbit pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        self.transform = Some(TransformBinding {
            buffer,
            bind_group,
            pipeline_layout,
        });
        self.reload(SHADER_NAME, DEFAULT_SHADER)?;
        self.frame_loop.animate();
        Ok(())
    }

    fn draw(&mut self) -> anyhow::Result<()> {
        let (Some(pipeline), Some(transform)) = (&self.pipeline, &self.transform) else {
            return Ok(());
        };
        self.gpu.queue.write_buffer(
            &transform.buffer,
            0,
            bytemuck::cast_slice(&[self.transform_matrix()]),
        );
        let frame = self.gpu.acquire_frame()?;
        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("orbit encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("orbit pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.02,
                            g: 0.02,
                            b: 0.05,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            render_pass.set_pipeline(pipeline);
            render_pass.set_bind_group(0, &transform.bind_group, &[]);
            render_pass.draw(0..3, 0..1);
        }
        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn shaders(&self) -> ShaderMap {
        self.sources.clone()
    }

    fn reload(&mut self, shader_name: &str, shader_source: &str) -> Result<(), ShaderError> {
        if shader_name != SHADER_NAME {
            return Ok(());
        }
        // The binding layout exists once initialize ran; reloads cannot
        // arrive earlier since the editor is synchronized afterwards.
        let Some(transform) = &self.transform else {
            return Ok(());
        };
        let module = self
            .gpu
            .create_shader_module(SHADER_NAME, shader_source, ENTRY_POINTS)?;
        let pipeline = self
            .gpu
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("orbit pipeline"),
                layout: Some(&transform.pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &module,
                    entry_point: Some("vs_main"),
                    buffers: &[],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &module,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.gpu.surface_format(),
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState::default(),
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });
        self.pipeline = Some(pipeline);
        self.sources
            .insert(SHADER_NAME.to_owned(), shader_source.to_owned());
        Ok(())
    }

    #[allow(clippy::cast_precision_loss)]
    fn resize(&mut self, width: u32, height: u32) {
        // The aspect-correction uniform is the size-dependent resource here;
        // its next upload happens right away so even an idle loop shows the
        // corrected triangle.
        if height > 0 {
            self.aspect_ratio = width as f32 / height as f32;
        }
        if let Some(transform) = &self.transform {
            self.gpu.queue.write_buffer(
                &transform.buffer,
                0,
                bytemuck::cast_slice(&[self.transform_matrix()]),
            );
        }
    }

    fn name(&self) -> &str {
        "Orbit"
    }
}
