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

use std::cell::RefCell;
use std::rc::Rc;

use crate::gpu_context::GpuContext;
use crate::sample::{Sample, SampleContext, ShaderMap};
use crate::samples::GpuCaps;
use crate::shader::ShaderError;
use crate::ui::{PanelSpec, Workspace};

const SHADER_NAME: &str = "Triangle";
const DEFAULT_SHADER: &str = include_str!("shaders/triangle.wgsl");
const ENTRY_POINTS: &[&str] = &["vs_main", "fs_main"];

/// Static colored triangle with a single editable shader. No animation: it
/// only redraws on resize or reload.
pub struct Triangle {
    gpu: Rc<GpuContext>,
    workspace: Rc<RefCell<dyn Workspace>>,
    sources: ShaderMap,
    pipeline: Option<wgpu::RenderPipeline>,
}

impl Triangle {
    pub fn build(ctx: SampleContext<GpuCaps>) -> Box<dyn Sample> {
        Box::new(Self {
            gpu: ctx.caps,
            workspace: ctx.workspace,
            sources: ShaderMap::default(),
            pipeline: None,
        })
    }

    fn build_pipeline(&self, module: &wgpu::ShaderModule) -> wgpu::RenderPipeline {
        let device = &self.gpu.device;
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("triangle pipeline layout"),
            bind_group_layouts: &[],
            push_constant_ranges: &[],
        });
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("triangle pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module,
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
        })
    }
}

impl Sample for Triangle {
    fn initialize(&mut self) -> anyhow::Result<()> {
        self.reload(SHADER_NAME, DEFAULT_SHADER)?;
        self.workspace.borrow_mut().add_panel(PanelSpec {
            title: "Triangle".to_owned(),
            body: "A single hard-coded triangle.\nEdit the 'Triangle' shader to reshape it."
                .to_owned(),
        });
        Ok(())
    }

    fn draw(&mut self) -> anyhow::Result<()> {
        let Some(pipeline) = &self.pipeline else {
            return Ok(());
        };
        let frame = self.gpu.acquire_frame()?;
        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("triangle encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("triangle pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            render_pass.set_pipeline(pipeline);
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
        let module = self
            .gpu
            .create_shader_module(SHADER_NAME, shader_source, ENTRY_POINTS)?;
        self.pipeline = Some(self.build_pipeline(&module));
        self.sources
            .insert(SHADER_NAME.to_owned(), shader_source.to_owned());
        Ok(())
    }

    fn name(&self) -> &str {
        "Triangle"
    }
}
