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
use std::sync::Arc;

use anyhow::anyhow;
use log::debug;
use winit::window::Window;

use crate::shader::{self, ShaderError};
use crate::viewer::DrawSurface;

#[derive(Debug, Clone, Copy)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn surface_ratio(&self) -> f32 {
        if self.height > 0 {
            self.width as f32 / self.height as f32
        } else {
            1.0
        }
    }
}

enum DrawTarget {
    Texture(wgpu::Texture),
    Surface(wgpu::Surface<'static>),
}

impl DrawTarget {
    fn new_texture_target(device: &wgpu::Device, width: u32, height: u32) -> Self {
        Self::Texture(Self::create_texture(device, width, height))
    }
    fn configure(&mut self, device: &wgpu::Device, surface_config: &wgpu::SurfaceConfiguration) {
        match self {
            Self::Texture(texture) => {
                *texture =
                    Self::create_texture(device, surface_config.width, surface_config.height);
            }
            Self::Surface(surface) => {
                surface.configure(device, surface_config);
            }
        }
    }
    fn create_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::Texture {
        device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Draw Target Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::COPY_SRC | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[wgpu::TextureFormat::Rgba8UnormSrgb],
        })
    }
}

/// One drawable frame, either a presentable surface texture or the headless
/// offscreen target.
pub struct Frame {
    surface_texture: Option<wgpu::SurfaceTexture>,
    pub view: wgpu::TextureView,
}

impl Frame {
    pub fn present(self) {
        if let Some(surface_texture) = self.surface_texture {
            surface_texture.present();
        }
    }
}

/// The graphics capabilities shared with every sample.
///
/// Acquired once at startup and never reacquired; samples hold it behind an
/// `Rc` for their whole lifetime. The only mutable part is the surface
/// configuration, rewritten exclusively through
/// [`configure_surface`](Self::configure_surface) (everything runs on one
/// thread, hence `RefCell` rather than locks).
pub struct GpuContext {
    target: RefCell<DrawTarget>,
    surface_config: RefCell<wgpu::SurfaceConfiguration>,
    pub window: Option<Arc<Window>>,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: Rc<wgpu::Queue>,
}

impl GpuContext {
    const DEFAULT_WIDTH: u32 = 500;
    const DEFAULT_HEIGHT: u32 = 500;

    /// Acquires adapter, device and drawable target. Without a window the
    /// target is an offscreen texture, for headless runs.
    ///
    /// # Errors
    ///
    /// Fails when no compatible graphics adapter exists or the device
    /// request is denied; both are fatal to the whole viewer.
    pub async fn new(
        window: Option<Arc<Window>>,
        dimensions: Option<Dimensions>,
    ) -> anyhow::Result<Self> {
        let (width, height) = dimensions.map_or_else(
            || {
                window
                    .as_ref()
                    .map_or((Self::DEFAULT_WIDTH, Self::DEFAULT_HEIGHT), |w| {
                        (w.inner_size().width, w.inner_size().height)
                    })
            },
            |d| (d.width, d.height),
        );
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = match &window {
            Some(w) => Some(instance.create_surface(Arc::clone(w))?),
            None => None,
        };
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                force_fallback_adapter: false,
                compatible_surface: surface.as_ref(),
            })
            .await
            .ok_or_else(|| anyhow!("no compatible graphics adapter found"))?;
        debug!("{:?}", adapter.get_info());
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device Descriptor"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await?;
        let mut target = surface.map_or_else(
            || DrawTarget::new_texture_target(&device, width, height),
            DrawTarget::Surface,
        );
        let surface_format = if let DrawTarget::Surface(s) = &target {
            let surface_caps = s.get_capabilities(&adapter);
            surface_caps
                .formats
                .iter()
                .find(|f| f.is_srgb())
                .copied()
                .unwrap_or(surface_caps.formats[0])
        } else {
            wgpu::TextureFormat::Rgba8UnormSrgb
        };
        let surface_config = wgpu::SurfaceConfiguration {
            desired_maximum_frame_latency: 2,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            view_formats: vec![],
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            present_mode: wgpu::PresentMode::Fifo,
        };
        target.configure(&device, &surface_config);

        Ok(Self {
            target: RefCell::new(target),
            surface_config: RefCell::new(surface_config),
            window,
            adapter,
            device,
            queue: Rc::new(queue),
        })
    }

    /// Canonical surface reconfiguration applied on every resize: keeps the
    /// negotiated format and alpha mode, swaps the pixel dimensions.
    /// Zero-sized targets (minimized window) are skipped.
    pub fn configure_surface(&self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        let mut surface_config = self.surface_config.borrow_mut();
        surface_config.width = width;
        surface_config.height = height;
        self.target.borrow_mut().configure(&self.device, &surface_config);
    }

    /// Creates a shader module from WGSL that already survived CPU-side
    /// validation, so a broken reload can never poison the device.
    ///
    /// # Errors
    ///
    /// Returns the validation failure without touching the device; the
    /// caller keeps whatever pipeline it had.
    pub fn create_shader_module(
        &self,
        name: &str,
        source: &str,
        entry_points: &[&str],
    ) -> Result<wgpu::ShaderModule, ShaderError> {
        let validated = shader::validate_wgsl(name, source)?;
        for entry_point in entry_points {
            validated.require_entry_point(name, entry_point)?;
        }
        Ok(self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(name),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            }))
    }

    /// # Errors
    ///
    /// Propagates surface acquisition failures (outdated, lost, ...); the
    /// caller skips the frame.
    pub fn acquire_frame(&self) -> anyhow::Result<Frame> {
        let target = self.target.borrow();
        match &*target {
            DrawTarget::Surface(surface) => {
                let surface_texture = surface.get_current_texture()?;
                let view = surface_texture
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                Ok(Frame {
                    surface_texture: Some(surface_texture),
                    view,
                })
            }
            DrawTarget::Texture(texture) => Ok(Frame {
                surface_texture: None,
                view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
            }),
        }
    }

    #[must_use]
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_config.borrow().format
    }

    #[must_use]
    pub fn surface_dimensions(&self) -> Dimensions {
        let surface_config = self.surface_config.borrow();
        Dimensions {
            width: surface_config.width,
            height: surface_config.height,
        }
    }

    #[must_use]
    pub fn surface_ratio(&self) -> f32 {
        self.surface_dimensions().surface_ratio()
    }
}

impl DrawSurface for Rc<GpuContext> {
    fn reconfigure(&self, width: u32, height: u32) {
        self.configure_surface(width, height);
    }
}
