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

use log::{error, info};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::Key;
use winit::window::{Window, WindowId};

use crate::gpu_context::GpuContext;
use crate::registry::SampleRegistry;
use crate::samples::{self, GpuCaps};
use crate::ui::{LogEditor, LogWorkspace, Workspace};
use crate::viewer::SampleViewer;

const WINDOW_TITLE: &str = "wgpu showcase";

/// Runs the windowed viewer until the window closes or a fatal error occurs.
pub fn run(startup_sample: Option<String>) -> anyhow::Result<()> {
    let event_loop = EventLoop::new()?;
    let mut app = ViewerApp::new(startup_sample);
    event_loop.run_app(&mut app)?;
    app.outcome
}

struct ViewerApp {
    startup_sample: Option<String>,
    window: Option<Arc<Window>>,
    viewer: Option<SampleViewer<GpuCaps>>,
    sample_names: Vec<String>,
    workspace: Rc<RefCell<dyn Workspace>>,
    outcome: anyhow::Result<()>,
}

impl ViewerApp {
    fn new(startup_sample: Option<String>) -> Self {
        Self {
            startup_sample,
            window: None,
            viewer: None,
            sample_names: Vec::new(),
            workspace: Rc::new(RefCell::new(LogWorkspace)),
            outcome: Ok(()),
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        use pollster::FutureExt;

        let window = Arc::new(
            event_loop
                .create_window(Window::default_attributes().with_title(WINDOW_TITLE))?,
        );
        let gpu = Rc::new(GpuContext::new(Some(Arc::clone(&window)), None).block_on()?);
        let registry = SampleRegistry::register_candidates(samples::candidates())?;
        if !registry.rejected().is_empty() {
            self.workspace.borrow_mut().alert(
                "Some samples were not accepted",
                "Check the log for more details",
            );
        }
        let mut viewer = SampleViewer::new(
            gpu,
            registry,
            Rc::clone(&self.workspace),
            Box::new(LogEditor),
        );
        self.sample_names = viewer.registry().names().map(str::to_owned).collect();
        let startup = self
            .startup_sample
            .clone()
            .unwrap_or_else(|| self.sample_names[0].clone());
        viewer.activate(&startup)?;
        info!("Activated sample '{startup}'");
        let size = window.inner_size();
        viewer.handle_resize(size.width, size.height);
        window.request_redraw();
        self.window = Some(window);
        self.viewer = Some(viewer);
        Ok(())
    }

    fn fatal(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        error!("{err:#}");
        self.workspace.borrow_mut().alert("Error", &err.to_string());
        self.outcome = Err(err);
        event_loop.exit();
    }

    /// Stand-in for the external sample selector: digit keys activate the
    /// corresponding entry of the valid set.
    fn activate_by_index(&mut self, index: usize) {
        let (Some(viewer), Some(window)) = (self.viewer.as_mut(), self.window.as_ref()) else {
            return;
        };
        let Some(name) = self.sample_names.get(index) else {
            return;
        };
        match viewer.activate(name) {
            Ok(()) => {
                info!("Activated sample '{name}'");
                let size = window.inner_size();
                viewer.handle_resize(size.width, size.height);
                window.request_redraw();
            }
            Err(err) => {
                error!("could not activate '{name}': {err}");
                self.workspace
                    .borrow_mut()
                    .alert("Could not activate sample", &err.to_string());
            }
        }
    }

    fn on_key_pressed(&mut self, key: &Key) {
        if let Key::Character(text) = key {
            if let Ok(digit) = text.as_str().parse::<usize>() {
                if digit >= 1 {
                    self.activate_by_index(digit - 1);
                }
            }
        }
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.init(event_loop) {
            self.fatal(event_loop, err);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let (Some(viewer), Some(window)) =
                    (self.viewer.as_mut(), self.window.as_ref())
                {
                    viewer.handle_resize(size.width, size.height);
                    window.request_redraw();
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed && !event.repeat {
                    self.on_key_pressed(&event.logical_key);
                }
            }
            WindowEvent::RedrawRequested => {
                if let (Some(viewer), Some(window)) =
                    (self.viewer.as_mut(), self.window.as_ref())
                {
                    if viewer.frame_tick() {
                        window.request_redraw();
                    }
                }
            }
            _ => {}
        }
    }
}
