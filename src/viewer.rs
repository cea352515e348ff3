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

use log::{error, warn};
use thiserror::Error;

use crate::frame_loop::FrameLoop;
use crate::registry::{Capabilities, SampleRegistry};
use crate::sample::{Sample, SampleContext, ShaderMap};
use crate::ui::{EditorSink, Workspace};

/// What the viewer needs from the platform drawable.
pub trait DrawSurface {
    /// Reconfigures the backing surface for new pixel dimensions.
    fn reconfigure(&self, width: u32, height: u32);
}

#[derive(Debug, Error)]
pub enum ActivationError {
    #[error("unknown sample '{0}'")]
    NotFound(String),
    #[error("sample '{name}' was rejected at registration, missing hooks {missing:?}")]
    Rejected { name: String, missing: Capabilities },
    #[error("failed to initialize sample '{name}': {reason}")]
    Initialize { name: String, reason: anyhow::Error },
}

struct ActiveSample {
    name: String,
    frame_loop: Rc<FrameLoop>,
    sample: Box<dyn Sample>,
}

/// Hosts the active sample: activation, shader hot-reload, surface
/// reconfiguration and per-frame draw driving.
///
/// There is never more than one active sample; this type is the single
/// writer for the switch, so two samples can never be scheduled at once.
pub struct SampleViewer<C> {
    caps: C,
    registry: SampleRegistry<C>,
    workspace: Rc<RefCell<dyn Workspace>>,
    editor: Box<dyn EditorSink>,
    active: Option<ActiveSample>,
    pending_resize: Option<(u32, u32)>,
}

impl<C: DrawSurface + Clone> SampleViewer<C> {
    pub fn new(
        caps: C,
        registry: SampleRegistry<C>,
        workspace: Rc<RefCell<dyn Workspace>>,
        editor: Box<dyn EditorSink>,
    ) -> Self {
        Self {
            caps,
            registry,
            workspace,
            editor,
            active: None,
            pending_resize: None,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &SampleRegistry<C> {
        &self.registry
    }

    #[must_use]
    pub fn active_name(&self) -> Option<&str> {
        self.active.as_ref().map(|active| active.name.as_str())
    }

    /// Current sample's shader map, as the editor sees it.
    #[must_use]
    pub fn active_shaders(&self) -> Option<ShaderMap> {
        self.active.as_ref().map(|active| active.sample.shaders())
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| active.frame_loop.is_scheduled())
    }

    /// Makes `name` the sole rendering sample.
    ///
    /// The previous sample is stopped, its panels cleared and its pipelines
    /// released before the successor is constructed. On a construction or
    /// initialization failure no sample is active afterwards and the error
    /// propagates to the caller; there is no automatic fallback to the
    /// previous sample.
    pub fn activate(&mut self, name: &str) -> Result<(), ActivationError> {
        if !self.registry.contains(name) {
            return Err(match self.registry.rejection(name) {
                Some(rejection) => ActivationError::Rejected {
                    name: name.to_owned(),
                    missing: rejection.missing,
                },
                None => ActivationError::NotFound(name.to_owned()),
            });
        }
        if let Some(previous) = self.active.take() {
            previous.frame_loop.stop();
            self.workspace.borrow_mut().clear();
            drop(previous);
        }
        let frame_loop = Rc::new(FrameLoop::new());
        let candidate = self
            .registry
            .get(name)
            .expect("presence was checked above");
        let mut sample = (candidate.construct)(SampleContext {
            caps: self.caps.clone(),
            frame_loop: Rc::clone(&frame_loop),
            workspace: Rc::clone(&self.workspace),
        });
        sample
            .initialize()
            .map_err(|reason| ActivationError::Initialize {
                name: name.to_owned(),
                reason,
            })?;
        self.editor.sync_shaders(&sample.shaders());
        self.active = Some(ActiveSample {
            name: name.to_owned(),
            frame_loop,
            sample,
        });
        Ok(())
    }

    /// Editor callback: applies new source for `shader_name` to the active
    /// sample.
    ///
    /// On success one explicit draw makes the edit visible even while the
    /// animation loop is idle. On failure the sample keeps its previous
    /// pipeline and the error is reported, not propagated; names the sample
    /// does not own succeed as no-ops.
    pub fn reload(&mut self, shader_name: &str, shader_source: &str) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        match active.sample.reload(shader_name, shader_source) {
            Ok(()) => {
                if let Err(err) = active.sample.draw() {
                    warn!("draw after reload of '{shader_name}' failed: {err:#}");
                }
            }
            Err(err) => {
                error!("{err}");
                self.workspace
                    .borrow_mut()
                    .alert("Shader reload failed", &err.to_string());
            }
        }
    }

    /// Records a resize notification, in physical pixels.
    ///
    /// Bursts coalesce: only the most recent pending size is applied, at the
    /// next frame tick. The host is expected to request one tick after
    /// calling this so the reconfiguration also runs while the animation
    /// loop is idle.
    pub fn handle_resize(&mut self, width: u32, height: u32) {
        self.pending_resize = Some((width, height));
    }

    #[must_use]
    pub fn has_pending_resize(&self) -> bool {
        self.pending_resize.is_some()
    }

    /// One host frame tick.
    ///
    /// A pending reconfiguration is applied first: the backing surface, then
    /// the sample's size-dependent resources, then exactly one draw so the
    /// resized surface never shows a stale frame. Otherwise the active
    /// sample draws iff its loop is scheduled. Returns whether the host
    /// should request another tick.
    pub fn frame_tick(&mut self) -> bool {
        if let Some((width, height)) = self.pending_resize.take() {
            self.caps.reconfigure(width, height);
            if let Some(active) = self.active.as_mut() {
                active.sample.resize(width, height);
                if let Err(err) = active.sample.draw() {
                    warn!("draw after resize to {width}x{height} failed: {err:#}");
                }
            }
            return self.is_animating() || self.pending_resize.is_some();
        }
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        if !active.frame_loop.is_scheduled() {
            return false;
        }
        if let Err(err) = active.sample.draw() {
            warn!("draw failed: {err:#}");
        }
        active.frame_loop.is_scheduled()
    }
}
