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

use indexmap::IndexMap;

use crate::frame_loop::FrameLoop;
use crate::shader::ShaderError;
use crate::ui::Workspace;

/// Shader name to WGSL source text, in declaration order.
///
/// Keys stay stable for the lifetime of a sample so editor tabs keep mapping
/// to the same shader across reloads.
pub type ShaderMap = IndexMap<String, String>;

/// Everything a sample receives at construction time.
pub struct SampleContext<C> {
    /// Shared graphics capabilities, acquired once at startup.
    pub caps: C,
    /// The sample's own animation controller. The viewer keeps a handle to
    /// the same controller to drive ticks and halt the loop at teardown.
    pub frame_loop: Rc<FrameLoop>,
    /// External widget workspace, for optional settings panels.
    pub workspace: Rc<RefCell<dyn Workspace>>,
}

/// Lifecycle contract of a hosted rendering sample.
///
/// Exactly one sample is active at a time; the viewer constructs it, runs
/// [`initialize`](Self::initialize) once, then feeds it draw ticks, resizes
/// and shader reloads until another sample supersedes it.
pub trait Sample {
    /// Runs exactly once, synchronously, right after construction and before
    /// any draw. Pipeline allocation, panel registration and shader map
    /// population belong here. An error aborts the activation.
    fn initialize(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Renders one frame with the current pipeline state. Must stay a no-op
    /// while no pipeline exists yet.
    fn draw(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    /// The editable shaders of this sample. Called once per activation to
    /// seed the editor; the keys match the names [`reload`](Self::reload)
    /// accepts, and after a successful reload the entry for that name holds
    /// the new source.
    fn shaders(&self) -> ShaderMap {
        ShaderMap::default()
    }

    /// Swaps in new source for the named shader, rebuilding exactly the
    /// pipelines that depend on it. Names this sample does not own are
    /// ignored, so stale editor tabs from a previous sample cannot corrupt
    /// this one. On error the previously working pipeline remains in use.
    fn reload(&mut self, _shader_name: &str, _shader_source: &str) -> Result<(), ShaderError> {
        Ok(())
    }

    /// Rebuilds size-dependent resources. The drawable surface itself is
    /// already reconfigured when this hook runs, so the default does
    /// nothing; it is safe to call before the first draw.
    fn resize(&mut self, _width: u32, _height: u32) {}

    /// Stable display name, also used for registry lookups.
    fn name(&self) -> &str;
}
