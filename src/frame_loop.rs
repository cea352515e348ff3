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

use std::cell::Cell;

/// Scheduling state of a sample's animation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameLoopState {
    #[default]
    Idle,
    Scheduled,
}

/// Per-sample animation controller.
///
/// A sample that wants continuous rendering calls [`animate`](Self::animate);
/// the host checks [`is_scheduled`](Self::is_scheduled) at the top of each
/// frame tick and runs exactly one draw per tick while the loop is scheduled.
/// Stopping is cooperative: a tick already dispatched still completes its
/// draw, but no further frame is requested afterwards.
///
/// Both transitions are idempotent and the flag is never shared between two
/// samples; a fresh controller is handed to each sample at construction.
#[derive(Debug, Default)]
pub struct FrameLoop {
    state: Cell<FrameLoopState>,
}

impl FrameLoop {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn animate(&self) {
        self.state.set(FrameLoopState::Scheduled);
    }

    pub fn stop(&self) {
        self.state.set(FrameLoopState::Idle);
    }

    #[must_use]
    pub fn state(&self) -> FrameLoopState {
        self.state.get()
    }

    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        self.state.get() == FrameLoopState::Scheduled
    }
}
