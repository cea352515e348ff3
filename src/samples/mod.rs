//! Built-in samples shipped with the viewer.

use std::rc::Rc;

use crate::gpu_context::GpuContext;
use crate::registry::{Capabilities, SampleCandidate};

pub mod orbit;
pub mod triangle;

/// Capability handle the built-in samples are written against.
pub type GpuCaps = Rc<GpuContext>;

/// The process-start registration call: every built-in sample definition, in
/// the order they appear in the selector.
#[must_use]
pub fn candidates() -> Vec<SampleCandidate<GpuCaps>> {
    vec![
        SampleCandidate::new("Triangle", Capabilities::all(), triangle::Triangle::build),
        SampleCandidate::new("Orbit", Capabilities::all(), orbit::Orbit::build),
    ]
}
