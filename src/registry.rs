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

use bitflags::bitflags;
use indexmap::IndexMap;
use log::{error, warn};
use thiserror::Error;

use crate::sample::{Sample, SampleContext};

bitflags! {
    /// Lifecycle hooks a sample definition declares support for.
    ///
    /// The declaration is checked once, at registration time; nothing is
    /// constructed to decide whether a candidate is acceptable.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Capabilities: u8 {
        const INITIALIZE = 1 << 0;
        const DRAW = 1 << 1;
        const SHADERS = 1 << 2;
        const RELOAD = 1 << 3;
        const RESIZE = 1 << 4;
    }
}

impl Capabilities {
    /// The hooks every hosted sample must provide.
    pub const REQUIRED: Self = Self::all();
}

pub type SampleConstructor<C> = Box<dyn Fn(SampleContext<C>) -> Box<dyn Sample>>;

/// A sample definition as submitted for registration.
pub struct SampleCandidate<C> {
    pub name: String,
    pub provides: Capabilities,
    pub construct: SampleConstructor<C>,
}

impl<C> SampleCandidate<C> {
    pub fn new(
        name: impl Into<String>,
        provides: Capabilities,
        construct: impl Fn(SampleContext<C>) -> Box<dyn Sample> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            provides,
            construct: Box::new(construct),
        }
    }
}

/// A candidate excluded at registration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub name: String,
    pub missing: Capabilities,
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("no usable sample definition was registered")]
    Empty,
}

/// The validated set of sample definitions, in registration order.
///
/// Built once at process start and immutable afterwards. Rejected candidates
/// never become activatable but stay listed so the caller can warn the user.
pub struct SampleRegistry<C> {
    entries: IndexMap<String, SampleCandidate<C>>,
    rejected: Vec<Rejection>,
}

impl<C> SampleRegistry<C> {
    /// Filters `candidates` down to those declaring the whole
    /// [`Capabilities::REQUIRED`] set.
    ///
    /// Each exclusion is logged and recorded; an empty resulting set is
    /// fatal since the viewer would have nothing to show. Duplicate names
    /// keep the later registration.
    pub fn register_candidates(
        candidates: Vec<SampleCandidate<C>>,
    ) -> Result<Self, RegistryError> {
        let mut entries: IndexMap<String, SampleCandidate<C>> = IndexMap::new();
        let mut rejected = Vec::new();
        for candidate in candidates {
            let missing = Capabilities::REQUIRED.difference(candidate.provides);
            if !missing.is_empty() {
                error!(
                    "rejecting sample '{}': missing hooks {missing:?}",
                    candidate.name
                );
                rejected.push(Rejection {
                    name: candidate.name.clone(),
                    missing,
                });
                continue;
            }
            let name = candidate.name.clone();
            if entries.insert(name.clone(), candidate).is_some() {
                warn!("sample '{name}' registered twice, keeping the later definition");
            }
        }
        if entries.is_empty() {
            return Err(RegistryError::Empty);
        }
        Ok(Self { entries, rejected })
    }

    /// Names of the activatable samples, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Candidates that failed validation, for user-visible warnings.
    #[must_use]
    pub fn rejected(&self) -> &[Rejection] {
        &self.rejected
    }

    pub(crate) fn get(&self, name: &str) -> Option<&SampleCandidate<C>> {
        self.entries.get(name)
    }

    pub(crate) fn rejection(&self, name: &str) -> Option<&Rejection> {
        self.rejected.iter().find(|rejection| rejection.name == name)
    }
}
