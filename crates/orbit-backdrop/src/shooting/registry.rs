//! Keyframe definitions for shooting-star flights.
//!
//! Every live shooting star registers one definition and must release it
//! exactly once when it is removed. The registry is injected into the spawner
//! so tests can count register/release pairs.

use std::collections::BTreeMap;

use tracing::trace;

/// Handle to a registered keyframe definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyframeHandle(pub u64);

/// A linear flight from `from` to `to`, in pixels, with a growing scale.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframes {
    pub from: (f32, f32),
    pub to: (f32, f32),
    /// Heading in degrees, clockwise from the positive x axis (y points down).
    pub angle_deg: f32,
    pub scale_from: f32,
    pub scale_to: f32,
}

/// Interpolated state at some point of a flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyframeSample {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
}

impl Keyframes {
    /// Sample at `progress` (clamped to 0.0-1.0).
    pub fn sample(&self, progress: f32) -> KeyframeSample {
        let t = progress.clamp(0.0, 1.0);
        KeyframeSample {
            x: self.from.0 + (self.to.0 - self.from.0) * t,
            y: self.from.1 + (self.to.1 - self.from.1) * t,
            scale: self.scale_from + (self.scale_to - self.scale_from) * t,
        }
    }
}

/// Storage for per-star animation definitions.
pub trait KeyframeRegistry {
    /// Register a definition under `name` and return its handle.
    fn register(&mut self, name: &str, keyframes: Keyframes) -> KeyframeHandle;

    /// Delete a definition. Returns `false` if the handle was unknown.
    fn release(&mut self, handle: KeyframeHandle) -> bool;

    fn get(&self, handle: KeyframeHandle) -> Option<&Keyframes>;

    /// Number of definitions currently registered.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory keyframe sheet used by the terminal renderer.
#[derive(Debug, Default)]
pub struct KeyframeSheet {
    next_handle: u64,
    rules: BTreeMap<KeyframeHandle, (String, Keyframes)>,
}

impl KeyframeSheet {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyframeRegistry for KeyframeSheet {
    fn register(&mut self, name: &str, keyframes: Keyframes) -> KeyframeHandle {
        let handle = KeyframeHandle(self.next_handle);
        self.next_handle += 1;
        self.rules.insert(handle, (name.to_string(), keyframes));
        handle
    }

    fn release(&mut self, handle: KeyframeHandle) -> bool {
        match self.rules.remove(&handle) {
            Some((name, _)) => {
                trace!(%name, "keyframes released");
                true
            }
            None => false,
        }
    }

    fn get(&self, handle: KeyframeHandle) -> Option<&Keyframes> {
        self.rules.get(&handle).map(|(_, keyframes)| keyframes)
    }

    fn len(&self) -> usize {
        self.rules.len()
    }
}
