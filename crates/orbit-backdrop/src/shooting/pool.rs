//! Retained comet elements drawn outside the regular widget pass.
//!
//! The spawner attaches an element when a shooting star is created and
//! detaches it when the star is removed. Nothing else mutates the pool.

use std::collections::BTreeMap;

use super::registry::KeyframeHandle;
use super::star::{CometColor, ShootingStarId};

/// Handle to an attached element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementHandle(pub u64);

/// Visual state of one comet.
#[derive(Debug, Clone, PartialEq)]
pub struct CometElement {
    pub star: ShootingStarId,
    /// Flight path this element follows.
    pub keyframes: KeyframeHandle,
    pub started_at_ms: u64,
    pub duration_ms: u64,
    pub color: CometColor,
    /// Tail length in pixels.
    pub tail_length: f32,
}

impl CometElement {
    /// Flight progress in 0.0-1.0 at `now_ms`.
    pub fn progress(&self, now_ms: u64) -> f32 {
        let elapsed = now_ms.saturating_sub(self.started_at_ms);
        (elapsed as f32 / self.duration_ms.max(1) as f32).min(1.0)
    }
}

/// Owner of the live comet elements.
pub trait ElementPool {
    fn attach(&mut self, element: CometElement) -> ElementHandle;

    /// Detach an element. Returns `false` if it was not attached.
    fn detach(&mut self, handle: ElementHandle) -> bool;

    fn get(&self, handle: ElementHandle) -> Option<&CometElement>;

    /// Number of attached elements.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The comet layer drawn on top of the star field.
#[derive(Debug, Default)]
pub struct CometLayer {
    next_handle: u64,
    elements: BTreeMap<ElementHandle, CometElement>,
}

impl CometLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attached elements in attach order.
    pub fn elements(&self) -> impl Iterator<Item = &CometElement> {
        self.elements.values()
    }
}

impl ElementPool for CometLayer {
    fn attach(&mut self, element: CometElement) -> ElementHandle {
        let handle = ElementHandle(self.next_handle);
        self.next_handle += 1;
        self.elements.insert(handle, element);
        handle
    }

    fn detach(&mut self, handle: ElementHandle) -> bool {
        self.elements.remove(&handle).is_some()
    }

    fn get(&self, handle: ElementHandle) -> Option<&CometElement> {
        self.elements.get(&handle)
    }

    fn len(&self) -> usize {
        self.elements.len()
    }
}
