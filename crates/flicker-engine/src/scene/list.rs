use crate::coords::Rect;
use crate::paint::Color;

use super::{DrawCmd, RectCmd};

/// Recorded draw stream, painted in insertion order (back-to-front).
///
/// `clear()` keeps the allocation, so re-recording the same amount of work every
/// frame does not allocate once warmed.
#[derive(Debug, Default)]
pub struct DrawList {
    items: Vec<DrawCmd>,
    generation: u64,
}

impl DrawList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears recorded items. Keeps allocated capacity for reuse.
    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    #[inline]
    pub fn push(&mut self, cmd: DrawCmd) {
        self.items.push(cmd);
        self.generation = self.generation.wrapping_add(1);
    }

    /// Records a solid rectangle.
    #[inline]
    pub fn push_solid_rect(&mut self, rect: Rect, color: Color) {
        self.push(DrawCmd::Rect(RectCmd::new(rect, color)));
    }

    #[inline]
    pub fn items(&self) -> &[DrawCmd] {
        &self.items
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Changes on every mutation; renderers use it to skip re-uploads.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
