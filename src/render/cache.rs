use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};

use resvg::tiny_skia::Pixmap;

use crate::foundation::sync::{read, write};

/// Rasterized mask: premultiplied RGBA8888 pixels sized to the view.
///
/// Cloning shares the pixels. The memory is freed when the cache drops it and no draw pass still
/// holds a clone.
#[derive(Clone, Debug)]
pub struct MaskBuffer {
    pixmap: Arc<Pixmap>,
}

impl MaskBuffer {
    /// Wrap freshly rendered pixels.
    pub fn new(pixmap: Pixmap) -> Self {
        Self {
            pixmap: Arc::new(pixmap),
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// The pixels.
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Non-owning handle, dead once the buffer has been released everywhere.
    pub fn downgrade(&self) -> Weak<Pixmap> {
        Arc::downgrade(&self.pixmap)
    }

    /// True when both handles share the same pixels.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.pixmap, &b.pixmap)
    }
}

/// Holds the single live mask buffer.
#[derive(Debug, Default)]
pub struct MaskCache {
    current: RwLock<Option<MaskBuffer>>,
    generation: AtomicU64,
}

impl MaskCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `buffer` current and release the previous one. `None` keeps the previous buffer.
    pub fn install(&self, buffer: Option<MaskBuffer>) {
        let Some(buffer) = buffer else {
            tracing::debug!("no new mask buffer, keeping the current one");
            return;
        };
        let (width, height) = (buffer.width(), buffer.height());
        let previous = write(&self.current).replace(buffer);
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        // Dropped outside the lock; a draw pass holding a clone keeps it alive until it finishes.
        drop(previous);
        tracing::debug!(width, height, generation, "installed mask buffer");
    }

    /// Snapshot of the current buffer for one draw pass.
    pub fn current(&self) -> Option<MaskBuffer> {
        read(&self.current).clone()
    }

    /// Release the current buffer, leaving the cache empty.
    pub fn clear(&self) {
        let previous = write(&self.current).take();
        if previous.is_some() {
            tracing::debug!("cleared mask buffer");
        }
    }

    /// Number of successful installs so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cache.rs"]
mod tests;
