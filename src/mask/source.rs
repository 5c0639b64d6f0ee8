use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Instant;

use resvg::tiny_skia::PixmapMut;

use crate::foundation::core::Rect;
use crate::foundation::sync::lock;

/// Work posted to a view's frame scheduler.
pub type FrameTask = Box<dyn FnOnce() + Send + 'static>;

/// Identifies the scheduled callbacks of one mask source, so they can be cancelled together.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameToken(pub u64);

impl FrameToken {
    /// Allocate a token that no other source in this process uses.
    pub fn unique() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Observer a mask source uses to talk back to the view that owns it.
pub trait MaskCallback: Send + Sync {
    /// The source has a new renderable frame; re-rasterize and redraw.
    fn invalidate_mask(&self);

    /// Run `task` at `at` on the view's frame scheduler.
    fn schedule_mask(&self, token: FrameToken, at: Instant, task: FrameTask);

    /// Drop every not-yet-fired task posted under `token`.
    fn unschedule_mask(&self, token: FrameToken);
}

/// A paintable mask resource.
///
/// Sources are shared between the host thread and the view's frame scheduler, so all methods take
/// `&self`; animated sources keep their frame state behind a lock.
pub trait MaskSource: Send + Sync {
    /// Paint the current frame into `target`, scaled to fill `bounds`.
    fn draw(&self, target: &mut PixmapMut<'_>, bounds: Rect);

    /// Natural pixel size, when the source has one.
    fn intrinsic_size(&self) -> Option<(u32, u32)> {
        None
    }

    /// Install (or remove) the observer used for invalidation and scheduling.
    fn set_callback(&self, _callback: Option<Weak<dyn MaskCallback>>) {}

    /// True for sources that advance through frames on their own.
    fn is_animated(&self) -> bool {
        false
    }

    /// Start advancing frames. No-op for static sources.
    fn start(&self) {}

    /// Stop advancing frames and cancel pending advances. No-op for static sources.
    fn stop(&self) {}

    /// True while frames are being advanced.
    fn is_running(&self) -> bool {
        false
    }
}

/// Holds a source's observer without keeping the view alive.
#[derive(Default)]
pub struct CallbackSlot {
    inner: Mutex<Option<Weak<dyn MaskCallback>>>,
}

impl CallbackSlot {
    /// Replace the observer.
    pub fn set(&self, callback: Option<Weak<dyn MaskCallback>>) {
        *lock(&self.inner) = callback;
    }

    /// Upgrade the observer, `None` when unset or when its view is gone.
    pub fn get(&self) -> Option<Arc<dyn MaskCallback>> {
        lock(&self.inner).as_ref().and_then(Weak::upgrade)
    }
}
