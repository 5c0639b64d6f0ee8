use std::sync::{Arc, Mutex, Weak};
use std::time::{Duration, Instant};

use resvg::tiny_skia::PixmapMut;

use crate::foundation::core::Rect;
use crate::foundation::error::{MaskError, MaskResult};
use crate::foundation::sync::lock;
use crate::mask::source::{CallbackSlot, FrameToken, MaskCallback, MaskSource};

/// One frame of an [`AnimatedMask`].
#[derive(Clone)]
pub struct AnimationFrame {
    /// What to paint while this frame is current.
    pub source: Arc<dyn MaskSource>,
    /// How long this frame stays current before the next one is shown.
    pub duration: Duration,
}

impl AnimationFrame {
    /// Build a frame.
    pub fn new(source: Arc<dyn MaskSource>, duration: Duration) -> Self {
        Self { source, duration }
    }
}

/// Frame-by-frame mask animation.
///
/// Frames are advanced by tasks posted through the owning view's [`MaskCallback`]; every new frame
/// invalidates the view, which re-rasterizes it. Nothing happens until [`MaskSource::start`].
pub struct AnimatedMask {
    inner: Arc<AnimatedInner>,
}

struct AnimatedInner {
    frames: Vec<AnimationFrame>,
    one_shot: bool,
    token: FrameToken,
    state: Mutex<AnimState>,
    callback: CallbackSlot,
}

#[derive(Default)]
struct AnimState {
    current: usize,
    running: bool,
    // Bumped by every start and stop; frame tasks carry the value they were posted under.
    epoch: u64,
}

impl AnimatedMask {
    /// Build an animation. `one_shot` animations stop on their last frame, others loop.
    pub fn new(frames: Vec<AnimationFrame>, one_shot: bool) -> MaskResult<Self> {
        if frames.is_empty() {
            return Err(MaskError::validation("animated mask needs at least one frame"));
        }
        Ok(Self {
            inner: Arc::new(AnimatedInner {
                frames,
                one_shot,
                token: FrameToken::unique(),
                state: Mutex::new(AnimState::default()),
                callback: CallbackSlot::default(),
            }),
        })
    }

    /// Index of the frame that [`MaskSource::draw`] paints.
    pub fn current_frame(&self) -> usize {
        lock(&self.inner.state).current
    }

    /// Number of frames.
    pub fn frame_count(&self) -> usize {
        self.inner.frames.len()
    }

    /// Token under which this animation posts its frame advances.
    pub fn token(&self) -> FrameToken {
        self.inner.token
    }
}

impl AnimatedInner {
    /// Show `frame` as a fresh run; tasks posted by earlier runs become inert.
    fn set_frame(self: &Arc<Self>, frame: usize, unschedule: bool, animate: bool) {
        if frame >= self.frames.len() {
            return;
        }
        let epoch = {
            let mut st = lock(&self.state);
            st.epoch = st.epoch.wrapping_add(1);
            st.current = frame;
            st.running = animate;
            st.epoch
        };
        self.publish(frame, epoch, unschedule, animate);
    }

    fn advance(self: &Arc<Self>, epoch: u64) {
        let count = self.frames.len();
        // Check and commit under one lock so a concurrent `stop` cannot be overwritten.
        let (next, animate) = {
            let mut st = lock(&self.state);
            if !st.running || st.epoch != epoch {
                return;
            }
            let next = if st.current + 1 >= count { 0 } else { st.current + 1 };
            let animate = !self.one_shot || next + 1 < count;
            st.current = next;
            st.running = animate;
            (next, animate)
        };
        tracing::trace!(next, count, "advance animated mask");
        self.publish(next, epoch, false, animate);
    }

    fn publish(self: &Arc<Self>, frame: usize, epoch: u64, unschedule: bool, animate: bool) {
        let Some(duration) = self.frames.get(frame).map(|f| f.duration) else {
            return;
        };

        // The lock is released before calling out: invalidation re-enters `draw`.
        let Some(callback) = self.callback.get() else {
            tracing::debug!(frame, "animated mask has no callback, not advancing");
            let mut st = lock(&self.state);
            if st.epoch == epoch {
                st.running = false;
            }
            return;
        };
        callback.invalidate_mask();
        if unschedule || animate {
            callback.unschedule_mask(self.token);
        }
        if animate {
            let weak: Weak<AnimatedInner> = Arc::downgrade(self);
            callback.schedule_mask(
                self.token,
                Instant::now() + duration,
                Box::new(move || {
                    if let Some(inner) = weak.upgrade() {
                        inner.advance(epoch);
                    }
                }),
            );
        }
    }
}

impl MaskSource for AnimatedMask {
    fn draw(&self, target: &mut PixmapMut<'_>, bounds: Rect) {
        let current = self.current_frame();
        if let Some(frame) = self.inner.frames.get(current) {
            frame.source.draw(target, bounds);
        }
    }

    fn intrinsic_size(&self) -> Option<(u32, u32)> {
        self.inner.frames.first().and_then(|f| f.source.intrinsic_size())
    }

    fn set_callback(&self, callback: Option<Weak<dyn MaskCallback>>) {
        self.inner.callback.set(callback);
    }

    fn is_animated(&self) -> bool {
        true
    }

    fn start(&self) {
        if self.is_running() {
            return;
        }
        let animate = self.inner.frames.len() > 1 || !self.inner.one_shot;
        self.inner.set_frame(0, false, animate);
    }

    fn stop(&self) {
        {
            let mut st = lock(&self.inner.state);
            st.running = false;
            st.epoch = st.epoch.wrapping_add(1);
        }
        if let Some(callback) = self.inner.callback.get() {
            callback.unschedule_mask(self.inner.token);
        }
    }

    fn is_running(&self) -> bool {
        lock(&self.inner.state).running
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mask/animated.rs"]
mod tests;
