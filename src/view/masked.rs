use std::sync::{Arc, Mutex, Weak};
use std::time::Instant;

use resvg::tiny_skia::PixmapMut;

use crate::animation::scheduler::FrameScheduler;
use crate::assets::resource::{MaskResource, ResourceLoader};
use crate::blend::mode::BlendOperator;
use crate::foundation::core::ViewSize;
use crate::foundation::error::{Degraded, MaskResult};
use crate::foundation::sync::lock;
use crate::mask::source::{FrameTask, FrameToken, MaskCallback, MaskSource};
use crate::render::cache::{MaskBuffer, MaskCache};
use crate::render::composite::{MaskPaint, composite};
use crate::render::raster::rasterize;
use crate::view::config::MaskConfig;

/// Whatever owns the surface the view is drawn into.
pub trait RedrawHost: Send + Sync {
    /// Schedule a new draw pass. May be called from the view's frame scheduler thread.
    fn request_redraw(&self);
}

impl<F> RedrawHost for F
where
    F: Fn() + Send + Sync,
{
    fn request_redraw(&self) {
        self()
    }
}

/// A view that composites a mask over its already-drawn children.
///
/// The host drives it through [`MaskedView::on_size_changed`], [`MaskedView::draw`] and the
/// attach/detach hooks. Animated masks advance on a per-view background thread that lives from
/// construction until [`MaskedView::detach`] (or drop).
pub struct MaskedView {
    shared: Arc<ViewShared>,
}

struct ViewShared {
    state: Mutex<ViewState>,
    cache: MaskCache,
    // Serializes rasterize+install so the last installed buffer matches the latest size.
    refresh: Mutex<()>,
    scheduler: Mutex<Option<FrameScheduler>>,
    host: Arc<dyn RedrawHost>,
}

struct ViewState {
    source: Option<Arc<dyn MaskSource>>,
    size: ViewSize,
    operator: BlendOperator,
    anti_alias: bool,
    last_degraded: Option<Degraded>,
}

impl MaskedView {
    /// Build a view from configuration, loading its mask through `loader`.
    pub fn new(
        config: &MaskConfig,
        loader: &ResourceLoader,
        host: Arc<dyn RedrawHost>,
    ) -> MaskResult<Self> {
        let source = config.mask.as_ref().map(|r| loader.load(r)).transpose()?;
        let (operator, degraded) = match config.blend_operator() {
            Ok(op) => (op, None),
            Err(d) => (BlendOperator::default(), Some(d)),
        };
        Self::build(source, operator, config.anti_aliasing, host, degraded)
    }

    /// Build a view around an already constructed mask source.
    pub fn with_source(
        source: Option<Arc<dyn MaskSource>>,
        operator: BlendOperator,
        anti_alias: bool,
        host: Arc<dyn RedrawHost>,
    ) -> MaskResult<Self> {
        Self::build(source, operator, anti_alias, host, None)
    }

    fn build(
        source: Option<Arc<dyn MaskSource>>,
        operator: BlendOperator,
        anti_alias: bool,
        host: Arc<dyn RedrawHost>,
        degraded: Option<Degraded>,
    ) -> MaskResult<Self> {
        let shared = Arc::new(ViewShared {
            state: Mutex::new(ViewState {
                source: None,
                size: ViewSize::default(),
                operator,
                anti_alias,
                last_degraded: None,
            }),
            cache: MaskCache::new(),
            refresh: Mutex::new(()),
            scheduler: Mutex::new(Some(FrameScheduler::start()?)),
            host,
        });
        let view = Self { shared };
        view.replace_source(source);
        // Configuration problems outrank the initial 0x0 raster skip.
        if let Some(degraded) = degraded {
            view.shared.record(degraded);
        }
        Ok(view)
    }

    /// Replace the mask source, re-rasterize synchronously and request a redraw.
    pub fn set_mask(&self, source: Arc<dyn MaskSource>) {
        self.replace_source(Some(source));
        self.shared.host.request_redraw();
    }

    /// Load `resource` and make it the mask source.
    pub fn set_mask_resource(
        &self,
        resource: &MaskResource,
        loader: &ResourceLoader,
    ) -> MaskResult<()> {
        let source = loader.load(resource)?;
        self.set_mask(source);
        Ok(())
    }

    /// Remove the mask source and its buffer; children draw unmasked from now on.
    pub fn clear_mask(&self) {
        let previous = {
            // Held so an in-flight refresh cannot install a buffer after the clear.
            let _serial = lock(&self.shared.refresh);
            let previous = lock(&self.shared.state).source.take();
            self.shared.cache.clear();
            previous
        };
        if let Some(previous) = previous {
            release_source(&previous);
        }
        self.shared.host.request_redraw();
    }

    fn replace_source(&self, source: Option<Arc<dyn MaskSource>>) {
        if let Some(source) = &source {
            let weak = Arc::downgrade(&self.shared) as Weak<dyn MaskCallback>;
            source.set_callback(Some(weak));
        }
        let previous = {
            let mut st = lock(&self.shared.state);
            std::mem::replace(&mut st.source, source.clone())
        };
        if let Some(previous) = previous
            && !source.as_ref().is_some_and(|s| same_source(s, &previous))
        {
            release_source(&previous);
        }
        self.shared.refresh_mask();
    }

    /// Current mask source.
    pub fn mask_source(&self) -> Option<Arc<dyn MaskSource>> {
        lock(&self.shared.state).source.clone()
    }

    /// Operator used by subsequent draw passes.
    pub fn blend_operator(&self) -> BlendOperator {
        lock(&self.shared.state).operator
    }

    /// Replace the operator for subsequent draw passes.
    pub fn set_blend_operator(&self, operator: BlendOperator) {
        lock(&self.shared.state).operator = operator;
        tracing::debug!(mode = operator.name(), "blend operator changed");
    }

    /// Replace the operator by name, e.g. `"src-in"`.
    pub fn set_blend_operator_name(&self, name: &str) -> MaskResult<()> {
        self.set_blend_operator(name.parse()?);
        Ok(())
    }

    /// Whether the mask is filtered while compositing.
    pub fn anti_aliasing(&self) -> bool {
        lock(&self.shared.state).anti_alias
    }

    /// Last size reported by the host.
    pub fn size(&self) -> ViewSize {
        lock(&self.shared.state).size
    }

    /// Size-change hook: re-rasterize the mask at the new size.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn on_size_changed(&self, width: i32, height: i32) {
        lock(&self.shared.state).size = ViewSize::new(width, height);
        self.shared.refresh_mask();
    }

    /// Draw-pass hook, called after the children were drawn into `target`.
    ///
    /// Returns `true` when a mask was composited.
    pub fn draw(&self, target: &mut PixmapMut<'_>) -> bool {
        let paint = {
            let st = lock(&self.shared.state);
            MaskPaint {
                operator: st.operator,
                anti_alias: st.anti_alias,
            }
        };
        let buffer = self.shared.cache.current();
        let drawn = composite(target, buffer.as_ref(), paint);
        if !drawn {
            self.shared.record(Degraded::NoMaskConfigured);
        }
        drawn
    }

    /// The live mask buffer, if any.
    pub fn mask_buffer(&self) -> Option<MaskBuffer> {
        self.shared.cache.current()
    }

    /// Number of mask buffers installed over the view's lifetime.
    pub fn mask_generation(&self) -> u64 {
        self.shared.cache.generation()
    }

    /// Most recent non-fatal condition.
    pub fn last_degraded(&self) -> Option<Degraded> {
        lock(&self.shared.state).last_degraded
    }

    /// Start an animated mask source. No-op for static masks.
    pub fn start_animation(&self) {
        if let Some(source) = self.mask_source() {
            source.start();
        }
    }

    /// Stop an animated mask source, keeping its current frame.
    pub fn stop_animation(&self) {
        if let Some(source) = self.mask_source() {
            source.stop();
        }
    }

    /// Attach hook: restart the frame scheduler if it was stopped.
    pub fn attach(&self) -> MaskResult<()> {
        let mut slot = lock(&self.shared.scheduler);
        if slot.is_none() {
            *slot = Some(FrameScheduler::start()?);
            tracing::debug!("masked view attached");
        }
        Ok(())
    }

    /// Detach hook: stop the frame scheduler and drop pending frame tasks without running them.
    ///
    /// A running animation is stopped on its current frame; call
    /// [`MaskedView::start_animation`] after [`MaskedView::attach`] to resume it.
    pub fn detach(&self) {
        let scheduler = lock(&self.shared.scheduler).take();
        let Some(mut scheduler) = scheduler else {
            return;
        };
        scheduler.stop();
        if let Some(source) = self.mask_source() {
            source.stop();
        }
        tracing::debug!("masked view detached");
    }

    /// True while the frame scheduler is running.
    pub fn is_attached(&self) -> bool {
        lock(&self.shared.scheduler).is_some()
    }
}

impl Drop for MaskedView {
    fn drop(&mut self) {
        self.detach();
        if let Some(source) = lock(&self.shared.state).source.take() {
            source.set_callback(None);
        }
    }
}

impl ViewShared {
    fn refresh_mask(&self) -> bool {
        let _serial = lock(&self.refresh);
        let (source, size) = {
            let st = lock(&self.state);
            (st.source.clone(), st.size)
        };
        match rasterize(source.as_deref(), size.width, size.height) {
            Ok(buffer) => {
                self.cache.install(Some(buffer));
                true
            }
            Err(degraded) => {
                // The previous buffer, if any, stays on screen until the next trigger.
                self.record(degraded);
                self.cache.install(None);
                false
            }
        }
    }

    fn record(&self, degraded: Degraded) {
        lock(&self.state).last_degraded = Some(degraded);
    }
}

impl MaskCallback for ViewShared {
    #[tracing::instrument(level = "trace", skip(self))]
    fn invalidate_mask(&self) {
        self.refresh_mask();
        self.host.request_redraw();
    }

    fn schedule_mask(&self, token: FrameToken, at: Instant, task: FrameTask) {
        match lock(&self.scheduler).as_ref() {
            Some(scheduler) => {
                scheduler.schedule(token, at, task);
            }
            None => tracing::debug!(?token, "view detached, dropping frame task"),
        }
    }

    fn unschedule_mask(&self, token: FrameToken) {
        if let Some(scheduler) = lock(&self.scheduler).as_ref() {
            scheduler.unschedule(token);
        }
    }
}

fn release_source(source: &Arc<dyn MaskSource>) {
    source.stop();
    source.set_callback(None);
}

fn same_source(a: &Arc<dyn MaskSource>, b: &Arc<dyn MaskSource>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

#[cfg(test)]
#[path = "../../tests/unit/view/masked.rs"]
mod tests;
