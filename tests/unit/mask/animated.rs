use std::sync::atomic::{AtomicUsize, Ordering};

use resvg::tiny_skia::Pixmap;

use super::*;
use crate::mask::shape::{ShapeKind, ShapeMask};
use crate::mask::source::FrameTask;

/// Collects scheduled tasks so a test can fire them by hand.
#[derive(Default)]
struct ManualCallback {
    invalidations: AtomicUsize,
    pending: Mutex<Vec<(FrameToken, Instant, FrameTask)>>,
}

impl ManualCallback {
    fn pending(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    fn take_next(&self) -> Option<FrameTask> {
        let mut pending = self.pending.lock().unwrap();
        if pending.is_empty() {
            return None;
        }
        Some(pending.remove(0).2)
    }

    fn fire_next(&self) -> bool {
        match self.take_next() {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }
}

impl MaskCallback for ManualCallback {
    fn invalidate_mask(&self) {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
    }

    fn schedule_mask(&self, token: FrameToken, at: Instant, task: FrameTask) {
        self.pending.lock().unwrap().push((token, at, task));
    }

    fn unschedule_mask(&self, token: FrameToken) {
        self.pending.lock().unwrap().retain(|(t, _, _)| *t != token);
    }
}

fn frames(colors: &[[u8; 4]], ms: u64) -> Vec<AnimationFrame> {
    colors
        .iter()
        .map(|&c| {
            let source: Arc<dyn MaskSource> = Arc::new(ShapeMask::new(ShapeKind::Rect, c).unwrap());
            AnimationFrame::new(source, Duration::from_millis(ms))
        })
        .collect()
}

fn attach(mask: &AnimatedMask) -> Arc<ManualCallback> {
    let cb = Arc::new(ManualCallback::default());
    let weak: Weak<dyn MaskCallback> = Arc::downgrade(&cb) as Weak<ManualCallback>;
    mask.set_callback(Some(weak));
    cb
}

#[test]
fn empty_animation_is_rejected() {
    assert!(AnimatedMask::new(Vec::new(), false).is_err());
}

#[test]
fn one_shot_runs_each_frame_once() {
    let mask = AnimatedMask::new(
        frames(&[[255, 0, 0, 255], [0, 255, 0, 255], [0, 0, 255, 255]], 100),
        true,
    )
    .unwrap();
    let cb = attach(&mask);

    mask.start();
    assert!(mask.is_running());
    assert_eq!(mask.current_frame(), 0);
    assert_eq!(cb.invalidations.load(Ordering::SeqCst), 1);
    assert_eq!(cb.pending(), 1);

    assert!(cb.fire_next());
    assert_eq!(mask.current_frame(), 1);
    assert_eq!(cb.invalidations.load(Ordering::SeqCst), 2);
    assert_eq!(cb.pending(), 1);

    assert!(cb.fire_next());
    assert_eq!(mask.current_frame(), 2);
    assert_eq!(cb.invalidations.load(Ordering::SeqCst), 3);
    assert_eq!(cb.pending(), 0);
    assert!(!mask.is_running());
}

#[test]
fn looping_wraps_until_stopped() {
    let mask = AnimatedMask::new(frames(&[[0, 0, 0, 255], [0, 0, 0, 64]], 10), false).unwrap();
    let cb = attach(&mask);

    mask.start();
    let mut seen = vec![mask.current_frame()];
    for _ in 0..3 {
        assert!(cb.fire_next());
        seen.push(mask.current_frame());
    }
    assert_eq!(seen, vec![0, 1, 0, 1]);
    assert_eq!(cb.pending(), 1);

    mask.stop();
    assert!(!mask.is_running());
    assert_eq!(cb.pending(), 0);
}

#[test]
fn start_while_running_is_ignored() {
    let mask = AnimatedMask::new(frames(&[[0, 0, 0, 255], [0, 0, 0, 64]], 10), false).unwrap();
    let cb = attach(&mask);
    mask.start();
    mask.start();
    assert_eq!(cb.invalidations.load(Ordering::SeqCst), 1);
    assert_eq!(cb.pending(), 1);
}

#[test]
fn draw_paints_current_frame() {
    let mask = AnimatedMask::new(frames(&[[0, 0, 0, 255], [0, 0, 0, 0]], 10), true).unwrap();
    let cb = attach(&mask);
    mask.start();

    let mut p = Pixmap::new(4, 4).unwrap();
    mask.draw(&mut p.as_mut(), Rect::new(0.0, 0.0, 4.0, 4.0));
    assert_eq!(p.pixel(1, 1).unwrap().alpha(), 255);

    cb.fire_next();
    let mut p = Pixmap::new(4, 4).unwrap();
    mask.draw(&mut p.as_mut(), Rect::new(0.0, 0.0, 4.0, 4.0));
    assert_eq!(p.pixel(1, 1).unwrap().alpha(), 0);
}

#[test]
fn start_without_live_callback_does_not_run() {
    let mask = AnimatedMask::new(frames(&[[0, 0, 0, 255], [0, 0, 0, 64]], 10), false).unwrap();
    let cb = attach(&mask);
    drop(cb);

    mask.start();
    assert_eq!(mask.current_frame(), 0);
    assert!(!mask.is_running());
}

#[test]
fn stop_wins_over_a_frame_task_already_dequeued() {
    let mask = AnimatedMask::new(frames(&[[0, 0, 0, 255], [0, 0, 0, 64]], 10), false).unwrap();
    let cb = attach(&mask);
    mask.start();

    // The worker has popped the task but not run it yet when the host stops the animation.
    let task = cb.take_next().unwrap();
    mask.stop();
    task();

    assert!(!mask.is_running());
    assert_eq!(mask.current_frame(), 0);
    assert_eq!(cb.pending(), 0);
    assert_eq!(cb.invalidations.load(Ordering::SeqCst), 1);
}

#[test]
fn restart_after_stop_ignores_the_previous_run_task() {
    let mask = AnimatedMask::new(
        frames(&[[0, 0, 0, 255], [0, 0, 0, 128], [0, 0, 0, 64]], 10),
        false,
    )
    .unwrap();
    let cb = attach(&mask);
    mask.start();

    let stale = cb.take_next().unwrap();
    mask.stop();
    mask.start();
    assert!(mask.is_running());
    assert_eq!(cb.pending(), 1);

    stale();
    assert_eq!(mask.current_frame(), 0);
    assert_eq!(cb.pending(), 1);

    assert!(cb.fire_next());
    assert_eq!(mask.current_frame(), 1);
    assert_eq!(cb.pending(), 1);
}
