use std::sync::mpsc;
use std::time::Duration;

use super::*;

fn recorder() -> (mpsc::Sender<u32>, mpsc::Receiver<u32>) {
    mpsc::channel()
}

fn post(s: &FrameScheduler, token: FrameToken, at: Instant, tx: &mpsc::Sender<u32>, v: u32) {
    let tx = tx.clone();
    assert!(s.schedule(
        token,
        at,
        Box::new(move || {
            let _ = tx.send(v);
        })
    ));
}

#[test]
fn fires_in_time_then_post_order() {
    let s = FrameScheduler::start().unwrap();
    let (tx, rx) = recorder();
    let token = FrameToken::unique();
    let base = Instant::now() + Duration::from_millis(50);

    post(&s, token, base + Duration::from_millis(20), &tx, 3);
    post(&s, token, base, &tx, 1);
    post(&s, token, base, &tx, 2);

    let got: Vec<u32> = (0..3)
        .map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap())
        .collect();
    assert_eq!(got, vec![1, 2, 3]);
}

#[test]
fn does_not_fire_early() {
    let s = FrameScheduler::start().unwrap();
    let (tx, rx) = recorder();
    let posted = Instant::now();
    post(
        &s,
        FrameToken::unique(),
        posted + Duration::from_millis(60),
        &tx,
        7,
    );
    assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 7);
    assert!(posted.elapsed() >= Duration::from_millis(60));
}

#[test]
fn unschedule_removes_only_matching_token() {
    let s = FrameScheduler::start().unwrap();
    let (tx, rx) = recorder();
    let a = FrameToken::unique();
    let b = FrameToken::unique();
    let at = Instant::now() + Duration::from_millis(80);

    post(&s, a, at, &tx, 1);
    post(&s, a, at, &tx, 2);
    post(&s, b, at, &tx, 3);
    assert_eq!(s.unschedule(a), 2);
    assert_eq!(s.pending(), 1);

    assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 3);
    assert!(rx.recv_timeout(Duration::from_millis(150)).is_err());
}

#[test]
fn stop_discards_pending_without_firing() {
    let mut s = FrameScheduler::start().unwrap();
    let (tx, rx) = recorder();
    post(
        &s,
        FrameToken::unique(),
        Instant::now() + Duration::from_millis(50),
        &tx,
        1,
    );
    s.stop();
    assert!(!s.is_running());
    assert_eq!(s.pending(), 0);
    assert!(rx.recv_timeout(Duration::from_millis(150)).is_err());

    // Posting after stop is refused.
    let tx2 = tx.clone();
    assert!(!s.schedule(
        FrameToken::unique(),
        Instant::now(),
        Box::new(move || {
            let _ = tx2.send(2);
        })
    ));
}

#[test]
fn tasks_can_schedule_follow_ups() {
    let s = Arc::new(FrameScheduler::start().unwrap());
    let (tx, rx) = recorder();
    let token = FrameToken::unique();

    let s2 = Arc::clone(&s);
    let tx2 = tx.clone();
    s.schedule(
        token,
        Instant::now(),
        Box::new(move || {
            let _ = tx2.send(1);
            let tx3 = tx2.clone();
            s2.schedule(
                token,
                Instant::now() + Duration::from_millis(10),
                Box::new(move || {
                    let _ = tx3.send(2);
                }),
            );
        }),
    );

    assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 1);
    assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 2);
}
