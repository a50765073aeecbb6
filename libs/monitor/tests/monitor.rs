use std::{
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

use monitor::{LowLevelMonitor, TimeoutStrategy, ALL_STRATEGIES};
use testing::{assert_elapsed, eventually, spawn_all, Stopwatch};

fn supported_strategies() -> impl Iterator<Item = TimeoutStrategy> {
    ALL_STRATEGIES.into_iter().filter(|s| s.is_supported())
}

#[test]
fn acquire_is_mutually_exclusive() {
    let monitor = LowLevelMonitor::new().unwrap();
    let inside = AtomicUsize::new(0);
    let total = AtomicUsize::new(0);
    crossbeam::scope(|s| {
        for _ in 0..8 {
            s.spawn(|_| {
                for _ in 0..2_000 {
                    monitor.acquire();
                    assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0);
                    total.fetch_add(1, Ordering::Relaxed);
                    assert_eq!(inside.fetch_sub(1, Ordering::SeqCst), 1);
                    monitor.release();
                }
            });
        }
    })
    .unwrap();
    assert_eq!(total.load(Ordering::SeqCst), 8 * 2_000);
}

#[test]
fn unsignaled_timed_wait_lasts_the_timeout() {
    for strategy in supported_strategies() {
        let monitor = LowLevelMonitor::with_strategy(strategy).unwrap();
        monitor.acquire();
        let stopwatch = Stopwatch::start();
        let signaled = monitor.timed_wait(200);
        let elapsed = stopwatch.elapsed();
        monitor.release();
        assert!(!signaled, "{}", strategy);
        // At most one slice late, plus a fixed scheduling margin.
        assert_elapsed!(elapsed, 200, 200 + 100 + 50);
    }
}

#[test]
fn zero_timeout_returns_promptly() {
    for strategy in supported_strategies() {
        let monitor = LowLevelMonitor::with_strategy(strategy).unwrap();
        monitor.acquire();
        let stopwatch = Stopwatch::start();
        assert!(!monitor.timed_wait(0));
        assert_elapsed!(stopwatch.elapsed(), 0, 50);
        monitor.release();
    }
}

#[test]
fn signal_before_deadline_wakes_the_timed_waiter() {
    for strategy in supported_strategies() {
        let monitor = Arc::new(LowLevelMonitor::with_strategy(strategy).unwrap());
        let waiting = Arc::new(AtomicBool::new(false));

        let waiter = {
            let monitor = monitor.clone();
            let waiting = waiting.clone();
            thread::spawn(move || {
                monitor.acquire();
                waiting.store(true, Ordering::SeqCst);
                let stopwatch = Stopwatch::start();
                let signaled = monitor.timed_wait(5_000);
                let elapsed = stopwatch.elapsed();
                monitor.release();
                (signaled, elapsed)
            })
        };

        // `waiting` is set under the lock, so once it is seen the waiter is
        // parked in `timed_wait` and its stopwatch is running.
        assert!(eventually(Duration::from_secs(5), || {
            monitor.acquire();
            let parked = waiting.load(Ordering::SeqCst);
            monitor.release();
            parked
        }));
        thread::sleep(Duration::from_millis(50));
        monitor.acquire();
        monitor.signal_and_release();

        let (signaled, elapsed) = waiter.join().unwrap();
        assert!(signaled, "{}", strategy);
        assert_elapsed!(elapsed, 45, 150 + 100);
    }
}

#[test]
fn signal_and_release_wakes_exactly_one_waiter() {
    const WAITERS: usize = 4;
    let monitor = Arc::new(LowLevelMonitor::new().unwrap());
    let parked = Arc::new(AtomicUsize::new(0));
    let woken = Arc::new(AtomicUsize::new(0));

    let handles = {
        let monitor = monitor.clone();
        let parked = parked.clone();
        let woken = woken.clone();
        spawn_all("waiter", WAITERS, move |_| {
            monitor.acquire();
            parked.fetch_add(1, Ordering::SeqCst);
            monitor.wait();
            woken.fetch_add(1, Ordering::SeqCst);
            monitor.release();
        })
    };

    assert!(eventually(Duration::from_secs(5), || {
        monitor.acquire();
        let all_parked = parked.load(Ordering::SeqCst) == WAITERS;
        monitor.release();
        all_parked
    }));

    for round in 1..=WAITERS {
        monitor.acquire();
        monitor.signal_and_release();
        assert!(eventually(Duration::from_secs(5), || woken.load(Ordering::SeqCst) >= round));
        thread::sleep(Duration::from_millis(50));
        assert_eq!(woken.load(Ordering::SeqCst), round);
    }

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn wait_returns_with_the_lock_held() {
    let monitor = Arc::new(LowLevelMonitor::new().unwrap());
    let parked = Arc::new(AtomicBool::new(false));
    let returned = Arc::new(AtomicBool::new(false));

    let waiter = {
        let monitor = monitor.clone();
        let parked = parked.clone();
        let returned = returned.clone();
        thread::spawn(move || {
            monitor.acquire();
            parked.store(true, Ordering::SeqCst);
            monitor.wait();
            returned.store(true, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(150));
            monitor.release();
        })
    };

    assert!(eventually(Duration::from_secs(5), || {
        monitor.acquire();
        let is_parked = parked.load(Ordering::SeqCst);
        if is_parked {
            monitor.signal_and_release();
        } else {
            monitor.release();
        }
        is_parked
    }));

    assert!(eventually(Duration::from_secs(5), || returned.load(Ordering::SeqCst)));
    let stopwatch = Stopwatch::start();
    monitor.acquire();
    assert_elapsed!(stopwatch.elapsed(), 50, 5_000);
    monitor.release();
    waiter.join().unwrap();
}
