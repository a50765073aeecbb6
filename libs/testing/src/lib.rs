use std::{
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

#[macro_use]
extern crate log;

pub struct Stopwatch {
    start: Instant,
}

impl Stopwatch {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.elapsed().as_millis()
    }
}

/// Asserts that a `Duration` lies in `[lo_ms, hi_ms]` milliseconds.
#[macro_export]
macro_rules! assert_elapsed {
    ($elapsed:expr, $lo_ms:expr, $hi_ms:expr) => {{
        let elapsed: ::std::time::Duration = $elapsed;
        let lo = ::std::time::Duration::from_millis($lo_ms);
        let hi = ::std::time::Duration::from_millis($hi_ms);
        assert!(
            elapsed >= lo && elapsed <= hi,
            "elapsed {:?} outside [{:?}, {:?}]",
            elapsed,
            lo,
            hi
        );
    }};
}

/// Spawns `count` named threads running `f(index)`.
pub fn spawn_all<T, F>(name: &str, count: usize, f: F) -> Vec<JoinHandle<T>>
where
    T: Send + 'static,
    F: Fn(usize) -> T + Send + Sync + Clone + 'static,
{
    (0..count)
        .map(|i| {
            let f = f.clone();
            thread::Builder::new()
                .name(format!("{}-{}", name, i))
                .spawn(move || f(i))
                .unwrap()
        })
        .collect()
}

/// Polls `condition` until it holds or `timeout` passes.
pub fn eventually(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let stopwatch = Stopwatch::start();
    loop {
        if condition() {
            return true;
        }
        if stopwatch.elapsed() >= timeout {
            debug!("condition still false after {:?}", timeout);
            return false;
        }
        thread::sleep(Duration::from_millis(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    #[test]
    fn spawn_all_runs_every_index() {
        let sum = Arc::new(AtomicUsize::new(0));
        let handles = {
            let sum = sum.clone();
            spawn_all("adder", 4, move |i| {
                sum.fetch_add(i, Ordering::SeqCst);
                i
            })
        };
        let results: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results, vec![0, 1, 2, 3]);
        assert_eq!(sum.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn eventually_gives_up() {
        assert!(eventually(Duration::from_millis(5), || true));
        assert!(!eventually(Duration::from_millis(5), || false));
    }

    #[test]
    fn stopwatch_measures_sleeps() {
        let stopwatch = Stopwatch::start();
        thread::sleep(Duration::from_millis(10));
        assert_elapsed!(stopwatch.elapsed(), 10, 5_000);
    }
}
