use core::mem::MaybeUninit;

pub const NANOS_PER_SEC: i64 = 1_000_000_000;
pub const NANOS_PER_MILLI: i64 = 1_000_000;

/// A point on one of the platform clocks, split the way `timespec` is.
///
/// `nsec` is always normalized to `0..NANOS_PER_SEC`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timespec {
    pub sec: i64,
    pub nsec: i64,
}

impl Timespec {
    pub const fn new(sec: i64, nsec: i64) -> Self {
        Self { sec, nsec }
    }

    pub const fn from_millis(millis: i64) -> Self {
        Self {
            sec: millis / 1000,
            nsec: (millis % 1000) * NANOS_PER_MILLI,
        }
    }

    /// Reads `clock_id`. Returns `None` if the clock is not available.
    pub fn read(clock_id: libc::clockid_t) -> Option<Self> {
        let mut ts = MaybeUninit::<libc::timespec>::uninit();
        let error = unsafe { libc::clock_gettime(clock_id, ts.as_mut_ptr()) };
        if error != 0 {
            return None;
        }
        let ts = unsafe { ts.assume_init() };
        Some(Self::new(ts.tv_sec as i64, ts.tv_nsec as i64))
    }

    /// `self + millis`, carrying nanosecond overflow into the seconds field.
    pub const fn add_millis(self, millis: u64) -> Self {
        let nanos = millis * NANOS_PER_MILLI as u64 + self.nsec as u64;
        Self {
            sec: self.sec + (nanos / NANOS_PER_SEC as u64) as i64,
            nsec: (nanos % NANOS_PER_SEC as u64) as i64,
        }
    }

    /// Whole milliseconds elapsed from `earlier` to `self`.
    pub const fn millis_since(self, earlier: Self) -> i64 {
        let mut sec = self.sec - earlier.sec;
        let mut nsec = self.nsec - earlier.nsec;
        if nsec < 0 {
            sec -= 1;
            nsec += NANOS_PER_SEC;
        }
        sec * 1000 + nsec / NANOS_PER_MILLI
    }

    pub fn to_libc(self) -> libc::timespec {
        // Some targets pad `timespec`, so build it from zeroed storage.
        let mut ts: libc::timespec = unsafe { core::mem::zeroed() };
        ts.tv_sec = self.sec as libc::time_t;
        ts.tv_nsec = self.nsec as _;
        ts
    }
}

/// Time sources consulted by the bounded wait.
///
/// `monotonic` measures how long a wait has really lasted. `realtime` is the
/// basis for deadlines handed to a condition variable that runs on the wall
/// clock.
pub trait Clock {
    fn monotonic(&self) -> Timespec;
    fn realtime(&self) -> Timespec;
}

/// The process clocks: `CLOCK_MONOTONIC` and `CLOCK_REALTIME`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    pub fn has_monotonic() -> bool {
        Timespec::read(libc::CLOCK_MONOTONIC).is_some()
    }
}

impl Clock for SystemClock {
    fn monotonic(&self) -> Timespec {
        let now = Timespec::read(libc::CLOCK_MONOTONIC);
        debug_assert!(now.is_some());
        now.unwrap_or_default()
    }

    fn realtime(&self) -> Timespec {
        let now = Timespec::read(libc::CLOCK_REALTIME);
        debug_assert!(now.is_some());
        now.unwrap_or_default()
    }
}
