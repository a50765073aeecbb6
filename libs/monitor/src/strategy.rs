use core::fmt;

use spin::Once;

use crate::time::SystemClock;

/// How `timed_wait` bounds a wait, depending on what the platform offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeoutStrategy {
    /// A relative-timeout wait that the platform keeps on a monotonic base.
    RelativeMonotonic,
    /// An absolute-deadline wait on a condition bound to `CLOCK_MONOTONIC`.
    AbsoluteMonotonic,
    /// Wall-clock waits sliced to at most 100 ms, with the elapsed time
    /// measured on `CLOCK_MONOTONIC`.
    MonotonicMeasured,
    /// A single wall-clock absolute-deadline wait.
    WallClock,
}

pub const ALL_STRATEGIES: [TimeoutStrategy; 4] = [
    TimeoutStrategy::RelativeMonotonic,
    TimeoutStrategy::AbsoluteMonotonic,
    TimeoutStrategy::MonotonicMeasured,
    TimeoutStrategy::WallClock,
];

static DETECTED: Once<TimeoutStrategy> = Once::new();

impl TimeoutStrategy {
    pub fn is_supported(self) -> bool {
        match self {
            Self::RelativeMonotonic => cfg!(target_vendor = "apple"),
            Self::AbsoluteMonotonic => crate::raw::HAS_CONDATTR_SETCLOCK && SystemClock::has_monotonic(),
            Self::MonotonicMeasured => SystemClock::has_monotonic(),
            Self::WallClock => true,
        }
    }

    /// The preferred strategy for this process. Detected once and cached.
    pub fn detect() -> Self {
        *DETECTED.call_once(|| {
            let strategy = if cfg!(monitor_force_fallback) && Self::MonotonicMeasured.is_supported() {
                Self::MonotonicMeasured
            } else {
                ALL_STRATEGIES
                    .into_iter()
                    .find(|s| s.is_supported())
                    .unwrap_or(Self::WallClock)
            };
            trace!("timed waits use the {} strategy", strategy);
            strategy
        })
    }

    /// Whether the condition variable must be bound to `CLOCK_MONOTONIC`.
    pub(crate) fn binds_monotonic_clock(self) -> bool {
        self == Self::AbsoluteMonotonic
    }

    /// Whether a wall clock change can affect a single blocking wait.
    pub fn is_degraded(self) -> bool {
        matches!(self, Self::MonotonicMeasured | Self::WallClock)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::RelativeMonotonic => "relative-monotonic",
            Self::AbsoluteMonotonic => "absolute-monotonic",
            Self::MonotonicMeasured => "monotonic-measured",
            Self::WallClock => "wall-clock",
        }
    }
}

impl fmt::Display for TimeoutStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl core::str::FromStr for TimeoutStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_STRATEGIES
            .into_iter()
            .find(|strategy| strategy.name() == s)
            .ok_or_else(|| format!("unknown timeout strategy {:?}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detected_strategy_is_supported_and_stable() {
        let strategy = TimeoutStrategy::detect();
        assert!(strategy.is_supported());
        assert_eq!(strategy, TimeoutStrategy::detect());
    }

    #[test]
    fn fallbacks_are_always_available_on_hosted_targets() {
        assert!(TimeoutStrategy::WallClock.is_supported());
        assert!(TimeoutStrategy::MonotonicMeasured.is_supported());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn linux_binds_the_condition_to_the_monotonic_clock() {
        assert!(!TimeoutStrategy::RelativeMonotonic.is_supported());
        assert!(TimeoutStrategy::AbsoluteMonotonic.is_supported());
        if !cfg!(monitor_force_fallback) {
            assert_eq!(TimeoutStrategy::detect(), TimeoutStrategy::AbsoluteMonotonic);
        }
    }

    #[test]
    fn names_parse_back() {
        for strategy in ALL_STRATEGIES {
            assert_eq!(strategy.name().parse::<TimeoutStrategy>(), Ok(strategy));
        }
        assert!("futex".parse::<TimeoutStrategy>().is_err());
    }
}
