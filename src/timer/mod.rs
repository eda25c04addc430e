//! Time keeping for the activation controller.
//!
//! The controller never sleeps to debounce. Instead it reads a monotonic
//! [`Clock`] and keeps one-shot [`DebounceTimer`] deadlines that are checked
//! each time it polls. Firing a timer is just a comparison, so it is cheap
//! enough to run between any two events.
//!
//! Contains:
//! - [`Instant`]: a microsecond timestamp from an arbitrary epoch
//! - [`Clock`]: the monotonic time source trait
//! - [`DebounceTimer`]: a one-shot, restartable deadline
//! - [`StdClock`]: a `std::time::Instant` backed clock (feature `std`)
//! - `run_controller_loop`: a blocking poll loop paced by a `DelayNs` provider
//!   (feature `delay-loop`)

use core::ops::Add;
use core::time::Duration;

#[cfg(feature = "delay-loop")]
mod delay;
#[cfg_attr(feature = "delay-loop", allow(unused_imports))]
#[cfg(feature = "delay-loop")]
pub use delay::*;

/// Converts a `Duration` to whole microseconds, saturating at `u64::MAX`.
pub(crate) fn duration_micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

/// A point on a monotonic timeline, in microseconds.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default, Debug, Hash)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Instant(u64);

impl Instant {
    /// Clock epoch.
    pub const ZERO: Instant = Instant(0);

    /// Creates an instant `micros` after the epoch.
    pub const fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    /// Creates an instant `millis` after the epoch.
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis.saturating_mul(1_000))
    }

    /// Microseconds since the epoch.
    pub const fn as_micros(self) -> u64 {
        self.0
    }

    /// Time elapsed since `earlier`, or zero if `earlier` is later than `self`.
    pub fn saturating_duration_since(self, earlier: Instant) -> Duration {
        Duration::from_micros(self.0.saturating_sub(earlier.0))
    }
}

impl Add<Duration> for Instant {
    type Output = Instant;

    fn add(self, rhs: Duration) -> Self::Output {
        Instant(self.0.saturating_add(duration_micros(rhs)))
    }
}

/// A monotonic time source.
pub trait Clock {
    /// The current time. Must never go backwards.
    fn now(&mut self) -> Instant;
}

impl<C: Clock + ?Sized> Clock for &mut C {
    fn now(&mut self) -> Instant {
        (**self).now()
    }
}

/// Clock backed by `std::time::Instant`, with its epoch at construction.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdClock {
    /// Starts a clock at [`Instant::ZERO`].
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for StdClock {
    fn now(&mut self) -> Instant {
        Instant(duration_micros(self.origin.elapsed()))
    }
}

/// A one-shot timer that can be restarted.
///
/// The timer is polled rather than interrupt driven: [`poll`](DebounceTimer::poll)
/// returns `true` exactly once per arming, on the first call at or after the
/// deadline. Restarting an armed timer pushes the deadline out; it never
/// produces an extra expiry.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct DebounceTimer {
    period: Duration,
    deadline: Option<Instant>,
}

impl DebounceTimer {
    /// Creates a stopped timer.
    pub const fn new(period: Duration) -> Self {
        Self {
            period,
            deadline: None,
        }
    }

    /// The period the timer runs for once started.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Arms the timer to expire one period after `now`, replacing any pending deadline.
    pub fn restart(&mut self, now: Instant) {
        self.deadline = Some(now + self.period);
    }

    /// Disarms the timer without firing.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Returns `true` while a deadline is pending.
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// The pending deadline, if armed.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before expiry, if armed.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }

    /// Fires the timer if its deadline has passed.
    ///
    /// # Returns
    /// `true` once per arming, when `now` reaches the deadline. The timer is
    /// disarmed when it fires.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instant_arithmetic() {
        let t = Instant::from_millis(2);
        assert_eq!(t.as_micros(), 2_000);
        assert_eq!((t + Duration::from_micros(500)).as_micros(), 2_500);
        assert_eq!(
            Instant::from_micros(100).saturating_duration_since(t),
            Duration::ZERO
        );
        assert_eq!(
            Instant::from_micros(u64::MAX) + Duration::from_secs(1),
            Instant::from_micros(u64::MAX)
        );
    }

    #[test]
    fn test_timer_fires_once() {
        let mut timer = DebounceTimer::new(Duration::from_secs(5));
        assert!(!timer.is_armed());
        assert!(!timer.poll(Instant::from_millis(10_000)));

        timer.restart(Instant::ZERO);
        assert!(!timer.poll(Instant::from_millis(4_999)));
        assert!(timer.poll(Instant::from_millis(5_000)));
        assert!(!timer.poll(Instant::from_millis(6_000)));
        assert!(!timer.is_armed());
    }

    #[test]
    fn test_restart_pushes_deadline() {
        let mut timer = DebounceTimer::new(Duration::from_secs(5));
        timer.restart(Instant::ZERO);
        timer.restart(Instant::from_millis(3_000));
        assert_eq!(timer.deadline(), Some(Instant::from_millis(8_000)));
        assert!(!timer.poll(Instant::from_millis(5_000)));
        assert_eq!(
            timer.remaining(Instant::from_millis(5_000)),
            Some(Duration::from_secs(3))
        );
        assert!(timer.poll(Instant::from_millis(8_000)));
    }

    #[test]
    fn test_cancel() {
        let mut timer = DebounceTimer::new(Duration::from_millis(10));
        timer.restart(Instant::ZERO);
        timer.cancel();
        assert!(!timer.poll(Instant::from_millis(20)));
        assert_eq!(timer.remaining(Instant::ZERO), None);
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_std_clock_is_monotonic() {
        let mut clock = StdClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
