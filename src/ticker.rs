use chrono::{DateTime, Duration, Local};

/// Default tick interval in milliseconds
pub const DEFAULT_TICK_MS: u64 = 1000;

/// Get the default tick duration
pub fn tick_duration() -> Duration {
    Duration::milliseconds(DEFAULT_TICK_MS as i64)
}

/// A cooperative periodic deadline on the wall clock.
///
/// The owner polls it from its event loop; `poll` reports whether a tick is due and
/// re-arms the next deadline. Cancelling is dropping the ticker, so an engine that
/// holds it in an `Option` or an enum variant cancels by replacing that value.
#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,
    next_due: DateTime<Local>,
}

impl Ticker {
    /// Start ticking; the first tick is due one interval from `now`
    pub fn start(interval: Duration, now: DateTime<Local>) -> Self {
        let interval = interval.max(Duration::milliseconds(1));
        Self {
            interval,
            next_due: now + interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns true when at least one tick is due. Missed ticks collapse into one.
    pub fn poll(&mut self, now: DateTime<Local>) -> bool {
        if now < self.next_due {
            // Clock moved backwards by more than an interval: re-arm from here
            if self.next_due - now > self.interval {
                self.next_due = now + self.interval;
            }
            return false;
        }
        let missed = (now - self.next_due).num_milliseconds() / self.interval.num_milliseconds();
        self.next_due = self.next_due + self.interval * (missed as i32 + 1);
        true
    }

    /// Time left until the next tick, for bounding an event-loop wait
    pub fn until_next(&self, now: DateTime<Local>) -> Duration {
        (self.next_due - now).max(Duration::zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_tick_duration() {
        assert_eq!(tick_duration(), Duration::seconds(1));
    }

    #[test]
    fn test_poll_fires_once_per_interval() {
        let mut ticker = Ticker::start(Duration::seconds(1), t0());

        assert!(!ticker.poll(t0()));
        assert!(!ticker.poll(t0() + Duration::milliseconds(999)));
        assert!(ticker.poll(t0() + Duration::seconds(1)));
        assert!(!ticker.poll(t0() + Duration::milliseconds(1500)));
        assert!(ticker.poll(t0() + Duration::seconds(2)));
    }

    #[test]
    fn test_missed_ticks_collapse() {
        let mut ticker = Ticker::start(Duration::seconds(1), t0());

        assert!(ticker.poll(t0() + Duration::milliseconds(5500)));
        assert!(!ticker.poll(t0() + Duration::milliseconds(5900)));
        assert_eq!(
            ticker.until_next(t0() + Duration::milliseconds(5900)),
            Duration::milliseconds(100)
        );
    }

    #[test]
    fn test_backwards_clock_rearms() {
        let mut ticker = Ticker::start(Duration::seconds(1), t0());

        assert!(!ticker.poll(t0() - Duration::seconds(30)));
        assert!(ticker.poll(t0() - Duration::seconds(29)));
    }
}
