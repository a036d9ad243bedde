use std::ops::{Add, AddAssign};
use std::time::Duration;

/// DMG master clock.
pub const CLOCK_HZ: u64 = 4_194_304;

/// Wall-clock time `cycles` T-states take on hardware.
pub fn nominal_duration(cycles: u32) -> Duration {
    Duration::from_nanos(cycles as u64 * 1_000_000_000 / CLOCK_HZ)
}

/// Nominal duration minus time actually spent. Negative when emulation is
/// running behind real hardware; that is not an error.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Slack {
    nanos: i64,
}

impl Slack {
    pub fn measure(cycles: u32, elapsed: Duration) -> Slack {
        let nominal = nominal_duration(cycles).as_nanos() as i64;
        let elapsed = i64::try_from(elapsed.as_nanos()).unwrap_or(i64::MAX);
        Slack {
            nanos: nominal.saturating_sub(elapsed),
        }
    }

    pub fn from_nanos(nanos: i64) -> Slack {
        Slack { nanos }
    }

    pub fn as_nanos(&self) -> i64 {
        self.nanos
    }

    pub fn is_behind(&self) -> bool {
        self.nanos < 0
    }

    /// How long the host may sleep, if it is ahead at all.
    pub fn sleep_duration(&self) -> Option<Duration> {
        u64::try_from(self.nanos)
            .ok()
            .filter(|&n| n > 0)
            .map(Duration::from_nanos)
    }
}

impl Add for Slack {
    type Output = Slack;

    fn add(self, rhs: Slack) -> Slack {
        Slack {
            nanos: self.nanos.saturating_add(rhs.nanos),
        }
    }
}

impl AddAssign for Slack {
    fn add_assign(&mut self, rhs: Slack) {
        *self = *self + rhs;
    }
}

/// Result of one `CPU::tick`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tick {
    pub cycles: u8,
    pub slack: Slack,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_second_of_cycles() {
        assert_eq!(nominal_duration(CLOCK_HZ as u32), Duration::from_secs(1));
    }

    #[test]
    fn slack_goes_negative_when_overrun() {
        let slack = Slack::measure(4, Duration::from_millis(1));
        assert!(slack.is_behind());
        assert_eq!(slack.sleep_duration(), None);
    }

    #[test]
    fn slack_positive_when_ahead() {
        let slack = Slack::measure(70224, Duration::ZERO);
        assert!(!slack.is_behind());
        // 70224 T-states is one frame, a little under 16.75 ms.
        assert_eq!(slack.as_nanos(), 16_742_706);
        assert!(slack.sleep_duration().is_some());
    }

    #[test]
    fn slack_accumulates() {
        let mut total = Slack::default();
        total += Slack::from_nanos(500);
        total += Slack::from_nanos(-200);
        assert_eq!(total.as_nanos(), 300);
    }
}
