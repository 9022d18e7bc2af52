use chrono::Utc;

/// Source of the wall-clock timestamp used to prefix stored filenames.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// A clock stuck at a single instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_tracks_wall_time() {
        let before = Utc::now().timestamp_millis();
        let now = SystemClock.now_millis();
        let after = Utc::now().timestamp_millis();

        assert!(before <= now && now <= after);
    }

    #[test]
    fn test_fixed_clock_never_moves() {
        let clock = FixedClock(1_700_000_000_000);
        assert_eq!(clock.now_millis(), 1_700_000_000_000);
        assert_eq!(clock.now_millis(), 1_700_000_000_000);
    }
}
