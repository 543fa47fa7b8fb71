use std::time::{Duration, Instant};

/// Decides when the next animation step runs.
///
/// A step fires at most once per `interval`, and only while the scene's
/// animate flag is on. Disabling never interrupts a frame already running;
/// it only stops the next step from being scheduled.
#[derive(Debug, Clone)]
pub struct AnimationTicker {
    interval: Duration,
    previous: Option<Instant>,
}

impl AnimationTicker {
    /// 30 ms between steps.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(30);

    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            previous: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns true when a step should run at `now`.
    pub fn should_step(&mut self, now: Instant, enabled: bool) -> bool {
        if !enabled {
            return false;
        }
        match self.previous {
            Some(prev) if now.saturating_duration_since(prev) < self.interval => false,
            _ => {
                self.previous = Some(now);
                true
            }
        }
    }

    /// Time left until the next step may fire, for scheduling a wake-up.
    pub fn next_deadline(&self, now: Instant) -> Option<Instant> {
        let prev = self.previous?;
        let due = prev + self.interval;
        (due > now).then_some(due)
    }

    /// Forgets the last step so the next enabled check fires immediately.
    pub fn reset(&mut self) {
        self.previous = None;
    }
}

impl Default for AnimationTicker {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn fires_at_most_once_per_interval() {
        let t0 = Instant::now();
        let mut ticker = AnimationTicker::default();

        assert!(ticker.should_step(t0, true));
        assert!(!ticker.should_step(t0 + MS * 10, true));
        assert!(!ticker.should_step(t0 + MS * 29, true));
        assert!(ticker.should_step(t0 + MS * 30, true));
        assert!(!ticker.should_step(t0 + MS * 31, true));
    }

    #[test]
    fn never_fires_while_disabled() {
        let t0 = Instant::now();
        let mut ticker = AnimationTicker::default();
        for i in 0..10u32 {
            assert!(!ticker.should_step(t0 + MS * (i * 100), false));
        }
        // Re-enabling fires straight away.
        assert!(ticker.should_step(t0 + MS * 2000, true));
    }

    #[test]
    fn deadline_follows_last_step() {
        let t0 = Instant::now();
        let mut ticker = AnimationTicker::new(MS * 50);
        assert_eq!(ticker.next_deadline(t0), None);
        ticker.should_step(t0, true);
        assert_eq!(ticker.next_deadline(t0 + MS * 10), Some(t0 + MS * 50));
        assert_eq!(ticker.next_deadline(t0 + MS * 60), None);
        ticker.reset();
        assert_eq!(ticker.next_deadline(t0 + MS * 10), None);
    }
}
