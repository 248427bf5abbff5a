use std::time::Duration;

/// Counts events over consecutive windows and reports the measured rate.
///
/// Used to compare the governor's accepted cadence against its target.
#[derive(Debug, Clone)]
pub struct RateMeter {
    window: Duration,
    window_start: Option<Duration>,
    count: u32,
    rate: Option<f64>,
}

impl RateMeter {
    pub fn new(window: Duration) -> Self {
        Self {
            window: window.max(Duration::from_millis(250)),
            window_start: None,
            count: 0,
            rate: None,
        }
    }

    /// Records one event. Returns the new rate when a window just closed.
    pub fn record(&mut self, at: Duration) -> Option<f64> {
        let Some(start) = self.window_start else {
            self.window_start = Some(at);
            return None;
        };

        self.count += 1;
        let elapsed = at.saturating_sub(start);
        if elapsed < self.window {
            return None;
        }

        let rate = self.count as f64 / elapsed.as_secs_f64();
        self.rate = Some(rate);
        self.window_start = Some(at);
        self.count = 0;
        Some(rate)
    }

    /// Rate of the last completed window.
    #[inline]
    pub fn rate(&self) -> Option<f64> {
        self.rate
    }

    /// Drops the open window, e.g. after a pause.
    pub fn reset(&mut self) {
        self.window_start = None;
        self.count = 0;
    }
}

impl Default for RateMeter {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_after_a_full_window() {
        let mut meter = RateMeter::default();
        let mut reported = None;
        for i in 0..=30 {
            if let Some(r) = meter.record(Duration::from_secs_f64(i as f64 / 30.0)) {
                reported = Some(r);
            }
        }
        let rate = reported.expect("one window closed");
        assert!((rate - 30.0).abs() < 0.01, "rate = {rate}");
        assert_eq!(meter.rate(), Some(rate));
    }

    #[test]
    fn silent_before_window_closes() {
        let mut meter = RateMeter::default();
        for i in 0..10 {
            assert_eq!(meter.record(Duration::from_millis(i * 50)), None);
        }
        assert_eq!(meter.rate(), None);
    }

    #[test]
    fn reset_discards_partial_window() {
        let mut meter = RateMeter::default();
        meter.record(Duration::from_millis(0));
        meter.record(Duration::from_millis(500));
        meter.reset();

        // First event after reset only opens the window.
        assert_eq!(meter.record(Duration::from_millis(5_000)), None);
        assert_eq!(meter.record(Duration::from_millis(5_500)), None);
        assert!(meter.record(Duration::from_millis(6_000)).is_some());
    }
}
