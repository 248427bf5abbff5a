use std::time::Duration;

/// Nominal display refresh rate assumed when nothing better is known.
pub const DEFAULT_HOST_RATE_HZ: f64 = 60.0;

/// Model of the host's tick period.
///
/// `Fixed` trusts a configured refresh rate. `Measured` starts from a nominal rate
/// and follows the deltas between delivered ticks, so a 144 Hz display is not
/// throttled with 60 Hz arithmetic.
#[derive(Debug, Clone)]
pub enum HostPeriod {
    Fixed { rate_hz: f64 },
    Measured(PeriodEstimator),
}

impl HostPeriod {
    #[inline]
    pub fn fixed(rate_hz: f64) -> Self {
        HostPeriod::Fixed { rate_hz }
    }

    #[inline]
    pub fn measured(nominal_rate_hz: f64) -> Self {
        HostPeriod::Measured(PeriodEstimator::new(nominal_rate_hz))
    }

    /// Current period estimate in seconds.
    pub fn period_secs(&self) -> f64 {
        match self {
            HostPeriod::Fixed { rate_hz } => 1.0 / rate_hz,
            HostPeriod::Measured(est) => est.period_secs(),
        }
    }

    /// Current rate estimate in Hz.
    #[inline]
    pub fn rate_hz(&self) -> f64 {
        1.0 / self.period_secs()
    }

    /// Feeds one delivered tick timestamp. No-op for `Fixed`.
    pub fn observe(&mut self, timestamp: Duration) {
        if let HostPeriod::Measured(est) = self {
            est.observe(timestamp);
        }
    }

    /// Forgets the previous timestamp so the next delta is not measured.
    ///
    /// Call after the tick stream was interrupted (pause, cancel).
    pub fn interrupt(&mut self) {
        if let HostPeriod::Measured(est) = self {
            est.interrupt();
        }
    }
}

impl Default for HostPeriod {
    fn default() -> Self {
        HostPeriod::fixed(DEFAULT_HOST_RATE_HZ)
    }
}

/// Exponential moving average over inter-tick deltas.
///
/// Deltas outside [`MIN_RATE_HZ`](Self::MIN_RATE_HZ)..[`MAX_RATE_HZ`](Self::MAX_RATE_HZ)
/// are never samples: shorter ones are unpaced frames, longer ones are gaps.
/// Deltas more than [`DEFAULT_OUTLIER_FACTOR`](Self::DEFAULT_OUTLIER_FACTOR) away
/// from the estimate on either side are rejected, and after
/// [`RESEED_AFTER`](Self::RESEED_AFTER) such rejections in a row the estimate is
/// restarted from the latest delta.
#[derive(Debug, Clone)]
pub struct PeriodEstimator {
    period_secs: f64,
    last_seen: Option<Duration>,
    samples: u64,
    rejected_in_a_row: u32,
    alpha: f64,
    outlier_factor: f64,
}

impl PeriodEstimator {
    /// Smoothing factor applied to each accepted sample.
    pub const DEFAULT_ALPHA: f64 = 0.1;

    /// Deltas further than this factor from the estimate are outliers.
    pub const DEFAULT_OUTLIER_FACTOR: f64 = 3.0;

    /// Slowest refresh rate a delta may represent.
    pub const MIN_RATE_HZ: f64 = 20.0;

    /// Fastest refresh rate a delta may represent.
    pub const MAX_RATE_HZ: f64 = 500.0;

    /// Consecutive in-range outliers that restart the estimate.
    pub const RESEED_AFTER: u32 = 8;

    pub fn new(nominal_rate_hz: f64) -> Self {
        let nominal = nominal_rate_hz.clamp(Self::MIN_RATE_HZ, Self::MAX_RATE_HZ);
        Self {
            period_secs: 1.0 / nominal,
            last_seen: None,
            samples: 0,
            rejected_in_a_row: 0,
            alpha: Self::DEFAULT_ALPHA,
            outlier_factor: Self::DEFAULT_OUTLIER_FACTOR,
        }
    }

    #[inline]
    pub fn period_secs(&self) -> f64 {
        self.period_secs
    }

    /// Number of deltas folded into the estimate since the last reseed.
    #[inline]
    pub fn samples(&self) -> u64 {
        self.samples
    }

    pub fn observe(&mut self, timestamp: Duration) {
        let prev = self.last_seen.replace(timestamp);
        let Some(prev) = prev else { return };

        let delta = timestamp.saturating_sub(prev).as_secs_f64();
        if !(1.0 / Self::MAX_RATE_HZ..=1.0 / Self::MIN_RATE_HZ).contains(&delta) {
            return;
        }

        let low = self.period_secs / self.outlier_factor;
        let high = self.period_secs * self.outlier_factor;
        if delta < low || delta > high {
            self.rejected_in_a_row += 1;
            if self.rejected_in_a_row < Self::RESEED_AFTER {
                return;
            }
            log::debug!(
                "host period: reseeding {:.3}ms -> {:.3}ms",
                self.period_secs * 1000.0,
                delta * 1000.0
            );
            self.samples = 0;
        }
        self.rejected_in_a_row = 0;

        // The first few samples dominate so a wrong nominal rate is corrected quickly.
        let alpha = self.alpha.max(1.0 / (self.samples as f64 + 1.0));
        self.period_secs += alpha * (delta - self.period_secs);
        self.samples += 1;
    }

    pub fn interrupt(&mut self) {
        self.last_seen = None;
    }
}
