use std::time::{Duration, Instant};

/// Timing snapshot taken at one host refresh.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Time since the clock origin. Strictly increasing across refreshes.
    pub since_start: Duration,
}

/// Stamps host refreshes with `FrameTime` snapshots.
///
/// `since_start` is the tick timestamp handed to the frame governor.
#[derive(Debug, Clone)]
pub struct FrameClock {
    origin: Instant,
    last_since_start: Option<Duration>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            last_since_start: None,
        }
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> FrameTime {
        let mut since_start = now.saturating_duration_since(self.origin);

        // Two refreshes can land on the same Instant on coarse clocks.
        if let Some(last) = self.last_since_start {
            if since_start <= last {
                since_start = last + Duration::from_nanos(1);
            }
        }
        self.last_since_start = Some(since_start);

        FrameTime { since_start }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
