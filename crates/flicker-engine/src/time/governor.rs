use std::time::Duration;

use super::host_period::HostPeriod;
use super::tick::{Tick, TickHandle, TickSource};

/// Consumer render hook invoked on accepted ticks.
///
/// Implemented for every `FnMut()`; stateful consumers implement it directly and
/// are reachable through [`FrameGovernor::callback_mut`].
pub trait RenderCallback {
    fn render(&mut self);
}

impl<F> RenderCallback for F
where
    F: FnMut(),
{
    #[inline]
    fn render(&mut self) {
        self()
    }
}

/// Whether a tick request is outstanding.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum GovernorState {
    Armed,
    Idle,
}

/// Outcome of [`FrameGovernor::on_tick`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TickDecision {
    /// The render callback ran.
    Accepted,
    /// Too early for the target rate.
    Skipped,
    /// The tick answered a request that was cancelled or superseded.
    Stale,
}

impl TickDecision {
    #[inline]
    pub fn is_accepted(self) -> bool {
        self == TickDecision::Accepted
    }
}

/// Decision counters.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct GovernorStats {
    pub accepted: u64,
    pub skipped: u64,
    pub stale: u64,
}

/// Throttles a render callback fed by host refresh ticks down to a target rate.
///
/// Every live tick re-arms the source, so the governor stays `Armed` except while
/// a tick is being handled or after [`cancel_pending`](Self::cancel_pending).
///
/// A tick is accepted when
/// `elapsed >= host_period * (host_rate / target_rate) - host_period / 2`.
/// The half-period tolerance absorbs the quantization of tick timestamps to
/// refresh boundaries; without it the accepted cadence trends one tick late.
pub struct FrameGovernor<S, R>
where
    S: TickSource,
    R: RenderCallback,
{
    source: S,
    callback: R,

    target_rate: f64,
    host: HostPeriod,

    last_accepted: Duration,
    pending: Option<TickHandle>,

    stats: GovernorStats,
}

impl<S, R> FrameGovernor<S, R>
where
    S: TickSource,
    R: RenderCallback,
{
    /// Creates an armed governor assuming a fixed 60 Hz host.
    pub fn new(callback: R, initial_rate: f64, source: S) -> Self {
        Self::with_host_period(callback, initial_rate, source, HostPeriod::default())
    }

    /// Creates an armed governor with an explicit host period model.
    pub fn with_host_period(callback: R, initial_rate: f64, source: S, host: HostPeriod) -> Self {
        warn_if_invalid(initial_rate);

        let mut governor = Self {
            source,
            callback,
            target_rate: initial_rate,
            host,
            last_accepted: Duration::ZERO,
            pending: None,
            stats: GovernorStats::default(),
        };
        governor.request_tick();
        governor
    }

    /// Re-targets the governor and re-arms the tick source.
    ///
    /// The new rate applies from the very next tick. The outstanding request is
    /// cancelled first, so the tick it would have produced cannot render twice.
    pub fn set_rate(&mut self, rate: f64) {
        warn_if_invalid(rate);
        log::debug!("frame governor: target {:.3} -> {:.3} fps", self.target_rate, rate);

        self.target_rate = rate;
        self.request_tick();
    }

    /// Requests exactly one future tick, replacing any outstanding request.
    pub fn request_tick(&mut self) {
        if let Some(old) = self.pending.take() {
            self.source.cancel_tick(old);
        }
        self.pending = Some(self.source.request_tick());
    }

    /// Cancels the outstanding request, if any. Idempotent.
    ///
    /// The last accepted timestamp is kept.
    pub fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.source.cancel_tick(handle);
            self.host.interrupt();
            log::debug!("frame governor: paused after {} accepted frames", self.stats.accepted);
        }
    }

    /// Handles one delivered tick.
    pub fn on_tick(&mut self, tick: Tick) -> TickDecision {
        if self.pending != Some(tick.handle) {
            self.stats.stale += 1;
            log::trace!("frame governor: stale tick {:?}", tick.handle);
            return TickDecision::Stale;
        }
        self.pending = None;

        self.host.observe(tick.timestamp);

        let elapsed = tick.timestamp.saturating_sub(self.last_accepted).as_secs_f64();
        let decision = if elapsed < self.min_interval() {
            self.stats.skipped += 1;
            TickDecision::Skipped
        } else {
            self.callback.render();
            self.last_accepted = tick.timestamp;
            self.stats.accepted += 1;
            TickDecision::Accepted
        };

        log::trace!(
            "frame governor: {:?} at {:.3}ms (elapsed {:.3}ms)",
            decision,
            tick.timestamp.as_secs_f64() * 1000.0,
            elapsed * 1000.0
        );

        self.request_tick();
        decision
    }

    /// Minimum time between accepted ticks in seconds. May be zero or negative.
    pub fn min_interval(&self) -> f64 {
        let host_period = self.host.period_secs();
        let host_rate = 1.0 / host_period;
        host_period * (host_rate / self.target_rate) - host_period * 0.5
    }

    #[inline]
    pub fn target_rate(&self) -> f64 {
        self.target_rate
    }

    #[inline]
    pub fn last_accepted(&self) -> Duration {
        self.last_accepted
    }

    #[inline]
    pub fn pending(&self) -> Option<TickHandle> {
        self.pending
    }

    #[inline]
    pub fn state(&self) -> GovernorState {
        if self.pending.is_some() {
            GovernorState::Armed
        } else {
            GovernorState::Idle
        }
    }

    #[inline]
    pub fn stats(&self) -> GovernorStats {
        self.stats
    }

    #[inline]
    pub fn host_period(&self) -> &HostPeriod {
        &self.host
    }

    #[inline]
    pub fn callback(&self) -> &R {
        &self.callback
    }

    #[inline]
    pub fn callback_mut(&mut self) -> &mut R {
        &mut self.callback
    }

    #[inline]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Host-side access, used to deliver ticks from the source.
    #[inline]
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

fn warn_if_invalid(rate: f64) {
    if !(rate.is_finite() && rate > 0.0) {
        log::warn!("frame governor: target rate {rate} is not a positive number; throttling is undefined");
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::time::TickSlot;

    const HOST_HZ: f64 = 60.0;

    fn at(i: u64, hz: f64) -> Duration {
        Duration::from_secs_f64(i as f64 / hz)
    }

    fn counting() -> (Rc<Cell<u32>>, impl FnMut()) {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        (count, move || c.set(c.get() + 1))
    }

    /// Delivers one host refresh; returns `None` when nothing was armed.
    fn refresh<R: RenderCallback>(
        gov: &mut FrameGovernor<TickSlot, R>,
        timestamp: Duration,
    ) -> Option<TickDecision> {
        let tick = gov.source_mut().fire(timestamp)?;
        Some(gov.on_tick(tick))
    }

    /// Runs `ticks` refreshes at `hz` starting one period after the epoch and
    /// returns the accepted timestamps.
    fn run<R: RenderCallback>(
        gov: &mut FrameGovernor<TickSlot, R>,
        hz: f64,
        ticks: u64,
    ) -> Vec<Duration> {
        let mut accepted = Vec::new();
        for i in 1..=ticks {
            let ts = at(i, hz);
            if refresh(gov, ts) == Some(TickDecision::Accepted) {
                accepted.push(ts);
            }
        }
        accepted
    }

    fn mean_interval(accepted: &[Duration]) -> f64 {
        let first = accepted[0].as_secs_f64();
        let last = accepted[accepted.len() - 1].as_secs_f64();
        (last - first) / (accepted.len() - 1) as f64
    }

    #[test]
    fn construction_arms_immediately() {
        let (count, cb) = counting();
        let gov = FrameGovernor::new(cb, 30.0, TickSlot::new());

        assert_eq!(gov.state(), GovernorState::Armed);
        assert_eq!(gov.source().requests(), 1);
        assert_eq!(gov.last_accepted(), Duration::ZERO);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn thirty_on_sixty_accepts_every_other_tick() {
        let (count, cb) = counting();
        let mut gov = FrameGovernor::new(cb, 30.0, TickSlot::new());
        assert!((gov.min_interval() - 0.025).abs() < 1e-9);

        let decisions: Vec<_> = (0..9)
            .map(|i| refresh(&mut gov, at(i, HOST_HZ)).unwrap())
            .collect();

        use TickDecision::{Accepted as A, Skipped as S};
        assert_eq!(decisions, vec![S, S, A, S, A, S, A, S, A]);
        assert_eq!(count.get(), 4);
        assert_eq!(gov.last_accepted(), at(8, HOST_HZ));
    }

    #[test]
    fn native_rate_accepts_every_tick() {
        let (count, cb) = counting();
        let mut gov = FrameGovernor::new(cb, HOST_HZ, TickSlot::new());

        let accepted = run(&mut gov, HOST_HZ, 120);
        assert_eq!(accepted.len(), 120);
        assert_eq!(count.get(), 120);
        assert_eq!(gov.stats().skipped, 0);
    }

    #[test]
    fn above_native_rate_is_pass_through() {
        let (_, cb) = counting();
        let mut gov = FrameGovernor::new(cb, 240.0, TickSlot::new());
        assert!(gov.min_interval() <= 0.0);

        let accepted = run(&mut gov, HOST_HZ, 60);
        assert_eq!(accepted.len(), 60);
    }

    #[test]
    fn long_run_rate_tracks_target_within_one_host_period() {
        let host_period = 1.0 / HOST_HZ;
        for target in [1.0, 7.0, 12.0, 24.0, 25.0, 29.97, 30.0, 40.0, 45.0, 50.0, 59.0] {
            let mut gov = FrameGovernor::new(|| {}, target, TickSlot::new());
            let accepted = run(&mut gov, HOST_HZ, 60 * 60);

            let expected = host_period * (HOST_HZ / target);
            let got = mean_interval(&accepted);
            assert!(
                (got - expected).abs() <= host_period,
                "target {target}: mean interval {got} vs {expected}"
            );
        }
    }

    #[test]
    fn very_low_rate_skips_many_ticks_in_a_row() {
        let (count, cb) = counting();
        let mut gov = FrameGovernor::new(cb, 0.5, TickSlot::new());

        run(&mut gov, HOST_HZ, 100);
        assert_eq!(count.get(), 0);
        assert_eq!(gov.stats().skipped, 100);
        assert_eq!(gov.state(), GovernorState::Armed);
    }

    #[test]
    fn every_live_tick_rearms() {
        let mut gov = FrameGovernor::new(|| {}, 10.0, TickSlot::new());
        for i in 1..=30 {
            refresh(&mut gov, at(i, HOST_HZ)).unwrap();
            assert_eq!(gov.state(), GovernorState::Armed);
        }
        assert_eq!(gov.source().requests(), 31);
    }

    #[test]
    fn set_rate_between_ticks_never_double_fires() {
        let (count, cb) = counting();
        let mut gov = FrameGovernor::new(cb, 60.0, TickSlot::new());
        run(&mut gov, HOST_HZ, 3);
        assert_eq!(count.get(), 3);

        let superseded = gov.pending().unwrap();
        gov.set_rate(30.0);
        assert_eq!(gov.state(), GovernorState::Armed);
        assert_ne!(gov.pending(), Some(superseded));

        // A late delivery of the superseded request is ignored.
        let ts = at(4, HOST_HZ);
        let stale = Tick { handle: superseded, timestamp: ts };
        assert_eq!(gov.on_tick(stale), TickDecision::Stale);
        assert_eq!(count.get(), 3);

        // The fresh request is the only one answered by this refresh.
        assert_eq!(refresh(&mut gov, ts), Some(TickDecision::Skipped));
        assert_eq!(count.get(), 3);
        assert_eq!(gov.stats().stale, 1);
        assert_eq!(gov.state(), GovernorState::Armed);
    }

    #[test]
    fn set_rate_takes_effect_on_next_tick() {
        let (count, cb) = counting();
        let mut gov = FrameGovernor::new(cb, 30.0, TickSlot::new());
        run(&mut gov, HOST_HZ, 2);
        assert_eq!(count.get(), 1);

        gov.set_rate(60.0);
        assert_eq!(refresh(&mut gov, at(3, HOST_HZ)), Some(TickDecision::Accepted));
        assert_eq!(refresh(&mut gov, at(4, HOST_HZ)), Some(TickDecision::Accepted));
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn cancel_stops_renders_for_good() {
        let (count, cb) = counting();
        let mut gov = FrameGovernor::new(cb, 60.0, TickSlot::new());
        run(&mut gov, HOST_HZ, 5);
        let before = count.get();

        gov.cancel_pending();
        assert_eq!(gov.state(), GovernorState::Idle);

        for i in 6..200 {
            assert_eq!(refresh(&mut gov, at(i, HOST_HZ)), None);
        }
        assert_eq!(count.get(), before);
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut gov = FrameGovernor::new(|| {}, 60.0, TickSlot::new());
        run(&mut gov, HOST_HZ, 2);
        let last = gov.last_accepted();

        gov.cancel_pending();
        gov.cancel_pending();

        assert_eq!(gov.source().cancels(), 1);
        assert_eq!(gov.state(), GovernorState::Idle);
        assert_eq!(gov.last_accepted(), last);
    }

    #[test]
    fn request_after_cancel_resumes() {
        let (count, cb) = counting();
        let mut gov = FrameGovernor::new(cb, 60.0, TickSlot::new());
        gov.cancel_pending();
        assert_eq!(refresh(&mut gov, at(1, HOST_HZ)), None);

        gov.request_tick();
        assert_eq!(refresh(&mut gov, at(2, HOST_HZ)), Some(TickDecision::Accepted));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn request_tick_keeps_a_single_outstanding_request() {
        let mut gov = FrameGovernor::new(|| {}, 60.0, TickSlot::new());
        let first = gov.pending().unwrap();

        gov.request_tick();
        assert_ne!(gov.pending(), Some(first));
        assert_eq!(gov.source().cancels(), 1);
        assert_eq!(gov.source().pending(), gov.pending());
    }

    #[test]
    fn zero_rate_never_renders_and_does_not_panic() {
        let (count, cb) = counting();
        let mut gov = FrameGovernor::new(cb, 0.0, TickSlot::new());
        run(&mut gov, HOST_HZ, 30);
        assert_eq!(count.get(), 0);
        assert_eq!(gov.state(), GovernorState::Armed);
    }

    #[test]
    fn struct_callback_is_reachable() {
        struct Flips(u32);
        impl RenderCallback for Flips {
            fn render(&mut self) {
                self.0 += 1;
            }
        }

        let mut gov = FrameGovernor::new(Flips(0), 60.0, TickSlot::new());
        run(&mut gov, HOST_HZ, 4);
        assert_eq!(gov.callback().0, 4);

        gov.callback_mut().0 = 0;
        assert_eq!(gov.callback().0, 0);
    }

    #[test]
    fn measured_native_rate_survives_startup_burst_and_jitter() {
        let (count, cb) = counting();
        let mut gov = FrameGovernor::with_host_period(
            cb,
            HOST_HZ,
            TickSlot::new(),
            HostPeriod::measured(HOST_HZ),
        );

        // Two unpaced frames before presentation settles.
        refresh(&mut gov, Duration::from_millis(0));
        refresh(&mut gov, Duration::from_millis(1));
        let before = count.get();

        let start = Duration::from_millis(1);
        let mut accepted = 0;
        for i in 1..=600u64 {
            let jitter = match i % 3 {
                0 => -0.001,
                1 => 0.0,
                _ => 0.001,
            };
            let ts = start + Duration::from_secs_f64(i as f64 / HOST_HZ + jitter);
            if refresh(&mut gov, ts) == Some(TickDecision::Accepted) {
                accepted += 1;
            }
        }

        assert_eq!(accepted, 600);
        assert_eq!(count.get() - before, 600);
        assert!((gov.host_period().rate_hz() - HOST_HZ).abs() < 1.0);
    }

    #[test]
    fn measured_host_period_fixes_fast_displays() {
        const FAST_HZ: f64 = 144.0;
        let target = 30.0;
        let fast_period = 1.0 / FAST_HZ;
        let expected = 1.0 / target;

        let mut assumed = FrameGovernor::new(|| {}, target, TickSlot::new());
        let assumed_mean = mean_interval(&run(&mut assumed, FAST_HZ, 144 * 10));

        let mut measured = FrameGovernor::with_host_period(
            || {},
            target,
            TickSlot::new(),
            HostPeriod::measured(HOST_HZ),
        );
        let measured_mean = mean_interval(&run(&mut measured, FAST_HZ, 144 * 10));

        assert!((measured.host_period().rate_hz() - FAST_HZ).abs() < 0.5);
        assert!(
            (measured_mean - expected).abs() <= fast_period * 0.5 + 1e-6,
            "measured mean {measured_mean} vs {expected}"
        );
        assert!(
            (assumed_mean - expected).abs() > fast_period * 0.5,
            "assumed mean {assumed_mean} vs {expected}"
        );
    }
}
