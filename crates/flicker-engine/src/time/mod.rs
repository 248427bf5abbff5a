//! Time subsystem.
//!
//! Frame timing and the frame-rate governor, kept free of any runtime coupling so
//! they can be driven by synthetic tick feeds in tests.
//!
//! Intended usage:
//! - one `FrameClock` per window; `tick()` once per host refresh
//! - a `FrameGovernor` over a `TickSlot`; the host fires the slot with
//!   `FrameTime::since_start` and hands the tick to `FrameGovernor::on_tick`

mod frame_clock;
mod governor;
mod host_period;
mod rate_meter;
mod tick;

pub use frame_clock::{FrameClock, FrameTime};
pub use governor::{FrameGovernor, GovernorState, GovernorStats, RenderCallback, TickDecision};
pub use host_period::{HostPeriod, PeriodEstimator, DEFAULT_HOST_RATE_HZ};
pub use rate_meter::RateMeter;
pub use tick::{Tick, TickHandle, TickSlot, TickSource};
