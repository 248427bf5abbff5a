//! wgpu device and window surface.
//!
//! Creates the Instance/Adapter/Device/Queue, configures the swapchain and hands
//! out one `GpuFrame` per host refresh. The present mode decides how refresh
//! ticks are paced, so FIFO is the default.

mod error;
mod frame;
mod gpu;
mod init;
mod surface;

pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use gpu::Gpu;
pub use init::GpuInit;
