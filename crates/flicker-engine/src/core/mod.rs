//! Contract between the runtime loop and the application.
//!
//! The runtime owns the window, GPU and input plumbing; applications see one
//! `FrameCtx` per host refresh and return an `AppControl`.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, WindowCtx};
