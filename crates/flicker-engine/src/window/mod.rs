//! Window and event loop.
//!
//! Owns the winit `EventLoop` and the single application window, wires them to
//! the GPU layer and turns every display refresh into one `App::on_frame` call.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig, RuntimeCtx};
