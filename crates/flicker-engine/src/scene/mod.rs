//! Scene (retained draw stream) types.
//!
//! Producers record renderer-agnostic commands into a `DrawList`; renderers replay
//! it every presented frame until the producer records a new one.

mod cmd;
mod list;

pub use cmd::{DrawCmd, RectCmd};
pub use list::DrawList;
