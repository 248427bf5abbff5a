//! Paint model shared between the scene and renderers.
//!
//! Colors are linear premultiplied RGBA. Geometry types remain in `coords`.

pub mod color;

pub use color::{Color, ParseColorError};
