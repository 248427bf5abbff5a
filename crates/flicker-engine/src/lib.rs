//! Flicker engine crate.
//!
//! The frame-rate governor and its tick-source contract live in [`time`] and
//! have no platform coupling. The remaining modules are the winit + wgpu host
//! that turns display refreshes into ticks and presents a retained draw list.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod render;
pub mod paint;
pub mod scene;
