//! Shared utilities used across the client pipeline and the HTTP surface.

pub mod timing;

pub use timing::{is_slow, millis, seconds_label};
