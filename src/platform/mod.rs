//! Platform abstraction layer
//!
//! Capability traits for the pieces the pipeline must not hard-wire:
//! wall-clock time and viewport dimensions. Browser implementations live
//! in `web`; native builds get a std clock for tests and the smoke run.

#[cfg(target_arch = "wasm32")]
pub mod web;

/// Millisecond wall clock
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Current drawing-surface dimensions
///
/// Queried fresh on every mapping call so resizes take effect immediately.
pub trait Viewport {
    /// (width, height) in pixels
    fn size(&self) -> (f64, f64);
}

/// Std-backed clock
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
pub struct SystemClock;

#[cfg(not(target_arch = "wasm32"))]
impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs_f64() * 1000.0)
            .unwrap_or(0.0)
    }
}

/// Fixed-size viewport for headless runs and tests
#[derive(Debug, Clone, Copy)]
pub struct FixedViewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport for FixedViewport {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }
}
