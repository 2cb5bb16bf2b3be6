//! Raw sensor samples and fan-out payloads

use serde::{Deserialize, Serialize};

/// One raw device-orientation reading
///
/// Any axis may be absent; the sensor reports what it has and the pipeline
/// treats absence as zero rather than an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawOrientationSample {
    /// Compass heading in degrees (Z axis)
    pub alpha: Option<f64>,
    /// Front-back tilt in degrees (X axis)
    pub beta: Option<f64>,
    /// Left-right tilt in degrees (Y axis, unused downstream)
    pub gamma: Option<f64>,
}

impl RawOrientationSample {
    pub fn new(alpha: Option<f64>, beta: Option<f64>, gamma: Option<f64>) -> Self {
        Self { alpha, beta, gamma }
    }

    /// Convenience for a heading-plus-tilt reading
    pub fn heading(alpha: f64, beta: f64) -> Self {
        Self {
            alpha: Some(alpha),
            beta: Some(beta),
            gamma: None,
        }
    }
}

/// Snapshot handed to orientation subscribers after each accepted sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OrientationSnapshot {
    /// Latest raw heading, wrapped into [0, 360)
    pub raw: f64,
    /// EMA-smoothed heading
    pub smoothed: f64,
    /// Current heading (mirrors `smoothed`)
    pub current: f64,
    /// Signed offset from the reference horizon, in (-180, 180]
    pub delta_from_reference: f64,
    /// The caller-chosen zero heading
    pub reference_horizon: f64,
    /// Clock timestamp of the accepted sample (ms)
    pub timestamp: f64,
    /// Front-back tilt passed through from the accepted sample
    pub tilt: Option<f64>,
}
