//! Angel Scope - aim your phone at the sky and find your angel
//!
//! Core modules:
//! - `angles`: Pure conversion from raw sensor angles to spherical coordinates
//! - `orientation`: Permission lifecycle, sampling, smoothing, subscriber fan-out
//! - `display`: Rate-limited screen mapping and label rendering
//! - `render`: Render host capability interface (DOM-backed on wasm)
//! - `platform`: Browser/native clock, viewport and sensor plumbing

pub mod angles;
pub mod display;
pub mod orientation;
pub mod platform;
pub mod render;
pub mod settings;

pub use angles::{AngleCalculator, NormalizedAngles, signed_delta, wrap_around};
pub use display::AngelDisplaySystem;
pub use orientation::OrientationManager;
pub use settings::Settings;

/// Pipeline configuration constants
pub mod consts {
    /// One full horizontal turn in degrees
    pub const FULL_TURN: f64 = 360.0;
    /// Vertical tilt is clamped to ±this many degrees
    pub const VERTICAL_LIMIT: f64 = 90.0;
    /// Default rounding resolution for converted angles (degrees)
    pub const DEFAULT_ANGLE_RESOLUTION: f64 = 1.0;

    /// Orientation EMA factor bounds - setters reject values outside
    pub const MIN_SMOOTHING_FACTOR: f64 = 0.1;
    pub const MAX_SMOOTHING_FACTOR: f64 = 0.3;
    /// Default EMA factor
    pub const DEFAULT_SMOOTHING_FACTOR: f64 = 0.2;

    /// Default visual refresh cap (frames per second)
    pub const DEFAULT_DISPLAY_UPDATE_RATE: f64 = 30.0;
    /// Hard ceiling for the visual refresh cap
    pub const MAX_DISPLAY_UPDATE_RATE: f64 = 120.0;

    /// Position tween duration when display smoothing is on (ms)
    pub const POSITION_TWEEN_MS: f64 = 50.0;
    /// On-screen angel sprite scale
    pub const ANGEL_SPRITE_SCALE: f32 = 0.5;

    /// HUD label layout
    pub const LABEL_MARGIN_PX: f32 = 16.0;
    pub const LABEL_LINE_HEIGHT_PX: f32 = 28.0;
}
