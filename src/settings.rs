//! Tracking and display preferences
//!
//! Persisted to LocalStorage on wasm, sanitized back into range on load.

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_ANGLE_RESOLUTION, DEFAULT_DISPLAY_UPDATE_RATE, DEFAULT_SMOOTHING_FACTOR,
    MAX_DISPLAY_UPDATE_RATE, MAX_SMOOTHING_FACTOR, MIN_SMOOTHING_FACTOR,
};

/// User-tunable pipeline preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Visual refresh cap (frames per second)
    pub display_update_rate: f64,
    /// Orientation EMA factor
    pub smoothing_factor: f64,
    /// Animate sprite moves instead of jumping
    pub smoothing_enabled: bool,
    /// Rounding resolution for converted angles (degrees)
    pub angle_resolution: f64,
    /// Label prefixes
    pub horizontal_prefix: String,
    pub vertical_prefix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            display_update_rate: DEFAULT_DISPLAY_UPDATE_RATE,
            smoothing_factor: DEFAULT_SMOOTHING_FACTOR,
            smoothing_enabled: true,
            angle_resolution: DEFAULT_ANGLE_RESOLUTION,
            horizontal_prefix: "H".to_string(),
            vertical_prefix: "V".to_string(),
        }
    }
}

impl Settings {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "angel_scope_settings";

    /// Pull stored values back into the ranges the pipeline accepts
    ///
    /// Hand-edited or stale storage must not smuggle an invalid rate or
    /// factor past the setters' validation.
    pub fn sanitize(&mut self) {
        if !(self.display_update_rate > 0.0 && self.display_update_rate <= MAX_DISPLAY_UPDATE_RATE)
        {
            self.display_update_rate = DEFAULT_DISPLAY_UPDATE_RATE;
        }
        if !(MIN_SMOOTHING_FACTOR..=MAX_SMOOTHING_FACTOR).contains(&self.smoothing_factor) {
            self.smoothing_factor = DEFAULT_SMOOTHING_FACTOR;
        }
        if !(self.angle_resolution.is_finite() && self.angle_resolution > 0.0) {
            self.angle_resolution = DEFAULT_ANGLE_RESOLUTION;
        }
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str::<Settings>(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
