//! Exponential moving average over successive headings

/// EMA smoothing filter
///
/// The first sample seeds the filter directly; later samples blend by
/// `smoothed * (1 - factor) + raw * factor`.
#[derive(Debug, Clone)]
pub struct SmoothingFilter {
    factor: f64,
    value: Option<f64>,
}

impl SmoothingFilter {
    pub fn new(factor: f64) -> Self {
        Self {
            factor,
            value: None,
        }
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Replace the blend factor without touching accumulated state
    pub fn set_factor(&mut self, factor: f64) {
        self.factor = factor;
    }

    /// Last smoothed value, if any sample has been fed
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    /// Feed one sample, returning the new smoothed value
    pub fn apply(&mut self, raw: f64) -> f64 {
        let smoothed = match self.value {
            None => raw,
            Some(prev) => prev * (1.0 - self.factor) + raw * self.factor,
        };
        self.value = Some(smoothed);
        smoothed
    }

    /// Drop accumulated state; the next sample seeds again
    pub fn reset(&mut self) {
        self.value = None;
    }
}
