//! Peak detection
//!
//! A sample is a heartbeat candidate when it is the maximum of the window
//! centred on it and stands out from that window's mean by a multiple of the
//! window's standard deviation. Every index is judged against its own window
//! only; there is no non-maximum suppression across windows, so adjacent
//! candidates are left for the RR range filter to discard.

use crate::config::ScanConfig;

/// Sliding-window statistical peak detector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakDetector {
    /// Samples on each side of the candidate
    pub half_width: usize,
    /// Threshold in standard deviations above the window mean
    pub sensitivity: f64,
}

impl Default for PeakDetector {
    fn default() -> Self {
        Self {
            half_width: 20,
            sensitivity: 0.6,
        }
    }
}

impl PeakDetector {
    pub fn new(half_width: usize, sensitivity: f64) -> Self {
        Self {
            half_width,
            sensitivity,
        }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(config.peak_half_width, config.peak_sensitivity)
    }

    /// Ordered indices of accepted peaks.
    ///
    /// Only indices in `[h, len - h)` are eligible; shorter signals yield no peaks.
    pub fn detect(&self, signal: &[f64]) -> Vec<usize> {
        let h = self.half_width;
        let n = signal.len();
        if h == 0 || n <= 2 * h {
            return Vec::new();
        }

        (h..n - h)
            .filter(|&i| self.is_peak(&signal[i - h..=i + h], signal[i]))
            .collect()
    }

    fn is_peak(&self, window: &[f64], value: f64) -> bool {
        let (min, max) = window
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        // A flat window has no standout sample.
        if value != max || max == min {
            return false;
        }

        let len = window.len() as f64;
        let mean = window.iter().sum::<f64>() / len;
        let variance = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / len;
        value > mean + self.sensitivity * variance.sqrt()
    }
}
