//! Scan configuration
//!
//! All tunables of the rPPG pipeline, with defaults matching the calibrated
//! reference behavior. Configurations round-trip through JSON so a host can
//! ship them alongside the app.

use crate::error::ScanError;
use serde::{Deserialize, Serialize};

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Centered moving-average window (samples, odd)
    pub smoothing_window: usize,
    /// Peak detector half-width (samples)
    pub peak_half_width: usize,
    /// Peak threshold in standard deviations above the window mean
    pub peak_sensitivity: f64,
    /// Minimum buffered samples before analysis may run
    pub min_scan_samples: usize,
    /// Shortest accepted RR interval (ms, exclusive)
    pub rr_min_ms: f64,
    /// Longest accepted RR interval (ms, exclusive)
    pub rr_max_ms: f64,
    /// Acquisition length after which analysis starts on its own (ms)
    pub scan_duration_ms: f64,
    /// Trailing samples used for the blood oxygen estimate
    pub spo2_window: usize,
    /// Motion magnitude that counts as an artifact (m/s²)
    pub motion_threshold: f64,
    /// Quality multiplier while a motion artifact is active (0-1)
    pub motion_penalty: f64,
    /// How long one artifact keeps degrading quality (ms)
    pub motion_hold_ms: f64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            smoothing_window: 5,
            peak_half_width: 20,
            peak_sensitivity: 0.6,
            min_scan_samples: 100,
            rr_min_ms: 300.0,
            rr_max_ms: 1500.0,
            scan_duration_ms: 30_000.0,
            spo2_window: 100,
            motion_threshold: 2.0,
            motion_penalty: 0.5,
            motion_hold_ms: 1000.0,
        }
    }
}

impl ScanConfig {
    /// Check that every option is usable
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.smoothing_window == 0 || self.smoothing_window % 2 == 0 {
            return Err(invalid(format!(
                "smoothing_window must be odd and positive, got {}",
                self.smoothing_window
            )));
        }
        if self.peak_half_width == 0 {
            return Err(invalid("peak_half_width must be positive".to_string()));
        }
        if !self.peak_sensitivity.is_finite() || self.peak_sensitivity < 0.0 {
            return Err(invalid(format!(
                "peak_sensitivity must be a non-negative number, got {}",
                self.peak_sensitivity
            )));
        }
        if self.min_scan_samples == 0 {
            return Err(invalid("min_scan_samples must be positive".to_string()));
        }
        if !(self.rr_min_ms.is_finite() && self.rr_max_ms.is_finite())
            || self.rr_min_ms < 0.0
            || self.rr_min_ms >= self.rr_max_ms
        {
            return Err(invalid(format!(
                "RR range ({}, {}) is empty",
                self.rr_min_ms, self.rr_max_ms
            )));
        }
        if !self.scan_duration_ms.is_finite() || self.scan_duration_ms <= 0.0 {
            return Err(invalid("scan_duration_ms must be positive".to_string()));
        }
        if self.spo2_window == 0 {
            return Err(invalid("spo2_window must be positive".to_string()));
        }
        if !self.motion_threshold.is_finite() || self.motion_threshold < 0.0 {
            return Err(invalid("motion_threshold must be non-negative".to_string()));
        }
        if !(0.0..=1.0).contains(&self.motion_penalty) {
            return Err(invalid(format!(
                "motion_penalty must be within [0, 1], got {}",
                self.motion_penalty
            )));
        }
        if !self.motion_hold_ms.is_finite() || self.motion_hold_ms < 0.0 {
            return Err(invalid("motion_hold_ms must be non-negative".to_string()));
        }
        Ok(())
    }

    /// Load and validate a configuration from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ScanError> {
        let config: ScanConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn invalid(msg: String) -> ScanError {
    ScanError::InvalidConfig(msg)
}
