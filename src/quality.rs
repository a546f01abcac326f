//! Signal quality monitoring
//!
//! Live feedback while a scan is acquiring: a variance-based quality score
//! over the raw red channel, and an independent motion side channel that
//! degrades the displayed score and raises an advisory when the device moves.

use crate::config::ScanConfig;
use crate::types::MotionEvent;
use serde::{Deserialize, Serialize};

/// Variance below this carries no usable pulse
const VARIANCE_FLOOR: f64 = 100.0;
/// Variance span mapped onto the 0-100 score
const VARIANCE_SPAN: f64 = 1000.0;

/// Quality score of the raw red-channel series collected so far (0-100).
///
/// Cheap enough to recompute after every appended frame.
pub fn signal_quality(red_channel: &[f64]) -> f64 {
    if red_channel.is_empty() {
        return 0.0;
    }
    let n = red_channel.len() as f64;
    let mean = red_channel.iter().sum::<f64>() / n;
    let variance = red_channel.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    ((variance - VARIANCE_FLOOR) / VARIANCE_SPAN).clamp(0.0, 1.0) * 100.0
}

/// Advisory raised when a motion reading exceeds the artifact threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionArtifactWarning {
    /// Time of the offending reading (ms)
    pub timestamp: f64,
    /// Its magnitude (m/s²)
    pub magnitude: f64,
}

impl MotionArtifactWarning {
    pub fn message(&self) -> &'static str {
        "Movement detected, hold the device still"
    }
}

/// Tracks motion artifacts and applies their penalty to the quality score
#[derive(Debug, Clone)]
pub struct MotionMonitor {
    threshold: f64,
    penalty: f64,
    hold_ms: f64,
    last_artifact_at: Option<f64>,
    artifact_count: u32,
}

impl MotionMonitor {
    pub fn new(threshold: f64, penalty: f64, hold_ms: f64) -> Self {
        Self {
            threshold,
            penalty,
            hold_ms,
            last_artifact_at: None,
            artifact_count: 0,
        }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(
            config.motion_threshold,
            config.motion_penalty,
            config.motion_hold_ms,
        )
    }

    /// Feed one motion reading; returns a warning when it is an artifact
    pub fn record(&mut self, event: &MotionEvent) -> Option<MotionArtifactWarning> {
        let magnitude = event.magnitude();
        if !magnitude.is_finite() || magnitude <= self.threshold {
            return None;
        }

        self.last_artifact_at = Some(event.timestamp);
        self.artifact_count += 1;

        let warning = MotionArtifactWarning {
            timestamp: event.timestamp,
            magnitude,
        };
        log::warn!(
            "{} (at {:.0} ms, magnitude {:.2})",
            warning.message(),
            event.timestamp,
            magnitude
        );
        Some(warning)
    }

    /// Whether an artifact seen at or before `now` still degrades quality
    pub fn is_active(&self, now: f64) -> bool {
        match self.last_artifact_at {
            Some(at) => now >= at && now - at <= self.hold_ms,
            None => false,
        }
    }

    /// Apply the motion penalty to a raw quality score
    pub fn adjust(&self, quality: f64, now: f64) -> f64 {
        if self.is_active(now) {
            quality * self.penalty
        } else {
            quality
        }
    }

    pub fn artifact_count(&self) -> u32 {
        self.artifact_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(timestamp: f64, x: f64) -> MotionEvent {
        MotionEvent {
            timestamp,
            x,
            y: 0.0,
            z: 0.0,
        }
    }

    #[test]
    fn test_quality_of_flat_signal_is_zero() {
        assert_eq!(signal_quality(&[120.0; 200]), 0.0);
        assert_eq!(signal_quality(&[]), 0.0);
    }

    #[test]
    fn test_quality_scales_with_variance() {
        // Alternating ±a has population variance a²
        let series = |a: f64| -> Vec<f64> {
            (0..100).map(|i| if i % 2 == 0 { 100.0 + a } else { 100.0 - a }).collect()
        };

        // variance 600 -> (600 - 100) / 1000 = 0.5
        assert!((signal_quality(&series(600f64.sqrt())) - 50.0).abs() < 1e-6);
        // variance 2500 saturates
        assert_eq!(signal_quality(&series(50.0)), 100.0);
    }

    #[test]
    fn test_small_motion_is_ignored() {
        let mut monitor = MotionMonitor::new(2.0, 0.5, 1000.0);
        assert!(monitor.record(&event(0.0, 1.5)).is_none());
        assert!(!monitor.is_active(0.0));
        assert_eq!(monitor.artifact_count(), 0);
    }

    #[test]
    fn test_artifact_degrades_quality_for_hold_period() {
        let mut monitor = MotionMonitor::new(2.0, 0.5, 1000.0);
        let warning = monitor.record(&event(500.0, 4.0)).unwrap();

        assert_eq!(warning.timestamp, 500.0);
        assert!((warning.magnitude - 4.0).abs() < 1e-12);
        assert!(warning.message().contains("hold the device still"));
        assert_eq!(monitor.adjust(80.0, 600.0), 40.0);
        assert_eq!(monitor.adjust(80.0, 1500.0), 40.0);
        assert_eq!(monitor.adjust(80.0, 1600.0), 80.0);
        assert_eq!(monitor.artifact_count(), 1);
    }
}
