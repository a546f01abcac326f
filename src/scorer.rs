//! Wellness scoring
//!
//! Maps one `HrvMetrics` snapshot into the eight derived indices. Formulas
//! with an undefined value (zero denominator, log of a non-positive ratio)
//! fall back to 0 and record an `AnalysisFlag`, so no NaN or infinity
//! reaches the host.

use crate::types::{AnalysisFlag, BiometricAnalysis, HrvMetrics};

/// Scale `value` into [0, 1] over `[min, max]`
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    ((value - min) / (max - min)).clamp(0.0, 1.0)
}

/// Wellness scorer
pub struct WellnessScorer;

impl WellnessScorer {
    /// Produce all eight scores from one metrics snapshot and the raw
    /// red-channel series of the same scan.
    pub fn score(metrics: &HrvMetrics, red_channel: &[f64], spo2_window: usize) -> BiometricAnalysis {
        let mut flags = Vec::new();

        let cognitive_load = if metrics.sd2 > 0.0 {
            100.0 * (1.0 - metrics.sd1 / metrics.sd2)
        } else {
            flags.push(AnalysisFlag::CognitiveLoadUnavailable);
            0.0
        };

        let band_total = metrics.lf + metrics.hf;
        let energy_level = if band_total > 0.0 {
            100.0 * metrics.hf / band_total
        } else {
            flags.push(AnalysisFlag::EnergyLevelUnavailable);
            0.0
        };

        let autonomic_balance = if metrics.lfhf > 0.0 {
            100.0 * (0.5 + metrics.lfhf.ln() / 4.0)
        } else {
            flags.push(AnalysisFlag::AutonomicBalanceUnavailable);
            0.0
        };

        let respiratory_rate = if metrics.hf > 0.0 {
            60.0 / (metrics.hf * 0.15)
        } else {
            flags.push(AnalysisFlag::RespiratoryRateUnavailable);
            0.0
        };

        let blood_oxygen_estimate = match estimate_blood_oxygen(red_channel, spo2_window) {
            Some(spo2) => spo2,
            None => {
                flags.push(AnalysisFlag::BloodOxygenUnavailable);
                0.0
            }
        };

        BiometricAnalysis {
            stress_level: stress_level(metrics),
            cognitive_load,
            energy_level,
            recovery_status: 100.0 * metrics.rmssd / 100.0,
            sleep_readiness: 100.0 * (0.7 * metrics.coherence + 0.3 * (metrics.sdnn / 100.0)),
            autonomic_balance,
            respiratory_rate,
            blood_oxygen_estimate,
            flags,
        }
    }
}

fn stress_level(metrics: &HrvMetrics) -> f64 {
    let relaxation = 0.3 * normalize(metrics.sdnn, 20.0, 100.0)
        + 0.3 * normalize(metrics.rmssd, 15.0, 80.0)
        + 0.2 * (1.0 - normalize(metrics.lfhf, 0.5, 2.0))
        + 0.2 * metrics.coherence;
    100.0 * (1.0 - relaxation)
}

/// `95 + (std / mean) × 5` over the trailing `window` red samples.
///
/// `None` when fewer than `window` samples exist or their mean is 0.
pub fn estimate_blood_oxygen(red_channel: &[f64], window: usize) -> Option<f64> {
    if window == 0 || red_channel.len() < window {
        return None;
    }
    let tail = &red_channel[red_channel.len() - window..];
    let mean = tail.iter().sum::<f64>() / window as f64;
    if mean == 0.0 {
        return None;
    }
    let variance = tail.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / window as f64;
    Some(95.0 + (variance.sqrt() / mean) * 5.0)
}
