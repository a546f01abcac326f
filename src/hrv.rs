//! HRV analysis
//!
//! Computes the ten HRV metrics from one scan's RR intervals. The variance
//! conventions differ on purpose: SDNN is Bessel-corrected while the Poincaré
//! descriptors use population variance, and LF/HF is a per-interval band
//! heuristic rather than spectral power. The wellness scores are calibrated
//! against exactly these definitions.
//!
//! Every metric degrades to 0 when there are too few intervals for it.

use crate::types::HrvMetrics;
use std::f64::consts::SQRT_2;

/// Low-frequency band (Hz, inclusive)
pub const LF_BAND: (f64, f64) = (0.04, 0.15);
/// High-frequency band (Hz, lower bound exclusive)
pub const HF_BAND: (f64, f64) = (0.15, 0.4);
/// Successive-difference threshold for pNN50 (ms)
pub const NN50_THRESHOLD_MS: f64 = 50.0;

/// HRV analyzer
pub struct HrvAnalyzer;

impl HrvAnalyzer {
    /// Compute all metrics from RR intervals (ms)
    pub fn analyze(rr: &[f64]) -> HrvMetrics {
        let diffs = successive_differences(rr);
        let (lf, hf) = band_powers(rr);

        HrvMetrics {
            sdnn: compute_sdnn(rr),
            rmssd: compute_rmssd(&diffs),
            pnn50: compute_pnn50(&diffs),
            mean_hr: compute_mean_hr(rr),
            lf,
            hf,
            lfhf: if hf > 0.0 { lf / hf } else { 0.0 },
            sd1: poincare_sd1(rr),
            sd2: poincare_sd2(rr),
            coherence: compute_coherence(&diffs),
        }
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn population_variance(values: &[f64]) -> f64 {
    match mean(values) {
        Some(m) => values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64,
        None => 0.0,
    }
}

fn successive_differences(rr: &[f64]) -> Vec<f64> {
    rr.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Standard deviation with Bessel's correction
fn compute_sdnn(rr: &[f64]) -> f64 {
    if rr.len() < 2 {
        return 0.0;
    }
    let m = rr.iter().sum::<f64>() / rr.len() as f64;
    let ss: f64 = rr.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (rr.len() - 1) as f64).sqrt()
}

/// Root mean square of successive differences, n-1 divisor
fn compute_rmssd(diffs: &[f64]) -> f64 {
    if diffs.is_empty() {
        return 0.0;
    }
    let ss: f64 = diffs.iter().map(|d| d * d).sum();
    (ss / diffs.len() as f64).sqrt()
}

fn compute_pnn50(diffs: &[f64]) -> f64 {
    if diffs.is_empty() {
        return 0.0;
    }
    let count = diffs.iter().filter(|d| d.abs() > NN50_THRESHOLD_MS).count();
    count as f64 / diffs.len() as f64 * 100.0
}

fn compute_mean_hr(rr: &[f64]) -> f64 {
    match mean(rr) {
        Some(m) if m > 0.0 => 60_000.0 / m,
        _ => 0.0,
    }
}

/// Mean squared interval of the intervals whose instantaneous frequency
/// `1000 / rr` falls in each band. Empty bands give 0.
fn band_powers(rr: &[f64]) -> (f64, f64) {
    let mut lf = Vec::new();
    let mut hf = Vec::new();

    for &interval in rr.iter().filter(|&&v| v > 0.0) {
        let freq = 1000.0 / interval;
        let power = interval * interval;
        if (LF_BAND.0..=LF_BAND.1).contains(&freq) {
            lf.push(power);
        } else if freq > HF_BAND.0 && freq <= HF_BAND.1 {
            hf.push(power);
        }
    }

    (mean(&lf).unwrap_or(0.0), mean(&hf).unwrap_or(0.0))
}

fn poincare_sd1(rr: &[f64]) -> f64 {
    let projected: Vec<f64> = rr.windows(2).map(|w| (w[1] - w[0]) / SQRT_2).collect();
    population_variance(&projected).sqrt()
}

fn poincare_sd2(rr: &[f64]) -> f64 {
    let projected: Vec<f64> = rr.windows(2).map(|w| (w[1] + w[0]) / SQRT_2).collect();
    population_variance(&projected).sqrt()
}

/// `1 / (1 + mean|Δrr| / 100)`, in (0, 1]
fn compute_coherence(diffs: &[f64]) -> f64 {
    let abs: Vec<f64> = diffs.iter().map(|d| d.abs()).collect();
    match mean(&abs) {
        Some(mad) => 1.0 / (1.0 + mad / 100.0),
        None => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const RR: [f64; 4] = [800.0, 820.0, 810.0, 790.0];

    #[test]
    fn test_sdnn_uses_bessel_correction() {
        let metrics = HrvAnalyzer::analyze(&RR);
        // mean 805, squared deviations 25 + 225 + 25 + 225 = 500, / 3
        assert!((metrics.sdnn - (500.0f64 / 3.0).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_rmssd_and_pnn50() {
        let metrics = HrvAnalyzer::analyze(&RR);
        // diffs 20, -10, -20
        assert!((metrics.rmssd - (900.0f64 / 3.0).sqrt()).abs() < 1e-9);
        assert_eq!(metrics.pnn50, 0.0);

        let irregular = HrvAnalyzer::analyze(&[800.0, 900.0, 880.0, 700.0]);
        // diffs 100, -20, -180: two exceed 50 ms
        assert!((irregular.pnn50 - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_mean_hr() {
        let metrics = HrvAnalyzer::analyze(&RR);
        assert!((metrics.mean_hr - 60_000.0 / 805.0).abs() < 1e-9);
    }

    #[test]
    fn test_poincare_uses_population_variance() {
        let metrics = HrvAnalyzer::analyze(&RR);

        let d: Vec<f64> = [20.0, -10.0, -20.0].iter().map(|v| v / SQRT_2).collect();
        let dm = d.iter().sum::<f64>() / 3.0;
        let sd1 = (d.iter().map(|v| (v - dm).powi(2)).sum::<f64>() / 3.0).sqrt();
        assert!((metrics.sd1 - sd1).abs() < 1e-9);

        let s: Vec<f64> = [1620.0, 1630.0, 1600.0].iter().map(|v| v / SQRT_2).collect();
        let sm = s.iter().sum::<f64>() / 3.0;
        let sd2 = (s.iter().map(|v| (v - sm).powi(2)).sum::<f64>() / 3.0).sqrt();
        assert!((metrics.sd2 - sd2).abs() < 1e-9);
    }

    #[test]
    fn test_coherence() {
        let metrics = HrvAnalyzer::analyze(&RR);
        // mean |diff| = 50 / 3
        let expected = 1.0 / (1.0 + (50.0 / 3.0) / 100.0);
        assert!((metrics.coherence - expected).abs() < 1e-9);

        let steady = HrvAnalyzer::analyze(&[800.0; 10]);
        assert_eq!(steady.coherence, 1.0);
        assert_eq!(steady.sdnn, 0.0);
    }

    #[test]
    fn test_physiological_intervals_fall_outside_both_bands() {
        let metrics = HrvAnalyzer::analyze(&RR);
        assert_eq!(metrics.lf, 0.0);
        assert_eq!(metrics.hf, 0.0);
        assert_eq!(metrics.lfhf, 0.0);
    }

    #[test]
    fn test_band_powers_on_slow_intervals() {
        // 1000/10000 = 0.1 Hz (LF), 1000/4000 = 0.25 Hz (HF)
        let metrics = HrvAnalyzer::analyze(&[10_000.0, 4_000.0, 5_000.0]);
        assert!((metrics.lf - 1.0e8).abs() < 1e-3);
        let hf = (16.0e6 + 25.0e6) / 2.0;
        assert!((metrics.hf - hf).abs() < 1e-3);
        assert!((metrics.lfhf - 1.0e8 / hf).abs() < 1e-9);
    }

    #[test]
    fn test_too_few_intervals_degrade_to_zero() {
        assert_eq!(HrvAnalyzer::analyze(&[]), HrvMetrics::default());

        let single = HrvAnalyzer::analyze(&[800.0]);
        assert_eq!(single.sdnn, 0.0);
        assert_eq!(single.rmssd, 0.0);
        assert_eq!(single.pnn50, 0.0);
        assert_eq!(single.sd1, 0.0);
        assert_eq!(single.sd2, 0.0);
        assert_eq!(single.coherence, 0.0);
        assert!((single.mean_hr - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_deterministic() {
        let a = HrvAnalyzer::analyze(&RR);
        let b = HrvAnalyzer::analyze(&RR);
        assert_eq!(a, b);
    }
}
