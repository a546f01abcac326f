//! RR interval extraction
//!
//! Converts consecutive peak timestamps into inter-beat intervals and keeps
//! only physiologically plausible ones. Out-of-range intervals are dropped,
//! never clamped or interpolated.

use crate::config::ScanConfig;
use crate::types::RrInterval;

/// Physiological RR range filter, exclusive on both ends (ms)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalExtractor {
    pub min_ms: f64,
    pub max_ms: f64,
}

impl Default for IntervalExtractor {
    fn default() -> Self {
        Self {
            min_ms: 300.0,
            max_ms: 1500.0,
        }
    }
}

impl IntervalExtractor {
    pub fn new(min_ms: f64, max_ms: f64) -> Self {
        Self { min_ms, max_ms }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(config.rr_min_ms, config.rr_max_ms)
    }

    pub fn accepts(&self, interval: f64) -> bool {
        interval > self.min_ms && interval < self.max_ms
    }

    /// Intervals between consecutive peaks, with implausible ones discarded.
    ///
    /// Peak indices outside `timestamps` are ignored.
    pub fn extract(&self, peaks: &[usize], timestamps: &[f64]) -> Vec<RrInterval> {
        let beat_times: Vec<f64> = peaks
            .iter()
            .filter_map(|&idx| timestamps.get(idx).copied())
            .collect();

        let raw: Vec<f64> = beat_times.windows(2).map(|w| w[1] - w[0]).collect();
        self.filter(&raw)
    }

    /// Keep the intervals inside the accepted range, preserving order
    pub fn filter(&self, intervals: &[f64]) -> Vec<RrInterval> {
        intervals
            .iter()
            .copied()
            .filter(|&rr| self.accepts(rr))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_discards_long_interval() {
        let kept = IntervalExtractor::default().filter(&[800.0, 820.0, 810.0, 1600.0, 790.0]);
        assert_eq!(kept, vec![800.0, 820.0, 810.0, 790.0]);
    }

    #[test]
    fn test_bounds_are_exclusive() {
        let extractor = IntervalExtractor::default();
        assert!(!extractor.accepts(300.0));
        assert!(!extractor.accepts(1500.0));
        assert!(extractor.accepts(300.5));
        assert!(extractor.accepts(1499.9));
    }

    #[test]
    fn test_extract_from_peak_timestamps() {
        let timestamps: Vec<f64> = (0..500).map(|i| i as f64 * 10.0).collect();
        // Beats at 0, 800, 1620, 2430, 4030, 4820 ms
        let peaks = [0, 80, 162, 243, 403, 482];

        let intervals = IntervalExtractor::default().extract(&peaks, &timestamps);
        assert_eq!(intervals, vec![800.0, 820.0, 810.0, 790.0]);
    }

    #[test]
    fn test_out_of_range_peaks_are_ignored() {
        let timestamps: Vec<f64> = (0..200).map(|i| i as f64 * 10.0).collect();
        // 243 and 403 fall past the end; 0 -> 800 -> 1620 remain
        let peaks = [0, 80, 162, 243, 403];

        let intervals = IntervalExtractor::default().extract(&peaks, &timestamps);
        assert_eq!(intervals, vec![800.0, 820.0]);
    }

    #[test]
    fn test_adjacent_peaks_are_dropped() {
        let timestamps: Vec<f64> = (0..100).map(|i| i as f64 * 33.0).collect();
        let peaks = [10, 11, 35];

        let intervals = IntervalExtractor::default().extract(&peaks, &timestamps);
        assert_eq!(intervals, vec![24.0 * 33.0]);
    }

    #[test]
    fn test_single_peak_yields_nothing() {
        assert!(IntervalExtractor::default()
            .extract(&[5], &[0.0; 10])
            .is_empty());
    }
}
