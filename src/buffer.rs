//! Signal buffer
//!
//! Append-only, time-ordered store of the frame samples collected during one
//! scan. The analysis stages only ever see a snapshot of it.

use crate::error::ScanError;
use crate::types::FrameSample;
use serde::{Deserialize, Serialize};

/// Time-ordered sample buffer owned by a single scan
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignalBuffer {
    samples: Vec<FrameSample>,
}

impl SignalBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer sized for a scan of `capacity` frames
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
        }
    }

    /// Append a sample. Timestamps must be finite; they may repeat but never go backwards.
    pub fn push(&mut self, sample: FrameSample) -> Result<(), ScanError> {
        if !sample.timestamp.is_finite() {
            return Err(ScanError::InvalidFrame(format!(
                "timestamp must be finite, got {}",
                sample.timestamp
            )));
        }
        if let Some(last) = self.samples.last() {
            if sample.timestamp < last.timestamp {
                return Err(ScanError::NonMonotonicTimestamp {
                    previous: last.timestamp,
                    current: sample.timestamp,
                });
            }
        }
        self.samples.push(sample);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[FrameSample] {
        &self.samples
    }

    /// Raw red-channel series
    pub fn red_channel(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.red_mean).collect()
    }

    pub fn timestamps(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.timestamp).collect()
    }

    /// Time between the first and the last sample (ms)
    pub fn elapsed_ms(&self) -> f64 {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => last.timestamp - first.timestamp,
            _ => 0.0,
        }
    }

    /// Mean sample rate over the buffer (Hz), `None` until two distinct timestamps exist
    pub fn estimated_sample_rate(&self) -> Option<f64> {
        let elapsed = self.elapsed_ms();
        if self.samples.len() < 2 || elapsed <= 0.0 {
            return None;
        }
        Some((self.samples.len() - 1) as f64 * 1000.0 / elapsed)
    }

    /// Frozen copy for analysis
    pub fn snapshot(&self) -> Vec<FrameSample> {
        self.samples.clone()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(timestamp: f64, red: f64) -> FrameSample {
        FrameSample::from_means(timestamp, red, 0.0, 0.0)
    }

    #[test]
    fn test_push_keeps_order() {
        let mut buffer = SignalBuffer::new();
        buffer.push(sample(0.0, 1.0)).unwrap();
        buffer.push(sample(33.0, 2.0)).unwrap();
        buffer.push(sample(33.0, 3.0)).unwrap();

        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.red_channel(), vec![1.0, 2.0, 3.0]);
        assert_eq!(buffer.timestamps(), vec![0.0, 33.0, 33.0]);
    }

    #[test]
    fn test_rejects_backwards_timestamp() {
        let mut buffer = SignalBuffer::new();
        buffer.push(sample(100.0, 1.0)).unwrap();
        let err = buffer.push(sample(50.0, 1.0)).unwrap_err();

        assert!(matches!(err, ScanError::NonMonotonicTimestamp { .. }));
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_rejects_non_finite_timestamp() {
        let mut buffer = SignalBuffer::new();
        buffer.push(sample(1000.0, 1.0)).unwrap();

        for timestamp in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = buffer.push(sample(timestamp, 1.0)).unwrap_err();
            assert!(matches!(err, ScanError::InvalidFrame(_)));
        }

        // Ordering still holds against the last accepted sample
        assert!(buffer.push(sample(5.0, 1.0)).is_err());
        assert_eq!(buffer.timestamps(), vec![1000.0]);
        assert_eq!(buffer.elapsed_ms(), 0.0);
    }

    #[test]
    fn test_sample_rate_estimate() {
        let mut buffer = SignalBuffer::new();
        assert!(buffer.estimated_sample_rate().is_none());

        for i in 0..31 {
            buffer.push(sample(i as f64 * 1000.0 / 30.0, 0.0)).unwrap();
        }
        assert!((buffer.elapsed_ms() - 1000.0).abs() < 1e-9);
        assert!((buffer.estimated_sample_rate().unwrap() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut buffer = SignalBuffer::new();
        buffer.push(sample(0.0, 1.0)).unwrap();
        let frozen = buffer.snapshot();
        buffer.push(sample(1.0, 2.0)).unwrap();

        assert_eq!(frozen.len(), 1);
        assert_eq!(buffer.len(), 2);
    }
}
