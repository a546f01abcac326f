//! Signal conditioning
//!
//! Centered moving average over the raw red-channel series. Boundary samples
//! that cannot hold a full window copy the nearest fully windowed value, so
//! the output always has the input's length.

/// Smooth `signal` with a centered moving average of `window` samples.
///
/// `window` is expected to be odd. A signal shorter than `window` has no fully
/// windowed position and comes back as all zeros.
pub fn smooth(signal: &[f64], window: usize) -> Vec<f64> {
    let n = signal.len();
    let window = window.max(1);
    let mut smoothed = vec![0.0; n];
    if n < window {
        return smoothed;
    }

    let half = window / 2;
    let first = half;
    let last = n - 1 - half;

    // Summed per window, not as a running total.
    for (offset, values) in signal.windows(window).enumerate() {
        smoothed[first + offset] = values.iter().sum::<f64>() / window as f64;
    }

    let head = smoothed[first];
    let tail = smoothed[last];
    smoothed[..first].fill(head);
    smoothed[last + 1..].fill(tail);

    smoothed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interior_is_window_mean() {
        let signal = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let smoothed = smooth(&signal, 5);

        assert_eq!(smoothed.len(), signal.len());
        assert!((smoothed[2] - 3.0).abs() < 1e-12);
        assert!((smoothed[3] - 4.0).abs() < 1e-12);
        assert!((smoothed[4] - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_edges_replicate_nearest_value() {
        let signal = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let smoothed = smooth(&signal, 5);

        assert_eq!(smoothed[0], smoothed[2]);
        assert_eq!(smoothed[1], smoothed[2]);
        assert_eq!(smoothed[5], smoothed[4]);
        assert_eq!(smoothed[6], smoothed[4]);
    }

    #[test]
    fn test_matches_direct_window_mean() {
        let signal: Vec<f64> = (0..50).map(|i| ((i * 7) % 11) as f64).collect();
        let smoothed = smooth(&signal, 5);

        for i in 2..48 {
            let direct: f64 = signal[i - 2..=i + 2].iter().sum::<f64>() / 5.0;
            assert!((smoothed[i] - direct).abs() < 1e-9);
        }
    }

    #[test]
    fn test_short_signal_is_all_zero() {
        let smoothed = smooth(&[5.0, 6.0, 7.0], 5);
        assert_eq!(smoothed, vec![0.0, 0.0, 0.0]);
        assert!(smooth(&[], 5).is_empty());
    }

    #[test]
    fn test_window_of_one_is_identity() {
        let signal = [3.0, 1.0, 4.0, 1.0, 5.0];
        assert_eq!(smooth(&signal, 1), signal.to_vec());
    }
}
