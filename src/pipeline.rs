//! Pipeline orchestration
//!
//! This module runs the Analyzing stage of a scan and provides the stateless
//! public entry points of Synheart Pulse.

use crate::conditioner::smooth;
use crate::config::ScanConfig;
use crate::encoder::ReportEncoder;
use crate::error::ScanError;
use crate::hrv::HrvAnalyzer;
use crate::intervals::IntervalExtractor;
use crate::peaks::PeakDetector;
use crate::samples::{SampleAdapter, ScanInput};
use crate::scorer::WellnessScorer;
use crate::session::ScanSession;
use crate::types::{BiometricAnalysis, FrameSample, HrvMetrics, ScanResult};

/// Run the full analysis on a frozen sample buffer.
///
/// Pipeline stages:
/// 1. Conditioner - smooth the raw red channel
/// 2. PeakDetector - locate candidate heartbeats
/// 3. IntervalExtractor - RR intervals within the physiological range
/// 4. HrvAnalyzer - time, frequency and nonlinear HRV metrics
/// 5. WellnessScorer - derived wellness indices
///
/// Fails fast: no partial result is ever produced.
pub fn analyze_samples(
    samples: &[FrameSample],
    config: &ScanConfig,
) -> Result<ScanResult, ScanError> {
    if samples.len() < config.min_scan_samples {
        return Err(ScanError::InsufficientData {
            collected: samples.len(),
            required: config.min_scan_samples,
        });
    }

    let red: Vec<f64> = samples.iter().map(|s| s.red_mean).collect();
    let timestamps: Vec<f64> = samples.iter().map(|s| s.timestamp).collect();

    // Stage 1: Condition the red channel
    let smoothed = smooth(&red, config.smoothing_window);

    // Stage 2: Detect peaks
    let peaks = PeakDetector::from_config(config).detect(&smoothed);
    log::debug!("detected {} peaks in {} samples", peaks.len(), samples.len());
    if peaks.is_empty() {
        return Err(ScanError::NoPeaksDetected);
    }

    // Stage 3: Extract RR intervals
    let rr_intervals = IntervalExtractor::from_config(config).extract(&peaks, &timestamps);
    log::debug!(
        "kept {} of {} RR intervals",
        rr_intervals.len(),
        peaks.len().saturating_sub(1)
    );
    if rr_intervals.len() < 2 {
        return Err(ScanError::InsufficientIntervals {
            valid: rr_intervals.len(),
        });
    }

    // Stage 4: HRV metrics
    let metrics = HrvAnalyzer::analyze(&rr_intervals);

    // Stage 5: Wellness scores
    let analysis = WellnessScorer::score(&metrics, &red, config.spo2_window);
    ensure_finite(&metrics, &analysis)?;

    let duration_ms = match (samples.first(), samples.last()) {
        (Some(first), Some(last)) => last.timestamp - first.timestamp,
        _ => 0.0,
    };

    Ok(ScanResult {
        metrics,
        analysis,
        rr_intervals,
        peak_count: peaks.len(),
        sample_count: samples.len(),
        duration_ms,
    })
}

fn ensure_finite(metrics: &HrvMetrics, analysis: &BiometricAnalysis) -> Result<(), ScanError> {
    let hrv = [
        ("sdnn", metrics.sdnn),
        ("rmssd", metrics.rmssd),
        ("pnn50", metrics.pnn50),
        ("mean_hr", metrics.mean_hr),
        ("lf", metrics.lf),
        ("hf", metrics.hf),
        ("lfhf", metrics.lfhf),
        ("sd1", metrics.sd1),
        ("sd2", metrics.sd2),
        ("coherence", metrics.coherence),
    ];
    match hrv
        .iter()
        .chain(analysis.scores().iter())
        .find(|(_, value)| !value.is_finite())
    {
        Some((name, value)) => Err(ScanError::NonFiniteResult(format!("{name} = {value}"))),
        None => Ok(()),
    }
}

/// Replay recorded scan input through a fresh session and return the report JSON.
///
/// # Arguments
/// * `inputs_json` - JSON array of frame samples and motion readings
///
/// # Returns
/// Report JSON. A scan that fails analysis still yields a report with
/// `status = "failed"`; only malformed input is an error.
///
/// # Example
/// ```ignore
/// let report_json = samples_to_report_json(samples_json)?;
/// ```
pub fn samples_to_report_json(inputs_json: String) -> Result<String, ScanError> {
    let inputs = SampleAdapter::parse_array(&inputs_json)?;
    let session = replay(&inputs, ScanConfig::default())?;
    ReportEncoder::new().encode_to_json(&session)
}

/// Run a session over recorded inputs until it leaves `Acquiring`.
///
/// Input past the end of acquisition (the scan duration elapsed) is ignored.
/// An analysis failure is recorded on the returned session, not returned.
pub fn replay(inputs: &[ScanInput], config: ScanConfig) -> Result<ScanSession, ScanError> {
    let mut session = ScanSession::with_config(config)?;
    session.start()?;

    for (consumed, input) in inputs.iter().enumerate() {
        if !session.is_acquiring() {
            log::debug!("ignoring {} inputs after acquisition ended", inputs.len() - consumed);
            break;
        }
        match input {
            ScanInput::Frame(sample) => {
                session.push_sample(*sample)?;
            }
            ScanInput::Motion(event) => {
                session.record_motion(event);
            }
        }
    }

    if session.is_acquiring() {
        // Failure is captured in the session state.
        let _ = session.finish();
    }
    Ok(session)
}
