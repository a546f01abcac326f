//! End-to-end scan scenarios through the public API

use pretty_assertions::assert_eq;
use std::f64::consts::PI;

use synheart_pulse::hrv::HrvAnalyzer;
use synheart_pulse::intervals::IntervalExtractor;
use synheart_pulse::scorer::WellnessScorer;
use synheart_pulse::types::{AnalysisFlag, FailureReason};
use synheart_pulse::{
    analyze_samples, samples_to_report_json, FrameSample, HrvMetrics, ScanConfig, ScanError,
    ScanSession, ScanState,
};

fn sine_samples(bpm: f64, rate_hz: f64, count: usize) -> Vec<FrameSample> {
    (0..count)
        .map(|i| {
            let t = i as f64 / rate_hz;
            let red = 150.0 + 20.0 * (2.0 * PI * bpm / 60.0 * t).sin();
            FrameSample::from_means(t * 1000.0, red, 80.0, 60.0)
        })
        .collect()
}

fn run_session(samples: &[FrameSample]) -> ScanSession {
    let mut session = ScanSession::new();
    session.start().unwrap();
    for sample in samples {
        session.push_sample(*sample).unwrap();
    }
    let _ = session.finish();
    session
}

/// Slow respiratory swing with a small beat-to-beat alternation
fn realistic_intervals() -> Vec<f64> {
    (0..40)
        .map(|i| {
            let alternation = if i % 2 == 0 { 8.0 } else { -8.0 };
            850.0 + 60.0 * (2.0 * PI * i as f64 / 12.0).sin() + alternation
        })
        .collect()
}

#[test]
fn scenario_a_72_bpm_sine_wave() {
    let session = run_session(&sine_samples(72.0, 30.0, 600));

    assert_eq!(session.state(), ScanState::Complete);
    let result = session.result().unwrap();
    assert!((result.metrics.mean_hr - 72.0).abs() <= 5.0);
    assert_eq!(result.sample_count, 600);
}

#[test]
fn scenario_b_constant_signal_fails_without_peaks() {
    let samples: Vec<FrameSample> = (0..600)
        .map(|i| FrameSample::from_means(i as f64 * 1000.0 / 30.0, 150.0, 80.0, 60.0))
        .collect();

    let err = analyze_samples(&samples, &ScanConfig::default()).unwrap_err();
    assert!(matches!(err, ScanError::NoPeaksDetected));

    let session = run_session(&samples);
    assert_eq!(
        session.state(),
        ScanState::Failed(FailureReason::NoPeaksDetected)
    );
    assert!(session.result().is_none());
}

#[test]
fn scenario_c_long_interval_is_discarded() {
    let accepted = IntervalExtractor::default().filter(&[800.0, 820.0, 810.0, 1600.0, 790.0]);
    assert_eq!(accepted, vec![800.0, 820.0, 810.0, 790.0]);

    let metrics = HrvAnalyzer::analyze(&accepted);
    assert!((metrics.mean_hr - 60_000.0 / 805.0).abs() < 1e-9);
}

#[test]
fn scenario_d_empty_bands_fall_back() {
    let metrics = HrvMetrics {
        sdnn: 50.0,
        rmssd: 40.0,
        sd1: 25.0,
        sd2: 55.0,
        coherence: 0.8,
        ..HrvMetrics::default()
    };
    let analysis = WellnessScorer::score(&metrics, &[], 100);

    assert_eq!(analysis.energy_level, 0.0);
    assert_eq!(analysis.respiratory_rate, 0.0);
    assert_eq!(analysis.autonomic_balance, 0.0);
    for (name, value) in analysis.scores() {
        assert!(value.is_finite(), "{} is not finite", name);
    }
    assert!(analysis.flags.contains(&AnalysisFlag::EnergyLevelUnavailable));
    assert!(analysis
        .flags
        .contains(&AnalysisFlag::RespiratoryRateUnavailable));
}

#[test]
fn extracted_intervals_stay_within_physiological_range() {
    for bpm in [50.0, 60.0, 72.0] {
        let result = analyze_samples(&sine_samples(bpm, 30.0, 600), &ScanConfig::default())
            .unwrap();
        assert!(!result.rr_intervals.is_empty());
        for rr in &result.rr_intervals {
            assert!(*rr > 300.0 && *rr < 1500.0, "{} ms at {} bpm", rr, bpm);
        }
    }

    let timestamps: Vec<f64> = (0..200).map(|i| i as f64 * 100.0).collect();
    let peaks = [0, 2, 5, 6, 14, 30, 31, 60, 199];
    for rr in IntervalExtractor::default().extract(&peaks, &timestamps) {
        assert!(rr > 300.0 && rr < 1500.0);
    }
}

#[test]
fn sdnn_is_never_negative() {
    for intervals in [
        vec![800.0, 800.0],
        vec![800.0, 820.0, 810.0, 790.0],
        realistic_intervals(),
    ] {
        assert!(HrvAnalyzer::analyze(&intervals).sdnn >= 0.0);
    }
}

#[test]
fn scores_are_bounded_for_realistic_intervals() {
    let metrics = HrvAnalyzer::analyze(&realistic_intervals());
    let analysis = WellnessScorer::score(&metrics, &[], 100);

    for value in [
        analysis.stress_level,
        analysis.cognitive_load,
        analysis.energy_level,
        analysis.sleep_readiness,
    ] {
        assert!((0.0..=100.0).contains(&value), "score {} out of range", value);
    }
    assert!((metrics.mean_hr - 70.3).abs() < 0.5);
}

#[test]
fn recovery_is_intentionally_unclamped() {
    // Alternating beats give an RMSSD of 200 ms
    let intervals: Vec<f64> = (0..20)
        .map(|i| if i % 2 == 0 { 700.0 } else { 900.0 })
        .collect();
    let metrics = HrvAnalyzer::analyze(&intervals);
    let analysis = WellnessScorer::score(&metrics, &[], 100);

    assert!((metrics.rmssd - 200.0).abs() < 1e-9);
    assert!((analysis.recovery_status - 200.0).abs() < 1e-9);
    assert!(analysis.recovery_status > 100.0);
}

#[test]
fn ninety_nine_samples_are_insufficient() {
    let samples = sine_samples(72.0, 30.0, 99);

    let err = analyze_samples(&samples, &ScanConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        ScanError::InsufficientData {
            collected: 99,
            required: 100
        }
    ));

    let session = run_session(&samples);
    assert_eq!(session.failure(), Some(FailureReason::InsufficientData));
}

#[test]
fn analysis_is_deterministic() {
    let samples: Vec<FrameSample> = sine_samples(65.0, 30.0, 750)
        .into_iter()
        .enumerate()
        .map(|(i, s)| {
            let drift = 3.0 * (i as f64 / 97.0).sin();
            FrameSample::from_means(s.timestamp, s.red_mean + drift, s.green_mean, s.blue_mean)
        })
        .collect();
    let config = ScanConfig::default();

    let first = analyze_samples(&samples, &config).unwrap();
    let second = analyze_samples(&samples, &config).unwrap();
    assert_eq!(first, second);
}

#[test]
fn recorded_samples_produce_a_report() {
    let json = serde_json::to_string(&sine_samples(72.0, 30.0, 600)).unwrap();
    let report: serde_json::Value =
        serde_json::from_str(&samples_to_report_json(json).unwrap()).unwrap();

    assert_eq!(report["status"], "complete");
    assert_eq!(report["sample_count"], 600);
    let hr = report["hrv"]["mean_hr"].as_f64().unwrap();
    assert!((hr - 72.0).abs() <= 5.0);
}
