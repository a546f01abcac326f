//! Core types for the Synheart Pulse pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! scan: per-frame samples, RR intervals, HRV metrics, derived wellness scores,
//! and the session-level records handed back to the host.

use serde::{Deserialize, Serialize};

/// ITU-R BT.601 luma weights for (red, green, blue)
pub const LUMA_WEIGHTS: (f64, f64, f64) = (0.299, 0.587, 0.114);

/// Elapsed time between two accepted heartbeat peaks (ms)
pub type RrInterval = f64;

/// One reduced observation per captured video frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameSample {
    /// Capture time (ms, monotonic within a scan)
    pub timestamp: f64,
    /// Mean red intensity over all pixels (0-255)
    pub red_mean: f64,
    /// Mean green intensity over all pixels (0-255)
    pub green_mean: f64,
    /// Mean blue intensity over all pixels (0-255)
    pub blue_mean: f64,
    /// Perceptual brightness computed from the channel means
    pub luma: f64,
}

impl FrameSample {
    /// Build a sample from channel means, deriving luma from the means.
    pub fn from_means(timestamp: f64, red_mean: f64, green_mean: f64, blue_mean: f64) -> Self {
        let (wr, wg, wb) = LUMA_WEIGHTS;
        Self {
            timestamp,
            red_mean,
            green_mean,
            blue_mean,
            luma: wr * red_mean + wg * green_mean + wb * blue_mean,
        }
    }
}

/// Time, frequency and nonlinear HRV metrics for one completed scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HrvMetrics {
    /// Standard deviation of RR intervals (ms, Bessel-corrected)
    pub sdnn: f64,
    /// Root mean square of successive differences (ms)
    pub rmssd: f64,
    /// Percentage of successive differences above 50 ms
    pub pnn50: f64,
    /// Mean heart rate (bpm)
    pub mean_hr: f64,
    /// Heuristic low-frequency band power
    pub lf: f64,
    /// Heuristic high-frequency band power
    pub hf: f64,
    /// lf / hf, 0 when hf is 0
    pub lfhf: f64,
    /// Poincaré short-axis deviation (ms)
    pub sd1: f64,
    /// Poincaré long-axis deviation (ms)
    pub sd2: f64,
    /// Rhythm stability score in (0, 1]
    pub coherence: f64,
}

/// Marks a derived score that fell back to 0 because its formula had no defined value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisFlag {
    /// sd2 was 0
    CognitiveLoadUnavailable,
    /// lf + hf was 0
    EnergyLevelUnavailable,
    /// lf/hf was not positive
    AutonomicBalanceUnavailable,
    /// hf was 0
    RespiratoryRateUnavailable,
    /// Fewer samples than the SpO2 window, or a zero red-channel mean
    BloodOxygenUnavailable,
}

impl AnalysisFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisFlag::CognitiveLoadUnavailable => "cognitive_load_unavailable",
            AnalysisFlag::EnergyLevelUnavailable => "energy_level_unavailable",
            AnalysisFlag::AutonomicBalanceUnavailable => "autonomic_balance_unavailable",
            AnalysisFlag::RespiratoryRateUnavailable => "respiratory_rate_unavailable",
            AnalysisFlag::BloodOxygenUnavailable => "blood_oxygen_unavailable",
        }
    }
}

/// Derived wellness indices, the externally consumed artifact of a scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiometricAnalysis {
    /// Stress (0-100)
    pub stress_level: f64,
    /// Cognitive load (0-100)
    pub cognitive_load: f64,
    /// Energy (0-100)
    pub energy_level: f64,
    /// Recovery, RMSSD-based and intentionally unclamped
    pub recovery_status: f64,
    /// Sleep readiness (0-100)
    pub sleep_readiness: f64,
    /// Autonomic balance (50 = balanced)
    pub autonomic_balance: f64,
    /// Respiratory rate (breaths per minute)
    pub respiratory_rate: f64,
    /// Blood oxygen estimate (%)
    pub blood_oxygen_estimate: f64,
    /// Scores that were substituted with a fallback
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<AnalysisFlag>,
}

impl BiometricAnalysis {
    /// All eight scores with their field names, in declaration order
    pub fn scores(&self) -> [(&'static str, f64); 8] {
        [
            ("stress_level", self.stress_level),
            ("cognitive_load", self.cognitive_load),
            ("energy_level", self.energy_level),
            ("recovery_status", self.recovery_status),
            ("sleep_readiness", self.sleep_readiness),
            ("autonomic_balance", self.autonomic_balance),
            ("respiratory_rate", self.respiratory_rate),
            ("blood_oxygen_estimate", self.blood_oxygen_estimate),
        ]
    }
}

/// Why a scan ended in `Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    InsufficientData,
    NoPeaksDetected,
    InsufficientIntervals,
    NonFiniteResult,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::InsufficientData => "insufficient_data",
            FailureReason::NoPeaksDetected => "no_peaks_detected",
            FailureReason::InsufficientIntervals => "insufficient_intervals",
            FailureReason::NonFiniteResult => "non_finite_result",
        }
    }

    /// Short advisory suitable for showing to the person being scanned
    pub fn hint(&self) -> &'static str {
        match self {
            FailureReason::InsufficientData => "Scan ended too early, hold still and try again",
            FailureReason::NoPeaksDetected => "No pulse found, cover the camera fully and retry",
            FailureReason::InsufficientIntervals => {
                "Pulse was too irregular to measure, retry in better light"
            }
            FailureReason::NonFiniteResult => "Measurement was unstable, please retry",
        }
    }
}

/// Scan lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "reason")]
pub enum ScanState {
    Idle,
    Acquiring,
    Analyzing,
    Complete,
    Failed(FailureReason),
}

impl ScanState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanState::Idle => "idle",
            ScanState::Acquiring => "acquiring",
            ScanState::Analyzing => "analyzing",
            ScanState::Complete => "complete",
            ScanState::Failed(_) => "failed",
        }
    }

    /// Complete and Failed end a session
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanState::Complete | ScanState::Failed(_))
    }
}

/// One motion-sensor reading (m/s², gravity removed)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionEvent {
    /// Reading time (ms, same clock as frame timestamps)
    pub timestamp: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl MotionEvent {
    /// Euclidean norm of the three axes
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// Per-frame feedback returned to the host while acquiring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveFeedback {
    /// Samples collected so far
    pub sample_count: usize,
    /// Time since the first sample (ms)
    pub elapsed_ms: f64,
    /// Fraction of the scan duration covered (0-1)
    pub progress: f64,
    /// Displayed signal quality (0-100), motion penalty applied
    pub quality: f64,
    /// Whether a recent motion artifact is degrading quality
    pub motion_active: bool,
    /// Session state after this frame
    pub state: ScanState,
}

/// Everything the Analyzing stage produces for one scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub metrics: HrvMetrics,
    pub analysis: BiometricAnalysis,
    /// Accepted RR intervals (ms)
    pub rr_intervals: Vec<RrInterval>,
    /// Peaks found before interval filtering
    pub peak_count: usize,
    /// Samples in the frozen buffer
    pub sample_count: usize,
    /// Time covered by the buffer (ms)
    pub duration_ms: f64,
}

/// Report producer metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Acquisition quality summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportQuality {
    /// Variance-based signal quality over the whole buffer (0-100)
    pub signal_quality: f64,
    /// Sample rate estimated from timestamps (Hz)
    pub sample_rate_hz: f64,
    /// Motion artifacts seen while acquiring
    pub motion_artifacts: u32,
    /// Fallback flags from the wellness scorer
    pub flags: Vec<String>,
}

/// Outcome of a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    Complete,
    Failed,
}

/// Complete scan report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub session_id: String,
    pub computed_at_utc: String,
    pub status: ScanStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureReason>,
    /// Advisory for the person being scanned, present on failed scans
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_hint: Option<String>,
    pub sample_count: usize,
    pub duration_ms: f64,
    pub quality: ReportQuality,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hrv: Option<HrvMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<BiometricAnalysis>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rr_intervals: Vec<RrInterval>,
}
