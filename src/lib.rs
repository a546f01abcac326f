//! Synheart Pulse - On-device rPPG engine for HRV and wellness signals
//!
//! Pulse turns a camera pixel stream into heart-rate-variability metrics and
//! derived wellness scores through a deterministic pipeline: frame sampling →
//! signal conditioning → peak detection → RR interval extraction → HRV
//! analysis → wellness scoring, with live signal-quality feedback while the
//! scan is acquiring.
//!
//! ## Entry points
//!
//! - **`ScanSession`**: stateful, frame-driven scan with a state machine
//! - **`analyze_samples`**: run the analysis stages on a recorded buffer
//! - **`samples_to_report_json`**: replay recorded input into a JSON report

pub mod buffer;
pub mod conditioner;
pub mod config;
pub mod encoder;
pub mod error;
pub mod hrv;
pub mod intervals;
pub mod peaks;
pub mod pipeline;
pub mod quality;
pub mod sampler;
pub mod samples;
pub mod scorer;
pub mod session;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::ScanConfig;
pub use error::ScanError;
pub use pipeline::{analyze_samples, samples_to_report_json};
pub use sampler::{Frame, FrameSampler, PixelFormat};
pub use session::ScanSession;
pub use types::{BiometricAnalysis, FrameSample, HrvMetrics, ScanResult, ScanState};

/// Pulse version embedded in all reports
pub const PULSE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "synheart-pulse";
