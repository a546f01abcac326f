//! Report encoding
//!
//! This module encodes a finished scan session into a self-describing report
//! for the host: producer metadata, acquisition quality, HRV metrics and the
//! derived wellness scores.

use crate::error::ScanError;
use crate::quality::signal_quality;
use crate::session::ScanSession;
use crate::types::{ReportProducer, ReportQuality, ScanReport, ScanState, ScanStatus};
use crate::{PRODUCER_NAME, PULSE_VERSION};
use chrono::Utc;
use uuid::Uuid;

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Report encoder
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Encode a session that has reached `Complete` or `Failed`
    pub fn encode(&self, session: &ScanSession) -> Result<ScanReport, ScanError> {
        let (status, failure) = match session.state() {
            ScanState::Complete => (ScanStatus::Complete, None),
            ScanState::Failed(reason) => (ScanStatus::Failed, Some(reason)),
            other => {
                return Err(ScanError::InvalidState {
                    operation: "encode a report",
                    state: other.as_str(),
                })
            }
        };

        let producer = ReportProducer {
            name: PRODUCER_NAME.to_string(),
            version: PULSE_VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        let buffer = session.buffer();
        let result = session.result();

        let flags = result
            .map(|r| {
                r.analysis
                    .flags
                    .iter()
                    .map(|f| f.as_str().to_string())
                    .collect()
            })
            .unwrap_or_default();

        let quality = ReportQuality {
            signal_quality: signal_quality(&buffer.red_channel()),
            sample_rate_hz: buffer.estimated_sample_rate().unwrap_or(0.0),
            motion_artifacts: session.motion_artifacts(),
            flags,
        };

        Ok(ScanReport {
            report_version: REPORT_VERSION.to_string(),
            producer,
            session_id: session.id().to_string(),
            computed_at_utc: Utc::now().to_rfc3339(),
            status,
            failure,
            failure_hint: failure.map(|reason| reason.hint().to_string()),
            sample_count: buffer.len(),
            duration_ms: buffer.elapsed_ms(),
            quality,
            hrv: result.map(|r| r.metrics),
            analysis: result.map(|r| r.analysis.clone()),
            rr_intervals: result.map(|r| r.rr_intervals.clone()).unwrap_or_default(),
        })
    }

    /// Encode to JSON string
    pub fn encode_to_json(&self, session: &ScanSession) -> Result<String, ScanError> {
        let report = self.encode(session)?;
        serde_json::to_string_pretty(&report).map_err(ScanError::JsonError)
    }
}
