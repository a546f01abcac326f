//! Recorded scan input
//!
//! Hosts that capture frames elsewhere can replay a scan as JSON: either an
//! array or newline-delimited records, each one a reduced frame sample or a
//! motion reading.

use crate::error::ScanError;
use crate::types::{FrameSample, MotionEvent};
use serde::{Deserialize, Deserializer, Serialize};

/// One recorded input to a scan session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScanInput {
    /// Luma is always recomputed from the channel means; a recorded value is ignored
    #[serde(deserialize_with = "deserialize_frame")]
    Frame(FrameSample),
    Motion(MotionEvent),
}

/// Channel means as recorded, without derived fields
#[derive(Deserialize)]
struct RecordedFrame {
    timestamp: f64,
    red_mean: f64,
    green_mean: f64,
    blue_mean: f64,
}

fn deserialize_frame<'de, D>(deserializer: D) -> Result<FrameSample, D::Error>
where
    D: Deserializer<'de>,
{
    let frame = RecordedFrame::deserialize(deserializer)?;
    Ok(FrameSample::from_means(
        frame.timestamp,
        frame.red_mean,
        frame.green_mean,
        frame.blue_mean,
    ))
}

/// Parser for recorded scan input
pub struct SampleAdapter;

impl SampleAdapter {
    /// Parse a JSON array of scan inputs
    pub fn parse_array(json: &str) -> Result<Vec<ScanInput>, ScanError> {
        let inputs: Vec<ScanInput> = serde_json::from_str(json)?;
        Ok(inputs)
    }

    /// Parse NDJSON (one scan input per line, blank lines skipped)
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<ScanInput>, ScanError> {
        let mut inputs = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<ScanInput>(trimmed) {
                Ok(input) => inputs.push(input),
                Err(e) => {
                    return Err(ScanError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(inputs)
    }

    /// Frame samples only, in input order
    pub fn frames(inputs: &[ScanInput]) -> Vec<FrameSample> {
        inputs
            .iter()
            .filter_map(|input| match input {
                ScanInput::Frame(sample) => Some(*sample),
                ScanInput::Motion(_) => None,
            })
            .collect()
    }
}
