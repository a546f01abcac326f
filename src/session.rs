//! Scan session
//!
//! `ScanSession` is the aggregate root of one scan. It owns the sample
//! buffer, drives the `Idle → Acquiring → Analyzing → Complete | Failed`
//! state machine, and holds at most one result. A new scan always needs a new
//! session; nothing carries over between sessions.

use crate::buffer::SignalBuffer;
use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::pipeline::analyze_samples;
use crate::quality::{signal_quality, MotionArtifactWarning, MotionMonitor};
use crate::sampler::{Frame, FrameSampler};
use crate::types::{FailureReason, FrameSample, LiveFeedback, MotionEvent, ScanResult, ScanState};
use uuid::Uuid;

/// One scan, from first frame to result
pub struct ScanSession {
    id: Uuid,
    config: ScanConfig,
    state: ScanState,
    buffer: SignalBuffer,
    motion: MotionMonitor,
    result: Option<ScanResult>,
}

impl Default for ScanSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanSession {
    /// Create an idle session with default settings
    pub fn new() -> Self {
        Self::build(ScanConfig::default())
    }

    /// Create an idle session with a validated configuration
    pub fn with_config(config: ScanConfig) -> Result<Self, ScanError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: ScanConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            motion: MotionMonitor::from_config(&config),
            buffer: SignalBuffer::with_capacity(config.min_scan_samples),
            config,
            state: ScanState::Idle,
            result: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn is_acquiring(&self) -> bool {
        self.state == ScanState::Acquiring
    }

    pub fn buffer(&self) -> &SignalBuffer {
        &self.buffer
    }

    /// The analysis result, once the session is `Complete`
    pub fn result(&self) -> Option<&ScanResult> {
        self.result.as_ref()
    }

    /// Why the session failed, if it did
    pub fn failure(&self) -> Option<FailureReason> {
        match self.state {
            ScanState::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn motion_artifacts(&self) -> u32 {
        self.motion.artifact_count()
    }

    /// Begin acquiring with an empty buffer
    pub fn start(&mut self) -> Result<(), ScanError> {
        self.require(ScanState::Idle, "start a scan")?;
        self.buffer.clear();
        self.transition(ScanState::Acquiring);
        Ok(())
    }

    /// Reduce a raw frame and append it
    pub fn push_frame(&mut self, frame: &Frame<'_>, timestamp: f64) -> Result<LiveFeedback, ScanError> {
        self.require(ScanState::Acquiring, "push a frame")?;
        let sample = FrameSampler::sample(frame, timestamp)?;
        self.push_sample(sample)
    }

    /// Append an already reduced sample.
    ///
    /// Once the buffer spans the configured scan duration, analysis runs
    /// immediately; the returned feedback carries the resulting state.
    pub fn push_sample(&mut self, sample: FrameSample) -> Result<LiveFeedback, ScanError> {
        self.require(ScanState::Acquiring, "push a sample")?;
        self.buffer.push(sample)?;

        if self.buffer.elapsed_ms() >= self.config.scan_duration_ms {
            log::info!(
                "scan {} reached {:.0} ms, analyzing",
                self.id,
                self.config.scan_duration_ms
            );
            // Failure is captured in the session state.
            let _ = self.finish();
        }

        Ok(self.feedback())
    }

    /// Feed a motion reading. Readings outside `Acquiring` are ignored.
    pub fn record_motion(&mut self, event: &MotionEvent) -> Option<MotionArtifactWarning> {
        if !self.is_acquiring() {
            return None;
        }
        self.motion.record(event)
    }

    /// Displayed quality of the signal so far (0-100), motion penalty applied
    pub fn quality(&self) -> f64 {
        let raw = signal_quality(&self.buffer.red_channel());
        match self.buffer.samples().last() {
            Some(last) => self.motion.adjust(raw, last.timestamp),
            None => raw,
        }
    }

    /// Current live feedback snapshot
    pub fn feedback(&self) -> LiveFeedback {
        let elapsed_ms = self.buffer.elapsed_ms();
        let motion_active = self
            .buffer
            .samples()
            .last()
            .map(|s| self.motion.is_active(s.timestamp))
            .unwrap_or(false);

        LiveFeedback {
            sample_count: self.buffer.len(),
            elapsed_ms,
            progress: (elapsed_ms / self.config.scan_duration_ms).clamp(0.0, 1.0),
            quality: self.quality(),
            motion_active,
            state: self.state,
        }
    }

    /// Stop acquiring and analyze the frozen buffer.
    ///
    /// A complete session returns its existing result.
    pub fn finish(&mut self) -> Result<&ScanResult, ScanError> {
        if self.state == ScanState::Complete {
            return self.result.as_ref().ok_or(ScanError::InvalidState {
                operation: "finish",
                state: "complete",
            });
        }
        self.require(ScanState::Acquiring, "finish")?;

        if self.buffer.len() < self.config.min_scan_samples {
            let err = ScanError::InsufficientData {
                collected: self.buffer.len(),
                required: self.config.min_scan_samples,
            };
            self.fail(&err);
            return Err(err);
        }

        self.transition(ScanState::Analyzing);
        let snapshot = self.buffer.snapshot();

        match analyze_samples(&snapshot, &self.config) {
            Ok(result) => {
                log::info!(
                    "scan {} complete: {:.1} bpm from {} intervals",
                    self.id,
                    result.metrics.mean_hr,
                    result.rr_intervals.len()
                );
                self.transition(ScanState::Complete);
                Ok(&*self.result.insert(result))
            }
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    fn fail(&mut self, err: &ScanError) {
        let reason = err
            .failure_reason()
            .unwrap_or(FailureReason::NonFiniteResult);
        log::warn!("scan {} failed: {}", self.id, err);
        self.transition(ScanState::Failed(reason));
    }

    fn transition(&mut self, next: ScanState) {
        log::info!(
            "scan {}: {} -> {}",
            self.id,
            self.state.as_str(),
            next.as_str()
        );
        self.state = next;
    }

    fn require(&self, expected: ScanState, operation: &'static str) -> Result<(), ScanError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ScanError::InvalidState {
                operation,
                state: self.state.as_str(),
            })
        }
    }
}
