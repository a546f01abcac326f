//! Frame sampling
//!
//! Reduces one raw camera frame to four scalar channel averages plus a
//! timestamp. Every pixel contributes; the reduction is a single streaming
//! fold so memory stays bounded regardless of resolution.

use crate::error::ScanError;
use crate::types::FrameSample;

/// Pixel layout of a packed 8-bit frame buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Rgb,
    Rgba,
}

impl PixelFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba => 4,
        }
    }
}

/// Borrowed view over one raw frame (row-major, 8 bits per channel)
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub data: &'a [u8],
    pub width: usize,
    pub height: usize,
    pub format: PixelFormat,
}

impl<'a> Frame<'a> {
    /// Wrap a packed RGBA buffer, as delivered by canvas-style capture APIs
    pub fn rgba(data: &'a [u8], width: usize, height: usize) -> Self {
        Self {
            data,
            width,
            height,
            format: PixelFormat::Rgba,
        }
    }

    /// Wrap a packed RGB buffer
    pub fn rgb(data: &'a [u8], width: usize, height: usize) -> Self {
        Self {
            data,
            width,
            height,
            format: PixelFormat::Rgb,
        }
    }

    /// `None` when `width × height` does not fit in `usize`
    pub fn pixel_count(&self) -> Option<usize> {
        self.width.checked_mul(self.height)
    }

    /// Checks the buffer against the dimensions and returns the pixel count
    fn validate(&self) -> Result<usize, ScanError> {
        if self.width == 0 || self.height == 0 {
            return Err(ScanError::InvalidFrame(format!(
                "frame must have positive dimensions, got {}x{}",
                self.width, self.height
            )));
        }
        let too_large = || {
            ScanError::InvalidFrame(format!(
                "frame dimensions {}x{} overflow the addressable size",
                self.width, self.height
            ))
        };
        let pixels = self.pixel_count().ok_or_else(too_large)?;
        let expected = pixels
            .checked_mul(self.format.bytes_per_pixel())
            .ok_or_else(too_large)?;
        if self.data.len() != expected {
            return Err(ScanError::InvalidFrame(format!(
                "expected {} bytes for {}x{} {:?}, got {}",
                expected,
                self.width,
                self.height,
                self.format,
                self.data.len()
            )));
        }
        Ok(pixels)
    }
}

/// Frame sampler producing one `FrameSample` per frame
pub struct FrameSampler;

impl FrameSampler {
    /// Average each channel over all pixels and derive luma from the means.
    pub fn sample(frame: &Frame<'_>, timestamp: f64) -> Result<FrameSample, ScanError> {
        let pixels = frame.validate()?;
        if !timestamp.is_finite() {
            return Err(ScanError::InvalidFrame(format!(
                "timestamp must be finite, got {timestamp}"
            )));
        }

        let (r, g, b) = frame
            .data
            .chunks_exact(frame.format.bytes_per_pixel())
            .fold((0u64, 0u64, 0u64), |(r, g, b), px| {
                (r + px[0] as u64, g + px[1] as u64, b + px[2] as u64)
            });

        let count = pixels as f64;
        Ok(FrameSample::from_means(
            timestamp,
            r as f64 / count,
            g as f64 / count,
            b as f64 / count,
        ))
    }
}
