use serde::{Deserialize, Serialize};

use super::error::CaptureError;

/// Configuration for a capture session, fixed at session construction.
///
/// Serializable so a host bridge can hand it across a process or language
/// boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Sample rate in Hz (default: 8000).
    pub sample_rate_hz: u32,

    /// Number of input channels (default: 1). Valid values: 1, 2.
    pub channel_count: u16,

    /// Bits per sample (default: 16). Only 16-bit PCM is supported.
    pub bits_per_sample: u16,

    /// Samples (signed bytes of the PCM stream) delivered per captured
    /// buffer (default: 320).
    ///
    /// At session construction this is rounded up to a multiple of the
    /// device's minimum transfer size so reads never underrun.
    pub buffer_size: usize,
}

impl CaptureConfig {
    pub fn validate(&self) -> Result<(), CaptureError> {
        if self.sample_rate_hz == 0 {
            return Err(CaptureError::InvalidConfiguration(
                "sample rate must be positive".into(),
            ));
        }
        if self.bits_per_sample != 16 {
            return Err(CaptureError::InvalidConfiguration(format!(
                "unsupported bit depth: {}",
                self.bits_per_sample
            )));
        }
        if ![1, 2].contains(&self.channel_count) {
            return Err(CaptureError::InvalidConfiguration(format!(
                "unsupported channel count: {}",
                self.channel_count
            )));
        }
        if self.buffer_size == 0 {
            return Err(CaptureError::InvalidConfiguration(
                "buffer size must be positive".into(),
            ));
        }
        if self.buffer_size % self.frame_size() != 0 {
            return Err(CaptureError::InvalidConfiguration(format!(
                "buffer size {} is not aligned to {}-byte frames",
                self.buffer_size,
                self.frame_size()
            )));
        }
        Ok(())
    }

    /// Bytes occupied by one frame (one sample per channel).
    pub fn frame_size(&self) -> usize {
        self.channel_count as usize * (self.bits_per_sample as usize / 8)
    }

    /// Round `buffer_size` up to the nearest multiple of
    /// `min_buffer_size`.
    pub fn aligned_to(mut self, min_buffer_size: usize) -> Self {
        if min_buffer_size > 0 && self.buffer_size % min_buffer_size != 0 {
            self.buffer_size = self.buffer_size.div_ceil(min_buffer_size) * min_buffer_size;
        }
        self
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 8000,
            channel_count: 1,
            bits_per_sample: 16,
            buffer_size: 320,
        }
    }
}
