//! WASAPI pull-mode microphone capture.
//!
//! Opens a capture endpoint in shared mode at the configured 16-bit PCM
//! layout (the audio engine converts sample rate and channel count) and
//! exposes a blocking `read_buffer` that drains capture packets into a
//! pending sample queue.

use std::collections::VecDeque;
use std::thread;
use std::time::{Duration, Instant};

use windows::Win32::Media::Audio::*;
use windows::Win32::System::Com::CLSCTX_ALL;

use mic_stream_core::{CaptureConfig, CaptureDevice, CaptureDeviceSource, CaptureError};

use crate::com;
use crate::device_enumerator::DeviceEnumerator;

/// Interval between capture-packet polls while a read is blocked.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How long a read waits without any packet arriving before it is reported
/// as a read anomaly (or a short read, if partial data arrived).
const READ_STALL: Duration = Duration::from_secs(1);

/// WASAPI shared-mode engine period in milliseconds. Buffers are aligned to
/// a multiple of one period's worth of samples.
const ENGINE_PERIOD_MS: usize = 10;

/// Capture-device source for a WASAPI endpoint.
///
/// Targets the system default microphone or a specific endpoint by
/// MMDevice id.
pub struct WasapiDeviceSource {
    device_id: Option<String>,
}

impl WasapiDeviceSource {
    /// Source for the system default microphone.
    pub fn default_device() -> Self {
        Self { device_id: None }
    }

    /// Source for a specific capture endpoint.
    pub fn with_device(id: String) -> Self {
        Self {
            device_id: Some(id),
        }
    }
}

impl CaptureDeviceSource for WasapiDeviceSource {
    type Handle = WasapiCaptureDevice;

    fn is_available(&self) -> bool {
        com::ensure_mta().is_ok()
            && DeviceEnumerator::new()
                .map(|e| !e.list_capture_devices().unwrap_or_default().is_empty())
                .unwrap_or(false)
    }

    fn min_buffer_size(&self, config: &CaptureConfig) -> usize {
        // One engine period of samples, in signed bytes.
        let frames = config.sample_rate_hz as usize * ENGINE_PERIOD_MS / 1000;
        (frames * config.frame_size()).max(config.frame_size())
    }

    fn acquire(&self, config: &CaptureConfig) -> Result<WasapiCaptureDevice, CaptureError> {
        com::ensure_mta()?;
        unsafe {
            let enumerator = DeviceEnumerator::new()?;
            let device = match &self.device_id {
                Some(id) => enumerator.device_by_id(id)?,
                None => enumerator.default_capture_device()?,
            };

            let audio_client: IAudioClient = device.Activate(CLSCTX_ALL, None).map_err(|e| {
                CaptureError::DeviceUnavailable(format!("Activate failed: {}", e))
            })?;

            let format = pcm_format(config);

            // Shared mode with engine-side conversion to the configured
            // layout; 100ms engine buffer in 100-nanosecond units.
            audio_client
                .Initialize(
                    AUDCLNT_SHAREMODE_SHARED,
                    AUDCLNT_STREAMFLAGS_AUTOCONVERTPCM
                        | AUDCLNT_STREAMFLAGS_SRC_DEFAULT_QUALITY
                        | AUDCLNT_STREAMFLAGS_NOPERSIST,
                    1_000_000,
                    0,
                    &format,
                    None,
                )
                .map_err(|e| {
                    CaptureError::DeviceUnavailable(format!(
                        "IAudioClient::Initialize failed: {}",
                        e
                    ))
                })?;

            let capture_client: IAudioCaptureClient = audio_client
                .GetService()
                .map_err(|e| CaptureError::Unknown(format!("GetService failed: {}", e)))?;

            log::debug!(
                "acquired WASAPI capture endpoint: {} Hz, {} ch",
                config.sample_rate_hz,
                config.channel_count
            );

            Ok(WasapiCaptureDevice {
                audio_client,
                capture_client,
                frame_size: config.frame_size(),
                pending: VecDeque::new(),
                started: false,
                released: false,
            })
        }
    }
}

/// An acquired WASAPI capture endpoint.
pub struct WasapiCaptureDevice {
    audio_client: IAudioClient,
    capture_client: IAudioCaptureClient,
    frame_size: usize,
    pending: VecDeque<i8>,
    started: bool,
    released: bool,
}

// SAFETY: the COM interfaces live in the process MTA (`com::ensure_mta` runs
// on every thread that touches them) and the owning session serializes all
// access to the handle behind a lock, so the interfaces are never used from
// two threads at once.
unsafe impl Send for WasapiCaptureDevice {}

impl WasapiCaptureDevice {
    /// Move every ready capture packet into the pending queue.
    ///
    /// Returns the number of samples drained.
    fn drain_packets(&mut self) -> Result<usize, CaptureError> {
        let mut drained = 0usize;
        unsafe {
            let mut packet_frames: u32 = 0;
            self.capture_client
                .GetNextPacketSize(&mut packet_frames)
                .map_err(|e| {
                    CaptureError::DeviceFault(format!("GetNextPacketSize failed: {}", e))
                })?;

            while packet_frames > 0 {
                let mut buffer_ptr: *mut u8 = std::ptr::null_mut();
                let mut frames: u32 = 0;
                let mut flags: u32 = 0;

                self.capture_client
                    .GetBuffer(&mut buffer_ptr, &mut frames, &mut flags, None, None)
                    .map_err(|e| CaptureError::DeviceFault(format!("GetBuffer failed: {}", e)))?;

                if frames > 0 && !buffer_ptr.is_null() {
                    let byte_len = frames as usize * self.frame_size;

                    if flags & (AUDCLNT_BUFFERFLAGS_SILENT.0 as u32) != 0 {
                        self.pending.extend(std::iter::repeat(0i8).take(byte_len));
                    } else {
                        let bytes = std::slice::from_raw_parts(buffer_ptr as *const i8, byte_len);
                        self.pending.extend(bytes.iter().copied());
                    }
                    drained += byte_len;
                }

                self.capture_client.ReleaseBuffer(frames).map_err(|e| {
                    CaptureError::DeviceFault(format!("ReleaseBuffer failed: {}", e))
                })?;

                self.capture_client
                    .GetNextPacketSize(&mut packet_frames)
                    .map_err(|e| {
                        CaptureError::DeviceFault(format!("GetNextPacketSize failed: {}", e))
                    })?;
            }
        }
        Ok(drained)
    }
}

impl CaptureDevice for WasapiCaptureDevice {
    fn begin_streaming(&mut self) -> Result<(), CaptureError> {
        com::ensure_mta()?;
        unsafe {
            self.audio_client.Start().map_err(|e| {
                CaptureError::DeviceFault(format!("IAudioClient::Start failed: {}", e))
            })?;
        }
        self.started = true;
        Ok(())
    }

    fn read_buffer(&mut self, sample_count: usize) -> Result<Vec<i8>, CaptureError> {
        com::ensure_mta()?;
        let mut deadline = Instant::now() + READ_STALL;

        while self.pending.len() < sample_count {
            let drained = self.drain_packets()?;
            if drained > 0 {
                deadline = Instant::now() + READ_STALL;
                continue;
            }
            if Instant::now() >= deadline {
                let got = self.pending.len();
                if got == 0 {
                    return Err(CaptureError::ReadAnomaly {
                        requested: sample_count,
                        got: 0,
                    });
                }
                // Stalled engine: hand back what arrived as a short read.
                return Ok(self.pending.drain(..).collect());
            }
            thread::sleep(POLL_INTERVAL);
        }

        Ok(self.pending.drain(..sample_count).collect())
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        if com::ensure_mta().is_err() {
            return;
        }
        unsafe {
            if self.started {
                if let Err(e) = self.audio_client.Stop() {
                    log::warn!("IAudioClient::Stop failed: {}", e);
                }
            }
            let _ = self.audio_client.Reset();
        }
        self.pending.clear();
        log::debug!("released WASAPI capture endpoint");
    }
}

/// The configured layout as a `WAVEFORMATEX` for shared-mode initialization.
fn pcm_format(config: &CaptureConfig) -> WAVEFORMATEX {
    let block_align = config.frame_size() as u16;
    WAVEFORMATEX {
        wFormatTag: WAVE_FORMAT_PCM as u16,
        nChannels: config.channel_count,
        nSamplesPerSec: config.sample_rate_hz,
        nAvgBytesPerSec: config.sample_rate_hz * block_align as u32,
        nBlockAlign: block_align,
        wBitsPerSample: config.bits_per_sample,
        cbSize: 0,
    }
}
