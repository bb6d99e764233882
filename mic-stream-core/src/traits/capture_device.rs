use crate::models::config::CaptureConfig;
use crate::models::error::CaptureError;

/// Factory for capture device handles.
///
/// Implemented by platform backends (e.g. the WASAPI source on Windows) and
/// by test doubles.
pub trait CaptureDeviceSource: Send {
    type Handle: CaptureDevice;

    /// Whether a usable input device currently exists.
    fn is_available(&self) -> bool;

    /// The device's minimum transfer size in samples for `config`.
    ///
    /// The session rounds its buffer size up to a multiple of this value so
    /// reads never underrun.
    fn min_buffer_size(&self, config: &CaptureConfig) -> usize;

    /// Open the input device at the given configuration.
    ///
    /// Fails with [`CaptureError::DeviceUnavailable`] if the device cannot
    /// be opened at the requested format or is already held elsewhere.
    fn acquire(&self, config: &CaptureConfig) -> Result<Self::Handle, CaptureError>;
}

/// An exclusively-owned handle to a streaming input device.
///
/// A handle moves to the session's reader thread, hence `Send`; the session
/// serializes all access behind a lock and releases the handle only after
/// the reader has exited.
pub trait CaptureDevice: Send + 'static {
    /// Transition the device into active-capture mode.
    ///
    /// Calling this twice on one handle is a caller error.
    fn begin_streaming(&mut self) -> Result<(), CaptureError>;

    /// Pull the next `sample_count` samples, blocking until they are
    /// available.
    ///
    /// Returns fewer samples than requested only on a short read, which the
    /// caller treats as diagnostic rather than fatal.
    /// [`CaptureError::ReadAnomaly`] marks a transient invalid read; any
    /// other error is unrecoverable.
    fn read_buffer(&mut self, sample_count: usize) -> Result<Vec<i8>, CaptureError>;

    /// Stop streaming and return the resource to the OS.
    ///
    /// Idempotent, safe without a prior `begin_streaming`, and safe to call
    /// from a different thread than the one that acquired the handle.
    fn release(&mut self);
}
