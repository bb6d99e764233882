use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread;

use parking_lot::Mutex;

use crate::models::config::CaptureConfig;
use crate::models::error::CaptureError;
use crate::models::event::CaptureEvent;
use crate::models::state::CaptureState;
use crate::traits::capture_device::{CaptureDevice, CaptureDeviceSource};
use crate::traits::permission::PermissionProvider;
use crate::traits::subscriber::CaptureSubscriber;

/// Consecutive short or invalid reads tolerated before the loop treats the
/// device as faulted.
const MAX_CONSECUTIVE_ANOMALIES: u32 = 5;

/// Permission-gated capture session.
///
/// Owns at most one device handle and one background reader thread. `start`
/// walks the permission gate, acquires the device, and launches the reader;
/// the reader pulls fixed-size PCM buffers and forwards each one to the
/// subscriber; `stop` signals the reader, joins it, and releases the device.
/// The session is reusable across start/stop runs.
///
/// The only state shared with the reader thread is the atomic recording
/// flag, the guarded device handle, and the state cell. The reader exits as
/// soon as the flag clears or the handle is gone, and `stop` joins it before
/// releasing the handle, so the loop can never read from a released device.
pub struct CaptureSession<S: CaptureDeviceSource, P: PermissionProvider> {
    source: S,
    permission: P,
    config: CaptureConfig,
    state: Arc<Mutex<CaptureState>>,
    recording: Arc<AtomicBool>,
    device: Arc<Mutex<Option<S::Handle>>>,
    subscriber: Option<Weak<dyn CaptureSubscriber>>,
    reader_handle: Option<thread::JoinHandle<()>>,
}

impl<S: CaptureDeviceSource, P: PermissionProvider> CaptureSession<S, P> {
    /// Create a session with a fixed configuration.
    ///
    /// The buffer size is rounded up to a multiple of the device minimum
    /// reported by `source`.
    pub fn new(source: S, permission: P, config: CaptureConfig) -> Result<Self, CaptureError> {
        config.validate()?;
        let min_buffer_size = source.min_buffer_size(&config);
        let config = config.aligned_to(min_buffer_size);
        Ok(Self {
            source,
            permission,
            config,
            state: Arc::new(Mutex::new(CaptureState::Idle)),
            recording: Arc::new(AtomicBool::new(false)),
            device: Arc::new(Mutex::new(None)),
            subscriber: None,
            reader_handle: None,
        })
    }

    /// Inject the event sink. The session keeps only a weak reference.
    pub fn set_subscriber(&mut self, subscriber: &Arc<dyn CaptureSubscriber>) {
        self.subscriber = Some(Arc::downgrade(subscriber));
    }

    pub fn is_recording(&self) -> bool {
        self.recording.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> CaptureState {
        *self.state.lock()
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Begin capture.
    ///
    /// Runs the permission flow if access was not yet granted, acquires the
    /// device (or reuses an existing handle), emits
    /// `StateChanged { value: true }`, then launches the read loop. On any
    /// failure the session remains `Idle` and the error is returned.
    pub fn start(&mut self) -> Result<(), CaptureError> {
        if self.is_recording() {
            return Err(CaptureError::AlreadyRecording);
        }
        // Reap the reader of a fault-terminated run before spawning anew.
        self.join_reader();

        if !self.permission.check_permission().is_granted() {
            self.set_state(CaptureState::AwaitingPermission);
            if !self.permission.request_permission().is_granted() {
                log::debug!("microphone permission denied");
                self.set_state(CaptureState::Idle);
                return Err(CaptureError::PermissionDenied);
            }
        }

        if let Err(e) = self.ensure_device() {
            self.set_state(CaptureState::Idle);
            return Err(e);
        }

        self.recording.store(true, Ordering::SeqCst);
        self.set_state(CaptureState::Recording);
        self.emit(&CaptureEvent::StateChanged { value: true });

        if let Err(e) = self.spawn_reader() {
            // Roll the half-started run back so the session stays reusable.
            self.recording.store(false, Ordering::SeqCst);
            if let Some(mut handle) = self.device.lock().take() {
                handle.release();
            }
            self.set_state(CaptureState::Idle);
            self.emit(&CaptureEvent::StateChanged { value: false });
            return Err(e);
        }

        log::debug!(
            "capture started: {} Hz, {} ch, {} samples/buffer",
            self.config.sample_rate_hz,
            self.config.channel_count,
            self.config.buffer_size
        );
        Ok(())
    }

    /// Halt capture and release the device.
    ///
    /// Clears the recording flag, joins the reader thread, releases the
    /// handle, then emits `StateChanged { value: false }`. Calling while not
    /// recording is a no-op and emits nothing.
    pub fn stop(&mut self) {
        if !self.recording.swap(false, Ordering::SeqCst) {
            // Not recording. A fault-terminated run may still own a finished
            // reader thread; reap it silently.
            self.join_reader();
            return;
        }

        self.set_state(CaptureState::Stopping);
        // Join before release: once the reader has exited it can no longer
        // touch the handle.
        self.join_reader();
        if let Some(mut handle) = self.device.lock().take() {
            handle.release();
        }
        self.set_state(CaptureState::Idle);
        self.emit(&CaptureEvent::StateChanged { value: false });
        log::debug!("capture stopped");
    }

    fn ensure_device(&mut self) -> Result<(), CaptureError> {
        let mut guard = self.device.lock();
        if guard.is_some() {
            // Handle left over from a previous run; reuse without
            // reinitializing.
            return Ok(());
        }
        let mut handle = self.source.acquire(&self.config)?;
        if let Err(e) = handle.begin_streaming() {
            handle.release();
            return Err(e);
        }
        *guard = Some(handle);
        Ok(())
    }

    fn spawn_reader(&mut self) -> Result<(), CaptureError> {
        let recording = Arc::clone(&self.recording);
        let device = Arc::clone(&self.device);
        let state = Arc::clone(&self.state);
        let subscriber = self.subscriber.clone();
        let buffer_size = self.config.buffer_size;

        let handle = thread::Builder::new()
            .name("mic-stream-reader".into())
            .spawn(move || read_loop(&recording, &device, &state, subscriber.as_ref(), buffer_size))
            .map_err(|e| CaptureError::Unknown(format!("failed to spawn reader thread: {}", e)))?;
        self.reader_handle = Some(handle);
        Ok(())
    }

    fn join_reader(&mut self) {
        if let Some(handle) = self.reader_handle.take() {
            if handle.join().is_err() {
                log::error!("capture reader thread panicked");
            }
        }
    }

    fn set_state(&self, state: CaptureState) {
        *self.state.lock() = state;
    }

    fn emit(&self, event: &CaptureEvent) {
        deliver(self.subscriber.as_ref(), event);
    }
}

impl<S: CaptureDeviceSource, P: PermissionProvider> Drop for CaptureSession<S, P> {
    fn drop(&mut self) {
        // A dropped session must not leak its reader thread or the device.
        self.stop();
    }
}

fn deliver(subscriber: Option<&Weak<dyn CaptureSubscriber>>, event: &CaptureEvent) {
    if let Some(subscriber) = subscriber.and_then(Weak::upgrade) {
        subscriber.on_event(event);
    }
}

/// Background read loop: pull fixed-size buffers until the recording flag
/// clears, the handle is gone, or the device faults.
fn read_loop<H: CaptureDevice>(
    recording: &AtomicBool,
    device: &Mutex<Option<H>>,
    state: &Mutex<CaptureState>,
    subscriber: Option<&Weak<dyn CaptureSubscriber>>,
    buffer_size: usize,
) {
    let mut consecutive_anomalies = 0u32;

    loop {
        if !recording.load(Ordering::SeqCst) {
            break;
        }

        let mut guard = device.lock();
        let Some(handle) = guard.as_mut() else { break };
        let outcome = handle.read_buffer(buffer_size);
        // Never hold the device lock across subscriber delivery.
        drop(guard);

        match outcome {
            Ok(buffer) => {
                if buffer.len() < buffer_size {
                    consecutive_anomalies += 1;
                    log::warn!("short read: {} of {} samples", buffer.len(), buffer_size);
                } else {
                    consecutive_anomalies = 0;
                }
                deliver(subscriber, &CaptureEvent::BufferCaptured { buffer });
            }
            Err(e) if e.is_transient() => {
                consecutive_anomalies += 1;
                log::warn!("transient read failure: {}", e);
            }
            Err(e) => {
                fault(recording, device, state, subscriber, &e);
                return;
            }
        }

        if consecutive_anomalies >= MAX_CONSECUTIVE_ANOMALIES {
            let error = CaptureError::DeviceFault(format!(
                "{} consecutive read anomalies",
                consecutive_anomalies
            ));
            fault(recording, device, state, subscriber, &error);
            return;
        }
    }
}

/// Unrecoverable-error path: surface the fault, then clean up unless a
/// concurrent `stop()` already owns the true→false edge of the flag.
fn fault<H: CaptureDevice>(
    recording: &AtomicBool,
    device: &Mutex<Option<H>>,
    state: &Mutex<CaptureState>,
    subscriber: Option<&Weak<dyn CaptureSubscriber>>,
    error: &CaptureError,
) {
    log::error!("capture fault: {}", error);
    deliver(
        subscriber,
        &CaptureEvent::Fault {
            message: error.to_string(),
        },
    );

    if recording.swap(false, Ordering::SeqCst) {
        *state.lock() = CaptureState::Stopping;
        if let Some(mut handle) = device.lock().take() {
            handle.release();
        }
        *state.lock() = CaptureState::Idle;
        deliver(subscriber, &CaptureEvent::StateChanged { value: false });
    }
    // Otherwise a stop() in flight joins this thread and finishes cleanup.
}
