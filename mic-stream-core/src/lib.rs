//! # mic-stream-core
//!
//! Platform-agnostic streaming microphone capture.
//!
//! A [`CaptureSession`] owns a microphone-like input device behind the
//! [`CaptureDevice`] seam, walks it through a permission-gated lifecycle,
//! and pulls fixed-size PCM buffers on a dedicated reader thread, publishing
//! each buffer and any fault to a [`CaptureSubscriber`] as ordered
//! [`CaptureEvent`]s. Platform backends (Windows WASAPI today) implement
//! [`CaptureDeviceSource`] and [`PermissionProvider`] and plug in.
//!
//! ## Architecture
//!
//! ```text
//! mic-stream-core (this crate)
//! ├── traits/    ← CaptureDeviceSource, CaptureDevice, PermissionProvider, CaptureSubscriber
//! ├── models/    ← CaptureConfig, CaptureState, CaptureEvent, CaptureError
//! └── session/   ← CaptureSession (state machine + background read loop)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use mic_stream_core::{CaptureConfig, CaptureSession, CaptureSubscriber};
//!
//! let subscriber: Arc<dyn CaptureSubscriber> = Arc::new(bridge);
//! let mut session = CaptureSession::new(source, permission, CaptureConfig::default())?;
//! session.set_subscriber(&subscriber);
//!
//! session.start()?;
//! // BufferCaptured events arrive on the reader thread until...
//! session.stop();
//! ```

pub mod models;
pub mod session;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::config::CaptureConfig;
pub use models::error::CaptureError;
pub use models::event::CaptureEvent;
pub use models::state::CaptureState;
pub use session::capture::CaptureSession;
pub use traits::capture_device::{CaptureDevice, CaptureDeviceSource};
pub use traits::permission::{PermissionProvider, PermissionStatus};
pub use traits::subscriber::CaptureSubscriber;
