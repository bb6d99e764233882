//! # mic-stream-windows
//!
//! Windows WASAPI backend for mic-stream.
//!
//! Provides:
//! - `WasapiDeviceSource` / `WasapiCaptureDevice` — pull-mode microphone
//!   capture over a shared-mode WASAPI endpoint
//! - `DeviceEnumerator` — capture-endpoint enumeration via the MMDevice API
//! - `WindowsPermissionProvider` — Windows microphone privacy check
//!
//! ## Platform Requirements
//! - Windows 10 1703+ (build 15063)
//! - Visual Studio Build Tools 2022 + Windows SDK for linking
//!
//! ## Usage
//! ```ignore
//! use mic_stream_core::{CaptureConfig, CaptureSession};
//! use mic_stream_windows::{WasapiDeviceSource, WindowsPermissionProvider};
//!
//! let source = WasapiDeviceSource::default_device();
//! let mut session =
//!     CaptureSession::new(source, WindowsPermissionProvider, CaptureConfig::default())?;
//! ```

#[cfg(target_os = "windows")]
mod com;
#[cfg(target_os = "windows")]
pub mod device_enumerator;
#[cfg(target_os = "windows")]
pub mod permissions;
#[cfg(target_os = "windows")]
pub mod wasapi_device;

#[cfg(target_os = "windows")]
pub use device_enumerator::{CaptureDeviceInfo, DeviceEnumerator};
#[cfg(target_os = "windows")]
pub use permissions::WindowsPermissionProvider;
#[cfg(target_os = "windows")]
pub use wasapi_device::{WasapiCaptureDevice, WasapiDeviceSource};
