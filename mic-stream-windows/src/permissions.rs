//! Windows microphone privacy permission.
//!
//! On Windows 10 1803+, microphone access is controlled by the privacy
//! settings at Settings > Privacy > Microphone. Desktop apps are generally
//! allowed unless the user has disabled the global toggle.
//!
//! Unlike macOS TCC, there's no per-app consent dialog for unpackaged
//! desktop apps, so "requesting" access can only re-check the toggle.

use windows::Win32::Media::Audio::IAudioClient;
use windows::Win32::System::Com::CLSCTX_ALL;

use mic_stream_core::{CaptureError, PermissionProvider, PermissionStatus};

use crate::com;
use crate::device_enumerator::DeviceEnumerator;

/// Check if microphone access is available.
///
/// Attempts to activate an `IAudioClient` on the default capture endpoint.
/// Access denied or device-in-use means microphone permission is likely
/// disabled in Windows Privacy Settings.
pub fn check_microphone_permission() -> Result<bool, CaptureError> {
    com::ensure_mta()?;

    let device = match DeviceEnumerator::new()?.default_capture_device() {
        Ok(d) => d,
        Err(_) => return Ok(false), // No capture device
    };

    let result: windows::core::Result<IAudioClient> =
        unsafe { device.Activate(CLSCTX_ALL, None) };

    match result {
        Ok(_) => Ok(true),
        Err(e) => {
            let code = e.code().0;
            // E_ACCESSDENIED or AUDCLNT_E_DEVICE_IN_USE
            if code == -2147024891i32 || code == -2004287478i32 {
                Ok(false)
            } else {
                log::warn!("unexpected error checking mic permission: {}", e);
                Ok(true)
            }
        }
    }
}

/// Permission provider backed by the Windows privacy settings.
#[derive(Debug, Default)]
pub struct WindowsPermissionProvider;

impl PermissionProvider for WindowsPermissionProvider {
    fn check_permission(&self) -> PermissionStatus {
        match check_microphone_permission() {
            Ok(true) => PermissionStatus::Granted,
            Ok(false) => PermissionStatus::Denied,
            Err(e) => {
                log::warn!("permission check failed: {}", e);
                PermissionStatus::Denied
            }
        }
    }

    /// Re-checks the privacy toggle; there is no interactive prompt to
    /// trigger for unpackaged desktop apps.
    fn request_permission(&self) -> PermissionStatus {
        self.check_permission()
    }
}
