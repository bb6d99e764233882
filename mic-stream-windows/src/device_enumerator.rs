//! Windows capture-endpoint enumeration via the MMDevice API.
//!
//! Wraps `IMMDeviceEnumerator` to list active capture (microphone)
//! endpoints with friendly names, and to resolve the default endpoint or an
//! endpoint by id for acquisition.

use windows::core::PCWSTR;
use windows::Win32::Devices::FunctionDiscovery::PKEY_Device_FriendlyName;
use windows::Win32::Media::Audio::*;
use windows::Win32::System::Com::StructuredStorage::PropVariantClear;
use windows::Win32::System::Com::*;
use windows::Win32::System::Variant::*;

use mic_stream_core::CaptureError;

/// An active capture endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureDeviceInfo {
    pub id: String,
    pub name: String,
    pub is_default: bool,
}

/// Capture-endpoint enumerator using the Windows MMDevice API.
pub struct DeviceEnumerator {
    enumerator: IMMDeviceEnumerator,
}

impl DeviceEnumerator {
    /// Create a new device enumerator.
    ///
    /// Requires COM to be initialized on the calling thread.
    pub fn new() -> Result<Self, CaptureError> {
        unsafe {
            let enumerator: IMMDeviceEnumerator =
                CoCreateInstance(&MMDeviceEnumerator, None, CLSCTX_ALL).map_err(|e| {
                    CaptureError::Unknown(format!("failed to create enumerator: {}", e))
                })?;
            Ok(Self { enumerator })
        }
    }

    /// List active capture (microphone) endpoints.
    pub fn list_capture_devices(&self) -> Result<Vec<CaptureDeviceInfo>, CaptureError> {
        unsafe {
            let collection = self
                .enumerator
                .EnumAudioEndpoints(eCapture, DEVICE_STATE_ACTIVE)
                .map_err(|e| {
                    CaptureError::Unknown(format!("EnumAudioEndpoints failed: {}", e))
                })?;

            let count = collection
                .GetCount()
                .map_err(|e| CaptureError::Unknown(format!("GetCount failed: {}", e)))?;

            // Default endpoint id for comparison
            let default_id = self
                .enumerator
                .GetDefaultAudioEndpoint(eCapture, eConsole)
                .ok()
                .and_then(|d| d.GetId().ok())
                .and_then(|id| id.to_string().ok());

            let mut devices = Vec::new();

            for i in 0..count {
                let device = match collection.Item(i) {
                    Ok(d) => d,
                    Err(_) => continue,
                };

                let id = match device.GetId() {
                    Ok(id) => id.to_string().unwrap_or_default(),
                    Err(_) => continue,
                };

                let name = Self::friendly_name(&device)
                    .unwrap_or_else(|| format!("Capture Device {}", i));

                devices.push(CaptureDeviceInfo {
                    is_default: default_id.as_deref() == Some(&id),
                    id,
                    name,
                });
            }

            Ok(devices)
        }
    }

    /// The system default capture endpoint.
    pub fn default_capture_device(&self) -> Result<IMMDevice, CaptureError> {
        unsafe {
            self.enumerator
                .GetDefaultAudioEndpoint(eCapture, eConsole)
                .map_err(|_| {
                    CaptureError::DeviceUnavailable("no default capture endpoint".into())
                })
        }
    }

    /// Look up a capture endpoint by MMDevice id.
    pub fn device_by_id(&self, id: &str) -> Result<IMMDevice, CaptureError> {
        unsafe {
            let wide: Vec<u16> = id.encode_utf16().chain(std::iter::once(0)).collect();
            self.enumerator.GetDevice(PCWSTR(wide.as_ptr())).map_err(|_| {
                CaptureError::DeviceUnavailable(format!("no capture endpoint with id {}", id))
            })
        }
    }

    /// Read the PKEY_Device_FriendlyName property from a device.
    fn friendly_name(device: &IMMDevice) -> Option<String> {
        unsafe {
            let store = device.OpenPropertyStore(STGM_READ).ok()?;

            let mut prop_variant = std::mem::zeroed::<PROPVARIANT>();
            store
                .GetValue(&PKEY_Device_FriendlyName, &mut prop_variant)
                .ok()?;

            let name = if prop_variant.Anonymous.Anonymous.vt == VT_LPWSTR {
                let pwsz = prop_variant.Anonymous.Anonymous.Anonymous.pwszVal;
                if !pwsz.is_null() {
                    let len = (0..).take_while(|&i| *pwsz.offset(i) != 0).count();
                    Some(String::from_utf16_lossy(std::slice::from_raw_parts(
                        pwsz, len,
                    )))
                } else {
                    None
                }
            } else {
                None
            };

            PropVariantClear(&mut prop_variant).ok();
            name
        }
    }
}
