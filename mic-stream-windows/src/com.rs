//! Per-thread COM initialization.
//!
//! A capture handle is acquired on the caller's thread but read from the
//! session's reader thread, so every entry point that touches COM joins the
//! process MTA first. Initialization happens once per thread and is undone
//! when the thread exits.

use std::cell::RefCell;

use windows::Win32::System::Com::{CoInitializeEx, CoUninitialize, COINIT_MULTITHREADED};

use mic_stream_core::CaptureError;

struct ComGuard;

impl Drop for ComGuard {
    fn drop(&mut self) {
        unsafe {
            CoUninitialize();
        }
    }
}

thread_local! {
    static COM: RefCell<Option<ComGuard>> = const { RefCell::new(None) };
}

/// Join the process MTA on the calling thread.
pub(crate) fn ensure_mta() -> Result<(), CaptureError> {
    COM.with(|slot| {
        let mut slot = slot.borrow_mut();
        if slot.is_some() {
            return Ok(());
        }
        unsafe {
            CoInitializeEx(None, COINIT_MULTITHREADED)
                .ok()
                .map_err(|e| CaptureError::Unknown(format!("CoInitializeEx failed: {}", e)))?;
        }
        *slot = Some(ComGuard);
        Ok(())
    })
}
