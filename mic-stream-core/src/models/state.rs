/// Capture session state machine.
///
/// State transitions:
/// ```text
/// idle → awaiting-permission → recording → stopping → idle
///              │ (denied)
///              └→ idle
/// ```
/// A session with permission already granted skips `AwaitingPermission`.
/// A device fault while recording takes the same stopping → idle path as
/// `stop()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    AwaitingPermission,
    Recording,
    Stopping,
}

impl CaptureState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording)
    }
}
