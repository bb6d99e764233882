/// Outcome of a permission check or request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

impl PermissionStatus {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Microphone permission collaborator.
///
/// The session never touches the device until this reports
/// [`PermissionStatus::Granted`]; a denied request surfaces as a start
/// failure rather than a silent no-op.
pub trait PermissionProvider: Send {
    /// Non-interactive check of the current permission state.
    fn check_permission(&self) -> PermissionStatus;

    /// Prompt the user for access, blocking until they answer.
    ///
    /// Called only after `check_permission` reported denial.
    fn request_permission(&self) -> PermissionStatus;
}
