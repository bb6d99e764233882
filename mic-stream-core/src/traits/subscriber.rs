use crate::models::event::CaptureEvent;

/// Event sink injected into a capture session.
///
/// Events arrive in capture order. Buffer and fault events are delivered on
/// the session's reader thread; implementations must not call back into the
/// session and should marshal to their own thread if needed. The session
/// holds the subscriber weakly — dropping it simply stops delivery.
pub trait CaptureSubscriber: Send + Sync {
    fn on_event(&self, event: &CaptureEvent);
}
