use serde::{Deserialize, Serialize};

/// A discrete event published by a capture session.
///
/// Events are immutable and delivered to the subscriber in capture order.
/// Serialization is tagged by `name`, matching the bridge wire shape:
///
/// ```text
/// {"name":"isRecording","value":true}
/// {"name":"onResults","buffer":[0,-12,87,...]}
/// {"name":"onError","message":"device fault: ..."}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name")]
pub enum CaptureEvent {
    /// The session entered or left the recording state.
    #[serde(rename = "isRecording")]
    StateChanged { value: bool },

    /// One PCM buffer pulled from the device.
    ///
    /// Carries exactly the configured buffer size except transiently on a
    /// short read, where it may be smaller.
    #[serde(rename = "onResults")]
    BufferCaptured { buffer: Vec<i8> },

    /// An unrecoverable capture failure.
    #[serde(rename = "onError")]
    Fault { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_changed_wire_format() {
        let event = CaptureEvent::StateChanged { value: true };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            serde_json::json!({"name": "isRecording", "value": true})
        );
    }

    #[test]
    fn buffer_captured_wire_format() {
        let event = CaptureEvent::BufferCaptured {
            buffer: vec![0, -128, 127],
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            serde_json::json!({"name": "onResults", "buffer": [0, -128, 127]})
        );
    }

    #[test]
    fn fault_wire_format() {
        let event = CaptureEvent::Fault {
            message: "device fault: endpoint invalidated".into(),
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            serde_json::json!({"name": "onError", "message": "device fault: endpoint invalidated"})
        );
    }

    #[test]
    fn events_round_trip_through_json() {
        let event = CaptureEvent::BufferCaptured {
            buffer: vec![1, 2, 3],
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(serde_json::from_str::<CaptureEvent>(&json).unwrap(), event);
    }
}
