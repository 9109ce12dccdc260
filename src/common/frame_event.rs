use crate::common::PoseResult;

/// Presence observation for one camera frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameEvent {
    pub timestamp_ms: u64,
    pub person_present: bool,
}

impl FrameEvent {
    pub fn new(timestamp_ms: u64, person_present: bool) -> Self {
        Self {
            timestamp_ms,
            person_present,
        }
    }

    pub fn present(timestamp_ms: u64) -> Self {
        Self::new(timestamp_ms, true)
    }

    pub fn absent(timestamp_ms: u64) -> Self {
        Self::new(timestamp_ms, false)
    }

    /// Missing or malformed detector output is folded in as "absent".
    pub fn from_detection(timestamp_ms: u64, pose: Option<&PoseResult>) -> Self {
        let person_present = pose.is_some_and(PoseResult::is_person_present);
        Self::new(timestamp_ms, person_present)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Landmark;

    #[test]
    fn missing_detection_is_absent() {
        let event = FrameEvent::from_detection(42, None);
        assert_eq!(event, FrameEvent::absent(42));
    }

    #[test]
    fn usable_detection_is_present() {
        let pose = PoseResult::new(vec![Landmark {
            x: 0.1,
            y: 0.1,
            z: 0.0,
            visibility: 1.0,
        }]);
        let event = FrameEvent::from_detection(42, Some(&pose));
        assert!(event.person_present);
    }
}
