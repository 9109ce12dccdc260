/// One body keypoint as reported by the pose detector, in normalized image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub visibility: f32,
}

impl Landmark {
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.visibility.is_finite()
    }
}

/// Detector output for a single camera frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PoseResult {
    pub landmarks: Vec<Landmark>,
}

impl PoseResult {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    /// A person counts as present when the detector produced a usable landmark set.
    pub fn is_person_present(&self) -> bool {
        !self.landmarks.is_empty() && self.landmarks.iter().all(Landmark::is_finite)
    }
}
