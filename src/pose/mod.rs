//! Landmark geometry: turns a detected skeleton into the angle map the scorer reads.
//!
//! Landmarks follow the 33-point MediaPipe ordering. Only the joints the scorer uses
//! are read; a landmark at or below [`MIN_VISIBILITY`] counts as missing, and any angle
//! that needs a missing landmark is left out of the map.

use serde::{Deserialize, Serialize};

use crate::scoring::{AngleMap, BodyAngle};

pub const MIN_VISIBILITY: f64 = 0.5;

pub const LEFT_SHOULDER: usize = 11;
pub const RIGHT_SHOULDER: usize = 12;
pub const LEFT_ELBOW: usize = 13;
pub const RIGHT_ELBOW: usize = 14;
pub const LEFT_WRIST: usize = 15;
pub const RIGHT_WRIST: usize = 16;
pub const LEFT_HIP: usize = 23;
pub const RIGHT_HIP: usize = 24;
pub const LEFT_KNEE: usize = 25;
pub const RIGHT_KNEE: usize = 26;
pub const LEFT_ANKLE: usize = 27;
pub const RIGHT_ANKLE: usize = 28;
pub const LEFT_FOOT_INDEX: usize = 31;
pub const RIGHT_FOOT_INDEX: usize = 32;

pub const LANDMARK_COUNT: usize = 33;

/// One detected keypoint in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    pub visibility: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, visibility: f64) -> Self {
        Self {
            x,
            y,
            z: 0.0,
            visibility,
        }
    }

    fn is_visible(&self) -> bool {
        self.visibility > MIN_VISIBILITY
    }
}

/// Vertex angle at `vertex` in degrees, in [0, 180]. `None` when either limb has zero length.
pub fn joint_angle(first: &Landmark, vertex: &Landmark, last: &Landmark) -> Option<f64> {
    let (ax, ay) = (first.x - vertex.x, first.y - vertex.y);
    let (cx, cy) = (last.x - vertex.x, last.y - vertex.y);

    let norms = ax.hypot(ay) * cx.hypot(cy);
    if norms == 0.0 || !norms.is_finite() {
        return None;
    }

    let cosine = ((ax * cx + ay * cy) / norms).clamp(-1.0, 1.0);
    Some(cosine.acos().to_degrees())
}

/// Torso verticality: 180 when the shoulder midpoint sits straight along the image
/// y-axis from the hip midpoint, falling toward 90 as the trunk lies flat.
pub fn torso_vertical(
    left_shoulder: &Landmark,
    right_shoulder: &Landmark,
    left_hip: &Landmark,
    right_hip: &Landmark,
) -> f64 {
    let shoulder_x = (left_shoulder.x + right_shoulder.x) / 2.0;
    let shoulder_y = (left_shoulder.y + right_shoulder.y) / 2.0;
    let hip_x = (left_hip.x + right_hip.x) / 2.0;
    let hip_y = (left_hip.y + right_hip.y) / 2.0;

    let from_vertical = (hip_x - shoulder_x).atan2(hip_y - shoulder_y).to_degrees().abs();
    180.0 - from_vertical
}

/// Vertex triples for every angle the scorer reads, as (first, vertex, last).
const JOINT_TRIPLES: [(BodyAngle, [usize; 3]); 10] = [
    (BodyAngle::LeftElbow, [LEFT_SHOULDER, LEFT_ELBOW, LEFT_WRIST]),
    (BodyAngle::RightElbow, [RIGHT_SHOULDER, RIGHT_ELBOW, RIGHT_WRIST]),
    (BodyAngle::LeftShoulder, [LEFT_ELBOW, LEFT_SHOULDER, LEFT_HIP]),
    (BodyAngle::RightShoulder, [RIGHT_ELBOW, RIGHT_SHOULDER, RIGHT_HIP]),
    (BodyAngle::LeftHip, [LEFT_SHOULDER, LEFT_HIP, LEFT_KNEE]),
    (BodyAngle::RightHip, [RIGHT_SHOULDER, RIGHT_HIP, RIGHT_KNEE]),
    (BodyAngle::LeftKnee, [LEFT_HIP, LEFT_KNEE, LEFT_ANKLE]),
    (BodyAngle::RightKnee, [RIGHT_HIP, RIGHT_KNEE, RIGHT_ANKLE]),
    (BodyAngle::LeftAnkle, [LEFT_KNEE, LEFT_ANKLE, LEFT_FOOT_INDEX]),
    (BodyAngle::RightAnkle, [RIGHT_KNEE, RIGHT_ANKLE, RIGHT_FOOT_INDEX]),
];

fn visible(landmarks: &[Landmark], index: usize) -> Option<&Landmark> {
    landmarks.get(index).filter(|landmark| landmark.is_visible())
}

/// Compute the angle map for one detected skeleton. Short or partially visible
/// skeletons produce a partial map, an undetected one an empty map.
pub fn body_angles(landmarks: &[Landmark]) -> AngleMap {
    let mut angles = AngleMap::new();

    for (angle, [first, vertex, last]) in JOINT_TRIPLES {
        let (Some(first), Some(vertex), Some(last)) = (
            visible(landmarks, first),
            visible(landmarks, vertex),
            visible(landmarks, last),
        ) else {
            continue;
        };
        if let Some(degrees) = joint_angle(first, vertex, last) {
            angles.insert(angle, degrees);
        }
    }

    if let (Some(ls), Some(rs), Some(lh), Some(rh)) = (
        visible(landmarks, LEFT_SHOULDER),
        visible(landmarks, RIGHT_SHOULDER),
        visible(landmarks, LEFT_HIP),
        visible(landmarks, RIGHT_HIP),
    ) {
        angles.insert(BodyAngle::TorsoVertical, torso_vertical(ls, rs, lh, rh));
    }

    angles
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    /// Upright figure with arms overhead, image y grows downward.
    fn standing_skeleton() -> Vec<Landmark> {
        let mut landmarks = vec![Landmark::new(0.0, 0.0, 0.0); LANDMARK_COUNT];
        let mut place = |index: usize, x: f64, y: f64| {
            landmarks[index] = Landmark::new(x, y, 0.99);
        };
        place(LEFT_WRIST, 90.0, -100.0);
        place(RIGHT_WRIST, 110.0, -100.0);
        place(LEFT_ELBOW, 90.0, -50.0);
        place(RIGHT_ELBOW, 110.0, -50.0);
        place(LEFT_SHOULDER, 90.0, 0.0);
        place(RIGHT_SHOULDER, 110.0, 0.0);
        place(LEFT_HIP, 90.0, 100.0);
        place(RIGHT_HIP, 110.0, 100.0);
        place(LEFT_KNEE, 90.0, 150.0);
        place(RIGHT_KNEE, 110.0, 150.0);
        place(LEFT_ANKLE, 90.0, 200.0);
        place(RIGHT_ANKLE, 110.0, 200.0);
        place(LEFT_FOOT_INDEX, 90.0, 230.0);
        place(RIGHT_FOOT_INDEX, 110.0, 230.0);
        landmarks
    }

    #[test]
    fn right_angle_and_straight_limb() {
        let vertex = Landmark::new(0.0, 0.0, 1.0);
        let along_x = Landmark::new(3.0, 0.0, 1.0);
        let along_y = Landmark::new(0.0, 4.0, 1.0);
        let opposite = Landmark::new(-2.0, 0.0, 1.0);

        assert_close(joint_angle(&along_x, &vertex, &along_y).expect("angle"), 90.0);
        assert_close(joint_angle(&along_x, &vertex, &opposite).expect("angle"), 180.0);
    }

    #[test]
    fn degenerate_limb_has_no_angle() {
        let vertex = Landmark::new(1.0, 1.0, 1.0);
        let other = Landmark::new(2.0, 5.0, 1.0);
        assert!(joint_angle(&vertex, &vertex, &other).is_none());
    }

    #[test]
    fn standing_skeleton_reads_as_fully_extended() {
        let angles = body_angles(&standing_skeleton());

        for joint in [
            BodyAngle::LeftElbow,
            BodyAngle::RightElbow,
            BodyAngle::LeftShoulder,
            BodyAngle::RightShoulder,
            BodyAngle::LeftHip,
            BodyAngle::RightHip,
            BodyAngle::LeftKnee,
            BodyAngle::RightKnee,
            BodyAngle::LeftAnkle,
            BodyAngle::RightAnkle,
            BodyAngle::TorsoVertical,
        ] {
            let degrees = angles.get(joint).unwrap_or_else(|| panic!("{joint:?} measured"));
            assert_close(degrees, 180.0);
        }
    }

    #[test]
    fn low_visibility_landmarks_drop_dependent_angles() {
        let mut landmarks = standing_skeleton();
        landmarks[LEFT_WRIST].visibility = 0.5;
        landmarks[RIGHT_HIP].visibility = 0.2;

        let angles = body_angles(&landmarks);

        assert!(!angles.contains(BodyAngle::LeftElbow));
        assert!(!angles.contains(BodyAngle::RightShoulder));
        assert!(!angles.contains(BodyAngle::RightHip));
        assert!(!angles.contains(BodyAngle::RightKnee));
        assert!(!angles.contains(BodyAngle::TorsoVertical));
        assert!(angles.contains(BodyAngle::RightElbow));
        assert!(angles.contains(BodyAngle::LeftKnee));
    }

    #[test]
    fn leaning_torso_reduces_verticality() {
        let shoulder_l = Landmark::new(100.0, 0.0, 1.0);
        let shoulder_r = Landmark::new(100.0, 0.0, 1.0);
        let hip_l = Landmark::new(0.0, 100.0, 1.0);
        let hip_r = Landmark::new(0.0, 100.0, 1.0);

        assert_close(torso_vertical(&shoulder_l, &shoulder_r, &hip_l, &hip_r), 135.0);
    }

    #[test]
    fn missing_skeleton_yields_empty_map() {
        assert!(body_angles(&[]).is_empty());
    }
}
