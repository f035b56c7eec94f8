use crate::scoring::{AngleMap, BodyAngle, FormScorer, ScoringTables};

pub(super) fn scorer() -> FormScorer {
    FormScorer::new(ScoringTables::standard())
}

pub(super) fn angles(entries: &[(BodyAngle, f64)]) -> AngleMap {
    entries.iter().copied().collect()
}

/// Clean handstand: everything extended and vertical.
pub(super) fn handstand_pose() -> AngleMap {
    angles(&[
        (BodyAngle::LeftShoulder, 178.0),
        (BodyAngle::RightShoulder, 178.0),
        (BodyAngle::TorsoVertical, 178.0),
        (BodyAngle::LeftHip, 178.0),
        (BodyAngle::RightHip, 178.0),
        (BodyAngle::LeftKnee, 179.0),
        (BodyAngle::RightKnee, 179.0),
    ])
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
