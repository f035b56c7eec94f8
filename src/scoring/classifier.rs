use tracing::debug;

use super::domain::{AngleMap, BodyAngle, Joint, Skill};

const HANDSTAND_SHOULDER_MIN: f64 = 160.0;
const HANDSTAND_TORSO_MIN: f64 = 160.0;
const FOLDED_HIP_MAX: f64 = 90.0;
const EXTENDED_KNEE_MIN: f64 = 160.0;
const BENT_KNEE_MAX: f64 = 90.0;
const BRIDGE_SHOULDER_MIN: f64 = 150.0;
const BRIDGE_KNEE_RANGE: (f64, f64) = (70.0, 110.0);
const SPLIT_HIP_SPREAD_MIN: f64 = 60.0;

/// Guess the skill from a pose. Rules are tried in order and the first match wins;
/// a rule whose joints are missing is skipped. `None` only for a map with no readings.
pub(crate) fn classify(angles: &AngleMap) -> Option<Skill> {
    if !angles.has_measurements() {
        return None;
    }

    let skill = handstand(angles)
        .or_else(|| pike(angles))
        .or_else(|| tuck(angles))
        .or_else(|| bridge(angles))
        .or_else(|| split(angles))
        .unwrap_or(Skill::General);

    debug!(skill = skill.key(), "classified pose");
    Some(skill)
}

fn handstand(angles: &AngleMap) -> Option<Skill> {
    let left = angles.get(BodyAngle::LeftShoulder)?;
    let right = angles.get(BodyAngle::RightShoulder)?;
    let torso = angles.get(BodyAngle::TorsoVertical)?;

    let shoulders = (left + right) / 2.0;
    (shoulders > HANDSTAND_SHOULDER_MIN && torso > HANDSTAND_TORSO_MIN).then_some(Skill::Handstand)
}

fn hip_and_knee(angles: &AngleMap) -> Option<(f64, f64)> {
    let hip = angles.first_of(BodyAngle::LeftHip, BodyAngle::RightHip)?;
    let knee = angles.first_of(BodyAngle::LeftKnee, BodyAngle::RightKnee)?;
    Some((hip, knee))
}

fn pike(angles: &AngleMap) -> Option<Skill> {
    let (hip, knee) = hip_and_knee(angles)?;
    (hip < FOLDED_HIP_MAX && knee > EXTENDED_KNEE_MIN).then_some(Skill::Pike)
}

fn tuck(angles: &AngleMap) -> Option<Skill> {
    let (hip, knee) = hip_and_knee(angles)?;
    (hip < FOLDED_HIP_MAX && knee < BENT_KNEE_MAX).then_some(Skill::Tuck)
}

fn bridge(angles: &AngleMap) -> Option<Skill> {
    let shoulders = angles.bilateral_mean(Joint::Shoulder)?;
    let knees = angles.bilateral_mean(Joint::Knee)?;
    let (low, high) = BRIDGE_KNEE_RANGE;
    (shoulders > BRIDGE_SHOULDER_MIN && knees > low && knees < high).then_some(Skill::Bridge)
}

fn split(angles: &AngleMap) -> Option<Skill> {
    let left_knee = angles.get(BodyAngle::LeftKnee)?;
    let right_knee = angles.get(BodyAngle::RightKnee)?;
    let left_hip = angles.get(BodyAngle::LeftHip)?;
    let right_hip = angles.get(BodyAngle::RightHip)?;

    let legs_extended = left_knee > EXTENDED_KNEE_MIN && right_knee > EXTENDED_KNEE_MIN;
    let spread = (left_hip - right_hip).abs();
    (legs_extended && spread > SPLIT_HIP_SPREAD_MIN).then_some(Skill::Split)
}
