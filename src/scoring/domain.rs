use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Measured body angles the pose supplier reports, keyed by snake_case name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyAngle {
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    TorsoVertical,
}

impl BodyAngle {
    pub const fn key(self) -> &'static str {
        match self {
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
            Self::TorsoVertical => "torso_vertical",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::LeftShoulder => "Left shoulder",
            Self::RightShoulder => "Right shoulder",
            Self::LeftElbow => "Left elbow",
            Self::RightElbow => "Right elbow",
            Self::LeftHip => "Left hip",
            Self::RightHip => "Right hip",
            Self::LeftKnee => "Left knee",
            Self::RightKnee => "Right knee",
            Self::LeftAnkle => "Left ankle",
            Self::RightAnkle => "Right ankle",
            Self::TorsoVertical => "Torso",
        }
    }
}

/// Paired joints measured on both sides of the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Joint {
    Shoulder,
    Elbow,
    Hip,
    Knee,
    Ankle,
}

impl Joint {
    pub const fn left(self) -> BodyAngle {
        match self {
            Self::Shoulder => BodyAngle::LeftShoulder,
            Self::Elbow => BodyAngle::LeftElbow,
            Self::Hip => BodyAngle::LeftHip,
            Self::Knee => BodyAngle::LeftKnee,
            Self::Ankle => BodyAngle::LeftAnkle,
        }
    }

    pub const fn right(self) -> BodyAngle {
        match self {
            Self::Shoulder => BodyAngle::RightShoulder,
            Self::Elbow => BodyAngle::RightElbow,
            Self::Hip => BodyAngle::RightHip,
            Self::Knee => BodyAngle::RightKnee,
            Self::Ankle => BodyAngle::RightAnkle,
        }
    }
}

/// One pose observation: angle name to degrees.
///
/// Values are not range-checked. Non-finite values are kept in the map but read back
/// as absent, so a NaN from an upstream bug is never scored. Results echo
/// [`AngleMap::finite`], never the raw map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AngleMap(BTreeMap<String, f64>);

impl AngleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, angle: BodyAngle, degrees: f64) -> Option<f64> {
        self.0.insert(angle.key().to_string(), degrees)
    }

    pub fn remove(&mut self, angle: BodyAngle) -> Option<f64> {
        self.0.remove(angle.key())
    }

    pub fn get(&self, angle: BodyAngle) -> Option<f64> {
        self.get_named(angle.key())
    }

    pub fn get_named(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied().filter(|value| value.is_finite())
    }

    pub fn contains(&self, angle: BodyAngle) -> bool {
        self.get(angle).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when at least one entry carries a finite reading.
    pub fn has_measurements(&self) -> bool {
        self.0.values().any(|value| value.is_finite())
    }

    /// Names of entries that will be ignored because they are NaN or infinite.
    pub fn non_finite_names(&self) -> Vec<&str> {
        self.0
            .iter()
            .filter(|(_, value)| !value.is_finite())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// Copy holding only the finite readings.
    pub fn finite(&self) -> Self {
        self.iter()
            .filter(|(_, value)| value.is_finite())
            .map(|(name, value)| (name.to_string(), value))
            .collect::<BTreeMap<_, _>>()
            .into()
    }

    /// Mean of both sides when both are present, otherwise whichever side is.
    pub fn bilateral_mean(&self, joint: Joint) -> Option<f64> {
        match (self.get(joint.left()), self.get(joint.right())) {
            (Some(left), Some(right)) => Some((left + right) / 2.0),
            (Some(single), None) | (None, Some(single)) => Some(single),
            (None, None) => None,
        }
    }

    /// The first reading present, in the order given.
    pub fn first_of(&self, preferred: BodyAngle, fallback: BodyAngle) -> Option<f64> {
        self.get(preferred).or_else(|| self.get(fallback))
    }
}

impl From<BTreeMap<String, f64>> for AngleMap {
    fn from(value: BTreeMap<String, f64>) -> Self {
        Self(value)
    }
}

impl FromIterator<(BodyAngle, f64)> for AngleMap {
    fn from_iter<T: IntoIterator<Item = (BodyAngle, f64)>>(iter: T) -> Self {
        let mut map = AngleMap::new();
        for (angle, degrees) in iter {
            map.insert(angle, degrees);
        }
        map
    }
}

/// Skills with a reference template, plus the template-free `General` fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    Handstand,
    Split,
    Bridge,
    Pike,
    Tuck,
    General,
}

impl Skill {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Handstand,
            Self::Split,
            Self::Bridge,
            Self::Pike,
            Self::Tuck,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Handstand => "handstand",
            Self::Split => "split",
            Self::Bridge => "bridge",
            Self::Pike => "pike",
            Self::Tuck => "tuck",
            Self::General => "general",
        }
    }

    /// Case-insensitive lookup by key. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "handstand" => Some(Self::Handstand),
            "split" => Some(Self::Split),
            "bridge" => Some(Self::Bridge),
            "pike" => Some(Self::Pike),
            "tuck" => Some(Self::Tuck),
            "general" => Some(Self::General),
            _ => None,
        }
    }
}

/// Deduction tier for an out-of-tolerance angle, ordered by seriousness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Minor,
    Moderate,
    Major,
    Severe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InjuryRiskKind {
    KneeHyperextension,
    ElbowHyperextension,
}

/// Overall label derived from the final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quality {
    Excellent,
    #[serde(rename = "Very Good")]
    VeryGood,
    Good,
    Fair,
    #[serde(rename = "Needs Improvement")]
    NeedsImprovement,
    #[serde(rename = "Unable to detect pose")]
    Undetected,
}

impl Quality {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::VeryGood => "Very Good",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::NeedsImprovement => "Needs Improvement",
            Self::Undetected => "Unable to detect pose",
        }
    }
}

/// Out-of-tolerance angle that cost points.
///
/// Template errors carry `ideal` and `deviation`; general-form errors (toe point) only
/// report what was measured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormError {
    pub angle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ideal: Option<f64>,
    pub measured: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deviation: Option<f64>,
    pub deduction: f64,
    pub severity: Severity,
    pub description: String,
}

/// Drift worth mentioning that costs nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormWarning {
    pub angle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ideal: Option<f64>,
    pub measured: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deviation: Option<f64>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InjuryRisk {
    #[serde(rename = "type")]
    pub kind: InjuryRiskKind,
    pub location: BodyAngle,
    pub severity: RiskLevel,
    pub description: String,
    pub recommendation: String,
}

/// Score and feedback for one pose observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub skill: Skill,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill_name: Option<String>,
    pub score: f64,
    pub total_deduction: f64,
    pub errors: Vec<FormError>,
    pub warnings: Vec<FormWarning>,
    pub injury_risks: Vec<InjuryRisk>,
    pub overall_quality: Quality,
    pub detected_angles: AngleMap,
}

impl AnalysisResult {
    pub(crate) fn undetected(angles: &AngleMap) -> Self {
        Self {
            skill: Skill::General,
            skill_name: None,
            score: 0.0,
            total_deduction: 0.0,
            errors: Vec::new(),
            warnings: Vec::new(),
            injury_risks: Vec::new(),
            overall_quality: Quality::Undetected,
            detected_angles: angles.finite(),
        }
    }

    /// False only for the no-pose sentinel, never for a low-scoring pose.
    pub fn pose_detected(&self) -> bool {
        self.overall_quality != Quality::Undetected
    }

    /// Errors ordered most serious first; ties keep discovery order.
    pub fn errors_by_severity(&self) -> Vec<&FormError> {
        let mut errors: Vec<&FormError> = self.errors.iter().collect();
        errors.sort_by(|a, b| b.severity.cmp(&a.severity));
        errors
    }
}
