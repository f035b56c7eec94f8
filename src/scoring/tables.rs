use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::{Severity, Skill};

/// Template-level angle names. Each resolves to one or more measured angles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalAngle {
    BodyVertical,
    TorsoUpright,
    ShoulderAngle,
    HipAngle,
    HipElevation,
    KneeAngle,
    FrontKnee,
    BackKnee,
    AnklePoint,
    LegSplitAngle,
}

impl LogicalAngle {
    pub const fn key(self) -> &'static str {
        match self {
            Self::BodyVertical => "body_vertical",
            Self::TorsoUpright => "torso_upright",
            Self::ShoulderAngle => "shoulder_angle",
            Self::HipAngle => "hip_angle",
            Self::HipElevation => "hip_elevation",
            Self::KneeAngle => "knee_angle",
            Self::FrontKnee => "front_knee",
            Self::BackKnee => "back_knee",
            Self::AnklePoint => "ankle_point",
            Self::LegSplitAngle => "leg_split_angle",
        }
    }
}

/// Ideal value and tolerance for one tracked angle of a skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyAngle {
    pub angle: LogicalAngle,
    pub ideal: f64,
    pub tolerance: f64,
    pub description: String,
}

/// Reference shape for a skill. Key angles are evaluated in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillTemplate {
    pub name: String,
    pub key_angles: Vec<KeyAngle>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralFormRule {
    pub threshold: f64,
    pub description: String,
}

/// Skill-independent checks. `body_alignment` is carried but not evaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralFormRules {
    pub pointed_toes: GeneralFormRule,
    pub straight_arms: GeneralFormRule,
    pub body_alignment: GeneralFormRule,
    /// Slack granted below the toe-point threshold before a deduction applies.
    #[serde(default = "default_toe_tolerance")]
    pub toe_tolerance: f64,
}

fn default_toe_tolerance() -> f64 {
    10.0
}

/// Degree thresholds for injury flags. `spine_over_arch` and `unstable_landing` are
/// reserved: no measured angle corresponds to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InjuryThresholds {
    pub knee_hyperextension: f64,
    pub elbow_hyperextension: f64,
    pub spine_over_arch: f64,
    pub unstable_landing: f64,
}

/// Excess below `upper` (exclusive) costs `points`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierBand {
    pub upper: f64,
    pub points: f64,
}

/// Maps excess deviation (beyond tolerance) to a severity tier and point value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeductionSchedule {
    pub minor: TierBand,
    pub moderate: TierBand,
    pub major: TierBand,
    pub severe_points: f64,
}

impl DeductionSchedule {
    pub fn severity_for(&self, excess: f64) -> Severity {
        if excess < self.minor.upper {
            Severity::Minor
        } else if excess < self.moderate.upper {
            Severity::Moderate
        } else if excess < self.major.upper {
            Severity::Major
        } else {
            Severity::Severe
        }
    }

    pub fn points(&self, severity: Severity) -> f64 {
        match severity {
            Severity::Minor => self.minor.points,
            Severity::Moderate => self.moderate.points,
            Severity::Major => self.major.points,
            Severity::Severe => self.severe_points,
        }
    }

    /// Zero inside tolerance (inclusive), otherwise the tier value for the excess.
    pub fn deduction(&self, deviation: f64, tolerance: f64) -> f64 {
        if deviation <= tolerance {
            return 0.0;
        }
        self.points(self.severity_for(deviation - tolerance))
    }
}

/// Immutable scoring configuration shared by every analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringTables {
    pub templates: BTreeMap<Skill, SkillTemplate>,
    pub general_form: GeneralFormRules,
    pub injury: InjuryThresholds,
    pub deductions: DeductionSchedule,
}

impl ScoringTables {
    pub fn standard() -> Self {
        Self {
            templates: standard_templates(),
            general_form: GeneralFormRules {
                pointed_toes: GeneralFormRule {
                    threshold: 160.0,
                    description: "Toes should be pointed".to_string(),
                },
                straight_arms: GeneralFormRule {
                    threshold: 170.0,
                    description: "Arms should be straight".to_string(),
                },
                body_alignment: GeneralFormRule {
                    threshold: 15.0,
                    description: "Body segments should be aligned".to_string(),
                },
                toe_tolerance: default_toe_tolerance(),
            },
            injury: InjuryThresholds {
                knee_hyperextension: 185.0,
                elbow_hyperextension: 185.0,
                spine_over_arch: 45.0,
                unstable_landing: 30.0,
            },
            deductions: DeductionSchedule {
                minor: TierBand {
                    upper: 5.0,
                    points: 0.1,
                },
                moderate: TierBand {
                    upper: 15.0,
                    points: 0.3,
                },
                major: TierBand {
                    upper: 30.0,
                    points: 0.5,
                },
                severe_points: 1.0,
            },
        }
    }

    /// Parse and validate a JSON table set.
    pub fn from_json_str(raw: &str) -> Result<Self, TablesError> {
        let tables: ScoringTables = serde_json::from_str(raw)?;
        tables.validate()?;
        Ok(tables)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TablesError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| TablesError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tables = Self::from_json_str(&raw)?;
        info!(path = %path.display(), templates = tables.templates.len(), "loaded scoring tables");
        Ok(tables)
    }

    pub fn template(&self, skill: Skill) -> Option<&SkillTemplate> {
        self.templates.get(&skill)
    }

    pub fn validate(&self) -> Result<(), TablesError> {
        if self.templates.contains_key(&Skill::General) {
            return Err(TablesError::GeneralTemplate);
        }

        for (skill, template) in &self.templates {
            if template.key_angles.is_empty() {
                return Err(TablesError::EmptyTemplate { skill: *skill });
            }

            let mut seen = HashSet::new();
            for key_angle in &template.key_angles {
                if !seen.insert(key_angle.angle) {
                    return Err(TablesError::DuplicateAngle {
                        skill: *skill,
                        angle: key_angle.angle.key(),
                    });
                }
                if !key_angle.ideal.is_finite()
                    || !key_angle.tolerance.is_finite()
                    || key_angle.tolerance < 0.0
                {
                    return Err(TablesError::InvalidKeyAngle {
                        skill: *skill,
                        angle: key_angle.angle.key(),
                    });
                }
            }
        }

        let thresholds = [
            ("pointed_toes", self.general_form.pointed_toes.threshold),
            ("straight_arms", self.general_form.straight_arms.threshold),
            ("body_alignment", self.general_form.body_alignment.threshold),
            ("toe_tolerance", self.general_form.toe_tolerance),
            ("knee_hyperextension", self.injury.knee_hyperextension),
            ("elbow_hyperextension", self.injury.elbow_hyperextension),
            ("spine_over_arch", self.injury.spine_over_arch),
            ("unstable_landing", self.injury.unstable_landing),
        ];
        if let Some((name, _)) = thresholds.iter().find(|(_, value)| !value.is_finite()) {
            return Err(TablesError::InvalidThreshold { name: *name });
        }
        if self.general_form.toe_tolerance < 0.0 {
            return Err(TablesError::NegativeToeTolerance);
        }

        let deductions = &self.deductions;
        let ascending = deductions.minor.upper > 0.0
            && deductions.minor.upper < deductions.moderate.upper
            && deductions.moderate.upper < deductions.major.upper;
        let points = [
            deductions.minor.points,
            deductions.moderate.points,
            deductions.major.points,
            deductions.severe_points,
        ];
        if !ascending || points.iter().any(|value| !value.is_finite() || *value < 0.0) {
            return Err(TablesError::InvalidDeductions);
        }

        Ok(())
    }
}

fn key_angle(angle: LogicalAngle, ideal: f64, tolerance: f64, description: &str) -> KeyAngle {
    KeyAngle {
        angle,
        ideal,
        tolerance,
        description: description.to_string(),
    }
}

fn standard_templates() -> BTreeMap<Skill, SkillTemplate> {
    use LogicalAngle::*;

    let mut templates = BTreeMap::new();
    templates.insert(
        Skill::Handstand,
        SkillTemplate {
            name: "Handstand".to_string(),
            key_angles: vec![
                key_angle(BodyVertical, 180.0, 15.0, "Body should be straight and vertical"),
                key_angle(ShoulderAngle, 180.0, 10.0, "Shoulders fully extended"),
                key_angle(HipAngle, 180.0, 10.0, "Hips fully extended"),
                key_angle(KneeAngle, 180.0, 5.0, "Knees locked"),
            ],
        },
    );
    templates.insert(
        Skill::Split,
        SkillTemplate {
            name: "Split".to_string(),
            key_angles: vec![
                key_angle(LegSplitAngle, 180.0, 15.0, "Legs should form straight line"),
                key_angle(FrontKnee, 180.0, 5.0, "Front knee locked"),
                key_angle(BackKnee, 180.0, 5.0, "Back knee locked"),
                key_angle(TorsoUpright, 90.0, 15.0, "Torso should be upright"),
            ],
        },
    );
    templates.insert(
        Skill::Bridge,
        SkillTemplate {
            name: "Bridge".to_string(),
            key_angles: vec![
                key_angle(ShoulderAngle, 180.0, 20.0, "Shoulders extended"),
                key_angle(HipElevation, 120.0, 20.0, "Hips should be elevated"),
                key_angle(KneeAngle, 90.0, 15.0, "Knees bent at 90 degrees"),
            ],
        },
    );
    templates.insert(
        Skill::Pike,
        SkillTemplate {
            name: "Pike Position".to_string(),
            key_angles: vec![
                key_angle(HipAngle, 45.0, 15.0, "Tight pike at hips"),
                key_angle(KneeAngle, 180.0, 5.0, "Knees locked straight"),
                key_angle(AnklePoint, 160.0, 10.0, "Toes pointed"),
            ],
        },
    );
    templates.insert(
        Skill::Tuck,
        SkillTemplate {
            name: "Tuck Position".to_string(),
            key_angles: vec![
                key_angle(KneeAngle, 45.0, 15.0, "Knees tight to chest"),
                key_angle(HipAngle, 45.0, 15.0, "Tight tuck at hips"),
            ],
        },
    );
    templates
}

/// Raised when a table set cannot be read or is internally inconsistent.
#[derive(Debug, thiserror::Error)]
pub enum TablesError {
    #[error("unable to read scoring tables at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed scoring tables: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("the general skill cannot carry a template")]
    GeneralTemplate,
    #[error("template for {skill:?} declares no key angles")]
    EmptyTemplate { skill: Skill },
    #[error("template for {skill:?} declares {angle} more than once")]
    DuplicateAngle { skill: Skill, angle: &'static str },
    #[error("template for {skill:?} has a non-finite ideal or invalid tolerance for {angle}")]
    InvalidKeyAngle { skill: Skill, angle: &'static str },
    #[error("threshold {name} must be finite")]
    InvalidThreshold { name: &'static str },
    #[error("toe tolerance must not be negative")]
    NegativeToeTolerance,
    #[error("deduction tiers must have increasing bounds and non-negative points")]
    InvalidDeductions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_tables_validate() {
        let tables = ScoringTables::standard();
        tables.validate().expect("standard tables are valid");
        assert_eq!(tables.templates.len(), 5);
        for skill in Skill::ordered() {
            assert!(tables.template(skill).is_some(), "{skill:?} template present");
        }
        assert!(tables.template(Skill::General).is_none());
    }

    #[test]
    fn tier_bounds_are_exclusive() {
        let schedule = ScoringTables::standard().deductions;
        assert_eq!(schedule.severity_for(4.99), Severity::Minor);
        assert_eq!(schedule.severity_for(5.0), Severity::Moderate);
        assert_eq!(schedule.severity_for(15.0), Severity::Major);
        assert_eq!(schedule.severity_for(30.0), Severity::Severe);
        assert_eq!(schedule.deduction(10.0, 10.0), 0.0);
        assert_eq!(schedule.deduction(50.0, 10.0), 1.0);
    }

    #[test]
    fn unknown_logical_angle_fails_at_parse_time() {
        let mut value = serde_json::to_value(ScoringTables::standard()).expect("serialize");
        value["templates"]["pike"]["key_angles"][0]["angle"] =
            serde_json::Value::String("hip_angel".to_string());

        let err = ScoringTables::from_json_str(&value.to_string()).expect_err("typo rejected");
        assert!(matches!(err, TablesError::Parse(_)));
    }

    #[test]
    fn duplicate_key_angles_are_rejected() {
        let mut tables = ScoringTables::standard();
        let template = tables.templates.get_mut(&Skill::Tuck).expect("tuck template");
        let first = template.key_angles[0].clone();
        template.key_angles.push(first);

        match tables.validate() {
            Err(TablesError::DuplicateAngle { skill, angle }) => {
                assert_eq!(skill, Skill::Tuck);
                assert_eq!(angle, "knee_angle");
            }
            other => panic!("expected duplicate angle error, got {other:?}"),
        }
    }

    #[test]
    fn general_skill_cannot_own_a_template() {
        let mut tables = ScoringTables::standard();
        let handstand = tables.templates[&Skill::Handstand].clone();
        tables.templates.insert(Skill::General, handstand);

        assert!(matches!(tables.validate(), Err(TablesError::GeneralTemplate)));
    }

    #[test]
    fn negative_tolerance_and_unordered_tiers_are_rejected() {
        let mut tables = ScoringTables::standard();
        tables
            .templates
            .get_mut(&Skill::Bridge)
            .expect("bridge template")
            .key_angles[1]
            .tolerance = -1.0;
        assert!(matches!(
            tables.validate(),
            Err(TablesError::InvalidKeyAngle { skill: Skill::Bridge, angle: "hip_elevation" })
        ));

        let mut tables = ScoringTables::standard();
        tables.deductions.moderate.upper = 40.0;
        assert!(matches!(tables.validate(), Err(TablesError::InvalidDeductions)));
    }

    #[test]
    fn negative_toe_tolerance_is_rejected() {
        let mut tables = ScoringTables::standard();
        tables.general_form.toe_tolerance = -5.0;
        assert!(matches!(tables.validate(), Err(TablesError::NegativeToeTolerance)));

        tables.general_form.toe_tolerance = 0.0;
        tables.validate().expect("zero toe tolerance is allowed");
    }

    #[test]
    fn toe_tolerance_defaults_when_omitted() {
        let mut value = serde_json::to_value(ScoringTables::standard()).expect("serialize");
        value["general_form"]
            .as_object_mut()
            .expect("general form object")
            .remove("toe_tolerance");

        let tables = ScoringTables::from_json_str(&value.to_string()).expect("tables parse");
        assert_eq!(tables.general_form.toe_tolerance, 10.0);
    }
}
