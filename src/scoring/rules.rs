use tracing::trace;

use super::domain::{
    AngleMap, BodyAngle, FormError, FormWarning, InjuryRisk, InjuryRiskKind, Joint, RiskLevel,
    Severity,
};
use super::tables::{LogicalAngle, ScoringTables, SkillTemplate};
use super::Evaluation;

/// Resolve a template angle against the measured pose. `None` means "not measurable",
/// which skips the check rather than penalizing it.
pub(crate) fn measure(angle: LogicalAngle, angles: &AngleMap) -> Option<f64> {
    match angle {
        LogicalAngle::BodyVertical | LogicalAngle::TorsoUpright => {
            angles.get(BodyAngle::TorsoVertical)
        }
        LogicalAngle::ShoulderAngle => angles.bilateral_mean(Joint::Shoulder),
        LogicalAngle::HipAngle | LogicalAngle::HipElevation => angles.bilateral_mean(Joint::Hip),
        LogicalAngle::KneeAngle => angles.bilateral_mean(Joint::Knee),
        LogicalAngle::FrontKnee => angles.first_of(BodyAngle::LeftKnee, BodyAngle::RightKnee),
        LogicalAngle::BackKnee => angles.first_of(BodyAngle::RightKnee, BodyAngle::LeftKnee),
        LogicalAngle::AnklePoint => angles.bilateral_mean(Joint::Ankle),
        LogicalAngle::LegSplitAngle => {
            let left = angles.get(BodyAngle::LeftHip)?;
            let right = angles.get(BodyAngle::RightHip)?;
            Some((left - right).abs() + left.min(right))
        }
    }
}

pub(crate) fn evaluate(
    angles: &AngleMap,
    template: Option<&SkillTemplate>,
    tables: &ScoringTables,
) -> Evaluation {
    let mut evaluation = Evaluation::default();

    if let Some(template) = template {
        score_template(angles, template, tables, &mut evaluation);
    }
    check_general_form(angles, tables, &mut evaluation);
    evaluation.injury_risks = check_injury_risks(angles, tables);

    evaluation
}

fn score_template(
    angles: &AngleMap,
    template: &SkillTemplate,
    tables: &ScoringTables,
    evaluation: &mut Evaluation,
) {
    for requirement in &template.key_angles {
        let Some(measured) = measure(requirement.angle, angles) else {
            trace!(angle = requirement.angle.key(), "angle not measurable, skipped");
            continue;
        };

        let deviation = (measured - requirement.ideal).abs();
        let deduction = tables
            .deductions
            .deduction(deviation, requirement.tolerance);
        trace!(
            angle = requirement.angle.key(),
            measured,
            deviation,
            deduction,
            "template angle evaluated"
        );

        if deviation > requirement.tolerance {
            let severity = tables
                .deductions
                .severity_for(deviation - requirement.tolerance);
            evaluation.errors.push(FormError {
                angle: requirement.angle.key().to_string(),
                ideal: Some(requirement.ideal),
                measured,
                deviation: Some(deviation),
                deduction,
                severity,
                description: requirement.description.clone(),
            });
        } else if deviation > requirement.tolerance / 2.0 {
            evaluation.warnings.push(FormWarning {
                angle: requirement.angle.key().to_string(),
                ideal: Some(requirement.ideal),
                measured,
                deviation: Some(deviation),
                description: requirement.description.clone(),
            });
        }

        evaluation.total_deduction += deduction;
    }
}

fn check_general_form(angles: &AngleMap, tables: &ScoringTables, evaluation: &mut Evaluation) {
    let rules = &tables.general_form;

    let toes = [
        (BodyAngle::LeftAnkle, "left_toes", "Left toes not pointed"),
        (BodyAngle::RightAnkle, "right_toes", "Right toes not pointed"),
    ];
    for (ankle, label, description) in toes {
        let Some(measured) = angles.get(ankle) else {
            continue;
        };
        if measured >= rules.pointed_toes.threshold {
            continue;
        }

        let shortfall = rules.pointed_toes.threshold - measured;
        let deduction = tables.deductions.deduction(shortfall, rules.toe_tolerance);
        evaluation.total_deduction += deduction;
        evaluation.errors.push(FormError {
            angle: label.to_string(),
            ideal: None,
            measured,
            deviation: None,
            deduction,
            severity: Severity::Minor,
            description: description.to_string(),
        });
    }

    let arms = [
        (BodyAngle::LeftElbow, "Left arm slightly bent"),
        (BodyAngle::RightElbow, "Right arm slightly bent"),
    ];
    for (elbow, description) in arms {
        match angles.get(elbow) {
            Some(measured) if measured < rules.straight_arms.threshold => {
                evaluation.warnings.push(FormWarning {
                    angle: elbow.key().to_string(),
                    ideal: None,
                    measured,
                    deviation: None,
                    description: description.to_string(),
                });
            }
            _ => {}
        }
    }
}

const KNEE_RECOMMENDATION: &str = "Engage quadriceps, avoid locking knee";
const ELBOW_RECOMMENDATION: &str = "Maintain slight bend in elbow, engage triceps";

/// Hyperextension flags. These never change the score.
fn check_injury_risks(angles: &AngleMap, tables: &ScoringTables) -> Vec<InjuryRisk> {
    let mut risks = Vec::new();

    for knee in [Joint::Knee.left(), Joint::Knee.right()] {
        if let Some(measured) = angles.get(knee) {
            if measured > tables.injury.knee_hyperextension {
                risks.push(InjuryRisk {
                    kind: InjuryRiskKind::KneeHyperextension,
                    location: knee,
                    severity: RiskLevel::High,
                    description: format!(
                        "{} hyperextension detected - risk of ligament injury",
                        knee.label()
                    ),
                    recommendation: KNEE_RECOMMENDATION.to_string(),
                });
            }
        }
    }

    for elbow in [Joint::Elbow.left(), Joint::Elbow.right()] {
        if let Some(measured) = angles.get(elbow) {
            if measured > tables.injury.elbow_hyperextension {
                risks.push(InjuryRisk {
                    kind: InjuryRiskKind::ElbowHyperextension,
                    location: elbow,
                    severity: RiskLevel::Medium,
                    description: format!("{} hyperextension detected", elbow.label()),
                    recommendation: ELBOW_RECOMMENDATION.to_string(),
                });
            }
        }
    }

    risks
}
