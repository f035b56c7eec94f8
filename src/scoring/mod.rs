//! Form scoring: skill classification, template evaluation, and score aggregation.

mod classifier;
pub mod domain;
mod policy;
mod rules;
pub mod tables;

#[cfg(test)]
mod tests;

pub use domain::{
    AnalysisResult, AngleMap, BodyAngle, FormError, FormWarning, InjuryRisk, InjuryRiskKind,
    Joint, Quality, RiskLevel, Severity, Skill,
};
pub use policy::{aggregate, quality_for, PERFECT_SCORE};
pub use tables::{
    DeductionSchedule, GeneralFormRule, GeneralFormRules, InjuryThresholds, KeyAngle,
    LogicalAngle, ScoringTables, SkillTemplate, TablesError, TierBand,
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::AppConfig;

/// Stateless scorer that applies the scoring tables to a pose.
#[derive(Debug, Clone)]
pub struct FormScorer {
    tables: ScoringTables,
}

impl FormScorer {
    /// Tables are taken as given; use [`FormScorer::try_new`] for hand-built sets.
    pub fn new(tables: ScoringTables) -> Self {
        Self { tables }
    }

    pub fn try_new(tables: ScoringTables) -> Result<Self, TablesError> {
        tables.validate()?;
        Ok(Self::new(tables))
    }

    pub fn standard() -> Self {
        Self::new(ScoringTables::standard())
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, TablesError> {
        let scorer = Self::new(config.scoring_tables()?);
        info!(
            ?config.environment,
            templates = scorer.tables.templates.len(),
            custom_tables = config.scoring.tables_path.is_some(),
            "form scorer ready"
        );
        Ok(scorer)
    }

    pub fn tables(&self) -> &ScoringTables {
        &self.tables
    }

    pub fn classify(&self, angles: &AngleMap) -> Option<Skill> {
        classifier::classify(angles)
    }

    /// Deductions, warnings, and injury risks for `skill`. A skill without a template
    /// only gets the general-form and injury checks.
    pub fn evaluate(&self, angles: &AngleMap, skill: Skill) -> Evaluation {
        rules::evaluate(angles, self.tables.template(skill), &self.tables)
    }

    /// Score a pose. An explicit skill name is matched case-insensitively and unknown
    /// names fall back to `general`; with no name the skill is classified from the pose.
    pub fn analyze(&self, angles: &AngleMap, skill: Option<&str>) -> AnalysisResult {
        if !self.has_pose(angles) {
            return AnalysisResult::undetected(angles);
        }

        let skill = match skill {
            Some(name) => Skill::from_name(name).unwrap_or_else(|| {
                debug!(requested = name, "unknown skill, using general form checks");
                Skill::General
            }),
            None => self.classify(angles).unwrap_or(Skill::General),
        };

        self.score_pose(angles, skill)
    }

    pub fn analyze_skill(&self, angles: &AngleMap, skill: Skill) -> AnalysisResult {
        if !self.has_pose(angles) {
            return AnalysisResult::undetected(angles);
        }
        self.score_pose(angles, skill)
    }

    fn score_pose(&self, angles: &AngleMap, skill: Skill) -> AnalysisResult {
        let template = self.tables.template(skill);
        let skill = if template.is_some() {
            skill
        } else {
            Skill::General
        };

        let evaluation = rules::evaluate(angles, template, &self.tables);
        let (score, overall_quality) = aggregate(evaluation.total_deduction);
        debug!(
            skill = skill.key(),
            score,
            errors = evaluation.errors.len(),
            warnings = evaluation.warnings.len(),
            risks = evaluation.injury_risks.len(),
            "pose analyzed"
        );

        AnalysisResult {
            skill,
            skill_name: template.map(|template| template.name.clone()),
            score,
            total_deduction: policy::round_points(evaluation.total_deduction),
            errors: evaluation.errors,
            warnings: evaluation.warnings,
            injury_risks: evaluation.injury_risks,
            overall_quality,
            detected_angles: angles.finite(),
        }
    }

    fn has_pose(&self, angles: &AngleMap) -> bool {
        let ignored = angles.non_finite_names();
        if !ignored.is_empty() {
            warn!(angles = ?ignored, "ignoring non-finite angle readings");
        }
        angles.has_measurements()
    }
}

/// Raw evaluator output before aggregation, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub errors: Vec<FormError>,
    pub warnings: Vec<FormWarning>,
    pub injury_risks: Vec<InjuryRisk>,
    pub total_deduction: f64,
}
