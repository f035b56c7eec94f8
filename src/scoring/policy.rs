use super::domain::Quality;

pub const PERFECT_SCORE: f64 = 10.0;

/// Round to the two decimals scores are reported with.
pub(crate) fn round_points(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Final score and label for a summed deduction. Clamped at zero so a pile of severe
/// deductions never goes negative.
pub fn aggregate(total_deduction: f64) -> (f64, Quality) {
    let score = round_points((PERFECT_SCORE - total_deduction).max(0.0));
    (score, quality_for(score))
}

pub fn quality_for(score: f64) -> Quality {
    if score >= 9.5 {
        Quality::Excellent
    } else if score >= 9.0 {
        Quality::VeryGood
    } else if score >= 8.5 {
        Quality::Good
    } else if score >= 8.0 {
        Quality::Fair
    } else {
        Quality::NeedsImprovement
    }
}
