//! Gymnastics form scoring.
//!
//! Measured joint angles go in, a bounded 0-10 score with per-angle deductions,
//! warnings, and injury-risk flags comes out. See [`scoring::FormScorer`].

pub mod config;
pub mod error;
pub mod pose;
pub mod scoring;
pub mod telemetry;

pub use error::AppError;
pub use scoring::{AnalysisResult, AngleMap, FormScorer, Skill};
