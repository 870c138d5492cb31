//! Debrief pipeline: the student's recorded session goes in, instructor feedback with a
//! deterministic score comes out. The router here also exposes the catalogs, scenarios and
//! tutor endpoints backed by the same service.

pub mod domain;
mod prompt;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Allergy, AssessmentRequest, ChatTurn, Disposition, Hpi, MedicalBackground, Plan,
    ProblemRepresentation, RankMove, ReasoningUpdate, SocialHistory, Speaker, StabilityStatus,
};
pub use router::assessment_router;
pub use service::{merge_scores, AssessmentError, AssessmentService};
