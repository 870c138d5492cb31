//! Conversational helpers around a case: the scripted patient, term lookups and a health check.

pub mod glossary;
pub mod patient;
pub mod status;

pub use glossary::{ExplanationSource, ScenarioMeta, TermExplanation, TermRequest};
pub use patient::{PatientChatRequest, PatientReply};
pub use status::LlmStatus;
