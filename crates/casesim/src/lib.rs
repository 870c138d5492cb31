//! Scoring, resolution and tutoring engine for a fictional clinical case simulator.

pub mod catalog;
pub mod config;
pub mod error;
pub mod llm;
pub mod scenario;
pub mod telemetry;
pub mod workflows;
