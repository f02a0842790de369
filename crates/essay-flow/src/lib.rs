//! Grading core for a school essay platform.
//!
//! The interesting pieces live under [`workflows::grading`]: the scoring
//! engine that turns ENEM competency bands or PAS rubric counts into raw and
//! bimester scores, and the status machine that governs the essay lifecycle
//! from `PENDING` to `SENT`. Persistence, annotation lookup, and email
//! delivery are trait seams so the service facade can be exercised entirely
//! in memory.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
