//! Essay grading workflow: rubric scoring, status lifecycle, and the
//! service facade and HTTP router that tie them to the collaborator seams
//! (persistence, annotation store, delivery).

pub mod domain;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod status;

#[cfg(test)]
mod tests;

pub use domain::{
    AnnotationSet, Annulment, EnemScore, Essay, EssayId, EssayStatus, EssayStatusView,
    EssaySubmission, GradingPayload, Highlight, HighlightCategory, PasScore, RubricSystem,
    ScoreSheet,
};
pub use repository::{
    AnnotationStore, AnnotationStoreError, DeliveryError, DeliveryPublisher, EssayDelivery,
    EssayRepository, RepositoryError,
};
pub use router::grading_router;
pub use scoring::{ScoringConfig, ScoringEngine, ScoringError};
pub use service::{EssayGradingService, GradingServiceError};
pub use status::{assert_transition, can_transition, StatusError};
