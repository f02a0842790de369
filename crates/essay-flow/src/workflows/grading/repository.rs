use serde::{Deserialize, Serialize};

use super::domain::{AnnotationSet, Essay, EssayId, EssayStatus};

/// Storage abstraction so the service module can be exercised in isolation.
/// The grading core only ever works on records already loaded in memory.
pub trait EssayRepository: Send + Sync {
    fn insert(&self, essay: Essay) -> Result<Essay, RepositoryError>;
    fn update(&self, essay: Essay) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &EssayId) -> Result<Option<Essay>, RepositoryError>;
    fn by_status(&self, status: EssayStatus) -> Result<Vec<Essay>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("essay not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Lookup seam for persisted correction annotations. Only consulted when a
/// PAS grading payload leaves NE to be auto-counted; failures here never
/// fail a grading request.
pub trait AnnotationStore: Send + Sync {
    fn annotation_set(&self, essay_id: &EssayId)
        -> Result<Option<AnnotationSet>, AnnotationStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AnnotationStoreError {
    #[error("annotation store unavailable: {0}")]
    Unavailable(String),
}

/// Outbound delivery hook for corrected essays (e-mail adapter or similar).
pub trait DeliveryPublisher: Send + Sync {
    fn deliver(&self, delivery: EssayDelivery) -> Result<(), DeliveryError>;
}

/// Payload handed to the delivery collaborator when an essay is sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EssayDelivery {
    pub essay_id: EssayId,
    pub recipient: String,
    pub subject: String,
    pub grade_summary: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("delivery transport unavailable: {0}")]
    Transport(String),
}
