use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use super::domain::{Essay, EssayId, EssayStatus, EssaySubmission, GradingPayload};
use super::repository::{
    AnnotationStore, DeliveryError, DeliveryPublisher, EssayDelivery, EssayRepository,
    RepositoryError,
};
use super::scoring::{ScoringConfig, ScoringEngine, ScoringError};
use super::status::{self, StatusError};

/// Facade composing the repository, annotation store, delivery publisher,
/// and scoring engine. Nothing here serializes concurrent grading of the
/// same essay; callers needing at-most-one-grading-per-essay must do so at
/// the request-handling layer.
pub struct EssayGradingService<R, N, D> {
    repository: Arc<R>,
    annotations: Arc<N>,
    delivery: Arc<D>,
    engine: ScoringEngine,
}

static ESSAY_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_essay_id() -> EssayId {
    let id = ESSAY_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    EssayId(format!("essay-{id:06}"))
}

impl<R, N, D> EssayGradingService<R, N, D>
where
    R: EssayRepository + 'static,
    N: AnnotationStore + 'static,
    D: DeliveryPublisher + 'static,
{
    pub fn new(
        repository: Arc<R>,
        annotations: Arc<N>,
        delivery: Arc<D>,
        config: ScoringConfig,
    ) -> Self {
        Self {
            repository,
            annotations,
            delivery,
            engine: ScoringEngine::new(config),
        }
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Register a freshly uploaded essay in `PENDING`.
    pub fn submit(&self, submission: EssaySubmission) -> Result<Essay, GradingServiceError> {
        let now = Utc::now();
        let essay = Essay {
            essay_id: next_essay_id(),
            student_name: submission.student_name,
            student_email: submission.student_email,
            theme: submission.theme,
            system: submission.system,
            status: EssayStatus::Pending,
            bimester: submission.bimester,
            count_in_bimester: submission.count_in_bimester,
            annulment: Default::default(),
            score: None,
            bimester_score: None,
            general_comments: None,
            created_at: now,
            updated_at: now,
            email_last_sent_at: None,
        };

        let stored = self.repository.insert(essay)?;
        Ok(stored)
    }

    pub fn get(&self, essay_id: &EssayId) -> Result<Essay, GradingServiceError> {
        let essay = self
            .repository
            .fetch(essay_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(essay)
    }

    /// Save a correction draft. The first touch by a grader moves the essay
    /// from `PENDING` to `GRADING`; later saves are self-transitions.
    pub fn begin_correction(
        &self,
        essay_id: &EssayId,
        general_comments: Option<String>,
    ) -> Result<Essay, GradingServiceError> {
        let mut essay = self.get(essay_id)?;

        if essay.status == EssayStatus::Pending {
            status::assert_transition(&mut essay, EssayStatus::Grading)?;
        }
        if let Some(comments) = general_comments {
            essay.general_comments = Some(comments);
        }
        essay.updated_at = Utc::now();

        self.repository.update(essay.clone())?;
        Ok(essay)
    }

    /// Grade an essay: validate the payload against the essay's rubric
    /// system, apply scoring, recompute the bimester contribution, and move
    /// the record to `GRADED`. Nothing is persisted on failure.
    pub fn grade(
        &self,
        essay_id: &EssayId,
        payload: GradingPayload,
    ) -> Result<Essay, GradingServiceError> {
        let mut essay = self.get(essay_id)?;

        if payload.system() != essay.system {
            return Err(ScoringError::InvalidScoreValue {
                field: "type",
                value: payload.system().label().to_string(),
            }
            .into());
        }

        if essay.status == EssayStatus::Pending {
            status::assert_transition(&mut essay, EssayStatus::Grading)?;
        }

        let annotations = if payload.wants_annotations() {
            match self.annotations.annotation_set(essay_id) {
                Ok(set) => set,
                Err(err) => {
                    warn!(essay_id = %essay_id.0, %err, "annotation lookup failed, counting zero errors");
                    None
                }
            }
        } else {
            None
        };

        self.engine
            .apply_scoring(&mut essay, &payload, annotations.as_ref())?;
        self.engine.compute_bimester_score(&mut essay);
        status::assert_transition(&mut essay, EssayStatus::Graded)?;
        essay.updated_at = Utc::now();

        self.repository.update(essay.clone())?;
        Ok(essay)
    }

    /// Deliver the corrected essay to the student and mark it `SENT`.
    /// Resending an already sent essay is a legal self-transition and
    /// publishes again.
    pub fn send(&self, essay_id: &EssayId) -> Result<Essay, GradingServiceError> {
        let mut essay = self.get(essay_id)?;

        status::assert_transition(&mut essay, EssayStatus::Sent)?;

        self.delivery.deliver(EssayDelivery {
            essay_id: essay.essay_id.clone(),
            recipient: essay.student_email.clone(),
            subject: format!("Corrected essay - {}", essay.theme),
            grade_summary: essay.grade_summary(),
        })?;

        let now = Utc::now();
        essay.email_last_sent_at = Some(now);
        essay.updated_at = now;

        self.repository.update(essay.clone())?;
        Ok(essay)
    }

    /// Explicit status transition, driven by a raw target label from the
    /// API. Absent targets are missing arguments, unknown labels invalid
    /// transitions.
    pub fn transition(
        &self,
        essay_id: &EssayId,
        target: Option<&str>,
    ) -> Result<Essay, GradingServiceError> {
        let mut essay = self.get(essay_id)?;

        let to = status::resolve_target(essay.status, target)?;
        status::assert_transition(&mut essay, to)?;
        essay.updated_at = Utc::now();

        self.repository.update(essay.clone())?;
        Ok(essay)
    }
}

/// Error raised by the grading service.
#[derive(Debug, thiserror::Error)]
pub enum GradingServiceError {
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Status(#[from] StatusError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}
