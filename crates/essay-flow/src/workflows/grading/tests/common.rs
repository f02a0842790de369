use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::workflows::grading::domain::{
    AnnotationSet, Essay, EssayId, EssayStatus, EssaySubmission, GradingPayload, Highlight,
    HighlightCategory, RubricSystem,
};
use crate::workflows::grading::repository::{
    AnnotationStore, AnnotationStoreError, DeliveryError, DeliveryPublisher, EssayDelivery,
    EssayRepository, RepositoryError,
};
use crate::workflows::grading::scoring::{ScoringConfig, ScoringEngine};
use crate::workflows::grading::service::EssayGradingService;

pub(super) fn essay(system: RubricSystem) -> Essay {
    let now = Utc::now();
    Essay {
        essay_id: EssayId("essay-test".to_string()),
        student_name: "Ana Souza".to_string(),
        student_email: "ana.souza@example.com".to_string(),
        theme: "Urban mobility".to_string(),
        system,
        status: EssayStatus::Pending,
        bimester: 1,
        count_in_bimester: true,
        annulment: Default::default(),
        score: None,
        bimester_score: None,
        general_comments: None,
        created_at: now,
        updated_at: now,
        email_last_sent_at: None,
    }
}

pub(super) fn submission(system: RubricSystem) -> EssaySubmission {
    EssaySubmission {
        student_name: "Ana Souza".to_string(),
        student_email: "ana.souza@example.com".to_string(),
        theme: "Urban mobility".to_string(),
        system,
        bimester: 1,
        count_in_bimester: true,
    }
}

pub(super) fn enem_payload(competencies: [u16; 5]) -> GradingPayload {
    let [c1, c2, c3, c4, c5] = competencies;
    GradingPayload::Enem {
        c1,
        c2,
        c3,
        c4,
        c5,
        annulment: None,
    }
}

pub(super) fn pas_payload(nc: f64, ne: Option<f64>, nl: f64) -> GradingPayload {
    GradingPayload::Pas {
        nc,
        ne,
        nl,
        annulment: None,
    }
}

pub(super) fn annotation_set(essay_id: &EssayId, grammar: usize, other: usize) -> AnnotationSet {
    let mut highlights = Vec::new();
    for _ in 0..grammar {
        highlights.push(Highlight {
            page: 1,
            category: HighlightCategory::Grammar,
            comment: "agreement".to_string(),
        });
    }
    for _ in 0..other {
        highlights.push(Highlight {
            page: 1,
            category: HighlightCategory::Cohesion,
            comment: "paragraph link".to_string(),
        });
    }
    AnnotationSet {
        essay_id: essay_id.clone(),
        highlights,
    }
}

pub(super) fn engine() -> ScoringEngine {
    ScoringEngine::new(ScoringConfig::default())
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<EssayId, Essay>>>,
}

impl EssayRepository for MemoryRepository {
    fn insert(&self, essay: Essay) -> Result<Essay, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&essay.essay_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(essay.essay_id.clone(), essay.clone());
        Ok(essay)
    }

    fn update(&self, essay: Essay) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(essay.essay_id.clone(), essay);
        Ok(())
    }

    fn fetch(&self, id: &EssayId) -> Result<Option<Essay>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn by_status(&self, status: EssayStatus) -> Result<Vec<Essay>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|essay| essay.status == status)
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryAnnotations {
    sets: Arc<Mutex<HashMap<EssayId, AnnotationSet>>>,
}

impl MemoryAnnotations {
    pub(super) fn put(&self, set: AnnotationSet) {
        self.sets
            .lock()
            .expect("annotation mutex poisoned")
            .insert(set.essay_id.clone(), set);
    }
}

impl AnnotationStore for MemoryAnnotations {
    fn annotation_set(
        &self,
        essay_id: &EssayId,
    ) -> Result<Option<AnnotationSet>, AnnotationStoreError> {
        let guard = self.sets.lock().expect("annotation mutex poisoned");
        Ok(guard.get(essay_id).cloned())
    }
}

pub(super) struct UnavailableAnnotations;

impl AnnotationStore for UnavailableAnnotations {
    fn annotation_set(
        &self,
        _essay_id: &EssayId,
    ) -> Result<Option<AnnotationSet>, AnnotationStoreError> {
        Err(AnnotationStoreError::Unavailable("store offline".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryDelivery {
    events: Arc<Mutex<Vec<EssayDelivery>>>,
}

impl MemoryDelivery {
    pub(super) fn events(&self) -> Vec<EssayDelivery> {
        self.events.lock().expect("delivery mutex poisoned").clone()
    }
}

impl DeliveryPublisher for MemoryDelivery {
    fn deliver(&self, delivery: EssayDelivery) -> Result<(), DeliveryError> {
        self.events
            .lock()
            .expect("delivery mutex poisoned")
            .push(delivery);
        Ok(())
    }
}

pub(super) type TestService = EssayGradingService<MemoryRepository, MemoryAnnotations, MemoryDelivery>;

pub(super) fn build_service() -> (
    TestService,
    Arc<MemoryRepository>,
    Arc<MemoryAnnotations>,
    Arc<MemoryDelivery>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let annotations = Arc::new(MemoryAnnotations::default());
    let delivery = Arc::new(MemoryDelivery::default());
    let service = EssayGradingService::new(
        repository.clone(),
        annotations.clone(),
        delivery.clone(),
        ScoringConfig::default(),
    );
    (service, repository, annotations, delivery)
}
