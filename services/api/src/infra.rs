use essay_flow::workflows::grading::{
    AnnotationSet, AnnotationStore, AnnotationStoreError, DeliveryError, DeliveryPublisher,
    Essay, EssayDelivery, EssayId, EssayRepository, EssayStatus, RepositoryError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryEssayRepository {
    records: Arc<Mutex<HashMap<EssayId, Essay>>>,
}

impl EssayRepository for InMemoryEssayRepository {
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
        if guard.contains_key(&essay.essay_id) {
            guard.insert(essay.essay_id.clone(), essay);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
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
pub(crate) struct InMemoryAnnotationStore {
    sets: Arc<Mutex<HashMap<EssayId, AnnotationSet>>>,
}

impl InMemoryAnnotationStore {
    pub(crate) fn put(&self, set: AnnotationSet) {
        let mut guard = self.sets.lock().expect("annotation mutex poisoned");
        guard.insert(set.essay_id.clone(), set);
    }
}

impl AnnotationStore for InMemoryAnnotationStore {
    fn annotation_set(
        &self,
        essay_id: &EssayId,
    ) -> Result<Option<AnnotationSet>, AnnotationStoreError> {
        let guard = self.sets.lock().expect("annotation mutex poisoned");
        Ok(guard.get(essay_id).cloned())
    }
}

/// Stand-in for the outbound mailer: logs the delivery instead of sending.
#[derive(Default, Clone)]
pub(crate) struct LoggingDeliveryPublisher {
    deliveries: Arc<Mutex<Vec<EssayDelivery>>>,
}

impl LoggingDeliveryPublisher {
    pub(crate) fn deliveries(&self) -> Vec<EssayDelivery> {
        self.deliveries.lock().expect("delivery mutex poisoned").clone()
    }
}

impl DeliveryPublisher for LoggingDeliveryPublisher {
    fn deliver(&self, delivery: EssayDelivery) -> Result<(), DeliveryError> {
        info!(
            essay_id = %delivery.essay_id.0,
            recipient = %delivery.recipient,
            subject = %delivery.subject,
            "dispatching corrected essay"
        );
        let mut guard = self.deliveries.lock().expect("delivery mutex poisoned");
        guard.push(delivery);
        Ok(())
    }
}
