mod common {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use essay_flow::workflows::grading::{
        AnnotationSet, AnnotationStore, AnnotationStoreError, DeliveryError, DeliveryPublisher,
        Essay, EssayDelivery, EssayGradingService, EssayId, EssayRepository, EssayStatus,
        EssaySubmission, Highlight, HighlightCategory, RepositoryError, RubricSystem,
        ScoringConfig,
    };

    pub(super) fn submission(system: RubricSystem) -> EssaySubmission {
        EssaySubmission {
            student_name: "Bruno Lima".to_string(),
            student_email: "bruno.lima@example.com".to_string(),
            theme: "Science literacy".to_string(),
            system,
            bimester: 2,
            count_in_bimester: true,
        }
    }

    pub(super) fn grammar_set(essay_id: &EssayId, grammar: usize, other: usize) -> AnnotationSet {
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
                page: 2,
                category: HighlightCategory::Argumentation,
                comment: "unsupported claim".to_string(),
            });
        }
        AnnotationSet {
            essay_id: essay_id.clone(),
            highlights,
        }
    }

    #[derive(Default, Clone)]
    pub(super) struct MemoryRepository {
        records: Arc<Mutex<HashMap<EssayId, Essay>>>,
    }

    impl EssayRepository for MemoryRepository {
        fn insert(&self, essay: Essay) -> Result<Essay, RepositoryError> {
            let mut guard = self.records.lock().expect("lock");
            if guard.contains_key(&essay.essay_id) {
                return Err(RepositoryError::Conflict);
            }
            guard.insert(essay.essay_id.clone(), essay.clone());
            Ok(essay)
        }

        fn update(&self, essay: Essay) -> Result<(), RepositoryError> {
            let mut guard = self.records.lock().expect("lock");
            guard.insert(essay.essay_id.clone(), essay);
            Ok(())
        }

        fn fetch(&self, id: &EssayId) -> Result<Option<Essay>, RepositoryError> {
            let guard = self.records.lock().expect("lock");
            Ok(guard.get(id).cloned())
        }

        fn by_status(&self, status: EssayStatus) -> Result<Vec<Essay>, RepositoryError> {
            let guard = self.records.lock().expect("lock");
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
                .expect("lock")
                .insert(set.essay_id.clone(), set);
        }
    }

    impl AnnotationStore for MemoryAnnotations {
        fn annotation_set(
            &self,
            essay_id: &EssayId,
        ) -> Result<Option<AnnotationSet>, AnnotationStoreError> {
            let guard = self.sets.lock().expect("lock");
            Ok(guard.get(essay_id).cloned())
        }
    }

    #[derive(Default, Clone)]
    pub(super) struct MemoryDelivery {
        events: Arc<Mutex<Vec<EssayDelivery>>>,
    }

    impl MemoryDelivery {
        pub(super) fn events(&self) -> Vec<EssayDelivery> {
            self.events.lock().expect("lock").clone()
        }
    }

    impl DeliveryPublisher for MemoryDelivery {
        fn deliver(&self, delivery: EssayDelivery) -> Result<(), DeliveryError> {
            self.events.lock().expect("lock").push(delivery);
            Ok(())
        }
    }

    pub(super) fn build_service() -> (
        EssayGradingService<MemoryRepository, MemoryAnnotations, MemoryDelivery>,
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
}

mod lifecycle {
    use super::common::*;
    use essay_flow::workflows::grading::{
        EssayRepository, EssayStatus, GradingPayload, GradingServiceError, RubricSystem, ScoreSheet, StatusError,
    };

    #[test]
    fn essay_moves_pending_grading_graded_sent() {
        let (service, repository, _, delivery) = build_service();

        let essay = service
            .submit(submission(RubricSystem::Enem))
            .expect("upload registers");
        assert_eq!(essay.status, EssayStatus::Pending);

        let essay = service
            .begin_correction(&essay.essay_id, Some("first pass".to_string()))
            .expect("draft saves");
        assert_eq!(essay.status, EssayStatus::Grading);

        let essay = service
            .grade(
                &essay.essay_id,
                GradingPayload::Enem {
                    c1: 200,
                    c2: 160,
                    c3: 160,
                    c4: 120,
                    c5: 160,
                    annulment: None,
                },
            )
            .expect("grading succeeds");
        assert_eq!(essay.status, EssayStatus::Graded);
        assert_eq!(essay.bimester_score, Some(8.0));

        let essay = service.send(&essay.essay_id).expect("delivery succeeds");
        assert_eq!(essay.status, EssayStatus::Sent);

        let stored = repository
            .fetch(&essay.essay_id)
            .expect("fetch")
            .expect("present");
        assert_eq!(stored.status, EssayStatus::Sent);
        assert_eq!(delivery.events().len(), 1);
        assert_eq!(delivery.events()[0].recipient, "bruno.lima@example.com");
    }

    #[test]
    fn regrading_a_graded_essay_recomputes_from_scratch() {
        let (service, _, _, _) = build_service();
        let essay = service
            .submit(submission(RubricSystem::Enem))
            .expect("upload registers");

        service
            .grade(
                &essay.essay_id,
                GradingPayload::Enem {
                    c1: 120,
                    c2: 120,
                    c3: 120,
                    c4: 120,
                    c5: 120,
                    annulment: None,
                },
            )
            .expect("first grading");

        // Edits before finalization replace the whole sheet.
        let regraded = service
            .grade(
                &essay.essay_id,
                GradingPayload::Enem {
                    c1: 200,
                    c2: 200,
                    c3: 200,
                    c4: 200,
                    c5: 200,
                    annulment: None,
                },
            )
            .expect("second grading");

        match regraded.score {
            Some(ScoreSheet::Enem(enem)) => assert_eq!(enem.raw_score, 1000),
            other => panic!("expected ENEM sheet, got {other:?}"),
        }
        assert_eq!(regraded.bimester_score, Some(10.0));
        assert_eq!(regraded.status, EssayStatus::Graded);
    }

    #[test]
    fn sent_essays_cannot_move_backwards() {
        let (service, _, _, _) = build_service();
        let essay = service
            .submit(submission(RubricSystem::Enem))
            .expect("upload registers");
        service
            .grade(
                &essay.essay_id,
                GradingPayload::Enem {
                    c1: 160,
                    c2: 160,
                    c3: 160,
                    c4: 160,
                    c5: 160,
                    annulment: None,
                },
            )
            .expect("grading");
        service.send(&essay.essay_id).expect("send");

        let err = service
            .transition(&essay.essay_id, Some("GRADING"))
            .expect_err("SENT is terminal");

        assert!(matches!(
            err,
            GradingServiceError::Status(StatusError::InvalidTransition { .. })
        ));
    }
}

mod annulment {
    use super::common::*;
    use essay_flow::workflows::grading::{
        Annulment, EssayRepository, EssayStatus, GradingPayload, RubricSystem, ScoreSheet,
    };

    #[test]
    fn annulled_essay_keeps_competencies_but_contributes_zero() {
        let (service, repository, _, delivery) = build_service();
        let essay = service
            .submit(submission(RubricSystem::Enem))
            .expect("upload registers");

        let graded = service
            .grade(
                &essay.essay_id,
                GradingPayload::Enem {
                    c1: 200,
                    c2: 160,
                    c3: 160,
                    c4: 120,
                    c5: 160,
                    annulment: Some(Annulment {
                        active: true,
                        reasons: vec!["copied from source text".to_string()],
                    }),
                },
            )
            .expect("annulled grading applies");

        assert_eq!(graded.status, EssayStatus::Graded);
        assert!(graded.annulment.active);
        assert_eq!(graded.bimester_score, Some(0.0));
        match graded.score {
            Some(ScoreSheet::Enem(enem)) => {
                assert_eq!(enem.raw_score, 0);
                assert_eq!(enem.c1, 200);
            }
            other => panic!("expected ENEM sheet, got {other:?}"),
        }

        let sent = service.send(&essay.essay_id).expect("delivery succeeds");
        assert_eq!(sent.status, EssayStatus::Sent);
        assert!(delivery.events()[0].grade_summary.contains("annulled"));

        let stored = repository
            .fetch(&essay.essay_id)
            .expect("fetch")
            .expect("present");
        assert!(stored.annulment.active);
    }

    #[test]
    fn lifting_an_annulment_restores_the_computed_score() {
        let (service, _, _, _) = build_service();
        let essay = service
            .submit(submission(RubricSystem::Pas))
            .expect("upload registers");

        service
            .grade(
                &essay.essay_id,
                GradingPayload::Pas {
                    nc: 10.0,
                    ne: Some(2.0),
                    nl: 20.0,
                    annulment: Some(Annulment {
                        active: true,
                        reasons: vec!["signature on page".to_string()],
                    }),
                },
            )
            .expect("annulled grading");

        let regraded = service
            .grade(
                &essay.essay_id,
                GradingPayload::Pas {
                    nc: 10.0,
                    ne: Some(2.0),
                    nl: 20.0,
                    annulment: Some(Annulment::default()),
                },
            )
            .expect("annulment lifted");

        assert!(!regraded.annulment.active);
        match regraded.score {
            Some(ScoreSheet::Pas(pas)) => assert_eq!(pas.raw_score, 9.8),
            other => panic!("expected PAS sheet, got {other:?}"),
        }
        assert_eq!(regraded.bimester_score, Some(9.8));
    }
}

mod auto_count {
    use super::common::*;
    use essay_flow::workflows::grading::{GradingPayload, RubricSystem, ScoreSheet};

    #[test]
    fn pas_grading_counts_grammar_highlights_when_ne_is_omitted() {
        let (service, _, annotations, _) = build_service();
        let essay = service
            .submit(submission(RubricSystem::Pas))
            .expect("upload registers");
        annotations.put(grammar_set(&essay.essay_id, 2, 4));

        let graded = service
            .grade(
                &essay.essay_id,
                GradingPayload::Pas {
                    nc: 10.0,
                    ne: None,
                    nl: 10.0,
                    annulment: None,
                },
            )
            .expect("grading succeeds");

        match graded.score {
            Some(ScoreSheet::Pas(pas)) => {
                assert_eq!(pas.ne, 2.0, "only grammar highlights count");
                assert_eq!(pas.raw_score, 9.6);
            }
            other => panic!("expected PAS sheet, got {other:?}"),
        }
    }
}

mod routing {
    use super::common::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use essay_flow::workflows::grading::{grading_router, RubricSystem};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    #[tokio::test]
    async fn full_http_round_trip() {
        let (service, _, _, _) = build_service();
        let service = Arc::new(service);
        let router = grading_router(service.clone());

        let response = router
            .clone()
            .oneshot(
                Request::post("/api/v1/essays")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        serde_json::to_vec(&submission(RubricSystem::Enem)).expect("serialize"),
                    ))
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        let essay_id = payload
            .get("essay_id")
            .and_then(Value::as_str)
            .expect("essay id")
            .to_string();

        let response = router
            .clone()
            .oneshot(
                Request::put(format!("/api/v1/essays/{essay_id}/grade"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({
                            "type": "ENEM",
                            "c1": 200, "c2": 160, "c3": 160, "c4": 120, "c5": 160
                        })
                        .to_string(),
                    ))
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .clone()
            .oneshot(
                Request::post(format!("/api/v1/essays/{essay_id}/send"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .oneshot(
                Request::get(format!("/api/v1/essays/{essay_id}"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(payload.get("status"), Some(&json!("SENT")));
    }
}
