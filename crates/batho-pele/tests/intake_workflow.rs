//! End-to-end intake scenarios driven through the public service facade and HTTP router, backed
//! by a CSV verification extract on disk.

mod common {
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    use batho_pele::workflows::intake::{
        CsvVerificationSource, DocumentType, HomeAffairsReferral, IntakeRecord, IntakeRepository,
        IntakeService, IntakeSubmission, Nationality, PatientId, ReferralError,
        ReferralPublisher, RepositoryError,
    };

    pub(super) const EXTRACT: &str = "\
id_number,passport_number,nationality,full_name,legal_status
8807155123086,,South African,Lindiwe Zulu,Valid
,ZW2021XY042,Zimbabwean,Farai Chikore,Valid
,MW2022PQ117,Malawian,Kondwani Phiri,Pending
";

    pub(super) fn extract_path(test: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "batho-pele-intake-{}-{}",
            test,
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("verification.csv");
        std::fs::write(&path, EXTRACT).expect("write extract");
        path
    }

    pub(super) fn submission(
        full_name: &str,
        nationality: Nationality,
        doc_type: DocumentType,
        doc_number: &str,
    ) -> IntakeSubmission {
        IntakeSubmission {
            full_name: full_name.to_string(),
            nationality,
            doc_type,
            doc_number: doc_number.to_string(),
            date_of_birth: None,
            estimated_age: Some(41),
            medical_aid: None,
            conditions: None,
        }
    }

    #[derive(Default)]
    pub(super) struct Records {
        inner: Mutex<Vec<IntakeRecord>>,
    }

    impl IntakeRepository for Records {
        fn insert(&self, record: IntakeRecord) -> Result<IntakeRecord, RepositoryError> {
            let mut guard = self.inner.lock().expect("records mutex");
            if guard.iter().any(|r| r.patient_id == record.patient_id) {
                return Err(RepositoryError::Conflict);
            }
            guard.push(record.clone());
            Ok(record)
        }

        fn update(&self, record: IntakeRecord) -> Result<(), RepositoryError> {
            let mut guard = self.inner.lock().expect("records mutex");
            match guard.iter_mut().find(|r| r.patient_id == record.patient_id) {
                Some(slot) => {
                    *slot = record;
                    Ok(())
                }
                None => Err(RepositoryError::NotFound),
            }
        }

        fn fetch(&self, id: &PatientId) -> Result<Option<IntakeRecord>, RepositoryError> {
            let guard = self.inner.lock().expect("records mutex");
            Ok(guard.iter().find(|r| &r.patient_id == id).cloned())
        }

        fn all(&self) -> Result<Vec<IntakeRecord>, RepositoryError> {
            Ok(self.inner.lock().expect("records mutex").clone())
        }
    }

    #[derive(Default)]
    pub(super) struct Referrals {
        inner: Mutex<Vec<HomeAffairsReferral>>,
    }

    impl Referrals {
        pub(super) fn sent(&self) -> Vec<HomeAffairsReferral> {
            self.inner.lock().expect("referral mutex").clone()
        }
    }

    impl ReferralPublisher for Referrals {
        fn refer(&self, referral: HomeAffairsReferral) -> Result<(), ReferralError> {
            self.inner.lock().expect("referral mutex").push(referral);
            Ok(())
        }
    }

    pub(super) fn service(
        path: &PathBuf,
    ) -> (Arc<IntakeService<Records, Referrals>>, Arc<Referrals>) {
        let referrals = Arc::new(Referrals::default());
        let service = IntakeService::new(
            Arc::new(Records::default()),
            referrals.clone(),
            Arc::new(CsvVerificationSource::new(path.clone())),
        );
        (Arc::new(service), referrals)
    }
}

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use batho_pele::workflows::intake::{
    intake_router, CostTier, DocumentType, EligibilityOutcome, LegalStatus, Nationality,
    ValidationOutcome,
};
use common::{extract_path, service, submission};
use tower::ServiceExt;

#[test]
fn record_match_carries_the_registered_status() {
    let path = extract_path("status");
    let (service, referrals) = service(&path);

    let settled = service
        .submit(submission(
            "Farai Chikore",
            Nationality::Zimbabwean,
            DocumentType::Passport,
            "ZW2021XY042",
        ))
        .expect("submission accepted");
    assert_eq!(settled.assessment.legal_status, LegalStatus::Valid);
    assert_eq!(settled.assessment.cost_tier, CostTier::LegalImmigrants);
    assert_eq!(
        settled.assessment.eligibility,
        EligibilityOutcome::PaymentRequired
    );

    let pending = service
        .submit(submission(
            "Kondwani Phiri",
            Nationality::Malawian,
            DocumentType::Passport,
            "MW2022PQ117",
        ))
        .expect("submission accepted");
    assert_eq!(pending.assessment.legal_status, LegalStatus::Pending);
    assert_eq!(pending.assessment.cost_tier, CostTier::IllegalImmigrants);

    let sent = referrals.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].full_name, "Kondwani Phiri");
}

#[test]
fn refreshed_extract_is_used_without_restart() {
    let path = extract_path("refresh");
    let (service, _) = service(&path);

    let before = service.validate(&DocumentType::Passport, "MZ2024GH555", Nationality::Mozambican);
    assert!(matches!(before, ValidationOutcome::Invalid(_)));

    let mut refreshed = common::EXTRACT.to_string();
    refreshed.push_str(",MZ2024GH555,Mozambican,Celso Machava,Valid\n");
    std::fs::write(&path, refreshed).expect("rewrite extract");

    let after = service.validate(&DocumentType::Passport, "MZ2024GH555", Nationality::Mozambican);
    assert!(after.is_valid(), "new record is visible: {after:?}");
}

#[test]
fn missing_extract_is_a_verification_error_not_a_rejection() {
    let path = extract_path("missing");
    std::fs::remove_file(&path).expect("remove extract");
    let (service, _) = service(&path);

    let outcome = service.validate(&DocumentType::Passport, "ZW2021XY042", Nationality::Zimbabwean);
    assert!(matches!(outcome, ValidationOutcome::VerificationError(_)));

    let citizen = service.validate(&DocumentType::RsaId, "8807155123086", Nationality::SouthAfrican);
    assert!(citizen.is_valid(), "citizen IDs never need the extract");
}

#[tokio::test]
async fn router_registers_and_reports_patients() {
    let path = extract_path("router");
    let (service, _) = service(&path);
    let app = intake_router(service);

    let body = serde_json::json!({
        "full_name": "  Lindiwe   Zulu ",
        "nationality": "South African",
        "doc_type": "RSA ID",
        "doc_number": "8807155123086",
    });
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/intake")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let bytes = to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("body readable");
    let view: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
    assert_eq!(view["full_name"], "Lindiwe Zulu");
    assert_eq!(view["legal_status"], "Valid");
    assert!(view.get("doc_number").is_none(), "document numbers stay private");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/dashboard/metrics")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("body readable");
    let metrics: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
    assert_eq!(metrics["total_patients"], 1);
    assert_eq!(metrics["eligible"], 1);
}
