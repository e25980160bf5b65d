use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::intake::domain::{
    DocumentType, IntakeRecord, IntakeSubmission, LegalStatus, Nationality, PatientId,
};
use crate::workflows::intake::repository::{
    HomeAffairsReferral, IntakeRepository, ReferralError, ReferralPublisher, RepositoryError,
};
use crate::workflows::intake::verification::{
    Lookup, VerificationError, VerificationRecord, VerificationSource, VerificationTable,
};
use crate::workflows::intake::{intake_router, IntakeService};

pub(super) const CITIZEN_ID: &str = "9001011234087";
pub(super) const ZIMBABWEAN_PASSPORT: &str = "ZW2023AB001";
pub(super) const ASYLUM_PERMIT: &str = "REF12345678";

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
        date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1),
        estimated_age: None,
        medical_aid: None,
        conditions: Some("Hypertension".to_string()),
    }
}

pub(super) fn citizen_submission() -> IntakeSubmission {
    submission(
        "Sipho Dlamini",
        Nationality::SouthAfrican,
        DocumentType::RsaId,
        CITIZEN_ID,
    )
}

pub(super) fn zimbabwean_submission() -> IntakeSubmission {
    submission(
        "Tendai Moyo",
        Nationality::Zimbabwean,
        DocumentType::Passport,
        ZIMBABWEAN_PASSPORT,
    )
}

pub(super) fn asylum_submission() -> IntakeSubmission {
    submission(
        "Ahmed Abdi",
        Nationality::AsylumSeeker,
        DocumentType::AsylumPermit,
        ASYLUM_PERMIT,
    )
}

/// South African declaring a passport; always flagged for manual review.
pub(super) fn inconsistent_submission() -> IntakeSubmission {
    submission(
        "Naledi Khumalo",
        Nationality::SouthAfrican,
        DocumentType::Passport,
        "ZA2023AB001",
    )
}

pub(super) fn record_for(passport: &str, nationality: Nationality) -> VerificationRecord {
    VerificationRecord {
        id_number: None,
        passport_number: Some(passport.to_string()),
        nationality,
        full_name: "Fixture Patient".to_string(),
        legal_status: LegalStatus::Valid,
    }
}

pub(super) fn sample_source() -> Arc<dyn VerificationSource> {
    Arc::new(VerificationTable::sample())
}

pub(super) fn build_service() -> (
    IntakeService<MemoryRepository, MemoryReferrals>,
    Arc<MemoryRepository>,
    Arc<MemoryReferrals>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let referrals = Arc::new(MemoryReferrals::default());
    let service = IntakeService::new(repository.clone(), referrals.clone(), sample_source());
    (service, repository, referrals)
}

/// Verification source whose backing store cannot be read.
pub(super) struct OfflineSource;

impl VerificationSource for OfflineSource {
    fn find_by_id_number(&self, _id_number: &str) -> Result<Lookup, VerificationError> {
        Err(VerificationError::Unavailable("register offline".to_string()))
    }

    fn find_by_passport(
        &self,
        _passport_number: &str,
        _nationality: Nationality,
    ) -> Result<Lookup, VerificationError> {
        Err(VerificationError::Unavailable("register offline".to_string()))
    }
}

/// Counts every call into the source; each call is one read of the backing table.
#[derive(Default)]
pub(super) struct CountingSource {
    pub(super) table: VerificationTable,
    lookups: Mutex<usize>,
}

impl CountingSource {
    pub(super) fn new(table: VerificationTable) -> Self {
        Self {
            table,
            lookups: Mutex::new(0),
        }
    }

    pub(super) fn lookups(&self) -> usize {
        *self.lookups.lock().expect("lookup mutex poisoned")
    }

    fn bump(&self) {
        *self.lookups.lock().expect("lookup mutex poisoned") += 1;
    }
}

impl VerificationSource for CountingSource {
    fn find_by_id_number(&self, id_number: &str) -> Result<Lookup, VerificationError> {
        self.bump();
        self.table.find_by_id_number(id_number)
    }

    fn find_by_passport(
        &self,
        passport_number: &str,
        nationality: Nationality,
    ) -> Result<Lookup, VerificationError> {
        self.bump();
        self.table.find_by_passport(passport_number, nationality)
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<PatientId, IntakeRecord>>>,
}

impl IntakeRepository for MemoryRepository {
    fn insert(&self, record: IntakeRecord) -> Result<IntakeRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.patient_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.patient_id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: IntakeRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(record.patient_id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &PatientId) -> Result<Option<IntakeRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn all(&self) -> Result<Vec<IntakeRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryReferrals {
    events: Arc<Mutex<Vec<HomeAffairsReferral>>>,
}

impl MemoryReferrals {
    pub(super) fn events(&self) -> Vec<HomeAffairsReferral> {
        self.events.lock().expect("referral mutex poisoned").clone()
    }
}

impl ReferralPublisher for MemoryReferrals {
    fn refer(&self, referral: HomeAffairsReferral) -> Result<(), ReferralError> {
        self.events
            .lock()
            .expect("referral mutex poisoned")
            .push(referral);
        Ok(())
    }
}

pub(super) struct ConflictRepository;

impl IntakeRepository for ConflictRepository {
    fn insert(&self, _record: IntakeRecord) -> Result<IntakeRecord, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn update(&self, _record: IntakeRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn fetch(&self, _id: &PatientId) -> Result<Option<IntakeRecord>, RepositoryError> {
        Ok(None)
    }

    fn all(&self) -> Result<Vec<IntakeRecord>, RepositoryError> {
        Ok(Vec::new())
    }
}

pub(super) struct UnavailableRepository;

impl IntakeRepository for UnavailableRepository {
    fn insert(&self, _record: IntakeRecord) -> Result<IntakeRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: IntakeRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &PatientId) -> Result<Option<IntakeRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn all(&self) -> Result<Vec<IntakeRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn assert_conflict_response(response: Response) {
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn intake_router_with_service(
    service: IntakeService<MemoryRepository, MemoryReferrals>,
) -> axum::Router {
    intake_router(Arc::new(service))
}
