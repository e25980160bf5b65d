use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, Utc};
use tracing::{info, warn};

use super::assessment::assess;
use super::documents::{validate_document, ValidationOutcome};
use super::domain::{DocumentType, IntakeRecord, IntakeSubmission, Nationality, PatientId};
use super::guard::{IntakeGuard, IntakeViolation};
use super::repository::{
    HomeAffairsReferral, IntakeMetrics, IntakeRepository, PatientQuery, ReferralError,
    ReferralPublisher, RepositoryError,
};
use super::verification::VerificationSource;
use crate::workflows::treatment::{
    prescribe, Invoice, TreatmentCatalog, TreatmentError, TreatmentRequest,
};

/// South African Standard Time, used for intake and treatment timestamps.
const SAST_OFFSET_SECS: i32 = 2 * 60 * 60;

/// Service composing the intake guard, verification source, repository and treatment catalogue.
pub struct IntakeService<R, A> {
    guard: Arc<IntakeGuard>,
    repository: Arc<R>,
    referrals: Arc<A>,
    verification: Arc<dyn VerificationSource>,
    catalog: Arc<TreatmentCatalog>,
    sequence: AtomicU64,
}

impl<R, A> IntakeService<R, A>
where
    R: IntakeRepository + 'static,
    A: ReferralPublisher + 'static,
{
    pub fn new(
        repository: Arc<R>,
        referrals: Arc<A>,
        verification: Arc<dyn VerificationSource>,
    ) -> Self {
        Self::with_parts(
            IntakeGuard::default(),
            repository,
            referrals,
            verification,
            TreatmentCatalog::standard(),
        )
    }

    pub fn with_parts(
        guard: IntakeGuard,
        repository: Arc<R>,
        referrals: Arc<A>,
        verification: Arc<dyn VerificationSource>,
        catalog: TreatmentCatalog,
    ) -> Self {
        Self {
            guard: Arc::new(guard),
            repository,
            referrals,
            verification,
            catalog: Arc::new(catalog),
            sequence: AtomicU64::new(1),
        }
    }

    pub fn catalog(&self) -> &TreatmentCatalog {
        &self.catalog
    }

    fn next_patient_id(&self) -> PatientId {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        PatientId(format!("PAT-{id:06}"))
    }

    /// Register a patient, assess their documents and raise a referral when status is pending.
    pub fn submit(&self, submission: IntakeSubmission) -> Result<IntakeRecord, IntakeServiceError> {
        let claim = self.guard.claim_from_submission(submission)?;
        let assessment = assess(&claim, self.verification.as_ref());

        let record = IntakeRecord {
            patient_id: self.next_patient_id(),
            claim,
            assessment,
            recorded_at: local_now(),
            visits: Vec::new(),
        };

        let stored = self.repository.insert(record)?;
        info!(
            patient_id = %stored.patient_id,
            nationality = %stored.claim.nationality,
            doc_type = %stored.claim.doc_type,
            legal_status = %stored.assessment.legal_status,
            eligibility = stored.assessment.eligibility.label(),
            "patient registered"
        );

        if stored.needs_referral() {
            warn!(patient_id = %stored.patient_id, "referring patient to Home Affairs");
            self.referrals
                .refer(HomeAffairsReferral::for_record(&stored))?;
        }

        Ok(stored)
    }

    /// Run the document validator without registering anyone.
    pub fn validate(
        &self,
        doc_type: &DocumentType,
        doc_number: &str,
        nationality: Nationality,
    ) -> ValidationOutcome {
        validate_document(
            doc_type,
            doc_number.trim(),
            nationality,
            self.verification.as_ref(),
        )
    }

    pub fn get(&self, patient_id: &PatientId) -> Result<IntakeRecord, IntakeServiceError> {
        let record = self
            .repository
            .fetch(patient_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub fn search(&self, query: &PatientQuery) -> Result<Vec<IntakeRecord>, IntakeServiceError> {
        let mut matches: Vec<_> = self
            .repository
            .all()?
            .into_iter()
            .filter(|record| query.matches(record))
            .collect();
        matches.sort_by(|a, b| a.patient_id.cmp(&b.patient_id));
        Ok(matches)
    }

    pub fn metrics(&self) -> Result<IntakeMetrics, IntakeServiceError> {
        let records = self.repository.all()?;
        Ok(IntakeMetrics::from_records(&records))
    }

    /// Append a visit to the patient's history, priced by their cost tier.
    pub fn record_treatment(
        &self,
        patient_id: &PatientId,
        request: TreatmentRequest,
    ) -> Result<IntakeRecord, IntakeServiceError> {
        let mut record = self.get(patient_id)?;
        let treatment = prescribe(
            &self.catalog,
            request,
            record.assessment.cost_tier,
            local_now(),
        )?;

        info!(
            patient_id = %record.patient_id,
            diagnosis = %treatment.diagnosis,
            cost = treatment.cost,
            visit = record.visits.len() + 1,
            "treatment recorded"
        );
        record.visits.push(treatment);
        self.repository.update(record.clone())?;
        Ok(record)
    }

    /// Build the invoice for the patient's most recent visit.
    pub fn invoice(
        &self,
        patient_id: &PatientId,
        issued_on: Option<NaiveDate>,
    ) -> Result<Invoice, IntakeServiceError> {
        let record = self.get(patient_id)?;
        let treatment = record
            .latest_visit()
            .ok_or_else(|| IntakeServiceError::NoTreatment(patient_id.clone()))?;
        let issued_on = issued_on.unwrap_or_else(|| local_now().date());
        Ok(Invoice::new(&record.claim, treatment, issued_on))
    }

    /// Build the invoice for an earlier visit, numbered from 1.
    pub fn invoice_for_visit(
        &self,
        patient_id: &PatientId,
        visit: usize,
        issued_on: Option<NaiveDate>,
    ) -> Result<Invoice, IntakeServiceError> {
        let record = self.get(patient_id)?;
        if record.visits.is_empty() {
            return Err(IntakeServiceError::NoTreatment(patient_id.clone()));
        }
        let treatment = record.visit(visit).ok_or_else(|| IntakeServiceError::NoSuchVisit {
            patient_id: patient_id.clone(),
            visit,
            recorded: record.visits.len(),
        })?;
        let issued_on = issued_on.unwrap_or_else(|| local_now().date());
        Ok(Invoice::new(&record.claim, treatment, issued_on))
    }
}

fn local_now() -> NaiveDateTime {
    let now = Utc::now();
    match FixedOffset::east_opt(SAST_OFFSET_SECS) {
        Some(offset) => now.with_timezone(&offset).naive_local(),
        None => now.naive_utc(),
    }
}

/// Error raised by the intake service.
#[derive(Debug, thiserror::Error)]
pub enum IntakeServiceError {
    #[error(transparent)]
    Intake(#[from] IntakeViolation),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Referral(#[from] ReferralError),
    #[error(transparent)]
    Treatment(#[from] TreatmentError),
    #[error("no treatment recorded for patient {0}")]
    NoTreatment(PatientId),
    #[error("patient {patient_id} has {recorded} recorded visits, no visit {visit}")]
    NoSuchVisit {
        patient_id: PatientId,
        visit: usize,
        recorded: usize,
    },
}
