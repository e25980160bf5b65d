use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{IntakeRecord, LegalStatus, Nationality, PatientId};
use super::eligibility::EligibilityOutcome;

/// Storage abstraction so the service module can be exercised in isolation.
pub trait IntakeRepository: Send + Sync {
    fn insert(&self, record: IntakeRecord) -> Result<IntakeRecord, RepositoryError>;
    fn update(&self, record: IntakeRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &PatientId) -> Result<Option<IntakeRecord>, RepositoryError>;
    fn all(&self) -> Result<Vec<IntakeRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound hook used when a patient's status must be confirmed with Home Affairs.
pub trait ReferralPublisher: Send + Sync {
    fn refer(&self, referral: HomeAffairsReferral) -> Result<(), ReferralError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeAffairsReferral {
    pub patient_id: PatientId,
    pub full_name: String,
    pub nationality: Nationality,
    pub doc_type: String,
    pub details: BTreeMap<String, String>,
}

impl HomeAffairsReferral {
    pub fn for_record(record: &IntakeRecord) -> Self {
        let mut details = BTreeMap::new();
        details.insert(
            "validation".to_string(),
            record.assessment.validation.summary(),
        );
        if let Some(flag) = record.assessment.consistency {
            details.insert("consistency".to_string(), flag.describe().to_string());
        }

        Self {
            patient_id: record.patient_id.clone(),
            full_name: record.claim.full_name.clone(),
            nationality: record.claim.nationality,
            doc_type: record.claim.doc_type.label().to_string(),
            details,
        }
    }
}

/// Referral dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum ReferralError {
    #[error("referral transport unavailable: {0}")]
    Transport(String),
}

/// Optional filters applied to the intake log; blank filters match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientQuery {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub document: Option<String>,
    #[serde(default)]
    pub nationality: Option<Nationality>,
}

impl PatientQuery {
    pub fn matches(&self, record: &IntakeRecord) -> bool {
        contains_ignore_case(&record.claim.full_name, self.name.as_deref())
            && contains_ignore_case(&record.claim.doc_number, self.document.as_deref())
            && self
                .nationality
                .map_or(true, |nationality| record.claim.nationality == nationality)
    }
}

fn contains_ignore_case(haystack: &str, needle: Option<&str>) -> bool {
    match needle.map(str::trim).filter(|needle| !needle.is_empty()) {
        Some(needle) => haystack
            .to_lowercase()
            .contains(&needle.to_lowercase()),
        None => true,
    }
}

/// Headline counts shown on the staff dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeMetrics {
    pub total_patients: usize,
    pub eligible: usize,
    pub manual_review: usize,
    pub south_african: usize,
    pub foreign_nationals: usize,
    pub needs_referral: usize,
}

impl IntakeMetrics {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a IntakeRecord>) -> Self {
        records
            .into_iter()
            .fold(Self::default(), |mut metrics, record| {
                metrics.total_patients += 1;
                if record.assessment.eligibility.is_eligible() {
                    metrics.eligible += 1;
                }
                if record.assessment.eligibility == EligibilityOutcome::NeedsManualReview {
                    metrics.manual_review += 1;
                }
                if record.claim.nationality.is_south_african() {
                    metrics.south_african += 1;
                } else {
                    metrics.foreign_nationals += 1;
                }
                if record.assessment.legal_status == LegalStatus::Pending {
                    metrics.needs_referral += 1;
                }
                metrics
            })
    }
}
