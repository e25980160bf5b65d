use serde::{Deserialize, Serialize};

use super::domain::{BirthInfo, DocumentType, IdentityClaim, IntakeSubmission, Nationality};

const DEFAULT_MAX_ESTIMATED_AGE: u8 = 120;
const NO_MEDICAL_AID: &str = "None";
const NO_CONDITIONS: &str = "None reported";

/// Validation errors raised by the intake guard.
#[derive(Debug, thiserror::Error)]
pub enum IntakeViolation {
    #[error("patient full name is required")]
    MissingName,
    #[error("document number is required for {0}")]
    MissingDocumentNumber(DocumentType),
    #[error("estimated age {found} exceeds the accepted maximum of {max}")]
    EstimatedAgeOutOfRange { max: u8, found: u8 },
}

/// Mismatch between the declared nationality and the document presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyFlag {
    PassportForCitizen,
    RsaIdForNonCitizen,
}

impl ConsistencyFlag {
    pub const fn describe(self) -> &'static str {
        match self {
            Self::PassportForCitizen => "South African patient presented a passport",
            Self::RsaIdForNonCitizen => "Non-citizen presented an RSA ID",
        }
    }
}

/// Flag claims whose document type contradicts the declared nationality.
pub fn cross_check(nationality: Nationality, doc_type: &DocumentType) -> Option<ConsistencyFlag> {
    match doc_type {
        DocumentType::Passport if nationality.is_south_african() => {
            Some(ConsistencyFlag::PassportForCitizen)
        }
        DocumentType::RsaId if !nationality.is_south_african() => {
            Some(ConsistencyFlag::RsaIdForNonCitizen)
        }
        _ => None,
    }
}

/// Policy dial backing submission validation.
#[derive(Debug, Clone)]
pub struct IntakePolicy {
    max_estimated_age: u8,
}

impl IntakePolicy {
    pub fn new(max_estimated_age: u8) -> Self {
        let sanitized = if max_estimated_age == 0 {
            DEFAULT_MAX_ESTIMATED_AGE
        } else {
            max_estimated_age
        };

        Self {
            max_estimated_age: sanitized,
        }
    }

    pub fn max_estimated_age(&self) -> u8 {
        self.max_estimated_age
    }
}

impl Default for IntakePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ESTIMATED_AGE)
    }
}

/// Guard responsible for producing sanitized `IdentityClaim` instances.
#[derive(Debug, Clone, Default)]
pub struct IntakeGuard {
    policy: IntakePolicy,
}

impl IntakeGuard {
    pub fn with_policy(policy: IntakePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &IntakePolicy {
        &self.policy
    }

    /// Convert an inbound submission into a sanitized identity claim.
    pub fn claim_from_submission(
        &self,
        submission: IntakeSubmission,
    ) -> Result<IdentityClaim, IntakeViolation> {
        let full_name = collapse_whitespace(&submission.full_name);
        if full_name.is_empty() {
            return Err(IntakeViolation::MissingName);
        }

        let doc_number = submission.doc_number.trim().to_string();
        if doc_number.is_empty() && submission.doc_type.requires_number() {
            return Err(IntakeViolation::MissingDocumentNumber(submission.doc_type));
        }

        let birth = match (submission.date_of_birth, submission.estimated_age) {
            (Some(date), _) => BirthInfo::Recorded(date),
            (None, Some(age)) if age > self.policy.max_estimated_age => {
                return Err(IntakeViolation::EstimatedAgeOutOfRange {
                    max: self.policy.max_estimated_age,
                    found: age,
                });
            }
            (None, Some(age)) => BirthInfo::EstimatedAge(age),
            (None, None) => BirthInfo::Unknown,
        };

        Ok(IdentityClaim {
            full_name,
            nationality: submission.nationality,
            doc_type: submission.doc_type,
            doc_number,
            birth,
            medical_aid: text_or(submission.medical_aid, NO_MEDICAL_AID),
            conditions: text_or(submission.conditions, NO_CONDITIONS),
        })
    }
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn text_or(value: Option<String>, fallback: &str) -> String {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}
