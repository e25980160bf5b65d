use super::super::domain::{DocumentType, LegalStatus, Nationality};
use serde::{Deserialize, Serialize};

/// Care category a patient is entitled to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityOutcome {
    EligibleFree,
    EligibleSubsidized,
    PaymentRequired,
    NeedsManualReview,
}

impl EligibilityOutcome {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::EligibleFree,
            Self::EligibleSubsidized,
            Self::PaymentRequired,
            Self::NeedsManualReview,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::EligibleFree => "Eligible for Free Public Healthcare",
            Self::EligibleSubsidized => "Eligible for Subsidized or Emergency Care",
            Self::PaymentRequired => "Payment Required or Refer to Admin",
            Self::NeedsManualReview => "Needs Manual Review",
        }
    }

    pub const fn is_eligible(self) -> bool {
        matches!(self, Self::EligibleFree | Self::EligibleSubsidized)
    }
}

/// Classify a resolved identity claim. Rules are evaluated in order and the first match wins.
pub fn classify_eligibility(
    nationality: Nationality,
    doc_type: &DocumentType,
    legal_status: LegalStatus,
) -> EligibilityOutcome {
    let valid = legal_status == LegalStatus::Valid;

    if nationality.is_south_african() && *doc_type == DocumentType::RsaId && valid {
        return EligibilityOutcome::EligibleFree;
    }

    if doc_type.is_permit() && valid {
        return EligibilityOutcome::EligibleSubsidized;
    }

    if matches!(doc_type, DocumentType::Passport | DocumentType::NoDocument)
        || legal_status == LegalStatus::Invalid
    {
        return EligibilityOutcome::PaymentRequired;
    }

    EligibilityOutcome::NeedsManualReview
}
