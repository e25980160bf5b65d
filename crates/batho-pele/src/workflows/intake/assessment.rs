use serde::{Deserialize, Serialize};

use super::documents::{validate_document, ValidationOutcome};
use super::domain::{DocumentType, IdentityClaim, LegalStatus, Nationality};
use super::eligibility::{classify_eligibility, resolve_cost_tier, CostTier, EligibilityOutcome};
use super::guard::{cross_check, ConsistencyFlag};
use super::verification::VerificationSource;

/// Full decision trail for one identity claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeAssessment {
    pub validation: ValidationOutcome,
    pub legal_status: LegalStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consistency: Option<ConsistencyFlag>,
    pub eligibility: EligibilityOutcome,
    pub cost_tier: CostTier,
}

/// Classification of an already-resolved legal status, without document validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub legal_status: LegalStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consistency: Option<ConsistencyFlag>,
    pub eligibility: EligibilityOutcome,
    pub cost_tier: CostTier,
}

/// Apply the nationality/document cross-check and both classifiers.
///
/// A flagged claim is forced to `Pending` and `NeedsManualReview` whatever the supplied status.
pub fn classify(
    nationality: Nationality,
    doc_type: &DocumentType,
    legal_status: LegalStatus,
) -> Classification {
    let consistency = cross_check(nationality, doc_type);

    let (legal_status, eligibility) = match consistency {
        Some(_) => (LegalStatus::Pending, EligibilityOutcome::NeedsManualReview),
        None => (
            legal_status,
            classify_eligibility(nationality, doc_type, legal_status),
        ),
    };

    Classification {
        legal_status,
        consistency,
        eligibility,
        cost_tier: resolve_cost_tier(nationality, legal_status),
    }
}

/// Validate the claim's document and classify the result.
pub fn assess(claim: &IdentityClaim, source: &dyn VerificationSource) -> IntakeAssessment {
    let validation = validate_document(
        &claim.doc_type,
        &claim.doc_number,
        claim.nationality,
        source,
    );
    let classification = classify(
        claim.nationality,
        &claim.doc_type,
        validation.implied_legal_status(),
    );

    IntakeAssessment {
        validation,
        legal_status: classification.legal_status,
        consistency: classification.consistency,
        eligibility: classification.eligibility,
        cost_tier: classification.cost_tier,
    }
}
