use super::common::*;
use crate::workflows::intake::assessment::{assess, classify};
use crate::workflows::intake::domain::{DocumentType, LegalStatus, Nationality};
use crate::workflows::intake::eligibility::{
    classify_eligibility, resolve_cost_tier, CostTier, EligibilityOutcome,
};
use crate::workflows::intake::guard::{ConsistencyFlag, IntakeGuard};
use crate::workflows::intake::verification::VerificationTable;

const ALL_STATUSES: [LegalStatus; 4] = [
    LegalStatus::Valid,
    LegalStatus::Invalid,
    LegalStatus::Pending,
    LegalStatus::Unknown,
];

fn all_doc_types() -> Vec<DocumentType> {
    vec![
        DocumentType::RsaId,
        DocumentType::Passport,
        DocumentType::AsylumPermit,
        DocumentType::Permit,
        DocumentType::NoDocument,
        DocumentType::Unrecognized("Birth Certificate".to_string()),
    ]
}

#[test]
fn citizen_with_valid_id_is_free() {
    assert_eq!(
        classify_eligibility(
            Nationality::SouthAfrican,
            &DocumentType::RsaId,
            LegalStatus::Valid
        ),
        EligibilityOutcome::EligibleFree
    );
}

#[test]
fn free_care_requires_all_three_conditions() {
    assert_eq!(
        classify_eligibility(
            Nationality::SouthAfrican,
            &DocumentType::RsaId,
            LegalStatus::Unknown
        ),
        EligibilityOutcome::NeedsManualReview
    );
    assert_eq!(
        classify_eligibility(
            Nationality::SouthAfrican,
            &DocumentType::RsaId,
            LegalStatus::Invalid
        ),
        EligibilityOutcome::PaymentRequired
    );
    assert_ne!(
        classify_eligibility(
            Nationality::Zimbabwean,
            &DocumentType::RsaId,
            LegalStatus::Valid
        ),
        EligibilityOutcome::EligibleFree
    );
}

#[test]
fn valid_permits_are_subsidized() {
    for doc_type in [DocumentType::AsylumPermit, DocumentType::Permit] {
        assert_eq!(
            classify_eligibility(Nationality::AsylumSeeker, &doc_type, LegalStatus::Valid),
            EligibilityOutcome::EligibleSubsidized
        );
    }
}

#[test]
fn passports_and_missing_documents_require_payment() {
    for status in ALL_STATUSES {
        assert_eq!(
            classify_eligibility(Nationality::Malawian, &DocumentType::Passport, status),
            EligibilityOutcome::PaymentRequired
        );
        assert_eq!(
            classify_eligibility(Nationality::Other, &DocumentType::NoDocument, status),
            EligibilityOutcome::PaymentRequired
        );
    }
}

#[test]
fn unresolved_permit_falls_through_to_manual_review() {
    assert_eq!(
        classify_eligibility(
            Nationality::AsylumSeeker,
            &DocumentType::AsylumPermit,
            LegalStatus::Pending
        ),
        EligibilityOutcome::NeedsManualReview
    );
    assert_eq!(
        classify_eligibility(
            Nationality::AsylumSeeker,
            &DocumentType::AsylumPermit,
            LegalStatus::Invalid
        ),
        EligibilityOutcome::PaymentRequired
    );
}

#[test]
fn classification_is_idempotent_over_every_input() {
    for nationality in Nationality::ordered() {
        for doc_type in all_doc_types() {
            for status in ALL_STATUSES {
                let first = classify_eligibility(nationality, &doc_type, status);
                let second = classify_eligibility(nationality, &doc_type, status);
                assert_eq!(first, second);
                assert_eq!(
                    resolve_cost_tier(nationality, status),
                    resolve_cost_tier(nationality, status)
                );
            }
        }
    }
}

#[test]
fn cost_tier_is_independent_of_eligibility() {
    assert_eq!(
        resolve_cost_tier(Nationality::SouthAfrican, LegalStatus::Invalid),
        CostTier::SaResidents
    );
    assert_eq!(
        resolve_cost_tier(Nationality::Mozambican, LegalStatus::Valid),
        CostTier::LegalImmigrants
    );
    assert_eq!(
        resolve_cost_tier(Nationality::Mozambican, LegalStatus::Pending),
        CostTier::IllegalImmigrants
    );

    // Mozambican, valid status, but classified for manual review.
    let eligibility = classify_eligibility(
        Nationality::Mozambican,
        &DocumentType::Unrecognized("Work Visa".to_string()),
        LegalStatus::Valid,
    );
    assert_eq!(eligibility, EligibilityOutcome::NeedsManualReview);
    assert_eq!(
        resolve_cost_tier(Nationality::Mozambican, LegalStatus::Valid),
        CostTier::LegalImmigrants
    );
}

#[test]
fn cross_check_forces_pending_and_manual_review() {
    let passport_citizen = classify(
        Nationality::SouthAfrican,
        &DocumentType::Passport,
        LegalStatus::Valid,
    );
    assert_eq!(passport_citizen.legal_status, LegalStatus::Pending);
    assert_eq!(
        passport_citizen.eligibility,
        EligibilityOutcome::NeedsManualReview
    );
    assert_eq!(
        passport_citizen.consistency,
        Some(ConsistencyFlag::PassportForCitizen)
    );

    let id_foreigner = classify(
        Nationality::Malawian,
        &DocumentType::RsaId,
        LegalStatus::Valid,
    );
    assert_eq!(id_foreigner.legal_status, LegalStatus::Pending);
    assert_eq!(id_foreigner.eligibility, EligibilityOutcome::NeedsManualReview);
    assert_eq!(id_foreigner.cost_tier, CostTier::IllegalImmigrants);
}

#[test]
fn assessment_of_citizen_passport_overrides_lookup() {
    let guard = IntakeGuard::default();
    let claim = guard
        .claim_from_submission(inconsistent_submission())
        .expect("valid submission");
    let assessment = assess(&claim, &VerificationTable::sample());

    assert_eq!(assessment.legal_status, LegalStatus::Pending);
    assert_eq!(assessment.eligibility, EligibilityOutcome::NeedsManualReview);
    assert_eq!(assessment.cost_tier, CostTier::SaResidents);
}

#[test]
fn assessment_of_known_foreign_passport_requires_payment_at_legal_rate() {
    let guard = IntakeGuard::default();
    let claim = guard
        .claim_from_submission(zimbabwean_submission())
        .expect("valid submission");
    let assessment = assess(&claim, &VerificationTable::sample());

    assert_eq!(assessment.legal_status, LegalStatus::Valid);
    assert_eq!(assessment.eligibility, EligibilityOutcome::PaymentRequired);
    assert_eq!(assessment.cost_tier, CostTier::LegalImmigrants);
    assert!(assessment.consistency.is_none());
}

#[test]
fn assessment_of_asylum_permit_is_subsidized() {
    let guard = IntakeGuard::default();
    let claim = guard
        .claim_from_submission(asylum_submission())
        .expect("valid submission");
    let assessment = assess(&claim, &VerificationTable::default());

    assert_eq!(assessment.eligibility, EligibilityOutcome::EligibleSubsidized);
    assert_eq!(assessment.cost_tier, CostTier::LegalImmigrants);
}

#[test]
fn labels_match_dashboard_wording() {
    assert_eq!(
        EligibilityOutcome::EligibleFree.label(),
        "Eligible for Free Public Healthcare"
    );
    assert_eq!(
        EligibilityOutcome::PaymentRequired.label(),
        "Payment Required or Refer to Admin"
    );
    assert_eq!(CostTier::IllegalImmigrants.label(), "Illegal Immigrants");
    assert_eq!(CostTier::from_label("legal immigrants"), Some(CostTier::LegalImmigrants));
}
