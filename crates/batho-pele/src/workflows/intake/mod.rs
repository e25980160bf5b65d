//! Patient intake: document validation, legal-status resolution and eligibility.
//!
//! A submission passes through the [`IntakeGuard`], has its document checked against the
//! configured [`VerificationSource`], and is classified into an eligibility category and a
//! cost tier. Records land in an [`IntakeRepository`]; patients whose status stays pending are
//! referred to Home Affairs through a [`ReferralPublisher`].

pub mod assessment;
pub mod documents;
pub mod domain;
pub mod eligibility;
pub(crate) mod guard;
pub mod repository;
pub mod router;
pub mod service;
pub mod verification;

#[cfg(test)]
mod tests;

pub use assessment::{assess, classify, Classification, IntakeAssessment};
pub use documents::{
    validate_document, DocumentValidator, InvalidReason, PassportNumber, ReviewReason,
    RsaIdNumber, ValidationBasis, ValidationOutcome,
};
pub use domain::{
    BirthInfo, DocumentType, IdentityClaim, IntakeRecord, IntakeStatusView, IntakeSubmission,
    LegalStatus, Nationality, PatientId,
};
pub use eligibility::{classify_eligibility, resolve_cost_tier, CostTier, EligibilityOutcome};
pub use guard::{cross_check, ConsistencyFlag, IntakeGuard, IntakePolicy, IntakeViolation};
pub use repository::{
    HomeAffairsReferral, IntakeMetrics, IntakeRepository, PatientQuery, ReferralError,
    ReferralPublisher, RepositoryError,
};
pub use router::intake_router;
pub use service::{IntakeService, IntakeServiceError};
pub use verification::{
    CsvVerificationSource, Lookup, VerificationError, VerificationRecord, VerificationSource,
    VerificationTable,
};
