//! Treatment plans, tiered pricing and invoices.

mod advice;
mod catalog;
mod invoice;
mod prescription;

pub use advice::{advise, CostSavingOption, Recommendation, TreatmentAdvice};
pub use catalog::{
    Medication, TierPricing, TreatmentCatalog, TreatmentPlan, TreatmentQuote, CUSTOM_DIAGNOSIS,
    DEFAULT_CUSTOM_COST,
};
pub use invoice::{format_rand, Invoice};
pub use prescription::{prescribe, TreatmentRecord, TreatmentRequest};

/// Errors raised while resolving a treatment.
#[derive(Debug, thiserror::Error)]
pub enum TreatmentError {
    #[error("condition `{0}` is not in the treatment catalogue")]
    UnknownCondition(String),
    #[error("diagnosis is required")]
    MissingDiagnosis,
    #[error("custom diagnoses require a treatment plan")]
    MissingPlan,
}
