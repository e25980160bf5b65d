use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::catalog::{is_custom, Medication, TreatmentCatalog, DEFAULT_CUSTOM_COST};
use super::TreatmentError;
use crate::workflows::intake::CostTier;

/// Treatment details captured by clinical staff after intake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatmentRequest {
    pub diagnosis: String,
    /// Overrides the standard plan text; required for custom diagnoses.
    #[serde(default)]
    pub plan: Option<String>,
    /// Only honoured for custom diagnoses; standard plans are priced by tier.
    #[serde(default)]
    pub cost: Option<u32>,
    #[serde(default)]
    pub medication: Option<Medication>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// One treatment visit in a patient's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatmentRecord {
    pub diagnosis: String,
    pub plan: String,
    pub recommended: Vec<Medication>,
    #[serde(default)]
    pub prescribed: Option<Medication>,
    pub cost_tier: CostTier,
    pub cost: u32,
    pub custom: bool,
    #[serde(default)]
    pub notes: Option<String>,
    pub recorded_at: NaiveDateTime,
}

impl TreatmentRecord {
    /// Prescribed medication line, or `None` when staff did not enter one.
    pub fn medication_line(&self) -> String {
        self.prescribed
            .as_ref()
            .map(Medication::describe)
            .filter(|line| !line.is_empty())
            .unwrap_or_else(|| "None".to_string())
    }
}

/// Resolve a treatment request against the catalogue for a patient's cost tier.
pub fn prescribe(
    catalog: &TreatmentCatalog,
    request: TreatmentRequest,
    tier: CostTier,
    recorded_at: NaiveDateTime,
) -> Result<TreatmentRecord, TreatmentError> {
    let diagnosis = request.diagnosis.trim();
    if diagnosis.is_empty() {
        return Err(TreatmentError::MissingDiagnosis);
    }

    let plan_override = request
        .plan
        .map(|plan| plan.trim().to_string())
        .filter(|plan| !plan.is_empty());
    let prescribed = request
        .medication
        .filter(|medication| !medication.name.trim().is_empty());
    let notes = request
        .notes
        .map(|notes| notes.trim().to_string())
        .filter(|notes| !notes.is_empty());

    if is_custom(diagnosis) {
        let plan = plan_override.ok_or(TreatmentError::MissingPlan)?;
        return Ok(TreatmentRecord {
            diagnosis: diagnosis.to_string(),
            plan,
            recommended: Vec::new(),
            prescribed,
            cost_tier: tier,
            cost: request.cost.unwrap_or(DEFAULT_CUSTOM_COST),
            custom: true,
            notes,
            recorded_at,
        });
    }

    let standard = catalog.plan(diagnosis)?;
    Ok(TreatmentRecord {
        diagnosis: standard.condition.clone(),
        plan: plan_override.unwrap_or_else(|| standard.plan.clone()),
        recommended: standard.medications.clone(),
        prescribed,
        cost_tier: tier,
        cost: standard.pricing.for_tier(tier),
        custom: false,
        notes,
        recorded_at,
    })
}
