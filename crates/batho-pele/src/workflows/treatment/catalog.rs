use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::TreatmentError;
use crate::workflows::intake::CostTier;

/// Diagnosis label that switches the prescription to a free-text plan.
pub const CUSTOM_DIAGNOSIS: &str = "Other";
/// Cost applied to custom plans when staff do not enter one.
pub const DEFAULT_CUSTOM_COST: u32 = 1_500;

/// One medication line in a treatment plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
}

impl Medication {
    pub fn new(name: &str, dosage: &str, frequency: &str) -> Self {
        Self {
            name: name.to_string(),
            dosage: dosage.to_string(),
            frequency: frequency.to_string(),
        }
    }

    pub fn describe(&self) -> String {
        [self.name.as_str(), self.dosage.as_str(), self.frequency.as_str()]
            .iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Rand price of a plan per cost tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierPricing {
    pub sa_residents: u32,
    pub legal_immigrants: u32,
    pub illegal_immigrants: u32,
}

impl TierPricing {
    pub const fn for_tier(&self, tier: CostTier) -> u32 {
        match tier {
            CostTier::SaResidents => self.sa_residents,
            CostTier::LegalImmigrants => self.legal_immigrants,
            CostTier::IllegalImmigrants => self.illegal_immigrants,
        }
    }
}

/// Standard protocol for a catalogued condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatmentPlan {
    pub condition: String,
    pub plan: String,
    pub medications: Vec<Medication>,
    pub pricing: TierPricing,
}

/// Standard plan priced for a specific tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreatmentQuote {
    pub condition: String,
    pub plan: String,
    pub medications: Vec<Medication>,
    pub cost_tier: CostTier,
    pub cost: u32,
}

/// Lookup table of standard treatment plans keyed by condition name.
#[derive(Debug, Clone)]
pub struct TreatmentCatalog {
    plans: BTreeMap<String, TreatmentPlan>,
}

impl Default for TreatmentCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl TreatmentCatalog {
    pub fn new(plans: impl IntoIterator<Item = TreatmentPlan>) -> Self {
        let plans = plans
            .into_iter()
            .map(|plan| (catalog_key(&plan.condition), plan))
            .collect();
        Self { plans }
    }

    /// Plans used by the public hospitals at launch.
    pub fn standard() -> Self {
        Self::new(standard_plans())
    }

    pub fn conditions(&self) -> Vec<&str> {
        self.plans
            .values()
            .map(|plan| plan.condition.as_str())
            .collect()
    }

    pub fn plans(&self) -> impl Iterator<Item = &TreatmentPlan> {
        self.plans.values()
    }

    /// Case-insensitive lookup by condition name.
    pub fn plan(&self, condition: &str) -> Result<&TreatmentPlan, TreatmentError> {
        self.plans
            .get(&catalog_key(condition))
            .ok_or_else(|| TreatmentError::UnknownCondition(condition.trim().to_string()))
    }

    pub fn quote(&self, condition: &str, tier: CostTier) -> Result<TreatmentQuote, TreatmentError> {
        let plan = self.plan(condition)?;
        Ok(TreatmentQuote {
            condition: plan.condition.clone(),
            plan: plan.plan.clone(),
            medications: plan.medications.clone(),
            cost_tier: tier,
            cost: plan.pricing.for_tier(tier),
        })
    }
}

pub(super) fn is_custom(diagnosis: &str) -> bool {
    diagnosis.trim().eq_ignore_ascii_case(CUSTOM_DIAGNOSIS)
}

fn catalog_key(condition: &str) -> String {
    condition.trim().to_ascii_lowercase()
}

fn plan(
    condition: &str,
    plan: &str,
    medications: Vec<Medication>,
    (sa_residents, legal_immigrants, illegal_immigrants): (u32, u32, u32),
) -> TreatmentPlan {
    TreatmentPlan {
        condition: condition.to_string(),
        plan: plan.to_string(),
        medications,
        pricing: TierPricing {
            sa_residents,
            legal_immigrants,
            illegal_immigrants,
        },
    }
}

fn standard_plans() -> Vec<TreatmentPlan> {
    vec![
        plan(
            "Hypertension",
            "Lifestyle changes (salt reduction, exercise, stress management) and medication based on severity",
            vec![
                Medication::new("Amlodipine", "5-10 mg", "Once daily"),
                Medication::new("Hydrochlorothiazide", "12.5-25 mg", "Once daily"),
                Medication::new("Enalapril/Losartan", "10-40 mg", "Once daily"),
            ],
            (0, 350, 800),
        ),
        plan(
            "Type 2 Diabetes",
            "Diet and lifestyle modification with oral hypoglycemics or insulin therapy",
            vec![
                Medication::new("Metformin", "500-1000 mg", "Twice daily"),
                Medication::new("Glibenclamide", "5 mg", "Once daily"),
                Medication::new("Insulin", "As prescribed", "As prescribed"),
            ],
            (0, 510, 1_150),
        ),
        plan(
            "HIV/AIDS",
            "Antiretroviral therapy (ART) with regular monitoring",
            vec![Medication::new(
                "Tenofovir + Emtricitabine + Efavirenz",
                "1 tablet",
                "Once daily",
            )],
            (0, 390, 870),
        ),
        plan(
            "Tuberculosis (TB)",
            "Directly observed therapy (DOT) for 6 months",
            vec![
                Medication::new("Isoniazid", "300 mg", "Daily"),
                Medication::new("Rifampicin", "600 mg", "Daily"),
                Medication::new("Pyrazinamide", "1500 mg", "Daily"),
                Medication::new("Ethambutol", "1200 mg", "Daily"),
            ],
            (0, 370, 850),
        ),
        plan(
            "Asthma",
            "Avoid triggers and regular use of inhalers",
            vec![
                Medication::new("Salbutamol Inhaler", "100 mcg/puff", "As needed"),
                Medication::new("Beclomethasone Inhaler", "100-200 mcg", "Twice daily"),
            ],
            (0, 270, 620),
        ),
        plan(
            "Common Infections",
            "Appropriate antibiotics with follow-up if symptoms persist",
            vec![
                Medication::new("Amoxicillin", "500 mg", "3 times daily"),
                Medication::new("Ciprofloxacin", "500 mg", "Twice daily"),
            ],
            (0, 190, 450),
        ),
        plan(
            "Mental Health",
            "Counseling/psychotherapy with medication if required",
            vec![
                Medication::new("Fluoxetine", "20 mg", "Once daily"),
                Medication::new("Amitriptyline", "25 mg", "Once daily"),
            ],
            (0, 370, 900),
        ),
    ]
}
