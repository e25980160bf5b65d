use super::super::domain::{LegalStatus, Nationality};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pricing bracket applied to a treatment plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostTier {
    SaResidents,
    LegalImmigrants,
    IllegalImmigrants,
}

impl CostTier {
    pub const fn ordered() -> [Self; 3] {
        [
            Self::SaResidents,
            Self::LegalImmigrants,
            Self::IllegalImmigrants,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::SaResidents => "SA Residents",
            Self::LegalImmigrants => "Legal Immigrants",
            Self::IllegalImmigrants => "Illegal Immigrants",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        let key = value.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match key.as_str() {
            "sa_residents" | "sa_resident" => Some(Self::SaResidents),
            "legal_immigrants" | "legal_immigrant" => Some(Self::LegalImmigrants),
            "illegal_immigrants" | "illegal_immigrant" => Some(Self::IllegalImmigrants),
            _ => None,
        }
    }
}

impl fmt::Display for CostTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Resolve the pricing bracket. Evaluated independently of the eligibility category.
pub fn resolve_cost_tier(nationality: Nationality, legal_status: LegalStatus) -> CostTier {
    if nationality.is_south_african() {
        CostTier::SaResidents
    } else if legal_status == LegalStatus::Valid {
        CostTier::LegalImmigrants
    } else {
        CostTier::IllegalImmigrants
    }
}
