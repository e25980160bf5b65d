mod policy;
mod tier;

pub use policy::{classify_eligibility, EligibilityOutcome};
pub use tier::{resolve_cost_tier, CostTier};
