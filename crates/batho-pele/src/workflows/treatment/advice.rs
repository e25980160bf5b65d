use serde::Serialize;

use super::catalog::{TreatmentCatalog, TreatmentPlan};
use super::TreatmentError;

const GENERAL_RECOMMENDATIONS: [&str; 4] = [
    "Consider genetic testing for drug metabolism",
    "Review potential drug interactions",
    "Recommend follow-up in 2 weeks",
    "Consider telemedicine follow-up",
];

/// Clinical suggestion layered on top of the standard protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub kind: &'static str,
    pub recommendation: &'static str,
    pub evidence: &'static str,
}

/// Cheaper alternative to part of the standard protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CostSavingOption {
    pub option: &'static str,
    pub savings: &'static str,
    pub considerations: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreatmentAdvice {
    pub standard_plan: TreatmentPlan,
    pub recommendations: Vec<Recommendation>,
    pub cost_saving_options: Vec<CostSavingOption>,
}

/// Rule-based suggestions for a catalogued condition.
pub fn advise(
    catalog: &TreatmentCatalog,
    condition: &str,
) -> Result<TreatmentAdvice, TreatmentError> {
    let standard_plan = catalog.plan(condition)?.clone();
    let recommendations = recommendations_for(&standard_plan.condition);
    let cost_saving_options = cost_saving_options_for(&standard_plan.condition);

    Ok(TreatmentAdvice {
        standard_plan,
        recommendations,
        cost_saving_options,
    })
}

fn recommendations_for(condition: &str) -> Vec<Recommendation> {
    match condition {
        "Hypertension" => vec![Recommendation {
            kind: "Lifestyle Adjustment",
            recommendation: "Consider DASH diet and 30-min daily exercise",
            evidence: "Clinical studies show 8-14mmHg reduction",
        }],
        "Type 2 Diabetes" => vec![Recommendation {
            kind: "Medication Adjustment",
            recommendation: "Consider adding SGLT2 inhibitor if HbA1c > 8%",
            evidence: "Reduces cardiovascular risk by 30%",
        }],
        other => {
            // Stable per condition so repeated lookups agree.
            let seed: usize = other.bytes().map(usize::from).sum();
            let index = seed % GENERAL_RECOMMENDATIONS.len();
            vec![Recommendation {
                kind: "General Recommendation",
                recommendation: GENERAL_RECOMMENDATIONS[index],
                evidence: "Based on similar patient profiles",
            }]
        }
    }
}

fn cost_saving_options_for(condition: &str) -> Vec<CostSavingOption> {
    match condition {
        "Hypertension" => vec![CostSavingOption {
            option: "Use hydrochlorothiazide as first-line",
            savings: "R120/month vs. amlodipine",
            considerations: "Less effective in elderly",
        }],
        "Type 2 Diabetes" => vec![CostSavingOption {
            option: "Generic metformin instead of brand-name",
            savings: "R80/month",
            considerations: "Same active ingredient",
        }],
        _ => vec![CostSavingOption {
            option: "No specific cost-saving options identified",
            savings: "",
            considerations: "Standard protocol already cost-effective",
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hypertension_has_specific_advice() {
        let catalog = TreatmentCatalog::standard();
        let advice = advise(&catalog, "hypertension").expect("catalogued");
        assert_eq!(advice.recommendations[0].kind, "Lifestyle Adjustment");
        assert_eq!(
            advice.cost_saving_options[0].savings,
            "R120/month vs. amlodipine"
        );
    }

    #[test]
    fn general_advice_is_stable() {
        let catalog = TreatmentCatalog::standard();
        let first = advise(&catalog, "Asthma").expect("catalogued");
        let second = advise(&catalog, "Asthma").expect("catalogued");
        assert_eq!(first.recommendations, second.recommendations);
        assert_eq!(first.recommendations[0].kind, "General Recommendation");
        assert_eq!(
            first.cost_saving_options[0].option,
            "No specific cost-saving options identified"
        );
    }

    #[test]
    fn unknown_condition_has_no_advice() {
        let catalog = TreatmentCatalog::standard();
        assert!(matches!(
            advise(&catalog, "Gout"),
            Err(TreatmentError::UnknownCondition(_))
        ));
    }
}
