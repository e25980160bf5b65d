use std::fmt::Write as _;

use chrono::NaiveDate;
use serde::Serialize;

use super::prescription::TreatmentRecord;
use crate::workflows::intake::IdentityClaim;

const INVOICE_HEADER: &str = "BATHO PELE HEALTHCARE INITIATIVE";
const RULE: &str = "---------------------------------";

/// Invoice issued for a recorded treatment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invoice {
    pub issued_on: NaiveDate,
    pub patient_name: String,
    pub nationality: String,
    pub document: String,
    pub doc_number: String,
    pub diagnosis: String,
    pub treatment: String,
    pub medication: String,
    pub total_cost: u32,
    pub total_display: String,
}

impl Invoice {
    pub fn new(claim: &IdentityClaim, treatment: &TreatmentRecord, issued_on: NaiveDate) -> Self {
        Self {
            issued_on,
            patient_name: claim.full_name.clone(),
            nationality: claim.nationality.label().to_string(),
            document: format!("{} {}", claim.doc_type.label(), claim.doc_number)
                .trim()
                .to_string(),
            doc_number: claim.doc_number.clone(),
            diagnosis: treatment.diagnosis.clone(),
            treatment: treatment.plan.clone(),
            medication: treatment.medication_line(),
            total_cost: treatment.cost,
            total_display: format_rand(treatment.cost),
        }
    }

    /// Plain-text rendition handed to patients at discharge.
    pub fn render(&self) -> String {
        let mut text = String::new();
        let _ = writeln!(text, "{INVOICE_HEADER}");
        let _ = writeln!(text, "{RULE}");
        let _ = writeln!(text, "Invoice Date: {}", self.issued_on.format("%Y-%m-%d"));
        let _ = writeln!(text, "Patient: {}", self.patient_name);
        let _ = writeln!(text, "ID: {}", self.doc_number);
        let _ = writeln!(text, "{RULE}");
        let _ = writeln!(text, "Diagnosis: {}", self.diagnosis);
        let _ = writeln!(text, "Treatment: {}", self.treatment);
        let _ = writeln!(text, "Medication: {}", self.medication);
        let _ = writeln!(text, "{RULE}");
        let _ = write!(text, "TOTAL COST: {}", self.total_display);
        text
    }

    pub fn file_name(&self) -> String {
        let slug = self
            .patient_name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_");
        format!("invoice_{slug}_{}.txt", self.issued_on.format("%Y%m%d"))
    }
}

/// Format whole Rand as `R1,150.00`.
pub fn format_rand(amount: u32) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!("R{grouped}.00")
}
