use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::sheet::{MedicationStock, ResourceSheet, WardResources};

/// Per-ward dashboard card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WardView {
    pub ward: String,
    pub available_beds: u32,
    pub total_beds: u32,
    pub availability_pct: f64,
    pub doctors: Vec<String>,
    pub nurses: Vec<String>,
    pub medication_stock: Vec<MedicationStock>,
}

impl From<&WardResources> for WardView {
    fn from(ward: &WardResources) -> Self {
        Self {
            ward: ward.ward.clone(),
            available_beds: ward.available_beds,
            total_beds: ward.total_beds,
            availability_pct: availability_pct(ward.available_beds, ward.total_beds),
            doctors: ward.doctors.clone(),
            nurses: ward.nurses.clone(),
            medication_stock: ward.medications.clone(),
        }
    }
}

/// Daily totals across every ward of a hospital.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HospitalSummary {
    pub hospital: String,
    pub available_beds: u32,
    pub total_beds: u32,
    pub doctors_on_duty: Vec<String>,
    pub nurses_on_duty: Vec<String>,
    pub medication_totals: BTreeMap<String, u32>,
    pub wards: Vec<WardView>,
}

/// Percentage of beds free, rounded to one decimal place; zero when the ward has no beds.
pub fn availability_pct(available: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let pct = f64::from(available) / f64::from(total) * 100.0;
    (pct * 10.0).round() / 10.0
}

pub fn summarize_hospital(sheet: &ResourceSheet, hospital: &str) -> Option<HospitalSummary> {
    let wards: Vec<&WardResources> = sheet.wards_for(hospital).collect();
    if wards.is_empty() {
        return None;
    }

    let mut doctors = BTreeSet::new();
    let mut nurses = BTreeSet::new();
    let mut medication_totals: BTreeMap<String, u32> = BTreeMap::new();
    let mut available_beds = 0u32;
    let mut total_beds = 0u32;

    for ward in &wards {
        available_beds = available_beds.saturating_add(ward.available_beds);
        total_beds = total_beds.saturating_add(ward.total_beds);
        doctors.extend(ward.doctors.iter().cloned());
        nurses.extend(ward.nurses.iter().cloned());
        for medication in &ward.medications {
            let total = medication_totals.entry(medication.name.clone()).or_default();
            *total = total.saturating_add(medication.stock.units());
        }
    }

    Some(HospitalSummary {
        hospital: hospital.to_string(),
        available_beds,
        total_beds,
        doctors_on_duty: doctors.into_iter().collect(),
        nurses_on_duty: nurses.into_iter().collect(),
        medication_totals,
        wards: wards.into_iter().map(WardView::from).collect(),
    })
}

pub fn summarize_all(sheet: &ResourceSheet) -> Vec<HospitalSummary> {
    sheet
        .hospitals()
        .into_iter()
        .filter_map(|hospital| summarize_hospital(sheet, hospital))
        .collect()
}
