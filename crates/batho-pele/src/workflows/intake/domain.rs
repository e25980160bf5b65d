use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::assessment::IntakeAssessment;
use crate::workflows::treatment::TreatmentRecord;

/// Identifier wrapper for registered patients.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PatientId(pub String);

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Nationalities offered on the intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Nationality {
    SouthAfrican,
    Zimbabwean,
    Malawian,
    Mozambican,
    AsylumSeeker,
    Other,
}

impl Nationality {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::SouthAfrican,
            Self::Zimbabwean,
            Self::Malawian,
            Self::Mozambican,
            Self::AsylumSeeker,
            Self::Other,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::SouthAfrican => "South African",
            Self::Zimbabwean => "Zimbabwean",
            Self::Malawian => "Malawian",
            Self::Mozambican => "Mozambican",
            Self::AsylumSeeker => "Asylum Seeker",
            Self::Other => "Other",
        }
    }

    /// ISO country prefix printed on passports issued to this nationality.
    pub const fn passport_country_code(self) -> Option<&'static str> {
        match self {
            Self::SouthAfrican => Some("ZA"),
            Self::Zimbabwean => Some("ZW"),
            Self::Malawian => Some("MW"),
            Self::Mozambican => Some("MZ"),
            Self::AsylumSeeker | Self::Other => None,
        }
    }

    pub const fn is_south_african(self) -> bool {
        matches!(self, Self::SouthAfrican)
    }

    /// Lenient parse that accepts form labels, snake_case keys and the country names used by
    /// older intake screens. Anything unrecognised becomes `Other`.
    pub fn from_label(value: &str) -> Self {
        let normalized = normalize_key(value);
        match normalized.as_str() {
            "south_african" | "south_africa" | "rsa" | "za" => Self::SouthAfrican,
            "zimbabwean" | "zimbabwe" | "zw" => Self::Zimbabwean,
            "malawian" | "malawi" | "mw" => Self::Malawian,
            "mozambican" | "mozambique" | "mz" => Self::Mozambican,
            "asylum_seeker" | "refugee" => Self::AsylumSeeker,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for Nationality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for Nationality {
    fn from(value: String) -> Self {
        Self::from_label(&value)
    }
}

impl From<Nationality> for String {
    fn from(value: Nationality) -> Self {
        value.label().to_string()
    }
}

/// Identity document presented at the front desk.
///
/// `Permit` and `Asylum` are the values captured by the first intake screen; unrecognised
/// values are preserved so the validator can report them instead of silently coercing them.
/// `Asylum` is read as [`DocumentType::AsylumPermit`] and is written back as "Asylum Permit",
/// so that legacy label does not round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DocumentType {
    RsaId,
    Passport,
    AsylumPermit,
    Permit,
    NoDocument,
    Unrecognized(String),
}

impl DocumentType {
    pub fn label(&self) -> &str {
        match self {
            Self::RsaId => "RSA ID",
            Self::Passport => "Passport",
            Self::AsylumPermit => "Asylum Permit",
            Self::Permit => "Permit",
            Self::NoDocument => "No Document",
            Self::Unrecognized(raw) => raw.as_str(),
        }
    }

    pub fn from_label(value: &str) -> Self {
        match normalize_key(value).as_str() {
            "rsa_id" | "sa_id" | "id" => Self::RsaId,
            "passport" => Self::Passport,
            "asylum_permit" | "asylum_seeker_permit" | "asylum" => Self::AsylumPermit,
            "permit" => Self::Permit,
            "no_document" | "none" => Self::NoDocument,
            _ => Self::Unrecognized(value.trim().to_string()),
        }
    }

    /// Permit-class documents attest lawful residence without a national identity number.
    pub fn is_permit(&self) -> bool {
        matches!(self, Self::Permit | Self::AsylumPermit)
    }

    pub fn requires_number(&self) -> bool {
        !matches!(self, Self::NoDocument)
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for DocumentType {
    fn from(value: String) -> Self {
        Self::from_label(&value)
    }
}

impl From<DocumentType> for String {
    fn from(value: DocumentType) -> Self {
        value.label().to_string()
    }
}

/// Resolved legal status of a patient's presence and documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LegalStatus {
    Valid,
    Invalid,
    Pending,
    Unknown,
}

impl LegalStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Valid => "Valid",
            Self::Invalid => "Invalid",
            Self::Pending => "Pending",
            Self::Unknown => "Unknown",
        }
    }

    pub fn from_label(value: &str) -> Self {
        match normalize_key(value).as_str() {
            "valid" => Self::Valid,
            "invalid" => Self::Invalid,
            "pending" | "needs_review" | "needs_verification" => Self::Pending,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for LegalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for LegalStatus {
    fn from(value: String) -> Self {
        Self::from_label(&value)
    }
}

impl From<LegalStatus> for String {
    fn from(value: LegalStatus) -> Self {
        value.label().to_string()
    }
}

/// Raw intake form payload as captured at the front desk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeSubmission {
    pub full_name: String,
    pub nationality: Nationality,
    pub doc_type: DocumentType,
    #[serde(default)]
    pub doc_number: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub estimated_age: Option<u8>,
    #[serde(default)]
    pub medical_aid: Option<String>,
    #[serde(default)]
    pub conditions: Option<String>,
}

/// Either a recorded birth date or an estimate when the patient cannot supply one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BirthInfo {
    Recorded(NaiveDate),
    EstimatedAge(u8),
    Unknown,
}

impl BirthInfo {
    pub fn describe(&self) -> String {
        match self {
            BirthInfo::Recorded(date) => date.format("%Y-%m-%d").to_string(),
            BirthInfo::EstimatedAge(age) => format!("Estimated age: {age}"),
            BirthInfo::Unknown => "Unknown".to_string(),
        }
    }
}

/// Sanitized identity claim produced by the intake guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaim {
    pub full_name: String,
    pub nationality: Nationality,
    pub doc_type: DocumentType,
    pub doc_number: String,
    pub birth: BirthInfo,
    pub medical_aid: String,
    pub conditions: String,
}

/// A registered patient together with the assessment captured at intake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeRecord {
    pub patient_id: PatientId,
    pub claim: IdentityClaim,
    pub assessment: IntakeAssessment,
    pub recorded_at: NaiveDateTime,
    /// Treatments in the order they were recorded.
    #[serde(default)]
    pub visits: Vec<TreatmentRecord>,
}

impl IntakeRecord {
    pub fn needs_referral(&self) -> bool {
        self.assessment.legal_status == LegalStatus::Pending
    }

    pub fn latest_visit(&self) -> Option<&TreatmentRecord> {
        self.visits.last()
    }

    /// Visit by its 1-based number in the history.
    pub fn visit(&self, number: usize) -> Option<&TreatmentRecord> {
        number.checked_sub(1).and_then(|index| self.visits.get(index))
    }

    pub fn status_view(&self) -> IntakeStatusView {
        IntakeStatusView {
            patient_id: self.patient_id.clone(),
            full_name: self.claim.full_name.clone(),
            nationality: self.claim.nationality,
            doc_type: self.claim.doc_type.label().to_string(),
            legal_status: self.assessment.legal_status,
            eligibility: self.assessment.eligibility.label(),
            cost_tier: self.assessment.cost_tier.label(),
            validation: self.assessment.validation.summary(),
            needs_referral: self.needs_referral(),
            recorded_at: self.recorded_at,
            visits: self.visits.clone(),
        }
    }
}

/// Public projection of an intake record; the document number is intentionally absent.
#[derive(Debug, Clone, Serialize)]
pub struct IntakeStatusView {
    pub patient_id: PatientId,
    pub full_name: String,
    pub nationality: Nationality,
    pub doc_type: String,
    pub legal_status: LegalStatus,
    pub eligibility: &'static str,
    pub cost_tier: &'static str,
    pub validation: String,
    pub needs_referral: bool,
    pub recorded_at: NaiveDateTime,
    pub visits: Vec<TreatmentRecord>,
}

fn normalize_key(value: &str) -> String {
    value
        .trim()
        .to_ascii_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}
