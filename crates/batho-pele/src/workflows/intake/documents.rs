//! Structural validation of identity document numbers.
//!
//! Format and date checks are pure. A lookup against the [`VerificationSource`] happens only
//! when the document cannot certify itself: RSA IDs presented by non-citizens and passports.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::domain::{DocumentType, LegalStatus, Nationality};
use super::verification::{Lookup, VerificationError, VerificationSource};

const RSA_ID_LENGTH: usize = 13;
const ASYLUM_PERMIT_PREFIX: &str = "REF";
const ASYLUM_PERMIT_LENGTH: usize = 11;

/// Result of validating a single identity document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum ValidationOutcome {
    Valid(ValidationBasis),
    Invalid(InvalidReason),
    NeedsManualReview(ReviewReason),
    VerificationError(String),
    UnknownDocumentType,
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid(_))
    }

    pub fn summary(&self) -> String {
        match self {
            ValidationOutcome::Valid(basis) => format!("Valid ({})", basis.describe()),
            ValidationOutcome::Invalid(reason) => format!("Invalid ({})", reason.describe()),
            ValidationOutcome::NeedsManualReview(reason) => {
                format!("Needs Manual Review ({})", reason.describe())
            }
            ValidationOutcome::VerificationError(reason) => {
                format!("Verification error: {reason}")
            }
            ValidationOutcome::UnknownDocumentType => "Unknown document type".to_string(),
        }
    }

    /// Legal status implied by the validation result, before any consistency override.
    pub fn implied_legal_status(&self) -> LegalStatus {
        match self {
            ValidationOutcome::Valid(ValidationBasis::RecordMatch { legal_status, .. }) => {
                *legal_status
            }
            ValidationOutcome::Valid(_) => LegalStatus::Valid,
            ValidationOutcome::Invalid(_) => LegalStatus::Invalid,
            ValidationOutcome::NeedsManualReview(_) => LegalStatus::Pending,
            ValidationOutcome::VerificationError(_) | ValidationOutcome::UnknownDocumentType => {
                LegalStatus::Unknown
            }
        }
    }
}

/// Why a document was accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "basis", rename_all = "snake_case")]
pub enum ValidationBasis {
    /// A well-formed RSA ID presented by a South African citizen.
    SelfCertified,
    /// A well-formed asylum-seeker permit reference.
    PermitFormat,
    /// Found in the verification table.
    RecordMatch {
        full_name: String,
        legal_status: LegalStatus,
    },
}

impl ValidationBasis {
    pub fn describe(&self) -> String {
        match self {
            ValidationBasis::SelfCertified => "citizen ID self-certified".to_string(),
            ValidationBasis::PermitFormat => "asylum permit reference".to_string(),
            ValidationBasis::RecordMatch { legal_status, .. } => {
                format!("matched verification record, status {legal_status}")
            }
        }
    }
}

/// Specific, correctable reason for rejecting a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum InvalidReason {
    InvalidFormat,
    InvalidDate,
    MissingPrefix {
        prefix: String,
    },
    CountryCodeMismatch {
        found: String,
        expected: String,
        nationality: Nationality,
    },
    NotFoundInRecords,
}

impl InvalidReason {
    pub fn describe(&self) -> String {
        match self {
            InvalidReason::InvalidFormat => "Invalid format".to_string(),
            InvalidReason::InvalidDate => "Invalid date".to_string(),
            InvalidReason::MissingPrefix { prefix } => format!("Must start with {prefix}"),
            InvalidReason::CountryCodeMismatch {
                found, nationality, ..
            } => format!("Country code {found} doesn't match {nationality}"),
            InvalidReason::NotFoundInRecords => "Not found in records".to_string(),
        }
    }
}

/// Ambiguous validation results that a person has to adjudicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ReviewReason {
    EmptyVerificationTable,
}

impl ReviewReason {
    pub fn describe(&self) -> String {
        match self {
            ReviewReason::EmptyVerificationTable => "Empty database".to_string(),
        }
    }
}

/// Parsed components of a well-formed RSA identity number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RsaIdNumber {
    pub birth_year: u8,
    pub birth_month: u8,
    pub birth_day: u8,
}

impl RsaIdNumber {
    pub fn parse(doc_number: &str) -> Result<Self, InvalidReason> {
        if doc_number.len() != RSA_ID_LENGTH || !doc_number.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidReason::InvalidFormat);
        }

        let bytes = doc_number.as_bytes();
        let two_digits = |offset: usize| (bytes[offset] - b'0') * 10 + (bytes[offset + 1] - b'0');
        let parsed = Self {
            birth_year: two_digits(0),
            birth_month: two_digits(2),
            birth_day: two_digits(4),
        };

        if !(1..=12).contains(&parsed.birth_month) || !(1..=31).contains(&parsed.birth_day) {
            return Err(InvalidReason::InvalidDate);
        }

        Ok(parsed)
    }
}

/// Country code and serial of a well-formed passport number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassportNumber {
    pub country_code: String,
    pub serial: String,
}

impl PassportNumber {
    /// The serial must be alphanumeric and start with a digit; issuing offices embed batch
    /// letters after the issue year (e.g. `ZW2023AB001`).
    pub fn parse(doc_number: &str) -> Result<Self, InvalidReason> {
        if doc_number.len() < 3 || !doc_number.is_ascii() {
            return Err(InvalidReason::InvalidFormat);
        }

        let (code, serial) = doc_number.split_at(2);
        if !code.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(InvalidReason::InvalidFormat);
        }

        let serial_ok = serial.bytes().all(|b| b.is_ascii_alphanumeric())
            && serial.bytes().next().is_some_and(|b| b.is_ascii_digit());
        if !serial_ok {
            return Err(InvalidReason::InvalidFormat);
        }

        Ok(Self {
            country_code: code.to_ascii_uppercase(),
            serial: serial.to_string(),
        })
    }
}

/// Check an asylum-seeker permit reference of the form `REF` followed by eight digits.
pub fn check_asylum_permit(doc_number: &str) -> Result<(), InvalidReason> {
    let Some(digits) = doc_number.strip_prefix(ASYLUM_PERMIT_PREFIX) else {
        return Err(InvalidReason::MissingPrefix {
            prefix: ASYLUM_PERMIT_PREFIX.to_string(),
        });
    };

    if doc_number.len() != ASYLUM_PERMIT_LENGTH || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InvalidReason::InvalidFormat);
    }

    Ok(())
}

/// Validator bound to a verification source.
pub struct DocumentValidator<'a> {
    source: &'a dyn VerificationSource,
}

impl<'a> DocumentValidator<'a> {
    pub fn new(source: &'a dyn VerificationSource) -> Self {
        Self { source }
    }

    pub fn validate(
        &self,
        doc_type: &DocumentType,
        doc_number: &str,
        nationality: Nationality,
    ) -> ValidationOutcome {
        match doc_type {
            DocumentType::RsaId => self.validate_rsa_id(doc_number, nationality),
            DocumentType::Passport => self.validate_passport(doc_number, nationality),
            DocumentType::AsylumPermit => match check_asylum_permit(doc_number) {
                Ok(()) => ValidationOutcome::Valid(ValidationBasis::PermitFormat),
                Err(reason) => ValidationOutcome::Invalid(reason),
            },
            DocumentType::Permit | DocumentType::NoDocument | DocumentType::Unrecognized(_) => {
                ValidationOutcome::UnknownDocumentType
            }
        }
    }

    fn validate_rsa_id(&self, doc_number: &str, nationality: Nationality) -> ValidationOutcome {
        if let Err(reason) = RsaIdNumber::parse(doc_number) {
            return ValidationOutcome::Invalid(reason);
        }

        if nationality.is_south_african() {
            return ValidationOutcome::Valid(ValidationBasis::SelfCertified);
        }

        self.lookup(|source| source.find_by_id_number(doc_number))
    }

    fn validate_passport(&self, doc_number: &str, nationality: Nationality) -> ValidationOutcome {
        let passport = match PassportNumber::parse(doc_number) {
            Ok(passport) => passport,
            Err(reason) => return ValidationOutcome::Invalid(reason),
        };

        if let Some(expected) = nationality.passport_country_code() {
            if passport.country_code != expected {
                return ValidationOutcome::Invalid(InvalidReason::CountryCodeMismatch {
                    found: passport.country_code,
                    expected: expected.to_string(),
                    nationality,
                });
            }
        }

        self.lookup(|source| source.find_by_passport(doc_number, nationality))
    }

    fn lookup<F>(&self, query: F) -> ValidationOutcome
    where
        F: FnOnce(&dyn VerificationSource) -> Result<Lookup, VerificationError>,
    {
        match query(self.source) {
            Ok(Lookup::Found(record)) => ValidationOutcome::Valid(ValidationBasis::RecordMatch {
                full_name: record.full_name,
                legal_status: record.legal_status,
            }),
            Ok(Lookup::NotFound) => ValidationOutcome::Invalid(InvalidReason::NotFoundInRecords),
            Ok(Lookup::EmptyTable) => {
                ValidationOutcome::NeedsManualReview(ReviewReason::EmptyVerificationTable)
            }
            Err(err) => {
                warn!(error = %err, "verification lookup failed");
                ValidationOutcome::VerificationError(err.to_string())
            }
        }
    }
}

/// Validate `doc_number` as a document of `doc_type` presented by a patient of `nationality`.
pub fn validate_document(
    doc_type: &DocumentType,
    doc_number: &str,
    nationality: Nationality,
    source: &dyn VerificationSource,
) -> ValidationOutcome {
    DocumentValidator::new(source).validate(doc_type, doc_number, nationality)
}
