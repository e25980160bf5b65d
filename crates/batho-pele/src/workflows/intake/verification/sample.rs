use super::super::domain::{LegalStatus, Nationality};
use super::VerificationRecord;

const CITIZENS: &[(&str, &str)] = &[
    ("9001011234087", "Sipho Dlamini"),
    ("5502025052086", "Naledi Khumalo"),
    ("5711175053085", "Themba Nkosi"),
    ("8103035054084", "Lerato Mokoena"),
    ("5904045055083", "Zanele Mahlangu"),
];

const FOREIGN_NATIONALS: &[(&str, Nationality, &str)] = &[
    ("ZW2023AB001", Nationality::Zimbabwean, "Tendai Moyo"),
    ("MW2023CD002", Nationality::Malawian, "Chikondi Banda"),
    ("MZ2023EF003", Nationality::Mozambican, "Armando Cossa"),
    ("REF12345678", Nationality::AsylumSeeker, "Ahmed Abdi"),
    ("REF12345679", Nationality::AsylumSeeker, "Fatima Hussein"),
];

pub(super) fn records() -> Vec<VerificationRecord> {
    let citizens = CITIZENS.iter().map(|(id, name)| VerificationRecord {
        id_number: Some((*id).to_string()),
        passport_number: None,
        nationality: Nationality::SouthAfrican,
        full_name: (*name).to_string(),
        legal_status: LegalStatus::Valid,
    });

    let foreign = FOREIGN_NATIONALS
        .iter()
        .map(|(passport, nationality, name)| VerificationRecord {
            id_number: None,
            passport_number: Some((*passport).to_string()),
            nationality: *nationality,
            full_name: (*name).to_string(),
            legal_status: LegalStatus::Valid,
        });

    citizens.chain(foreign).collect()
}
