use serde::{Deserialize, Deserializer};
use std::io::Read;

use super::super::domain::{LegalStatus, Nationality};
use super::VerificationRecord;

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<VerificationRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut records = Vec::new();

    for row in csv_reader.deserialize::<VerificationRow>() {
        records.push(row?.into_record());
    }

    Ok(records)
}

pub(crate) fn write_records<W: std::io::Write>(
    writer: W,
    records: &[VerificationRecord],
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record([
        "id_number",
        "passport_number",
        "nationality",
        "full_name",
        "legal_status",
    ])?;

    for record in records {
        csv_writer.write_record([
            record.id_number.as_deref().unwrap_or(""),
            record.passport_number.as_deref().unwrap_or(""),
            record.nationality.label(),
            record.full_name.as_str(),
            record.legal_status.label(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

#[derive(Debug, Deserialize)]
struct VerificationRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    id_number: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    passport_number: Option<String>,
    nationality: String,
    #[serde(default)]
    full_name: String,
    #[serde(default)]
    legal_status: String,
}

impl VerificationRow {
    fn into_record(self) -> VerificationRecord {
        VerificationRecord {
            id_number: self.id_number,
            passport_number: self.passport_number,
            nationality: Nationality::from_label(&self.nationality),
            full_name: self.full_name,
            legal_status: LegalStatus::from_label(&self.legal_status),
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn blank_document_columns_become_none() {
        let csv = "id_number,passport_number,nationality,full_name,legal_status\n\
,ZW2023AB001,Zimbabwean,Tendai Moyo,Valid\n";
        let records = parse_records(Cursor::new(csv)).expect("parse");

        assert_eq!(records.len(), 1);
        assert!(records[0].id_number.is_none());
        assert_eq!(records[0].passport_number.as_deref(), Some("ZW2023AB001"));
        assert_eq!(records[0].nationality, Nationality::Zimbabwean);
        assert_eq!(records[0].legal_status, LegalStatus::Valid);
    }

    #[test]
    fn unknown_status_values_resolve_to_unknown() {
        let csv = "id_number,passport_number,nationality,full_name,legal_status\n\
9001011234087,,South African,Sipho Dlamini,Expired\n";
        let records = parse_records(Cursor::new(csv)).expect("parse");
        assert_eq!(records[0].legal_status, LegalStatus::Unknown);
    }

    #[test]
    fn written_records_parse_back() {
        let records = vec![VerificationRecord {
            id_number: None,
            passport_number: Some("MW2023CD002".to_string()),
            nationality: Nationality::Malawian,
            full_name: "Chikondi Banda".to_string(),
            legal_status: LegalStatus::Valid,
        }];
        let mut buffer = Vec::new();
        write_records(&mut buffer, &records).expect("write");

        let parsed = parse_records(Cursor::new(buffer)).expect("parse");
        assert_eq!(parsed, records);
    }
}
