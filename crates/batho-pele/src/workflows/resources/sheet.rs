use serde::{Deserialize, Deserializer, Serialize};
use std::io::Read;
use std::path::Path;

use super::ResourceImportError;

/// Stock level as recorded by ward staff; free-text entries are preserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StockLevel {
    Count(u32),
    Note(String),
}

impl StockLevel {
    fn parse(raw: &str) -> Self {
        match raw.parse::<u32>() {
            Ok(count) => Self::Count(count),
            Err(_) => Self::Note(raw.to_string()),
        }
    }

    /// Count used in totals; notes such as "low" contribute nothing.
    pub fn units(&self) -> u32 {
        match self {
            Self::Count(count) => *count,
            Self::Note(_) => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationStock {
    pub name: String,
    pub stock: StockLevel,
}

/// Daily resource snapshot of one ward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WardResources {
    pub hospital: String,
    pub ward: String,
    pub total_beds: u32,
    pub available_beds: u32,
    pub medications: Vec<MedicationStock>,
    pub doctors: Vec<String>,
    pub nurses: Vec<String>,
}

/// Parsed resource sheet covering any number of hospitals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceSheet {
    wards: Vec<WardResources>,
}

impl ResourceSheet {
    pub fn new(wards: Vec<WardResources>) -> Self {
        Self { wards }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ResourceImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ResourceImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut wards = Vec::new();

        for (index, row) in csv_reader.deserialize::<ResourceRow>().enumerate() {
            // Header occupies line 1.
            wards.push(row?.into_ward(index + 2)?);
        }

        Ok(Self { wards })
    }

    pub fn wards(&self) -> &[WardResources] {
        &self.wards
    }

    pub fn is_empty(&self) -> bool {
        self.wards.is_empty()
    }

    /// Distinct hospital names in sheet order.
    pub fn hospitals(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for ward in &self.wards {
            if !seen.contains(&ward.hospital.as_str()) {
                seen.push(ward.hospital.as_str());
            }
        }
        seen
    }

    pub fn wards_for<'a>(&'a self, hospital: &'a str) -> impl Iterator<Item = &'a WardResources> {
        self.wards
            .iter()
            .filter(move |ward| ward.hospital == hospital)
    }
}

#[derive(Debug, Deserialize)]
struct ResourceRow {
    hospital: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    ward: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    total_beds: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    available_beds: Option<String>,
    #[serde(default)]
    medications: String,
    #[serde(default)]
    medication_stock: String,
    #[serde(default)]
    doctors: String,
    #[serde(default)]
    nurses: String,
}

impl ResourceRow {
    fn into_ward(self, line: usize) -> Result<WardResources, ResourceImportError> {
        let total_beds = parse_count(self.total_beds.as_deref(), "total_beds", line)?;
        let available_beds = parse_count(self.available_beds.as_deref(), "available_beds", line)?;
        if available_beds > total_beds {
            return Err(ResourceImportError::BedsExceedCapacity {
                line,
                available: available_beds,
                total: total_beds,
            });
        }

        // Extra names or stock entries without a partner are dropped.
        let medications = split_list(&self.medications)
            .into_iter()
            .zip(split_list(&self.medication_stock))
            .map(|(name, stock)| MedicationStock {
                stock: StockLevel::parse(&stock),
                name,
            })
            .collect();

        Ok(WardResources {
            hospital: self.hospital,
            ward: self.ward.unwrap_or_else(|| "Unknown".to_string()),
            total_beds,
            available_beds,
            medications,
            doctors: split_list(&self.doctors),
            nurses: split_list(&self.nurses),
        })
    }
}

fn parse_count(
    raw: Option<&str>,
    field: &'static str,
    line: usize,
) -> Result<u32, ResourceImportError> {
    match raw {
        None => Ok(0),
        Some(value) => value
            .parse::<u32>()
            .map_err(|_| ResourceImportError::InvalidCount {
                line,
                field,
                value: value.to_string(),
            }),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SHEET: &str = "\
hospital,ward,total_beds,available_beds,medications,medication_stock,doctors,nurses
Chris Hani Baragwanath,Ward A,40,10,\"Amoxicillin, Metformin\",\"120, low\",\"Dr Ndlovu, Dr Pillay\",\"Sr Mahlangu\"
Chris Hani Baragwanath,Ward B,0,0,,,,
Helen Joseph,Maternity,25,5,Amoxicillin,30,Dr Pillay,\"Sr Botha, Sr Dube\"
";

    #[test]
    fn parses_lists_and_stock_levels() {
        let sheet = ResourceSheet::from_reader(Cursor::new(SHEET)).expect("sheet parses");
        assert_eq!(sheet.wards().len(), 3);

        let ward_a = &sheet.wards()[0];
        assert_eq!(ward_a.doctors, vec!["Dr Ndlovu", "Dr Pillay"]);
        assert_eq!(ward_a.medications[0].stock, StockLevel::Count(120));
        assert_eq!(ward_a.medications[1].stock, StockLevel::Note("low".to_string()));
        assert_eq!(ward_a.medications[1].stock.units(), 0);
    }

    #[test]
    fn lists_hospitals_in_sheet_order() {
        let sheet = ResourceSheet::from_reader(Cursor::new(SHEET)).expect("sheet parses");
        assert_eq!(
            sheet.hospitals(),
            vec!["Chris Hani Baragwanath", "Helen Joseph"]
        );
        assert_eq!(sheet.wards_for("Helen Joseph").count(), 1);
    }

    #[test]
    fn rejects_non_numeric_bed_counts() {
        let csv = "hospital,ward,total_beds,available_beds\nTembisa,Ward C,forty,2\n";
        match ResourceSheet::from_reader(Cursor::new(csv)) {
            Err(ResourceImportError::InvalidCount { line, field, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(field, "total_beds");
            }
            other => panic!("expected invalid count, got {other:?}"),
        }
    }

    #[test]
    fn rejects_more_available_than_total_beds() {
        let csv = "hospital,ward,total_beds,available_beds\nTembisa,Ward C,4,6\n";
        assert!(matches!(
            ResourceSheet::from_reader(Cursor::new(csv)),
            Err(ResourceImportError::BedsExceedCapacity { .. })
        ));
    }
}
