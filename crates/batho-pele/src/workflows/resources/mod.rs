//! Ward resource monitoring: daily sheets, hospital summaries and short-horizon forecasts.

mod forecast;
mod sheet;
mod summary;

pub use forecast::{forecast, ForecastPoint, Observation, ResourceKind, HORIZON_DAYS, MIN_OBSERVATIONS};
pub use sheet::{MedicationStock, ResourceSheet, StockLevel, WardResources};
pub use summary::{
    availability_pct, summarize_all, summarize_hospital, HospitalSummary, WardView,
};

#[derive(Debug)]
pub enum ResourceImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidCount {
        line: usize,
        field: &'static str,
        value: String,
    },
    BedsExceedCapacity {
        line: usize,
        available: u32,
        total: u32,
    },
}

impl std::fmt::Display for ResourceImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceImportError::Io(err) => write!(f, "failed to read resource sheet: {}", err),
            ResourceImportError::Csv(err) => write!(f, "invalid resource sheet CSV: {}", err),
            ResourceImportError::InvalidCount { line, field, value } => write!(
                f,
                "line {}: {} must be a whole number, found `{}`",
                line, field, value
            ),
            ResourceImportError::BedsExceedCapacity {
                line,
                available,
                total,
            } => write!(
                f,
                "line {}: {} available beds exceeds ward capacity of {}",
                line, available, total
            ),
        }
    }
}

impl std::error::Error for ResourceImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResourceImportError::Io(err) => Some(err),
            ResourceImportError::Csv(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ResourceImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ResourceImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}
