use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum number of daily observations before a forecast is attempted.
pub const MIN_OBSERVATIONS: usize = 7;
pub const HORIZON_DAYS: i64 = 7;
const INTERVAL_Z: f64 = 1.96;

/// Resource series tracked on the monitoring dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Beds,
    Doctors,
    Nurses,
    Medications,
}

impl ResourceKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Beds => "Beds",
            Self::Doctors => "Doctors",
            Self::Nurses => "Nurses",
            Self::Medications => "Medications",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
}

/// Linear trend fitted by least squares over day offsets from the first observation.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Trend {
    intercept: f64,
    slope: f64,
    residual_std: f64,
}

impl Trend {
    fn fit(points: &[(f64, f64)]) -> Self {
        let n = points.len() as f64;
        let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
        let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

        let (covariance, variance) = points.iter().fold((0.0, 0.0), |(cov, var), (x, y)| {
            let dx = x - mean_x;
            (cov + dx * (y - mean_y), var + dx * dx)
        });

        let slope = if variance > 0.0 {
            covariance / variance
        } else {
            0.0
        };
        let intercept = mean_y - slope * mean_x;

        let squared_residuals: f64 = points
            .iter()
            .map(|(x, y)| {
                let residual = y - (intercept + slope * x);
                residual * residual
            })
            .sum();
        // Two parameters were estimated from the data.
        let degrees_of_freedom = points.len().saturating_sub(2).max(1) as f64;

        Self {
            intercept,
            slope,
            residual_std: (squared_residuals / degrees_of_freedom).sqrt(),
        }
    }

    fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Forecast the next [`HORIZON_DAYS`] days, or `None` with fewer than [`MIN_OBSERVATIONS`].
///
/// Predictions and interval bounds are floored at zero since resource counts cannot go negative.
pub fn forecast(history: &[Observation]) -> Option<Vec<ForecastPoint>> {
    let mut observations: Vec<Observation> = history
        .iter()
        .copied()
        .filter(|observation| observation.value.is_finite())
        .collect();
    if observations.len() < MIN_OBSERVATIONS {
        return None;
    }
    observations.sort_by_key(|observation| observation.date);

    let origin = observations.first()?.date;
    let last = observations.last()?.date;
    let points: Vec<(f64, f64)> = observations
        .iter()
        .map(|observation| {
            let offset = (observation.date - origin).num_days() as f64;
            (offset, observation.value)
        })
        .collect();
    let trend = Trend::fit(&points);
    let margin = INTERVAL_Z * trend.residual_std;

    let points = (1..=HORIZON_DAYS)
        .map(|step| {
            let date = last + Duration::days(step);
            let x = (date - origin).num_days() as f64;
            let yhat = trend.predict(x);
            ForecastPoint {
                date,
                yhat: yhat.max(0.0),
                yhat_lower: (yhat - margin).max(0.0),
                yhat_upper: (yhat + margin).max(0.0),
            }
        })
        .collect();

    Some(points)
}
