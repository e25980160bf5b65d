//! Resource sheet import, hospital summaries and bed forecasts as used by the monitoring
//! dashboard.

use batho_pele::workflows::resources::{
    forecast, summarize_all, summarize_hospital, Observation, ResourceImportError,
    ResourceSheet, StockLevel, HORIZON_DAYS,
};
use chrono::{Duration, NaiveDate};
use std::io::Cursor;

const DAILY_SHEET: &str = "\
hospital,ward,total_beds,available_beds,medications,medication_stock,doctors,nurses
Chris Hani Baragwanath,Casualty,60,4,\"Paracetamol, Ceftriaxone\",\"400, 25\",\"Dr Mokoena, Dr Naidoo\",\"Sr Sithole, Sr Mabena\"
Chris Hani Baragwanath,Paediatrics,30,12,\"Paracetamol, ORS sachets\",\"150, out of stock\",Dr Naidoo,Sr Sithole
Tembisa Provincial,Maternity,45,9,Oxytocin,80,Dr van Wyk,\"Sr Khoza, Sr Radebe\"
";

fn sheet() -> ResourceSheet {
    ResourceSheet::from_reader(Cursor::new(DAILY_SHEET)).expect("sheet parses")
}

#[test]
fn hospital_totals_merge_wards() {
    let summary = summarize_hospital(&sheet(), "Chris Hani Baragwanath").expect("hospital listed");

    assert_eq!(summary.total_beds, 90);
    assert_eq!(summary.available_beds, 16);
    assert_eq!(summary.doctors_on_duty, vec!["Dr Mokoena", "Dr Naidoo"]);
    assert_eq!(summary.nurses_on_duty, vec!["Sr Mabena", "Sr Sithole"]);
    assert_eq!(summary.medication_totals.get("Paracetamol"), Some(&550));
    assert_eq!(summary.medication_totals.get("ORS sachets"), Some(&0));

    let paediatrics = &summary.wards[1];
    assert_eq!(paediatrics.availability_pct, 40.0);
    assert_eq!(
        paediatrics.medication_stock[1].stock,
        StockLevel::Note("out of stock".to_string())
    );
}

#[test]
fn every_hospital_gets_a_summary_in_sheet_order() {
    let summaries = summarize_all(&sheet());
    let names: Vec<_> = summaries.iter().map(|s| s.hospital.as_str()).collect();
    assert_eq!(names, vec!["Chris Hani Baragwanath", "Tembisa Provincial"]);
    assert_eq!(summaries[1].wards[0].availability_pct, 20.0);
}

#[test]
fn malformed_rows_report_their_line() {
    let csv = "hospital,ward,total_beds,available_beds\nTembisa Provincial,Ward 2,12,3\nTembisa Provincial,Ward 3,ten,1\n";
    match ResourceSheet::from_reader(Cursor::new(csv)) {
        Err(err @ ResourceImportError::InvalidCount { .. }) => {
            assert!(err.to_string().starts_with("line 3:"), "{err}");
        }
        other => panic!("expected invalid count, got {other:?}"),
    }
}

#[test]
fn bed_forecast_follows_the_weekly_trend() {
    let start = NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date");
    let history: Vec<Observation> = (0..14)
        .map(|day| Observation {
            date: start + Duration::days(day),
            value: 40.0 - day as f64,
        })
        .collect();

    let points = forecast(&history).expect("two weeks of history");
    assert_eq!(points.len() as i64, HORIZON_DAYS);
    assert_eq!(points[0].date, start + Duration::days(14));
    assert!((points[0].yhat - 26.0).abs() < 1e-9);
    assert!(points.windows(2).all(|pair| pair[1].yhat < pair[0].yhat));
}
