use chrono::NaiveDate;
use geo::MultiPolygon;

#[derive(Debug, Clone)]
pub struct Borough {
    pub name: String,
    pub geometry: MultiPolygon<f64>,
}

/// One hospital-week row from the nyc_icu CSV. The bed fields are 7-day
/// averages pre-aggregated upstream; NaN means the source cell did not parse
/// as a number.
#[derive(Debug, Clone, PartialEq)]
pub struct HospitalWeek {
    pub hospital_name: String,
    pub longitude: f64,
    pub latitude: f64,
    // kept as the raw string, the map filter compares byte-for-byte
    pub collection_week: String,
    pub total_icu_beds_7_day_avg: f64,
    pub icu_beds_used_7_day_avg: f64,
    pub icu_beds_used_pct_7_day_avg: f64,
}

#[derive(Debug, Clone)]
pub struct BoroughWeek {
    pub borough: String,
    pub date: NaiveDate,
    pub icu_beds_used_pct_7_day_avg: f64,
}

/// A hospital circle after projection and encoding, ready to render or
/// hit-test.
#[derive(Debug, Clone)]
pub struct HospitalMark {
    pub record: HospitalWeek,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub fill: String,
}

/// One borough's polyline in the trend chart.
#[derive(Debug, Clone)]
pub struct BoroughSeries {
    pub key: String,
    pub label: String,
    pub color: String,
    pub points: Vec<(f64, f64)>,
    pub endpoint: (f64, f64),
}
