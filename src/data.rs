use crate::types::{Borough, BoroughWeek, HospitalWeek};
use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use geo::MultiPolygon;
use geojson::GeoJson;
use std::collections::HashMap;
use std::convert::TryInto;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

// Property keys that NYC borough GeoJSON exports use for the borough name.
const NAME_KEYS: [&str; 4] = ["boro_name", "BoroName", "name", "borough"];

pub fn load_boroughs(path: &Path) -> Result<Vec<Borough>> {
    println!("Loading borough boundaries from {:?}...", path);
    let file = File::open(path)
        .with_context(|| format!("Failed to open GeoJSON file: {:?}", path))?;
    let boroughs = boroughs_from_reader(BufReader::new(file))?;
    println!("Loaded {} borough features", boroughs.len());
    Ok(boroughs)
}

pub fn boroughs_from_reader<R: Read>(reader: R) -> Result<Vec<Borough>> {
    let geojson = GeoJson::from_reader(reader).context("Failed to parse GeoJSON")?;

    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => return Err(anyhow!("Borough GeoJSON must be a FeatureCollection")),
    };

    let mut boroughs = Vec::new();

    for feature in collection.features {
        let name = feature
            .properties
            .as_ref()
            .and_then(|props| {
                NAME_KEYS.iter().find_map(|key| match props.get(*key) {
                    Some(serde_json::Value::String(s)) => Some(s.clone()),
                    _ => None,
                })
            })
            .unwrap_or_default();

        let geometry = match feature.geometry {
            Some(geom) => {
                let converted: geo::Geometry<f64> = geom
                    .value
                    .try_into()
                    .map_err(|e| anyhow!("Failed to convert geojson geometry: {:?}", e))?;

                match converted {
                    geo::Geometry::MultiPolygon(mp) => mp,
                    geo::Geometry::Polygon(p) => MultiPolygon::new(vec![p]),
                    _ => continue, // skip points/lines
                }
            }
            None => continue,
        };

        boroughs.push(Borough { name, geometry });
    }

    Ok(boroughs)
}

pub fn load_hospitals(path: &Path) -> Result<Vec<HospitalWeek>> {
    println!("Loading hospital-week rows from {:?}...", path);
    let file = File::open(path)
        .with_context(|| format!("Failed to open CSV file: {:?}", path))?;
    let rows = hospitals_from_reader(file)?;
    println!("Loaded {} hospital-week rows", rows.len());
    Ok(rows)
}

pub fn hospitals_from_reader<R: Read>(reader: R) -> Result<Vec<HospitalWeek>> {
    let mut rdr = ReaderBuilder::new().from_reader(reader);
    let headers = rdr.headers()?.clone();
    let col = column_index(&headers);

    let name_idx = col("hospital_name")?;
    let lon_idx = col("longitude")?;
    let lat_idx = col("latitude")?;
    let week_idx = col("collection_week")?;
    let total_idx = col("total_icu_beds_7_day_avg")?;
    let used_idx = col("icu_beds_used_7_day_avg")?;
    let pct_idx = col("icu_beds_used_pct_7_day_avg")?;

    let mut rows = Vec::new();

    for result in rdr.records() {
        let record = result?;
        // numeric fields degrade to NaN instead of erroring, matching the
        // original's coerce-to-number semantics
        let number = |idx: usize| -> f64 {
            record.get(idx).unwrap_or("").parse().unwrap_or(f64::NAN)
        };

        rows.push(HospitalWeek {
            hospital_name: record.get(name_idx).unwrap_or("").to_string(),
            longitude: number(lon_idx),
            latitude: number(lat_idx),
            collection_week: record.get(week_idx).unwrap_or("").to_string(),
            total_icu_beds_7_day_avg: number(total_idx),
            icu_beds_used_7_day_avg: number(used_idx),
            icu_beds_used_pct_7_day_avg: number(pct_idx),
        });
    }

    Ok(rows)
}

pub fn load_borough_weeks(path: &Path) -> Result<Vec<BoroughWeek>> {
    println!("Loading borough-week rows from {:?}...", path);
    let file = File::open(path)
        .with_context(|| format!("Failed to open CSV file: {:?}", path))?;
    let rows = borough_weeks_from_reader(file)?;
    println!("Loaded {} borough-week rows", rows.len());
    Ok(rows)
}

pub fn borough_weeks_from_reader<R: Read>(reader: R) -> Result<Vec<BoroughWeek>> {
    let mut rdr = ReaderBuilder::new().from_reader(reader);
    let headers = rdr.headers()?.clone();
    let col = column_index(&headers);

    let borough_idx = col("Borough")?;
    let week_idx = col("collection_week")?;
    let pct_idx = col("icu_beds_used_pct_7_day_avg")?;

    let mut rows = Vec::new();

    for result in rdr.records() {
        let record = result?;

        // rows whose week does not parse as a date are dropped, not errors
        let date = match NaiveDate::parse_from_str(record.get(week_idx).unwrap_or(""), "%Y-%m-%d") {
            Ok(d) => d,
            Err(_) => continue,
        };

        rows.push(BoroughWeek {
            borough: record.get(borough_idx).unwrap_or("").to_string(),
            date,
            icu_beds_used_pct_7_day_avg: record
                .get(pct_idx)
                .unwrap_or("")
                .parse()
                .unwrap_or(f64::NAN),
        });
    }

    Ok(rows)
}

fn column_index(headers: &csv::StringRecord) -> impl Fn(&str) -> Result<usize> + '_ {
    let positions: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.to_string(), i))
        .collect();
    move |name: &str| {
        positions
            .get(name)
            .copied()
            .ok_or_else(|| anyhow!("Column '{}' not found in CSV header", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOSPITAL_CSV: &str = "\
hospital_name,longitude,latitude,collection_week,total_icu_beds_7_day_avg,icu_beds_used_7_day_avg,icu_beds_used_pct_7_day_avg
Kings County,-73.945,40.656,2021/03/12,10,5,0.5
Elmhurst,-73.886,40.744,2021/03/05,20,n/a,0.9
";

    const BOROUGH_CSV: &str = "\
Borough,collection_week,icu_beds_used_pct_7_day_avg
Brooklyn,2021-01-08,0.85
Brooklyn,not-a-date,0.90
Queens,2021-01-08,0.75
";

    const GEOJSON: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"boro_name": "Brooklyn"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[-74.0, 40.6], [-73.9, 40.6], [-73.9, 40.7], [-74.0, 40.6]]]
                }
            },
            {
                "type": "Feature",
                "properties": {"boro_name": "Null Island"},
                "geometry": {"type": "Point", "coordinates": [0.0, 0.0]}
            }
        ]
    }"#;

    #[test]
    fn hospital_rows_parse_with_nan_degradation() {
        let rows = hospitals_from_reader(HOSPITAL_CSV.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].hospital_name, "Kings County");
        assert_eq!(rows[0].collection_week, "2021/03/12");
        assert_eq!(rows[0].total_icu_beds_7_day_avg, 10.0);
        // "n/a" coerces to NaN rather than failing the load
        assert!(rows[1].icu_beds_used_7_day_avg.is_nan());
    }

    #[test]
    fn missing_column_is_an_error() {
        let result = hospitals_from_reader("hospital_name,longitude\nA,-73.9\n".as_bytes());
        assert!(result.is_err());
    }

    #[test]
    fn borough_rows_drop_unparseable_dates() {
        let rows = borough_weeks_from_reader(BOROUGH_CSV.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].borough, "Brooklyn");
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2021, 1, 8).unwrap());
        assert_eq!(rows[1].borough, "Queens");
    }

    #[test]
    fn geojson_polygons_load_and_points_are_skipped() {
        let boroughs = boroughs_from_reader(GEOJSON.as_bytes()).unwrap();
        assert_eq!(boroughs.len(), 1);
        assert_eq!(boroughs[0].name, "Brooklyn");
        assert_eq!(boroughs[0].geometry.0.len(), 1);
    }
}
