use crate::config::{MapConfig, TrendConfig};
use crate::projection::Mercator;
use crate::scale::{LinearScale, OrdinalScale, SequentialScale, SqrtScale};
use crate::types::{BoroughSeries, BoroughWeek, HospitalMark, HospitalWeek};
use chrono::Datelike;

/// Order-preserving subsequence of rows whose collection week matches the
/// target string exactly. No match means no circles, not an error.
pub fn filter_week<'a>(rows: &'a [HospitalWeek], week: &str) -> Vec<&'a HospitalWeek> {
    rows.iter().filter(|r| r.collection_week == week).collect()
}

/// Lower-cased, non-letters stripped. The single source of truth for
/// grouping keys, color keys and CSS class names.
pub fn normalize_key(raw: &str) -> String {
    raw.to_lowercase().chars().filter(|c| c.is_ascii_alphabetic()).collect()
}

#[derive(Debug, Clone)]
pub struct BoroughGroup {
    pub key: String,
    pub label: String,
    pub rows: Vec<BoroughWeek>,
}

/// Stable partition by normalized borough key: rows keep their relative
/// order inside each group, groups appear in first-seen key order.
pub fn group_by_borough(rows: &[BoroughWeek]) -> Vec<BoroughGroup> {
    let mut groups: Vec<BoroughGroup> = Vec::new();

    for row in rows {
        let key = normalize_key(&row.borough);
        match groups.iter_mut().find(|g| g.key == key) {
            Some(group) => group.rows.push(row.clone()),
            None => groups.push(BoroughGroup {
                key,
                label: row.borough.clone(),
                rows: vec![row.clone()],
            }),
        }
    }

    groups
}

/// Map pipeline: filter to the target week, then position, size and color
/// one circle per hospital.
pub fn build_hospital_marks(
    rows: &[HospitalWeek],
    map: &MapConfig,
    projection: &Mercator,
) -> Vec<HospitalMark> {
    let latest = filter_week(rows, &map.target_week);

    // NaN bed counts drop out of the max, an empty set leaves a zero-width
    // domain and every radius collapses to 0
    let max_beds = latest
        .iter()
        .map(|r| r.total_icu_beds_7_day_avg)
        .fold(0.0, |acc: f64, v| if v > acc { v } else { acc });

    let radius = SqrtScale::new((0.0, max_beds), (0.0, 1.0));
    let color = SequentialScale::rd_yl_bu();

    latest
        .into_iter()
        .map(|record| {
            let (x, y) = projection.project(record.longitude, record.latitude);
            HospitalMark {
                x,
                y,
                radius: radius.scale(record.total_icu_beds_7_day_avg),
                // invert before the lookup so fuller hospitals read red
                fill: color.scale(1.0 - record.icu_beds_used_pct_7_day_avg),
                record: record.clone(),
            }
        })
        .collect()
}

pub fn date_to_x(date: chrono::NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

/// Time scale over the full extent of the rows' dates.
pub fn time_scale(rows: &[BoroughWeek], trend: &TrendConfig) -> LinearScale {
    let min = rows.iter().map(|r| date_to_x(r.date)).fold(f64::INFINITY, f64::min);
    let max = rows.iter().map(|r| date_to_x(r.date)).fold(f64::NEG_INFINITY, f64::max);
    LinearScale::new((min, max), (0.0, trend.inner_width()))
}

pub fn percent_scale(trend: &TrendConfig) -> LinearScale {
    LinearScale::new((0.0, 1.0), (trend.inner_height(), 0.0))
}

/// Trend pipeline: one polyline per borough through its time-ordered rows,
/// with the endpoint circle and trailing label at the last row's value.
pub fn build_borough_series(rows: &[BoroughWeek], trend: &TrendConfig) -> Vec<BoroughSeries> {
    let x = time_scale(rows, trend);
    let y = percent_scale(trend);
    let mut color = OrdinalScale::category10();

    group_by_borough(rows)
        .into_iter()
        .map(|group| {
            let points: Vec<(f64, f64)> = group
                .rows
                .iter()
                .map(|r| (x.scale(date_to_x(r.date)), y.scale(r.icu_beds_used_pct_7_day_avg)))
                .collect();
            // groups are non-empty by construction
            let last = &group.rows[group.rows.len() - 1];
            BoroughSeries {
                color: color.scale(&group.key),
                endpoint: (trend.inner_width(), y.scale(last.icu_beds_used_pct_7_day_avg)),
                key: group.key,
                label: group.label,
                points,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn hospital(name: &str, week: &str, beds: f64, pct: f64) -> HospitalWeek {
        HospitalWeek {
            hospital_name: name.to_string(),
            longitude: -73.94,
            latitude: 40.70,
            collection_week: week.to_string(),
            total_icu_beds_7_day_avg: beds,
            icu_beds_used_7_day_avg: beds * pct,
            icu_beds_used_pct_7_day_avg: pct,
        }
    }

    fn borough_week(borough: &str, date: (i32, u32, u32), pct: f64) -> BoroughWeek {
        BoroughWeek {
            borough: borough.to_string(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            icu_beds_used_pct_7_day_avg: pct,
        }
    }

    fn nyc_projection() -> Mercator {
        Mercator::new((-73.94, 40.70), 45000.0, (300.0, 237.5))
    }

    #[test]
    fn filter_preserves_order_and_drops_other_weeks() {
        let rows = vec![
            hospital("A", "2021/03/12", 10.0, 0.5),
            hospital("B", "2021/03/05", 20.0, 0.9),
            hospital("C", "2021/03/12", 30.0, 0.2),
        ];
        let filtered = filter_week(&rows, "2021/03/12");
        let names: Vec<&str> = filtered.iter().map(|r| r.hospital_name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);
    }

    #[test]
    fn filter_with_no_match_is_empty_not_an_error() {
        let rows = vec![hospital("A", "2021/03/12", 10.0, 0.5)];
        assert!(filter_week(&rows, "2020/01/01").is_empty());
    }

    #[test]
    fn filter_is_byte_for_byte_no_date_normalization() {
        let rows = vec![hospital("A", "2021-03-12", 10.0, 0.5)];
        assert!(filter_week(&rows, "2021/03/12").is_empty());
    }

    #[test]
    fn normalize_key_lowercases_and_strips_non_letters() {
        assert_eq!(normalize_key("Staten Island"), "statenisland");
        assert_eq!(normalize_key("The Bronx!"), "thebronx");
    }

    #[test]
    fn normalize_key_is_idempotent() {
        for raw in ["Staten Island", "Queens", "manhattan-2", ""] {
            let once = normalize_key(raw);
            assert_eq!(normalize_key(&once), once);
        }
    }

    #[test]
    fn grouping_is_a_stable_partition() {
        let rows = vec![
            borough_week("Brooklyn", (2021, 1, 1), 0.8),
            borough_week("Queens", (2021, 1, 1), 0.7),
            borough_week("Brooklyn", (2021, 1, 8), 0.9),
            borough_week("Queens", (2021, 1, 8), 0.6),
        ];
        let groups = group_by_borough(&rows);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, "brooklyn");
        assert_eq!(groups[1].key, "queens");
        // every row appears in exactly one group, original order preserved
        let total: usize = groups.iter().map(|g| g.rows.len()).sum();
        assert_eq!(total, rows.len());
        assert!(groups[0].rows[0].date < groups[0].rows[1].date);
    }

    #[test]
    fn color_inversion_applied_before_lookup() {
        let map = crate::config::MapConfig::default();
        let rows = vec![
            hospital("Low", "2021/03/12", 10.0, 0.2),
            hospital("High", "2021/03/12", 10.0, 0.8),
        ];
        let marks = build_hospital_marks(&rows, &map, &nyc_projection());
        let color = SequentialScale::rd_yl_bu();
        assert_eq!(marks[0].fill, color.scale(0.8));
        assert_eq!(marks[1].fill, color.scale(0.2));
        // 20% full is cooler than 80% full
        assert_ne!(marks[0].fill, marks[1].fill);
    }

    #[test]
    fn map_scenario_radius_and_midpoint_color() {
        let map = crate::config::MapConfig::default();
        let rows = vec![
            hospital("Kings County", "2021/03/12", 10.0, 0.5),
            hospital("Kings County", "2021/02/26", 50.0, 0.9),
        ];
        let marks = build_hospital_marks(&rows, &map, &nyc_projection());
        assert_eq!(marks.len(), 1);
        // domain [0, 10] and range [0, 1]: the max-bed hospital gets radius 1
        assert_eq!(marks[0].radius, 1.0);
        // 1 - 0.5 lands on the interpolator midpoint
        assert_eq!(marks[0].fill, "#ffffbf");
    }

    #[test]
    fn empty_filtered_set_binds_zero_circles() {
        let map = crate::config::MapConfig::default();
        let rows = vec![hospital("A", "2020/05/01", 10.0, 0.5)];
        assert!(build_hospital_marks(&rows, &map, &nyc_projection()).is_empty());
    }

    #[test]
    fn trend_scenario_three_boroughs_three_weeks() {
        let trend = crate::config::TrendConfig::default();
        let mut rows = Vec::new();
        for week in 1..=3u32 {
            for name in ["Brooklyn", "Queens", "Manhattan"] {
                rows.push(borough_week(name, (2021, 1, week * 7), 0.1 * week as f64));
            }
        }
        let series = build_borough_series(&rows, &trend);
        assert_eq!(series.len(), 3);
        for s in &series {
            assert_eq!(s.points.len(), 3);
            // x ascends with time
            assert!(s.points[0].0 < s.points[1].0 && s.points[1].0 < s.points[2].0);
            assert_eq!(s.points[0].0, 0.0);
            assert_eq!(s.points[2].0, trend.inner_width());
            // endpoint sits at the chronologically last value
            assert_eq!(s.endpoint, (trend.inner_width(), s.points[2].1));
        }
        // 30% full, 370px inner height: endpoint y = 370 - 0.3 * 370
        assert!((series[0].endpoint.1 - 259.0).abs() < 1e-9);
    }

    #[test]
    fn series_colors_follow_first_seen_order() {
        let trend = crate::config::TrendConfig::default();
        let rows = vec![
            borough_week("Queens", (2021, 1, 1), 0.5),
            borough_week("Brooklyn", (2021, 1, 1), 0.5),
            borough_week("Queens", (2021, 1, 8), 0.6),
        ];
        let series = build_borough_series(&rows, &trend);
        assert_eq!(series[0].key, "queens");
        assert_eq!(series[0].color, "#1f77b4");
        assert_eq!(series[1].color, "#ff7f0e");
    }
}
