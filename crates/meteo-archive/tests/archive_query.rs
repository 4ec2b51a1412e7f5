//! Integration tests for the archive query engine.
//!
//! Each test builds a small archive in a temporary directory laid out like the
//! station's repository and runs queries and statistics against it.

use std::path::Path;

use chrono::{NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use meteo_archive::layout::day_file;
use meteo_archive::{Archive, ArchiveQuery, Error, StatisticalReporter, TimePeriod};
use meteo_types::DataType;
use proptest::prelude::*;
use tempfile::TempDir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn write_rows(root: &Path, day: NaiveDate, data_type: DataType, values: &[f64]) {
    let mut body = String::new();
    for (i, value) in values.iter().enumerate() {
        body.push_str(&format!(
            "{} {:02}:{:02}:00,{}\n",
            day.format("%Y-%m-%d"),
            i / 60 % 24,
            i % 60,
            value
        ));
    }
    let path = day_file(root, day, data_type);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, body).unwrap();
}

fn days(from: NaiveDate, to: NaiveDate) -> TimePeriod {
    TimePeriod::new(
        Utc.from_utc_datetime(&from.and_hms_opt(0, 0, 0).unwrap()),
        Utc.from_utc_datetime(&to.and_hms_opt(0, 0, 0).unwrap()),
    )
    .unwrap()
}

fn archive(dir: &TempDir) -> Archive {
    Archive::open(dir.path()).unwrap().with_time_zone(Tz::UTC)
}

#[test]
fn test_discovery_order_periods_then_types_then_days() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write_rows(root, date(2024, 2, 1), DataType::Temperature, &[1.0]);
    write_rows(root, date(2024, 2, 2), DataType::Temperature, &[2.0]);
    write_rows(root, date(2024, 2, 1), DataType::Humidity, &[10.0]);
    write_rows(root, date(2024, 2, 2), DataType::Humidity, &[20.0]);
    write_rows(root, date(2024, 3, 1), DataType::Temperature, &[3.0]);

    let query = ArchiveQuery::new()
        .data_type(DataType::Humidity)
        .data_type(DataType::Temperature)
        .period(days(date(2024, 3, 1), date(2024, 3, 2)))
        .period(days(date(2024, 2, 1), date(2024, 2, 3)));
    let result = archive(&dir).query(&query).unwrap();

    let values: Vec<f64> = result.values().map(|v| v.value).collect();
    assert_eq!(values, vec![3.0, 10.0, 20.0, 1.0, 2.0]);
}

#[test]
fn test_missing_days_are_skipped() {
    let dir = TempDir::new().unwrap();
    write_rows(dir.path(), date(2024, 1, 1), DataType::Pm10, &[5.0, 6.0]);
    write_rows(dir.path(), date(2024, 1, 4), DataType::Pm10, &[7.0]);

    let query = ArchiveQuery::new()
        .data_type(DataType::Pm10)
        .period(days(date(2024, 1, 1), date(2024, 1, 8)));
    let archive = archive(&dir);

    assert_eq!(archive.resolve_files(&query).len(), 2);
    assert_eq!(archive.query(&query).unwrap().total_values(), 3);
}

#[test]
fn test_empty_query_yields_no_pages() {
    let dir = TempDir::new().unwrap();
    write_rows(dir.path(), date(2024, 1, 1), DataType::Pm25, &[1.0]);
    let archive = archive(&dir);

    let no_periods = ArchiveQuery::new().data_type(DataType::Pm25);
    assert!(archive.query(&no_periods).unwrap().pages.is_empty());

    let no_types = ArchiveQuery::new().period(days(date(2024, 1, 1), date(2024, 1, 2)));
    assert!(archive.query(&no_types).unwrap().pages.is_empty());
}

#[test]
fn test_unpaginated_query_always_has_one_page() {
    let dir = TempDir::new().unwrap();
    let values: Vec<f64> = (0..250).map(f64::from).collect();
    write_rows(dir.path(), date(2024, 1, 1), DataType::Smoke, &values);
    let archive = archive(&dir);

    let query = ArchiveQuery::new()
        .data_type(DataType::Smoke)
        .period(days(date(2024, 1, 1), date(2024, 1, 2)))
        .disable_pagination();
    let result = archive.query(&query).unwrap();
    assert_eq!(result.pages.len(), 1);
    assert_eq!(result.total_values(), 250);

    let empty = ArchiveQuery::new()
        .data_type(DataType::Smoke)
        .period(days(date(2023, 1, 1), date(2023, 1, 2)))
        .disable_pagination();
    let result = archive.query(&empty).unwrap();
    assert_eq!(result.pages.len(), 1);
    assert!(result.pages.get(0).unwrap().is_empty());
}

#[test]
fn test_pages_span_file_boundaries() {
    let dir = TempDir::new().unwrap();
    write_rows(dir.path(), date(2024, 1, 1), DataType::Pressure, &[1.0, 2.0, 3.0]);
    write_rows(dir.path(), date(2024, 1, 2), DataType::Pressure, &[4.0, 5.0, 6.0]);

    let query = ArchiveQuery::new()
        .data_type(DataType::Pressure)
        .period(days(date(2024, 1, 1), date(2024, 1, 3)))
        .page_size(4);
    let result = archive(&dir).query(&query).unwrap();

    let pages: Vec<Vec<f64>> = result
        .pages
        .iter()
        .map(|p| p.iter().map(|v| v.value).collect())
        .collect();
    assert_eq!(pages, vec![vec![1.0, 2.0, 3.0, 4.0], vec![5.0, 6.0]]);
}

#[test]
fn test_bad_value_aborts_whole_query() {
    let dir = TempDir::new().unwrap();
    write_rows(dir.path(), date(2024, 1, 1), DataType::Humidity, &[50.0]);
    let bad = day_file(dir.path(), date(2024, 1, 2), DataType::Humidity);
    std::fs::create_dir_all(bad.parent().unwrap()).unwrap();
    std::fs::write(&bad, "2024-01-02 00:00:00,51\n2024-01-02 00:01:00,humid\n").unwrap();

    let query = ArchiveQuery::new()
        .data_type(DataType::Humidity)
        .period(days(date(2024, 1, 1), date(2024, 1, 3)));
    match archive(&dir).query(&query) {
        Err(Error::InvalidValue { path, line, raw }) => {
            assert_eq!(path, bad);
            assert_eq!(line, 2);
            assert_eq!(raw, "humid");
        }
        other => panic!("expected InvalidValue, got {other:?}"),
    }
}

#[test]
fn test_unreadable_file_aborts_whole_query() {
    let dir = TempDir::new().unwrap();
    write_rows(dir.path(), date(2024, 1, 1), DataType::Pressure, &[1013.0]);
    let broken = day_file(dir.path(), date(2024, 1, 2), DataType::Pressure);
    std::fs::create_dir_all(broken.parent().unwrap()).unwrap();
    std::fs::write(&broken, b"2024-01-02 00:00:00,1012\n2024-01-02 00:01:00,\xff\xfe\n").unwrap();

    let query = ArchiveQuery::new()
        .data_type(DataType::Pressure)
        .period(days(date(2024, 1, 1), date(2024, 1, 3)));
    match archive(&dir).query(&query) {
        Err(Error::Csv { path, .. }) => assert_eq!(path, broken),
        other => panic!("expected Csv error, got {other:?}"),
    }
}

#[test]
fn test_statistics_over_query_result() {
    let dir = TempDir::new().unwrap();
    write_rows(dir.path(), date(2024, 6, 1), DataType::Temperature, &[10.0, 20.0]);
    write_rows(dir.path(), date(2024, 6, 2), DataType::Temperature, &[30.0]);
    write_rows(dir.path(), date(2024, 6, 1), DataType::Humidity, &[60.5, 61.5, 61.9]);

    let query = ArchiveQuery::new()
        .data_types([DataType::Temperature, DataType::Humidity])
        .period(days(date(2024, 6, 1), date(2024, 6, 3)))
        .page_size(2);
    let result = archive(&dir).query(&query).unwrap();
    let mut reporter = StatisticalReporter::new(&result);

    let temperature = reporter.report_for(DataType::Temperature);
    assert_eq!(temperature.count, 3);
    assert_eq!(temperature.mean, 20.0);
    assert_eq!(temperature.min, 10.0);
    assert_eq!(temperature.max, 30.0);

    let humidity = reporter.report_for(DataType::Humidity);
    assert_eq!(humidity.count, 3);
    assert_eq!(humidity.integer_mode, 61);

    assert_eq!(reporter.report_for(DataType::Pressure).count, 0);
}

proptest! {
    /// Every page but the last is full, and no value is lost or duplicated.
    #[test]
    fn pagination_preserves_values(
        counts in proptest::collection::vec(0usize..12, 1..5),
        page_size in 1usize..8,
    ) {
        let dir = TempDir::new().unwrap();
        let start = date(2024, 1, 1);
        let mut expected = Vec::new();
        for (offset, &count) in counts.iter().enumerate() {
            let day = start + chrono::Days::new(offset as u64);
            let values: Vec<f64> = (0..count).map(|i| (offset * 100 + i) as f64).collect();
            expected.extend_from_slice(&values);
            write_rows(dir.path(), day, DataType::Temperature, &values);
        }

        let end = start + chrono::Days::new(counts.len() as u64);
        let query = ArchiveQuery::new()
            .data_type(DataType::Temperature)
            .period(days(start, end))
            .page_size(page_size);
        let result = archive(&dir).query(&query).unwrap();

        let actual: Vec<f64> = result.values().map(|v| v.value).collect();
        prop_assert_eq!(&actual, &expected);
        prop_assert_eq!(result.pages.len(), expected.len().div_ceil(page_size));
        for (i, page) in result.pages.iter().enumerate() {
            prop_assert!(!page.is_empty());
            if i + 1 < result.pages.len() {
                prop_assert_eq!(page.len(), page_size);
            }
        }
    }
}
