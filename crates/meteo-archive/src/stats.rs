//! Per-data-type statistics over a query result.
//!
//! A [`StatisticalReporter`] distributes the values of a result into one
//! [`Pamphlet`] per data type when it is built. Statistics for a type are
//! computed the first time they are asked for and kept from then on.

use indexmap::IndexMap;
use serde::Serialize;

use meteo_types::{DataType, Value};

use crate::models::ArchiveQueryResult;

/// Summary statistics for one data type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Statistics {
    pub data_type: DataType,
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Most frequent value after truncation toward zero.
    pub integer_mode: i64,
    /// Population standard deviation.
    pub standard_deviation: f64,
}

impl Statistics {
    /// Statistics of an empty set: every figure is zero.
    pub fn empty(data_type: DataType) -> Self {
        Self {
            data_type,
            count: 0,
            mean: 0.0,
            min: 0.0,
            max: 0.0,
            integer_mode: 0,
            standard_deviation: 0.0,
        }
    }
}

/// Raw values collected for one data type.
#[derive(Debug, Clone, PartialEq)]
pub struct Accumulator {
    data_type: DataType,
    raw_values: Vec<f64>,
}

impl Accumulator {
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            raw_values: Vec::new(),
        }
    }

    pub fn push(&mut self, value: f64) {
        self.raw_values.push(value);
    }

    pub fn len(&self) -> usize {
        self.raw_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw_values.is_empty()
    }

    /// Compute statistics, consuming the raw values.
    pub fn compute(self) -> Statistics {
        let values = self.raw_values;
        if values.is_empty() {
            return Statistics::empty(self.data_type);
        }

        let count = values.len();
        let n = count as f64;
        let mean = values.iter().sum::<f64>() / n;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        Statistics {
            data_type: self.data_type,
            count,
            mean,
            min,
            max,
            integer_mode: integer_mode(&values),
            standard_deviation: variance.sqrt(),
        }
    }
}

/// Most frequent truncated value. Ties go to the value seen first.
fn integer_mode(values: &[f64]) -> i64 {
    let mut counts: IndexMap<i64, usize> = IndexMap::new();
    for value in values {
        *counts.entry(value.trunc() as i64).or_default() += 1;
    }

    let mut best: Option<(i64, usize)> = None;
    for (&value, &count) in &counts {
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((value, count));
        }
    }
    best.map_or(0, |(value, _)| value)
}

/// Statistics for one data type, either still collecting or computed.
#[derive(Debug, Clone, PartialEq)]
pub enum Pamphlet {
    Accumulating(Accumulator),
    Finalized(Statistics),
}

impl Pamphlet {
    pub fn new(data_type: DataType) -> Self {
        Pamphlet::Accumulating(Accumulator::new(data_type))
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Pamphlet::Accumulating(acc) => acc.data_type,
            Pamphlet::Finalized(stats) => stats.data_type,
        }
    }

    pub fn is_finalized(&self) -> bool {
        matches!(self, Pamphlet::Finalized(_))
    }

    /// Computed statistics, if [`finalize`](Self::finalize) already ran.
    pub fn statistics(&self) -> Option<&Statistics> {
        match self {
            Pamphlet::Accumulating(_) => None,
            Pamphlet::Finalized(stats) => Some(stats),
        }
    }

    /// Compute statistics on first call; later calls return the same result.
    pub fn finalize(&mut self) -> Statistics {
        match self {
            Pamphlet::Finalized(stats) => *stats,
            Pamphlet::Accumulating(acc) => {
                let data_type = acc.data_type;
                let stats = std::mem::replace(acc, Accumulator::new(data_type)).compute();
                *self = Pamphlet::Finalized(stats);
                stats
            }
        }
    }

    fn push(&mut self, value: f64) -> bool {
        match self {
            Pamphlet::Accumulating(acc) => {
                acc.push(value);
                true
            }
            Pamphlet::Finalized(_) => false,
        }
    }
}

/// Statistics over every data type of a query result.
#[derive(Debug, Clone)]
pub struct StatisticalReporter {
    pamphlets: [Pamphlet; DataType::ALL.len()],
}

impl StatisticalReporter {
    /// Distribute every value of `result` by data type.
    pub fn new(result: &ArchiveQueryResult) -> Self {
        Self::from_values(result.values())
    }

    pub fn from_values<'a>(values: impl IntoIterator<Item = &'a Value>) -> Self {
        let mut pamphlets = DataType::ALL.map(Pamphlet::new);
        for value in values {
            pamphlets[value.data_type.index()].push(value.value);
        }
        Self { pamphlets }
    }

    /// Statistics for one data type.
    ///
    /// A type with no values reports all zeros.
    pub fn report_for(&mut self, data_type: DataType) -> Statistics {
        self.pamphlets[data_type.index()].finalize()
    }

    pub fn pamphlet(&self, data_type: DataType) -> &Pamphlet {
        &self.pamphlets[data_type.index()]
    }

    /// Statistics for every data type in catalogue order.
    pub fn reports(&mut self) -> Vec<Statistics> {
        self.pamphlets.iter_mut().map(Pamphlet::finalize).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn accumulate(data_type: DataType, values: &[f64]) -> Accumulator {
        let mut acc = Accumulator::new(data_type);
        for &v in values {
            acc.push(v);
        }
        acc
    }

    fn value(data_type: DataType, v: f64) -> Value {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Value::new(at, "x.csv", 1, v, data_type)
    }

    #[test]
    fn test_compute_basic() {
        let stats = accumulate(DataType::Temperature, &[10.0, 20.0, 30.0]).compute();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.mean, 20.0);
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.max, 30.0);
        assert!((stats.standard_deviation - 8.164_965_809).abs() < 1e-6);
        assert_eq!(stats.integer_mode, 10);
    }

    #[test]
    fn test_compute_empty_is_zero() {
        let stats = Accumulator::new(DataType::Pm10).compute();
        assert_eq!(stats, Statistics::empty(DataType::Pm10));
    }

    #[test]
    fn test_compute_negative_values() {
        let stats = accumulate(DataType::Temperature, &[-5.0, -1.0, -3.0]).compute();
        assert_eq!(stats.min, -5.0);
        assert_eq!(stats.max, -1.0);
        assert_eq!(stats.mean, -3.0);
    }

    #[test]
    fn test_integer_mode_truncates() {
        assert_eq!(integer_mode(&[1.9, 2.1, 2.8, 1.2, 2.0]), 2);
        assert_eq!(integer_mode(&[-1.7, -1.2, 3.0]), -1);
    }

    #[test]
    fn test_integer_mode_tie_goes_to_first_seen() {
        assert_eq!(integer_mode(&[7.5, 3.1, 3.9, 7.0]), 7);
        assert_eq!(integer_mode(&[3.1, 7.5, 7.0, 3.9]), 3);
    }

    #[test]
    fn test_single_value_has_zero_deviation() {
        let stats = accumulate(DataType::Humidity, &[42.5]).compute();
        assert_eq!(stats.standard_deviation, 0.0);
        assert_eq!(stats.integer_mode, 42);
    }

    #[test]
    fn test_report_for_is_idempotent() {
        let values = [value(DataType::Temperature, 1.0), value(DataType::Temperature, 3.0)];
        let mut reporter = StatisticalReporter::from_values(&values);

        assert!(!reporter.pamphlet(DataType::Temperature).is_finalized());
        let first = reporter.report_for(DataType::Temperature);
        let second = reporter.report_for(DataType::Temperature);
        assert_eq!(first, second);
        assert_eq!(first.count, 2);
        assert_eq!(first.mean, 2.0);
        assert!(reporter.pamphlet(DataType::Temperature).is_finalized());
    }

    #[test]
    fn test_values_fan_out_by_type() {
        let values = [
            value(DataType::Temperature, 10.0),
            value(DataType::Pressure, 1000.0),
            value(DataType::Temperature, 20.0),
        ];
        let mut reporter = StatisticalReporter::from_values(&values);

        assert_eq!(reporter.report_for(DataType::Temperature).count, 2);
        assert_eq!(reporter.report_for(DataType::Pressure).mean, 1000.0);
        assert_eq!(
            reporter.report_for(DataType::Smoke),
            Statistics::empty(DataType::Smoke)
        );
    }

    #[test]
    fn test_reports_cover_every_type() {
        let mut reporter = StatisticalReporter::from_values(std::iter::empty());
        let reports = reporter.reports();
        assert_eq!(reports.len(), DataType::ALL.len());
        for (stats, dt) in reports.iter().zip(DataType::ALL) {
            assert_eq!(stats.data_type, dt);
            assert_eq!(stats.count, 0);
        }
    }
}
