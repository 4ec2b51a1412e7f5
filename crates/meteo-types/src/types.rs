//! Core types for weather station data.

use core::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Kind of measurement recorded by the station.
///
/// Every variant maps to one CSV file per day in the archive; the
/// [`file_stem`](Self::file_stem) is that file's name without extension and is
/// unique per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DataType {
    /// Air temperature.
    Temperature,
    /// Relative humidity.
    Humidity,
    /// Barometric pressure.
    Pressure,
    /// Particulate matter up to 10 µm.
    Pm10,
    /// Particulate matter up to 2.5 µm.
    Pm25,
    /// Smoke and flammable vapours.
    Smoke,
}

impl DataType {
    /// Every data type, in catalogue order.
    pub const ALL: [DataType; 6] = [
        DataType::Temperature,
        DataType::Humidity,
        DataType::Pressure,
        DataType::Pm10,
        DataType::Pm25,
        DataType::Smoke,
    ];

    /// Display name in Italian.
    #[must_use]
    pub fn italian_name(&self) -> &'static str {
        match self {
            DataType::Temperature => "Temperatura",
            DataType::Humidity => "Umidità",
            DataType::Pressure => "Pressione",
            DataType::Pm10 => "PM10",
            DataType::Pm25 => "PM2,5",
            DataType::Smoke => "Fumo e vapori infiammabili",
        }
    }

    /// Display name in English.
    #[must_use]
    pub fn english_name(&self) -> &'static str {
        match self {
            DataType::Temperature => "Temperature",
            DataType::Humidity => "Humidity",
            DataType::Pressure => "Pressure",
            DataType::Pm10 => "PM10",
            DataType::Pm25 => "PM2,5",
            DataType::Smoke => "Smoke and flammable vapours",
        }
    }

    /// Short symbol, as used by the station's snapshot record.
    #[must_use]
    pub fn symbol(&self) -> &'static str {
        match self {
            DataType::Temperature => "T",
            DataType::Humidity => "H",
            DataType::Pressure => "P",
            DataType::Pm10 => "PM10",
            DataType::Pm25 => "PM25",
            DataType::Smoke => "S",
        }
    }

    /// Unit of measurement.
    #[must_use]
    pub fn unit(&self) -> &'static str {
        match self {
            DataType::Temperature => "°C",
            DataType::Humidity => "%",
            DataType::Pressure => "hPa",
            DataType::Pm10 | DataType::Pm25 | DataType::Smoke => "µg/m³",
        }
    }

    /// Archive file name without the `.csv` extension.
    #[must_use]
    pub fn file_stem(&self) -> &'static str {
        match self {
            DataType::Temperature => "temperature",
            DataType::Humidity => "humidity",
            DataType::Pressure => "pressure",
            DataType::Pm10 => "pm10",
            DataType::Pm25 => "pm25",
            DataType::Smoke => "smoke",
        }
    }

    /// Position in [`DataType::ALL`].
    #[must_use]
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.english_name())
    }
}

impl FromStr for DataType {
    type Err = ParseError;

    /// Parse a data type from its file stem or symbol, ignoring case.
    ///
    /// # Examples
    ///
    /// ```
    /// use meteo_types::DataType;
    ///
    /// assert_eq!("temperature".parse(), Ok(DataType::Temperature));
    /// assert_eq!("PM25".parse(), Ok(DataType::Pm25));
    /// assert_eq!("s".parse(), Ok(DataType::Smoke));
    /// assert!("radon".parse::<DataType>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        DataType::ALL
            .into_iter()
            .find(|dt| {
                dt.file_stem().eq_ignore_ascii_case(needle)
                    || dt.symbol().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| ParseError::UnknownDataType(s.to_string()))
    }
}

/// A single data point read from the archive or from a snapshot.
///
/// `source_file` and `source_line` record where the point came from and take
/// no part in equality.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Value {
    /// Instant the reading was taken.
    pub timestamp: DateTime<Utc>,
    /// File the reading was read from.
    pub source_file: PathBuf,
    /// Line within `source_file`.
    pub source_line: u64,
    /// Measured value.
    pub value: f64,
    /// Kind of measurement.
    pub data_type: DataType,
}

impl Value {
    /// Create a new data point.
    pub fn new(
        timestamp: DateTime<Utc>,
        source_file: impl Into<PathBuf>,
        source_line: u64,
        value: f64,
        data_type: DataType,
    ) -> Self {
        Self {
            timestamp,
            source_file: source_file.into(),
            source_line,
            value,
            data_type,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.timestamp == other.timestamp
            && self.value == other.value
            && self.data_type == other.data_type
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} at {}",
            self.data_type.symbol(),
            self.value,
            self.data_type.unit(),
            self.timestamp.to_rfc3339()
        )
    }
}

/// The station's most recent reading as published in `last.json`.
///
/// Field names on the wire follow the station firmware: `utciso` holds an
/// ISO-8601 instant and the measurements use their short symbols.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SnapshotRecord {
    /// When the snapshot was taken.
    #[cfg_attr(feature = "serde", serde(rename = "utciso"))]
    pub observed_at: DateTime<Utc>,
    #[cfg_attr(feature = "serde", serde(rename = "T"))]
    pub temperature: f64,
    #[cfg_attr(feature = "serde", serde(rename = "H"))]
    pub humidity: f64,
    #[cfg_attr(feature = "serde", serde(rename = "P"))]
    pub pressure: f64,
    #[cfg_attr(feature = "serde", serde(rename = "PM10"))]
    pub pm10: f64,
    #[cfg_attr(feature = "serde", serde(rename = "PM25"))]
    pub pm25: f64,
    #[cfg_attr(feature = "serde", serde(rename = "S"))]
    pub smoke: f64,
}

impl SnapshotRecord {
    /// Value recorded for a given data type.
    #[must_use]
    pub fn get(&self, data_type: DataType) -> f64 {
        match data_type {
            DataType::Temperature => self.temperature,
            DataType::Humidity => self.humidity,
            DataType::Pressure => self.pressure,
            DataType::Pm10 => self.pm10,
            DataType::Pm25 => self.pm25,
            DataType::Smoke => self.smoke,
        }
    }
}

/// Immutable view of the latest snapshot, one [`Value`] per data type.
///
/// All six values share the snapshot's timestamp and source file. Their
/// `source_line` is the 1-based catalogue position of the data type.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LatestMeasurements {
    pub temperature: Value,
    pub humidity: Value,
    pub pressure: Value,
    pub pm10: Value,
    pub pm25: Value,
    pub smoke_and_flammable_gases: Value,
    /// When the snapshot was taken.
    pub observed_at: DateTime<Utc>,
}

impl LatestMeasurements {
    /// Build the measurement set from a parsed snapshot record.
    pub fn from_record(record: &SnapshotRecord, source: &Path) -> Self {
        let at = record.observed_at;
        let value = |dt: DataType| Value::new(at, source, dt.index() as u64 + 1, record.get(dt), dt);

        Self {
            temperature: value(DataType::Temperature),
            humidity: value(DataType::Humidity),
            pressure: value(DataType::Pressure),
            pm10: value(DataType::Pm10),
            pm25: value(DataType::Pm25),
            smoke_and_flammable_gases: value(DataType::Smoke),
            observed_at: at,
        }
    }

    /// Value for a given data type.
    #[must_use]
    pub fn get(&self, data_type: DataType) -> &Value {
        match data_type {
            DataType::Temperature => &self.temperature,
            DataType::Humidity => &self.humidity,
            DataType::Pressure => &self.pressure,
            DataType::Pm10 => &self.pm10,
            DataType::Pm25 => &self.pm25,
            DataType::Smoke => &self.smoke_and_flammable_gases,
        }
    }

    /// All six values in catalogue order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        DataType::ALL.into_iter().map(move |dt| self.get(dt))
    }
}
