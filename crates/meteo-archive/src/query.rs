//! Query builder for the archive.
//!
//! # Example
//!
//! ```
//! use chrono_tz::Europe::Rome;
//! use meteo_archive::{ArchiveQuery, RelativePeriod, TimePeriod};
//! use meteo_types::DataType;
//!
//! let now = chrono::Utc::now();
//! let query = ArchiveQuery::new()
//!     .data_type(DataType::Temperature)
//!     .data_type(DataType::Humidity)
//!     .period(TimePeriod::relative(RelativePeriod::Yesterday, now, Rome))
//!     .page_size(50);
//!
//! assert_eq!(query.data_types.len(), 2);
//! assert!(query.is_paginated());
//! ```

use meteo_types::DataType;

use crate::period::TimePeriod;

/// Page size used when pagination is enabled without an explicit size.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// A request against the archive.
///
/// Results are produced in discovery order: periods in the order given, then
/// data types in the order given, then days ascending.
///
/// A `page_size` of 0 disables pagination; the result then holds exactly one
/// page with every matching value.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveQuery {
    /// Data types to read. Duplicates are ignored.
    pub data_types: Vec<DataType>,
    /// Periods to read, in result order.
    pub periods: Vec<TimePeriod>,
    /// Maximum values per page, 0 for a single unbounded page.
    pub page_size: usize,
}

impl Default for ArchiveQuery {
    fn default() -> Self {
        Self {
            data_types: Vec::new(),
            periods: Vec::new(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ArchiveQuery {
    /// Create an empty query with the default page size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Include a data type. Adding a type twice keeps its first position.
    #[must_use]
    pub fn data_type(mut self, data_type: DataType) -> Self {
        self.add_data_type(data_type);
        self
    }

    /// Include several data types, in order.
    #[must_use]
    pub fn data_types(mut self, data_types: impl IntoIterator<Item = DataType>) -> Self {
        for data_type in data_types {
            self.add_data_type(data_type);
        }
        self
    }

    /// Include every data type in catalogue order.
    #[must_use]
    pub fn all_data_types(self) -> Self {
        self.data_types(DataType::ALL)
    }

    /// Append a time period.
    #[must_use]
    pub fn period(mut self, period: TimePeriod) -> Self {
        self.periods.push(period);
        self
    }

    /// Set the page size. 0 disables pagination.
    #[must_use]
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Alias of `page_size(0)`.
    #[must_use]
    pub fn disable_pagination(self) -> Self {
        self.page_size(0)
    }

    /// Reset the page size to [`DEFAULT_PAGE_SIZE`].
    #[must_use]
    pub fn enable_pagination(self) -> Self {
        self.page_size(DEFAULT_PAGE_SIZE)
    }

    /// Include a data type in place. Returns `false` if it was already present.
    pub fn add_data_type(&mut self, data_type: DataType) -> bool {
        if self.data_types.contains(&data_type) {
            return false;
        }
        self.data_types.push(data_type);
        true
    }

    /// Whether results are split into pages.
    pub fn is_paginated(&self) -> bool {
        self.page_size > 0
    }

    /// Data types in query order with duplicates removed.
    pub(crate) fn distinct_data_types(&self) -> Vec<DataType> {
        let mut seen = [false; DataType::ALL.len()];
        self.data_types
            .iter()
            .copied()
            .filter(|dt| !std::mem::replace(&mut seen[dt.index()], true))
            .collect()
    }
}
