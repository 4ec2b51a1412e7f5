//! Result model of an archive query.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use meteo_types::Value;

/// An ordered, append-only run of values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Page {
    values: Vec<Value>,
}

impl Page {
    /// Create an empty page.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value.
    pub fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    /// Number of values on the page.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the page holds no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values in discovery order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

impl IntoIterator for Page {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a Page {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

/// Pages of a query result in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageList {
    pages: Vec<Page>,
}

impl PageList {
    /// Number of pages.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Page at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Page> {
        self.pages.iter()
    }

    /// Every value across every page, in order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.pages.iter().flat_map(Page::iter)
    }

    /// Total number of values across all pages.
    pub fn total_values(&self) -> usize {
        self.pages.iter().map(Page::len).sum()
    }

    pub fn into_pages(self) -> Vec<Page> {
        self.pages
    }
}

impl From<Vec<Page>> for PageList {
    fn from(pages: Vec<Page>) -> Self {
        Self { pages }
    }
}

impl IntoIterator for PageList {
    type Item = Page;
    type IntoIter = std::vec::IntoIter<Page>;

    fn into_iter(self) -> Self::IntoIter {
        self.pages.into_iter()
    }
}

impl<'a> IntoIterator for &'a PageList {
    type Item = &'a Page;
    type IntoIter = std::slice::Iter<'a, Page>;

    fn into_iter(self) -> Self::IntoIter {
        self.pages.iter()
    }
}

/// Outcome of [`Archive::query`](crate::Archive::query).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveQueryResult {
    /// Matched values split into pages.
    pub pages: PageList,
    /// When the query ran, unrelated to the values' own timestamps.
    pub queried_at: DateTime<Utc>,
}

impl ArchiveQueryResult {
    /// Every matched value, in order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.pages.values()
    }

    /// Total number of matched values.
    pub fn total_values(&self) -> usize {
        self.pages.total_values()
    }
}

/// Splits a stream of values into pages of at most `page_size` values.
///
/// The running count of the current page decides each boundary, so where a
/// page ends does not depend on which file a value came from.
#[derive(Debug)]
pub(crate) struct Paginator {
    page_size: usize,
    current: Page,
    sealed: Vec<Page>,
}

impl Paginator {
    pub(crate) fn new(page_size: usize) -> Self {
        Self {
            page_size,
            current: Page::new(),
            sealed: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, value: Value) {
        self.current.push(value);
        if self.page_size > 0 && self.current.len() >= self.page_size {
            self.sealed.push(std::mem::take(&mut self.current));
        }
    }

    /// Seal the trailing page.
    ///
    /// Unpaginated results always hold exactly one page, even when empty.
    /// Paginated results never end with an empty page.
    pub(crate) fn finish(mut self) -> PageList {
        if self.page_size == 0 || !self.current.is_empty() {
            self.sealed.push(self.current);
        }
        PageList::from(self.sealed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use meteo_types::DataType;

    fn value(n: u64) -> Value {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Value::new(at, "t.csv", n, n as f64, DataType::Temperature)
    }

    fn paginate(page_size: usize, count: u64) -> PageList {
        let mut paginator = Paginator::new(page_size);
        for n in 0..count {
            paginator.push(value(n));
        }
        paginator.finish()
    }

    #[test]
    fn test_paginator_exact_multiple() {
        let pages = paginate(5, 10);
        assert_eq!(pages.len(), 2);
        assert!(pages.iter().all(|p| p.len() == 5));
    }

    #[test]
    fn test_paginator_partial_last_page() {
        let pages = paginate(4, 10);
        let sizes: Vec<_> = pages.iter().map(Page::len).collect();
        assert_eq!(sizes, vec![4, 4, 2]);
        assert_eq!(pages.total_values(), 10);
    }

    #[test]
    fn test_paginator_disabled_yields_single_page() {
        let pages = paginate(0, 250);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages.get(0).map(Page::len), Some(250));
    }

    #[test]
    fn test_paginator_empty_input() {
        assert!(paginate(10, 0).is_empty());

        let unpaginated = paginate(0, 0);
        assert_eq!(unpaginated.len(), 1);
        assert!(unpaginated.get(0).is_some_and(Page::is_empty));
    }

    #[test]
    fn test_page_list_values_preserve_order() {
        let pages = paginate(3, 7);
        let lines: Vec<_> = pages.values().map(|v| v.source_line).collect();
        assert_eq!(lines, (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn test_result_serializes_pages_as_nested_arrays() {
        let result = ArchiveQueryResult {
            pages: paginate(2, 3),
            queried_at: Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["pages"].as_array().map(Vec::len), Some(2));
        assert_eq!(json["pages"][1].as_array().map(Vec::len), Some(1));
    }
}
