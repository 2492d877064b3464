//! Client-style table state for the admin views: column sorting, search and pagination.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub column: Option<String>,
    pub direction: SortDirection,
}

impl SortState {
    /// Clicking the active column flips direction; any other column starts ascending.
    pub fn request_sort(&mut self, column: &str) {
        if self.column.as_deref() == Some(column) {
            self.direction = self.direction.flipped();
        } else {
            self.column = Some(column.to_string());
            self.direction = SortDirection::Asc;
        }
    }
}

/// A cell value as seen by the sorter.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Text(String),
    Number(f64),
    Timestamp(DateTime<Utc>),
    Bool(bool),
    Missing,
}

impl SortValue {
    pub fn text(value: &str) -> Self {
        SortValue::Text(value.to_lowercase())
    }

    pub fn opt_text(value: Option<&str>) -> Self {
        value.map_or(SortValue::Missing, SortValue::text)
    }

    fn rank(&self) -> u8 {
        match self {
            SortValue::Bool(_) => 0,
            SortValue::Number(_) => 1,
            SortValue::Timestamp(_) => 2,
            SortValue::Text(_) => 3,
            SortValue::Missing => 4,
        }
    }

    /// Total order in ascending direction. `Missing` is greater than everything.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            (SortValue::Number(a), SortValue::Number(b)) => a.total_cmp(b),
            (SortValue::Timestamp(a), SortValue::Timestamp(b)) => a.cmp(b),
            (SortValue::Bool(a), SortValue::Bool(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl From<i64> for SortValue {
    fn from(value: i64) -> Self {
        SortValue::Number(value as f64)
    }
}

impl From<Option<i64>> for SortValue {
    fn from(value: Option<i64>) -> Self {
        value.map_or(SortValue::Missing, SortValue::from)
    }
}

impl From<Option<i32>> for SortValue {
    fn from(value: Option<i32>) -> Self {
        value.map_or(SortValue::Missing, |v| SortValue::Number(f64::from(v)))
    }
}

impl From<DateTime<Utc>> for SortValue {
    fn from(value: DateTime<Utc>) -> Self {
        SortValue::Timestamp(value)
    }
}

impl From<Option<DateTime<Utc>>> for SortValue {
    fn from(value: Option<DateTime<Utc>>) -> Self {
        value.map_or(SortValue::Missing, SortValue::Timestamp)
    }
}

impl From<bool> for SortValue {
    fn from(value: bool) -> Self {
        SortValue::Bool(value)
    }
}

/// A row type the admin table can sort and search.
pub trait Sortable {
    /// Value for `column`, or `Missing` for unknown columns.
    fn sort_value(&self, column: &str) -> SortValue;

    /// Lowercased text the search box matches against.
    fn search_text(&self) -> String;
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TableQuery {
    pub search: String,
    pub sort: Option<String>,
    pub direction: SortDirection,
    /// Column header the user just clicked, applied on top of `sort`/`direction`.
    pub toggle: Option<String>,
    /// 1-based.
    pub page: usize,
    pub page_size: Option<usize>,
}

impl TableQuery {
    /// The sort to apply after taking `toggle` into account.
    pub fn sort_state(&self) -> SortState {
        let mut state = SortState {
            column: self.sort.clone(),
            direction: self.direction,
        };
        if let Some(column) = self.toggle.as_deref() {
            state.request_sort(column);
        }
        state
    }
}

impl Default for TableQuery {
    fn default() -> Self {
        TableQuery {
            search: String::new(),
            sort: None,
            direction: SortDirection::Asc,
            toggle: None,
            page: 1,
            page_size: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Echoed back so the client can render the header arrows.
    pub sort: SortState,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

/// Filters by search text, sorts stably, then slices out one page.
/// `default_page_size` applies when the query names none. Out-of-range pages clamp to the last page.
pub fn apply_table_query<T: Sortable>(
    items: Vec<T>,
    query: &TableQuery,
    default_page_size: usize,
) -> Page<T> {
    let needle = query.search.trim().to_lowercase();
    let mut rows: Vec<T> = if needle.is_empty() {
        items
    } else {
        items
            .into_iter()
            .filter(|row| row.search_text().contains(&needle))
            .collect()
    };

    let sort = query.sort_state();
    if let Some(column) = sort.column.as_deref() {
        // Decorate once so sort_value is not recomputed per comparison.
        let mut keyed: Vec<(SortValue, T)> = rows
            .into_iter()
            .map(|row| (row.sort_value(column), row))
            .collect();
        keyed.sort_by(|(a, _), (b, _)| match sort.direction {
            SortDirection::Asc => a.compare(b),
            SortDirection::Desc => b.compare(a),
        });
        rows = keyed.into_iter().map(|(_, row)| row).collect();
    }

    let page_size = query.page_size.unwrap_or(default_page_size).max(1);
    let total_items = rows.len();
    let total_pages = total_items.div_ceil(page_size).max(1);
    let page = query.page.clamp(1, total_pages);
    let items = rows
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect();

    Page {
        items,
        sort,
        page,
        page_size,
        total_items,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        name: &'static str,
        score: Option<i64>,
    }

    impl Sortable for Row {
        fn sort_value(&self, column: &str) -> SortValue {
            match column {
                "name" => SortValue::text(self.name),
                "score" => self.score.into(),
                _ => SortValue::Missing,
            }
        }

        fn search_text(&self) -> String {
            self.name.to_lowercase()
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { name: "Carol", score: Some(2) },
            Row { name: "alice", score: None },
            Row { name: "Bob", score: Some(2) },
            Row { name: "Dave", score: Some(1) },
        ]
    }

    fn names(page: &Page<Row>) -> Vec<&'static str> {
        page.items.iter().map(|r| r.name).collect()
    }

    fn sorted(column: &str, direction: SortDirection) -> TableQuery {
        TableQuery {
            sort: Some(column.to_string()),
            direction,
            ..Default::default()
        }
    }

    #[test]
    fn test_request_sort_toggles_same_column() {
        let mut state = SortState::default();
        state.request_sort("name");
        assert_eq!(state.direction, SortDirection::Asc);
        state.request_sort("name");
        assert_eq!(state.direction, SortDirection::Desc);
        state.request_sort("name");
        assert_eq!(state.direction, SortDirection::Asc);
    }

    #[test]
    fn test_request_sort_new_column_starts_ascending() {
        let mut state = SortState::default();
        state.request_sort("name");
        state.request_sort("name");
        state.request_sort("score");
        assert_eq!(state.column.as_deref(), Some("score"));
        assert_eq!(state.direction, SortDirection::Asc);
    }

    #[test]
    fn test_toggle_on_sorted_column_reverses() {
        let query = TableQuery {
            sort: Some("name".to_string()),
            direction: SortDirection::Asc,
            toggle: Some("name".to_string()),
            ..Default::default()
        };
        let page = apply_table_query(rows(), &query, 10);
        assert_eq!(page.sort.direction, SortDirection::Desc);
        assert_eq!(names(&page), vec!["Dave", "Carol", "Bob", "alice"]);
    }

    #[test]
    fn test_toggle_on_new_column_sorts_ascending() {
        let query = TableQuery {
            sort: Some("name".to_string()),
            direction: SortDirection::Desc,
            toggle: Some("score".to_string()),
            ..Default::default()
        };
        let state = query.sort_state();
        assert_eq!(state.column.as_deref(), Some("score"));
        assert_eq!(state.direction, SortDirection::Asc);
    }

    #[test]
    fn test_text_sort_ignores_case() {
        let page = apply_table_query(rows(), &sorted("name", SortDirection::Asc), 10);
        assert_eq!(names(&page), vec!["alice", "Bob", "Carol", "Dave"]);
    }

    #[test]
    fn test_equal_keys_keep_input_order() {
        let page = apply_table_query(rows(), &sorted("score", SortDirection::Asc), 10);
        assert_eq!(names(&page), vec!["Dave", "Carol", "Bob", "alice"]);

        let page = apply_table_query(rows(), &sorted("score", SortDirection::Desc), 10);
        assert_eq!(names(&page)[..2], ["alice", "Carol"]);
    }

    #[test]
    fn test_missing_sorts_last_ascending() {
        let a = SortValue::Missing;
        let b = SortValue::from(Some(5i64));
        assert_eq!(a.compare(&b), Ordering::Greater);
        assert_eq!(b.compare(&a), Ordering::Less);
        assert_eq!(a.compare(&SortValue::Missing), Ordering::Equal);
    }

    #[test]
    fn test_timestamps_compare_chronologically() {
        let earlier: DateTime<Utc> = "2026-01-01T00:00:00Z".parse().unwrap();
        let later: DateTime<Utc> = "2026-03-01T00:00:00Z".parse().unwrap();
        assert_eq!(
            SortValue::from(earlier).compare(&SortValue::from(later)),
            Ordering::Less
        );
    }

    #[test]
    fn test_search_then_paginate() {
        let query = TableQuery {
            search: " A ".to_string(),
            page_size: Some(2),
            ..Default::default()
        };
        let page = apply_table_query(rows(), &query, 10);
        assert_eq!(page.total_items, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(names(&page), vec!["Carol", "alice"]);
    }

    #[test]
    fn test_page_past_end_clamps_to_last() {
        let query = TableQuery {
            page: 9,
            page_size: Some(3),
            ..Default::default()
        };
        let page = apply_table_query(rows(), &query, 10);
        assert_eq!(page.page, 2);
        assert_eq!(names(&page), vec!["Dave"]);
    }

    #[test]
    fn test_empty_table_has_one_page() {
        let page = apply_table_query(Vec::<Row>::new(), &TableQuery::default(), 10);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);
        assert!(page.items.is_empty());
    }
}
