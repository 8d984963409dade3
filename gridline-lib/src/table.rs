//! The data table: owned state plus the derived row pipeline.

use std::borrow::Cow;
use std::collections::BTreeMap;

use tokio::time::Instant;

use crate::config::TableConfig;
use crate::error::ConfigError;
use crate::model::ColumnDescriptor;
use crate::model::Row;
use crate::pipeline::DistinctValueIndex;
use crate::pipeline::FilterState;
use crate::pipeline::Page;
use crate::pipeline::PageInfo;
use crate::pipeline::Pagination;
use crate::pipeline::SearchState;
use crate::pipeline::SelectionTracker;
use crate::pipeline::SortEngine;
use crate::pipeline::SortState;
use crate::pipeline::filter;
use crate::pipeline::search;
use crate::remote::FetchRequest;
use crate::remote::FetchResult;

/// A table instance: raw rows, every piece of view state, and the pipeline
/// deriving the visible page from them.
///
/// Derived views are recomputed on read in the order filter, search, sort,
/// paginate. Selection indices refer to positions in the processed (filtered,
/// searched and sorted) set, before pagination.
///
/// # Example
///
/// ```
/// use gridline_lib::DataTable;
/// use gridline_lib::config::TableConfig;
/// use gridline_lib::model::{ColumnDescriptor, ColumnType, Row, Value};
///
/// let config = TableConfig::new(vec![
///     ColumnDescriptor::new("name", "Name"),
///     ColumnDescriptor::new("age", "Age").typed(ColumnType::Number),
/// ]);
/// let mut table = DataTable::new(config).unwrap();
/// table.set_rows(vec![
///     Row::new().set("name", "a").set("age", 30i64),
///     Row::new().set("name", "b").set("age", 40i64),
///     Row::new().set("name", "c").set("age", Value::Null),
/// ]);
///
/// table.sort_by("age");
/// let names: Vec<_> = table
///     .paginated_rows()
///     .iter()
///     .map(|r| r.value("name").to_string())
///     .collect();
/// assert_eq!(names, ["a", "b", "c"]);
/// ```
#[derive(Debug, Clone)]
pub struct DataTable {
    config: TableConfig,
    searchable: Vec<String>,
    rows: Vec<Row>,
    remote_total: Option<usize>,
    filters: FilterState,
    search: SearchState,
    sort: SortEngine,
    pagination: Pagination,
    selection: SelectionTracker,
    distinct: DistinctValueIndex,
}

impl DataTable {
    /// Creates an empty table from a validated config.
    pub fn new(config: TableConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let selection = match &config.row_key {
            Some(key) => SelectionTracker::with_row_key(key.clone()),
            None => SelectionTracker::new(),
        };
        Ok(Self {
            searchable: config.searchable(),
            filters: FilterState::for_columns(&config.columns),
            search: SearchState::new(config.debounce()),
            sort: SortEngine::new(),
            pagination: Pagination::new(config.per_page).with_max_visible_pages(config.max_visible_pages),
            selection,
            distinct: DistinctValueIndex::new(),
            rows: Vec::new(),
            remote_total: None,
            config,
        })
    }

    /// The table's configuration.
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Column descriptors, in display order.
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.config.columns
    }

    // =========================================================================
    // Rows
    // =========================================================================

    /// Replaces the raw rows and goes back to page 1.
    pub fn set_rows(&mut self, rows: Vec<Row>) {
        self.rows = rows;
        self.remote_total = None;
        self.pagination.reset();
    }

    /// Replaces the raw rows with one page fetched from a remote source.
    ///
    /// The server's total drives pagination and its distinct values feed the
    /// filter option lists until the rows change again.
    pub fn load_remote(&mut self, result: &FetchResult) {
        self.rows = result.rows.clone();
        self.remote_total = Some(result.total);
        if !result.distinct_values.is_empty() {
            self.distinct.seed(&self.rows, &result.distinct_values);
        }
        self.pagination.clamp(result.total);
    }

    /// The raw rows.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Returns `true` if the rows came from a remote source.
    pub fn is_remote(&self) -> bool {
        self.remote_total.is_some()
    }

    // =========================================================================
    // Filtering
    // =========================================================================

    /// The current filter state.
    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// Replaces a column's allow-list. Unknown columns are ignored.
    pub fn set_filter<I, S>(&mut self, column: &str, values: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let before = self.filters.clone();
        let applied = self.filters.set(column, values);
        self.after_filter_change(&before);
        applied
    }

    /// Adds or removes one allowed value. Unknown columns are ignored.
    pub fn toggle_filter_value(&mut self, column: &str, value: impl Into<String>) -> bool {
        let before = self.filters.clone();
        let applied = self.filters.toggle(column, value);
        self.after_filter_change(&before);
        applied
    }

    /// Clears every allow-list.
    pub fn reset_filters(&mut self) {
        let before = self.filters.clone();
        self.filters.reset();
        self.after_filter_change(&before);
    }

    /// Number of columns currently restricting rows.
    pub fn active_filter_count(&self) -> usize {
        self.filters.active_count()
    }

    fn after_filter_change(&mut self, before: &FilterState) {
        if self.filters != *before {
            self.pagination.reset();
        }
    }

    /// Rows passing the filters.
    pub fn filtered_rows(&self) -> Cow<'_, [Row]> {
        filter::apply(&self.rows, &self.filters, &self.config.columns)
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Records a typed query. It takes effect after the debounce delay,
    /// except a blank query, which takes effect at once.
    pub fn set_search(&mut self, raw: impl Into<String>) {
        self.set_search_at(raw, Instant::now());
    }

    /// Like [`set_search`](Self::set_search), observed at `now`.
    pub fn set_search_at(&mut self, raw: impl Into<String>, now: Instant) {
        if self.search.set_query(raw, now) {
            self.pagination.reset();
        }
    }

    /// Applies a pending query whose quiet period has elapsed by `now`.
    pub fn poll_search(&mut self, now: Instant) -> bool {
        let changed = self.search.poll(now);
        if changed {
            self.pagination.reset();
        }
        changed
    }

    /// Applies a pending query immediately.
    pub fn flush_search(&mut self) -> bool {
        let changed = self.search.flush();
        if changed {
            self.pagination.reset();
        }
        changed
    }

    /// Waits for the pending query's quiet period, then applies it.
    pub async fn settle_search(&mut self) -> bool {
        let changed = self.search.settle().await;
        if changed {
            self.pagination.reset();
        }
        changed
    }

    /// The search state (raw and debounced query).
    pub fn search(&self) -> &SearchState {
        &self.search
    }

    /// Rows passing the filters and the debounced query.
    pub fn searched_rows(&self) -> Cow<'_, [Row]> {
        filter_and_search(
            &self.rows,
            &self.filters,
            &self.config.columns,
            self.search.debounced(),
            &self.searchable,
        )
    }

    // =========================================================================
    // Sorting
    // =========================================================================

    /// Sorts by `key`, toggling direction on the active column.
    /// Non-sortable and unknown columns are ignored.
    pub fn sort_by(&mut self, key: &str) -> bool {
        self.sort.sort_by(key, &self.config.columns)
    }

    /// Sets the sort column and direction; `None` clears the sort.
    pub fn set_sort(&mut self, column: Option<&str>, ascending: bool) -> bool {
        self.sort.set_sort(column, ascending, &self.config.columns)
    }

    /// The current sort.
    pub fn sort_state(&self) -> &SortState {
        self.sort.state()
    }

    /// Filtered, searched and sorted rows: the set selection indices refer to.
    pub fn processed_rows(&mut self) -> Cow<'_, [Row]> {
        self.split().0
    }

    fn split(&mut self) -> (Cow<'_, [Row]>, &mut SelectionTracker, &Pagination) {
        let processed = process(
            &self.rows,
            &self.filters,
            &self.config.columns,
            self.search.debounced(),
            &self.searchable,
            &mut self.sort,
        );
        (processed, &mut self.selection, &self.pagination)
    }

    // =========================================================================
    // Pagination
    // =========================================================================

    fn row_count(&mut self) -> usize {
        match self.remote_total {
            Some(total) => total,
            None => self.processed_rows().len(),
        }
    }

    /// The current page, clamped to the current row count.
    pub fn page(&mut self) -> usize {
        let count = self.row_count();
        self.pagination.current_page(count)
    }

    /// Rows per page.
    pub fn per_page(&self) -> usize {
        self.pagination.per_page()
    }

    /// Number of pages (at least one).
    pub fn total_pages(&mut self) -> usize {
        let count = self.row_count();
        self.pagination.total_pages(count)
    }

    /// Rows across all pages.
    pub fn total_rows(&mut self) -> usize {
        self.row_count()
    }

    /// Moves to `page`, clamped into range. Returns the resulting page.
    pub fn set_page(&mut self, page: i64) -> usize {
        let count = self.row_count();
        self.pagination.set_page(page, count)
    }

    /// Changes the page size, keeping the current page in range.
    pub fn set_per_page(&mut self, per_page: usize) -> usize {
        let count = self.row_count();
        self.pagination.set_per_page(per_page, count)
    }

    /// Moves to the next page, if any.
    pub fn next_page(&mut self) -> usize {
        let count = self.row_count();
        self.pagination.next_page(count)
    }

    /// Moves to the previous page, if any.
    pub fn prev_page(&mut self) -> usize {
        let count = self.row_count();
        self.pagination.prev_page(count)
    }

    /// Moves to page 1.
    pub fn first_page(&mut self) -> usize {
        let count = self.row_count();
        self.pagination.first_page(count)
    }

    /// Moves to the last page.
    pub fn last_page(&mut self) -> usize {
        let count = self.row_count();
        self.pagination.last_page(count)
    }

    /// Page numbers to show in navigation.
    pub fn visible_pages(&mut self) -> Vec<usize> {
        let count = self.row_count();
        self.pagination.visible_pages(count)
    }

    /// "Showing X-Y of Z" figures for the current page.
    pub fn page_info(&mut self) -> PageInfo {
        let count = self.row_count();
        self.pagination.page_info(count)
    }

    /// Rows on the current page.
    ///
    /// Remote rows already are one page and are returned whole.
    pub fn paginated_rows(&mut self) -> Vec<Row> {
        let remote = self.remote_total.is_some();
        let (processed, _, pagination) = self.split();
        if remote {
            processed.into_owned()
        } else {
            pagination.paginate(&processed[..]).to_vec()
        }
    }

    /// The current page with its pagination figures.
    pub fn current_page(&mut self) -> Page {
        let rows = self.paginated_rows();
        let total = self.row_count();
        Page::new(
            rows,
            self.pagination.current_page(total),
            self.pagination.per_page(),
            total,
            self.pagination.total_pages(total),
        )
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Toggles the processed row at `index`.
    pub fn toggle_row(&mut self, index: usize) {
        let (rows, selection, _) = self.split();
        selection.toggle_row(&rows, index);
    }

    /// Selects the processed row at `index`.
    pub fn select_row(&mut self, index: usize) {
        let (rows, selection, _) = self.split();
        selection.select_row(&rows, index);
    }

    /// Deselects the processed row at `index`.
    pub fn deselect_row(&mut self, index: usize) {
        let (rows, selection, _) = self.split();
        selection.deselect_row(&rows, index);
    }

    /// Returns `true` if the processed row at `index` is selected.
    pub fn is_selected(&mut self, index: usize) -> bool {
        let (rows, selection, _) = self.split();
        selection.is_selected(&rows, index)
    }

    /// Selects every processed row, or clears the selection.
    pub fn set_all_selected(&mut self, selected: bool) {
        let (rows, selection, _) = self.split();
        selection.set_all_selected(&rows, selected);
    }

    /// `true` iff there are processed rows and all of them are selected.
    pub fn is_all_selected(&mut self) -> bool {
        let (rows, selection, _) = self.split();
        selection.is_all_selected(&rows)
    }

    /// `true` iff some, but not all, processed rows are selected.
    pub fn is_indeterminate(&mut self) -> bool {
        let (rows, selection, _) = self.split();
        selection.is_indeterminate(&rows)
    }

    /// Number of selected processed rows.
    pub fn selected_count(&mut self) -> usize {
        let (rows, selection, _) = self.split();
        selection.selected_count(&rows)
    }

    /// Selected processed rows, in processed order.
    pub fn selected_rows(&mut self) -> Vec<Row> {
        let (rows, selection, _) = self.split();
        selection.selected_rows(&rows).into_iter().cloned().collect()
    }

    /// Clears the selection.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // =========================================================================
    // Distinct values and remote requests
    // =========================================================================

    /// Distinct values per filterable column of the raw rows.
    pub fn distinct_values(&mut self) -> &BTreeMap<String, Vec<String>> {
        self.distinct.values(&self.rows, &self.config.columns)
    }

    /// The request a remote source should be asked for, given the current state.
    pub fn fetch_request(&self) -> FetchRequest {
        FetchRequest::new(self.pagination.page(), self.pagination.per_page())
            .with_filters(&self.filters)
            .with_search(self.search.debounced())
            .with_sort(self.sort.state().clone())
    }
}

fn filter_and_search<'a>(
    rows: &'a [Row],
    filters: &FilterState,
    columns: &[ColumnDescriptor],
    query: &str,
    searchable: &[String],
) -> Cow<'a, [Row]> {
    let filtered = filter::apply(rows, filters, columns);
    let searched = match search::apply(&filtered, query, searchable) {
        Cow::Owned(rows) => Some(rows),
        Cow::Borrowed(_) => None,
    };
    match searched {
        Some(rows) => Cow::Owned(rows),
        None => filtered,
    }
}

fn process<'a>(
    rows: &'a [Row],
    filters: &FilterState,
    columns: &[ColumnDescriptor],
    query: &str,
    searchable: &[String],
    sort: &'a mut SortEngine,
) -> Cow<'a, [Row]> {
    let processed = match filter_and_search(rows, filters, columns, query, searchable) {
        Cow::Borrowed(rows) => sort.sorted(rows, columns),
        Cow::Owned(rows) => Cow::Owned(sort.sorted(&rows, columns).into_owned()),
    };
    log::trace!("[table] {} raw rows -> {} processed", rows.len(), processed.len());
    processed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ColumnType;
    use crate::model::Value;

    fn config() -> TableConfig {
        TableConfig::new(vec![
            ColumnDescriptor::new("id", "ID").not_filterable(),
            ColumnDescriptor::new("name", "Name"),
            ColumnDescriptor::new("team", "Team"),
            ColumnDescriptor::new("age", "Age").typed(ColumnType::Number),
        ])
        .with_row_key("id")
        .with_per_page(2)
    }

    fn rows() -> Vec<Row> {
        vec![
            Row::new().set("id", 1i64).set("name", "Ada").set("team", "core").set("age", 36i64),
            Row::new().set("id", 2i64).set("name", "Alan").set("team", "web").set("age", 41i64),
            Row::new().set("id", 3i64).set("name", "Grace").set("team", "core").set("age", 85i64),
            Row::new().set("id", 4i64).set("name", "Linus").set("team", "web").set("age", Value::Null),
            Row::new().set("id", 5i64).set("name", "Barbara").set("team", "core").set("age", 29i64),
        ]
    }

    fn table() -> DataTable {
        let mut table = DataTable::new(config()).unwrap();
        table.set_rows(rows());
        table
    }

    fn ids(rows: &[Row]) -> Vec<i64> {
        rows.iter().map(|r| r.get_int("id").unwrap().unwrap()).collect()
    }

    #[test]
    fn test_rejects_invalid_config() {
        assert!(DataTable::new(config().with_per_page(0)).is_err());
    }

    #[test]
    fn test_filter_resets_page() {
        let mut table = table();
        assert_eq!(table.set_page(3), 3);
        assert!(table.set_filter("team", ["core"]));
        assert_eq!(table.page(), 1);
        assert_eq!(ids(&table.processed_rows()), vec![1, 3, 5]);
        assert_eq!(table.active_filter_count(), 1);
    }

    #[test]
    fn test_unknown_filter_column_is_noop() {
        let mut table = table();
        table.set_page(2);
        assert!(!table.set_filter("nope", ["x"]));
        assert!(!table.set_filter("id", ["1"]));
        assert_eq!(table.page(), 2);
        assert_eq!(table.processed_rows().len(), 5);
    }

    #[test]
    fn test_search_is_debounced() {
        let mut table = table();
        let t0 = Instant::now();
        table.set_search_at("ala", t0);
        assert_eq!(table.searched_rows().len(), 5);

        assert!(table.poll_search(t0 + config().debounce()));
        assert_eq!(ids(&table.searched_rows()), vec![2]);
    }

    #[test]
    fn test_sort_toggle_and_nulls() {
        let mut table = table();
        assert!(table.sort_by("age"));
        assert_eq!(ids(&table.processed_rows()), vec![5, 1, 2, 3, 4]);
        assert!(table.sort_by("age"));
        assert_eq!(ids(&table.processed_rows()), vec![4, 3, 2, 1, 5]);
    }

    #[test]
    fn test_sort_sees_in_place_edits() {
        let mut table = table();
        table.sort_by("age");
        assert_eq!(ids(&table.processed_rows())[0], 5);

        let mut edited = rows();
        edited[0].insert("age", 1i64);
        table.set_rows(edited);
        assert_eq!(ids(&table.processed_rows())[0], 1);
    }

    #[test]
    fn test_page_is_clamped_after_filtering() {
        let mut table = table();
        table.set_page(3);
        assert_eq!(ids(&table.paginated_rows()), vec![5]);

        table.set_filter("team", ["web"]);
        table.set_page(7);
        assert_eq!(table.page(), 1);
        assert_eq!(ids(&table.paginated_rows()), vec![2, 4]);
    }

    #[test]
    fn test_selection_follows_identity_across_sort() {
        let mut table = table();
        table.select_row(0);
        table.sort_by("age");
        table.sort_by("age");
        assert!(table.is_selected(3));
        assert_eq!(table.selected_count(), 1);
        assert!(table.is_indeterminate());

        table.set_all_selected(true);
        assert!(table.is_all_selected());
        table.clear_selection();
        assert_eq!(table.selected_count(), 0);
    }

    #[test]
    fn test_selection_counts_only_processed_rows() {
        let mut table = table();
        table.select_row(1);
        table.set_filter("team", ["core"]);
        assert_eq!(table.selected_count(), 0);
        assert!(table.selected_rows().is_empty());

        table.reset_filters();
        assert_eq!(ids(&table.selected_rows()), vec![2]);
    }

    #[test]
    fn test_distinct_values_of_raw_rows() {
        let mut table = table();
        table.set_filter("team", ["web"]);
        assert_eq!(table.distinct_values()["team"], vec!["core", "web"]);
        assert!(!table.distinct_values().contains_key("id"));
    }

    #[test]
    fn test_load_remote_uses_server_total() {
        let mut table = table();
        let mut distinct = BTreeMap::new();
        distinct.insert("team".to_string(), vec![serde_json::json!("ops")]);
        table.load_remote(&FetchResult {
            rows: rows()[..2].to_vec(),
            total: 9,
            distinct_values: distinct,
        });

        assert!(table.is_remote());
        assert_eq!(table.total_pages(), 5);
        assert_eq!(table.paginated_rows().len(), 2);
        assert_eq!(table.distinct_values()["team"], vec!["ops"]);
        assert_eq!(table.page_info(), PageInfo { start: 1, end: 2, total: 9 });
    }

    #[test]
    fn test_fetch_request_reflects_state() {
        let mut table = table();
        table.set_filter("team", ["web"]);
        table.set_search("al");
        table.flush_search();
        table.sort_by("name");

        let request = table.fetch_request();
        assert_eq!(request.filters.get("team"), Some(&vec!["web".to_string()]));
        assert!(!request.filters.contains_key("name"));
        assert_eq!(request.search, "al");
        assert_eq!(request.sort.column.as_deref(), Some("name"));
        assert_eq!(request.page, 1);
        assert_eq!(request.per_page, 2);
    }
}
