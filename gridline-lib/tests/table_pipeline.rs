//! End-to-end pipeline behavior through `DataTable`.

use std::time::Duration;

use gridline_lib::DataTable;
use gridline_lib::config::TableConfig;
use gridline_lib::export;
use gridline_lib::export::ExportOptions;
use gridline_lib::model::ColumnDescriptor;
use gridline_lib::model::ColumnType;
use gridline_lib::model::Row;
use gridline_lib::model::Value;
use tokio::time::Instant;

fn people() -> DataTable {
    let config = TableConfig::new(vec![
        ColumnDescriptor::new("name", "Name"),
        ColumnDescriptor::new("age", "Age").typed(ColumnType::Number),
    ]);
    let mut table = DataTable::new(config).unwrap();
    table.set_rows(vec![
        Row::new().set("name", "b").set("age", 30i64),
        Row::new().set("name", "a").set("age", 25i64),
        Row::new().set("name", "c").set("age", Value::Null),
    ]);
    table
}

fn names(rows: &[Row]) -> Vec<String> {
    rows.iter().map(|r| r.value("name").to_string()).collect()
}

fn numbered(count: i64, per_page: usize) -> DataTable {
    let config = TableConfig::new(vec![ColumnDescriptor::new("n", "N").typed(ColumnType::Number)])
        .with_per_page(per_page)
        .with_row_key("n");
    let mut table = DataTable::new(config).unwrap();
    table.set_rows((1..=count).map(|n| Row::new().set("n", n)).collect());
    table
}

#[test]
fn test_sort_nulls_follow_direction() {
    let mut table = people();

    table.sort_by("age");
    assert_eq!(names(&table.paginated_rows()), ["a", "b", "c"]);

    table.sort_by("age");
    assert_eq!(names(&table.paginated_rows()), ["c", "b", "a"]);
}

#[test]
fn test_page_past_end_clamps_to_last() {
    let mut table = numbered(5, 2);

    assert_eq!(table.set_page(10), 3);
    let page = table.current_page();
    assert_eq!(page.page(), 3);
    assert_eq!(page.total_pages(), 3);
    assert_eq!(page.rows()[0].get_int("n").unwrap(), Some(5));
    assert_eq!(page.len(), 1);
    assert!(!page.has_more());
}

#[test]
fn test_set_page_idempotent_for_any_input() {
    let mut table = numbered(7, 3);
    for requested in -3..12 {
        let page = table.set_page(requested);
        assert!((1..=3).contains(&page));
        assert_eq!(table.set_page(page as i64), page);
    }
}

#[test]
fn test_visible_pages_window() {
    let mut table = numbered(100, 5);
    table.set_page(10);
    assert_eq!(table.visible_pages(), vec![8, 9, 10, 11, 12]);
    table.last_page();
    assert_eq!(table.visible_pages(), vec![16, 17, 18, 19, 20]);
}

#[test]
fn test_filter_keeps_order_and_constraints() {
    let config = TableConfig::new(vec![
        ColumnDescriptor::new("team", "Team"),
        ColumnDescriptor::new("level", "Level"),
    ]);
    let mut table = DataTable::new(config).unwrap();
    table.set_rows(vec![
        Row::new().set("team", "web").set("level", "junior"),
        Row::new().set("team", "core").set("level", "senior"),
        Row::new().set("team", "web").set("level", "senior"),
        Row::new().set("team", "ops").set("level", "senior"),
    ]);

    table.set_filter("team", ["web", "ops"]);
    table.set_filter("level", ["senior"]);

    let teams: Vec<String> = table
        .processed_rows()
        .iter()
        .map(|r| r.value("team").to_string())
        .collect();
    assert_eq!(teams, ["web", "ops"]);
}

#[test]
fn test_search_narrows_and_clear_is_immediate() {
    let mut table = people();
    let t0 = Instant::now();

    table.set_search_at("a", t0);
    table.poll_search(t0 + Duration::from_millis(300));
    assert_eq!(names(&table.processed_rows()), ["a"]);

    table.set_search_at("a b", t0 + Duration::from_secs(1));
    table.poll_search(t0 + Duration::from_secs(2));
    assert!(table.processed_rows().is_empty());

    table.set_search_at("", t0 + Duration::from_secs(3));
    assert_eq!(table.processed_rows().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_search_settles_after_debounce() {
    let mut table = people();
    table.set_search("c");
    assert_eq!(table.processed_rows().len(), 3);

    assert!(table.settle_search().await);
    assert_eq!(names(&table.processed_rows()), ["c"]);
}

#[test]
fn test_select_all_reads_back() {
    let mut table = numbered(4, 2);
    table.set_all_selected(true);
    assert!(table.is_all_selected());
    assert!(!table.is_indeterminate());

    table.deselect_row(0);
    assert!(!table.is_all_selected());
    assert!(table.is_indeterminate());

    let mut empty = numbered(0, 2);
    empty.set_all_selected(true);
    assert!(!empty.is_all_selected());
    assert!(!empty.is_indeterminate());
}

#[test]
fn test_selection_survives_filtering_by_identity() {
    let config = TableConfig::new(vec![
        ColumnDescriptor::new("id", "ID"),
        ColumnDescriptor::new("team", "Team"),
    ])
    .with_row_key("id");
    let mut table = DataTable::new(config).unwrap();
    table.set_rows(vec![
        Row::new().set("id", "r1").set("team", "web"),
        Row::new().set("id", "r2").set("team", "core"),
        Row::new().set("id", "r3").set("team", "web"),
    ]);

    table.select_row(2);
    table.set_filter("team", ["web"]);
    assert!(table.is_selected(1));
    assert_eq!(table.selected_count(), 1);
    assert_eq!(table.selected_rows()[0].value("id").to_string(), "r3");
}

#[test]
fn test_page_info_and_navigation() {
    let mut table = numbered(25, 10);
    assert_eq!(table.next_page(), 2);
    let info = table.page_info();
    assert_eq!((info.start, info.end, info.total), (11, 20, 25));
    assert_eq!(table.last_page(), 3);
    assert_eq!(table.page_info().end, 25);
    assert_eq!(table.prev_page(), 2);
    assert_eq!(table.first_page(), 1);
}

#[test]
fn test_per_page_change_reclamps() {
    let mut table = numbered(10, 2);
    table.set_page(5);
    assert_eq!(table.set_per_page(5), 2);
    assert_eq!(table.per_page(), 5);
}

#[test]
fn test_timestamp_cells_keep_their_text() {
    let config = TableConfig::new(vec![ColumnDescriptor::new("at", "At").typed(ColumnType::Date)]);
    let mut table = DataTable::new(config).unwrap();
    let rows: Vec<Row> = serde_json::from_str(
        r#"[{"at": "2024-01-02T03:04:05.000Z"}, {"at": "2024-01-02T03:04:05+02:00"}]"#,
    )
    .unwrap();
    table.set_rows(rows);

    table.set_filter("at", ["2024-01-02T03:04:05+02:00"]);
    assert_eq!(table.processed_rows().len(), 1);
    table.reset_filters();

    table.set_search("05.000Z");
    table.flush_search();
    let found = table.processed_rows().into_owned();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].value("at").to_string(), "2024-01-02T03:04:05.000Z");

    table.set_search("");
    table.flush_search();
    table.sort_by("at");
    let sorted = table.processed_rows().into_owned();
    let csv = export::to_csv(&sorted, table.columns(), &ExportOptions::default());
    assert_eq!(
        csv,
        "\"At\"\n\"2024-01-02T03:04:05+02:00\"\n\"2024-01-02T03:04:05.000Z\"\n"
    );
}

#[test]
fn test_rows_sharing_a_key_encoding_select_separately() {
    let config = TableConfig::new(vec![ColumnDescriptor::new("id", "ID")]).with_row_key("id");
    let mut table = DataTable::new(config).unwrap();
    table.set_rows(vec![
        Row::new().set("id", Value::Null),
        Row::new().set("id", Value::Null),
        Row::new().set("id", 1i64),
        Row::new().set("id", "1"),
    ]);

    table.select_row(0);
    table.select_row(2);

    assert_eq!(table.selected_count(), 2);
    assert!(!table.is_selected(1));
    assert!(!table.is_selected(3));
    assert!(table.is_indeterminate());
}
