//! Plain-text rendering of a page.

use comfy_table::CellAlignment;
use comfy_table::Table;
use gridline_lib::locale::Locale;
use gridline_lib::model::Alignment;
use gridline_lib::model::ColumnDescriptor;
use gridline_lib::pipeline::Page;
use gridline_lib::pipeline::PageInfo;

/// Renders `page` as a table followed by a "Showing X-Y of Z" line.
///
/// Column labels go through `locale`, so a label may be a translation key.
pub fn render_table(page: &Page, info: PageInfo, columns: &[ColumnDescriptor], locale: &Locale) -> String {
    let mut table = Table::new();
    table.set_header(columns.iter().map(|c| locale.translate(&c.label)).collect::<Vec<_>>());
    for row in page.rows() {
        table.add_row(
            columns
                .iter()
                .map(|c| row.value(&c.key).to_filter_string())
                .collect::<Vec<_>>(),
        );
    }
    for (index, column) in columns.iter().enumerate() {
        if let Some(target) = table.column_mut(index) {
            target.set_cell_alignment(cell_alignment(column.align));
        }
    }

    let mut out = table.to_string();
    out.push('\n');
    if page.is_empty() {
        out.push_str(&locale.translate("datatable.noResults"));
        out.push('\n');
    }
    out.push_str(&footer(info, locale));
    out.push('\n');
    out
}

/// "Showing 11-20 of 95", in the locale's language.
pub fn footer(info: PageInfo, locale: &Locale) -> String {
    format!(
        "{} {}-{} {} {}",
        locale.translate("pagination.showing"),
        info.start,
        info.end,
        locale.translate("pagination.of"),
        info.total
    )
}

fn cell_alignment(align: Alignment) -> CellAlignment {
    match align {
        Alignment::Left => CellAlignment::Left,
        Alignment::Center => CellAlignment::Center,
        Alignment::Right => CellAlignment::Right,
    }
}

#[cfg(test)]
mod tests {
    use gridline_lib::locale::Language;
    use gridline_lib::model::Row;

    use super::*;

    fn columns() -> Vec<ColumnDescriptor> {
        vec![
            ColumnDescriptor::new("name", "Name"),
            ColumnDescriptor::new("age", "Age").align(Alignment::Right),
        ]
    }

    #[test]
    fn test_render_aligned_table() {
        let rows = vec![
            Row::new().set("name", "Ada").set("age", 36i64),
            Row::new().set("name", "Grace").set("age", 5i64),
        ];
        let page = Page::new(rows, 1, 2, 2, 1);
        let info = PageInfo { start: 1, end: 2, total: 2 };

        let text = render_table(&page, info, &columns(), &Locale::default());

        assert!(text.contains("| Name  | Age |"));
        assert!(text.contains("| Ada   |  36 |"));
        assert!(text.contains("| Grace |   5 |"));
        assert!(!text.contains("No results found"));
        assert!(text.ends_with("\nShowing 1-2 of 2\n"));
    }

    #[test]
    fn test_empty_page_says_no_results() {
        let page = Page::new(Vec::new(), 1, 10, 0, 1);
        let info = PageInfo { start: 0, end: 0, total: 0 };

        let text = render_table(&page, info, &columns(), &Locale::new(Language::Es));

        assert!(text.contains("No se encontraron resultados"));
        assert!(text.ends_with("Mostrando 0-0 de 0\n"));
    }

    #[test]
    fn test_labels_can_be_translation_keys() {
        let columns = vec![ColumnDescriptor::new("f", "filters.title")];
        let page = Page::new(Vec::new(), 1, 10, 0, 1);
        let info = PageInfo { start: 0, end: 0, total: 0 };

        let text = render_table(&page, info, &columns, &Locale::new(Language::Fr));
        assert!(text.contains("| Filtres |"));
    }
}
