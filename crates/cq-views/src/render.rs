//! Plain-text rendering of result tables

use comfy_table::{Cell, Table};

use crate::tables::DisplayResult;

/// Draw a bordered text table. Null cells print as `NULL`.
pub fn render_table(result: &DisplayResult) -> String {
    if result.columns.is_empty() {
        return "Query returned 0 rows\n".to_string();
    }

    let mut table = Table::new();
    table.set_header(result.columns.iter().map(Cell::new));

    for row in &result.rows {
        table.add_row(row.iter().map(|cell| Cell::new(cell.to_string())));
    }

    format!("{table}\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::DisplayCell;

    fn result(columns: &[&str], rows: Vec<Vec<DisplayCell>>) -> DisplayResult {
        DisplayResult {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            displayed_count: rows.len(),
            total_count: rows.len(),
            rows,
            elapsed_ms: 0.0,
            summary: String::new(),
        }
    }

    #[test]
    fn test_render_aligns_columns() {
        let text = render_table(&result(
            &["id", "name"],
            vec![
                vec![DisplayCell::Text("1".to_string()), DisplayCell::Text("alice".to_string())],
                vec![DisplayCell::Text("10".to_string()), DisplayCell::Null],
            ],
        ));

        let lines: Vec<&str> = text.lines().collect();
        let width = lines[0].chars().count();
        assert!(lines.iter().all(|l| l.chars().count() == width));

        let header = lines.iter().find(|l| l.contains("id")).unwrap();
        assert!(header.contains("name"));
        assert!(lines.iter().any(|l| l.contains("alice")));
        assert!(lines.iter().any(|l| l.contains("10") && l.contains("NULL")));
    }

    #[test]
    fn test_wide_characters_keep_borders_aligned() {
        let text = render_table(&result(
            &["city"],
            vec![
                vec![DisplayCell::Text("東京".to_string())],
                vec![DisplayCell::Text("Oslo".to_string())],
            ],
        ));

        // The CJK row is two characters but four columns wide
        let lines: Vec<&str> = text.lines().collect();
        let tokyo = lines.iter().find(|l| l.contains("東京")).unwrap();
        let oslo = lines.iter().find(|l| l.contains("Oslo")).unwrap();
        assert_eq!(tokyo.chars().count() + 2, oslo.chars().count());
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_table(&result(&[], Vec::new())), "Query returned 0 rows\n");
    }
}
