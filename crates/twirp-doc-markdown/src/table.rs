//! Pipe tables with computed column widths.

use std::io::{self, Write};

use crate::node::Node;
use crate::util::char_width;

/// Minimum display width of a declared column.
const MIN_WIDTH: usize = 3;
/// Width of a column synthesized for cells beyond the declared columns.
const OVERFLOW_WIDTH: usize = 5;

/// Column alignment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    None,
    Left,
    Center,
    Right,
}

/// Table column header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Column {
    /// Header title.
    pub title: String,
    /// Alignment of the header and every cell below it.
    pub align: Align,
}

/// Markdown table.
///
/// Cells are arbitrary nodes. Each cell is rendered once into a scratch
/// string so that column widths are known before the first byte of the
/// table is written.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<Node>>,
}

impl Table {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the next column.
    pub fn add_column(&mut self, title: impl Into<String>, align: Align) {
        self.columns.push(Column {
            title: title.into(),
            align,
        });
    }

    /// Append a row of cells.
    ///
    /// A row may carry more cells than there are declared columns; the extra
    /// cells get blank-titled columns when the table is rendered.
    pub fn append_row(&mut self, cells: Vec<Node>) {
        self.rows.push(cells);
    }

    /// Append a row of plain text cells.
    pub fn append_text_row(&mut self, cells: &[&str]) {
        self.append_row(cells.iter().map(|&s| Node::text(s)).collect());
    }

    /// Declared columns.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Write the table to `w`.
    pub(crate) fn render(&self, w: &mut dyn Write) -> io::Result<()> {
        let mut headers: Vec<(&str, Align)> = self
            .columns
            .iter()
            .map(|c| (c.title.as_str(), c.align))
            .collect();
        let mut widths: Vec<usize> = headers
            .iter()
            .map(|(title, _)| char_width(title).max(MIN_WIDTH))
            .collect();

        let mut rows = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let mut cells = Vec::with_capacity(row.len());
            for (i, cell) in row.iter().enumerate() {
                if i >= headers.len() {
                    headers.push(("", Align::None));
                    widths.push(OVERFLOW_WIDTH);
                }
                let rendered = cell.render_to_string()?;
                widths[i] = widths[i].max(char_width(&rendered));
                cells.push(rendered);
            }
            rows.push(cells);
        }

        w.write_all(b"|")?;
        for (i, (title, align)) in headers.iter().enumerate() {
            write_cell(w, title, widths[i], *align)?;
        }
        w.write_all(b"\n|")?;
        for (i, (_, align)) in headers.iter().enumerate() {
            write_separator(w, widths[i], *align)?;
        }
        w.write_all(b"\n")?;

        for row in &rows {
            w.write_all(b"|")?;
            for (i, cell) in row.iter().enumerate() {
                write_cell(w, cell, widths[i], headers[i].1)?;
            }
            w.write_all(b"\n")?;
        }

        Ok(())
    }
}

/// Write ` <content padded to width> |`.
///
/// Centered content puts the odd unit of padding on the right.
fn write_cell(w: &mut dyn Write, content: &str, width: usize, align: Align) -> io::Result<()> {
    match align {
        Align::None | Align::Left => write!(w, " {content:<width$} |"),
        Align::Center => write!(w, " {content:^width$} |"),
        Align::Right => write!(w, " {content:>width$} |"),
    }
}

/// Write the alignment marker of one column, spanning its padded width.
fn write_separator(w: &mut dyn Write, width: usize, align: Align) -> io::Result<()> {
    match align {
        Align::Left => write!(w, ":{}|", "-".repeat(width + 1)),
        Align::Center => write!(w, ":{}:|", "-".repeat(width)),
        Align::Right => write!(w, "{}:|", "-".repeat(width + 1)),
        Align::None => write!(w, "{}|", "-".repeat(width + 2)),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn render(table: Table) -> String {
        Node::from(table).render_to_string().unwrap()
    }

    #[test]
    fn test_single_column_no_align() {
        let mut table = Table::new();
        table.add_column("H", Align::None);
        table.append_text_row(&["A"]);
        table.append_text_row(&["B"]);
        table.append_text_row(&["C"]);

        assert_eq!(
            render(table),
            "| H   |\n|-----|\n| A   |\n| B   |\n| C   |\n"
        );
    }

    #[test]
    fn test_all_alignments() {
        let mut table = Table::new();
        table.add_column("H", Align::None);
        table.add_column("H", Align::Left);
        table.add_column("H", Align::Center);
        table.add_column("H", Align::Right);
        table.append_text_row(&["1", "1", "1", "1"]);
        table.append_text_row(&["22", "22", "22", "22"]);
        table.append_text_row(&["333", "333", "333", "333"]);
        table.append_text_row(&["44444", "44444", "44444", "44444"]);

        assert_eq!(
            render(table),
            "| H     | H     |   H   |     H |\n\
             |-------|:------|:-----:|------:|\n\
             | 1     | 1     |   1   |     1 |\n\
             | 22    | 22    |  22   |    22 |\n\
             | 333   | 333   |  333  |   333 |\n\
             | 44444 | 44444 | 44444 | 44444 |\n"
        );
    }

    #[test]
    fn test_different_widths() {
        let mut table = Table::new();
        table.add_column("1", Align::None);
        table.add_column("12345", Align::Left);
        table.add_column("1234567", Align::Center);
        table.add_column("1", Align::Right);
        table.append_text_row(&["1234567", "123", "1", "1"]);
        table.append_text_row(&["1", "12345", "12", "1"]);
        table.append_text_row(&["1", "12", "123", "1234567"]);

        assert_eq!(
            render(table),
            "| 1       | 12345 | 1234567 |       1 |\n\
             |---------|:------|:-------:|--------:|\n\
             | 1234567 | 123   |    1    |       1 |\n\
             | 1       | 12345 |   12    |       1 |\n\
             | 1       | 12    |   123   | 1234567 |\n"
        );
    }

    #[test]
    fn test_formatted_cells() {
        let mut table = Table::new();
        table.add_column("A", Align::Left);
        table.add_column("B", Align::Center);
        table.add_column("C", Align::Right);
        table.append_row(vec![Node::code("code"), Node::code("code"), Node::code("code")]);
        table.append_text_row(&["12345678", "12345678", "12345678"]);
        table.append_row(vec![
            Node::text_bold("bold"),
            Node::text_italic("italic"),
            Node::text("plain"),
        ]);

        assert_eq!(
            render(table),
            "| A        |    B     |        C |\n\
             |:---------|:--------:|---------:|\n\
             | `code`   |  `code`  |   `code` |\n\
             | 12345678 | 12345678 | 12345678 |\n\
             | **bold** | *italic* |    plain |\n"
        );
    }

    #[test]
    fn test_width_counts_code_points() {
        let mut table = Table::new();
        table.add_column("Имя", Align::Left);
        table.add_column("Wert", Align::Right);
        table.append_text_row(&["日本語テキスト", "ü"]);

        assert_eq!(
            render(table),
            "| Имя     | Wert |\n\
             |:--------|-----:|\n\
             | 日本語テキスト |    ü |\n"
        );
    }

    #[test]
    fn test_multibyte_title_sets_width() {
        let mut table = Table::new();
        table.add_column("Größe", Align::Center);
        table.append_text_row(&["1"]);

        assert_eq!(render(table), "| Größe |\n|:-----:|\n|   1   |\n");
    }

    #[test]
    fn test_extra_cells_get_blank_columns() {
        let mut table = Table::new();
        table.add_column("A", Align::Left);
        table.append_text_row(&["1", "2"]);

        assert_eq!(
            render(table),
            "| A   |       |\n|:----|-------|\n| 1   | 2     |\n"
        );
    }

    #[test]
    fn test_no_rows() {
        let mut table = Table::new();
        table.add_column("Only", Align::None);
        assert_eq!(render(table), "| Only |\n|------|\n");
    }

    #[test]
    fn test_accessors() {
        let mut table = Table::new();
        table.add_column("A", Align::Right);
        table.append_text_row(&["x"]);
        assert_eq!(table.row_count(), 1);
        assert_eq!(
            table.columns(),
            &[Column {
                title: "A".to_owned(),
                align: Align::Right,
            }]
        );
    }
}
