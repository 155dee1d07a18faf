//! Column-aligned text tables.

/// A borderless table with left-aligned columns.
#[derive(Debug)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    column_widths: Vec<usize>,
}

const COLUMN_GAP: usize = 3;

impl Table {
    /// Create a table with the given headers.
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
        let column_widths = headers.iter().map(|h| console::measure_text_width(h)).collect();
        Self {
            headers,
            rows: Vec::new(),
            column_widths,
        }
    }

    /// Append a row. Cells beyond the header count are dropped.
    pub fn add_row<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row: Vec<String> = row.into_iter().map(Into::into).collect();
        row.truncate(self.headers.len());
        for (width, cell) in self.column_widths.iter_mut().zip(&row) {
            *width = (*width).max(console::measure_text_width(cell));
        }
        self.rows.push(row);
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render the header and rows, one line each.
    pub fn render(&self) -> String {
        let mut output = self.render_row(&self.headers);
        for row in &self.rows {
            output.push('\n');
            output.push_str(&self.render_row(row));
        }
        output
    }

    fn render_row(&self, row: &[String]) -> String {
        let mut line = String::new();
        let last = self.column_widths.len().saturating_sub(1);
        for (i, width) in self.column_widths.iter().enumerate() {
            let cell = row.get(i).map(String::as_str).unwrap_or("");
            line.push_str(cell);
            if i < last {
                let pad = width - console::measure_text_width(cell) + COLUMN_GAP;
                line.push_str(&" ".repeat(pad));
            }
        }
        line.trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_table_renders_header() {
        let table = Table::new(["NAME", "REQUIRED"]);
        assert!(table.is_empty());
        assert_eq!(table.render(), "NAME   REQUIRED");
    }

    #[test]
    fn columns_align_to_widest_cell() {
        let mut table = Table::new(["NAME", "REQUIRED", "DEFAULT"]);
        table.add_row(["DB_PASSWORD", "true", ""]);
        table.add_row(["TAG", "false", "latest"]);
        assert_eq!(table.row_count(), 2);

        let lines: Vec<String> = table.render().lines().map(String::from).collect();
        assert_eq!(lines[0], "NAME          REQUIRED   DEFAULT");
        assert_eq!(lines[1], "DB_PASSWORD   true");
        assert_eq!(lines[2], "TAG           false      latest");
    }

    #[test]
    fn missing_cells_render_blank() {
        let mut table = Table::new(["A", "B", "C"]);
        table.add_row(["only"]);
        assert_eq!(table.render().lines().nth(1), Some("only"));
    }

    #[test]
    fn extra_cells_are_dropped() {
        let mut table = Table::new(["A"]);
        table.add_row(["x", "y"]);
        assert!(!table.render().contains('y'));
    }
}
