//! Plain CSV import and export for report tables.
//!
//! Cells are JSON literals: numbers, booleans and quoted strings survive
//! a round trip, anything that does not parse is kept as raw text. The
//! format has no quoting, so a comma always separates cells.

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl CsvTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { headers, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.rows.is_empty()
    }

    /// Column index for `header`.
    pub fn column(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }
}

/// Parse CSV text. Blank lines are skipped; the first remaining line is
/// the header row. Text with no non-blank line yields an empty table.
pub fn import_csv(text: &str) -> CsvTable {
    let mut lines = text.split('\n').map(str::trim).filter(|l| !l.is_empty());

    let Some(header_line) = lines.next() else {
        return CsvTable::default();
    };
    let headers = header_line.split(',').map(|h| h.trim().to_string()).collect();
    let rows = lines
        .map(|line| line.split(',').map(parse_cell).collect())
        .collect();

    CsvTable { headers, rows }
}

fn parse_cell(cell: &str) -> Value {
    serde_json::from_str(cell).unwrap_or_else(|_| Value::String(cell.to_string()))
}

/// Render a table: headers as-is, every cell as a JSON literal.
pub fn export_csv(table: &CsvTable) -> String {
    let mut lines = Vec::with_capacity(table.rows.len() + 1);
    lines.push(table.headers.join(","));
    for row in &table.rows {
        let cells: Vec<String> = row.iter().map(Value::to_string).collect();
        lines.push(cells.join(","));
    }
    lines.join("\n")
}
