//! Workbook parsing and tabular renderings
//!
//! The first worksheet is read with `calamine`. Its first row becomes the
//! column headers and every following row a data row. Renderings carry a
//! leading 0-based row index, the way a data frame prints.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::io::Cursor;

use calamine::{Data, Reader};
use minijinja::HtmlEscape;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpreadsheetError {
    #[error("unable to read workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("workbook has no worksheets")]
    NoWorksheet,
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Column headers plus data rows, every cell already rendered as text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Parse an `.xlsx`, `.xls`, `.xlsb` or `.ods` workbook; the format is
    /// detected from the bytes, not from any declared content type.
    pub fn from_workbook_bytes(bytes: &[u8]) -> Result<Self, SpreadsheetError> {
        let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or(SpreadsheetError::NoWorksheet)??;

        // The range begins at the first used cell; blank columns to its left
        // still count as columns
        let leading = range
            .start()
            .and_then(|(_, col)| usize::try_from(col).ok())
            .unwrap_or(0);
        Ok(Self::from_rows(range.rows().map(|row| {
            std::iter::repeat(String::new())
                .take(leading)
                .chain(row.iter().map(render_cell))
                .collect()
        })))
    }

    /// Build a table whose first row is the header row. Short rows are padded
    /// with empty cells to the widest row. Blank headers become
    /// `Unnamed: <position>` and repeated ones get a `.1`, `.2`, ... suffix.
    pub fn from_rows(rows: impl IntoIterator<Item = Vec<String>>) -> Self {
        let mut rows = rows.into_iter();
        let mut columns = rows.next().unwrap_or_default();
        let mut data: Vec<Vec<String>> = rows.collect();

        let width = data
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(columns.len()))
            .max()
            .unwrap_or(0);
        columns.resize(width, String::new());
        for row in &mut data {
            row.resize(width, String::new());
        }

        Self {
            columns: column_names(columns),
            rows: data,
        }
    }

    /// Serialize as CSV: an index header cell followed by the column names,
    /// then one `index,values...` record per row.
    pub fn to_csv(&self) -> Result<Vec<u8>, SpreadsheetError> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        writer.write_record(std::iter::once("").chain(self.columns.iter().map(String::as_str)))?;
        for (index, row) in self.rows.iter().enumerate() {
            let index = index.to_string();
            writer.write_record(
                std::iter::once(index.as_str()).chain(row.iter().map(String::as_str)),
            )?;
        }

        writer
            .into_inner()
            .map_err(|e| SpreadsheetError::Csv(e.into_error().into()))
    }

    /// Render as an HTML table. Empty cells print as `NaN`.
    pub fn to_html(&self) -> String {
        let mut html = String::from("<table border=\"1\" class=\"dataframe\">\n");
        html.push_str("  <thead>\n    <tr style=\"text-align: right;\">\n      <th></th>\n");
        for column in &self.columns {
            let _ = writeln!(html, "      <th>{}</th>", HtmlEscape(column));
        }
        html.push_str("    </tr>\n  </thead>\n  <tbody>\n");
        for (index, row) in self.rows.iter().enumerate() {
            let _ = writeln!(html, "    <tr>\n      <th>{index}</th>");
            for cell in row {
                let shown = if cell.is_empty() { "NaN" } else { cell.as_str() };
                let _ = writeln!(html, "      <td>{}</td>", HtmlEscape(shown));
            }
            html.push_str("    </tr>\n");
        }
        html.push_str("  </tbody>\n</table>");
        html
    }
}

/// Integral floats print without a fractional part, like an integer column
#[allow(clippy::float_cmp, clippy::cast_possible_truncation)]
fn render_cell(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => (*f as i64).to_string(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(true) => "True".to_string(),
        Data::Bool(false) => "False".to_string(),
        other => other.to_string(),
    }
}

fn column_names(raw: Vec<String>) -> Vec<String> {
    let named: Vec<String> = raw
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            if name.is_empty() {
                format!("Unnamed: {i}")
            } else {
                name
            }
        })
        .collect();

    let mut seen: HashSet<String> = HashSet::with_capacity(named.len());
    let mut columns = Vec::with_capacity(named.len());
    for name in named {
        let mut unique = name.clone();
        let mut suffix = 1;
        while seen.contains(&unique) {
            unique = format!("{name}.{suffix}");
            suffix += 1;
        }
        seen.insert(unique.clone());
        columns.push(unique);
    }
    columns
}

/// Build an `.xlsx` workbook in memory; shared by handler tests
#[cfg(test)]
pub fn xlsx_fixture(rows: &[&[&str]]) -> Vec<u8> {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            let (r, c) = (u32::try_from(r).unwrap(), u16::try_from(c).unwrap());
            if let Ok(number) = value.parse::<f64>() {
                sheet.write_number(r, c, number).unwrap();
            } else {
                sheet.write_string(r, c, *value).unwrap();
            }
        }
    }
    workbook.save_to_buffer().unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(row: &[&str]) -> Vec<String> {
        row.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_xlsx_workbook() {
        let bytes = xlsx_fixture(&[&["name", "age"], &["Wade", "33"], &["Bob", "41.5"]]);
        let table = Table::from_workbook_bytes(&bytes).unwrap();
        assert_eq!(table.columns, strings(&["name", "age"]));
        assert_eq!(table.rows, vec![strings(&["Wade", "33"]), strings(&["Bob", "41.5"])]);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(Table::from_workbook_bytes(b"definitely not a workbook").is_err());
    }

    #[test]
    fn test_csv_round_trip() {
        let table = Table::from_rows(vec![strings(&["greeting", "name"]), strings(&["Hi, there", "Bob"])]);
        let csv_bytes = table.to_csv().unwrap();

        let mut reader = csv::Reader::from_reader(csv_bytes.as_slice());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), vec!["", "greeting", "name"]);
        let records: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].iter().collect::<Vec<_>>(), vec!["0", "Hi, there", "Bob"]);
    }

    #[test]
    fn test_csv_layout() {
        let table = Table::from_rows(vec![strings(&["a", "b"]), strings(&["1", "2"])]);
        assert_eq!(table.to_csv().unwrap(), b",a,b\n0,1,2\n");
    }

    #[test]
    fn test_short_rows_are_padded() {
        let table = Table::from_rows(vec![strings(&["a"]), strings(&["1", "2"])]);
        assert_eq!(table.columns, strings(&["a", "Unnamed: 1"]));
        assert_eq!(table.rows[0], strings(&["1", "2"]));
    }

    #[test]
    fn test_blank_and_repeated_headers_are_renamed() {
        let table = Table::from_rows(vec![
            strings(&["a", "", "a", "a.1", "a"]),
            strings(&["1", "2", "3", "4", "5"]),
        ]);
        assert_eq!(
            table.columns,
            strings(&["a", "Unnamed: 1", "a.1", "a.1.1", "a.2"])
        );
        assert_eq!(
            table.to_csv().unwrap(),
            b",a,Unnamed: 1,a.1,a.1.1,a.2\n0,1,2,3,4,5\n"
        );
    }

    #[test]
    fn test_blank_leading_column_is_kept() {
        let bytes = xlsx_fixture(&[&["", "b"], &["", "2"]]);
        let table = Table::from_workbook_bytes(&bytes).unwrap();
        assert_eq!(table.columns, strings(&["Unnamed: 0", "b"]));
        assert_eq!(table.to_csv().unwrap(), b",Unnamed: 0,b\n0,,2\n");
    }

    #[test]
    fn test_html_rendering() {
        let table = Table::from_rows(vec![strings(&["x", "<y>"]), strings(&["1", ""])]);
        let html = table.to_html();
        assert!(html.starts_with("<table border=\"1\" class=\"dataframe\">"));
        assert!(html.contains("<th>&lt;y&gt;</th>"));
        assert!(html.contains("<th>0</th>"));
        assert!(html.contains("<td>1</td>"));
        assert!(html.contains("<td>NaN</td>"));
    }

    #[test]
    fn test_empty_table() {
        let table = Table::from_rows(Vec::new());
        assert_eq!(table, Table::default());
        assert!(table.to_html().contains("<tbody>\n  </tbody>"));
    }
}
