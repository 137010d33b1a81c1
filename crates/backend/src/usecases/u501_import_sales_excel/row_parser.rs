use calamine::{open_workbook_from_rs, Data, Reader, Xlsx, XlsxError};
use std::collections::HashMap;
use std::io::Cursor;

use super::ImportError;

/// Where the table sits inside the workbook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParserOptions {
    /// 0-based worksheet position; other sheets are ignored
    pub worksheet_index: usize,
    /// 0-based worksheet row holding column names; data starts on the next row
    pub header_row_index: usize,
}

/// Нетипизированное значение ячейки
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Cell formatted as a date, kept as its 1900-system serial number
    DateSerial(f64),
    Error(String),
}

impl RawCell {
    fn is_blank(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<&Data> for RawCell {
    fn from(cell: &Data) -> Self {
        match cell {
            Data::Empty => RawCell::Empty,
            Data::String(s) => RawCell::Text(s.clone()),
            Data::Float(f) => RawCell::Number(*f),
            Data::Int(i) => RawCell::Number(*i as f64),
            Data::Bool(b) => RawCell::Bool(*b),
            Data::DateTime(dt) => RawCell::DateSerial(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => RawCell::Text(s.clone()),
            Data::Error(e) => RawCell::Error(format!("{:?}", e)),
        }
    }
}

/// Одна строка листа: имя колонки -> значение
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// 1-based worksheet row number
    pub row_number: usize,
    pub cells: HashMap<String, RawCell>,
}

impl RawRow {
    pub fn get(&self, column: &str) -> &RawCell {
        self.cells.get(column).unwrap_or(&RawCell::Empty)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSheet {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

/// Reads the configured worksheet of an .xlsx payload.
///
/// Fully blank rows are dropped. Fails with [`ImportError::Parse`] when the
/// bytes are not a workbook or no data row follows the header.
pub fn parse_workbook(bytes: &[u8], options: &ParserOptions) -> Result<ParsedSheet, ImportError> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e: XlsxError| ImportError::Parse(format!("Invalid Excel file: {}", e)))?;

    let sheet_count = workbook.sheet_names().len();
    let range = workbook
        .worksheet_range_at(options.worksheet_index)
        .ok_or_else(|| {
            ImportError::Parse(format!(
                "Worksheet {} not found, workbook has {} sheet(s)",
                options.worksheet_index, sheet_count
            ))
        })?
        .map_err(|e| ImportError::Parse(format!("Failed to read worksheet: {}", e)))?;

    // The range starts at the first used cell, not at A1
    let Some((start_row, _)) = range.start() else {
        return Err(no_data());
    };
    let start_row = start_row as usize;
    if options.header_row_index < start_row {
        return Err(ImportError::Parse(format!(
            "Header row {} is empty",
            options.header_row_index + 1
        )));
    }

    let mut rows = range.rows().skip(options.header_row_index - start_row);
    let header_row = rows.next().ok_or_else(no_data)?;
    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| cell.to_string().trim().to_string())
        .collect();

    let mut records = Vec::new();
    for (offset, data_row) in rows.enumerate() {
        let mut cells = HashMap::new();
        for (col_idx, cell) in data_row.iter().enumerate() {
            let Some(header) = headers.get(col_idx) else {
                continue;
            };
            if header.is_empty() {
                continue;
            }
            // First column wins when a header name repeats
            cells
                .entry(header.clone())
                .or_insert_with(|| RawCell::from(cell));
        }

        if cells.values().all(RawCell::is_blank) {
            continue;
        }

        records.push(RawRow {
            row_number: options.header_row_index + offset + 2,
            cells,
        });
    }

    if records.is_empty() {
        return Err(no_data());
    }

    tracing::info!(
        "Parsed worksheet {}: {} column(s), {} data row(s)",
        options.worksheet_index,
        headers.iter().filter(|h| !h.is_empty()).count(),
        records.len()
    );

    Ok(ParsedSheet {
        headers: headers.into_iter().filter(|h| !h.is_empty()).collect(),
        rows: records,
    })
}

fn no_data() -> ImportError {
    ImportError::Parse("No data found in Excel file".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::u501_import_sales_excel::test_support::{workbook, workbook_with_sheets, Cell};

    fn header() -> Vec<Cell> {
        ["OrderID", "Region", "Country", "Product", "Revenue", "OrderDate"]
            .into_iter()
            .map(Cell::S)
            .collect()
    }

    #[test]
    fn test_rejects_non_workbook_payload() {
        let err = parse_workbook(b"definitely not a zip", &ParserOptions::default()).unwrap_err();
        assert!(matches!(err, ImportError::Parse(ref m) if m.starts_with("Invalid Excel file")));
    }

    #[test]
    fn test_header_only_sheet_has_no_data() {
        let bytes = workbook(&[header()]);
        let err = parse_workbook(&bytes, &ParserOptions::default()).unwrap_err();
        assert!(matches!(err, ImportError::Parse(ref m) if m == "No data found in Excel file"));
    }

    #[test]
    fn test_empty_sheet_has_no_data() {
        let bytes = workbook(&[]);
        assert!(matches!(
            parse_workbook(&bytes, &ParserOptions::default()),
            Err(ImportError::Parse(_))
        ));
    }

    #[test]
    fn test_rows_are_keyed_by_header() {
        let bytes = workbook(&[
            header(),
            vec![
                Cell::S("SO-1"),
                Cell::S("EU"),
                Cell::S("DE"),
                Cell::S("Widget"),
                Cell::N(100.0),
                Cell::Date(45306.0),
            ],
        ]);

        let sheet = parse_workbook(&bytes, &ParserOptions::default()).unwrap();
        assert_eq!(sheet.headers.len(), 6);
        assert_eq!(sheet.rows.len(), 1);

        let row = &sheet.rows[0];
        assert_eq!(row.row_number, 2);
        assert_eq!(row.get("OrderID"), &RawCell::Text("SO-1".into()));
        assert_eq!(row.get("Revenue"), &RawCell::Number(100.0));
        assert_eq!(row.get("OrderDate"), &RawCell::DateSerial(45306.0));
        assert_eq!(row.get("Unknown"), &RawCell::Empty);
    }

    #[test]
    fn test_blank_rows_are_skipped() {
        let bytes = workbook(&[
            header(),
            vec![Cell::S("SO-1"), Cell::S("EU")],
            vec![],
            vec![Cell::S("SO-2"), Cell::S("NA")],
        ]);

        let sheet = parse_workbook(&bytes, &ParserOptions::default()).unwrap();
        let numbers: Vec<usize> = sheet.rows.iter().map(|r| r.row_number).collect();
        assert_eq!(numbers, vec![2, 4]);
    }

    #[test]
    fn test_only_configured_worksheet_is_read() {
        let first = vec![vec![Cell::S("Notes")], vec![Cell::S("ignore me")]];
        let second = vec![header(), vec![Cell::S("SO-7")]];
        let bytes = workbook_with_sheets(&[first, second]);

        let default_sheet = parse_workbook(&bytes, &ParserOptions::default()).unwrap();
        assert_eq!(default_sheet.headers, vec!["Notes".to_string()]);

        let options = ParserOptions {
            worksheet_index: 1,
            header_row_index: 0,
        };
        let sheet = parse_workbook(&bytes, &options).unwrap();
        assert_eq!(sheet.rows[0].get("OrderID"), &RawCell::Text("SO-7".into()));

        let missing = ParserOptions {
            worksheet_index: 5,
            header_row_index: 0,
        };
        assert!(matches!(
            parse_workbook(&bytes, &missing),
            Err(ImportError::Parse(_))
        ));
    }

    #[test]
    fn test_header_row_index_skips_title_rows() {
        let bytes = workbook(&[
            vec![Cell::S("Quarterly export")],
            vec![],
            header(),
            vec![Cell::S("SO-1"), Cell::S("EU")],
        ]);

        let options = ParserOptions {
            worksheet_index: 0,
            header_row_index: 2,
        };
        let sheet = parse_workbook(&bytes, &options).unwrap();
        assert!(sheet.headers.contains(&"OrderID".to_string()));
        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(sheet.rows[0].row_number, 4);
    }
}
