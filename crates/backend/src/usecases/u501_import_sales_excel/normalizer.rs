use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use contracts::domain::a001_sales_order::NewSalesOrder;
use contracts::usecases::u501_import_sales_excel::{RejectedRow, REQUIRED_COLUMNS};

use super::row_parser::{RawCell, RawRow};
use super::ImportError;

/// Excel 1900 date system: serial 1 = 1900-01-01, with the phantom 1900-02-29
const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);
/// Serial of 9999-12-31, the last date Excel can show
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

const TEXT_DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y", "%m/%d/%Y"];
const TEXT_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Checks the header once per import, before any row is looked at
pub fn check_required_columns(headers: &[String]) -> Result<(), ImportError> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .map(|col| col.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ImportError::Schema { missing })
    }
}

/// Строка после приведения типов, ещё не проверенная
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateOrder {
    pub row_number: usize,
    pub order_id: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub product: Option<String>,
    /// Missing input becomes 0; `None` when the cell holds something that
    /// is not a finite number
    pub revenue: Option<f64>,
    pub order_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidRow {
    pub row_number: usize,
    pub order: NewSalesOrder,
}

pub fn normalize(row: &RawRow) -> CandidateOrder {
    CandidateOrder {
        row_number: row.row_number,
        order_id: coerce_string(row.get("OrderID")),
        region: coerce_string(row.get("Region")),
        country: coerce_string(row.get("Country")),
        product: coerce_string(row.get("Product")),
        revenue: coerce_revenue(row.get("Revenue")),
        order_date: coerce_date(row.get("OrderDate")),
    }
}

impl CandidateOrder {
    pub fn validate(self) -> Result<ValidRow, RejectedRow> {
        let mut reasons = Vec::new();
        for (column, value) in [
            ("OrderID", &self.order_id),
            ("Region", &self.region),
            ("Country", &self.country),
            ("Product", &self.product),
        ] {
            if value.is_none() {
                reasons.push(format!("{} is missing", column));
            }
        }
        match self.revenue {
            None => reasons.push("Revenue is not a number".to_string()),
            Some(revenue) if revenue <= 0.0 => {
                reasons.push("Revenue must be greater than 0".to_string())
            }
            Some(_) => {}
        }
        if self.order_date.is_none() {
            reasons.push("OrderDate is missing or not a valid date".to_string());
        }

        match (
            self.order_id,
            self.region,
            self.country,
            self.product,
            self.revenue,
            self.order_date,
        ) {
            (
                Some(order_id),
                Some(region),
                Some(country),
                Some(product),
                Some(revenue),
                Some(order_date),
            ) if reasons.is_empty() =>
            {
                Ok(ValidRow {
                    row_number: self.row_number,
                    order: NewSalesOrder {
                        order_id,
                        region,
                        country,
                        product,
                        revenue,
                        order_date,
                    },
                })
            }
            _ => Err(RejectedRow {
                row_number: self.row_number,
                reasons,
            }),
        }
    }
}

/// Normalizes every row and splits them into valid orders and rejections,
/// keeping sheet order in both.
pub fn partition(rows: &[RawRow]) -> (Vec<ValidRow>, Vec<RejectedRow>) {
    let mut valid = Vec::new();
    let mut rejected = Vec::new();
    for row in rows {
        match normalize(row).validate() {
            Ok(v) => valid.push(v),
            Err(r) => rejected.push(r),
        }
    }
    (valid, rejected)
}

fn coerce_string(cell: &RawCell) -> Option<String> {
    match cell {
        RawCell::Text(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        RawCell::Number(n) | RawCell::DateSerial(n) => number_to_string(*n),
        RawCell::Bool(true) => Some("true".to_string()),
        RawCell::Bool(false) | RawCell::Empty | RawCell::Error(_) => None,
    }
}

/// Integral values print without a fraction: 1001.0 -> "1001". Zero counts as missing.
fn number_to_string(n: f64) -> Option<String> {
    if n == 0.0 || !n.is_finite() {
        return None;
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        Some(format!("{}", n as i64))
    } else {
        Some(n.to_string())
    }
}

fn coerce_revenue(cell: &RawCell) -> Option<f64> {
    match cell {
        RawCell::Number(n) | RawCell::DateSerial(n) => Some(*n).filter(|n| n.is_finite()),
        RawCell::Text(s) => parse_text_amount(s.trim()),
        RawCell::Empty => Some(0.0),
        RawCell::Bool(_) | RawCell::Error(_) => None,
    }
}

/// "5309,00" uses a decimal comma; in "1,234.50" the comma groups thousands
fn parse_text_amount(s: &str) -> Option<f64> {
    if s.is_empty() {
        return Some(0.0);
    }
    let normalized = if s.contains('.') {
        s.replace(',', "")
    } else {
        s.replace(',', ".")
    };
    normalized
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

fn coerce_date(cell: &RawCell) -> Option<NaiveDate> {
    match cell {
        RawCell::DateSerial(serial) | RawCell::Number(serial) => from_excel_serial(*serial),
        RawCell::Text(s) => parse_text_date(s.trim()),
        RawCell::Bool(_) | RawCell::Empty | RawCell::Error(_) => None,
    }
}

/// Serial 60 is the 1900-02-29 that Excel counts but the calendar lacks;
/// serials before it count from 1899-12-31 instead of 1899-12-30.
pub fn from_excel_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > MAX_EXCEL_SERIAL {
        return None;
    }
    let days = serial.floor() as i64;
    let days = match days {
        60 => return None,
        d if d < 60 => d + 1,
        d => d,
    };
    let (y, m, d) = EXCEL_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(y, m, d)?;
    epoch.checked_add_signed(Duration::days(days))
}

fn parse_text_date(s: &str) -> Option<NaiveDate> {
    if s.is_empty() {
        return None;
    }
    if let Some(date) = TEXT_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
    {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    TEXT_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn row(cells: &[(&str, RawCell)]) -> RawRow {
        RawRow {
            row_number: 2,
            cells: cells
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect::<HashMap<_, _>>(),
        }
    }

    fn text(s: &str) -> RawCell {
        RawCell::Text(s.to_string())
    }

    fn full_row(revenue: RawCell, date: RawCell) -> RawRow {
        row(&[
            ("OrderID", text("SO-1")),
            ("Region", text("EU")),
            ("Country", text("DE")),
            ("Product", text("Widget")),
            ("Revenue", revenue),
            ("OrderDate", date),
        ])
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_missing_columns_are_listed_in_canonical_order() {
        let headers: Vec<String> = ["Product", "OrderID", "Country", "Extra"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        match check_required_columns(&headers) {
            Err(ImportError::Schema { missing }) => {
                assert_eq!(missing, vec!["Region", "Revenue", "OrderDate"])
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_header_order_is_irrelevant() {
        let headers: Vec<String> = REQUIRED_COLUMNS.iter().rev().map(|s| s.to_string()).collect();
        assert!(check_required_columns(&headers).is_ok());
    }

    #[test]
    fn test_valid_row_becomes_new_order() {
        let valid = normalize(&full_row(RawCell::Number(120.5), RawCell::DateSerial(45306.0)))
            .validate()
            .unwrap();
        assert_eq!(valid.order.order_id, "SO-1");
        assert_eq!(valid.order.revenue, 120.5);
        assert_eq!(valid.order.order_date, date(2024, 1, 15));
    }

    #[test]
    fn test_numeric_order_id_renders_as_integer() {
        let mut r = full_row(RawCell::Number(1.0), text("2024-01-15"));
        r.cells.insert("OrderID".into(), RawCell::Number(1001.0));
        assert_eq!(normalize(&r).order_id.as_deref(), Some("1001"));

        r.cells.insert("OrderID".into(), RawCell::Number(0.0));
        assert_eq!(normalize(&r).order_id, None);
    }

    #[test]
    fn test_revenue_coercion() {
        let c = |cell: RawCell| normalize(&full_row(cell, text("2024-01-15"))).revenue;
        assert_eq!(c(text(" 5309,00 ")), Some(5309.0));
        assert_eq!(c(text("12.75")), Some(12.75));
        assert_eq!(c(text("1,234.50")), Some(1234.5));
        assert_eq!(c(text("n/a")), None);
        assert_eq!(c(RawCell::Empty), Some(0.0));
        assert_eq!(c(text("  ")), Some(0.0));
        assert_eq!(c(RawCell::Bool(true)), None);
    }

    #[test]
    fn test_non_finite_revenue_is_rejected() {
        for raw in ["inf", "-inf", "infinity", "NaN", "1e999"] {
            let candidate = normalize(&full_row(text(raw), text("2024-01-15")));
            assert_eq!(candidate.revenue, None, "{raw}");
            let rejected = candidate.validate().unwrap_err();
            assert_eq!(rejected.reasons, vec!["Revenue is not a number"], "{raw}");
        }

        let rejected = normalize(&full_row(RawCell::Number(f64::INFINITY), text("2024-01-15")))
            .validate()
            .unwrap_err();
        assert_eq!(rejected.reasons, vec!["Revenue is not a number"]);
    }

    #[test]
    fn test_unparseable_revenue_reason_differs_from_non_positive() {
        let garbled = normalize(&full_row(text("1.234.50"), text("2024-01-15")))
            .validate()
            .unwrap_err();
        assert_eq!(garbled.reasons, vec!["Revenue is not a number"]);

        let zero = normalize(&full_row(text("0,00"), text("2024-01-15")))
            .validate()
            .unwrap_err();
        assert_eq!(zero.reasons, vec!["Revenue must be greater than 0"]);
    }

    #[test]
    fn test_serials_before_phantom_leap_day() {
        assert_eq!(from_excel_serial(1.0), Some(date(1900, 1, 1)));
        assert_eq!(from_excel_serial(59.0), Some(date(1900, 2, 28)));
        assert_eq!(from_excel_serial(60.0), None);
        assert_eq!(from_excel_serial(61.0), Some(date(1900, 3, 1)));
        assert_eq!(from_excel_serial(45306.0), Some(date(2024, 1, 15)));
    }

    #[test]
    fn test_date_coercion() {
        let d = |cell: RawCell| normalize(&full_row(RawCell::Number(1.0), cell)).order_date;
        assert_eq!(d(text("2024-03-05")), Some(date(2024, 3, 5)));
        assert_eq!(d(text("05.03.2024")), Some(date(2024, 3, 5)));
        assert_eq!(d(text("03/05/2024")), Some(date(2024, 3, 5)));
        assert_eq!(d(text("2024-03-05T10:30:00Z")), Some(date(2024, 3, 5)));
        assert_eq!(d(text("2024-03-05 10:30:00")), Some(date(2024, 3, 5)));
        assert_eq!(d(RawCell::Number(45306.75)), Some(date(2024, 1, 15)));
        assert_eq!(d(text("2024-02-30")), None);
        assert_eq!(d(text("yesterday")), None);
        assert_eq!(d(RawCell::Number(-3.0)), None);
        assert_eq!(d(RawCell::Empty), None);
    }

    #[test]
    fn test_invalid_row_collects_every_reason() {
        let r = row(&[
            ("OrderID", text("SO-1")),
            ("Region", text("   ")),
            ("Revenue", RawCell::Number(-4.0)),
            ("OrderDate", text("never")),
        ]);
        let rejected = normalize(&r).validate().unwrap_err();
        assert_eq!(rejected.row_number, 2);
        assert_eq!(
            rejected.reasons,
            vec![
                "Region is missing",
                "Country is missing",
                "Product is missing",
                "Revenue must be greater than 0",
                "OrderDate is missing or not a valid date",
            ]
        );
    }

    #[test]
    fn test_partition_keeps_sheet_order() {
        let mut second = full_row(RawCell::Number(0.0), text("2024-01-15"));
        second.row_number = 3;
        let mut third = full_row(RawCell::Number(9.0), text("2024-01-16"));
        third.row_number = 4;
        third.cells.insert("OrderID".into(), text("SO-2"));

        let rows = vec![
            full_row(RawCell::Number(5.0), text("2024-01-15")),
            second,
            third,
        ];
        let (valid, rejected) = partition(&rows);
        let ids: Vec<&str> = valid.iter().map(|v| v.order.order_id.as_str()).collect();
        assert_eq!(ids, vec!["SO-1", "SO-2"]);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].row_number, 3);
    }
}
