//! Gilts-in-issue workbook parsing.
//!
//! The published workbook is a single legacy `.xls` sheet. Cell A1 carries
//! a `Data Date: DD-Mon-YYYY` stamp, followed by a "Conventional Gilts"
//! section (category marker rows and one row per gilt) and later an
//! "Index-linked Gilts" section, which is ignored.

use std::path::Path;
use std::str::FromStr;

use calamine::{open_workbook, Data, Range, Reader, Xls};
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use gilt_core::Date;
use gilt_traits::GiltRecord;

use crate::error::{IngestError, IngestResult};

/// Maturity bucket marker rows inside the conventional section.
pub const CATEGORIES: [&str; 4] = ["Ultra-Short", "Short", "Medium", "Long"];

const ISIN_COLUMN: &str = "ISIN Code";
const REDEMPTION_COLUMN: &str = "Redemption Date";
const FIRST_ISSUE_COLUMN: &str = "First Issue Date";
const DIVIDEND_COLUMN: &str = "Dividend Dates";
const AMOUNT_COLUMN: &str = "Total Amount in Issue (£ million nominal)";

/// Parsed contents of one workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkbookData {
    /// Date stamped in cell A1.
    pub data_date: Date,
    /// Conventional gilts in sheet order.
    pub records: Vec<GiltRecord>,
}

/// Opens a workbook and parses its first worksheet.
///
/// # Errors
///
/// Returns an error if the file cannot be read as `.xls`, has no
/// worksheets, lacks a data date, or the conventional header is missing a
/// required column.
pub fn load_workbook(path: &Path) -> IngestResult<WorkbookData> {
    let workbook_err = |source| IngestError::Workbook {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook: Xls<_> = open_workbook(path).map_err(workbook_err)?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| IngestError::NoWorksheet(path.to_path_buf()))?;
    let range = workbook.worksheet_range(&sheet_name).map_err(workbook_err)?;

    let data = parse_sheet(&range)?;
    log::debug!(
        "parsed {} conventional gilts from {} (data date {})",
        data.records.len(),
        path.display(),
        data.data_date
    );
    Ok(data)
}

/// Column positions resolved from the conventional header row.
#[derive(Debug, Clone, Copy)]
struct Columns {
    isin: usize,
    redemption: usize,
    first_issue: usize,
    dividend: usize,
    amount: Option<usize>,
}

impl Columns {
    fn from_header(header: &[String]) -> IngestResult<Self> {
        let find = |name: &str| {
            let wanted = normalize_header(name);
            header.iter().position(|h| *h == wanted)
        };
        let require =
            |name: &str| find(name).ok_or_else(|| IngestError::MissingColumn(name.to_string()));

        Ok(Self {
            isin: require(ISIN_COLUMN)?,
            redemption: require(REDEMPTION_COLUMN)?,
            first_issue: require(FIRST_ISSUE_COLUMN)?,
            dividend: require(DIVIDEND_COLUMN)?,
            amount: find(AMOUNT_COLUMN),
        })
    }
}

/// Parses a worksheet range into gilt records.
///
/// Rows whose ISIN cell is not a 12-character code are ignored. Rows with a
/// valid ISIN but unreadable dates, coupon or dividend descriptor are
/// skipped with a warning.
///
/// # Errors
///
/// Returns an error if cell A1 has no data date or the conventional header
/// lacks a required column.
pub fn parse_sheet(range: &Range<Data>) -> IngestResult<WorkbookData> {
    let first_cell = range.get_value((0, 0)).map(cell_text).unwrap_or_default();
    let data_date = parse_data_date(&first_cell)?;

    let first_row = range.start().map_or(0, |(row, _)| row as usize);
    let mut records = Vec::new();
    let mut category = String::new();
    let mut in_conventional = false;
    let mut columns: Option<Columns> = None;

    for (offset, row) in range.rows().enumerate() {
        let text: Vec<String> = row.iter().map(cell_text).collect();
        if text.iter().all(String::is_empty) {
            continue;
        }
        let normalized: Vec<String> = text.iter().map(|t| normalize_header(t)).collect();

        if normalized.iter().any(|t| t == "conventional gilts") {
            in_conventional = true;
        }
        if normalized.iter().any(|t| t.contains("index-linked gilts")) {
            in_conventional = false;
            continue;
        }
        if !in_conventional {
            continue;
        }
        if normalized.iter().any(|t| t == "isin code")
            && normalized.iter().any(|t| t == "redemption date")
        {
            columns = Some(Columns::from_header(&normalized)?);
            continue;
        }

        let Some(cols) = columns else {
            continue;
        };

        let name = text.first().cloned().unwrap_or_default();
        if CATEGORIES.contains(&name.as_str()) {
            category = name;
            continue;
        }

        let isin = text.get(cols.isin).cloned().unwrap_or_default();
        if !is_isin(&isin) {
            continue;
        }

        match parse_record(row, &cols, name, isin.clone(), &category) {
            Ok(record) => records.push(record),
            Err(reason) => {
                log::warn!("skipping {isin} on row {}: {reason}", first_row + offset + 1);
            }
        }
    }

    Ok(WorkbookData { data_date, records })
}

fn parse_record(
    row: &[Data],
    cols: &Columns,
    name: String,
    isin: String,
    category: &str,
) -> Result<GiltRecord, String> {
    let redemption_date = cell_date(row.get(cols.redemption))
        .map_err(|e| format!("redemption date: {e}"))?;
    let first_issue_date = cell_date(row.get(cols.first_issue))
        .map_err(|e| format!("first issue date: {e}"))?;
    let dividend_dates = row.get(cols.dividend).map(cell_text).unwrap_or_default();
    let coupon_rate_percent = parse_coupon_rate(&name)?;
    let total_amount_in_issue = cols.amount.and_then(|idx| row.get(idx)).and_then(cell_amount);

    let record = GiltRecord {
        category: category.to_string(),
        name,
        isin,
        redemption_date,
        first_issue_date,
        dividend_dates,
        total_amount_in_issue,
        coupon_rate_percent,
    };

    // Rows the engine would refuse are dropped here rather than failing the load
    record.to_terms().map_err(|e| e.to_string())?;

    Ok(record)
}

// =============================================================================
// CELL HELPERS
// =============================================================================

/// Renders a cell as trimmed text.
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(v) => v.as_f64().to_string(),
        Data::Empty | Data::Error(_) => String::new(),
    }
}

/// Lowercases and collapses whitespace, for header matching.
pub fn normalize_header(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Returns true for a 12-character code of uppercase letters and digits.
pub fn is_isin(text: &str) -> bool {
    text.len() == 12 && text.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

/// Converts an Excel serial day number (1900 date system) to a date.
pub fn excel_serial_to_date(serial: f64) -> Option<Date> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let days = serial.floor() as i64;
    // Serial 60 is Excel's phantom 29 February 1900
    let base = if days < 60 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    Date::from(base).checked_add_days(days)
}

fn cell_date(cell: Option<&Data>) -> Result<Date, String> {
    let serial = match cell {
        Some(Data::Float(f)) => *f,
        Some(Data::Int(i)) => *i as f64,
        Some(Data::DateTime(v)) => v.as_f64(),
        Some(Data::String(s)) => return Date::parse(s.trim()).map_err(|e| e.to_string()),
        Some(Data::DateTimeIso(s)) => {
            let s = s.trim();
            return Date::parse(s.get(..10).unwrap_or(s)).map_err(|e| e.to_string());
        }
        Some(other) => return Err(format!("unexpected cell {other:?}")),
        None => return Err("missing cell".to_string()),
    };
    excel_serial_to_date(serial).ok_or_else(|| format!("invalid serial date {serial}"))
}

fn cell_amount(cell: &Data) -> Option<Decimal> {
    match cell {
        Data::Float(f) => Decimal::try_from(*f).ok(),
        Data::Int(i) => Some(Decimal::from(*i)),
        Data::String(s) => Decimal::from_str(&s.trim().replace(',', "")).ok(),
        _ => None,
    }
}

// =============================================================================
// TEXT PARSERS
// =============================================================================

/// Extracts the `Data Date: DD-Mon-YYYY` stamp from the title cell.
///
/// # Errors
///
/// Returns `IngestError::MissingDataDate` if no stamp is present.
pub fn parse_data_date(text: &str) -> IngestResult<Date> {
    let lower = text.to_ascii_lowercase();

    for (idx, _) in lower.match_indices("data") {
        let Some(rest) = lower[idx + 4..].trim_start().strip_prefix("date") else {
            continue;
        };
        let Some(rest) = rest.trim_start().strip_prefix(':') else {
            continue;
        };
        let token: String = rest
            .trim_start()
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
            .collect();
        if let Ok(date) = NaiveDate::parse_from_str(&token, "%d-%b-%Y") {
            return Ok(date.into());
        }
    }

    Err(IngestError::MissingDataDate(text.to_string()))
}

fn unicode_fraction(c: char) -> Option<&'static str> {
    Some(match c {
        '¼' => "1/4",
        '½' => "1/2",
        '¾' => "3/4",
        '⅛' => "1/8",
        '⅜' => "3/8",
        '⅝' => "5/8",
        '⅞' => "7/8",
        '⅓' => "1/3",
        '⅔' => "2/3",
        '⅕' => "1/5",
        '⅖' => "2/5",
        '⅗' => "3/5",
        '⅘' => "4/5",
        '⅙' => "1/6",
        '⅚' => "5/6",
        '⅐' => "1/7",
        '⅑' => "1/9",
        '⅒' => "1/10",
        _ => return None,
    })
}

/// Reads the coupon rate from a gilt name such as `4⅛% Treasury Gilt 2030`.
///
/// The text before `%` may mix a whole number, unicode vulgar fractions
/// and `n/d` fractions, which are summed.
///
/// # Errors
///
/// Returns a description of the problem if no rate can be read.
pub fn parse_coupon_rate(name: &str) -> Result<f64, String> {
    let (prefix, _) = name
        .split_once('%')
        .ok_or_else(|| format!("no coupon in name {name:?}"))?;

    let mut expanded = String::with_capacity(prefix.len() + 8);
    for c in prefix.trim().chars() {
        match unicode_fraction(c) {
            Some(fraction) => {
                expanded.push(' ');
                expanded.push_str(fraction);
                expanded.push(' ');
            }
            None => expanded.push(c),
        }
    }

    let bad = || format!("unreadable coupon {:?} in name {name:?}", prefix.trim());
    let mut total = Decimal::ZERO;
    let mut parts = 0;
    for part in expanded.split_whitespace() {
        let value = match part.split_once('/') {
            Some((num, den)) => {
                let num = Decimal::from_str(num).map_err(|_| bad())?;
                let den = Decimal::from_str(den).map_err(|_| bad())?;
                num.checked_div(den).ok_or_else(bad)?
            }
            None => Decimal::from_str(part).map_err(|_| bad())?,
        };
        total += value;
        parts += 1;
    }

    if parts == 0 {
        return Err(bad());
    }
    total.to_f64().ok_or_else(bad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    fn text(s: &str) -> Data {
        Data::String(s.to_string())
    }

    /// Builds a sheet shaped like the published workbook.
    fn sample_sheet() -> Range<Data> {
        let mut range = Range::new((0, 0), (14, 6));
        range.set_value((0, 0), text("Gilts in Issue as at close of business    Data Date: 03-Mar-2025"));
        range.set_value((2, 0), text("Conventional Gilts"));
        let header = [
            "Conventional Gilts",
            "ISIN  Code",
            "Redemption Date",
            "First Issue\nDate",
            "Dividend Dates",
            "Current Ex-dividend date",
            "Total Amount in Issue (£ million nominal)",
        ];
        for (col, h) in header.iter().enumerate() {
            range.set_value((3, col as u32), text(h));
        }

        range.set_value((4, 0), text("Short"));
        // 2027-01-22, 2016-07-27
        range.set_value((5, 0), text("1¼% Treasury Gilt 2027"));
        range.set_value((5, 1), text("GB00BDRHNP05"));
        range.set_value((5, 2), Data::Float(46409.0));
        range.set_value((5, 3), Data::Float(42578.0));
        range.set_value((5, 4), text("22 Jan/Jul"));
        range.set_value((5, 6), Data::Float(35120.5));

        range.set_value((6, 0), text("Medium"));
        range.set_value((7, 0), text("4 1/8% Treasury Gilt 2030"));
        range.set_value((7, 1), text("GB00TEST0001"));
        range.set_value((7, 2), text("2030-06-08"));
        range.set_value((7, 3), text("2020-06-08"));
        range.set_value((7, 4), text("8 Jun/Dec"));
        range.set_value((7, 6), Data::Int(30000));

        // Malformed dividend descriptor
        range.set_value((8, 0), text("2% Treasury Gilt 2031"));
        range.set_value((8, 1), text("GB00TEST0002"));
        range.set_value((8, 2), text("2031-06-08"));
        range.set_value((8, 3), text("2021-06-08"));
        range.set_value((8, 4), text("sometime"));

        // Footnote row without an ISIN
        range.set_value((9, 0), text("Total conventional"));
        range.set_value((9, 6), Data::Float(1_900_000.0));

        range.set_value((11, 0), text("Index-linked Gilts"));
        range.set_value((12, 0), text("Short"));
        range.set_value((13, 0), text("0⅛% Index-linked Treasury Gilt 2026"));
        range.set_value((13, 1), text("GB00BYZW3J87"));
        range.set_value((13, 2), text("2026-03-22"));
        range.set_value((13, 3), text("2015-09-16"));
        range
    }

    #[test]
    fn test_parse_sheet() {
        let data = parse_sheet(&sample_sheet()).unwrap();

        assert_eq!(data.data_date, d(2025, 3, 3));
        assert_eq!(data.records.len(), 2);

        let first = &data.records[0];
        assert_eq!(first.category, "Short");
        assert_eq!(first.isin, "GB00BDRHNP05");
        assert_eq!(first.redemption_date, d(2027, 1, 22));
        assert_eq!(first.first_issue_date, d(2016, 7, 27));
        assert_eq!(first.dividend_dates, "22 Jan/Jul");
        assert_eq!(first.coupon_rate_percent, 1.25);
        assert_eq!(first.total_amount_in_issue, Some(dec!(35120.5)));

        let second = &data.records[1];
        assert_eq!(second.category, "Medium");
        assert_eq!(second.coupon_rate_percent, 4.125);
        assert_eq!(second.redemption_date, d(2030, 6, 8));
        assert_eq!(second.total_amount_in_issue, Some(dec!(30000)));
    }

    #[test]
    fn test_out_of_range_serial_skips_row() {
        let mut range = sample_sheet();
        range.set_value((5, 2), Data::Float(1.0e9));

        let data = parse_sheet(&range).unwrap();

        assert_eq!(data.records.len(), 1);
        assert_eq!(data.records[0].isin, "GB00TEST0001");
    }

    #[test]
    fn test_index_linked_section_ignored() {
        let data = parse_sheet(&sample_sheet()).unwrap();
        assert!(data.records.iter().all(|r| r.isin != "GB00BYZW3J87"));
    }

    #[test]
    fn test_missing_data_date() {
        let mut range = sample_sheet();
        range.set_value((0, 0), text("Gilts in Issue"));
        assert!(matches!(parse_sheet(&range), Err(IngestError::MissingDataDate(_))));
    }

    #[test]
    fn test_missing_column() {
        let mut range = sample_sheet();
        range.set_value((3, 4), text("Coupon Dates"));
        match parse_sheet(&range) {
            Err(IngestError::MissingColumn(name)) => assert_eq!(name, DIVIDEND_COLUMN),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_rows_before_header_ignored() {
        let mut range = sample_sheet();
        range.set_value((2, 1), text("GB00TEST0009"));
        let data = parse_sheet(&range).unwrap();
        assert_eq!(data.records.len(), 2);
    }

    #[test]
    fn test_parse_data_date() {
        assert_eq!(parse_data_date("Data Date: 03-Mar-2025").unwrap(), d(2025, 3, 3));
        assert_eq!(parse_data_date("x DATA DATE :1-sep-2024 y").unwrap(), d(2024, 9, 1));
        assert_eq!(parse_data_date("DataDate: 28-Feb-2025").unwrap(), d(2025, 2, 28));
        assert!(parse_data_date("Data Date: 2025-03-03").is_err());
        assert!(parse_data_date("").is_err());
    }

    #[test]
    fn test_parse_coupon_rate() {
        assert_eq!(parse_coupon_rate("4% Treasury Gilt 2030").unwrap(), 4.0);
        assert_eq!(parse_coupon_rate("4⅛% Treasury Gilt 2030").unwrap(), 4.125);
        assert_eq!(parse_coupon_rate("0⅞% Green Gilt 2033").unwrap(), 0.875);
        assert_eq!(parse_coupon_rate("½% Treasury Gilt 2061").unwrap(), 0.5);
        assert_eq!(parse_coupon_rate("3 1/4% Treasury Gilt 2044").unwrap(), 3.25);
        assert_eq!(parse_coupon_rate("4.25% Treasury Stock 2032").unwrap(), 4.25);
        assert!(parse_coupon_rate("Treasury Gilt 2030").is_err());
        assert!(parse_coupon_rate("% Treasury Gilt 2030").is_err());
        assert!(parse_coupon_rate("1/0% Treasury Gilt 2030").is_err());
    }

    #[test]
    fn test_excel_serial_to_date() {
        assert_eq!(excel_serial_to_date(45658.0), Some(d(2025, 1, 1)));
        assert_eq!(excel_serial_to_date(61.0), Some(d(1900, 3, 1)));
        assert_eq!(excel_serial_to_date(1.0), Some(d(1900, 1, 1)));
        assert_eq!(excel_serial_to_date(45658.75), Some(d(2025, 1, 1)));
        assert_eq!(excel_serial_to_date(0.0), None);
        assert_eq!(excel_serial_to_date(f64::NAN), None);
        assert_eq!(excel_serial_to_date(1.0e9), None);
        assert_eq!(excel_serial_to_date(f64::MAX), None);
    }

    #[test]
    fn test_is_isin() {
        assert!(is_isin("GB00BDRHNP05"));
        assert!(!is_isin("gb00bdrhnp05"));
        assert!(!is_isin("GB00BDRHNP0"));
        assert!(!is_isin("ISIN Code"));
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("  First Issue\n Date "), "first issue date");
        assert_eq!(normalize_header(AMOUNT_COLUMN), "total amount in issue (£ million nominal)");
    }

    #[test]
    fn test_load_workbook_rejects_non_xls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("20250303 - Gilts in Issue.xls");
        std::fs::write(&path, b"not a workbook").unwrap();

        assert!(matches!(load_workbook(&path), Err(IngestError::Workbook { .. })));
    }
}
