//! Translation between A1 cell-range notation and the tabular query endpoint.
//!
//! Columns use bijective base-26 numbering (`A` = 0, `Z` = 25, `AA` = 26, ...)
//! and rows are one-based in the notation but zero-based in [`CellRange`].

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Host serving the public tabular query endpoint.
pub const GVIZ_HOST: &str = "https://docs.google.com";

/// Tab id assumed when the sheet link does not name one.
pub const DEFAULT_GID: &str = "0";

/// Index of the last column a sheet can have (`ZZZ`).
pub const MAX_COLUMN_INDEX: u32 = 18_277;

static RANGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z]+)([0-9]+):([A-Za-z]+)([0-9]+)$").expect("Hardcode regex pattern")
});

static SHEET_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/spreadsheets/d/([a-zA-Z0-9_-]+)").expect("Hardcode regex pattern")
});

static GID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[#&?]gid=([0-9]+)").expect("Hardcode regex pattern"));

/// A rectangular block of cells, zero-based and inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: u32,
    pub end_col: u32,
}

impl CellRange {
    /// Number of rows covered by the range.
    pub fn row_count(&self) -> u32 {
        self.end_row - self.start_row + 1
    }

    /// Column letters for every column in the range, left to right.
    pub fn column_letters(&self) -> Vec<String> {
        (self.start_col..=self.end_col).map(index_to_column).collect()
    }

    /// The `select ... limit ... offset ...` statement selecting this range.
    pub fn to_query(&self) -> String {
        format!(
            "select {} limit {} offset {}",
            self.column_letters().join(","),
            self.row_count(),
            self.start_row
        )
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}:{}{}",
            index_to_column(self.start_col),
            self.start_row + 1,
            index_to_column(self.end_col),
            self.end_row + 1
        )
    }
}

/// Parses `A1:K29` style text (letters case-insensitive).
///
/// Returns `None` for any other shape, for row `0`, for coordinates that do
/// not fit in a `u32`, for columns past [`MAX_COLUMN_INDEX`], and for reversed
/// corners such as `K29:A1`.
pub fn parse_range(text: &str) -> Option<CellRange> {
    let captures = RANGE_PATTERN.captures(text.trim())?;

    let start_col = column_to_index(&captures[1])?;
    let start_row = parse_row(&captures[2])?;
    let end_col = column_to_index(&captures[3])?;
    let end_row = parse_row(&captures[4])?;

    if start_row > end_row || start_col > end_col || end_col > MAX_COLUMN_INDEX {
        return None;
    }

    Some(CellRange {
        start_row,
        start_col,
        end_row,
        end_col,
    })
}

fn parse_row(digits: &str) -> Option<u32> {
    digits.parse::<u32>().ok()?.checked_sub(1)
}

/// Converts column letters to a zero-based index (`A` = 0, `AA` = 26).
pub fn column_to_index(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }

    let mut index: u32 = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let digit = u32::from(ch.to_ascii_uppercase() as u8 - b'A' + 1);
        index = index.checked_mul(26)?.checked_add(digit)?;
    }
    Some(index - 1)
}

/// Converts a zero-based column index to letters (0 = `A`, 25 = `Z`, 26 = `AA`).
pub fn index_to_column(index: u32) -> String {
    let mut letters = Vec::new();
    let mut n = u64::from(index) + 1;

    while n > 0 {
        n -= 1;
        letters.push((n % 26) as u8 + b'A');
        n /= 26;
    }

    letters.iter().rev().map(|&byte| byte as char).collect()
}

/// Extracts the spreadsheet id from the path of a sheet link.
pub fn extract_sheet_id(sheet_url: &str) -> Option<&str> {
    SHEET_ID_PATTERN
        .captures(sheet_url)
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str())
}

/// Extracts the tab id from a `gid=` parameter, defaulting to the first tab.
pub fn extract_gid(sheet_url: &str) -> String {
    GID_PATTERN
        .captures(sheet_url)
        .and_then(|captures| captures.get(1))
        .map(|gid| gid.as_str().to_string())
        .unwrap_or_else(|| DEFAULT_GID.to_string())
}

/// Builds the query URL for `range` on the public endpoint.
pub fn build_query_url(sheet_url: &str, range: &CellRange, gid: &str) -> Option<Url> {
    build_query_url_on(GVIZ_HOST, sheet_url, range, gid)
}

/// Builds the query URL for `range` against an explicit endpoint host.
pub fn build_query_url_on(
    host: &str,
    sheet_url: &str,
    range: &CellRange,
    gid: &str,
) -> Option<Url> {
    let sheet_id = extract_sheet_id(sheet_url)?;
    let base = format!(
        "{}/spreadsheets/d/{sheet_id}/gviz/tq",
        host.trim_end_matches('/')
    );

    let mut url = Url::parse(&base).ok()?;
    url.query_pairs_mut()
        .append_pair("tqx", "out:json")
        .append_pair("gid", gid)
        .append_pair("tq", &range.to_query());
    Some(url)
}
