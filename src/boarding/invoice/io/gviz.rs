//! Payload of the tabular query endpoint and conversion into room records.
//!
//! The endpoint answers `{status, errors?, table: {cols, rows}}`. Every field
//! is optional here so that partial or unusual payloads deserialise and the
//! structural checks happen in [`extract_records`].

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::boarding::invoice::error::{InvoiceError, Result};
use crate::boarding::invoice::header;
use crate::boarding::invoice::model::{CanonicalField, RoomRecord};

/// Minimum number of recognised columns for a range to count as a room table.
pub const MIN_RECOGNISED_HEADERS: usize = 3;

/// Shown when the provider flags an error without saying what went wrong.
pub const UNKNOWN_PROVIDER_ERROR: &str = "Lỗi không xác định từ Google API.";

/// Integral floats below this magnitude print without an exponent.
const PLAIN_INTEGER_LIMIT: f64 = 1e21;

/// Top-level payload inside the callback envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub errors: Option<Vec<QueryError>>,
    #[serde(default)]
    pub table: Option<DataTable>,
}

impl QueryResponse {
    /// True when the provider flagged the whole response as failed.
    pub fn is_error(&self) -> bool {
        self.status.as_deref() == Some("error")
    }

    /// Every embedded error message, preferring the detailed text.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .flatten()
            .filter_map(QueryError::text)
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryError {
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detailed_message: Option<String>,
}

impl QueryError {
    fn text(&self) -> Option<String> {
        self.detailed_message
            .as_deref()
            .filter(|text| !text.is_empty())
            .or(self.message.as_deref().filter(|text| !text.is_empty()))
            .or(self.reason.as_deref())
            .map(str::to_string)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataTable {
    #[serde(default)]
    pub cols: Option<Vec<Column>>,
    #[serde(default)]
    pub rows: Option<Vec<Option<Row>>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Column {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Row {
    #[serde(default)]
    pub c: Option<Vec<Option<Cell>>>,
}

/// A single cell: `v` is the raw value, `f` the sheet's formatted text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Cell {
    #[serde(default)]
    pub v: Option<Value>,
    #[serde(default)]
    pub f: Option<String>,
}

impl Cell {
    /// Formatted text if present, otherwise the raw value as text, trimmed.
    pub fn display_text(&self) -> String {
        let text = match (&self.f, &self.v) {
            (Some(formatted), _) => formatted.clone(),
            (None, Some(raw)) => value_to_string(raw),
            (None, None) => String::new(),
        };
        text.trim().to_string()
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => match number.as_f64() {
            Some(float)
                if number.is_f64() && float.fract() == 0.0 && float.abs() < PLAIN_INTEGER_LIMIT =>
            {
                if float == 0.0 {
                    "0".to_string()
                } else {
                    format!("{float}")
                }
            }
            _ => number.to_string(),
        },
        other => other.to_string(),
    }
}

/// Converts a query response into room records.
///
/// Fails when the payload carries only error messages, or when fewer than
/// [`MIN_RECOGNISED_HEADERS`] column labels map to a canonical field. A payload
/// without any table structure and without errors yields no records.
pub fn extract_records(response: &QueryResponse) -> Result<Vec<RoomRecord>> {
    let Some((cols, rows)) = response
        .table
        .as_ref()
        .and_then(|table| Some((table.cols.as_ref()?, table.rows.as_ref()?)))
    else {
        if response.errors.is_some() {
            let messages = response.error_messages();
            let detail = if messages.is_empty() {
                UNKNOWN_PROVIDER_ERROR.to_string()
            } else {
                messages.join(", ")
            };
            return Err(InvoiceError::EmbeddedErrors(detail));
        }
        return Ok(Vec::new());
    };

    let mapping = map_columns(cols);
    let recognised = mapping.iter().flatten().count();
    debug!(columns = cols.len(), recognised, "mapped column headers");
    if recognised < MIN_RECOGNISED_HEADERS {
        return Err(InvoiceError::MissingHeaders { found: recognised });
    }

    Ok(rows
        .iter()
        .filter_map(|row| row.as_ref().and_then(|row| row_to_record(row, &mapping)))
        .collect())
}

fn map_columns(cols: &[Column]) -> Vec<Option<CanonicalField>> {
    cols.iter()
        .map(|col| header::resolve(col.label.as_deref().unwrap_or_default()))
        .collect()
}

fn row_to_record(row: &Row, mapping: &[Option<CanonicalField>]) -> Option<RoomRecord> {
    let cells = row.c.as_ref()?;

    let values: Vec<(CanonicalField, String)> = mapping
        .iter()
        .zip(cells)
        .filter_map(|(field, cell)| {
            let text = cell.as_ref().map(Cell::display_text).unwrap_or_default();
            field.map(|field| (field, text))
        })
        .collect();

    if values.iter().all(|(_, value)| value.is_empty()) {
        return None;
    }

    let record = RoomRecord::from_pairs(values);
    if record.room_name().is_empty() && record.tenant_name().is_empty() {
        return None;
    }
    Some(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boarding::invoice::error::FailureKind;
    use serde_json::json;

    fn response(value: Value) -> QueryResponse {
        serde_json::from_value(value).expect("payload deserialises")
    }

    fn room_table(rows: Value) -> QueryResponse {
        response(json!({
            "status": "ok",
            "table": {
                "cols": [
                    {"id": "A", "label": "TÊN PHÒNG"},
                    {"id": "B", "label": "Tên"},
                    {"id": "C", "label": "Tiền phòng"},
                    {"id": "D", "label": "Ghi chú"},
                    {"id": "E", "label": "Tổng tiền phải\nthanh toán"}
                ],
                "rows": rows
            }
        }))
    }

    #[test]
    fn maps_cells_by_header_and_prefers_formatted_values() {
        let table = room_table(json!([
            {"c": [
                {"v": "P101"},
                {"v": "  Nguyễn Văn B "},
                {"v": 1200000.0, "f": "1,200,000 đ"},
                {"v": "ignored"},
                {"v": 2500000.0}
            ]}
        ]));

        let records = extract_records(&table).unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.room_name(), "P101");
        assert_eq!(record.tenant_name(), "Nguyễn Văn B");
        assert_eq!(record.get(CanonicalField::RoomRent), "1,200,000 đ");
        assert_eq!(record.get(CanonicalField::TotalDue), "2500000");
        assert_eq!(record.get(CanonicalField::WaterCost), "");
    }

    #[test]
    fn drops_empty_rows_and_rows_without_identity() {
        let table = room_table(json!([
            {"c": [null, null, null, null, null]},
            {"c": [{"v": ""}, {"v": " "}, null, {"v": "note"}, null]},
            {"c": [null, null, {"f": "900,000 đ"}, null, null]},
            {"c": [{"v": "P102"}, null, null, null, null]},
            null,
            {}
        ]));

        let records = extract_records(&table).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].room_name(), "P102");
        assert_eq!(records[0].get(CanonicalField::RoomRent), "");
    }

    #[test]
    fn keeps_duplicate_rooms_in_input_order() {
        let table = room_table(json!([
            {"c": [{"v": "P2"}, {"v": "An"}, null, null, null]},
            {"c": [{"v": "P1"}, {"v": "Bình"}, null, null, null]},
            {"c": [{"v": "P2"}, {"v": "Chi"}, null, null, null]}
        ]));

        let names: Vec<_> = extract_records(&table)
            .unwrap()
            .iter()
            .map(|record| record.tenant_name().to_string())
            .collect();
        assert_eq!(names, ["An", "Bình", "Chi"]);
    }

    #[test]
    fn short_rows_leave_trailing_fields_empty() {
        let table = room_table(json!([{"c": [{"v": "P3"}]}]));
        let records = extract_records(&table).unwrap();
        assert_eq!(records[0].room_name(), "P3");
        assert_eq!(records[0].get(CanonicalField::TotalDue), "");
    }

    #[test]
    fn tenant_name_alone_identifies_a_row() {
        let table = room_table(json!([{"c": [null, {"v": "Dũng"}, null, null, null]}]));
        let records = extract_records(&table).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].room_name(), "");
    }

    #[test]
    fn fewer_than_three_known_headers_fails() {
        let table = response(json!({
            "table": {
                "cols": [{"label": "TÊN PHÒNG"}, {"label": "TÊN"}, {"label": "Ghi chú"}],
                "rows": []
            }
        }));
        let error = extract_records(&table).unwrap_err();
        assert!(matches!(error, InvoiceError::MissingHeaders { found: 2 }));
    }

    #[test]
    fn headerless_range_fails_even_with_rows() {
        let table = response(json!({
            "table": {
                "cols": [{"id": "A", "label": ""}, {"id": "B"}, {"id": "C", "label": ""}],
                "rows": [{"c": [{"v": "TÊN PHÒNG"}, {"v": "TÊN"}, {"v": "DV"}]}]
            }
        }));
        assert!(matches!(
            extract_records(&table),
            Err(InvoiceError::MissingHeaders { found: 0 })
        ));
    }

    #[test]
    fn valid_headers_without_rows_yield_nothing() {
        let table = room_table(json!([]));
        assert!(extract_records(&table).unwrap().is_empty());
    }

    #[test]
    fn missing_structure_without_errors_yields_nothing() {
        assert!(extract_records(&response(json!({}))).unwrap().is_empty());
        assert!(extract_records(&response(json!({"table": {"cols": []}}))).unwrap().is_empty());
    }

    #[test]
    fn missing_structure_with_errors_lists_every_message() {
        let payload = response(json!({
            "errors": [
                {"reason": "invalid_query", "message": "short", "detailed_message": "bad column"},
                {"message": "second problem"}
            ]
        }));
        let error = extract_records(&payload).unwrap_err();
        let InvoiceError::EmbeddedErrors(text) = &error else {
            panic!("unexpected error: {error:?}");
        };
        assert_eq!(text, "bad column, second problem");
    }

    #[test]
    fn error_list_without_text_still_fails() {
        for payload in [
            json!({"errors": [{}]}),
            json!({"errors": []}),
            json!({"errors": [{"message": ""}]}),
        ] {
            let error = extract_records(&response(payload)).unwrap_err();
            let InvoiceError::EmbeddedErrors(text) = &error else {
                panic!("unexpected error: {error:?}");
            };
            assert_eq!(text, UNKNOWN_PROVIDER_ERROR);
            assert_eq!(error.kind(), FailureKind::ExtractionError);
        }
    }

    #[test]
    fn large_integral_numbers_print_in_full() {
        assert_eq!(value_to_string(&json!(1e15)), "1000000000000000");
        assert_eq!(value_to_string(&json!(123456789012345680000.0)), "123456789012345680000");
        assert_eq!(value_to_string(&json!(-2500000.0)), "-2500000");
        assert_eq!(value_to_string(&json!(-0.0)), "0");
    }

    #[test]
    fn extraction_is_repeatable() {
        let table = room_table(json!([
            {"c": [{"v": "P1"}, {"v": "An"}, {"v": 1.5}, null, {"v": true}]}
        ]));
        assert_eq!(extract_records(&table).unwrap(), extract_records(&table).unwrap());
        assert_eq!(
            extract_records(&table).unwrap()[0].get(CanonicalField::RoomRent),
            "1.5"
        );
    }
}
