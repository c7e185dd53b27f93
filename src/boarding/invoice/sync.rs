use std::path::Path;

use tracing::{debug, info, instrument};

use crate::boarding::invoice::draft::{self, Drafter};
use crate::boarding::invoice::error::{InvoiceError, Result};
use crate::boarding::invoice::io::excel_write;
use crate::boarding::invoice::io::fetch::SheetsClient;
use crate::boarding::invoice::model::{BillingPeriod, PaymentSettings, RoomRecord};
use crate::boarding::invoice::render;
use crate::boarding::invoice::settings::Settings;

/// Layout used when rendering a single invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvoiceStyle {
    /// Compact text for pasting into a message.
    #[default]
    Plain,
    /// Full document with an item table.
    Statement,
}

/// Fetches the room records described by the saved sheet link and range.
#[instrument(level = "info", skip_all, fields(range = %settings.range))]
pub fn load_rooms(client: &SheetsClient, settings: &Settings) -> Result<Vec<RoomRecord>> {
    client.fetch_records(&settings.sheet_url, &settings.range)
}

/// Finds the first record whose room name matches `query`, falling back to
/// the tenant name. Matching ignores case and surrounding whitespace; a blank
/// query matches nothing.
pub fn select_room<'a>(records: &'a [RoomRecord], query: &str) -> Result<&'a RoomRecord> {
    let wanted = query.trim().to_lowercase();
    if wanted.is_empty() {
        return Err(InvoiceError::RoomNotFound(query.to_string()));
    }
    let same = |value: &str| value.trim().to_lowercase() == wanted;

    records
        .iter()
        .find(|record| same(record.room_name()))
        .or_else(|| records.iter().find(|record| same(record.tenant_name())))
        .ok_or_else(|| InvoiceError::RoomNotFound(query.to_string()))
}

/// Renders the invoice for one room in the requested layout.
pub fn render_invoice(
    record: &RoomRecord,
    payment: &PaymentSettings,
    period: &BillingPeriod,
    style: InvoiceStyle,
) -> String {
    match style {
        InvoiceStyle::Plain => render::plain_text(record, payment, period),
        InvoiceStyle::Statement => render::statement(record, payment, period),
    }
}

/// Writes the room table to an `.xlsx` workbook.
#[instrument(level = "info", skip(records), fields(output = %output.display()))]
pub fn export_rooms(records: &[RoomRecord], output: &Path) -> Result<()> {
    excel_write::write_rooms(output, records)?;
    info!(record_count = records.len(), "exported room table");
    Ok(())
}

/// Asks `drafter` for a natural-language invoice for one room.
#[instrument(level = "info", skip_all, fields(room = %record.room_name()))]
pub fn draft_invoice(
    drafter: &dyn Drafter,
    record: &RoomRecord,
    payment: &PaymentSettings,
    period: &BillingPeriod,
) -> Result<String> {
    let prompt = draft::build_prompt(record, payment, period);
    debug!(prompt_chars = prompt.chars().count(), "built drafting prompt");
    drafter.draft(&prompt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boarding::invoice::model::CanonicalField;
    use std::cell::RefCell;

    fn rooms() -> Vec<RoomRecord> {
        vec![
            RoomRecord::from_pairs([(CanonicalField::RoomName, "P101"), (CanonicalField::TenantName, "An")]),
            RoomRecord::from_pairs([(CanonicalField::RoomName, "p102"), (CanonicalField::TenantName, "Bình")]),
            RoomRecord::from_pairs([(CanonicalField::RoomName, "P102"), (CanonicalField::TenantName, "Chi")]),
            RoomRecord::from_pairs([(CanonicalField::TenantName, "Dũng")]),
        ]
    }

    #[test]
    fn selects_first_matching_room() {
        let records = rooms();
        assert_eq!(select_room(&records, " P102 ").unwrap().tenant_name(), "Bình");
        assert_eq!(select_room(&records, "dũng").unwrap().room_name(), "");
        assert!(matches!(
            select_room(&records, "P999"),
            Err(InvoiceError::RoomNotFound(_))
        ));
    }

    #[test]
    fn blank_query_matches_no_room() {
        let records = rooms();
        for query in ["", "   "] {
            assert!(matches!(
                select_room(&records, query),
                Err(InvoiceError::RoomNotFound(_))
            ));
        }
    }

    struct RecordingDrafter {
        prompts: RefCell<Vec<String>>,
    }

    impl Drafter for RecordingDrafter {
        fn draft(&self, prompt: &str) -> Result<String> {
            self.prompts.borrow_mut().push(prompt.to_string());
            Ok("Chào bạn An".to_string())
        }
    }

    #[test]
    fn drafting_sends_built_prompt() {
        let drafter = RecordingDrafter {
            prompts: RefCell::new(Vec::new()),
        };
        let payment = PaymentSettings {
            bank_name: "MB".into(),
            account_number: "1".into(),
            account_name: "A".into(),
            payment_note: "thang {thang}".into(),
        };
        let period = BillingPeriod::current();
        let records = rooms();

        let text = draft_invoice(&drafter, &records[0], &payment, &period).unwrap();
        assert_eq!(text, "Chào bạn An");
        let prompts = drafter.prompts.borrow();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Phòng số: P101"));
    }
}
