use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Placeholder in the payment-note template replaced by the billing month.
pub const MONTH_PLACEHOLDER: &str = "{thang}";

/// The closed set of attributes every room record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CanonicalField {
    RoomName,
    TenantName,
    RoomRent,
    OccupantCount,
    ElectricPrevious,
    ElectricCurrent,
    ElectricUnits,
    ElectricCost,
    WaterCost,
    ServiceFee,
    TotalDue,
}

impl CanonicalField {
    /// Number of canonical fields.
    pub const COUNT: usize = 11;

    /// Every field, in sheet column order.
    pub const ALL: [CanonicalField; Self::COUNT] = [
        CanonicalField::RoomName,
        CanonicalField::TenantName,
        CanonicalField::RoomRent,
        CanonicalField::OccupantCount,
        CanonicalField::ElectricPrevious,
        CanonicalField::ElectricCurrent,
        CanonicalField::ElectricUnits,
        CanonicalField::ElectricCost,
        CanonicalField::WaterCost,
        CanonicalField::ServiceFee,
        CanonicalField::TotalDue,
    ];

    /// Column header as the landlord writes it in the sheet.
    pub fn header(self) -> &'static str {
        match self {
            CanonicalField::RoomName => "TÊN PHÒNG",
            CanonicalField::TenantName => "TÊN",
            CanonicalField::RoomRent => "TIỀN PHÒNG",
            CanonicalField::OccupantCount => "SỐ NGƯỜI",
            CanonicalField::ElectricPrevious => "ĐIỆN CŨ",
            CanonicalField::ElectricCurrent => "ĐIỆN MỚI",
            CanonicalField::ElectricUnits => "TỔNG SỐ ĐIỆN",
            CanonicalField::ElectricCost => "TỔNG TIỀN ĐIỆN",
            CanonicalField::WaterCost => "NƯỚC",
            CanonicalField::ServiceFee => "DV",
            CanonicalField::TotalDue => "TỔNG TIỀN PHẢI THANH TOÁN",
        }
    }

    fn position(self) -> usize {
        self as usize
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// One room's row, with a value for every [`CanonicalField`].
///
/// Values are kept exactly as the sheet formats them; amounts such as
/// `1,200,000 đ` are never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoomRecord {
    values: [String; CanonicalField::COUNT],
}

impl RoomRecord {
    /// Builds a record from `(field, value)` pairs; absent fields stay empty.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (CanonicalField, S)>,
        S: Into<String>,
    {
        let mut values: [String; CanonicalField::COUNT] = Default::default();
        for (field, value) in pairs {
            values[field.position()] = value.into();
        }
        Self { values }
    }

    /// Value of `field`, empty when the sheet had nothing for it.
    pub fn get(&self, field: CanonicalField) -> &str {
        &self.values[field.position()]
    }

    pub fn room_name(&self) -> &str {
        self.get(CanonicalField::RoomName)
    }

    pub fn tenant_name(&self) -> &str {
        self.get(CanonicalField::TenantName)
    }

    /// Iterates over every field with its value, in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (CanonicalField, &str)> {
        CanonicalField::ALL
            .iter()
            .map(move |&field| (field, self.get(field)))
    }
}

impl Serialize for RoomRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(CanonicalField::COUNT))?;
        for (field, value) in self.iter() {
            map.serialize_entry(field.header(), value)?;
        }
        map.end()
    }
}

/// Bank transfer details printed on every invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSettings {
    pub bank_name: String,
    pub account_number: String,
    pub account_name: String,
    /// Transfer note template; may contain [`MONTH_PLACEHOLDER`].
    pub payment_note: String,
}

impl PaymentSettings {
    /// Transfer note with the month placeholder filled in.
    pub fn note_for(&self, period: &BillingPeriod) -> String {
        self.payment_note
            .replacen(MONTH_PLACEHOLDER, &period.month.to_string(), 1)
    }
}

/// The month an invoice is issued for, plus the date it is issued on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingPeriod {
    pub month: u32,
    pub year: i32,
    pub issued_on: NaiveDate,
}

impl BillingPeriod {
    /// Billing period for the month containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            year: date.year(),
            issued_on: date,
        }
    }

    /// Billing period for the current local date.
    pub fn current() -> Self {
        Self::containing(chrono::Local::now().date_naive())
    }

    /// Overrides month and/or year while keeping the issue date.
    pub fn with_overrides(self, month: Option<u32>, year: Option<i32>) -> Self {
        Self {
            month: month.unwrap_or(self.month),
            year: year.unwrap_or(self.year),
            issued_on: self.issued_on,
        }
    }

    /// `month/year`, the way invoices label the period.
    pub fn label(&self) -> String {
        format!("{}/{}", self.month, self.year)
    }
}
