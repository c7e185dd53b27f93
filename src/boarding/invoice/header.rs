//! Header text normalisation and lookup of canonical fields.

use unicode_normalization::UnicodeNormalization;

use crate::boarding::invoice::model::CanonicalField;

/// Combining marks stripped after canonical decomposition.
const COMBINING_MARKS: std::ops::RangeInclusive<char> = '\u{0300}'..='\u{036f}';

/// Folds header text to an accent-free, upper-case, single-spaced form.
///
/// `"Tên Phòng"` becomes `"TEN PHONG"`; quotes are dropped and line breaks
/// count as spaces.
pub fn normalize(raw: &str) -> String {
    let folded: String = raw
        .nfd()
        .filter(|ch| !COMBINING_MARKS.contains(ch))
        .filter_map(|ch| match ch {
            'Đ' | 'đ' => Some('D'),
            '"' => None,
            other => Some(other),
        })
        .collect::<String>()
        .to_uppercase();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Looks up the canonical field for an already normalised header.
pub fn canonicalize(normalized: &str) -> Option<CanonicalField> {
    let field = match normalized {
        "TEN PHONG" => CanonicalField::RoomName,
        "TEN" => CanonicalField::TenantName,
        "TIEN PHONG" => CanonicalField::RoomRent,
        "SO NGUOI" => CanonicalField::OccupantCount,
        "DIEN CU" => CanonicalField::ElectricPrevious,
        "DIEN MOI" => CanonicalField::ElectricCurrent,
        "TONG SO DIEN" => CanonicalField::ElectricUnits,
        "TONG TIEN DIEN" => CanonicalField::ElectricCost,
        "NUOC" => CanonicalField::WaterCost,
        "DV" => CanonicalField::ServiceFee,
        "TONG TIEN PHAI THANH TOAN" => CanonicalField::TotalDue,
        _ => return None,
    };
    Some(field)
}

/// Normalises and looks up a raw header in one step.
pub fn resolve(raw: &str) -> Option<CanonicalField> {
    canonicalize(&normalize(raw))
}
