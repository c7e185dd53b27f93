//! Text renderings of a single room's invoice.
//!
//! [`plain_text`] is the compact message a landlord pastes into a chat;
//! [`statement`] is the laid-out document meant for the screen or a printer.

use std::fmt;

use unicode_width::UnicodeWidthStr;

use crate::boarding::invoice::model::{
    BillingPeriod, CanonicalField, PaymentSettings, RoomRecord,
};

const RULE: &str = "------------------------------------";

/// One billable line of an invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub label: &'static str,
    pub amount: String,
    pub detail: Option<String>,
}

/// Rent, electricity, water and service lines, in invoice order.
pub fn line_items(record: &RoomRecord) -> Vec<LineItem> {
    let meter = format!(
        "Cũ: {} Mới: {} ({} kWh)",
        record.get(CanonicalField::ElectricPrevious),
        record.get(CanonicalField::ElectricCurrent),
        record.get(CanonicalField::ElectricUnits),
    );

    vec![
        LineItem {
            label: "Tiền thuê phòng",
            amount: record.get(CanonicalField::RoomRent).to_string(),
            detail: None,
        },
        LineItem {
            label: "Tiền điện",
            amount: record.get(CanonicalField::ElectricCost).to_string(),
            detail: Some(meter),
        },
        LineItem {
            label: "Tiền nước",
            amount: record.get(CanonicalField::WaterCost).to_string(),
            detail: None,
        },
        LineItem {
            label: "Phí dịch vụ",
            amount: record.get(CanonicalField::ServiceFee).to_string(),
            detail: None,
        },
    ]
}

fn is_chargeable(amount: &str) -> bool {
    !matches!(amount.trim(), "" | "0" | "0 đ")
}

/// Compact invoice text suitable for copying into a message.
///
/// Lines whose amount is empty or zero are left out, and so are blank lines.
pub fn plain_text(
    record: &RoomRecord,
    payment: &PaymentSettings,
    period: &BillingPeriod,
) -> String {
    let units = record.get(CanonicalField::ElectricUnits);
    let show_meter = !units.is_empty() && units != "0";

    let items: Vec<String> = line_items(record)
        .into_iter()
        .filter(|item| is_chargeable(&item.amount))
        .map(|item| {
            let line = format!("- {}: {}", item.label, item.amount);
            if item.detail.is_some() && show_meter {
                format!(
                    "{line} (Cũ: {}, Mới: {}, Dùng: {} kWh)",
                    record.get(CanonicalField::ElectricPrevious),
                    record.get(CanonicalField::ElectricCurrent),
                    units
                )
            } else {
                line
            }
        })
        .collect();

    let occupants = match record.get(CanonicalField::OccupantCount) {
        "" => "N/A",
        count => count,
    };

    let text = format!(
        "Chào bạn {tenant},\n\
         \n\
         Nhà trọ xin gửi bạn thông báo tiền nhà tháng {period} cho phòng {room} (Số người: {occupants}).\n\
         \n\
         Chi tiết các khoản phí:\n\
         {items}\n\
         \n\
         {RULE}\n\
         TỔNG CỘNG THANH TOÁN: {total}\n\
         {RULE}\n\
         \n\
         Bạn vui lòng thanh toán sớm.\n\
         \n\
         Thông tin chuyển khoản:\n\
         - Ngân hàng: {bank}\n\
         - Số tài khoản: {account}\n\
         - Chủ tài khoản: {holder}\n\
         - Nội dung: \"{note}\"\n\
         \n\
         Cảm ơn bạn!",
        tenant = record.tenant_name(),
        period = period.label(),
        room = record.room_name(),
        items = items.join("\n"),
        total = record.get(CanonicalField::TotalDue),
        bank = payment.bank_name,
        account = payment.account_number,
        holder = payment.account_name,
        note = payment.note_for(period),
    );

    text.lines()
        .map(str::trim_start)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Full invoice document with an item table, for display or printing.
pub fn statement(
    record: &RoomRecord,
    payment: &PaymentSettings,
    period: &BillingPeriod,
) -> String {
    Statement {
        record,
        payment,
        period,
    }
    .to_string()
}

struct Statement<'a> {
    record: &'a RoomRecord,
    payment: &'a PaymentSettings,
    period: &'a BillingPeriod,
}

impl fmt::Display for Statement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Statement {
            record,
            payment,
            period,
        } = self;

        writeln!(f, "HÓA ĐƠN TIỀN NHÀ")?;
        writeln!(f, "Tháng {}", period.label())?;
        writeln!(f, "Phòng {}", record.room_name())?;
        writeln!(f, "Ngày xuất: {}", period.issued_on.format("%d/%m/%Y"))?;
        writeln!(f)?;
        writeln!(f, "Gửi đến: {}", record.tenant_name())?;
        let occupants = record.get(CanonicalField::OccupantCount);
        if !occupants.is_empty() {
            writeln!(f, "Số người: {occupants}")?;
        }
        writeln!(f)?;

        let mut rows: Vec<[String; 3]> = vec![[
            "Mục".to_string(),
            "Chi tiết".to_string(),
            "Thành tiền".to_string(),
        ]];
        for item in line_items(record) {
            let amount = if item.amount.is_empty() {
                "-".to_string()
            } else {
                item.amount
            };
            rows.push([
                item.label.to_string(),
                item.detail.unwrap_or_else(|| "-".to_string()),
                amount,
            ]);
        }

        let widths = column_widths(&rows);
        let rule = "-".repeat(widths.iter().sum::<usize>() + 4);
        for (idx, row) in rows.iter().enumerate() {
            writeln!(
                f,
                "{}  {}  {}",
                pad_right(&row[0], widths[0]),
                pad_left(&row[1], widths[1]),
                pad_left(&row[2], widths[2]),
            )?;
            if idx == 0 {
                writeln!(f, "{rule}")?;
            }
        }
        writeln!(f, "{rule}")?;
        writeln!(
            f,
            "{}  {}",
            pad_left("TỔNG CỘNG", widths[0] + widths[1] + 2),
            pad_left(record.get(CanonicalField::TotalDue), widths[2]),
        )?;

        writeln!(f)?;
        writeln!(f, "Thông tin thanh toán")?;
        writeln!(f, "Ngân hàng:      {}", payment.bank_name)?;
        writeln!(f, "Chủ tài khoản:  {}", payment.account_name)?;
        writeln!(f, "Số tài khoản:   {}", payment.account_number)?;
        writeln!(f, "Nội dung:       \"{}\"", payment.note_for(period))?;
        writeln!(f)?;
        write!(f, "Cảm ơn bạn đã thanh toán đúng hạn!")
    }
}

/// Aligned text table of all records, one room per line.
pub fn room_table(records: &[RoomRecord]) -> String {
    let mut rows: Vec<Vec<String>> = vec![
        CanonicalField::ALL
            .iter()
            .map(|field| field.header().to_string())
            .collect(),
    ];
    rows.extend(
        records
            .iter()
            .map(|record| record.iter().map(|(_, value)| value.to_string()).collect()),
    );

    let widths = column_widths(&rows);
    rows.iter()
        .map(|row| {
            row.iter()
                .zip(&widths)
                .map(|(cell, &width)| pad_right(cell, width))
                .collect::<Vec<_>>()
                .join(" | ")
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn column_widths<R: AsRef<[String]>>(rows: &[R]) -> Vec<usize> {
    let mut widths: Vec<usize> = Vec::new();
    for row in rows {
        for (idx, cell) in row.as_ref().iter().enumerate() {
            let width = UnicodeWidthStr::width(cell.as_str());
            match widths.get_mut(idx) {
                Some(current) => *current = (*current).max(width),
                None => widths.push(width),
            }
        }
    }
    widths
}

fn pad_right(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(UnicodeWidthStr::width(text));
    format!("{text}{}", " ".repeat(fill))
}

fn pad_left(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(UnicodeWidthStr::width(text));
    format!("{}{text}", " ".repeat(fill))
}
