//! Natural-language invoice drafting.
//!
//! The prompt is assembled here; generating text from it is delegated to a
//! [`Drafter`]. [`GeminiDrafter`] talks to the Gemini `generateContent` API.

use std::env;

use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument, warn};

use crate::boarding::invoice::error::{InvoiceError, Result};
use crate::boarding::invoice::model::{
    BillingPeriod, CanonicalField, PaymentSettings, RoomRecord,
};

pub const GEMINI_HOST: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Environment variables checked, in order, for the drafting API key.
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Turns a prompt into generated text.
pub trait Drafter {
    fn draft(&self, prompt: &str) -> Result<String>;
}

/// Builds the drafting prompt for one room.
pub fn build_prompt(
    record: &RoomRecord,
    payment: &PaymentSettings,
    period: &BillingPeriod,
) -> String {
    let value = |field: CanonicalField| record.get(field);

    format!(
        "Là một chủ nhà trọ thân thiện, hãy soạn một thông báo hóa đơn tiền nhà tháng {period} bằng tiếng Việt để gửi cho người thuê.
Sử dụng các thông tin chi tiết sau đây:

**Thông tin người thuê:**
- Tên người thuê: {tenant}
- Phòng số: {room}

**Chi tiết hóa đơn:**
- Tiền thuê phòng: {rent}
- Tiền điện: {electric} (Chỉ số cũ: {previous}, Chỉ số mới: {current}, Tổng số điện: {units})
- Tiền nước: {water}
- Phí dịch vụ khác (DV): {service}
- **TỔNG CỘNG PHẢI THANH TOÁN:** {total}

**Thông tin thanh toán:**
- Ngân hàng: {bank}
- Số tài khoản: {account}
- Tên chủ tài khoản: {holder}
- Nội dung chuyển khoản yêu cầu: \"{note}\"

**Yêu cầu về định dạng:**
- Bắt đầu bằng một lời chào thân mật đến người thuê.
- Liệt kê rõ ràng và minh bạch các khoản phí.
- In đậm tổng số tiền cần thanh toán.
- Cung cấp đầy đủ thông tin thanh toán.
- Kết thúc bằng một lời cảm ơn.
- Giữ giọng văn lịch sự, chuyên nghiệp nhưng vẫn gần gũi.
- Không sử dụng markdown. Trả về dưới dạng văn bản thuần túy (plain text).
",
        period = period.label(),
        tenant = value(CanonicalField::TenantName),
        room = value(CanonicalField::RoomName),
        rent = value(CanonicalField::RoomRent),
        electric = value(CanonicalField::ElectricCost),
        previous = value(CanonicalField::ElectricPrevious),
        current = value(CanonicalField::ElectricCurrent),
        units = value(CanonicalField::ElectricUnits),
        water = value(CanonicalField::WaterCost),
        service = value(CanonicalField::ServiceFee),
        total = value(CanonicalField::TotalDue),
        bank = payment.bank_name,
        account = payment.account_number,
        holder = payment.account_name,
        note = payment.note_for(period),
    )
}

/// First non-empty API key found in [`API_KEY_VARS`].
pub fn api_key_from_env() -> Option<String> {
    API_KEY_VARS
        .iter()
        .filter_map(|name| env::var(name).ok())
        .find(|key| !key.trim().is_empty())
}

/// Drafter backed by the Gemini REST API.
pub struct GeminiDrafter {
    http: reqwest::blocking::Client,
    host: String,
    model: String,
    api_key: String,
}

impl GeminiDrafter {
    pub fn new(api_key: impl Into<String>, model: Option<String>) -> Result<Self> {
        Self::with_host(GEMINI_HOST, api_key, model)
    }

    pub fn with_host(
        host: impl Into<String>,
        api_key: impl Into<String>,
        model: Option<String>,
    ) -> Result<Self> {
        let http = reqwest::blocking::Client::builder().build()?;
        Ok(Self {
            http,
            host: host.into(),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_key: api_key.into(),
        })
    }

    /// Drafter using the key from the environment.
    pub fn from_env(model: Option<String>) -> Result<Self> {
        let key = api_key_from_env().ok_or_else(|| {
            InvoiceError::Drafting(format!(
                "chưa cấu hình khóa API (đặt biến môi trường {})",
                API_KEY_VARS.join(" hoặc ")
            ))
        })?;
        Self::new(key, model)
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

fn extract_api_error(body: &serde_json::Value, status: u16) -> String {
    body["error"]["message"]
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {status}"))
}

impl Drafter for GeminiDrafter {
    #[instrument(level = "info", skip_all, fields(model = %self.model))]
    fn draft(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.host.trim_end_matches('/'),
            self.model
        );
        let body = json!({ "contents": [{ "parts": [{ "text": prompt }] }] });

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .map_err(|error| InvoiceError::Drafting(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body: serde_json::Value = response.json().unwrap_or(serde_json::Value::Null);
            let message = extract_api_error(&body, status.as_u16());
            warn!(status = status.as_u16(), %message, "drafting request failed");
            return Err(InvoiceError::Drafting(message));
        }

        let parsed: GenerateResponse = response
            .json()
            .map_err(|error| InvoiceError::Drafting(error.to_string()))?;
        let text: String = parsed
            .candidates
            .into_iter()
            .filter_map(|candidate| candidate.content)
            .flat_map(|content| content.parts)
            .filter_map(|part| part.text)
            .collect();
        debug!(chars = text.chars().count(), "received drafted invoice");

        if text.trim().is_empty() {
            return Err(InvoiceError::Drafting(
                "dịch vụ không trả về nội dung".to_string(),
            ));
        }
        Ok(text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn prompt_carries_record_and_payment_details() {
        let record = RoomRecord::from_pairs([
            (CanonicalField::RoomName, "P202"),
            (CanonicalField::TenantName, "Minh"),
            (CanonicalField::ElectricUnits, "42"),
            (CanonicalField::TotalDue, "3,000,000 đ"),
        ]);
        let payment = PaymentSettings {
            bank_name: "VCB".into(),
            account_number: "999".into(),
            account_name: "TRAN B".into(),
            payment_note: "Phong P202 thang {thang}".into(),
        };
        let period = BillingPeriod::containing(NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());

        let prompt = build_prompt(&record, &payment, &period);
        assert!(prompt.contains("tháng 12/2024"));
        assert!(prompt.contains("- Tên người thuê: Minh"));
        assert!(prompt.contains("- Phòng số: P202"));
        assert!(prompt.contains("Tổng số điện: 42)"));
        assert!(prompt.contains("**TỔNG CỘNG PHẢI THANH TOÁN:** 3,000,000 đ"));
        assert!(prompt.contains("\"Phong P202 thang 12\""));
    }

    #[test]
    fn api_error_message_falls_back_to_status() {
        let body = json!({"error": {"code": 400, "message": "API key not valid"}});
        assert_eq!(extract_api_error(&body, 400), "API key not valid");
        assert_eq!(extract_api_error(&serde_json::Value::Null, 503), "HTTP 503");
    }
}
