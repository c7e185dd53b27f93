use chrono::NaiveDate;
use httpmock::prelude::*;
use rent_invoice::FailureKind;
use rent_invoice::draft::{Drafter, GeminiDrafter};
use rent_invoice::model::{BillingPeriod, CanonicalField, PaymentSettings, RoomRecord};
use rent_invoice::sync;

const GENERATE_PATH: &str = "/v1beta/models/test-model:generateContent";

fn drafter(server: &MockServer) -> GeminiDrafter {
    GeminiDrafter::with_host(server.base_url(), "test-key", Some("test-model".into()))
        .expect("drafter built")
}

#[test]
fn returns_generated_text() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path(GENERATE_PATH)
            .header("x-goog-api-key", "test-key")
            .body_includes("Phòng số: P101");
        then.status(200).json_body(serde_json::json!({
            "candidates": [{
                "content": {"parts": [{"text": "Chào bạn Lan,\n"}, {"text": "Tiền nhà tháng 6/2025..."}]}
            }]
        }));
    });

    let record = RoomRecord::from_pairs([
        (CanonicalField::RoomName, "P101"),
        (CanonicalField::TenantName, "Lan"),
    ]);
    let payment = PaymentSettings {
        bank_name: "MB Bank".into(),
        account_number: "0123456789".into(),
        account_name: "NGUYEN VAN A".into(),
        payment_note: "CK tien nha thang {thang}".into(),
    };
    let period = BillingPeriod::containing(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());

    let text = sync::draft_invoice(&drafter(&server), &record, &payment, &period)
        .expect("draft generated");

    mock.assert();
    assert_eq!(text, "Chào bạn Lan,\nTiền nhà tháng 6/2025...");
}

#[test]
fn service_errors_surface_as_drafting_failures() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(GENERATE_PATH);
        then.status(400).json_body(serde_json::json!({
            "error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}
        }));
    });

    let error = drafter(&server).draft("prompt").unwrap_err();
    assert_eq!(error.kind(), FailureKind::Drafting);
    assert!(error.to_string().contains("API key not valid."));
}

#[test]
fn empty_candidates_are_rejected() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(GENERATE_PATH);
        then.status(200).json_body(serde_json::json!({"candidates": []}));
    });

    let error = drafter(&server).draft("prompt").unwrap_err();
    assert_eq!(error.kind(), FailureKind::Drafting);
}
