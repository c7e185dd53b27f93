//! Retrieval of room records from a link-shared sheet.
//!
//! One blocking GET per call, no retries: every failure is returned to the
//! caller, who may simply submit again.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::StatusCode;
use tracing::{debug, info, instrument, warn};

use crate::boarding::invoice::error::{InvoiceError, Result};
use crate::boarding::invoice::io::gviz::{self, QueryResponse};
use crate::boarding::invoice::model::RoomRecord;
use crate::boarding::invoice::range::{self, GVIZ_HOST};

const USER_AGENT: &str = concat!("rent-invoice/", env!("CARGO_PKG_VERSION"));

static ENVELOPE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"google\.visualization\.Query\.setResponse\(([\s\S]*)\)")
        .expect("Hardcode regex pattern")
});

/// Client for the public tabular query endpoint.
pub struct SheetsClient {
    http: reqwest::blocking::Client,
    host: String,
}

impl SheetsClient {
    /// Client addressing the public endpoint.
    pub fn new() -> Result<Self> {
        Self::with_host(GVIZ_HOST)
    }

    /// Client addressing another host serving the same endpoint.
    pub fn with_host(host: impl Into<String>) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            http,
            host: host.into(),
        })
    }

    /// Fetches `range_text` of the sheet behind `sheet_url` as room records.
    ///
    /// A well-formed range without usable rows is reported as
    /// [`InvoiceError::NoDataFound`].
    #[instrument(level = "info", skip(self), fields(host = %self.host))]
    pub fn fetch_records(&self, sheet_url: &str, range_text: &str) -> Result<Vec<RoomRecord>> {
        let range = range::parse_range(range_text)
            .ok_or_else(|| InvoiceError::InvalidRange(range_text.to_string()))?;
        let gid = range::extract_gid(sheet_url);
        let url = range::build_query_url_on(&self.host, sheet_url, &range, &gid)
            .ok_or_else(|| InvoiceError::InvalidSheetUrl(sheet_url.to_string()))?;
        debug!(%url, %range, %gid, "querying sheet");

        let response = self.http.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status));
        }

        let body = response.text()?;
        let records = parse_response_body(&body)?;
        info!(record_count = records.len(), "extracted room records");

        if records.is_empty() {
            return Err(InvoiceError::NoDataFound);
        }
        Ok(records)
    }
}

fn status_error(status: StatusCode) -> InvoiceError {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND => InvoiceError::AccessOrRange {
            status: status.as_u16(),
        },
        other => InvoiceError::Transport {
            status: other.as_u16(),
        },
    }
}

/// Returns the JSON text wrapped in the `setResponse(...)` callback.
pub fn unwrap_envelope(body: &str) -> Option<&str> {
    ENVELOPE_PATTERN
        .captures(body)
        .and_then(|captures| captures.get(1))
        .map(|payload| payload.as_str())
        .filter(|payload| !payload.is_empty())
}

/// Unwraps, parses and extracts a response body.
///
/// Does not treat an empty record list as a failure; that decision belongs to
/// [`SheetsClient::fetch_records`].
pub fn parse_response_body(body: &str) -> Result<Vec<RoomRecord>> {
    let payload = unwrap_envelope(body).ok_or(InvoiceError::InvalidEnvelope)?;
    let response: QueryResponse =
        serde_json::from_str(payload).map_err(InvoiceError::MalformedPayload)?;

    if response.is_error() {
        let messages = response.error_messages();
        warn!(error_count = messages.len(), "provider reported an error");
        let detail = if messages.is_empty() {
            gviz::UNKNOWN_PROVIDER_ERROR.to_string()
        } else {
            messages.join("\n")
        };
        return Err(InvoiceError::Provider(detail));
    }

    gviz::extract_records(&response)
}
