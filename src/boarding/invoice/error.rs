use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, InvoiceError>;

/// Remediation text shown when the sheet endpoint answers 400 or 404.
const ACCESS_HINT: &str = "Vui lòng kiểm tra lại:\n\
1. Link Google Sheet có chính xác không.\n\
2. Vùng dữ liệu (vd: A1:K29) có hợp lệ không.\n\
3. Quyền truy cập của Sheet đã được đặt là 'Bất kỳ ai có đường liên kết'.\n\n\
Mẹo: Để đảm bảo hoạt động, hãy thử 'Tệp' > 'Chia sẻ' > 'Xuất bản lên web'.";

/// Coarse classification of an [`InvoiceError`], used by callers that need to
/// react to the category of a failure rather than its exact message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    InvalidInput,
    AccessOrRangeError,
    TransportError,
    ProtocolError,
    ProviderError,
    ExtractionError,
    NoDataFound,
    RoomNotFound,
    Settings,
    Drafting,
    Export,
    Io,
    Logging,
}

/// Error type covering every way a request can fail, from user input through
/// the network exchange down to record extraction and invoice output.
///
/// The `Display` text of each variant is the message shown to the user.
#[derive(Debug, Error)]
pub enum InvoiceError {
    /// The range text is not of the form `A1:K29`.
    #[error("Định dạng vùng dữ liệu '{0}' không hợp lệ. Vui lòng dùng định dạng như 'A1:K29'.")]
    InvalidRange(String),

    /// No spreadsheet id could be found in the sheet link.
    #[error("Link Google Sheet không hợp lệ. Vui lòng kiểm tra lại: {0}")]
    InvalidSheetUrl(String),

    /// The endpoint answered 400 or 404.
    #[error("Không thể tải dữ liệu (lỗi {status}). {hint}", hint = ACCESS_HINT)]
    AccessOrRange { status: u16 },

    /// The endpoint answered with any other non-success status.
    #[error("Không thể tải dữ liệu. Mã lỗi: {status}")]
    Transport { status: u16 },

    /// The request never produced a response.
    #[error("Không thể kết nối tới Google Sheets: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body is not wrapped in the expected callback.
    #[error(
        "Phản hồi không hợp lệ từ Google. Vui lòng kiểm tra lại Link và quyền truy cập của Sheet."
    )]
    InvalidEnvelope,

    /// The callback payload is not valid JSON for the expected shape.
    #[error(
        "Lỗi phân tích dữ liệu: Phản hồi từ Google không phải là JSON hợp lệ. Vui lòng kiểm tra lại link, vùng dữ liệu và quyền truy cập của Sheet. ({0})"
    )]
    MalformedPayload(#[source] serde_json::Error),

    /// The provider reported a structured error.
    #[error("Lỗi từ Google Sheets:\n{0}")]
    Provider(String),

    /// The selected range does not contain enough recognisable headers.
    #[error(
        "Không tìm thấy các tiêu đề cột cần thiết (vd: 'TÊN PHÒNG', 'TÊN') trong vùng dữ liệu bạn đã chọn. Vui lòng kiểm tra lại vùng dữ liệu có bao gồm hàng tiêu đề không. (nhận diện được {found} cột)"
    )]
    MissingHeaders { found: usize },

    /// The table carried no structure, only embedded error messages.
    #[error("Lỗi từ Google Sheets: {0}")]
    EmbeddedErrors(String),

    /// The range is well formed but holds no usable rows.
    #[error(
        "Không tìm thấy dữ liệu có thể xử lý trong vùng bạn chọn. Hãy đảm bảo vùng dữ liệu không bị trống và có các cột cần thiết."
    )]
    NoDataFound,

    /// No record matches the requested room.
    #[error("Không tìm thấy phòng '{0}' trong dữ liệu.")]
    RoomNotFound(String),

    /// The settings file could not be read or written.
    #[error("settings error at {path}: {message}")]
    Settings { path: PathBuf, message: String },

    /// The drafting service failed or returned nothing usable.
    #[error("Lỗi khi gọi AI: {0}")]
    Drafting(String),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Wrapper for IO failures such as writing output files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON serialisation of output fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

impl InvoiceError {
    /// Returns the category this error belongs to.
    pub fn kind(&self) -> FailureKind {
        match self {
            InvoiceError::InvalidRange(_) | InvoiceError::InvalidSheetUrl(_) => {
                FailureKind::InvalidInput
            }
            InvoiceError::AccessOrRange { .. } => FailureKind::AccessOrRangeError,
            InvoiceError::Transport { .. } | InvoiceError::Network(_) => {
                FailureKind::TransportError
            }
            InvoiceError::InvalidEnvelope | InvoiceError::MalformedPayload(_) => {
                FailureKind::ProtocolError
            }
            InvoiceError::Provider(_) => FailureKind::ProviderError,
            InvoiceError::MissingHeaders { .. } | InvoiceError::EmbeddedErrors(_) => {
                FailureKind::ExtractionError
            }
            InvoiceError::NoDataFound => FailureKind::NoDataFound,
            InvoiceError::RoomNotFound(_) => FailureKind::RoomNotFound,
            InvoiceError::Settings { .. } => FailureKind::Settings,
            InvoiceError::Drafting(_) => FailureKind::Drafting,
            InvoiceError::ExcelWrite(_) => FailureKind::Export,
            InvoiceError::Io(_) | InvoiceError::Json(_) => FailureKind::Io,
            InvoiceError::Logging(_) => FailureKind::Logging,
        }
    }

    /// HTTP status carried by the failure, if the endpoint answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            InvoiceError::AccessOrRange { status } | InvoiceError::Transport { status } => {
                Some(*status)
            }
            InvoiceError::Network(error) => error.status().map(|status| status.as_u16()),
            _ => None,
        }
    }
}
