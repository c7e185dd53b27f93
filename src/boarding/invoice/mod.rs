pub mod draft;
pub mod error;
pub mod header;
pub mod io;
pub mod model;
pub mod range;
pub mod render;
pub mod settings;
pub mod sync;

pub use error::{FailureKind, InvoiceError, Result};
