//! Settings remembered between runs: where the sheet is and how to get paid.
//!
//! Stored as pretty JSON in `<config dir>/rent-invoice/settings.json`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::boarding::invoice::error::{InvoiceError, Result};
use crate::boarding::invoice::model::PaymentSettings;

pub const DEFAULT_RANGE: &str = "A1:K29";
pub const DEFAULT_PAYMENT_NOTE: &str = "CK tien nha thang {thang}";

/// Everything the user types into the form, as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub sheet_url: String,
    pub range: String,
    pub bank_name: String,
    pub account_number: String,
    pub account_name: String,
    pub payment_note: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sheet_url: String::new(),
            range: DEFAULT_RANGE.to_string(),
            bank_name: String::new(),
            account_number: String::new(),
            account_name: String::new(),
            payment_note: DEFAULT_PAYMENT_NOTE.to_string(),
        }
    }
}

/// Field-by-field overrides, typically from the command line.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub sheet_url: Option<String>,
    pub range: Option<String>,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub account_name: Option<String>,
    pub payment_note: Option<String>,
}

impl Settings {
    /// Default location of the settings file.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("rent-invoice")
            .join("settings.json")
    }

    /// Loads settings from `path`.
    ///
    /// A missing file yields defaults. So does a file that cannot be read or
    /// parsed; that case is logged and otherwise ignored.
    pub fn load(path: &Path) -> Self {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no saved settings");
                return Self::default();
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "could not read settings, using defaults");
                return Self::default();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(settings) => settings,
            Err(error) => {
                warn!(path = %path.display(), %error, "could not parse settings, using defaults");
                Self::default()
            }
        }
    }

    /// Writes settings to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        let settings_error = |message: String| InvoiceError::Settings {
            path: path.to_path_buf(),
            message,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|error| settings_error(error.to_string()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|error| settings_error(error.to_string()))?;
        debug!(path = %path.display(), "saved settings");
        Ok(())
    }

    /// Returns these settings with every provided override applied.
    pub fn merged(mut self, overrides: SettingsOverrides) -> Self {
        let SettingsOverrides {
            sheet_url,
            range,
            bank_name,
            account_number,
            account_name,
            payment_note,
        } = overrides;

        for (slot, value) in [
            (&mut self.sheet_url, sheet_url),
            (&mut self.range, range),
            (&mut self.bank_name, bank_name),
            (&mut self.account_number, account_number),
            (&mut self.account_name, account_name),
            (&mut self.payment_note, payment_note),
        ] {
            if let Some(value) = value {
                *slot = value;
            }
        }
        self
    }

    /// Payment details for invoices.
    pub fn payment(&self) -> PaymentSettings {
        PaymentSettings {
            bank_name: self.bank_name.clone(),
            account_number: self.account_number.clone(),
            account_name: self.account_name.clone(),
            payment_note: self.payment_note.clone(),
        }
    }
}
