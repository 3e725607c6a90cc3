// Engine settings, loaded from the embedded default JSON, an optional user
// file and then environment overrides.
use serde::Deserialize;
use std::path::Path;

use crate::error::{EngineError, Result};
use crate::models::session::{Role, Session};

pub const ENV_API_URL: &str = "BILLSPLIT_API_URL";
pub const ENV_ADMIN_PIN: &str = "BILLSPLIT_ADMIN_PIN";
pub const ENV_LOG_LEVEL: &str = "BILLSPLIT_LOG";

const DEFAULT_CONFIG: &str = include_str!("../../assets/config/default.json");

#[derive(Debug, Deserialize, Clone)]
pub struct EngineSettings {
    pub version: String,
    pub api: ApiSettings,
    pub admin: AdminSettings,
    pub session: SessionSettings,
    pub form: FormSettings,
    pub sheet: SheetSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AdminSettings {
    pub pin: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionSettings {
    pub username: String,
    pub role: Role,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FormSettings {
    pub default_made_by: String,
    pub default_members: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SheetSettings {
    pub delimiter: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
}

impl EngineSettings {
    pub fn from_json(raw: &str) -> Result<Self> {
        let settings: EngineSettings =
            serde_json::from_str(raw).map_err(|e| EngineError::ConfigError(format!("invalid settings JSON: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load_default() -> Result<Self> {
        Self::from_json(DEFAULT_CONFIG)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| EngineError::ConfigError(format!("cannot read '{}': {}", path.display(), e)))?;
        Self::from_json(&raw)
    }

    /// Loads the user file when given, the embedded defaults otherwise, and
    /// applies the `BILLSPLIT_*` environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load_default()?,
        };
        settings.apply_overrides(|key| std::env::var(key).ok());
        settings.validate()?;
        tracing::debug!(api = %settings.api.base_url, version = %settings.version, "Settings loaded");
        Ok(settings)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL) {
            self.api.base_url = url;
        }
        if let Some(pin) = lookup(ENV_ADMIN_PIN) {
            self.admin.pin = pin;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
    }

    pub fn session(&self) -> Session {
        Session::new(self.session.username.clone(), self.session.role)
    }

    /// The single-byte delimiter used by the bill-sheet reader.
    pub fn sheet_delimiter(&self) -> Result<u8> {
        match self.sheet.delimiter.as_bytes() {
            [byte] => Ok(*byte),
            _ => Err(EngineError::ConfigError(format!(
                "sheet delimiter must be a single ASCII character, got '{}'",
                self.sheet.delimiter
            ))),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(EngineError::ConfigError("api.base_url must not be empty".to_string()));
        }
        if self.admin.pin.is_empty() {
            return Err(EngineError::ConfigError("admin.pin must not be empty".to_string()));
        }
        self.sheet_delimiter()?;
        Ok(())
    }
}
