use std::env;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{NotesError, Result};

pub const DEFAULT_ACCOUNT: &str = "iCloud";
pub const DEFAULT_PROGRAM: &str = "osascript";
pub const DEFAULT_SCRIPT_FLAG: &str = "-e";
pub const DEFAULT_SCRIPT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_RESULTS: usize = 100;
pub const DEFAULT_MAX_ATTACHMENT_BYTES: u64 = 10 * 1024 * 1024;

/// Bridge settings. Durations are whole seconds in JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub account: String,
    pub program: String,
    pub script_flag: String,
    #[serde(with = "duration_secs")]
    pub script_timeout: Duration,
    #[serde(with = "duration_secs")]
    pub request_timeout: Duration,
    pub max_results: usize,
    pub max_attachment_bytes: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            account: DEFAULT_ACCOUNT.to_string(),
            program: DEFAULT_PROGRAM.to_string(),
            script_flag: DEFAULT_SCRIPT_FLAG.to_string(),
            script_timeout: DEFAULT_SCRIPT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_results: DEFAULT_MAX_RESULTS,
            max_attachment_bytes: DEFAULT_MAX_ATTACHMENT_BYTES,
        }
    }
}

impl BridgeConfig {
    /// Read a JSON config file. Missing keys keep their defaults; zero
    /// timeouts or result limits are rejected.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw).map_err(|err| {
            NotesError::invalid_input(format!("invalid config {}: {err}", path.display()))
        })?;
        config.validate().map_err(|field| {
            NotesError::invalid_input(format!(
                "invalid config {}: {field} must be positive",
                path.display()
            ))
        })?;
        Ok(config)
    }

    /// Name of the first setting that must be positive but is zero.
    fn validate(&self) -> std::result::Result<(), &'static str> {
        if self.script_timeout.is_zero() {
            return Err("script_timeout");
        }
        if self.request_timeout.is_zero() {
            return Err("request_timeout");
        }
        if self.max_results == 0 {
            return Err("max_results");
        }
        if self.max_attachment_bytes == 0 {
            return Err("max_attachment_bytes");
        }
        Ok(())
    }

    /// Defaults, then the optional file, then the environment.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        Ok(config.apply_env())
    }

    pub fn apply_env(self) -> Self {
        self.apply_vars(|key| env::var(key).ok())
    }

    /// Overlay values from `lookup`. Empty strings and non-positive or
    /// unparsable numbers are ignored.
    pub fn apply_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let text = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let positive = |key: &str| {
            text(key)
                .and_then(|value| value.trim().parse::<u64>().ok())
                .filter(|value| *value > 0)
        };

        if let Some(account) = text("NOTES_BRIDGE_ACCOUNT") {
            self.account = account;
        }
        if let Some(program) = text("NOTES_BRIDGE_PROGRAM") {
            self.program = program;
        }
        if let Some(secs) = positive("NOTES_BRIDGE_SCRIPT_TIMEOUT") {
            self.script_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = positive("NOTES_BRIDGE_TIMEOUT").or_else(|| positive("NOTES_MCP_TIMEOUT")) {
            self.request_timeout = Duration::from_secs(secs);
        }
        if let Some(max) = positive("NOTES_BRIDGE_MAX_RESULTS") {
            self.max_results = max as usize;
        }
        self
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
