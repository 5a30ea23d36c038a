//! Bridge configuration
//!
//! Settings shared by the dispatcher, the automation handle and the typed
//! facade. Values come from defaults, environment variables, or an optional
//! TOML file.

use std::path::Path;

use serde::{Deserialize, Serialize};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// ProgID the automation object registers itself under.
pub const DEFAULT_PROG_ID: &str = "dm.dmsoft";

pub const ENV_PROG_ID: &str = "DMSOFT_PROG_ID";
pub const ENV_INT64_ENCODING: &str = "DMSOFT_INT64_ENCODING";
pub const ENV_ALLOW_UNDECLARED: &str = "DMSOFT_ALLOW_UNDECLARED";
pub const ENV_TRACK_RESOURCES: &str = "DMSOFT_TRACK_RESOURCES";
pub const ENV_POLL_INTERVAL_MS: &str = "DMSOFT_POLL_INTERVAL_MS";

/// How 64-bit integers travel across the invocation boundary.
///
/// Older builds of the automation object only understand 32-bit generic
/// integers and exchange 64-bit values as decimal text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Int64Encoding {
    /// Native 64-bit generic integer kind.
    #[default]
    Native,
    /// Base-10 text, e.g. `"4294967296"`.
    DecimalText,
}

impl std::str::FromStr for Int64Encoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "native" | "i8" | "int64" => Ok(Int64Encoding::Native),
            "decimal" | "decimal-text" | "decimal_text" | "text" => Ok(Int64Encoding::DecimalText),
            _ => Err(format!("Unknown int64 encoding: {}", s)),
        }
    }
}

/// Complete bridge configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// ProgID used when instantiating the automation object
    pub prog_id: String,

    /// Wire representation for 64-bit integers
    pub int64_encoding: Int64Encoding,

    /// Forward names missing from the method table to the object's own lookup
    pub allow_undeclared: bool,

    /// Keep a liveness set of picture/capture/memory handles
    pub track_resources: bool,

    /// Default interval between probes of a bounded wait
    pub poll_interval_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            prog_id: DEFAULT_PROG_ID.to_string(),
            int64_encoding: Int64Encoding::Native,
            allow_undeclared: true,
            track_resources: true,
            poll_interval_ms: 50,
        }
    }
}

impl BridgeConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    ///
    /// Unparseable values keep their defaults.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        config.apply_vars(&lookup);
        config
    }

    fn apply_vars<F>(&mut self, lookup: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(prog_id) = lookup(ENV_PROG_ID)
            && !prog_id.trim().is_empty()
        {
            self.prog_id = prog_id.trim().to_string();
        }

        if let Some(encoding) = lookup(ENV_INT64_ENCODING)
            && let Ok(encoding) = encoding.parse()
        {
            self.int64_encoding = encoding;
        }

        if let Some(val) = lookup(ENV_ALLOW_UNDECLARED)
            && let Some(flag) = parse_flag(&val)
        {
            self.allow_undeclared = flag;
        }

        if let Some(val) = lookup(ENV_TRACK_RESOURCES)
            && let Some(flag) = parse_flag(&val)
        {
            self.track_resources = flag;
        }

        if let Some(val) = lookup(ENV_POLL_INTERVAL_MS)
            && let Ok(interval) = val.trim().parse::<u64>()
        {
            self.poll_interval_ms = interval.max(1);
        }
    }

    /// Load configuration from TOML file
    #[cfg(feature = "toml-config")]
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: BridgeConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from TOML file (stub when toml feature is disabled)
    #[cfg(not(feature = "toml-config"))]
    pub fn from_file(_path: &Path) -> anyhow::Result<Self> {
        anyhow::bail!("TOML support not enabled. Enable the 'toml-config' feature.")
    }

    /// Save configuration to TOML file
    #[cfg(feature = "toml-config")]
    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Save configuration to TOML file (stub when toml feature is disabled)
    #[cfg(not(feature = "toml-config"))]
    pub fn save_to_file(&self, _path: &Path) -> anyhow::Result<()> {
        anyhow::bail!("TOML support not enabled. Enable the 'toml-config' feature.")
    }

    /// Merge with environment variables (env vars take precedence)
    pub fn merge_with_env(self) -> Self {
        self.merge_with_vars(|key| std::env::var(key).ok())
    }

    pub fn merge_with_vars<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        self.apply_vars(&lookup);
        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
