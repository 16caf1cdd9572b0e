use anyhow::{Context, Result, bail};
use clearsign_erc7730::loader::DEFAULT_DESCRIPTOR_PATH;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// How the formatted transaction is printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Review,
}

impl OutputFormat {
    pub const NAMES: [&'static str; 3] = ["text", "json", "review"];
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "review" => Ok(OutputFormat::Review),
            other => bail!("Unsupported output format '{other}'"),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
            OutputFormat::Review => "review",
        };
        f.write_str(name)
    }
}

/// Settings read from an optional TOML file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Descriptor file path or http(s) URL
    pub descriptor: String,
    pub output: OutputFormat,
    /// `tracing` filter used when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            descriptor: DEFAULT_DESCRIPTOR_PATH.to_string(),
            output: OutputFormat::Text,
            log_level: "warn".to_string(),
        }
    }
}

/// Values given on the command line; each one set wins over the file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub descriptor: Option<String>,
    pub output: Option<OutputFormat>,
    pub verbose: bool,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))
    }

    /// File settings if a path is given, defaults otherwise, then `overrides`
    pub fn resolve(path: Option<&Path>, overrides: Overrides) -> Result<Self> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(base.apply(overrides))
    }

    pub fn apply(mut self, overrides: Overrides) -> Self {
        if let Some(descriptor) = overrides.descriptor {
            self.descriptor = descriptor;
        }
        if let Some(output) = overrides.output {
            self.output = output;
        }
        if overrides.verbose {
            self.log_level = "debug".to_string();
        }
        self
    }
}
