//! Configuration for clinput.
//!
//! Settings are read from `~/.clinput/config.toml`. Every key is optional
//! and a missing file yields the defaults. A file that exists but cannot be
//! read or parsed is reported to the caller, which decides whether to fall
//! back to the defaults.
//!
//! # Configuration File
//!
//! ```toml
//! title = "Submit"
//! subtitle = "Press Ctrl-C to quit"
//! log_level = "info"
//!
//! [prompts]
//! mask = "*"
//! password_prompt = "Password"
//!
//! [prompts.email]
//! prompt = "Email"
//! error = "That does not look like an email address."
//!
//! [prompts.integer]
//! prompt = "Number"
//! error = "Please enter a whole number."
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// First header line printed when a session starts
    pub title: String,
    /// Second header line
    pub subtitle: String,
    /// Log filter used by the binary (overridden by `RUST_LOG`)
    pub log_level: String,
    /// Typed prompt texts
    pub prompts: PromptConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "clinput".to_string(),
            subtitle: "Press Ctrl-C to quit".to_string(),
            log_level: "info".to_string(),
            prompts: PromptConfig::default(),
        }
    }
}

/// Texts and mask used by the typed prompts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Character echoed for each byte of a password
    pub mask: char,
    pub password_prompt: String,
    pub email: FieldText,
    pub integer: FieldText,
    pub float: FieldText,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            mask: '*',
            password_prompt: "Password".to_string(),
            email: FieldText::new("Email", "That does not look like an email address."),
            integer: FieldText::new("Integer", "Please enter a whole number."),
            float: FieldText::new("Number", "Please enter a number."),
        }
    }
}

impl PromptConfig {
    /// Mask as a single screen byte. Falls back to `*` for anything that is
    /// not printable ASCII.
    pub fn mask_byte(&self) -> u8 {
        if self.mask.is_ascii_graphic() {
            self.mask as u8
        } else {
            warn!("mask {:?} is not printable ASCII, using '*'", self.mask);
            b'*'
        }
    }
}

/// Prompt label and the message shown after a rejected value
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldText {
    pub prompt: String,
    pub error: String,
}

impl Default for FieldText {
    fn default() -> Self {
        Self::new("", "Invalid input, please try again.")
    }
}

impl FieldText {
    pub fn new(prompt: &str, error: &str) -> Self {
        Self {
            prompt: prompt.to_string(),
            error: error.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from `~/.clinput/config.toml`
    pub fn load() -> anyhow::Result<Self> {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from `path`. A missing file gives the defaults.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
        };
        Self::parse(&content).with_context(|| format!("parsing {}", path.display()))
    }

    /// Parse TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::path().ok_or_else(|| anyhow::anyhow!("could not determine config path"))?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// `~/.clinput/config.toml`
    pub fn path() -> Option<PathBuf> {
        data_dir().map(|dir| dir.join("config.toml"))
    }
}

/// `~/.clinput`, where config and logs live
pub fn data_dir() -> Option<PathBuf> {
    home_dir().map(|home| home.join(".clinput"))
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("USERPROFILE")
        .or_else(|| std::env::var_os("HOME"))
        .map(PathBuf::from)
}
