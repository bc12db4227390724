//! TOML configuration for the `continuum` tool.
//!
//! When no config file is given, [`CliConfig::load`] falls back to
//! `<config_dir>/continuum/continuum.toml` if it exists, and to built-in
//! defaults otherwise.

use std::path::{Path, PathBuf};

use anyhow::Context;
use continuum_ring::{Ring, RingConfig};
use serde::Deserialize;

/// Top-level configuration, parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Ring construction parameters.
    pub ring: RingConfig,
    /// Initial ring membership.
    pub members: MembersSection,
    /// Logging configuration.
    pub log: LogSection,
}

/// `[members]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MembersSection {
    /// Node names added to the ring in order (e.g. `"cache-a:11211"`).
    pub nodes: Vec<String>,
}

/// `[log]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Log level filter (e.g. `"info"`, `"debug"`, `"warn"`).
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl CliConfig {
    /// Load config from a TOML file, or from the default location if no path
    /// is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => match default_path() {
                Some(p) if p.is_file() => Self::from_file(&p),
                _ => Ok(Self::default()),
            },
        }
    }

    fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Parse config from a TOML string (used in tests).
    #[cfg(test)]
    pub fn from_toml(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Build a ring from the configured parameters and members.
    ///
    /// A member listed twice is an error, matching [`Ring::add`].
    pub fn build_ring(&self) -> anyhow::Result<Ring> {
        let mut ring = Ring::with_config(&self.ring).context("invalid [ring] section")?;
        for node in &self.members.nodes {
            ring.add(node.as_str())
                .with_context(|| format!("adding member {node:?}"))?;
        }
        Ok(ring)
    }
}

/// `<config_dir>/continuum/continuum.toml`, if the platform has a config dir.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("continuum").join("continuum.toml"))
}
