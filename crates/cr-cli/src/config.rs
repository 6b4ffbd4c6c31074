//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use cr_core::Targets;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Desk display order per department.
///
/// Report rows group by desk in this order; desks not listed sort last,
/// alphabetically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeskOrder {
    pub conversion: Vec<String>,
    pub retention: Vec<String>,
}

impl Default for DeskOrder {
    fn default() -> Self {
        Self {
            conversion: [
                "Team Elly",
                "Team Vincent",
                "Team Rahul",
                "Team Sameer",
                "Team Eden",
                "Team Elena",
                "Team Larisa",
            ]
            .map(String::from)
            .to_vec(),
            retention: [
                "Japan Team",
                "Korean Team",
                "Aarav Team",
                "Ajay Team",
                "French Maxime",
                "AKA Team",
                "Spanish Andres",
                "Portuguese Pedro",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}

impl DeskOrder {
    /// Sort rank of a desk within a department's configured order.
    #[must_use]
    pub fn rank(order: &[String], desk: &str) -> usize {
        order
            .iter()
            .position(|known| known == desk)
            .unwrap_or(usize::MAX)
    }
}

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the roster file.
    pub roster_path: PathBuf,
    /// Directory holding one activity table per source.
    pub tables_dir: PathBuf,
    /// Per-department goal values.
    pub targets: Targets,
    /// Desk display order per department.
    pub desk_order: DeskOrder,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("roster_path", &self.roster_path)
            .field("tables_dir", &self.tables_dir)
            .field("targets", &self.targets)
            .finish_non_exhaustive()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            roster_path: PathBuf::from("roster.json"),
            tables_dir: PathBuf::from("activity"),
            targets: Targets::default(),
            desk_order: DeskOrder::default(),
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (CR_*)
        figment = figment.merge(Env::prefixed("CR_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for cr.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("cr"))
}
