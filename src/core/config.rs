//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.lexnav/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::follower::DEFAULT_MAX_LINK_CANDIDATES;
use crate::core::navigator::NavigatorConfig;
use crate::core::resolver::DEFAULT_MAX_REDIRECTS;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LexnavConfig {
    #[serde(default)]
    pub navigation: NavigationSection,
    #[serde(default)]
    pub library: LibrarySection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct NavigationSection {
    pub max_link_candidates: Option<usize>,
    pub max_redirects: Option<usize>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LibrarySection {
    pub path: Option<PathBuf>,
    pub preferred_volume: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LoggingSection {
    pub level: Option<String>,
    pub file: Option<PathBuf>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_FILE: &str = "lexnav.log";
pub const DEFAULT_LIBRARY_DIR: &str = "library";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub navigator: NavigatorConfig,
    pub library_path: PathBuf,
    pub preferred_volume: Option<String>,
    pub log_level: String,
    pub log_file: PathBuf,
}

/// Values given on the command line. `None` means "not specified".
#[derive(Debug, Default)]
pub struct CliOverrides<'a> {
    pub library: Option<&'a Path>,
    pub volume: Option<&'a str>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

// ============================================================================
// Loading
// ============================================================================

/// Where the loaded settings came from. Loading runs before the logger exists,
/// so the caller logs this once logging is set up.
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigOrigin {
    File(PathBuf),
    /// No file existed; a commented default was written here.
    Generated(PathBuf),
    /// No file existed and writing the default failed.
    GenerateFailed { path: PathBuf, reason: String },
    NoHomeDir,
}

impl std::fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigOrigin::File(path) => write!(f, "loaded config from {}", path.display()),
            ConfigOrigin::Generated(path) => {
                write!(f, "no config file found, generated default at {}", path.display())
            }
            ConfigOrigin::GenerateFailed { path, reason } => write!(
                f,
                "no config file found, failed to write default at {}: {}",
                path.display(),
                reason
            ),
            ConfigOrigin::NoHomeDir => {
                write!(f, "could not determine home directory, using default config")
            }
        }
    }
}

/// Returns the path to `~/.lexnav/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".lexnav").join("config.toml"))
}

/// Load config from `~/.lexnav/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `LexnavConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<(LexnavConfig, ConfigOrigin), ConfigError> {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => Ok((LexnavConfig::default(), ConfigOrigin::NoHomeDir)),
    }
}

/// Same as [`load_config`] for an explicit path.
pub fn load_config_from(path: &Path) -> Result<(LexnavConfig, ConfigOrigin), ConfigError> {
    if !path.exists() {
        let origin = match generate_default_config(path) {
            Ok(()) => ConfigOrigin::Generated(path.to_path_buf()),
            Err(e) => ConfigOrigin::GenerateFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            },
        };
        return Ok((LexnavConfig::default(), origin));
    }

    let contents = fs::read_to_string(path)?;
    let config: LexnavConfig = toml::from_str(&contents)?;
    Ok((config, ConfigOrigin::File(path.to_path_buf())))
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) -> std::io::Result<()> {
    let default_content = r#"# lexnav Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [navigation]
# max_link_candidates = 10           # Candidates collected when a link matches several headwords
# max_redirects = 5                  # Redirect hops followed before giving up

# [library]
# path = "/home/me/dictionaries"     # Or set LEXNAV_LIBRARY env var
# preferred_volume = "enwiki"        # Searched first when following links

# [logging]
# level = "info"                     # "error", "warn", "info", "debug", "trace"
# file = "lexnav.log"
"#;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, default_content)
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &LexnavConfig, cli: &CliOverrides<'_>) -> ResolvedConfig {
    // Library: CLI → env → config → default
    let library_path = cli
        .library
        .map(Path::to_path_buf)
        .or_else(|| std::env::var("LEXNAV_LIBRARY").ok().map(PathBuf::from))
        .or_else(|| config.library.path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LIBRARY_DIR));

    // Preferred volume: CLI → config
    let preferred_volume = cli
        .volume
        .map(str::to_string)
        .or_else(|| config.library.preferred_volume.clone());

    // Log level: env → config → default
    let log_level = std::env::var("LEXNAV_LOG_LEVEL")
        .ok()
        .or_else(|| config.logging.level.clone())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

    // Log file: env → config → default
    let log_file = std::env::var("LEXNAV_LOG_FILE")
        .ok()
        .map(PathBuf::from)
        .or_else(|| config.logging.file.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));

    ResolvedConfig {
        navigator: NavigatorConfig {
            max_link_candidates: config
                .navigation
                .max_link_candidates
                .unwrap_or(DEFAULT_MAX_LINK_CANDIDATES),
            max_redirects: config
                .navigation
                .max_redirects
                .unwrap_or(DEFAULT_MAX_REDIRECTS),
        },
        library_path,
        preferred_volume,
        log_level,
        log_file,
    }
}
