//! Configuration loading.
//!
//! `config.toml` lives in the platform config directory (or wherever
//! `--config` points) and holds the feed subscriptions plus optional
//! keybinding override tables. Problems with the file are reported as
//! warnings and the affected parts fall back to defaults; a broken config
//! never stops the reader from starting.

use directories::ProjectDirs;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;
use tidings_core::{FeedConfig, KeybindingsConfig, KeybindingsOverride};

const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576; // 1 MiB
const MAX_FEEDS: usize = 512;

/// Resolved runtime configuration: defaults merged with the user's file.
#[derive(Debug)]
pub struct Config {
    pub feeds: Vec<FeedConfig>,
    pub bindings: KeybindingsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            feeds: Vec::new(),
            bindings: KeybindingsConfig::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    feeds: Vec<FeedEntry>,
    keybindings: Option<KeybindingsOverride>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FeedEntry {
    url: String,
    name: Option<String>,
}

/// Load configuration from `config_file` if given, otherwise from the user
/// config directory. Missing files are fine; malformed ones produce warnings
/// and defaults.
pub fn load_config(config_file: Option<&PathBuf>) -> (Config, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let config_path = config_file.cloned().or_else(user_config_path);
    let mut file: Option<ConfigFile> = None;

    if let Some(path) = config_path.as_ref() {
        if path.exists() {
            match std::fs::metadata(path) {
                Ok(meta) if meta.len() > MAX_CONFIG_FILE_BYTES => {
                    warnings.push(format!(
                        "Refusing to read {}: file too large ({} bytes, max {})",
                        path.display(),
                        meta.len(),
                        MAX_CONFIG_FILE_BYTES
                    ));
                }
                Ok(_) => match std::fs::read_to_string(path) {
                    Ok(content) => match toml::from_str::<ConfigFile>(&content) {
                        Ok(parsed) => file = Some(parsed),
                        Err(err) => {
                            warnings.push(format!("Failed to parse {}: {}", path.display(), err))
                        }
                    },
                    Err(err) => {
                        warnings.push(format!("Failed to read {}: {}", path.display(), err))
                    }
                },
                Err(err) => warnings.push(format!(
                    "Failed to read metadata for {}: {}",
                    path.display(),
                    err
                )),
            }
        } else if config_file.is_some() {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
    }

    let config = match file {
        Some(file) => build_config(file, &mut warnings),
        None => Config::default(),
    };
    tracing::info!(
        feeds = config.feeds.len(),
        warnings = warnings.len(),
        "config loaded"
    );
    (config, warnings)
}

fn build_config(file: ConfigFile, warnings: &mut Vec<String>) -> Config {
    let mut feeds: Vec<FeedConfig> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for entry in file.feeds {
        if feeds.len() >= MAX_FEEDS {
            warnings.push(format!("Too many feeds (max {}); ignoring the rest", MAX_FEEDS));
            break;
        }
        let url = entry.url.trim().to_string();
        if url.is_empty() {
            warnings.push("Ignoring feed with empty url".to_string());
            continue;
        }
        if !seen.insert(url.clone()) {
            warnings.push(format!("Ignoring duplicate feed '{}'", url));
            continue;
        }
        let name = entry
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| display_name_from_url(&url));
        feeds.push(FeedConfig { name, url });
    }

    let bindings = match file.keybindings {
        Some(overrides) => KeybindingsConfig::with_overrides(&overrides, warnings),
        None => KeybindingsConfig::default(),
    };

    Config { feeds, bindings }
}

/// A feed without a configured name shows up as its host.
fn display_name_from_url(url: &str) -> String {
    let stripped = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let host = stripped.split('/').next().unwrap_or(stripped);
    if host.is_empty() {
        url.to_string()
    } else {
        host.to_string()
    }
}

pub fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "tidings")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}

/// Directory for the article store and the log file.
pub fn user_data_dir() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "tidings")?;
    Some(proj.data_dir().to_path_buf())
}
