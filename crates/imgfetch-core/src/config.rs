use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Dispatch mode for a directory batch: fan out every URL at once, or fetch
/// strictly one at a time. Both have identical semantics otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    Sequential,
    #[default]
    Concurrent,
}

/// Global configuration loaded from `~/.config/imgfetch/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Dispatch mode within a directory batch: "concurrent" (default) or "sequential".
    pub mode: FetchMode,
    /// Replace files that already exist at the destination path. When false
    /// (default), an existing regular file skips the fetch entirely.
    pub overwrite_existing: bool,
    /// Optional cap on in-flight fetches per directory batch. `None` (default)
    /// launches every URL of the batch at once; directories with very large
    /// URL lists may want a cap.
    pub max_in_flight: Option<usize>,
    /// Optional whole-transfer deadline per fetch, in seconds. `None`
    /// (default) lets a fetch run to completion or error.
    pub fetch_timeout_secs: Option<u64>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            mode: FetchMode::Concurrent,
            overwrite_existing: false,
            max_in_flight: None,
            fetch_timeout_secs: None,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("imgfetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<FetchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = FetchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: FetchConfig = toml::from_str(&data)?;
    Ok(cfg)
}
