//! User configuration
//!
//! Read from `<config_dir>/pendientes/config.toml`. Every key is optional:
//!
//! ```toml
//! seed_url = "https://example.com/pendientes.json"
//! page_size = 20
//!
//! [import]
//! header_row = 1          # omit to detect automatically
//! week_fallback = "zero"  # or "empty"
//!
//! [import.synonyms]
//! top_number = ["Numero punch"]
//! ```

pub mod repository;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::tracker::excel::{Field, HeaderTable, RowRules};
use crate::tracker::import::{HeaderRow, ImportOptions};

const APP_DIR: &str = "pendientes";
const CONFIG_FILE: &str = "config.toml";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the database, defaults to the platform data dir
    pub data_dir: Option<PathBuf>,
    pub database_file: String,
    /// Blob slot the collection is stored under
    pub slot: String,
    /// JSON seed fetched once when the store is empty
    pub seed_url: Option<String>,
    pub page_size: usize,
    pub import: ImportConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            database_file: "pendientes.db".to_string(),
            slot: "pendientes_data".to_string(),
            seed_url: None,
            page_size: 20,
            import: ImportConfig::default(),
        }
    }
}

/// Import pipeline settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// 0-based header row; `None` detects it
    pub header_row: Option<usize>,
    pub week_fallback: WeekFallback,
    /// Extra accepted header spellings per field
    pub synonyms: HashMap<Field, Vec<String>>,
}

/// Week value for rows without a usable week
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekFallback {
    #[default]
    Zero,
    Empty,
}

impl Config {
    /// Default config file location
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join(CONFIG_FILE)
    }

    /// Load from `path`, or from the default location.
    ///
    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);

        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        if config.page_size == 0 {
            log::warn!("page_size = 0 is not usable, falling back to 20");
            config.page_size = 20;
        }
        Ok(config)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR)
        })
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir().join(&self.database_file)
    }

    /// Import options with an optional header-row override
    pub fn import_options(&self, header_row: Option<usize>) -> ImportOptions {
        let header_row = match header_row.or(self.import.header_row) {
            Some(idx) => HeaderRow::Index(idx),
            None => HeaderRow::Auto,
        };

        let week_fallback = match self.import.week_fallback {
            WeekFallback::Zero => Some(0.0),
            WeekFallback::Empty => None,
        };

        ImportOptions {
            header_row,
            headers: HeaderTable::default().extend(&self.import.synonyms),
            rules: RowRules { week_fallback },
        }
    }
}
