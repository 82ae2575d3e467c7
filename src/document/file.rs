//! File-backed document loading.

use std::path::Path;

use toml::Table;
use tracing::debug;

use crate::ConfigError;

/// Reads and parses a TOML file into a table.
pub(crate) fn load_config_file(path: &Path) -> Result<Table, ConfigError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    let table: Table = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    debug!(path = %path.display(), keys = table.len(), "loaded config file");
    Ok(table)
}
