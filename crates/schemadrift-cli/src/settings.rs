use std::path::Path;

use schemadrift_core::CompareConfig;

/// Command-line switches that take precedence over the config file.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub tables_to_ignore: Option<String>,
    pub case_insensitive: bool,
    pub skip_unused_check: bool,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut CompareConfig) {
        if let Some(tables) = &self.tables_to_ignore {
            config.tables_to_ignore = Some(tables.clone());
        }
        if self.case_insensitive {
            config.case_sensitive = false;
        }
        if self.skip_unused_check {
            config.check_unused_database_objects = false;
        }
    }
}

/// Read a comparison config from TOML, or the defaults when no file is given.
pub fn load_compare_config(path: Option<&Path>) -> Result<CompareConfig, SettingsError> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        }
        None => Ok(CompareConfig::default()),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml decode error: {0}")]
    TomlDecode(#[from] toml::de::Error),
}
