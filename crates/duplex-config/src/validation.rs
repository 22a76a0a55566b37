//! Schema and filesystem validation for loaded configuration.

use std::path::Path;

use crate::config::DuplexConfig;
use crate::error::{ConfigError, Result};

impl DuplexConfig {
    /// Schema-level validation: no filesystem access.
    pub fn validate(&self) -> Result<()> {
        if self.shared.entry.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue(
                "shared.entry must not be empty".to_string(),
            ));
        }

        validate_filename("browser.filename", &self.browser.filename)?;
        validate_filename("host.filename", &self.host.filename)?;

        if !is_identifier(&self.browser.library) {
            return Err(ConfigError::InvalidValue(format!(
                "browser.library must be a valid identifier, got '{}'",
                self.browser.library
            )));
        }

        if self.host.reserved.is_empty() {
            return Err(ConfigError::InvalidValue(
                "host.reserved must list at least one entry point".to_string(),
            ));
        }
        for name in &self.host.reserved {
            if !is_identifier(name) {
                return Err(ConfigError::InvalidValue(format!(
                    "host.reserved entry '{name}' is not a valid identifier"
                )));
            }
        }

        if self.browser.out_dir == self.host.out_dir {
            return Err(ConfigError::InvalidValue(format!(
                "browser and host targets must own distinct output directories, both use '{}'",
                self.browser.out_dir.display()
            )));
        }

        Ok(())
    }

    /// Filesystem validation, relative to the project root.
    pub fn validate_paths(&self, root: &Path) -> Result<()> {
        let entry = if self.shared.entry.is_absolute() {
            self.shared.entry.clone()
        } else {
            root.join(&self.shared.entry)
        };
        if !entry.is_file() {
            return Err(ConfigError::EntryNotFound(entry));
        }
        Ok(())
    }
}

fn validate_filename(field: &str, filename: &str) -> Result<()> {
    if filename.is_empty() {
        return Err(ConfigError::InvalidValue(format!(
            "{field} must not be empty"
        )));
    }
    if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
        return Err(ConfigError::InvalidValue(format!(
            "{field} must be a bare filename, got '{filename}'"
        )));
    }
    Ok(())
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
