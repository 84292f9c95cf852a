use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "config.json5";

/// Application configuration structure
///
/// Contains all deployment parameters for the Minaret site. Every field has
/// a default so the server can boot without a config file at all.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Name of the mosque, displayed in the page title
    pub site_name: String,
    /// Path of the SQLite database file
    pub database_file: String,
    /// Browser origins allowed to call the API and the push channel
    pub allowed_origins: Vec<String>,
    /// Admin account created on first boot when the table is empty
    pub admin: AdminSeed,
}

/// Credentials used to seed the single admin account at first boot.
///
/// The password is hashed before it is stored; the plaintext only ever
/// lives in the config file.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site_name: "Chimir ota Jome Masjidi".to_string(),
            database_file: "mosque.db".to_string(),
            allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:5174".to_string(),
            ],
            admin: AdminSeed::default(),
        }
    }
}

impl Default for AdminSeed {
    fn default() -> Self {
        Self {
            email: "admin@chimirotajome.uz".to_string(),
            password: "Mosque@2025!".to_string(),
            name: "Mosque Administrator".to_string(),
        }
    }
}

impl Config {
    /// Load the application configuration.
    ///
    /// When `path` is given the file must exist and parse. Without an
    /// explicit path the default `config.json5` is used if present,
    /// otherwise built-in defaults apply.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly requested configuration file cannot
    /// be read, or if any configuration file fails to parse.
    pub fn load(path: Option<&Path>) -> crate::error::Result<Self> {
        tracing::debug!("Loading application configuration");

        let config_str = match path {
            Some(explicit) => fs::read_to_string(explicit)?,
            None => match fs::read_to_string(CONFIG_FILE) {
                Ok(contents) => contents,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::info!("No {CONFIG_FILE} found, using built-in defaults");
                    return Ok(Self::default());
                }
                Err(e) => return Err(e.into()),
            },
        };

        let config: Config = json5::from_str(&config_str)?;
        tracing::info!("Configuration loaded successfully");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_when_no_file() {
        let config = Config::default();
        assert_eq!(config.database_file, "mosque.db");
        assert_eq!(config.allowed_origins.len(), 2);
        assert!(!config.admin.email.is_empty());
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        write!(
            file,
            "{{ site_name: \"Test Masjid\", database_file: \"/tmp/test.db\" }}"
        )
        .expect("Failed to write temp config");

        let config = Config::load(Some(file.path())).expect("Config should load");
        assert_eq!(config.site_name, "Test Masjid");
        assert_eq!(config.database_file, "/tmp/test.db");
        // Unspecified fields fall back to defaults
        assert_eq!(config.admin.name, "Mosque Administrator");
    }

    #[test]
    fn test_load_missing_explicit_path_is_an_error() {
        let result = Config::load(Some(Path::new("/nonexistent/minaret.json5")));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_malformed_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        write!(file, "{{ site_name: ").expect("Failed to write temp config");

        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, crate::error::MinaretError::ConfigParse(_)));
    }
}
