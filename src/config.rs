use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const CONFIG_DIR_PREFIX: &str = "sheets-viewer";

pub const DEFAULT_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub client: ClientConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    /// Google OAuth client file; defaults to `client_secret.json` next to the config file
    pub credentials_file: Option<PathBuf>,
    pub tokeninfo_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            credentials_file: None,
            tokeninfo_url: DEFAULT_TOKENINFO_URL.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ClientConfig {
    pub api_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3001".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn credentials_path(&self) -> Result<PathBuf> {
        match &self.credentials_file {
            Some(path) => Ok(path.clone()),
            None => Config::config_dir_file("client_secret.json"),
        }
    }
}

impl Config {
    /// Load the config file, falling back to defaults when it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_file()?;

        if !config_path.exists() {
            debug!(path = ?config_path, "No config file, using defaults");
            return Ok(Self::default());
        }

        Self::from_path(&config_path)
    }

    fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {}", e)))?;

        if config.client.api_url.is_empty() {
            return Err(AppError::Config(
                "client.api_url must not be empty".to_string(),
            ));
        }

        Ok(config)
    }

    fn xdg_dirs() -> xdg::BaseDirectories {
        xdg::BaseDirectories::with_prefix(CONFIG_DIR_PREFIX)
    }

    /// Get the config file path
    pub fn config_file() -> Result<PathBuf> {
        Self::config_dir_file("config.toml")
    }

    fn config_dir_file(filename: &str) -> Result<PathBuf> {
        Self::xdg_dirs()
            .place_config_file(filename)
            .map_err(|e| AppError::Config(format!("Failed to create config directory: {}", e)))
    }

    /// Get the cache directory path
    pub fn cache_dir() -> Result<PathBuf> {
        let xdg = Self::xdg_dirs();
        xdg.get_cache_home()
            .ok_or_else(|| AppError::Config("Failed to determine cache directory".to_string()))
    }

    /// Get a cache file path
    pub fn cache_file(filename: &str) -> Result<PathBuf> {
        let xdg = Self::xdg_dirs();
        xdg.place_cache_file(filename)
            .map_err(|e| AppError::Config(format!("Failed to create cache file path: {}", e)))
    }
}

/// OAuth client credentials the server holds on behalf of the client.
#[derive(Debug, Clone, PartialEq)]
pub struct GoogleCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

// Layout of the client_secret.json file downloaded from the Google Cloud console
#[derive(Debug, Deserialize)]
struct CredentialsFile {
    web: Option<OAuthClientSection>,
    installed: Option<OAuthClientSection>,
}

#[derive(Debug, Deserialize)]
struct OAuthClientSection {
    client_id: String,
    client_secret: String,
    #[serde(default)]
    redirect_uris: Vec<String>,
}

impl GoogleCredentials {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!(
                "Failed to load {}: {}. Please ensure the file exists and contains valid Google OAuth credentials.",
                path.display(),
                e
            ))
        })?;

        Self::parse(&contents)
    }

    fn parse(contents: &str) -> Result<Self> {
        let file: CredentialsFile = serde_json::from_str(contents)
            .map_err(|e| AppError::Config(format!("Failed to parse credentials: {}", e)))?;

        let section = file.web.or(file.installed).ok_or_else(|| {
            AppError::Config("Credentials must contain a 'web' or 'installed' client".to_string())
        })?;

        if section.client_id.is_empty() || section.client_secret.is_empty() {
            return Err(AppError::Config(
                "Google client_id and client_secret must be set in credentials".to_string(),
            ));
        }

        let redirect_uri = section
            .redirect_uris
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Config("Credentials have no redirect URI".to_string()))?;

        Ok(Self {
            client_id: section.client_id,
            client_secret: section.client_secret,
            redirect_uri,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_serialization() {
        let config = Config {
            server: ServerConfig {
                port: 8080,
                ..Default::default()
            },
            client: ClientConfig {
                api_url: "http://localhost:8080".to_string(),
            },
        };

        let serialized = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();

        assert_eq!(deserialized.server.port, 8080);
        assert_eq!(deserialized.client.api_url, "http://localhost:8080");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = 4000").unwrap();

        let config = Config::from_path(file.path()).unwrap();

        assert_eq!(config.server.port, 4000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.tokeninfo_url, DEFAULT_TOKENINFO_URL);
        assert_eq!(config.client.api_url, "http://localhost:3001");
    }

    #[test]
    fn test_credentials_web_client() {
        let credentials = GoogleCredentials::parse(
            r#"{"web": {
                "client_id": "id.apps.googleusercontent.com",
                "client_secret": "secret",
                "redirect_uris": ["http://127.0.0.1:8085/callback", "http://localhost:3000"]
            }}"#,
        )
        .unwrap();

        assert_eq!(
            credentials,
            GoogleCredentials {
                client_id: "id.apps.googleusercontent.com".to_string(),
                client_secret: "secret".to_string(),
                redirect_uri: "http://127.0.0.1:8085/callback".to_string(),
            }
        );
    }

    #[test]
    fn test_credentials_installed_client() {
        let credentials = GoogleCredentials::parse(
            r#"{"installed": {
                "client_id": "desktop-id",
                "client_secret": "desktop-secret",
                "redirect_uris": ["http://localhost"]
            }}"#,
        )
        .unwrap();

        assert_eq!(credentials.client_id, "desktop-id");
        assert_eq!(credentials.redirect_uri, "http://localhost");
    }

    #[test]
    fn test_credentials_without_redirect_uri() {
        let result = GoogleCredentials::parse(
            r#"{"web": {"client_id": "id", "client_secret": "secret"}}"#,
        );

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_missing_credentials_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = GoogleCredentials::load(&dir.path().join("client_secret.json"));

        match result {
            Err(AppError::Config(message)) => assert!(message.contains("client_secret.json")),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
