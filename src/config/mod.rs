use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

mod defaults;
pub use defaults::*;

/// Client configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Connection configuration
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Message pipeline configuration
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// UI configuration
    #[serde(default)]
    pub ui: UiConfig,
}

/// Connection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// URL placed in the URL field on startup
    pub default_url: String,

    /// Whether to connect to `default_url` on startup
    pub auto_connect: bool,
}

/// Message pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Refuse to send payloads that are not valid JSON
    pub enforce_json_on_send: bool,
}

/// UI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Whether to use dark mode
    pub dark_mode: bool,

    /// Scale factor for UI (1.0 = 100%)
    pub scale_factor: f32,
}

/// Default location of the configuration file
pub fn default_config_path() -> Result<PathBuf> {
    let dir = dirs::config_dir().context("Could not find config directory")?;
    Ok(dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Load configuration from a file, writing the defaults there if it is missing
pub async fn load_config<P: AsRef<Path>>(path: P) -> Result<ClientConfig> {
    let path = path.as_ref();
    if !fs::try_exists(path).await.unwrap_or(false) {
        let config = ClientConfig::default();
        save_config(path, &config).await?;
        info!("Created default configuration at {}", path.display());
        return Ok(config);
    }

    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: ClientConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    if config.pipeline.enforce_json_on_send {
        debug!("Sends are restricted to valid JSON payloads");
    }
    Ok(config)
}

/// Write `config` to `path` as TOML, creating the directory as needed
pub async fn save_config<P: AsRef<Path>>(path: P, config: &ClientConfig) -> Result<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
    }

    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;
    debug!("Saved configuration to {}", path.display());
    Ok(())
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            default_url: DEFAULT_URL.to_string(),
            auto_connect: false,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            dark_mode: true,
            scale_factor: DEFAULT_UI_SCALE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let config = load_config(&path).await.expect("load");
        assert_eq!(config, ClientConfig::default());
        assert!(path.exists());

        // The second load reads the file that the first one wrote
        let written = fs::read_to_string(&path).await.expect("read");
        assert!(written.contains("default_url"));
        assert_eq!(load_config(&path).await.expect("reload"), config);
    }

    #[tokio::test]
    async fn saved_config_loads_back() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(CONFIG_FILE_NAME);

        let mut config = ClientConfig::default();
        config.connection.default_url = "wss://echo.example.org/ws".into();
        config.connection.auto_connect = true;
        config.pipeline.enforce_json_on_send = true;
        config.ui.dark_mode = false;

        save_config(&path, &config).await.expect("save");
        assert_eq!(load_config(&path).await.expect("load"), config);
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
            [connection]
            auto_connect = true
            "#,
        )
        .expect("parse");

        assert!(config.connection.auto_connect);
        assert_eq!(config.connection.default_url, DEFAULT_URL);
        assert!(!config.pipeline.enforce_json_on_send);
        assert_eq!(config.ui, UiConfig::default());
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[connection\n").await.expect("write");

        assert!(load_config(&path).await.is_err());
    }
}
