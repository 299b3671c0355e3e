use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where a configuration value came from
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    fn unset() -> ConfigValue<Option<T>> {
        ConfigValue::new(None, ConfigSource::Default)
    }
}

/// Persistence server settings
#[derive(Debug, Clone, Serialize)]
pub struct ServerConfig {
    /// Base URL of the tour service (e.g., "https://api.example.com")
    pub base_url: ConfigValue<Option<String>>,
    /// Bearer token sent with every request
    #[serde(skip)]
    pub api_token: ConfigValue<Option<String>>,
}

impl ServerConfig {
    pub fn is_configured(&self) -> bool {
        self.base_url.value.is_some()
    }
}

/// PDF export settings
#[derive(Debug, Clone, Serialize)]
pub struct ExportConfig {
    /// TrueType font embedded in generated PDFs
    pub font_path: ConfigValue<Option<PathBuf>>,
    /// Directory downloads are written to
    pub output_dir: ConfigValue<PathBuf>,
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Directory holding the working itinerary and session
    pub data_dir: ConfigValue<PathBuf>,
    pub server: ServerConfig,
    pub export: ExportConfig,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    server: Option<ServerSection>,
    export: Option<ExportSection>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ServerSection {
    base_url: Option<String>,
    api_token: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ExportSection {
    font_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut data_dir = ConfigValue::new(Self::default_data_dir(), ConfigSource::Default);
        let mut base_url = ConfigValue::<String>::unset();
        let mut api_token = ConfigValue::<String>::unset();
        let mut font_path = ConfigValue::<PathBuf>::unset();
        let mut output_dir = ConfigValue::new(PathBuf::from("."), ConfigSource::Default);
        let mut config_file = None;

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            let server = file.server.unwrap_or_default();
            let export = file.export.unwrap_or_default();
            if let Some(dir) = file.data_dir {
                data_dir = ConfigValue::new(resolve(&path, dir), ConfigSource::File);
            }
            if let Some(url) = server.base_url {
                base_url = ConfigValue::new(Some(url), ConfigSource::File);
            }
            if let Some(token) = server.api_token {
                api_token = ConfigValue::new(Some(token), ConfigSource::File);
            }
            if let Some(font) = export.font_path {
                font_path = ConfigValue::new(Some(resolve(&path, font)), ConfigSource::File);
            }
            if let Some(dir) = export.output_dir {
                output_dir = ConfigValue::new(resolve(&path, dir), ConfigSource::File);
            }
            config_file = Some(path);
        }

        if let Ok(dir) = std::env::var("TOUR_DATA_DIR") {
            data_dir = ConfigValue::new(PathBuf::from(dir), ConfigSource::Environment);
        }
        if let Ok(url) = std::env::var("TOUR_SERVER_URL") {
            base_url = ConfigValue::new(Some(url), ConfigSource::Environment);
        }
        if let Ok(token) = std::env::var("TOUR_API_TOKEN") {
            api_token = ConfigValue::new(Some(token), ConfigSource::Environment);
        }
        if let Ok(font) = std::env::var("TOUR_FONT_PATH") {
            font_path = ConfigValue::new(Some(PathBuf::from(font)), ConfigSource::Environment);
        }
        if let Ok(dir) = std::env::var("TOUR_OUTPUT_DIR") {
            output_dir = ConfigValue::new(PathBuf::from(dir), ConfigSource::Environment);
        }

        Ok(Self {
            data_dir,
            server: ServerConfig {
                base_url,
                api_token,
            },
            export: ExportConfig {
                font_path,
                output_dir,
            },
            config_file,
        })
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/tour/
    /// - macOS: ~/Library/Application Support/tour/
    /// - Windows: %APPDATA%/tour/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tour")
    }

    /// Default data directory (platform-specific data dir + tour/)
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tour")
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

/// Relative paths in the config file are relative to the file itself.
fn resolve(config_path: &Path, value: PathBuf) -> PathBuf {
    if value.is_relative() {
        config_path
            .parent()
            .map(|p| p.join(&value))
            .unwrap_or(value)
    } else {
        value
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let temp_dir = tempdir().unwrap();
        let config = Config::load(Some(temp_dir.path().join("missing.yaml"))).unwrap();

        assert!(config.data_dir.value.ends_with("tour"));
        assert_eq!(config.data_dir.source, ConfigSource::Default);
        assert_eq!(config.export.output_dir.value, PathBuf::from("."));
        assert!(config.config_file.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "data_dir: /var/lib/tour").unwrap();
        writeln!(file, "server:").unwrap();
        writeln!(file, "  base_url: https://tours.example.com").unwrap();
        writeln!(file, "export:").unwrap();
        writeln!(file, "  output_dir: pdfs").unwrap();

        let config = Config::load(Some(config_path.clone())).unwrap();
        assert_eq!(config.data_dir.value, PathBuf::from("/var/lib/tour"));
        assert_eq!(config.data_dir.source, ConfigSource::File);
        assert_eq!(
            config.server.base_url.value.as_deref(),
            Some("https://tours.example.com")
        );
        assert!(config.server.is_configured());
        assert_eq!(config.export.output_dir.value, temp_dir.path().join("pdfs"));
        assert_eq!(config.config_file, Some(config_path));
    }

    #[test]
    #[ignore] // Run with --ignored; env vars can pollute parallel tests
    fn test_env_var_overrides_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "server:\n  base_url: http://from-file").unwrap();

        std::env::set_var("TOUR_SERVER_URL", "http://from-env");

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(
            config.server.base_url.value.as_deref(),
            Some("http://from-env")
        );
        assert_eq!(config.server.base_url.source, ConfigSource::Environment);

        std::env::remove_var("TOUR_SERVER_URL");
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "server: [").unwrap();

        let err = Config::load(Some(config_path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_token_never_serialized() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "server:\n  api_token: secret\n").unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.server.api_token.value.as_deref(), Some("secret"));
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }
}
