use clap::{Args, Subcommand};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use super::OutputFormat;
use crate::config::{Config, ConfigValue};

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Initialize configuration file
    Init,
}

const DEFAULT_CONFIG: &str = r#"# tour configuration

# Where the working itinerary and login session are kept
# (default: platform data dir, e.g. ~/.local/share/tour)
# data_dir: ~/.local/share/tour

server:
  # Tour persistence service
  # base_url: https://tours.example.com
  # api_token: ...

export:
  # TrueType font embedded in PDFs; needed for non-Latin text
  # font_path: /usr/share/fonts/truetype/nanum/NanumGothic.ttf
  output_dir: .
"#;

fn print_value<T: std::fmt::Display>(key: &str, value: &ConfigValue<T>) {
    println!("{}: {}", key, value.value);
    println!("  source: {}", value.source);
}

fn print_optional<T: std::fmt::Display>(key: &str, value: &ConfigValue<Option<T>>) {
    match &value.value {
        Some(v) => println!("{}: {}", key, v),
        None => println!("{}: (not set)", key),
    }
    println!("  source: {}", value.source);
}

impl ConfigCommand {
    pub fn run(
        &self,
        config: &Config,
        cli_config_path: Option<PathBuf>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        if let Some(path) = &config.config_file {
                            println!("Config file: {}", path.display());
                        } else {
                            println!(
                                "Config file: {} (not found)",
                                Config::default_config_path().display()
                            );
                        }
                        println!();

                        print_value("data_dir", &display_path(&config.data_dir));
                        print_optional("server.base_url", &config.server.base_url);
                        let token = if config.server.api_token.value.is_some() {
                            "(set)"
                        } else {
                            "(not set)"
                        };
                        println!("server.api_token: {}", token);
                        println!("  source: {}", config.server.api_token.source);
                        print_optional(
                            "export.font_path",
                            &ConfigValue::new(
                                config
                                    .export
                                    .font_path
                                    .value
                                    .as_ref()
                                    .map(|p| p.display().to_string()),
                                config.export.font_path.source,
                            ),
                        );
                        print_value("export.output_dir", &display_path(&config.export.output_dir));
                    }
                }
                Ok(())
            }

            ConfigSubcommand::Init => {
                let config_path = cli_config_path.unwrap_or_else(Config::default_config_path);

                if config_path.exists() {
                    println!("Config file already exists: {}", config_path.display());
                    println!("Use 'tour config show' to view current configuration.");
                    return Ok(());
                }

                if let Some(parent) = config_path.parent() {
                    fs::create_dir_all(parent)?;
                }

                let mut file = fs::File::create(&config_path)?;
                file.write_all(DEFAULT_CONFIG.as_bytes())?;

                println!("Created config file: {}", config_path.display());
                println!("\nEdit this file to customize your settings.");
                Ok(())
            }
        }
    }
}

fn display_path(value: &ConfigValue<PathBuf>) -> ConfigValue<String> {
    ConfigValue::new(value.value.display().to_string(), value.source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_parses() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        ConfigCommand {
            command: ConfigSubcommand::Init,
        }
        .run(
            &Config::load(Some(config_path.clone())).unwrap(),
            Some(config_path.clone()),
        )
        .unwrap();

        let config = Config::load(Some(config_path.clone())).unwrap();
        assert_eq!(config.config_file, Some(config_path));
        assert_eq!(config.export.output_dir.value, temp_dir.path().join("."));
    }
}
