use crate::config::toml_config::TomlConfig;
use crate::config::{ConfigLayer, ExportConfig};
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;

/// Command line surface. Every flag falls back to an environment variable,
/// then to the optional config file, then to the built-in default.
#[derive(Debug, Clone, Parser)]
#[command(name = "camp-export")]
#[command(about = "Export the camp listing for a year to CSV")]
pub struct CliConfig {
    #[arg(long, env = "CAMP_EXPORT_CONFIG", help = "TOML config file")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "CAMP_EXPORT_API_ENDPOINT")]
    pub api_endpoint: Option<String>,

    #[arg(long, env = "CAMP_EXPORT_YEAR")]
    pub year: Option<u32>,

    #[arg(long, env = "CAMP_EXPORT_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "CAMP_EXPORT_OUTPUT_PATH")]
    pub output_path: Option<String>,

    #[arg(long, help = "Prefix for output file names, e.g. <prefix>_2025_camps.csv")]
    pub file_prefix: Option<String>,

    #[arg(long, help = "Records in a full page; a shorter page ends the fetch")]
    pub page_size: Option<usize>,

    #[arg(long, help = "Pause between page requests")]
    pub page_delay_ms: Option<u64>,

    #[arg(long, help = "Give up after this many pages")]
    pub max_pages: Option<u32>,

    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

impl CliConfig {
    fn to_layer(&self) -> ConfigLayer {
        ConfigLayer {
            api_endpoint: self.api_endpoint.clone(),
            api_key: self.api_key.clone(),
            year: self.year,
            output_path: self.output_path.clone(),
            file_prefix: self.file_prefix.clone(),
            page_size: self.page_size,
            page_delay_ms: self.page_delay_ms,
            max_pages: self.max_pages,
            timeout_seconds: self.timeout_seconds,
        }
    }

    /// Merges flags over the config file (if any) over defaults.
    pub fn resolve(&self) -> Result<ExportConfig> {
        let file_layer = match &self.config {
            Some(path) => {
                tracing::debug!("Loading config file {}", path.display());
                TomlConfig::from_file(path)?.into_layer()
            }
            None => ConfigLayer::default(),
        };

        ExportConfig::from_layer(self.to_layer().or(file_layer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::ConfigProvider;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_flags_override_config_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(
                br#"
[source]
api_key = "file-key"
year = 2019

[pagination]
page_size = 25
max_pages = 7

[load]
file_prefix = "burningman"
"#,
            )
            .unwrap();

        // env-backed fields are all given as flags
        let cli = CliConfig::parse_from([
            "camp-export",
            "--config",
            temp_file.path().to_str().unwrap(),
            "--api-key",
            "cli-key",
            "--year",
            "2024",
        ]);

        let config = cli.resolve().unwrap();
        assert_eq!(config.year, 2024);
        assert_eq!(config.api_key, "cli-key");
        // flag-only fields come from the file
        assert_eq!(config.page_size, 25);
        assert_eq!(config.max_pages, 7);
        assert_eq!(config.camps_file_name(), "burningman_2024_camps.csv");
    }

    #[test]
    fn test_flags_alone() {
        let cli = CliConfig::parse_from([
            "camp-export",
            "--api-key",
            "cli-key",
            "--file-prefix",
            "burningman",
            "--max-pages",
            "3",
        ]);

        let config = cli.resolve().unwrap();
        assert_eq!(config.api_key, "cli-key");
        assert_eq!(config.max_pages, 3);
        assert_eq!(config.camps_file_name(), format!("burningman_{}_camps.csv", config.year));
    }
}
