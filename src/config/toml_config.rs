use crate::config::ConfigLayer;
use crate::utils::error::{EtlError, Result};
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub load: LoadConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceConfig {
    pub endpoint: Option<String>,
    pub year: Option<u32>,
    pub api_key: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationConfig {
    pub page_size: Option<usize>,
    pub page_delay_ms: Option<u64>,
    pub max_pages: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoadConfig {
    pub output_path: Option<String>,
    pub file_prefix: Option<String>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| EtlError::ConfigError {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value. Unset variables are left in place.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn into_layer(self) -> ConfigLayer {
        // a key still reading ${...} came from an unset variable
        let api_key = self.source.api_key.filter(|key| {
            let unresolved = key.starts_with("${") && key.ends_with('}');
            if unresolved {
                tracing::warn!("api_key placeholder {} is not set in the environment", key);
            }
            !unresolved
        });

        ConfigLayer {
            api_endpoint: self.source.endpoint,
            api_key,
            year: self.source.year,
            output_path: self.load.output_path,
            file_prefix: self.load.file_prefix,
            page_size: self.pagination.page_size,
            page_delay_ms: self.pagination.page_delay_ms,
            max_pages: self.pagination.max_pages,
            timeout_seconds: self.source.timeout_seconds,
        }
    }
}
