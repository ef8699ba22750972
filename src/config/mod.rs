#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_API_ENDPOINT: &str = "https://api.burningman.org/api/v1/camp";
pub const DEFAULT_YEAR: u32 = 2025;
pub const DEFAULT_OUTPUT_PATH: &str = ".";
/// Records per full page; a shorter page is taken as the last one. The API
/// does not promise this size, so it stays configurable.
pub const DEFAULT_PAGE_SIZE: usize = 100;
pub const DEFAULT_PAGE_DELAY_MS: u64 = 500;
pub const DEFAULT_MAX_PAGES: u32 = 1000;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

const MIN_YEAR: u32 = 1986;
const MAX_YEAR: u32 = 2100;

/// One source of settings. Layers are stacked with [`ConfigLayer::or`], the
/// receiver winning over the argument.
#[derive(Clone, Default)]
pub struct ConfigLayer {
    pub api_endpoint: Option<String>,
    pub api_key: Option<String>,
    pub year: Option<u32>,
    pub output_path: Option<String>,
    pub file_prefix: Option<String>,
    pub page_size: Option<usize>,
    pub page_delay_ms: Option<u64>,
    pub max_pages: Option<u32>,
    pub timeout_seconds: Option<u64>,
}

impl ConfigLayer {
    pub fn or(self, lower: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            api_endpoint: self.api_endpoint.or(lower.api_endpoint),
            api_key: self.api_key.or(lower.api_key),
            year: self.year.or(lower.year),
            output_path: self.output_path.or(lower.output_path),
            file_prefix: self.file_prefix.or(lower.file_prefix),
            page_size: self.page_size.or(lower.page_size),
            page_delay_ms: self.page_delay_ms.or(lower.page_delay_ms),
            max_pages: self.max_pages.or(lower.max_pages),
            timeout_seconds: self.timeout_seconds.or(lower.timeout_seconds),
        }
    }
}

/// Fully resolved settings for one export run.
#[derive(Clone)]
pub struct ExportConfig {
    pub api_endpoint: String,
    pub api_key: String,
    pub year: u32,
    pub output_path: String,
    pub file_prefix: Option<String>,
    pub page_size: usize,
    pub page_delay: Duration,
    pub max_pages: u32,
    pub request_timeout: Duration,
}

impl ExportConfig {
    pub fn new(api_endpoint: impl Into<String>, api_key: impl Into<String>, year: u32) -> Self {
        Self {
            api_endpoint: api_endpoint.into(),
            api_key: api_key.into(),
            year,
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
            file_prefix: None,
            page_size: DEFAULT_PAGE_SIZE,
            page_delay: Duration::from_millis(DEFAULT_PAGE_DELAY_MS),
            max_pages: DEFAULT_MAX_PAGES,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        }
    }

    /// Fills every unset value with its default. The API key has none.
    pub fn from_layer(layer: ConfigLayer) -> Result<Self> {
        let api_key = validation::validate_required_field("api_key", &layer.api_key)?.clone();

        Ok(Self {
            api_endpoint: layer
                .api_endpoint
                .unwrap_or_else(|| DEFAULT_API_ENDPOINT.to_string()),
            api_key,
            year: layer.year.unwrap_or(DEFAULT_YEAR),
            output_path: layer
                .output_path
                .unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string()),
            file_prefix: layer.file_prefix.filter(|prefix| !prefix.is_empty()),
            page_size: layer.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            page_delay: Duration::from_millis(layer.page_delay_ms.unwrap_or(DEFAULT_PAGE_DELAY_MS)),
            max_pages: layer.max_pages.unwrap_or(DEFAULT_MAX_PAGES),
            request_timeout: Duration::from_secs(
                layer.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS),
            ),
        })
    }
}

impl fmt::Debug for ExportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportConfig")
            .field("api_endpoint", &self.api_endpoint)
            .field("api_key", &"<redacted>")
            .field("year", &self.year)
            .field("output_path", &self.output_path)
            .field("file_prefix", &self.file_prefix)
            .field("page_size", &self.page_size)
            .field("page_delay", &self.page_delay)
            .field("max_pages", &self.max_pages)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl ConfigProvider for ExportConfig {
    fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    fn api_key(&self) -> &str {
        &self.api_key
    }

    fn year(&self) -> u32 {
        self.year
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn file_prefix(&self) -> Option<&str> {
        self.file_prefix.as_deref()
    }

    fn page_size(&self) -> usize {
        self.page_size
    }

    fn page_delay(&self) -> Duration {
        self.page_delay
    }

    fn max_pages(&self) -> u32 {
        self.max_pages
    }

    fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

impl Validate for ExportConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api_endpoint", &self.api_endpoint)?;
        validation::validate_non_empty_secret("api_key", &self.api_key)?;
        validation::validate_range("year", self.year, MIN_YEAR, MAX_YEAR)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_positive_number("page_size", self.page_size, 1)?;
        validation::validate_positive_number("max_pages", self.max_pages, 1)?;
        validation::validate_positive_number(
            "timeout_seconds",
            self.request_timeout.as_secs(),
            1,
        )?;
        Ok(())
    }
}
