pub mod storage;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::domain::model::UnknownTypeLabel;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_concurrency, validate_http_url, validate_output_file, validate_output_root,
    validate_timeout, validate_unknown_label,
};
use serde::Deserialize;

#[cfg(feature = "cli")]
use crate::domain::model::{ExportOptions, DEFAULT_DETAIL_URL_BASE, DEFAULT_UNKNOWN_LABEL};
#[cfg(feature = "cli")]
use crate::domain::ports::{
    DEFAULT_API_ENDPOINT, DEFAULT_CONCURRENT_REQUESTS, DEFAULT_CSV_FILE, DEFAULT_JSON_FILE,
};
#[cfg(feature = "cli")]
use crate::domain::type_table::TypeTable;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::time::Duration;

/// How an unmapped `typeId` is rendered in one output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum UnknownPolicy {
    #[default]
    Sentinel,
    Blank,
}

impl UnknownPolicy {
    pub fn into_label(self, sentinel: &str) -> UnknownTypeLabel {
        match self {
            UnknownPolicy::Sentinel => UnknownTypeLabel::Sentinel(sentinel.to_string()),
            UnknownPolicy::Blank => UnknownTypeLabel::Blank,
        }
    }
}

/// Checks shared by every configuration source.
pub(crate) fn validate_provider<C: ConfigProvider>(config: &C) -> Result<()> {
    validate_http_url("api_endpoint", config.api_endpoint())?;
    validate_output_root("output_path", config.output_path())?;
    validate_output_file("csv_file", config.csv_file())?;
    validate_output_file("json_file", config.json_file())?;
    validate_concurrency("concurrent_requests", config.concurrent_requests())?;
    validate_timeout("timeout_seconds", config.request_timeout())?;

    let options = config.export_options();
    validate_http_url("detail_url_base", &options.detail_url_base)?;
    validate_unknown_label("unknown_label", &options.csv_unknown)?;
    validate_unknown_label("unknown_label", &options.json_unknown)?;

    Ok(())
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "medical-centers")]
#[command(about = "Fetch the medical-center listing and export it as CSV and JSON")]
pub struct CliConfig {
    #[arg(long, default_value = DEFAULT_API_ENDPOINT)]
    pub api_endpoint: String,

    #[arg(long, help = "Only fetch centers of this city")]
    pub city_id: Option<i64>,

    #[arg(long, default_value = ".")]
    pub output_path: String,

    #[arg(long, default_value = DEFAULT_CSV_FILE)]
    pub csv_file: String,

    #[arg(long, default_value = DEFAULT_JSON_FILE)]
    pub json_file: String,

    #[arg(long, default_value_t = DEFAULT_CONCURRENT_REQUESTS)]
    pub concurrent_requests: usize,

    #[arg(long, help = "Per-request timeout in seconds")]
    pub timeout_seconds: Option<u64>,

    #[arg(long, default_value = DEFAULT_DETAIL_URL_BASE)]
    pub detail_url_base: String,

    #[arg(long, default_value = DEFAULT_UNKNOWN_LABEL)]
    pub unknown_label: String,

    #[arg(long, value_enum, default_value_t = UnknownPolicy::Sentinel)]
    pub csv_unknown: UnknownPolicy,

    #[arg(long, value_enum, default_value_t = UnknownPolicy::Sentinel)]
    pub json_unknown: UnknownPolicy,

    #[arg(long, help = "Load settings from a TOML file instead of flags")]
    pub config: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    fn city_id(&self) -> Option<i64> {
        self.city_id
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn csv_file(&self) -> &str {
        &self.csv_file
    }

    fn json_file(&self) -> &str {
        &self.json_file
    }

    fn concurrent_requests(&self) -> usize {
        self.concurrent_requests
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }

    fn type_table(&self) -> TypeTable {
        TypeTable::default()
    }

    fn export_options(&self) -> ExportOptions {
        ExportOptions {
            detail_url_base: self.detail_url_base.clone(),
            csv_unknown: self.csv_unknown.into_label(&self.unknown_label),
            json_unknown: self.json_unknown.into_label(&self.unknown_label),
        }
    }
}

#[cfg(feature = "cli")]
impl crate::utils::validation::Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}
