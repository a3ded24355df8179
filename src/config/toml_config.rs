use crate::config::{validate_provider, UnknownPolicy};
use crate::core::ConfigProvider;
use crate::domain::model::{ExportOptions, DEFAULT_DETAIL_URL_BASE, DEFAULT_UNKNOWN_LABEL};
use crate::domain::ports::{
    DEFAULT_API_ENDPOINT, DEFAULT_CONCURRENT_REQUESTS, DEFAULT_CSV_FILE, DEFAULT_JSON_FILE,
};
use crate::domain::type_table::TypeTable;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{parse_type_labels, Validate};
use regex::Regex;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub load: LoadConfig,
    #[serde(default)]
    pub export: ExportConfig,
    /// Extra or replacement labels, keyed by type code.
    #[serde(default, deserialize_with = "deserialize_type_labels")]
    pub type_labels: BTreeMap<i64, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub endpoint: String,
    pub city_id: Option<i64>,
    pub timeout_seconds: Option<u64>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_API_ENDPOINT.to_string(),
            city_id: None,
            timeout_seconds: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub concurrent_requests: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            concurrent_requests: DEFAULT_CONCURRENT_REQUESTS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    pub output_path: String,
    pub csv_filename: String,
    pub json_filename: String,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            output_path: ".".to_string(),
            csv_filename: DEFAULT_CSV_FILE.to_string(),
            json_filename: DEFAULT_JSON_FILE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub detail_url_base: String,
    pub unknown_label: String,
    pub csv_unknown: UnknownPolicy,
    pub json_unknown: UnknownPolicy,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            detail_url_base: DEFAULT_DETAIL_URL_BASE.to_string(),
            unknown_label: DEFAULT_UNKNOWN_LABEL.to_string(),
            csv_unknown: UnknownPolicy::Sentinel,
            json_unknown: UnknownPolicy::Sentinel,
        }
    }
}

/// TOML keys are always strings; `[type_labels]` keys must parse as type codes.
fn deserialize_type_labels<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<i64, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, String>::deserialize(deserializer)?;
    parse_type_labels("type_labels", &raw).map_err(serde::de::Error::custom)
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| EtlError::ConfigError {
            message: format!("cannot read config file '{}': {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${API_ENDPOINT})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_provider(self)
    }
}

impl ConfigProvider for TomlConfig {
    fn api_endpoint(&self) -> &str {
        &self.source.endpoint
    }

    fn city_id(&self) -> Option<i64> {
        self.source.city_id
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn csv_file(&self) -> &str {
        &self.load.csv_filename
    }

    fn json_file(&self) -> &str {
        &self.load.json_filename
    }

    fn concurrent_requests(&self) -> usize {
        self.extract.concurrent_requests
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.source.timeout_seconds.map(Duration::from_secs)
    }

    fn type_table(&self) -> TypeTable {
        TypeTable::with_overrides(self.type_labels.clone())
    }

    fn export_options(&self) -> ExportOptions {
        ExportOptions {
            detail_url_base: self.export.detail_url_base.clone(),
            csv_unknown: self.export.csv_unknown.into_label(&self.export.unknown_label),
            json_unknown: self.export.json_unknown.into_label(&self.export.unknown_label),
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
