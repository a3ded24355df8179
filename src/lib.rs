pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{storage::LocalStorage, toml_config::TomlConfig};

pub use crate::core::{
    etl::EtlEngine, exporter::Exporter, fetcher::Fetcher, pipeline::MedicalCenterPipeline,
};
pub use domain::model::{ExportOptions, HealthCenterRecord, UnknownTypeLabel};
pub use domain::type_table::TypeTable;
pub use utils::error::{EtlError, Result};
