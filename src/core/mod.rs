pub mod etl;
pub mod exporter;
pub mod fetcher;
pub mod pipeline;

pub use crate::domain::model::{ExportBundle, HealthCenterRecord};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
