use crate::domain::model::{ExportBundle, ExportOptions, HealthCenterRecord};
use crate::domain::type_table::TypeTable;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub const DEFAULT_API_ENDPOINT: &str =
    "https://api.iranassistance.com/healthcenter/api/v1/HealthCenters";
pub const DEFAULT_CSV_FILE: &str = "medical-centers.csv";
pub const DEFAULT_JSON_FILE: &str = "docs/medical-centers.json";
pub const DEFAULT_CONCURRENT_REQUESTS: usize = 10;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    /// Writes `data` to `path`, creating missing parent directories.
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn city_id(&self) -> Option<i64>;
    fn output_path(&self) -> &str;
    fn csv_file(&self) -> &str;
    fn json_file(&self) -> &str;
    fn concurrent_requests(&self) -> usize;
    fn request_timeout(&self) -> Option<Duration>;
    fn type_table(&self) -> TypeTable;
    fn export_options(&self) -> ExportOptions;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<HealthCenterRecord>>;
    async fn transform(&self, data: Vec<HealthCenterRecord>) -> Result<ExportBundle>;
    /// Returns the paths that were written.
    async fn load(&self, bundle: ExportBundle) -> Result<Vec<String>>;
}
