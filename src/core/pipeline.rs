use crate::core::exporter::Exporter;
use crate::core::fetcher::Fetcher;
use crate::core::{ConfigProvider, ExportBundle, HealthCenterRecord, Pipeline, Storage};
use crate::utils::error::Result;
use std::path::Path;

pub struct MedicalCenterPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    fetcher: Fetcher,
    exporter: Exporter,
}

impl<S: Storage, C: ConfigProvider> MedicalCenterPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Result<Self> {
        let fetcher = Fetcher::from_config(&config)?;
        let exporter = Exporter::new(config.type_table(), config.export_options());
        Ok(Self {
            storage,
            config,
            fetcher,
            exporter,
        })
    }

    fn output_location(&self, file: &str) -> String {
        Path::new(self.config.output_path())
            .join(file)
            .display()
            .to_string()
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for MedicalCenterPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<HealthCenterRecord>> {
        if let Some(city_id) = self.config.city_id() {
            tracing::info!("Filtering by city {}", city_id);
        }
        self.fetcher.fetch_all(self.config.city_id()).await
    }

    async fn transform(&self, data: Vec<HealthCenterRecord>) -> Result<ExportBundle> {
        self.exporter.export(data)
    }

    async fn load(&self, bundle: ExportBundle) -> Result<Vec<String>> {
        let csv_file = self.config.csv_file();
        let json_file = self.config.json_file();

        tracing::debug!("Writing {} bytes to {}", bundle.csv.len(), csv_file);
        self.storage.write_file(csv_file, &bundle.csv).await?;

        tracing::debug!("Writing {} bytes to {}", bundle.json.len(), json_file);
        self.storage.write_file(json_file, &bundle.json).await?;

        Ok(vec![
            self.output_location(csv_file),
            self.output_location(json_file),
        ])
    }
}
