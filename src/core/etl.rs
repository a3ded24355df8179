use crate::core::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Runs extract → transform → load and returns the written paths.
    pub async fn run(&self) -> Result<Vec<String>> {
        let started = Instant::now();
        tracing::info!("🚀 Starting medical centers export");

        let records = self.pipeline.extract().await?;
        tracing::info!("📥 Extracted {} records", records.len());

        let bundle = self.pipeline.transform(records).await?;
        tracing::info!(
            "🔄 Prepared {} CSV rows, {} with coordinates for JSON",
            bundle.csv_rows,
            bundle.json_rows
        );

        let written = self.pipeline.load(bundle).await?;
        for path in &written {
            tracing::info!("💾 Data saved to {}", path);
        }
        tracing::info!("⏱️ Finished in {:.2?}", started.elapsed());

        Ok(written)
    }
}
