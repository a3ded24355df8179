use crate::core::ConfigProvider;
use crate::domain::model::{FetchReport, HealthCenterRecord, PageFailure, PageOutcome, PageResponse};
use crate::utils::error::{EtlError, Result};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::time::Duration;

/// Paginated client for the HealthCenters listing.
///
/// Page 1 is requested alone to learn `pageCount`; pages `2..=pageCount` are
/// then fetched with at most `max_concurrency` requests in flight, all sharing
/// one connection pool. A failed page after the first one is logged and
/// contributes nothing; a failed first page aborts the run.
pub struct Fetcher {
    client: Client,
    endpoint: String,
    max_concurrency: usize,
}

impl Fetcher {
    pub fn new(
        endpoint: impl Into<String>,
        max_concurrency: usize,
        request_timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: endpoint.into(),
            max_concurrency: max_concurrency.max(1),
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(
            config.api_endpoint(),
            config.concurrent_requests(),
            config.request_timeout(),
        )
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub async fn fetch_all(&self, city_id: Option<i64>) -> Result<Vec<HealthCenterRecord>> {
        Ok(self.fetch_report(city_id).await?.records)
    }

    pub async fn fetch_report(&self, city_id: Option<i64>) -> Result<FetchReport> {
        let first = self.request_page(city_id, None).await?;
        let (row_count, page_count) = (first.row_count, first.page_count);
        tracing::info!("🔎 Found {} centers across {} pages", row_count, page_count);

        let first_records = first.into_records(1);
        if page_count <= 1 {
            return Ok(FetchReport::combine(first_records, Vec::new(), row_count, page_count));
        }

        tracing::debug!(
            "Fetching pages 2..={} with up to {} concurrent requests",
            page_count,
            self.max_concurrency
        );

        // buffered() 會依輸入順序產出結果，同時限制同時進行的請求數
        let outcomes: Vec<PageOutcome> = stream::iter(2..=page_count)
            .map(|page| self.fetch_page(city_id, page))
            .buffered(self.max_concurrency)
            .collect()
            .await;

        let report = FetchReport::combine(first_records, outcomes, row_count, page_count);
        if !report.failures.is_empty() {
            tracing::warn!(
                "⚠️ {} of {} pages failed and were skipped: {:?}",
                report.failures.len(),
                page_count,
                report.failed_pages()
            );
        }
        tracing::info!("📥 Fetched {} records", report.records.len());

        Ok(report)
    }

    async fn fetch_page(&self, city_id: Option<i64>, page: u32) -> PageOutcome {
        match self.request_page(city_id, Some(page)).await {
            Ok(body) => PageOutcome::Fetched {
                page,
                records: body.into_records(page),
            },
            Err(e) => {
                let status = match &e {
                    EtlError::HttpStatusError { status, .. } => Some(*status),
                    EtlError::ApiError(err) => err.status().map(|s| s.as_u16()),
                    _ => None,
                };
                match status {
                    Some(status) => {
                        tracing::error!("❌ Failed to fetch page {}: status {}", page, status)
                    }
                    None => tracing::error!("❌ Failed to fetch page {}: {}", page, e),
                }
                PageOutcome::Failed(PageFailure {
                    page,
                    status,
                    reason: e.to_string(),
                })
            }
        }
    }

    async fn request_page(&self, city_id: Option<i64>, page: Option<u32>) -> Result<PageResponse> {
        let mut query: Vec<(&str, String)> = Vec::with_capacity(2);
        if let Some(city_id) = city_id {
            query.push(("cityId", city_id.to_string()));
        }
        if let Some(page) = page {
            query.push(("pageNumber", page.to_string()));
        }

        tracing::debug!("Requesting {} with {:?}", self.endpoint, query);
        let response = self.client.get(&self.endpoint).query(&query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EtlError::HttpStatusError {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }

        Ok(response.json::<PageResponse>().await?)
    }
}
