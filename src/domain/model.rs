use crate::utils::error::EtlError;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

pub const DEFAULT_DETAIL_URL_BASE: &str = "https://iranassistance.com/medical-centers";
pub const DEFAULT_UNKNOWN_LABEL: &str = "Unknown";

/// One medical center as returned by the HealthCenters API.
///
/// Every raw field is kept in `fields` in the order the API sent it; `id` is
/// lifted out once so sorting does not have to re-parse it.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthCenterRecord {
    id: i64,
    fields: Map<String, Value>,
}

impl HealthCenterRecord {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn type_id(&self) -> Option<i64> {
        self.fields.get("typeId").and_then(Value::as_i64)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl TryFrom<Map<String, Value>> for HealthCenterRecord {
    type Error = EtlError;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        let id = match fields.get("id") {
            Some(value) => value.as_i64().ok_or_else(|| EtlError::ProcessingError {
                message: format!("record id is not an integer: {}", value),
            })?,
            None => {
                return Err(EtlError::ProcessingError {
                    message: "record has no id".to_string(),
                })
            }
        };
        Ok(Self { id, fields })
    }
}

impl Serialize for HealthCenterRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

/// Body of one `GET HealthCenters` response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse {
    #[serde(default)]
    pub result: Option<Vec<Value>>,
    #[serde(default)]
    pub row_count: u64,
    #[serde(default)]
    pub page_count: u32,
}

impl PageResponse {
    /// Converts the raw `result` array, dropping entries that cannot carry an id.
    pub fn into_records(self, page: u32) -> Vec<HealthCenterRecord> {
        self.result
            .unwrap_or_default()
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(fields) => match HealthCenterRecord::try_from(fields) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        tracing::warn!("⚠️ Skipping record on page {}: {}", page, e);
                        None
                    }
                },
                other => {
                    tracing::warn!("⚠️ Skipping non-object entry on page {}: {}", page, other);
                    None
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageFailure {
    pub page: u32,
    pub status: Option<u16>,
    pub reason: String,
}

/// Result of fetching a single page after the first one.
#[derive(Debug, Clone)]
pub enum PageOutcome {
    Fetched {
        page: u32,
        records: Vec<HealthCenterRecord>,
    },
    Failed(PageFailure),
}

impl PageOutcome {
    pub fn page(&self) -> u32 {
        match self {
            PageOutcome::Fetched { page, .. } => *page,
            PageOutcome::Failed(failure) => failure.page,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    pub records: Vec<HealthCenterRecord>,
    pub failures: Vec<PageFailure>,
    pub row_count: u64,
    pub page_count: u32,
}

impl FetchReport {
    /// Folds page outcomes onto page 1's records. Outcomes are merged in page
    /// order regardless of the order they are passed in.
    pub fn combine(
        first_page: Vec<HealthCenterRecord>,
        mut outcomes: Vec<PageOutcome>,
        row_count: u64,
        page_count: u32,
    ) -> Self {
        outcomes.sort_by_key(PageOutcome::page);

        let mut report = FetchReport {
            records: first_page,
            failures: Vec::new(),
            row_count,
            page_count,
        };
        for outcome in outcomes {
            match outcome {
                PageOutcome::Fetched { records, .. } => report.records.extend(records),
                PageOutcome::Failed(failure) => report.failures.push(failure),
            }
        }
        report
    }

    pub fn failed_pages(&self) -> Vec<u32> {
        self.failures.iter().map(|f| f.page).collect()
    }
}

/// What to write in `type_name` when a record's `typeId` is not in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnknownTypeLabel {
    Sentinel(String),
    /// Empty CSV cell / JSON `null`.
    Blank,
}

impl Default for UnknownTypeLabel {
    fn default() -> Self {
        UnknownTypeLabel::Sentinel(DEFAULT_UNKNOWN_LABEL.to_string())
    }
}

impl UnknownTypeLabel {
    pub fn resolve<'a>(&'a self, label: Option<&'a str>) -> Option<&'a str> {
        match (label, self) {
            (Some(label), _) => Some(label),
            (None, UnknownTypeLabel::Sentinel(sentinel)) => Some(sentinel.as_str()),
            (None, UnknownTypeLabel::Blank) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub detail_url_base: String,
    pub csv_unknown: UnknownTypeLabel,
    pub json_unknown: UnknownTypeLabel,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            detail_url_base: DEFAULT_DETAIL_URL_BASE.to_string(),
            csv_unknown: UnknownTypeLabel::default(),
            json_unknown: UnknownTypeLabel::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRecord {
    pub record: HealthCenterRecord,
    pub url: String,
    /// `None` when the type code is not in the table.
    pub type_name: Option<String>,
}

impl EnrichedRecord {
    pub fn id(&self) -> i64 {
        self.record.id()
    }
}

#[derive(Debug, Clone)]
pub struct ExportBundle {
    pub csv: Vec<u8>,
    pub json: Vec<u8>,
    pub csv_rows: usize,
    pub json_rows: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn record(id: i64) -> HealthCenterRecord {
        HealthCenterRecord::try_from(object(json!({ "id": id }))).unwrap()
    }

    #[test]
    fn test_record_requires_integer_id() {
        assert!(HealthCenterRecord::try_from(object(json!({"name": "x"}))).is_err());
        assert!(HealthCenterRecord::try_from(object(json!({"id": null}))).is_err());
        assert!(HealthCenterRecord::try_from(object(json!({"id": "7"}))).is_err());

        let record = HealthCenterRecord::try_from(object(json!({"name": "x", "id": 7, "typeId": 41})))
            .unwrap();
        assert_eq!(record.id(), 7);
        assert_eq!(record.type_id(), Some(41));
        // id stays where the API put it
        let keys: Vec<&String> = record.fields().keys().collect();
        assert_eq!(keys, vec!["name", "id", "typeId"]);
    }

    #[test]
    fn test_page_response_skips_bad_entries() {
        let page: PageResponse = serde_json::from_value(json!({
            "result": [{"id": 1}, {"name": "no id"}, 42, {"id": 2}],
            "rowCount": 4,
            "pageCount": 1
        }))
        .unwrap();
        assert_eq!(page.row_count, 4);
        let ids: Vec<i64> = page.into_records(1).iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_page_response_tolerates_null_result() {
        let page: PageResponse =
            serde_json::from_value(json!({"result": null, "rowCount": 0})).unwrap();
        assert_eq!(page.page_count, 0);
        assert!(page.into_records(1).is_empty());
    }

    #[test]
    fn test_combine_orders_pages_and_collects_failures() {
        let outcomes = vec![
            PageOutcome::Fetched {
                page: 4,
                records: vec![record(40)],
            },
            PageOutcome::Failed(PageFailure {
                page: 3,
                status: Some(500),
                reason: "HTTP 500".to_string(),
            }),
            PageOutcome::Fetched {
                page: 2,
                records: vec![record(20), record(21)],
            },
        ];

        let report = FetchReport::combine(vec![record(10)], outcomes, 5, 4);

        let ids: Vec<i64> = report.records.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec![10, 20, 21, 40]);
        assert_eq!(report.failed_pages(), vec![3]);
    }

    #[test]
    fn test_unknown_type_label_resolution() {
        let sentinel = UnknownTypeLabel::default();
        assert_eq!(sentinel.resolve(None), Some("Unknown"));
        assert_eq!(sentinel.resolve(Some("مطب")), Some("مطب"));
        assert_eq!(UnknownTypeLabel::Blank.resolve(None), None);
    }
}
