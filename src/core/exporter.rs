use crate::domain::model::{EnrichedRecord, ExportBundle, ExportOptions, HealthCenterRecord, UnknownTypeLabel};
use crate::domain::type_table::TypeTable;
use crate::utils::error::Result;
use serde_json::{Map, Value};
use std::collections::HashSet;

pub const URL_COLUMN: &str = "URL";
pub const TYPE_NAME_COLUMN: &str = "type_name";

/// Turns fetched records into the CSV table and the map-ready JSON array.
pub struct Exporter {
    types: TypeTable,
    options: ExportOptions,
}

impl Exporter {
    pub fn new(types: TypeTable, options: ExportOptions) -> Self {
        Self { types, options }
    }

    pub fn detail_url(&self, id: i64) -> String {
        format!("{}/{}", self.options.detail_url_base.trim_end_matches('/'), id)
    }

    /// Attaches `URL` and `type_name`, then sorts by id (stable).
    pub fn enrich(&self, records: Vec<HealthCenterRecord>) -> Vec<EnrichedRecord> {
        let mut enriched: Vec<EnrichedRecord> = records
            .into_iter()
            .map(|record| {
                let type_name = record
                    .type_id()
                    .and_then(|code| self.types.label(code))
                    .map(str::to_string);
                if type_name.is_none() {
                    tracing::debug!(
                        "Record {} has unmapped typeId {:?}",
                        record.id(),
                        record.get("typeId")
                    );
                }
                EnrichedRecord {
                    url: self.detail_url(record.id()),
                    type_name,
                    record,
                }
            })
            .collect();
        enriched.sort_by_key(EnrichedRecord::id);
        enriched
    }

    pub fn export(&self, records: Vec<HealthCenterRecord>) -> Result<ExportBundle> {
        let enriched = self.enrich(records);
        let columns = columns(&enriched);

        let csv = self.render_csv(&enriched, &columns)?;
        let (json, json_rows) = self.render_json(&enriched, &columns)?;

        tracing::debug!(
            "Rendered {} CSV rows and {} JSON records over {} columns",
            enriched.len(),
            json_rows,
            columns.len()
        );

        Ok(ExportBundle {
            csv,
            json,
            csv_rows: enriched.len(),
            json_rows,
        })
    }

    pub fn render_csv(&self, records: &[EnrichedRecord], columns: &[String]) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(columns)?;

        for record in records {
            let row = output_row(record, columns, &self.options.csv_unknown);
            writer.write_record(columns.iter().map(|column| csv_cell(row.get(column))))?;
        }

        writer.into_inner().map_err(|e| e.into_error().into())
    }

    /// Coordinate-complete records only. Returns the bytes and the row count.
    pub fn render_json(
        &self,
        records: &[EnrichedRecord],
        columns: &[String],
    ) -> Result<(Vec<u8>, usize)> {
        let rows: Vec<Value> = records
            .iter()
            .filter(|record| has_coordinates(&record.record))
            .map(|record| {
                let row = output_row(record, columns, &self.options.json_unknown);
                let object: Map<String, Value> = columns
                    .iter()
                    .map(|column| (column.clone(), row.get(column).cloned().unwrap_or(Value::Null)))
                    .collect();
                Value::Object(object)
            })
            .collect();

        let count = rows.len();
        Ok((serde_json::to_vec(&rows)?, count))
    }
}

/// Union of raw keys in first-seen order, then `URL` and `type_name`.
pub fn columns(records: &[EnrichedRecord]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut columns: Vec<String> = Vec::new();
    for record in records {
        for key in record.record.fields().keys() {
            if key != URL_COLUMN && key != TYPE_NAME_COLUMN && seen.insert(key.as_str()) {
                columns.push(key.clone());
            }
        }
    }

    columns.push(URL_COLUMN.to_string());
    columns.push(TYPE_NAME_COLUMN.to_string());
    columns
}

/// Both `latitude` and `longitude` present and truthy.
pub fn has_coordinates(record: &HealthCenterRecord) -> bool {
    record.get("latitude").is_some_and(is_truthy) && record.get("longitude").is_some_and(is_truthy)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn output_row(record: &EnrichedRecord, columns: &[String], unknown: &UnknownTypeLabel) -> Map<String, Value> {
    let mut row = Map::with_capacity(columns.len());
    for (key, value) in record.record.fields() {
        row.insert(key.clone(), value.clone());
    }
    row.insert(URL_COLUMN.to_string(), Value::String(record.url.clone()));
    let type_name = unknown
        .resolve(record.type_name.as_deref())
        .map(|label| Value::String(label.to_string()))
        .unwrap_or(Value::Null);
    row.insert(TYPE_NAME_COLUMN.to_string(), type_name);
    row
}

fn csv_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
