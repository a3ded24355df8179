use anyhow::Result;
use clap::Parser;
use httpmock::prelude::*;
use medical_centers_etl::{CliConfig, EtlEngine, LocalStorage, MedicalCenterPipeline, TomlConfig};
use serde_json::{json, Value};
use tempfile::TempDir;

fn without_page_number(req: &HttpMockRequest) -> bool {
    !req.query_params
        .as_ref()
        .map(|params| params.iter().any(|(key, _)| key == "pageNumber"))
        .unwrap_or(false)
}

fn cli_config(endpoint: &str, output_path: &str) -> CliConfig {
    CliConfig::parse_from([
        "medical-centers",
        "--api-endpoint",
        endpoint,
        "--output-path",
        output_path,
        "--concurrent-requests",
        "2",
    ])
}

fn csv_ids(path: &std::path::Path) -> Result<Vec<i64>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut ids = Vec::new();
    for row in reader.records() {
        ids.push(row?[0].parse()?);
    }
    Ok(ids)
}

#[tokio::test]
async fn test_end_to_end_export_with_failed_page() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/HealthCenters").matches(without_page_number);
        then.status(200).json_body(json!({
            "result": [
                {"id": 9, "name": "درمانگاه شب", "typeId": 999999, "provinceName": "استان قم", "latitude": null, "longitude": null},
                {"id": 5, "name": "کلینیک مهر", "typeId": 41, "provinceName": "استان تهران", "latitude": 35.1, "longitude": 51.2}
            ],
            "rowCount": 6,
            "pageCount": 3
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/HealthCenters").query_param("pageNumber", "2");
        then.status(500);
    });
    server.mock(|when, then| {
        when.method(GET).path("/HealthCenters").query_param("pageNumber", "3");
        then.status(200).json_body(json!({
            "result": [
                {"id": 1, "name": "داروخانه مرکزی", "typeId": 1000105, "provinceName": "استان فارس", "latitude": 29.59, "longitude": 52.58}
            ],
            "rowCount": 6,
            "pageCount": 3
        }));
    });

    let config = cli_config(&server.url("/HealthCenters"), &output_path);
    let storage = LocalStorage::new(output_path.clone());
    let pipeline = MedicalCenterPipeline::new(storage, config)?;
    let written = EtlEngine::new(pipeline).run().await?;
    assert_eq!(written.len(), 2);

    let csv_path = temp_dir.path().join("medical-centers.csv");
    assert_eq!(csv_ids(&csv_path)?, vec![1, 5, 9]);

    let json_path = temp_dir.path().join("docs").join("medical-centers.json");
    let json: Vec<Value> = serde_json::from_slice(&std::fs::read(&json_path)?)?;
    let ids: Vec<i64> = json.iter().map(|r| r["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![1, 5]);
    assert_eq!(json[1]["URL"], "https://iranassistance.com/medical-centers/5");
    assert_eq!(json[1]["type_name"], "کلینیک");
    assert_eq!(json[0]["type_name"], "داروخانه");

    // the map front end reads these fields from every record
    for record in &json {
        for field in ["latitude", "longitude", "provinceName", "type_name", "name", "URL"] {
            assert!(!record[field].is_null(), "missing {}", field);
        }
    }

    Ok(())
}

#[tokio::test]
async fn test_rerun_produces_identical_files() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/HealthCenters");
        then.status(200).json_body(json!({
            "result": [
                {"id": 3, "name": "b", "typeId": 61, "latitude": 36.2, "longitude": 59.6},
                {"id": 2, "name": "a", "typeId": 1000143, "latitude": 0, "longitude": 0}
            ],
            "rowCount": 2,
            "pageCount": 1
        }));
    });

    let mut snapshots = Vec::new();
    for _ in 0..2 {
        let config = cli_config(&server.url("/HealthCenters"), &output_path);
        let pipeline = MedicalCenterPipeline::new(LocalStorage::new(output_path.clone()), config)?;
        EtlEngine::new(pipeline).run().await?;
        snapshots.push((
            std::fs::read(temp_dir.path().join("medical-centers.csv"))?,
            std::fs::read(temp_dir.path().join("docs/medical-centers.json"))?,
        ));
    }

    assert_eq!(snapshots[0], snapshots[1]);
    Ok(())
}

#[tokio::test]
async fn test_toml_config_drives_city_filter_and_labels() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().to_str().unwrap().replace('\\', "/");

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/HealthCenters").query_param("cityId", "301");
        then.status(200).json_body(json!({
            "result": [{"id": 4, "typeId": 77, "latitude": 35.7, "longitude": 51.4}],
            "rowCount": 1,
            "pageCount": 1
        }));
    });

    let config = TomlConfig::from_toml_str(&format!(
        r#"
[source]
endpoint = "{}"
city_id = 301

[load]
output_path = "{}"
json_filename = "site/centers.json"

[type_labels]
77 = "Lab"
"#,
        server.url("/HealthCenters"),
        output_path
    ))?;

    let pipeline = MedicalCenterPipeline::new(LocalStorage::new(output_path.clone()), config)?;
    EtlEngine::new(pipeline).run().await?;

    api_mock.assert();
    let json: Vec<Value> =
        serde_json::from_slice(&std::fs::read(temp_dir.path().join("site/centers.json"))?)?;
    assert_eq!(json[0]["type_name"], "Lab");
    Ok(())
}

#[tokio::test]
async fn test_first_page_failure_writes_nothing() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/HealthCenters");
        then.status(502);
    });

    let config = cli_config(&server.url("/HealthCenters"), &output_path);
    let pipeline = MedicalCenterPipeline::new(LocalStorage::new(output_path.clone()), config)?;
    let result = EtlEngine::new(pipeline).run().await;

    assert!(result.is_err());
    assert!(!temp_dir.path().join("medical-centers.csv").exists());
    Ok(())
}
