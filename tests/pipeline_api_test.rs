// ==========================================
// PipelineApi 端到端测试
// ==========================================
// 流程: fetch(内存 WMS) -> predict -> table -> stac
// ==========================================

mod test_helpers;

use rain_forecast::api::{ApiError, PipelineApi, VALUES_JSON_FILE};
use rain_forecast::config::{config_keys, ConfigError};
use rain_forecast::domain::ProfitPayload;
use rain_forecast::engine::EngineError;
use std::sync::atomic::Ordering;
use tempfile::tempdir;
use test_helpers::{at, config_in, forecast_payload, stac_settings, InMemoryWms, LAYER};

const UTF8_BOM: &str = "\u{feff}";

fn sample_wms() -> InMemoryWms {
    // UTC 15:00 起每 3 小时，本地时间 (UTC-7) 为 08:00 / 11:00 / 14:00 / 17:00 / 20:00
    InMemoryWms::new(
        "2024-05-13T15:00:00Z/2024-05-14T03:00:00Z/PT3H",
        &[
            ("2024-05-13T15:00:00Z", 80.0),
            ("2024-05-13T18:00:00Z", 20.0),
            ("2024-05-13T21:00:00Z", 40.0),
            ("2024-05-14T00:00:00Z", 65.0),
            ("2024-05-14T03:00:00Z", 100.0),
        ],
    )
}

#[tokio::test]
async fn test_fetch_builds_forecast_payload() {
    let dir = tempdir().unwrap();
    let api = PipelineApi::new(config_in(dir.path())).unwrap();
    let wms = sample_wms();

    let payload = api.fetch(wms, -123.116, 49.288).await.unwrap();

    assert_eq!(payload.interval, 3);
    assert_eq!(payload.layer, LAYER);
    assert_eq!(payload.local_time.first(), Some(&at(13, 8)));
    assert_eq!(payload.local_time.last(), Some(&at(13, 20)));
    assert_eq!(payload.pixel_value, vec![80.0, 20.0, 40.0, 65.0, 100.0]);
    assert_eq!(payload.start_time, at(13, 15));
    assert!((payload.bbox.min_x() - (-123.366)).abs() < 1e-9);

    let written = std::fs::read_to_string(dir.path().join("data").join(VALUES_JSON_FILE)).unwrap();
    let json: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(json["local_time"][0], "2024-05-13 08:00:00");
    assert_eq!(json["start_time"], "2024-05-13 15:00:00");
}

#[tokio::test]
async fn test_fetch_issues_one_request_per_step() {
    let dir = tempdir().unwrap();
    let api = PipelineApi::new(config_in(dir.path())).unwrap();
    let wms = sample_wms();
    let payload = api.fetch(&wms, -123.116, 49.288).await.unwrap();
    assert_eq!(wms.requests.load(Ordering::SeqCst), payload.local_time.len());
}

#[tokio::test]
async fn test_fetch_rejects_invalid_coordinate() {
    let dir = tempdir().unwrap();
    let api = PipelineApi::new(config_in(dir.path())).unwrap();
    let err = api.fetch(sample_wms(), 200.0, 49.0).await.unwrap_err();
    assert!(matches!(err, ApiError::Fetch(_)));
}

#[test]
fn test_predict_from_json_string() {
    let dir = tempdir().unwrap();
    let api = PipelineApi::new(config_in(dir.path())).unwrap();
    let input = serde_json::to_string(&forecast_payload(
        &[(13, 9, 20.0), (13, 12, 40.0), (13, 15, 80.0), (13, 18, 10.0)],
        3,
    ))
    .unwrap();

    let profit = api.predict(&input).unwrap();
    assert_eq!(profit.cumulative_profit, vec![0.0, 390.0, 1110.0, 1110.0]);
    assert_eq!(profit.open_hours, vec![at(13, 12), at(13, 15), at(13, 18)]);

    let written = api.read_values_json().unwrap();
    let json: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(json["open_hours"][0], "2024-05-13 12:00:00");
    assert_eq!(json["cumulative_profit"][2], 1110.0);
    assert!(json.get("interval").is_none());
}

#[test]
fn test_predict_rejects_missing_key() {
    let dir = tempdir().unwrap();
    let api = PipelineApi::new(config_in(dir.path())).unwrap();
    let err = api
        .predict(r#"{"local_time": [], "interval": 3, "layer": "L", "bbox": [0,0,1,1], "start_time": "2024-05-13 15:00:00", "end_time": "2024-05-13 15:00:00"}"#)
        .unwrap_err();

    match err {
        ApiError::InvalidInput(msg) => assert!(msg.contains("pixel_value")),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(!dir.path().join("data").join(VALUES_JSON_FILE).exists());
}

#[test]
fn test_predict_rejects_mismatched_lengths_without_output() {
    let dir = tempdir().unwrap();
    let api = PipelineApi::new(config_in(dir.path())).unwrap();
    let mut payload = forecast_payload(&[(13, 12, 40.0), (13, 15, 80.0)], 3);
    payload.pixel_value.push(50.0);

    let err = api
        .predict(&serde_json::to_string(&payload).unwrap())
        .unwrap_err();
    assert!(matches!(err, ApiError::Engine(_)));
    assert!(!dir.path().join("data").join(VALUES_JSON_FILE).exists());
}

#[test]
fn test_predict_rejects_out_of_range_probability() {
    let dir = tempdir().unwrap();
    let api = PipelineApi::new(config_in(dir.path())).unwrap();
    let input = serde_json::to_string(&forecast_payload(&[(13, 12, 1e300)], 3)).unwrap();

    let err = api.predict(&input).unwrap_err();
    assert!(matches!(
        err,
        ApiError::Engine(EngineError::ProbabilityOutOfRange { index: 0, .. })
    ));
    assert!(!dir.path().join("data").join(VALUES_JSON_FILE).exists());
}

#[test]
fn test_predict_rejects_negative_base_stock() {
    let dir = tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.set(config_keys::BASE_STOCK, "-5");
    let api = PipelineApi::new(config).unwrap();
    let input = serde_json::to_string(&forecast_payload(&[(13, 18, 10.0), (14, 10, 10.0)], 3))
        .unwrap();

    let err = api.predict(&input).unwrap_err();
    assert!(matches!(
        err,
        ApiError::Config(ConfigError::ConfigValueError { ref key, .. }) if key == "base_stock"
    ));
    assert!(!dir.path().join("data").join(VALUES_JSON_FILE).exists());
}

#[test]
fn test_tabulate_writes_open_hours_rows() {
    let dir = tempdir().unwrap();
    let api = PipelineApi::new(config_in(dir.path())).unwrap();
    let profit = api
        .predict_payload(&forecast_payload(
            &[(13, 6, 90.0), (13, 12, 40.0), (13, 15, 80.0), (13, 21, 10.0)],
            3,
        ))
        .unwrap();

    let path = api.tabulate(&serde_json::to_string(&profit).unwrap()).unwrap();
    assert_eq!(path, dir.path().join("plots").join("profit.csv"));

    let text = std::fs::read_to_string(&path).unwrap();
    let text = text.strip_prefix(UTF8_BOM).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1], "2024-05-13 12:00:00;40.0;390.0");
    assert_eq!(lines[2], "2024-05-13 15:00:00;80.0;1110.0");
}

#[test]
fn test_package_catalog_writes_three_files() {
    let dir = tempdir().unwrap();
    let api = PipelineApi::new(config_in(dir.path())).unwrap();
    let profit: ProfitPayload = api
        .predict_payload(&forecast_payload(&[(13, 12, 40.0)], 3))
        .unwrap();

    let paths = api
        .package_catalog(&serde_json::to_string(&profit).unwrap(), stac_settings())
        .unwrap();

    assert!(paths.catalog.exists());
    assert!(paths.collection.exists());
    assert!(paths.item.exists());

    let item: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&paths.item).unwrap()).unwrap();
    let item_id = item["id"].as_str().unwrap();
    assert!(item_id.starts_with(&format!("{}-", LAYER)));
    assert_eq!(
        paths.item,
        dir.path()
            .join("stac-items")
            .join(item_id)
            .join(format!("{}.json", item_id))
    );
    assert_eq!(item["collection"], "rain-collection");
    assert_eq!(item["geometry"]["type"], "Point");
    assert_eq!(
        item["assets"]["probability_of_rain"]["href"],
        "s3://ws-bob/processing-results/wf-test/probability_of_rain.png"
    );

    let catalog: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&paths.catalog).unwrap()).unwrap();
    assert_eq!(catalog["id"], "catalog");
    assert!(catalog["links"]
        .as_array()
        .unwrap()
        .iter()
        .any(|l| l["rel"] == "child"));
}

#[tokio::test]
async fn test_run_all_chains_every_stage() {
    let dir = tempdir().unwrap();
    let api = PipelineApi::new(config_in(dir.path())).unwrap();

    let summary = api
        .run_all(sample_wms(), -123.116, 49.288, stac_settings())
        .await
        .unwrap();

    // 本地 08:00 闭店；11:00 首个营业样本 3 + 0（20%）；14:00 40% -> 39；
    // 17:00 65% -> 60；20:00 100% -> 90
    assert_eq!(
        summary.profit.cumulative_profit,
        vec![0.0, 30.0, 420.0, 1020.0, 1920.0]
    );
    assert_eq!(summary.profit.open_hours.len(), 4);
    assert!(summary.table_path.exists());
    assert!(summary.stac_paths.collection.exists());

    // values.json 为最后一次写出的收益载荷
    let written: ProfitPayload = serde_json::from_str(&api.read_values_json().unwrap()).unwrap();
    assert_eq!(written, summary.profit);
}
