// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 构造预报样本/载荷、内存 WMS 数据源、临时输出目录配置
// ==========================================

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use rain_forecast::config::{config_keys, ConfigManager};
use rain_forecast::domain::{BoundingBox, ForecastPayload, ForecastSample};
use rain_forecast::fetch::{FeatureInfoRequest, FetchError, FetchResult, WmsSource};
use rain_forecast::report::StacSettings;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const LAYER: &str = "REPS.DIAG.3_PRMM.ERGE5";

/// 2024-05-<day> <hour>:00:00
pub fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

/// 由 (日, 时, 概率) 列表构造样本
pub fn samples(points: &[(u32, u32, f64)]) -> Vec<ForecastSample> {
    points
        .iter()
        .map(|(day, hour, p)| ForecastSample::new(at(*day, *hour), *p))
        .collect()
}

/// 由 (日, 时, 概率) 列表构造预报载荷
pub fn forecast_payload(points: &[(u32, u32, f64)], interval: i64) -> ForecastPayload {
    ForecastPayload {
        local_time: points.iter().map(|(d, h, _)| at(*d, *h)).collect(),
        pixel_value: points.iter().map(|(_, _, p)| *p).collect(),
        interval,
        layer: LAYER.to_string(),
        bbox: BoundingBox::around(-123.116, 49.288, 0.25),
        start_time: at(13, 15),
        end_time: at(16, 15),
    }
}

/// 输出目录均位于 root 下的配置
pub fn config_in(root: &Path) -> ConfigManager {
    let mut config = ConfigManager::new();
    config.set(config_keys::PLOTS_DIR, root.join("plots").display().to_string());
    config.set(config_keys::DATA_DIR, root.join("data").display().to_string());
    config.set(config_keys::STAC_DIR, root.join("stac-items").display().to_string());
    config
}

pub fn stac_settings() -> StacSettings {
    StacSettings {
        bucket: "ws-bob".to_string(),
        workflow_id: "wf-test".to_string(),
        collection_id: Some("rain-collection".to_string()),
    }
}

// ==========================================
// 内存 WMS 数据源
// ==========================================
pub struct InMemoryWms {
    pub capabilities: String,
    /// 查询时刻 (ISO) -> 概率
    pub values: HashMap<String, f64>,
    pub requests: AtomicUsize,
}

impl InMemoryWms {
    pub fn new(time_dimension: &str, values: &[(&str, f64)]) -> Self {
        let capabilities = format!(
            r#"<WMS_Capabilities version="1.3.0"><Capability><Layer>
<Layer queryable="1"><Name>{}</Name>
<Dimension name="time" units="ISO8601">{}</Dimension>
</Layer></Layer></Capability></WMS_Capabilities>"#,
            LAYER, time_dimension
        );
        Self {
            capabilities,
            values: values.iter().map(|(t, v)| (t.to_string(), *v)).collect(),
            requests: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl WmsSource for InMemoryWms {
    async fn get_capabilities(&self) -> FetchResult<String> {
        Ok(self.capabilities.clone())
    }

    async fn get_feature_info(&self, request: &FeatureInfoRequest) -> FetchResult<String> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        match self.values.get(&request.time_param()) {
            Some(v) => Ok(format!(
                "Results for FeatureType '{}':\n--------------------------------------------\nvalue_0 = '{}'\n",
                request.layer, v
            )),
            None => Err(FetchError::HttpError(format!(
                "no data for {}",
                request.time_param()
            ))),
        }
    }
}
