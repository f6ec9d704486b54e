// ==========================================
// 降水收益决策支持系统 - WMS 客户端
// ==========================================
// 职责: GetCapabilities / GetFeatureInfo 两类请求
// 协议: WMS 1.3.0（EPSG:4326 轴序为 纬度,经度）/ 1.1.1（经度,纬度）
// ==========================================

use crate::domain::types::BoundingBox;
use crate::fetch::capabilities::ISO_UTC_FORMAT;
use crate::fetch::error::FetchResult;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

// ==========================================
// WmsConfig - WMS 查询配置
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct WmsConfig {
    /// 服务地址（不含查询参数）
    pub base_url: String,
    pub version: String,
    pub layer: String,
    pub timeout: Duration,
    /// 本地时区相对 UTC 的偏移（小时）
    pub time_zone_offset_hours: i64,
    /// 查询范围半边长（度）
    pub bbox_half_size: f64,
    /// 查询图像宽高（像素）
    pub image_size: u32,
}

impl WmsConfig {
    /// 查询像素: 图像中心
    pub fn query_pixel(&self) -> u32 {
        self.image_size / 2
    }

    pub fn is_v130(&self) -> bool {
        self.version.trim() == "1.3.0"
    }
}

impl Default for WmsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://geo.weather.gc.ca/geomet".to_string(),
            version: "1.3.0".to_string(),
            layer: "REPS.DIAG.3_PRMM.ERGE5".to_string(),
            timeout: Duration::from_secs(300),
            time_zone_offset_hours: -7,
            bbox_half_size: 0.25,
            image_size: 100,
        }
    }
}

/// 单次 GetFeatureInfo 查询
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureInfoRequest {
    pub layer: String,
    pub bbox: BoundingBox,
    /// 查询时刻（UTC）
    pub time: NaiveDateTime,
}

impl FeatureInfoRequest {
    pub fn time_param(&self) -> String {
        self.time.format(ISO_UTC_FORMAT).to_string()
    }
}

// ==========================================
// WmsSource Trait
// ==========================================
// 实现者: HttpWmsClient（真实服务）；测试中使用内存实现
#[async_trait]
pub trait WmsSource: Send + Sync {
    /// GetCapabilities 原始 XML
    async fn get_capabilities(&self) -> FetchResult<String>;

    /// GetFeatureInfo 原始文本
    async fn get_feature_info(&self, request: &FeatureInfoRequest) -> FetchResult<String>;
}

#[async_trait]
impl<T: WmsSource + ?Sized> WmsSource for &T {
    async fn get_capabilities(&self) -> FetchResult<String> {
        (**self).get_capabilities().await
    }

    async fn get_feature_info(&self, request: &FeatureInfoRequest) -> FetchResult<String> {
        (**self).get_feature_info(request).await
    }
}

// ==========================================
// HttpWmsClient - 基于 reqwest 的实现
// ==========================================
pub struct HttpWmsClient {
    client: Client,
    config: WmsConfig,
}

impl HttpWmsClient {
    pub fn new(config: WmsConfig) -> FetchResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &WmsConfig {
        &self.config
    }

    /// GetFeatureInfo 查询参数
    pub fn feature_info_params(&self, request: &FeatureInfoRequest) -> Vec<(&'static str, String)> {
        let size = self.config.image_size.to_string();
        let pixel = self.config.query_pixel().to_string();
        let bbox = &request.bbox;

        let mut params = vec![
            ("SERVICE", "WMS".to_string()),
            ("VERSION", self.config.version.clone()),
            ("REQUEST", "GetFeatureInfo".to_string()),
            ("LAYERS", request.layer.clone()),
            ("QUERY_LAYERS", request.layer.clone()),
            ("STYLES", String::new()),
            ("WIDTH", size.clone()),
            ("HEIGHT", size),
            ("FORMAT", "image/jpeg".to_string()),
            ("INFO_FORMAT", "text/plain".to_string()),
            ("FEATURE_COUNT", "1".to_string()),
            ("TIME", request.time_param()),
        ];

        if self.config.is_v130() {
            params.push(("CRS", "EPSG:4326".to_string()));
            params.push((
                "BBOX",
                format!(
                    "{},{},{},{}",
                    bbox.min_y(),
                    bbox.min_x(),
                    bbox.max_y(),
                    bbox.max_x()
                ),
            ));
            params.push(("I", pixel.clone()));
            params.push(("J", pixel));
        } else {
            params.push(("SRS", "EPSG:4326".to_string()));
            params.push((
                "BBOX",
                format!(
                    "{},{},{},{}",
                    bbox.min_x(),
                    bbox.min_y(),
                    bbox.max_x(),
                    bbox.max_y()
                ),
            ));
            params.push(("X", pixel.clone()));
            params.push(("Y", pixel));
        }

        params
    }

    async fn get_text(&self, params: &[(&str, String)]) -> FetchResult<String> {
        let response = self
            .client
            .get(&self.config.base_url)
            .query(params)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl WmsSource for HttpWmsClient {
    async fn get_capabilities(&self) -> FetchResult<String> {
        debug!(url = %self.config.base_url, "GetCapabilities 请求");
        let params = [
            ("SERVICE", "WMS".to_string()),
            ("VERSION", self.config.version.clone()),
            ("REQUEST", "GetCapabilities".to_string()),
            ("LAYER", self.config.layer.clone()),
        ];
        self.get_text(&params).await
    }

    async fn get_feature_info(&self, request: &FeatureInfoRequest) -> FetchResult<String> {
        debug!(layer = %request.layer, time = %request.time_param(), "GetFeatureInfo 请求");
        let params = self.feature_info_params(request);
        self.get_text(&params).await
    }
}
