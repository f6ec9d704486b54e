// ==========================================
// 降水收益决策支持系统 - 预报抓取编排
// ==========================================
// 流程:
// 1. GetCapabilities -> 图层 time 维度
// 2. 生成 UTC / 本地时刻序列
// 3. 逐时刻 GetFeatureInfo（顺序执行）-> 降水概率
// 4. 组装 ForecastPayload
// ==========================================

use crate::domain::forecast::ForecastPayload;
use crate::domain::types::BoundingBox;
use crate::fetch::capabilities::{extract_layer_time_dimension, parse_time_dimension};
use crate::fetch::error::{FetchError, FetchResult};
use crate::fetch::feature_info::parse_feature_info;
use crate::fetch::timeline::build_timeline;
use crate::fetch::wms_client::{FeatureInfoRequest, WmsConfig, WmsSource};
use tracing::{debug, info, instrument};

pub struct ForecastFetcher<S: WmsSource> {
    source: S,
    config: WmsConfig,
}

impl<S: WmsSource> ForecastFetcher<S> {
    pub fn new(source: S, config: WmsConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &WmsConfig {
        &self.config
    }

    /// 查询点 (x=经度, y=纬度) 的降水概率序列
    #[instrument(skip(self), fields(layer = %self.config.layer))]
    pub async fn fetch(&self, x: f64, y: f64) -> FetchResult<ForecastPayload> {
        let valid_x = x.is_finite() && (-180.0..=180.0).contains(&x);
        let valid_y = y.is_finite() && (-90.0..=90.0).contains(&y);
        if !valid_x || !valid_y {
            return Err(FetchError::InvalidCoordinate { x, y });
        }

        let bbox = BoundingBox::around(x, y, self.config.bbox_half_size);
        info!(bbox = %bbox, time_zone = self.config.time_zone_offset_hours, "开始抓取降水概率");

        // 1. 时间维度
        let capabilities = self.source.get_capabilities().await?;
        let raw_dimension = extract_layer_time_dimension(&capabilities, &self.config.layer)?;
        let dimension = parse_time_dimension(&raw_dimension)?;
        info!(
            start = %dimension.start,
            end = %dimension.end,
            interval = dimension.interval_hours,
            "预报时间维度"
        );

        // 2. 时刻序列
        let timeline = build_timeline(&dimension, self.config.time_zone_offset_hours)?;

        // 3. 逐时刻查询
        let mut pixel_value = Vec::with_capacity(timeline.len());
        for time in &timeline.utc {
            let request = FeatureInfoRequest {
                layer: self.config.layer.clone(),
                bbox,
                time: *time,
            };
            let text = self.source.get_feature_info(&request).await?;
            let value = parse_feature_info(&text, &request.time_param())?;
            debug!(time = %request.time_param(), value = value, "降水概率");
            pixel_value.push(value);
        }

        info!(count = pixel_value.len(), "降水概率抓取完成");

        Ok(ForecastPayload {
            local_time: timeline.local,
            pixel_value,
            interval: i64::from(dimension.interval_hours),
            layer: self.config.layer.clone(),
            bbox,
            start_time: dimension.start,
            end_time: dimension.end,
        })
    }
}
