// ==========================================
// 降水收益决策支持系统 - 抓取层
// ==========================================
// 职责: 从 WMS 服务获取指定点位的降水概率时间序列
// 输出: ForecastPayload
// ==========================================

pub mod capabilities;
pub mod error;
pub mod feature_info;
pub mod fetcher;
pub mod timeline;
pub mod wms_client;

// 重导出核心类型
pub use capabilities::{extract_layer_time_dimension, parse_time_dimension, TimeDimension};
pub use error::{FetchError, FetchResult};
pub use feature_info::parse_feature_info;
pub use fetcher::ForecastFetcher;
pub use timeline::{build_timeline, ForecastTimeline};
pub use wms_client::{FeatureInfoRequest, HttpWmsClient, WmsConfig, WmsSource};
