// ==========================================
// 降水收益决策支持系统 - 领域层
// ==========================================
// 职责: 值类型与阶段交接载荷
// ==========================================

pub mod forecast;
pub mod types;

// 重导出
pub use forecast::{
    format_local_time, local_time_format, parse_local_time, ForecastPayload, ForecastSample,
    ProfitPayload, LOCAL_TIME_FORMAT,
};
pub use types::{BoundingBox, OpenHoursWindow};
