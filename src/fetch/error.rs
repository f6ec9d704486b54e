// ==========================================
// 降水收益决策支持系统 - 抓取模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 抓取模块错误类型
#[derive(Error, Debug)]
pub enum FetchError {
    // ===== 网络相关错误 =====
    #[error("WMS 请求失败: {0}")]
    HttpError(String),

    // ===== 元数据解析错误 =====
    #[error("图层不存在于 GetCapabilities 响应中: {0}")]
    LayerNotFound(String),

    #[error("图层 {0} 缺少 time 维度")]
    TimeDimensionMissing(String),

    #[error("time 维度格式错误 ('{value}'): {message}")]
    TimeDimensionFormat { value: String, message: String },

    // ===== 查询结果错误 =====
    #[error("GetFeatureInfo 响应中未找到 value_0 (时刻 {time}): {excerpt}")]
    FeatureValueMissing { time: String, excerpt: String },

    // ===== 参数错误 =====
    #[error("坐标无效: x={x}, y={y}")]
    InvalidCoordinate { x: f64, y: f64 },

    #[error("时间序列参数无效: {0}")]
    InvalidTimeline(String),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),
}

// 实现 From<reqwest::Error>
impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::HttpError(err.to_string())
    }
}

// 实现 From<regex::Error>
impl From<regex::Error> for FetchError {
    fn from(err: regex::Error) -> Self {
        FetchError::InternalError(err.to_string())
    }
}

/// Result 类型别名
pub type FetchResult<T> = Result<T, FetchError>;
