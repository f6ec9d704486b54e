// ==========================================
// 降水收益决策支持系统 - API层错误类型
// ==========================================
// 职责: 汇总各层错误，对外给出带原因的错误消息
// ==========================================

use crate::config::error::ConfigError;
use crate::engine::error::EngineError;
use crate::fetch::error::FetchError;
use crate::report::error::ReportError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入错误
    // ==========================================
    #[error("输入数据解析失败: {0}")]
    InvalidInput(String),

    // ==========================================
    // 各层错误
    // ==========================================
    #[error("收益计算失败: {0}")]
    Engine(#[from] EngineError),

    #[error("预报抓取失败: {0}")]
    Fetch(#[from] FetchError),

    #[error("报表/编目失败: {0}")]
    Report(#[from] ReportError),

    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("文件写入失败: {0}")]
    FileWriteError(String),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::FileWriteError(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
