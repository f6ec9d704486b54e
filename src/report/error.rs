// ==========================================
// 降水收益决策支持系统 - 报表/编目模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 报表与编目模块错误类型
#[derive(Error, Debug)]
pub enum ReportError {
    // ===== 输入数据错误 =====
    #[error("序列长度不一致: 字段 {field} 长度为 {actual}，期望 {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("营业时刻不在预报序列中 (open_hours 索引 {index}): {timestamp}")]
    UnknownOpenHour { index: usize, timestamp: String },

    // ===== 文件相关错误 =====
    #[error("文件写入失败: {0}")]
    FileWriteError(String),

    #[error("CSV 写入失败: {0}")]
    CsvWriteError(String),

    #[error("JSON 序列化失败: {0}")]
    JsonError(String),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ReportError {
    fn from(err: std::io::Error) -> Self {
        ReportError::FileWriteError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ReportError {
    fn from(err: csv::Error) -> Self {
        ReportError::CsvWriteError(err.to_string())
    }
}

// 实现 From<serde_json::Error>
impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        ReportError::JsonError(err.to_string())
    }
}

/// Result 类型别名
pub type ReportResult<T> = Result<T, ReportError>;
