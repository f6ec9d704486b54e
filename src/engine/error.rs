// ==========================================
// 降水收益决策支持系统 - 收益引擎错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 错误信息必须指明出错字段与索引，不做静默修正
// ==========================================

use chrono::NaiveDateTime;
use thiserror::Error;

/// 收益引擎错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    // ===== 输入序列错误 =====
    #[error("序列长度不一致: 字段 {field} 长度为 {actual}，期望 {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("时间戳非严格递增 (索引 {index}): {current} 不晚于前一时刻 {previous}")]
    NonMonotonicTimestamp {
        index: usize,
        previous: NaiveDateTime,
        current: NaiveDateTime,
    },

    #[error("降水概率非有限数值 (索引 {index}): {value}")]
    NonFiniteProbability { index: usize, value: f64 },

    #[error("降水概率超出 0~100 范围 (索引 {index}): {value}")]
    ProbabilityOutOfRange { index: usize, value: f64 },

    #[error("累计销量溢出 (索引 {index})")]
    UnitsOverflow { index: usize },

    #[error("预报间隔无效: {0}（必须为正整数小时）")]
    InvalidInterval(i64),

    // ===== 模型参数错误 =====
    #[error("需求模型参数无效: {0}")]
    InvalidModel(String),
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
