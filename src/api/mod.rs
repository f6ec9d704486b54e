// ==========================================
// 降水收益决策支持系统 - API 层
// ==========================================
// 职责: 按阶段组织流水线，供命令行调用
// ==========================================

pub mod error;
pub mod pipeline_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use pipeline_api::{read_input_file, PipelineApi, PipelineSummary, VALUES_JSON_FILE};
