// ==========================================
// 降水收益决策支持系统 - 核心库
// ==========================================
// 流水线: WMS 降水概率 -> 雨伞销售收益 -> 收益表 -> STAC 编目
// 系统定位: 决策支持（单一零售经验模型，非通用预测系统）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 值类型与交接载荷
pub mod domain;

// 引擎层 - 收益计算
pub mod engine;

// 抓取层 - WMS 数据
pub mod fetch;

// 报表层 - CSV / STAC
pub mod report;

// 配置层 - 系统配置
pub mod config;

// 日志系统
pub mod logging;

// API 层 - 流水线接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{BoundingBox, ForecastPayload, ForecastSample, OpenHoursWindow, ProfitPayload};

// 引擎
pub use engine::{DemandModel, ProfitEngine, ProfitModelConfig, ProfitSeries};

// 抓取
pub use fetch::{ForecastFetcher, HttpWmsClient, WmsConfig, WmsSource};

// 报表
pub use report::{CatalogPackager, StacSettings};

// 配置
pub use crate::config::ConfigManager;

// API
pub use api::{ApiError, ApiResult, PipelineApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "降水收益决策支持系统";
