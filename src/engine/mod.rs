// ==========================================
// 降水收益决策支持系统 - 引擎层
// ==========================================
// 职责: 预报 -> 收益 的核心转换
// 红线: 纯计算，不做任何 I/O
// ==========================================

pub mod demand;
pub mod error;
pub mod open_hours;
pub mod profit;

// 重导出核心类型
pub use demand::DemandModel;
pub use error::{EngineError, EngineResult};
pub use open_hours::{DayBoundaryDetector, OpenHoursFilter};
pub use profit::{ProfitEngine, ProfitModelConfig, ProfitSeries};
