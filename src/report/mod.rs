// ==========================================
// 降水收益决策支持系统 - 报表与编目层
// ==========================================
// 职责: 收益表 CSV 导出、STAC 编目元数据
// ==========================================

pub mod error;
pub mod stac;
pub mod table;

// 重导出核心类型
pub use error::{ReportError, ReportResult};
pub use stac::{CatalogPackager, StacBundle, StacPaths, StacSettings};
pub use table::{build_profit_table, export_profit_csv, write_profit_csv, ProfitRow};
