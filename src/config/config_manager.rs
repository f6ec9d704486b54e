// ==========================================
// 降水收益决策支持系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 分层（后者覆盖前者）:
//   1. 内置默认值（config_keys 旁注）
//   2. 配置文件（按扩展名识别 JSON / TOML / YAML）或内联 JSON
//   3. 环境变量 RAIN_<KEY>，如 RAIN_BASE_STOCK=5
//   4. 程序内覆写 set()
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::domain::types::OpenHoursWindow;
use crate::engine::demand::DemandModel;
use crate::engine::profit::ProfitModelConfig;
use crate::fetch::wms_client::WmsConfig;
use ::config::builder::DefaultState;
use ::config::{Config, ConfigBuilder, Environment, File, FileFormat};
use chrono::NaiveTime;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// 环境变量前缀
pub const ENV_PREFIX: &str = "RAIN";

/// 营业时刻格式
const TIME_FORMAT: &str = "%H:%M:%S";

// ==========================================
// OutputDirs - 输出目录
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDirs {
    /// 图表与收益表
    pub plots_dir: PathBuf,
    /// 阶段交接 JSON
    pub data_dir: PathBuf,
    /// STAC 编目文件
    pub stac_dir: PathBuf,
}

impl OutputDirs {
    /// 以 root 为根目录的默认布局
    pub fn under(root: &Path) -> Self {
        Self {
            plots_dir: root.join("plots"),
            data_dir: root.join("data"),
            stac_dir: root.join("stac-items"),
        }
    }

    /// 创建全部输出目录（幂等）
    pub fn ensure_created(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.plots_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(&self.stac_dir)?;
        Ok(())
    }
}

impl Default for OutputDirs {
    fn default() -> Self {
        Self::under(Path::new("."))
    }
}

// ==========================================
// Settings - 合并后的扁平配置
// ==========================================
// 字段名与 config_keys 一一对应
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    pub base_stock: i64,
    pub unit_profit: f64,
    pub demand_x1: f64,
    pub demand_y1: i64,
    pub demand_x2: f64,
    pub demand_y2: i64,
    pub opening_time: String,
    pub closing_time: String,
    pub wms_base_url: String,
    pub wms_version: String,
    pub wms_layer: String,
    pub wms_timeout_secs: u64,
    pub wms_image_size: u32,
    pub time_zone_offset_hours: i64,
    pub bbox_half_size: f64,
    pub plots_dir: PathBuf,
    pub data_dir: PathBuf,
    pub stac_dir: PathBuf,
}

/// 环境变量层
#[derive(Debug, Clone, Default)]
enum EnvLayer {
    #[default]
    Disabled,
    /// 读取进程环境
    Process,
    /// 指定变量表
    Vars(::config::Map<String, String>),
}

fn value_error(key: &str, value: impl Display, message: impl Into<String>) -> ConfigError {
    ConfigError::ConfigValueError {
        key: key.to_string(),
        value: value.to_string(),
        message: message.into(),
    }
}

fn parse_time(key: &str, raw: &str) -> ConfigResult<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), TIME_FORMAT)
        .map_err(|e| value_error(key, raw, format!("期望 HH:MM:SS: {}", e)))
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    file: Option<PathBuf>,
    inline_json: Option<String>,
    env: EnvLayer,
    overrides: BTreeMap<String, String>,
}

impl ConfigManager {
    /// 创建配置（全部使用默认值，不读取环境变量）
    pub fn new() -> Self {
        Self::default()
    }

    /// 命令行入口使用: 可选配置文件 + 进程环境变量
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let manager = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::new(),
        }
        .with_process_env();
        manager.settings()?;
        Ok(manager)
    }

    /// 从配置文件加载（格式按扩展名识别）
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        if !path.is_file() {
            return Err(ConfigError::FileReadError(format!(
                "配置文件不存在: {}",
                path.display()
            )));
        }
        let manager = Self {
            file: Some(path.to_path_buf()),
            ..Self::default()
        };
        manager.settings()?;
        Ok(manager)
    }

    /// 从 JSON 字符串加载
    pub fn from_json_str(raw: &str) -> ConfigResult<Self> {
        let manager = Self {
            inline_json: Some(raw.to_string()),
            ..Self::default()
        };
        manager.settings()?;
        Ok(manager)
    }

    /// 叠加进程环境变量（RAIN_ 前缀）
    pub fn with_process_env(mut self) -> Self {
        self.env = EnvLayer::Process;
        self
    }

    /// 叠加指定的环境变量表（RAIN_ 前缀）
    pub fn with_env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = EnvLayer::Vars(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// 覆写单个配置（优先级最高）
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.overrides.insert(key.to_string(), value.into());
    }

    fn defaults() -> ConfigResult<ConfigBuilder<DefaultState>> {
        let profit = ProfitModelConfig::default();
        let ((x1, y1), (x2, y2)) = profit.demand.calibration_points();
        let wms = WmsConfig::default();
        let dirs = OutputDirs::default();

        Ok(Config::builder()
            .set_default(config_keys::BASE_STOCK, profit.base_stock)?
            .set_default(config_keys::UNIT_PROFIT, profit.unit_profit)?
            .set_default(config_keys::DEMAND_X1, x1)?
            .set_default(config_keys::DEMAND_Y1, y1)?
            .set_default(config_keys::DEMAND_X2, x2)?
            .set_default(config_keys::DEMAND_Y2, y2)?
            .set_default(
                config_keys::OPENING_TIME,
                profit.window.opening.format(TIME_FORMAT).to_string(),
            )?
            .set_default(
                config_keys::CLOSING_TIME,
                profit.window.closing.format(TIME_FORMAT).to_string(),
            )?
            .set_default(config_keys::WMS_BASE_URL, wms.base_url)?
            .set_default(config_keys::WMS_VERSION, wms.version)?
            .set_default(config_keys::WMS_LAYER, wms.layer)?
            .set_default(
                config_keys::WMS_TIMEOUT_SECS,
                i64::try_from(wms.timeout.as_secs()).unwrap_or(i64::MAX),
            )?
            .set_default(config_keys::WMS_IMAGE_SIZE, i64::from(wms.image_size))?
            .set_default(config_keys::TIME_ZONE_OFFSET_HOURS, wms.time_zone_offset_hours)?
            .set_default(config_keys::BBOX_HALF_SIZE, wms.bbox_half_size)?
            .set_default(config_keys::PLOTS_DIR, dirs.plots_dir.display().to_string())?
            .set_default(config_keys::DATA_DIR, dirs.data_dir.display().to_string())?
            .set_default(config_keys::STAC_DIR, dirs.stac_dir.display().to_string())?)
    }

    fn build(&self) -> ConfigResult<Config> {
        let mut builder = Self::defaults()?;

        if let Some(path) = &self.file {
            builder = builder.add_source(File::from(path.as_path()).required(true));
        }
        if let Some(raw) = &self.inline_json {
            builder = builder.add_source(File::from_str(raw, FileFormat::Json));
        }
        match &self.env {
            EnvLayer::Disabled => {}
            EnvLayer::Process => {
                builder = builder.add_source(Environment::with_prefix(ENV_PREFIX));
            }
            EnvLayer::Vars(vars) => {
                builder = builder
                    .add_source(Environment::with_prefix(ENV_PREFIX).source(Some(vars.clone())));
            }
        }
        for (key, value) in &self.overrides {
            builder = builder.set_override(key.as_str(), value.as_str())?;
        }

        Ok(builder.build()?)
    }

    /// 合并后的配置
    pub fn settings(&self) -> ConfigResult<Settings> {
        let settings: Settings = self.build()?.try_deserialize()?;
        debug!(file = ?self.file, overrides = self.overrides.len(), "配置已合并");
        Ok(settings)
    }

    /// 读取配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Option<String> {
        self.build().ok()?.get_string(key).ok()
    }

    // ==========================================
    // 类型化配置视图
    // ==========================================

    /// 收益模型参数
    pub fn profit_model_config(&self) -> ConfigResult<ProfitModelConfig> {
        let s = self.settings()?;

        let demand = DemandModel::new(s.demand_x1, s.demand_y1, s.demand_x2, s.demand_y2)
            .map_err(|e| {
                value_error(
                    config_keys::DEMAND_X2,
                    format!(
                        "({}, {}) - ({}, {})",
                        s.demand_x1, s.demand_y1, s.demand_x2, s.demand_y2
                    ),
                    e.to_string(),
                )
            })?;

        let opening = parse_time(config_keys::OPENING_TIME, &s.opening_time)?;
        let closing = parse_time(config_keys::CLOSING_TIME, &s.closing_time)?;
        if opening >= closing {
            return Err(value_error(
                config_keys::CLOSING_TIME,
                closing,
                format!("闭店时刻必须晚于开门时刻 {}", opening),
            ));
        }

        if !s.unit_profit.is_finite() || s.unit_profit < 0.0 {
            return Err(value_error(
                config_keys::UNIT_PROFIT,
                s.unit_profit,
                "必须为非负有限数值",
            ));
        }
        if s.base_stock < 0 {
            return Err(value_error(
                config_keys::BASE_STOCK,
                s.base_stock,
                "每日基础销量不能为负",
            ));
        }

        Ok(ProfitModelConfig {
            base_stock: s.base_stock,
            unit_profit: s.unit_profit,
            demand,
            window: OpenHoursWindow::new(opening, closing),
        })
    }

    /// WMS 查询参数
    pub fn wms_config(&self) -> ConfigResult<WmsConfig> {
        let s = self.settings()?;

        if !s.bbox_half_size.is_finite() || s.bbox_half_size <= 0.0 {
            return Err(value_error(
                config_keys::BBOX_HALF_SIZE,
                s.bbox_half_size,
                "必须为正的有限数值",
            ));
        }

        Ok(WmsConfig {
            base_url: s.wms_base_url,
            version: s.wms_version,
            layer: s.wms_layer,
            timeout: Duration::from_secs(s.wms_timeout_secs),
            time_zone_offset_hours: s.time_zone_offset_hours,
            bbox_half_size: s.bbox_half_size,
            image_size: s.wms_image_size,
        })
    }

    /// 输出目录
    pub fn output_dirs(&self) -> ConfigResult<OutputDirs> {
        let s = self.settings()?;
        Ok(OutputDirs {
            plots_dir: s.plots_dir,
            data_dir: s.data_dir,
            stac_dir: s.stac_dir,
        })
    }

    /// 获取生效配置的快照（JSON格式，键有序）
    ///
    /// # 用途
    /// - 流水线启动时记录到日志，保证结果可追溯
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let profit = self.profit_model_config()?;
        let wms = self.wms_config()?;
        let dirs = self.output_dirs()?;
        let ((x1, y1), (x2, y2)) = profit.demand.calibration_points();

        let mut snapshot: BTreeMap<&str, serde_json::Value> = BTreeMap::new();
        snapshot.insert(config_keys::BASE_STOCK, profit.base_stock.into());
        snapshot.insert(config_keys::UNIT_PROFIT, profit.unit_profit.into());
        snapshot.insert(config_keys::DEMAND_X1, x1.into());
        snapshot.insert(config_keys::DEMAND_Y1, y1.into());
        snapshot.insert(config_keys::DEMAND_X2, x2.into());
        snapshot.insert(config_keys::DEMAND_Y2, y2.into());
        snapshot.insert(
            config_keys::OPENING_TIME,
            profit.window.opening.format(TIME_FORMAT).to_string().into(),
        );
        snapshot.insert(
            config_keys::CLOSING_TIME,
            profit.window.closing.format(TIME_FORMAT).to_string().into(),
        );
        snapshot.insert(config_keys::WMS_BASE_URL, wms.base_url.into());
        snapshot.insert(config_keys::WMS_VERSION, wms.version.into());
        snapshot.insert(config_keys::WMS_LAYER, wms.layer.into());
        snapshot.insert(config_keys::WMS_TIMEOUT_SECS, wms.timeout.as_secs().into());
        snapshot.insert(config_keys::WMS_IMAGE_SIZE, wms.image_size.into());
        snapshot.insert(
            config_keys::TIME_ZONE_OFFSET_HOURS,
            wms.time_zone_offset_hours.into(),
        );
        snapshot.insert(config_keys::BBOX_HALF_SIZE, wms.bbox_half_size.into());
        snapshot.insert(
            config_keys::PLOTS_DIR,
            dirs.plots_dir.display().to_string().into(),
        );
        snapshot.insert(
            config_keys::DATA_DIR,
            dirs.data_dir.display().to_string().into(),
        );
        snapshot.insert(
            config_keys::STAC_DIR,
            dirs.stac_dir.display().to_string().into(),
        );

        Ok(serde_json::to_string(&snapshot)?)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 收益模型
    pub const BASE_STOCK: &str = "base_stock"; // 默认 3，不能为负
    pub const UNIT_PROFIT: &str = "unit_profit"; // 默认 10.00，不能为负

    // 需求模型标定点（x1 < x2，0 <= y1 <= y2）
    pub const DEMAND_X1: &str = "demand_x1"; // 默认 30
    pub const DEMAND_Y1: &str = "demand_y1"; // 默认 10
    pub const DEMAND_X2: &str = "demand_x2"; // 默认 100
    pub const DEMAND_Y2: &str = "demand_y2"; // 默认 30

    // 营业时段
    pub const OPENING_TIME: &str = "opening_time"; // 默认 09:00:00
    pub const CLOSING_TIME: &str = "closing_time"; // 默认 21:00:00

    // WMS
    pub const WMS_BASE_URL: &str = "wms_base_url";
    pub const WMS_VERSION: &str = "wms_version";
    pub const WMS_LAYER: &str = "wms_layer";
    pub const WMS_TIMEOUT_SECS: &str = "wms_timeout_secs";
    pub const WMS_IMAGE_SIZE: &str = "wms_image_size";
    pub const TIME_ZONE_OFFSET_HOURS: &str = "time_zone_offset_hours"; // 默认 -7
    pub const BBOX_HALF_SIZE: &str = "bbox_half_size"; // 默认 0.25

    // 输出目录
    pub const PLOTS_DIR: &str = "plots_dir";
    pub const DATA_DIR: &str = "data_dir";
    pub const STAC_DIR: &str = "stac_dir";
}
