// ==========================================
// 降水收益决策支持系统 - 流水线 API
// ==========================================
// 阶段: fetch -> predict -> table -> stac
// 交接: 每个阶段的 JSON 输出写入 <data>/values.json，
//       同时返回给调用方作为下一阶段输入
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::config_manager::{ConfigManager, OutputDirs};
use crate::domain::forecast::{ForecastPayload, ProfitPayload};
use crate::engine::profit::ProfitEngine;
use crate::fetch::fetcher::ForecastFetcher;
use crate::fetch::wms_client::WmsSource;
use crate::report::stac::{CatalogPackager, StacPaths, StacSettings};
use crate::report::table::export_profit_csv;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// 交接文件名
pub const VALUES_JSON_FILE: &str = "values.json";

/// 整条流水线的产出
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSummary {
    pub forecast: ForecastPayload,
    pub profit: ProfitPayload,
    pub table_path: PathBuf,
    pub stac_paths: StacPaths,
}

// ==========================================
// PipelineApi
// ==========================================
pub struct PipelineApi {
    config: ConfigManager,
    dirs: OutputDirs,
}

impl PipelineApi {
    pub fn new(config: ConfigManager) -> ApiResult<Self> {
        let dirs = config.output_dirs()?;
        Ok(Self { config, dirs })
    }

    pub fn config(&self) -> &ConfigManager {
        &self.config
    }

    pub fn dirs(&self) -> &OutputDirs {
        &self.dirs
    }

    // ==========================================
    // 载荷读写
    // ==========================================

    /// 解析阶段输入 JSON（缺字段/类型错误均整体拒绝）
    pub fn parse_payload<T: DeserializeOwned>(input_json: &str) -> ApiResult<T> {
        serde_json::from_str(input_json).map_err(|e| ApiError::InvalidInput(e.to_string()))
    }

    fn write_values_json<T: Serialize>(&self, payload: &T) -> ApiResult<PathBuf> {
        std::fs::create_dir_all(&self.dirs.data_dir)?;
        let path = self.dirs.data_dir.join(VALUES_JSON_FILE);
        let json = serde_json::to_string(payload)
            .map_err(|e| ApiError::FileWriteError(e.to_string()))?;
        std::fs::write(&path, json)?;
        debug!(path = %path.display(), "阶段输出已写入");
        Ok(path)
    }

    // ==========================================
    // 阶段 1: 抓取
    // ==========================================

    /// 抓取点 (x, y) 的降水概率序列
    #[instrument(skip(self, source))]
    pub async fn fetch<S: WmsSource>(&self, source: S, x: f64, y: f64) -> ApiResult<ForecastPayload> {
        let fetcher = ForecastFetcher::new(source, self.config.wms_config()?);
        let payload = fetcher.fetch(x, y).await?;
        self.write_values_json(&payload)?;
        Ok(payload)
    }

    // ==========================================
    // 阶段 2: 收益计算
    // ==========================================

    pub fn predict(&self, input_json: &str) -> ApiResult<ProfitPayload> {
        let forecast: ForecastPayload = Self::parse_payload(input_json)?;
        self.predict_payload(&forecast)
    }

    #[instrument(skip(self, forecast), fields(samples = forecast.local_time.len()))]
    pub fn predict_payload(&self, forecast: &ForecastPayload) -> ApiResult<ProfitPayload> {
        let engine = ProfitEngine::new(self.config.profit_model_config()?);
        info!(window = %engine.config().window, "营业时段");

        let profit = engine.transform(forecast)?;
        self.write_values_json(&profit)?;
        Ok(profit)
    }

    // ==========================================
    // 阶段 3: 收益表
    // ==========================================

    pub fn tabulate(&self, input_json: &str) -> ApiResult<PathBuf> {
        let profit: ProfitPayload = Self::parse_payload(input_json)?;
        self.tabulate_payload(&profit)
    }

    pub fn tabulate_payload(&self, profit: &ProfitPayload) -> ApiResult<PathBuf> {
        Ok(export_profit_csv(profit, &self.dirs.plots_dir)?)
    }

    // ==========================================
    // 阶段 4: STAC 编目
    // ==========================================

    pub fn package_catalog(&self, input_json: &str, settings: StacSettings) -> ApiResult<StacPaths> {
        let profit: ProfitPayload = Self::parse_payload(input_json)?;
        self.package_catalog_payload(&profit, settings)
    }

    pub fn package_catalog_payload(
        &self,
        profit: &ProfitPayload,
        settings: StacSettings,
    ) -> ApiResult<StacPaths> {
        let packager = CatalogPackager::new(settings);
        info!(
            assets = %packager.settings().assets_bucket_path(),
            "资产桶路径"
        );
        let bundle = packager.package(profit);
        Ok(packager.write(&bundle, &self.dirs.stac_dir)?)
    }

    // ==========================================
    // 全流程
    // ==========================================

    pub async fn run_all<S: WmsSource>(
        &self,
        source: S,
        x: f64,
        y: f64,
        settings: StacSettings,
    ) -> ApiResult<PipelineSummary> {
        info!(config = %self.config.get_config_snapshot()?, "流水线配置");
        self.dirs.ensure_created()?;

        let forecast = self.fetch(source, x, y).await?;
        let profit = self.predict_payload(&forecast)?;
        let table_path = self.tabulate_payload(&profit)?;
        let stac_paths = self.package_catalog_payload(&profit, settings)?;

        info!(
            table = %table_path.display(),
            catalog = %stac_paths.catalog.display(),
            "流水线完成"
        );

        Ok(PipelineSummary {
            forecast,
            profit,
            table_path,
            stac_paths,
        })
    }

    /// 读取上一阶段写出的 values.json
    pub fn read_values_json(&self) -> ApiResult<String> {
        read_input_file(&self.dirs.data_dir.join(VALUES_JSON_FILE))
    }
}

/// 读取阶段输入文件
pub fn read_input_file(path: &Path) -> ApiResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| ApiError::InvalidInput(format!("{}: {}", path.display(), e)))
}
