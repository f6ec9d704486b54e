// ==========================================
// 降水收益决策支持系统 - 命令行入口
// ==========================================
// 用法:
//   rain-forecast fetch --pos-x -123.116 --pos-y 49.288
//   rain-forecast predict --input-data '<json>'
//   rain-forecast table   --input-file data/values.json
//   rain-forecast stac    --input-file data/values.json
//   rain-forecast run     --pos-x -123.116 --pos-y 49.288
// ==========================================

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use rain_forecast::api::{read_input_file, PipelineApi};
use rain_forecast::config::{stac_settings_from_env, ConfigManager};
use rain_forecast::fetch::HttpWmsClient;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "rain-forecast", version, about = "降水概率 -> 雨伞销售收益 决策支持流水线")]
struct Cli {
    /// 配置文件（JSON / TOML / YAML，可被 RAIN_* 环境变量覆盖）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 以 JSON 行格式输出日志
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 从 WMS 抓取降水概率序列
    Fetch(PointArgs),
    /// 由降水概率计算累计收益
    Predict(StageInput),
    /// 导出营业时段收益表 (CSV)
    Table(StageInput),
    /// 生成 STAC 编目
    Stac(StageInput),
    /// 依次执行全部阶段
    Run(PointArgs),
}

#[derive(Args, Debug)]
struct PointArgs {
    /// 经度
    #[arg(long, alias = "pos_x", allow_hyphen_values = true)]
    pos_x: f64,
    /// 纬度
    #[arg(long, alias = "pos_y", allow_hyphen_values = true)]
    pos_y: f64,
}

#[derive(Args, Debug)]
struct StageInput {
    /// 上一阶段输出的 JSON 字符串
    #[arg(long, alias = "input_data", conflicts_with = "input_file")]
    input_data: Option<String>,
    /// 上一阶段输出的 JSON 文件
    #[arg(long)]
    input_file: Option<PathBuf>,
}

impl StageInput {
    fn read(&self) -> Result<String> {
        match (&self.input_data, &self.input_file) {
            (Some(data), _) => Ok(data.clone()),
            (None, Some(path)) => Ok(read_input_file(path)?),
            (None, None) => bail!("必须提供 --input-data 或 --input-file"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    rain_forecast::logging::init(cli.json_logs);

    info!("==================================================");
    info!("{} v{}", rain_forecast::APP_NAME, rain_forecast::VERSION);
    info!("==================================================");

    let config = ConfigManager::load(cli.config.as_deref()).context("加载配置失败")?;
    let api = PipelineApi::new(config)?;
    api.dirs().ensure_created().context("创建输出目录失败")?;

    match cli.command {
        Commands::Fetch(point) => {
            let client = HttpWmsClient::new(api.config().wms_config()?)?;
            let payload = api.fetch(client, point.pos_x, point.pos_y).await?;
            info!(samples = payload.local_time.len(), "抓取阶段完成");
        }
        Commands::Predict(input) => {
            let payload = api.predict(&input.read()?)?;
            info!(
                open_hours = payload.open_hours.len(),
                total_profit = payload.cumulative_profit.last().copied().unwrap_or(0.0),
                "收益阶段完成"
            );
        }
        Commands::Table(input) => {
            let path = api.tabulate(&input.read()?)?;
            info!(path = %path.display(), "制表阶段完成");
        }
        Commands::Stac(input) => {
            let settings = stac_settings_from_env()?;
            let paths = api.package_catalog(&input.read()?, settings)?;
            info!(catalog = %paths.catalog.display(), "编目阶段完成");
        }
        Commands::Run(point) => {
            let settings = stac_settings_from_env()?;
            let client = HttpWmsClient::new(api.config().wms_config()?)?;
            let summary = api.run_all(client, point.pos_x, point.pos_y, settings).await?;
            info!(item = %summary.stac_paths.item.display(), "全部阶段完成");
        }
    }

    Ok(())
}
