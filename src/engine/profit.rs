// ==========================================
// 降水收益决策支持系统 - 收益累计引擎
// ==========================================
// 职责: 预报序列 -> 逐时刻累计销量 -> 累计收益
// 输入: ForecastPayload (local_time / pixel_value / interval)
// 输出: ProfitPayload (cumulative_profit / open_hours)
// ==========================================
// 累计规则（严格按时间升序处理）:
// 1) 营业时段内 且 (首个样本 或 换日) -> 计入每日基础销量
// 2) 营业时段内 且 概率 > 阈值 -> 计入 rate(p) * interval，并承接上一时刻累计
// 3) 其他 -> 仅承接上一时刻累计
// ==========================================

use crate::domain::forecast::{ForecastPayload, ForecastSample, ProfitPayload};
use crate::domain::types::OpenHoursWindow;
use crate::engine::demand::DemandModel;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::open_hours::{DayBoundaryDetector, OpenHoursFilter};
use chrono::NaiveDateTime;
use tracing::{debug, info, instrument};

// ==========================================
// ProfitModelConfig - 收益模型参数
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfitModelConfig {
    /// 每日基础销量（与天气无关）
    pub base_stock: i64,
    /// 每把雨伞利润
    pub unit_profit: f64,
    pub demand: DemandModel,
    pub window: OpenHoursWindow,
}

impl Default for ProfitModelConfig {
    fn default() -> Self {
        Self {
            base_stock: 3,
            unit_profit: 10.00,
            demand: DemandModel::default(),
            window: OpenHoursWindow::default(),
        }
    }
}

/// 累计计算结果（与输入样本一一对应）
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProfitSeries {
    pub units: Vec<i64>,
    pub cumulative_profit: Vec<f64>,
    /// 营业时段内的时间戳
    pub open_hours: Vec<NaiveDateTime>,
}

impl ProfitSeries {
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// 最终累计收益（空序列为 0）
    pub fn total_profit(&self) -> f64 {
        self.cumulative_profit.last().copied().unwrap_or(0.0)
    }
}

// ==========================================
// ProfitEngine - 收益累计引擎
// ==========================================
pub struct ProfitEngine {
    config: ProfitModelConfig,
    filter: OpenHoursFilter,
}

impl ProfitEngine {
    pub fn new(config: ProfitModelConfig) -> Self {
        Self {
            filter: OpenHoursFilter::new(config.window),
            config,
        }
    }

    pub fn config(&self) -> &ProfitModelConfig {
        &self.config
    }

    // ==========================================
    // 输入校验
    // ==========================================

    /// 校验间隔并转换为小时数
    pub fn validate_interval(interval: i64) -> EngineResult<u32> {
        u32::try_from(interval)
            .ok()
            .filter(|hours| *hours > 0)
            .ok_or(EngineError::InvalidInterval(interval))
    }

    /// 将并列的时间戳/概率数组组装为样本序列
    ///
    /// 校验: 长度一致、时间戳严格递增、概率为 0~100 的有限数值
    pub fn assemble_samples(
        local_time: &[NaiveDateTime],
        pixel_value: &[f64],
    ) -> EngineResult<Vec<ForecastSample>> {
        if local_time.len() != pixel_value.len() {
            return Err(EngineError::LengthMismatch {
                field: "pixel_value",
                expected: local_time.len(),
                actual: pixel_value.len(),
            });
        }

        let samples: Vec<ForecastSample> = local_time
            .iter()
            .zip(pixel_value)
            .map(|(t, p)| ForecastSample::new(*t, *p))
            .collect();

        Self::ensure_well_formed(&samples)?;
        Ok(samples)
    }

    fn ensure_well_formed(samples: &[ForecastSample]) -> EngineResult<()> {
        for (index, sample) in samples.iter().enumerate() {
            if !sample.probability.is_finite() {
                return Err(EngineError::NonFiniteProbability {
                    index,
                    value: sample.probability,
                });
            }
            if !(0.0..=100.0).contains(&sample.probability) {
                return Err(EngineError::ProbabilityOutOfRange {
                    index,
                    value: sample.probability,
                });
            }
            if index > 0 {
                let previous = samples[index - 1].local_time;
                if sample.local_time <= previous {
                    return Err(EngineError::NonMonotonicTimestamp {
                        index,
                        previous,
                        current: sample.local_time,
                    });
                }
            }
        }
        Ok(())
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 逐时刻累计销量与收益
    #[instrument(skip(self, samples), fields(count = samples.len()))]
    pub fn accumulate(
        &self,
        samples: &[ForecastSample],
        interval_hours: u32,
    ) -> EngineResult<ProfitSeries> {
        if interval_hours == 0 {
            return Err(EngineError::InvalidInterval(0));
        }
        Self::ensure_well_formed(samples)?;

        let detector = DayBoundaryDetector::new(&self.config.window, interval_hours);
        let threshold = self.config.demand.threshold();
        debug!(
            window = %self.config.window,
            opening_interval = %detector.opening_interval(),
            threshold = threshold,
            "开始累计销量"
        );

        let mut units: Vec<i64> = Vec::with_capacity(samples.len());
        for (index, sample) in samples.iter().enumerate() {
            let in_open_hours = self.filter.is_open(&sample.local_time);
            let new_day = detector.is_new_day(sample.local_time.time());
            let mut current = 0_i64;

            // 1. 每日基础销量
            if in_open_hours && (index == 0 || new_day) {
                current = self.config.base_stock;
            }

            // 2. 天气带动销量
            if in_open_hours && sample.probability > threshold {
                let sold = self
                    .config
                    .demand
                    .units_between(sample.probability, interval_hours)
                    .ok_or(EngineError::UnitsOverflow { index })?;
                current = current
                    .checked_add(sold)
                    .ok_or(EngineError::UnitsOverflow { index })?;
            }

            // 3. 承接上一时刻累计
            if let Some(previous) = units.last() {
                current = current
                    .checked_add(*previous)
                    .ok_or(EngineError::UnitsOverflow { index })?;
            }
            units.push(current);
        }

        let cumulative_profit: Vec<f64> = units
            .iter()
            .map(|u| *u as f64 * self.config.unit_profit)
            .collect();

        let open_hours: Vec<NaiveDateTime> = self
            .filter
            .filter(samples)
            .into_iter()
            .map(|s| s.local_time)
            .collect();

        Ok(ProfitSeries {
            units,
            cumulative_profit,
            open_hours,
        })
    }

    /// 预报载荷 -> 收益载荷
    #[instrument(skip(self, payload), fields(layer = %payload.layer))]
    pub fn transform(&self, payload: &ForecastPayload) -> EngineResult<ProfitPayload> {
        let interval_hours = Self::validate_interval(payload.interval)?;
        let samples = Self::assemble_samples(&payload.local_time, &payload.pixel_value)?;
        let series = self.accumulate(&samples, interval_hours)?;

        info!(
            samples = series.len(),
            open_hours = series.open_hours.len(),
            total_profit = series.total_profit(),
            "收益累计完成"
        );

        Ok(ProfitPayload {
            local_time: payload.local_time.clone(),
            pixel_value: payload.pixel_value.clone(),
            cumulative_profit: series.cumulative_profit,
            open_hours: series.open_hours,
            layer: payload.layer.clone(),
            bbox: payload.bbox,
            start_time: payload.start_time,
            end_time: payload.end_time,
        })
    }
}

impl Default for ProfitEngine {
    fn default() -> Self {
        Self::new(ProfitModelConfig::default())
    }
}
