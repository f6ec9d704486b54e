// ==========================================
// 降水收益决策支持系统 - 需求模型
// ==========================================
// 模型: rate(p) = y1 + round((p - x1) * slope)
//       slope = (y2 - y1) / (x2 - x1)
// 取整: 四舍六入五成双（round half to even），全序列统一
// 约束: x1 < x2，0 <= y1 <= y2（阈值以上销量非负）
// ==========================================

use crate::engine::error::{EngineError, EngineResult};

/// 需求模型（两点线性标定）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DemandModel {
    /// 阈值概率（%），超过该值才计入天气带动的销量
    x1: f64,
    /// x1 处每小时销量
    y1: i64,
    x2: f64,
    y2: i64,
    slope: f64,
}

impl DemandModel {
    /// 由两个标定点创建模型
    ///
    /// # 参数
    /// - (x1, y1): 概率 x1% 时每小时售出 y1 把
    /// - (x2, y2): 概率 x2% 时每小时售出 y2 把
    pub fn new(x1: f64, y1: i64, x2: f64, y2: i64) -> EngineResult<Self> {
        if !x1.is_finite() || !x2.is_finite() {
            return Err(EngineError::InvalidModel(format!(
                "标定点概率必须为有限数值: x1={}, x2={}",
                x1, x2
            )));
        }
        if x1 >= x2 {
            return Err(EngineError::InvalidModel(format!(
                "标定点概率必须递增: x1={}, x2={}",
                x1, x2
            )));
        }
        if y1 < 0 || y2 < y1 {
            return Err(EngineError::InvalidModel(format!(
                "标定点销量必须满足 0 <= y1 <= y2: y1={}, y2={}",
                y1, y2
            )));
        }

        let slope = (y2 - y1) as f64 / (x2 - x1);
        Ok(Self {
            x1,
            y1,
            x2,
            y2,
            slope,
        })
    }

    pub fn threshold(&self) -> f64 {
        self.x1
    }

    pub fn slope(&self) -> f64 {
        self.slope
    }

    pub fn calibration_points(&self) -> ((f64, i64), (f64, i64)) {
        ((self.x1, self.y1), (self.x2, self.y2))
    }

    /// 每小时销量，超出 i64 范围时返回 None
    pub fn rate(&self, probability: f64) -> Option<i64> {
        let delta = ((probability - self.x1) * self.slope).round_ties_even();
        if !delta.is_finite() || delta.abs() >= i64::MAX as f64 {
            return None;
        }
        self.y1.checked_add(delta as i64)
    }

    /// 两次预报之间的销量 = rate(p) * interval
    pub fn units_between(&self, probability: f64, interval_hours: u32) -> Option<i64> {
        self.rate(probability)?.checked_mul(i64::from(interval_hours))
    }
}

impl Default for DemandModel {
    /// (30%, 10 把/小时) - (100%, 30 把/小时)
    fn default() -> Self {
        Self {
            x1: 30.0,
            y1: 10,
            x2: 100.0,
            y2: 30,
            slope: 20.0 / 70.0,
        }
    }
}
