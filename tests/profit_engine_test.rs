// ==========================================
// ProfitEngine 集成测试
// ==========================================
// 覆盖: 长度不变量、收益 = 销量 * 单价、累计单调、
//       阈值以下不增长、换日补基础销量、空序列
// ==========================================

mod test_helpers;

use rain_forecast::engine::{EngineError, ProfitEngine, ProfitModelConfig};
use test_helpers::{at, forecast_payload, samples};

fn engine() -> ProfitEngine {
    ProfitEngine::new(ProfitModelConfig::default())
}

/// 三天、每 3 小时一个预报
fn three_day_points() -> Vec<(u32, u32, f64)> {
    let probabilities = [
        5.0, 12.0, 35.0, 64.0, 100.0, 77.5, 31.0, 0.0, 48.0, 30.0, 29.9, 55.0, 90.0, 66.6, 42.0,
        8.0, 3.0, 10.0, 65.0, 71.0, 88.0, 93.0, 40.0, 20.0,
    ];
    probabilities
        .iter()
        .enumerate()
        .map(|(i, p)| (13 + (i / 8) as u32, ((i % 8) * 3) as u32, *p))
        .collect()
}

#[test]
fn test_output_lengths_match_input() {
    let series = engine().accumulate(&samples(&three_day_points()), 3).unwrap();
    assert_eq!(series.units.len(), 24);
    assert_eq!(series.cumulative_profit.len(), 24);
}

#[test]
fn test_profit_is_units_times_unit_profit_exactly() {
    let engine = engine();
    let series = engine.accumulate(&samples(&three_day_points()), 3).unwrap();
    for (units, profit) in series.units.iter().zip(&series.cumulative_profit) {
        assert_eq!(*profit, *units as f64 * engine.config().unit_profit);
    }
}

#[test]
fn test_units_are_non_decreasing() {
    let series = engine().accumulate(&samples(&three_day_points()), 3).unwrap();
    for window in series.units.windows(2) {
        assert!(window[1] >= window[0], "{:?}", series.units);
    }
}

#[test]
fn test_low_probability_keeps_units_constant() {
    let input = samples(&[(13, 10, 30.0), (13, 13, 12.0), (13, 16, 29.0), (13, 19, 0.0)]);
    let series = engine().accumulate(&input, 3).unwrap();
    assert!(series.units.iter().all(|u| *u == series.units[0]));
    assert_eq!(series.units[0], 3);
}

#[test]
fn test_reference_scenario() {
    let input = samples(&[(13, 9, 20.0), (13, 12, 40.0), (13, 15, 80.0), (13, 18, 10.0)]);
    let engine = engine();
    let series = engine.accumulate(&input, 3).unwrap();

    let demand = engine.config().demand;
    let eq40 = demand.rate(40.0).unwrap() * 3;
    let eq80 = demand.rate(80.0).unwrap() * 3;
    assert_eq!(series.units, vec![0, eq40, eq40 + eq80, eq40 + eq80]);
    assert_eq!(series.units, vec![0, 39, 111, 111]);
}

#[test]
fn test_next_day_gets_base_stock_and_sales() {
    let input = samples(&[
        (13, 12, 50.0), // 首个样本: 3 + 3h * rate(50)=16 -> 51
        (13, 18, 20.0),
        (14, 0, 90.0),  // 闭店
        (14, 10, 50.0), // 换日: 3 + 48 + 51
        (14, 13, 50.0), // 非换日: 48 + 102
    ]);
    let series = engine().accumulate(&input, 3).unwrap();
    assert_eq!(series.units, vec![51, 51, 51, 102, 150]);
}

#[test]
fn test_first_open_sample_at_index_zero_gets_base_stock() {
    // 13:00 不早于 12:00，不算换日，但作为首个样本仍计基础销量
    let input = samples(&[(13, 13, 50.0), (13, 16, 10.0)]);
    let series = engine().accumulate(&input, 3).unwrap();
    assert_eq!(series.units, vec![51, 51]);
}

#[test]
fn test_exact_opening_sample_next_day_gets_nothing() {
    let input = samples(&[(13, 12, 10.0), (14, 9, 90.0)]);
    let series = engine().accumulate(&input, 3).unwrap();
    assert_eq!(series.units, vec![3, 3]);
}

#[test]
fn test_empty_input() {
    let payload = forecast_payload(&[], 3);
    let profit = engine().transform(&payload).unwrap();
    assert!(profit.local_time.is_empty());
    assert!(profit.cumulative_profit.is_empty());
    assert!(profit.open_hours.is_empty());
}

#[test]
fn test_transform_passes_metadata_through() {
    let payload = forecast_payload(&[(13, 9, 20.0), (13, 12, 40.0), (13, 21, 90.0)], 3);
    let profit = engine().transform(&payload).unwrap();

    assert_eq!(profit.local_time, payload.local_time);
    assert_eq!(profit.pixel_value, payload.pixel_value);
    assert_eq!(profit.open_hours, vec![at(13, 12)]);
    assert_eq!(profit.cumulative_profit, vec![0.0, 390.0, 390.0]);
    assert_eq!(profit.layer, payload.layer);
    assert_eq!(profit.bbox, payload.bbox);
    assert_eq!(profit.start_time, payload.start_time);
    assert_eq!(profit.end_time, payload.end_time);
}

#[test]
fn test_transform_rejects_mismatched_lengths() {
    let mut payload = forecast_payload(&[(13, 12, 40.0), (13, 15, 50.0)], 3);
    payload.pixel_value.pop();
    let err = engine().transform(&payload).unwrap_err();
    assert!(matches!(err, EngineError::LengthMismatch { field: "pixel_value", .. }));
    assert!(err.to_string().contains("pixel_value"));
}

#[test]
fn test_transform_rejects_unsorted_timestamps() {
    let payload = forecast_payload(&[(13, 15, 40.0), (13, 12, 50.0)], 3);
    let err = engine().transform(&payload).unwrap_err();
    assert!(matches!(err, EngineError::NonMonotonicTimestamp { index: 1, .. }));
}

#[test]
fn test_transform_rejects_probability_above_hundred() {
    let payload = forecast_payload(&[(13, 9, 20.0), (13, 12, 1e300)], 3);
    let err = engine().transform(&payload).unwrap_err();
    assert!(matches!(err, EngineError::ProbabilityOutOfRange { index: 1, .. }));
    assert!(err.to_string().contains("索引 1"));
}

#[test]
fn test_transform_rejects_negative_probability() {
    let payload = forecast_payload(&[(13, 12, -1.0)], 3);
    let err = engine().transform(&payload).unwrap_err();
    assert!(matches!(err, EngineError::ProbabilityOutOfRange { index: 0, .. }));
}

#[test]
fn test_transform_rejects_non_positive_interval() {
    let payload = forecast_payload(&[(13, 12, 40.0)], 0);
    assert_eq!(
        engine().transform(&payload).unwrap_err(),
        EngineError::InvalidInterval(0)
    );
}
