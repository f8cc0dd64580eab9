//! 모멘텀 지표 (Momentum Indicators).
//!
//! Wilder 평활을 사용하는 RSI를 제공합니다.
//!
//! RSI = 100 - (100 / (1 + RS)), RS = 평균 상승폭 / 평균 하락폭
//!
//! 초기 평균은 처음 N개 변화량의 단순 평균이고, 이후에는
//! `avg = (avg × (N − 1) + x) / N` 으로 갱신합니다.
//! 평균 하락폭이 0이면 RSI는 100입니다.

use serde::{Deserialize, Serialize};

use super::{IndicatorError, IndicatorResult};

/// RSI 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RsiParams {
    /// RSI 기간 (기본: 14).
    pub period: usize,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// 전체 윈도우에 대해 RSI를 계산합니다.
///
/// 가격이 `period + 1`개 미만이면 `Ok(None)`을 반환합니다. 데이터 부족은 에러가 아닙니다.
///
/// # 인자
/// * `prices` - 종가 (오래된 것부터)
/// * `period` - RSI 기간
pub fn rsi(prices: &[f64], period: usize) -> IndicatorResult<Option<f64>> {
    validate(prices, period)?;

    let mut averages = WilderAverages::new(period);
    let mut last = None;
    for pair in prices.windows(2) {
        last = averages.push(pair[1] - pair[0]);
    }
    Ok(last)
}

/// 각 접두 구간의 RSI를 한 번의 순회로 계산합니다.
///
/// 결과 길이는 `prices.len()`과 같고, 처음 `period`개 슬롯은 `None`입니다.
/// 마지막 값은 `rsi(prices, period)`와 정확히 같습니다.
pub fn rsi_series(prices: &[f64], period: usize) -> IndicatorResult<Vec<Option<f64>>> {
    validate(prices, period)?;

    let mut result = Vec::with_capacity(prices.len());
    if prices.is_empty() {
        return Ok(result);
    }
    result.push(None);

    let mut averages = WilderAverages::new(period);
    for pair in prices.windows(2) {
        result.push(averages.push(pair[1] - pair[0]));
    }
    Ok(result)
}

/// 모멘텀 지표 계산기.
#[derive(Debug, Clone, Copy, Default)]
pub struct MomentumCalculator {
    params: RsiParams,
}

impl MomentumCalculator {
    /// 주어진 파라미터로 계산기를 생성합니다.
    pub fn new(params: RsiParams) -> Self {
        Self { params }
    }

    /// 설정된 기간으로 RSI를 계산합니다.
    pub fn rsi(&self, prices: &[f64]) -> IndicatorResult<Option<f64>> {
        rsi(prices, self.params.period)
    }

    /// RSI 기간.
    pub fn period(&self) -> usize {
        self.params.period
    }
}

fn validate(prices: &[f64], period: usize) -> IndicatorResult<()> {
    if period == 0 {
        return Err(IndicatorError::InvalidParameter(
            "기간은 0보다 커야 합니다".to_string(),
        ));
    }
    if let Some((idx, price)) = prices
        .iter()
        .enumerate()
        .find(|(_, p)| !p.is_finite() || **p <= 0.0)
    {
        return Err(IndicatorError::InvalidInput(format!(
            "가격[{idx}]은 유한한 양수여야 합니다: {price}"
        )));
    }
    Ok(())
}

/// Wilder 평활 상승/하락 평균.
#[derive(Debug, Clone)]
struct WilderAverages {
    period: usize,
    seen: usize,
    avg_gain: f64,
    avg_loss: f64,
}

impl WilderAverages {
    fn new(period: usize) -> Self {
        Self {
            period,
            seen: 0,
            avg_gain: 0.0,
            avg_loss: 0.0,
        }
    }

    /// 변화량 하나를 반영하고, 평균이 준비되었으면 RSI를 반환합니다.
    fn push(&mut self, delta: f64) -> Option<f64> {
        let gain = delta.max(0.0);
        let loss = (-delta).max(0.0);
        let n = self.period as f64;

        self.seen += 1;
        if self.seen < self.period {
            // 초기 구간: 합계만 누적
            self.avg_gain += gain;
            self.avg_loss += loss;
            return None;
        }
        if self.seen == self.period {
            self.avg_gain = (self.avg_gain + gain) / n;
            self.avg_loss = (self.avg_loss + loss) / n;
        } else {
            self.avg_gain = (self.avg_gain * (n - 1.0) + gain) / n;
            self.avg_loss = (self.avg_loss * (n - 1.0) + loss) / n;
        }
        Some(rsi_from_averages(self.avg_gain, self.avg_loss))
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WILDER_SAMPLE: [f64; 15] = [
        44.0, 44.25, 44.5, 43.75, 44.65, 45.12, 45.85, 46.22, 45.84, 45.09, 45.33, 45.29, 44.94,
        45.53, 44.99,
    ];

    #[test]
    fn test_rsi_wilder_sample() {
        let value = rsi(&WILDER_SAMPLE, 14).unwrap().unwrap();

        // 상승 합 3.80, 하락 합 2.81 → RSI = 100 × 3.80 / 6.61
        let expected = 100.0 * 3.80 / (3.80 + 2.81);
        assert!((value - expected).abs() < 1e-9, "rsi={value}, expected={expected}");
        assert!(value > 0.0 && value < 100.0);
    }

    #[test]
    fn test_rsi_requires_period_plus_one() {
        assert_eq!(rsi(&WILDER_SAMPLE[..14], 14).unwrap(), None);
        assert_eq!(rsi(&[], 14).unwrap(), None);
        assert!(rsi(&WILDER_SAMPLE, 14).unwrap().is_some());
    }

    #[test]
    fn test_rsi_no_losses_is_100() {
        let prices: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        assert_eq!(rsi(&prices, 14).unwrap(), Some(100.0));

        // 평탄한 시장도 하락 평균이 0이므로 100
        let flat = vec![50.0; 16];
        assert_eq!(rsi(&flat, 14).unwrap(), Some(100.0));
    }

    #[test]
    fn test_rsi_all_losses_is_zero() {
        let prices: Vec<f64> = (0..20).map(|i| 200.0 - i as f64).collect();
        assert_eq!(rsi(&prices, 14).unwrap(), Some(0.0));
    }

    #[test]
    fn test_rsi_rejects_invalid_input() {
        assert!(matches!(
            rsi(&[1.0, f64::NAN, 2.0], 2),
            Err(IndicatorError::InvalidInput(_))
        ));
        assert!(matches!(
            rsi(&[1.0, -2.0, 2.0], 2),
            Err(IndicatorError::InvalidInput(_))
        ));
        assert!(matches!(
            rsi(&WILDER_SAMPLE, 0),
            Err(IndicatorError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_rsi_series_matches_prefix_rsi() {
        let mut prices = WILDER_SAMPLE.to_vec();
        prices.extend([45.5, 46.1, 45.2]);

        let series = rsi_series(&prices, 14).unwrap();
        assert_eq!(series.len(), prices.len());
        assert!(series[..14].iter().all(Option::is_none));

        for end in 1..=prices.len() {
            assert_eq!(series[end - 1], rsi(&prices[..end], 14).unwrap());
        }
    }

    #[test]
    fn test_calculator_uses_params() {
        let calc = MomentumCalculator::new(RsiParams { period: 3 });
        assert_eq!(calc.period(), 3);
        assert!(calc.rsi(&[1.0, 2.0, 1.5, 1.8]).unwrap().is_some());
        assert!(MomentumCalculator::default()
            .rsi(&[1.0, 2.0, 1.5, 1.8])
            .unwrap()
            .is_none());
    }
}
