//! 심볼별 롤링 가격 윈도우.

use std::collections::VecDeque;

/// 최대 길이가 고정된 종가 시퀀스.
///
/// 용량을 넘으면 가장 오래된 가격부터 버립니다. 캔들 마감 시에만 변경됩니다.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    prices: VecDeque<f64>,
    capacity: usize,
}

impl PriceSeries {
    /// 주어진 용량의 빈 윈도우를 생성합니다. 용량은 최소 1입니다.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            prices: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// 히스토리로 윈도우를 채웁니다. 용량을 넘는 앞부분은 버립니다.
    pub fn seeded(capacity: usize, history: &[f64]) -> Self {
        let mut series = Self::new(capacity);
        let start = history.len().saturating_sub(series.capacity);
        series.prices.extend(&history[start..]);
        series
    }

    /// 가격을 추가하고 용량을 넘으면 가장 오래된 가격을 버립니다.
    pub fn push(&mut self, price: f64) {
        if self.prices.len() == self.capacity {
            self.prices.pop_front();
        }
        self.prices.push_back(price);
    }

    /// 마지막 슬롯을 `price`로 바꾼 사본을 반환합니다. 저장된 윈도우는 변경되지 않습니다.
    ///
    /// 윈도우가 비어 있으면 빈 벡터를 반환합니다.
    pub fn with_last_replaced(&self, price: f64) -> Vec<f64> {
        let mut prices: Vec<f64> = self.prices.iter().copied().collect();
        if let Some(last) = prices.last_mut() {
            *last = price;
        }
        prices
    }

    /// 연속된 슬라이스로 반환합니다.
    pub fn to_vec(&self) -> Vec<f64> {
        self.prices.iter().copied().collect()
    }

    pub fn last(&self) -> Option<f64> {
        self.prices.back().copied()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_evicts_oldest() {
        let mut series = PriceSeries::new(3);
        for p in [1.0, 2.0, 3.0, 4.0] {
            series.push(p);
        }
        assert_eq!(series.to_vec(), vec![2.0, 3.0, 4.0]);
        assert_eq!(series.last(), Some(4.0));
    }

    #[test]
    fn test_seeded_keeps_newest() {
        let series = PriceSeries::seeded(2, &[1.0, 2.0, 3.0]);
        assert_eq!(series.to_vec(), vec![2.0, 3.0]);

        let short = PriceSeries::seeded(5, &[7.0]);
        assert_eq!(short.to_vec(), vec![7.0]);
    }

    #[test]
    fn test_with_last_replaced_does_not_mutate() {
        let series = PriceSeries::seeded(4, &[1.0, 2.0, 3.0]);
        assert_eq!(series.with_last_replaced(9.0), vec![1.0, 2.0, 9.0]);
        assert_eq!(series.to_vec(), vec![1.0, 2.0, 3.0]);

        assert!(PriceSeries::new(4).with_last_replaced(9.0).is_empty());
    }
}
