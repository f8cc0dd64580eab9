//! 지표 판독값.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 한 번의 갱신 주기에서 심볼별로 생성되는 RSI 판독값.
///
/// `rsi`는 가격 윈도우가 기간보다 많은 샘플을 가질 때까지 `None`입니다.
/// 하위 엔진은 `None`을 "신호 없음"으로 취급합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorReading {
    /// 심볼 (예: BTCUSDT)
    pub symbol: String,
    /// 판독 시점 가격
    pub price: f64,
    /// RSI 값 (데이터 부족 시 None)
    pub rsi: Option<f64>,
    /// 판독 시각
    pub timestamp: DateTime<Utc>,
    /// 실시간 틱에서 계산된 잠정 판독값 여부
    #[serde(default)]
    pub provisional: bool,
}

impl IndicatorReading {
    /// 확정(캔들 마감) 판독값을 생성합니다.
    pub fn new(
        symbol: impl Into<String>,
        price: f64,
        rsi: Option<f64>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            rsi,
            timestamp,
            provisional: false,
        }
    }

    /// 잠정 판독값으로 표시합니다.
    pub fn provisional(mut self) -> Self {
        self.provisional = true;
        self
    }

    /// RSI가 산출되었는지 확인합니다.
    pub fn has_signal(&self) -> bool {
        self.rsi.is_some()
    }
}
