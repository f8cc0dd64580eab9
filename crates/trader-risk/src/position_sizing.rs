//! 포지션 크기 계산.
//!
//! 투자 금액은 `가용 자본 × risk% / 100`이며 가용 자본을 넘지 않습니다.
//! 가용 자본이 0 이하이면 진입하지 않고 `Missed`로 기록합니다.

use rust_decimal::Decimal;
use trader_core::{Price, Quantity};

/// 수량 소수점 자릿수 (바이낸스 현물 최소 단위).
pub const QUANTITY_SCALE: u32 = 8;

/// 투자 금액 소수점 자릿수.
pub const AMOUNT_SCALE: u32 = 8;

/// 정밀도를 위해 정수 연산을 사용하여 퍼센트를 금액으로 변환.
/// 예시: pct_to_amount(1000, 10.0) = 100 (1000의 10%)
pub(crate) fn pct_to_amount(amount: Decimal, pct: f64) -> Decimal {
    // 퍼센트를 정수로 스케일링 (퍼센트의 소수점 4자리까지 지원)
    // 예: 10.5% -> 105000, 그 후 1_000_000으로 나눔
    let scaled_pct = (pct * 10000.0).round() as i64;
    (amount * Decimal::from(scaled_pct)) / Decimal::from(1_000_000)
}

/// 사이징 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizingDecision {
    /// 진입 가능
    Open {
        invested: Decimal,
        quantity: Quantity,
    },
    /// 가용 자본 부족
    Missed,
}

/// 포지션 사이저.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionSizer;

impl PositionSizer {
    pub fn new() -> Self {
        Self
    }

    /// 가용 자본과 risk%에서 투자 금액과 수량을 계산합니다.
    ///
    /// # 인자
    /// * `available` - 현재 가용 자본
    /// * `risk_percent` - 거래당 투자 비율 (0, 100]
    /// * `entry_price` - 진입 가격 (양수)
    pub fn size(&self, available: Decimal, risk_percent: f64, entry_price: Price) -> SizingDecision {
        if available <= Decimal::ZERO || entry_price <= Decimal::ZERO {
            return SizingDecision::Missed;
        }

        let invested = pct_to_amount(available, risk_percent)
            .round_dp(AMOUNT_SCALE)
            .min(available);
        if invested <= Decimal::ZERO {
            return SizingDecision::Missed;
        }

        // 최소 수량 단위보다 작은 투자는 진입할 수 없음
        let quantity = (invested / entry_price).round_dp(QUANTITY_SCALE);
        if quantity.is_zero() {
            return SizingDecision::Missed;
        }
        SizingDecision::Open { invested, quantity }
    }
}
