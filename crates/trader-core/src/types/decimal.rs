//! 정밀한 금융 계산을 위한 Decimal 유틸리티.
//!
//! 시세 피드와 지표 계산은 `f64`를 사용하고, 포지션과 자본 장부는
//! `Decimal`을 사용합니다. 두 세계의 경계 변환을 이 모듈이 담당합니다.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::{TraderError, TraderResult};

/// 금융 정밀도를 위한 가격 타입.
pub type Price = Decimal;

/// 수량 타입.
pub type Quantity = Decimal;

/// 피드 가격이 유한한 양수인지 검증합니다.
pub fn ensure_valid_price(price: f64) -> TraderResult<f64> {
    if !price.is_finite() {
        return Err(TraderError::InvalidInput(format!(
            "가격은 유한한 값이어야 합니다: {price}"
        )));
    }
    if price <= 0.0 {
        return Err(TraderError::InvalidInput(format!(
            "가격은 0보다 커야 합니다: {price}"
        )));
    }
    Ok(price)
}

/// `f64` 가격을 `Decimal`로 변환합니다.
///
/// 비유한 값이나 0 이하 값은 `InvalidInput`으로 거부됩니다.
pub fn price_from_f64(price: f64) -> TraderResult<Price> {
    let price = ensure_valid_price(price)?;
    Decimal::try_from(price)
        .map(|d| d.normalize())
        .map_err(|e| TraderError::InvalidInput(format!("가격 변환 실패 ({price}): {e}")))
}

/// 표시/로그 용도로 `Decimal`을 `f64`로 변환합니다.
pub fn decimal_to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}
