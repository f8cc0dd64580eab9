//! 자동 매매 사용자 설정.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{TraderError, TraderResult};

/// 자동 매매 설정.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoTraderSettings {
    /// 기준 자본금
    pub capital: Decimal,
    /// 거래당 투자 비율 (가용 자본 대비 %)
    pub risk_percent: f64,
    /// 신규 진입 활성화 여부
    pub is_active: bool,
}

impl Default for AutoTraderSettings {
    fn default() -> Self {
        Self {
            capital: dec!(1000),
            risk_percent: 10.0,
            is_active: false,
        }
    }
}

impl AutoTraderSettings {
    /// 설정 값을 검증합니다.
    pub fn validate(&self) -> TraderResult<()> {
        if self.capital < Decimal::ZERO {
            return Err(TraderError::InvalidInput(format!(
                "capital은 음수일 수 없습니다: {}",
                self.capital
            )));
        }
        if !self.risk_percent.is_finite() || self.risk_percent <= 0.0 || self.risk_percent > 100.0
        {
            return Err(TraderError::InvalidInput(format!(
                "risk_percent는 (0, 100] 범위여야 합니다: {}",
                self.risk_percent
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = AutoTraderSettings::default();
        assert_eq!(settings.capital, dec!(1000));
        assert_eq!(settings.risk_percent, 10.0);
        assert!(!settings.is_active);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_risk() {
        for risk in [0.0, -5.0, 100.5, f64::NAN] {
            let settings = AutoTraderSettings {
                risk_percent: risk,
                ..Default::default()
            };
            assert!(settings.validate().unwrap_err().is_invalid_input());
        }
    }
}
