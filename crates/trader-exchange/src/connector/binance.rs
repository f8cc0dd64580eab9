//! Binance 현물 REST 클라이언트.
//!
//! 인증이 필요 없는 공개 시세 API만 사용합니다.

use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error};
use trader_core::{FeedConfig, Timeframe};

use crate::traits::ExchangeResult;
use crate::ExchangeError;

/// 한 번의 klines 요청으로 받을 수 있는 최대 캔들 수.
pub const MAX_KLINES_LIMIT: usize = 1000;

/// Binance kline 배열 응답.
#[derive(Debug, Deserialize)]
struct BinanceKline(
    i64,    // 0: Open time
    String, // 1: Open
    String, // 2: High
    String, // 3: Low
    String, // 4: Close
    String, // 5: Volume
    i64,    // 6: Close time
    String, // 7: Quote asset volume
    i64,    // 8: Number of trades
    String, // 9: Taker buy base asset volume
    String, // 10: Taker buy quote asset volume
    String, // 11: Ignore
);

#[derive(Debug, Deserialize)]
struct BinanceError {
    code: i32,
    msg: String,
}

/// Binance REST 클라이언트.
#[derive(Debug, Clone)]
pub struct BinanceClient {
    base_url: String,
    client: Client,
}

impl BinanceClient {
    /// 피드 설정으로 클라이언트를 생성합니다.
    ///
    /// # Errors
    /// HTTP 클라이언트 생성에 실패하면 `ExchangeError::NetworkError`를 반환합니다.
    pub fn new(config: &FeedConfig) -> ExchangeResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| {
                ExchangeError::NetworkError(format!("HTTP 클라이언트 생성 실패: {}", e))
            })?;

        Ok(Self {
            base_url: config.rest_base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 공개 API 요청 (인증 불필요).
    async fn public_get<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> ExchangeResult<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(url = %url, ?params, "GET");

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(ExchangeError::from)?;

        Self::handle_response(response).await
    }

    async fn handle_response<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> ExchangeResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ExchangeError::NetworkError(e.to_string()))?;

        if status.is_success() {
            serde_json::from_str(&body).map_err(|e| {
                error!(error = %e, body = %body, "응답 파싱 실패");
                ExchangeError::ParseError(e.to_string())
            })
        } else if status.as_u16() == 429 || status.as_u16() == 418 {
            Err(ExchangeError::RateLimited)
        } else if let Ok(error) = serde_json::from_str::<BinanceError>(&body) {
            Err(Self::map_error_code(error.code, &error.msg))
        } else {
            Err(ExchangeError::ApiError {
                code: status.as_u16() as i32,
                message: body,
            })
        }
    }

    fn map_error_code(code: i32, msg: &str) -> ExchangeError {
        match code {
            -1001 => ExchangeError::Disconnected(msg.to_string()),
            -1003 => ExchangeError::RateLimited,
            -1121 => ExchangeError::SymbolNotFound(msg.to_string()),
            _ => ExchangeError::ApiError {
                code,
                message: msg.to_string(),
            },
        }
    }

    /// 최근 `limit`개 캔들 중 마감된 캔들의 종가를 오래된 순으로 조회합니다.
    ///
    /// 응답의 마지막 캔들은 보통 진행 중이므로 (close time이 현재 이후) 제외됩니다.
    /// 따라서 결과는 `limit`보다 하나 적을 수 있습니다.
    pub async fn closes(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> ExchangeResult<Vec<f64>> {
        let limit = limit.clamp(1, MAX_KLINES_LIMIT);
        let klines: Vec<BinanceKline> = self
            .public_get(
                "/api/v3/klines",
                &[
                    ("symbol", symbol.to_uppercase()),
                    ("interval", timeframe.as_binance_interval().to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        let now_ms = Utc::now().timestamp_millis();
        let closed: Vec<f64> = klines
            .iter()
            .filter(|k| k.6 < now_ms)
            .map(|k| parse_price(&k.4))
            .collect::<ExchangeResult<_>>()?;
        if closed.len() < klines.len() {
            debug!(symbol, dropped = klines.len() - closed.len(), "진행 중인 캔들 제외");
        }
        Ok(closed)
    }
}

/// 문자열 가격을 유한한 양수로 파싱합니다.
pub(crate) fn parse_price(s: &str) -> ExchangeResult<f64> {
    match s.parse::<f64>() {
        Ok(price) if price.is_finite() && price > 0.0 => Ok(price),
        _ => Err(ExchangeError::ParseError(format!("잘못된 가격: {s}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("42000.50").unwrap(), 42000.5);
        assert!(parse_price("0").is_err());
        assert!(parse_price("abc").is_err());
        assert!(parse_price("NaN").is_err());
    }

    #[test]
    fn test_map_error_code() {
        assert!(matches!(
            BinanceClient::map_error_code(-1121, "Invalid symbol."),
            ExchangeError::SymbolNotFound(_)
        ));
        assert!(matches!(
            BinanceClient::map_error_code(-1003, "Too many requests"),
            ExchangeError::RateLimited
        ));
    }

    #[test]
    fn test_base_url_trimmed() {
        let config = FeedConfig {
            rest_base_url: "http://localhost:9000/".into(),
            ..Default::default()
        };
        let client = BinanceClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:9000");
    }
}
