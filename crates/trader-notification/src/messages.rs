//! 텔레그램 Markdown 메시지 포맷.

use rust_decimal::Decimal;
use trader_core::{AlertSide, Position, PositionStatus};

/// 강한 레벨 돌파 신호 메시지.
pub fn signal_message(side: AlertSide, symbol: &str, price: f64, rsi: f64) -> String {
    let (emoji, title) = match side {
        AlertSide::Oversold => ("🟢", "BUY SIGNAL"),
        AlertSide::Overbought => ("🔴", "SELL SIGNAL"),
    };
    format!("{emoji} *{title}* {emoji}\n\n*Symbol:* {symbol}\n*Price:* {price:.4}\n*RSI:* {rsi:.2}")
}

/// 약한 레벨 돌파 경고 메시지.
pub fn warning_message(side: AlertSide, symbol: &str, price: f64, rsi: f64) -> String {
    let zone = match side {
        AlertSide::Oversold => "oversold",
        AlertSide::Overbought => "overbought",
    };
    format!(
        "⚠️ *RSI WARNING* ⚠️\n\n*Symbol:* {symbol}\n*Price:* {price}\n*RSI:* {rsi:.2} ({zone})"
    )
}

/// 모의 매매 포지션 이벤트 메시지.
pub fn position_message(position: &Position) -> String {
    let symbol = &position.symbol;
    let entry = position.entry_price.normalize();
    match position.status {
        PositionStatus::Open => format!(
            "📈 *PAPER TRADE OPENED*\n\n*Symbol:* {symbol}\n*Entry:* {entry}\n*TP:* {}\n*SL:* {}\n*Invested:* {}",
            position.take_profit_price.normalize(),
            position.stop_loss_price.normalize(),
            position.invested_amount.normalize(),
        ),
        PositionStatus::ClosedTp | PositionStatus::ClosedSl => {
            let title = if position.status == PositionStatus::ClosedTp {
                "✅ *TAKE PROFIT*"
            } else {
                "🛑 *STOP LOSS*"
            };
            let profit = position.realized_profit.unwrap_or_default();
            let exit = position.close_price.unwrap_or_default().normalize();
            format!(
                "{title}\n\n*Symbol:* {symbol}\n*Entry:* {entry}\n*Exit:* {exit}\n*P&L:* {}",
                signed(profit)
            )
        }
        PositionStatus::Missed => format!(
            "⏸️ *ENTRY MISSED*\n\n*Symbol:* {symbol}\n*Price:* {entry}\n가용 자본이 없어 진입하지 못했습니다"
        ),
    }
}

fn signed(value: Decimal) -> String {
    let value = value.normalize();
    if value.is_sign_negative() {
        value.to_string()
    } else {
        format!("+{value}")
    }
}
