//! 모의 매매 통계 조회 명령어.
//!
//! ```bash
//! trader stats --store data/rsi-watch.json
//! trader stats --store data/rsi-watch.json --days 7 --json
//! ```

use anyhow::Result;
use chrono::{Duration, Utc};
use serde_json::json;
use std::path::Path;
use trader_core::{capital_allocation, derive_stats, period_stats, PositionStatus};
use trader_data::{JsonFileStore, PersistenceSink};

/// 저장된 기록으로 포트폴리오 통계를 출력합니다.
pub async fn print_stats(store_path: &Path, days: Option<i64>, as_json: bool) -> Result<()> {
    let store = JsonFileStore::open(store_path).await?;
    let snapshot = store.load_snapshot().await?;

    let stats = derive_stats(&snapshot.trades, &snapshot.deposits);
    let allocation = capital_allocation(&snapshot.trades, &snapshot.deposits);
    let period = days.map(|days| {
        let to = Utc::now();
        period_stats(&snapshot.trades, to - Duration::days(days), to)
    });

    if as_json {
        let report = json!({
            "stats": stats,
            "allocation": allocation,
            "period": period,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("\n📊 모의 매매 통계 ({})", store_path.display());
    println!("총 입금: {}", stats.deposited_total);
    println!("현재 가치: {}", stats.current_value);
    println!("가용 자본: {}", stats.available);
    println!("실현 손익: {}", stats.total_realized_pnl);
    println!(
        "승/패: {} / {} (승률 {:.1}%)",
        stats.wins,
        stats.losses,
        stats.win_rate_pct()
    );

    let missed = snapshot
        .trades
        .iter()
        .filter(|p| p.status == PositionStatus::Missed)
        .count();
    if missed > 0 {
        println!("놓친 진입: {missed}");
    }

    if !allocation.invested.is_empty() {
        println!("\n오픈 포지션 투자금:");
        for (symbol, invested) in &allocation.invested {
            println!("  {symbol:<12} {invested}");
        }
    }

    if let Some(period) = period {
        println!(
            "\n최근 {}일: 청산 {}건, 승/패 {} / {}, 손익 {}",
            days.unwrap_or_default(),
            period.closed_count,
            period.wins,
            period.losses,
            period.realized_pnl
        );
    }
    Ok(())
}
