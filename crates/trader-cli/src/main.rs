//! RSI 감시 봇 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 설정 파일로 감시 및 모의 매매 실행
//! trader run -c config/default.toml
//!
//! # BTCUSDT 1시간봉 RSI 조회
//! trader rsi -s BTCUSDT -i 1h
//!
//! # 모의 매매 통계 / 입금
//! trader stats --store data/rsi-watch.json
//! trader deposit --store data/rsi-watch.json --amount 1000
//! ```

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing::{error, info};

use trader_cli::commands::deposit::deposit_to_store;
use trader_cli::commands::rsi::{print_rsi, RsiQuery};
use trader_cli::commands::run::run_pipeline;
use trader_cli::commands::stats::print_stats;
use trader_core::{init_logging, init_logging_from_env, AppConfig, FeedConfig, Timeframe};

#[derive(Parser)]
#[command(name = "trader")]
#[command(about = "RSI watch bot - Binance RSI 알림 및 모의 자동 매매", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 실시간 감시 파이프라인 실행
    Run {
        /// 설정 파일
        #[arg(short, long, default_value = "config/default.toml")]
        config: PathBuf,
    },

    /// 심볼의 현재 RSI 조회
    Rsi {
        /// 심볼 (예: BTCUSDT)
        #[arg(short, long)]
        symbol: String,

        /// 캔들 간격 (1m, 5m, 15m, 1h, 4h, 1d ...)
        #[arg(short, long, default_value = "1h")]
        interval: Timeframe,

        /// 조회할 캔들 수 (최대 1000)
        #[arg(short, long, default_value = "200")]
        limit: usize,

        /// RSI 기간
        #[arg(short, long, default_value = "14")]
        period: usize,

        /// 출력할 최근 값 개수
        #[arg(long, default_value = "5")]
        tail: usize,
    },

    /// 저장된 모의 매매 통계
    Stats {
        /// JSON 저장소 파일
        #[arg(long, default_value = "data/rsi-watch.json")]
        store: PathBuf,

        /// 최근 N일 기간 통계
        #[arg(long)]
        days: Option<i64>,

        /// JSON으로 출력
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// 모의 자본 입금 (실행 중인 프로세스에는 다음 실행부터 반영)
    Deposit {
        /// 설정 파일 (없으면 기본값, 초기 자본 시드에 사용)
        #[arg(short, long, default_value = "config/default.toml")]
        config: PathBuf,

        /// JSON 저장소 파일
        #[arg(long, default_value = "data/rsi-watch.json")]
        store: PathBuf,

        /// 입금액
        #[arg(short, long)]
        amount: Decimal,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config } => {
            let app_config = AppConfig::load(&config)?;
            init_logging(&app_config.logging)?;
            info!("Starting RSI watch with config: {}", config.display());

            if let Err(e) = run_pipeline(app_config).await {
                error!("Pipeline failed: {}", e);
                return Err(e);
            }
        }

        Commands::Rsi {
            symbol,
            interval,
            limit,
            period,
            tail,
        } => {
            init_logging_from_env()?;
            let query = RsiQuery {
                symbol,
                interval,
                limit,
                period,
                tail,
            };
            print_rsi(query, &FeedConfig::default()).await?;
        }

        Commands::Stats { store, days, json } => {
            init_logging_from_env()?;
            print_stats(&store, days, json).await?;
        }

        Commands::Deposit {
            config,
            store,
            amount,
        } => {
            init_logging_from_env()?;
            let app_config = if config.exists() {
                AppConfig::load(&config)?
            } else {
                AppConfig::default()
            };
            let available = deposit_to_store(&store, &app_config, amount).await?;
            println!("\n✅ 입금 완료: {}", amount);
            println!("가용 자본: {}", available);
        }
    }

    Ok(())
}
