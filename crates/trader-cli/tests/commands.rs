//! 저장소 기반 명령어 테스트.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tempfile::TempDir;
use trader_cli::commands::deposit::deposit_to_store;
use trader_cli::commands::stats::print_stats;
use trader_core::{AppConfig, DepositKind};
use trader_data::{JsonFileStore, PersistenceSink};

fn unfunded_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auto_trader.settings.capital = Decimal::ZERO;
    config
}

#[tokio::test]
async fn test_deposits_accumulate_in_json_store() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("store.json");
    let config = unfunded_config();

    assert_eq!(deposit_to_store(&path, &config, dec!(1000)).await.unwrap(), dec!(1000));
    assert_eq!(deposit_to_store(&path, &config, dec!(250.5)).await.unwrap(), dec!(1250.5));

    let store = JsonFileStore::open(&path).await.unwrap();
    let deposits = store.load_deposits().await.unwrap();
    assert_eq!(deposits.len(), 2);
    assert!(deposits.iter().all(|d| d.kind == DepositKind::Deposit));
}

#[tokio::test]
async fn test_first_deposit_records_configured_capital() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");
    let config = AppConfig::default();

    assert_eq!(deposit_to_store(&path, &config, dec!(250)).await.unwrap(), dec!(1250));
    assert_eq!(deposit_to_store(&path, &config, dec!(50)).await.unwrap(), dec!(1300));

    let store = JsonFileStore::open(&path).await.unwrap();
    let amounts: Vec<Decimal> = store
        .load_deposits()
        .await
        .unwrap()
        .iter()
        .map(|d| d.amount)
        .collect();
    assert_eq!(amounts, vec![dec!(1000), dec!(250), dec!(50)]);
}

#[tokio::test]
async fn test_non_positive_deposit_is_rejected_and_not_written() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");
    let config = AppConfig::default();

    assert!(deposit_to_store(&path, &config, dec!(0)).await.is_err());
    assert!(deposit_to_store(&path, &config, dec!(-5)).await.is_err());

    let store = JsonFileStore::open(&path).await.unwrap();
    assert!(store.load_deposits().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_stats_on_empty_and_funded_store() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");

    print_stats(&path, None, false).await.unwrap();
    deposit_to_store(&path, &unfunded_config(), dec!(500)).await.unwrap();
    print_stats(&path, Some(7), false).await.unwrap();
    print_stats(&path, Some(7), true).await.unwrap();
}
