//! 모의 매매 기록 저장.
//!
//! 이 crate는 다음을 제공합니다:
//! - `PersistenceSink` 저장소 인터페이스
//! - 메모리 저장소
//! - JSON 파일 저장소 (임시 파일 + rename)

pub mod error;
pub mod sink;
pub mod storage;

pub use error::{DataError, Result};
pub use sink::PersistenceSink;
pub use storage::json_file::JsonFileStore;
pub use storage::memory::MemoryStore;

use std::sync::Arc;
use trader_core::{PersistenceBackend, PersistenceConfig};

/// 설정에 맞는 저장소를 엽니다.
pub async fn open_store(config: &PersistenceConfig) -> Result<Arc<dyn PersistenceSink>> {
    let store: Arc<dyn PersistenceSink> = match config.backend {
        PersistenceBackend::Memory => Arc::new(MemoryStore::new()),
        PersistenceBackend::Json => Arc::new(JsonFileStore::open(&config.path).await?),
    };
    Ok(store)
}
