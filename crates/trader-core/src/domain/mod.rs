//! RSI 감시 및 모의 매매 도메인 모델.

mod alert;
mod ledger;
mod position;
mod reading;
mod settings;
mod snapshot;
mod statistics;

pub use alert::*;
pub use ledger::*;
pub use position::*;
pub use reading::*;
pub use settings::*;
pub use snapshot::*;
pub use statistics::*;
