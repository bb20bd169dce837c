// 基本的なデータ型と数学ユーティリティ
pub mod common;

// エージェントの基本インターフェース（trait）定義
pub mod traits;

// 車両と実行記録
pub mod vehicle;
pub mod run;

// 便利な re-export
pub use common::*;
pub use traits::*;
pub use vehicle::Vehicle;
pub use run::{LogEntry, RunRecord, RunStatus, RunSummary, StatusError};
