//! # Observer モジュール
//!
//! シミュレーション実行中の通知と実時間ペーシングのインターフェースを提供します。
//!
//! エンジンはコンソールへ直接出力せず、進行状況（経過時間と全車両位置）や
//! 衝突警報を `SimulationObserver` 経由で通知します。これによりエンジンは
//! 対話型UIにもテストハーネスにも同じ形で組み込めます。
//!
//! 実行ループのステップ間の待機は `Pacer` に委譲されます。待機はシミュレーション
//! 結果に影響せず、テストでは `NoPacing` を使います。

use std::thread;
use std::time::Duration;

use crate::models::{RunSummary, Vehicle};

/// シミュレーション実行の通知先
///
/// すべてのメソッドにデフォルト実装があるため、必要な通知だけ実装すればよい。
pub trait SimulationObserver {
    /// 実行開始
    fn on_run_start(&mut self, _run_id: u32) {}

    /// 1ステップ完了後の経過時間と全車両の現在位置
    fn on_step(&mut self, _elapsed: f64, _vehicles: &[Vehicle]) {}

    /// 衝突検知
    fn on_collision(&mut self, _elapsed: f64) {}

    /// 最大時間到達
    fn on_time_limit(&mut self, _elapsed: f64) {}

    /// 実行終了（最終状態確定後）
    fn on_run_end(&mut self, _summary: &RunSummary) {}

    /// 協調的な停止要求。ステップ間で確認される
    fn should_stop(&self) -> bool {
        false
    }
}

/// 何もしない通知先
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl SimulationObserver for NullObserver {}

/// ステップ間の待機戦略
pub trait Pacer {
    fn pace(&mut self, time_step_s: f64);
}

/// 待機しない（テスト・バッチ実行用）
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPacing;

impl Pacer for NoPacing {
    fn pace(&mut self, _time_step_s: f64) {}
}

/// 時間刻みと同じだけ実時間で待機する
#[derive(Debug, Clone, Copy)]
pub struct RealTimePacer {
    /// 実時間の倍率（1.0で等速、0.5で2倍速）
    pub scale: f64,
}

impl Default for RealTimePacer {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

impl Pacer for RealTimePacer {
    fn pace(&mut self, time_step_s: f64) {
        let secs = time_step_s * self.scale;
        if secs.is_finite() && secs > 0.0 {
            thread::sleep(Duration::from_secs_f64(secs));
        }
    }
}
