use std::fmt;

use crate::models::vehicle::Vehicle;

/// 実行（ラン）の状態
///
/// 許される遷移は `Running → Collision` と `Running → Stopped` のみで、
/// 終了状態からは遷移しない。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// 実行中
    Running,
    /// 衝突検知で終了
    Collision,
    /// 衝突なしで終了（時間上限・停止要求）
    Stopped,
}

impl RunStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, RunStatus::Running)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_running()
    }

    /// 状態遷移。終了状態からの遷移や `Running` への遷移はエラー
    pub fn transition(&mut self, next: RunStatus) -> Result<(), StatusError> {
        if self.is_terminal() || next.is_running() {
            return Err(StatusError {
                from: *self,
                to: next,
            });
        }
        *self = next;
        Ok(())
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStatus::Running => "Running",
            RunStatus::Collision => "Collision",
            RunStatus::Stopped => "Stopped",
        };
        f.write_str(s)
    }
}

/// 不正な状態遷移
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusError {
    pub from: RunStatus,
    pub to: RunStatus,
}

impl fmt::Display for StatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "不正な状態遷移: {} -> {}", self.from, self.to)
    }
}

impl std::error::Error for StatusError {}

/// 1ステップ分のスナップショット
///
/// `positions` は記録時点の全車両のディープコピーで、以後の車両の更新には影響されない。
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// 経過シミュレーション時間（秒）
    pub time: f64,
    /// 記録時点の全車両状態
    pub positions: Vec<Vehicle>,
}

impl LogEntry {
    pub fn capture(time: f64, vehicles: &[Vehicle]) -> Self {
        Self {
            time,
            positions: vehicles.to_vec(),
        }
    }
}

/// 1回分の実行記録
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    /// 実行ID（1から単調増加）
    pub run_id: u32,
    /// 実行状態
    pub status: RunStatus,
    /// 時系列順のログ
    pub logs: Vec<LogEntry>,
}

impl RunRecord {
    /// 実行中状態の空の記録を作成
    pub fn new(run_id: u32) -> Self {
        Self {
            run_id,
            status: RunStatus::Running,
            logs: Vec::new(),
        }
    }

    pub fn step_count(&self) -> usize {
        self.logs.len()
    }

    /// 最新のスナップショット
    pub fn last_snapshot(&self) -> Option<&LogEntry> {
        self.logs.last()
    }

    pub fn finalize(&mut self, status: RunStatus) -> Result<(), StatusError> {
        self.status.transition(status)
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            run_id: self.run_id,
            step_count: self.step_count(),
            status: self.status,
        }
    }
}

/// 履歴表示用の実行サマリ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub run_id: u32,
    pub step_count: usize,
    pub status: RunStatus,
}
