//! コンソール表示（車両一覧・履歴・再生・実行中の進行表示）
//!
//! 出力先は任意の `io::Write` で、標準出力以外にもテスト用のバッファへ書き出せる。

use std::io::{self, Write};

use crate::models::{LogEntry, RunSummary, Vehicle};
use crate::observer::SimulationObserver;

const SEPARATOR: &str = "---------------------------------";

/// 登録済み車両の一覧
pub fn write_vehicles<W: Write>(out: &mut W, vehicles: &[Vehicle], speed_unit: &str) -> io::Result<()> {
    if vehicles.is_empty() {
        return writeln!(out, "登録済みの車両はありません。");
    }
    for v in vehicles {
        writeln!(
            out,
            "ID: {} 位置({}, {}) 速さ: {} {} 方位: {}度 全長: {}m",
            v.id, v.x, v.y, v.speed, speed_unit, v.direction, v.length
        )?;
    }
    Ok(())
}

/// 実行履歴の一覧
pub fn write_history<W: Write>(out: &mut W, history: &[RunSummary]) -> io::Result<()> {
    if history.is_empty() {
        return writeln!(out, "実行履歴はありません。");
    }
    for r in history {
        writeln!(
            out,
            "Run ID: {} ステップ数: {} 状態: {}",
            r.run_id, r.step_count, r.status
        )?;
    }
    Ok(())
}

/// 保存済み実行の再生
pub fn write_replay<W: Write>(out: &mut W, run_id: u32, logs: &[LogEntry]) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "=== Run {} の再生 ===", run_id)?;
    if logs.is_empty() {
        writeln!(out, "(スナップショットは記録されていません)")?;
    }
    for entry in logs {
        write_positions(out, entry.time, &entry.positions)?;
    }
    Ok(())
}

fn write_positions<W: Write>(out: &mut W, time: f64, vehicles: &[Vehicle]) -> io::Result<()> {
    writeln!(out, "時刻: {}秒", time)?;
    for v in vehicles {
        writeln!(out, "  車両 {} 位置({}, {})", v.id, v.x, v.y)?;
    }
    writeln!(out, "{}", SEPARATOR)
}

/// 実行中の進行状況をコンソールへ表示する通知先
///
/// 書き込みエラーは最初の1件だけ保持し、以降の出力は行わない。
pub struct ConsoleObserver<W: Write> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> ConsoleObserver<W> {
    pub fn new(out: W) -> Self {
        Self { out, error: None }
    }

    /// 表示中に発生した書き込みエラー
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit<F>(&mut self, f: F)
    where
        F: FnOnce(&mut W) -> io::Result<()>,
    {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = f(&mut self.out).and_then(|_| self.out.flush()) {
            self.error = Some(e);
        }
    }
}

impl<W: Write> SimulationObserver for ConsoleObserver<W> {
    fn on_run_start(&mut self, run_id: u32) {
        self.emit(|out| writeln!(out, "\nシミュレーション開始 (Run {})...\n", run_id));
    }

    fn on_step(&mut self, elapsed: f64, vehicles: &[Vehicle]) {
        self.emit(|out| write_positions(out, elapsed, vehicles));
    }

    fn on_collision(&mut self, _elapsed: f64) {
        self.emit(|out| writeln!(out, "\n[警告] 衝突の危険！シミュレーションを停止します。"));
    }

    fn on_time_limit(&mut self, _elapsed: f64) {
        self.emit(|out| writeln!(out, "\n最大シミュレーション時間に到達しました。停止します。"));
    }

    fn on_run_end(&mut self, summary: &RunSummary) {
        self.emit(|out| writeln!(out, "\nシミュレーション終了。状態: {}", summary.status));
    }
}
