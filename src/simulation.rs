//! # Simulation モジュール
//!
//! 車両シミュレーションの中核となるシミュレーションエンジンを提供します。
//!
//! 固定時間刻み（Δt）で全車両を等速直線運動させ、各ステップのスナップショットを
//! 記録しながら車両間の近接（衝突）を判定します。実行ごとに `RunRecord` を作成し、
//! 終了後は履歴に保存して後から再生できるようにします。
//!
//! ## 主要機能
//!
//! - **車両登録**: 実行対象となる車両（ロスター）の管理
//! - **1ステップ処理**: 位置更新とスナップショット記録
//! - **衝突判定**: 全ペアの距離を安全距離込みのしきい値と比較
//! - **実行ループ**: 衝突・最大時間・停止要求までステップを繰り返す
//! - **履歴と再生**: 保存済み実行の一覧とスナップショット列の取得
//!
//! ## 実行ループの処理順序
//!
//! 1. 全車両の位置を更新し、スナップショットを記録
//! 2. 進行状況を通知
//! 3. 最新スナップショット（記録無効時は現在の車両）で衝突判定
//! 4. ペーシング待機
//! 5. 最大時間・停止要求の判定
//!
//! ## 使用例
//!
//! ```rust
//! use vehsim::models::Vehicle;
//! use vehsim::observer::{NoPacing, NullObserver};
//! use vehsim::scenario::Settings;
//! use vehsim::simulation::SimulationEngine;
//!
//! let mut engine = SimulationEngine::new(Settings::default());
//! engine.add_vehicle(Vehicle::new(1, 0.0, 0.0, 1.0, 0.0, 2.0));
//! engine.add_vehicle(Vehicle::new(2, 10.0, 0.0, 1.0, 180.0, 2.0));
//!
//! let summary = engine.start(&mut NullObserver, &mut NoPacing)?;
//! let logs = engine.replay(summary.run_id)?;
//! ```

use crate::models::*;
use crate::observer::{Pacer, SimulationObserver};
use crate::scenario::Settings;
use tracing::{debug, info, trace, warn};

/// 実行に必要な最小車両数
pub const MIN_VEHICLES: usize = 2;

/// 浮動小数の累積誤差で最大時間判定が1ステップ遅れないための許容幅（Δtに対する比率）
const TIME_LIMIT_TOLERANCE: f64 = 1e-6;

pub struct SimulationEngine {
    settings: Settings,
    vehicles: Vec<Vehicle>,
    past_runs: Vec<RunRecord>,
    running: bool,
    next_run_id: u32,
}

impl SimulationEngine {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            vehicles: Vec::new(),
            past_runs: Vec::new(),
            running: false,
            next_run_id: 1,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// 車両をロスターの末尾に追加（検証なし）
    pub fn add_vehicle(&mut self, vehicle: Vehicle) {
        debug!(
            "車両追加: ID {} ({:.1}, {:.1}) 速さ {} 方位 {}度",
            vehicle.id, vehicle.x, vehicle.y, vehicle.speed, vehicle.direction
        );
        self.vehicles.push(vehicle);
    }

    /// 現在のロスター（登録順）
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// 速さ・方位を外部から変更するための可変参照
    pub fn vehicle_mut(&mut self, id: i32) -> Option<&mut Vehicle> {
        self.vehicles.iter_mut().find(|v| v.id == id)
    }

    /// シミュレーションを1ステップ進める
    ///
    /// `elapsed` を時間刻み分進め、全車両を移動させる。記録が有効な場合は
    /// 全車両のコピーを `run.logs` に追加する。実行ループ外から直接呼び出してもよい。
    pub fn step(&mut self, elapsed: &mut f64, run: &mut RunRecord) {
        let dt = self.settings.time_step_s;
        *elapsed += dt;

        for vehicle in &mut self.vehicles {
            vehicle.move_agent(dt);
        }

        if self.settings.enable_logging {
            run.logs.push(LogEntry::capture(*elapsed, &self.vehicles));
        }
    }

    /// 車両集合内に衝突しているペアがあるか
    ///
    /// 全ペアについて距離が `max(全長) + 安全距離` 以下かを調べ、最初に見つかった時点で真を返す。
    pub fn check_collision(&self, vehicles: &[Vehicle]) -> bool {
        let safety = self.settings.safety_distance_m;
        for (i, a) in vehicles.iter().enumerate() {
            for b in &vehicles[i + 1..] {
                if a.is_colliding_with(b, safety) {
                    trace!("衝突ペア: {} - {}", a.id, b.id);
                    return true;
                }
            }
        }
        false
    }

    /// 実行ループを開始し、終了した実行を履歴に保存する
    ///
    /// 車両が2台未満の場合は何もせず `NotEnoughVehicles` を返す（実行IDも消費しない）。
    pub fn start(
        &mut self,
        observer: &mut dyn SimulationObserver,
        pacer: &mut dyn Pacer,
    ) -> Result<RunSummary, SimulationError> {
        if self.vehicles.len() < MIN_VEHICLES {
            warn!(
                "車両が不足しています: {}台 (必要: {}台)",
                self.vehicles.len(),
                MIN_VEHICLES
            );
            return Err(SimulationError::NotEnoughVehicles {
                required: MIN_VEHICLES,
                available: self.vehicles.len(),
            });
        }

        let mut run = RunRecord::new(self.next_run_id);
        self.next_run_id += 1;
        self.running = true;

        info!(
            "=== 実行開始: Run {} (車両 {}台) ===",
            run.run_id,
            self.vehicles.len()
        );
        observer.on_run_start(run.run_id);

        let mut elapsed = 0.0;
        let final_status = self.run_loop(&mut elapsed, &mut run, observer, pacer);
        self.running = false;

        run.finalize(final_status)?;
        let summary = run.summary();
        self.past_runs.push(run);

        info!(
            "=== 実行終了: Run {} 状態 {} (ステップ数: {}, 経過時間: {:.2}秒) ===",
            summary.run_id, summary.status, summary.step_count, elapsed
        );
        observer.on_run_end(&summary);

        Ok(summary)
    }

    fn run_loop(
        &mut self,
        elapsed: &mut f64,
        run: &mut RunRecord,
        observer: &mut dyn SimulationObserver,
        pacer: &mut dyn Pacer,
    ) -> RunStatus {
        loop {
            self.step(elapsed, run);
            observer.on_step(*elapsed, &self.vehicles);
            trace!("時刻: {:.2}秒 (記録数: {})", elapsed, run.step_count());

            // 記録が無効な場合は現在の車両で判定する
            let collided = match run.last_snapshot() {
                Some(entry) if self.settings.enable_logging => {
                    self.check_collision(&entry.positions)
                }
                _ => self.check_collision(&self.vehicles),
            };

            if collided {
                warn!("衝突検知: Run {} 時刻 {:.2}秒", run.run_id, elapsed);
                observer.on_collision(*elapsed);
                return RunStatus::Collision;
            }

            pacer.pace(self.settings.time_step_s);

            if self.time_limit_reached(*elapsed) {
                info!("最大シミュレーション時間に到達: {:.2}秒", elapsed);
                observer.on_time_limit(*elapsed);
                return RunStatus::Stopped;
            }

            if observer.should_stop() {
                info!("停止要求により終了: 時刻 {:.2}秒", elapsed);
                return RunStatus::Stopped;
            }
        }
    }

    fn time_limit_reached(&self, elapsed: f64) -> bool {
        let tolerance = self.settings.time_step_s * TIME_LIMIT_TOLERANCE;
        elapsed + tolerance >= self.settings.max_run_time_s
    }

    /// 保存済み実行の一覧（保存順）
    pub fn history(&self) -> Vec<RunSummary> {
        self.past_runs.iter().map(RunRecord::summary).collect()
    }

    /// 実行IDで保存済み実行を検索
    pub fn run(&self, run_id: u32) -> Option<&RunRecord> {
        self.past_runs.iter().find(|r| r.run_id == run_id)
    }

    /// 保存済み実行のスナップショット列を時系列順で取得
    pub fn replay(&self, run_id: u32) -> Result<&[LogEntry], SimulationError> {
        self.run(run_id)
            .map(|r| r.logs.as_slice())
            .ok_or(SimulationError::RunNotFound(run_id))
    }
}

/// シミュレーションエラー
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    NotEnoughVehicles { required: usize, available: usize },
    RunNotFound(u32),
    InvalidTransition(StatusError),
}

impl std::fmt::Display for SimulationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimulationError::NotEnoughVehicles { required, available } => {
                write!(
                    f,
                    "シミュレーションには{}台以上の車両が必要です (現在: {}台)",
                    required, available
                )
            }
            SimulationError::RunNotFound(run_id) => {
                write!(f, "Run ID {} が見つかりません", run_id)
            }
            SimulationError::InvalidTransition(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for SimulationError {}

impl From<StatusError> for SimulationError {
    fn from(err: StatusError) -> Self {
        SimulationError::InvalidTransition(err)
    }
}
