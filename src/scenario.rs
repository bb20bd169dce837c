use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::models::Vehicle;

/// シナリオメタデータ
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScenarioMeta {
    pub version: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl Default for ScenarioMeta {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: "default".to_string(),
            description: String::new(),
        }
    }
}

/// シミュレーション設定
///
/// エンジン生成時に渡され、エンジンの生存期間中は変更されない。
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// 1ステップの時間刻み（秒）
    pub time_step_s: f64,
    /// 衝突判定で車両長に加える安全距離（メートル）
    pub safety_distance_m: f64,
    /// 速さの単位ラベル（表示のみ、換算しない）
    pub speed_unit: String,
    /// ステップごとのスナップショット記録を行うか
    pub enable_logging: bool,
    /// 1回の実行の最大シミュレーション時間（秒）
    pub max_run_time_s: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            time_step_s: 1.0,
            safety_distance_m: 5.0,
            speed_unit: "m/s".to_string(),
            enable_logging: true,
            max_run_time_s: 5.0,
        }
    }
}

impl Settings {
    /// 設定値の検証
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if !self.time_step_s.is_finite() || self.time_step_s <= 0.0 {
            return Err(ScenarioError::ValidationError(
                "time_step_s must be positive".to_string(),
            ));
        }
        if !self.max_run_time_s.is_finite() || self.max_run_time_s <= 0.0 {
            return Err(ScenarioError::ValidationError(
                "max_run_time_s must be positive".to_string(),
            ));
        }
        if !self.safety_distance_m.is_finite() || self.safety_distance_m < 0.0 {
            return Err(ScenarioError::ValidationError(
                "safety_distance_m must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// 完全なシナリオ設定
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub meta: ScenarioMeta,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub vehicles: Vec<Vehicle>,
}

impl ScenarioConfig {
    /// YAMLファイルからシナリオ設定を読み込み
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| ScenarioError::IoError(path.to_path_buf(), e))?;

        let config = Self::from_yaml_str(&contents)
            .map_err(|e| ScenarioError::ParseError(path.to_path_buf(), e))?;

        config.validate()?;

        Ok(config)
    }

    /// YAML文字列を解析（検証は行わない）
    pub fn from_yaml_str(contents: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(contents)
    }

    /// 設定の基本的な検証
    pub fn validate(&self) -> Result<(), ScenarioError> {
        self.settings.validate()?;

        for vehicle in &self.vehicles {
            let fields = [
                vehicle.x,
                vehicle.y,
                vehicle.speed,
                vehicle.direction,
                vehicle.length,
            ];
            if fields.iter().any(|v| !v.is_finite()) {
                return Err(ScenarioError::ValidationError(format!(
                    "Vehicle {} has a non-finite value",
                    vehicle.id
                )));
            }
            if vehicle.length < 0.0 {
                return Err(ScenarioError::ValidationError(format!(
                    "Vehicle {} length {} is negative",
                    vehicle.id, vehicle.length
                )));
            }
        }

        Ok(())
    }

    /// シナリオの概要を表示
    pub fn print_summary(&self) {
        println!("=== シナリオ情報 ===");
        println!("名前: {}", self.meta.name);
        if !self.meta.description.is_empty() {
            println!("説明: {}", self.meta.description);
        }
        println!("バージョン: {}", self.meta.version);
        println!();

        println!("=== シミュレーション設定 ===");
        println!("時間刻み: {:.3}秒", self.settings.time_step_s);
        println!("安全距離: {:.1}m", self.settings.safety_distance_m);
        println!("速度単位: {}", self.settings.speed_unit);
        println!(
            "スナップショット記録: {}",
            if self.settings.enable_logging { "有効" } else { "無効" }
        );
        println!("最大時間: {:.1}秒", self.settings.max_run_time_s);
        println!();

        println!("=== 車両 ===");
        println!("車両数: {}台", self.vehicles.len());
        for v in &self.vehicles {
            println!(
                "  ID {}: ({:.1}, {:.1}) 速さ {} {} 方位 {}度 全長 {}m",
                v.id, v.x, v.y, v.speed, self.settings.speed_unit, v.direction, v.length
            );
        }
    }
}

/// シナリオ読み込みエラー
#[derive(Debug)]
pub enum ScenarioError {
    FileNotFound(std::path::PathBuf),
    IoError(std::path::PathBuf, std::io::Error),
    ParseError(std::path::PathBuf, serde_yaml::Error),
    ValidationError(String),
}

impl std::fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScenarioError::FileNotFound(path) => {
                write!(f, "シナリオファイルが見つかりません: {}", path.display())
            }
            ScenarioError::IoError(path, err) => {
                write!(f, "ファイル読み込みエラー {}: {}", path.display(), err)
            }
            ScenarioError::ParseError(path, err) => {
                write!(f, "YAML解析エラー {}: {}", path.display(), err)
            }
            ScenarioError::ValidationError(msg) => {
                write!(f, "設定検証エラー: {}", msg)
            }
        }
    }
}

impl std::error::Error for ScenarioError {}
