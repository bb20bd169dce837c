use std::ops::{Add, Sub};

/// 2次元位置を表す構造体（XY平面）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position2D {
    pub x: f64, // m
    pub y: f64, // m
}

impl Position2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// 2点間のユークリッド距離
    pub fn distance(&self, other: &Position2D) -> f64 {
        let d = *other - *self;
        (d.x.powi(2) + d.y.powi(2)).sqrt()
    }
}

impl Add for Position2D {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Position2D {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

/// 数学ユーティリティ関数
pub mod math_utils {
    /// 度をラジアンに変換
    pub fn deg_to_rad(degrees: f64) -> f64 {
        degrees * std::f64::consts::PI / 180.0
    }

    /// 方位角（度、+X軸が0度・反時計回り）から単位ベクトルを求める
    pub fn heading_unit_vector(direction_deg: f64) -> (f64, f64) {
        let rad = deg_to_rad(direction_deg);
        (rad.cos(), rad.sin())
    }
}
