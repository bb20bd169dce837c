use serde::{Deserialize, Serialize};

use crate::models::{
    common::{Position2D, math_utils},
    traits::{ICollision, IMovable},
};

/// 車両エージェント
///
/// 平面上を一定の速度・方位で等速直線運動する点状の車両です。
/// 位置はステップ処理によってのみ更新され、速度と方位は外部から設定されない限り一定です。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    /// 車両ID（一意性は呼び出し側の責任）
    pub id: i32,
    /// X座標（メートル）
    pub x: f64,
    /// Y座標（メートル）
    pub y: f64,
    /// 速さ（単位は設定の `speed_unit` で示すラベルのみ、換算はしない）
    pub speed: f64,
    /// 方位（度）。0度が+X軸、反時計回りに増加
    pub direction: f64,
    /// 車両長（メートル）。衝突半径の代用として使う
    pub length: f64,
}

impl Vehicle {
    pub fn new(id: i32, x: f64, y: f64, speed: f64, direction: f64, length: f64) -> Self {
        Self {
            id,
            x,
            y,
            speed,
            direction,
            length,
        }
    }
}

impl IMovable for Vehicle {
    fn move_agent(&mut self, dt: f64) {
        let next = self.get_position() + self.displacement(dt);
        self.x = next.x;
        self.y = next.y;
    }

    fn get_position(&self) -> Position2D {
        Position2D::new(self.x, self.y)
    }

    fn displacement(&self, dt: f64) -> Position2D {
        let (ux, uy) = math_utils::heading_unit_vector(self.direction);
        Position2D::new(ux * self.speed * dt, uy * self.speed * dt)
    }
}

impl ICollision for Vehicle {
    fn collision_radius(&self) -> f64 {
        self.length
    }

    fn is_colliding_with(&self, other: &Self, safety_distance: f64) -> bool {
        let distance = self.get_position().distance(&other.get_position());
        let threshold = self.collision_radius().max(other.collision_radius()) + safety_distance;
        distance <= threshold
    }
}
