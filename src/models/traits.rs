use crate::models::common::*;

/// 移動可能なエージェントのインターフェース
pub trait IMovable {
    /// 1ステップ分の移動処理
    fn move_agent(&mut self, dt: f64);

    /// 現在位置の取得
    fn get_position(&self) -> Position2D;

    /// dt秒間の変位量
    fn displacement(&self, dt: f64) -> Position2D;
}

/// 衝突検知のインターフェース
pub trait ICollision {
    /// 衝突半径として扱う寸法（メートル）
    fn collision_radius(&self) -> f64;

    /// 相手との距離が `max(半径) + safety_distance` 以下なら衝突とみなす
    fn is_colliding_with(&self, other: &Self, safety_distance: f64) -> bool;
}
