//! 敌人 AI：按固定循环模式预览并执行意图。

pub mod intent;

pub use intent::{preview_intent, process_enemy_turn, set_enemy_intent, EnemyTurn};
