use serde::{Deserialize, Serialize};

/// 战斗规则的可调参数。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CombatConfig {
    /// 每回合开始时抽牌数。
    pub hand_size: u32,
    /// 敌人攻击值的随机浮动幅度（±）。
    pub attack_variance: i32,
    /// BUFF 意图每次提升的攻击加成。
    pub buff_amount: i32,
    /// 机动牌在手牌打空时追加的抽牌数。
    pub maneuver_draw: u32,
    /// DEFEND 意图获得护盾占基础伤害的百分比。
    pub defend_ratio: i32,
    /// ATTACK_DEFEND 意图中伤害与护盾各占的百分比。
    pub split_ratio: i32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            hand_size: 5,
            attack_variance: 1,
            buff_amount: 2,
            maneuver_draw: 1,
            defend_ratio: 100,
            split_ratio: 60,
        }
    }
}

impl CombatConfig {
    pub fn with_hand_size(mut self, hand_size: u32) -> Self {
        self.hand_size = hand_size;
        self
    }

    pub fn with_attack_variance(mut self, variance: i32) -> Self {
        self.attack_variance = variance.max(0);
        self
    }
}
