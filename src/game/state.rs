use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use thiserror::Error;

use super::rng::SeededRng;

/// 玩家一方在动作队列中的固定标识。
pub const PLAYER_ID: &str = "player";

/// 战斗参与者标识（玩家固定为 [`PLAYER_ID`]，敌人使用模板生成的 id）。
pub type CombatantId = String;

/// 卡牌实例上的词缀，修正费用与数值。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Affix {
    pub name: String,
    #[serde(default)]
    pub cost_modifier: i32,
    #[serde(default)]
    pub value_modifier: i32,
}

/// 一张具体的牌：`instance_id` 唯一，`card_id` 指向卡牌目录。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardInstance {
    pub instance_id: String,
    pub card_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affix: Option<Affix>,
}

impl CardInstance {
    pub fn new(instance_id: impl Into<String>, card_id: impl Into<String>) -> Self {
        Self {
            instance_id: instance_id.into(),
            card_id: card_id.into(),
            affix: None,
        }
    }

    pub fn with_affix(mut self, affix: Affix) -> Self {
        self.affix = Some(affix);
        self
    }
}

/// 可被卡牌授予的具名资源。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Maneuver,
    Intel,
    Credits,
}

/// 每回合重置的资源池。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TurnResources {
    #[serde(default)]
    pub maneuvers: u32,
    #[serde(default)]
    pub intel: u32,
}

impl TurnResources {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 原子动作的具体内容，每种动作只携带自己需要的字段。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    DealDamage { amount: i32 },
    RechargeShield { amount: i32 },
    RepairHull { amount: i32 },
    GainEnergy { amount: i32 },
    GainResource { resource: Resource, amount: i32 },
    DrawCards { count: u32 },
}

/// 排队等待结算的原子动作。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Action {
    pub source_id: CombatantId,
    pub target_id: CombatantId,
    pub kind: ActionKind,
}

impl Action {
    pub fn new(
        source_id: impl Into<CombatantId>,
        target_id: impl Into<CombatantId>,
        kind: ActionKind,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            kind,
        }
    }
}

/// 敌人意图类别。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentKind {
    Attack,
    Defend,
    AttackDefend,
    Buff,
}

impl IntentKind {
    pub fn is_attack(self) -> bool {
        matches!(self, IntentKind::Attack | IntentKind::AttackDefend)
    }
}

/// 预览给玩家看的敌人下一步行动。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Intent {
    pub kind: IntentKind,
    #[serde(default)]
    pub damage: i32,
    #[serde(default)]
    pub shield: i32,
    #[serde(default)]
    pub buff: i32,
    pub description: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Reward {
    #[serde(default)]
    pub credits: u32,
    #[serde(default)]
    pub xp: u32,
}

/// 双方共有的生命与护盾。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vitals {
    pub hp: i32,
    pub max_hp: i32,
    pub shield: i32,
    pub max_shield: i32,
    #[serde(default)]
    pub dead: bool,
}

/// 一次伤害结算的明细。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageReport {
    pub absorbed: i32,
    pub hull_damage: i32,
    pub destroyed: bool,
}

impl Vitals {
    pub fn new(hp: i32, max_hp: i32, shield: i32, max_shield: i32) -> Self {
        let max_hp = max_hp.max(0);
        let max_shield = max_shield.max(0);
        let hp = hp.clamp(0, max_hp);
        Self {
            hp,
            max_hp,
            shield: shield.clamp(0, max_shield),
            max_shield,
            dead: hp <= 0,
        }
    }

    pub fn full(max_hp: i32, max_shield: i32) -> Self {
        Self::new(max_hp, max_hp, max_shield, max_shield)
    }

    /// 护盾先吸收 `min(shield, amount)`，剩余部分扣减船体，船体最低为 0。
    pub fn take_damage(&mut self, amount: i32) -> DamageReport {
        let amount = amount.max(0);
        let absorbed = self.shield.min(amount);
        self.shield -= absorbed;
        let leftover = amount - absorbed;
        let hull_damage = leftover.min(self.hp);
        self.hp -= hull_damage;
        let destroyed = !self.dead && self.hp <= 0;
        if self.hp <= 0 {
            self.dead = true;
        }
        DamageReport {
            absorbed,
            hull_damage,
            destroyed,
        }
    }

    /// 返回实际恢复的护盾值。
    pub fn recharge_shield(&mut self, amount: i32) -> i32 {
        let before = self.shield;
        self.shield = (self.shield + amount.max(0)).min(self.max_shield);
        self.shield - before
    }

    /// 返回实际修复的船体值。
    pub fn repair_hull(&mut self, amount: i32) -> i32 {
        let before = self.hp;
        self.hp = (self.hp + amount.max(0)).min(self.max_hp);
        self.hp - before
    }
}

/// 玩家在战斗中的状态，包括能量与四个牌堆。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerCombatant {
    pub id: CombatantId,
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(flatten)]
    pub vitals: Vitals,
    pub energy: i32,
    pub max_energy: i32,
    #[serde(default)]
    pub resources: TurnResources,
    /// 战斗中获得的信用点，战斗结束后带回主线。
    #[serde(default)]
    pub credits_earned: u32,
    #[serde(default)]
    pub hand: Vec<CardInstance>,
    #[serde(default)]
    pub draw_pile: Vec<CardInstance>,
    #[serde(default)]
    pub discard_pile: Vec<CardInstance>,
    #[serde(default)]
    pub exile_pile: Vec<CardInstance>,
}

impl PlayerCombatant {
    pub fn find_card_in_hand_index(&self, instance_id: &str) -> Option<usize> {
        self.hand
            .iter()
            .position(|card| card.instance_id == instance_id)
    }

    pub fn card_count(&self) -> usize {
        self.hand.len() + self.draw_pile.len() + self.discard_pile.len() + self.exile_pile.len()
    }

    pub fn all_cards(&self) -> impl Iterator<Item = &CardInstance> {
        self.hand
            .iter()
            .chain(self.draw_pile.iter())
            .chain(self.discard_pile.iter())
            .chain(self.exile_pile.iter())
    }
}

/// 敌人在战斗中的状态，包括循环行为模式与下一步意图。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnemyCombatant {
    pub id: CombatantId,
    pub template_id: String,
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(flatten)]
    pub vitals: Vitals,
    pub base_damage: i32,
    #[serde(default)]
    pub reward: Reward,
    pub pattern: Vec<IntentKind>,
    #[serde(default)]
    pub pattern_index: usize,
    #[serde(default)]
    pub attack_buff: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
}

impl EnemyCombatant {
    pub fn current_pattern(&self) -> Option<IntentKind> {
        if self.pattern.is_empty() {
            return None;
        }
        self.pattern.get(self.pattern_index % self.pattern.len()).copied()
    }

    pub fn advance_pattern(&mut self) {
        if !self.pattern.is_empty() {
            self.pattern_index = (self.pattern_index + 1) % self.pattern.len();
        }
    }
}

/// 主线传入的玩家快照（船体、护盾、牌组）。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerSnapshot {
    pub name: String,
    #[serde(default)]
    pub image: String,
    pub hull: i32,
    pub max_hull: i32,
    pub shield: i32,
    pub max_shield: i32,
    pub max_energy: i32,
    #[serde(default)]
    pub credits: u32,
    #[serde(default)]
    pub xp: u32,
    pub deck: Vec<CardInstance>,
}

/// 战斗阶段。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CombatPhase {
    PlayerInput,
    Resolution,
    GameOver,
}

impl Default for CombatPhase {
    fn default() -> Self {
        Self::PlayerInput
    }
}

/// 战斗结束后交还给主线的结算结果。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CombatSettlement {
    pub victory: bool,
    pub hull: i32,
    pub shield: i32,
    pub credits: u32,
    pub xp: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Error)]
#[serde(tag = "type")]
pub enum IntegrityError {
    #[error("combatant {id} has dead={dead} but hp={hp}")]
    DeadFlagMismatch { id: CombatantId, hp: i32, dead: bool },
    #[error("combatant {id} has {stat}={value} outside [0, {max}]")]
    StatOutOfRange {
        id: CombatantId,
        stat: String,
        value: i32,
        max: i32,
    },
    #[error("card instance {instance_id} appears more than once")]
    DuplicateCardInstance { instance_id: String },
    #[error("{pending} actions are still queued at rest")]
    PendingQueue { pending: usize },
    #[error("victory flag set before the combat is over")]
    PrematureVictory,
}

/// 一场战斗的完整快照。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CombatState {
    pub turn: u32,
    pub phase: CombatPhase,
    pub rng_seed: u32,
    pub rng_state: u32,
    pub player: PlayerCombatant,
    pub enemy: EnemyCombatant,
    #[serde(default, skip_serializing_if = "VecDeque::is_empty")]
    pub queue: VecDeque<Action>,
    #[serde(default)]
    pub log: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub victory: Option<bool>,
}

impl CombatState {
    pub fn record(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
    }

    pub fn is_finished(&self) -> bool {
        self.phase == CombatPhase::GameOver
    }

    /// 从快照中恢复随机数生成器。
    pub fn rng(&self) -> SeededRng {
        SeededRng::from_state(self.rng_state)
    }

    /// 把消耗后的随机数状态写回快照。
    pub fn store_rng(&mut self, rng: &SeededRng) {
        self.rng_state = rng.state();
    }

    pub fn vitals(&self, id: &str) -> Option<&Vitals> {
        if id == self.player.id {
            Some(&self.player.vitals)
        } else if id == self.enemy.id {
            Some(&self.enemy.vitals)
        } else {
            None
        }
    }

    pub fn vitals_mut(&mut self, id: &str) -> Option<&mut Vitals> {
        if id == self.player.id {
            Some(&mut self.player.vitals)
        } else if id == self.enemy.id {
            Some(&mut self.enemy.vitals)
        } else {
            None
        }
    }

    pub fn name_of<'a>(&'a self, id: &'a str) -> &'a str {
        if id == self.player.id {
            &self.player.name
        } else if id == self.enemy.id {
            &self.enemy.name
        } else {
            id
        }
    }

    pub fn is_valid_target(&self, id: &str) -> bool {
        self.vitals(id).map(|vitals| !vitals.dead).unwrap_or(false)
    }

    pub fn settlement(&self) -> Option<CombatSettlement> {
        if !self.is_finished() {
            return None;
        }
        let victory = self.victory.unwrap_or(false);
        let reward = if victory {
            self.enemy.reward
        } else {
            Reward::default()
        };
        Some(CombatSettlement {
            victory,
            hull: self.player.vitals.hp,
            shield: self.player.vitals.shield,
            credits: self.player.credits_earned.saturating_add(reward.credits),
            xp: reward.xp,
        })
    }

    pub fn integrity_check(&self) -> Result<(), IntegrityError> {
        for (id, vitals) in [
            (&self.player.id, &self.player.vitals),
            (&self.enemy.id, &self.enemy.vitals),
        ] {
            if vitals.dead != (vitals.hp <= 0) {
                return Err(IntegrityError::DeadFlagMismatch {
                    id: id.clone(),
                    hp: vitals.hp,
                    dead: vitals.dead,
                });
            }
            for (stat, value, max) in [
                ("hp", vitals.hp, vitals.max_hp),
                ("shield", vitals.shield, vitals.max_shield),
            ] {
                if value < 0 || value > max {
                    return Err(IntegrityError::StatOutOfRange {
                        id: id.clone(),
                        stat: stat.into(),
                        value,
                        max,
                    });
                }
            }
        }

        if self.player.energy < 0 || self.player.energy > self.player.max_energy {
            return Err(IntegrityError::StatOutOfRange {
                id: self.player.id.clone(),
                stat: "energy".into(),
                value: self.player.energy,
                max: self.player.max_energy,
            });
        }

        let mut seen = HashSet::new();
        for card in self.player.all_cards() {
            if !seen.insert(card.instance_id.as_str()) {
                return Err(IntegrityError::DuplicateCardInstance {
                    instance_id: card.instance_id.clone(),
                });
            }
        }

        if !self.queue.is_empty() {
            return Err(IntegrityError::PendingQueue {
                pending: self.queue.len(),
            });
        }

        if self.victory.is_some() && !self.is_finished() {
            return Err(IntegrityError::PrematureVictory);
        }

        Ok(())
    }
}
