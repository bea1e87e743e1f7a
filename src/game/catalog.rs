//! 卡牌与敌人模板目录。
//!
//! 目录在加载时校验：效果类别是封闭的标签联合，未知类别直接解析失败，
//! 不会在出牌时静默变成空操作。

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::state::{IntentKind, Resource, Reward};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
}

impl Default for Rarity {
    fn default() -> Self {
        Rarity::Common
    }
}

/// 卡牌效果类别。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectKind {
    /// 对目标造成伤害。
    Damage,
    /// 为自己充能护盾。
    Shield,
    /// 修复自己的船体。
    Repair,
    /// 获得能量。
    Energy,
    /// 获得具名资源；`draw_on_empty_hand` 时若这张牌打出后手牌为空，追加抽一张。
    Resource {
        resource: Resource,
        #[serde(default)]
        draw_on_empty_hand: bool,
    },
    /// 修复船体后放逐自身。
    RepairExile,
    /// 非战斗船员：不产生动作，返还自身费用。
    Crew,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardData {
    pub id: String,
    pub name: String,
    pub cost: i32,
    #[serde(default)]
    pub value: i32,
    pub effect: EffectKind,
    #[serde(default)]
    pub rarity: Rarity,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub exile_on_play: bool,
}

impl CardData {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        cost: i32,
        value: i32,
        effect: EffectKind,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            cost,
            value,
            effect,
            rarity: Rarity::Common,
            description: String::new(),
            exile_on_play: false,
        }
    }

    pub fn with_rarity(mut self, rarity: Rarity) -> Self {
        self.rarity = rarity;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn exiled_on_play(mut self) -> Self {
        self.exile_on_play = true;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnemyTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image: String,
    pub max_hp: i32,
    #[serde(default)]
    pub max_shield: i32,
    pub base_damage: i32,
    #[serde(default)]
    pub reward: Reward,
    pub pattern: Vec<IntentKind>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Error)]
#[serde(tag = "type")]
pub enum CatalogError {
    #[error("catalog could not be parsed: {message}")]
    Parse { message: String },
    #[error("catalog key {key} holds record with id {id}")]
    IdMismatch { key: String, id: String },
    #[error("enemy template {id} has an empty pattern")]
    EmptyPattern { id: String },
    #[error("enemy template {id} must have positive max hp, got {max_hp}")]
    InvalidMaxHp { id: String, max_hp: i32 },
    #[error("enemy template {id} has negative {stat}")]
    NegativeStat { id: String, stat: String },
    #[error("card {id} has negative base cost {cost}")]
    NegativeCost { id: String, cost: i32 },
}

/// 只读的内容目录。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Catalog {
    #[serde(default)]
    pub cards: BTreeMap<String, CardData>,
    #[serde(default)]
    pub enemies: BTreeMap<String, EnemyTemplate>,
}

static BUILTIN: Lazy<Catalog> = Lazy::new(Catalog::sample);

impl Catalog {
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(json).map_err(|error| CatalogError::Parse {
            message: error.to_string(),
        })?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// 内置示例目录。
    pub fn builtin() -> &'static Catalog {
        &BUILTIN
    }

    pub fn card(&self, card_id: &str) -> Option<&CardData> {
        self.cards.get(card_id)
    }

    pub fn enemy(&self, template_id: &str) -> Option<&EnemyTemplate> {
        self.enemies.get(template_id)
    }

    pub fn with_card(mut self, card: CardData) -> Self {
        self.cards.insert(card.id.clone(), card);
        self
    }

    pub fn with_enemy(mut self, enemy: EnemyTemplate) -> Self {
        self.enemies.insert(enemy.id.clone(), enemy);
        self
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        for (key, card) in &self.cards {
            if key != &card.id {
                return Err(CatalogError::IdMismatch {
                    key: key.clone(),
                    id: card.id.clone(),
                });
            }
            if card.cost < 0 {
                return Err(CatalogError::NegativeCost {
                    id: card.id.clone(),
                    cost: card.cost,
                });
            }
        }

        for (key, enemy) in &self.enemies {
            if key != &enemy.id {
                return Err(CatalogError::IdMismatch {
                    key: key.clone(),
                    id: enemy.id.clone(),
                });
            }
            if enemy.pattern.is_empty() {
                return Err(CatalogError::EmptyPattern {
                    id: enemy.id.clone(),
                });
            }
            if enemy.max_hp <= 0 {
                return Err(CatalogError::InvalidMaxHp {
                    id: enemy.id.clone(),
                    max_hp: enemy.max_hp,
                });
            }
            for (stat, value) in [
                ("max_shield", enemy.max_shield),
                ("base_damage", enemy.base_damage),
            ] {
                if value < 0 {
                    return Err(CatalogError::NegativeStat {
                        id: enemy.id.clone(),
                        stat: stat.into(),
                    });
                }
            }
        }

        Ok(())
    }

    pub fn sample() -> Self {
        let laser = CardData::new("laser_volley", "Laser Volley", 1, 6, EffectKind::Damage)
            .with_description("Deal 6 damage to a target.");
        let railgun = CardData::new("railgun", "Railgun", 2, 12, EffectKind::Damage)
            .with_rarity(Rarity::Uncommon)
            .with_description("Deal 12 damage to a target.");
        let deflector = CardData::new("deflector", "Deflector Screen", 1, 5, EffectKind::Shield)
            .with_description("Recharge 5 shield.");
        let patch = CardData::new("hull_patch", "Hull Patch", 1, 4, EffectKind::Repair)
            .with_description("Repair 4 hull.");
        let capacitor = CardData::new("capacitor", "Capacitor Surge", 0, 1, EffectKind::Energy)
            .with_description("Gain 1 energy.");
        let evasive = CardData::new(
            "evasive_burn",
            "Evasive Burn",
            0,
            1,
            EffectKind::Resource {
                resource: Resource::Maneuver,
                draw_on_empty_hand: true,
            },
        )
        .with_description("Gain 1 maneuver. If your hand is empty, draw a card.");
        let scan = CardData::new(
            "deep_scan",
            "Deep Scan",
            1,
            2,
            EffectKind::Resource {
                resource: Resource::Intel,
                draw_on_empty_hand: false,
            },
        )
        .with_description("Gain 2 intel.");
        let salvage = CardData::new(
            "salvage_drone",
            "Salvage Drone",
            1,
            15,
            EffectKind::Resource {
                resource: Resource::Credits,
                draw_on_empty_hand: false,
            },
        )
        .with_rarity(Rarity::Uncommon)
        .with_description("Gain 15 credits. Exile.")
        .exiled_on_play();
        let nanites = CardData::new("nanite_swarm", "Nanite Swarm", 2, 10, EffectKind::RepairExile)
            .with_rarity(Rarity::Rare)
            .with_description("Repair 10 hull. Exile.");
        let cook = CardData::new("ship_cook", "Ship's Cook", 1, 0, EffectKind::Crew)
            .with_description("Keeps morale up. Refunds its cost.");

        let scout = EnemyTemplate {
            id: "scout_drone".into(),
            name: "Scout Drone".into(),
            image: "enemies/scout_drone.png".into(),
            max_hp: 20,
            max_shield: 10,
            base_damage: 5,
            reward: Reward { credits: 25, xp: 10 },
            pattern: vec![IntentKind::Attack, IntentKind::Defend],
        };
        let corsair = EnemyTemplate {
            id: "void_corsair".into(),
            name: "Void Corsair".into(),
            image: "enemies/void_corsair.png".into(),
            max_hp: 40,
            max_shield: 15,
            base_damage: 7,
            reward: Reward { credits: 60, xp: 25 },
            pattern: vec![
                IntentKind::Attack,
                IntentKind::Buff,
                IntentKind::AttackDefend,
                IntentKind::Defend,
            ],
        };
        let dreadnought = EnemyTemplate {
            id: "dreadnought".into(),
            name: "Dreadnought".into(),
            image: "enemies/dreadnought.png".into(),
            max_hp: 90,
            max_shield: 30,
            base_damage: 11,
            reward: Reward {
                credits: 150,
                xp: 80,
            },
            pattern: vec![
                IntentKind::Defend,
                IntentKind::Buff,
                IntentKind::Attack,
                IntentKind::AttackDefend,
            ],
        };

        Catalog::default()
            .with_card(laser)
            .with_card(railgun)
            .with_card(deflector)
            .with_card(patch)
            .with_card(capacitor)
            .with_card(evasive)
            .with_card(scan)
            .with_card(salvage)
            .with_card(nanites)
            .with_card(cook)
            .with_enemy(scout)
            .with_enemy(corsair)
            .with_enemy(dreadnought)
    }
}
