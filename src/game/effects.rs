use serde::{Deserialize, Serialize};

use super::catalog::{CardData, EffectKind};
use super::config::CombatConfig;
use super::state::{Action, ActionKind, CardInstance, CombatantId};

/// 打出的牌最终进入的牌堆。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CardDestination {
    Discard,
    Exile,
}

/// 一次出牌的上下文。`hand_empty` 反映这张牌离开手牌之后的状态。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectContext {
    pub source_id: CombatantId,
    pub target_id: CombatantId,
    pub actual_cost: i32,
    pub hand_empty: bool,
}

impl EffectContext {
    pub fn new(source_id: impl Into<CombatantId>, target_id: impl Into<CombatantId>) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            actual_cost: 0,
            hand_empty: false,
        }
    }

    pub fn with_cost(mut self, actual_cost: i32) -> Self {
        self.actual_cost = actual_cost;
        self
    }

    pub fn with_hand_empty(mut self, hand_empty: bool) -> Self {
        self.hand_empty = hand_empty;
        self
    }
}

/// 效果解释的结果：按顺序排队的动作，以及这张牌的去向。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectPlan {
    pub actions: Vec<Action>,
    pub destination: CardDestination,
}

/// `max(0, 基础费用 + 词缀费用修正)`
pub fn actual_cost(card: &CardData, instance: &CardInstance) -> i32 {
    let modifier = instance
        .affix
        .as_ref()
        .map(|affix| affix.cost_modifier)
        .unwrap_or(0);
    (card.cost + modifier).max(0)
}

/// `基础数值 + 词缀数值修正`
pub fn actual_value(card: &CardData, instance: &CardInstance) -> i32 {
    let modifier = instance
        .affix
        .as_ref()
        .map(|affix| affix.value_modifier)
        .unwrap_or(0);
    card.value + modifier
}

impl EffectKind {
    pub fn destination(&self) -> CardDestination {
        match self {
            EffectKind::RepairExile => CardDestination::Exile,
            _ => CardDestination::Discard,
        }
    }

    /// 把效果映射为动作队列，对每个效果类别都有定义。
    pub fn actions(&self, value: i32, ctx: &EffectContext, config: &CombatConfig) -> Vec<Action> {
        let source = ctx.source_id.as_str();
        match self {
            EffectKind::Damage => vec![Action::new(
                source,
                ctx.target_id.as_str(),
                ActionKind::DealDamage { amount: value },
            )],
            EffectKind::Shield => vec![Action::new(
                source,
                source,
                ActionKind::RechargeShield { amount: value },
            )],
            EffectKind::Repair | EffectKind::RepairExile => vec![Action::new(
                source,
                source,
                ActionKind::RepairHull { amount: value },
            )],
            EffectKind::Energy => vec![Action::new(
                source,
                source,
                ActionKind::GainEnergy { amount: value },
            )],
            EffectKind::Resource {
                resource,
                draw_on_empty_hand,
            } => {
                let mut actions = vec![Action::new(
                    source,
                    source,
                    ActionKind::GainResource {
                        resource: *resource,
                        amount: value,
                    },
                )];
                if *draw_on_empty_hand && ctx.hand_empty && config.maneuver_draw > 0 {
                    actions.push(Action::new(
                        source,
                        source,
                        ActionKind::DrawCards {
                            count: config.maneuver_draw,
                        },
                    ));
                }
                actions
            }
            EffectKind::Crew => {
                if ctx.actual_cost > 0 {
                    vec![Action::new(
                        source,
                        source,
                        ActionKind::GainEnergy {
                            amount: ctx.actual_cost,
                        },
                    )]
                } else {
                    Vec::new()
                }
            }
        }
    }

    /// 需要玩家选择敌方目标的效果。
    pub fn requires_target(&self) -> bool {
        matches!(self, EffectKind::Damage)
    }
}

/// 解释一次出牌：计算实际数值，生成动作并决定牌的去向。
pub fn plan_card_play(
    card: &CardData,
    instance: &CardInstance,
    ctx: &EffectContext,
    config: &CombatConfig,
) -> EffectPlan {
    let value = actual_value(card, instance);
    let actions = card.effect.actions(value, ctx, config);
    let destination = if card.exile_on_play {
        CardDestination::Exile
    } else {
        card.effect.destination()
    };
    EffectPlan {
        actions,
        destination,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::{Affix, Resource, PLAYER_ID};

    fn maneuver_card() -> CardData {
        CardData::new(
            "evasive_burn",
            "Evasive Burn",
            0,
            1,
            EffectKind::Resource {
                resource: Resource::Maneuver,
                draw_on_empty_hand: true,
            },
        )
    }

    #[test]
    fn affix_modifies_cost_and_value() {
        let card = CardData::new("laser", "Laser", 1, 6, EffectKind::Damage);
        let instance = CardInstance::new("c1", "laser").with_affix(Affix {
            name: "Overclocked".into(),
            cost_modifier: -1,
            value_modifier: 2,
        });
        assert_eq!(actual_cost(&card, &instance), 0);
        assert_eq!(actual_value(&card, &instance), 8);

        let cheaper = CardInstance::new("c2", "laser").with_affix(Affix {
            name: "Streamlined".into(),
            cost_modifier: -5,
            value_modifier: 0,
        });
        assert_eq!(actual_cost(&card, &cheaper), 0, "cost never drops below zero");
    }

    #[test]
    fn damage_targets_context_target() {
        let card = CardData::new("laser", "Laser", 1, 6, EffectKind::Damage);
        let instance = CardInstance::new("c1", "laser");
        let ctx = EffectContext::new(PLAYER_ID, "enemy").with_cost(1);
        let plan = plan_card_play(&card, &instance, &ctx, &CombatConfig::default());
        assert_eq!(
            plan.actions,
            vec![Action::new(
                PLAYER_ID,
                "enemy",
                ActionKind::DealDamage { amount: 6 }
            )]
        );
        assert_eq!(plan.destination, CardDestination::Discard);
    }

    #[test]
    fn maneuver_on_empty_hand_appends_draw_after_gain() {
        let card = maneuver_card();
        let instance = CardInstance::new("c1", "evasive_burn");
        let ctx = EffectContext::new(PLAYER_ID, "enemy").with_hand_empty(true);
        let plan = plan_card_play(&card, &instance, &ctx, &CombatConfig::default());
        assert_eq!(plan.actions.len(), 2);
        assert!(matches!(
            plan.actions[0].kind,
            ActionKind::GainResource {
                resource: Resource::Maneuver,
                amount: 1
            }
        ));
        assert_eq!(plan.actions[1].kind, ActionKind::DrawCards { count: 1 });
    }

    #[test]
    fn maneuver_with_cards_left_does_not_draw() {
        let card = maneuver_card();
        let instance = CardInstance::new("c1", "evasive_burn");
        let ctx = EffectContext::new(PLAYER_ID, "enemy").with_hand_empty(false);
        let plan = plan_card_play(&card, &instance, &ctx, &CombatConfig::default());
        assert_eq!(plan.actions.len(), 1);
    }

    #[test]
    fn repair_exile_goes_to_exile() {
        let card = CardData::new("nanites", "Nanites", 2, 10, EffectKind::RepairExile);
        let instance = CardInstance::new("c1", "nanites");
        let ctx = EffectContext::new(PLAYER_ID, PLAYER_ID);
        let plan = plan_card_play(&card, &instance, &ctx, &CombatConfig::default());
        assert_eq!(plan.destination, CardDestination::Exile);
        assert_eq!(plan.actions[0].kind, ActionKind::RepairHull { amount: 10 });
    }

    #[test]
    fn flagged_card_is_exiled() {
        let card = CardData::new("salvage", "Salvage", 1, 15, EffectKind::Shield).exiled_on_play();
        let instance = CardInstance::new("c1", "salvage");
        let ctx = EffectContext::new(PLAYER_ID, PLAYER_ID);
        let plan = plan_card_play(&card, &instance, &ctx, &CombatConfig::default());
        assert_eq!(plan.destination, CardDestination::Exile);
    }

    #[test]
    fn crew_refunds_its_cost() {
        let card = CardData::new("cook", "Cook", 1, 0, EffectKind::Crew);
        let instance = CardInstance::new("c1", "cook");
        let ctx = EffectContext::new(PLAYER_ID, PLAYER_ID).with_cost(1);
        let plan = plan_card_play(&card, &instance, &ctx, &CombatConfig::default());
        assert_eq!(plan.actions[0].kind, ActionKind::GainEnergy { amount: 1 });

        let free = EffectContext::new(PLAYER_ID, PLAYER_ID).with_cost(0);
        assert!(plan_card_play(&card, &instance, &free, &CombatConfig::default())
            .actions
            .is_empty());
    }
}
