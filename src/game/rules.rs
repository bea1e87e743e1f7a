use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::ai::{process_enemy_turn, set_enemy_intent};

use super::{
    catalog::Catalog,
    config::CombatConfig,
    effects::{actual_cost, plan_card_play, CardDestination, EffectContext},
    resolver::{check_terminal, draw_cards, drain_queue},
    rng::SeededRng,
    state::{
        CombatPhase, CombatState, EnemyCombatant, PlayerCombatant, PlayerSnapshot, TurnResources,
        Vitals, PLAYER_ID,
    },
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Error)]
#[serde(tag = "type")]
pub enum RuleError {
    #[error("combat is already over")]
    GameFinished,
    #[error("expected phase {expected:?}, combat is in {actual:?}")]
    InvalidPhase {
        expected: CombatPhase,
        actual: CombatPhase,
    },
    #[error("card instance {instance_id} is not in hand")]
    CardNotFound { instance_id: String },
    #[error("card {card_id} is not in the catalog")]
    UnknownCard { card_id: String },
    #[error("card needs {required} energy, {available} available")]
    InsufficientEnergy { required: i32, available: i32 },
    #[error("{target_id} is not a valid target")]
    InvalidTarget { target_id: String },
    #[error("unknown enemy template {template_id}")]
    UnknownEnemyTemplate { template_id: String },
}

/// 回合控制器：创建战斗、出牌、结束回合。所有操作都返回新的快照。
#[derive(Debug, Clone, Default)]
pub struct CombatEngine {
    catalog: Catalog,
    config: CombatConfig,
}

impl CombatEngine {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            config: CombatConfig::default(),
        }
    }

    /// 使用内置示例目录。
    pub fn builtin() -> Self {
        Self::new(Catalog::builtin().clone())
    }

    pub fn with_config(mut self, config: CombatConfig) -> Self {
        self.config = config;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    fn ensure_player_input(state: &CombatState) -> Result<(), RuleError> {
        if state.is_finished() {
            return Err(RuleError::GameFinished);
        }
        if state.phase != CombatPhase::PlayerInput {
            return Err(RuleError::InvalidPhase {
                expected: CombatPhase::PlayerInput,
                actual: state.phase,
            });
        }
        Ok(())
    }

    /// 由玩家快照、敌人模板与种子创建一场战斗；未知模板是致命错误。
    pub fn create_combat(
        &self,
        player: &PlayerSnapshot,
        enemy_template_id: &str,
        seed: i64,
    ) -> Result<CombatState, RuleError> {
        let template =
            self.catalog
                .enemy(enemy_template_id)
                .ok_or_else(|| RuleError::UnknownEnemyTemplate {
                    template_id: enemy_template_id.to_string(),
                })?;

        let mut rng = SeededRng::new(seed);
        let rng_seed = rng.state();
        let mut draw_pile = player.deck.clone();
        rng.shuffle(&mut draw_pile);

        let max_energy = player.max_energy.max(0);
        let combatant = PlayerCombatant {
            id: PLAYER_ID.into(),
            name: player.name.clone(),
            image: player.image.clone(),
            vitals: Vitals::new(player.hull, player.max_hull, player.shield, player.max_shield),
            energy: max_energy,
            max_energy,
            resources: TurnResources::default(),
            credits_earned: 0,
            hand: Vec::new(),
            draw_pile,
            discard_pile: Vec::new(),
            exile_pile: Vec::new(),
        };

        let enemy = EnemyCombatant {
            id: format!("enemy:{}", template.id),
            template_id: template.id.clone(),
            name: template.name.clone(),
            image: template.image.clone(),
            vitals: Vitals::full(template.max_hp, template.max_shield),
            base_damage: template.base_damage,
            reward: template.reward,
            pattern: template.pattern.clone(),
            pattern_index: 0,
            attack_buff: 0,
            intent: None,
        };

        let mut state = CombatState {
            turn: 1,
            phase: CombatPhase::PlayerInput,
            rng_seed,
            rng_state: rng.state(),
            player: combatant,
            enemy,
            queue: Default::default(),
            log: Vec::new(),
            victory: None,
        };
        state.record(format!("{} engages {}!", state.player.name, state.enemy.name));

        start_player_turn(&mut state, &self.config);
        // 船体为 0 的快照直接判负
        check_terminal(&mut state);
        info!(
            enemy = %template.id,
            seed = rng_seed,
            deck = player.deck.len(),
            "combat created"
        );
        Ok(state)
    }

    /// 出牌。阶段不对、牌不在手中、能量不足或目标无效时原样返回输入快照。
    pub fn play_card(
        &self,
        state: &CombatState,
        instance_id: &str,
        target_id: Option<&str>,
    ) -> CombatState {
        match self.try_play_card(state, instance_id, target_id) {
            Ok(next) => next,
            Err(error) => {
                debug!(%error, instance_id, "card play rejected");
                state.clone()
            }
        }
    }

    pub fn try_play_card(
        &self,
        state: &CombatState,
        instance_id: &str,
        target_id: Option<&str>,
    ) -> Result<CombatState, RuleError> {
        Self::ensure_player_input(state)?;

        let hand_index = state
            .player
            .find_card_in_hand_index(instance_id)
            .ok_or_else(|| RuleError::CardNotFound {
                instance_id: instance_id.to_string(),
            })?;
        let instance = &state.player.hand[hand_index];
        let card = self
            .catalog
            .card(&instance.card_id)
            .ok_or_else(|| RuleError::UnknownCard {
                card_id: instance.card_id.clone(),
            })?;

        let cost = actual_cost(card, instance);
        if state.player.energy < cost {
            return Err(RuleError::InsufficientEnergy {
                required: cost,
                available: state.player.energy,
            });
        }

        let target = if card.effect.requires_target() {
            let target = target_id.unwrap_or(state.enemy.id.as_str());
            if !state.is_valid_target(target) {
                return Err(RuleError::InvalidTarget {
                    target_id: target.to_string(),
                });
            }
            target.to_string()
        } else {
            state.player.id.clone()
        };

        let mut next = state.clone();
        next.player.energy -= cost;
        let played = next.player.hand.remove(hand_index);

        // 条件效果看到的是这张牌离开手牌之后的手牌
        let ctx = EffectContext::new(next.player.id.as_str(), target)
            .with_cost(cost)
            .with_hand_empty(next.player.hand.is_empty());
        let plan = plan_card_play(card, &played, &ctx, &self.config);

        next.record(format!("{} plays {} ({cost} energy).", next.player.name, card.name));
        match plan.destination {
            CardDestination::Discard => next.player.discard_pile.push(played),
            CardDestination::Exile => {
                next.record(format!("{} is exiled.", card.name));
                next.player.exile_pile.push(played);
            }
        }

        next.queue.extend(plan.actions);
        drain_queue(&mut next);
        Ok(next)
    }

    /// 结束回合：执行敌人意图、结算，然后开始下一回合或结束战斗。
    pub fn resolve_turn(&self, state: &CombatState) -> CombatState {
        match self.try_resolve_turn(state) {
            Ok(next) => next,
            Err(error) => {
                debug!(%error, "end turn rejected");
                state.clone()
            }
        }
    }

    pub fn try_resolve_turn(&self, state: &CombatState) -> Result<CombatState, RuleError> {
        Self::ensure_player_input(state)?;

        let mut next = state.clone();
        next.phase = CombatPhase::Resolution;
        next.record(format!("End of turn {}.", next.turn));

        let mut rng = next.rng();
        let enemy_turn = process_enemy_turn(&mut next, &mut rng, &self.config);
        next.store_rng(&rng);

        next.queue.extend(enemy_turn.actions);
        drain_queue(&mut next);
        if next.is_finished() {
            return Ok(next);
        }

        next.turn += 1;
        start_player_turn(&mut next, &self.config);
        Ok(next)
    }
}

/// 回合开始：手牌全部弃掉，能量回满，回合资源清零，抽牌，然后预览敌人意图。
pub fn start_player_turn(state: &mut CombatState, config: &CombatConfig) {
    let player = &mut state.player;
    let hand = std::mem::take(&mut player.hand);
    player.discard_pile.extend(hand);
    player.energy = player.max_energy;
    player.resources.reset();

    let mut rng = state.rng();
    let report = draw_cards(&mut state.player, config.hand_size, &mut rng);
    state.store_rng(&rng);

    if let Some(recycled) = report.reshuffled {
        state.record(format!("Reshuffled {recycled} cards into the draw pile."));
    }
    state.phase = CombatPhase::PlayerInput;
    state.record(format!(
        "Turn {} begins. Drew {} card(s).",
        state.turn, report.drawn
    ));
    set_enemy_intent(state, config);
}
