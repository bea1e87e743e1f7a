//! 动作结算器：按入队顺序把原子动作应用到战斗快照上。

use tracing::{info, trace};

use super::rng::SeededRng;
use super::state::{Action, ActionKind, CombatPhase, CombatState, PlayerCombatant, Resource};

/// 一次抽牌的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawReport {
    pub drawn: u32,
    /// 若发生了弃牌堆洗回，记录洗回的张数。
    pub reshuffled: Option<usize>,
}

/// 从抽牌堆顶抽 `count` 张；抽牌堆空时用战斗随机数把弃牌堆洗回，两堆都空时提前停止。
pub fn draw_cards(player: &mut PlayerCombatant, count: u32, rng: &mut SeededRng) -> DrawReport {
    let mut report = DrawReport::default();
    for _ in 0..count {
        if player.draw_pile.is_empty() {
            if player.discard_pile.is_empty() {
                break;
            }
            let mut recycled = std::mem::take(&mut player.discard_pile);
            rng.shuffle(&mut recycled);
            report.reshuffled = Some(recycled.len());
            player.draw_pile = recycled;
        }
        match player.draw_pile.pop() {
            Some(card) => {
                player.hand.push(card);
                report.drawn += 1;
            }
            None => break,
        }
    }
    report
}

/// 在快照副本上结算 `actions`，原快照保持不变。
pub fn resolve(state: &CombatState, actions: impl IntoIterator<Item = Action>) -> CombatState {
    let mut next = state.clone();
    next.queue.extend(actions);
    drain_queue(&mut next);
    next
}

/// 清空待结算队列，随后做一次终局判定。随机数状态在结束时写回快照。
pub fn drain_queue(state: &mut CombatState) {
    if state.is_finished() {
        state.queue.clear();
        return;
    }

    let resume_phase = state.phase;
    state.phase = CombatPhase::Resolution;

    let mut rng = state.rng();
    while let Some(action) = state.queue.pop_front() {
        apply_action(state, &mut rng, action);
    }
    state.store_rng(&rng);

    if !check_terminal(state) {
        state.phase = resume_phase;
    }
}

fn apply_action(state: &mut CombatState, rng: &mut SeededRng, action: Action) {
    trace!(?action, "resolving action");
    let source_name = state.name_of(&action.source_id).to_string();
    let target_name = state.name_of(&action.target_id).to_string();

    if !state.is_valid_target(&action.target_id) {
        let note = if state.vitals(&action.target_id).is_some() {
            format!("{source_name}'s action against {target_name} fizzles: target already destroyed.")
        } else {
            format!("{source_name}'s action fizzles: no target {target_name}.")
        };
        state.record(note);
        return;
    }

    match action.kind {
        ActionKind::DealDamage { amount } => {
            let Some(vitals) = state.vitals_mut(&action.target_id) else {
                return;
            };
            let report = vitals.take_damage(amount);
            let line = if report.absorbed > 0 {
                format!(
                    "{source_name} hits {target_name} for {} ({} absorbed by shields).",
                    amount.max(0),
                    report.absorbed
                )
            } else {
                format!("{source_name} hits {target_name} for {}.", amount.max(0))
            };
            state.record(line);
            if report.destroyed {
                state.record(format!("{target_name} is destroyed!"));
            }
        }
        ActionKind::RechargeShield { amount } => {
            let Some(vitals) = state.vitals_mut(&action.target_id) else {
                return;
            };
            let gained = vitals.recharge_shield(amount);
            state.record(format!("{target_name} recharges {gained} shield."));
        }
        ActionKind::RepairHull { amount } => {
            let Some(vitals) = state.vitals_mut(&action.target_id) else {
                return;
            };
            let repaired = vitals.repair_hull(amount);
            state.record(format!("{target_name} repairs {repaired} hull."));
        }
        ActionKind::GainEnergy { amount } => {
            if action.target_id != state.player.id {
                state.record(format!("{target_name} cannot hold energy."));
                return;
            }
            let player = &mut state.player;
            let before = player.energy;
            player.energy = (player.energy + amount.max(0)).min(player.max_energy);
            let gained = player.energy - before;
            state.record(format!("{target_name} gains {gained} energy."));
        }
        ActionKind::GainResource { resource, amount } => {
            if action.target_id != state.player.id {
                state.record(format!("{target_name} cannot hold resources."));
                return;
            }
            let amount = amount.max(0) as u32;
            let player = &mut state.player;
            let label = match resource {
                Resource::Maneuver => {
                    player.resources.maneuvers = player.resources.maneuvers.saturating_add(amount);
                    "maneuver"
                }
                Resource::Intel => {
                    player.resources.intel = player.resources.intel.saturating_add(amount);
                    "intel"
                }
                Resource::Credits => {
                    player.credits_earned = player.credits_earned.saturating_add(amount);
                    "credits"
                }
            };
            state.record(format!("{target_name} gains {amount} {label}."));
        }
        ActionKind::DrawCards { count } => {
            if action.target_id != state.player.id {
                state.record(format!("{target_name} has no deck to draw from."));
                return;
            }
            let report = draw_cards(&mut state.player, count, rng);
            if let Some(recycled) = report.reshuffled {
                state.record(format!("Reshuffled {recycled} cards into the draw pile."));
            }
            state.record(format!("{target_name} draws {} card(s).", report.drawn));
        }
    }
}

/// 玩家阵亡优先判负，否则敌人阵亡判胜。返回是否进入终局。
pub(crate) fn check_terminal(state: &mut CombatState) -> bool {
    if state.player.vitals.dead {
        state.phase = CombatPhase::GameOver;
        state.victory = Some(false);
        state.record(format!("{} has been destroyed. Defeat.", state.player.name));
        info!(turn = state.turn, "combat lost");
        true
    } else if state.enemy.vitals.dead {
        state.phase = CombatPhase::GameOver;
        state.victory = Some(true);
        state.record(format!("{} defeated. Victory!", state.enemy.name));
        info!(turn = state.turn, enemy = %state.enemy.template_id, "combat won");
        true
    } else {
        false
    }
}
