use tracing::debug;

use crate::game::{
    Action, ActionKind, CombatConfig, CombatState, EnemyCombatant, Intent, IntentKind, SeededRng,
};

/// 敌人回合执行的结果。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnemyTurn {
    pub intent: Option<Intent>,
    pub actions: Vec<Action>,
}

fn percent_ceil(value: i32, percent: i32) -> i32 {
    let scaled = value.max(0) as i64 * percent.max(0) as i64;
    ((scaled + 99) / 100) as i32
}

/// 只根据 `pattern_index` 与 `attack_buff` 计算意图，不消耗随机数。
pub fn preview_intent(enemy: &EnemyCombatant, config: &CombatConfig) -> Option<Intent> {
    if enemy.vitals.dead {
        return None;
    }
    let kind = enemy.current_pattern()?;
    let attack = enemy.base_damage + enemy.attack_buff;
    let intent = match kind {
        IntentKind::Attack => Intent {
            kind,
            damage: attack,
            shield: 0,
            buff: 0,
            description: format!("Attack for {attack}"),
        },
        IntentKind::Defend => {
            let shield = percent_ceil(enemy.base_damage, config.defend_ratio);
            Intent {
                kind,
                damage: 0,
                shield,
                buff: 0,
                description: format!("Raise shields by {shield}"),
            }
        }
        IntentKind::AttackDefend => {
            let damage = percent_ceil(attack, config.split_ratio);
            let shield = percent_ceil(enemy.base_damage, config.split_ratio);
            Intent {
                kind,
                damage,
                shield,
                buff: 0,
                description: format!("Attack for {damage} and raise shields by {shield}"),
            }
        }
        IntentKind::Buff => Intent {
            kind,
            damage: 0,
            shield: 0,
            buff: config.buff_amount,
            description: format!("Charge weapons (+{} attack)", config.buff_amount),
        },
    };
    Some(intent)
}

/// 预览阶段：只写入 `enemy.intent`，可以安全地重复调用。
pub fn set_enemy_intent(state: &mut CombatState, config: &CombatConfig) {
    state.enemy.intent = preview_intent(&state.enemy, config);
}

/// 执行阶段：把预览的意图变成动作，攻击值叠加 ±`attack_variance` 的随机浮动，然后推进行为模式。
pub fn process_enemy_turn(
    state: &mut CombatState,
    rng: &mut SeededRng,
    config: &CombatConfig,
) -> EnemyTurn {
    if state.enemy.vitals.dead {
        return EnemyTurn::default();
    }
    let Some(intent) = state.enemy.intent.take() else {
        return EnemyTurn::default();
    };

    let enemy_id = state.enemy.id.clone();
    let player_id = state.player.id.clone();
    let variance = config.attack_variance.max(0);
    let mut actions = Vec::new();

    if intent.kind.is_attack() {
        let damage = (intent.damage + rng.next_int(-variance, variance)).max(0);
        actions.push(Action::new(
            enemy_id.as_str(),
            player_id.as_str(),
            ActionKind::DealDamage { amount: damage },
        ));
    }
    if matches!(intent.kind, IntentKind::Defend | IntentKind::AttackDefend) && intent.shield > 0 {
        actions.push(Action::new(
            enemy_id.as_str(),
            enemy_id.as_str(),
            ActionKind::RechargeShield {
                amount: intent.shield,
            },
        ));
    }

    let enemy = &mut state.enemy;
    match intent.kind {
        IntentKind::Attack | IntentKind::AttackDefend => enemy.attack_buff = 0,
        IntentKind::Buff => enemy.attack_buff += intent.buff,
        IntentKind::Defend => {}
    }
    enemy.advance_pattern();

    let line = format!("{}: {}.", state.enemy.name, intent.description);
    state.record(line);
    debug!(kind = ?intent.kind, actions = actions.len(), "enemy turn planned");

    EnemyTurn {
        intent: Some(intent),
        actions,
    }
}
