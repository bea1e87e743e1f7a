//! 一次远航（run）范围内的会话状态，由上层控制器持有，开局时重置。

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::catalog::Catalog;
use super::rng::SeededRng;
use super::state::{CombatSettlement, PlayerSnapshot};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RunSession {
    /// 本次远航已经遭遇过的敌人模板。
    #[serde(default)]
    pub used_enemies: BTreeSet<String>,
    #[serde(default)]
    pub victories: u32,
    #[serde(default)]
    pub defeats: u32,
}

impl RunSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// 从尚未遭遇的模板中挑一个；全部用过后清空记录重新开始。
    pub fn pick_enemy(&mut self, catalog: &Catalog, rng: &mut SeededRng) -> Option<String> {
        if catalog.enemies.is_empty() {
            return None;
        }
        let mut candidates: Vec<&String> = catalog
            .enemies
            .keys()
            .filter(|id| !self.used_enemies.contains(*id))
            .collect();
        if candidates.is_empty() {
            debug!("every enemy template used, starting a fresh rotation");
            self.used_enemies.clear();
            candidates = catalog.enemies.keys().collect();
        }
        let index = rng.next_int(0, candidates.len() as i32 - 1) as usize;
        let chosen = candidates[index].clone();
        self.used_enemies.insert(chosen.clone());
        Some(chosen)
    }

    /// 把战斗结算写回主线快照：船体、护盾、信用点与经验。
    pub fn apply_settlement(&mut self, player: &mut PlayerSnapshot, settlement: &CombatSettlement) {
        player.hull = settlement.hull.clamp(0, player.max_hull);
        player.shield = settlement.shield.clamp(0, player.max_shield);
        player.credits = player.credits.saturating_add(settlement.credits);
        player.xp = player.xp.saturating_add(settlement.xp);
        if settlement.victory {
            self.victories += 1;
        } else {
            self.defeats += 1;
        }
    }
}
