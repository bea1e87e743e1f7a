pub mod ai;
pub mod game;

use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

pub use ai::{preview_intent, process_enemy_turn, set_enemy_intent, EnemyTurn};
pub use game::{
    Action, ActionKind, Affix, CardData, CardDestination, CardInstance, Catalog, CatalogError,
    CombatConfig, CombatEngine, CombatPhase, CombatSettlement, CombatState, EffectKind,
    EnemyTemplate, Intent, IntentKind, IntegrityError, PlayerSnapshot, Resource, RuleError,
    RunSession, SeededRng,
};

#[cfg(all(feature = "wee_alloc", target_arch = "wasm32"))]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    set_panic_hook();
    web_sys::console::log_1(&"combat engine ready".into());
}

fn to_js_error<E: Serialize + std::fmt::Display>(error: E) -> JsValue {
    to_value(&error).unwrap_or_else(|_| JsValue::from_str(&error.to_string()))
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn engine_from_json(catalog_json: Option<String>) -> Result<CombatEngine, JsValue> {
    match catalog_json {
        Some(json) => Catalog::from_json(&json)
            .map(CombatEngine::new)
            .map_err(to_js_error),
        None => Ok(CombatEngine::builtin()),
    }
}

/// 有状态的战斗句柄，前端持有它并逐步推进一场战斗。
#[wasm_bindgen]
pub struct CombatHandle {
    engine: CombatEngine,
    state: CombatState,
}

#[wasm_bindgen]
impl CombatHandle {
    #[wasm_bindgen(constructor)]
    pub fn new(
        player_json: &str,
        enemy_template_id: &str,
        seed: f64,
        catalog_json: Option<String>,
    ) -> Result<CombatHandle, JsValue> {
        let engine = engine_from_json(catalog_json)?;
        let player: PlayerSnapshot = serde_json::from_str(player_json).map_err(serde_to_js_error)?;
        let state = engine
            .create_combat(&player, enemy_template_id, seed as i64)
            .map_err(to_js_error)?;
        Ok(CombatHandle { engine, state })
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.state).map_err(serde_to_js_error)
    }

    /// 读档：替换当前快照，随机数序列从存档处继续。
    pub fn set_state_json(&mut self, json: &str) -> Result<(), JsValue> {
        let state: CombatState = serde_json::from_str(json).map_err(serde_to_js_error)?;
        self.state = state;
        Ok(())
    }

    pub fn play_card(
        &mut self,
        instance_id: &str,
        target_id: Option<String>,
    ) -> Result<String, JsValue> {
        self.state = self
            .engine
            .play_card(&self.state, instance_id, target_id.as_deref());
        self.state_json()
    }

    pub fn resolve_turn(&mut self) -> Result<String, JsValue> {
        self.state = self.engine.resolve_turn(&self.state);
        self.state_json()
    }

    pub fn settlement_json(&self) -> Result<Option<String>, JsValue> {
        self.state
            .settlement()
            .map(|settlement| serde_json::to_string(&settlement).map_err(serde_to_js_error))
            .transpose()
    }
}

/// 用内置目录创建一场战斗。
#[wasm_bindgen(js_name = "createCombat")]
pub fn create_combat(
    player: JsValue,
    enemy_template_id: &str,
    seed: f64,
) -> Result<JsValue, JsValue> {
    let player: PlayerSnapshot = from_value(player).map_err(JsValue::from)?;
    let engine = CombatEngine::builtin();
    let state = engine
        .create_combat(&player, enemy_template_id, seed as i64)
        .map_err(to_js_error)?;
    to_value(&state).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "playCard")]
pub fn play_card(
    state: JsValue,
    instance_id: &str,
    target_id: Option<String>,
) -> Result<JsValue, JsValue> {
    let state: CombatState = from_value(state).map_err(JsValue::from)?;
    let engine = CombatEngine::builtin();
    let next = engine.play_card(&state, instance_id, target_id.as_deref());
    to_value(&next).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "resolveTurn")]
pub fn resolve_turn(state: JsValue) -> Result<JsValue, JsValue> {
    let state: CombatState = from_value(state).map_err(JsValue::from)?;
    let engine = CombatEngine::builtin();
    to_value(&engine.resolve_turn(&state)).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "validateState")]
pub fn validate_state(state: JsValue) -> Result<(), JsValue> {
    let state: CombatState = from_value(state).map_err(JsValue::from)?;
    state.integrity_check().map_err(to_js_error)
}

#[wasm_bindgen(js_name = "validateCatalog")]
pub fn validate_catalog(json: &str) -> Result<(), JsValue> {
    Catalog::from_json(json).map(|_| ()).map_err(to_js_error)
}

/// 新遭遇战的随机种子。
#[wasm_bindgen(js_name = "randomSeed")]
pub fn random_seed() -> f64 {
    SeededRng::from_entropy().state() as f64
}

#[cfg(feature = "console_error_panic_hook")]
fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(not(feature = "console_error_panic_hook"))]
fn set_panic_hook() {}
