//! 战斗核心逻辑模块（状态、效果解释、结算、回合控制）。

pub mod catalog;
pub mod config;
pub mod effects;
pub mod resolver;
pub mod rng;
pub mod rules;
pub mod session;
pub mod state;

pub use catalog::{CardData, Catalog, CatalogError, EffectKind, EnemyTemplate, Rarity};
pub use config::CombatConfig;
pub use effects::{
    actual_cost,
    actual_value,
    plan_card_play,
    CardDestination,
    EffectContext,
    EffectPlan,
};
pub use resolver::{draw_cards, resolve, DrawReport};
pub use rng::SeededRng;
pub use rules::{start_player_turn, CombatEngine, RuleError};
pub use session::RunSession;
pub use state::{
    Action,
    ActionKind,
    Affix,
    CardInstance,
    CombatPhase,
    CombatSettlement,
    CombatState,
    CombatantId,
    EnemyCombatant,
    Intent,
    IntentKind,
    IntegrityError,
    PlayerCombatant,
    PlayerSnapshot,
    Resource,
    Reward,
    TurnResources,
    Vitals,
    PLAYER_ID,
};
