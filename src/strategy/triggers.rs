use std::collections::HashMap;
use std::rc::Rc;

use crate::catalog::StrategyDef;
use crate::query::{CityView, PlayerView};
use crate::tunables::Tunables;
use crate::yields::{Yield, YieldStats};

/// Everything a trigger predicate may look at for one evaluation.
pub struct TriggerCtx<'a> {
    pub turn: u32,
    pub city: &'a dyn CityView,
    pub player: &'a dyn PlayerView,
    pub stats: &'a YieldStats,
    pub tunables: &'a Tunables,
    pub def: &'a StrategyDef,
}

pub type TriggerFn = Rc<dyn Fn(&TriggerCtx) -> bool>;

/// Maps trigger identifiers to predicate functions. Resolution happens once
/// at engine construction; per-turn evaluation never compares strings.
pub struct TriggerRegistry {
    triggers: HashMap<String, TriggerFn>,
}

impl TriggerRegistry {
    pub fn empty() -> Self {
        TriggerRegistry {
            triggers: HashMap::new(),
        }
    }

    /// Registry preloaded with the builtin predicate set. Hosts add their
    /// own triggers on top with `register`.
    pub fn builtin() -> Self {
        let mut registry = TriggerRegistry::empty();
        registry.register("tiny_city", tiny_city);
        registry.register("small_city", small_city);
        registry.register("medium_city", medium_city);
        registry.register("large_city", large_city);
        registry.register("landlocked", |ctx| !ctx.city.is_coastal());
        registry.register("coast_city", |ctx| ctx.city.is_coastal());
        registry.register("under_blockade", |ctx| ctx.city.is_under_blockade());
        registry.register("capital_under_threat", |ctx| {
            ctx.city.is_capital() && ctx.city.is_threatened()
        });
        registry.register("capital_need_settler", |ctx| {
            ctx.city.is_capital() && !ctx.player.has_enough_settlers()
        });
        registry.register("enough_settlers", |ctx| ctx.player.has_enough_settlers());
        registry.register("need_improvement_food", |ctx| {
            ctx.stats.most_deficient() == Some(Yield::Food)
        });
        registry.register("need_improvement_production", |ctx| {
            ctx.stats.most_deficient() == Some(Yield::Production)
        });
        registry.register("need_tile_improvers", need_tile_improvers);
        registry.register("want_tile_improvers", want_tile_improvers);
        registry.register("enough_tile_improvers", enough_tile_improvers);
        registry
    }

    pub fn register(&mut self, name: &str, trigger: impl Fn(&TriggerCtx) -> bool + 'static) {
        self.triggers.insert(name.to_string(), Rc::new(trigger));
    }

    pub fn resolve(&self, name: &str) -> Option<TriggerFn> {
        self.triggers.get(name).cloned()
    }
}

/// The strategy's weight threshold, modified by the player's personality
/// flavors.
pub fn weight_threshold(def: &StrategyDef, player: &dyn PlayerView) -> i32 {
    let mut threshold = def.weight_threshold;
    for (flavor, modifier) in def.flavor_threshold_mods.iter().enumerate() {
        threshold += player.personality_flavor(flavor) * modifier;
    }
    threshold
}

fn tiny_city(ctx: &TriggerCtx) -> bool {
    ctx.city.population() < ctx.tunables.small_city_pop
}

fn small_city(ctx: &TriggerCtx) -> bool {
    let pop = ctx.city.population();
    pop >= ctx.tunables.small_city_pop && pop < ctx.tunables.medium_city_pop
}

fn medium_city(ctx: &TriggerCtx) -> bool {
    let pop = ctx.city.population();
    pop >= ctx.tunables.medium_city_pop && pop < ctx.tunables.large_city_pop
}

fn large_city(ctx: &TriggerCtx) -> bool {
    ctx.city.population() >= ctx.tunables.large_city_pop
}

/// Do we REALLY need more tile improvers right now?
fn need_tile_improvers(ctx: &TriggerCtx) -> bool {
    // A recently disbanded worker means we had too many already.
    if let Some(turn) = ctx.player.last_turn_worker_disbanded()
        && ctx.turn.saturating_sub(turn) <= ctx.tunables.no_worker_after_disband_turns
    {
        return false;
    }

    let cities = ctx.player.cities_needing_improvement();
    let workers = ctx.player.worker_count();
    if workers > cities + 1 {
        return false;
    }

    let modded_workers =
        workers as i64 * weight_threshold(ctx.def, ctx.player) as i64 / 100;
    modded_workers <= cities as i64 || modded_workers == 0
}

/// Softer variant: worker coverage is below the flavored threshold but we
/// are not desperate yet.
fn want_tile_improvers(ctx: &TriggerCtx) -> bool {
    if let Some(turn) = ctx.player.last_turn_worker_disbanded()
        && ctx.turn.saturating_sub(turn) <= ctx.tunables.no_worker_after_disband_turns
    {
        return false;
    }

    let cities = ctx.player.cities_needing_improvement() as i64;
    let workers = ctx.player.worker_count() as i64;
    workers * 100 < cities * weight_threshold(ctx.def, ctx.player) as i64
}

fn enough_tile_improvers(ctx: &TriggerCtx) -> bool {
    let cities = ctx.player.cities_needing_improvement() as i64;
    let workers = ctx.player.worker_count() as i64;
    workers * weight_threshold(ctx.def, ctx.player) as i64 / 100 > cities
}
