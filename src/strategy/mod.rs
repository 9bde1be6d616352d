//! Per-city strategy activation.
//!
//! Each city carries a set of adopted strategies driven by trigger
//! predicates with hysteresis: a strategy is only reconsidered on its
//! recheck cadence and only after its minimum execution time, so cities do
//! not flip-flop on noisy conditions.

mod triggers;

pub use triggers::{TriggerCtx, TriggerFn, TriggerRegistry, weight_threshold};

use crate::advisors::AdvisorSet;
use crate::catalog::{AdvisorCounsel, Catalog, SpecializationId, StrategyId};
use crate::error::EngineError;
use crate::flavor::FlavorAccumulator;
use crate::log::{DecisionLog, LogEvent, LogRecord};
use crate::query::{CityId, CityView, PlayerId, PlayerView, VetoHook};
use crate::tunables::Tunables;
use crate::yields::{YIELD_COUNT, Yield, YieldStats};

/// Sentinel for "never adopted" in the per-strategy adoption turn array.
pub const NOT_ADOPTED: i32 = -1;

/// Everything one evaluation pass needs from the host, borrowed for the
/// duration of the call.
pub struct TurnCtx<'a> {
    pub turn: u32,
    pub catalog: &'a Catalog,
    pub city: &'a dyn CityView,
    pub player: &'a mut dyn PlayerView,
    pub tunables: &'a Tunables,
    /// Scripting override consulted after a trigger fires.
    pub veto: Option<&'a VetoHook>,
}

/// The decision state one city carries between turns.
pub struct CityStrategyAi {
    pub(crate) flavors: FlavorAccumulator,
    pub(crate) active: Vec<bool>,
    pub(crate) turn_adopted: Vec<i32>,
    triggers: Vec<Option<TriggerFn>>,
    pub(crate) specialization: Option<SpecializationId>,
    pub(crate) default_specialization: Option<SpecializationId>,
    pub(crate) yield_stats: YieldStats,
    pub(crate) advisors: AdvisorSet,
    pub(crate) log: Option<Box<dyn DecisionLog>>,
}

impl CityStrategyAi {
    /// Build the engine for one city. Trigger identifiers are resolved here,
    /// once, so a catalog typo fails loudly instead of silently never
    /// firing.
    pub fn new(
        catalog: &Catalog,
        registry: &TriggerRegistry,
        advisors: AdvisorSet,
        log: Option<Box<dyn DecisionLog>>,
    ) -> Result<Self, EngineError> {
        let mut resolved = Vec::with_capacity(catalog.strategy_count());
        for id in 0..catalog.strategy_count() {
            match catalog.strategy(id) {
                Some(def) => {
                    let trigger = registry.resolve(&def.trigger).ok_or_else(|| {
                        EngineError::UnknownTrigger {
                            strategy: def.name.clone(),
                            trigger: def.trigger.clone(),
                        }
                    })?;
                    resolved.push(Some(trigger));
                }
                None => resolved.push(None),
            }
        }

        Ok(CityStrategyAi {
            flavors: FlavorAccumulator::new(catalog.flavor_count()),
            active: vec![false; catalog.strategy_count()],
            turn_adopted: vec![NOT_ADOPTED; catalog.strategy_count()],
            triggers: resolved,
            specialization: None,
            default_specialization: None,
            yield_stats: YieldStats::default(),
            advisors,
            log,
        })
    }

    pub fn is_using(&self, strategy: StrategyId) -> bool {
        self.active.get(strategy).copied().unwrap_or(false)
    }

    /// Turn the strategy was adopted, `None` while inactive.
    pub fn turn_adopted(&self, strategy: StrategyId) -> Option<u32> {
        match self.turn_adopted.get(strategy) {
            Some(turn) if *turn >= 0 => Some(*turn as u32),
            _ => None,
        }
    }

    pub fn flavors(&self) -> &FlavorAccumulator {
        &self.flavors
    }

    pub fn flavor(&self, flavor: usize) -> i32 {
        self.flavors.get(flavor)
    }

    pub fn yield_stats(&self) -> &YieldStats {
        &self.yield_stats
    }

    pub fn specialization(&self) -> Option<SpecializationId> {
        self.specialization.or(self.default_specialization)
    }

    pub fn default_specialization(&self) -> Option<SpecializationId> {
        self.default_specialization
    }

    pub fn set_default_specialization(&mut self, specialization: Option<SpecializationId>) {
        self.default_specialization = specialization;
    }

    /// Swap the city's specialization, unwinding the old one's flavor
    /// contribution and applying the new one's. Returns false when nothing
    /// changed.
    pub fn set_specialization(
        &mut self,
        ctx: &mut TurnCtx,
        new: Option<SpecializationId>,
    ) -> bool {
        if new == self.specialization {
            return false;
        }

        let player = ctx.player.id();
        let city = ctx.city.id();
        self.record(
            ctx.turn,
            player,
            city,
            LogEvent::SpecializationChanged {
                specialization: new
                    .and_then(|id| ctx.catalog.specialization(id))
                    .map(|def| def.name.clone()),
            },
        );

        if let Some(old) = self.specialization
            && let Some(def) = ctx.catalog.specialization(old)
        {
            let name = def.name.clone();
            let deltas = def.flavors.clone();
            self.change_flavors(ctx.turn, player, city, ctx.catalog, &name, &deltas, false);
        }

        self.specialization = new;

        if let Some(id) = new
            && let Some(def) = ctx.catalog.specialization(id)
        {
            let name = def.name.clone();
            let deltas = def.flavors.clone();
            self.change_flavors(ctx.turn, player, city, ctx.catalog, &name, &deltas, true);
        }

        true
    }

    /// Propagate the player's active city-level flavor sources into a newly
    /// founded city so it does not start from a blank accumulator.
    pub fn seed_flavors_from_player(&mut self, ctx: &mut TurnCtx) {
        let player = ctx.player.id();
        let city = ctx.city.id();
        for (source, deltas) in ctx.player.active_city_flavors() {
            self.change_flavors(ctx.turn, player, city, ctx.catalog, &source, &deltas, true);
        }
    }

    /// Counsel entries of every active strategy, most important first.
    pub fn active_counsel<'a>(&self, catalog: &'a Catalog) -> Vec<&'a AdvisorCounsel> {
        let mut counsel: Vec<&AdvisorCounsel> = (0..catalog.strategy_count())
            .filter(|strategy| self.is_using(*strategy))
            .filter_map(|strategy| catalog.strategy(strategy))
            .filter_map(|def| def.counsel.as_ref())
            .collect();
        counsel.sort_by_key(|c| std::cmp::Reverse(c.importance));
        counsel
    }

    /// One activation pass over every strategy in the catalog.
    pub fn run_turn(&mut self, ctx: &mut TurnCtx) {
        self.refresh_yield_stats(ctx);

        for strategy in 0..ctx.catalog.strategy_count() {
            let Some(def) = ctx.catalog.strategy(strategy) else {
                continue;
            };
            if def.no_minor_civs && ctx.player.is_minor_or_barbarian() {
                continue;
            }

            let obsolete = def
                .tech_obsolete
                .is_some_and(|tech| ctx.player.has_tech(tech));

            let mut test_start = !self.active[strategy];
            if test_start
                && let Some(tech) = def.tech_prereq
                && !ctx.player.has_tech(tech)
            {
                test_start = false;
            }
            if test_start && obsolete {
                test_start = false;
            }

            let mut test_end = false;
            if self.active[strategy] && !def.permanent && def.check_trigger_turns > 0 {
                let adopted = self.turn_adopted[strategy] as u32;
                if (ctx.turn - adopted) % def.check_trigger_turns == 0 {
                    test_end = true;
                }
                if test_end
                    && def.minimum_turns_executed > 0
                    && ctx.turn - adopted < def.minimum_turns_executed
                {
                    test_end = false;
                }
            }

            if !test_start && !test_end {
                continue;
            }

            // An obsolete strategy can never want to be active, which is
            // what ends it on the next recheck.
            let mut should_be_active = false;
            if !obsolete
                && let Some(trigger) = self.triggers[strategy].clone()
            {
                let trigger_ctx = TriggerCtx {
                    turn: ctx.turn,
                    city: ctx.city,
                    player: &*ctx.player,
                    stats: &self.yield_stats,
                    tunables: ctx.tunables,
                    def,
                };
                should_be_active = trigger(&trigger_ctx);
            }
            if should_be_active
                && let Some(veto) = ctx.veto
                && veto(strategy, ctx.player.id(), ctx.city.id()) == Some(false)
            {
                should_be_active = false;
            }

            // Asymmetric by intent: a firing trigger only adopts during a
            // start test, and a silent trigger only ends during an end test.
            // All other combinations leave the state alone.
            if should_be_active {
                if test_start {
                    self.adopt(ctx, strategy);
                }
            } else if !test_start && test_end {
                self.end(ctx, strategy);
            }
        }
    }

    fn refresh_yield_stats(&mut self, ctx: &TurnCtx) {
        let mut rates100 = [0; YIELD_COUNT];
        for yield_kind in Yield::ALL {
            rates100[yield_kind.index()] = ctx.city.yield_rate100(yield_kind);
        }
        self.yield_stats = YieldStats::compute(&rates100, ctx.city.population(), ctx.tunables);
    }

    fn adopt(&mut self, ctx: &mut TurnCtx, strategy: StrategyId) {
        self.active[strategy] = true;
        self.turn_adopted[strategy] = ctx.turn as i32;

        let def = ctx.catalog.strategy(strategy).unwrap_or_else(|| {
            unreachable!("adopt is only called for strategies present in the catalog")
        });
        let name = def.name.clone();
        let deltas = def.flavors.clone();

        tracing::debug!(strategy = %name, turn = ctx.turn, "city strategy adopted");
        self.record(
            ctx.turn,
            ctx.player.id(),
            ctx.city.id(),
            LogEvent::StrategyStarted {
                strategy: name.clone(),
            },
        );
        self.change_flavors(
            ctx.turn,
            ctx.player.id(),
            ctx.city.id(),
            ctx.catalog,
            &name,
            &deltas,
            true,
        );
    }

    fn end(&mut self, ctx: &mut TurnCtx, strategy: StrategyId) {
        self.active[strategy] = false;
        self.turn_adopted[strategy] = NOT_ADOPTED;

        let def = ctx.catalog.strategy(strategy).unwrap_or_else(|| {
            unreachable!("end is only called for strategies present in the catalog")
        });
        let name = def.name.clone();
        let deltas = def.flavors.clone();

        tracing::debug!(strategy = %name, turn = ctx.turn, "city strategy ended");
        self.record(
            ctx.turn,
            ctx.player.id(),
            ctx.city.id(),
            LogEvent::StrategyEnded {
                strategy: name.clone(),
            },
        );
        self.change_flavors(
            ctx.turn,
            ctx.player.id(),
            ctx.city.id(),
            ctx.catalog,
            &name,
            &deltas,
            false,
        );
    }

    /// Apply one source's flavor deltas, log each non-zero change, and tell
    /// the advisors their weight tables are stale.
    fn change_flavors(
        &mut self,
        turn: u32,
        player: PlayerId,
        city: CityId,
        catalog: &Catalog,
        source: &str,
        deltas: &[i32],
        start: bool,
    ) {
        let sign = if start { 1 } else { -1 };
        let changes = self.flavors.apply(deltas, sign);
        for (flavor, change) in changes {
            let value = self.flavors.get(flavor);
            self.record(
                turn,
                player,
                city,
                LogEvent::FlavorChange {
                    flavor: catalog.flavor_name(flavor).to_string(),
                    value,
                    change,
                    source: source.to_string(),
                    start,
                },
            );
        }
        self.advisors.on_flavors_changed(&self.flavors);
    }

    pub(crate) fn record(&mut self, turn: u32, player: PlayerId, city: CityId, event: LogEvent) {
        if let Some(log) = self.log.as_deref_mut() {
            log.record(&LogRecord {
                turn,
                player,
                city,
                event,
            });
        }
    }
}
