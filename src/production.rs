//! Production choice: what should this city build next?
//!
//! The pipeline builds a weighted candidate list from every trainable,
//! constructible, creatable, and maintainable item, runs each survivor
//! through its advisor's sanity check, penalizes long builds, and finally
//! draws among the top candidates with a deterministic seeded roll.

use crate::advisors::{Sanity, SanityCtx};
use crate::buildable::{BuildKind, Buildable};
use crate::catalog::{BuildingTypeId, Catalog, UnitTypeId};
use crate::log::{DumpStage, LogEvent, LoggedCandidate, Pipeline};
use crate::strategy::{CityStrategyAi, TurnCtx};
use crate::weighted::{Seed, WeightedList};

/// Per-call-site seed for the production draw, mixed with the city id so
/// sibling cities diverge.
const PRODUCTION_CHOICE_SEED: u64 = 0x0e36_d18b;

/// Caller-side knobs for one production decision.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductionOptions {
    /// The caller wants a unit and is willing to interrupt a building to
    /// get one. Buildings are not eligible for continuation in this mode.
    pub interrupt_buildings: bool,
    /// Allow abandoning a wonder mid-build.
    pub interrupt_wonders: bool,
    pub ignore_building: Option<BuildingTypeId>,
    pub ignore_unit: Option<UnitTypeId>,
}

/// Outcome of one production decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductionDecision {
    /// Keep whatever the city is doing (possibly nothing).
    NoChange,
    /// Stick with the current build; it is still competitive.
    Continue(Buildable),
    /// Switch to a new item, optionally suggesting a rush.
    Order { item: Buildable, rush: bool },
}

pub(crate) fn candidate_name(catalog: &Catalog, kind: BuildKind, index: usize) -> String {
    let name = match kind {
        BuildKind::Unit | BuildKind::UnitForArmy | BuildKind::UnitForOperation => {
            catalog.unit(index).map(|d| d.name.as_str())
        }
        BuildKind::Building => catalog.building(index).map(|d| d.name.as_str()),
        BuildKind::Project => catalog.project(index).map(|d| d.name.as_str()),
        BuildKind::Process => catalog.process(index).map(|d| d.name.as_str()),
    };
    name.unwrap_or("unknown").to_string()
}

fn dump(list: &WeightedList<Buildable>, catalog: &Catalog) -> Vec<LoggedCandidate> {
    list.iter()
        .map(|(item, weight)| LoggedCandidate {
            kind: item.kind,
            name: candidate_name(catalog, item.kind, item.index),
            weight,
            turns: item.turns_to_build,
        })
        .collect()
}

impl CityStrategyAi {
    /// Decide what the city should produce this turn.
    pub fn choose_production(
        &mut self,
        ctx: &mut TurnCtx,
        options: &ProductionOptions,
    ) -> ProductionDecision {
        let current = ctx.city.current_build();

        // A combat unit already in progress outranks an interrupting
        // request for more units.
        if options.interrupt_buildings
            && let Some((kind, index)) = current
            && kind.is_unit()
            && ctx.catalog.unit(index).is_some_and(|u| u.is_combat())
        {
            return ProductionDecision::NoChange;
        }
        if !options.interrupt_wonders && ctx.city.is_building_wonder() {
            return ProductionDecision::NoChange;
        }
        // A victory-enabling project is never abandoned while the victory
        // is still on the table.
        if let Some((BuildKind::Project, index)) = current
            && let Some(def) = ctx.catalog.project(index)
            && let Some(victory) = def.victory_prereq
            && ctx.player.is_victory_valid(victory)
        {
            let turns = ctx.city.turns_to_build(BuildKind::Project, index);
            return ProductionDecision::Continue(Buildable::new(
                BuildKind::Project,
                index,
                turns,
                0,
            ));
        }

        let mut precheck = self.generate_candidates(ctx, options);

        self.record(
            ctx.turn,
            ctx.player.id(),
            ctx.city.id(),
            LogEvent::WeightDump {
                pipeline: Pipeline::Production,
                stage: DumpStage::Pre,
                candidates: dump(&precheck, ctx.catalog),
            },
        );
        precheck.stable_sort_descending();

        let mut buildables = self.sanity_pass(ctx, &precheck);
        for i in 0..buildables.len() {
            let turns = buildables.item(i).turns_to_build;
            let reweighted = ctx.tunables.reweight_by_turns_left(buildables.weight(i), turns);
            buildables.set_weight(i, reweighted);
        }
        buildables.stable_sort_descending();

        self.record(
            ctx.turn,
            ctx.player.id(),
            ctx.city.id(),
            LogEvent::WeightDump {
                pipeline: Pipeline::Production,
                stage: DumpStage::Post,
                candidates: dump(&buildables, ctx.catalog),
            },
        );

        // Nothing survived sanity: fall back to the best raw candidate
        // rather than idling the city.
        if buildables.is_empty() {
            if precheck.is_empty() {
                return ProductionDecision::NoChange;
            }
            let item = *precheck.item(0);
            return self.finish(ctx, &buildables, item, false);
        }

        // Inertia: keep the current build while it still carries at least
        // half the top weight. A victory-enabling project inside that
        // window is taken even when it is not the current build.
        let top_weight = buildables.weight(0);
        for i in 0..buildables.len() {
            if buildables.weight(i) * 2 < top_weight {
                break;
            }
            let candidate = *buildables.item(i);
            if candidate.kind == BuildKind::Project
                && let Some(def) = ctx.catalog.project(candidate.index)
                && let Some(victory) = def.victory_prereq
                && ctx.player.is_victory_valid(victory)
            {
                let continued = candidate.matches_current(current);
                return self.finish(ctx, &buildables, candidate, continued);
            }
            if !candidate.matches_current(current) {
                continue;
            }
            let keep = match candidate.kind {
                // Processes are idle work; rechoose freely.
                BuildKind::Process => false,
                BuildKind::Building => !options.interrupt_buildings,
                _ => true,
            };
            if keep {
                return self.finish(ctx, &buildables, candidate, true);
            }
        }

        // A process with defensive value at the top of the list is an
        // emergency; take it without a roll.
        let top = *buildables.item(0);
        if top.kind == BuildKind::Process
            && ctx
                .catalog
                .process(top.index)
                .is_some_and(|p| p.defense_value > 0)
        {
            return self.finish(ctx, &buildables, top, false);
        }

        let seed = Seed::from_raw(PRODUCTION_CHOICE_SEED).mix(ctx.city.id());
        let chosen = buildables
            .choose_above_percent_threshold(ctx.tunables.production_choice_cutoff, seed)
            .copied()
            .unwrap_or(top);
        self.finish(ctx, &buildables, chosen, false)
    }

    /// Build the raw candidate list: operation and army requests first,
    /// then plain units, buildings, projects, and finally processes.
    fn generate_candidates(
        &mut self,
        ctx: &mut TurnCtx,
        options: &ProductionOptions,
    ) -> WeightedList<Buildable> {
        let mut list: WeightedList<Buildable> = WeightedList::new();
        let city = ctx.city.id();
        let automated = ctx.city.is_human_automated();

        // Automated human cities never commandeer units for operations.
        if !automated {
            if ctx.player.operation_musters_here(city)
                && let Some(unit) = ctx.player.unit_for_operation(city)
                && ctx.city.can_train(unit, false)
            {
                let flavor = ctx.player.offense_flavor() + ctx.player.ops_build_skipped();
                let weight = ctx.tunables.operation_unit_base_weight
                    + flavor * ctx.tunables.operation_unit_flavor_multiplier
                    + self.advisors.unit.weight(unit);
                let turns = ctx.city.turns_to_build(BuildKind::UnitForOperation, unit);
                list.push(
                    Buildable::new(BuildKind::UnitForOperation, unit, turns, weight),
                    weight,
                );
                // Pressure rises every turn the request goes unanswered.
                ctx.player.bump_ops_build_skipped();
            }
            if let Some(unit) = ctx.player.unit_for_army(city)
                && ctx.city.can_train(unit, false)
            {
                let weight = ctx.tunables.army_unit_base_weight
                    + ctx.player.offense_flavor() * ctx.tunables.operation_unit_flavor_multiplier;
                let turns = ctx.city.turns_to_build(BuildKind::UnitForArmy, unit);
                list.push(
                    Buildable::new(BuildKind::UnitForArmy, unit, turns, weight),
                    weight,
                );
            }
        }

        for unit in 0..ctx.catalog.unit_count() {
            let Some(def) = ctx.catalog.unit(unit) else {
                continue;
            };
            if options.ignore_unit == Some(unit) {
                continue;
            }
            // Automated human cities train nothing but improvement units:
            // no soldiers, no settlers.
            if automated && (def.is_combat() || def.work_rate == 0) {
                continue;
            }
            if !ctx.city.can_train(unit, false) {
                continue;
            }
            let weight = self.advisors.unit.weight(unit);
            if weight > 0 {
                let turns = ctx.city.turns_to_build(BuildKind::Unit, unit);
                list.push(Buildable::new(BuildKind::Unit, unit, turns, weight), weight);
            }
        }

        let losing_money = ctx.player.is_losing_money();
        for building in 0..ctx.catalog.building_count() {
            let Some(def) = ctx.catalog.building(building) else {
                continue;
            };
            if options.ignore_building == Some(building) {
                continue;
            }
            // Automated human cities are conservative: no wonders, and no
            // new upkeep while the treasury is bleeding.
            if automated
                && (def.is_wonder
                    || (losing_money && def.maintenance > 0 && def.defense_modifier == 0))
            {
                continue;
            }
            if !ctx.city.can_construct(building, false) {
                continue;
            }
            let weight = self.advisors.building.weight(building);
            if weight > 0 {
                let turns = ctx.city.turns_to_build(BuildKind::Building, building);
                list.push(
                    Buildable::new(BuildKind::Building, building, turns, weight),
                    weight,
                );
            }
        }

        for project in 0..ctx.catalog.project_count() {
            if ctx.catalog.project(project).is_none() {
                continue;
            }
            if !ctx.city.can_create(project, false) {
                continue;
            }
            let weight = self.advisors.project.weight(project);
            if weight > 0 {
                let turns = ctx.city.turns_to_build(BuildKind::Project, project);
                list.push(
                    Buildable::new(BuildKind::Project, project, turns, weight),
                    weight,
                );
            }
        }

        // Processes only become interesting once the city has real
        // production to convert, or when nothing else is available.
        let process_worthy = ctx.city.raw_production_per_turn100()
            >= ctx.tunables.process_fallback_production100
            || list.is_empty();
        if process_worthy {
            for process in 0..ctx.catalog.process_count() {
                let Some(def) = ctx.catalog.process(process) else {
                    continue;
                };
                if !ctx.city.can_maintain(process, false) {
                    continue;
                }
                let weight = if def.defense_value > 0 {
                    ctx.tunables.defense_process_weight
                } else {
                    self.advisors.process.weight(process)
                };
                if weight > 0 {
                    list.push(
                        Buildable::new(BuildKind::Process, process, 1, weight),
                        weight,
                    );
                }
            }
        }

        list
    }

    /// Run each candidate through its advisor's sanity check, keeping the
    /// re-derived weight and logging rejections.
    fn sanity_pass(
        &mut self,
        ctx: &mut TurnCtx,
        precheck: &WeightedList<Buildable>,
    ) -> WeightedList<Buildable> {
        let building_counts = ctx.player.total_building_counts();
        let mut kept: WeightedList<Buildable> = WeightedList::new();
        let mut first_operation_unit = true;

        for (candidate, weight) in precheck.iter() {
            let sanity_ctx = SanityCtx {
                city: ctx.city,
                player: &*ctx.player,
                plot: ctx.city.plot_stats(),
                existing_buildings: &building_counts,
            };
            let verdict = match candidate.kind {
                BuildKind::Unit | BuildKind::UnitForArmy => self.advisors.unit.check_sanity(
                    candidate.index,
                    false,
                    false,
                    weight,
                    &sanity_ctx,
                ),
                BuildKind::UnitForOperation => self.advisors.unit.check_sanity(
                    candidate.index,
                    true,
                    false,
                    weight,
                    &sanity_ctx,
                ),
                BuildKind::Building => {
                    self.advisors
                        .building
                        .check_sanity(candidate.index, weight, &sanity_ctx)
                }
                BuildKind::Project => self.advisors.project.check_sanity(candidate.index, weight),
                BuildKind::Process => self.advisors.process.check_sanity(candidate.index, weight),
            };

            match verdict {
                Sanity::Keep(mut new_weight) => {
                    // During early expansion the first escort-quality
                    // operation unit is urgent.
                    if candidate.kind == BuildKind::UnitForOperation && first_operation_unit {
                        if ctx.player.is_early_expansion() {
                            new_weight *= 3;
                        }
                        first_operation_unit = false;
                    }
                    let mut item = *candidate;
                    item.value = new_weight;
                    kept.push(item, new_weight);
                }
                Sanity::Reject(reason) => {
                    self.record(
                        ctx.turn,
                        ctx.player.id(),
                        ctx.city.id(),
                        LogEvent::CandidateRejected {
                            kind: candidate.kind,
                            name: candidate_name(ctx.catalog, candidate.kind, candidate.index),
                            weight,
                            reason,
                        },
                    );
                }
            }
        }

        kept
    }

    /// Commit a selection: maintain the empire-wide pressure counters, log
    /// the choice, and wrap it in the right decision variant.
    fn finish(
        &mut self,
        ctx: &mut TurnCtx,
        buildables: &WeightedList<Buildable>,
        chosen: Buildable,
        continued: bool,
    ) -> ProductionDecision {
        if chosen.kind == BuildKind::UnitForOperation {
            ctx.player.reset_ops_build_skipped();
        }

        let is_settler = |kind: BuildKind, index: usize| {
            kind.is_unit() && ctx.catalog.unit(index).is_some_and(|u| u.founds_city)
        };
        let settler_in_list = buildables
            .iter()
            .any(|(item, _)| is_settler(item.kind, item.index));
        if is_settler(chosen.kind, chosen.index) || !settler_in_list {
            ctx.player.reset_settler_build_skipped();
        } else {
            ctx.player.bump_settler_build_skipped();
        }

        let rush = !continued
            && chosen.turns_to_build
                > ctx.tunables.rush_over_turns * ctx.player.train_percent() / 100;

        self.record(
            ctx.turn,
            ctx.player.id(),
            ctx.city.id(),
            LogEvent::ProductionChosen {
                kind: chosen.kind,
                name: candidate_name(ctx.catalog, chosen.kind, chosen.index),
                weight: chosen.value,
                turns: chosen.turns_to_build,
                rush,
                continued,
            },
        );

        if continued {
            ProductionDecision::Continue(chosen)
        } else {
            ProductionDecision::Order { item: chosen, rush }
        }
    }
}
