//! Hurry choice: what should this city buy outright?
//!
//! Same weighted-list machinery as production, but the stages run in a
//! different order: purchases reweight by build time before the sanity
//! pass, so an advisor's final verdict sees the time-discounted weight.

use crate::advisors::{Sanity, SanityCtx};
use crate::buildable::{BuildKind, Buildable};
use crate::catalog::UnitTypeId;
use crate::log::{DumpStage, LogEvent, Pipeline};
use crate::production::candidate_name;
use crate::query::PurchaseCurrency;
use crate::strategy::{CityStrategyAi, TurnCtx};
use crate::weighted::{Seed, WeightedList};

/// Per-call-site seed for the hurry draw, mixed with the city id.
const HURRY_CHOICE_SEED: u64 = 0xe362_f42a;

/// What the caller wants bought.
#[derive(Debug, Clone, Copy)]
pub struct HurryRequest {
    /// Restrict the candidate list to units.
    pub unit_only: bool,
    pub currency: PurchaseCurrency,
}

fn purchasable_with_supply(ctx: &TurnCtx, unit: UnitTypeId, currency: PurchaseCurrency) -> bool {
    let Some(def) = ctx.catalog.unit(unit) else {
        return false;
    };
    if !ctx.player.has_supply_room() && def.military_support && !def.supply_exempt {
        return false;
    }
    ctx.city.can_purchase(BuildKind::Unit, unit, currency)
}

impl CityStrategyAi {
    /// Pick the best purchase for this city, or `None` when nothing is
    /// worth buying.
    pub fn choose_hurry(&mut self, ctx: &mut TurnCtx, request: &HurryRequest) -> Option<Buildable> {
        let mut list = self.generate_purchases(ctx, request);

        self.record(
            ctx.turn,
            ctx.player.id(),
            ctx.city.id(),
            LogEvent::WeightDump {
                pipeline: Pipeline::Hurry,
                stage: DumpStage::Pre,
                candidates: list
                    .iter()
                    .map(|(item, weight)| crate::log::LoggedCandidate {
                        kind: item.kind,
                        name: candidate_name(ctx.catalog, item.kind, item.index),
                        weight,
                        turns: item.turns_to_build,
                    })
                    .collect(),
            },
        );

        list.stable_sort_descending();
        for i in 0..list.len() {
            let turns = list.item(i).turns_to_build;
            let reweighted = ctx.tunables.reweight_by_turns_left(list.weight(i), turns);
            list.set_weight(i, reweighted);
        }

        let mut kept = self.purchase_sanity_pass(ctx, &list);
        kept.stable_sort_descending();

        self.record(
            ctx.turn,
            ctx.player.id(),
            ctx.city.id(),
            LogEvent::WeightDump {
                pipeline: Pipeline::Hurry,
                stage: DumpStage::Post,
                candidates: kept
                    .iter()
                    .map(|(item, weight)| crate::log::LoggedCandidate {
                        kind: item.kind,
                        name: candidate_name(ctx.catalog, item.kind, item.index),
                        weight,
                        turns: item.turns_to_build,
                    })
                    .collect(),
            },
        );

        let seed = Seed::from_raw(HURRY_CHOICE_SEED).mix(ctx.city.id());
        let chosen = *kept.choose_above_percent_threshold(ctx.tunables.production_choice_cutoff, seed)?;

        // Buying the requested unit answers the muster as surely as
        // building it would.
        if chosen.kind == BuildKind::UnitForOperation {
            ctx.player.reset_ops_build_skipped();
        }

        self.record(
            ctx.turn,
            ctx.player.id(),
            ctx.city.id(),
            LogEvent::HurryChosen {
                kind: chosen.kind,
                name: candidate_name(ctx.catalog, chosen.kind, chosen.index),
                weight: chosen.value,
                currency: request.currency,
            },
        );
        Some(chosen)
    }

    fn generate_purchases(
        &mut self,
        ctx: &mut TurnCtx,
        request: &HurryRequest,
    ) -> WeightedList<Buildable> {
        let mut list: WeightedList<Buildable> = WeightedList::new();
        let city = ctx.city.id();

        // Pending operation and army slots are worth real money; faith
        // never funds them.
        if request.currency != PurchaseCurrency::Faith {
            if ctx.player.operation_musters_here(city)
                && let Some(unit) = ctx.player.unit_for_operation(city)
                && purchasable_with_supply(ctx, unit, request.currency)
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
                ctx.player.bump_ops_build_skipped();
            }
            if let Some(unit) = ctx.player.unit_for_army(city)
                && purchasable_with_supply(ctx, unit, request.currency)
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
            // Faith buys religious pressure through dedicated channels, not
            // through this pipeline; special units are never bought at all.
            if request.currency == PurchaseCurrency::Faith
                && (def.spreads_religion || def.removes_heresy || def.faith_cost <= 0 || def.special)
            {
                continue;
            }
            if !ctx.player.has_supply_room() && def.military_support && !def.supply_exempt {
                continue;
            }
            if !ctx.city.can_purchase(BuildKind::Unit, unit, request.currency) {
                continue;
            }
            let weight = self.advisors.unit.weight(unit);
            if weight > 0 {
                let turns = ctx.city.turns_to_build(BuildKind::Unit, unit);
                list.push(Buildable::new(BuildKind::Unit, unit, turns, weight), weight);
            }
        }

        if !request.unit_only {
            for building in 0..ctx.catalog.building_count() {
                if ctx.catalog.building(building).is_none() {
                    continue;
                }
                if !ctx
                    .city
                    .can_purchase(BuildKind::Building, building, request.currency)
                {
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
        }

        list
    }

    fn purchase_sanity_pass(
        &mut self,
        ctx: &mut TurnCtx,
        list: &WeightedList<Buildable>,
    ) -> WeightedList<Buildable> {
        let building_counts = ctx.player.total_building_counts();
        let mut kept: WeightedList<Buildable> = WeightedList::new();

        for (candidate, weight) in list.iter() {
            let sanity_ctx = SanityCtx {
                city: ctx.city,
                player: &*ctx.player,
                plot: ctx.city.plot_stats(),
                existing_buildings: &building_counts,
            };
            let verdict = match candidate.kind {
                BuildKind::Unit | BuildKind::UnitForArmy | BuildKind::UnitForOperation => self
                    .advisors
                    .unit
                    .check_sanity(candidate.index, false, true, weight, &sanity_ctx),
                BuildKind::Building => {
                    self.advisors
                        .building
                        .check_sanity(candidate.index, weight, &sanity_ctx)
                }
                BuildKind::Project | BuildKind::Process => {
                    debug_assert!(false, "projects and processes cannot be purchased");
                    continue;
                }
            };

            match verdict {
                Sanity::Keep(mut new_weight) => {
                    // Money already sunk into a building argues for
                    // finishing it now.
                    if candidate.kind == BuildKind::Building {
                        let invested = ctx.city.invested_production_pct(candidate.index);
                        if invested > 0 && invested < ctx.tunables.hurry_finish_boost_below_pct {
                            new_weight = new_weight * (100 + invested) / invested;
                        }
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, UnitDef};
    use crate::testutil::{
        TestCity, TestPlayer, advisors_with, combat_unit, engine_with_advisors, scripted_advisor,
        simple_building, test_catalog,
    };
    use crate::tunables::Tunables;

    fn make_ctx<'a>(
        catalog: &'a Catalog,
        city: &'a TestCity,
        player: &'a mut TestPlayer,
        tunables: &'a Tunables,
    ) -> TurnCtx<'a> {
        TurnCtx {
            turn: 50,
            catalog,
            city,
            player,
            tunables,
            veto: None,
        }
    }

    const GOLD: HurryRequest = HurryRequest {
        unit_only: false,
        currency: PurchaseCurrency::Gold,
    };

    #[test]
    fn nothing_purchasable_returns_none() {
        let catalog = test_catalog();
        let mut ai = engine_with_advisors(&catalog, advisors_with(scripted_advisor(), scripted_advisor()));
        let city = TestCity::default();
        let mut player = TestPlayer::default();
        let tunables = Tunables::default();

        let mut ctx = make_ctx(&catalog, &city, &mut player, &tunables);
        assert_eq!(ai.choose_hurry(&mut ctx, &GOLD), None);
    }

    #[test]
    fn unit_only_request_ignores_buildings() {
        let mut catalog = test_catalog();
        let spear = catalog.add_unit(combat_unit("spearman"));
        let granary = catalog.add_building(simple_building("granary"));

        let mut unit_advisor = scripted_advisor();
        unit_advisor.weights.insert(spear, 10);
        let mut building_advisor = scripted_advisor();
        building_advisor.weights.insert(granary, 10_000);
        let mut ai = engine_with_advisors(&catalog, advisors_with(unit_advisor, building_advisor));

        let mut city = TestCity::default();
        city.purchasable = vec![
            (BuildKind::Unit, spear, PurchaseCurrency::Gold),
            (BuildKind::Building, granary, PurchaseCurrency::Gold),
        ];
        let mut player = TestPlayer::default();
        let tunables = Tunables::default();

        let request = HurryRequest {
            unit_only: true,
            currency: PurchaseCurrency::Gold,
        };
        let mut ctx = make_ctx(&catalog, &city, &mut player, &tunables);
        let chosen = ai.choose_hurry(&mut ctx, &request).unwrap();
        assert_eq!(chosen.kind, BuildKind::Unit);
        assert_eq!(chosen.index, spear);
    }

    #[test]
    fn faith_purchases_exclude_religious_and_special_units() {
        let mut catalog = test_catalog();
        let missionary = catalog.add_unit(UnitDef {
            name: "missionary".into(),
            spreads_religion: true,
            faith_cost: 200,
            ..UnitDef::default()
        });
        let inquisitor = catalog.add_unit(UnitDef {
            name: "inquisitor".into(),
            removes_heresy: true,
            faith_cost: 200,
            ..UnitDef::default()
        });
        let free_unit = catalog.add_unit(UnitDef {
            name: "scout".into(),
            faith_cost: 0,
            ..UnitDef::default()
        });
        let hero = catalog.add_unit(UnitDef {
            name: "hero".into(),
            special: true,
            faith_cost: 500,
            ..UnitDef::default()
        });
        let warrior_monk = catalog.add_unit(UnitDef {
            name: "warrior monk".into(),
            combat: 30,
            faith_cost: 400,
            military_support: true,
            ..UnitDef::default()
        });

        let mut unit_advisor = scripted_advisor();
        for unit in [missionary, inquisitor, free_unit, hero, warrior_monk] {
            unit_advisor.weights.insert(unit, 100);
        }
        let mut ai = engine_with_advisors(&catalog, advisors_with(unit_advisor, scripted_advisor()));

        let mut city = TestCity::default();
        city.purchasable = [missionary, inquisitor, free_unit, hero, warrior_monk]
            .iter()
            .map(|u| (BuildKind::Unit, *u, PurchaseCurrency::Faith))
            .collect();
        let mut player = TestPlayer::default();
        let tunables = Tunables::default();

        let request = HurryRequest {
            unit_only: true,
            currency: PurchaseCurrency::Faith,
        };
        let mut ctx = make_ctx(&catalog, &city, &mut player, &tunables);
        let chosen = ai.choose_hurry(&mut ctx, &request).unwrap();
        assert_eq!(chosen.index, warrior_monk);
    }

    #[test]
    fn supply_cap_blocks_supported_units_but_not_exempt_ones() {
        let mut catalog = test_catalog();
        let spear = catalog.add_unit(combat_unit("spearman"));
        let militia = catalog.add_unit(UnitDef {
            name: "militia".into(),
            combat: 10,
            military_support: true,
            supply_exempt: true,
            ..UnitDef::default()
        });

        let mut unit_advisor = scripted_advisor();
        unit_advisor.weights.insert(spear, 10_000);
        unit_advisor.weights.insert(militia, 100);
        let mut ai = engine_with_advisors(&catalog, advisors_with(unit_advisor, scripted_advisor()));

        let mut city = TestCity::default();
        city.purchasable = vec![
            (BuildKind::Unit, spear, PurchaseCurrency::Gold),
            (BuildKind::Unit, militia, PurchaseCurrency::Gold),
        ];
        let mut player = TestPlayer::default();
        player.supply_room = false;
        let tunables = Tunables::default();

        let request = HurryRequest {
            unit_only: true,
            currency: PurchaseCurrency::Gold,
        };
        let mut ctx = make_ctx(&catalog, &city, &mut player, &tunables);
        let chosen = ai.choose_hurry(&mut ctx, &request).unwrap();
        assert_eq!(chosen.index, militia);
    }

    #[test]
    fn gold_purchases_seed_the_pending_operation_unit() {
        let mut catalog = test_catalog();
        let spear = catalog.add_unit(combat_unit("spearman"));

        // No advisor interest at all; the muster alone carries the weight.
        let mut ai =
            engine_with_advisors(&catalog, advisors_with(scripted_advisor(), scripted_advisor()));

        let mut city = TestCity::default();
        city.purchasable = vec![(BuildKind::Unit, spear, PurchaseCurrency::Gold)];
        let mut player = TestPlayer::default();
        player.operation_unit = Some(spear);
        let tunables = Tunables::default();

        let mut ctx = make_ctx(&catalog, &city, &mut player, &tunables);
        let chosen = ai.choose_hurry(&mut ctx, &GOLD).unwrap();
        assert_eq!(
            (chosen.kind, chosen.index),
            (BuildKind::UnitForOperation, spear)
        );
        // Buying the promised unit clears the pressure counter.
        assert_eq!(player.ops_skipped, 0);
    }

    #[test]
    fn unanswered_operation_purchase_raises_pressure() {
        let mut catalog = test_catalog();
        let spear = catalog.add_unit(combat_unit("spearman"));
        let granary = catalog.add_building(simple_building("granary"));

        let mut unit_advisor = scripted_advisor();
        unit_advisor
            .rejects
            .insert(spear, crate::advisors::RejectReason::TooExpensive);
        let mut building_advisor = scripted_advisor();
        building_advisor.weights.insert(granary, 50);
        let mut ai = engine_with_advisors(&catalog, advisors_with(unit_advisor, building_advisor));

        let mut city = TestCity::default();
        city.purchasable = vec![
            (BuildKind::Unit, spear, PurchaseCurrency::Gold),
            (BuildKind::Building, granary, PurchaseCurrency::Gold),
        ];
        let mut player = TestPlayer::default();
        player.operation_unit = Some(spear);
        let tunables = Tunables::default();

        let mut ctx = make_ctx(&catalog, &city, &mut player, &tunables);
        let chosen = ai.choose_hurry(&mut ctx, &GOLD).unwrap();
        assert_eq!(chosen.index, granary);
        assert_eq!(player.ops_skipped, 1);
    }

    #[test]
    fn faith_never_funds_operation_requests() {
        let mut catalog = test_catalog();
        let spear = catalog.add_unit(combat_unit("spearman"));

        let mut ai =
            engine_with_advisors(&catalog, advisors_with(scripted_advisor(), scripted_advisor()));

        let mut city = TestCity::default();
        city.purchasable = vec![(BuildKind::Unit, spear, PurchaseCurrency::Faith)];
        let mut player = TestPlayer::default();
        player.operation_unit = Some(spear);
        let tunables = Tunables::default();

        let request = HurryRequest {
            unit_only: true,
            currency: PurchaseCurrency::Faith,
        };
        let mut ctx = make_ctx(&catalog, &city, &mut player, &tunables);
        assert_eq!(ai.choose_hurry(&mut ctx, &request), None);
        assert_eq!(player.ops_skipped, 0);
    }

    #[test]
    fn partially_built_building_gets_finish_boost() {
        let mut catalog = test_catalog();
        let granary = catalog.add_building(simple_building("granary"));
        let temple = catalog.add_building(simple_building("temple"));

        let mut building_advisor = scripted_advisor();
        building_advisor.weights.insert(granary, 100);
        building_advisor.weights.insert(temple, 120);
        let mut ai = engine_with_advisors(&catalog, advisors_with(scripted_advisor(), building_advisor));

        let mut city = TestCity::default();
        city.purchasable = vec![
            (BuildKind::Building, granary, PurchaseCurrency::Gold),
            (BuildKind::Building, temple, PurchaseCurrency::Gold),
        ];
        // Ten percent invested in the granary: weight scales by 110/10.
        city.invested_pct.insert(granary, 10);
        city.invested_pct.insert(temple, 60);
        let mut player = TestPlayer::default();
        let tunables = Tunables::default();

        let mut ctx = make_ctx(&catalog, &city, &mut player, &tunables);
        let chosen = ai.choose_hurry(&mut ctx, &GOLD).unwrap();
        assert_eq!(chosen.index, granary);
    }

    #[test]
    fn untouched_buildings_get_no_finish_boost() {
        let mut catalog = test_catalog();
        let granary = catalog.add_building(simple_building("granary"));
        let temple = catalog.add_building(simple_building("temple"));

        let mut building_advisor = scripted_advisor();
        building_advisor.weights.insert(granary, 30);
        building_advisor.weights.insert(temple, 30);
        let mut ai =
            engine_with_advisors(&catalog, advisors_with(scripted_advisor(), building_advisor));

        let mut city = TestCity::default();
        city.purchasable = vec![
            (BuildKind::Building, granary, PurchaseCurrency::Gold),
            (BuildKind::Building, temple, PurchaseCurrency::Gold),
        ];
        // Nothing sunk into the granary yet; the temple is slightly begun
        // and scales by 110/10. The granary must keep its raw weight and
        // fall below the draw cutoff.
        city.invested_pct.insert(temple, 10);
        let mut player = TestPlayer::default();
        let tunables = Tunables::default();

        let mut ctx = make_ctx(&catalog, &city, &mut player, &tunables);
        let chosen = ai.choose_hurry(&mut ctx, &GOLD).unwrap();
        assert_eq!(chosen.index, temple);
    }

    #[test]
    fn rejected_purchases_never_come_back() {
        let mut catalog = test_catalog();
        let spear = catalog.add_unit(combat_unit("spearman"));

        let mut unit_advisor = scripted_advisor();
        unit_advisor.weights.insert(spear, 100);
        unit_advisor
            .rejects
            .insert(spear, crate::advisors::RejectReason::TooExpensive);
        let mut ai = engine_with_advisors(&catalog, advisors_with(unit_advisor, scripted_advisor()));

        let mut city = TestCity::default();
        city.purchasable = vec![(BuildKind::Unit, spear, PurchaseCurrency::Gold)];
        let mut player = TestPlayer::default();
        let tunables = Tunables::default();

        let mut ctx = make_ctx(&catalog, &city, &mut player, &tunables);
        assert_eq!(ai.choose_hurry(&mut ctx, &GOLD), None);
    }
}
