use polis_ai::catalog::{SpecializationDef, StrategyDef};
use polis_ai::production::ProductionOptions;
use polis_ai::save::SavedCityAi;
use polis_ai::strategy::TurnCtx;
use polis_ai::testutil::{
    TestCity, TestPlayer, advisors_with, combat_unit, engine, engine_with_advisors,
    scripted_advisor, simple_building, test_catalog,
};
use polis_ai::tunables::Tunables;

#[test]
fn restored_engine_continues_identically_to_the_original() {
    let mut catalog = test_catalog();
    let spear = catalog.add_unit(combat_unit("spearman"));
    let granary = catalog.add_building(simple_building("granary"));
    let mut def = StrategyDef::new("SMALL_CITY", "small_city", catalog.flavor_count());
    def.flavors[1] = 6;
    def.check_trigger_turns = 1;
    let strategy = catalog.add_strategy(def);
    let spec = catalog.add_specialization(SpecializationDef {
        name: "forge".into(),
        flavors: vec![0; catalog.flavor_count()],
        yield_focus: None,
    });

    let build_advisors = || {
        let mut unit_advisor = scripted_advisor();
        unit_advisor.weights.insert(spear, 80);
        let mut building_advisor = scripted_advisor();
        building_advisor.weights.insert(granary, 75);
        advisors_with(unit_advisor, building_advisor)
    };

    let mut city = TestCity::default();
    city.population = 4;
    city.trainable = vec![spear];
    city.constructible = vec![granary];
    let tunables = Tunables::default();

    // Play a few turns on the original engine, then snapshot.
    let mut original = engine_with_advisors(&catalog, build_advisors());
    let mut player = TestPlayer::default();
    for turn in 0..3u32 {
        let mut ctx = TurnCtx {
            turn,
            catalog: &catalog,
            city: &city,
            player: &mut player,
            tunables: &tunables,
            veto: None,
        };
        original.run_turn(&mut ctx);
        if turn == 1 {
            original.set_specialization(&mut ctx, Some(spec));
        }
    }
    assert!(original.is_using(strategy));

    let json = serde_json::to_string_pretty(&original.save()).unwrap();
    let saved: SavedCityAi = serde_json::from_str(&json).unwrap();

    let mut restored = engine_with_advisors(&catalog, build_advisors());
    restored.restore(&catalog, &saved).unwrap();
    assert_eq!(restored.specialization(), Some(spec));
    assert_eq!(restored.turn_adopted(strategy), original.turn_adopted(strategy));

    // Both engines see the same world from here on and must agree.
    let mut player_a = TestPlayer::default();
    let mut player_b = TestPlayer::default();
    for turn in 3..8u32 {
        let mut ctx_a = TurnCtx {
            turn,
            catalog: &catalog,
            city: &city,
            player: &mut player_a,
            tunables: &tunables,
            veto: None,
        };
        original.run_turn(&mut ctx_a);
        let decision_a = original.choose_production(&mut ctx_a, &ProductionOptions::default());

        let mut ctx_b = TurnCtx {
            turn,
            catalog: &catalog,
            city: &city,
            player: &mut player_b,
            tunables: &tunables,
            veto: None,
        };
        restored.run_turn(&mut ctx_b);
        let decision_b = restored.choose_production(&mut ctx_b, &ProductionOptions::default());

        assert_eq!(decision_a, decision_b, "diverged at turn {turn}");
        assert_eq!(original.flavors().values(), restored.flavors().values());
    }
}

#[test]
fn default_specialization_fills_in_until_one_is_chosen() {
    let mut catalog = test_catalog();
    let farm = catalog.add_specialization(SpecializationDef {
        name: "farm".into(),
        flavors: vec![0; catalog.flavor_count()],
        yield_focus: None,
    });
    let forge = catalog.add_specialization(SpecializationDef {
        name: "forge".into(),
        flavors: vec![0; catalog.flavor_count()],
        yield_focus: None,
    });

    let mut ai = engine(&catalog);
    assert_eq!(ai.specialization(), None);

    ai.set_default_specialization(Some(farm));
    assert_eq!(ai.specialization(), Some(farm));

    let city = TestCity::default();
    let mut player = TestPlayer::default();
    let tunables = Tunables::default();
    let mut ctx = TurnCtx {
        turn: 1,
        catalog: &catalog,
        city: &city,
        player: &mut player,
        tunables: &tunables,
        veto: None,
    };
    ai.set_specialization(&mut ctx, Some(forge));
    assert_eq!(ai.specialization(), Some(forge));

    // The pair survives a save/load cycle independently.
    let saved = ai.save();
    let mut restored = engine(&catalog);
    restored.restore(&catalog, &saved).unwrap();
    assert_eq!(restored.specialization(), Some(forge));
    assert_eq!(restored.default_specialization(), Some(farm));
}
