use crate::buildings::BuildingType;
use crate::citizen::needs::Need;
use crate::config::SimConfig;
use crate::disasters::DisasterKind;
use crate::test_harness::TestCity;

fn assert_needs_in_range(city: &TestCity, tick: u32) {
    for citizen in city.citizens() {
        let n = citizen.needs;
        for (label, value) in [
            ("health", n.health),
            ("safety", n.safety),
            ("education", n.education),
            ("happiness", n.happiness),
        ] {
            assert!(
                (0.0..=100.0).contains(&value),
                "tick {tick}: citizen {} {label} = {value}",
                citizen.id
            );
        }
    }
}

#[test]
fn needs_stay_bounded_through_a_busy_city() {
    let mut config = SimConfig::default();
    config.residents.resident_move_in_chance = 1.0;
    config.development.level_up_chance = 0.2;
    let mut city = TestCity::with_config(16, config)
        .with_road_row(4, 0, 15)
        .with_building(2, 3, BuildingType::Hospital)
        .with_building(6, 3, BuildingType::School)
        .with_building(10, 3, BuildingType::PoliceStation)
        .with_building(14, 3, BuildingType::FireStation)
        .with_building(0, 5, BuildingType::PowerPlant);
    for x in 1..16 {
        city = city.with_building(x, 5, BuildingType::Residential);
    }
    for x in 0..8 {
        city = city.with_building(x, 6, BuildingType::Commercial);
    }

    for tick in 0..400u32 {
        if tick == 50 {
            assert!(city.trigger(DisasterKind::Fire));
            assert!(city.trigger(DisasterKind::Flood));
        }
        city.tick(1);
        assert_needs_in_range(&city, tick);
    }
}

#[test]
fn hospital_coverage_offsets_decay() {
    let mut config = SimConfig::default();
    config.disasters.difficulty = 0;
    config.residents.resident_move_in_chance = 1.0;
    config.development.level_up_chance = 0.0;
    config.citizen.services_hire = false;
    let mut city = TestCity::with_config(12, config)
        .with_building(0, 0, BuildingType::Residential)
        .with_building(1, 0, BuildingType::Road)
        .with_building(11, 11, BuildingType::Residential)
        .with_building(10, 11, BuildingType::Road)
        .with_building(2, 0, BuildingType::Hospital)
        .with_developed(0, 0, 1)
        .with_developed(11, 11, 1);
    city.tick(1);
    city.city_mut().grid.for_each_citizen_mut(|c| c.needs.harm(Need::Health, 50.0));
    city.tick(20);

    let health_at = |at| {
        city.building(at)
            .and_then(|b| b.residents())
            .and_then(|r| r.citizens.first())
            .map(|c| c.needs.health)
    };
    let covered = health_at((0, 0)).unwrap_or_default();
    let uncovered = health_at((11, 11)).unwrap_or_default();
    assert!(covered > uncovered, "covered {covered} vs uncovered {uncovered}");
    assert!(uncovered < 50.0);
}
