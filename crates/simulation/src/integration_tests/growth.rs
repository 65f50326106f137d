use crate::buildings::development::DevelopmentState;
use crate::buildings::BuildingType;
use crate::config::{RedevelopPolicy, SimConfig};
use crate::events::CityEvent;
use crate::grid::Coord;
use crate::test_harness::TestCity;

fn quiet_config() -> SimConfig {
    let mut config = SimConfig::default();
    config.disasters.difficulty = 0;
    config.development.level_up_chance = 0.0;
    config.residents.resident_move_in_chance = 1.0;
    config
}

fn state(city: &TestCity, at: Coord) -> Option<DevelopmentState> {
    city.building(at)
        .and_then(|b| b.development())
        .map(|d| d.state)
}

fn residents(city: &TestCity, at: Coord) -> usize {
    city.building(at).map_or(0, |b| b.resident_count())
}

#[test]
fn four_by_four_home_fills_to_two_within_two_ticks_of_developing() {
    let mut city = TestCity::with_config(4, quiet_config());
    assert!(city.place(0, 0, BuildingType::Residential));
    assert!(city.place(1, 0, BuildingType::Road));

    let mut developed_at = None;
    for tick in 1..=20u32 {
        city.tick(1);
        if developed_at.is_none() && state(&city, (0, 0)) == Some(DevelopmentState::Developed) {
            developed_at = Some(tick);
        }
        if let Some(start) = developed_at {
            if tick >= start + 1 {
                assert_eq!(residents(&city, (0, 0)), 2, "tick {tick}");
            }
        }
        assert!(residents(&city, (0, 0)) <= 2);
    }

    // Three ticks of construction, one to develop.
    assert_eq!(developed_at, Some(4));
    assert_eq!(city.population(), 2);
    assert_eq!(
        city.count_events(|e| matches!(e, CityEvent::ResidentMovedIn { .. })),
        2
    );
}

#[test]
fn under_construction_zone_never_takes_occupants() {
    let mut city = TestCity::with_config(6, quiet_config());
    city.place(0, 0, BuildingType::Residential);
    city.place(1, 0, BuildingType::Road);
    city.place(2, 0, BuildingType::Commercial);

    for _ in 0..3 {
        for at in [(0, 0), (2, 0)] {
            let building = city.building(at);
            assert_ne!(building.and_then(|b| b.development()).map(|d| d.state), Some(DevelopmentState::Developed));
            assert_eq!(building.map(|b| b.resident_count() + b.worker_count()), Some(0));
            assert_eq!(building.map(|b| b.available_jobs(&city.city().config)), Some(0));
        }
        city.tick(1);
    }
}

#[test]
fn zone_without_road_never_develops() {
    let mut config = quiet_config();
    config.development.abandon_chance = 0.0;
    let mut city = TestCity::with_config(8, config);
    city.place(0, 0, BuildingType::Residential);
    city.tick(20);
    assert_eq!(state(&city, (0, 0)), Some(DevelopmentState::Developing));
    assert_eq!(residents(&city, (0, 0)), 0);
}

#[test]
fn abandoned_zone_is_emptied_immediately() {
    let mut config = quiet_config();
    config.development.abandon_chance = 1.0;
    let mut city = TestCity::with_config(8, config)
        .with_building(0, 0, BuildingType::Residential)
        .with_building(1, 0, BuildingType::Road)
        .with_developed(0, 0, 1);
    city.tick(2);
    assert_eq!(residents(&city, (0, 0)), 2);

    assert!(city.bulldoze(1, 0));
    for _ in 0..9 {
        city.tick(1);
        assert_eq!(state(&city, (0, 0)), Some(DevelopmentState::Developed));
    }
    city.tick(1);
    assert_eq!(state(&city, (0, 0)), Some(DevelopmentState::Abandoned));
    assert_eq!(residents(&city, (0, 0)), 0);
    assert_eq!(city.population(), 0);
    assert!(city.city().grid.citizen_homes.is_empty());
    assert_eq!(
        city.count_events(|e| matches!(e, CityEvent::ResidentsEvicted { count: 2, .. })),
        1
    );

    // Abandoned zones stay empty.
    city.tick(5);
    assert_eq!(residents(&city, (0, 0)), 0);
}

#[test]
fn restored_road_redevelops_keeping_level() {
    let mut config = quiet_config();
    config.development.abandon_chance = 1.0;
    config.development.redevelop_chance = 1.0;
    config.development.redevelop_policy = RedevelopPolicy::KeepLevel;
    let mut city = TestCity::with_config(8, config)
        .with_building(0, 0, BuildingType::Residential)
        .with_developed(0, 0, 2);
    city.tick(10);
    assert_eq!(state(&city, (0, 0)), Some(DevelopmentState::Abandoned));

    city.place(1, 0, BuildingType::Road);
    city.tick(1);
    assert_eq!(state(&city, (0, 0)), Some(DevelopmentState::Developing));
    city.tick(1);
    assert_eq!(state(&city, (0, 0)), Some(DevelopmentState::Developed));
    assert_eq!(city.building((0, 0)).map(|b| b.level()), Some(2));
}

#[test]
fn redevelopment_can_reset_level() {
    let mut config = quiet_config();
    config.development.abandon_chance = 1.0;
    config.development.redevelop_chance = 1.0;
    config.development.redevelop_policy = RedevelopPolicy::ResetLevel;
    let mut city = TestCity::with_config(8, config)
        .with_building(0, 0, BuildingType::Residential)
        .with_developed(0, 0, 3);
    city.tick(10);
    city.place(1, 0, BuildingType::Road);
    city.tick(2);
    assert_eq!(state(&city, (0, 0)), Some(DevelopmentState::Developed));
    assert_eq!(city.building((0, 0)).map(|b| b.level()), Some(1));
}

#[test]
fn level_ups_stop_at_max_level_and_raise_capacity() {
    let mut config = quiet_config();
    config.development.level_up_chance = 1.0;
    let mut city = TestCity::with_config(8, config)
        .with_building(0, 0, BuildingType::Residential)
        .with_building(1, 0, BuildingType::Road)
        .with_developed(0, 0, 1);
    city.tick(10);
    let home = city.building((0, 0));
    assert_eq!(home.map(|b| b.level()), Some(3));
    assert_eq!(home.map(|b| b.max_residents(&city.city().config)), Some(8));
    assert_eq!(residents(&city, (0, 0)), 8);
    assert_eq!(
        city.count_events(|e| matches!(e, CityEvent::ZoneLeveledUp { .. })),
        2
    );
}

#[test]
fn powered_zones_develop_when_power_is_required() {
    let mut config = quiet_config();
    config.development.require_power = true;
    config.development.abandon_chance = 0.0;
    let mut city = TestCity::with_config(8, config);
    city.place(0, 0, BuildingType::Residential);
    city.place(0, 1, BuildingType::Road);
    city.tick(10);
    assert_eq!(state(&city, (0, 0)), Some(DevelopmentState::Developing));

    city.place(1, 0, BuildingType::PowerPlant);
    city.place(1, 1, BuildingType::Road);
    city.tick(1);
    assert_eq!(state(&city, (0, 0)), Some(DevelopmentState::Developed));
    let power = city.building((0, 0)).map(|b| b.power);
    assert!(power.is_some_and(|p| p.is_fully_powered() && p.required == 1.0));
}
