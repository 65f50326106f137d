use crate::buildings::BuildingType;
use crate::config::SimConfig;
use crate::disasters::{Disaster, DisasterKind, Fire};
use crate::events::CityEvent;
use crate::test_harness::TestCity;

fn ring_of_shops() -> TestCity {
    let mut city = TestCity::new().with_building(5, 5, BuildingType::Industrial);
    for (x, y) in [(4, 5), (6, 5), (5, 4), (5, 6)] {
        city = city.with_building(x, y, BuildingType::Commercial);
    }
    city
}

fn ignite(city: &mut TestCity, at: (usize, usize), duration: u32, spread_chance: f32) {
    let mut c = city.city_mut();
    let fire = Fire::new(at, &mut c.grid)
        .with_duration(duration)
        .with_spread_chance(spread_chance);
    c.disasters.active_disasters.push(Disaster::Fire(fire));
}

#[test]
fn certain_fire_spreads_to_all_four_neighbors_on_first_tick() {
    let mut city = ring_of_shops();
    ignite(&mut city, (5, 5), 30, 1.0);
    city.tick(1);

    for at in [(5, 5), (4, 5), (6, 5), (5, 4), (5, 6)] {
        assert!(
            city.building(at).is_some_and(|b| b.on_fire),
            "{at:?} should be burning"
        );
    }
    assert_eq!(
        city.count_events(|e| matches!(e, CityEvent::FireSpread { from: (5, 5), .. })),
        4
    );
}

#[test]
fn fire_burns_out_and_is_cleaned_up_once() {
    let mut city = ring_of_shops();
    ignite(&mut city, (5, 5), 30, 1.0);
    city.tick(30);

    assert!(city.city().disasters.active_disasters.is_empty());
    assert!(city.city().grid.buildings().all(|b| !b.on_fire));
    assert_eq!(
        city.count_events(|e| matches!(e, CityEvent::DisasterEnded { kind: DisasterKind::Fire, .. })),
        1
    );
    city.tick(5);
    assert_eq!(
        city.count_events(|e| matches!(e, CityEvent::DisasterEnded { .. })),
        1
    );
}

#[test]
fn fire_station_puts_fires_out_sooner() {
    let mut config = SimConfig::default();
    config.citizen.services_hire = false;
    let mut city = TestCity::with_config(16, config)
        .with_building(2, 2, BuildingType::Commercial)
        .with_building(8, 8, BuildingType::FireStation);
    ignite(&mut city, (2, 2), 30, 0.0);
    city.tick(6);
    assert!(city.city().disasters.active_disasters.is_empty());
}

#[test]
fn power_outage_needs_a_plant() {
    let mut city = TestCity::new();
    assert!(!city.trigger(DisasterKind::PowerOutage));

    let mut city = TestCity::new()
        .with_building(3, 3, BuildingType::PowerPlant)
        .with_building(3, 4, BuildingType::Road);
    assert!(city.trigger(DisasterKind::PowerOutage));
    city.tick(1);
    assert!(city.building((3, 3)).is_some_and(|b| b.disabled));
    assert_eq!(city.building((3, 3)).map(|b| b.power_available()), Some(0.0));

    city.tick(49);
    assert!(city.building((3, 3)).is_some_and(|b| !b.disabled));
    assert_eq!(
        city.count_events(|e| matches!(e, CityEvent::PowerRestored { x: 3, y: 3 })),
        1
    );
}

#[test]
fn no_disasters_when_difficulty_is_none() {
    let mut config = SimConfig::default();
    config.disasters.difficulty = 0;
    let mut city = TestCity::with_config(8, config)
        .with_building(1, 1, BuildingType::Industrial)
        .with_building(3, 3, BuildingType::PowerPlant);
    city.tick(600);
    assert_eq!(
        city.count_events(|e| matches!(e, CityEvent::DisasterStarted { .. })),
        0
    );
}

#[test]
fn find_tile_at_distance_zero_matches_only_start() {
    let city = TestCity::new()
        .with_building(4, 4, BuildingType::Road)
        .with_building(5, 4, BuildingType::Road);
    let c = city.city();
    assert_eq!(c.find_tile((4, 4), 0, |_| true), Some((4, 4)));
    assert_eq!(c.find_tile((4, 4), 0, |t| t.x == 5), None);
    assert_eq!(c.find_tile((3, 4), 0, |t| t.building.is_some()), None);
    assert_eq!(c.find_tile((3, 4), 1, |t| t.building.is_some()), Some((4, 4)));
}
