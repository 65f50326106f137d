use crate::buildings::BuildingType;
use crate::citizen::LifeStage;
use crate::config::SimConfig;
use crate::events::CityEvent;
use crate::test_harness::TestCity;

/// Home at (0, 0), road at (1, 0), shop at (2, 0), both developed, two
/// working-age residents.
fn town() -> TestCity {
    let mut config = SimConfig::default();
    config.disasters.difficulty = 0;
    config.development.level_up_chance = 0.0;
    config.residents.resident_move_in_chance = 1.0;
    // Nobody job hunts while moving in.
    config.citizen.min_working_age = 200;
    let mut city = TestCity::with_config(8, config)
        .with_building(0, 0, BuildingType::Residential)
        .with_building(1, 0, BuildingType::Road)
        .with_building(2, 0, BuildingType::Commercial)
        .with_developed(0, 0, 1)
        .with_developed(2, 0, 1);
    city.tick(2);
    city.city_mut().config.citizen.min_working_age = 16;
    city.city_mut().grid.for_each_citizen_mut(|c| {
        c.age = 30;
        c.state = LifeStage::Unemployed;
        c.needs.education = 50.0;
    });
    city
}

#[test]
fn unemployed_residents_find_nearby_work() {
    let mut city = town();
    assert_eq!(city.population(), 2);
    city.tick(1);

    assert_eq!(city.building((2, 0)).map(|b| b.worker_count()), Some(2));
    for citizen in city.citizens() {
        assert_eq!(citizen.state, LifeStage::Employed);
        assert_eq!(citizen.workplace, Some((2, 0)));
        assert!(citizen.salary > 0.0);
        assert!(city
            .building((2, 0))
            .and_then(|b| b.jobs())
            .is_some_and(|j| j.contains(citizen.id)));
    }
    assert_eq!(
        city.count_events(|e| matches!(e, CityEvent::CitizenHired { x: 2, y: 0, .. })),
        2
    );
}

#[test]
fn full_workplace_stops_hiring() {
    let mut city = town();
    city.tick(1);
    let before = city.count_events(|e| matches!(e, CityEvent::CitizenHired { .. }));
    city.tick(5);
    let after = city.count_events(|e| matches!(e, CityEvent::CitizenHired { .. }));
    assert_eq!(before, after);
    assert_eq!(city.building((2, 0)).map(|b| b.available_jobs(&city.city().config)), Some(0));
}

#[test]
fn bulldozed_workplace_lays_everyone_off() {
    let mut city = town();
    city.tick(1);
    assert!(city.bulldoze(2, 0));
    assert_eq!(
        city.count_events(|e| matches!(e, CityEvent::WorkersLaidOff { count: 2, .. })),
        1
    );
    city.tick(1);
    for citizen in city.citizens() {
        assert_eq!(citizen.workplace, None);
        assert_eq!(citizen.state, LifeStage::Unemployed);
    }
}

#[test]
fn evicted_workers_leave_the_roster() {
    let mut city = town();
    city.tick(1);
    assert!(city.bulldoze(0, 0));
    assert_eq!(city.population(), 0);
    assert_eq!(city.building((2, 0)).map(|b| b.worker_count()), Some(0));
}

#[test]
fn month_close_pays_salaries() {
    let mut city = town();
    city.tick(1);
    let payroll: f64 = city.citizens().iter().map(|c| c.salary).sum();
    // Ticks so far: 2 to move in, 1 to hire.
    city.tick(27);
    let report = &city.city().economy.last_report;
    assert!((report.salaries_paid - payroll).abs() < 1e-6);
    assert!(report.taxes > 0.0);
}
