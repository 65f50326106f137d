use crate::buildings::BuildingType;
use crate::city::{City, LoadError};
use crate::config::SimConfig;
use crate::events::CityEvent;
use crate::sim_rng::SimRng;
use crate::snapshot::CitySave;
use crate::test_harness::TestCity;

/// A small town that has been running for a while.
fn grown_town(ticks: u32) -> City {
    let mut config = SimConfig::default();
    config.residents.resident_move_in_chance = 0.8;
    let mut city = City::new("Roundtrip", 12, 7, config);
    let mut events: Vec<CityEvent> = Vec::new();
    let buildable: Vec<(usize, usize)> = city
        .grid
        .tiles
        .iter()
        .filter(|t| t.terrain.is_buildable())
        .map(|t| (t.x, t.y))
        .collect();
    for (i, &(x, y)) in buildable.iter().enumerate() {
        let building_type = match i % 5 {
            0 => BuildingType::Road,
            1 | 2 => BuildingType::Residential,
            3 => BuildingType::Commercial,
            _ => BuildingType::Industrial,
        };
        city.place_building(x, y, building_type, &mut events);
    }
    for _ in 0..ticks {
        city.step(&mut events);
    }
    city
}

fn reload(city: &City) -> City {
    match City::deserialize(&city.serialize(), city.config.clone()) {
        Ok(loaded) => loaded,
        Err(err) => panic!("reload failed: {err}"),
    }
}

#[test]
fn round_trip_keeps_tiles_citizens_and_funds() {
    let city = grown_town(120);
    let loaded = reload(&city);

    assert_eq!(loaded.size(), city.size());
    assert_eq!(loaded.name, city.name);
    assert_eq!(loaded.sim_time, city.sim_time);
    for (a, b) in city.grid.tiles.iter().zip(&loaded.grid.tiles) {
        assert_eq!(a.terrain, b.terrain, "terrain at ({}, {})", a.x, a.y);
        assert_eq!(a.building_type(), b.building_type(), "building at ({}, {})", a.x, a.y);
        let (ra, rb) = (
            a.building.as_ref().map(|b| b.resident_count()),
            b.building.as_ref().map(|b| b.resident_count()),
        );
        assert_eq!(ra, rb, "residents at ({}, {})", a.x, a.y);
        let (wa, wb) = (
            a.building.as_ref().map(|b| b.worker_count()),
            b.building.as_ref().map(|b| b.worker_count()),
        );
        assert_eq!(wa, wb, "workers at ({}, {})", a.x, a.y);
    }
    assert!((loaded.economy.funds - city.economy.funds).abs() < 1e-6);
    assert_eq!(loaded.population(), city.population());
    assert_eq!(loaded.time, city.time);
    assert_eq!(loaded.disasters, city.disasters);
}

#[test]
fn round_trip_survives_json() {
    let city = grown_town(60);
    let save = city.serialize();
    let text = serde_json::to_string(&save).unwrap();
    assert!(text.contains("\"cityName\":\"Roundtrip\""));
    let parsed: CitySave = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, save);

    let loaded = City::deserialize(&parsed, SimConfig::default()).unwrap();
    assert_eq!(loaded.population(), city.population());
}

#[test]
fn workplaces_are_relinked_after_load() {
    let city = grown_town(200);
    let loaded = reload(&city);
    for citizen in loaded.grid.citizens() {
        if let Some(workplace) = citizen.workplace {
            assert!(
                loaded
                    .grid
                    .building(workplace)
                    .and_then(|b| b.jobs())
                    .is_some_and(|j| j.contains(citizen.id)),
                "citizen {} lost its job at {workplace:?}",
                citizen.id
            );
        }
        assert_eq!(loaded.grid.citizen_homes.get(&citizen.id), Some(&citizen.residence));
    }
}

#[test]
fn loaded_city_replays_identically() {
    let mut original = grown_town(80);
    let mut loaded = reload(&original);
    loaded.rng = match SimRng::from_snapshot_bytes(&original.rng.snapshot_bytes()) {
        Ok(rng) => rng,
        Err(err) => panic!("rng snapshot: {err}"),
    };

    let mut sink: Vec<CityEvent> = Vec::new();
    for _ in 0..150 {
        original.step(&mut sink);
        loaded.step(&mut sink);
    }
    let mut a = original.serialize();
    let mut b = loaded.serialize();
    a.timestamp = 0;
    b.timestamp = 0;
    assert_eq!(a, b);
}

#[test]
fn same_seed_same_city() {
    let mut a = grown_town(150).serialize();
    let mut b = grown_town(150).serialize();
    a.timestamp = 0;
    b.timestamp = 0;
    assert_eq!(a, b);
}

#[test]
fn unsupported_version_is_rejected() {
    let mut save = grown_town(0).serialize();
    save.version = "0.9.0".to_string();
    assert_eq!(
        City::deserialize(&save, SimConfig::default()).err(),
        Some(LoadError::UnsupportedVersion("0.9.0".to_string()))
    );
}

#[test]
fn bad_size_is_rejected() {
    let mut save = grown_town(0).serialize();
    save.metadata.city_size = 0;
    assert_eq!(
        City::deserialize(&save, SimConfig::default()).err(),
        Some(LoadError::InvalidSize(0))
    );
}

#[test]
fn tile_outside_the_map_is_rejected() {
    let mut save = grown_town(0).serialize();
    if let Some(tile) = save.tiles.first_mut() {
        tile.x = 99;
    }
    assert!(matches!(
        City::deserialize(&save, SimConfig::default()),
        Err(LoadError::TileOutOfBounds { x: 99, .. })
    ));
}

#[test]
fn duplicate_tile_is_rejected() {
    let mut save = grown_town(0).serialize();
    let first = save.tiles[0].clone();
    save.tiles.push(first);
    assert!(matches!(
        City::deserialize(&save, SimConfig::default()),
        Err(LoadError::DuplicateTile { .. })
    ));
}

#[test]
fn citizen_living_on_a_road_is_rejected() {
    let mut city = TestCity::new()
        .with_building(0, 0, BuildingType::Residential)
        .with_building(1, 0, BuildingType::Road)
        .with_developed(0, 0, 1);
    city.city_mut().config.residents.resident_move_in_chance = 1.0;
    city.tick(1);
    let mut save = city.city().serialize();
    let Some(citizen) = save.citizens.values_mut().next() else {
        panic!("expected a resident");
    };
    citizen.residence = (1, 0);
    let id = citizen.id;
    assert_eq!(
        City::deserialize(&save, SimConfig::default()).err(),
        Some(LoadError::NotResidential { citizen: id, x: 1, y: 0 })
    );
}

#[test]
fn dangling_worker_ids_are_dropped() {
    let city = grown_town(100);
    let mut save = city.serialize();
    let Some(tile) = save
        .tiles
        .iter_mut()
        .find(|t| t.building.workers.is_some())
    else {
        panic!("expected a workplace");
    };
    if let Some(workers) = tile.building.workers.as_mut() {
        workers.push(9_999);
    }
    let (x, y) = (tile.x, tile.y);
    let loaded = City::deserialize(&save, SimConfig::default()).unwrap();
    assert!(loaded
        .grid
        .building((x, y))
        .and_then(|b| b.jobs())
        .is_some_and(|j| !j.contains(9_999)));
}

#[test]
fn broken_clock_is_rejected() {
    let save = grown_town(0).serialize();

    let mut zero_rate = save.clone();
    zero_rate.time_manager.ticks_per_hour = 0;
    assert!(matches!(
        City::deserialize(&zero_rate, SimConfig::default()),
        Err(LoadError::InvalidClock(_))
    ));

    let mut late = save.clone();
    late.time_manager.current_hour = 24;
    assert!(matches!(
        City::deserialize(&late, SimConfig::default()),
        Err(LoadError::InvalidClock(_))
    ));

    for interval in [0.0, -5.0, f64::NAN] {
        let mut frozen = save.clone();
        frozen.time_manager.tick_interval = interval;
        assert!(
            matches!(
                City::deserialize(&frozen, SimConfig::default()),
                Err(LoadError::InvalidClock(_))
            ),
            "tick interval {interval} accepted"
        );
    }

    let loaded = City::deserialize(&save, SimConfig::default()).unwrap();
    assert!(loaded.time.time_string().ends_with("AM"));
}
