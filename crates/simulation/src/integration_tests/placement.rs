use crate::buildings::BuildingType;
use crate::events::CityEvent;
use crate::test_harness::TestCity;

#[test]
fn placed_building_is_found_on_its_tile() {
    let mut city = TestCity::new();
    for (i, building_type) in BuildingType::ALL.into_iter().enumerate() {
        assert!(city.place(i, 2, building_type), "{building_type} should place");
        assert_eq!(
            city.tile(i, 2).and_then(|t| t.building_type()),
            Some(building_type)
        );
        assert_eq!(city.building((i, 2)).map(|b| b.position()), Some((i, 2)));
    }
}

#[test]
fn funds_drop_by_exactly_the_cost() {
    let mut city = TestCity::new();
    let costs = [
        (BuildingType::Road, 100.0),
        (BuildingType::Residential, 500.0),
        (BuildingType::Commercial, 1000.0),
        (BuildingType::Hospital, 8000.0),
    ];
    for (x, (building_type, cost)) in costs.into_iter().enumerate() {
        let before = city.funds();
        assert!(city.place(x, 0, building_type));
        assert!(
            (before - cost - city.funds()).abs() < 1e-9,
            "{building_type}: expected {} got {}",
            before - cost,
            city.funds()
        );
    }
}

#[test]
fn placing_500_with_400_fails_and_keeps_funds() {
    let mut city = TestCity::new().with_funds(400.0);
    assert!(!city.place(3, 3, BuildingType::Residential));
    assert_eq!(city.funds(), 400.0);
    assert!(city.tile(3, 3).is_some_and(|t| t.building.is_none()));
    assert_eq!(
        city.count_events(|e| matches!(e, CityEvent::InsufficientFunds { .. })),
        1
    );
}

#[test]
fn occupied_tile_rejects_second_building() {
    let mut city = TestCity::new();
    assert!(city.place(1, 1, BuildingType::Road));
    let funds = city.funds();
    assert!(!city.place(1, 1, BuildingType::School));
    assert_eq!(city.funds(), funds);
    assert_eq!(
        city.tile(1, 1).and_then(|t| t.building_type()),
        Some(BuildingType::Road)
    );
}

#[test]
fn out_of_bounds_placement_is_rejected() {
    let mut city = TestCity::with_size(4);
    assert!(!city.place(4, 0, BuildingType::Road));
    assert!(!city.place(0, 4, BuildingType::Road));
    assert_eq!(city.funds(), 50_000.0);
}

#[test]
fn bulldozing_empty_tile_twice_is_noop() {
    let mut city = TestCity::new();
    let funds = city.funds();
    assert!(!city.bulldoze(5, 5));
    assert!(!city.bulldoze(5, 5));
    assert_eq!(city.funds(), funds);
    assert!(city.events().is_empty());
}

#[test]
fn bulldoze_then_bulldoze_again() {
    let mut city = TestCity::new();
    city.place(2, 2, BuildingType::Industrial);
    assert!(city.bulldoze(2, 2));
    assert!(!city.bulldoze(2, 2));
    assert!(city.tile(2, 2).is_some_and(|t| t.building.is_none()));
    assert_eq!(
        city.count_events(|e| matches!(e, CityEvent::BuildingDemolished { .. })),
        1
    );
}

#[test]
fn placing_a_road_grants_access_to_nearby_zones() {
    let mut city = TestCity::new();
    city.place(0, 0, BuildingType::Residential);
    city.place(6, 0, BuildingType::Commercial);
    assert!(!city.building((0, 0)).is_some_and(|b| b.road_access.value));

    city.place(3, 0, BuildingType::Road);
    assert!(city.building((0, 0)).is_some_and(|b| b.road_access.value));
    assert!(city.building((6, 0)).is_some_and(|b| b.road_access.value));

    city.bulldoze(3, 0);
    assert!(!city.building((0, 0)).is_some_and(|b| b.road_access.value));
    assert!(!city.building((6, 0)).is_some_and(|b| b.road_access.value));
}

#[test]
fn describe_tile_mentions_building_or_terrain() {
    let mut city = TestCity::new();
    city.place(1, 1, BuildingType::School);
    let school = city.city().describe_tile(1, 1).unwrap_or_default();
    assert!(school.to_lowercase().contains("school"), "{school}");
    let grass = city.city().describe_tile(0, 0).unwrap_or_default();
    assert_eq!(grass, "grass at (0, 0)");
    assert!(city.city().describe_tile(-1, 0).is_none());
}
