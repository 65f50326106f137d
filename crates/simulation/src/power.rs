//! Power distribution.
//!
//! Every tick the grid is re-solved from scratch: demand is reset, then each
//! working plant (road access, not disabled) hands out its capacity to the
//! buildings it can reach through a 4-connected chain of non-road buildings.
//! Plants are visited row-major and consumers breadth-first, so the nearest
//! consumers of the first plant are served first.

use pathfinding::prelude::bfs_reach;

use crate::buildings::BuildingType;
use crate::grid::{Coord, WorldGrid};

/// Output of a single power plant.
pub const PLANT_CAPACITY: f32 = 100.0;

/// Power a building draws when fully supplied.
pub fn demand(building_type: BuildingType) -> f32 {
    match building_type {
        BuildingType::Residential | BuildingType::Commercial => 1.0,
        BuildingType::Industrial => 2.0,
        BuildingType::Hospital
        | BuildingType::PoliceStation
        | BuildingType::FireStation
        | BuildingType::School => 3.0,
        BuildingType::Road | BuildingType::PowerLine | BuildingType::PowerPlant => 0.0,
    }
}

fn conducts(grid: &WorldGrid, at: Coord) -> bool {
    grid.building(at)
        .is_some_and(|b| b.building_type != BuildingType::Road)
}

pub fn update_power(grid: &mut WorldGrid) {
    let coords = grid.building_coords();
    for &at in &coords {
        if let Some(building) = grid.building_mut(at) {
            building.power.required = demand(building.building_type);
            building.power.supplied = 0.0;
            if let Some(plant) = building.power_plant_mut() {
                plant.consumed = 0.0;
            }
        }
    }

    for &at in &coords {
        let available = grid.building(at).map_or(0.0, |b| b.power_available());
        if available <= 0.0 {
            continue;
        }
        let view: &WorldGrid = grid;
        let network: Vec<Coord> = bfs_reach(at, |&(x, y)| {
            let (neighbors, count) = view.neighbors4(x, y);
            neighbors
                .into_iter()
                .take(count)
                .filter(|&c| conducts(view, c))
                .collect::<Vec<_>>()
        })
        .skip(1)
        .collect();

        let mut remaining = available;
        for c in network {
            if remaining <= 0.0 {
                break;
            }
            let Some(consumer) = grid.building_mut(c) else {
                continue;
            };
            let missing = consumer.power.required - consumer.power.supplied;
            if missing <= 0.0 {
                continue;
            }
            let given = missing.min(remaining);
            consumer.power.supplied += given;
            remaining -= given;
        }

        if let Some(plant) = grid.building_mut(at).and_then(|b| b.power_plant_mut()) {
            plant.consumed += available - remaining;
        }
    }
}
