use serde::{Deserialize, Serialize};

use crate::buildings::jobs::Jobs;
use crate::buildings::{BuildingType, MAX_DAMAGE};
use crate::city::TickContext;
use crate::citizen::needs::Need;
use crate::events::CityEvent;
use crate::grid::{Coord, WorldGrid};

/// Below this effectiveness a service building does nothing for its area.
pub const ACTIVATION_FLOOR: u32 = 25;
/// Hospitals only repair buildings at or above this effectiveness.
pub const REPAIR_FLOOR: u32 = 50;
/// Repair chance per damaged building per tick at full effectiveness.
const REPAIR_CHANCE: f32 = 0.05;
/// Schools teach citizens under this age faster.
const YOUNG_STUDENT_AGE: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceType {
    Hospital,
    PoliceStation,
    FireStation,
    School,
}

impl ServiceType {
    pub fn name(self) -> &'static str {
        match self {
            ServiceType::Hospital => "Hospital",
            ServiceType::PoliceStation => "Police Station",
            ServiceType::FireStation => "Fire Station",
            ServiceType::School => "School",
        }
    }

    pub fn building_type(self) -> BuildingType {
        match self {
            ServiceType::Hospital => BuildingType::Hospital,
            ServiceType::PoliceStation => BuildingType::PoliceStation,
            ServiceType::FireStation => BuildingType::FireStation,
            ServiceType::School => BuildingType::School,
        }
    }

    /// Coverage radius in tiles (square, Chebyshev).
    pub fn radius(self) -> usize {
        match self {
            ServiceType::Hospital => 8,
            ServiceType::PoliceStation => 10,
            ServiceType::FireStation => 12,
            ServiceType::School => 6,
        }
    }

    /// Citizens the building is sized for. Exceeding it is reported, never
    /// enforced.
    pub fn capacity(self) -> u32 {
        match self {
            ServiceType::Hospital => 500,
            ServiceType::PoliceStation => 400,
            ServiceType::FireStation => 600,
            ServiceType::School => 300,
        }
    }

    pub fn max_staff(self) -> u32 {
        match self {
            ServiceType::Hospital => 10,
            ServiceType::PoliceStation => 8,
            ServiceType::FireStation => 6,
            ServiceType::School => 7,
        }
    }

    /// Need improved for each resident in range, and by how much at full
    /// effectiveness.
    pub fn benefit(self, age: u32) -> (Need, f32) {
        match self {
            ServiceType::Hospital => (Need::Health, 0.5),
            ServiceType::PoliceStation => (Need::Safety, 0.5),
            ServiceType::FireStation => (Need::Safety, 0.3),
            ServiceType::School if age < YOUNG_STUDENT_AGE => (Need::Education, 0.8),
            ServiceType::School => (Need::Education, 0.3),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceBuilding {
    pub service: ServiceType,
    pub staff: Jobs,
    /// `floor(100 * staff / max_staff)`, refreshed every tick.
    pub effectiveness: u32,
    /// Residents within radius at the last update.
    pub current_load: u32,
}

impl ServiceBuilding {
    pub fn new(service: ServiceType) -> Self {
        Self {
            service,
            staff: Jobs::default(),
            effectiveness: 0,
            current_load: 0,
        }
    }

    pub fn compute_effectiveness(&self) -> u32 {
        let max = self.service.max_staff();
        if max == 0 {
            return 0;
        }
        (100 * self.staff.count() as u32 / max).min(100)
    }

    pub fn utilization(&self) -> u32 {
        let capacity = self.service.capacity();
        if capacity == 0 {
            0
        } else {
            100 * self.current_load / capacity
        }
    }

    pub fn is_overloaded(&self) -> bool {
        self.current_load > self.service.capacity()
    }

    pub fn is_active(&self) -> bool {
        self.effectiveness >= ACTIVATION_FLOOR
    }
}

/// Coverage pass: refresh every service building's effectiveness and load,
/// then apply its benefit to the residents around it. Buildings are visited
/// row-major.
pub fn update_service_coverage(grid: &mut WorldGrid, ctx: &mut TickContext) {
    for at in grid.building_coords() {
        let Some(service) = grid.building(at).and_then(|b| b.service()) else {
            continue;
        };
        let kind = service.service;
        let effectiveness = if ctx.config.citizen.services_hire {
            service.compute_effectiveness()
        } else {
            100
        };
        let area: Vec<Coord> = grid.square(at, kind.radius()).collect();
        let load: usize = area
            .iter()
            .filter_map(|&c| grid.building(c))
            .map(|b| b.resident_count())
            .sum();

        if let Some(service) = grid.building_mut(at).and_then(|b| b.service_mut()) {
            service.effectiveness = effectiveness;
            service.current_load = load as u32;
        }

        if effectiveness < ACTIVATION_FLOOR {
            continue;
        }
        let scale = effectiveness as f32 / 100.0;
        for &c in &area {
            if let Some(residents) = grid.building_mut(c).and_then(|b| b.residents_mut()) {
                for citizen in &mut residents.citizens {
                    let (need, amount) = kind.benefit(citizen.age);
                    citizen.needs.improve(need, amount * scale);
                }
            }
        }

        if kind == ServiceType::Hospital && effectiveness >= REPAIR_FLOOR {
            repair_buildings(grid, &area, scale, ctx);
        }
    }
}

fn repair_buildings(grid: &mut WorldGrid, area: &[Coord], scale: f32, ctx: &mut TickContext) {
    for &c in area {
        let Some(building) = grid.building_mut(c) else {
            continue;
        };
        if building.damage == 0 || building.damage > MAX_DAMAGE {
            continue;
        }
        if ctx.rng.chance(scale * REPAIR_CHANCE) {
            building.damage -= 1;
            ctx.events.emit(CityEvent::BuildingRepaired {
                x: c.0,
                y: c.1,
                damage: building.damage,
            });
        }
    }
}
