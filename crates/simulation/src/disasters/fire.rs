use serde::{Deserialize, Serialize};

use super::{roll_damage, DisasterKind, Incident, FIRE_DAMAGE};
use crate::buildings::BuildingType;
use crate::citizen::needs::Need;
use crate::city::TickContext;
use crate::events::CityEvent;
use crate::grid::{Coord, WorldGrid};

pub const FIRE_DURATION: u32 = 30;
pub const FIRE_SPREAD_CHANCE: f32 = 0.3;
/// Chance of jumping to each neighbour once the spread roll succeeds.
const NEIGHBOR_IGNITION_CHANCE: f32 = 0.5;
const HEALTH_DAMAGE: f32 = 5.0;
const SAFETY_DAMAGE: f32 = 10.0;
/// A fire station this close with more than `RESPONSE_EFFECTIVENESS` cuts
/// the remaining burn time by `RESPONSE_REDUCTION` every tick.
const RESPONSE_RADIUS: usize = 12;
const RESPONSE_EFFECTIVENESS: u32 = 50;
const RESPONSE_REDUCTION: u32 = 5;

/// Spread order: -x, +x, -y, +y.
const DIRECTIONS: [(i64, i64); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fire {
    pub x: usize,
    pub y: usize,
    pub duration: u32,
    pub spread_chance: f32,
    pub has_spread: bool,
    /// Neighbours this fire set alight. Extinguished along with the anchor.
    #[serde(default)]
    pub ignited: Vec<Coord>,
    #[serde(default)]
    pub cleaned_up: bool,
}

impl Fire {
    /// Start a fire at `at`, setting its building alight.
    pub fn new(at: Coord, grid: &mut WorldGrid) -> Self {
        if let Some(building) = grid.building_mut(at) {
            building.on_fire = true;
        }
        Self {
            x: at.0,
            y: at.1,
            duration: FIRE_DURATION,
            spread_chance: FIRE_SPREAD_CHANCE,
            has_spread: false,
            ignited: Vec::new(),
            cleaned_up: false,
        }
    }

    pub fn with_duration(mut self, duration: u32) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_spread_chance(mut self, spread_chance: f32) -> Self {
        self.spread_chance = spread_chance;
        self
    }

    /// With a certain spread roll every eligible neighbour catches; otherwise
    /// each direction is rolled on its own.
    fn spread(&mut self, grid: &mut WorldGrid, ctx: &mut TickContext) {
        let certain = self.spread_chance >= 1.0;
        for (dx, dy) in DIRECTIONS {
            if !certain && !ctx.rng.chance(NEIGHBOR_IGNITION_CHANCE) {
                continue;
            }
            let (nx, ny) = (self.x as i64 + dx, self.y as i64 + dy);
            if !grid.in_bounds(nx, ny) {
                continue;
            }
            let to = (nx as usize, ny as usize);
            let Some(building) = grid.building_mut(to) else {
                continue;
            };
            if building.on_fire || building.building_type == BuildingType::Road {
                continue;
            }
            building.on_fire = true;
            self.ignited.push(to);
            ctx.events.emit(CityEvent::FireSpread {
                from: (self.x, self.y),
                to,
            });
        }
    }

    fn fire_station_responding(&self, grid: &WorldGrid) -> bool {
        grid.square((self.x, self.y), RESPONSE_RADIUS).any(|c| {
            grid.building(c)
                .and_then(|b| b.service())
                .is_some_and(|s| {
                    s.service.building_type() == BuildingType::FireStation
                        && s.effectiveness > RESPONSE_EFFECTIVENESS
                })
        })
    }
}

impl Incident for Fire {
    fn kind(&self) -> DisasterKind {
        DisasterKind::Fire
    }

    fn position(&self) -> Coord {
        (self.x, self.y)
    }

    fn update(&mut self, grid: &mut WorldGrid, ctx: &mut TickContext) {
        self.duration = self.duration.saturating_sub(1);

        if !self.has_spread && ctx.rng.chance(self.spread_chance) {
            self.spread(grid, ctx);
            self.has_spread = true;
        }

        if let Some(residents) = grid.building_mut((self.x, self.y)).and_then(|b| b.residents_mut()) {
            for citizen in &mut residents.citizens {
                citizen.needs.harm(Need::Health, HEALTH_DAMAGE);
                citizen.needs.harm(Need::Safety, SAFETY_DAMAGE);
            }
        }

        if self.fire_station_responding(grid) {
            self.duration = self.duration.saturating_sub(RESPONSE_REDUCTION);
        }
    }

    fn is_expired(&self) -> bool {
        self.duration == 0
    }

    fn cleanup(&mut self, grid: &mut WorldGrid, ctx: &mut TickContext) {
        if self.cleaned_up {
            return;
        }
        self.cleaned_up = true;

        for at in self.ignited.drain(..) {
            if let Some(building) = grid.building_mut(at) {
                building.on_fire = false;
            }
        }
        let at = (self.x, self.y);
        let Some(building) = grid.building_mut(at) else {
            return;
        };
        building.on_fire = false;
        roll_damage(grid, at, FIRE_DAMAGE, ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buildings::Building;
    use crate::citizen::Citizen;
    use crate::config::SimConfig;
    use crate::sim_rng::SimRng;
    use crate::terrain_generation::flat_terrain;
    use crate::time_of_day::TimeManager;

    struct Fixture {
        config: SimConfig,
        time: TimeManager,
        rng: SimRng,
        events: Vec<CityEvent>,
    }

    impl Fixture {
        fn new() -> Self {
            let config = SimConfig::default();
            Self {
                time: TimeManager::new(&config.time),
                config,
                rng: SimRng::from_seed_u64(8),
                events: Vec::new(),
            }
        }

        fn ctx(&mut self) -> TickContext<'_> {
            TickContext {
                config: &self.config,
                time: &self.time,
                rng: &mut self.rng,
                events: &mut self.events,
            }
        }
    }

    fn place(grid: &mut WorldGrid, at: Coord, building_type: BuildingType) {
        grid.put_building(at, Building::new(at.0, at.1, building_type));
    }

    fn surrounded(center: BuildingType) -> WorldGrid {
        let mut grid = WorldGrid::new(5, &flat_terrain(5));
        place(&mut grid, (2, 2), center);
        for at in [(1, 2), (3, 2), (2, 1), (2, 3)] {
            place(&mut grid, at, BuildingType::Commercial);
        }
        grid
    }

    #[test]
    fn test_certain_spread_reaches_all_neighbors_on_first_update() {
        let mut fx = Fixture::new();
        let mut grid = surrounded(BuildingType::Industrial);
        let mut fire = Fire::new((2, 2), &mut grid).with_duration(30).with_spread_chance(1.0);

        fire.update(&mut grid, &mut fx.ctx());

        assert!(fire.has_spread);
        assert_eq!(fire.ignited, vec![(1, 2), (3, 2), (2, 1), (2, 3)]);
        for at in [(2, 2), (1, 2), (3, 2), (2, 1), (2, 3)] {
            assert!(grid.building(at).is_some_and(|b| b.on_fire));
        }
        let spreads = fx
            .events
            .iter()
            .filter(|e| matches!(e, CityEvent::FireSpread { .. }))
            .count();
        assert_eq!(spreads, 4);
    }

    #[test]
    fn test_spread_skips_roads_and_empty_tiles() {
        let mut fx = Fixture::new();
        let mut grid = WorldGrid::new(5, &flat_terrain(5));
        place(&mut grid, (2, 2), BuildingType::Residential);
        place(&mut grid, (1, 2), BuildingType::Road);
        place(&mut grid, (3, 2), BuildingType::PowerLine);
        let mut fire = Fire::new((2, 2), &mut grid).with_spread_chance(1.0);
        fire.update(&mut grid, &mut fx.ctx());
        assert_eq!(fire.ignited, vec![(3, 2)]);
        assert!(!grid.building((1, 2)).is_some_and(|b| b.on_fire));
    }

    #[test]
    fn test_spread_happens_once() {
        let mut fx = Fixture::new();
        let mut grid = surrounded(BuildingType::Industrial);
        let mut fire = Fire::new((2, 2), &mut grid).with_spread_chance(1.0);
        fire.update(&mut grid, &mut fx.ctx());
        for at in [(1, 2), (3, 2), (2, 1), (2, 3)] {
            if let Some(b) = grid.building_mut(at) {
                b.on_fire = false;
            }
        }
        fire.update(&mut grid, &mut fx.ctx());
        assert_eq!(fire.ignited.len(), 4);
        assert!(!grid.building((1, 2)).is_some_and(|b| b.on_fire));
    }

    #[test]
    fn test_burning_home_hurts_residents() {
        let mut fx = Fixture::new();
        let mut grid = WorldGrid::new(3, &flat_terrain(3));
        let mut home = Building::new(1, 1, BuildingType::Residential);
        let mut rng = SimRng::from_seed_u64(2);
        let citizen = Citizen::new(1, (1, 1), &mut rng, &fx.config);
        if let Some(r) = home.residents_mut() {
            r.citizens.push(citizen);
        }
        grid.put_building((1, 1), home);
        grid.citizen_homes.insert(1, (1, 1));

        let mut fire = Fire::new((1, 1), &mut grid).with_spread_chance(0.0);
        fire.update(&mut grid, &mut fx.ctx());
        let needs = grid.citizen(1).map(|c| (c.needs.health, c.needs.safety));
        assert_eq!(needs, Some((95.0, 90.0)));
    }

    #[test]
    fn test_fire_station_shortens_burn() {
        let mut fx = Fixture::new();
        let mut grid = WorldGrid::new(16, &flat_terrain(16));
        place(&mut grid, (1, 1), BuildingType::Commercial);
        let mut station = Building::new(12, 12, BuildingType::FireStation);
        if let Some(s) = station.service_mut() {
            s.effectiveness = 51;
        }
        grid.put_building((12, 12), station);

        let mut fire = Fire::new((1, 1), &mut grid).with_spread_chance(0.0);
        fire.update(&mut grid, &mut fx.ctx());
        assert_eq!(fire.duration, FIRE_DURATION - 1 - 5);
    }

    #[test]
    fn test_cleanup_extinguishes_and_runs_once() {
        let mut fx = Fixture::new();
        let mut grid = surrounded(BuildingType::Industrial);
        let mut fire = Fire::new((2, 2), &mut grid).with_duration(1).with_spread_chance(1.0);
        fire.update(&mut grid, &mut fx.ctx());
        assert!(fire.is_expired());

        fire.cleanup(&mut grid, &mut fx.ctx());
        let after_first = fx.events.len();
        fire.cleanup(&mut grid, &mut fx.ctx());
        assert_eq!(fx.events.len(), after_first);

        for at in [(1, 2), (3, 2), (2, 1), (2, 3)] {
            assert!(grid.building(at).is_some_and(|b| !b.on_fire));
        }
        assert!(grid.building((2, 2)).map_or(true, |b| !b.on_fire));
    }
}
