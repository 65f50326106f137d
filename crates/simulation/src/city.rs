//! The city orchestrator: owns the grid and every engine, runs the per-tick
//! pipeline and exposes the public mutation API.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bevy::prelude::*;

use crate::buildings::development::Development;
use crate::buildings::{Building, BuildingKind, BuildingType};
use crate::citizen::{Citizen, CitizenId};
use crate::config::{SimConfig, MAX_CITY_SIZE};
use crate::disasters::{DisasterEngine, DisasterKind};
use crate::economy::Economy;
use crate::events::{CityEvent, EventSink};
use crate::grid::{Coord, Tile, WorldGrid};
use crate::sim_rng::SimRng;
use crate::snapshot::{BuildingSave, CitySave, SaveMetadata, ServiceSave, TileSave, SAVE_VERSION};
use crate::terrain_generation::{flat_terrain, generate_terrain, Terrain};
use crate::time_of_day::TimeManager;
use crate::{power, services};

/// Everything a building, citizen or engine may touch during a tick besides
/// the grid itself.
pub struct TickContext<'a> {
    pub config: &'a SimConfig,
    pub time: &'a TimeManager,
    pub rng: &'a mut SimRng,
    pub events: &'a mut dyn EventSink,
}

// =============================================================================
// Load errors
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum LoadError {
    UnsupportedVersion(String),
    InvalidSize(usize),
    TileOutOfBounds { x: usize, y: usize },
    DuplicateTile { x: usize, y: usize },
    UnknownResidence { citizen: CitizenId, x: usize, y: usize },
    NotResidential { citizen: CitizenId, x: usize, y: usize },
    InvalidClock(&'static str),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::UnsupportedVersion(v) => write!(f, "unsupported save version: {v}"),
            LoadError::InvalidSize(size) => {
                write!(f, "invalid city size {size} (expected 1..={MAX_CITY_SIZE})")
            }
            LoadError::TileOutOfBounds { x, y } => write!(f, "tile ({x}, {y}) is out of bounds"),
            LoadError::DuplicateTile { x, y } => write!(f, "tile ({x}, {y}) appears twice"),
            LoadError::UnknownResidence { citizen, x, y } => {
                write!(f, "citizen {citizen} lives at ({x}, {y}) but no building is there")
            }
            LoadError::NotResidential { citizen, x, y } => {
                write!(f, "citizen {citizen} lives at ({x}, {y}) which is not residential")
            }
            LoadError::InvalidClock(problem) => write!(f, "invalid time manager: {problem}"),
        }
    }
}

impl std::error::Error for LoadError {}

/// Reject clock states that would divide by zero or never tick.
fn check_clock(time: &TimeManager) -> Result<(), LoadError> {
    let problem = if time.ticks_per_hour == 0 {
        "ticksPerHour must be positive"
    } else if time.current_hour >= 24 {
        "currentHour must be below 24"
    } else if time.current_tick >= time.ticks_per_hour {
        "currentTick must be below ticksPerHour"
    } else if !(time.tick_interval.is_finite() && time.tick_interval > 0.0) {
        "tickInterval must be a positive number"
    } else {
        return Ok(());
    };
    Err(LoadError::InvalidClock(problem))
}

// =============================================================================
// City
// =============================================================================

#[derive(Resource)]
pub struct City {
    pub name: String,
    /// Seed the terrain was generated from; `None` for hand-made terrain.
    pub terrain_seed: Option<u64>,
    /// Completed steps since the city was founded.
    pub sim_time: u64,
    pub config: SimConfig,
    pub time: TimeManager,
    pub economy: Economy,
    pub disasters: DisasterEngine,
    pub grid: WorldGrid,
    pub rng: SimRng,
}

impl City {
    /// A fresh city on generated terrain. `seed` drives both terrain and the
    /// simulation RNG. `size` is clamped to `1..=MAX_CITY_SIZE`.
    pub fn new(name: impl Into<String>, size: usize, seed: u64, config: SimConfig) -> Self {
        let size = size.clamp(1, MAX_CITY_SIZE);
        let terrain = generate_terrain(size, seed);
        let mut city = Self::with_terrain(name, size, &terrain, config, SimRng::from_seed_u64(seed));
        city.terrain_seed = Some(seed);
        city
    }

    /// A city on caller-supplied terrain (row-major, missing cells are grass).
    /// `size` is clamped to `1..=MAX_CITY_SIZE`.
    pub fn with_terrain(
        name: impl Into<String>,
        size: usize,
        terrain: &[Terrain],
        config: SimConfig,
        rng: SimRng,
    ) -> Self {
        Self {
            name: name.into(),
            terrain_seed: None,
            sim_time: 0,
            time: TimeManager::new(&config.time),
            economy: Economy::new(&config.economy),
            disasters: DisasterEngine::new(config.disasters.difficulty),
            grid: WorldGrid::new(size.clamp(1, MAX_CITY_SIZE), terrain),
            rng,
            config,
        }
    }

    pub fn size(&self) -> usize {
        self.grid.size
    }

    pub fn get_tile(&self, x: i64, y: i64) -> Option<&Tile> {
        self.grid.get_tile(x, y)
    }

    pub fn population(&self) -> usize {
        self.grid.population()
    }

    pub fn find_tile<F>(&self, start: Coord, max_distance: usize, predicate: F) -> Option<Coord>
    where
        F: FnMut(&Tile) -> bool,
    {
        self.grid.find_tile(start, max_distance, predicate)
    }

    pub fn citizen(&self, id: CitizenId) -> Option<&Citizen> {
        self.grid.citizen(id)
    }

    pub fn describe_tile(&self, x: i64, y: i64) -> Option<String> {
        let tile = self.get_tile(x, y)?;
        Some(match &tile.building {
            Some(building) => building.describe(&self.config),
            None => format!("{} at ({}, {})", tile.terrain, tile.x, tile.y),
        })
    }

    // -------------------------------------------------------------------------
    // Mutation API
    // -------------------------------------------------------------------------

    /// Build on an empty, buildable tile and charge for it. Returns false and
    /// leaves funds untouched if any check fails.
    pub fn place_building(
        &mut self,
        x: usize,
        y: usize,
        building_type: BuildingType,
        events: &mut dyn EventSink,
    ) -> bool {
        let Some(tile) = self.grid.tile((x, y)) else {
            return false;
        };
        if tile.building.is_some() || !tile.terrain.is_buildable() {
            return false;
        }

        let cost = Economy::building_cost(&self.config, building_type);
        if !self.economy.try_spend(cost) {
            events.emit(CityEvent::InsufficientFunds {
                x,
                y,
                building_type,
                cost,
                funds: self.economy.funds,
            });
            return false;
        }

        self.grid.put_building((x, y), Building::new(x, y, building_type));
        self.grid
            .refresh_road_access((x, y), self.config.road_access.search_distance);
        events.emit(CityEvent::BuildingPlaced {
            x,
            y,
            building_type,
            cost,
        });
        true
    }

    /// Demolish whatever stands at `(x, y)`. No-op on an empty tile.
    pub fn bulldoze(&mut self, x: usize, y: usize, events: &mut dyn EventSink) -> bool {
        let mut ctx = TickContext {
            config: &self.config,
            time: &self.time,
            rng: &mut self.rng,
            events,
        };
        let Some(building_type) = self.grid.demolish((x, y), &mut ctx) else {
            return false;
        };
        ctx.events
            .emit(CityEvent::BuildingDemolished { x, y, building_type });
        true
    }

    /// Start a disaster of `kind` right now instead of waiting for the roll.
    pub fn trigger_disaster(&mut self, kind: DisasterKind, events: &mut dyn EventSink) -> bool {
        let mut ctx = TickContext {
            config: &self.config,
            time: &self.time,
            rng: &mut self.rng,
            events,
        };
        self.disasters.spawn(kind, &mut self.grid, &mut ctx)
    }

    // -------------------------------------------------------------------------
    // Simulation
    // -------------------------------------------------------------------------

    /// One full tick: clock, economy, power, service coverage, disasters, then
    /// every building in row-major order.
    pub fn step(&mut self, events: &mut dyn EventSink) {
        self.time.tick();
        let mut ctx = TickContext {
            config: &self.config,
            time: &self.time,
            rng: &mut self.rng,
            events,
        };

        self.economy.simulate(&mut self.grid, &mut ctx);
        power::update_power(&mut self.grid);
        services::update_service_coverage(&mut self.grid, &mut ctx);
        self.disasters.simulate(&mut self.grid, &mut ctx);

        for at in self.grid.building_coords() {
            let Some(mut building) = self.grid.take_building(at) else {
                continue;
            };
            building.simulate(&mut self.grid, &mut ctx);
            self.grid.put_building(at, building);
        }

        self.sim_time += 1;
    }

    /// Feed real elapsed time through the clock and run however many ticks it
    /// yields.
    pub fn advance(&mut self, elapsed: Duration, events: &mut dyn EventSink) -> u32 {
        let ticks = self.time.accumulate(elapsed);
        for _ in 0..ticks {
            self.step(events);
        }
        ticks
    }

    // -------------------------------------------------------------------------
    // Persistence
    // -------------------------------------------------------------------------

    pub fn serialize(&self) -> CitySave {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as u64);

        let tiles = self
            .grid
            .tiles
            .iter()
            .filter_map(|tile| {
                tile.building.as_ref().map(|b| TileSave {
                    x: tile.x,
                    y: tile.y,
                    terrain: tile.terrain,
                    building: BuildingSave::from_building(b),
                })
            })
            .collect();

        let citizens = self
            .grid
            .citizens()
            .map(|c| (c.id, c.clone()))
            .collect();

        CitySave {
            version: SAVE_VERSION.to_string(),
            timestamp,
            metadata: SaveMetadata {
                city_name: self.name.clone(),
                city_size: self.grid.size,
                sim_time: self.sim_time,
                terrain_seed: self.terrain_seed,
                next_citizen_id: Some(self.grid.next_citizen_id),
            },
            time_manager: self.time.clone(),
            economy: self.economy.clone(),
            disasters: self.disasters.clone(),
            tiles,
            citizens,
        }
    }

    /// Rebuild a city from its serialized shape. Buildings come first, then
    /// citizens are re-attached to their residences and workplaces.
    ///
    /// The RNG restarts from the default seed; callers that persisted the
    /// stream position restore it afterwards.
    pub fn deserialize(data: &CitySave, config: SimConfig) -> Result<City, LoadError> {
        if data.version != SAVE_VERSION {
            return Err(LoadError::UnsupportedVersion(data.version.clone()));
        }
        let size = data.metadata.city_size;
        if size == 0 || size > MAX_CITY_SIZE {
            return Err(LoadError::InvalidSize(size));
        }
        check_clock(&data.time_manager)?;

        let terrain = match data.metadata.terrain_seed {
            Some(seed) => generate_terrain(size, seed),
            None => flat_terrain(size),
        };
        let mut city = City::with_terrain(
            data.metadata.city_name.clone(),
            size,
            &terrain,
            config,
            SimRng::default(),
        );
        city.terrain_seed = data.metadata.terrain_seed;
        city.sim_time = data.metadata.sim_time;
        city.time = data.time_manager.clone();
        city.economy = data.economy.clone();
        city.disasters = data.disasters.clone();

        // Buildings.
        for tile_data in &data.tiles {
            let at = (tile_data.x, tile_data.y);
            let Some(tile) = city.grid.tile_mut(at) else {
                return Err(LoadError::TileOutOfBounds { x: at.0, y: at.1 });
            };
            if tile.building.is_some() {
                return Err(LoadError::DuplicateTile { x: at.0, y: at.1 });
            }
            tile.terrain = tile_data.terrain;
            tile.building = Some(tile_data.building.to_building(at));
        }

        // Citizens, in saved residence order first, then any stragglers by id.
        for (&id, citizen) in &data.citizens {
            let (x, y) = citizen.residence;
            match city.grid.building(citizen.residence) {
                None => return Err(LoadError::UnknownResidence { citizen: id, x, y }),
                Some(b) if b.residents().is_none() => {
                    return Err(LoadError::NotResidential { citizen: id, x, y })
                }
                Some(_) => {}
            }
        }
        let mut pending: BTreeMap<CitizenId, Citizen> = data
            .citizens
            .iter()
            .map(|(&id, c)| {
                let mut c = c.clone();
                c.id = id;
                (id, c)
            })
            .collect();
        for tile_data in &data.tiles {
            let at = (tile_data.x, tile_data.y);
            for id in tile_data.building.residents.iter().flatten() {
                if pending.get(id).is_some_and(|c| c.residence == at) {
                    if let Some(citizen) = pending.remove(id) {
                        city.adopt(citizen);
                    }
                }
            }
        }
        for citizen in pending.into_values() {
            city.adopt(citizen);
        }

        // Workplaces: rosters were restored with the buildings; drop ids that
        // no longer resolve and employment that the roster does not confirm.
        for at in city.grid.building_coords() {
            let roster: Vec<CitizenId> = city
                .grid
                .building(at)
                .and_then(|b| b.jobs())
                .map(|j| j.workers.clone())
                .unwrap_or_default();
            for id in roster {
                let employed_here = city.grid.citizen(id).is_some_and(|c| c.workplace == Some(at));
                if !employed_here {
                    city.grid.remove_worker(at, id);
                }
            }
        }
        let mut unconfirmed = Vec::new();
        for citizen in city.grid.citizens() {
            if let Some(workplace) = citizen.workplace {
                let confirmed = city
                    .grid
                    .building(workplace)
                    .and_then(|b| b.jobs())
                    .is_some_and(|j| j.contains(citizen.id));
                if !confirmed {
                    unconfirmed.push(citizen.id);
                }
            }
        }
        for id in unconfirmed {
            if let Some(citizen) = city.grid.citizen_mut(id) {
                citizen.clear_employment();
            }
        }

        let after_highest = city
            .grid
            .citizen_homes
            .keys()
            .next_back()
            .map_or(1, |max| max + 1);
        city.grid.next_citizen_id = data
            .metadata
            .next_citizen_id
            .map_or(after_highest, |next| next.max(after_highest));
        city.grid
            .refresh_all_road_access(city.config.road_access.search_distance);
        Ok(city)
    }

    fn adopt(&mut self, citizen: Citizen) {
        let home = citizen.residence;
        let id = citizen.id;
        if let Some(residents) = self.grid.building_mut(home).and_then(|b| b.residents_mut()) {
            residents.citizens.push(citizen);
            self.grid.citizen_homes.insert(id, home);
        }
    }
}

impl BuildingSave {
    pub fn from_building(building: &Building) -> Self {
        let zone = building.zone();
        Self {
            building_type: building.building_type,
            damage: building.damage,
            on_fire: building.on_fire,
            disabled: building.disabled,
            road_access: building.road_access,
            power: building.power,
            development: zone.map(|z| z.development.clone()),
            revenue: zone.map(|z| z.revenue),
            residents: building.residents().map(|r| r.ids().collect()),
            workers: building.jobs().map(|j| j.workers.clone()),
            power_plant: building.power_plant().copied(),
            service: building.service().map(|s| ServiceSave {
                effectiveness: s.effectiveness,
                current_load: s.current_load,
            }),
        }
    }

    /// A building with this state at `at`. Residents are attached later.
    pub fn to_building(&self, at: Coord) -> Building {
        let mut building = Building::new(at.0, at.1, self.building_type);
        building.damage = self.damage;
        building.on_fire = self.on_fire;
        building.disabled = self.disabled;
        building.road_access = self.road_access;
        building.power = self.power;
        match &mut building.kind {
            BuildingKind::Zone(zone) => {
                zone.development = self.development.clone().unwrap_or_else(Development::default);
                zone.revenue = self.revenue.unwrap_or_default();
            }
            BuildingKind::PowerPlant(plant) => {
                if let Some(saved) = self.power_plant {
                    *plant = saved;
                }
            }
            BuildingKind::Service(service) => {
                if let Some(saved) = &self.service {
                    service.effectiveness = saved.effectiveness;
                    service.current_load = saved.current_load;
                }
            }
            BuildingKind::Road | BuildingKind::PowerLine => {}
        }
        if let (Some(jobs), Some(workers)) = (building.jobs_mut(), &self.workers) {
            for &id in workers {
                jobs.hire(id);
            }
        }
        building
    }
}
