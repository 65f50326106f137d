//! # TestCity: headless integration test harness
//!
//! Wraps `bevy::app::App` + `SimulationPlugin` so integration tests drive the
//! same schedule the binary runs, without a window. Virtual time advances by
//! exactly one city tick per `app.update()`.

use std::time::Duration;

use bevy::app::App;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;

use crate::buildings::development::DevelopmentState;
use crate::buildings::{Building, BuildingType};
use crate::citizen::Citizen;
use crate::city::City;
use crate::config::SimConfig;
use crate::disasters::DisasterKind;
use crate::events::{CityEvent, EventJournal};
use crate::grid::{Coord, Tile};
use crate::sim_rng::SimRng;
use crate::terrain_generation::flat_terrain;
use crate::SimulationPlugin;

/// A headless Bevy App wrapping `SimulationPlugin` for integration testing.
pub struct TestCity {
    app: App,
}

impl Default for TestCity {
    fn default() -> Self {
        Self::new()
    }
}

impl TestCity {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// An empty 16x16 grass city with default config and seed 42.
    pub fn new() -> Self {
        Self::with_size(16)
    }

    pub fn with_size(size: usize) -> Self {
        Self::with_config(size, SimConfig::default())
    }

    pub fn with_config(size: usize, config: SimConfig) -> Self {
        let city = City::with_terrain(
            "Test City",
            size,
            &flat_terrain(size),
            config,
            SimRng::from_seed_u64(42),
        );
        Self::from_city(city)
    }

    /// Run an already-built city inside the harness.
    pub fn from_city(city: City) -> Self {
        let tick = Duration::from_secs_f64(city.time.tick_interval / 1000.0);

        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(TimeUpdateStrategy::ManualDuration(tick));
        app.world_mut()
            .resource_mut::<Time<Virtual>>()
            .set_max_delta(Duration::from_secs(60));

        // Inserted before the first update so init_city leaves it alone.
        app.insert_resource(city);
        app.insert_resource(EventJournal {
            events: Vec::new(),
            max_events: 100_000,
        });
        app.add_plugins(SimulationPlugin);

        // Startup systems run; the first real-time frame has zero delta.
        app.update();

        Self { app }
    }

    // -----------------------------------------------------------------------
    // World setup (builder pattern: consumes and returns Self)
    // -----------------------------------------------------------------------

    pub fn with_funds(mut self, funds: f64) -> Self {
        self.city_mut().economy.funds = funds;
        self
    }

    /// Place without charging, skipping the funds check.
    pub fn with_building(mut self, x: usize, y: usize, building_type: BuildingType) -> Self {
        let mut city = self.city_mut();
        city.grid
            .put_building((x, y), Building::new(x, y, building_type));
        let distance = city.config.road_access.search_distance;
        city.grid.refresh_road_access((x, y), distance);
        self
    }

    /// A straight horizontal road from `x0` to `x1` inclusive.
    pub fn with_road_row(mut self, y: usize, x0: usize, x1: usize) -> Self {
        for x in x0..=x1 {
            self = self.with_building(x, y, BuildingType::Road);
        }
        self
    }

    /// Force a zone into `Developed` at `level`.
    pub fn with_developed(mut self, x: usize, y: usize, level: u32) -> Self {
        if let Some(dev) = self
            .city_mut()
            .grid
            .building_mut((x, y))
            .and_then(|b| b.development_mut())
        {
            dev.state = DevelopmentState::Developed;
            dev.level = level;
        }
        self
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    pub fn place(&mut self, x: usize, y: usize, building_type: BuildingType) -> bool {
        self.app
            .world_mut()
            .resource_scope(|world, mut journal: Mut<EventJournal>| {
                world
                    .resource_mut::<City>()
                    .place_building(x, y, building_type, &mut *journal)
            })
    }

    pub fn bulldoze(&mut self, x: usize, y: usize) -> bool {
        self.app
            .world_mut()
            .resource_scope(|world, mut journal: Mut<EventJournal>| {
                world.resource_mut::<City>().bulldoze(x, y, &mut *journal)
            })
    }

    pub fn trigger(&mut self, kind: DisasterKind) -> bool {
        self.app
            .world_mut()
            .resource_scope(|world, mut journal: Mut<EventJournal>| {
                world
                    .resource_mut::<City>()
                    .trigger_disaster(kind, &mut *journal)
            })
    }

    /// Run `n` frames; each advances the city exactly one tick.
    pub fn tick(&mut self, n: u32) {
        for _ in 0..n {
            self.app.update();
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn city(&self) -> &City {
        self.app.world().resource::<City>()
    }

    pub fn city_mut(&mut self) -> Mut<'_, City> {
        self.app.world_mut().resource_mut::<City>()
    }

    pub fn tile(&self, x: usize, y: usize) -> Option<&Tile> {
        self.city().get_tile(x as i64, y as i64)
    }

    pub fn building(&self, at: Coord) -> Option<&Building> {
        self.city().grid.building(at)
    }

    pub fn funds(&self) -> f64 {
        self.city().economy.funds
    }

    pub fn population(&self) -> usize {
        self.city().population()
    }

    pub fn citizens(&self) -> Vec<&Citizen> {
        self.city().grid.citizens().collect()
    }

    pub fn events(&self) -> &[CityEvent] {
        &self.app.world().resource::<EventJournal>().events
    }

    pub fn count_events(&self, pred: impl Fn(&CityEvent) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }
}
