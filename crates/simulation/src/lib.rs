use bevy::prelude::*;

pub mod buildings;
pub mod citizen;
pub mod city;
pub mod config;
pub mod disasters;
pub mod economy;
pub mod events;
pub mod grid;
pub mod power;
pub mod profession;
pub mod services;
pub mod sim_rng;
pub mod snapshot;
pub mod terrain_generation;
pub mod time_of_day;

#[cfg(any(test, feature = "bench"))]
pub mod test_harness;

use city::City;
use config::{SimConfig, DEFAULT_CITY_SIZE};
use events::{record_city_events, CityEvent, EventJournal};

// ---------------------------------------------------------------------------
// Core resources
// ---------------------------------------------------------------------------

/// How to found the city when none has been inserted or loaded.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct CitySettings {
    pub name: String,
    pub size: usize,
    pub seed: u64,
}

impl Default for CitySettings {
    fn default() -> Self {
        Self {
            name: "New City".to_string(),
            size: DEFAULT_CITY_SIZE,
            seed: sim_rng::DEFAULT_SEED,
        }
    }
}

/// Founds the city at startup unless one was already inserted (tests, loaded
/// saves).
pub fn init_city(
    mut commands: Commands,
    settings: Res<CitySettings>,
    config: Res<SimConfig>,
    existing: Option<Res<City>>,
) {
    if existing.is_some() {
        return;
    }
    info!(
        "Founding {} ({}x{}, seed {})",
        settings.name, settings.size, settings.size, settings.seed
    );
    commands.insert_resource(City::new(
        settings.name.clone(),
        settings.size,
        settings.seed,
        config.clone(),
    ));
}

/// Feeds this frame's virtual time into the city clock.
pub fn advance_city(
    time: Res<Time>,
    mut city: ResMut<City>,
    mut events: EventWriter<CityEvent>,
) {
    let ticks = city.advance(time.delta(), &mut events);
    if ticks > 1 {
        debug!("Caught up {} ticks in one frame", ticks);
    }
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimConfig>()
            .init_resource::<CitySettings>()
            .init_resource::<EventJournal>()
            .add_event::<CityEvent>()
            .add_systems(Startup, init_city)
            .add_systems(
                Update,
                (advance_city, record_city_events)
                    .chain()
                    .run_if(resource_exists::<City>),
            );
    }
}
