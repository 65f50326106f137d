use std::path::PathBuf;

use bevy::prelude::*;

use simulation::city::City;
use simulation::config::SimConfig;

use crate::save_codec::SaveOptions;
use crate::{load_city, save_city};

/// Write the current city to `path`.
#[derive(Event, Debug, Clone)]
pub struct SaveCityEvent {
    pub path: PathBuf,
}

/// Replace the current city with the one saved at `path`. A failed load
/// leaves the running city untouched.
#[derive(Event, Debug, Clone)]
pub struct LoadCityEvent {
    pub path: PathBuf,
}

fn handle_save_events(
    mut events: EventReader<SaveCityEvent>,
    city: Option<Res<City>>,
    options: Res<SaveOptions>,
) {
    for event in events.read() {
        let Some(city) = city.as_deref() else {
            warn!("Save requested before a city exists");
            continue;
        };
        match save_city(&event.path, city, *options) {
            Ok(bytes) => info!(
                "Saved {} to {} ({} bytes)",
                city.name,
                event.path.display(),
                bytes
            ),
            Err(err) => warn!("Failed to save to {}: {err}", event.path.display()),
        }
    }
}

fn handle_load_events(
    mut commands: Commands,
    mut events: EventReader<LoadCityEvent>,
    config: Res<SimConfig>,
) {
    for event in events.read() {
        match load_city(&event.path, config.clone()) {
            Ok(city) => {
                info!("Loaded {} from {}", city.name, event.path.display());
                commands.insert_resource(city);
            }
            Err(err) => warn!("Failed to load {}: {err}", event.path.display()),
        }
    }
}

pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SaveOptions>()
            .init_resource::<SimConfig>()
            .add_event::<SaveCityEvent>()
            .add_event::<LoadCityEvent>()
            .add_systems(Update, (handle_save_events, handle_load_events).chain());
    }
}
