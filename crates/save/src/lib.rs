//! City save files.
//!
//! `save_city` / `load_city` move a [`City`] to and from disk through
//! [`save_codec`]; `load_or_new` is the startup path that never fails and
//! founds a fresh city when the save is missing or unreadable.
//! [`SavePlugin`] exposes the same operations to a Bevy app as events.

use std::path::Path;

use bevy::prelude::*;

use simulation::city::City;
use simulation::config::SimConfig;
use simulation::CitySettings;

pub mod atomic_write;
pub mod file_header;
pub mod save_codec;
pub mod save_error;
mod save_plugin;

pub use save_codec::{decode_city, encode_city, SaveOptions};
pub use save_error::SaveError;
pub use save_plugin::{LoadCityEvent, SaveCityEvent, SavePlugin};

/// Write `city` to `path`. Returns the number of bytes written.
pub fn save_city(path: &Path, city: &City, options: SaveOptions) -> Result<usize, SaveError> {
    let bytes = encode_city(city, options)?;
    atomic_write::atomic_write(path, &bytes)?;
    Ok(bytes.len())
}

/// Read a city from `path`.
pub fn load_city(path: &Path, config: SimConfig) -> Result<City, SaveError> {
    let bytes = std::fs::read(path)?;
    decode_city(&bytes, config)
}

/// Load `path`, or found a new city from `settings` if that fails.
pub fn load_or_new(path: &Path, settings: &CitySettings, config: &SimConfig) -> City {
    match load_city(path, config.clone()) {
        Ok(city) => {
            info!(
                "Loaded {} (population {}) from {}",
                city.name,
                city.population(),
                path.display()
            );
            return city;
        }
        Err(SaveError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("No save at {}, founding {}", path.display(), settings.name);
        }
        Err(err) => {
            warn!(
                "Could not load {}: {err}. Founding {} instead",
                path.display(),
                settings.name
            );
        }
    }
    City::new(
        settings.name.clone(),
        settings.size,
        settings.seed,
        config.clone(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use simulation::buildings::BuildingType;
    use simulation::events::CityEvent;
    use std::path::PathBuf;

    fn test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tilecity_save_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn settings() -> CitySettings {
        CitySettings {
            name: "Fallback".to_string(),
            size: 8,
            seed: 11,
        }
    }

    #[test]
    fn test_save_then_load() {
        let dir = test_dir("save_then_load");
        let path = dir.join("city.sav");
        let mut city = City::new("Disk", 8, 5, SimConfig::default());
        let mut events: Vec<CityEvent> = Vec::new();
        let spot = city
            .grid
            .tiles
            .iter()
            .find(|t| t.terrain.is_buildable())
            .map(|t| (t.x, t.y))
            .unwrap();
        assert!(city.place_building(spot.0, spot.1, BuildingType::Road, &mut events));

        let written = save_city(&path, &city, SaveOptions::default()).unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len() as usize, written);

        let loaded = load_city(&path, SimConfig::default()).unwrap();
        assert_eq!(loaded.name, "Disk");
        assert_eq!(
            loaded
                .get_tile(spot.0 as i64, spot.1 as i64)
                .and_then(|t| t.building_type()),
            Some(BuildingType::Road)
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_save_founds_new_city() {
        let dir = test_dir("missing");
        let city = load_or_new(&dir.join("nope.sav"), &settings(), &SimConfig::default());
        assert_eq!(city.name, "Fallback");
        assert_eq!(city.size(), 8);
        assert_eq!(city.terrain_seed, Some(11));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_corrupt_save_founds_new_city() {
        let dir = test_dir("corrupt");
        let path = dir.join("city.sav");
        std::fs::write(&path, b"TILE\x01\x00").unwrap();
        assert!(matches!(
            load_city(&path, SimConfig::default()),
            Err(SaveError::TooShort { .. })
        ));
        let city = load_or_new(&path, &settings(), &SimConfig::default());
        assert_eq!(city.name, "Fallback");
        assert_eq!(city.population(), 0);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
