//! Headless city runner.
//!
//! Founds (or loads) a city, runs it for a fixed number of ticks inside a
//! Bevy `App` with `MinimalPlugins`, logs notable events and a summary, and
//! optionally writes a save. Log verbosity comes from `TILECITY_LOG`
//! (a level such as `debug`, or a full filter such as `simulation=debug`).

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use bevy::log::{Level, LogPlugin};
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use clap::Parser;

use simulation::city::City;
use simulation::config::{SimConfig, DEFAULT_CITY_SIZE, MAX_CITY_SIZE};
use simulation::events::CityEvent;
use simulation::sim_rng::DEFAULT_SEED;
use simulation::{CitySettings, SimulationPlugin};

mod summary;

use summary::CitySummary;

const LOG_ENV: &str = "TILECITY_LOG";

/// Run a tile city simulation without a window.
#[derive(Parser, Debug)]
#[command(name = "tilecity")]
struct Args {
    /// Number of simulation ticks to run
    #[arg(long, default_value_t = 1440)]
    ticks: u32,

    /// City name for a newly founded city
    #[arg(long, default_value = "New City")]
    name: String,

    /// Side length of a newly founded city, in tiles
    #[arg(long, default_value_t = DEFAULT_CITY_SIZE, value_parser = parse_city_size)]
    size: usize,

    /// Terrain and simulation seed for a newly founded city
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// JSON file with configuration overrides
    #[arg(long)]
    config: Option<PathBuf>,

    /// Continue from this save instead of founding a city
    #[arg(long)]
    load: Option<PathBuf>,

    /// Write the final city to this path
    #[arg(long)]
    save: Option<PathBuf>,

    /// Store the save payload without LZ4 compression
    #[arg(long)]
    no_compress: bool,
}

fn parse_city_size(text: &str) -> Result<usize, String> {
    let size: usize = text
        .parse()
        .map_err(|_| format!("`{text}` is not a tile count"))?;
    if (1..=MAX_CITY_SIZE).contains(&size) {
        Ok(size)
    } else {
        Err(format!("city size must be between 1 and {MAX_CITY_SIZE}"))
    }
}

fn log_plugin() -> LogPlugin {
    let setting = std::env::var(LOG_ENV).unwrap_or_else(|_| "info".to_string());
    match setting.parse::<Level>() {
        Ok(level) => LogPlugin {
            level,
            ..default()
        },
        Err(_) => LogPlugin {
            filter: setting,
            ..default()
        },
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<SimConfig, String> {
    let Some(path) = path else {
        return Ok(SimConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    SimConfig::from_json_str(&text).map_err(|e| format!("bad config {}: {e}", path.display()))
}

fn log_notable_events(mut events: EventReader<CityEvent>) {
    for event in events.read() {
        match event {
            CityEvent::DisasterStarted { .. }
            | CityEvent::DisasterEnded { .. }
            | CityEvent::BuildingDestroyed { .. }
            | CityEvent::PowerRestored { .. }
            | CityEvent::BudgetClosed(_) => info!("{event}"),
            CityEvent::Bankrupt { .. } => warn!("{event}"),
            _ => debug!("{event}"),
        }
    }
}

fn tick_duration(city: &City) -> Duration {
    Duration::from_secs_f64(city.time.tick_interval / 1000.0)
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut app = App::new();
    app.add_plugins(MinimalPlugins).add_plugins(log_plugin());

    let config = match load_config(args.config.as_ref()) {
        Ok(config) => config,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };
    let settings = CitySettings {
        name: args.name.clone(),
        size: args.size,
        seed: args.seed,
    };
    if let Some(path) = &args.load {
        app.insert_resource(save::load_or_new(path, &settings, &config));
    }

    app.insert_resource(settings)
        .insert_resource(config)
        .insert_resource(save::SaveOptions {
            compress: !args.no_compress,
        })
        .add_plugins((SimulationPlugin, save::SavePlugin))
        .add_systems(Update, log_notable_events);

    // Startup; the first frame carries no time.
    app.update();

    let Some(tick) = app.world().get_resource::<City>().map(tick_duration) else {
        error!("No city after startup");
        return ExitCode::FAILURE;
    };
    app.insert_resource(TimeUpdateStrategy::ManualDuration(tick));
    app.world_mut()
        .resource_mut::<Time<Virtual>>()
        .set_max_delta(tick * 2);

    info!("Running {} ticks", args.ticks);
    for _ in 0..args.ticks {
        app.update();
    }

    let Some(city) = app.world().get_resource::<City>() else {
        error!("City disappeared during the run");
        return ExitCode::FAILURE;
    };
    info!("{}", CitySummary::of(city));

    if let Some(path) = &args.save {
        let options = save::SaveOptions {
            compress: !args.no_compress,
        };
        match save::save_city(path, city, options) {
            Ok(bytes) => info!("Saved to {} ({} bytes)", path.display(), bytes),
            Err(err) => {
                error!("Failed to save to {}: {err}", path.display());
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["tilecity"]);
        assert_eq!(args.ticks, 1440);
        assert_eq!(args.size, DEFAULT_CITY_SIZE);
        assert_eq!(args.seed, DEFAULT_SEED);
        assert!(args.save.is_none());
        assert!(!args.no_compress);
    }

    #[test]
    fn test_args_overrides() {
        let args = Args::parse_from([
            "tilecity",
            "--ticks",
            "10",
            "--size",
            "32",
            "--save",
            "out/city.sav",
            "--no-compress",
        ]);
        assert_eq!(args.ticks, 10);
        assert_eq!(args.size, 32);
        assert_eq!(args.save, Some(PathBuf::from("out/city.sav")));
        assert!(args.no_compress);
    }

    #[test]
    fn test_size_out_of_range_is_rejected() {
        assert!(Args::try_parse_from(["tilecity", "--size", "0"]).is_err());
        let too_big = (MAX_CITY_SIZE + 1).to_string();
        assert!(Args::try_parse_from(["tilecity", "--size", too_big.as_str()]).is_err());
        assert!(Args::try_parse_from(["tilecity", "--size", "ten"]).is_err());
        let max = MAX_CITY_SIZE.to_string();
        let args = Args::try_parse_from(["tilecity", "--size", max.as_str()]).unwrap();
        assert_eq!(args.size, MAX_CITY_SIZE);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let path = PathBuf::from("/definitely/not/here.json");
        assert!(load_config(Some(&path)).is_err());
        assert_eq!(load_config(None), Ok(SimConfig::default()));
    }
}
