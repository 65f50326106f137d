//! Serializable shape of a whole city.
//!
//! [`CitySave`] is what [`crate::city::City::serialize`] produces and
//! [`crate::city::City::deserialize`] consumes. Field names are camelCase so
//! saves stay readable as plain JSON. Only tiles with a building are listed;
//! terrain for the rest is regenerated from `metadata.terrainSeed`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::buildings::development::Development;
use crate::buildings::{BuildingType, PowerPlant, PowerState, RoadAccess};
use crate::citizen::{Citizen, CitizenId};
use crate::disasters::DisasterEngine;
use crate::economy::Economy;
use crate::terrain_generation::Terrain;
use crate::time_of_day::TimeManager;

pub const SAVE_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitySave {
    pub version: String,
    /// Milliseconds since the Unix epoch at save time.
    pub timestamp: u64,
    pub metadata: SaveMetadata,
    pub time_manager: TimeManager,
    pub economy: Economy,
    pub disasters: DisasterEngine,
    pub tiles: Vec<TileSave>,
    pub citizens: BTreeMap<CitizenId, Citizen>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveMetadata {
    pub city_name: String,
    pub city_size: usize,
    pub sim_time: u64,
    #[serde(default)]
    pub terrain_seed: Option<u64>,
    /// Next id to hand out. Older saves fall back to the highest saved id + 1.
    #[serde(default)]
    pub next_citizen_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileSave {
    pub x: usize,
    pub y: usize,
    pub terrain: Terrain,
    pub building: BuildingSave,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingSave {
    #[serde(rename = "type")]
    pub building_type: BuildingType,
    pub damage: u8,
    pub on_fire: bool,
    pub disabled: bool,
    pub road_access: RoadAccess,
    pub power: PowerState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub development: Option<Development>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue: Option<f64>,
    /// Citizen ids; the citizens themselves are under `CitySave::citizens`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub residents: Option<Vec<CitizenId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<Vec<CitizenId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_plant: Option<PowerPlant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceSave>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSave {
    pub effectiveness: u32,
    pub current_load: u32,
}
