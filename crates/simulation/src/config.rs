use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::buildings::BuildingType;

/// Side length of a freshly generated city, in tiles.
pub const DEFAULT_CITY_SIZE: usize = 16;
/// Largest city accepted by `City::deserialize`.
pub const MAX_CITY_SIZE: usize = 512;
/// Needs below this value override the daily schedule.
pub const CRITICAL_NEED_THRESHOLD: f32 = 20.0;

/// All simulation tunables. `Default` reproduces the stock game balance.
///
/// Every section is `#[serde(default)]` so a partial JSON override only needs
/// the fields it changes.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SimConfig {
    pub economy: EconomyConfig,
    pub development: DevelopmentConfig,
    pub jobs: JobsConfig,
    pub residents: ResidentsConfig,
    pub road_access: RoadAccessConfig,
    pub citizen: CitizenConfig,
    pub disasters: DisasterConfig,
    pub time: TimeConfig,
}

impl SimConfig {
    /// Parse a (possibly partial) JSON override on top of the defaults.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Per-building-type dollar amounts (construction cost or monthly upkeep).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingCostTable {
    pub residential: f64,
    pub commercial: f64,
    pub industrial: f64,
    pub road: f64,
    pub power_plant: f64,
    pub power_line: f64,
    pub hospital: f64,
    pub police_station: f64,
    pub fire_station: f64,
    pub school: f64,
}

impl BuildingCostTable {
    pub fn get(&self, building_type: BuildingType) -> f64 {
        match building_type {
            BuildingType::Residential => self.residential,
            BuildingType::Commercial => self.commercial,
            BuildingType::Industrial => self.industrial,
            BuildingType::Road => self.road,
            BuildingType::PowerPlant => self.power_plant,
            BuildingType::PowerLine => self.power_line,
            BuildingType::Hospital => self.hospital,
            BuildingType::PoliceStation => self.police_station,
            BuildingType::FireStation => self.fire_station,
            BuildingType::School => self.school,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxRates {
    /// Per resident per month.
    pub residential: f64,
    /// Per worker per month.
    pub commercial: f64,
    /// Per worker per month.
    pub industrial: f64,
}

impl Default for TaxRates {
    fn default() -> Self {
        Self {
            residential: 15.0,
            commercial: 35.0,
            industrial: 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    pub starting_funds: f64,
    pub steps_per_month: u32,
    pub building_costs: BuildingCostTable,
    pub maintenance_costs: BuildingCostTable,
    pub tax_rates: TaxRates,
    /// Rent charged to every resident at the monthly close.
    pub rent: f64,
    /// Happiness lost by a resident who cannot pay rent.
    pub rent_default_penalty: f32,
    /// Share of a citizen's money spent at a shop each month.
    pub spend_fraction: f64,
    /// Upper bound on a single citizen's monthly spending.
    pub max_monthly_spend: f64,
    /// Manhattan radius searched for a commercial building to shop at.
    pub shopping_radius: usize,
    pub shopping_happiness_bonus: f32,
    /// Savings a citizen arrives with.
    pub starting_savings: f64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_funds: 50_000.0,
            steps_per_month: 30,
            building_costs: BuildingCostTable {
                residential: 500.0,
                commercial: 1000.0,
                industrial: 1500.0,
                road: 100.0,
                power_plant: 5000.0,
                power_line: 50.0,
                hospital: 8000.0,
                police_station: 6000.0,
                fire_station: 7000.0,
                school: 5000.0,
            },
            maintenance_costs: BuildingCostTable {
                residential: 2.0,
                commercial: 5.0,
                industrial: 8.0,
                road: 0.5,
                power_plant: 50.0,
                power_line: 2.0,
                hospital: 75.0,
                police_station: 60.0,
                fire_station: 70.0,
                school: 50.0,
            },
            tax_rates: TaxRates::default(),
            rent: 800.0,
            rent_default_penalty: 10.0,
            spend_fraction: 0.1,
            max_monthly_spend: 500.0,
            shopping_radius: 6,
            shopping_happiness_bonus: 3.0,
            starting_savings: 1000.0,
        }
    }
}

/// What happens to level and progress when an abandoned zone is redeveloped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RedevelopPolicy {
    /// Level survives abandonment; only the counters are cleared.
    #[default]
    KeepLevel,
    /// The zone starts over at level 1.
    ResetLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevelopmentConfig {
    /// Consecutive failing ticks before abandonment is rolled.
    pub abandon_threshold: u32,
    pub abandon_chance: f32,
    /// Ticks spent under construction.
    pub construction_time: u32,
    pub level_up_chance: f32,
    pub redevelop_chance: f32,
    pub max_level: u32,
    /// Ticks a developed zone may stay empty before it counts as failing.
    pub vacancy_threshold: u32,
    /// Zones also fail their criteria while under-powered.
    pub require_power: bool,
    pub redevelop_policy: RedevelopPolicy,
}

impl Default for DevelopmentConfig {
    fn default() -> Self {
        Self {
            abandon_threshold: 10,
            abandon_chance: 0.25,
            construction_time: 3,
            level_up_chance: 0.05,
            redevelop_chance: 0.25,
            max_level: 3,
            vacancy_threshold: 500,
            require_power: false,
            redevelop_policy: RedevelopPolicy::KeepLevel,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobsConfig {
    /// Workers per building at level 1; capacity is `max_workers ^ level`.
    pub max_workers: u32,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self { max_workers: 2 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResidentsConfig {
    /// Residents per building at level 1; capacity is `max_residents ^ level`.
    pub max_residents: u32,
    pub resident_move_in_chance: f32,
}

impl Default for ResidentsConfig {
    fn default() -> Self {
        Self {
            max_residents: 2,
            resident_move_in_chance: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadAccessConfig {
    pub search_distance: usize,
}

impl Default for RoadAccessConfig {
    fn default() -> Self {
        Self { search_distance: 3 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CitizenConfig {
    pub min_working_age: u32,
    pub retirement_age: u32,
    pub max_job_search_distance: usize,
    /// Salary paid when no listed profession fits the workplace.
    pub minimum_wage: f64,
    /// Fraction of the remaining journey covered per tick.
    pub movement_speed: f32,
    /// Passive health and safety loss per tick.
    pub need_decay: f32,
    pub unemployment_penalty: f32,
    /// Service buildings hire from the citizen population.
    pub services_hire: bool,
}

impl Default for CitizenConfig {
    fn default() -> Self {
        Self {
            min_working_age: 16,
            retirement_age: 65,
            max_job_search_distance: 4,
            minimum_wage: 2500.0,
            movement_speed: 0.02,
            need_decay: 0.1,
            unemployment_penalty: 15.0,
            services_hire: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisasterConfig {
    /// 0 = none, 1 = easy, 2 = normal, 3 = hard.
    pub difficulty: u8,
}

impl Default for DisasterConfig {
    fn default() -> Self {
        Self { difficulty: 2 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    pub ticks_per_hour: u32,
    pub start_hour: u32,
    /// Real milliseconds per tick at normal speed.
    pub tick_interval_ms: f64,
    pub min_tick_interval_ms: f64,
    pub max_tick_interval_ms: f64,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            ticks_per_hour: 60,
            start_hour: 8,
            tick_interval_ms: 1000.0,
            min_tick_interval_ms: 100.0,
            max_tick_interval_ms: 5000.0,
        }
    }
}
