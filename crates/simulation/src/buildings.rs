use std::fmt;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::city::TickContext;
use crate::config::SimConfig;
use crate::events::CityEvent;
use crate::grid::WorldGrid;
use crate::power;
use crate::services::{ServiceBuilding, ServiceType};

pub mod development;
pub mod jobs;
pub mod residents;

use development::{Development, DevelopmentEvent, DevelopmentState};
use jobs::Jobs;
use residents::Residents;

// =============================================================================
// Building types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildingType {
    Residential,
    Commercial,
    Industrial,
    Road,
    PowerPlant,
    PowerLine,
    Hospital,
    PoliceStation,
    FireStation,
    School,
}

impl BuildingType {
    pub const ALL: [BuildingType; 10] = [
        BuildingType::Residential,
        BuildingType::Commercial,
        BuildingType::Industrial,
        BuildingType::Road,
        BuildingType::PowerPlant,
        BuildingType::PowerLine,
        BuildingType::Hospital,
        BuildingType::PoliceStation,
        BuildingType::FireStation,
        BuildingType::School,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BuildingType::Residential => "residential",
            BuildingType::Commercial => "commercial",
            BuildingType::Industrial => "industrial",
            BuildingType::Road => "road",
            BuildingType::PowerPlant => "power-plant",
            BuildingType::PowerLine => "power-line",
            BuildingType::Hospital => "hospital",
            BuildingType::PoliceStation => "police-station",
            BuildingType::FireStation => "fire-station",
            BuildingType::School => "school",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            BuildingType::Residential => "Residential Zone",
            BuildingType::Commercial => "Commercial Zone",
            BuildingType::Industrial => "Industrial Zone",
            BuildingType::Road => "Road",
            BuildingType::PowerPlant => "Power Plant",
            BuildingType::PowerLine => "Power Line",
            BuildingType::Hospital => "Hospital",
            BuildingType::PoliceStation => "Police Station",
            BuildingType::FireStation => "Fire Station",
            BuildingType::School => "School",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    pub fn is_zone(self) -> bool {
        matches!(
            self,
            BuildingType::Residential | BuildingType::Commercial | BuildingType::Industrial
        )
    }

    /// Commercial and industrial zones: the places that pay zone wages.
    pub fn is_business(self) -> bool {
        matches!(self, BuildingType::Commercial | BuildingType::Industrial)
    }

    pub fn service(self) -> Option<ServiceType> {
        match self {
            BuildingType::Hospital => Some(ServiceType::Hospital),
            BuildingType::PoliceStation => Some(ServiceType::PoliceStation),
            BuildingType::FireStation => Some(ServiceType::FireStation),
            BuildingType::School => Some(ServiceType::School),
            _ => None,
        }
    }

    /// Roads and power lines are infrastructure: fires never start on them and
    /// they never need a road of their own.
    pub fn is_infrastructure(self) -> bool {
        matches!(self, BuildingType::Road | BuildingType::PowerLine)
    }
}

impl fmt::Display for BuildingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Shared modules
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoadAccess {
    /// Whether this building cares about road access at all.
    pub enabled: bool,
    pub value: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PowerState {
    pub required: f32,
    pub supplied: f32,
}

impl PowerState {
    pub fn is_fully_powered(&self) -> bool {
        self.supplied >= self.required
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerPlant {
    pub capacity: f32,
    pub consumed: f32,
}

impl Default for PowerPlant {
    fn default() -> Self {
        Self {
            capacity: power::PLANT_CAPACITY,
            consumed: 0.0,
        }
    }
}

/// Residential, commercial or industrial zone state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Zone {
    pub development: Development,
    /// Present on residential zones only.
    pub residents: Option<Residents>,
    /// Present on commercial and industrial zones only.
    pub jobs: Option<Jobs>,
    /// Consumer spending received, lifetime total.
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BuildingKind {
    Road,
    PowerLine,
    PowerPlant(PowerPlant),
    Zone(Zone),
    Service(ServiceBuilding),
}

// =============================================================================
// Building
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    pub building_type: BuildingType,
    pub x: usize,
    pub y: usize,
    /// 0 = intact, 3 = heavily damaged.
    pub damage: u8,
    pub on_fire: bool,
    pub disabled: bool,
    pub road_access: RoadAccess,
    pub power: PowerState,
    pub kind: BuildingKind,
}

pub const MAX_DAMAGE: u8 = 3;

fn service_kind(service: ServiceType) -> BuildingKind {
    BuildingKind::Service(ServiceBuilding::new(service))
}

impl Building {
    pub fn new(x: usize, y: usize, building_type: BuildingType) -> Self {
        let kind = match building_type {
            BuildingType::Road => BuildingKind::Road,
            BuildingType::PowerLine => BuildingKind::PowerLine,
            BuildingType::PowerPlant => BuildingKind::PowerPlant(PowerPlant::default()),
            BuildingType::Residential => BuildingKind::Zone(Zone {
                residents: Some(Residents::default()),
                ..Zone::default()
            }),
            BuildingType::Commercial | BuildingType::Industrial => BuildingKind::Zone(Zone {
                jobs: Some(Jobs::default()),
                ..Zone::default()
            }),
            BuildingType::Hospital => service_kind(ServiceType::Hospital),
            BuildingType::PoliceStation => service_kind(ServiceType::PoliceStation),
            BuildingType::FireStation => service_kind(ServiceType::FireStation),
            BuildingType::School => service_kind(ServiceType::School),
        };
        Self {
            building_type,
            x,
            y,
            damage: 0,
            on_fire: false,
            disabled: false,
            road_access: RoadAccess {
                enabled: !building_type.is_infrastructure(),
                value: false,
            },
            power: PowerState::default(),
            kind,
        }
    }

    pub fn position(&self) -> (usize, usize) {
        (self.x, self.y)
    }

    // -------------------------------------------------------------------------
    // Module accessors
    // -------------------------------------------------------------------------

    pub fn zone(&self) -> Option<&Zone> {
        match &self.kind {
            BuildingKind::Zone(zone) => Some(zone),
            _ => None,
        }
    }

    pub fn zone_mut(&mut self) -> Option<&mut Zone> {
        match &mut self.kind {
            BuildingKind::Zone(zone) => Some(zone),
            _ => None,
        }
    }

    pub fn development(&self) -> Option<&Development> {
        self.zone().map(|z| &z.development)
    }

    pub fn development_mut(&mut self) -> Option<&mut Development> {
        self.zone_mut().map(|z| &mut z.development)
    }

    pub fn residents(&self) -> Option<&Residents> {
        self.zone().and_then(|z| z.residents.as_ref())
    }

    pub fn residents_mut(&mut self) -> Option<&mut Residents> {
        self.zone_mut().and_then(|z| z.residents.as_mut())
    }

    /// Zone jobs or service staff roster.
    pub fn jobs(&self) -> Option<&Jobs> {
        match &self.kind {
            BuildingKind::Zone(zone) => zone.jobs.as_ref(),
            BuildingKind::Service(service) => Some(&service.staff),
            _ => None,
        }
    }

    pub fn jobs_mut(&mut self) -> Option<&mut Jobs> {
        match &mut self.kind {
            BuildingKind::Zone(zone) => zone.jobs.as_mut(),
            BuildingKind::Service(service) => Some(&mut service.staff),
            _ => None,
        }
    }

    pub fn service(&self) -> Option<&ServiceBuilding> {
        match &self.kind {
            BuildingKind::Service(service) => Some(service),
            _ => None,
        }
    }

    pub fn service_mut(&mut self) -> Option<&mut ServiceBuilding> {
        match &mut self.kind {
            BuildingKind::Service(service) => Some(service),
            _ => None,
        }
    }

    pub fn power_plant(&self) -> Option<&PowerPlant> {
        match &self.kind {
            BuildingKind::PowerPlant(plant) => Some(plant),
            _ => None,
        }
    }

    pub fn power_plant_mut(&mut self) -> Option<&mut PowerPlant> {
        match &mut self.kind {
            BuildingKind::PowerPlant(plant) => Some(plant),
            _ => None,
        }
    }

    // -------------------------------------------------------------------------
    // Derived values
    // -------------------------------------------------------------------------

    pub fn resident_count(&self) -> usize {
        self.residents().map_or(0, Residents::count)
    }

    pub fn worker_count(&self) -> usize {
        self.jobs().map_or(0, Jobs::count)
    }

    pub fn level(&self) -> u32 {
        self.development().map_or(1, |d| d.level)
    }

    pub fn max_residents(&self, config: &SimConfig) -> u32 {
        match self.residents() {
            Some(_) => Residents::maximum(config.residents.max_residents, self.level()),
            None => 0,
        }
    }

    pub fn max_workers(&self, config: &SimConfig) -> u32 {
        match &self.kind {
            BuildingKind::Zone(zone) if zone.jobs.is_some() => {
                Jobs::maximum(config.jobs.max_workers, zone.development.level)
            }
            BuildingKind::Service(service) => service.service.max_staff(),
            _ => 0,
        }
    }

    /// Open positions. Zones only hire once developed.
    pub fn available_jobs(&self, config: &SimConfig) -> u32 {
        let accepting = match &self.kind {
            BuildingKind::Zone(zone) => zone.development.accepts_occupants(),
            BuildingKind::Service(_) => true,
            _ => false,
        };
        if !accepting {
            return 0;
        }
        self.max_workers(config)
            .saturating_sub(self.worker_count() as u32)
    }

    /// Power this plant can still hand out. Zero while disabled or cut off
    /// from the road network.
    pub fn power_available(&self) -> f32 {
        match self.power_plant() {
            Some(plant) if !self.disabled && self.road_access.value => {
                (plant.capacity - plant.consumed).max(0.0)
            }
            _ => 0.0,
        }
    }

    /// Whether this zone currently passes its abandonment criteria.
    pub fn meets_development_criteria(&self, config: &SimConfig) -> bool {
        let Some(zone) = self.zone() else {
            return true;
        };
        if !self.road_access.value {
            return false;
        }
        if config.development.require_power && !self.power.is_fully_powered() {
            return false;
        }
        zone.development.vacancy_counter < config.development.vacancy_threshold
    }

    fn occupant_count(&self) -> usize {
        self.resident_count() + self.worker_count()
    }

    // -------------------------------------------------------------------------
    // Simulation
    // -------------------------------------------------------------------------

    /// Per-tick update: development, then occupancy, then residents.
    ///
    /// The building has been lifted off its tile for the duration of the call,
    /// so `grid` can be borrowed mutably for job searches and layoffs.
    pub fn simulate(&mut self, grid: &mut WorldGrid, ctx: &mut TickContext) {
        if self.zone().is_none() {
            return;
        }
        let (x, y) = self.position();
        let criteria = self.meets_development_criteria(ctx.config);
        let occupied = self.occupant_count() > 0;

        let Some(zone) = self.zone_mut() else {
            return;
        };
        zone.development.record_occupancy(occupied);
        let change = zone.development.step(criteria, &ctx.config.development, ctx.rng);

        match change {
            Some(DevelopmentEvent::Developed) => ctx.events.emit(CityEvent::ZoneDeveloped { x, y }),
            Some(DevelopmentEvent::LeveledUp(level)) => {
                ctx.events.emit(CityEvent::ZoneLeveledUp { x, y, level })
            }
            Some(DevelopmentEvent::Redeveloped) => {
                ctx.events.emit(CityEvent::ZoneRedeveloped { x, y })
            }
            Some(DevelopmentEvent::Abandoned) => {
                ctx.events.emit(CityEvent::ZoneAbandoned { x, y });
                self.release_occupants(grid, ctx);
            }
            None => {}
        }

        let max_residents = self.max_residents(ctx.config);
        let Some(zone) = self.zone_mut() else {
            return;
        };
        let developed = zone.development.state == DevelopmentState::Developed;
        if let Some(residents) = zone.residents.as_mut() {
            if developed {
                residents.try_move_in((x, y), max_residents, grid, ctx);
            }
            residents.simulate_all(grid, ctx);
        }
    }

    /// Evict every resident and lay off every worker.
    pub fn release_occupants(&mut self, grid: &mut WorldGrid, ctx: &mut TickContext) {
        let (x, y) = self.position();
        if let Some(residents) = self.residents_mut() {
            let count = residents.evict_all(grid);
            if count > 0 {
                ctx.events.emit(CityEvent::ResidentsEvicted { x, y, count });
            }
        }
        if let Some(jobs) = self.jobs_mut() {
            let count = jobs.lay_off_all(grid);
            if count > 0 {
                ctx.events.emit(CityEvent::WorkersLaidOff { x, y, count });
            }
        }
    }

    /// Plain-text summary for inspection panels and logs.
    pub fn describe(&self, config: &SimConfig) -> String {
        let mut out = format!(
            "{} at ({}, {})",
            self.building_type.display_name(),
            self.x,
            self.y
        );
        if self.damage > 0 {
            let _ = write!(out, "\nDamage: {}/{}", self.damage, MAX_DAMAGE);
        }
        if self.on_fire {
            out.push_str("\nOn fire!");
        }
        if self.road_access.enabled && !self.road_access.value {
            out.push_str("\nNo road access");
        }
        match &self.kind {
            BuildingKind::Zone(zone) => {
                let _ = write!(
                    out,
                    "\nState: {} (level {})",
                    zone.development.state, zone.development.level
                );
                if let Some(residents) = &zone.residents {
                    let _ = write!(
                        out,
                        "\nResidents: {}/{}",
                        residents.count(),
                        self.max_residents(config)
                    );
                    for citizen in &residents.citizens {
                        let _ = write!(out, "\n  {}", citizen.summary());
                    }
                }
                if let Some(jobs) = &zone.jobs {
                    let _ = write!(
                        out,
                        "\nWorkers: {}/{}",
                        jobs.count(),
                        self.max_workers(config)
                    );
                }
            }
            BuildingKind::PowerPlant(plant) => {
                let _ = write!(
                    out,
                    "\nPower: {:.0}/{:.0} available",
                    self.power_available(),
                    plant.capacity
                );
                if self.disabled {
                    out.push_str("\nOffline");
                }
            }
            BuildingKind::Service(service) => {
                let _ = write!(
                    out,
                    "\nStaff: {}/{}\nEffectiveness: {}%\nLoad: {}/{} ({}%)",
                    service.staff.count(),
                    service.service.max_staff(),
                    service.effectiveness,
                    service.current_load,
                    service.service.capacity(),
                    service.utilization()
                );
            }
            BuildingKind::Road | BuildingKind::PowerLine => {}
        }
        if self.power.required > 0.0 {
            let _ = write!(
                out,
                "\nPower: {:.0}/{:.0}",
                self.power.supplied, self.power.required
            );
        }
        out
    }
}
