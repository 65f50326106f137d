use std::fmt;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::buildings::{BuildingType, MAX_DAMAGE};
use crate::city::TickContext;
use crate::events::CityEvent;
use crate::grid::{Coord, WorldGrid};

pub mod fire;
pub mod flood;
pub mod power_outage;

pub use fire::Fire;
pub use flood::Flood;
pub use power_outage::PowerOutage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisasterKind {
    Fire,
    Flood,
    PowerOutage,
}

impl DisasterKind {
    pub const ALL: [DisasterKind; 3] = [
        DisasterKind::Fire,
        DisasterKind::Flood,
        DisasterKind::PowerOutage,
    ];
}

impl fmt::Display for DisasterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DisasterKind::Fire => "Fire",
            DisasterKind::Flood => "Flood",
            DisasterKind::PowerOutage => "Power outage",
        })
    }
}

// =============================================================================
// Incident contract
// =============================================================================

/// Lifecycle shared by every disaster: `update` once per tick until
/// `is_expired`, then `cleanup` exactly once. `cleanup` must tolerate being
/// called again.
pub trait Incident {
    fn kind(&self) -> DisasterKind;
    fn position(&self) -> Coord;
    fn update(&mut self, grid: &mut WorldGrid, ctx: &mut TickContext);
    fn is_expired(&self) -> bool;
    fn cleanup(&mut self, grid: &mut WorldGrid, ctx: &mut TickContext);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Disaster {
    Fire(Fire),
    Flood(Flood),
    PowerOutage(PowerOutage),
}

impl Disaster {
    fn incident(&self) -> &dyn Incident {
        match self {
            Disaster::Fire(d) => d,
            Disaster::Flood(d) => d,
            Disaster::PowerOutage(d) => d,
        }
    }

    fn incident_mut(&mut self) -> &mut dyn Incident {
        match self {
            Disaster::Fire(d) => d,
            Disaster::Flood(d) => d,
            Disaster::PowerOutage(d) => d,
        }
    }
}

impl Incident for Disaster {
    fn kind(&self) -> DisasterKind {
        self.incident().kind()
    }

    fn position(&self) -> Coord {
        self.incident().position()
    }

    fn update(&mut self, grid: &mut WorldGrid, ctx: &mut TickContext) {
        self.incident_mut().update(grid, ctx);
    }

    fn is_expired(&self) -> bool {
        self.incident().is_expired()
    }

    fn cleanup(&mut self, grid: &mut WorldGrid, ctx: &mut TickContext) {
        self.incident_mut().cleanup(grid, ctx);
    }
}

// =============================================================================
// Damage
// =============================================================================

/// Cumulative roll thresholds for destroyed, damage 3, damage 2 and damage 1.
/// A roll above the last threshold leaves the building untouched.
#[derive(Debug, Clone, Copy)]
pub struct DamageTable(pub [f32; 4]);

pub const FIRE_DAMAGE: DamageTable = DamageTable([0.15, 0.35, 0.60, 0.85]);
pub const FLOOD_DAMAGE: DamageTable = DamageTable([0.05, 0.15, 0.30, 0.50]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    Destroyed,
    Damaged(u8),
    Spared,
}

impl DamageTable {
    pub fn outcome(&self, roll: f32) -> DamageOutcome {
        let [destroyed, heavy, moderate, light] = self.0;
        if roll < destroyed {
            DamageOutcome::Destroyed
        } else if roll < heavy {
            DamageOutcome::Damaged(MAX_DAMAGE)
        } else if roll < moderate {
            DamageOutcome::Damaged(2)
        } else if roll < light {
            DamageOutcome::Damaged(1)
        } else {
            DamageOutcome::Spared
        }
    }
}

/// Roll `table` for the building at `at` and apply the result. Damage only
/// ever increases.
pub fn roll_damage(grid: &mut WorldGrid, at: Coord, table: DamageTable, ctx: &mut TickContext) {
    if grid.building(at).is_none() {
        return;
    }
    match table.outcome(ctx.rng.roll()) {
        DamageOutcome::Destroyed => {
            if let Some(building_type) = grid.demolish(at, ctx) {
                ctx.events.emit(CityEvent::BuildingDestroyed {
                    x: at.0,
                    y: at.1,
                    building_type,
                });
            }
        }
        DamageOutcome::Damaged(level) => {
            if let Some(building) = grid.building_mut(at) {
                if level > building.damage {
                    building.damage = level;
                    ctx.events.emit(CityEvent::BuildingDamaged {
                        x: at.0,
                        y: at.1,
                        damage: level,
                    });
                }
            }
        }
        DamageOutcome::Spared => {}
    }
}

// =============================================================================
// Engine
// =============================================================================

const DIFFICULTY_NAMES: [&str; 4] = ["None", "Easy", "Normal", "Hard"];
const MAX_DIFFICULTY: u8 = 3;

/// Periodically rolls for new disasters and drives the active ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisasterEngine {
    pub difficulty: u8,
    pub enabled: bool,
    pub disaster_chance: f32,
    pub check_interval: u32,
    #[serde(default)]
    pub spawn_counter: u32,
    pub active_disasters: Vec<Disaster>,
}

impl Default for DisasterEngine {
    fn default() -> Self {
        Self::new(2)
    }
}

impl DisasterEngine {
    pub fn new(difficulty: u8) -> Self {
        let mut engine = Self {
            difficulty: 2,
            enabled: true,
            disaster_chance: 0.05,
            check_interval: 100,
            spawn_counter: 0,
            active_disasters: Vec::new(),
        };
        engine.set_difficulty(difficulty);
        engine
    }

    /// 0 = none, 1 = easy, 2 = normal, 3 = hard. Out-of-range values clamp.
    pub fn set_difficulty(&mut self, level: u8) {
        self.difficulty = level.min(MAX_DIFFICULTY);
        let (enabled, chance, interval) = match self.difficulty {
            0 => (false, self.disaster_chance, self.check_interval),
            1 => (true, 0.02, 150),
            2 => (true, 0.05, 100),
            _ => (true, 0.10, 75),
        };
        self.enabled = enabled;
        self.disaster_chance = chance;
        self.check_interval = interval;
    }

    pub fn difficulty_name(&self) -> &'static str {
        DIFFICULTY_NAMES
            .get(self.difficulty as usize)
            .copied()
            .unwrap_or("Normal")
    }

    pub fn simulate(&mut self, grid: &mut WorldGrid, ctx: &mut TickContext) {
        if !self.enabled {
            return;
        }

        self.spawn_counter += 1;
        if self.spawn_counter >= self.check_interval {
            self.spawn_counter = 0;
            if ctx.rng.chance(self.disaster_chance) {
                let kind = DisasterKind::ALL[ctx.rng.pick(DisasterKind::ALL.len())];
                self.spawn(kind, grid, ctx);
            }
        }

        for i in (0..self.active_disasters.len()).rev() {
            let disaster = &mut self.active_disasters[i];
            disaster.update(grid, ctx);
            if disaster.is_expired() {
                disaster.cleanup(grid, ctx);
                let (x, y) = disaster.position();
                ctx.events.emit(CityEvent::DisasterEnded {
                    kind: disaster.kind(),
                    x,
                    y,
                });
                self.active_disasters.remove(i);
            }
        }
    }

    /// Start a disaster of `kind` somewhere sensible. Returns false when there
    /// is nothing for it to hit.
    pub fn spawn(&mut self, kind: DisasterKind, grid: &mut WorldGrid, ctx: &mut TickContext) -> bool {
        let disaster = match kind {
            DisasterKind::Fire => {
                let candidates: Vec<Coord> = grid
                    .buildings()
                    .filter(|b| !b.building_type.is_infrastructure())
                    .map(|b| b.position())
                    .collect();
                if candidates.is_empty() {
                    return false;
                }
                let at = candidates[ctx.rng.pick(candidates.len())];
                Disaster::Fire(Fire::new(at, grid))
            }
            DisasterKind::Flood => {
                if grid.size == 0 {
                    return false;
                }
                let x = ctx.rng.pick(grid.size);
                let y = ctx.rng.pick(grid.size);
                Disaster::Flood(Flood::new((x, y)))
            }
            DisasterKind::PowerOutage => {
                let Some(at) = grid
                    .buildings()
                    .find(|b| b.building_type == BuildingType::PowerPlant)
                    .map(|b| b.position())
                else {
                    return false;
                };
                Disaster::PowerOutage(PowerOutage::new(at))
            }
        };
        self.start(disaster, ctx);
        true
    }

    /// Register an already-built disaster.
    pub fn start(&mut self, disaster: Disaster, ctx: &mut TickContext) {
        let (x, y) = disaster.position();
        let kind = disaster.kind();
        info!("{kind} started at ({x}, {y})");
        ctx.events.emit(CityEvent::DisasterStarted { kind, x, y });
        self.active_disasters.push(disaster);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buildings::Building;
    use crate::config::SimConfig;
    use crate::sim_rng::SimRng;
    use crate::terrain_generation::flat_terrain;
    use crate::time_of_day::TimeManager;

    #[test]
    fn test_difficulty_table() {
        let mut engine = DisasterEngine::default();
        assert_eq!(engine.difficulty_name(), "Normal");
        assert_eq!((engine.disaster_chance, engine.check_interval), (0.05, 100));

        engine.set_difficulty(1);
        assert_eq!((engine.disaster_chance, engine.check_interval), (0.02, 150));
        engine.set_difficulty(9);
        assert_eq!(engine.difficulty, 3);
        assert_eq!(engine.difficulty_name(), "Hard");
        assert_eq!((engine.disaster_chance, engine.check_interval), (0.10, 75));

        engine.set_difficulty(0);
        assert!(!engine.enabled);
        assert_eq!(engine.difficulty_name(), "None");
    }

    #[test]
    fn test_damage_buckets() {
        assert_eq!(FIRE_DAMAGE.outcome(0.0), DamageOutcome::Destroyed);
        assert_eq!(FIRE_DAMAGE.outcome(0.2), DamageOutcome::Damaged(3));
        assert_eq!(FIRE_DAMAGE.outcome(0.5), DamageOutcome::Damaged(2));
        assert_eq!(FIRE_DAMAGE.outcome(0.7), DamageOutcome::Damaged(1));
        assert_eq!(FIRE_DAMAGE.outcome(0.9), DamageOutcome::Spared);
        assert_eq!(FLOOD_DAMAGE.outcome(0.1), DamageOutcome::Damaged(3));
        assert_eq!(FLOOD_DAMAGE.outcome(0.6), DamageOutcome::Spared);
    }

    #[test]
    fn test_disabled_engine_never_spawns() {
        let config = SimConfig::default();
        let time = TimeManager::new(&config.time);
        let mut rng = SimRng::from_seed_u64(1);
        let mut events: Vec<CityEvent> = Vec::new();
        let mut grid = WorldGrid::new(4, &flat_terrain(4));
        let mut engine = DisasterEngine::new(0);
        engine.disaster_chance = 1.0;
        for _ in 0..1000 {
            let mut ctx = TickContext {
                config: &config,
                time: &time,
                rng: &mut rng,
                events: &mut events,
            };
            engine.simulate(&mut grid, &mut ctx);
        }
        assert!(engine.active_disasters.is_empty());
        assert_eq!(engine.spawn_counter, 0);
    }

    #[test]
    fn test_engine_spawns_and_retires_disasters() {
        let config = SimConfig::default();
        let time = TimeManager::new(&config.time);
        let mut rng = SimRng::from_seed_u64(4);
        let mut events: Vec<CityEvent> = Vec::new();
        let mut grid = WorldGrid::new(8, &flat_terrain(8));
        grid.put_building((2, 2), Building::new(2, 2, BuildingType::PowerPlant));
        let mut engine = DisasterEngine::new(3);
        engine.disaster_chance = 1.0;

        for _ in 0..75 {
            let mut ctx = TickContext {
                config: &config,
                time: &time,
                rng: &mut rng,
                events: &mut events,
            };
            engine.simulate(&mut grid, &mut ctx);
        }
        assert_eq!(engine.active_disasters.len(), 1);

        for _ in 0..60 {
            let mut ctx = TickContext {
                config: &config,
                time: &time,
                rng: &mut rng,
                events: &mut events,
            };
            engine.simulate(&mut grid, &mut ctx);
        }
        let started = events
            .iter()
            .filter(|e| matches!(e, CityEvent::DisasterStarted { .. }))
            .count();
        let ended = events
            .iter()
            .filter(|e| matches!(e, CityEvent::DisasterEnded { .. }))
            .count();
        assert!(started >= 1);
        assert_eq!(started, ended + engine.active_disasters.len());
    }

    #[test]
    fn test_serialized_shape_is_tagged() {
        let mut engine = DisasterEngine::default();
        engine
            .active_disasters
            .push(Disaster::PowerOutage(PowerOutage::new((1, 2))));
        let json = serde_json::to_value(&engine).expect("serializes");
        assert_eq!(json["activeDisasters"][0]["type"], "power-outage");
        let back: DisasterEngine = serde_json::from_value(json).expect("deserializes");
        assert_eq!(back, engine);
    }
}
