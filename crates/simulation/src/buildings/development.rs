//! Zone growth state machine.
//!
//! `UnderConstruction -> Developing -> Developed -> Abandoned -> Developing`.
//! Only `Developed` zones take residents or workers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{DevelopmentConfig, RedevelopPolicy};
use crate::sim_rng::SimRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DevelopmentState {
    #[default]
    UnderConstruction,
    Developing,
    Developed,
    Abandoned,
}

impl fmt::Display for DevelopmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DevelopmentState::UnderConstruction => "under construction",
            DevelopmentState::Developing => "developing",
            DevelopmentState::Developed => "developed",
            DevelopmentState::Abandoned => "abandoned",
        })
    }
}

/// Transition reported by [`Development::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DevelopmentEvent {
    Developed,
    LeveledUp(u32),
    Abandoned,
    Redeveloped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Development {
    pub state: DevelopmentState,
    pub level: u32,
    pub construction_counter: u32,
    /// Consecutive ticks the abandonment criteria have failed.
    pub abandonment_counter: u32,
    /// Consecutive developed ticks with nobody living or working here.
    #[serde(default)]
    pub vacancy_counter: u32,
}

impl Default for Development {
    fn default() -> Self {
        Self {
            state: DevelopmentState::UnderConstruction,
            level: 1,
            construction_counter: 0,
            abandonment_counter: 0,
            vacancy_counter: 0,
        }
    }
}

impl Development {
    pub fn accepts_occupants(&self) -> bool {
        self.state == DevelopmentState::Developed
    }

    /// Track how long a developed zone has stood empty.
    pub fn record_occupancy(&mut self, occupied: bool) {
        if self.state == DevelopmentState::Developed && !occupied {
            self.vacancy_counter += 1;
        } else {
            self.vacancy_counter = 0;
        }
    }

    /// Advance one tick. `criteria_met` is false while the zone lacks road
    /// access, has stood empty too long, or (optionally) is under-powered.
    pub fn step(
        &mut self,
        criteria_met: bool,
        config: &DevelopmentConfig,
        rng: &mut SimRng,
    ) -> Option<DevelopmentEvent> {
        match self.state {
            DevelopmentState::UnderConstruction => {
                self.construction_counter += 1;
                if self.construction_counter >= config.construction_time {
                    self.construction_counter = 0;
                    self.state = DevelopmentState::Developing;
                }
                None
            }
            DevelopmentState::Developing | DevelopmentState::Developed => {
                if criteria_met {
                    self.abandonment_counter = 0;
                } else {
                    self.abandonment_counter += 1;
                    if self.abandonment_counter >= config.abandon_threshold
                        && rng.chance(config.abandon_chance)
                    {
                        self.state = DevelopmentState::Abandoned;
                        self.abandonment_counter = 0;
                        self.vacancy_counter = 0;
                        return Some(DevelopmentEvent::Abandoned);
                    }
                    return None;
                }

                if self.state == DevelopmentState::Developing {
                    self.state = DevelopmentState::Developed;
                    return Some(DevelopmentEvent::Developed);
                }
                if self.level < config.max_level && rng.chance(config.level_up_chance) {
                    self.level += 1;
                    return Some(DevelopmentEvent::LeveledUp(self.level));
                }
                None
            }
            DevelopmentState::Abandoned => {
                if criteria_met && rng.chance(config.redevelop_chance) {
                    self.redevelop(config.redevelop_policy);
                    return Some(DevelopmentEvent::Redeveloped);
                }
                None
            }
        }
    }

    fn redevelop(&mut self, policy: RedevelopPolicy) {
        self.state = DevelopmentState::Developing;
        self.abandonment_counter = 0;
        self.vacancy_counter = 0;
        self.construction_counter = 0;
        if policy == RedevelopPolicy::ResetLevel {
            self.level = 1;
        }
    }
}
