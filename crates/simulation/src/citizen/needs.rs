use serde::{Deserialize, Serialize};

use crate::config::CRITICAL_NEED_THRESHOLD;

/// Weight of the fixed environment term in the happiness blend.
const ENVIRONMENT_BASELINE: f32 = 50.0;
/// Morale drifts back toward zero by this much every tick.
const MORALE_RECOVERY: f32 = 0.05;
const MORALE_LIMIT: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Need {
    Health,
    Safety,
    Education,
}

/// Traffic-light band for a need value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeedBand {
    Green,
    Yellow,
    Red,
}

impl NeedBand {
    pub fn of(value: f32) -> Self {
        if value >= 67.0 {
            NeedBand::Green
        } else if value >= 34.0 {
            NeedBand::Yellow
        } else {
            NeedBand::Red
        }
    }
}

/// How far each need is from full.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeedDeficit {
    pub health: f32,
    pub safety: f32,
    pub education: f32,
}

/// A citizen's needs, each in `[0, 100]`.
///
/// Happiness is derived: it is recomputed from the other three after every
/// change, so it never needs to be decayed on its own. `morale` carries
/// short-lived effects (missed rent, a shopping trip) that would otherwise be
/// wiped by that recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Needs {
    pub health: f32,
    pub safety: f32,
    pub education: f32,
    pub happiness: f32,
    #[serde(default)]
    pub morale: f32,
}

impl Default for Needs {
    fn default() -> Self {
        Self {
            health: 100.0,
            safety: 100.0,
            education: 50.0,
            happiness: 75.0,
            morale: 0.0,
        }
    }
}

impl Needs {
    /// Passive per-tick loss of health and safety.
    pub fn decay(&mut self, amount: f32, unemployment_penalty: f32) {
        self.health = (self.health - amount).max(0.0);
        self.safety = (self.safety - amount).max(0.0);
        if self.morale > 0.0 {
            self.morale = (self.morale - MORALE_RECOVERY).max(0.0);
        } else if self.morale < 0.0 {
            self.morale = (self.morale + MORALE_RECOVERY).min(0.0);
        }
        self.recalculate_happiness(unemployment_penalty);
    }

    /// Weighted blend of safety, health, education and a neutral environment
    /// term, minus `unemployment_penalty` (zero for anyone not job hunting).
    pub fn recalculate_happiness(&mut self, unemployment_penalty: f32) -> f32 {
        let base = self.safety * 0.4
            + self.health * 0.3
            + self.education * 0.2
            + ENVIRONMENT_BASELINE * 0.1;
        self.happiness = (base - unemployment_penalty + self.morale).clamp(0.0, 100.0);
        self.happiness
    }

    pub fn get(&self, need: Need) -> f32 {
        match need {
            Need::Health => self.health,
            Need::Safety => self.safety,
            Need::Education => self.education,
        }
    }

    /// Raise one need, capped at 100.
    pub fn improve(&mut self, need: Need, amount: f32) {
        let slot = match need {
            Need::Health => &mut self.health,
            Need::Safety => &mut self.safety,
            Need::Education => &mut self.education,
        };
        *slot = (*slot + amount).clamp(0.0, 100.0);
    }

    /// Lower one need, floored at 0.
    pub fn harm(&mut self, need: Need, amount: f32) {
        self.improve(need, -amount);
    }

    /// Add a temporary happiness modifier.
    pub fn adjust_morale(&mut self, amount: f32) {
        self.morale = (self.morale + amount).clamp(-MORALE_LIMIT, MORALE_LIMIT);
    }

    pub fn deficit(&self) -> NeedDeficit {
        NeedDeficit {
            health: 100.0 - self.health,
            safety: 100.0 - self.safety,
            education: 100.0 - self.education,
        }
    }

    /// Lowest of health, safety and education. Ties go to the earlier one.
    pub fn most_urgent(&self) -> Need {
        [Need::Health, Need::Safety, Need::Education]
            .into_iter()
            .fold(Need::Health, |lowest, need| {
                if self.get(need) < self.get(lowest) {
                    need
                } else {
                    lowest
                }
            })
    }

    pub fn has_critical_need(&self) -> bool {
        self.health < CRITICAL_NEED_THRESHOLD || self.safety < CRITICAL_NEED_THRESHOLD
    }

    pub fn happiness_band(&self) -> NeedBand {
        NeedBand::of(self.happiness)
    }
}
