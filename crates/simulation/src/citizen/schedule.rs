use serde::{Deserialize, Serialize};

use crate::config::CitizenConfig;

/// What a schedule slot asks the citizen to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Sleeping,
    CommutingToWork,
    Working,
    CommutingHome,
    Leisure,
    Shopping,
    Eating,
    SeekingHealthcare,
    AtHome,
    Idle,
}

/// One time-boxed slot. Hours are fractional (8.5 is half past eight).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub activity: ActivityType,
    pub start_hour: f32,
    pub duration: f32,
}

impl Activity {
    pub const fn new(activity: ActivityType, start_hour: f32, duration: f32) -> Self {
        Self {
            activity,
            start_hour,
            duration,
        }
    }

    pub fn end_hour(&self) -> f32 {
        (self.start_hour + self.duration) % 24.0
    }

    /// Half-open `[start, end)`, wrapping past midnight when needed.
    pub fn is_active_at(&self, hour: f32) -> bool {
        if self.start_hour + self.duration <= 24.0 {
            hour >= self.start_hour && hour < self.end_hour()
        } else {
            hour >= self.start_hour || hour < self.end_hour()
        }
    }
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

use ActivityType::*;

const CHILD: &[Activity] = &[
    Activity::new(Sleeping, 22.0, 10.0),
    Activity::new(AtHome, 8.0, 1.0),
    Activity::new(CommutingToWork, 9.0, 0.5),
    Activity::new(Working, 9.5, 6.0),
    Activity::new(CommutingHome, 15.5, 0.5),
    Activity::new(Leisure, 16.0, 3.0),
    Activity::new(Eating, 19.0, 1.0),
    Activity::new(AtHome, 20.0, 2.0),
];

const RETIRED: &[Activity] = &[
    Activity::new(Sleeping, 22.0, 8.0),
    Activity::new(AtHome, 6.0, 2.0),
    Activity::new(Leisure, 8.0, 3.0),
    Activity::new(Shopping, 11.0, 1.0),
    Activity::new(Eating, 12.0, 1.0),
    Activity::new(Leisure, 13.0, 4.0),
    Activity::new(Eating, 17.0, 1.0),
    Activity::new(AtHome, 18.0, 4.0),
];

const WORKING_ADULT: &[Activity] = &[
    Activity::new(Sleeping, 23.0, 7.0),
    Activity::new(AtHome, 6.0, 2.0),
    Activity::new(CommutingToWork, 8.0, 0.5),
    Activity::new(Working, 8.5, 8.0),
    Activity::new(CommutingHome, 16.5, 0.5),
    Activity::new(Shopping, 17.0, 1.0),
    Activity::new(Eating, 18.0, 1.0),
    Activity::new(Leisure, 19.0, 3.0),
    Activity::new(AtHome, 22.0, 1.0),
];

const UNEMPLOYED_ADULT: &[Activity] = &[
    Activity::new(Sleeping, 23.0, 8.0),
    Activity::new(AtHome, 7.0, 2.0),
    Activity::new(Leisure, 9.0, 3.0),
    Activity::new(Eating, 12.0, 1.0),
    Activity::new(Leisure, 13.0, 4.0),
    Activity::new(Eating, 17.0, 1.0),
    Activity::new(AtHome, 18.0, 5.0),
];

const HEALTHCARE_VISIT: Activity = Activity::new(SeekingHealthcare, 14.0, 2.0);
const POOR_HEALTH: f32 = 30.0;

/// A citizen's day plan. Regenerated whenever employment changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DailySchedule {
    pub activities: Vec<Activity>,
}

impl DailySchedule {
    /// Template chosen by the same age bands as `LifeStage::from_age`. Poor
    /// health puts a clinic visit ahead of the template so it takes precedence.
    pub fn generate(age: u32, has_job: bool, health: f32, config: &CitizenConfig) -> Self {
        let template = if age < config.min_working_age {
            CHILD
        } else if age >= config.retirement_age {
            RETIRED
        } else if has_job {
            WORKING_ADULT
        } else {
            UNEMPLOYED_ADULT
        };
        let mut activities = Vec::with_capacity(template.len() + 1);
        if health < POOR_HEALTH {
            activities.push(HEALTHCARE_VISIT);
        }
        activities.extend_from_slice(template);
        Self { activities }
    }

    /// First slot active at `hour`, or `Idle` when the day has a gap.
    pub fn current_activity(&self, hour: f32) -> ActivityType {
        self.activities
            .iter()
            .find(|a| a.is_active_at(hour))
            .map(|a| a.activity)
            .unwrap_or(Idle)
    }
}
