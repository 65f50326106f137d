use std::fmt;

use serde::{Deserialize, Serialize};

use super::needs::Needs;
use super::schedule::ActivityType;
use crate::config::CRITICAL_NEED_THRESHOLD;
use crate::profession::Profession;
use crate::sim_rng::SimRng;

/// What the citizen is actually doing this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    SleepAtHome,
    GoToWork,
    Work,
    GoHome,
    GoToLibrary,
    GoToPark,
    Socialize,
    GoShopping,
    EatAtHome,
    GoToHospital,
    StayHome,
    SeekHealthcare,
    SeekSafety,
    #[default]
    Idle,
}

impl Decision {
    /// Decisions that send the citizen to their workplace instead of home.
    pub fn heads_to_work(self) -> bool {
        matches!(self, Decision::Work | Decision::GoToWork)
    }

    pub fn label(self) -> &'static str {
        match self {
            Decision::SleepAtHome => "Sleep At Home",
            Decision::GoToWork => "Go To Work",
            Decision::Work => "Work",
            Decision::GoHome => "Go Home",
            Decision::GoToLibrary => "Go To Library",
            Decision::GoToPark => "Go To Park",
            Decision::Socialize => "Socialize",
            Decision::GoShopping => "Go Shopping",
            Decision::EatAtHome => "Eat At Home",
            Decision::GoToHospital => "Go To Hospital",
            Decision::StayHome => "Stay Home",
            Decision::SeekHealthcare => "Seek Healthcare",
            Decision::SeekSafety => "Seek Safety",
            Decision::Idle => "Idle",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Pick this tick's behaviour. Critical needs win over the schedule.
pub fn decide(needs: &Needs, has_workplace: bool, scheduled: ActivityType) -> Decision {
    if needs.health < CRITICAL_NEED_THRESHOLD {
        return Decision::SeekHealthcare;
    }
    if needs.safety < CRITICAL_NEED_THRESHOLD {
        return Decision::SeekSafety;
    }

    match scheduled {
        ActivityType::Sleeping => Decision::SleepAtHome,
        ActivityType::CommutingToWork if has_workplace => Decision::GoToWork,
        ActivityType::CommutingToWork => Decision::Idle,
        ActivityType::Working => Decision::Work,
        ActivityType::CommutingHome => Decision::GoHome,
        ActivityType::Leisure if needs.education < 50.0 => Decision::GoToLibrary,
        ActivityType::Leisure if needs.happiness < 50.0 => Decision::GoToPark,
        ActivityType::Leisure => Decision::Socialize,
        ActivityType::Shopping => Decision::GoShopping,
        ActivityType::Eating => Decision::EatAtHome,
        ActivityType::SeekingHealthcare => Decision::GoToHospital,
        ActivityType::AtHome => Decision::StayHome,
        ActivityType::Idle => Decision::Idle,
    }
}

/// Weekly roll to walk away from the current job.
///
/// Miserable workers quit 10% of the time; workers overqualified by more than
/// 20 education points look elsewhere 5% of the time.
pub fn should_change_jobs(
    needs: &Needs,
    profession: Option<&Profession>,
    has_workplace: bool,
    rng: &mut SimRng,
) -> bool {
    if !has_workplace {
        return false;
    }
    if needs.happiness < 30.0 {
        return rng.chance(0.1);
    }
    match profession {
        Some(p) if needs.education > p.education_required + 20.0 => rng.chance(0.05),
        _ => false,
    }
}
