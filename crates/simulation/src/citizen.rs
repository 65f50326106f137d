use serde::{Deserialize, Serialize};

use crate::buildings::BuildingType;
use crate::city::TickContext;
use crate::config::{CitizenConfig, SimConfig};
use crate::events::{CityEvent, EventSink};
use crate::grid::{Coord, Tile, WorldGrid};
use crate::profession::{self, Profession};
use crate::sim_rng::SimRng;

pub mod decision;
pub mod needs;
pub mod schedule;

use decision::Decision;
use needs::Needs;
use schedule::DailySchedule;

pub type CitizenId = u64;

const FIRST_NAMES: &[&str] = &[
    "Emma", "Olivia", "Ava", "Sophia", "Isabella", "Liam", "Noah", "William", "James", "Benjamin",
    "Elizabeth", "Margaret", "Alice", "Dorothy", "Eleanor", "John", "Robert", "William", "Charles",
    "Henry", "Alex", "Taylor", "Jordan", "Casey", "Robin",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Jones", "Brown", "Davis", "Miller", "Wilson", "Moore",
    "Taylor", "Anderson", "Thomas", "Jackson", "White", "Harris", "Clark", "Lewis", "Walker",
    "Hall", "Young", "Lee", "King", "Wright", "Adams", "Green",
];

/// Weekly job-change check: every 7th day at noon.
const JOB_CHECK_PERIOD_DAYS: u32 = 7;
const JOB_CHECK_HOUR: u32 = 12;

// ---------------------------------------------------------------------------
// Life stage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LifeStage {
    #[default]
    Idle,
    School,
    Unemployed,
    Employed,
    Retired,
}

impl LifeStage {
    pub fn from_age(age: u32, config: &SimConfig) -> Self {
        if age < config.citizen.min_working_age {
            LifeStage::School
        } else if age >= config.citizen.retirement_age {
            LifeStage::Retired
        } else {
            LifeStage::Unemployed
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LifeStage::Idle => "idle",
            LifeStage::School => "school",
            LifeStage::Unemployed => "unemployed",
            LifeStage::Employed => "employed",
            LifeStage::Retired => "retired",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn at((x, y): Coord) -> Self {
        Self {
            x: x as f32,
            y: y as f32,
        }
    }
}

// ---------------------------------------------------------------------------
// Citizen
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citizen {
    pub id: CitizenId,
    pub name: String,
    pub age: u32,
    pub state: LifeStage,
    pub residence: Coord,
    pub workplace: Option<Coord>,
    #[serde(default, with = "profession_key")]
    pub profession: Option<&'static Profession>,
    pub salary: f64,
    /// Personal savings. Salary comes in and rent and shopping go out once a month.
    pub money: f64,
    pub needs: Needs,
    pub schedule: DailySchedule,
    pub current_activity: Decision,
    pub position: Position,
    pub target_position: Position,
    /// Fraction of the current journey covered, `[0, 1]`.
    pub movement_progress: f32,
}

impl Citizen {
    pub fn new(id: CitizenId, residence: Coord, rng: &mut SimRng, config: &SimConfig) -> Self {
        let first = FIRST_NAMES[rng.pick(FIRST_NAMES.len())];
        let last = LAST_NAMES[rng.pick(LAST_NAMES.len())];
        let age = 1 + rng.pick(100) as u32;
        let needs = Needs::default();
        Self {
            id,
            name: format!("{first} {last}"),
            age,
            state: LifeStage::from_age(age, config),
            residence,
            workplace: None,
            profession: None,
            salary: 0.0,
            money: config.economy.starting_savings,
            needs,
            schedule: DailySchedule::generate(age, false, needs.health, &config.citizen),
            current_activity: Decision::Idle,
            position: Position::at(residence),
            target_position: Position::at(residence),
            movement_progress: 1.0,
        }
    }

    pub fn is_employed(&self) -> bool {
        self.workplace.is_some()
    }

    /// One tick: needs, decision, movement, weekly job check, then the
    /// life-stage state machine.
    pub fn simulate(&mut self, grid: &mut WorldGrid, ctx: &mut TickContext) {
        let penalty = if self.state == LifeStage::Unemployed {
            ctx.config.citizen.unemployment_penalty
        } else {
            0.0
        };
        self.needs.decay(ctx.config.citizen.need_decay, penalty);

        let scheduled = self.schedule.current_activity(ctx.time.fractional_hour());
        let previous = self.current_activity;
        self.current_activity = decision::decide(&self.needs, self.is_employed(), scheduled);
        if self.current_activity != previous {
            self.retarget();
        }
        self.step_movement(ctx.config.citizen.movement_speed);

        if ctx.time.is_periodic_moment(JOB_CHECK_PERIOD_DAYS, JOB_CHECK_HOUR)
            && decision::should_change_jobs(
                &self.needs,
                self.profession,
                self.is_employed(),
                ctx.rng,
            )
        {
            self.quit_job(grid, ctx.events);
        }

        match self.state {
            LifeStage::Idle | LifeStage::School | LifeStage::Retired => {}
            LifeStage::Unemployed => {
                if let Some(workplace) = self.find_job(grid, ctx.config) {
                    self.take_job(workplace, grid, ctx.config);
                    ctx.events.emit(CityEvent::CitizenHired {
                        citizen: self.id,
                        x: workplace.0,
                        y: workplace.1,
                        profession: self.profession.map(|p| p.name),
                        salary: self.salary,
                    });
                }
            }
            LifeStage::Employed => {
                if self.workplace.is_none() {
                    self.state = LifeStage::Unemployed;
                    self.regenerate_schedule(&ctx.config.citizen);
                }
            }
        }
    }

    fn regenerate_schedule(&mut self, config: &CitizenConfig) {
        self.schedule =
            DailySchedule::generate(self.age, self.is_employed(), self.needs.health, config);
    }

    /// Point the citizen at their workplace or home, depending on what they
    /// are doing now.
    fn retarget(&mut self) {
        let target = match (self.current_activity.heads_to_work(), self.workplace) {
            (true, Some(workplace)) => workplace,
            _ => self.residence,
        };
        self.target_position = Position::at(target);
        self.movement_progress = 0.0;
    }

    fn step_movement(&mut self, speed: f32) {
        if self.movement_progress < 1.0 {
            self.movement_progress = (self.movement_progress + speed).min(1.0);
            let factor = speed / (1.0 - self.movement_progress + speed);
            self.position.x += (self.target_position.x - self.position.x) * factor;
            self.position.y += (self.target_position.y - self.position.y) * factor;
        }
        if self.movement_progress >= 1.0 {
            self.position = self.target_position;
        }
    }

    /// Nearest workplace with an opening this citizen can fill.
    fn find_job(&self, grid: &WorldGrid, config: &SimConfig) -> Option<Coord> {
        let qualified = profession::qualified_for(self.needs.education, self.age);
        if qualified.is_empty() {
            return None;
        }
        grid.find_tile(
            self.residence,
            config.citizen.max_job_search_distance,
            |tile: &Tile| is_hiring(tile, &qualified, config),
        )
    }

    fn take_job(&mut self, workplace: Coord, grid: &mut WorldGrid, config: &SimConfig) {
        let Some(building) = grid.building_mut(workplace) else {
            return;
        };
        let qualified = profession::qualified_for(self.needs.education, self.age);
        self.profession = profession::best_for_workplace(&qualified, building.building_type);
        self.salary = self
            .profession
            .map_or(config.citizen.minimum_wage, |p| p.base_salary);
        if let Some(jobs) = building.jobs_mut() {
            jobs.hire(self.id);
        }
        self.workplace = Some(workplace);
        self.state = LifeStage::Employed;
        self.regenerate_schedule(&config.citizen);
    }

    /// Leave the current job voluntarily. The citizen goes straight back to
    /// job hunting.
    pub fn quit_job(&mut self, grid: &mut WorldGrid, events: &mut dyn EventSink) {
        let Some(workplace) = self.workplace else {
            return;
        };
        grid.remove_worker(workplace, self.id);
        self.clear_employment();
        self.state = LifeStage::Unemployed;
        events.emit(CityEvent::CitizenQuitJob { citizen: self.id });
    }

    /// Forget the workplace without touching its roster. Used when the
    /// workplace itself is going away.
    pub fn clear_employment(&mut self) {
        self.workplace = None;
        self.profession = None;
        self.salary = 0.0;
    }

    pub fn summary(&self) -> String {
        let job = match self.profession {
            Some(p) => format!("{} (${:.0}/mo)", p.name, self.salary),
            None if self.is_employed() => format!("laborer (${:.0}/mo)", self.salary),
            None => self.state.as_str().to_string(),
        };
        format!(
            "{}, {}: {}, {}, happiness {:.0}",
            self.name, self.age, job, self.current_activity, self.needs.happiness
        )
    }
}

/// Business zones with open jobs hire anyone qualified for something;
/// service buildings only hire their own professions.
fn is_hiring(tile: &Tile, qualified: &[&'static Profession], config: &SimConfig) -> bool {
    let Some(building) = tile.building.as_ref() else {
        return false;
    };
    if building.available_jobs(config) == 0 {
        return false;
    }
    let building_type = building.building_type;
    if building_type.is_business() {
        return true;
    }
    building_type.service().is_some()
        && config.citizen.services_hire
        && profession::best_for_workplace(qualified, building_type).is_some()
}

/// Saves professions by key and resolves them back against the static table.
mod profession_key {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::profession::{self, Profession};

    pub fn serialize<S: Serializer>(
        value: &Option<&'static Profession>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        value.map(|p| p.key).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<&'static Profession>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(key) => profession::by_name(&key)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("unknown profession `{key}`"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
