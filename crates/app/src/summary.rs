//! End-of-run city report.

use std::collections::BTreeMap;
use std::fmt;

use simulation::buildings::BuildingType;
use simulation::citizen::LifeStage;
use simulation::city::City;

#[derive(Debug, Clone, PartialEq)]
pub struct CitySummary {
    pub name: String,
    pub clock: String,
    pub total_ticks: u64,
    pub population: usize,
    pub employed: usize,
    pub funds: f64,
    pub bankrupt: bool,
    pub buildings: BTreeMap<BuildingType, usize>,
    pub active_disasters: usize,
}

impl CitySummary {
    pub fn of(city: &City) -> Self {
        let mut buildings = BTreeMap::new();
        for building in city.grid.buildings() {
            *buildings.entry(building.building_type).or_insert(0) += 1;
        }
        let employed = city
            .grid
            .citizens()
            .filter(|c| c.state == LifeStage::Employed)
            .count();

        Self {
            name: city.name.clone(),
            clock: format!("day {} {}", city.time.current_day, city.time.time_string()),
            total_ticks: city.time.total_ticks,
            population: city.population(),
            employed,
            funds: city.economy.funds,
            bankrupt: city.economy.is_bankrupt,
            buildings,
            active_disasters: city.disasters.active_disasters.len(),
        }
    }
}

impl fmt::Display for CitySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} after {} ticks ({}): population {}, employed {}, funds ${:.0}",
            self.name, self.total_ticks, self.clock, self.population, self.employed, self.funds
        )?;
        if self.bankrupt {
            write!(f, " (bankrupt)")?;
        }
        if self.active_disasters > 0 {
            write!(f, ", {} active disaster(s)", self.active_disasters)?;
        }
        for (building_type, count) in &self.buildings {
            write!(f, "\n  {building_type}: {count}")?;
        }
        Ok(())
    }
}
