use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::buildings::BuildingType;
use crate::citizen::CitizenId;
use crate::city::TickContext;
use crate::config::{EconomyConfig, SimConfig};
use crate::events::CityEvent;
use crate::grid::{Coord, WorldGrid};

/// Breakdown of one monthly close.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReport {
    pub taxes: f64,
    pub maintenance: f64,
    /// Paid by employers straight to their workers.
    pub salaries_paid: f64,
    /// Paid by residents to their landlords.
    pub rent_collected: f64,
    pub rent_defaults: u32,
    pub consumer_spending: f64,
}

impl MonthlyReport {
    /// City income. Only taxes reach the treasury.
    pub fn income(&self) -> f64 {
        self.taxes
    }

    pub fn expenses(&self) -> f64 {
        self.maintenance
    }
}

/// City treasury and the monthly budget cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Economy {
    pub funds: f64,
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    pub step_counter: u32,
    /// Set the first time funds go negative and never cleared.
    pub is_bankrupt: bool,
    #[serde(default)]
    pub last_report: MonthlyReport,
}

impl Default for Economy {
    fn default() -> Self {
        Self::new(&EconomyConfig::default())
    }
}

impl Economy {
    pub fn new(config: &EconomyConfig) -> Self {
        Self {
            funds: config.starting_funds,
            monthly_income: 0.0,
            monthly_expenses: 0.0,
            step_counter: 0,
            is_bankrupt: false,
            last_report: MonthlyReport::default(),
        }
    }

    pub fn building_cost(config: &SimConfig, building_type: BuildingType) -> f64 {
        config.economy.building_costs.get(building_type)
    }

    pub fn can_afford(&self, config: &SimConfig, building_type: BuildingType) -> bool {
        self.funds >= Self::building_cost(config, building_type)
    }

    /// Deduct `cost` if the treasury covers it.
    pub fn try_spend(&mut self, cost: f64) -> bool {
        if self.funds >= cost {
            self.funds -= cost;
            true
        } else {
            false
        }
    }

    pub fn net_revenue(&self) -> f64 {
        self.monthly_income - self.monthly_expenses
    }

    /// Per-tick hook: close the month when the counter rolls over, then check
    /// for bankruptcy.
    pub fn simulate(&mut self, grid: &mut WorldGrid, ctx: &mut TickContext) {
        self.step_counter += 1;
        if self.step_counter >= ctx.config.economy.steps_per_month {
            self.step_counter = 0;
            let report = close_month(grid, ctx);
            self.monthly_income = report.income();
            self.monthly_expenses = report.expenses();
            self.funds += self.net_revenue();
            debug!(
                "Month closed: income {:.0}, expenses {:.0}, funds {:.0}",
                self.monthly_income, self.monthly_expenses, self.funds
            );
            ctx.events.emit(CityEvent::BudgetClosed(report.clone()));
            self.last_report = report;
        }

        if self.funds < 0.0 && !self.is_bankrupt {
            self.is_bankrupt = true;
            warn!("City is bankrupt! Funds: {:.0}", self.funds);
            ctx.events.emit(CityEvent::Bankrupt { funds: self.funds });
        }
    }
}

/// Run the private money flows of the month, then total up taxes and upkeep.
fn close_month(grid: &mut WorldGrid, ctx: &mut TickContext) -> MonthlyReport {
    let config = &ctx.config.economy;
    let mut report = MonthlyReport::default();

    grid.for_each_citizen_mut(|citizen| {
        if citizen.is_employed() {
            citizen.money += citizen.salary;
            report.salaries_paid += citizen.salary;
        }
        if citizen.money >= config.rent {
            citizen.money -= config.rent;
            report.rent_collected += config.rent;
        } else {
            citizen.needs.adjust_morale(-config.rent_default_penalty);
            report.rent_defaults += 1;
        }
    });

    report.consumer_spending = go_shopping(grid, config);

    for building in grid.buildings() {
        let rate = match building.building_type {
            BuildingType::Residential => config.tax_rates.residential,
            BuildingType::Commercial => config.tax_rates.commercial,
            BuildingType::Industrial => config.tax_rates.industrial,
            _ => 0.0,
        };
        let taxed = match building.building_type {
            BuildingType::Residential => building.resident_count(),
            _ => building.worker_count(),
        };
        report.taxes += taxed as f64 * rate;
        report.maintenance += config.maintenance_costs.get(building.building_type);
    }
    report
}

/// Every citizen spends a slice of their savings at the nearest open shop.
fn go_shopping(grid: &mut WorldGrid, config: &EconomyConfig) -> f64 {
    let shoppers: Vec<(CitizenId, Coord)> =
        grid.citizens().map(|c| (c.id, c.residence)).collect();
    let mut total = 0.0;
    for (id, home) in shoppers {
        let shop = grid.find_tile(home, config.shopping_radius, |tile| {
            tile.building.as_ref().is_some_and(|b| {
                b.building_type == BuildingType::Commercial
                    && b.development().is_some_and(|d| d.accepts_occupants())
            })
        });
        let Some(shop) = shop else {
            continue;
        };
        let Some(citizen) = grid.citizen_mut(id) else {
            continue;
        };
        let spend = (citizen.money * config.spend_fraction).min(config.max_monthly_spend);
        if spend <= 0.0 {
            continue;
        }
        citizen.money -= spend;
        citizen
            .needs
            .adjust_morale(config.shopping_happiness_bonus);
        if let Some(zone) = grid.building_mut(shop).and_then(|b| b.zone_mut()) {
            zone.revenue += spend;
        }
        total += spend;
    }
    total
}
