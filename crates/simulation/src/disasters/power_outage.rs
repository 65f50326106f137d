use serde::{Deserialize, Serialize};

use super::{DisasterKind, Incident};
use crate::city::TickContext;
use crate::events::CityEvent;
use crate::grid::{Coord, WorldGrid};

pub const OUTAGE_DURATION: u32 = 50;

/// Knocks a power plant offline for a while.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerOutage {
    pub x: usize,
    pub y: usize,
    pub duration: u32,
    #[serde(default)]
    pub cleaned_up: bool,
}

impl PowerOutage {
    pub fn new(at: Coord) -> Self {
        Self {
            x: at.0,
            y: at.1,
            duration: OUTAGE_DURATION,
            cleaned_up: false,
        }
    }
}

impl Incident for PowerOutage {
    fn kind(&self) -> DisasterKind {
        DisasterKind::PowerOutage
    }

    fn position(&self) -> Coord {
        (self.x, self.y)
    }

    fn update(&mut self, grid: &mut WorldGrid, _ctx: &mut TickContext) {
        self.duration = self.duration.saturating_sub(1);
        if let Some(plant) = grid.building_mut((self.x, self.y)) {
            if plant.power_plant().is_some() {
                plant.disabled = true;
            }
        }
    }

    fn is_expired(&self) -> bool {
        self.duration == 0
    }

    fn cleanup(&mut self, grid: &mut WorldGrid, ctx: &mut TickContext) {
        if self.cleaned_up {
            return;
        }
        self.cleaned_up = true;
        if let Some(plant) = grid.building_mut((self.x, self.y)) {
            if plant.power_plant().is_some() {
                plant.disabled = false;
                ctx.events.emit(CityEvent::PowerRestored {
                    x: self.x,
                    y: self.y,
                });
            }
        }
    }
}
