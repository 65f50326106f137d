use serde::{Deserialize, Serialize};

use super::{roll_damage, DisasterKind, Incident, FLOOD_DAMAGE};
use crate::citizen::needs::Need;
use crate::city::TickContext;
use crate::grid::{Coord, WorldGrid};

pub const FLOOD_RADIUS: usize = 5;
pub const FLOOD_DURATION: u32 = 20;
const HEALTH_DAMAGE: f32 = 2.0;
const SAFETY_DAMAGE: f32 = 3.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flood {
    pub x: usize,
    pub y: usize,
    pub radius: usize,
    pub duration: u32,
    #[serde(default)]
    pub cleaned_up: bool,
}

impl Flood {
    pub fn new(at: Coord) -> Self {
        Self {
            x: at.0,
            y: at.1,
            radius: FLOOD_RADIUS,
            duration: FLOOD_DURATION,
            cleaned_up: false,
        }
    }

    fn area(&self, grid: &WorldGrid) -> Vec<Coord> {
        grid.disc((self.x, self.y), self.radius).collect()
    }
}

impl Incident for Flood {
    fn kind(&self) -> DisasterKind {
        DisasterKind::Flood
    }

    fn position(&self) -> Coord {
        (self.x, self.y)
    }

    fn update(&mut self, grid: &mut WorldGrid, _ctx: &mut TickContext) {
        self.duration = self.duration.saturating_sub(1);
        for at in self.area(grid) {
            if let Some(residents) = grid.building_mut(at).and_then(|b| b.residents_mut()) {
                for citizen in &mut residents.citizens {
                    citizen.needs.harm(Need::Health, HEALTH_DAMAGE);
                    citizen.needs.harm(Need::Safety, SAFETY_DAMAGE);
                }
            }
        }
    }

    fn is_expired(&self) -> bool {
        self.duration == 0
    }

    /// Every building under water rolls for damage on its own.
    fn cleanup(&mut self, grid: &mut WorldGrid, ctx: &mut TickContext) {
        if self.cleaned_up {
            return;
        }
        self.cleaned_up = true;
        for at in self.area(grid) {
            roll_damage(grid, at, FLOOD_DAMAGE, ctx);
        }
    }
}
