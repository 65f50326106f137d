use crate::city::TickContext;
use crate::citizen::{Citizen, CitizenId};
use crate::events::CityEvent;
use crate::grid::{Coord, WorldGrid};

/// Citizens living in a residential zone. The zone owns them outright.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Residents {
    pub citizens: Vec<Citizen>,
}

impl Residents {
    /// Capacity at `level`: `base ^ level`.
    pub fn maximum(base: u32, level: u32) -> u32 {
        base.saturating_pow(level)
    }

    pub fn count(&self) -> usize {
        self.citizens.len()
    }

    pub fn ids(&self) -> impl Iterator<Item = CitizenId> + '_ {
        self.citizens.iter().map(|c| c.id)
    }

    pub fn get(&self, id: CitizenId) -> Option<&Citizen> {
        self.citizens.iter().find(|c| c.id == id)
    }

    pub fn get_mut(&mut self, id: CitizenId) -> Option<&mut Citizen> {
        self.citizens.iter_mut().find(|c| c.id == id)
    }

    /// Roll for one newcomer if there is room.
    pub fn try_move_in(
        &mut self,
        home: Coord,
        maximum: u32,
        grid: &mut WorldGrid,
        ctx: &mut TickContext,
    ) -> Option<CitizenId> {
        if self.citizens.len() >= maximum as usize
            || !ctx.rng.chance(ctx.config.residents.resident_move_in_chance)
        {
            return None;
        }
        let id = grid.allocate_citizen_id();
        let citizen = Citizen::new(id, home, ctx.rng, ctx.config);
        grid.citizen_homes.insert(id, home);
        self.citizens.push(citizen);
        ctx.events.emit(CityEvent::ResidentMovedIn {
            citizen: id,
            x: home.0,
            y: home.1,
        });
        Some(id)
    }

    /// Run every resident in move-in order.
    pub fn simulate_all(&mut self, grid: &mut WorldGrid, ctx: &mut TickContext) {
        for citizen in &mut self.citizens {
            citizen.simulate(grid, ctx);
        }
    }

    /// Remove everyone, detaching them from their workplaces first.
    pub fn evict_all(&mut self, grid: &mut WorldGrid) -> usize {
        let count = self.citizens.len();
        for citizen in self.citizens.drain(..) {
            if let Some(workplace) = citizen.workplace {
                grid.remove_worker(workplace, citizen.id);
            }
            grid.citizen_homes.remove(&citizen.id);
        }
        count
    }
}
