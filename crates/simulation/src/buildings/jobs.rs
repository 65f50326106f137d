use crate::citizen::CitizenId;
use crate::grid::WorldGrid;

/// Workers employed at a zone or service building.
///
/// Holds ids only. The citizens themselves live in their residences and are
/// resolved through [`WorldGrid::citizen_mut`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Jobs {
    pub workers: Vec<CitizenId>,
}

impl Jobs {
    /// Capacity at `level`: `base ^ level`.
    pub fn maximum(base: u32, level: u32) -> u32 {
        base.saturating_pow(level)
    }

    pub fn count(&self) -> usize {
        self.workers.len()
    }

    pub fn contains(&self, id: CitizenId) -> bool {
        self.workers.contains(&id)
    }

    pub fn hire(&mut self, id: CitizenId) {
        if !self.contains(id) {
            self.workers.push(id);
        }
    }

    pub fn remove(&mut self, id: CitizenId) -> bool {
        let before = self.workers.len();
        self.workers.retain(|w| *w != id);
        self.workers.len() != before
    }

    /// Drop every worker and clear their employment. Returns how many left.
    pub fn lay_off_all(&mut self, grid: &mut WorldGrid) -> usize {
        let count = self.workers.len();
        for id in self.workers.drain(..) {
            if let Some(citizen) = grid.citizen_mut(id) {
                citizen.clear_employment();
            }
        }
        count
    }
}
