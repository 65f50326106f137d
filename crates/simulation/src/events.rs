use std::fmt;

use bevy::prelude::*;

use crate::buildings::BuildingType;
use crate::citizen::CitizenId;
use crate::disasters::DisasterKind;
use crate::economy::MonthlyReport;

// =============================================================================
// Event Types
// =============================================================================

/// Structured record of something that happened inside the simulation.
///
/// The core never talks to a UI; it hands these to an [`EventSink`] and the
/// presentation layer decides what to show.
#[derive(Event, Debug, Clone, PartialEq)]
pub enum CityEvent {
    BuildingPlaced {
        x: usize,
        y: usize,
        building_type: BuildingType,
        cost: f64,
    },
    BuildingDemolished {
        x: usize,
        y: usize,
        building_type: BuildingType,
    },
    InsufficientFunds {
        x: usize,
        y: usize,
        building_type: BuildingType,
        cost: f64,
        funds: f64,
    },
    ResidentMovedIn {
        citizen: CitizenId,
        x: usize,
        y: usize,
    },
    ResidentsEvicted {
        x: usize,
        y: usize,
        count: usize,
    },
    WorkersLaidOff {
        x: usize,
        y: usize,
        count: usize,
    },
    CitizenHired {
        citizen: CitizenId,
        x: usize,
        y: usize,
        profession: Option<&'static str>,
        salary: f64,
    },
    CitizenQuitJob {
        citizen: CitizenId,
    },
    ZoneDeveloped {
        x: usize,
        y: usize,
    },
    ZoneLeveledUp {
        x: usize,
        y: usize,
        level: u32,
    },
    ZoneAbandoned {
        x: usize,
        y: usize,
    },
    ZoneRedeveloped {
        x: usize,
        y: usize,
    },
    DisasterStarted {
        kind: DisasterKind,
        x: usize,
        y: usize,
    },
    FireSpread {
        from: (usize, usize),
        to: (usize, usize),
    },
    DisasterEnded {
        kind: DisasterKind,
        x: usize,
        y: usize,
    },
    BuildingDestroyed {
        x: usize,
        y: usize,
        building_type: BuildingType,
    },
    BuildingDamaged {
        x: usize,
        y: usize,
        damage: u8,
    },
    BuildingRepaired {
        x: usize,
        y: usize,
        damage: u8,
    },
    PowerRestored {
        x: usize,
        y: usize,
    },
    BudgetClosed(MonthlyReport),
    Bankrupt {
        funds: f64,
    },
}

impl fmt::Display for CityEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CityEvent::BuildingPlaced {
                x,
                y,
                building_type,
                cost,
            } => write!(f, "Built {building_type} at ({x}, {y}) for ${cost:.0}"),
            CityEvent::BuildingDemolished { x, y, building_type } => {
                write!(f, "Demolished {building_type} at ({x}, {y})")
            }
            CityEvent::InsufficientFunds {
                building_type,
                cost,
                funds,
                ..
            } => write!(
                f,
                "Cannot afford {building_type}: costs ${cost:.0}, treasury has ${funds:.0}"
            ),
            CityEvent::ResidentMovedIn { citizen, x, y } => {
                write!(f, "Citizen #{citizen} moved in at ({x}, {y})")
            }
            CityEvent::ResidentsEvicted { x, y, count } => {
                write!(f, "{count} residents evicted from ({x}, {y})")
            }
            CityEvent::WorkersLaidOff { x, y, count } => {
                write!(f, "{count} workers laid off at ({x}, {y})")
            }
            CityEvent::CitizenHired {
                citizen,
                x,
                y,
                profession,
                salary,
            } => write!(
                f,
                "Citizen #{citizen} hired at ({x}, {y}) as {} earning ${salary:.0}",
                profession.unwrap_or("laborer")
            ),
            CityEvent::CitizenQuitJob { citizen } => write!(f, "Citizen #{citizen} quit their job"),
            CityEvent::ZoneDeveloped { x, y } => write!(f, "Zone at ({x}, {y}) finished construction"),
            CityEvent::ZoneLeveledUp { x, y, level } => {
                write!(f, "Zone at ({x}, {y}) grew to level {level}")
            }
            CityEvent::ZoneAbandoned { x, y } => write!(f, "Zone at ({x}, {y}) was abandoned"),
            CityEvent::ZoneRedeveloped { x, y } => write!(f, "Zone at ({x}, {y}) is redeveloping"),
            CityEvent::DisasterStarted { kind, x, y } => write!(f, "{kind} at ({x}, {y})"),
            CityEvent::FireSpread { from, to } => write!(
                f,
                "Fire spread from ({}, {}) to ({}, {})",
                from.0, from.1, to.0, to.1
            ),
            CityEvent::DisasterEnded { kind, x, y } => write!(f, "{kind} at ({x}, {y}) is over"),
            CityEvent::BuildingDestroyed { x, y, building_type } => {
                write!(f, "{building_type} at ({x}, {y}) was destroyed")
            }
            CityEvent::BuildingDamaged { x, y, damage } => {
                write!(f, "Building at ({x}, {y}) damaged (level {damage})")
            }
            CityEvent::BuildingRepaired { x, y, damage } => {
                write!(f, "Building at ({x}, {y}) repaired (level {damage})")
            }
            CityEvent::PowerRestored { x, y } => write!(f, "Power restored at ({x}, {y})"),
            CityEvent::BudgetClosed(report) => write!(
                f,
                "Month closed: income ${:.0}, expenses ${:.0}",
                report.income(),
                report.expenses()
            ),
            CityEvent::Bankrupt { funds } => write!(f, "The city is bankrupt (${funds:.0})"),
        }
    }
}

// =============================================================================
// Event Sink
// =============================================================================

/// Anything the simulation can report events into.
pub trait EventSink {
    fn emit(&mut self, event: CityEvent);
}

impl EventSink for Vec<CityEvent> {
    fn emit(&mut self, event: CityEvent) {
        self.push(event);
    }
}

impl EventSink for EventWriter<'_, CityEvent> {
    fn emit(&mut self, event: CityEvent) {
        self.send(event);
    }
}

impl EventSink for EventJournal {
    fn emit(&mut self, event: CityEvent) {
        self.push(event);
    }
}

// =============================================================================
// Event Journal Resource
// =============================================================================

/// Bounded history of recent events, oldest first.
#[derive(Resource)]
pub struct EventJournal {
    pub events: Vec<CityEvent>,
    pub max_events: usize,
}

impl Default for EventJournal {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            max_events: 200,
        }
    }
}

impl EventJournal {
    /// Push a new event into the journal, trimming old events if over capacity.
    pub fn push(&mut self, event: CityEvent) {
        self.events.push(event);
        if self.events.len() > self.max_events {
            let excess = self.events.len() - self.max_events;
            self.events.drain(0..excess);
        }
    }

    pub fn latest(&self) -> Option<&CityEvent> {
        self.events.last()
    }
}

/// Copies this frame's `CityEvent`s into the journal.
pub fn record_city_events(mut reader: EventReader<CityEvent>, mut journal: ResMut<EventJournal>) {
    for event in reader.read() {
        journal.push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_journal_trims_oldest() {
        let mut journal = EventJournal {
            events: Vec::new(),
            max_events: 3,
        };
        for citizen in 0..5 {
            journal.emit(CityEvent::CitizenQuitJob { citizen });
        }
        assert_eq!(journal.events.len(), 3);
        assert_eq!(journal.events[0], CityEvent::CitizenQuitJob { citizen: 2 });
        assert_eq!(journal.latest(), Some(&CityEvent::CitizenQuitJob { citizen: 4 }));
    }

    #[test]
    fn test_display_mentions_coordinates() {
        let event = CityEvent::BuildingPlaced {
            x: 3,
            y: 4,
            building_type: BuildingType::Road,
            cost: 100.0,
        };
        assert_eq!(event.to_string(), "Built road at (3, 4) for $100");
    }
}
