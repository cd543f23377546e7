use std::collections::VecDeque;

use avn_protocol::types::AircraftClass;

use super::config::WaitEstimates;
use super::flight::FlightHandle;

/// Three-level priority queue for flights waiting on a runway.
///
/// Level 0 holds emergencies, level 1 cargo, level 2 commercial. Dispatch
/// always drains the lowest non-empty level first, and within a level the
/// order is strict FIFO. A flight that could not get its runway goes back
/// to the tail of its level, never the head.
#[derive(Default)]
pub struct PriorityQueues {
    levels: [VecDeque<FlightHandle>; 3],
}

impl PriorityQueues {
    pub fn new() -> Self {
        Self::default()
    }

    fn level_for(class: AircraftClass) -> usize {
        match class {
            AircraftClass::Emergency => 0,
            AircraftClass::Cargo => 1,
            AircraftClass::Commercial => 2,
        }
    }

    pub fn push(&mut self, class: AircraftClass, flight: FlightHandle) {
        self.levels[Self::level_for(class)].push_back(flight);
    }

    /// Removes and returns the head of the highest-priority non-empty level.
    pub fn pop_next(&mut self) -> Option<FlightHandle> {
        for level in self.levels.iter_mut() {
            if let Some(flight) = level.pop_front() {
                return Some(flight);
            }
        }
        None
    }

    /// Puts an undispatchable flight back at the tail of its own level.
    pub fn requeue(&mut self, class: AircraftClass, flight: FlightHandle) {
        self.levels[Self::level_for(class)].push_back(flight);
    }

    pub fn is_empty(&self) -> bool {
        self.levels.iter().all(|level| level.is_empty())
    }

    pub fn len(&self) -> usize {
        self.levels.iter().map(|level| level.len()).sum()
    }

    /// Queue depth per level, emergency first.
    pub fn depths(&self) -> [usize; 3] {
        [
            self.levels[0].len(),
            self.levels[1].len(),
            self.levels[2].len(),
        ]
    }

    /// Iterates every queued flight, highest priority level first.
    pub fn iter(&self) -> impl Iterator<Item = &FlightHandle> {
        self.levels.iter().flat_map(|level| level.iter())
    }

    /// Recomputes each queued flight's estimated wait in minutes.
    ///
    /// A flight waits behind everything queued at higher-priority levels
    /// plus everything ahead of it at its own level, each weighted by that
    /// level's per-flight service estimate.
    pub fn refresh_wait_estimates(&self, estimates: &WaitEstimates) {
        let emergencies = self.levels[0].len() as u32;
        let cargo = self.levels[1].len() as u32;

        for (level_index, level) in self.levels.iter().enumerate() {
            for (position, flight) in level.iter().enumerate() {
                let position = position as u32;
                let wait = match level_index {
                    0 => position * estimates.emergency,
                    1 => emergencies * estimates.emergency + position * estimates.cargo,
                    _ => {
                        emergencies * estimates.emergency
                            + cargo * estimates.cargo
                            + position * estimates.commercial
                    }
                };
                if let Ok(mut flight) = flight.write() {
                    flight.wait_estimate = wait;
                }
            }
        }
    }
}
