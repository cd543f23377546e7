use std::sync::Mutex;

use avn_protocol::types::AircraftClass;

use super::phase::Direction;

/// Identity of one of the three static runways.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunwayId {
    A,
    B,
    C,
}

impl RunwayId {
    pub fn name(&self) -> &str {
        match self {
            RunwayId::A => "RWY-A",
            RunwayId::B => "RWY-B",
            RunwayId::C => "RWY-C",
        }
    }
}

/// An exclusive-access runway. The occupant is recorded by flight number so
/// contention is visible to the dispatcher instead of stalling it, and so a
/// forcibly terminated task can never release a runway that was already
/// handed to someone else.
#[derive(Debug)]
pub struct Runway {
    id: RunwayId,
    occupant: Mutex<Option<u32>>,
}

impl Runway {
    fn new(id: RunwayId) -> Self {
        Runway {
            id,
            occupant: Mutex::new(None),
        }
    }

    pub fn id(&self) -> RunwayId {
        self.id
    }

    /// Non-blocking acquisition attempt. The lock is only held for the
    /// check-and-set, never across a suspension.
    pub fn try_acquire(&self, flight_number: u32) -> bool {
        match self.occupant.lock() {
            Ok(mut occupant) => {
                if occupant.is_none() {
                    *occupant = Some(flight_number);
                    true
                } else {
                    false
                }
            }
            Err(_) => false,
        }
    }

    /// Releases the runway, but only if `flight_number` still holds it.
    pub fn release(&self, flight_number: u32) {
        if let Ok(mut occupant) = self.occupant.lock() {
            if *occupant == Some(flight_number) {
                *occupant = None;
            }
        }
    }

    /// Unconditionally frees the runway. Last-resort path after a forced
    /// termination, so a preempted task can never wedge the runway.
    pub fn force_release(&self) {
        if let Ok(mut occupant) = self.occupant.lock() {
            *occupant = None;
        }
    }

    pub fn occupant(&self) -> Option<u32> {
        match self.occupant.lock() {
            Ok(occupant) => *occupant,
            Err(_) => None,
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.occupant().is_some()
    }
}

/// The three named runway instances plus the fixed selection rules.
#[derive(Debug)]
pub struct Runways {
    a: Runway,
    b: Runway,
    c: Runway,
}

impl Default for Runways {
    fn default() -> Self {
        Self::new()
    }
}

impl Runways {
    pub fn new() -> Self {
        Runways {
            a: Runway::new(RunwayId::A),
            b: Runway::new(RunwayId::B),
            c: Runway::new(RunwayId::C),
        }
    }

    pub fn all(&self) -> [&Runway; 3] {
        [&self.a, &self.b, &self.c]
    }

    pub fn get(&self, id: RunwayId) -> &Runway {
        match id {
            RunwayId::A => &self.a,
            RunwayId::B => &self.b,
            RunwayId::C => &self.c,
        }
    }

    /// Arrivals from North/South land on RWY-A, all others on RWY-C.
    pub fn for_arrival(&self, direction: Direction) -> RunwayId {
        match direction {
            Direction::North | Direction::South => RunwayId::A,
            Direction::East | Direction::West => RunwayId::C,
        }
    }

    /// Cargo departures use RWY-C, all other departures RWY-B.
    pub fn for_departure(&self, class: AircraftClass) -> RunwayId {
        match class {
            AircraftClass::Cargo => RunwayId::C,
            _ => RunwayId::B,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_while_occupied() {
        let runways = Runways::new();
        let runway = runways.get(RunwayId::A);

        assert!(runway.try_acquire(101));
        assert!(!runway.try_acquire(102));
        assert_eq!(runway.occupant(), Some(101));
    }

    #[test]
    fn release_by_non_occupant_is_ignored() {
        let runways = Runways::new();
        let runway = runways.get(RunwayId::B);

        assert!(runway.try_acquire(101));
        runway.release(102);
        assert_eq!(runway.occupant(), Some(101));

        runway.release(101);
        assert!(!runway.is_occupied());
    }

    #[test]
    fn force_release_always_frees() {
        let runways = Runways::new();
        let runway = runways.get(RunwayId::C);

        assert!(runway.try_acquire(101));
        runway.force_release();
        assert!(runway.try_acquire(102));
    }

    #[test]
    fn stale_release_cannot_evict_new_occupant() {
        // A forcibly terminated flight unwinding late must not free the
        // runway out from under the emergency that took it over.
        let runways = Runways::new();
        let runway = runways.get(RunwayId::A);

        assert!(runway.try_acquire(101));
        runway.force_release();
        assert!(runway.try_acquire(200));

        runway.release(101); // the old occupant finally unwinds
        assert_eq!(runway.occupant(), Some(200));
    }

    #[test]
    fn all_lists_every_runway_once() {
        let runways = Runways::new();
        let ids: Vec<RunwayId> = runways.all().iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec![RunwayId::A, RunwayId::B, RunwayId::C]);
    }

    #[test]
    fn selection_rules_are_fixed() {
        let runways = Runways::new();

        assert_eq!(runways.for_arrival(Direction::North), RunwayId::A);
        assert_eq!(runways.for_arrival(Direction::South), RunwayId::A);
        assert_eq!(runways.for_arrival(Direction::East), RunwayId::C);
        assert_eq!(runways.for_arrival(Direction::West), RunwayId::C);

        assert_eq!(runways.for_departure(AircraftClass::Cargo), RunwayId::C);
        assert_eq!(runways.for_departure(AircraftClass::Emergency), RunwayId::B);
        assert_eq!(
            runways.for_departure(AircraftClass::Commercial),
            RunwayId::B
        );
    }
}
