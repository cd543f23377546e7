use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread;

use avn_protocol::types::AircraftClass;
use logger::{Color, Logger};

use super::config::Pacing;
use super::flight::{FlightControl, FlightHandle};
use super::phase::Operation;
use super::queues::PriorityQueues;
use super::runway::{RunwayId, Runways};

struct ActiveFlight {
    control: Arc<FlightControl>,
    class: AircraftClass,
}

/// Assigns runways to queued flights, preempting for emergencies.
///
/// Holds a registry of the control handles of launched tasks so it can reach
/// a runway's occupant without touching the flight's own lock.
pub struct Dispatcher {
    runways: Arc<Runways>,
    active: Mutex<HashMap<u32, ActiveFlight>>,
    pacing: Pacing,
    logger: Logger,
    verbose: bool,
}

/// Outcome of one dispatch attempt for one queue category.
pub enum Dispatch {
    /// The head flight acquired its runway and should be launched.
    Cleared(FlightHandle, u32, RunwayId),
    /// The head flight was requeued at the tail of its level.
    Requeued,
    /// Nothing was waiting.
    Idle,
}

impl Dispatcher {
    pub fn new(runways: Arc<Runways>, pacing: Pacing, logger: Logger, verbose: bool) -> Self {
        Dispatcher {
            runways,
            active: Mutex::new(HashMap::new()),
            pacing,
            logger,
            verbose,
        }
    }

    pub fn runways(&self) -> &Runways {
        &self.runways
    }

    /// Records a launched task so later preemptions can find it.
    pub fn register(&self, flight_number: u32, control: Arc<FlightControl>, class: AircraftClass) {
        if let Ok(mut active) = self.active.lock() {
            active.insert(flight_number, ActiveFlight { control, class });
        }
    }

    /// Pops the head of the highest-priority non-empty queue and tries to
    /// clear it onto its runway. One attempt per call; a blocked flight goes
    /// back to the tail of its own level.
    pub fn dispatch(&self, queues: &mut PriorityQueues, operation: Operation) -> Dispatch {
        let flight = match queues.pop_next() {
            Some(flight) => flight,
            None => return Dispatch::Idle,
        };

        let (number, class, direction, tag) = match flight.read() {
            Ok(f) => (f.number, f.class, f.direction, f.tag()),
            Err(_) => return Dispatch::Idle,
        };

        let runway_id = match operation {
            Operation::Arrival => self.runways.for_arrival(direction),
            Operation::Departure => self.runways.for_departure(class),
        };
        let runway = self.runways.get(runway_id);

        if runway.try_acquire(number) {
            return self.cleared(flight, number, runway_id);
        }

        if class != AircraftClass::Emergency {
            let _ = self.logger.info(
                &format!("[HOLD] {} waiting, {} busy", tag, runway_id.name()),
                Color::Yellow,
                self.verbose,
            );
            queues.requeue(class, flight);
            return Dispatch::Requeued;
        }

        if self.preempt(runway_id, number, &tag) {
            return self.cleared(flight, number, runway_id);
        }

        let _ = self.logger.warn(
            &format!("[HOLD] emergency {} could not clear {}", tag, runway_id.name()),
            self.verbose,
        );
        queues.requeue(class, flight);
        Dispatch::Requeued
    }

    fn cleared(&self, flight: FlightHandle, number: u32, runway_id: RunwayId) -> Dispatch {
        if let Ok(mut f) = flight.write() {
            f.runway = Some(runway_id);
        }
        Dispatch::Cleared(flight, number, runway_id)
    }

    /// Two-phase preemption of a busy runway for an emergency.
    ///
    /// Cooperative first: ask the occupant to yield and give it a grace
    /// interval. Forced second: cancel its task, wait for the token to be
    /// observed, then free the runway unconditionally. Returns whether the
    /// emergency ended up holding the runway.
    fn preempt(&self, runway_id: RunwayId, emergency: u32, tag: &str) -> bool {
        let runway = self.runways.get(runway_id);

        let occupant = match runway.occupant() {
            Some(occupant) => occupant,
            None => return runway.try_acquire(emergency),
        };

        let control = match self.active.lock() {
            Ok(active) => match active.get(&occupant) {
                Some(entry) if entry.class == AircraftClass::Emergency => {
                    // Never cancel another emergency.
                    return false;
                }
                Some(entry) => Arc::clone(&entry.control),
                None => return false,
            },
            Err(_) => return false,
        };

        let _ = self.logger.info(
            &format!(
                "[PREEMPT] {} requesting yield from F{:04} on {}",
                tag, occupant, runway_id.name()
            ),
            Color::Yellow,
            self.verbose,
        );
        control.request_yield();
        thread::sleep(self.pacing.grace);

        if runway.try_acquire(emergency) {
            return true;
        }

        let _ = self.logger.warn(
            &format!(
                "[PREEMPT] F{:04} did not yield, terminating for {}",
                occupant, tag
            ),
            self.verbose,
        );
        control.cancel();
        thread::sleep(self.pacing.cancel_join);
        runway.force_release();

        runway.try_acquire(emergency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::config::SimConfig;
    use crate::types::flight::Flight;
    use crate::types::phase::Direction;
    use std::time::Duration;

    fn fast_pacing() -> Pacing {
        let mut pacing = SimConfig::default().pacing;
        pacing.grace = Duration::from_millis(1);
        pacing.cancel_join = Duration::from_millis(1);
        pacing
    }

    fn dispatcher() -> Dispatcher {
        let logger = Logger::new(std::path::Path::new("/tmp/air_control_dispatch_logs"), "test")
            .expect("logger");
        Dispatcher::new(Arc::new(Runways::new()), fast_pacing(), logger, false)
    }

    fn queue_flight(
        queues: &mut PriorityQueues,
        number: u32,
        class: AircraftClass,
        operation: Operation,
        direction: Direction,
    ) {
        let flight = Flight::new(number, "PIA".to_string(), class, operation, direction);
        queues.push(class, flight.into_handle());
    }

    #[test]
    fn head_flight_clears_onto_free_runway() {
        let dispatcher = dispatcher();
        let mut queues = PriorityQueues::new();
        queue_flight(
            &mut queues,
            101,
            AircraftClass::Commercial,
            Operation::Arrival,
            Direction::North,
        );

        match dispatcher.dispatch(&mut queues, Operation::Arrival) {
            Dispatch::Cleared(flight, number, runway_id) => {
                assert_eq!(number, 101);
                assert_eq!(runway_id, RunwayId::A);
                assert_eq!(flight.read().unwrap().runway, Some(RunwayId::A));
                assert_eq!(dispatcher.runways().get(RunwayId::A).occupant(), Some(101));
            }
            _ => panic!("expected a cleared dispatch"),
        }
    }

    #[test]
    fn blocked_non_emergency_is_requeued_at_tail() {
        let dispatcher = dispatcher();
        dispatcher.runways().get(RunwayId::A).try_acquire(900);

        let mut queues = PriorityQueues::new();
        queue_flight(
            &mut queues,
            101,
            AircraftClass::Commercial,
            Operation::Arrival,
            Direction::North,
        );
        queue_flight(
            &mut queues,
            102,
            AircraftClass::Commercial,
            Operation::Arrival,
            Direction::North,
        );

        assert!(matches!(
            dispatcher.dispatch(&mut queues, Operation::Arrival),
            Dispatch::Requeued
        ));

        // 101 went back to the tail, so 102 is the next head.
        let head = queues.pop_next().unwrap();
        assert_eq!(head.read().unwrap().number, 102);
    }

    #[test]
    fn idle_when_nothing_is_queued() {
        let dispatcher = dispatcher();
        let mut queues = PriorityQueues::new();
        assert!(matches!(
            dispatcher.dispatch(&mut queues, Operation::Departure),
            Dispatch::Idle
        ));
    }

    #[test]
    fn emergency_forces_out_unresponsive_occupant() {
        let dispatcher = dispatcher();

        // Occupant that never polls its yield flag.
        let occupant = Flight::new(
            900,
            "PIA".to_string(),
            AircraftClass::Commercial,
            Operation::Arrival,
            Direction::North,
        );
        let control = occupant.control();
        dispatcher.register(900, Arc::clone(&control), AircraftClass::Commercial);
        assert!(dispatcher.runways().get(RunwayId::A).try_acquire(900));

        let mut queues = PriorityQueues::new();
        queue_flight(
            &mut queues,
            101,
            AircraftClass::Emergency,
            Operation::Arrival,
            Direction::North,
        );

        match dispatcher.dispatch(&mut queues, Operation::Arrival) {
            Dispatch::Cleared(_, number, runway_id) => {
                assert_eq!(number, 101);
                assert_eq!(runway_id, RunwayId::A);
            }
            _ => panic!("emergency should have cleared"),
        }

        assert!(control.is_cancelled());
        assert_eq!(dispatcher.runways().get(RunwayId::A).occupant(), Some(101));
    }

    #[test]
    fn emergency_never_preempts_another_emergency() {
        let dispatcher = dispatcher();

        let occupant = Flight::new(
            900,
            "AghaKhan Air".to_string(),
            AircraftClass::Emergency,
            Operation::Arrival,
            Direction::North,
        );
        let control = occupant.control();
        dispatcher.register(900, Arc::clone(&control), AircraftClass::Emergency);
        assert!(dispatcher.runways().get(RunwayId::A).try_acquire(900));

        let mut queues = PriorityQueues::new();
        queue_flight(
            &mut queues,
            101,
            AircraftClass::Emergency,
            Operation::Arrival,
            Direction::North,
        );

        assert!(matches!(
            dispatcher.dispatch(&mut queues, Operation::Arrival),
            Dispatch::Requeued
        ));
        assert!(!control.is_cancelled());
        assert_eq!(dispatcher.runways().get(RunwayId::A).occupant(), Some(900));
    }
}
