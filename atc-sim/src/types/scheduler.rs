use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;

use avn_protocol::messages::report::ViolationReport;
use avn_protocol::types::AircraftClass;
use logger::{Color, Logger};
use rand::Rng;
use threadpool::ThreadPool;

use super::airline::{AirlineCategory, AirlineRegistry};
use super::clock::SimClock;
use super::config::{SimConfig, SpawnRule};
use super::dispatcher::{Dispatch, Dispatcher};
use super::flight::{Flight, FlightHandle, FlightStatus, FlightTask};
use super::phase::Operation;
use super::queues::PriorityQueues;
use super::runway::Runways;
use super::sim_error::SimError;

/// The control loop of the simulation.
///
/// Advances simulated time one minute per tick. Each tick generates flights
/// from the periodic rules, dispatches at most one arrival and one departure,
/// refreshes queue wait estimates and prints a status table. Flight tasks
/// themselves run on a worker pool and are only reached through the
/// dispatcher's control handles.
pub struct Scheduler {
    config: SimConfig,
    clock: Arc<SimClock>,
    runways: Arc<Runways>,
    logger: Logger,
}

impl Scheduler {
    pub fn new(config: SimConfig, logger: Logger) -> Self {
        Scheduler {
            config,
            clock: Arc::new(SimClock::new()),
            runways: Arc::new(Runways::new()),
            logger,
        }
    }

    pub fn clock(&self) -> Arc<SimClock> {
        Arc::clone(&self.clock)
    }

    /// Runs the full simulation, blocking until every launched flight task
    /// has finished.
    pub fn run(&self, reports: Sender<ViolationReport>) -> Result<(), SimError> {
        let dispatcher = Dispatcher::new(
            Arc::clone(&self.runways),
            self.config.pacing.clone(),
            self.logger.clone(),
            self.config.verbose,
        );
        let mut registry = AirlineRegistry::from_specs(&self.config.airlines);
        for airline in registry.airlines() {
            let _ = self.logger.info(
                &format!(
                    "[ROSTER] {} ({}) | {} aircraft, {} flights",
                    airline.name,
                    airline.category.as_str(),
                    airline.max_aircraft,
                    airline.max_flights
                ),
                Color::Cyan,
                self.config.verbose,
            );
        }
        let mut arrivals = PriorityQueues::new();
        let mut departures = PriorityQueues::new();
        let pool = ThreadPool::new(self.config.pool_size);

        let mut roster: Vec<FlightHandle> = Vec::new();
        let mut next_flight_number = 101;

        for minute in 0..=self.config.duration_mins {
            self.clock.set_minutes(minute);
            self.log_tick_header(minute, &arrivals, &departures);

            for rule in self.config.spawn_rules.clone() {
                if minute % rule.every_mins != 0 {
                    continue;
                }
                if let Some((flight, class)) =
                    self.spawn_flight(&rule, &mut registry, &mut next_flight_number)
                {
                    roster.push(Arc::clone(&flight));
                    match rule.operation {
                        Operation::Arrival => arrivals.push(class, flight),
                        Operation::Departure => departures.push(class, flight),
                    }
                }
            }

            self.dispatch_one(&dispatcher, &mut arrivals, Operation::Arrival, &pool, &reports);
            self.dispatch_one(
                &dispatcher,
                &mut departures,
                Operation::Departure,
                &pool,
                &reports,
            );

            arrivals.refresh_wait_estimates(&self.config.wait_estimates);
            departures.refresh_wait_estimates(&self.config.wait_estimates);

            self.log_minute_summary(minute, &roster);
            thread::sleep(self.config.pacing.tick);
        }

        pool.join();
        Ok(())
    }

    fn spawn_flight(
        &self,
        rule: &SpawnRule,
        registry: &mut AirlineRegistry,
        next_flight_number: &mut u32,
    ) -> Option<(FlightHandle, AircraftClass)> {
        let category = match registry.try_admit(&rule.airline) {
            Ok(category) => category,
            Err(_) => {
                let _ = self.logger.warn(
                    &format!("[DENIED] {} no slots", rule.airline),
                    self.config.verbose,
                );
                return None;
            }
        };

        let number = *next_flight_number;
        *next_flight_number += 1;

        let emergency = rand::thread_rng().gen_range(1..=100) <= rule.emergency_chance;
        let class = if emergency {
            AircraftClass::Emergency
        } else {
            class_for_category(category)
        };

        let mut flight = Flight::new(
            number,
            rule.airline.clone(),
            class,
            rule.operation,
            rule.direction,
        );
        // Seed estimate shown on the [NEW] line; the queue-wide refresh at
        // the end of the tick replaces it.
        flight.wait_estimate = match class {
            AircraftClass::Emergency => 0,
            AircraftClass::Cargo => 5,
            AircraftClass::Commercial => 10,
        };

        let _ = self.logger.info(
            &format!(
                "[NEW] {} ({} {}) from {} | Est. wait: {} min",
                flight.tag(),
                class.as_str(),
                rule.operation.as_str(),
                rule.direction.as_str(),
                flight.wait_estimate
            ),
            Color::Green,
            self.config.verbose,
        );

        Some((flight.into_handle(), class))
    }

    fn dispatch_one(
        &self,
        dispatcher: &Dispatcher,
        queues: &mut PriorityQueues,
        operation: Operation,
        pool: &ThreadPool,
        reports: &Sender<ViolationReport>,
    ) {
        if let Dispatch::Cleared(flight, number, runway_id) = dispatcher.dispatch(queues, operation)
        {
            let (control, class) = match flight.read() {
                Ok(f) => (f.control(), f.class),
                Err(_) => return,
            };
            dispatcher.register(number, Arc::clone(&control), class);

            let task = FlightTask::new(
                Arc::clone(&flight),
                control,
                Arc::clone(&self.runways),
                runway_id,
                self.config.clone(),
                Arc::clone(&self.clock),
                reports.clone(),
                self.logger.clone(),
            );
            pool.execute(move || task.run());
        }
    }

    fn log_tick_header(
        &self,
        minute: u32,
        arrivals: &PriorityQueues,
        departures: &PriorityQueues,
    ) {
        let _ = self.logger.info(
            &format!("====== [TIME: {} min] ======", minute),
            Color::Yellow,
            self.config.verbose,
        );
        let _ = self.logger.info(
            &format!("[QUEUE] Arr: {} | Dep: {}", arrivals.len(), departures.len()),
            Color::Cyan,
            self.config.verbose,
        );
        let occupancy: Vec<String> = self
            .runways
            .all()
            .iter()
            .map(|runway| match runway.occupant() {
                Some(number) => format!("{} F{:04}", runway.id().name(), number),
                None => format!("{} free", runway.id().name()),
            })
            .collect();
        let _ = self.logger.info(
            &format!("[RWY] {}", occupancy.join(" | ")),
            Color::Cyan,
            self.config.verbose,
        );
    }

    fn log_minute_summary(&self, minute: u32, roster: &[FlightHandle]) {
        let mut table = format!("--- Minute {} summary ---\n", minute);
        table.push_str(" FLT   |   PHASE    | SPEED |   STATUS   | WAIT EST\n");
        table.push_str("-------+------------+-------+------------+---------\n");
        for flight in roster {
            if let Ok(f) = flight.read() {
                let phase = match f.status {
                    FlightStatus::Active(phase) => phase.name(),
                    _ => "-",
                };
                table.push_str(&format!(
                    " {} | {:>10} | {:>5} | {:>10} | {:>4} min\n",
                    f.tag(),
                    phase,
                    f.speed as i64,
                    f.status.name(),
                    f.wait_estimate
                ));
            }
        }
        let _ = self.logger.info(&table, Color::White, self.config.verbose);
    }
}

fn class_for_category(category: AirlineCategory) -> AircraftClass {
    match category {
        AirlineCategory::Cargo => AircraftClass::Cargo,
        _ => AircraftClass::Commercial,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::mpsc;
    use std::time::Duration;

    fn fast_config() -> SimConfig {
        let mut config = SimConfig::default();
        config.duration_mins = 2;
        config.verbose = false;
        config.pacing.tick = Duration::from_millis(1);
        config.pacing.phase = Duration::from_millis(1);
        config.pacing.rollout_step = Duration::from_millis(1);
        config.pacing.post_rollout = Duration::from_millis(1);
        config.pacing.yield_pause = Duration::from_millis(1);
        config.pacing.grace = Duration::from_millis(1);
        config.pacing.cancel_join = Duration::from_millis(1);
        config
    }

    #[test]
    fn short_run_drains_cleanly() {
        let logger = Logger::new(Path::new("/tmp/air_control_sched_logs"), "scheduler-test")
            .expect("logger");
        let scheduler = Scheduler::new(fast_config(), logger);
        let (sender, receiver) = mpsc::channel();

        scheduler.run(sender).expect("run");

        // All tasks joined, so the report stream is fully drained by now.
        // Reports are probabilistic; just make sure the channel survived.
        drop(receiver);
    }

    #[test]
    fn clock_tracks_last_tick() {
        let logger = Logger::new(Path::new("/tmp/air_control_sched_clock_logs"), "scheduler-test")
            .expect("logger");
        let config = fast_config();
        let duration = config.duration_mins;
        let scheduler = Scheduler::new(config, logger);
        let clock = scheduler.clock();
        let (sender, _receiver) = mpsc::channel();

        scheduler.run(sender).expect("run");
        assert_eq!(clock.minutes(), duration);
    }
}
