use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, RwLock};
use std::thread;

use avn_protocol::messages::report::ViolationReport;
use avn_protocol::types::{AircraftClass, ViolationKind};
use logger::{Color, Logger};
use rand::Rng;

use super::clock::SimClock;
use super::config::SimConfig;
use super::phase::{Direction, FlightPhase, Operation};
use super::runway::{RunwayId, Runways};

/// Shared handle to a flight. The executing task takes the write lock only
/// for short mutations; the scheduler reads it for bookkeeping and display.
pub type FlightHandle = Arc<RwLock<Flight>>;

/// Out-of-band control surface for a running flight task. The dispatcher
/// touches a task only through these two flags, never through the flight's
/// own lock, so a request can land while the task is mid-transition.
#[derive(Debug, Default)]
pub struct FlightControl {
    yield_requested: AtomicBool,
    cancelled: AtomicBool,
}

impl FlightControl {
    pub fn request_yield(&self) {
        self.yield_requested.store(true, Ordering::SeqCst);
    }

    /// Consumes a pending yield request, returning whether one was set.
    pub fn take_yield(&self) -> bool {
        self.yield_requested.swap(false, Ordering::SeqCst)
    }

    pub fn yield_pending(&self) -> bool {
        self.yield_requested.load(Ordering::SeqCst)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Lifecycle status of a flight, from queueing through completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightStatus {
    Waiting,
    Active(FlightPhase),
    Faulted,
    Cancelled,
    Complete,
}

impl FlightStatus {
    pub fn name(&self) -> &'static str {
        match self {
            FlightStatus::Waiting => "Waiting",
            FlightStatus::Active(phase) => phase.name(),
            FlightStatus::Faulted => "Faulted",
            FlightStatus::Cancelled => "Cancelled",
            FlightStatus::Complete => "Complete",
        }
    }
}

pub struct Flight {
    pub number: u32,
    pub airline: String,
    pub class: AircraftClass,
    pub operation: Operation,
    pub direction: Direction,
    pub status: FlightStatus,
    pub speed: f64,
    pub altitude: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub runway: Option<RunwayId>,
    /// Latched once any violation has been recorded for this flight.
    pub violation_flag: bool,
    pub wait_estimate: u32,
    control: Arc<FlightControl>,
}

impl Flight {
    pub fn new(
        number: u32,
        airline: String,
        class: AircraftClass,
        operation: Operation,
        direction: Direction,
    ) -> Self {
        Flight {
            number,
            airline,
            class,
            operation,
            direction,
            status: FlightStatus::Waiting,
            speed: 0.0,
            altitude: 0.0,
            latitude: 0.0,
            longitude: 0.0,
            runway: None,
            violation_flag: false,
            wait_estimate: 0,
            control: Arc::new(FlightControl::default()),
        }
    }

    pub fn into_handle(self) -> FlightHandle {
        Arc::new(RwLock::new(self))
    }

    pub fn control(&self) -> Arc<FlightControl> {
        Arc::clone(&self.control)
    }

    /// Display tag, e.g. flight 101 is shown as `F0101`.
    pub fn tag(&self) -> String {
        format!("F{:04}", self.number)
    }

    /// Draws the simulated speed, altitude and position for a phase.
    ///
    /// The speed draw is widened 10% past each end of the nominal band, and
    /// the position draw overshoots the geofence by 10% on the flight's own
    /// approach axis, so breaches occur with realistic frequency.
    pub fn draw_state<R: Rng>(&mut self, phase: FlightPhase, config: &SimConfig, rng: &mut R) {
        self.status = FlightStatus::Active(phase);

        let (min, max) = phase.speed_band();
        let bias = (max - min) * 0.1;
        self.speed = rng.gen_range(min - bias..=max + bias);

        let (alt_min, alt_max) = phase.altitude_band();
        self.altitude = rng.gen_range(alt_min..=alt_max);

        let fence = &config.geofence;
        match self.direction {
            Direction::North => {
                self.latitude = rng.gen_range(0.0..=fence.north * 1.1);
                self.longitude = rng.gen_range(fence.west..=fence.east);
            }
            Direction::South => {
                self.latitude = rng.gen_range(fence.south * 1.1..=0.0);
                self.longitude = rng.gen_range(fence.west..=fence.east);
            }
            Direction::East => {
                self.longitude = rng.gen_range(0.0..=fence.east * 1.1);
                self.latitude = rng.gen_range(fence.south..=fence.north);
            }
            Direction::West => {
                self.longitude = rng.gen_range(fence.west * 1.1..=0.0);
                self.latitude = rng.gen_range(fence.south..=fence.north);
            }
        }
    }

    /// Checks the current state against the limits for `phase` and returns
    /// one report per breached rule. Does not advance the state machine.
    pub fn check_violations(&mut self, phase: FlightPhase, config: &SimConfig) -> Vec<ViolationReport> {
        let mut reports = Vec::new();

        let (min, max) = phase.speed_band();
        if self.speed < min || self.speed > max {
            reports.push(self.report(ViolationKind::Speed, self.speed, phase.max_speed()));
        }

        let fence = &config.geofence;
        if self.longitude > fence.east {
            reports.push(self.report(ViolationKind::Boundary, self.longitude, fence.east));
        } else if self.longitude < fence.west {
            reports.push(self.report(ViolationKind::Boundary, self.longitude, fence.west));
        } else if self.latitude > fence.north {
            reports.push(self.report(ViolationKind::Boundary, self.latitude, fence.north));
        } else if self.latitude < fence.south {
            reports.push(self.report(ViolationKind::Boundary, self.latitude, fence.south));
        }

        let limits = &config.altitude_limits;
        match phase {
            FlightPhase::Cruise if self.altitude > limits.cruise_max => {
                reports.push(self.report(ViolationKind::Altitude, self.altitude, limits.cruise_max));
            }
            FlightPhase::Cruise if self.altitude < limits.cruise_min => {
                reports.push(self.report(ViolationKind::Altitude, self.altitude, limits.cruise_min));
            }
            FlightPhase::Climb if self.altitude > limits.climb_max => {
                reports.push(self.report(ViolationKind::Altitude, self.altitude, limits.climb_max));
            }
            _ => {}
        }

        if !reports.is_empty() {
            self.violation_flag = true;
        }
        reports
    }

    fn report(&self, kind: ViolationKind, recorded: f64, limit: f64) -> ViolationReport {
        ViolationReport {
            flight_number: self.number,
            airline: self.airline.clone(),
            aircraft_class: self.class,
            kind,
            recorded,
            limit,
        }
    }
}

/// Executes one flight's phase sequence on a worker thread.
///
/// The task owns the runway for its whole lifetime and is the only writer of
/// the flight's simulation state. Every suspension point re-checks the
/// cancel token so a forced preemption unwinds promptly.
pub struct FlightTask {
    flight: FlightHandle,
    control: Arc<FlightControl>,
    runways: Arc<Runways>,
    runway_id: RunwayId,
    config: SimConfig,
    clock: Arc<SimClock>,
    reporter: Sender<ViolationReport>,
    logger: Logger,
}

impl FlightTask {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        flight: FlightHandle,
        control: Arc<FlightControl>,
        runways: Arc<Runways>,
        runway_id: RunwayId,
        config: SimConfig,
        clock: Arc<SimClock>,
        reporter: Sender<ViolationReport>,
        logger: Logger,
    ) -> Self {
        FlightTask {
            flight,
            control,
            runways,
            runway_id,
            config,
            clock,
            reporter,
            logger,
        }
    }

    pub fn run(self) {
        let (tag, class, operation) = match self.flight.read() {
            Ok(flight) => (flight.tag(), flight.class, flight.operation),
            Err(_) => return,
        };

        let _ = self.logger.info(
            &format!(
                "[{}][{}][{}] {} on {}",
                self.clock.timestamp(),
                operation.as_str().to_uppercase(),
                class.as_str(),
                tag,
                self.runway_id.name()
            ),
            Color::Green,
            self.config.verbose,
        );

        match operation {
            Operation::Arrival => self.run_arrival(&tag),
            Operation::Departure => self.run_departure(&tag),
        }

        self.runways.get(self.runway_id).release(self.flight_number());

        if self.control.is_cancelled() {
            if let Ok(mut flight) = self.flight.write() {
                flight.status = FlightStatus::Cancelled;
            }
            return;
        }

        if let Ok(mut flight) = self.flight.write() {
            flight.status = FlightStatus::Complete;
        }
        let _ = self.logger.info(
            &format!("[COMPLETE] {} cleared {}", tag, self.runway_id.name()),
            Color::Green,
            self.config.verbose,
        );
    }

    fn run_arrival(&self, tag: &str) {
        let phases = [FlightPhase::Holding, FlightPhase::Approach];
        for phase in phases {
            if !self.step_phase(tag, phase) {
                return;
            }
        }

        self.landing_rollout(tag);
        if self.control.is_cancelled() {
            return;
        }

        if !self.step_phase(tag, FlightPhase::Taxi) {
            return;
        }
        if !self.ground_fault_check(tag) {
            return;
        }
        self.step_phase(tag, FlightPhase::AtGate);
    }

    fn run_departure(&self, tag: &str) {
        if !self.step_phase(tag, FlightPhase::AtGateDep) {
            return;
        }
        if !self.step_phase(tag, FlightPhase::TaxiDep) {
            return;
        }
        if !self.ground_fault_check(tag) {
            return;
        }
        let phases = [FlightPhase::TakeoffRoll, FlightPhase::Climb, FlightPhase::Cruise];
        for phase in phases {
            if !self.step_phase(tag, phase) {
                return;
            }
        }
    }

    /// One phase transition. Returns false when the task must unwind.
    fn step_phase(&self, tag: &str, phase: FlightPhase) -> bool {
        if self.control.is_cancelled() {
            return false;
        }

        let reports = match self.flight.write() {
            Ok(mut flight) => {
                let mut rng = rand::thread_rng();
                flight.draw_state(phase, &self.config, &mut rng);
                let reports = flight.check_violations(phase, &self.config);

                let _ = self.logger.info(
                    &format!(
                        "[{}][PHASE] {} | {} | {:.0} km/h | Alt: {:.0} ft",
                        self.clock.timestamp(),
                        tag,
                        phase.name(),
                        flight.speed,
                        flight.altitude
                    ),
                    Color::Cyan,
                    self.config.verbose,
                );
                reports
            }
            Err(_) => return false,
        };

        for report in reports {
            let _ = self.logger.info(
                &format!(
                    "  [{} VIOLATION] during {} for {} | Recorded: {:.1}, Limit: {:.1}",
                    report.kind.as_str(),
                    phase.name(),
                    tag,
                    report.recorded,
                    report.limit
                ),
                Color::Red,
                self.config.verbose,
            );
            let _ = self.reporter.send(report);
        }

        self.honor_yield(tag, phase);

        thread::sleep(self.config.pacing.phase);
        !self.control.is_cancelled()
    }

    /// Acknowledges a pending yield request, pausing briefly before resuming.
    fn honor_yield(&self, tag: &str, phase: FlightPhase) {
        if self.control.take_yield() {
            let _ = self.logger.info(
                &format!("[YIELD] {} yielding for emergency during {}", tag, phase.name()),
                Color::Yellow,
                self.config.verbose,
            );
            thread::sleep(self.config.pacing.yield_pause);
        }
    }

    /// Five-step deceleration from 240 km/h. A pending yield truncates the
    /// remaining steps; residual speed above the exit limit is a violation.
    fn landing_rollout(&self, tag: &str) {
        let _ = self.logger.info(
            &format!("Landing rollout: {} | 240 km/h", tag),
            Color::Green,
            self.config.verbose,
        );

        if let Ok(mut flight) = self.flight.write() {
            flight.status = FlightStatus::Active(FlightPhase::Landing);
            flight.speed = 240.0;
        }

        for step in 0..5 {
            if self.control.is_cancelled() {
                return;
            }

            let speed = match self.flight.write() {
                Ok(mut flight) => {
                    flight.speed -= 42.0;
                    flight.speed
                }
                Err(_) => return,
            };
            thread::sleep(self.config.pacing.rollout_step);
            let _ = self.logger.info(
                &format!("  | {} speed: {:.0} km/h", tag, speed),
                Color::White,
                self.config.verbose,
            );

            if step < 4 && self.control.yield_pending() {
                self.control.take_yield();
                let _ = self.logger.info(
                    &format!("[EXPEDITING] {} expediting rollout for emergency", tag),
                    Color::Yellow,
                    self.config.verbose,
                );
                break;
            }
        }

        let residual = match self.flight.write() {
            Ok(mut flight) => {
                let residual = flight.speed;
                if residual > self.config.rollout_exit_speed {
                    flight.violation_flag = true;
                }
                residual
            }
            Err(_) => return,
        };

        if residual > self.config.rollout_exit_speed {
            let report = match self.flight.read() {
                Ok(flight) => flight.report(
                    ViolationKind::Rollout,
                    residual,
                    self.config.rollout_exit_speed,
                ),
                Err(_) => return,
            };
            let _ = self.logger.info(
                &format!(
                    "  [ROLLOUT VIOLATION] {} | Residual: {:.0} km/h",
                    tag, residual
                ),
                Color::Red,
                self.config.verbose,
            );
            let _ = self.reporter.send(report);
        }

        thread::sleep(self.config.pacing.post_rollout);
    }

    /// Random ground fault during taxi. The fault is an interjection: the
    /// flight is flagged and towed, then the sequence resumes.
    fn ground_fault_check(&self, tag: &str) -> bool {
        if self.control.is_cancelled() {
            return false;
        }

        let faulted = rand::thread_rng().gen_range(1..=100) <= self.config.fault_chance;
        if faulted {
            if let Ok(mut flight) = self.flight.write() {
                flight.status = FlightStatus::Faulted;
            }
            let _ = self.logger.info(
                &format!("[FAULT] {} has a ground fault, requires towing", tag),
                Color::Red,
                self.config.verbose,
            );
        }

        if self.control.take_yield() {
            let _ = self.logger.info(
                &format!("[PREEMPTED] {} yielding for emergency", tag),
                Color::Yellow,
                self.config.verbose,
            );
            thread::sleep(self.config.pacing.yield_pause);
        }
        true
    }

    fn flight_number(&self) -> u32 {
        self.flight.read().map(|flight| flight.number).unwrap_or(0)
    }
}
