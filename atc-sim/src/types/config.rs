use std::time::Duration;

use super::airline::AirlineCategory;
use super::phase::{Direction, Operation};

/// The rectangular geofence around the airport, in simulation units.
#[derive(Debug, Clone)]
pub struct Geofence {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

/// Altitude limits checked during the airborne departure phases, in feet.
#[derive(Debug, Clone)]
pub struct AltitudeLimits {
    pub cruise_max: f64,
    pub cruise_min: f64,
    pub climb_max: f64,
}

/// Wall-clock pacing of the simulation. Simulated time advances one minute
/// per tick regardless of these values; they only control how fast a run
/// plays out (and are shrunk to near-zero by the tests).
#[derive(Debug, Clone)]
pub struct Pacing {
    pub tick: Duration,
    pub phase: Duration,
    pub rollout_step: Duration,
    pub post_rollout: Duration,
    pub yield_pause: Duration,
    /// Grace interval an occupant gets to honor a yield request.
    pub grace: Duration,
    /// Bounded wait for a cancelled task to observe its token.
    pub cancel_join: Duration,
}

/// One periodic flight-generation rule of the scheduler.
#[derive(Debug, Clone)]
pub struct SpawnRule {
    pub every_mins: u32,
    pub direction: Direction,
    pub airline: String,
    pub operation: Operation,
    /// Chance (1..=100) that the generated flight is an emergency.
    pub emergency_chance: u32,
}

/// Admission quotas for one airline.
#[derive(Debug, Clone)]
pub struct AirlineSpec {
    pub name: String,
    pub category: AirlineCategory,
    pub max_aircraft: u32,
    pub max_flights: u32,
}

/// Per-class constants feeding the queue wait estimates, in minutes.
#[derive(Debug, Clone)]
pub struct WaitEstimates {
    pub emergency: u32,
    pub cargo: u32,
    pub commercial: u32,
}

/// Immutable simulation configuration, built once at startup and passed to
/// every component that needs it.
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub duration_mins: u32,
    pub pool_size: usize,
    /// When false, per-phase console chatter is suppressed (file log stays).
    pub verbose: bool,
    pub geofence: Geofence,
    pub altitude_limits: AltitudeLimits,
    /// Residual speed above this after the landing rollout is a violation.
    pub rollout_exit_speed: f64,
    /// Chance (1..=100) of a ground fault during taxi.
    pub fault_chance: u32,
    pub wait_estimates: WaitEstimates,
    pub airlines: Vec<AirlineSpec>,
    pub spawn_rules: Vec<SpawnRule>,
    pub pacing: Pacing,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            duration_mins: 5,
            pool_size: 8,
            verbose: true,
            geofence: Geofence {
                north: 100.0,
                south: -100.0,
                east: 100.0,
                west: -100.0,
            },
            altitude_limits: AltitudeLimits {
                cruise_max: 40_000.0,
                cruise_min: 1_000.0,
                climb_max: 30_000.0,
            },
            rollout_exit_speed: 30.0,
            fault_chance: 10,
            wait_estimates: WaitEstimates {
                emergency: 5,
                cargo: 8,
                commercial: 10,
            },
            airlines: vec![
                airline("PIA", AirlineCategory::Commercial, 6, 4),
                airline("AirBlue", AirlineCategory::Commercial, 4, 4),
                airline("FedEx", AirlineCategory::Cargo, 3, 2),
                airline("Pakistan Airforce", AirlineCategory::Military, 2, 1),
                airline("Blue Dart", AirlineCategory::Cargo, 2, 2),
                airline("AghaKhan Air", AirlineCategory::Medical, 2, 1),
            ],
            spawn_rules: vec![
                rule(3, Direction::North, "PIA", Operation::Arrival, 10),
                rule(2, Direction::South, "AirBlue", Operation::Arrival, 5),
                rule(2, Direction::East, "AirBlue", Operation::Departure, 15),
                rule(4, Direction::West, "Blue Dart", Operation::Departure, 20),
            ],
            pacing: Pacing {
                tick: Duration::from_millis(2000),
                phase: Duration::from_millis(800),
                rollout_step: Duration::from_millis(30),
                post_rollout: Duration::from_millis(400),
                yield_pause: Duration::from_millis(400),
                grace: Duration::from_millis(100),
                cancel_join: Duration::from_millis(200),
            },
        }
    }
}

fn airline(name: &str, category: AirlineCategory, max_aircraft: u32, max_flights: u32) -> AirlineSpec {
    AirlineSpec {
        name: name.to_string(),
        category,
        max_aircraft,
        max_flights,
    }
}

fn rule(
    every_mins: u32,
    direction: Direction,
    airline: &str,
    operation: Operation,
    emergency_chance: u32,
) -> SpawnRule {
    SpawnRule {
        every_mins,
        direction,
        airline: airline.to_string(),
        operation,
        emergency_chance,
    }
}
