/// Whether the flight is arriving at or departing from the airport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Arrival,
    Departure,
}

impl Operation {
    pub fn as_str(&self) -> &str {
        match self {
            Operation::Arrival => "Arrival",
            Operation::Departure => "Departure",
        }
    }
}

/// Compass direction the flight approaches from or departs towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub fn as_str(&self) -> &str {
        match self {
            Direction::North => "North",
            Direction::South => "South",
            Direction::East => "East",
            Direction::West => "West",
        }
    }
}

/// A named stage of a flight's operational lifecycle, each with its own
/// nominal speed envelope and typical altitude band.
///
/// Arrivals run `Holding -> Approach -> (landing rollout) -> Taxi -> AtGate`;
/// departures run `AtGateDep -> TaxiDep -> TakeoffRoll -> Climb -> Cruise`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightPhase {
    Holding,
    Approach,
    Landing,
    Taxi,
    AtGate,
    AtGateDep,
    TaxiDep,
    TakeoffRoll,
    Climb,
    Cruise,
}

impl FlightPhase {
    pub fn name(&self) -> &'static str {
        match self {
            FlightPhase::Holding => "Holding",
            FlightPhase::Approach => "Approach",
            FlightPhase::Landing => "Landing",
            FlightPhase::Taxi => "Taxi",
            FlightPhase::AtGate => "AtGate",
            FlightPhase::AtGateDep => "AtGateDep",
            FlightPhase::TaxiDep => "TaxiDep",
            FlightPhase::TakeoffRoll => "TakeoffRoll",
            FlightPhase::Climb => "Climb",
            FlightPhase::Cruise => "Cruise",
        }
    }

    /// Nominal `[min, max]` speed band in km/h. Speeds outside this band
    /// raise a violation; the simulated draw is widened 10% past each end
    /// so breaches actually happen.
    pub fn speed_band(&self) -> (f64, f64) {
        match self {
            FlightPhase::Holding => (400.0, 600.0),
            FlightPhase::Approach => (240.0, 290.0),
            FlightPhase::Landing => (0.0, 240.0),
            FlightPhase::Taxi | FlightPhase::TaxiDep => (15.0, 30.0),
            FlightPhase::AtGate | FlightPhase::AtGateDep => (0.0, 5.0),
            FlightPhase::TakeoffRoll => (200.0, 290.0),
            FlightPhase::Climb => (250.0, 463.0),
            FlightPhase::Cruise => (800.0, 900.0),
        }
    }

    /// The permissible limit quoted on a speed violation notice.
    pub fn max_speed(&self) -> f64 {
        self.speed_band().1
    }

    /// Altitude band in feet the simulation draws from for this phase.
    pub fn altitude_band(&self) -> (f64, f64) {
        match self {
            FlightPhase::Cruise => (30_000.0, 42_000.0),
            FlightPhase::Climb => (10_000.0, 30_000.0),
            FlightPhase::Approach => (1_000.0, 10_000.0),
            _ => (0.0, 1_000.0),
        }
    }
}
