use super::config::AirlineSpec;
use super::sim_error::SimError;

/// The business category of an airline. Only `Cargo` affects the class of
/// the flights it launches; the rest fly as `Commercial`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AirlineCategory {
    Commercial,
    Cargo,
    Military,
    Medical,
}

impl AirlineCategory {
    pub fn as_str(&self) -> &str {
        match self {
            AirlineCategory::Commercial => "Commercial",
            AirlineCategory::Cargo => "Cargo",
            AirlineCategory::Military => "Military",
            AirlineCategory::Medical => "Medical",
        }
    }
}

/// An airline with its admission quotas and usage counters.
#[derive(Debug, Clone)]
pub struct Airline {
    pub name: String,
    pub category: AirlineCategory,
    pub max_aircraft: u32,
    pub max_flights: u32,
    pub in_service: u32,
    pub flights_used: u32,
}

impl Airline {
    fn from_spec(spec: &AirlineSpec) -> Self {
        Airline {
            name: spec.name.clone(),
            category: spec.category,
            max_aircraft: spec.max_aircraft,
            max_flights: spec.max_flights,
            in_service: 0,
            flights_used: 0,
        }
    }

    /// Claims one concurrent slot and one cumulative flight, or refuses.
    /// Both counters move together.
    ///
    /// `in_service` is never given back on completion: an airline's
    /// concurrent slots are one-shot for the run.
    fn try_launch(&mut self) -> bool {
        if self.in_service < self.max_aircraft && self.flights_used < self.max_flights {
            self.in_service += 1;
            self.flights_used += 1;
            return true;
        }
        false
    }
}

/// The airline roster with its admission state. Owned by the scheduler loop;
/// admission is the only mutation.
#[derive(Debug)]
pub struct AirlineRegistry {
    airlines: Vec<Airline>,
}

impl AirlineRegistry {
    pub fn from_specs(specs: &[AirlineSpec]) -> Self {
        AirlineRegistry {
            airlines: specs.iter().map(Airline::from_spec).collect(),
        }
    }

    /// Admits one new flight for `name`, returning the airline's category so
    /// the caller can derive the aircraft class. `Err` means the request is
    /// dropped: either the airline is unknown or its quota is exhausted.
    pub fn try_admit(&mut self, name: &str) -> Result<AirlineCategory, SimError> {
        let airline = self
            .airlines
            .iter_mut()
            .find(|a| a.name == name)
            .ok_or_else(|| SimError::UnknownAirline(name.to_string()))?;

        if airline.try_launch() {
            Ok(airline.category)
        } else {
            Err(SimError::QuotaExhausted(name.to_string()))
        }
    }

    pub fn airlines(&self) -> &[Airline] {
        &self.airlines
    }
}
