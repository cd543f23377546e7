//! Payment service.
//!
//! The sole authority on whether a fine is settled. Registrations from the
//! violation-notice service establish pending obligations; settlement
//! attempts from the portal are resolved against them.

pub mod errors;
pub mod processor;

pub use errors::PaymentError;
pub use processor::{PaymentProcessor, Resolution};
