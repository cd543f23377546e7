//! Airline portal.
//!
//! A read-only mirror of the fines owed. Notices arrive from the
//! violation-notice service and stay active until the payment service
//! confirms a settlement, at which point they move to history for good.

pub mod errors;
pub mod state;

pub use errors::PortalError;
pub use state::Portal;
