//! Violation-notice service.
//!
//! Consumes raw violation reports from the control tower, turns each one
//! into a numbered notice with its fine, keeps the authoritative copy, and
//! fans the result out to the airline portal and the payment service.

pub mod errors;
pub mod service;

pub use errors::GeneratorError;
pub use service::{FineSchedule, NoticeService};
