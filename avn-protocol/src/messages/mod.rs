pub mod notice;
pub mod payment;
pub mod report;
