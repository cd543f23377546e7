pub mod airline;

pub mod clock;

pub mod config;

pub mod dispatcher;

pub mod flight;

pub mod phase;

pub mod queues;

pub mod reporter;

pub mod runway;

pub mod scheduler;

pub mod sim_error;
