pub mod actors;
pub mod config;
pub mod domain;
pub mod metrics;
pub mod persistence;
pub mod registry;
pub mod service;
pub mod transport;
pub mod utils;
