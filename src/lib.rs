// Library exports for tripboard
// This allows integration tests and the binary to share the modules

pub mod access;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod itinerary;
pub mod planner;
pub mod repository;
pub mod routes;
pub mod seed;
pub mod state;
