//! Application services: use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod assistant;
pub mod command_interpreter;
pub mod relay_service;
pub mod sensor_watcher;
pub mod settings_service;
pub mod status_service;
pub mod timer_scheduler;
