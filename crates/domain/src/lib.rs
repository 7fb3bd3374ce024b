//! # relayhub-domain
//!
//! Pure domain model for the relayhub home controller.
//!
//! ## Responsibilities
//! - Foundational types: error conventions, timestamps
//! - Define the fixed **Devices** and relay polarity
//! - Define **Timers** (deferred on/off actions, one per device)
//! - Define the **Sensor snapshot** and the water tank lookup table
//! - Define per-user **Settings** with defaults and validation
//! - Define the **Command grammar** (ordered rules, duration and device phrases)
//! - Chat history and the home status context given to the language model
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod time;

pub mod chat;
pub mod command;
pub mod context;
pub mod device;
pub mod sensor;
pub mod settings;
pub mod timer;
