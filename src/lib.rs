//! # ChargeGuard - control plane for the BQ25672 battery charger
//!
//! Drives a BQ25672-class charger IC over I2C: named configuration fields
//! in, bit-packed register transactions out; interrupt flags in, named
//! events out. A flap detector watches for a loose or removed battery and
//! disables charging when the charge status starts bouncing.
//!
//! ## Architecture
//!
//! - `registers`: static field schema and the physical/raw codec
//! - `bus`: the bus port trait, a simulated register file and an I2C adapter
//! - `writer`: validated, masked field writes and read-back
//! - `events`: interrupt flag decoding
//! - `flap`: battery-removal protection
//! - `settings`: persisted field values
//! - `replay`: boot-time restore of persisted values
//! - `history`: bounded event history
//! - `notify`: fan-out of JSON notifications
//! - `controller`: the single control loop and its command handle
//! - `config`: configuration management and validation
//! - `logging`: structured logging and tracing

pub mod bus;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod flap;
pub mod history;
pub mod logging;
pub mod notify;
pub mod registers;
pub mod replay;
pub mod settings;
pub mod writer;

// Re-export commonly used types
pub use config::Config;
pub use controller::{Controller, ControllerHandle};
pub use error::{ChargerError, Result};
pub use writer::ValidatedWriter;
