//! Shunt-current sampling engine.
//!
//! A [`MonitorSystem`] owns one chip driver ([`ina219::Ina219Driver`] or
//! [`ina226::Ina226Driver`]) over an I2C bus capability, streams decoded
//! current samples at a requested cadence, batches them for subscribers,
//! and broadcasts control-state changes.

pub mod bus;
pub mod decode;
pub mod ina219;
pub mod ina226;
pub mod mock_bus;
pub mod monitor_system;
pub mod types;

// Re-export the main types that users need
pub use bus::I2cSenseBus;
pub use ina219::Ina219Driver;
pub use ina226::Ina226Driver;
pub use monitor_system::MonitorSystem;
pub use types::{
    Calibration, CurrentMonitor, CurrentSenseBus, MonitorConfig, MonitorError, MonitorEvent,
    Sample, SamplingState,
};
