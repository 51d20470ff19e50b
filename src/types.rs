//! Common types and traits for the shunt-current sampling engine.

use std::time::Instant;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Monotonic epoch for sample capture times. Capture times are only used for
/// relative ordering and interval measurement, never as wall-clock time.
static CAPTURE_EPOCH: Lazy<Instant> = Lazy::new(Instant::now);

/// Configuration for a monitor instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// I2C bus number the sense chip is attached to
    #[serde(default = "default_i2c_bus")]
    pub i2c_bus: u8,
    /// I2C slave address of the sense chip
    #[serde(default = "default_address")]
    pub address: u16,
    /// How often the sample buffer is flushed to subscribers, in milliseconds
    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,
    /// Cadence of the slow one-shot sampler, in milliseconds
    #[serde(default = "default_periodic_interval_ms")]
    pub periodic_interval_ms: u64,
}

fn default_i2c_bus() -> u8 { 1 }
fn default_address() -> u16 { 0x40 }
fn default_flush_interval_ms() -> u64 { 10 }
fn default_periodic_interval_ms() -> u64 { 250 }

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            i2c_bus: default_i2c_bus(),
            address: default_address(),
            flush_interval_ms: default_flush_interval_ms(),
            periodic_interval_ms: default_periodic_interval_ms(),
        }
    }
}

/// One current measurement in amperes, stamped with a monotonic capture time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub seconds: u64,
    pub nanos: u32,
    pub value: f64,
}

impl Sample {
    /// Create a sample stamped with the current monotonic time.
    pub fn captured_now(value: f64) -> Self {
        let elapsed = CAPTURE_EPOCH.elapsed();
        Self {
            seconds: elapsed.as_secs(),
            nanos: elapsed.subsec_nanos(),
            value,
        }
    }
}

/// Snapshot of the monitor's control state, broadcast on every
/// start/stop/calibrate and handed to newly connected subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingState {
    pub sampling: bool,
    pub resistor_ohms: f64,
    pub calibration_offset: i64,
}

/// Events broadcast to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum MonitorEvent {
    /// Control-state change (start/stop/calibrate)
    SamplingState(SamplingState),
    /// Ordered batch of buffered samples, one per flush
    Samples(Vec<Sample>),
    /// One-shot reading from the slow periodic sampler
    PeriodicSample(f64),
}

/// Errors that can occur in the sampling engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MonitorError {
    /// I2C transport failure, propagated unchanged and never retried
    #[error("bus error: {0}")]
    Bus(String),
    /// Invalid setting, rejected before any register write
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl From<rppal::i2c::Error> for MonitorError {
    fn from(err: rppal::i2c::Error) -> Self {
        MonitorError::Bus(err.to_string())
    }
}

/// Word-level access to the sense chip's registers.
///
/// Implementations deliver register words in SMBus order, which is
/// byte-swapped relative to the chip's big-endian register layout; callers
/// correct byte order before interpreting the bits (see [`crate::decode`]).
pub trait CurrentSenseBus: Send {
    fn read_word(&mut self, reg: u8) -> Result<u16, MonitorError>;
    fn write_word(&mut self, reg: u8, value: u16) -> Result<(), MonitorError>;
}

/// Calibration state shared by all chip drivers: shunt resistance and an
/// integer offset added to raw ADC counts before scaling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub resistor_ohms: f64,
    pub calibration_offset: i64,
}

impl Default for Calibration {
    fn default() -> Self {
        // 0.1Ω shunt resistor as default
        Self { resistor_ohms: 0.1, calibration_offset: 0 }
    }
}

impl Calibration {
    /// Partial update: `None` leaves the prior value unchanged. The resistor
    /// value is validated before either field is mutated.
    pub fn update(
        &mut self,
        resistor_ohms: Option<f64>,
        calibration_offset: Option<i64>,
    ) -> Result<(), MonitorError> {
        if let Some(r) = resistor_ohms {
            if !r.is_finite() || r <= 0.0 {
                return Err(MonitorError::Configuration(format!(
                    "resistor value must be a positive number of ohms, got {}",
                    r
                )));
            }
        }
        if let Some(r) = resistor_ohms {
            self.resistor_ohms = r;
        }
        if let Some(o) = calibration_offset {
            self.calibration_offset = o;
        }
        Ok(())
    }

    /// Convert raw shunt-voltage counts to amperes for a chip with the given
    /// LSB step size in microvolts.
    pub fn counts_to_amps(&self, raw: i32, lsb_microvolts: f64) -> f64 {
        ((raw as f64 + self.calibration_offset as f64) * lsb_microvolts / self.resistor_ohms)
            / 1_000_000.0
    }
}

/// Trait that all current-sense chip drivers implement.
///
/// Chip-specific configuration with typed register fields stays on the
/// concrete driver types; this trait covers what the sampling engine needs.
pub trait CurrentMonitor: Send {
    /// Select and write ADC timing settings appropriate to the requested
    /// sampling interval in milliseconds (0 means "as fast as possible").
    fn configure_for_interval(&mut self, interval_ms: u64) -> Result<(), MonitorError>;

    /// One-shot read of the shunt-voltage register, decoded, calibrated and
    /// scaled to amperes. Callable at any time, sampling or not.
    fn shunt_current(&mut self) -> Result<f64, MonitorError>;

    /// Partial calibration update; omitted fields keep their prior value.
    /// Takes effect on the very next read, mid-sampling included.
    fn calibrate(
        &mut self,
        resistor_ohms: Option<f64>,
        calibration_offset: Option<i64>,
    ) -> Result<(), MonitorError>;

    /// Current calibration state.
    fn calibration(&self) -> Calibration;

    /// Chip name for log lines.
    fn chip_name(&self) -> &'static str;
}
