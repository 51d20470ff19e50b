//! Driver for the INA219 current-sense ADC.

use log::{debug, info};

use crate::decode::{decode_shunt_register, swap_bytes};
use crate::types::{Calibration, CurrentMonitor, CurrentSenseBus, MonitorError};

use super::registers::{
    adc_setting_for_interval, OperationMode, ShuntAdcGain, ShuntAdcSetting, REG_CONFIG,
    REG_SHUNT_VOLTAGE,
};

/// INA219 has 10µV LSB step size
const SHUNT_LSB_UV: f64 = 10.0;

pub struct Ina219Driver {
    bus: Box<dyn CurrentSenseBus>,
    calibration: Calibration,
}

impl Ina219Driver {
    pub fn new(bus: Box<dyn CurrentSenseBus>) -> Self {
        Self { bus, calibration: Calibration::default() }
    }

    /// Compose and write the configuration register. The fields occupy
    /// disjoint bit ranges, so OR-ing them yields the full word.
    pub fn configure(
        &mut self,
        gain: ShuntAdcGain,
        adc: ShuntAdcSetting,
        mode: OperationMode,
    ) -> Result<(), MonitorError> {
        let word = gain as u16 | adc as u16 | mode as u16;
        debug!("INA219 CONFIG <- {:#06x}", word);
        self.bus.write_word(REG_CONFIG, swap_bytes(word))
    }
}

impl CurrentMonitor for Ina219Driver {
    fn configure_for_interval(&mut self, interval_ms: u64) -> Result<(), MonitorError> {
        let adc = adc_setting_for_interval(interval_ms);
        // Fixed lowest-range gain; continuous shunt conversions while active.
        self.configure(
            ShuntAdcGain::Gain1Range40mV,
            adc,
            OperationMode::ShuntContinuous,
        )?;
        info!("INA219 ADC set to {:?}", adc);
        Ok(())
    }

    fn shunt_current(&mut self) -> Result<f64, MonitorError> {
        let word = swap_bytes(self.bus.read_word(REG_SHUNT_VOLTAGE)?);
        let raw = decode_shunt_register(word);
        Ok(self.calibration.counts_to_amps(raw, SHUNT_LSB_UV))
    }

    fn calibrate(
        &mut self,
        resistor_ohms: Option<f64>,
        calibration_offset: Option<i64>,
    ) -> Result<(), MonitorError> {
        self.calibration.update(resistor_ohms, calibration_offset)
    }

    fn calibration(&self) -> Calibration {
        self.calibration
    }

    fn chip_name(&self) -> &'static str {
        "INA219"
    }
}
