//! Driver for the INA226 current-sense ADC.

use log::{debug, info};

use crate::decode::{decode_shunt_register, swap_bytes};
use crate::types::{Calibration, CurrentMonitor, CurrentSenseBus, MonitorError};

use super::registers::{
    adc_settings_for_interval, AveragingMode, BusConversionTime, OperationMode,
    ShuntConversionTime, REG_CONFIG, REG_SHUNT_VOLTAGE,
};

/// INA226 has 2.5µV LSB step size
const SHUNT_LSB_UV: f64 = 2.5;

pub struct Ina226Driver {
    bus: Box<dyn CurrentSenseBus>,
    calibration: Calibration,
}

impl Ina226Driver {
    pub fn new(bus: Box<dyn CurrentSenseBus>) -> Self {
        Self { bus, calibration: Calibration::default() }
    }

    /// Compose and write the configuration register from its four
    /// independent fields.
    pub fn configure(
        &mut self,
        bus_time: BusConversionTime,
        shunt_time: ShuntConversionTime,
        averaging: AveragingMode,
        mode: OperationMode,
    ) -> Result<(), MonitorError> {
        let word = bus_time as u16 | shunt_time as u16 | averaging as u16 | mode as u16;
        debug!("INA226 CONFIG <- {:#06x}", word);
        self.bus.write_word(REG_CONFIG, swap_bytes(word))
    }
}

impl CurrentMonitor for Ina226Driver {
    fn configure_for_interval(&mut self, interval_ms: u64) -> Result<(), MonitorError> {
        let (shunt_time, averaging) = adc_settings_for_interval(interval_ms);
        // Bus conversions are not used; keep them at the fastest setting.
        self.configure(
            BusConversionTime::Us140,
            shunt_time,
            averaging,
            OperationMode::ShuntContinuous,
        )?;
        info!("INA226 ADC set to {:?} with {:?}", shunt_time, averaging);
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
        "INA226"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_bus::MockBus;

    #[test]
    fn configure_for_interval_writes_composed_config_word() {
        let bus = MockBus::new(vec![]);
        let log = bus.log();
        let mut driver = Ina226Driver::new(Box::new(bus));

        driver.configure_for_interval(32).unwrap();
        // bus 140µs 0x0000 | shunt 1.1ms 0x0200 | 16x avg 0x0400 |
        // shunt continuous 0x0005, byte-swapped for the bus
        assert_eq!(log.writes(), vec![(REG_CONFIG, swap_bytes(0x0605))]);
    }

    #[test]
    fn fastest_interval_uses_single_conversion() {
        let bus = MockBus::new(vec![]);
        let log = bus.log();
        let mut driver = Ina226Driver::new(Box::new(bus));

        driver.configure_for_interval(0).unwrap();
        assert_eq!(log.writes(), vec![(REG_CONFIG, swap_bytes(0x0185))]);
    }

    #[test]
    fn shunt_current_uses_this_chips_lsb() {
        // chip register 0x0064 (100 counts) arrives byte-swapped as 0x6400
        let mut driver = Ina226Driver::new(Box::new(MockBus::new(vec![0x6400])));
        let amps = driver.shunt_current().unwrap();
        // (100 * 2.5µV / 0.1Ω) / 1e6 = 0.0025 A
        assert!((amps - 0.0025).abs() < 1e-12);
    }

    #[test]
    fn shunt_current_decodes_negative_registers() {
        let mut driver = Ina226Driver::new(Box::new(MockBus::new(vec![0x9CFF])));
        let amps = driver.shunt_current().unwrap();
        assert!((amps + 0.0025).abs() < 1e-12);
    }

    #[test]
    fn calibration_partial_update_keeps_prior_values() {
        let mut driver = Ina226Driver::new(Box::new(MockBus::new(vec![])));
        driver.calibrate(None, Some(10)).unwrap();
        let cal = driver.calibration();
        assert_eq!(cal.resistor_ohms, 0.1);
        assert_eq!(cal.calibration_offset, 10);
    }
}
