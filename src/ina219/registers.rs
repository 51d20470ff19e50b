//! Register map and configuration-field constants for the INA219 chip.

// Register addresses
pub const REG_CONFIG: u8 = 0x00;
pub const REG_SHUNT_VOLTAGE: u8 = 0x01;
pub const REG_BUS_VOLTAGE: u8 = 0x02;
pub const REG_POWER: u8 = 0x03;
pub const REG_CURRENT: u8 = 0x04;
pub const REG_CALIBRATION: u8 = 0x05;

/// PGA gain field of the configuration register. The fields below occupy
/// disjoint bit ranges, so composing a configuration word by OR and by
/// addition are equivalent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ShuntAdcGain {
    Gain1Range40mV = 0x0000,
    Gain2Range80mV = 0x0800,
    Gain4Range160mV = 0x1000,
    Gain8Range320mV = 0x1800,
}

/// Shunt ADC resolution/averaging field. One conversion at 9 to 12 bits, or
/// 2 to 128 averaged 12-bit conversions; the suffix gives the conversion
/// time from the data sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ShuntAdcSetting {
    Single9Bit84Us = 0x0000,
    Single10Bit148Us = 0x0008,
    Single11Bit276Us = 0x0010,
    Single12Bit532Us = 0x0018,
    Avg2x12Bit1060Us = 0x0048,
    Avg4x12Bit2130Us = 0x0050,
    Avg8x12Bit4260Us = 0x0058,
    Avg16x12Bit8510Us = 0x0060,
    Avg32x12Bit17Ms = 0x0068,
    Avg64x12Bit34Ms = 0x0070,
    Avg128x12Bit69Ms = 0x0078,
}

/// Operating-mode field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum OperationMode {
    PowerDown = 0x0000,
    ShuntTriggered = 0x0001,
    BusTriggered = 0x0002,
    ShuntAndBusTriggered = 0x0003,
    AdcOff = 0x0004,
    ShuntContinuous = 0x0005,
    BusContinuous = 0x0006,
    ShuntAndBusContinuous = 0x0007,
}

/// Best achievable averaging for a requested sampling interval: the most
/// averaged 12-bit setting whose conversion time still fits the interval.
/// Thresholds are inclusive and checked in ascending order.
pub fn adc_setting_for_interval(interval_ms: u64) -> ShuntAdcSetting {
    if interval_ms <= 1 {
        ShuntAdcSetting::Single12Bit532Us
    } else if interval_ms <= 2 {
        ShuntAdcSetting::Avg2x12Bit1060Us
    } else if interval_ms <= 4 {
        ShuntAdcSetting::Avg4x12Bit2130Us
    } else if interval_ms <= 8 {
        ShuntAdcSetting::Avg8x12Bit4260Us
    } else if interval_ms <= 16 {
        ShuntAdcSetting::Avg16x12Bit8510Us
    } else if interval_ms <= 32 {
        ShuntAdcSetting::Avg32x12Bit17Ms
    } else if interval_ms <= 64 {
        ShuntAdcSetting::Avg64x12Bit34Ms
    } else {
        ShuntAdcSetting::Avg128x12Bit69Ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ShuntAdcSetting::*;

    #[test]
    fn interval_thresholds_are_inclusive_ascending() {
        let expected = [
            (0, Single12Bit532Us),
            (1, Single12Bit532Us),
            (2, Avg2x12Bit1060Us),
            (3, Avg4x12Bit2130Us),
            (4, Avg4x12Bit2130Us),
            (5, Avg8x12Bit4260Us),
            (8, Avg8x12Bit4260Us),
            (9, Avg16x12Bit8510Us),
            (16, Avg16x12Bit8510Us),
            (17, Avg32x12Bit17Ms),
            (32, Avg32x12Bit17Ms),
            (33, Avg64x12Bit34Ms),
            (64, Avg64x12Bit34Ms),
            (65, Avg128x12Bit69Ms),
            (1000, Avg128x12Bit69Ms),
        ];
        for (interval, setting) in expected {
            assert_eq!(
                adc_setting_for_interval(interval),
                setting,
                "interval {}ms",
                interval
            );
        }
    }

    #[test]
    fn fields_occupy_disjoint_bit_ranges() {
        let gain = ShuntAdcGain::Gain8Range320mV as u16;
        let adc = Avg128x12Bit69Ms as u16;
        let mode = OperationMode::ShuntAndBusContinuous as u16;
        assert_eq!(gain & adc, 0);
        assert_eq!(gain & mode, 0);
        assert_eq!(adc & mode, 0);
        assert_eq!(gain | adc | mode, gain + adc + mode);
    }
}
