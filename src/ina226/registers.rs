//! Register map and configuration-field constants for the INA226 chip.

// Register addresses
pub const REG_CONFIG: u8 = 0x00;
pub const REG_SHUNT_VOLTAGE: u8 = 0x01;
pub const REG_BUS_VOLTAGE: u8 = 0x02;
pub const REG_POWER: u8 = 0x03;
pub const REG_CURRENT: u8 = 0x04;
pub const REG_CALIBRATION: u8 = 0x05;
pub const REG_MASK_ENABLE: u8 = 0x06;
pub const REG_ALERT_LIMIT: u8 = 0x07;
pub const REG_MANUFACTURER_ID: u8 = 0xFE;
pub const REG_DIE_ID: u8 = 0xFF;

/// Conversion-averaging field. All four configuration fields occupy disjoint
/// bit ranges, so composing the word by OR and by addition are equivalent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum AveragingMode {
    Samples1 = 0x0000,
    Samples4 = 0x0200,
    Samples16 = 0x0400,
    Samples64 = 0x0600,
    Samples128 = 0x0800,
    Samples256 = 0x0A00,
    Samples512 = 0x0C00,
    Samples1024 = 0x0E00,
}

/// Bus-voltage conversion-time field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum BusConversionTime {
    Us140 = 0x0000,
    Us204 = 0x0040,
    Us332 = 0x0080,
    Us588 = 0x00C0,
    Us1100 = 0x0100,
    Us2116 = 0x0140,
    Us4156 = 0x0180,
    Us8244 = 0x01C0,
}

/// Shunt-voltage conversion-time field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ShuntConversionTime {
    Us140 = 0x0000,
    Us204 = 0x0080,
    Us332 = 0x0100,
    Us588 = 0x0180,
    Us1100 = 0x0200,
    Us2116 = 0x0280,
    Us4156 = 0x0300,
    Us8244 = 0x0380,
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

/// Timing for a requested sampling interval. Unlike the INA219's single
/// resolution knob, this chip trades conversion time against averaging
/// count: short intervals stretch the conversion time at 1x averaging,
/// longer intervals drop back to a fast conversion and average 16x or 64x.
/// Thresholds are inclusive and checked in ascending order.
pub fn adc_settings_for_interval(interval_ms: u64) -> (ShuntConversionTime, AveragingMode) {
    if interval_ms <= 1 {
        (ShuntConversionTime::Us588, AveragingMode::Samples1)
    } else if interval_ms <= 2 {
        (ShuntConversionTime::Us1100, AveragingMode::Samples1)
    } else if interval_ms <= 4 {
        (ShuntConversionTime::Us2116, AveragingMode::Samples1)
    } else if interval_ms <= 8 {
        (ShuntConversionTime::Us4156, AveragingMode::Samples1)
    } else if interval_ms <= 16 {
        (ShuntConversionTime::Us8244, AveragingMode::Samples1)
    } else if interval_ms <= 32 {
        (ShuntConversionTime::Us1100, AveragingMode::Samples16)
    } else if interval_ms <= 64 {
        (ShuntConversionTime::Us2116, AveragingMode::Samples16)
    } else if interval_ms <= 128 {
        (ShuntConversionTime::Us1100, AveragingMode::Samples64)
    } else {
        (ShuntConversionTime::Us2116, AveragingMode::Samples64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use AveragingMode::*;
    use ShuntConversionTime::*;

    #[test]
    fn interval_thresholds_are_inclusive_ascending() {
        let expected = [
            (0, Us588, Samples1),
            (1, Us588, Samples1),
            (2, Us1100, Samples1),
            (4, Us2116, Samples1),
            (8, Us4156, Samples1),
            (16, Us8244, Samples1),
            (17, Us1100, Samples16),
            (32, Us1100, Samples16),
            (64, Us2116, Samples16),
            (65, Us1100, Samples64),
            (128, Us1100, Samples64),
            (129, Us2116, Samples64),
            (5000, Us2116, Samples64),
        ];
        for (interval, shunt, avg) in expected {
            assert_eq!(
                adc_settings_for_interval(interval),
                (shunt, avg),
                "interval {}ms",
                interval
            );
        }
    }

    #[test]
    fn fields_occupy_disjoint_bit_ranges() {
        let bus = BusConversionTime::Us8244 as u16;
        let shunt = Us8244 as u16;
        let avg = Samples1024 as u16;
        let mode = OperationMode::ShuntAndBusContinuous as u16;
        assert_eq!(bus & shunt, 0);
        assert_eq!(bus & avg, 0);
        assert_eq!(shunt & avg, 0);
        assert_eq!((bus | shunt | avg) & mode, 0);
        assert_eq!(bus | shunt | avg | mode, bus + shunt + avg + mode);
    }
}
