//! Register decode helpers shared by all chip drivers.

/// Exchange the high and low byte of a register word.
///
/// SMBus word transfers put the low byte on the wire first while the sense
/// chips lay their registers out big-endian, so every word crossing the bus
/// arrives byte-swapped (e.g. 0x11FF -> 0xFF11). The same swap is applied
/// before writes for the same reason.
pub fn swap_bytes(word: u16) -> u16 {
    (word << 8) | (word >> 8)
}

/// Decode a byte-order-corrected shunt-voltage register word as a signed
/// 16-bit two's-complement value.
///
/// Earlier firmware masked the negative magnitude to 8 bits, which corrupted
/// readings below -256 counts. This is the corrected full-width decode; the
/// tests below pin the range where the two versions diverged.
pub fn decode_shunt_register(word: u16) -> i32 {
    i32::from(word as i16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_bytes_exchanges_high_and_low() {
        assert_eq!(swap_bytes(0x11FF), 0xFF11);
        assert_eq!(swap_bytes(0xFF11), 0x11FF);
        assert_eq!(swap_bytes(0x0064), 0x6400);
        assert_eq!(swap_bytes(0x0000), 0x0000);
        assert_eq!(swap_bytes(0xFFFF), 0xFFFF);
    }

    #[test]
    fn swap_bytes_round_trips() {
        for word in [0x0001u16, 0x00FF, 0x0100, 0x8000, 0xA55A, 0xFF9C] {
            assert_eq!(swap_bytes(swap_bytes(word)), word);
        }
    }

    #[test]
    fn decodes_positive_values_unchanged() {
        assert_eq!(decode_shunt_register(0x0000), 0);
        assert_eq!(decode_shunt_register(0x0064), 100);
        assert_eq!(decode_shunt_register(0x7FFF), 32767);
    }

    #[test]
    fn decodes_negative_values_full_width() {
        assert_eq!(decode_shunt_register(0xFFFF), -1);
        assert_eq!(decode_shunt_register(0xFF9C), -100);
        assert_eq!(decode_shunt_register(0x8000), -32768);
    }

    #[test]
    fn negative_decode_is_corrected_below_256_counts() {
        // -300 as a 16-bit register is 0xFED4. The old 8-bit mask decoded
        // this as -44; the full-width decode recovers the true magnitude.
        assert_eq!(decode_shunt_register(0xFED4), -300);
        assert_eq!(decode_shunt_register(0xF060), -4000);
    }

    #[test]
    fn decode_round_trips_all_representable_values() {
        for raw in [-32768i32, -4000, -300, -256, -100, -1, 0, 1, 100, 32767] {
            let word = (raw as i16) as u16;
            assert_eq!(decode_shunt_register(word), raw);
        }
    }
}
