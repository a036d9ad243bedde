const ZERO_FLAG_BYTE_POSITION: u8 = 7;
const SUBTRACT_FLAG_BYTE_POSITION: u8 = 6;
const HALF_CARRY_FLAG_BYTE_POSITION: u8 = 5;
const CARRY_FLAG_BYTE_POSITION: u8 = 4;

/// The F register. Only the upper nibble exists in hardware, so the four
/// flags are stored as booleans and the low nibble always reads back as zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlagsRegister {
    pub zero: bool,
    pub subtract: bool,
    pub half_carry: bool,
    pub carry: bool,
}

impl From<FlagsRegister> for u8 {
    fn from(flag: FlagsRegister) -> u8 {
        (flag.zero as u8) << ZERO_FLAG_BYTE_POSITION
            | (flag.subtract as u8) << SUBTRACT_FLAG_BYTE_POSITION
            | (flag.half_carry as u8) << HALF_CARRY_FLAG_BYTE_POSITION
            | (flag.carry as u8) << CARRY_FLAG_BYTE_POSITION
    }
}

impl From<u8> for FlagsRegister {
    fn from(byte: u8) -> Self {
        FlagsRegister {
            zero: (byte >> ZERO_FLAG_BYTE_POSITION) & 0b1 != 0,
            subtract: (byte >> SUBTRACT_FLAG_BYTE_POSITION) & 0b1 != 0,
            half_carry: (byte >> HALF_CARRY_FLAG_BYTE_POSITION) & 0b1 != 0,
            carry: (byte >> CARRY_FLAG_BYTE_POSITION) & 0b1 != 0,
        }
    }
}

/// Eight-bit register file. Pairs are composed with the first-named
/// register as the high byte (A:F, B:C, D:E, H:L).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Registers {
    pub a: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub f: FlagsRegister,
    pub h: u8,
    pub l: u8,
}

#[inline]
fn compose(high: u8, low: u8) -> u16 {
    (high as u16) << 8 | low as u16
}

#[inline]
fn decompose(value: u16) -> (u8, u8) {
    ((value >> 8) as u8, (value & 0xFF) as u8)
}

impl Registers {
    pub fn get_af(&self) -> u16 {
        compose(self.a, u8::from(self.f))
    }

    pub fn set_af(&mut self, value: u16) {
        let (a, f) = decompose(value);
        self.a = a;
        self.f = FlagsRegister::from(f);
    }

    pub fn get_bc(&self) -> u16 {
        compose(self.b, self.c)
    }

    pub fn set_bc(&mut self, value: u16) {
        (self.b, self.c) = decompose(value);
    }

    pub fn get_de(&self) -> u16 {
        compose(self.d, self.e)
    }

    pub fn set_de(&mut self, value: u16) {
        (self.d, self.e) = decompose(value);
    }

    pub fn get_hl(&self) -> u16 {
        compose(self.h, self.l)
    }

    pub fn set_hl(&mut self, value: u16) {
        (self.h, self.l) = decompose(value);
    }

    pub fn reset(&mut self) {
        *self = Registers::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_use_first_register_as_high_byte() {
        let mut regs = Registers::default();
        regs.b = 0x12;
        regs.c = 0x34;
        regs.d = 0x56;
        regs.e = 0x78;
        regs.h = 0x9A;
        regs.l = 0xBC;
        assert_eq!(regs.get_bc(), 0x1234);
        assert_eq!(regs.get_de(), 0x5678);
        assert_eq!(regs.get_hl(), 0x9ABC);
    }

    #[test]
    fn set_pair_splits_into_halves() {
        let mut regs = Registers::default();
        regs.set_hl(0xBEEF);
        assert_eq!(regs.h, 0xBE);
        assert_eq!(regs.l, 0xEF);
        regs.set_af(0x12FF);
        assert_eq!(regs.a, 0x12);
        // Low nibble of F does not exist.
        assert_eq!(regs.get_af(), 0x12F0);
    }

    #[test]
    fn flags_byte_layout() {
        let f = FlagsRegister {
            zero: true,
            subtract: false,
            half_carry: true,
            carry: false,
        };
        assert_eq!(u8::from(f), 0b1010_0000);
        assert_eq!(
            FlagsRegister::from(0x50),
            FlagsRegister {
                zero: false,
                subtract: true,
                half_carry: false,
                carry: true,
            }
        );
    }

    #[test]
    fn reset_zeroes_everything() {
        let mut regs = Registers::default();
        regs.set_af(0xFFF0);
        regs.set_hl(0x1234);
        regs.reset();
        assert_eq!(regs, Registers::default());
    }
}
