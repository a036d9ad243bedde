//! Arithmetic and flag computation.
//!
//! Every operation reads its left operand from the register file where the
//! hardware does (A, HL, SP, incoming carry), rewrites the flags it owns, and
//! returns the result without storing it. Callers decide where it goes.

use super::memory::Memory;
use super::CPU;

/// ALU operation selected by bits 3-5 of the 0x80-0xBF and 0xC6-0xFE opcodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Xor,
    Or,
    Cp,
}

impl AluOp {
    pub fn from_bits(bits: u8) -> AluOp {
        match bits & 0b111 {
            0 => AluOp::Add,
            1 => AluOp::Adc,
            2 => AluOp::Sub,
            3 => AluOp::Sbc,
            4 => AluOp::And,
            5 => AluOp::Xor,
            6 => AluOp::Or,
            _ => AluOp::Cp,
        }
    }
}

/// Rotate/shift family occupying 0xCB00-0xCB3F.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShiftOp {
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    Swap,
    Srl,
}

impl ShiftOp {
    pub fn from_bits(bits: u8) -> ShiftOp {
        match bits & 0b111 {
            0 => ShiftOp::Rlc,
            1 => ShiftOp::Rrc,
            2 => ShiftOp::Rl,
            3 => ShiftOp::Rr,
            4 => ShiftOp::Sla,
            5 => ShiftOp::Sra,
            6 => ShiftOp::Swap,
            _ => ShiftOp::Srl,
        }
    }
}

impl<M: Memory> CPU<M> {
    /// Apply `op` to A and `value`, storing the result in A (except CP).
    pub fn alu(&mut self, op: AluOp, value: u8) {
        self.registers.a = match op {
            AluOp::Add => self.add(value),
            AluOp::Adc => self.adc(value),
            AluOp::Sub => self.sub(value),
            AluOp::Sbc => self.sbc(value),
            AluOp::And => self.and(value),
            AluOp::Xor => self.xor(value),
            AluOp::Or => self.or(value),
            AluOp::Cp => {
                self.cp(value);
                self.registers.a
            }
        };
    }

    pub fn shift(&mut self, op: ShiftOp, value: u8) -> u8 {
        match op {
            ShiftOp::Rlc => self.rlc(value),
            ShiftOp::Rrc => self.rrc(value),
            ShiftOp::Rl => self.rl(value),
            ShiftOp::Rr => self.rr(value),
            ShiftOp::Sla => self.sla(value),
            ShiftOp::Sra => self.sra(value),
            ShiftOp::Swap => self.swap(value),
            ShiftOp::Srl => self.srl(value),
        }
    }

    // --- 8-bit arithmetic ---

    pub fn add(&mut self, value: u8) -> u8 {
        let a = self.registers.a;
        let (result, carry) = a.overflowing_add(value);
        self.registers.f.zero = result == 0;
        self.registers.f.subtract = false;
        self.registers.f.half_carry = (a & 0xF) + (value & 0xF) > 0xF;
        self.registers.f.carry = carry;
        result
    }

    pub fn adc(&mut self, value: u8) -> u8 {
        let a = self.registers.a;
        let carry_in = self.registers.f.carry as u8;
        let sum = a as u16 + value as u16 + carry_in as u16;
        let result = sum as u8;
        self.registers.f.zero = result == 0;
        self.registers.f.subtract = false;
        self.registers.f.half_carry = (a & 0xF) + (value & 0xF) + carry_in > 0xF;
        self.registers.f.carry = sum > 0xFF;
        result
    }

    pub fn sub(&mut self, value: u8) -> u8 {
        let a = self.registers.a;
        let (result, borrow) = a.overflowing_sub(value);
        self.registers.f.zero = result == 0;
        self.registers.f.subtract = true;
        self.registers.f.half_carry = (a & 0xF) < (value & 0xF);
        self.registers.f.carry = borrow;
        result
    }

    pub fn sbc(&mut self, value: u8) -> u8 {
        let a = self.registers.a;
        let carry_in = self.registers.f.carry as u8;
        let result = a.wrapping_sub(value).wrapping_sub(carry_in);
        self.registers.f.zero = result == 0;
        self.registers.f.subtract = true;
        self.registers.f.half_carry = (a & 0xF) < (value & 0xF) + carry_in;
        self.registers.f.carry = (a as u16) < value as u16 + carry_in as u16;
        result
    }

    /// Same flags as SUB; A is left alone.
    pub fn cp(&mut self, value: u8) {
        self.sub(value);
    }

    pub fn and(&mut self, value: u8) -> u8 {
        let result = self.registers.a & value;
        self.registers.f.zero = result == 0;
        self.registers.f.subtract = false;
        self.registers.f.half_carry = true;
        self.registers.f.carry = false;
        result
    }

    pub fn or(&mut self, value: u8) -> u8 {
        let result = self.registers.a | value;
        self.set_logic_flags(result);
        result
    }

    pub fn xor(&mut self, value: u8) -> u8 {
        let result = self.registers.a ^ value;
        self.set_logic_flags(result);
        result
    }

    fn set_logic_flags(&mut self, result: u8) {
        self.registers.f.zero = result == 0;
        self.registers.f.subtract = false;
        self.registers.f.half_carry = false;
        self.registers.f.carry = false;
    }

    /// Carry is left as it was.
    pub fn inc(&mut self, value: u8) -> u8 {
        let result = value.wrapping_add(1);
        self.registers.f.zero = result == 0;
        self.registers.f.subtract = false;
        self.registers.f.half_carry = value & 0xF == 0xF;
        result
    }

    /// Carry is left as it was.
    pub fn dec(&mut self, value: u8) -> u8 {
        let result = value.wrapping_sub(1);
        self.registers.f.zero = result == 0;
        self.registers.f.subtract = true;
        self.registers.f.half_carry = value & 0xF == 0;
        result
    }

    // --- 16-bit arithmetic ---

    /// ADD HL,rr. Zero is untouched; half carry comes out of bit 11.
    pub fn add_hl(&mut self, value: u16) -> u16 {
        let hl = self.registers.get_hl();
        let (result, carry) = hl.overflowing_add(value);
        self.registers.f.subtract = false;
        self.registers.f.half_carry = (hl & 0xFFF) + (value & 0xFFF) > 0xFFF;
        self.registers.f.carry = carry;
        result
    }

    /// SP + signed offset, shared by ADD SP,e and LD HL,SP+e. Flags come from
    /// the unsigned addition of the low bytes.
    pub fn add_sp_offset(&mut self, offset: i8) -> u16 {
        let sp = self.sp;
        let operand = offset as u8 as u16;
        self.registers.f.zero = false;
        self.registers.f.subtract = false;
        self.registers.f.half_carry = (sp & 0xF) + (operand & 0xF) > 0xF;
        self.registers.f.carry = (sp & 0xFF) + operand > 0xFF;
        sp.wrapping_add(offset as i16 as u16)
    }

    // --- 0xCB rotates and shifts ---

    fn set_shift_flags(&mut self, result: u8, carry: bool) {
        self.registers.f.zero = result == 0;
        self.registers.f.subtract = false;
        self.registers.f.half_carry = false;
        self.registers.f.carry = carry;
    }

    pub fn rlc(&mut self, value: u8) -> u8 {
        let result = value.rotate_left(1);
        self.set_shift_flags(result, value & 0x80 != 0);
        result
    }

    pub fn rrc(&mut self, value: u8) -> u8 {
        let result = value.rotate_right(1);
        self.set_shift_flags(result, value & 0x01 != 0);
        result
    }

    pub fn rl(&mut self, value: u8) -> u8 {
        let result = (value << 1) | self.registers.f.carry as u8;
        self.set_shift_flags(result, value & 0x80 != 0);
        result
    }

    pub fn rr(&mut self, value: u8) -> u8 {
        let result = (value >> 1) | (self.registers.f.carry as u8) << 7;
        self.set_shift_flags(result, value & 0x01 != 0);
        result
    }

    pub fn sla(&mut self, value: u8) -> u8 {
        let result = value << 1;
        self.set_shift_flags(result, value & 0x80 != 0);
        result
    }

    /// Arithmetic shift: bit 7 is kept.
    pub fn sra(&mut self, value: u8) -> u8 {
        let result = (value >> 1) | (value & 0x80);
        self.set_shift_flags(result, value & 0x01 != 0);
        result
    }

    pub fn swap(&mut self, value: u8) -> u8 {
        let result = value.rotate_left(4);
        self.set_shift_flags(result, false);
        result
    }

    pub fn srl(&mut self, value: u8) -> u8 {
        let result = value >> 1;
        self.set_shift_flags(result, value & 0x01 != 0);
        result
    }

    pub fn bit(&mut self, bit: u8, value: u8) {
        self.registers.f.zero = (value >> bit) & 1 == 0;
        self.registers.f.subtract = false;
        self.registers.f.half_carry = true;
    }

    // --- Accumulator rotates (unprefixed, zero always cleared) ---

    pub fn rlca(&mut self) {
        self.registers.a = self.rlc(self.registers.a);
        self.registers.f.zero = false;
    }

    pub fn rrca(&mut self) {
        self.registers.a = self.rrc(self.registers.a);
        self.registers.f.zero = false;
    }

    pub fn rla(&mut self) {
        self.registers.a = self.rl(self.registers.a);
        self.registers.f.zero = false;
    }

    pub fn rra(&mut self) {
        self.registers.a = self.rr(self.registers.a);
        self.registers.f.zero = false;
    }

    // --- Misc ---

    /// Decimal-adjust A after a BCD addition or subtraction.
    ///
    /// After an addition each digit that overflowed (or exceeds 9) gets 6
    /// added to it; after a subtraction only the digits that borrowed get 6
    /// taken away. Carry reports a decimal overflow out of the high digit.
    pub fn daa(&mut self) {
        let a = self.registers.a;
        let flags = self.registers.f;
        let mut correction = 0u8;
        let mut carry = flags.carry;

        if flags.subtract {
            if flags.half_carry {
                correction |= 0x06;
            }
            if flags.carry {
                correction |= 0x60;
            }
            self.registers.a = a.wrapping_sub(correction);
        } else {
            if flags.half_carry || a & 0x0F > 0x09 {
                correction |= 0x06;
            }
            if flags.carry || a > 0x99 {
                correction |= 0x60;
                carry = true;
            }
            self.registers.a = a.wrapping_add(correction);
        }

        self.registers.f.zero = self.registers.a == 0;
        self.registers.f.half_carry = false;
        self.registers.f.carry = carry;
    }

    pub fn cpl(&mut self) {
        self.registers.a = !self.registers.a;
        self.registers.f.subtract = true;
        self.registers.f.half_carry = true;
    }

    pub fn scf(&mut self) {
        self.registers.f.subtract = false;
        self.registers.f.half_carry = false;
        self.registers.f.carry = true;
    }

    pub fn ccf(&mut self) {
        self.registers.f.subtract = false;
        self.registers.f.half_carry = false;
        self.registers.f.carry = !self.registers.f.carry;
    }
}
