use super::memory::Memory;
use super::CPU;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JumpTest {
    NotZero,
    Zero,
    NotCarry,
    Carry,
    Always,
}

impl JumpTest {
    /// Condition encoded in bits 3-4 of the conditional branch opcodes.
    pub fn from_bits(bits: u8) -> JumpTest {
        match bits & 0b11 {
            0 => JumpTest::NotZero,
            1 => JumpTest::Zero,
            2 => JumpTest::NotCarry,
            _ => JumpTest::Carry,
        }
    }
}

impl<M: Memory> CPU<M> {
    pub fn condition(&self, test: JumpTest) -> bool {
        match test {
            JumpTest::NotZero => !self.registers.f.zero,
            JumpTest::Zero => self.registers.f.zero,
            JumpTest::NotCarry => !self.registers.f.carry,
            JumpTest::Carry => self.registers.f.carry,
            JumpTest::Always => true,
        }
    }

    /// High byte goes to SP-1, low byte to SP-2.
    pub fn push(&mut self, value: u16) {
        self.sp = self.sp.wrapping_sub(1);
        self.bus.write_byte(self.sp, (value >> 8) as u8);
        self.sp = self.sp.wrapping_sub(1);
        self.bus.write_byte(self.sp, (value & 0xFF) as u8);
    }

    pub fn pop(&mut self) -> u16 {
        let lsb = self.bus.read_byte(self.sp) as u16;
        self.sp = self.sp.wrapping_add(1);
        let msb = self.bus.read_byte(self.sp) as u16;
        self.sp = self.sp.wrapping_add(1);
        (msb << 8) | lsb
    }

    /// JP [cc],nn. The operand is always consumed. Returns whether the branch
    /// was taken.
    pub fn jump(&mut self, test: JumpTest) -> bool {
        let target = self.fetch_word();
        let taken = self.condition(test);
        if taken {
            self.pc = target;
        }
        taken
    }

    /// JR [cc],e. The offset is relative to the address after the operand.
    pub fn jr(&mut self, test: JumpTest) -> bool {
        let offset = self.fetch_signed();
        let taken = self.condition(test);
        if taken {
            self.pc = self.pc.wrapping_add(offset as i16 as u16);
        }
        taken
    }

    /// CALL [cc],nn. Pushes the address of the next instruction.
    pub fn call(&mut self, test: JumpTest) -> bool {
        let target = self.fetch_word();
        let taken = self.condition(test);
        if taken {
            self.push(self.pc);
            self.pc = target;
        }
        taken
    }

    pub fn return_(&mut self, test: JumpTest) -> bool {
        let taken = self.condition(test);
        if taken {
            self.pc = self.pop();
        }
        taken
    }

    /// RST to one of the eight fixed vectors 0x00, 0x08, ..., 0x38.
    pub fn rst(&mut self, vector: u8) {
        self.push(self.pc);
        self.pc = (vector & 0x38) as u16;
    }
}
