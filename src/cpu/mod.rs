pub mod alu;
pub mod control;
pub mod decode;
pub mod error;
pub mod extended;
pub mod memory;
pub mod registers;
pub mod timing;

use std::time::Instant;

pub use decode::{DecodeTable, Handler};
pub use error::CpuError;
pub use memory::{Memory, MemoryBus};
pub use registers::{FlagsRegister, Registers};
pub use timing::{Slack, Tick};

use crate::debug;

/// Cost reported by a tick that fetched nothing (halted, stopped, locked).
pub const IDLE_CYCLES: u8 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Running,
    /// HALT executed; waits for the host to call `resume`.
    Halted,
    /// STOP executed; waits for the host to call `resume`.
    Stopped,
    /// A decode error occurred. Only `reset` leaves this state.
    Locked,
}

/// Behaviour switches for the open corners of the instruction set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CpuOptions {
    /// Reject DI/EI with `CpuError::Unimplemented` instead of driving the
    /// interrupt-enable latch.
    pub strict_interrupts: bool,
    /// Charge the hardware cost for 0xCB opcodes on (HL): 16, or 12 for BIT.
    /// When off, every 0xCB opcode costs 8.
    pub memory_operand_timing: bool,
}

impl Default for CpuOptions {
    fn default() -> Self {
        CpuOptions {
            strict_interrupts: false,
            memory_operand_timing: true,
        }
    }
}

/// One-byte operand slot encoded in the low three bits of most opcodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    B,
    C,
    D,
    E,
    H,
    L,
    HL,
    A,
}

impl Operand {
    pub fn from_bits(bits: u8) -> Operand {
        match bits & 0b111 {
            0 => Operand::B,
            1 => Operand::C,
            2 => Operand::D,
            3 => Operand::E,
            4 => Operand::H,
            5 => Operand::L,
            6 => Operand::HL,
            _ => Operand::A,
        }
    }

    pub fn is_memory(self) -> bool {
        self == Operand::HL
    }
}

/// 16-bit operand of LD rr,nn / INC rr / DEC rr / ADD HL,rr.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WordRegister {
    BC,
    DE,
    HL,
    SP,
}

impl WordRegister {
    pub fn from_bits(bits: u8) -> WordRegister {
        match bits & 0b11 {
            0 => WordRegister::BC,
            1 => WordRegister::DE,
            2 => WordRegister::HL,
            _ => WordRegister::SP,
        }
    }
}

/// 16-bit operand of PUSH/POP. AF takes the place of SP.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StackTarget {
    BC,
    DE,
    HL,
    AF,
}

impl StackTarget {
    pub fn from_bits(bits: u8) -> StackTarget {
        match bits & 0b11 {
            0 => StackTarget::BC,
            1 => StackTarget::DE,
            2 => StackTarget::HL,
            _ => StackTarget::AF,
        }
    }
}

pub struct CPU<M: Memory = MemoryBus> {
    pub registers: Registers,
    pub pc: u16,
    pub sp: u16,
    pub bus: M,
    /// Interrupt-enable latch. Nothing services interrupts; EI, DI and RETI
    /// only record the request here.
    pub ime: bool,
    pub state: RunState,
    pub options: CpuOptions,
    /// Address of the first byte of the instruction being executed.
    opcode_address: u16,
    primary: DecodeTable<M>,
    extended: DecodeTable<M>,
}

impl<M: Memory> CPU<M> {
    pub fn new(bus: M) -> Self {
        CPU::with_options(bus, CpuOptions::default())
    }

    pub fn with_options(bus: M, options: CpuOptions) -> Self {
        CPU {
            registers: Registers::default(),
            pc: 0,
            sp: 0,
            bus,
            ime: false,
            state: RunState::Running,
            options,
            opcode_address: 0,
            primary: decode::primary_table(),
            extended: extended::extended_table(),
        }
    }

    /// Zero the register file and reload memory from the ROM image.
    pub fn reset(&mut self) {
        self.registers.reset();
        self.pc = 0;
        self.sp = 0;
        self.ime = false;
        self.state = RunState::Running;
        self.opcode_address = 0;
        self.bus.reset();
    }

    /// Register state the DMG boot ROM leaves behind when it jumps to 0x0100.
    pub fn apply_post_boot_state(&mut self) {
        self.registers.a = 0x01;
        self.registers.f = FlagsRegister::from(0xB0);
        self.registers.set_bc(0x0013);
        self.registers.set_de(0x00D8);
        self.registers.set_hl(0x014D);
        self.sp = 0xFFFE;
        self.pc = 0x0100;
    }

    /// Leave the halted or stopped state. A locked CPU stays locked.
    pub fn resume(&mut self) {
        if matches!(self.state, RunState::Halted | RunState::Stopped) {
            self.state = RunState::Running;
        }
    }

    pub fn primary_table(&self) -> &DecodeTable<M> {
        &self.primary
    }

    pub fn extended_table(&self) -> &DecodeTable<M> {
        &self.extended
    }

    /// Execute one instruction and report how far ahead of (positive) or
    /// behind (negative) real hardware speed the host now is.
    pub fn tick(&mut self) -> Result<Tick, CpuError> {
        let start = Instant::now();
        let cycles = self.step()?;
        let slack = Slack::measure(cycles as u32, start.elapsed());
        Ok(Tick { cycles, slack })
    }

    /// Fetch, decode and execute one instruction. Returns its T-state cost.
    pub fn step(&mut self) -> Result<u8, CpuError> {
        if self.state != RunState::Running {
            return Ok(IDLE_CYCLES);
        }

        self.opcode_address = self.pc;
        if log::log_enabled!(log::Level::Trace) {
            let (text, _) = debug::disasm::disassemble(self.pc, |addr| self.bus.read_byte(addr));
            log::trace!("{:04X}: {:<18} {}", self.pc, text, debug::register_line(self));
        }

        let opcode = self.fetch_byte();
        let result = match self.primary[opcode as usize] {
            Some(handler) => handler(self, opcode),
            None => Err(CpuError::InvalidOpcode {
                opcode,
                address: self.opcode_address,
            }),
        };

        if let Err(ref err) = result {
            self.lock(err);
        }
        result
    }

    fn lock(&mut self, err: &CpuError) {
        log::error!("CPU locked: {} ({})", err, debug::register_line(self));
        self.state = RunState::Locked;
    }

    // --- Fetch helpers ---

    pub(crate) fn fetch_byte(&mut self) -> u8 {
        let byte = self.bus.read_byte(self.pc);
        self.pc = self.pc.wrapping_add(1);
        byte
    }

    pub(crate) fn fetch_word(&mut self) -> u16 {
        let word = self.bus.read_word(self.pc);
        self.pc = self.pc.wrapping_add(2);
        word
    }

    pub(crate) fn fetch_signed(&mut self) -> i8 {
        self.fetch_byte() as i8
    }

    // --- Operand access ---

    pub(crate) fn read_operand(&self, operand: Operand) -> u8 {
        match operand {
            Operand::A => self.registers.a,
            Operand::B => self.registers.b,
            Operand::C => self.registers.c,
            Operand::D => self.registers.d,
            Operand::E => self.registers.e,
            Operand::H => self.registers.h,
            Operand::L => self.registers.l,
            Operand::HL => self.bus.read_byte(self.registers.get_hl()),
        }
    }

    pub(crate) fn write_operand(&mut self, operand: Operand, value: u8) {
        match operand {
            Operand::A => self.registers.a = value,
            Operand::B => self.registers.b = value,
            Operand::C => self.registers.c = value,
            Operand::D => self.registers.d = value,
            Operand::E => self.registers.e = value,
            Operand::H => self.registers.h = value,
            Operand::L => self.registers.l = value,
            Operand::HL => {
                let addr = self.registers.get_hl();
                self.bus.write_byte(addr, value);
            }
        }
    }

    pub(crate) fn read_word_register(&self, target: WordRegister) -> u16 {
        match target {
            WordRegister::BC => self.registers.get_bc(),
            WordRegister::DE => self.registers.get_de(),
            WordRegister::HL => self.registers.get_hl(),
            WordRegister::SP => self.sp,
        }
    }

    pub(crate) fn write_word_register(&mut self, target: WordRegister, value: u16) {
        match target {
            WordRegister::BC => self.registers.set_bc(value),
            WordRegister::DE => self.registers.set_de(value),
            WordRegister::HL => self.registers.set_hl(value),
            WordRegister::SP => self.sp = value,
        }
    }
}

impl Default for CPU<MemoryBus> {
    fn default() -> Self {
        CPU::new(MemoryBus::default())
    }
}
