pub mod disasm;

use crate::cpu::{Memory, CPU};

/// One-line register dump used by trace and error logging.
pub fn register_line<M: Memory>(cpu: &CPU<M>) -> String {
    let f = &cpu.registers.f;
    format!(
        "AF={:04X} BC={:04X} DE={:04X} HL={:04X} SP={:04X} PC={:04X} [{}{}{}{}]",
        cpu.registers.get_af(),
        cpu.registers.get_bc(),
        cpu.registers.get_de(),
        cpu.registers.get_hl(),
        cpu.sp,
        cpu.pc,
        if f.zero { 'Z' } else { '-' },
        if f.subtract { 'N' } else { '-' },
        if f.half_carry { 'H' } else { '-' },
        if f.carry { 'C' } else { '-' },
    )
}
