//! Primary (unprefixed) opcode table.
//!
//! Each slot holds the handler for that opcode, or `None` for the eleven
//! bytes the hardware does not decode. Handlers receive the opcode itself so
//! one function can serve a whole row of the table, pulling its register and
//! condition fields out of the opcode bits. PC already points past the opcode
//! when a handler runs.

use super::alu::AluOp;
use super::control::JumpTest;
use super::error::CpuError;
use super::memory::Memory;
use super::{Operand, RunState, StackTarget, WordRegister, CPU};

pub type Handler<M> = fn(&mut CPU<M>, u8) -> Result<u8, CpuError>;

pub type DecodeTable<M> = [Option<Handler<M>>; 256];

pub const PREFIX: u8 = 0xCB;

/// Opcodes with no instruction behind them.
pub const INVALID_OPCODES: [u8; 11] = [
    0xD3, 0xDB, 0xDD, 0xE3, 0xE4, 0xEB, 0xEC, 0xED, 0xF4, 0xFC, 0xFD,
];

pub(crate) fn fill<M: Memory>(
    table: &mut DecodeTable<M>,
    opcodes: impl IntoIterator<Item = u8>,
    handler: Handler<M>,
) {
    for opcode in opcodes {
        table[opcode as usize] = Some(handler);
    }
}

pub fn primary_table<M: Memory>() -> DecodeTable<M> {
    let mut table: DecodeTable<M> = [None; 256];

    // 0x00-0x3F
    fill(&mut table, [0x00], nop);
    fill(&mut table, [0x01, 0x11, 0x21, 0x31], ld_rr_nn);
    fill(&mut table, [0x02, 0x12, 0x22, 0x32], ld_indirect_a);
    fill(&mut table, [0x0A, 0x1A, 0x2A, 0x3A], ld_a_indirect);
    fill(&mut table, [0x03, 0x13, 0x23, 0x33], inc_rr);
    fill(&mut table, [0x0B, 0x1B, 0x2B, 0x3B], dec_rr);
    fill(&mut table, [0x09, 0x19, 0x29, 0x39], add_hl_rr);
    fill(&mut table, (0..8).map(|r| 0x04 | r << 3), inc_r);
    fill(&mut table, (0..8).map(|r| 0x05 | r << 3), dec_r);
    fill(&mut table, (0..8).map(|r| 0x06 | r << 3), ld_r_n);
    fill(&mut table, [0x07], rlca);
    fill(&mut table, [0x0F], rrca);
    fill(&mut table, [0x17], rla);
    fill(&mut table, [0x1F], rra);
    fill(&mut table, [0x08], ld_nn_sp);
    fill(&mut table, [0x10], stop);
    fill(&mut table, [0x18], jr);
    fill(&mut table, [0x20, 0x28, 0x30, 0x38], jr_cc);
    fill(&mut table, [0x27], daa);
    fill(&mut table, [0x2F], cpl);
    fill(&mut table, [0x37], scf);
    fill(&mut table, [0x3F], ccf);

    // 0x40-0xBF
    fill(&mut table, 0x40..=0x7F, ld_r_r);
    fill(&mut table, [0x76], halt);
    fill(&mut table, 0x80..=0xBF, alu_r);

    // 0xC0-0xFF
    fill(&mut table, [0xC0, 0xC8, 0xD0, 0xD8], ret_cc);
    fill(&mut table, [0xC9], ret);
    fill(&mut table, [0xD9], reti);
    fill(&mut table, [0xC1, 0xD1, 0xE1, 0xF1], pop);
    fill(&mut table, [0xC5, 0xD5, 0xE5, 0xF5], push);
    fill(&mut table, [0xC2, 0xCA, 0xD2, 0xDA], jp_cc);
    fill(&mut table, [0xC3], jp);
    fill(&mut table, [0xE9], jp_hl);
    fill(&mut table, [0xC4, 0xCC, 0xD4, 0xDC], call_cc);
    fill(&mut table, [0xCD], call);
    fill(&mut table, (0..8).map(|n| 0xC7 | n << 3), rst);
    fill(&mut table, (0..8).map(|op| 0xC6 | op << 3), alu_n);
    fill(&mut table, [PREFIX], prefix);
    fill(&mut table, [0xE0], ldh_n_a);
    fill(&mut table, [0xF0], ldh_a_n);
    fill(&mut table, [0xE2], ldh_c_a);
    fill(&mut table, [0xF2], ldh_a_c);
    fill(&mut table, [0xEA], ld_nn_a);
    fill(&mut table, [0xFA], ld_a_nn);
    fill(&mut table, [0xE8], add_sp_e);
    fill(&mut table, [0xF8], ld_hl_sp_e);
    fill(&mut table, [0xF9], ld_sp_hl);
    fill(&mut table, [0xF3], di);
    fill(&mut table, [0xFB], ei);

    table
}

type Cycles = Result<u8, CpuError>;

// --- Misc / control ---

fn nop<M: Memory>(_cpu: &mut CPU<M>, _opcode: u8) -> Cycles {
    Ok(4)
}

fn stop<M: Memory>(cpu: &mut CPU<M>, _opcode: u8) -> Cycles {
    // Second byte of STOP is ignored.
    cpu.fetch_byte();
    cpu.state = RunState::Stopped;
    log::warn!("STOP at {:#06x}; waiting for resume", cpu.opcode_address);
    Ok(4)
}

fn halt<M: Memory>(cpu: &mut CPU<M>, _opcode: u8) -> Cycles {
    cpu.state = RunState::Halted;
    log::debug!("HALT at {:#06x}; waiting for resume", cpu.opcode_address);
    Ok(4)
}

fn di<M: Memory>(cpu: &mut CPU<M>, _opcode: u8) -> Cycles {
    if cpu.options.strict_interrupts {
        return Err(CpuError::Unimplemented {
            mnemonic: "DI",
            address: cpu.opcode_address,
        });
    }
    cpu.ime = false;
    Ok(4)
}

fn ei<M: Memory>(cpu: &mut CPU<M>, _opcode: u8) -> Cycles {
    if cpu.options.strict_interrupts {
        return Err(CpuError::Unimplemented {
            mnemonic: "EI",
            address: cpu.opcode_address,
        });
    }
    cpu.ime = true;
    Ok(4)
}

fn daa<M: Memory>(cpu: &mut CPU<M>, _opcode: u8) -> Cycles {
    cpu.daa();
    Ok(4)
}

fn cpl<M: Memory>(cpu: &mut CPU<M>, _opcode: u8) -> Cycles {
    cpu.cpl();
    Ok(4)
}

fn scf<M: Memory>(cpu: &mut CPU<M>, _opcode: u8) -> Cycles {
    cpu.scf();
    Ok(4)
}

fn ccf<M: Memory>(cpu: &mut CPU<M>, _opcode: u8) -> Cycles {
    cpu.ccf();
    Ok(4)
}

fn rlca<M: Memory>(cpu: &mut CPU<M>, _opcode: u8) -> Cycles {
    cpu.rlca();
    Ok(4)
}

fn rrca<M: Memory>(cpu: &mut CPU<M>, _opcode: u8) -> Cycles {
    cpu.rrca();
    Ok(4)
}

fn rla<M: Memory>(cpu: &mut CPU<M>, _opcode: u8) -> Cycles {
    cpu.rla();
    Ok(4)
}

fn rra<M: Memory>(cpu: &mut CPU<M>, _opcode: u8) -> Cycles {
    cpu.rra();
    Ok(4)
}

fn prefix<M: Memory>(cpu: &mut CPU<M>, _opcode: u8) -> Cycles {
    let opcode = cpu.fetch_byte();
    match cpu.extended[opcode as usize] {
        Some(handler) => handler(cpu, opcode),
        None => Err(CpuError::InvalidExtendedOpcode {
            opcode,
            address: cpu.opcode_address,
        }),
    }
}

// --- 8-bit loads ---

/// LD r,r'. LD r,r is a 4-cycle no-op.
fn ld_r_r<M: Memory>(cpu: &mut CPU<M>, opcode: u8) -> Cycles {
    let target = Operand::from_bits(opcode >> 3);
    let source = Operand::from_bits(opcode);
    let value = cpu.read_operand(source);
    cpu.write_operand(target, value);
    Ok(if target.is_memory() || source.is_memory() { 8 } else { 4 })
}

fn ld_r_n<M: Memory>(cpu: &mut CPU<M>, opcode: u8) -> Cycles {
    let target = Operand::from_bits(opcode >> 3);
    let value = cpu.fetch_byte();
    cpu.write_operand(target, value);
    Ok(if target.is_memory() { 12 } else { 8 })
}

/// Address for LD (BC)/(DE)/(HL+)/(HL-), stepping HL where required.
fn indirect_address<M: Memory>(cpu: &mut CPU<M>, opcode: u8) -> u16 {
    match opcode >> 4 {
        0 => cpu.registers.get_bc(),
        1 => cpu.registers.get_de(),
        2 => {
            let hl = cpu.registers.get_hl();
            cpu.registers.set_hl(hl.wrapping_add(1));
            hl
        }
        _ => {
            let hl = cpu.registers.get_hl();
            cpu.registers.set_hl(hl.wrapping_sub(1));
            hl
        }
    }
}

fn ld_indirect_a<M: Memory>(cpu: &mut CPU<M>, opcode: u8) -> Cycles {
    let addr = indirect_address(cpu, opcode);
    cpu.bus.write_byte(addr, cpu.registers.a);
    Ok(8)
}

fn ld_a_indirect<M: Memory>(cpu: &mut CPU<M>, opcode: u8) -> Cycles {
    let addr = indirect_address(cpu, opcode);
    cpu.registers.a = cpu.bus.read_byte(addr);
    Ok(8)
}

fn ldh_n_a<M: Memory>(cpu: &mut CPU<M>, _opcode: u8) -> Cycles {
    let addr = 0xFF00 | cpu.fetch_byte() as u16;
    cpu.bus.write_byte(addr, cpu.registers.a);
    Ok(12)
}

fn ldh_a_n<M: Memory>(cpu: &mut CPU<M>, _opcode: u8) -> Cycles {
    let addr = 0xFF00 | cpu.fetch_byte() as u16;
    cpu.registers.a = cpu.bus.read_byte(addr);
    Ok(12)
}

fn ldh_c_a<M: Memory>(cpu: &mut CPU<M>, _opcode: u8) -> Cycles {
    let addr = 0xFF00 | cpu.registers.c as u16;
    cpu.bus.write_byte(addr, cpu.registers.a);
    Ok(8)
}

fn ldh_a_c<M: Memory>(cpu: &mut CPU<M>, _opcode: u8) -> Cycles {
    let addr = 0xFF00 | cpu.registers.c as u16;
    cpu.registers.a = cpu.bus.read_byte(addr);
    Ok(8)
}

fn ld_nn_a<M: Memory>(cpu: &mut CPU<M>, _opcode: u8) -> Cycles {
    let addr = cpu.fetch_word();
    cpu.bus.write_byte(addr, cpu.registers.a);
    Ok(16)
}

fn ld_a_nn<M: Memory>(cpu: &mut CPU<M>, _opcode: u8) -> Cycles {
    let addr = cpu.fetch_word();
    cpu.registers.a = cpu.bus.read_byte(addr);
    Ok(16)
}

// --- 16-bit loads ---

fn ld_rr_nn<M: Memory>(cpu: &mut CPU<M>, opcode: u8) -> Cycles {
    let value = cpu.fetch_word();
    cpu.write_word_register(WordRegister::from_bits(opcode >> 4), value);
    Ok(12)
}

fn ld_nn_sp<M: Memory>(cpu: &mut CPU<M>, _opcode: u8) -> Cycles {
    let addr = cpu.fetch_word();
    cpu.bus.write_word(addr, cpu.sp);
    Ok(20)
}

fn ld_sp_hl<M: Memory>(cpu: &mut CPU<M>, _opcode: u8) -> Cycles {
    cpu.sp = cpu.registers.get_hl();
    Ok(8)
}

fn ld_hl_sp_e<M: Memory>(cpu: &mut CPU<M>, _opcode: u8) -> Cycles {
    let offset = cpu.fetch_signed();
    let value = cpu.add_sp_offset(offset);
    cpu.registers.set_hl(value);
    Ok(12)
}

fn push<M: Memory>(cpu: &mut CPU<M>, opcode: u8) -> Cycles {
    let value = match StackTarget::from_bits(opcode >> 4) {
        StackTarget::BC => cpu.registers.get_bc(),
        StackTarget::DE => cpu.registers.get_de(),
        StackTarget::HL => cpu.registers.get_hl(),
        StackTarget::AF => cpu.registers.get_af(),
    };
    cpu.push(value);
    Ok(16)
}

fn pop<M: Memory>(cpu: &mut CPU<M>, opcode: u8) -> Cycles {
    let value = cpu.pop();
    match StackTarget::from_bits(opcode >> 4) {
        StackTarget::BC => cpu.registers.set_bc(value),
        StackTarget::DE => cpu.registers.set_de(value),
        StackTarget::HL => cpu.registers.set_hl(value),
        StackTarget::AF => cpu.registers.set_af(value),
    }
    Ok(12)
}

// --- Arithmetic ---

fn alu_r<M: Memory>(cpu: &mut CPU<M>, opcode: u8) -> Cycles {
    let source = Operand::from_bits(opcode);
    let value = cpu.read_operand(source);
    cpu.alu(AluOp::from_bits(opcode >> 3), value);
    Ok(if source.is_memory() { 8 } else { 4 })
}

fn alu_n<M: Memory>(cpu: &mut CPU<M>, opcode: u8) -> Cycles {
    let value = cpu.fetch_byte();
    cpu.alu(AluOp::from_bits(opcode >> 3), value);
    Ok(8)
}

fn inc_r<M: Memory>(cpu: &mut CPU<M>, opcode: u8) -> Cycles {
    let target = Operand::from_bits(opcode >> 3);
    let value = cpu.read_operand(target);
    let result = cpu.inc(value);
    cpu.write_operand(target, result);
    Ok(if target.is_memory() { 12 } else { 4 })
}

fn dec_r<M: Memory>(cpu: &mut CPU<M>, opcode: u8) -> Cycles {
    let target = Operand::from_bits(opcode >> 3);
    let value = cpu.read_operand(target);
    let result = cpu.dec(value);
    cpu.write_operand(target, result);
    Ok(if target.is_memory() { 12 } else { 4 })
}

fn inc_rr<M: Memory>(cpu: &mut CPU<M>, opcode: u8) -> Cycles {
    let target = WordRegister::from_bits(opcode >> 4);
    let value = cpu.read_word_register(target).wrapping_add(1);
    cpu.write_word_register(target, value);
    Ok(8)
}

fn dec_rr<M: Memory>(cpu: &mut CPU<M>, opcode: u8) -> Cycles {
    let target = WordRegister::from_bits(opcode >> 4);
    let value = cpu.read_word_register(target).wrapping_sub(1);
    cpu.write_word_register(target, value);
    Ok(8)
}

fn add_hl_rr<M: Memory>(cpu: &mut CPU<M>, opcode: u8) -> Cycles {
    let value = cpu.read_word_register(WordRegister::from_bits(opcode >> 4));
    let result = cpu.add_hl(value);
    cpu.registers.set_hl(result);
    Ok(8)
}

fn add_sp_e<M: Memory>(cpu: &mut CPU<M>, _opcode: u8) -> Cycles {
    let offset = cpu.fetch_signed();
    cpu.sp = cpu.add_sp_offset(offset);
    Ok(16)
}

// --- Jumps, calls, returns ---

fn jr<M: Memory>(cpu: &mut CPU<M>, _opcode: u8) -> Cycles {
    cpu.jr(JumpTest::Always);
    Ok(12)
}

fn jr_cc<M: Memory>(cpu: &mut CPU<M>, opcode: u8) -> Cycles {
    let taken = cpu.jr(JumpTest::from_bits(opcode >> 3));
    Ok(if taken { 12 } else { 8 })
}

fn jp<M: Memory>(cpu: &mut CPU<M>, _opcode: u8) -> Cycles {
    cpu.jump(JumpTest::Always);
    Ok(16)
}

fn jp_cc<M: Memory>(cpu: &mut CPU<M>, opcode: u8) -> Cycles {
    let taken = cpu.jump(JumpTest::from_bits(opcode >> 3));
    Ok(if taken { 16 } else { 12 })
}

fn jp_hl<M: Memory>(cpu: &mut CPU<M>, _opcode: u8) -> Cycles {
    cpu.pc = cpu.registers.get_hl();
    Ok(4)
}

fn call<M: Memory>(cpu: &mut CPU<M>, _opcode: u8) -> Cycles {
    cpu.call(JumpTest::Always);
    Ok(24)
}

fn call_cc<M: Memory>(cpu: &mut CPU<M>, opcode: u8) -> Cycles {
    let taken = cpu.call(JumpTest::from_bits(opcode >> 3));
    Ok(if taken { 24 } else { 12 })
}

fn ret<M: Memory>(cpu: &mut CPU<M>, _opcode: u8) -> Cycles {
    cpu.return_(JumpTest::Always);
    Ok(16)
}

fn ret_cc<M: Memory>(cpu: &mut CPU<M>, opcode: u8) -> Cycles {
    let taken = cpu.return_(JumpTest::from_bits(opcode >> 3));
    Ok(if taken { 20 } else { 8 })
}

fn reti<M: Memory>(cpu: &mut CPU<M>, _opcode: u8) -> Cycles {
    cpu.return_(JumpTest::Always);
    cpu.ime = true;
    Ok(16)
}

fn rst<M: Memory>(cpu: &mut CPU<M>, opcode: u8) -> Cycles {
    cpu.rst(opcode & 0x38);
    Ok(16)
}
