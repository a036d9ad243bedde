//! 0xCB-prefixed opcode table. All 256 slots decode.
//!
//! Layout: bits 0-2 select the operand (B, C, D, E, H, L, (HL), A), bits 3-5
//! select the rotate/shift kind or the bit number, bits 6-7 select the group
//! (rotate/shift, BIT, RES, SET).

use super::alu::ShiftOp;
use super::decode::{fill, DecodeTable};
use super::error::CpuError;
use super::memory::Memory;
use super::{Operand, CPU};

pub fn extended_table<M: Memory>() -> DecodeTable<M> {
    let mut table: DecodeTable<M> = [None; 256];
    fill(&mut table, 0x00..=0x3F, shift);
    fill(&mut table, 0x40..=0x7F, bit);
    fill(&mut table, 0x80..=0xBF, res);
    fill(&mut table, 0xC0..=0xFF, set);
    table
}

/// Register forms cost 8. (HL) forms cost 16, or 12 for BIT, unless memory
/// operand timing is switched off.
fn cost<M: Memory>(cpu: &CPU<M>, operand: Operand, read_only: bool) -> u8 {
    if !(operand.is_memory() && cpu.options.memory_operand_timing) {
        8
    } else if read_only {
        12
    } else {
        16
    }
}

fn shift<M: Memory>(cpu: &mut CPU<M>, opcode: u8) -> Result<u8, CpuError> {
    let operand = Operand::from_bits(opcode);
    let value = cpu.read_operand(operand);
    let result = cpu.shift(ShiftOp::from_bits(opcode >> 3), value);
    cpu.write_operand(operand, result);
    Ok(cost(cpu, operand, false))
}

fn bit<M: Memory>(cpu: &mut CPU<M>, opcode: u8) -> Result<u8, CpuError> {
    let operand = Operand::from_bits(opcode);
    let value = cpu.read_operand(operand);
    cpu.bit((opcode >> 3) & 0b111, value);
    Ok(cost(cpu, operand, true))
}

fn res<M: Memory>(cpu: &mut CPU<M>, opcode: u8) -> Result<u8, CpuError> {
    let operand = Operand::from_bits(opcode);
    let mask = 1 << ((opcode >> 3) & 0b111);
    let value = cpu.read_operand(operand);
    cpu.write_operand(operand, value & !mask);
    Ok(cost(cpu, operand, false))
}

fn set<M: Memory>(cpu: &mut CPU<M>, opcode: u8) -> Result<u8, CpuError> {
    let operand = Operand::from_bits(opcode);
    let mask = 1 << ((opcode >> 3) & 0b111);
    let value = cpu.read_operand(operand);
    cpu.write_operand(operand, value | mask);
    Ok(cost(cpu, operand, false))
}
