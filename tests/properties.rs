//! Property-based tests for CPU invariants.
//!
//! Each property runs a short hand-assembled program through `step()` and
//! checks that the architectural state comes out as arithmetic says it must.

use gb_core::{Memory, MemoryBus, CPU};
use proptest::prelude::*;

/// Program loaded in RAM so ROM write protection never matters.
const ORIGIN: u16 = 0xC000;

fn setup_cpu(program: &[u8]) -> CPU {
    let mut cpu = CPU::new(MemoryBus::default());
    cpu.bus.load(ORIGIN, program);
    cpu.pc = ORIGIN;
    cpu.sp = 0xFFFE;
    cpu
}

fn bcd(n: u8) -> u8 {
    (n / 10) << 4 | (n % 10)
}

/// 8-bit operand slots in opcode order, without (HL).
const REGISTER_BITS: [u8; 7] = [0, 1, 2, 3, 4, 5, 7];

fn set_register(cpu: &mut CPU, bits: u8, value: u8) {
    match bits {
        0 => cpu.registers.b = value,
        1 => cpu.registers.c = value,
        2 => cpu.registers.d = value,
        3 => cpu.registers.e = value,
        4 => cpu.registers.h = value,
        5 => cpu.registers.l = value,
        _ => cpu.registers.a = value,
    }
}

fn get_register(cpu: &CPU, bits: u8) -> u8 {
    match bits {
        0 => cpu.registers.b,
        1 => cpu.registers.c,
        2 => cpu.registers.d,
        3 => cpu.registers.e,
        4 => cpu.registers.h,
        5 => cpu.registers.l,
        _ => cpu.registers.a,
    }
}

proptest! {
    /// PUSH rr then POP rr restores the pair and SP.
    #[test]
    fn push_pop_round_trip(value in any::<u16>(), sp in 0xC100u16..=0xFFFE) {
        // PUSH DE; POP HL
        let mut cpu = setup_cpu(&[0xD5, 0xE1]);
        cpu.sp = sp;
        cpu.registers.set_de(value);

        cpu.step().unwrap();
        prop_assert_eq!(cpu.sp, sp.wrapping_sub(2));
        cpu.step().unwrap();

        prop_assert_eq!(cpu.registers.get_hl(), value);
        prop_assert_eq!(cpu.sp, sp);
    }

    /// XOR A always leaves A=0 with only Z set.
    #[test]
    fn xor_a_clears_accumulator(a in any::<u8>(), flags in any::<u8>()) {
        let mut cpu = setup_cpu(&[0xAF]);
        cpu.registers.a = a;
        cpu.registers.f = flags.into();

        cpu.step().unwrap();

        prop_assert_eq!(cpu.registers.a, 0);
        prop_assert_eq!(u8::from(cpu.registers.f), 0x80);
    }

    /// RES n then SET n yields r | (1 << n), whatever r held.
    #[test]
    fn res_then_set(value in any::<u8>(), bit in 0u8..8, reg in prop::sample::select(REGISTER_BITS.to_vec())) {
        let res = 0x80 | bit << 3 | reg;
        let set = 0xC0 | bit << 3 | reg;
        let mut cpu = setup_cpu(&[0xCB, res, 0xCB, set]);
        set_register(&mut cpu, reg, value);
        let flags = cpu.registers.f;

        cpu.step().unwrap();
        prop_assert_eq!(get_register(&cpu, reg), value & !(1 << bit));
        cpu.step().unwrap();

        prop_assert_eq!(get_register(&cpu, reg), value | (1 << bit));
        prop_assert_eq!(cpu.registers.f, flags);
    }

    /// BIT n never writes its operand or the carry flag.
    #[test]
    fn bit_leaves_operand_and_carry(value in any::<u8>(), bit in 0u8..8, carry in any::<bool>(), reg in prop::sample::select(REGISTER_BITS.to_vec())) {
        let mut cpu = setup_cpu(&[0xCB, 0x40 | bit << 3 | reg]);
        set_register(&mut cpu, reg, value);
        cpu.registers.f.carry = carry;

        prop_assert_eq!(cpu.step(), Ok(8));

        prop_assert_eq!(get_register(&cpu, reg), value);
        prop_assert_eq!(cpu.registers.f.carry, carry);
        prop_assert_eq!(cpu.registers.f.zero, value & (1 << bit) == 0);
        prop_assert!(cpu.registers.f.half_carry);
    }

    /// BIT n,(HL) leaves memory alone too.
    #[test]
    fn bit_leaves_memory(value in any::<u8>(), bit in 0u8..8) {
        let mut cpu = setup_cpu(&[0xCB, 0x46 | bit << 3]);
        cpu.registers.set_hl(0xD000);
        cpu.bus.write_byte(0xD000, value);

        prop_assert_eq!(cpu.step(), Ok(12));

        prop_assert_eq!(cpu.bus.read_byte(0xD000), value);
    }

    /// Loading a pair through LD rr,nn is seen byte-wise as high:low.
    #[test]
    fn pair_byte_order(value in any::<u16>()) {
        // LD BC,nn; LD DE,nn; LD HL,nn
        let [lo, hi] = value.to_le_bytes();
        let mut cpu = setup_cpu(&[0x01, lo, hi, 0x11, lo, hi, 0x21, lo, hi]);

        for _ in 0..3 {
            cpu.step().unwrap();
        }

        prop_assert_eq!((cpu.registers.b, cpu.registers.c), (hi, lo));
        prop_assert_eq!((cpu.registers.d, cpu.registers.e), (hi, lo));
        prop_assert_eq!((cpu.registers.h, cpu.registers.l), (hi, lo));
        prop_assert_eq!(cpu.registers.get_bc(), value);
    }

    /// JR -2 always lands on itself, wherever it sits.
    #[test]
    fn jr_minus_two_is_a_tight_loop(addr in 0xC000u16..0xFFF0) {
        let mut cpu = setup_cpu(&[]);
        cpu.bus.load(addr, &[0x18, 0xFE]);
        cpu.pc = addr;

        prop_assert_eq!(cpu.step(), Ok(12));
        prop_assert_eq!(cpu.pc, addr);
    }

    /// CALL nn then RET returns just past the CALL with SP restored.
    #[test]
    fn call_ret_round_trip(target in 0xD000u16..0xF000) {
        let mut cpu = setup_cpu(&[0xCD, target as u8, (target >> 8) as u8]);
        cpu.bus.load(target, &[0xC9]);

        prop_assert_eq!(cpu.step(), Ok(24));
        prop_assert_eq!(cpu.pc, target);
        prop_assert_eq!(cpu.step(), Ok(16));

        prop_assert_eq!(cpu.pc, ORIGIN + 3);
        prop_assert_eq!(cpu.sp, 0xFFFE);
    }

    /// ADD then DAA computes the decimal sum of two BCD bytes.
    #[test]
    fn daa_after_add_is_decimal(x in 0u8..100, y in 0u8..100) {
        // ADD A,B; DAA
        let mut cpu = setup_cpu(&[0x80, 0x27]);
        cpu.registers.a = bcd(x);
        cpu.registers.b = bcd(y);

        cpu.step().unwrap();
        cpu.step().unwrap();

        let sum = x as u16 + y as u16;
        prop_assert_eq!(cpu.registers.a, bcd((sum % 100) as u8));
        prop_assert_eq!(cpu.registers.f.carry, sum >= 100);
        prop_assert_eq!(cpu.registers.f.zero, sum % 100 == 0);
    }

    /// SUB then DAA computes the decimal difference, borrow in carry.
    #[test]
    fn daa_after_sub_is_decimal(x in 0u8..100, y in 0u8..100) {
        // SUB B; DAA
        let mut cpu = setup_cpu(&[0x90, 0x27]);
        cpu.registers.a = bcd(x);
        cpu.registers.b = bcd(y);

        cpu.step().unwrap();
        cpu.step().unwrap();

        let diff = (x as i16 - y as i16).rem_euclid(100) as u8;
        prop_assert_eq!(cpu.registers.a, bcd(diff));
        prop_assert_eq!(cpu.registers.f.carry, x < y);
        prop_assert!(cpu.registers.f.subtract);
    }

    /// 8-bit ADD wraps and reports carry exactly when the sum exceeds 0xFF.
    #[test]
    fn add_matches_wide_arithmetic(a in any::<u8>(), b in any::<u8>()) {
        let mut cpu = setup_cpu(&[0xC6, b]);
        cpu.registers.a = a;

        cpu.step().unwrap();

        prop_assert_eq!(cpu.registers.a, a.wrapping_add(b));
        prop_assert_eq!(cpu.registers.f.carry, a as u16 + b as u16 > 0xFF);
        prop_assert_eq!(cpu.registers.f.half_carry, (a & 0xF) + (b & 0xF) > 0xF);
        prop_assert_eq!(cpu.registers.f.zero, a.wrapping_add(b) == 0);
    }
}
