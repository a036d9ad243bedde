/// Disassemble one instruction at `addr` using `read_fn` for side-effect-free reads.
/// Returns (mnemonic_string, byte_count).
pub fn disassemble<F: Fn(u16) -> u8>(addr: u16, read_fn: F) -> (String, u8) {
    let opcode = read_fn(addr);
    let byte = || read_fn(addr.wrapping_add(1));
    let word = || {
        let lo = read_fn(addr.wrapping_add(1)) as u16;
        let hi = read_fn(addr.wrapping_add(2)) as u16;
        (hi << 8) | lo
    };
    // JR target: relative to the address after the 2-byte instruction.
    let rel = || addr.wrapping_add(2).wrapping_add(byte() as i8 as i16 as u16);

    let r = |bits: u8| R8[(bits & 7) as usize];
    let rr = |bits: u8| R16[((bits >> 4) & 3) as usize];
    let cc = |bits: u8| CONDITIONS[((bits >> 3) & 3) as usize];

    match opcode {
        0xCB => (disassemble_cb(byte()), 2),

        0x00 => ("NOP".into(), 1),
        0x10 => ("STOP".into(), 2),
        0x76 => ("HALT".into(), 1),
        0x07 => ("RLCA".into(), 1),
        0x0F => ("RRCA".into(), 1),
        0x17 => ("RLA".into(), 1),
        0x1F => ("RRA".into(), 1),
        0x27 => ("DAA".into(), 1),
        0x2F => ("CPL".into(), 1),
        0x37 => ("SCF".into(), 1),
        0x3F => ("CCF".into(), 1),
        0xF3 => ("DI".into(), 1),
        0xFB => ("EI".into(), 1),

        0x01 | 0x11 | 0x21 | 0x31 => (format!("LD {},${:04X}", rr(opcode), word()), 3),
        0x02 | 0x12 | 0x22 | 0x32 => (format!("LD {},A", INDIRECT[(opcode >> 4) as usize]), 1),
        0x0A | 0x1A | 0x2A | 0x3A => (format!("LD A,{}", INDIRECT[(opcode >> 4) as usize]), 1),
        0x03 | 0x13 | 0x23 | 0x33 => (format!("INC {}", rr(opcode)), 1),
        0x0B | 0x1B | 0x2B | 0x3B => (format!("DEC {}", rr(opcode)), 1),
        0x09 | 0x19 | 0x29 | 0x39 => (format!("ADD HL,{}", rr(opcode)), 1),
        0x08 => (format!("LD (${:04X}),SP", word()), 3),

        op if op & 0xC7 == 0x04 => (format!("INC {}", r(op >> 3)), 1),
        op if op & 0xC7 == 0x05 => (format!("DEC {}", r(op >> 3)), 1),
        op if op & 0xC7 == 0x06 => (format!("LD {},${:02X}", r(op >> 3), byte()), 2),

        0x18 => (format!("JR ${:04X}", rel()), 2),
        0x20 | 0x28 | 0x30 | 0x38 => (format!("JR {},${:04X}", cc(opcode), rel()), 2),

        0x40..=0x7F => (format!("LD {},{}", r(opcode >> 3), r(opcode)), 1),
        0x80..=0xBF => (format!("{}{}", ALU[((opcode >> 3) & 7) as usize], r(opcode)), 1),
        op if op & 0xC7 == 0xC6 => (format!("{}${:02X}", ALU[((op >> 3) & 7) as usize], byte()), 2),

        0xC0 | 0xC8 | 0xD0 | 0xD8 => (format!("RET {}", cc(opcode)), 1),
        0xC9 => ("RET".into(), 1),
        0xD9 => ("RETI".into(), 1),
        0xC1 | 0xD1 | 0xE1 | 0xF1 => (format!("POP {}", STACK[((opcode >> 4) & 3) as usize]), 1),
        0xC5 | 0xD5 | 0xE5 | 0xF5 => (format!("PUSH {}", STACK[((opcode >> 4) & 3) as usize]), 1),
        0xC2 | 0xCA | 0xD2 | 0xDA => (format!("JP {},${:04X}", cc(opcode), word()), 3),
        0xC3 => (format!("JP ${:04X}", word()), 3),
        0xE9 => ("JP HL".into(), 1),
        0xC4 | 0xCC | 0xD4 | 0xDC => (format!("CALL {},${:04X}", cc(opcode), word()), 3),
        0xCD => (format!("CALL ${:04X}", word()), 3),
        op if op & 0xC7 == 0xC7 => (format!("RST ${:02X}", op & 0x38), 1),

        0xE0 => (format!("LDH ($FF{:02X}),A", byte()), 2),
        0xF0 => (format!("LDH A,($FF{:02X})", byte()), 2),
        0xE2 => ("LD ($FF00+C),A".into(), 1),
        0xF2 => ("LD A,($FF00+C)".into(), 1),
        0xEA => (format!("LD (${:04X}),A", word()), 3),
        0xFA => (format!("LD A,(${:04X})", word()), 3),
        0xE8 => (format!("ADD SP,{}", byte() as i8), 2),
        0xF8 => (format!("LD HL,SP{:+}", byte() as i8), 2),
        0xF9 => ("LD SP,HL".into(), 1),

        _ => (format!("DB ${:02X}", opcode), 1),
    }
}

const R8: [&str; 8] = ["B", "C", "D", "E", "H", "L", "(HL)", "A"];
const R16: [&str; 4] = ["BC", "DE", "HL", "SP"];
const STACK: [&str; 4] = ["BC", "DE", "HL", "AF"];
const INDIRECT: [&str; 4] = ["(BC)", "(DE)", "(HL+)", "(HL-)"];
const CONDITIONS: [&str; 4] = ["NZ", "Z", "NC", "C"];
const ALU: [&str; 8] = ["ADD A,", "ADC A,", "SUB ", "SBC A,", "AND ", "XOR ", "OR ", "CP "];
const SHIFTS: [&str; 8] = ["RLC", "RRC", "RL", "RR", "SLA", "SRA", "SWAP", "SRL"];

fn disassemble_cb(cb: u8) -> String {
    let target = R8[(cb & 7) as usize];
    let bit = (cb >> 3) & 7;
    match cb >> 6 {
        0 => format!("{} {}", SHIFTS[bit as usize], target),
        1 => format!("BIT {},{}", bit, target),
        2 => format!("RES {},{}", bit, target),
        _ => format!("SET {},{}", bit, target),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dis(bytes: &[u8]) -> (String, u8) {
        disassemble(0x0100, |addr| {
            bytes.get((addr - 0x0100) as usize).copied().unwrap_or(0)
        })
    }

    #[test]
    fn immediates_and_lengths() {
        assert_eq!(dis(&[0x31, 0xFE, 0xFF]), ("LD SP,$FFFE".to_string(), 3));
        assert_eq!(dis(&[0x3E, 0x42]), ("LD A,$42".to_string(), 2));
        assert_eq!(dis(&[0x36, 0x07]), ("LD (HL),$07".to_string(), 2));
        assert_eq!(dis(&[0xFE, 0x90]), ("CP $90".to_string(), 2));
        assert_eq!(dis(&[0xF8, 0xFE]), ("LD HL,SP-2".to_string(), 2));
    }

    #[test]
    fn register_rows() {
        assert_eq!(dis(&[0x78]).0, "LD A,B");
        assert_eq!(dis(&[0x76]).0, "HALT");
        assert_eq!(dis(&[0xAF]).0, "XOR A");
        assert_eq!(dis(&[0x8E]).0, "ADC A,(HL)");
        assert_eq!(dis(&[0x34]).0, "INC (HL)");
        assert_eq!(dis(&[0xF5]).0, "PUSH AF");
        assert_eq!(dis(&[0xFF]).0, "RST $38");
    }

    #[test]
    fn relative_jump_shows_target() {
        assert_eq!(dis(&[0x18, 0xFE]).0, "JR $0100");
        assert_eq!(dis(&[0x20, 0x05]).0, "JR NZ,$0107");
    }

    #[test]
    fn prefixed() {
        assert_eq!(dis(&[0xCB, 0x7C]), ("BIT 7,H".to_string(), 2));
        assert_eq!(dis(&[0xCB, 0x37]).0, "SWAP A");
        assert_eq!(dis(&[0xCB, 0x86]).0, "RES 0,(HL)");
        assert_eq!(dis(&[0xCB, 0xFF]).0, "SET 7,A");
    }

    #[test]
    fn invalid_bytes_render_as_data() {
        assert_eq!(dis(&[0xD3]), ("DB $D3".to_string(), 1));
    }
}
