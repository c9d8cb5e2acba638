//! Instruction names for the `cpu-logging` trace output.
#![allow(dead_code)]

/// The mnemonic for a base-table opcode.
pub fn get_assembly_from_opcode(opcode: u8) -> &'static str {
    match opcode {
        0x00 => "NOP",
        0x01 | 0x11 | 0x21 | 0x31 => "LD rr,d16",
        0x02 | 0x12 | 0x22 | 0x32 => "LD (rr),A",
        0x03 | 0x13 | 0x23 | 0x33 => "INC rr",
        0x04 | 0x0C | 0x14 | 0x1C | 0x24 | 0x2C | 0x34 | 0x3C => "INC r",
        0x05 | 0x0D | 0x15 | 0x1D | 0x25 | 0x2D | 0x35 | 0x3D => "DEC r",
        0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x36 | 0x3E => "LD r,d8",
        0x07 => "RLCA",
        0x08 => "LD (a16),SP",
        0x09 | 0x19 | 0x29 | 0x39 => "ADD HL,rr",
        0x0A | 0x1A | 0x2A | 0x3A => "LD A,(rr)",
        0x0B | 0x1B | 0x2B | 0x3B => "DEC rr",
        0x0F => "RRCA",
        0x10 => "STOP",
        0x17 => "RLA",
        0x18 => "JR r8",
        0x1F => "RRA",
        0x20 | 0x28 | 0x30 | 0x38 => "JR cc,r8",
        0x27 => "DAA",
        0x2F => "CPL",
        0x37 => "SCF",
        0x3F => "CCF",
        0x76 => "HALT",
        0x40..=0x7F => "LD r,r",
        0x80..=0x8F => "ADD/ADC A,r",
        0x90..=0x9F => "SUB/SBC A,r",
        0xA0..=0xAF => "AND/XOR A,r",
        0xB0..=0xBF => "OR/CP A,r",
        0xC0 | 0xC8 | 0xD0 | 0xD8 => "RET cc",
        0xC1 | 0xD1 | 0xE1 | 0xF1 => "POP rr",
        0xC2 | 0xCA | 0xD2 | 0xDA => "JP cc,a16",
        0xC3 => "JP a16",
        0xC4 | 0xCC | 0xD4 | 0xDC => "CALL cc,a16",
        0xC5 | 0xD5 | 0xE5 | 0xF5 => "PUSH rr",
        0xC6 => "ADD A,d8",
        0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => "RST n",
        0xC9 => "RET",
        0xCB => "PREFIX CB",
        0xCD => "CALL a16",
        0xCE => "ADC A,d8",
        0xD6 => "SUB d8",
        0xD9 => "RETI",
        0xDE => "SBC A,d8",
        0xE0 => "LDH (a8),A",
        0xE2 => "LD (C),A",
        0xE6 => "AND d8",
        0xE8 => "ADD SP,r8",
        0xE9 => "JP (HL)",
        0xEA => "LD (a16),A",
        0xEE => "XOR d8",
        0xF0 => "LDH A,(a8)",
        0xF2 => "LD A,(C)",
        0xF3 => "DI",
        0xF6 => "OR d8",
        0xF8 => "LD HL,SP+r8",
        0xF9 => "LD SP,HL",
        0xFA => "LD A,(a16)",
        0xFB => "EI",
        0xFE => "CP d8",
        _ => "UNDEFINED",
    }
}
