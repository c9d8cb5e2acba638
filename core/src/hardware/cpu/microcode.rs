//! Every instruction is a short, fixed micro-operation program. The CPU walks
//! one cycle-consuming step per M-cycle; `Exec`/`CheckCond` steps are free and
//! ride the cycle of the step before them (or the opcode fetch itself for
//! single-cycle instructions). An instruction therefore costs one M-cycle for
//! its fetch plus one per consuming step, which reproduces the LR35902 timing
//! table exactly.

use crate::hardware::cpu::registers::Reg16;

/// An 8-bit location the micro-ops can read or write without a memory cycle.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ByteLoc {
    A,
    B,
    C,
    D,
    E,
    H,
    L,
    /// The flags register; writes discard the low nibble.
    F,
    /// Scratch low byte.
    Z,
    /// Scratch high byte.
    W,
    SpLow,
    SpHigh,
    PcLow,
    PcHigh,
}

/// Address sources for memory micro-ops.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum AddrLoc {
    Bc,
    De,
    Hl,
    /// The 16-bit scratch pair.
    Wz,
    /// 0xFF00 | Z
    HighZ,
    /// 0xFF00 | C
    HighC,
    /// Pre-decrement SP, then use it (stack push).
    SpDec,
    /// Use SP, then post-increment it (stack pop).
    SpInc,
}

/// Pointer adjustment applied after the memory access of the same step.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PostOp {
    None,
    IncHl,
    DecHl,
    IncWz,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Condition {
    NotZero,
    Zero,
    NotCarry,
    Carry,
}

#[derive(Debug, Copy, Clone, PartialEq)]
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

/// The four accumulator rotates that clear the zero flag.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum RotOp {
    Rlc,
    Rrc,
    Rl,
    Rr,
}

/// Register work that takes no M-cycle of its own.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Exec {
    Ld(ByteLoc, ByteLoc),
    Alu(AluOp, ByteLoc),
    IncLoc(ByteLoc),
    DecLoc(ByteLoc),
    RotA(RotOp),
    /// CB operation with a register operand, decoded from the prefixed opcode.
    CbOp,
    /// CB operation applied to the scratch byte for the `(HL)` forms.
    CbOpZ,
    Inc16(Reg16),
    Dec16(Reg16),
    AddHl(Reg16),
    AddSpZ,
    LdHlSpZ,
    LdSpHl,
    JumpWz,
    JumpHl,
    RelJumpZ,
    Rst(u8),
    IrqJump,
    Daa,
    Cpl,
    Scf,
    Ccf,
    Di,
    Ei,
    Halt,
    Stop,
    Reti,
    LockUp,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MicroOp {
    /// Read the byte at PC into the location and advance PC. One M-cycle.
    ReadImm(ByteLoc),
    /// Read memory into the location. One M-cycle.
    Read(AddrLoc, ByteLoc, PostOp),
    /// Write the location out to memory. One M-cycle.
    Write(AddrLoc, ByteLoc, PostOp),
    /// Internal cycle without a memory access.
    Delay,
    /// Read the CB-prefixed opcode at PC and swap in its program. One M-cycle.
    DecodeCb,
    /// Free step, runs in the M-cycle of the step before it.
    Exec(Exec),
    /// Free step; when the condition fails the rest of the program is skipped.
    CheckCond(Condition),
}

/// The 5 M-cycle interrupt acceptance sequence: two idle cycles, push PC,
/// then jump to the latched vector.
pub const INTERRUPT_DISPATCH: &[MicroOp] = &[
    MicroOp::Delay,
    MicroOp::Delay,
    MicroOp::Write(AddrLoc::SpDec, ByteLoc::PcHigh, PostOp::None),
    MicroOp::Write(AddrLoc::SpDec, ByteLoc::PcLow, PostOp::None),
    MicroOp::Delay,
    MicroOp::Exec(Exec::IrqJump),
];

/// Program for CB operations on plain registers (2 M-cycles total).
pub const CB_REGISTER: &[MicroOp] = &[MicroOp::Exec(Exec::CbOp)];
/// Program for CB read-modify-write operations on `(HL)` (4 M-cycles total).
pub const CB_HL_RMW: &[MicroOp] = &[
    MicroOp::Read(AddrLoc::Hl, ByteLoc::Z, PostOp::None),
    MicroOp::Exec(Exec::CbOpZ),
    MicroOp::Write(AddrLoc::Hl, ByteLoc::Z, PostOp::None),
];
/// Program for BIT on `(HL)`, which never writes back (3 M-cycles total).
pub const CB_HL_BIT: &[MicroOp] = &[
    MicroOp::Read(AddrLoc::Hl, ByteLoc::Z, PostOp::None),
    MicroOp::Exec(Exec::CbOpZ),
];

pub fn decode_cb(opcode: u8) -> &'static [MicroOp] {
    let uses_hl = opcode & 0x7 == 0x6;
    let is_bit = (0x40..=0x7F).contains(&opcode);
    match (uses_hl, is_bit) {
        (false, _) => CB_REGISTER,
        (true, false) => CB_HL_RMW,
        (true, true) => CB_HL_BIT,
    }
}

/// The dense decode table for the 256 base opcodes.
pub fn decode(opcode: u8) -> &'static [MicroOp] {
    use AddrLoc::*;
    use AluOp::*;
    use ByteLoc::*;
    use Condition::*;
    use MicroOp::{CheckCond, Read, ReadImm, Write, Delay, DecodeCb};
    use PostOp::IncWz;
    use Reg16::{BC, DE, HL, SP};

    const NONE: PostOp = PostOp::None;

    match opcode {
        0x00 => &[],
        0x01 => &[ReadImm(C), ReadImm(B)],
        0x02 => &[Write(Bc, A, NONE)],
        0x03 => &[Delay, MicroOp::Exec(Exec::Inc16(BC))],
        0x04 => &[MicroOp::Exec(Exec::IncLoc(B))],
        0x05 => &[MicroOp::Exec(Exec::DecLoc(B))],
        0x06 => &[ReadImm(B)],
        0x07 => &[MicroOp::Exec(Exec::RotA(RotOp::Rlc))],
        0x08 => &[ReadImm(Z), ReadImm(W), Write(Wz, SpLow, IncWz), Write(Wz, SpHigh, NONE)],
        0x09 => &[Delay, MicroOp::Exec(Exec::AddHl(BC))],
        0x0A => &[Read(Bc, A, NONE)],
        0x0B => &[Delay, MicroOp::Exec(Exec::Dec16(BC))],
        0x0C => &[MicroOp::Exec(Exec::IncLoc(C))],
        0x0D => &[MicroOp::Exec(Exec::DecLoc(C))],
        0x0E => &[ReadImm(C)],
        0x0F => &[MicroOp::Exec(Exec::RotA(RotOp::Rrc))],
        0x10 => &[MicroOp::Exec(Exec::Stop)],
        0x11 => &[ReadImm(E), ReadImm(D)],
        0x12 => &[Write(De, A, NONE)],
        0x13 => &[Delay, MicroOp::Exec(Exec::Inc16(DE))],
        0x14 => &[MicroOp::Exec(Exec::IncLoc(D))],
        0x15 => &[MicroOp::Exec(Exec::DecLoc(D))],
        0x16 => &[ReadImm(D)],
        0x17 => &[MicroOp::Exec(Exec::RotA(RotOp::Rl))],
        0x18 => &[ReadImm(Z), Delay, MicroOp::Exec(Exec::RelJumpZ)],
        0x19 => &[Delay, MicroOp::Exec(Exec::AddHl(DE))],
        0x1A => &[Read(De, A, NONE)],
        0x1B => &[Delay, MicroOp::Exec(Exec::Dec16(DE))],
        0x1C => &[MicroOp::Exec(Exec::IncLoc(E))],
        0x1D => &[MicroOp::Exec(Exec::DecLoc(E))],
        0x1E => &[ReadImm(E)],
        0x1F => &[MicroOp::Exec(Exec::RotA(RotOp::Rr))],
        0x20 => &[ReadImm(Z), CheckCond(NotZero), Delay, MicroOp::Exec(Exec::RelJumpZ)],
        0x21 => &[ReadImm(L), ReadImm(H)],
        0x22 => &[Write(Hl, A, PostOp::IncHl)],
        0x23 => &[Delay, MicroOp::Exec(Exec::Inc16(HL))],
        0x24 => &[MicroOp::Exec(Exec::IncLoc(H))],
        0x25 => &[MicroOp::Exec(Exec::DecLoc(H))],
        0x26 => &[ReadImm(H)],
        0x27 => &[MicroOp::Exec(Exec::Daa)],
        0x28 => &[ReadImm(Z), CheckCond(Zero), Delay, MicroOp::Exec(Exec::RelJumpZ)],
        0x29 => &[Delay, MicroOp::Exec(Exec::AddHl(HL))],
        0x2A => &[Read(Hl, A, PostOp::IncHl)],
        0x2B => &[Delay, MicroOp::Exec(Exec::Dec16(HL))],
        0x2C => &[MicroOp::Exec(Exec::IncLoc(L))],
        0x2D => &[MicroOp::Exec(Exec::DecLoc(L))],
        0x2E => &[ReadImm(L)],
        0x2F => &[MicroOp::Exec(Exec::Cpl)],
        0x30 => &[ReadImm(Z), CheckCond(NotCarry), Delay, MicroOp::Exec(Exec::RelJumpZ)],
        0x31 => &[ReadImm(SpLow), ReadImm(SpHigh)],
        0x32 => &[Write(Hl, A, PostOp::DecHl)],
        0x33 => &[Delay, MicroOp::Exec(Exec::Inc16(SP))],
        0x34 => &[Read(Hl, Z, NONE), MicroOp::Exec(Exec::IncLoc(Z)), Write(Hl, Z, NONE)],
        0x35 => &[Read(Hl, Z, NONE), MicroOp::Exec(Exec::DecLoc(Z)), Write(Hl, Z, NONE)],
        0x36 => &[ReadImm(Z), Write(Hl, Z, NONE)],
        0x37 => &[MicroOp::Exec(Exec::Scf)],
        0x38 => &[ReadImm(Z), CheckCond(Carry), Delay, MicroOp::Exec(Exec::RelJumpZ)],
        0x39 => &[Delay, MicroOp::Exec(Exec::AddHl(SP))],
        0x3A => &[Read(Hl, A, PostOp::DecHl)],
        0x3B => &[Delay, MicroOp::Exec(Exec::Dec16(SP))],
        0x3C => &[MicroOp::Exec(Exec::IncLoc(A))],
        0x3D => &[MicroOp::Exec(Exec::DecLoc(A))],
        0x3E => &[ReadImm(A)],
        0x3F => &[MicroOp::Exec(Exec::Ccf)],
        // The 8-bit load block.
        0x40 => &[MicroOp::Exec(Exec::Ld(B, B))],
        0x41 => &[MicroOp::Exec(Exec::Ld(B, C))],
        0x42 => &[MicroOp::Exec(Exec::Ld(B, D))],
        0x43 => &[MicroOp::Exec(Exec::Ld(B, E))],
        0x44 => &[MicroOp::Exec(Exec::Ld(B, H))],
        0x45 => &[MicroOp::Exec(Exec::Ld(B, L))],
        0x46 => &[Read(Hl, B, NONE)],
        0x47 => &[MicroOp::Exec(Exec::Ld(B, A))],
        0x48 => &[MicroOp::Exec(Exec::Ld(C, B))],
        0x49 => &[MicroOp::Exec(Exec::Ld(C, C))],
        0x4A => &[MicroOp::Exec(Exec::Ld(C, D))],
        0x4B => &[MicroOp::Exec(Exec::Ld(C, E))],
        0x4C => &[MicroOp::Exec(Exec::Ld(C, H))],
        0x4D => &[MicroOp::Exec(Exec::Ld(C, L))],
        0x4E => &[Read(Hl, C, NONE)],
        0x4F => &[MicroOp::Exec(Exec::Ld(C, A))],
        0x50 => &[MicroOp::Exec(Exec::Ld(D, B))],
        0x51 => &[MicroOp::Exec(Exec::Ld(D, C))],
        0x52 => &[MicroOp::Exec(Exec::Ld(D, D))],
        0x53 => &[MicroOp::Exec(Exec::Ld(D, E))],
        0x54 => &[MicroOp::Exec(Exec::Ld(D, H))],
        0x55 => &[MicroOp::Exec(Exec::Ld(D, L))],
        0x56 => &[Read(Hl, D, NONE)],
        0x57 => &[MicroOp::Exec(Exec::Ld(D, A))],
        0x58 => &[MicroOp::Exec(Exec::Ld(E, B))],
        0x59 => &[MicroOp::Exec(Exec::Ld(E, C))],
        0x5A => &[MicroOp::Exec(Exec::Ld(E, D))],
        0x5B => &[MicroOp::Exec(Exec::Ld(E, E))],
        0x5C => &[MicroOp::Exec(Exec::Ld(E, H))],
        0x5D => &[MicroOp::Exec(Exec::Ld(E, L))],
        0x5E => &[Read(Hl, E, NONE)],
        0x5F => &[MicroOp::Exec(Exec::Ld(E, A))],
        0x60 => &[MicroOp::Exec(Exec::Ld(H, B))],
        0x61 => &[MicroOp::Exec(Exec::Ld(H, C))],
        0x62 => &[MicroOp::Exec(Exec::Ld(H, D))],
        0x63 => &[MicroOp::Exec(Exec::Ld(H, E))],
        0x64 => &[MicroOp::Exec(Exec::Ld(H, H))],
        0x65 => &[MicroOp::Exec(Exec::Ld(H, L))],
        0x66 => &[Read(Hl, H, NONE)],
        0x67 => &[MicroOp::Exec(Exec::Ld(H, A))],
        0x68 => &[MicroOp::Exec(Exec::Ld(L, B))],
        0x69 => &[MicroOp::Exec(Exec::Ld(L, C))],
        0x6A => &[MicroOp::Exec(Exec::Ld(L, D))],
        0x6B => &[MicroOp::Exec(Exec::Ld(L, E))],
        0x6C => &[MicroOp::Exec(Exec::Ld(L, H))],
        0x6D => &[MicroOp::Exec(Exec::Ld(L, L))],
        0x6E => &[Read(Hl, L, NONE)],
        0x6F => &[MicroOp::Exec(Exec::Ld(L, A))],
        0x70 => &[Write(Hl, B, NONE)],
        0x71 => &[Write(Hl, C, NONE)],
        0x72 => &[Write(Hl, D, NONE)],
        0x73 => &[Write(Hl, E, NONE)],
        0x74 => &[Write(Hl, H, NONE)],
        0x75 => &[Write(Hl, L, NONE)],
        0x76 => &[MicroOp::Exec(Exec::Halt)],
        0x77 => &[Write(Hl, A, NONE)],
        0x78 => &[MicroOp::Exec(Exec::Ld(A, B))],
        0x79 => &[MicroOp::Exec(Exec::Ld(A, C))],
        0x7A => &[MicroOp::Exec(Exec::Ld(A, D))],
        0x7B => &[MicroOp::Exec(Exec::Ld(A, E))],
        0x7C => &[MicroOp::Exec(Exec::Ld(A, H))],
        0x7D => &[MicroOp::Exec(Exec::Ld(A, L))],
        0x7E => &[Read(Hl, A, NONE)],
        0x7F => &[MicroOp::Exec(Exec::Ld(A, A))],
        // The 8-bit arithmetic block.
        0x80 => &[MicroOp::Exec(Exec::Alu(Add, B))],
        0x81 => &[MicroOp::Exec(Exec::Alu(Add, C))],
        0x82 => &[MicroOp::Exec(Exec::Alu(Add, D))],
        0x83 => &[MicroOp::Exec(Exec::Alu(Add, E))],
        0x84 => &[MicroOp::Exec(Exec::Alu(Add, H))],
        0x85 => &[MicroOp::Exec(Exec::Alu(Add, L))],
        0x86 => &[Read(Hl, Z, NONE), MicroOp::Exec(Exec::Alu(Add, Z))],
        0x87 => &[MicroOp::Exec(Exec::Alu(Add, A))],
        0x88 => &[MicroOp::Exec(Exec::Alu(Adc, B))],
        0x89 => &[MicroOp::Exec(Exec::Alu(Adc, C))],
        0x8A => &[MicroOp::Exec(Exec::Alu(Adc, D))],
        0x8B => &[MicroOp::Exec(Exec::Alu(Adc, E))],
        0x8C => &[MicroOp::Exec(Exec::Alu(Adc, H))],
        0x8D => &[MicroOp::Exec(Exec::Alu(Adc, L))],
        0x8E => &[Read(Hl, Z, NONE), MicroOp::Exec(Exec::Alu(Adc, Z))],
        0x8F => &[MicroOp::Exec(Exec::Alu(Adc, A))],
        0x90 => &[MicroOp::Exec(Exec::Alu(Sub, B))],
        0x91 => &[MicroOp::Exec(Exec::Alu(Sub, C))],
        0x92 => &[MicroOp::Exec(Exec::Alu(Sub, D))],
        0x93 => &[MicroOp::Exec(Exec::Alu(Sub, E))],
        0x94 => &[MicroOp::Exec(Exec::Alu(Sub, H))],
        0x95 => &[MicroOp::Exec(Exec::Alu(Sub, L))],
        0x96 => &[Read(Hl, Z, NONE), MicroOp::Exec(Exec::Alu(Sub, Z))],
        0x97 => &[MicroOp::Exec(Exec::Alu(Sub, A))],
        0x98 => &[MicroOp::Exec(Exec::Alu(Sbc, B))],
        0x99 => &[MicroOp::Exec(Exec::Alu(Sbc, C))],
        0x9A => &[MicroOp::Exec(Exec::Alu(Sbc, D))],
        0x9B => &[MicroOp::Exec(Exec::Alu(Sbc, E))],
        0x9C => &[MicroOp::Exec(Exec::Alu(Sbc, H))],
        0x9D => &[MicroOp::Exec(Exec::Alu(Sbc, L))],
        0x9E => &[Read(Hl, Z, NONE), MicroOp::Exec(Exec::Alu(Sbc, Z))],
        0x9F => &[MicroOp::Exec(Exec::Alu(Sbc, A))],
        0xA0 => &[MicroOp::Exec(Exec::Alu(And, B))],
        0xA1 => &[MicroOp::Exec(Exec::Alu(And, C))],
        0xA2 => &[MicroOp::Exec(Exec::Alu(And, D))],
        0xA3 => &[MicroOp::Exec(Exec::Alu(And, E))],
        0xA4 => &[MicroOp::Exec(Exec::Alu(And, H))],
        0xA5 => &[MicroOp::Exec(Exec::Alu(And, L))],
        0xA6 => &[Read(Hl, Z, NONE), MicroOp::Exec(Exec::Alu(And, Z))],
        0xA7 => &[MicroOp::Exec(Exec::Alu(And, A))],
        0xA8 => &[MicroOp::Exec(Exec::Alu(Xor, B))],
        0xA9 => &[MicroOp::Exec(Exec::Alu(Xor, C))],
        0xAA => &[MicroOp::Exec(Exec::Alu(Xor, D))],
        0xAB => &[MicroOp::Exec(Exec::Alu(Xor, E))],
        0xAC => &[MicroOp::Exec(Exec::Alu(Xor, H))],
        0xAD => &[MicroOp::Exec(Exec::Alu(Xor, L))],
        0xAE => &[Read(Hl, Z, NONE), MicroOp::Exec(Exec::Alu(Xor, Z))],
        0xAF => &[MicroOp::Exec(Exec::Alu(Xor, A))],
        0xB0 => &[MicroOp::Exec(Exec::Alu(Or, B))],
        0xB1 => &[MicroOp::Exec(Exec::Alu(Or, C))],
        0xB2 => &[MicroOp::Exec(Exec::Alu(Or, D))],
        0xB3 => &[MicroOp::Exec(Exec::Alu(Or, E))],
        0xB4 => &[MicroOp::Exec(Exec::Alu(Or, H))],
        0xB5 => &[MicroOp::Exec(Exec::Alu(Or, L))],
        0xB6 => &[Read(Hl, Z, NONE), MicroOp::Exec(Exec::Alu(Or, Z))],
        0xB7 => &[MicroOp::Exec(Exec::Alu(Or, A))],
        0xB8 => &[MicroOp::Exec(Exec::Alu(Cp, B))],
        0xB9 => &[MicroOp::Exec(Exec::Alu(Cp, C))],
        0xBA => &[MicroOp::Exec(Exec::Alu(Cp, D))],
        0xBB => &[MicroOp::Exec(Exec::Alu(Cp, E))],
        0xBC => &[MicroOp::Exec(Exec::Alu(Cp, H))],
        0xBD => &[MicroOp::Exec(Exec::Alu(Cp, L))],
        0xBE => &[Read(Hl, Z, NONE), MicroOp::Exec(Exec::Alu(Cp, Z))],
        0xBF => &[MicroOp::Exec(Exec::Alu(Cp, A))],
        // Control flow and the remaining odds and ends.
        0xC0 => &[Delay, CheckCond(NotZero), Read(SpInc, Z, NONE), Read(SpInc, W, NONE), Delay, MicroOp::Exec(Exec::JumpWz)],
        0xC1 => &[Read(SpInc, C, NONE), Read(SpInc, B, NONE)],
        0xC2 => &[ReadImm(Z), ReadImm(W), CheckCond(NotZero), Delay, MicroOp::Exec(Exec::JumpWz)],
        0xC3 => &[ReadImm(Z), ReadImm(W), Delay, MicroOp::Exec(Exec::JumpWz)],
        0xC4 => &[
            ReadImm(Z),
            ReadImm(W),
            CheckCond(NotZero),
            Delay,
            Write(SpDec, PcHigh, NONE),
            Write(SpDec, PcLow, NONE),
            MicroOp::Exec(Exec::JumpWz),
        ],
        0xC5 => &[Delay, Write(SpDec, B, NONE), Write(SpDec, C, NONE)],
        0xC6 => &[ReadImm(Z), MicroOp::Exec(Exec::Alu(Add, Z))],
        0xC7 => &[Delay, Write(SpDec, PcHigh, NONE), Write(SpDec, PcLow, NONE), MicroOp::Exec(Exec::Rst(0x00))],
        0xC8 => &[Delay, CheckCond(Zero), Read(SpInc, Z, NONE), Read(SpInc, W, NONE), Delay, MicroOp::Exec(Exec::JumpWz)],
        0xC9 => &[Read(SpInc, Z, NONE), Read(SpInc, W, NONE), Delay, MicroOp::Exec(Exec::JumpWz)],
        0xCA => &[ReadImm(Z), ReadImm(W), CheckCond(Zero), Delay, MicroOp::Exec(Exec::JumpWz)],
        0xCB => &[DecodeCb],
        0xCC => &[
            ReadImm(Z),
            ReadImm(W),
            CheckCond(Zero),
            Delay,
            Write(SpDec, PcHigh, NONE),
            Write(SpDec, PcLow, NONE),
            MicroOp::Exec(Exec::JumpWz),
        ],
        0xCD => &[
            ReadImm(Z),
            ReadImm(W),
            Delay,
            Write(SpDec, PcHigh, NONE),
            Write(SpDec, PcLow, NONE),
            MicroOp::Exec(Exec::JumpWz),
        ],
        0xCE => &[ReadImm(Z), MicroOp::Exec(Exec::Alu(Adc, Z))],
        0xCF => &[Delay, Write(SpDec, PcHigh, NONE), Write(SpDec, PcLow, NONE), MicroOp::Exec(Exec::Rst(0x08))],
        0xD0 => &[Delay, CheckCond(NotCarry), Read(SpInc, Z, NONE), Read(SpInc, W, NONE), Delay, MicroOp::Exec(Exec::JumpWz)],
        0xD1 => &[Read(SpInc, E, NONE), Read(SpInc, D, NONE)],
        0xD2 => &[ReadImm(Z), ReadImm(W), CheckCond(NotCarry), Delay, MicroOp::Exec(Exec::JumpWz)],
        0xD3 => &[MicroOp::Exec(Exec::LockUp)],
        0xD4 => &[
            ReadImm(Z),
            ReadImm(W),
            CheckCond(NotCarry),
            Delay,
            Write(SpDec, PcHigh, NONE),
            Write(SpDec, PcLow, NONE),
            MicroOp::Exec(Exec::JumpWz),
        ],
        0xD5 => &[Delay, Write(SpDec, D, NONE), Write(SpDec, E, NONE)],
        0xD6 => &[ReadImm(Z), MicroOp::Exec(Exec::Alu(Sub, Z))],
        0xD7 => &[Delay, Write(SpDec, PcHigh, NONE), Write(SpDec, PcLow, NONE), MicroOp::Exec(Exec::Rst(0x10))],
        0xD8 => &[Delay, CheckCond(Carry), Read(SpInc, Z, NONE), Read(SpInc, W, NONE), Delay, MicroOp::Exec(Exec::JumpWz)],
        0xD9 => &[Read(SpInc, Z, NONE), Read(SpInc, W, NONE), Delay, MicroOp::Exec(Exec::JumpWz), MicroOp::Exec(Exec::Reti)],
        0xDA => &[ReadImm(Z), ReadImm(W), CheckCond(Carry), Delay, MicroOp::Exec(Exec::JumpWz)],
        0xDB => &[MicroOp::Exec(Exec::LockUp)],
        0xDC => &[
            ReadImm(Z),
            ReadImm(W),
            CheckCond(Carry),
            Delay,
            Write(SpDec, PcHigh, NONE),
            Write(SpDec, PcLow, NONE),
            MicroOp::Exec(Exec::JumpWz),
        ],
        0xDD => &[MicroOp::Exec(Exec::LockUp)],
        0xDE => &[ReadImm(Z), MicroOp::Exec(Exec::Alu(Sbc, Z))],
        0xDF => &[Delay, Write(SpDec, PcHigh, NONE), Write(SpDec, PcLow, NONE), MicroOp::Exec(Exec::Rst(0x18))],
        0xE0 => &[ReadImm(Z), Write(HighZ, A, NONE)],
        0xE1 => &[Read(SpInc, L, NONE), Read(SpInc, H, NONE)],
        0xE2 => &[Write(HighC, A, NONE)],
        0xE3 | 0xE4 => &[MicroOp::Exec(Exec::LockUp)],
        0xE5 => &[Delay, Write(SpDec, H, NONE), Write(SpDec, L, NONE)],
        0xE6 => &[ReadImm(Z), MicroOp::Exec(Exec::Alu(And, Z))],
        0xE7 => &[Delay, Write(SpDec, PcHigh, NONE), Write(SpDec, PcLow, NONE), MicroOp::Exec(Exec::Rst(0x20))],
        0xE8 => &[ReadImm(Z), Delay, Delay, MicroOp::Exec(Exec::AddSpZ)],
        0xE9 => &[MicroOp::Exec(Exec::JumpHl)],
        0xEA => &[ReadImm(Z), ReadImm(W), Write(Wz, A, NONE)],
        0xEB..=0xED => &[MicroOp::Exec(Exec::LockUp)],
        0xEE => &[ReadImm(Z), MicroOp::Exec(Exec::Alu(Xor, Z))],
        0xEF => &[Delay, Write(SpDec, PcHigh, NONE), Write(SpDec, PcLow, NONE), MicroOp::Exec(Exec::Rst(0x28))],
        0xF0 => &[ReadImm(Z), Read(HighZ, A, NONE)],
        0xF1 => &[Read(SpInc, F, NONE), Read(SpInc, A, NONE)],
        0xF2 => &[Read(HighC, A, NONE)],
        0xF3 => &[MicroOp::Exec(Exec::Di)],
        0xF4 => &[MicroOp::Exec(Exec::LockUp)],
        0xF5 => &[Delay, Write(SpDec, A, NONE), Write(SpDec, F, NONE)],
        0xF6 => &[ReadImm(Z), MicroOp::Exec(Exec::Alu(Or, Z))],
        0xF7 => &[Delay, Write(SpDec, PcHigh, NONE), Write(SpDec, PcLow, NONE), MicroOp::Exec(Exec::Rst(0x30))],
        0xF8 => &[ReadImm(Z), Delay, MicroOp::Exec(Exec::LdHlSpZ)],
        0xF9 => &[Delay, MicroOp::Exec(Exec::LdSpHl)],
        0xFA => &[ReadImm(Z), ReadImm(W), Read(Wz, A, NONE)],
        0xFB => &[MicroOp::Exec(Exec::Ei)],
        0xFC | 0xFD => &[MicroOp::Exec(Exec::LockUp)],
        0xFE => &[ReadImm(Z), MicroOp::Exec(Exec::Alu(Cp, Z))],
        0xFF => &[Delay, Write(SpDec, PcHigh, NONE), Write(SpDec, PcLow, NONE), MicroOp::Exec(Exec::Rst(0x38))],
    }
}
