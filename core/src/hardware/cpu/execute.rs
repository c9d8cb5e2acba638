//! The micro-operation interpreter: one cycle-consuming step per call, with
//! any free `Exec`/`CheckCond` steps behind it executed in the same M-cycle.

use crate::hardware::cpu::microcode::{
    decode_cb, AddrLoc, ByteLoc, Condition, Exec, MicroOp, PostOp,
};
use crate::hardware::cpu::registers::Reg16;
use crate::hardware::cpu::{ImeState, CPU};
use crate::hardware::mmu::MemoryMapper;

impl<M: MemoryMapper> CPU<M> {
    /// Execute the next cycle-consuming micro-op of the current program.
    pub(super) fn execute_micro_op(&mut self) {
        let op = self.program[self.micro_index];
        self.micro_index += 1;

        match op {
            MicroOp::ReadImm(loc) => {
                let value = self.read_byte_cycle(self.registers.pc);
                self.registers.pc = self.registers.pc.wrapping_add(1);
                self.set_loc(loc, value);
            }
            MicroOp::Read(addr, loc, post) => {
                let address = self.resolve_address(addr);
                let value = self.read_byte_cycle(address);
                self.set_loc(loc, value);
                self.apply_post_op(post);
            }
            MicroOp::Write(addr, loc, post) => {
                let address = self.resolve_address(addr);
                let value = self.get_loc(loc);
                self.write_byte_cycle(address, value);
                self.apply_post_op(post);
            }
            MicroOp::Delay => self.mmu.do_m_cycle(),
            MicroOp::DecodeCb => {
                let cb_opcode = self.read_byte_cycle(self.registers.pc);
                self.registers.pc = self.registers.pc.wrapping_add(1);
                self.opcode = cb_opcode;
                self.program = decode_cb(cb_opcode);
                self.micro_index = 0;
            }
            // Free steps only ever run via `run_trailing_execs`.
            MicroOp::Exec(_) | MicroOp::CheckCond(_) => {
                unreachable!("Free micro-op scheduled as a cycle")
            }
        }

        self.run_trailing_execs();
    }

    /// Run all free steps directly behind the program cursor, in the current
    /// M-cycle. A failed condition abandons the rest of the program, which is
    /// how the short durations of untaken jumps fall out.
    pub(super) fn run_trailing_execs(&mut self) {
        while self.micro_index < self.program.len() {
            match self.program[self.micro_index] {
                MicroOp::Exec(exec) => {
                    self.micro_index += 1;
                    self.execute_exec(exec);
                }
                MicroOp::CheckCond(condition) => {
                    self.micro_index += 1;
                    if !self.condition_met(condition) {
                        self.micro_index = self.program.len();
                    }
                }
                _ => break,
            }
        }
    }

    fn execute_exec(&mut self, exec: Exec) {
        match exec {
            Exec::Ld(destination, source) => {
                let value = self.get_loc(source);
                self.set_loc(destination, value);
            }
            Exec::Alu(op, source) => {
                let value = self.get_loc(source);
                self.alu_accumulator(op, value);
            }
            Exec::IncLoc(loc) => {
                let value = self.get_loc(loc);
                let new_value = self.alu_inc(value);
                self.set_loc(loc, new_value);
            }
            Exec::DecLoc(loc) => {
                let value = self.get_loc(loc);
                let new_value = self.alu_dec(value);
                self.set_loc(loc, new_value);
            }
            Exec::RotA(op) => self.rotate_accumulator(op),
            Exec::CbOp => self.execute_cb_register(),
            Exec::CbOpZ => {
                if let Some(result) = self.apply_cb_op(self.opcode, self.z) {
                    self.z = result;
                }
            }
            Exec::Inc16(reg) => {
                let value = self.read_reg16(reg).wrapping_add(1);
                self.write_reg16(reg, value);
            }
            Exec::Dec16(reg) => {
                let value = self.read_reg16(reg).wrapping_sub(1);
                self.write_reg16(reg, value);
            }
            Exec::AddHl(reg) => self.alu_add_hl(self.read_reg16(reg)),
            Exec::AddSpZ => {
                self.registers.sp = self.signed_offset_add(self.registers.sp);
            }
            Exec::LdHlSpZ => {
                let result = self.signed_offset_add(self.registers.sp);
                self.registers.set_hl(result);
            }
            Exec::LdSpHl => self.registers.sp = self.registers.hl(),
            Exec::JumpWz => self.registers.pc = self.wz(),
            Exec::JumpHl => self.registers.pc = self.registers.hl(),
            Exec::RelJumpZ => {
                self.registers.pc = self.registers.pc.wrapping_add(self.z as i8 as u16);
            }
            Exec::Rst(vector) => self.registers.pc = vector as u16,
            Exec::IrqJump => self.registers.pc = self.interrupt_vector,
            Exec::Daa => self.alu_daa(),
            Exec::Cpl => {
                self.registers.a = !self.registers.a;
                self.registers.set_n(true);
                self.registers.set_h(true);
            }
            Exec::Scf => {
                self.registers.set_n(false);
                self.registers.set_h(false);
                self.registers.set_cf(true);
            }
            Exec::Ccf => {
                self.registers.set_n(false);
                self.registers.set_h(false);
                self.registers.toggle_cf();
            }
            Exec::Di => self.ime = ImeState::Disabled,
            Exec::Ei => {
                if self.ime == ImeState::Disabled {
                    self.ime = ImeState::WillEnable;
                }
            }
            Exec::Halt => {
                if self.ime == ImeState::Disabled && self.mmu.interrupts().should_check() {
                    // The infamous halt bug: we never halt, and the byte
                    // after HALT is executed twice.
                    self.halt_bug = true;
                } else {
                    self.halted = true;
                }
            }
            Exec::Stop => {
                if self.mmu.speed_switch_requested() {
                    self.mmu.toggle_speed();
                } else {
                    log::debug!("STOP executed without a speed switch armed");
                }
                // STOP is encoded as 0x10 0x00, skip the padding byte.
                self.registers.pc = self.registers.pc.wrapping_add(1);
            }
            Exec::Reti => self.ime = ImeState::Enabled,
            Exec::LockUp => {
                log::warn!("Undefined opcode 0x{:02X} executed, locking up", self.opcode);
                self.locked_up = true;
            }
        }
    }

    fn condition_met(&self, condition: Condition) -> bool {
        match condition {
            Condition::NotZero => !self.registers.zf(),
            Condition::Zero => self.registers.zf(),
            Condition::NotCarry => !self.registers.cf(),
            Condition::Carry => self.registers.cf(),
        }
    }

    pub(super) fn wz(&self) -> u16 {
        ((self.w as u16) << 8) | self.z as u16
    }

    fn set_wz(&mut self, value: u16) {
        self.w = (value >> 8) as u8;
        self.z = value as u8;
    }

    pub(super) fn get_loc(&self, loc: ByteLoc) -> u8 {
        match loc {
            ByteLoc::A => self.registers.a,
            ByteLoc::B => self.registers.b,
            ByteLoc::C => self.registers.c,
            ByteLoc::D => self.registers.d,
            ByteLoc::E => self.registers.e,
            ByteLoc::H => self.registers.h,
            ByteLoc::L => self.registers.l,
            ByteLoc::F => self.registers.f(),
            ByteLoc::Z => self.z,
            ByteLoc::W => self.w,
            ByteLoc::SpLow => self.registers.sp as u8,
            ByteLoc::SpHigh => (self.registers.sp >> 8) as u8,
            ByteLoc::PcLow => self.registers.pc as u8,
            ByteLoc::PcHigh => (self.registers.pc >> 8) as u8,
        }
    }

    pub(super) fn set_loc(&mut self, loc: ByteLoc, value: u8) {
        match loc {
            ByteLoc::A => self.registers.a = value,
            ByteLoc::B => self.registers.b = value,
            ByteLoc::C => self.registers.c = value,
            ByteLoc::D => self.registers.d = value,
            ByteLoc::E => self.registers.e = value,
            ByteLoc::H => self.registers.h = value,
            ByteLoc::L => self.registers.l = value,
            ByteLoc::F => self.registers.set_f(value),
            ByteLoc::Z => self.z = value,
            ByteLoc::W => self.w = value,
            ByteLoc::SpLow => {
                self.registers.sp = (self.registers.sp & 0xFF00) | value as u16;
            }
            ByteLoc::SpHigh => {
                self.registers.sp = (self.registers.sp & 0x00FF) | ((value as u16) << 8);
            }
            ByteLoc::PcLow => {
                self.registers.pc = (self.registers.pc & 0xFF00) | value as u16;
            }
            ByteLoc::PcHigh => {
                self.registers.pc = (self.registers.pc & 0x00FF) | ((value as u16) << 8);
            }
        }
    }

    fn resolve_address(&mut self, addr: AddrLoc) -> u16 {
        match addr {
            AddrLoc::Bc => self.registers.bc(),
            AddrLoc::De => self.registers.de(),
            AddrLoc::Hl => self.registers.hl(),
            AddrLoc::Wz => self.wz(),
            AddrLoc::HighZ => 0xFF00 | self.z as u16,
            AddrLoc::HighC => 0xFF00 | self.registers.c as u16,
            AddrLoc::SpDec => {
                self.registers.sp = self.registers.sp.wrapping_sub(1);
                self.registers.sp
            }
            AddrLoc::SpInc => {
                let address = self.registers.sp;
                self.registers.sp = self.registers.sp.wrapping_add(1);
                address
            }
        }
    }

    fn apply_post_op(&mut self, post: PostOp) {
        match post {
            PostOp::None => {}
            PostOp::IncHl => {
                let hl = self.registers.hl().wrapping_add(1);
                self.registers.set_hl(hl);
            }
            PostOp::DecHl => {
                let hl = self.registers.hl().wrapping_sub(1);
                self.registers.set_hl(hl);
            }
            PostOp::IncWz => {
                let wz = self.wz().wrapping_add(1);
                self.set_wz(wz);
            }
        }
    }

    fn read_reg16(&self, reg: Reg16) -> u16 {
        match reg {
            Reg16::AF => self.registers.af(),
            Reg16::BC => self.registers.bc(),
            Reg16::DE => self.registers.de(),
            Reg16::HL => self.registers.hl(),
            Reg16::SP => self.registers.sp,
        }
    }

    fn write_reg16(&mut self, reg: Reg16, value: u16) {
        match reg {
            Reg16::AF => self.registers.set_af(value),
            Reg16::BC => self.registers.set_bc(value),
            Reg16::DE => self.registers.set_de(value),
            Reg16::HL => self.registers.set_hl(value),
            Reg16::SP => self.registers.sp = value,
        }
    }

    /// Read a byte from the bus. The peripheral tick for this M-cycle happens
    /// after the access, so the value read is from before this cycle's DMA,
    /// PPU and timer work.
    pub(super) fn read_byte_cycle(&mut self, address: u16) -> u8 {
        let value = self.mmu.read_byte(address);
        self.mmu.do_m_cycle();
        value
    }

    /// Write a byte to the bus, then tick the peripherals for this M-cycle.
    pub(super) fn write_byte_cycle(&mut self, address: u16, value: u8) {
        self.mmu.write_byte(address, value);
        self.mmu.do_m_cycle();
    }
}
