//! The CPU is the main executor of any ROM's code. It walks a micro-operation
//! program per instruction, spending exactly one M-cycle per `step()` call,
//! and ticks the rest of the system through its `MemoryMapper` after every
//! memory access or idle cycle it performs.

use crate::hardware::cpu::microcode::{decode, MicroOp, INTERRUPT_DISPATCH};
use crate::hardware::cpu::registers::Registers;
use crate::hardware::mmu::MemoryMapper;

#[cfg(test)]
mod tests;

mod alu;
mod execute;
mod instructions;
pub mod microcode;
pub mod registers;

/// The interrupt master enable is a small state machine rather than a flag:
/// `EI` only takes effect after the instruction that follows it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ImeState {
    Disabled,
    WillEnable,
    WillEnable2,
    Enabled,
}

impl ImeState {
    /// Advance the state machine by one step. `Disabled` and `Enabled` are
    /// the two fixed points.
    fn tick(self) -> ImeState {
        match self {
            ImeState::WillEnable => ImeState::WillEnable2,
            ImeState::WillEnable2 => ImeState::Enabled,
            other => other,
        }
    }
}

#[derive(Debug)]
pub struct CPU<M: MemoryMapper> {
    pub cycles_performed: u64,
    pub halted: bool,
    pub mmu: M,
    pub(crate) registers: Registers,
    opcode: u8,
    program: &'static [MicroOp],
    micro_index: usize,
    /// Scratch pair used by multi-byte operands (Z low, W high).
    z: u8,
    w: u8,
    ime: ImeState,
    halt_bug: bool,
    locked_up: bool,
    interrupt_vector: u16,
}

impl<M: MemoryMapper> CPU<M> {
    pub fn new(mmu: M) -> Self {
        let boot_rom_finished = mmu.boot_rom_finished();
        let is_cgb = mmu.model().is_cgb();

        let mut result = CPU {
            cycles_performed: 0,
            halted: false,
            mmu,
            registers: Registers::new(),
            opcode: 0,
            program: &[],
            micro_index: 0,
            z: 0,
            w: 0,
            ime: ImeState::Disabled,
            halt_bug: false,
            locked_up: false,
            interrupt_vector: 0,
        };

        if boot_rom_finished {
            // Set the registers to the state they would have had if we had
            // run the boot ROM.
            result.registers.pc = 0x100;
            if is_cgb {
                result.registers.set_af(0x1180);
                result.registers.set_bc(0x0000);
                result.registers.set_de(0xFF56);
                result.registers.set_hl(0x000D);
            } else {
                result.registers.set_af(0x01B0);
                result.registers.set_bc(0x0013);
                result.registers.set_de(0x00D8);
                result.registers.set_hl(0x014D);
            }
            result.registers.sp = 0xFFFE;
        }

        result
    }

    /// Advance the CPU (and through it, the entire system) by exactly one
    /// M-cycle.
    pub fn step(&mut self) {
        self.cycles_performed += 1;

        // An undefined opcode permanently wedges the CPU; time still passes.
        if self.locked_up {
            self.mmu.do_m_cycle();
            return;
        }

        // A blocking VRAM DMA transfer owns the bus.
        if self.mmu.try_consume_stall() {
            return;
        }

        self.ime = self.ime.tick();

        if self.halted {
            if self.mmu.interrupts().should_check() {
                self.halted = false;
                // HALT resumes with interrupts live even if EI was still
                // counting down when we halted.
                if self.ime != ImeState::Disabled {
                    self.ime = ImeState::Enabled;
                }
            } else {
                self.mmu.do_m_cycle();
                return;
            }
        }

        if self.micro_index >= self.program.len() {
            self.instruction_boundary();
        } else {
            self.execute_micro_op();
        }
    }

    /// Run micro-steps until the current instruction (or interrupt dispatch)
    /// has fully completed. The next call to `step()` will fetch.
    pub fn step_instruction(&mut self) {
        loop {
            self.step();
            if self.instruction_complete() {
                break;
            }
        }
    }

    /// True while no instruction is mid-flight.
    pub fn instruction_complete(&self) -> bool {
        self.micro_index >= self.program.len()
    }

    pub fn is_locked_up(&self) -> bool {
        self.locked_up
    }

    pub fn ime(&self) -> ImeState {
        self.ime
    }

    /// One instruction (or interrupt dispatch) ended; either accept a pending
    /// interrupt or fetch and decode the next opcode. Both consume this
    /// M-cycle.
    fn instruction_boundary(&mut self) {
        if self.ime == ImeState::Enabled {
            if let Some(interrupt) = self.mmu.interrupts().next_pending() {
                log::debug!("Dispatching interrupt: {:?}", interrupt);
                self.mmu.interrupts_mut().acknowledge(interrupt);
                self.ime = ImeState::Disabled;
                self.interrupt_vector = interrupt.vector();
                self.program = INTERRUPT_DISPATCH;
                self.micro_index = 0;
                self.execute_micro_op();
                return;
            }
        }

        self.opcode = self.read_byte_cycle(self.registers.pc);

        #[cfg(feature = "cpu-logging")]
        log::trace!(
            "Executing opcode: {:04X} - name: {:<12} - registers: {}",
            self.opcode,
            crate::hardware::cpu::instructions::get_assembly_from_opcode(self.opcode),
            self.registers,
        );

        if self.halt_bug {
            // The byte after HALT gets executed twice: PC stays put for one fetch.
            self.halt_bug = false;
        } else {
            self.registers.pc = self.registers.pc.wrapping_add(1);
        }

        self.program = decode(self.opcode);
        self.micro_index = 0;
        self.run_trailing_execs();
    }
}
