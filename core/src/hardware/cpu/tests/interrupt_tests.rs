use pretty_assertions::assert_eq;

use crate::hardware::cpu::tests::{initial_cpu, read_short};
use crate::hardware::cpu::ImeState;
use crate::hardware::mmu::MemoryMapper;
use crate::io::interrupts::InterruptFlags;

#[test]
fn test_interrupt_dispatch_timing_and_state() {
    let mut cpu = initial_cpu();
    cpu.registers.sp = 0xC100;
    cpu.registers.pc = 0x1234;

    // EI, then a NOP so the enable delay has elapsed.
    cpu.set_code(&[0xFB, 0x00]);
    cpu.step_instruction();
    cpu.step_instruction();

    cpu.mmu.interrupts.overwrite_ie(0x04);
    cpu.mmu.interrupts.overwrite_if(0x04);

    let before = cpu.mmu.ticks;
    cpu.step_instruction();

    // 5 M-cycles: 2 idle, 2 pushing PC, 1 jumping.
    assert_eq!(cpu.mmu.ticks - before, 5);
    assert_eq!(cpu.registers.pc, 0x50);
    assert_eq!(read_short(&cpu, 0xC0FE), 0x1236);
    assert_eq!(cpu.ime(), ImeState::Disabled);
    // The dispatched interrupt's IF bit is acknowledged.
    assert!(cpu.mmu.interrupts.interrupt_flag.is_empty());
}

#[test]
fn test_interrupt_priority_is_by_bit_index() {
    let mut cpu = initial_cpu();
    cpu.registers.sp = 0xC100;

    cpu.set_code(&[0xFB, 0x00]);
    cpu.step_instruction();
    cpu.step_instruction();

    cpu.mmu.interrupts.overwrite_ie(0x1F);
    cpu.mmu.interrupts.overwrite_if(0x1A); // LCD, Serial, Joypad

    cpu.step_instruction();
    assert_eq!(cpu.registers.pc, 0x48);
    assert_eq!(cpu.mmu.interrupts.read_if() & 0x1F, 0x18);

    // IME is off inside the handler; nothing else dispatches on its own.
    cpu.step_instruction();
    assert_ne!(cpu.registers.pc, 0x58);
}

#[test]
fn test_masked_interrupts_never_dispatch() {
    let mut cpu = initial_cpu();

    cpu.set_code(&[0xFB, 0x00]);
    cpu.step_instruction();
    cpu.step_instruction();

    cpu.mmu.interrupts.overwrite_ie(0x01);
    cpu.mmu.interrupts.overwrite_if(0x1E);

    for _ in 0..8 {
        cpu.step_instruction();
    }
    // Only NOPs executed, no vector was entered.
    assert_eq!(cpu.registers.pc, 2 + 8);
}

#[test]
fn test_ei_delay() {
    let mut cpu = initial_cpu();
    cpu.registers.sp = 0xC100;
    cpu.mmu.interrupts.overwrite_ie(0x01);
    cpu.mmu.interrupts.overwrite_if(0x01);

    // EI; NOP; NOP
    cpu.set_code(&[0xFB, 0x00, 0x00]);
    cpu.step_instruction();
    assert_eq!(cpu.ime(), ImeState::WillEnable);

    // The instruction after EI still runs uninterrupted.
    cpu.step_instruction();
    assert_eq!(cpu.registers.pc, 2);

    // The following boundary dispatches.
    cpu.step_instruction();
    assert_eq!(cpu.registers.pc, 0x40);
}

#[test]
fn test_di_cancels_pending_enable() {
    let mut cpu = initial_cpu();
    cpu.mmu.interrupts.overwrite_ie(0x01);
    cpu.mmu.interrupts.overwrite_if(0x01);

    // EI; DI; NOP x4
    cpu.set_code(&[0xFB, 0xF3, 0x00, 0x00, 0x00, 0x00]);
    for _ in 0..6 {
        cpu.step_instruction();
    }

    assert_eq!(cpu.ime(), ImeState::Disabled);
    assert_eq!(cpu.registers.pc, 6);
}

#[test]
fn test_reti_enables_immediately() {
    let mut cpu = initial_cpu();
    cpu.registers.sp = 0xC100;
    cpu.mmu.interrupts.overwrite_ie(0x01);
    cpu.mmu.interrupts.overwrite_if(0x01);

    // RETI at 0, return target 0x200.
    cpu.mmu.write_byte(0xC100, 0x00);
    cpu.mmu.write_byte(0xC101, 0x02);
    cpu.set_instruction(0xD9);
    cpu.step_instruction();

    assert_eq!(cpu.ime(), ImeState::Enabled);
    // The very next boundary dispatches.
    cpu.step_instruction();
    assert_eq!(cpu.registers.pc, 0x40);
}

#[test]
fn test_halt_wakes_and_dispatches_with_ime() {
    let mut cpu = initial_cpu();
    cpu.registers.sp = 0xC100;

    cpu.set_code(&[0xFB, 0x00, 0x76]); // EI; NOP; HALT
    cpu.step_instruction();
    cpu.step_instruction();
    cpu.step_instruction();
    assert!(cpu.halted);

    // Idle cycles while halted only tick the bus.
    let before = cpu.mmu.ticks;
    for _ in 0..5 {
        cpu.step();
    }
    assert_eq!(cpu.mmu.ticks - before, 5);
    assert_eq!(cpu.registers.pc, 3);

    cpu.mmu.interrupts.overwrite_ie(0x04);
    cpu.mmu.interrupts.overwrite_if(0x04);
    cpu.step_instruction();

    assert!(!cpu.halted);
    assert_eq!(cpu.registers.pc, 0x50);
    assert_eq!(read_short(&cpu, 0xC0FE), 0x0003);
}

#[test]
fn test_halt_wakes_without_dispatch_when_ime_disabled() {
    let mut cpu = initial_cpu();
    cpu.mmu.interrupts.overwrite_ie(0x04);

    cpu.set_instruction(0x76);
    cpu.step_instruction();
    assert!(cpu.halted);

    cpu.mmu.interrupts.overwrite_if(0x04);
    cpu.step_instruction();

    // Resumes executing after HALT, without jumping to the vector and
    // without clearing IF.
    assert!(!cpu.halted);
    assert_eq!(cpu.registers.pc, 2);
    assert_eq!(cpu.mmu.interrupts.read_if() & 0x1F, 0x04);
}

#[test]
fn test_halt_bug_executes_next_byte_twice() {
    let mut cpu = initial_cpu();
    // Pending and enabled interrupt with IME off arms the halt bug.
    cpu.mmu.interrupts.overwrite_ie(0x04);
    cpu.mmu.interrupts.overwrite_if(0x04);

    // HALT; INC A - the INC executes twice due to the bug.
    cpu.set_code(&[0x76, 0x3C]);
    cpu.step_instruction();
    assert!(!cpu.halted);

    cpu.step_instruction();
    cpu.step_instruction();
    assert_eq!(cpu.registers.a, 2);
    assert_eq!(cpu.registers.pc, 2);
}
