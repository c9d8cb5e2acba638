use pretty_assertions::assert_eq;

use crate::hardware::cpu::tests::{initial_cpu, TestMemory};
use crate::hardware::cpu::CPU;

/// Run a single instruction and return its M-cycle cost.
fn time_instruction(cpu: &mut CPU<TestMemory>, code: &[u8]) -> u64 {
    cpu.set_code(code);
    let before = cpu.mmu.ticks;
    cpu.step_instruction();
    cpu.mmu.ticks - before
}

#[test]
fn test_basic_instruction_durations() {
    let mut cpu = initial_cpu();

    assert_eq!(time_instruction(&mut cpu, &[0x00]), 1); // NOP
    assert_eq!(time_instruction(&mut cpu, &[0x80]), 1); // ADD A,B
    assert_eq!(time_instruction(&mut cpu, &[0x3E, 0x10]), 2); // LD A,d8
    assert_eq!(time_instruction(&mut cpu, &[0x01, 0x34, 0x12]), 3); // LD BC,d16
    assert_eq!(time_instruction(&mut cpu, &[0x03]), 2); // INC BC
    assert_eq!(time_instruction(&mut cpu, &[0x09]), 2); // ADD HL,BC
    assert_eq!(time_instruction(&mut cpu, &[0x08, 0x00, 0xC0]), 5); // LD (a16),SP
    assert_eq!(time_instruction(&mut cpu, &[0xE8, 0x05]), 4); // ADD SP,e8
    assert_eq!(time_instruction(&mut cpu, &[0xF8, 0x05]), 3); // LD HL,SP+e8
    assert_eq!(time_instruction(&mut cpu, &[0xF9]), 2); // LD SP,HL
}

#[test]
fn test_memory_operand_durations() {
    let mut cpu = initial_cpu();
    cpu.registers.set_hl(0xC000);

    assert_eq!(time_instruction(&mut cpu, &[0x7E]), 2); // LD A,(HL)
    assert_eq!(time_instruction(&mut cpu, &[0x77]), 2); // LD (HL),A
    assert_eq!(time_instruction(&mut cpu, &[0x36, 0x42]), 3); // LD (HL),d8
    assert_eq!(time_instruction(&mut cpu, &[0x34]), 3); // INC (HL)
    assert_eq!(time_instruction(&mut cpu, &[0x86]), 2); // ADD A,(HL)
    assert_eq!(time_instruction(&mut cpu, &[0xEA, 0x00, 0xC0]), 4); // LD (a16),A
    assert_eq!(time_instruction(&mut cpu, &[0xFA, 0x00, 0xC0]), 4); // LD A,(a16)
    assert_eq!(time_instruction(&mut cpu, &[0xE0, 0x80]), 3); // LDH (a8),A
    assert_eq!(time_instruction(&mut cpu, &[0xE2]), 2); // LD (C),A
}

#[test]
fn test_stack_durations() {
    let mut cpu = initial_cpu();
    cpu.registers.sp = 0xC100;

    assert_eq!(time_instruction(&mut cpu, &[0xC5]), 4); // PUSH BC
    assert_eq!(time_instruction(&mut cpu, &[0xC1]), 3); // POP BC
    assert_eq!(time_instruction(&mut cpu, &[0xEF]), 4); // RST 0x28
}

#[test]
fn test_control_flow_durations() {
    // Taken vs not taken paths differ; set the flags explicitly for each.
    let mut cpu = initial_cpu();
    cpu.registers.sp = 0xC100;

    cpu.registers.pc = 0x200;
    assert_eq!(time_instruction(&mut cpu, &[0xC3, 0x00, 0x02]), 4); // JP a16
    assert_eq!(time_instruction(&mut cpu, &[0xE9]), 1); // JP (HL)

    cpu.registers.pc = 0x200;
    assert_eq!(time_instruction(&mut cpu, &[0x18, 0x00]), 3); // JR e8

    cpu.registers.set_zf(false);
    cpu.registers.pc = 0x200;
    assert_eq!(time_instruction(&mut cpu, &[0xCA, 0x00, 0x02]), 3); // JP Z not taken
    cpu.registers.pc = 0x200;
    assert_eq!(time_instruction(&mut cpu, &[0xC2, 0x00, 0x02]), 4); // JP NZ taken
    cpu.registers.pc = 0x200;
    assert_eq!(time_instruction(&mut cpu, &[0x28, 0x00]), 2); // JR Z not taken
    cpu.registers.pc = 0x200;
    assert_eq!(time_instruction(&mut cpu, &[0x20, 0x00]), 3); // JR NZ taken

    cpu.registers.pc = 0x200;
    assert_eq!(time_instruction(&mut cpu, &[0xCD, 0x00, 0x02]), 6); // CALL a16
    assert_eq!(time_instruction(&mut cpu, &[0xC9]), 4); // RET
    assert_eq!(time_instruction(&mut cpu, &[0xD9]), 4); // RETI

    cpu.registers.set_zf(false);
    cpu.registers.pc = 0x200;
    assert_eq!(time_instruction(&mut cpu, &[0xCC, 0x00, 0x02]), 3); // CALL Z not taken
    cpu.registers.pc = 0x200;
    assert_eq!(time_instruction(&mut cpu, &[0xC8]), 2); // RET Z not taken
    cpu.registers.pc = 0x200;
    assert_eq!(time_instruction(&mut cpu, &[0xC0]), 5); // RET NZ taken
}

#[test]
fn test_cb_durations() {
    let mut cpu = initial_cpu();
    cpu.registers.set_hl(0xC000);

    assert_eq!(time_instruction(&mut cpu, &[0xCB, 0x00]), 2); // RLC B
    assert_eq!(time_instruction(&mut cpu, &[0xCB, 0x7F]), 2); // BIT 7,A
    assert_eq!(time_instruction(&mut cpu, &[0xCB, 0x46]), 3); // BIT 0,(HL)
    assert_eq!(time_instruction(&mut cpu, &[0xCB, 0x06]), 4); // RLC (HL)
    assert_eq!(time_instruction(&mut cpu, &[0xCB, 0xC6]), 4); // SET 0,(HL)
}

#[test]
fn test_every_instruction_has_a_cost() {
    // Every defined opcode must consume at least one M-cycle, and none may
    // run away.
    for opcode in 0..=0xFFu8 {
        let mut cpu = initial_cpu();
        cpu.registers.pc = 0x200;
        cpu.registers.sp = 0xC100;
        let cycles = time_instruction(&mut cpu, &[opcode, 0x00, 0x01]);
        assert!((1..=6).contains(&cycles), "opcode {:#04X}: {}", opcode, cycles);
    }
}
