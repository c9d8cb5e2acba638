//! The top level emulator: owns the CPU (which in turn owns the bus) and
//! drives it one frame at a time.

use crate::errors::EmulatorError;
use crate::hardware::cpu::CPU;
use crate::hardware::mmu::{Memory, MemoryMapper};
use crate::hardware::ppu::palette::DisplayColourConfiguration;
use crate::hardware::ppu::FRAMEBUFFER_SIZE;
use crate::io::interrupts::InterruptFlags;
use crate::io::joypad::InputKey;
use crate::EmulatorOptions;

/// The master clock of the DMG, in T-cycles per second.
pub const DMG_CLOCK_SPEED: u64 = 4_194_304;
/// T-cycles per frame at ~59.73 fps.
pub const CYCLES_PER_FRAME: u64 = 70224;
/// One frame in M-cycles.
pub const M_CYCLES_PER_FRAME: u64 = CYCLES_PER_FRAME / 4;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum GameBoyModel {
    DMG,
    CGB,
}

impl GameBoyModel {
    pub fn is_dmg(self) -> bool {
        self == GameBoyModel::DMG
    }

    pub fn is_cgb(self) -> bool {
        self == GameBoyModel::CGB
    }
}

pub struct GameBoyEmulator {
    cpu: CPU<Memory>,
}

impl GameBoyEmulator {
    pub fn new(rom: &[u8], options: EmulatorOptions) -> Result<Self, EmulatorError> {
        let memory = Memory::new(rom, options)?;
        Ok(GameBoyEmulator {
            cpu: CPU::new(memory),
        })
    }

    /// Run the emulator until the next frame is ready for presentation
    /// (17556 M-cycles of peripheral time; the CPU fits twice as many cycles
    /// into that when in double speed mode).
    pub fn run_to_vblank(&mut self) {
        while !self.cpu.mmu.take_frame() {
            self.cpu.step();
        }
    }

    /// Advance by exactly one M-cycle, for callers that do their own pacing.
    pub fn step_cycle(&mut self) {
        self.cpu.step();
    }

    pub fn emulator_model(&self) -> GameBoyModel {
        self.cpu.mmu.model()
    }

    /// The last fully rendered 160x144 frame, one 0xAARRGGBB word per pixel.
    pub fn frame_buffer(&self) -> &[u32; FRAMEBUFFER_SIZE] {
        self.cpu.mmu.ppu.frame_buffer()
    }

    /// The mono f32 samples produced since the last clear, at 44100Hz.
    pub fn audio_buffer(&self) -> &[f32] {
        self.cpu.mmu.apu.get_audio_buffer()
    }

    pub fn clear_audio_buffer(&mut self) {
        self.cpu.mmu.apu.clear_audio_buffer();
    }

    /// Forward a key state change to the joypad, requesting the joypad
    /// interrupt on fresh presses.
    pub fn handle_input(&mut self, key: InputKey, pressed: bool) {
        if pressed {
            if self.cpu.mmu.joypad_register.press_key(key) {
                self.cpu
                    .mmu
                    .interrupts
                    .insert_interrupt(InterruptFlags::JOYPAD);
            }
        } else {
            self.cpu.mmu.joypad_register.release_key(key);
        }
    }

    /// All serial bytes written by the ROM since the last call.
    pub fn take_serial_output(&mut self) -> Vec<u8> {
        self.cpu.mmu.serial.take_output()
    }

    pub fn serial_output(&self) -> &[u8] {
        self.cpu.mmu.serial.output()
    }

    /// The raw ERAM contents for battery-backed cartridges, to be persisted
    /// by the frontend.
    pub fn battery_ram(&self) -> Option<&[u8]> {
        self.cpu.mmu.cartridge().battery_ram()
    }

    pub fn set_dmg_display_colour(&mut self, colours: DisplayColourConfiguration) {
        self.cpu.mmu.ppu.update_display_colours(colours);
    }

    /// 256x256 render of the active background map, for debug views.
    pub fn render_background_map(&mut self) -> Vec<u32> {
        self.cpu.mmu.ppu.render_background_map()
    }

    /// Full tile set render, for debug views.
    pub fn render_tileset(&mut self) -> Vec<u32> {
        self.cpu.mmu.ppu.render_tileset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EmulatorOptionsBuilder;
    use pretty_assertions::assert_eq;

    /// Build a 32KB NoMBC ROM with the given code at the entry point 0x0100.
    fn rom_with_code(code: &[u8]) -> Vec<u8> {
        let mut rom = vec![0u8; 0x8000];
        rom[0x100..0x100 + code.len()].copy_from_slice(code);
        rom
    }

    fn emulator_with_code(code: &[u8]) -> GameBoyEmulator {
        let rom = rom_with_code(code);
        GameBoyEmulator::new(&rom, EmulatorOptionsBuilder::new().build()).unwrap()
    }

    #[test]
    fn test_post_boot_register_state() {
        let emulator = emulator_with_code(&[]);
        assert_eq!(emulator.cpu.registers.af(), 0x01B0);
        assert_eq!(emulator.cpu.registers.bc(), 0x0013);
        assert_eq!(emulator.cpu.registers.de(), 0x00D8);
        assert_eq!(emulator.cpu.registers.hl(), 0x014D);
        assert_eq!(emulator.cpu.registers.sp, 0xFFFE);
        assert_eq!(emulator.cpu.registers.pc, 0x0100);
    }

    #[test]
    fn test_serial_output_capture() {
        // LD A,0x50; LD (0xFF01),A; LD A,0x81; LD (0xFF02),A; then spin.
        let emulator_code = [
            0x3E, 0x50, 0xEA, 0x01, 0xFF, 0x3E, 0x81, 0xEA, 0x02, 0xFF, 0x18, 0xFE,
        ];
        let mut emulator = emulator_with_code(&emulator_code);

        emulator.run_to_vblank();

        assert_eq!(emulator.take_serial_output(), vec![0x50]);
        assert!(emulator.take_serial_output().is_empty());
    }

    #[test]
    fn test_frame_produces_audio_samples() {
        let mut emulator = emulator_with_code(&[0x18, 0xFE]); // JR -2

        // The power-on frame is short; measure a full vblank-to-vblank frame.
        emulator.run_to_vblank();
        emulator.clear_audio_buffer();
        emulator.run_to_vblank();

        // Roughly 739 mono samples per frame at 44.1KHz.
        let samples = emulator.audio_buffer().len();
        assert!((735..=745).contains(&samples), "samples: {}", samples);

        emulator.clear_audio_buffer();
        assert!(emulator.audio_buffer().is_empty());
    }

    #[test]
    fn test_vblank_interrupt_drives_handler() {
        // Enable VBlank interrupts, set IME, halt; the handler at 0x40 will
        // write a marker into HRAM.
        // 0x100: LD A,0x01; LD (0xFFFF),A; EI; HALT; JR -2
        let mut rom = rom_with_code(&[0x3E, 0x01, 0xEA, 0xFF, 0xFF, 0xFB, 0x76, 0x18, 0xFE]);
        // Handler: LD A,0x42; LD (0xFF80),A; RETI
        let handler = [0x3E, 0x42, 0xEA, 0x80, 0xFF, 0xD9];
        rom[0x40..0x40 + handler.len()].copy_from_slice(&handler);

        let mut emulator =
            GameBoyEmulator::new(&rom, EmulatorOptionsBuilder::new().build()).unwrap();
        emulator.run_to_vblank();
        emulator.run_to_vblank();

        assert_eq!(emulator.cpu.mmu.read_byte(0xFF80), 0x42);
    }

    #[test]
    fn test_joypad_press_requests_interrupt() {
        let mut emulator = emulator_with_code(&[0x18, 0xFE]);
        emulator.handle_input(InputKey::START, true);

        assert!(emulator
            .cpu
            .mmu
            .interrupts
            .interrupt_flag
            .contains(InterruptFlags::JOYPAD));

        emulator.handle_input(InputKey::START, false);
    }

    #[test]
    fn test_undefined_opcode_locks_the_cpu() {
        let mut emulator = emulator_with_code(&[0xD3]);
        emulator.run_to_vblank();

        assert!(emulator.cpu.is_locked_up());
        let pc = emulator.cpu.registers.pc;
        emulator.run_to_vblank();
        assert_eq!(emulator.cpu.registers.pc, pc);
    }
}
