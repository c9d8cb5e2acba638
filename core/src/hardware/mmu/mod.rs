use std::fmt;
use std::fmt::{Debug, Formatter};

use crate::errors::EmulatorError;
use crate::gb_emu::{GameBoyModel, M_CYCLES_PER_FRAME};
use crate::hardware::apu::{APU, APU_MEM_END, APU_MEM_START, WAVE_SAMPLE_END, WAVE_SAMPLE_START};
use crate::hardware::cartridge::Cartridge;
use crate::hardware::mmu::dma::{OamDma, DMA_TRANSFER};
use crate::hardware::mmu::hdma::*;
use crate::hardware::mmu::hram::Hram;
use crate::hardware::mmu::speed::SpeedSwitch;
use crate::hardware::mmu::wram::Wram;
use crate::hardware::ppu::PPU;
use crate::io::bootrom::{BootRom, BOOTROM_DISABLE};
use crate::io::interrupts::{InterruptFlags, Interrupts, INTERRUPTS_ENABLE, INTERRUPTS_FLAG};
use crate::io::joypad::{JoyPad, JOYPAD_REGISTER};
use crate::io::serial::{SerialPort, SIO_CONT, SIO_DATA};
use crate::io::timer::{
    TimerRegisters, DIVIDER_REGISTER, TIMER_CONTROL, TIMER_COUNTER, TIMER_MODULO,
};
use crate::EmulatorOptions;

pub mod dma;
pub mod hdma;
mod hram;
mod speed;
mod wram;

/// 16 KB ROM bank, usually 00. From cartridge, read-only.
pub const ROM_BANK_00_START: u16 = 0x0000;
pub const ROM_BANK_00_END: u16 = 0x3FFF;
/// 16 KB ROM Bank 01~NN. From cartridge, switchable bank. Read-only.
pub const ROM_BANK_NN_START: u16 = 0x4000;
pub const ROM_BANK_NN_END: u16 = 0x7FFF;
/// 8 KB of VRAM, only bank 0 in Non-CGB mode. Switchable bank 0/1 in CGB mode.
pub const VRAM_START: u16 = 0x8000;
pub const VRAM_END: u16 = 0x9FFF;
/// 8 KB of External RAM, in cartridge, switchable bank if any.
pub const EXTERNAL_RAM_START: u16 = 0xA000;
pub const EXTERNAL_RAM_END: u16 = 0xBFFF;
/// 4 KB Work RAM bank 0.
pub const WRAM_BANK_00_START: u16 = 0xC000;
pub const WRAM_BANK_00_END: u16 = 0xCFFF;
/// 4 KB Work RAM bank 1~N. Only bank 1 in Non-CGB mode, switchable 1~7 in CGB mode.
pub const WRAM_BANK_NN_START: u16 = 0xD000;
pub const WRAM_BANK_NN_END: u16 = 0xDFFF;
/// Mirror of C000~DDFF (Echo RAM). Typically not used.
pub const ECHO_RAM_START: u16 = 0xE000;
pub const ECHO_RAM_END: u16 = 0xFDFF;
/// Sprite attribute table (OAM).
pub const OAM_ATTRIBUTE_START: u16 = 0xFE00;
pub const OAM_ATTRIBUTE_END: u16 = 0xFE9F;
/// Not usable, reads as 0x00.
pub const NOT_USABLE_START: u16 = 0xFEA0;
pub const NOT_USABLE_END: u16 = 0xFEFF;
/// I/O Registers.
pub const IO_START: u16 = 0xFF00;
pub const IO_END: u16 = 0xFF7F;
/// High RAM (HRAM).
pub const HRAM_START: u16 = 0xFF80;
pub const HRAM_END: u16 = 0xFFFE;

/// CGB speed switch (KEY1).
pub const CGB_PREPARE_SWITCH: u16 = 0xFF4D;
/// Work RAM bank switching (SVBK).
pub const CGB_WRAM_BANK: u16 = 0xFF70;

/// The value returned for any unmapped or blocked read.
pub const INVALID_READ: u8 = 0xFF;

/// Simple memory interface for reading and writing bytes, as well as ticking
/// the peripherals the bus owns. The CPU is generic over this so tests can
/// substitute a flat address space.
pub trait MemoryMapper: Debug {
    fn read_byte(&self, address: u16) -> u8;
    fn write_byte(&mut self, address: u16, value: u8);
    /// Perform one M-cycle on all components of the system.
    fn do_m_cycle(&mut self);
    fn interrupts(&self) -> &Interrupts;
    fn interrupts_mut(&mut self) -> &mut Interrupts;
    fn boot_rom_finished(&self) -> bool {
        true
    }
    fn model(&self) -> GameBoyModel {
        GameBoyModel::DMG
    }
    /// Returns the cartridge, if the mapper is backed by one. Used for save
    /// functionality.
    fn cartridge(&self) -> Option<&Cartridge> {
        None
    }
    /// While a blocking VRAM DMA owns the bus the CPU consumes stall cycles
    /// instead of executing.
    fn try_consume_stall(&mut self) -> bool {
        false
    }
    fn speed_switch_requested(&self) -> bool {
        false
    }
    fn toggle_speed(&mut self) {}
}

pub struct Memory {
    boot_rom: BootRom,
    cartridge: Cartridge,
    pub model: GameBoyModel,
    pub speed: SpeedSwitch,
    pub hdma: Hdma,
    oam_dma: OamDma,

    pub ppu: PPU,
    pub apu: APU,
    pub hram: Hram,
    pub wram: Wram,

    pub joypad_register: JoyPad,
    pub serial: SerialPort,
    pub timers: TimerRegisters,
    pub interrupts: Interrupts,

    stall_cycles: u32,
    /// Double speed runs the peripherals every other CPU M-cycle.
    peripheral_phase: bool,
    frame_cycles: u32,
    vblank_latch: bool,
}

impl Memory {
    pub fn new(rom: &[u8], emu_opts: EmulatorOptions) -> Result<Self, EmulatorError> {
        let cartridge = Cartridge::new(rom, emu_opts.saved_ram)?;
        let mut model = emu_opts.emulator_model;

        // Without a CGB boot ROM a DMG-only cartridge drops us to DMG mode.
        if model.is_cgb() && !cartridge.cartridge_header().cgb_flag && emu_opts.boot_rom.is_none() {
            log::info!("Falling back to DMG mode for a DMG-only cartridge");
            model = GameBoyModel::DMG;
        }

        Ok(Memory {
            boot_rom: BootRom::new(emu_opts.boot_rom, model)?,
            cartridge,
            model,
            speed: SpeedSwitch::default(),
            hdma: Hdma::default(),
            oam_dma: OamDma::default(),
            ppu: PPU::new(model, emu_opts.display_colours),
            apu: APU::new(model),
            hram: Hram::new(),
            wram: Wram::new(),
            joypad_register: JoyPad::new(),
            serial: SerialPort::new(),
            timers: TimerRegisters::default(),
            interrupts: Interrupts::default(),
            stall_cycles: 0,
            peripheral_phase: false,
            frame_cycles: 0,
            vblank_latch: false,
        })
    }

    pub fn read_byte(&self, address: u16) -> u8 {
        match address {
            0x0000..=0x08FF if self.boot_rom.is_mapped(address, self.model) => {
                self.boot_rom.read_byte(address)
            }
            ROM_BANK_00_START..=ROM_BANK_00_END => self.cartridge.read_0000_3fff(address),
            ROM_BANK_NN_START..=ROM_BANK_NN_END => self.cartridge.read_4000_7fff(address),
            VRAM_START..=VRAM_END => self.ppu.read_vram(address),
            EXTERNAL_RAM_START..=EXTERNAL_RAM_END => self.cartridge.read_external_ram(address),
            WRAM_BANK_00_START..=WRAM_BANK_00_END => self.wram.read_bank_0(address),
            WRAM_BANK_NN_START..=WRAM_BANK_NN_END => self.wram.read_bank_n(address),
            ECHO_RAM_START..=ECHO_RAM_END => self.wram.read_echo_ram(address),
            OAM_ATTRIBUTE_START..=OAM_ATTRIBUTE_END => self.ppu.read_vram(address),
            NOT_USABLE_START..=NOT_USABLE_END => 0x00,
            IO_START..=IO_END => self.read_io_byte(address),
            HRAM_START..=HRAM_END => self.hram.read_byte(address),
            INTERRUPTS_ENABLE => self.interrupts.read_ie(),
        }
    }

    pub fn write_byte(&mut self, address: u16, value: u8) {
        match address {
            ROM_BANK_00_START..=ROM_BANK_NN_END => self.cartridge.write_byte(address, value),
            VRAM_START..=VRAM_END => self.ppu.write_vram(address, value, &mut self.interrupts),
            EXTERNAL_RAM_START..=EXTERNAL_RAM_END => self.cartridge.write_byte(address, value),
            WRAM_BANK_00_START..=WRAM_BANK_00_END => self.wram.write_bank_0(address, value),
            WRAM_BANK_NN_START..=WRAM_BANK_NN_END => self.wram.write_bank_n(address, value),
            ECHO_RAM_START..=ECHO_RAM_END => self.wram.write_echo_ram(address, value),
            OAM_ATTRIBUTE_START..=OAM_ATTRIBUTE_END => {
                self.ppu.write_vram(address, value, &mut self.interrupts)
            }
            NOT_USABLE_START..=NOT_USABLE_END => {
                log::trace!("ROM writing to non-usable memory: 0x{:04X}", address)
            }
            IO_START..=IO_END => self.write_io_byte(address, value),
            HRAM_START..=HRAM_END => self.hram.set_byte(address, value),
            INTERRUPTS_ENABLE => self.interrupts.overwrite_ie(value),
        }
    }

    /// Specific method for all reads of the IO registers.
    fn read_io_byte(&self, address: u16) -> u8 {
        use crate::hardware::ppu::*;
        match address {
            JOYPAD_REGISTER => self.joypad_register.get_register(),
            SIO_DATA => self.serial.read_data(),
            SIO_CONT => self.serial.read_control(),
            DIVIDER_REGISTER => self.timers.divider_register(),
            TIMER_COUNTER => self.timers.timer_counter,
            TIMER_MODULO => self.timers.timer_modulo,
            TIMER_CONTROL => self.timers.timer_control.to_bits(),
            INTERRUPTS_FLAG => self.interrupts.read_if(),
            APU_MEM_START..=APU_MEM_END => self.apu.read_register(address),
            WAVE_SAMPLE_START..=WAVE_SAMPLE_END => self.apu.read_wave_sample(address),
            DMA_TRANSFER => self.oam_dma.register_value(),
            LCD_CONTROL_REGISTER..=LYC_REGISTER => self.ppu.read_vram(address),
            BG_PALETTE..=WX_REGISTER => self.ppu.read_vram(address),
            CGB_PREPARE_SWITCH if self.model.is_cgb() => self.speed.read(),
            CGB_VRAM_BANK_REGISTER => self.ppu.read_vram(address),
            CGB_HDMA_1..=CGB_HDMA_4 => INVALID_READ,
            CGB_HDMA_5 if self.model.is_cgb() => self.hdma.hdma5(),
            CGB_BACKGROUND_COLOR_INDEX..=CGB_OBJECT_PRIORITY_MODE => self.ppu.read_vram(address),
            CGB_WRAM_BANK if self.model.is_cgb() => self.wram.read_bank_select(),
            _ => INVALID_READ,
        }
    }

    fn write_io_byte(&mut self, address: u16, value: u8) {
        use crate::hardware::ppu::*;
        match address {
            JOYPAD_REGISTER => self.joypad_register.set_register(value),
            SIO_DATA => self.serial.write_data(value),
            SIO_CONT => self.serial.write_control(value),
            DIVIDER_REGISTER => self.timers.set_divider(),
            TIMER_COUNTER => self.timers.set_timer_counter(value),
            TIMER_MODULO => self.timers.set_tma(value),
            TIMER_CONTROL => self.timers.set_timer_control(value),
            INTERRUPTS_FLAG => self.interrupts.overwrite_if(value),
            APU_MEM_START..=APU_MEM_END => self.apu.write_register(address, value),
            WAVE_SAMPLE_START..=WAVE_SAMPLE_END => self.apu.write_wave_sample(address, value),
            DMA_TRANSFER => self.oam_dma.start(value),
            LCD_CONTROL_REGISTER..=LYC_REGISTER => {
                self.ppu.write_vram(address, value, &mut self.interrupts)
            }
            BG_PALETTE..=WX_REGISTER => self.ppu.write_vram(address, value, &mut self.interrupts),
            CGB_PREPARE_SWITCH if self.model.is_cgb() => self.speed.write(value),
            CGB_VRAM_BANK_REGISTER => self.ppu.write_vram(address, value, &mut self.interrupts),
            BOOTROM_DISABLE => self.boot_rom.write_disable(value),
            CGB_HDMA_1 if self.model.is_cgb() => self.hdma.write_source_high(value),
            CGB_HDMA_2 if self.model.is_cgb() => self.hdma.write_source_low(value),
            CGB_HDMA_3 if self.model.is_cgb() => self.hdma.write_destination_high(value),
            CGB_HDMA_4 if self.model.is_cgb() => self.hdma.write_destination_low(value),
            CGB_HDMA_5 if self.model.is_cgb() => self.write_hdma5(value),
            CGB_BACKGROUND_COLOR_INDEX..=CGB_OBJECT_PRIORITY_MODE => {
                self.ppu.write_vram(address, value, &mut self.interrupts)
            }
            CGB_WRAM_BANK if self.model.is_cgb() => self.wram.write_bank_select(value),
            _ => log::trace!(
                "Write to unmapped IO register 0x{:04X} with 0x{:02X}",
                address,
                value
            ),
        }
    }

    /// Whether a full frame's worth of cycles (or a VBlank latch) has been
    /// reached; clears the latch when it has.
    pub fn take_frame(&mut self) -> bool {
        if self.vblank_latch {
            self.vblank_latch = false;
            self.frame_cycles = 0;
            true
        } else if self.frame_cycles >= M_CYCLES_PER_FRAME as u32 {
            // With the LCD off no VBlank ever latches, pace by cycle count.
            self.frame_cycles -= M_CYCLES_PER_FRAME as u32;
            true
        } else {
            false
        }
    }

    pub fn cartridge(&self) -> &Cartridge {
        &self.cartridge
    }

    pub fn oam_dma_active(&self) -> bool {
        self.oam_dma.is_active()
    }

    /// Add a new interrupt to the IF flag.
    #[inline]
    pub fn add_new_interrupts(&mut self, interrupt: Option<InterruptFlags>) {
        if let Some(intr) = interrupt {
            self.interrupts.insert_interrupt(intr);
        }
    }
}

impl MemoryMapper for Memory {
    fn read_byte(&self, address: u16) -> u8 {
        Memory::read_byte(self, address)
    }

    fn write_byte(&mut self, address: u16, value: u8) {
        Memory::write_byte(self, address, value)
    }

    fn do_m_cycle(&mut self) {
        // The timer, serial and the OAM DMA engine follow the CPU clock, so
        // in double speed they run here on every call.
        let timer_interrupt = self.timers.tick_timers();
        self.add_new_interrupts(timer_interrupt);
        self.tick_oam_dma();

        if self.speed.double_speed() {
            self.peripheral_phase = !self.peripheral_phase;
            if self.peripheral_phase {
                return;
            }
        }

        // One M-cycle of real time for everything else.
        self.frame_cycles += 1;

        let events = self.ppu.tick(&mut self.interrupts);
        if events.frame_ready {
            self.vblank_latch = true;
        }
        if events.hblank_started && self.hdma.hblank_active() {
            self.hblank_dma_block();
        }

        let sequencer_pulse = self.timers.take_sequencer_pulse();
        self.apu.tick(4, sequencer_pulse);
        self.cartridge.tick(4);
    }

    fn interrupts(&self) -> &Interrupts {
        &self.interrupts
    }

    fn interrupts_mut(&mut self) -> &mut Interrupts {
        &mut self.interrupts
    }

    fn boot_rom_finished(&self) -> bool {
        self.boot_rom.is_finished
    }

    fn model(&self) -> GameBoyModel {
        self.model
    }

    fn cartridge(&self) -> Option<&Cartridge> {
        Some(&self.cartridge)
    }

    fn try_consume_stall(&mut self) -> bool {
        if self.stall_cycles > 0 {
            self.stall_cycles -= 1;
            self.do_m_cycle();
            true
        } else {
            false
        }
    }

    fn speed_switch_requested(&self) -> bool {
        self.model.is_cgb() && self.speed.should_prepare()
    }

    fn toggle_speed(&mut self) {
        self.speed.toggle_speed();
        self.timers.set_double_speed(self.speed.double_speed());
    }
}

impl Debug for Memory {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Memory, cartridge: {:?}", self.cartridge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::ppu::{LCD_CONTROL_REGISTER, LY_REGISTER};
    use crate::EmulatorOptionsBuilder;
    use pretty_assertions::assert_eq;

    fn basic_memory() -> Memory {
        let mut rom = vec![0u8; 0x8000];
        rom[0x147] = 0x00;
        Memory::new(&rom, EmulatorOptionsBuilder::new().build()).unwrap()
    }

    fn cgb_memory() -> Memory {
        let mut rom = vec![0u8; 0x8000];
        rom[0x143] = 0x80;
        Memory::new(
            &rom,
            EmulatorOptionsBuilder::new()
                .with_mode(GameBoyModel::CGB)
                .build(),
        )
        .unwrap()
    }

    #[test]
    fn test_prohibited_range_reads_zero() {
        let memory = basic_memory();
        for address in NOT_USABLE_START..=NOT_USABLE_END {
            assert_eq!(memory.read_byte(address), 0x00);
        }
    }

    #[test]
    fn test_unmapped_io_reads_ff() {
        let mut memory = basic_memory();
        assert_eq!(memory.read_byte(0xFF03), 0xFF);
        assert_eq!(memory.read_byte(0xFF7F), 0xFF);

        // DMG has no KEY1/SVBK/HDMA registers.
        assert_eq!(memory.read_byte(CGB_PREPARE_SWITCH), 0xFF);
        assert_eq!(memory.read_byte(CGB_WRAM_BANK), 0xFF);
        assert_eq!(memory.read_byte(CGB_HDMA_5), 0xFF);
        memory.write_byte(CGB_WRAM_BANK, 0x3);
        assert_eq!(memory.read_byte(CGB_WRAM_BANK), 0xFF);
    }

    #[test]
    fn test_echo_ram_maps_to_wram() {
        let mut memory = basic_memory();
        memory.write_byte(0xC123, 0x42);
        assert_eq!(memory.read_byte(0xE123), 0x42);
    }

    #[test]
    fn test_hram_round_trip() {
        let mut memory = basic_memory();
        memory.write_byte(0xFF80, 0x42);
        memory.write_byte(0xFFFE, 0x24);
        assert_eq!(memory.read_byte(0xFF80), 0x42);
        assert_eq!(memory.read_byte(0xFFFE), 0x24);
    }

    #[test]
    fn test_rom_is_read_only() {
        let mut memory = basic_memory();
        let before = memory.read_byte(0x0150);
        memory.write_byte(0x0150, !before);
        assert_eq!(memory.read_byte(0x0150), before);
    }

    #[test]
    fn test_boot_rom_overlay_and_latch() {
        let mut rom = vec![0x42u8; 0x8000];
        rom[0x147] = 0x00;
        rom[0x149] = 0x00;
        let boot_rom = vec![0x11u8; 0x100];
        let options = EmulatorOptionsBuilder::new()
            .with_boot_rom(Some(boot_rom))
            .build();
        let mut memory = Memory::new(&rom, options).unwrap();

        assert_eq!(memory.read_byte(0x0000), 0x11);
        assert_eq!(memory.read_byte(0x0100), 0x42);

        // Writes without bit 0 leave the overlay alone.
        memory.write_byte(BOOTROM_DISABLE, 0xFE);
        assert_eq!(memory.read_byte(0x0000), 0x11);

        memory.write_byte(BOOTROM_DISABLE, 0x01);
        assert_eq!(memory.read_byte(0x0000), 0x42);

        // The latch can never be re-armed.
        memory.write_byte(BOOTROM_DISABLE, 0x00);
        assert_eq!(memory.read_byte(0x0000), 0x42);
    }

    #[test]
    fn test_divider_write_resets() {
        let mut memory = basic_memory();
        for _ in 0..100 {
            memory.do_m_cycle();
        }
        assert_ne!(memory.read_byte(DIVIDER_REGISTER), 0);

        memory.write_byte(DIVIDER_REGISTER, 0x55);
        assert_eq!(memory.read_byte(DIVIDER_REGISTER), 0);
    }

    #[test]
    fn test_oam_dma_timing_and_blocking() {
        let mut memory = basic_memory();
        // Switch the LCD off so OAM is otherwise accessible.
        memory.write_byte(LCD_CONTROL_REGISTER, 0x11);

        for i in 0..160u16 {
            memory.write_byte(0xC000 + i, i as u8);
        }
        memory.write_byte(DMA_TRANSFER, 0xC0);
        assert_eq!(memory.read_byte(DMA_TRANSFER), 0xC0);

        // Two cycle startup delay.
        memory.do_m_cycle();
        memory.do_m_cycle();
        assert!(memory.oam_dma_active());

        // Mid transfer OAM reads return 0xFF and writes are dropped.
        for _ in 0..80 {
            memory.do_m_cycle();
        }
        assert!(memory.oam_dma_active());
        assert_eq!(memory.read_byte(0xFE00), 0xFF);
        memory.write_byte(0xFE10, 0x99);

        for _ in 0..80 {
            memory.do_m_cycle();
        }
        assert!(!memory.oam_dma_active());
        for i in 0..160u16 {
            assert_eq!(memory.read_byte(0xFE00 + i), i as u8);
        }
    }

    #[test]
    fn test_oam_dma_source_above_fe00_folds_to_echo() {
        let mut memory = basic_memory();
        memory.write_byte(LCD_CONTROL_REGISTER, 0x11);
        memory.write_byte(0xC000, 0xAB);

        memory.write_byte(DMA_TRANSFER, 0xFE);
        for _ in 0..163 {
            memory.do_m_cycle();
        }
        // 0xFE00 folded to 0xDE00, which mirrors nothing we wrote; at least
        // the transfer must have completed without touching OAM locks.
        assert!(!memory.oam_dma_active());
    }

    #[test]
    fn test_cgb_wram_banking() {
        let mut memory = cgb_memory();
        memory.write_byte(0xD000, 0x11);
        memory.write_byte(CGB_WRAM_BANK, 0x04);
        memory.write_byte(0xD000, 0x44);

        assert_eq!(memory.read_byte(0xD000), 0x44);
        assert_eq!(memory.read_byte(CGB_WRAM_BANK), 0xF8 | 0x4);

        memory.write_byte(CGB_WRAM_BANK, 0x01);
        assert_eq!(memory.read_byte(0xD000), 0x11);

        // Bank 0 selects bank 1.
        memory.write_byte(CGB_WRAM_BANK, 0x00);
        assert_eq!(memory.read_byte(0xD000), 0x11);
    }

    #[test]
    fn test_gdma_copies_to_vram_and_stalls() {
        let mut memory = cgb_memory();
        memory.write_byte(LCD_CONTROL_REGISTER, 0x11);

        for i in 0..32u16 {
            memory.write_byte(0xC000 + i, 0x80 | i as u8);
        }
        memory.write_byte(CGB_HDMA_1, 0xC0);
        memory.write_byte(CGB_HDMA_2, 0x00);
        memory.write_byte(CGB_HDMA_3, 0x00);
        memory.write_byte(CGB_HDMA_4, 0x00);
        // Two blocks, general purpose.
        memory.write_byte(CGB_HDMA_5, 0x01);

        for i in 0..32u16 {
            assert_eq!(memory.read_byte(0x8000 + i), 0x80 | i as u8);
        }
        // FF55 reads idle with no blocks left.
        assert_eq!(memory.read_byte(CGB_HDMA_5), 0xFF);

        // 2 blocks * 16 bytes / 4 = 8 M-cycles of CPU stall.
        let mut stalled = 0;
        while memory.try_consume_stall() {
            stalled += 1;
        }
        assert_eq!(stalled, 8);
    }

    #[test]
    fn test_hblank_dma_one_block_per_hblank() {
        let mut memory = cgb_memory();

        for i in 0..64u16 {
            memory.write_byte(0xC000 + i, i as u8);
        }
        memory.write_byte(CGB_HDMA_1, 0xC0);
        memory.write_byte(CGB_HDMA_2, 0x00);
        memory.write_byte(CGB_HDMA_3, 0x00);
        memory.write_byte(CGB_HDMA_4, 0x00);
        // Four blocks, HBlank mode.
        memory.write_byte(CGB_HDMA_5, 0x83);
        assert_eq!(memory.read_byte(CGB_HDMA_5), 0x03);

        // Run until the first HBlank has been serviced.
        while memory.read_byte(CGB_HDMA_5) == 0x03 {
            memory.do_m_cycle();
        }
        assert_eq!(memory.read_byte(CGB_HDMA_5), 0x02);

        // Cancelling mid-transfer keeps the remaining length but goes idle.
        memory.write_byte(CGB_HDMA_5, 0x00);
        assert_eq!(memory.read_byte(CGB_HDMA_5), 0x82);
    }

    #[test]
    fn test_ly_reads_zero_after_lcd_off() {
        let mut memory = basic_memory();
        for _ in 0..1000 {
            memory.do_m_cycle();
        }
        assert_ne!(memory.read_byte(LY_REGISTER), 0);

        memory.write_byte(LCD_CONTROL_REGISTER, 0x11);
        assert_eq!(memory.read_byte(LY_REGISTER), 0);
    }

    #[test]
    fn test_frame_pacing_with_lcd_off() {
        let mut memory = basic_memory();
        memory.write_byte(LCD_CONTROL_REGISTER, 0x11);

        for _ in 0..M_CYCLES_PER_FRAME {
            assert!(!memory.take_frame());
            memory.do_m_cycle();
        }
        assert!(memory.take_frame());
    }
}
