use crate::errors::EmulatorError;
use crate::gb_emu::GameBoyModel;

/// 256 bytes, mapped over 0x0000..=0x00FF.
pub const DMG_BOOTROM_SIZE: usize = 0x100;
/// 2304 bytes. The CGB boot ROM additionally covers 0x0200..=0x08FF, the
/// cartridge header in between stays visible.
pub const CGB_BOOTROM_SIZE: usize = 0x900;

/// The register which, once written with bit 0 set, permanently unmaps the
/// boot ROM for this emulator instance.
pub const BOOTROM_DISABLE: u16 = 0xFF50;

#[derive(Debug)]
pub struct BootRom {
    pub is_finished: bool,
    data: Vec<u8>,
}

impl BootRom {
    pub fn new(data: Option<Vec<u8>>, model: GameBoyModel) -> Result<Self, EmulatorError> {
        match data {
            Some(rom) => {
                let expected = if model.is_dmg() {
                    DMG_BOOTROM_SIZE
                } else {
                    CGB_BOOTROM_SIZE
                };
                if rom.len() != expected {
                    return Err(EmulatorError::BootRomSizeMismatch {
                        expected,
                        actual: rom.len(),
                    });
                }
                Ok(Self {
                    is_finished: false,
                    data: rom,
                })
            }
            None => Ok(Self {
                is_finished: true,
                data: Vec::new(),
            }),
        }
    }

    /// Whether `address` is currently overlaid by the boot ROM.
    pub fn is_mapped(&self, address: u16, model: GameBoyModel) -> bool {
        if self.is_finished {
            return false;
        }
        match address {
            0x0000..=0x00FF => true,
            0x0200..=0x08FF => model.is_cgb(),
            _ => false,
        }
    }

    pub fn read_byte(&self, address: u16) -> u8 {
        self.data[address as usize]
    }

    /// A write to 0xFF50 with bit 0 set disables the overlay. The latch can
    /// never be re-armed.
    pub fn write_disable(&mut self, value: u8) {
        if value & 0x1 != 0 && !self.is_finished {
            self.is_finished = true;
            log::info!("Finished executing boot ROM");
        }
    }
}
