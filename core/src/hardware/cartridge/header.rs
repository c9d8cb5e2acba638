use crate::errors::EmulatorError;
use std::str::from_utf8;

pub const HEADER_START: u16 = 0x0100;
pub const HEADER_END: u16 = 0x014F;

#[derive(Debug, Default)]
pub struct CartridgeHeader {
    /// Upper case ASCII, 16 characters in DMG, zero filled if less than that.
    /// In CGB it's either 15 or 11 characters instead.
    pub title: String,
    /// In DMG this is still part of the title bytes, in CGB it contains a flag
    /// for determining the relevant mode.
    pub cgb_flag: bool,
    /// Specifies whether the game supports SGB functions.
    pub sgb_flag: bool,
    /// Specifies which Memory Bank Controller (if any) is used in the cartridge,
    /// and if further external hardware exists in the cartridge.
    pub cartridge_type: u8,
    /// Specifies the ROM Size of the cartridge. Typically calculated as "32KB shl N".
    pub rom_size: u8,
    /// Specifies the size of the external RAM in the cartridge (if any).
    pub ram_size: RamSize,
    /// Contains an 8 bit checksum across the cartridge header bytes 0134-014C.
    pub header_checksum: u8,
    /// Contains a 16 bit checksum (upper byte first) across the whole cartridge ROM.
    /// The Game Boy doesn't verify this checksum.
    pub global_checksum: u16,
}

/// The documented external RAM sizes. Code 0x01 is unused by licensed
/// cartridges and treated as malformed.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum RamSize {
    None,
    Kb8,
    Kb32,
    Kb64,
    Kb128,
}

impl Default for RamSize {
    fn default() -> Self {
        RamSize::None
    }
}

impl RamSize {
    pub fn parse(code: u8) -> Result<RamSize, EmulatorError> {
        match code {
            0x00 => Ok(RamSize::None),
            0x02 => Ok(RamSize::Kb8),
            0x03 => Ok(RamSize::Kb32),
            0x04 => Ok(RamSize::Kb128),
            0x05 => Ok(RamSize::Kb64),
            _ => Err(EmulatorError::InvalidRamSizeCode(code)),
        }
    }

    pub fn to_usize(self) -> usize {
        match self {
            RamSize::None => 0,
            RamSize::Kb8 => 0x2000,
            RamSize::Kb32 => 0x8000,
            RamSize::Kb64 => 0x10000,
            RamSize::Kb128 => 0x20000,
        }
    }
}

impl CartridgeHeader {
    pub fn new(rom: &[u8]) -> Result<Self, EmulatorError> {
        if rom.len() < 0x8000 || !rom.len().is_power_of_two() {
            return Err(EmulatorError::InvalidRomSize(rom.len()));
        }

        let is_cgb_rom = read_cgb_flag(rom);

        Ok(CartridgeHeader {
            title: read_title(rom, is_cgb_rom),
            cgb_flag: is_cgb_rom,
            sgb_flag: rom[0x146] == 0x03,
            cartridge_type: rom[0x147],
            rom_size: rom[0x148],
            ram_size: RamSize::parse(rom[0x149])?,
            header_checksum: rom[0x14D],
            global_checksum: ((rom[0x14E] as u16) << 8) | rom[0x14F] as u16,
        })
    }
}

fn read_title(rom: &[u8], cgb_mode: bool) -> String {
    // CGB titles vary between 11 and 15 characters, we take the pessimistic option here.
    let slice = if cgb_mode { &rom[0x134..=0x13E] } else { &rom[0x134..=0x143] };

    from_utf8(slice)
        .unwrap_or("")
        .trim_matches(char::from(0))
        .to_owned()
}

fn read_cgb_flag(rom: &[u8]) -> bool {
    matches!(rom[0x143], 0x80 | 0xC0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rom_with_header() -> Vec<u8> {
        let mut rom = vec![0u8; 0x8000];
        for (loc, byte) in b"HELLO WOR".iter().enumerate() {
            rom[0x134 + loc] = *byte;
        }
        rom
    }

    #[test]
    fn test_read_title() {
        let header = CartridgeHeader::new(&rom_with_header()).unwrap();
        assert_eq!(header.title, "HELLO WOR");
    }

    #[test]
    fn test_rom_size_must_be_power_of_two() {
        assert_eq!(
            CartridgeHeader::new(&vec![0u8; 0x8001]).unwrap_err(),
            EmulatorError::InvalidRomSize(0x8001)
        );
        assert_eq!(
            CartridgeHeader::new(&vec![0u8; 0x4000]).unwrap_err(),
            EmulatorError::InvalidRomSize(0x4000)
        );
    }

    #[test]
    fn test_ram_size_codes() {
        let mut rom = rom_with_header();
        rom[0x149] = 0x03;
        assert_eq!(
            CartridgeHeader::new(&rom).unwrap().ram_size,
            RamSize::Kb32
        );

        rom[0x149] = 0x01;
        assert_eq!(
            CartridgeHeader::new(&rom).unwrap_err(),
            EmulatorError::InvalidRamSizeCode(0x01)
        );
    }

    #[test]
    fn test_cgb_flag() {
        let mut rom = rom_with_header();
        assert!(!CartridgeHeader::new(&rom).unwrap().cgb_flag);

        rom[0x143] = 0x80;
        assert!(CartridgeHeader::new(&rom).unwrap().cgb_flag);

        rom[0x143] = 0xC0;
        assert!(CartridgeHeader::new(&rom).unwrap().cgb_flag);
    }
}
