//! The only fallible operations in the core are at load time. Everything that
//! happens once the emulator is running is in-simulation behaviour and is
//! never surfaced as an error to the host.

use std::error::Error;
use std::fmt;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq)]
pub enum EmulatorError {
    /// The cartridge type byte at 0x147 names an MBC we don't implement.
    UnsupportedCartridgeType(u8),
    /// ROM files must be a power of two of at least 32 KiB.
    InvalidRomSize(usize),
    /// The RAM size code at 0x149 is outside the documented set.
    InvalidRamSizeCode(u8),
    /// Provided save data doesn't match the ERAM size declared in the header.
    SaveDataSizeMismatch { expected: usize, actual: usize },
    /// Boot ROMs are exactly 256 bytes (DMG) or 2304 bytes (CGB).
    BootRomSizeMismatch { expected: usize, actual: usize },
}

impl Display for EmulatorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        use EmulatorError::*;
        match self {
            UnsupportedCartridgeType(code) => {
                write!(f, "Unsupported cartridge type code: 0x{:02X}", code)
            }
            InvalidRomSize(size) => write!(
                f,
                "ROM size {} is not a power of two of at least 32768 bytes",
                size
            ),
            InvalidRamSizeCode(code) => write!(f, "Invalid RAM size code: 0x{:02X}", code),
            SaveDataSizeMismatch { expected, actual } => write!(
                f,
                "Save data size mismatch, expected: {} bytes, got: {} bytes",
                expected, actual
            ),
            BootRomSizeMismatch { expected, actual } => write!(
                f,
                "Boot ROM size mismatch, expected: {} bytes, got: {} bytes",
                expected, actual
            ),
        }
    }
}

impl Error for EmulatorError {}
