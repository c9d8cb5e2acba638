use bitflags::*;

bitflags! {
    /// FF40
    /// LCDC is a powerful tool: each bit controls a lot of behavior,
    /// and can be modified at any time during the frame.
    ///
    /// One of the important aspects of LCDC is that unlike VRAM,
    /// the PPU never locks it. It's thus possible to modify it mid-scanline!
    #[derive(Default)]
    pub struct LcdControl: u8 {
        /// `BG_WINDOW_PRIORITY` has different meanings depending on Game Boy type and Mode:
        ///
        /// # Monochrome Game Boy and CGB in Non-CGB Mode: BG Display
        /// When Bit 0 is cleared, both background and window become blank (white),
        /// and the Window Display Bit is ignored in that case.
        /// Only Sprites may still be displayed (if enabled in Bit 1).
        ///
        /// # CGB in CGB Mode: BG and Window Master Priority
        /// When Bit 0 is cleared, the background and window lose their priority -
        /// the sprites will be always displayed on top of background and window,
        /// independently of the priority flags in OAM and BG Map attributes.
        const BG_WINDOW_PRIORITY = 0b0000_0001;
        /// This bit toggles whether sprites are displayed or not.
        const SPRITE_DISPLAY_ENABLE = 0b0000_0010;
        /// This bit controls the sprite size (1 tile or 2 stacked vertically).
        const SPRITE_SIZE = 0b0000_0100;
        /// LCDC.3
        /// If the bit is reset the BG uses tilemap `$9800`, otherwise tilemap `$9C00`.
        const BG_TILE_MAP_SELECT = 0b0000_1000;
        /// LCDC.4
        /// 0=8800-97FF (signed addressing), 1=8000-8FFF (unsigned).
        /// Sprites aren't affected and always use $8000 addressing.
        const BG_WINDOW_TILE_SELECT = 0b0001_0000;
        /// This bit controls whether the window shall be displayed or not.
        /// Overridden on DMG by bit 0 if that bit is reset.
        const WINDOW_DISPLAY = 0b0010_0000;
        /// LCDC.6
        /// When reset the window uses the `$9800` tilemap, otherwise `$9C00`.
        const WINDOW_MAP_SELECT = 0b0100_0000;
        /// This bit controls whether the LCD is on and the PPU is active.
        /// Setting it to 0 grants immediate and full access to VRAM and OAM.
        const LCD_DISPLAY = 0b1000_0000;
    }
}

bitflags! {
    /// FF41
    /// Only the four interrupt-enable bits are backed by writable storage;
    /// the mode and coincidence bits are composed from live PPU state on read.
    #[derive(Default)]
    pub struct LcdStatus: u8 {
        /// Mode 0 H-Blank Interrupt
        const MODE_0_H_INTERRUPT = 0b0000_1000;
        /// Mode 1 V-Blank Interrupt
        const MODE_1_V_INTERRUPT = 0b0001_0000;
        /// Mode 2 OAM Interrupt
        const MODE_2_OAM_INTERRUPT = 0b0010_0000;
        /// LYC=LY Coincidence Interrupt
        const COINCIDENCE_INTERRUPT = 0b0100_0000;
    }
}

bitflags! {
    /// The sprite attribute byte, the fourth byte of every OAM entry.
    #[derive(Default)]
    pub struct AttributeFlags: u8 {
        /// **CGB Mode Only** (OBP0-7)
        const PALETTE_NUMBER_CGB = 0b0000_0111;
        /// **CGB Mode Only** (0=Bank 0, 1=Bank 1)
        const TILE_VRAM_BANK = 0b0000_1000;
        /// **Non CGB Mode Only** (0=OBP0, 1=OBP1)
        const PALETTE_NUMBER = 0b0001_0000;
        /// (0=Normal, 1=Horizontally mirrored)
        const X_FLIP = 0b0010_0000;
        /// (0=Normal, 1=Vertically mirrored)
        const Y_FLIP = 0b0100_0000;
        /// (0=OBJ Above BG, 1=OBJ Behind BG color 1-3)
        const OBJ_TO_BG_PRIORITY = 0b1000_0000;
    }
}

impl AttributeFlags {
    pub fn get_cgb_palette_number(&self) -> usize {
        (self.bits() & 0x07) as usize
    }
}

bitflags! {
    /// The per-tile attribute byte held in VRAM bank 1 on CGB, parallel to
    /// the tile index in bank 0.
    #[derive(Default)]
    pub struct CgbTileAttribute: u8 {
        /// Background palette (BGP0-7)
        const BG_PALETTE_NUMBER = 0b0000_0111;
        /// (0=Bank 0, 1=Bank 1)
        const TILE_VRAM_BANK = 0b0000_1000;
        /// (0=Normal, 1=Horizontally mirrored)
        const X_FLIP = 0b0010_0000;
        /// (0=Normal, 1=Vertically mirrored)
        const Y_FLIP = 0b0100_0000;
        /// When set this tile shows above sprites unless LCDC.0 is off.
        const BG_TO_OAM_PRIORITY = 0b1000_0000;
    }
}

impl CgbTileAttribute {
    pub fn bg_palette_number(&self) -> usize {
        (self.bits() & 0x07) as usize
    }
}
