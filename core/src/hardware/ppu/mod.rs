//! The picture processing unit: a mode state machine clocked in M-cycles,
//! with a whole-scanline renderer run at the start of every transfer period.

use itertools::Itertools;
use num_integer::Integer;
use tinyvec::ArrayVec;

use crate::gb_emu::GameBoyModel;
use crate::hardware::mmu::{INVALID_READ, OAM_ATTRIBUTE_START};
use crate::hardware::ppu::cgb_palette::{CgbPalette, CgbPaletteIndex};
use crate::hardware::ppu::palette::{DisplayColourConfiguration, Palette};
use crate::hardware::ppu::register_flags::*;
use crate::hardware::ppu::tiledata::*;
use crate::io::interrupts::{InterruptFlags, Interrupts};

pub mod cgb_palette;
pub mod debugging_features;
pub mod palette;
pub mod register_flags;
pub mod tiledata;

pub const RESOLUTION_WIDTH: usize = 160;
pub const RESOLUTION_HEIGHT: usize = 144;
pub const FRAMEBUFFER_SIZE: usize = RESOLUTION_HEIGHT * RESOLUTION_WIDTH;

/// M-cycles per full scanline.
pub const SCANLINE_DURATION: u32 = 114;
/// M-cycles spent in OAM search (mode 2).
pub const OAM_SEARCH_DURATION: u32 = 20;
/// Minimum M-cycles spent in the pixel transfer (mode 3).
pub const BASE_TRANSFER_DURATION: u32 = 43;
/// The abbreviated first scanline right after the LCD is switched on.
const FIRST_LINE_HBLANK_DURATION: u32 = 18;

pub const LCD_CONTROL_REGISTER: u16 = 0xFF40;
pub const LCD_STATUS_REGISTER: u16 = 0xFF41;
/// Specifies the position in the 256x256 pixel BG map which is to be
/// displayed at the upper left LCD position; wraps on overflow.
pub const SCY_REGISTER: u16 = 0xFF42;
pub const SCX_REGISTER: u16 = 0xFF43;
/// LCDC Y-Coordinate (R). Values 144-153 indicate the V-Blank period.
pub const LY_REGISTER: u16 = 0xFF44;
/// LY Compare. When LY equals LYC the coincidence bit in STAT is set and
/// (if enabled) a STAT interrupt is requested.
pub const LYC_REGISTER: u16 = 0xFF45;
/// BG Palette Data (R/W) - Non CGB Mode Only.
pub const BG_PALETTE: u16 = 0xFF47;
/// Object Palette 0 Data (R/W) - Non CGB Mode Only.
pub const OB_PALETTE_0: u16 = 0xFF48;
/// Object Palette 1 Data (R/W) - Non CGB Mode Only.
pub const OB_PALETTE_1: u16 = 0xFF49;
pub const WY_REGISTER: u16 = 0xFF4A;
/// Window X Position minus 7 (R/W).
pub const WX_REGISTER: u16 = 0xFF4B;
pub const CGB_VRAM_BANK_REGISTER: u16 = 0xFF4F;
/// Index register for the CGB background palette memory.
pub const CGB_BACKGROUND_COLOR_INDEX: u16 = 0xFF68;
/// Data port for the CGB background palette memory, addressed through FF68.
pub const CGB_BACKGROUND_PALETTE_DATA: u16 = 0xFF69;
/// Index register for the CGB sprite palette memory.
pub const CGB_SPRITE_COLOR_INDEX: u16 = 0xFF6A;
pub const CGB_OBJECT_PALETTE_DATA: u16 = 0xFF6B;
/// While the DMG prioritizes sprites by x-coordinate, the CGB prioritizes
/// them by location in OAM; bit 0 of this register selects the DMG rule.
pub const CGB_OBJECT_PRIORITY_MODE: u16 = 0xFF6C;

#[derive(Debug, PartialOrd, PartialEq, Copy, Clone)]
pub enum Mode {
    HBlank,
    VBlank,
    OamSearch,
    LcdTransfer,
}

impl Mode {
    fn to_bits(self) -> u8 {
        match self {
            Mode::HBlank => 0,
            Mode::VBlank => 1,
            Mode::OamSearch => 2,
            Mode::LcdTransfer => 3,
        }
    }
}

/// What happened during this M-cycle, for the bus to act on (HDMA service,
/// frame pacing).
#[derive(Debug, Default, Copy, Clone)]
pub struct PpuEvents {
    pub hblank_started: bool,
    pub frame_ready: bool,
}

/// A sprite picked up during OAM search for the current scanline.
#[derive(Debug, Default, Copy, Clone)]
struct SelectedSprite {
    y_pos: u8,
    x_pos: u8,
    tile_number: u8,
    attribute_flags: AttributeFlags,
}

pub struct PPU {
    tiles: [Tile; TILES_PER_BANK * 2],
    tile_map_9800: TileMap,
    tile_map_9c00: TileMap,
    oam: Oam,

    lcd_control: LcdControl,
    lcd_status: LcdStatus,

    bg_window_palette: Palette,
    oam_palette_0: Palette,
    oam_palette_1: Palette,
    cgb_bg_palette: CgbPalette,
    cgb_bg_palette_ind: CgbPaletteIndex,
    cgb_obj_palette: CgbPalette,
    cgb_obj_palette_ind: CgbPaletteIndex,

    lyc_compare: u8,
    current_y: u8,
    scroll_x: u8,
    scroll_y: u8,
    window_x: u8,
    window_y: u8,
    window_counter: u8,
    vram_bank: u8,
    /// OPRI bit 0: `true` selects the DMG x-coordinate priority rule.
    dmg_object_priority: bool,

    mode: Mode,
    line_cycles: u32,
    transfer_duration: u32,
    first_line_after_enable: bool,
    stat_irq_level: bool,
    selected_sprites: ArrayVec<[SelectedSprite; 10]>,
    oam_dma_active: bool,

    frame_buffer: Box<[u32; FRAMEBUFFER_SIZE]>,
    scanline_buffer: [u32; RESOLUTION_WIDTH],
    scanline_colour_index: [u8; RESOLUTION_WIDTH],
    scanline_bg_priority: [bool; RESOLUTION_WIDTH],

    model: GameBoyModel,
    display_colours: DisplayColourConfiguration,
}

impl PPU {
    pub fn new(model: GameBoyModel, display_colours: DisplayColourConfiguration) -> Self {
        PPU {
            tiles: [Tile::default(); TILES_PER_BANK * 2],
            tile_map_9800: TileMap::new(),
            tile_map_9c00: TileMap::new(),
            oam: Oam::new(),
            lcd_control: LcdControl::from_bits_truncate(0x91),
            lcd_status: LcdStatus::default(),
            bg_window_palette: Palette::new(0xFC, display_colours.bg),
            oam_palette_0: Palette::new(0xFF, display_colours.sprite_0),
            oam_palette_1: Palette::new(0xFF, display_colours.sprite_1),
            cgb_bg_palette: CgbPalette::default(),
            cgb_bg_palette_ind: CgbPaletteIndex::default(),
            cgb_obj_palette: CgbPalette::default(),
            cgb_obj_palette_ind: CgbPaletteIndex::default(),
            lyc_compare: 0,
            current_y: 0,
            scroll_x: 0,
            scroll_y: 0,
            window_x: 0,
            window_y: 0,
            window_counter: 0,
            vram_bank: 0,
            dmg_object_priority: model.is_dmg(),
            mode: Mode::VBlank,
            line_cycles: 0,
            transfer_duration: BASE_TRANSFER_DURATION,
            first_line_after_enable: false,
            stat_irq_level: false,
            selected_sprites: ArrayVec::new(),
            oam_dma_active: false,
            frame_buffer: Box::new([0; FRAMEBUFFER_SIZE]),
            scanline_buffer: [0; RESOLUTION_WIDTH],
            scanline_colour_index: [0; RESOLUTION_WIDTH],
            scanline_bg_priority: [false; RESOLUTION_WIDTH],
            model,
            display_colours,
        }
    }

    /// Advance the PPU by one M-cycle.
    pub fn tick(&mut self, interrupts: &mut Interrupts) -> PpuEvents {
        let mut events = PpuEvents::default();

        if !self.lcd_control.contains(LcdControl::LCD_DISPLAY) {
            return events;
        }

        self.line_cycles += 1;

        match self.mode {
            Mode::HBlank if self.first_line_after_enable => {
                // The line right after enabling skips OAM search and runs a
                // shortened HBlank in its place.
                if self.line_cycles == FIRST_LINE_HBLANK_DURATION {
                    self.first_line_after_enable = false;
                    self.line_cycles = OAM_SEARCH_DURATION;
                    self.enter_transfer(interrupts);
                }
            }
            Mode::OamSearch => {
                if self.line_cycles == OAM_SEARCH_DURATION {
                    self.enter_transfer(interrupts);
                }
            }
            Mode::LcdTransfer => {
                if self.line_cycles == OAM_SEARCH_DURATION + self.transfer_duration {
                    self.mode = Mode::HBlank;
                    events.hblank_started = true;
                    self.update_stat_line(interrupts);
                }
            }
            Mode::HBlank => {
                if self.line_cycles == SCANLINE_DURATION {
                    self.line_cycles = 0;
                    self.current_y += 1;
                    if self.current_y == RESOLUTION_HEIGHT as u8 {
                        self.mode = Mode::VBlank;
                        events.frame_ready = true;
                        interrupts.insert_interrupt(InterruptFlags::VBLANK);
                    } else {
                        self.mode = Mode::OamSearch;
                    }
                    self.update_stat_line(interrupts);
                }
            }
            Mode::VBlank => {
                if self.line_cycles == SCANLINE_DURATION {
                    self.line_cycles = 0;
                    if self.current_y < RESOLUTION_HEIGHT as u8 {
                        // Power-on leaves us idling in VBlank on line 0; fall
                        // straight into the first visible line.
                        self.mode = Mode::OamSearch;
                    } else if self.current_y == 153 {
                        self.current_y = 0;
                        self.window_counter = 0;
                        self.mode = Mode::OamSearch;
                    } else {
                        self.current_y += 1;
                    }
                    self.update_stat_line(interrupts);
                }
            }
        }

        events
    }

    fn enter_transfer(&mut self, interrupts: &mut Interrupts) {
        self.mode = Mode::LcdTransfer;
        self.select_sprites();
        self.transfer_duration = BASE_TRANSFER_DURATION + self.transfer_stall();
        self.draw_scanline();
        self.update_stat_line(interrupts);
    }

    /// The variable part of mode 3: the fine-scroll discard plus the pixel
    /// pipeline drain per sprite, converted from T-cycles to M-cycles. HBlank
    /// shrinks by the same amount.
    fn transfer_stall(&self) -> u32 {
        let fine_scroll = ((self.scroll_x % 8) as u32).div_ceil(4);

        let mut sprite_t_cycles = 0u32;
        let mut seen_x: ArrayVec<[u8; 10]> = ArrayVec::new();
        for sprite in self.selected_sprites.iter() {
            sprite_t_cycles += 6;
            if !seen_x.contains(&sprite.x_pos) {
                seen_x.push(sprite.x_pos);
                let drain = (sprite.x_pos.wrapping_add(self.scroll_x) % 8) as u32;
                sprite_t_cycles += 5 - drain.min(5);
            }
        }

        (fine_scroll + sprite_t_cycles / 4).min(25)
    }

    /// Mode 2: pick up to 10 sprites covering the current scanline, in OAM
    /// order.
    fn select_sprites(&mut self) {
        let height = self.sprite_height() as i16;
        let ly = self.current_y as i16;

        self.selected_sprites.clear();
        for index in 0..40 {
            if self.selected_sprites.len() == 10 {
                break;
            }
            let sprite = self.oam.attribute(index);
            let top = sprite.y_pos as i16 - 16;
            if ly >= top && ly < top + height {
                self.selected_sprites.push(SelectedSprite {
                    y_pos: sprite.y_pos,
                    x_pos: sprite.x_pos,
                    tile_number: sprite.tile_number,
                    attribute_flags: sprite.attribute_flags,
                });
            }
        }
    }

    fn sprite_height(&self) -> u8 {
        if self.lcd_control.contains(LcdControl::SPRITE_SIZE) {
            16
        } else {
            8
        }
    }

    fn draw_scanline(&mut self) {
        if self.model.is_cgb() || self.lcd_control.contains(LcdControl::BG_WINDOW_PRIORITY) {
            self.draw_bg_scanline();

            if self.lcd_control.contains(LcdControl::WINDOW_DISPLAY) {
                self.draw_window_scanline();
            }
        } else {
            // DMG with LCDC.0 off: background and window blank out entirely.
            let blank = self.bg_window_palette.colour(0).to_argb();
            for px in 0..RESOLUTION_WIDTH {
                self.scanline_buffer[px] = blank;
                self.scanline_colour_index[px] = 0;
                self.scanline_bg_priority[px] = false;
            }
        }

        if self.lcd_control.contains(LcdControl::SPRITE_DISPLAY_ENABLE) {
            self.draw_sprite_scanline();
        }

        let start = self.current_y as usize * RESOLUTION_WIDTH;
        self.frame_buffer[start..start + RESOLUTION_WIDTH].copy_from_slice(&self.scanline_buffer);
    }

    fn draw_bg_scanline(&mut self) {
        let y = self.current_y.wrapping_add(self.scroll_y) as usize;
        let tile_row = y / 8;
        let pixel_row = y % 8;
        let use_9c00 = self.lcd_control.contains(LcdControl::BG_TILE_MAP_SELECT);

        for px in 0..RESOLUTION_WIDTH {
            let x = (self.scroll_x as usize + px) & 0xFF;
            let map_index = tile_row * 32 + x / 8;
            let (id, attributes) = self.map_entry(use_9c00, map_index);
            self.render_bg_pixel(px, id, attributes, x % 8, pixel_row);
        }
    }

    fn draw_window_scanline(&mut self) {
        let window_left = self.window_x as i16 - 7;
        // The window only renders once LY has reached WY and some part of it
        // is on screen.
        if self.current_y < self.window_y || window_left > 159 {
            return;
        }

        // The window keeps its own line counter which only advances on
        // scanlines where it was actually drawn.
        let y = self.window_counter as usize;
        let tile_row = y / 8;
        let pixel_row = y % 8;
        let use_9c00 = self.lcd_control.contains(LcdControl::WINDOW_MAP_SELECT);

        for px in window_left.max(0) as usize..RESOLUTION_WIDTH {
            let x = (px as i16 - window_left) as usize;
            let map_index = tile_row * 32 + x / 8;
            let (id, attributes) = self.map_entry(use_9c00, map_index);
            self.render_bg_pixel(px, id, attributes, x % 8, pixel_row);
        }

        self.window_counter += 1;
    }

    fn map_entry(&self, use_9c00: bool, map_index: usize) -> (u8, CgbTileAttribute) {
        let map = if use_9c00 { &self.tile_map_9c00 } else { &self.tile_map_9800 };
        (map.data[map_index], map.attributes[map_index])
    }

    fn render_bg_pixel(
        &mut self,
        px: usize,
        id: u8,
        attributes: CgbTileAttribute,
        mut col: usize,
        mut row: usize,
    ) {
        let mut tile_index = self.bg_tile_index(id);

        let argb = if self.model.is_cgb() {
            if attributes.contains(CgbTileAttribute::X_FLIP) {
                col = 7 - col;
            }
            if attributes.contains(CgbTileAttribute::Y_FLIP) {
                row = 7 - row;
            }
            if attributes.contains(CgbTileAttribute::TILE_VRAM_BANK) {
                tile_index += TILES_PER_BANK;
            }
            let colour_index = self.tiles[tile_index].pixel(col, row);
            self.scanline_colour_index[px] = colour_index;
            self.scanline_bg_priority[px] =
                attributes.contains(CgbTileAttribute::BG_TO_OAM_PRIORITY);
            self.cgb_bg_palette
                .rgb(attributes.bg_palette_number(), colour_index as usize)
                .to_argb()
        } else {
            let colour_index = self.tiles[tile_index].pixel(col, row);
            self.scanline_colour_index[px] = colour_index;
            self.scanline_bg_priority[px] = false;
            self.bg_window_palette.colour(colour_index).to_argb()
        };

        self.scanline_buffer[px] = argb;
    }

    /// Resolve a tile map id to a tile slot, honoring LCDC.4's signed
    /// addressing mode.
    fn bg_tile_index(&self, id: u8) -> usize {
        if self.lcd_control.contains(LcdControl::BG_WINDOW_TILE_SELECT) {
            id as usize
        } else {
            (256 + (id as i8 as i16)) as usize
        }
    }

    fn draw_sprite_scanline(&mut self) {
        let tall_sprites = self.lcd_control.contains(LcdControl::SPRITE_SIZE);
        let height = self.sprite_height();
        let is_cgb = self.model.is_cgb();
        let bg_has_priority = self.lcd_control.contains(LcdControl::BG_WINDOW_PRIORITY);

        // Draw rearmost first so that overdraw realizes the priority rule.
        // With x-priority a lower x always wins; otherwise a lower OAM index
        // wins.
        let draw_list: Vec<SelectedSprite> = if self.dmg_object_priority {
            self.selected_sprites.iter().copied().sorted_by_key(|s| s.x_pos).rev().collect()
        } else {
            self.selected_sprites.iter().copied().rev().collect()
        };

        for sprite in draw_list {
            let screen_x = sprite.x_pos as i16 - 8;
            let flags = sprite.attribute_flags;

            let mut line = (self.current_y as i16 - (sprite.y_pos as i16 - 16)) as u8;
            if flags.contains(AttributeFlags::Y_FLIP) {
                line = height - 1 - line;
            }

            let mut tile_number = sprite.tile_number as usize;
            if tall_sprites {
                tile_number &= 0xFE;
                if line >= 8 {
                    tile_number |= 0x1;
                }
            }
            if is_cgb && flags.contains(AttributeFlags::TILE_VRAM_BANK) {
                tile_number += TILES_PER_BANK;
            }
            let row = (line % 8) as usize;

            for j in 0..8i16 {
                let pixel = screen_x + j;
                if !(0..RESOLUTION_WIDTH as i16).contains(&pixel) {
                    continue;
                }
                let pixel = pixel as usize;

                let col = if flags.contains(AttributeFlags::X_FLIP) {
                    (7 - j) as usize
                } else {
                    j as usize
                };

                let colour_index = self.tiles[tile_number].pixel(col, row);
                // Colour 0 is always transparent for sprites.
                if colour_index == 0 {
                    continue;
                }

                let bg_index = self.scanline_colour_index[pixel];
                if is_cgb {
                    // With master priority off the sprite always shows;
                    // otherwise both the tile attribute and the sprite flag
                    // can put non-zero BG pixels on top.
                    if bg_has_priority
                        && bg_index != 0
                        && (self.scanline_bg_priority[pixel]
                            || flags.contains(AttributeFlags::OBJ_TO_BG_PRIORITY))
                    {
                        continue;
                    }
                } else if flags.contains(AttributeFlags::OBJ_TO_BG_PRIORITY) && bg_index != 0 {
                    continue;
                }

                self.scanline_buffer[pixel] = if is_cgb {
                    self.cgb_obj_palette
                        .rgb(flags.get_cgb_palette_number(), colour_index as usize)
                        .to_argb()
                } else if flags.contains(AttributeFlags::PALETTE_NUMBER) {
                    self.oam_palette_1.colour(colour_index).to_argb()
                } else {
                    self.oam_palette_0.colour(colour_index).to_argb()
                };
            }
        }
    }

    /// Recompute the level-triggered STAT interrupt line and request an LCD
    /// interrupt on its rising edge. Callers batch all register/mode changes
    /// of an M-cycle before invoking this once.
    pub fn update_stat_line(&mut self, interrupts: &mut Interrupts) {
        if !self.lcd_control.contains(LcdControl::LCD_DISPLAY) {
            return;
        }

        let old_level = self.stat_irq_level;

        let mut level = match self.mode {
            Mode::HBlank => self.lcd_status.contains(LcdStatus::MODE_0_H_INTERRUPT),
            Mode::VBlank if self.model.is_dmg() => {
                // DMG quirk: the mode 2 source also participates in VBlank.
                self.lcd_status.contains(LcdStatus::MODE_1_V_INTERRUPT)
                    || self.lcd_status.contains(LcdStatus::MODE_2_OAM_INTERRUPT)
            }
            Mode::VBlank => self.lcd_status.contains(LcdStatus::MODE_1_V_INTERRUPT),
            Mode::OamSearch => self.lcd_status.contains(LcdStatus::MODE_2_OAM_INTERRUPT),
            Mode::LcdTransfer => false,
        };

        if self.lcd_status.contains(LcdStatus::COINCIDENCE_INTERRUPT)
            && self.current_y == self.lyc_compare
        {
            level = true;
        }

        self.stat_irq_level = level;
        if level && !old_level {
            interrupts.insert_interrupt(InterruptFlags::LCD);
        }
    }

    pub fn frame_buffer(&self) -> &[u32; FRAMEBUFFER_SIZE] {
        &self.frame_buffer
    }

    pub fn get_current_mode(&self) -> Mode {
        self.mode
    }

    pub fn current_line(&self) -> u8 {
        self.current_y
    }

    pub fn set_oam_dma_active(&mut self, active: bool) {
        self.oam_dma_active = active;
    }

    /// OAM writes coming from the DMA engine bypass the access gates.
    pub fn write_oam_dma(&mut self, offset: u8, value: u8) {
        self.oam.write_byte(offset as usize, value);
    }

    pub fn update_display_colours(&mut self, colours: DisplayColourConfiguration) {
        self.display_colours = colours;
        self.bg_window_palette = Palette::new(self.bg_window_palette.into(), colours.bg);
        self.oam_palette_0 = Palette::new(self.oam_palette_0.into(), colours.sprite_0);
        self.oam_palette_1 = Palette::new(self.oam_palette_1.into(), colours.sprite_1);
    }

    /// Can always access VRAM unless the PPU is pushing pixels (mode 3).
    fn can_access_vram(&self) -> bool {
        self.mode != Mode::LcdTransfer
    }

    /// OAM is locked during both OAM search and transfer, and while the OAM
    /// DMA engine owns it.
    fn can_access_oam(&self) -> bool {
        self.mode != Mode::OamSearch && self.mode != Mode::LcdTransfer && !self.oam_dma_active
    }

    pub fn read_vram(&self, address: u16) -> u8 {
        match address {
            TILE_BLOCK_0_START..=TILE_BLOCK_2_END if self.can_access_vram() => {
                let (tile, byte) = tile_slot(address, self.vram_bank);
                self.tiles[tile].read_byte(byte)
            }
            TILE_BLOCK_0_START..=TILE_BLOCK_2_END => INVALID_READ,
            TILEMAP_9800_START..=TILEMAP_9C00_END if self.can_access_vram() => {
                self.read_tilemap_byte(address)
            }
            TILEMAP_9800_START..=TILEMAP_9C00_END => INVALID_READ,
            0xFE00..=0xFE9F if self.can_access_oam() => {
                self.oam.read_byte((address - OAM_ATTRIBUTE_START) as usize)
            }
            0xFE00..=0xFE9F => INVALID_READ,
            LCD_CONTROL_REGISTER => self.lcd_control.bits(),
            LCD_STATUS_REGISTER => self.get_lcd_status(),
            SCY_REGISTER => self.scroll_y,
            SCX_REGISTER => self.scroll_x,
            LY_REGISTER => self.current_y,
            LYC_REGISTER => self.lyc_compare,
            BG_PALETTE => self.bg_window_palette.into(),
            OB_PALETTE_0 => self.oam_palette_0.into(),
            OB_PALETTE_1 => self.oam_palette_1.into(),
            WY_REGISTER => self.window_y,
            WX_REGISTER => self.window_x,
            CGB_VRAM_BANK_REGISTER if self.model.is_cgb() => 0xFE | self.vram_bank,
            CGB_BACKGROUND_COLOR_INDEX if self.model.is_cgb() => self.cgb_bg_palette_ind.get_value(),
            CGB_BACKGROUND_PALETTE_DATA if self.model.is_cgb() && self.can_access_vram() => {
                self.cgb_bg_palette.read_data(&self.cgb_bg_palette_ind)
            }
            CGB_SPRITE_COLOR_INDEX if self.model.is_cgb() => self.cgb_obj_palette_ind.get_value(),
            CGB_OBJECT_PALETTE_DATA if self.model.is_cgb() && self.can_access_vram() => {
                self.cgb_obj_palette.read_data(&self.cgb_obj_palette_ind)
            }
            CGB_OBJECT_PRIORITY_MODE if self.model.is_cgb() => {
                0xFE | self.dmg_object_priority as u8
            }
            _ => INVALID_READ,
        }
    }

    pub fn write_vram(&mut self, address: u16, value: u8, interrupts: &mut Interrupts) {
        match address {
            TILE_BLOCK_0_START..=TILE_BLOCK_2_END if self.can_access_vram() => {
                let (tile, byte) = tile_slot(address, self.vram_bank);
                self.tiles[tile].write_byte(byte, value);
            }
            TILEMAP_9800_START..=TILEMAP_9C00_END if self.can_access_vram() => {
                self.write_tilemap_byte(address, value)
            }
            0xFE00..=0xFE9F if self.can_access_oam() => {
                self.oam.write_byte((address - OAM_ATTRIBUTE_START) as usize, value)
            }
            LCD_CONTROL_REGISTER => self.set_lcd_control(value, interrupts),
            LCD_STATUS_REGISTER => self.set_lcd_status(value, interrupts),
            SCY_REGISTER => self.scroll_y = value,
            SCX_REGISTER => self.scroll_x = value,
            LY_REGISTER => log::debug!("ROM tried to write to LY with value: {}", value),
            LYC_REGISTER => {
                self.lyc_compare = value;
                self.update_stat_line(interrupts);
            }
            BG_PALETTE => {
                self.bg_window_palette = Palette::new(value, self.display_colours.bg)
            }
            OB_PALETTE_0 => {
                self.oam_palette_0 = Palette::new(value, self.display_colours.sprite_0)
            }
            OB_PALETTE_1 => {
                self.oam_palette_1 = Palette::new(value, self.display_colours.sprite_1)
            }
            WY_REGISTER => self.window_y = value,
            WX_REGISTER => self.window_x = value,
            CGB_VRAM_BANK_REGISTER if self.model.is_cgb() => self.vram_bank = value & 0x1,
            CGB_BACKGROUND_COLOR_INDEX if self.model.is_cgb() => {
                self.cgb_bg_palette_ind.set_value(value)
            }
            CGB_BACKGROUND_PALETTE_DATA if self.model.is_cgb() && self.can_access_vram() => {
                self.cgb_bg_palette.write_data(&mut self.cgb_bg_palette_ind, value)
            }
            CGB_SPRITE_COLOR_INDEX if self.model.is_cgb() => {
                self.cgb_obj_palette_ind.set_value(value)
            }
            CGB_OBJECT_PALETTE_DATA if self.model.is_cgb() && self.can_access_vram() => {
                self.cgb_obj_palette.write_data(&mut self.cgb_obj_palette_ind, value)
            }
            CGB_OBJECT_PRIORITY_MODE if self.model.is_cgb() => {
                self.dmg_object_priority = value & 0x1 != 0
            }
            // Blocked or unmapped writes fall away silently.
            _ => {}
        }
    }

    fn read_tilemap_byte(&self, address: u16) -> u8 {
        let (map, index) = if address <= TILEMAP_9800_END {
            (&self.tile_map_9800, (address - TILEMAP_9800_START) as usize)
        } else {
            (&self.tile_map_9c00, (address - TILEMAP_9C00_START) as usize)
        };
        if self.vram_bank == 0 {
            map.data[index]
        } else {
            map.attributes[index].bits()
        }
    }

    fn write_tilemap_byte(&mut self, address: u16, value: u8) {
        let vram_bank = self.vram_bank;
        let (map, index) = if address <= TILEMAP_9800_END {
            (&mut self.tile_map_9800, (address - TILEMAP_9800_START) as usize)
        } else {
            (&mut self.tile_map_9c00, (address - TILEMAP_9C00_START) as usize)
        };
        if vram_bank == 0 {
            map.data[index] = value;
        } else {
            map.attributes[index] = CgbTileAttribute::from_bits_truncate(value);
        }
    }

    /// STAT composes its mode and coincidence bits from live state; bit 7 is
    /// always set. While the LCD is off the mode reports as 0.
    fn get_lcd_status(&self) -> u8 {
        let mode_bits = if self.lcd_control.contains(LcdControl::LCD_DISPLAY) {
            self.mode.to_bits()
        } else {
            0
        };
        let coincidence = ((self.current_y == self.lyc_compare) as u8) << 2;
        0x80 | self.lcd_status.bits() | coincidence | mode_bits
    }

    fn set_lcd_status(&mut self, value: u8, interrupts: &mut Interrupts) {
        // DMG hardware quirk: for one cycle the write behaves as if 0xF8 was
        // written, which can raise a spurious STAT interrupt.
        if self.model.is_dmg() {
            self.lcd_status = LcdStatus::from_bits_truncate(0x78);
            self.update_stat_line(interrupts);
        }

        self.lcd_status = LcdStatus::from_bits_truncate(value & 0x78);
        self.update_stat_line(interrupts);
    }

    fn set_lcd_control(&mut self, value: u8, interrupts: &mut Interrupts) {
        let was_on = self.lcd_control.contains(LcdControl::LCD_DISPLAY);
        self.lcd_control = LcdControl::from_bits_truncate(value);
        let is_on = self.lcd_control.contains(LcdControl::LCD_DISPLAY);

        if was_on && !is_on {
            self.turn_off_lcd();
        } else if !was_on && is_on {
            self.turn_on_lcd(interrupts);
        }
    }

    fn turn_off_lcd(&mut self) {
        log::debug!("Turning off LCD");
        self.current_y = 0;
        self.window_counter = 0;
        self.line_cycles = 0;
        self.mode = Mode::HBlank;
        self.stat_irq_level = false;
    }

    fn turn_on_lcd(&mut self, interrupts: &mut Interrupts) {
        log::debug!("Turning on LCD");
        self.current_y = 0;
        self.line_cycles = 0;
        self.mode = Mode::HBlank;
        self.first_line_after_enable = true;
        self.update_stat_line(interrupts);
    }
}

/// Split a VRAM address into the owning tile slot and byte offset within it.
fn tile_slot(address: u16, vram_bank: u8) -> (usize, usize) {
    let relative = (address - TILE_BLOCK_0_START) as usize;
    (
        TILES_PER_BANK * vram_bank as usize + relative / 16,
        relative % 16,
    )
}
