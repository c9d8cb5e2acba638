//! Renders of the full background map and the tile set, for debug overlays.
//! These are pulled on demand by a frontend and play no part in emulation.

use crate::hardware::ppu::register_flags::LcdControl;
use crate::hardware::ppu::tiledata::TILES_PER_BANK;
use crate::hardware::ppu::PPU;

pub const BACKGROUND_MAP_WIDTH: usize = 256;
pub const BACKGROUND_MAP_SIZE: usize = 256 * 256;

impl PPU {
    /// Render the currently selected 32x32 background map as a full
    /// 256x256 image, ignoring scroll.
    pub fn render_background_map(&mut self) -> Vec<u32> {
        let mut buffer = vec![0u32; BACKGROUND_MAP_SIZE];
        let use_9c00 = self.lcd_control.contains(LcdControl::BG_TILE_MAP_SELECT);

        for map_index in 0..1024 {
            let (id, _) = self.map_entry(use_9c00, map_index);
            let tile_index = self.bg_tile_index(id);
            let origin_x = (map_index % 32) * 8;
            let origin_y = (map_index / 32) * 8;

            for y in 0..8 {
                for x in 0..8 {
                    let colour_index = self.tiles[tile_index].pixel(x, y);
                    buffer[(origin_y + y) * BACKGROUND_MAP_WIDTH + origin_x + x] =
                        self.bg_window_palette.colour(colour_index).to_argb();
                }
            }
        }

        buffer
    }

    /// Render the full tile set, 16 tiles per row and bank: 128x192 on DMG,
    /// 256x192 on CGB with the second bank to the right of the first.
    pub fn render_tileset(&mut self) -> Vec<u32> {
        let banks = if self.model.is_cgb() { 2 } else { 1 };
        let width = banks * 16 * 8;
        let mut buffer = vec![0u32; banks * TILES_PER_BANK * 64];

        for tile_index in 0..banks * TILES_PER_BANK {
            let bank = tile_index / TILES_PER_BANK;
            let slot = tile_index % TILES_PER_BANK;
            let origin_x = bank * 128 + (slot % 16) * 8;
            let origin_y = (slot / 16) * 8;
            for y in 0..8 {
                for x in 0..8 {
                    let colour_index = self.tiles[tile_index].pixel(x, y);
                    buffer[(origin_y + y) * width + origin_x + x] =
                        self.bg_window_palette.colour(colour_index).to_argb();
                }
            }
        }

        buffer
    }
}
