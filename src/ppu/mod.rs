//! Minimal video unit: the 160x144 bytes starting at VRAM_BASE are read
//! row-major and each byte is shown as a grayscale intensity.

use crate::cpu::Memory;

pub const SCREEN_WIDTH: usize = 160;
pub const SCREEN_HEIGHT: usize = 144;
pub const VRAM_BASE: u16 = 0x8000;

/// Bytes per RGBA8888 pixel.
pub const BYTES_PER_PIXEL: usize = 4;

pub struct Ppu {
    framebuffer: Vec<u8>,
}

impl Ppu {
    /// Rebuild the RGBA framebuffer from memory.
    pub fn render<M: Memory>(&mut self, memory: &M) {
        render_frame(memory, &mut self.framebuffer);
    }

    pub fn framebuffer(&self) -> &[u8] {
        &self.framebuffer
    }
}

impl Default for Ppu {
    fn default() -> Self {
        Ppu {
            framebuffer: vec![0; SCREEN_WIDTH * SCREEN_HEIGHT * BYTES_PER_PIXEL],
        }
    }
}

/// Fill `buffer` (at least 160*144*4 bytes) with the frame. Alpha is always 255.
pub fn render_frame<M: Memory>(memory: &M, buffer: &mut [u8]) {
    let pixels = buffer
        .chunks_exact_mut(BYTES_PER_PIXEL)
        .take(SCREEN_WIDTH * SCREEN_HEIGHT);
    for (index, pixel) in pixels.enumerate() {
        let addr = VRAM_BASE.wrapping_add(index as u16);
        let value = memory.read_byte(addr);
        pixel.copy_from_slice(&[value, value, value, 0xFF]);
    }
}
