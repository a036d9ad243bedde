/// Tint applied when turning grayscale frame bytes into window pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Palette {
    Grayscale,
    Green,
}

impl Palette {
    pub fn from_name(name: &str) -> Option<Palette> {
        match name {
            "Grayscale" => Some(Palette::Grayscale),
            "Green" | "DMG Green" => Some(Palette::Green),
            _ => None,
        }
    }

    /// 0x00RRGGBB for an intensity byte.
    pub fn color(self, intensity: u8) -> u32 {
        let v = intensity as u32;
        match self {
            Palette::Grayscale => (v << 16) | (v << 8) | v,
            // Scale between the darkest and lightest DMG greens.
            Palette::Green => {
                let lerp = |dark: u32, light: u32| dark + (light - dark) * v / 255;
                (lerp(0x0F, 0x9B) << 16) | (lerp(0x38, 0xBC) << 8) | lerp(0x0F, 0x0F)
            }
        }
    }
}

/// Convert an RGBA8888 frame to minifb's 0RGB words, using the red channel as
/// intensity.
pub fn rgba_to_window(rgba: &[u8], dst: &mut [u32], palette: Palette) {
    for (pixel, out) in rgba.chunks_exact(4).zip(dst.iter_mut()) {
        *out = palette.color(pixel[0]);
    }
}

pub fn apply_scanlines(buf: &mut [u32], width: usize, height: usize) {
    for y in (1..height).step_by(2) {
        let row_start = y * width;
        for c in &mut buf[row_start..row_start + width] {
            let r = ((*c >> 16) & 0xFF) * 60 / 100;
            let g = ((*c >> 8) & 0xFF) * 60 / 100;
            let b = (*c & 0xFF) * 60 / 100;
            *c = (r << 16) | (g << 8) | b;
        }
    }
}
