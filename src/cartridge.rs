use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RomError {
    #[error("failed to read ROM {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("ROM image is empty")]
    Empty,
}

/// Raw cartridge dump. Mapped unmodified at address 0; no header parsing and
/// no bank switching, so only the first 32 KB are ever visible.
pub struct Cartridge {
    rom: Vec<u8>,
    path: Option<PathBuf>,
}

impl Cartridge {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Cartridge, RomError> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|source| RomError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut cartridge = Cartridge::from_bytes(data)?;
        log::info!("Loaded {} ({} bytes)", path.display(), cartridge.len());
        if cartridge.len() > 0x8000 {
            log::warn!("ROM is larger than 32 KB; banked data beyond 0x7FFF is not mapped");
        }
        cartridge.path = Some(path.to_path_buf());
        Ok(cartridge)
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Cartridge, RomError> {
        if data.is_empty() {
            return Err(RomError::Empty);
        }
        Ok(Cartridge { rom: data, path: None })
    }

    pub fn read_byte(&self, address: u16) -> u8 {
        self.rom.get(address as usize).copied().unwrap_or(0xFF)
    }

    pub fn len(&self) -> usize {
        self.rom.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rom.is_empty()
    }

    pub fn rom_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl Default for Cartridge {
    fn default() -> Self {
        Cartridge {
            rom: vec![0; 0x8000],
            path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_image_is_rejected() {
        assert!(matches!(Cartridge::from_bytes(Vec::new()), Err(RomError::Empty)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Cartridge::from_file("/nonexistent/rom.gb").err().unwrap();
        assert!(err.to_string().contains("/nonexistent/rom.gb"));
    }

    #[test]
    fn from_file_remembers_path() {
        let path = std::env::temp_dir().join(format!("gb_core_rom_{}.gb", std::process::id()));
        fs::write(&path, [0x00, 0x76]).unwrap();

        let cart = Cartridge::from_file(&path).unwrap();

        assert_eq!(cart.rom_path(), Some(path.as_path()));
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.read_byte(1), 0x76);
        let _ = fs::remove_file(&path);
        assert_eq!(Cartridge::from_bytes(vec![0x00]).unwrap().rom_path(), None);
    }

    #[test]
    fn reads_past_end_are_open_bus() {
        let cart = Cartridge::from_bytes(vec![0x12]).unwrap();
        assert_eq!(cart.read_byte(0), 0x12);
        assert_eq!(cart.read_byte(1), 0xFF);
    }
}
