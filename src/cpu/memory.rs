use crate::cartridge::Cartridge;

/// Byte-addressable 64 KB address space as seen by the CPU.
///
/// Accesses never fail. Whatever sits behind an address (ROM, RAM, open
/// bus) is the implementation's business; the CPU only reads and writes.
pub trait Memory {
    fn read_byte(&self, address: u16) -> u8;

    fn write_byte(&mut self, address: u16, byte: u8);

    /// Little-endian: low byte at `address`, high byte at `address + 1`.
    fn read_word(&self, address: u16) -> u16 {
        let low = self.read_byte(address) as u16;
        let high = self.read_byte(address.wrapping_add(1)) as u16;
        (high << 8) | low
    }

    fn write_word(&mut self, address: u16, value: u16) {
        self.write_byte(address, (value & 0xFF) as u8);
        self.write_byte(address.wrapping_add(1), (value >> 8) as u8);
    }

    /// Restore the backing store to the loaded ROM image.
    fn reset(&mut self);
}

const ROM_END: u16 = 0x7FFF;
const RAM_START: u16 = 0x8000;
const RAM_SIZE: usize = 0x8000;

/// ROM at 0x0000-0x7FFF, plain RAM at 0x8000-0xFFFF.
pub struct MemoryBus {
    pub cartridge: Cartridge,
    ram: Box<[u8; RAM_SIZE]>,
    /// Writes to the ROM window land in `rom_overlay` instead of being dropped.
    rom_overlay: Option<Box<[u8; RAM_SIZE]>>,
}

impl MemoryBus {
    pub fn new(cartridge: Cartridge) -> Self {
        MemoryBus {
            cartridge,
            ram: Box::new([0; RAM_SIZE]),
            rom_overlay: None,
        }
    }

    /// A fully writable 64 KB store seeded from `cartridge`. `reset()` puts
    /// the ROM bytes back.
    pub fn flat(cartridge: Cartridge) -> Self {
        let mut bus = MemoryBus::new(cartridge);
        bus.rom_overlay = Some(Box::new([0; RAM_SIZE]));
        bus.reload_overlay();
        bus
    }

    fn reload_overlay(&mut self) {
        if let Some(overlay) = self.rom_overlay.as_deref_mut() {
            for (address, byte) in overlay.iter_mut().enumerate() {
                *byte = self.cartridge.read_byte(address as u16);
            }
        }
    }

    /// Copy `bytes` in starting at `address`. On a flat bus this also reaches
    /// the ROM window; otherwise bytes aimed at ROM are dropped.
    pub fn load(&mut self, address: u16, bytes: &[u8]) {
        for (offset, &byte) in bytes.iter().enumerate() {
            let addr = address.wrapping_add(offset as u16);
            match (addr, self.rom_overlay.as_deref_mut()) {
                (0x0000..=ROM_END, Some(overlay)) => overlay[addr as usize] = byte,
                (0x0000..=ROM_END, None) => {}
                _ => self.ram[(addr - RAM_START) as usize] = byte,
            }
        }
    }
}

impl Memory for MemoryBus {
    fn read_byte(&self, address: u16) -> u8 {
        match address {
            0x0000..=ROM_END => match &self.rom_overlay {
                Some(overlay) => overlay[address as usize],
                None => self.cartridge.read_byte(address),
            },
            _ => self.ram[(address - RAM_START) as usize],
        }
    }

    fn write_byte(&mut self, address: u16, byte: u8) {
        match address {
            0x0000..=ROM_END => {
                if let Some(overlay) = self.rom_overlay.as_deref_mut() {
                    overlay[address as usize] = byte;
                }
            }
            _ => self.ram[(address - RAM_START) as usize] = byte,
        }
    }

    fn reset(&mut self) {
        self.ram.fill(0);
        self.reload_overlay();
    }
}

impl Default for MemoryBus {
    fn default() -> Self {
        MemoryBus::flat(Cartridge::default())
    }
}
