//! Sharp LR35902 instruction core with a minimal DMG host around it.

pub mod cartridge;
pub mod config;
pub mod cpu;
pub mod debug;
pub mod filters;
pub mod gameboy;
pub mod ppu;

pub use cartridge::{Cartridge, RomError};
pub use cpu::{CpuError, CpuOptions, Memory, MemoryBus, CPU};
pub use gameboy::GameBoy;
