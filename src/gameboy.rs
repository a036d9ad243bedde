use crate::cartridge::Cartridge;
use crate::cpu::{CpuError, CpuOptions, Memory, MemoryBus, RunState, Slack, CPU};
use crate::ppu::Ppu;

/// T-states in one 59.7 Hz frame.
pub const CYCLES_PER_FRAME: u32 = 70224;

/// What one call to `run_frame` accomplished.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    pub cycles: u32,
    /// Sum of the per-tick slack over the frame.
    pub slack: Slack,
}

pub struct GameBoy<M: Memory = MemoryBus> {
    pub cpu: CPU<M>,
    pub ppu: Ppu,
}

impl GameBoy<MemoryBus> {
    /// Map `cartridge` at address 0 and bring the CPU out of reset.
    pub fn new(cartridge: Cartridge, options: CpuOptions, skip_boot: bool) -> Self {
        let mut gb = GameBoy::with_bus(MemoryBus::new(cartridge), options);
        if skip_boot {
            gb.cpu.apply_post_boot_state();
        }
        gb
    }

    /// One-line description of a fatal CPU error, naming the ROM when it
    /// came from a file.
    pub fn error_report(&self, err: &CpuError) -> String {
        match self.cpu.bus.cartridge.rom_path() {
            Some(path) => format!("CPU error in {}: {}", path.display(), err),
            None => format!("CPU error: {}", err),
        }
    }
}

impl<M: Memory> GameBoy<M> {
    pub fn with_bus(bus: M, options: CpuOptions) -> Self {
        let mut cpu = CPU::with_options(bus, options);
        cpu.reset();
        GameBoy {
            cpu,
            ppu: Ppu::default(),
        }
    }

    /// Tick the CPU until a frame's worth of T-states has run, then redraw.
    /// Stops at the first CPU error; the CPU is locked by then.
    pub fn run_frame(&mut self) -> Result<Frame, CpuError> {
        let mut frame = Frame {
            cycles: 0,
            slack: Slack::default(),
        };
        while frame.cycles < CYCLES_PER_FRAME {
            let tick = self.cpu.tick()?;
            frame.cycles += tick.cycles as u32;
            frame.slack += tick.slack;
        }
        self.ppu.render(&self.cpu.bus);
        Ok(frame)
    }

    pub fn framebuffer(&self) -> &[u8] {
        self.ppu.framebuffer()
    }

    /// True once the CPU has executed HALT or STOP and is waiting.
    pub fn is_waiting(&self) -> bool {
        matches!(self.cpu.state, RunState::Halted | RunState::Stopped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ppu::VRAM_BASE;

    fn gameboy(program: &[u8]) -> GameBoy {
        let mut rom = vec![0; 0x8000];
        rom[..program.len()].copy_from_slice(program);
        GameBoy::new(Cartridge::from_bytes(rom).unwrap(), CpuOptions::default(), false)
    }

    #[test]
    fn frame_runs_at_least_one_frame_of_cycles() {
        // JR -2 forever.
        let mut gb = gameboy(&[0x18, 0xFE]);
        let frame = gb.run_frame().unwrap();
        assert!(frame.cycles >= CYCLES_PER_FRAME);
        assert!(frame.cycles < CYCLES_PER_FRAME + 24);
        assert_eq!(gb.cpu.pc, 0x0000);
    }

    #[test]
    fn frame_shows_what_the_program_drew() {
        // LD A,$7F; LD ($8000),A; HALT
        let mut gb = gameboy(&[0x3E, 0x7F, 0xEA, 0x00, 0x80, 0x76]);
        gb.run_frame().unwrap();
        assert!(gb.is_waiting());
        assert_eq!(gb.cpu.bus.read_byte(VRAM_BASE), 0x7F);
        assert_eq!(&gb.framebuffer()[0..4], &[0x7F, 0x7F, 0x7F, 0xFF]);
    }

    #[test]
    fn invalid_opcode_ends_the_frame() {
        let mut gb = gameboy(&[0x00, 0xD3]);
        let err = gb.run_frame().unwrap_err();
        assert_eq!(err, CpuError::InvalidOpcode { opcode: 0xD3, address: 0x0001 });
        assert_eq!(gb.cpu.state, RunState::Locked);
    }

    #[test]
    fn error_report_names_rom_file() {
        let path = std::env::temp_dir().join(format!("gb_core_crash_{}.gb", std::process::id()));
        std::fs::write(&path, [0x00, 0xDD]).unwrap();
        let mut gb = GameBoy::new(Cartridge::from_file(&path).unwrap(), CpuOptions::default(), false);
        let _ = std::fs::remove_file(&path);

        let err = gb.run_frame().unwrap_err();
        let report = gb.error_report(&err);

        assert!(report.contains(&path.display().to_string()));
        assert!(report.contains("0xDD"));
    }

    #[test]
    fn error_report_without_file() {
        let gb = gameboy(&[]);
        let err = CpuError::InvalidOpcode { opcode: 0xE4, address: 0x0150 };
        assert_eq!(gb.error_report(&err), "CPU error: invalid opcode 0xE4 at 0x0150");
    }

    #[test]
    fn skip_boot_starts_at_cartridge_entry() {
        let gb = GameBoy::new(Cartridge::default(), CpuOptions::default(), true);
        assert_eq!(gb.cpu.pc, 0x0100);
        assert_eq!(gb.cpu.sp, 0xFFFE);
        assert_eq!(gb.cpu.registers.get_af(), 0x01B0);
    }
}
