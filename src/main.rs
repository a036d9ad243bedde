use gb_core::config::Config;
use gb_core::filters;
use gb_core::gameboy::Frame;
use gb_core::ppu::{SCREEN_HEIGHT, SCREEN_WIDTH};
use gb_core::{Cartridge, CpuError, GameBoy};

use minifb::{Key, Window, WindowOptions};

struct Args {
    headless: bool,
    frames: u32,
    trace: bool,
    rom: String,
}

fn usage(program: &str) -> ! {
    eprintln!("Usage: {} [--headless] [--frames N] [--trace] <rom.gb>", program);
    std::process::exit(1);
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("gb_core");
    let mut parsed = Args {
        headless: false,
        // ~30 seconds of emulated time.
        frames: 1800,
        trace: false,
        rom: String::new(),
    };

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--headless" => parsed.headless = true,
            "--trace" => parsed.trace = true,
            "--frames" => match iter.next().and_then(|n| n.parse().ok()) {
                Some(n) => parsed.frames = n,
                None => usage(program),
            },
            other if other.starts_with("--") => usage(program),
            rom => parsed.rom = rom.to_string(),
        }
    }
    if parsed.rom.is_empty() {
        usage(program);
    }
    parsed
}

fn main() {
    let args = parse_args();

    let default_level = if args.trace { "trace" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let config = Config::load();

    let cartridge = Cartridge::from_file(&args.rom).unwrap_or_else(|e| {
        eprintln!("Error loading ROM: {}", e);
        std::process::exit(1);
    });

    let mut gb = GameBoy::new(cartridge, config.cpu_options(), config.cpu.skip_boot);

    let result = if args.headless {
        run_headless(&mut gb, args.frames)
    } else {
        run_windowed(&mut gb, &config)
    };

    if let Err(e) = result {
        eprintln!("{}", gb.error_report(&e));
        std::process::exit(1);
    }
}

fn run_headless(gb: &mut GameBoy, frames: u32) -> Result<(), CpuError> {
    let mut total_cycles: u64 = 0;
    for _ in 0..frames {
        let frame = gb.run_frame()?;
        total_cycles += frame.cycles as u64;
        if gb.is_waiting() {
            log::info!("CPU is waiting at {:#06x}; stopping", gb.cpu.pc);
            break;
        }
    }
    log::info!("Ran {} T-states", total_cycles);
    Ok(())
}

fn run_windowed(gb: &mut GameBoy, config: &Config) -> Result<(), CpuError> {
    let mut window = match Window::new(
        "gb_core",
        SCREEN_WIDTH,
        SCREEN_HEIGHT,
        WindowOptions {
            scale: config.scale(),
            ..WindowOptions::default()
        },
    ) {
        Ok(window) => window,
        Err(e) => {
            eprintln!("Failed to create window: {}", e);
            std::process::exit(1);
        }
    };

    let palette = config.palette();
    let mut buffer = vec![0u32; SCREEN_WIDTH * SCREEN_HEIGHT];

    while window.is_open() && !window.is_key_down(Key::Escape) {
        let frame = gb.run_frame()?;

        filters::rgba_to_window(gb.framebuffer(), &mut buffer, palette);
        if config.display.scanlines {
            filters::apply_scanlines(&mut buffer, SCREEN_WIDTH, SCREEN_HEIGHT);
        }
        if let Err(e) = window.update_with_buffer(&buffer, SCREEN_WIDTH, SCREEN_HEIGHT) {
            log::error!("Window update failed: {}", e);
            break;
        }

        if config.speed.throttle {
            pace(&frame);
        }
    }
    Ok(())
}

/// Sleep off whatever the frame finished ahead of hardware speed.
fn pace(frame: &Frame) {
    match frame.slack.sleep_duration() {
        Some(duration) => std::thread::sleep(duration),
        None => log::debug!("Frame ran {} ns behind", -frame.slack.as_nanos()),
    }
}
