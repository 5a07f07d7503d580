//! Entrypoint for CLI
use std::{env, error::Error, fs, thread};

use log::{error, info};
use ocho::{ShutdownToken, Surface, Vm, VmConf};
use ocho_term::TermSurface;

static USAGE: &str = r#"
usage: ocho ROM

Runs the given program image in the terminal.

keys:
    1234 qwer asdf zxcv    the 16-key pad
    Esc or Ctrl+C          quit

examples:
    ocho breakout.rom
"#;

fn main() -> Result<(), Box<dyn Error>> {
    simple_logger::SimpleLogger::new().env().init().unwrap();

    match parse_args() {
        Some(rom_path) => run_rom(&rom_path),
        None => {
            print_usage();
            // FreeBSD EX_USAGE (64)
            std::process::exit(64)
        }
    }
}

fn run_rom(rom_path: &str) -> Result<(), Box<dyn Error>> {
    let image = fs::read(rom_path)?;

    let mut vm = Vm::new(VmConf::default())?;
    vm.load_program(&image)?;
    info!("loaded {rom_path} ({} bytes)", image.len());

    let mut surface = TermSurface::new();
    surface.initialize()?;

    let shutdown = ShutdownToken::new();

    // The surface owns the terminal from its own thread; the scheduler
    // drives the machine from this one. They meet only at the snapshot
    // slot, the key state and the shutdown token.
    let pump = {
        let surface = surface.clone();
        let shutdown = shutdown.clone();
        thread::spawn(move || {
            if let Err(err) = surface.run(&shutdown) {
                shutdown.trigger();
                error!("presentation loop failed: {err}");
            }
        })
    };

    let result = vm.run(&mut surface, &shutdown);

    // If the scheduler stopped on its own, make sure the pump follows.
    shutdown.trigger();
    if pump.join().is_err() {
        error!("presentation loop panicked");
    }
    surface.shutdown();

    result?;
    info!("goodbye");
    Ok(())
}

fn parse_args() -> Option<String> {
    let mut args = env::args().skip(1);
    let rom_path = args.next()?;
    // A single ROM path and nothing else.
    if args.next().is_some() {
        return None;
    }
    Some(rom_path)
}

fn print_usage() {
    println!("ocho v{}", env!("CARGO_PKG_VERSION"));
    println!("{USAGE}");
}
