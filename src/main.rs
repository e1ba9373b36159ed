mod args;
mod blink;
mod command;
mod config;
mod debounce;
mod input;
mod report;
mod serial;
mod signal;

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{info, warn};

use args::Parsed;
use blink::BlinkEngine;
use command::ModeCommand;
use config::Settings;
use debounce::DebounceState;
use input::CommandInput;
use report::ButtonOutput;
use serial::SerialPort;

const RELEASE: &str = concat!("ctrl-serial ", env!("CARGO_PKG_VERSION"));

fn main() -> Result<()> {
    env_logger::init();

    let settings = match args::parse(std::env::args().skip(1))? {
        Parsed::Help => {
            args::print_usage(RELEASE);
            return Ok(());
        }
        Parsed::Run(settings) => settings,
    };
    settings.validate()?;

    signal::install(settings.testmode);

    let port = SerialPort::open(&settings.port_path)
        .with_context(|| format!("can't open serial port '{}'", settings.port_path))?;

    if settings.testmode {
        print_test_banner(&settings);
    }

    run(&settings, &port)?;
    info!("exit");
    Ok(())
}

/// The polling loop: one tick reads the modem lines, debounces the
/// buttons, applies any pending mode commands and drives the LED lines,
/// then sleeps until the next tick.
fn run(settings: &Settings, port: &SerialPort) -> Result<()> {
    let mut debounce = DebounceState::new(settings.debounce_ticks);
    let mut engine = BlinkEngine::new();
    let stdin = CommandInput::new(settings.testmode);
    let stdout = ButtonOutput::new(settings.testmode);
    let delay = Duration::from_millis(settings.delay_ms as u64);

    info!(
        "polling '{}' every {}ms",
        port.path(),
        settings.delay_ms
    );

    while !signal::stop_requested() {
        let status = port
            .read_status()
            .with_context(|| format!("can't read from serial port '{}'", port.path()))?;

        if let Some(stable) = debounce.filter(serial::button_sample(status)) {
            stdout
                .emit(stable)
                .with_context(|| format!("can't write button byte 0x{:02x}", stable))?;
        }

        let bytes = stdin.poll().context("can't read from stdin")?;
        let mut request = ModeCommand::default();
        for cmd in command::parse(&bytes) {
            for ch in 0..2 {
                if let Some(mode) = cmd.led[ch] {
                    let current = request.led[ch].unwrap_or(engine.channel(ch).mode);
                    if mode != current {
                        info!("LED {} set to mode {}", ch, mode);
                    }
                }
            }
            request.merge(cmd);
        }

        let emitted = engine.tick(request, &settings.blink_ticks);

        if let Some(level) = emitted[0] {
            port.write_status(serial::channel0_bits(status, level))
                .with_context(|| format!("can't write to serial port '{}'", port.path()))?;
        }
        if let Some(level) = emitted[1] {
            port.set_break(level)
                .with_context(|| format!("can't set break on serial port '{}'", port.path()))?;
        }

        thread::sleep(delay);
    }

    warn!("stopped by signal");
    Ok(())
}

fn print_test_banner(settings: &Settings) {
    println!();
    println!("Test mode - {}", RELEASE);
    println!();
    for (i, ticks) in settings.blink_ticks.iter().enumerate() {
        println!("blink ticks[{}]: {}", i + 2, ticks);
    }
    println!();
    for ch in 0..2 {
        println!("mode LED {}: 0", ch);
    }
    println!();
    println!("Please press a button connected to the serial port");
    println!("or enter 1-2 digits followed by the Return key.");
    println!();
}
