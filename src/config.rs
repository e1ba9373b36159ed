use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;

/// Number of blink modes (modes 2..=8).
pub const BLINK_MODES: usize = 7;

const TICKS_MIN: u32 = 1;
const TICKS_MAX: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Path of the serial port, e.g. "/dev/ttyS0".
    pub port_path: String,
    /// Interval between two polling loops in milliseconds.
    pub delay_ms: u32,
    /// Number of polling loops a button state has to be constant to be
    /// regarded.
    pub debounce_ticks: u32,
    /// Number of polling loops an LED in blink mode 2..8 keeps a constant
    /// state, one entry per mode.
    pub blink_ticks: [u32; BLINK_MODES],
    /// Interpret stdin/stdout as text for interactive use.
    pub testmode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            port_path: String::new(),
            delay_ms: 10,
            debounce_ticks: 4,
            blink_ticks: default_blink_ticks(),
            testmode: false,
        }
    }
}

/// Geometric progression from slow (mode 2) to fast (mode 8):
/// round(5 * 20^((6-i)/6)), i.e. [100, 61, 37, 22, 14, 8, 5].
pub fn default_blink_ticks() -> [u32; BLINK_MODES] {
    let mut ticks = [0u32; BLINK_MODES];
    for (i, slot) in ticks.iter_mut().enumerate() {
        *slot = (5.0 * 20f64.powf((BLINK_MODES - 1 - i) as f64 / 6.0)).round() as u32;
    }
    ticks
}

impl Settings {
    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("can't read settings file '{}'", path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("settings file '{}' is not valid", path))
    }

    /// Rejects any out-of-bounds value before the polling loop starts.
    pub fn validate(&self) -> Result<()> {
        if self.port_path.is_empty() {
            bail!("path of the serial port is required ('-p')");
        }
        check_between("-d", self.delay_ms)?;
        check_between("-b", self.debounce_ticks)?;
        for (i, &ticks) in self.blink_ticks.iter().enumerate() {
            check_between(&format!("-{}", i + 2), ticks)?;
        }
        Ok(())
    }
}

fn check_between(opt: &str, val: u32) -> Result<()> {
    if !(TICKS_MIN..=TICKS_MAX).contains(&val) {
        bail!(
            "value of option '{}' is not an integer from [{}..{}]",
            opt,
            TICKS_MIN,
            TICKS_MAX
        );
    }
    Ok(())
}
