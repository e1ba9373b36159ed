use crate::command::{MODE_MAX, ModeCommand};
use crate::config::BLINK_MODES;

pub const MODE_OFF: u8 = 0;
pub const MODE_ON: u8 = 1;

/// One LED channel's state machine: stored mode, tick counter and the
/// level currently requested on the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedChannel {
    pub mode: u8,
    pub counter: u32,
    pub level: bool,
}

impl LedChannel {
    fn new() -> Self {
        LedChannel {
            mode: MODE_OFF,
            counter: 0,
            level: false,
        }
    }

    fn advance(&mut self, blink_ticks: &[u32; BLINK_MODES]) {
        match self.mode {
            MODE_OFF => {
                self.counter = 0;
                self.level = false;
            }
            MODE_ON => {
                self.counter = 0;
                self.level = true;
            }
            2..=MODE_MAX => {
                let hold = blink_ticks[(self.mode - 2) as usize];
                if self.counter < hold {
                    self.counter += 1;
                } else {
                    self.counter = 0;
                    self.level = !self.level;
                }
            }
            _ => {}
        }
    }
}

/// Advances both LED channels one tick at a time and reports which
/// physical lines need rewriting.
///
/// Channels sharing a mode are kept in lock-step: their counters are
/// clamped to the smaller of the two, so the one further along its hold
/// period sets the phase for both.
pub struct BlinkEngine {
    channels: [LedChannel; 2],
    last_emitted: [bool; 2],
    first_tick: bool,
}

impl BlinkEngine {
    pub fn new() -> Self {
        BlinkEngine {
            channels: [LedChannel::new(), LedChannel::new()],
            last_emitted: [false, false],
            first_tick: true,
        }
    }

    pub fn channel(&self, idx: usize) -> &LedChannel {
        &self.channels[idx]
    }

    /// One tick: apply the tick's final mode request, synchronize
    /// matched-mode channels, evaluate both state machines and return
    /// per-channel `Some(level)` where the line must change (every
    /// channel emits on the very first tick so the lines start known).
    pub fn tick(
        &mut self,
        request: ModeCommand,
        blink_ticks: &[u32; BLINK_MODES],
    ) -> [Option<bool>; 2] {
        for ch in 0..2 {
            if let Some(mode) = request.led[ch] {
                self.channels[ch].mode = mode;
            }
        }

        if self.channels[0].mode == self.channels[1].mode {
            let counter = self.channels[0].counter.min(self.channels[1].counter);
            self.channels[0].counter = counter;
            self.channels[1].counter = counter;
            if self.channels[0].mode <= MODE_ON {
                self.channels[1].level = self.channels[0].level;
            }
        }

        for channel in &mut self.channels {
            channel.advance(blink_ticks);
        }

        let mut emitted = [None, None];
        for ch in 0..2 {
            if self.first_tick || self.channels[ch].level != self.last_emitted[ch] {
                self.last_emitted[ch] = self.channels[ch].level;
                emitted[ch] = Some(self.channels[ch].level);
            }
        }
        self.first_tick = false;
        emitted
    }
}
