/// Counter-based debouncing of the raw button sample.
///
/// A sample only passes through once it has been observed for a configured
/// number of consecutive ticks, and only if it differs from the last byte
/// that passed. A still-changing signal never emits.
#[derive(Debug)]
pub struct DebounceState {
    threshold: u32,
    last_raw: u8,
    last_sent: u8,
    stable_count: u32,
}

impl DebounceState {
    pub fn new(threshold: u32) -> Self {
        DebounceState {
            threshold,
            last_raw: 0,
            last_sent: 0,
            stable_count: 0,
        }
    }

    /// Feed one raw sample, returning the stable byte when a new value
    /// has just completed its stabilization window.
    pub fn filter(&mut self, raw: u8) -> Option<u8> {
        if raw != self.last_raw {
            self.last_raw = raw;
            self.stable_count = 0;
        } else {
            self.stable_count = self.stable_count.saturating_add(1);
        }

        // stable_count counts observations beyond the first, so the sample
        // has now been seen stable_count + 1 times in a row.
        if self.stable_count == self.threshold - 1 && raw != self.last_sent {
            self.last_sent = raw;
            return Some(raw);
        }
        None
    }
}
