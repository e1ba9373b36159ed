use std::fmt;

use log::warn;

/// Highest storable LED mode (seven blink speeds above off/on).
pub const MODE_MAX: u8 = 8;
/// Transient "leave this channel alone" digit; never stored.
pub const MODE_KEEP: u8 = 9;

/// One decoded mode command: the requested mode per LED channel,
/// `None` where the command said to keep the current mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModeCommand {
    pub led: [Option<u8>; 2],
}

impl ModeCommand {
    /// Overlay a later command; its requests win per channel.
    pub fn merge(&mut self, later: ModeCommand) {
        for ch in 0..2 {
            if later.led[ch].is_some() {
                self.led[ch] = later.led[ch];
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadCommand(pub u8);

impl fmt::Display for BadCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "command byte 0x{:02x} exceeds 99", self.0)
    }
}

impl std::error::Error for BadCommand {}

/// Decode one command byte: value % 10 is channel 0's mode,
/// (value / 10) % 10 is channel 1's. A nonzero hundreds digit can only
/// come from malformed multi-digit input and is rejected.
pub fn decode(byte: u8) -> Result<ModeCommand, BadCommand> {
    if byte > 99 {
        return Err(BadCommand(byte));
    }
    let led0 = byte % 10;
    let led1 = (byte / 10) % 10;
    Ok(ModeCommand {
        led: [requested(led0), requested(led1)],
    })
}

fn requested(digit: u8) -> Option<u8> {
    if digit == MODE_KEEP { None } else { Some(digit) }
}

/// Decode a tick's worth of command bytes in arrival order, dropping and
/// logging malformed ones.
pub fn parse(bytes: &[u8]) -> Vec<ModeCommand> {
    bytes
        .iter()
        .filter_map(|&byte| match decode(byte) {
            Ok(cmd) => Some(cmd),
            Err(bad) => {
                warn!("ignoring malformed command: {}", bad);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_byte_into_digit_pair() {
        let cmd = decode(38).unwrap();
        assert_eq!(cmd.led, [Some(8), Some(3)]);
    }

    #[test]
    fn zero_sets_both_channels_off() {
        let cmd = decode(0).unwrap();
        assert_eq!(cmd.led, [Some(0), Some(0)]);
    }

    #[test]
    fn nine_means_keep() {
        assert_eq!(decode(91).unwrap().led, [Some(1), None]);
        assert_eq!(decode(19).unwrap().led, [None, Some(1)]);
        assert_eq!(decode(99).unwrap().led, [None, None]);
    }

    #[test]
    fn values_above_99_are_rejected() {
        assert_eq!(decode(100), Err(BadCommand(100)));
        assert_eq!(decode(200), Err(BadCommand(200)));
        assert_eq!(decode(255), Err(BadCommand(255)));
        assert!(decode(99).is_ok());
    }

    #[test]
    fn parse_keeps_order_and_drops_bad_bytes() {
        let cmds = parse(&[12, 200, 34]);
        assert_eq!(
            cmds,
            vec![
                ModeCommand { led: [Some(2), Some(1)] },
                ModeCommand { led: [Some(4), Some(3)] },
            ]
        );
    }

    #[test]
    fn merge_is_last_write_wins_per_channel() {
        let mut request = ModeCommand::default();
        request.merge(decode(12).unwrap());
        request.merge(decode(95).unwrap()); // keep channel 1, set channel 0
        assert_eq!(request.led, [Some(5), Some(1)]);
    }
}
