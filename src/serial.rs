use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;

/// Modem input lines carrying the four push buttons, in reported bit
/// order: bit 0 = RI, bit 1 = CTS, bit 2 = DSR, bit 3 = CD.
const BUTTON_LINES: [libc::c_int; 4] = [
    libc::TIOCM_RNG,
    libc::TIOCM_CTS,
    libc::TIOCM_DSR,
    libc::TIOCM_CD,
];

/// The serial port whose modem-control lines carry the buttons and LEDs.
/// Opened non-blocking; all traffic is ioctl-based, no byte I/O.
pub struct SerialPort {
    file: File,
    path: String,
}

impl SerialPort {
    pub fn open(path: &str) -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY | libc::O_NONBLOCK | libc::O_SYNC)
            .open(path)?;
        Ok(SerialPort {
            file,
            path: path.to_string(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Current modem status word (TIOCMGET).
    pub fn read_status(&self) -> io::Result<libc::c_int> {
        let mut bits: libc::c_int = 0;
        let rc = unsafe { libc::ioctl(self.file.as_raw_fd(), libc::TIOCMGET, &mut bits) };
        if rc == -1 {
            return Err(io::Error::last_os_error());
        }
        Ok(bits)
    }

    /// Rewrite the modem status word (TIOCMSET).
    pub fn write_status(&self, bits: libc::c_int) -> io::Result<()> {
        let rc = unsafe { libc::ioctl(self.file.as_raw_fd(), libc::TIOCMSET, &bits) };
        if rc == -1 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    /// Drive TXD through the break flag (channel 1's line).
    pub fn set_break(&self, high: bool) -> io::Result<()> {
        let request = if high { libc::TIOCSBRK } else { libc::TIOCCBRK };
        let rc = unsafe { libc::ioctl(self.file.as_raw_fd(), request) };
        if rc == -1 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

/// Pack the four button lines of a modem status word into the low nibble
/// of the reported byte. With DTR asserted the adapter pulls the inputs
/// the other way, so the nibble is inverted.
pub fn button_sample(status: libc::c_int) -> u8 {
    let mut val = 0u8;
    for (i, &line) in BUTTON_LINES.iter().enumerate() {
        if status & line != 0 {
            val |= 1 << i;
        }
    }
    if status & libc::TIOCM_DTR != 0 {
        val ^= 0x0F;
    }
    val
}

/// Channel 0 drives its LED group through the DTR/RTS pair: level high
/// means DTR set and RTS clear, level low the reverse.
pub fn channel0_bits(status: libc::c_int, level: bool) -> libc::c_int {
    if level {
        (status | libc::TIOCM_DTR) & !libc::TIOCM_RTS
    } else {
        (status & !libc::TIOCM_DTR) | libc::TIOCM_RTS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buttons_map_to_the_low_nibble() {
        assert_eq!(button_sample(0), 0x00);
        assert_eq!(button_sample(libc::TIOCM_RNG), 0x01);
        assert_eq!(button_sample(libc::TIOCM_CTS), 0x02);
        assert_eq!(button_sample(libc::TIOCM_DSR), 0x04);
        assert_eq!(button_sample(libc::TIOCM_CD), 0x08);
        assert_eq!(
            button_sample(libc::TIOCM_RNG | libc::TIOCM_DSR),
            0x05
        );
    }

    #[test]
    fn dtr_inverts_the_nibble() {
        assert_eq!(button_sample(libc::TIOCM_DTR), 0x0F);
        assert_eq!(button_sample(libc::TIOCM_DTR | libc::TIOCM_CTS), 0x0D);
    }

    #[test]
    fn unrelated_status_bits_are_ignored() {
        assert_eq!(button_sample(libc::TIOCM_RTS), 0x00);
    }

    #[test]
    fn channel0_level_flips_dtr_against_rts() {
        let high = channel0_bits(0, true);
        assert_ne!(high & libc::TIOCM_DTR, 0);
        assert_eq!(high & libc::TIOCM_RTS, 0);

        let low = channel0_bits(high, false);
        assert_eq!(low & libc::TIOCM_DTR, 0);
        assert_ne!(low & libc::TIOCM_RTS, 0);
    }

    #[test]
    fn channel0_preserves_other_lines() {
        let status = libc::TIOCM_CTS | libc::TIOCM_CD;
        assert_eq!(
            channel0_bits(status, true) & (libc::TIOCM_CTS | libc::TIOCM_CD),
            status
        );
    }
}
