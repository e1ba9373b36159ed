use std::io::{self, Read};

use log::warn;

const READ_CHUNK: usize = 100;
// more than this pending in one tick means the writer outpaces us
const BACKLOG_WARN: usize = 10;

/// Check a descriptor for readiness without blocking (zero timeout).
pub(crate) fn poll_ready(fd: libc::c_int, events: libc::c_short) -> io::Result<bool> {
    let mut pfd = libc::pollfd {
        fd,
        events,
        revents: 0,
    };
    let rc = unsafe { libc::poll(&mut pfd, 1, 0) };
    if rc == -1 {
        return Err(io::Error::last_os_error());
    }
    Ok(rc > 0 && pfd.revents & events != 0)
}

/// Mode commands arriving on stdin. In test mode the stream is ASCII:
/// 1-2 digits terminated by a line feed become one command byte, anything
/// else is logged and dropped.
pub struct CommandInput {
    testmode: bool,
}

impl CommandInput {
    pub fn new(testmode: bool) -> Self {
        CommandInput { testmode }
    }

    /// Collect whatever is pending on stdin this tick, never blocking.
    pub fn poll(&self) -> io::Result<Vec<u8>> {
        if !poll_ready(libc::STDIN_FILENO, libc::POLLIN)? {
            return Ok(Vec::new());
        }

        let mut buf = [0u8; READ_CHUNK];
        let n = io::stdin().lock().read(&mut buf)?;
        if n == 0 {
            return Ok(Vec::new());
        }
        if n > BACKLOG_WARN {
            warn!(
                "found at least {} bytes in stdin; may read slower than the writer writes",
                n
            );
        }

        let bytes = &buf[..n];
        if self.testmode {
            Ok(decode_text(bytes))
        } else {
            Ok(bytes.to_vec())
        }
    }
}

/// One line of 1-2 ASCII digits becomes a single encoded command byte.
/// Anything else is discarded without touching in-flight command state.
fn decode_text(bytes: &[u8]) -> Vec<u8> {
    if (2..=3).contains(&bytes.len())
        && bytes[bytes.len() - 1] == b'\n'
        && bytes[..bytes.len() - 1].iter().all(u8::is_ascii_digit)
    {
        let value = bytes[..bytes.len() - 1]
            .iter()
            .fold(0u8, |acc, &d| 10 * acc + (d - b'0'));
        return vec![value];
    }

    warn!("ignored {} byte(s) from stdin:", bytes.len());
    for (i, &byte) in bytes.iter().enumerate() {
        if (0x20..0x7f).contains(&byte) {
            warn!("  {}: 0x{:02x} '{}'", i, byte, byte as char);
        } else {
            warn!("  {}: 0x{:02x}", i, byte);
        }
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_digit_line_decodes() {
        assert_eq!(decode_text(b"5\n"), vec![5]);
        assert_eq!(decode_text(b"0\n"), vec![0]);
    }

    #[test]
    fn two_digit_line_decodes() {
        assert_eq!(decode_text(b"37\n"), vec![37]);
        assert_eq!(decode_text(b"99\n"), vec![99]);
    }

    #[test]
    fn non_digits_are_discarded() {
        assert_eq!(decode_text(b"a\n"), Vec::<u8>::new());
        assert_eq!(decode_text(b"4x\n"), Vec::<u8>::new());
    }

    #[test]
    fn missing_terminator_is_discarded() {
        assert_eq!(decode_text(b"12"), Vec::<u8>::new());
        assert_eq!(decode_text(b"\n"), Vec::<u8>::new());
    }

    #[test]
    fn overlong_input_is_discarded() {
        assert_eq!(decode_text(b"123\n"), Vec::<u8>::new());
    }
}
