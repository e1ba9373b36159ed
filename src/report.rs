use std::io::{self, Write};

use crate::input::poll_ready;

/// Sink for the stable button byte: raw bytes on stdout, or a readable
/// multi-base rendering in test mode.
pub struct ButtonOutput {
    testmode: bool,
}

impl ButtonOutput {
    pub fn new(testmode: bool) -> Self {
        ButtonOutput { testmode }
    }

    pub fn emit(&self, byte: u8) -> io::Result<()> {
        if self.testmode {
            println!("Buttons: {}", multi_base_str(byte));
            return Ok(());
        }

        // the consumer may have gone away; never let stdout block the loop
        if !poll_ready(libc::STDOUT_FILENO, libc::POLLOUT)? {
            return Err(io::Error::new(
                io::ErrorKind::WouldBlock,
                "stdout is not ready for writing",
            ));
        }
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        lock.write_all(&[byte])?;
        lock.flush()
    }
}

pub fn multi_base_str(val: u8) -> String {
    let ch = if (0x20..0x7f).contains(&val) {
        format!("'{}'", val as char)
    } else {
        format!("'\\x{:02x}'", val)
    };
    format!(
        "bin:{val:08b} oct:0{val:03o} hex:{val:02x}  dec:{val:>3}  char:{ch}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printable_bytes_show_their_character() {
        assert_eq!(
            multi_base_str(b'A'),
            "bin:01000001 oct:0101 hex:41  dec: 65  char:'A'"
        );
    }

    #[test]
    fn control_bytes_show_an_escape() {
        assert_eq!(
            multi_base_str(0x05),
            "bin:00000101 oct:0005 hex:05  dec:  5  char:'\\x05'"
        );
    }

    #[test]
    fn all_fields_line_up_for_the_max_value() {
        assert_eq!(
            multi_base_str(0xFF),
            "bin:11111111 oct:0377 hex:ff  dec:255  char:'\\xff'"
        );
    }
}
