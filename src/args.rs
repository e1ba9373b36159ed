use anyhow::{Context, Result, bail};

use crate::config::Settings;

pub enum Parsed {
    Help,
    Run(Settings),
}

/// Walk the command line the way getopt would: single-letter options,
/// values either attached ("-d10") or as the following argument.
/// Settings come from defaults, then an optional '-c' JSON file, then
/// the remaining flags on top.
pub fn parse(args: impl Iterator<Item = String>) -> Result<Parsed> {
    let mut opts: Vec<(char, Option<String>)> = Vec::new();
    let mut args = args;

    while let Some(arg) = args.next() {
        let mut chars = arg.chars();
        if chars.next() != Some('-') {
            bail!("unexpected argument '{}'", arg);
        }
        let Some(key) = chars.next() else {
            bail!("unexpected argument '-'");
        };
        let attached: String = chars.collect();

        if opts.iter().any(|(k, _)| *k == key) {
            bail!("option '-{}' was set multiple times", key);
        }

        match key {
            'h' | 't' => {
                if !attached.is_empty() {
                    bail!("unknown option: '{}'", arg);
                }
                opts.push((key, None));
            }
            'p' | 'c' | 'd' | 'b' | '2'..='8' => {
                let value = if attached.is_empty() {
                    args.next()
                        .ok_or_else(|| anyhow::anyhow!("option '-{}' requires a value", key))?
                } else {
                    attached
                };
                opts.push((key, Some(value)));
            }
            _ => bail!("unknown option: '-{}'", key),
        }
    }

    if opts.iter().any(|(k, _)| *k == 'h') {
        return Ok(Parsed::Help);
    }

    let value_of = |key: char| {
        opts.iter()
            .find(|(k, _)| *k == key)
            .and_then(|(_, v)| v.clone())
    };

    let mut settings = match value_of('c') {
        Some(path) => Settings::load(&path)?,
        None => Settings::default(),
    };

    if let Some(path) = value_of('p') {
        settings.port_path = path;
    }
    if opts.iter().any(|(k, _)| *k == 't') {
        settings.testmode = true;
    }
    if let Some(value) = value_of('d') {
        settings.delay_ms = int_value('d', &value)?;
    }
    if let Some(value) = value_of('b') {
        settings.debounce_ticks = int_value('b', &value)?;
    }
    for i in 0..settings.blink_ticks.len() {
        let key = char::from(b'2' + i as u8);
        if let Some(value) = value_of(key) {
            settings.blink_ticks[i] = int_value(key, &value)?;
        }
    }

    Ok(Parsed::Run(settings))
}

fn int_value(key: char, value: &str) -> Result<u32> {
    value
        .parse()
        .with_context(|| format!("value of option '-{}' is not a valid integer", key))
}

pub fn print_usage(release: &str) {
    println!();
    println!("{}", release);
    println!();
    println!("This program is a controller for the plugin 'Control' of lcd4linux.");
    println!();
    println!("It reads and writes data from/to a serial port to get the states of");
    println!("4 push buttons and set the state of 2 LED groups.");
    println!();
    println!("usage:");
    println!();
    println!("ctrl-serial [options]");
    println!();
    println!("options:");
    println!("  -h              help (this info)");
    println!("  -p <path>       path of serial port (e.g. '/dev/ttyS0')");
    println!("                  NOT optional");
    println!("  -t              testmode");
    println!("  -c <file>       read settings from a JSON file (flags override it)");
    println!("  -d <delay>      interval between polling 2 loops in milliseconds, default: 10");
    println!("  -b <number>     number of polling loops a button state has to be");
    println!("                  constant to be regarded. Default: 4");
    println!("  -[2-8] <number> number of polling loops a LED in blink mode 2-8 keeps in");
    println!("                  constant state");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(args: &[&str]) -> Result<Settings> {
        match parse(args.iter().map(|s| s.to_string()))? {
            Parsed::Run(settings) => Ok(settings),
            Parsed::Help => panic!("unexpected help"),
        }
    }

    #[test]
    fn defaults_apply_when_only_the_port_is_given() {
        let settings = run(&["-p", "/dev/ttyS0"]).unwrap();
        assert_eq!(settings.port_path, "/dev/ttyS0");
        assert_eq!(settings.delay_ms, 10);
        assert_eq!(settings.debounce_ticks, 4);
        assert!(!settings.testmode);
    }

    #[test]
    fn values_may_be_attached_or_separate() {
        let settings = run(&["-p/dev/ttyS1", "-d20", "-b", "8"]).unwrap();
        assert_eq!(settings.port_path, "/dev/ttyS1");
        assert_eq!(settings.delay_ms, 20);
        assert_eq!(settings.debounce_ticks, 8);
    }

    #[test]
    fn blink_flags_fill_their_table_slots() {
        let settings = run(&["-p", "/dev/ttyS0", "-2", "200", "-8", "3"]).unwrap();
        assert_eq!(settings.blink_ticks[0], 200);
        assert_eq!(settings.blink_ticks[6], 3);
        assert_eq!(settings.blink_ticks[1], 61);
    }

    #[test]
    fn help_wins_over_everything() {
        let parsed = parse(["-h", "-p", "/dev/ttyS0"].iter().map(|s| s.to_string())).unwrap();
        assert!(matches!(parsed, Parsed::Help));
    }

    #[test]
    fn duplicate_options_are_rejected() {
        assert!(run(&["-p", "/dev/ttyS0", "-d", "5", "-d", "6"]).is_err());
    }

    #[test]
    fn unknown_options_and_bad_integers_are_rejected() {
        assert!(run(&["-x"]).is_err());
        assert!(run(&["-p", "/dev/ttyS0", "-d", "fast"]).is_err());
        assert!(run(&["stray"]).is_err());
    }

    #[test]
    fn missing_value_is_rejected() {
        assert!(run(&["-p"]).is_err());
    }

    #[test]
    fn testmode_flag_is_recognized() {
        let settings = run(&["-p", "/dev/ttyS0", "-t"]).unwrap();
        assert!(settings.testmode);
    }
}
