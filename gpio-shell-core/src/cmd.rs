//! Operator commands of the `gpio` group.
//!
//! Every command validates its argument count first, then resolves the
//! port, then validates the remaining tokens, and only then touches the
//! driver. Replies go to the supplied writer; the numeric status follows
//! the 0/negative shell convention.

use core::fmt::Write;

use crate::errors::{Error, EINVAL};
use crate::gpio::{Direction, Level, Port, PortDriver, PortMap};

struct SubCommand<D: PortDriver> {
    name: &'static str,
    help: &'static str,
    run: fn(&mut PortMap<D>, &mut dyn Write, &[&str]) -> Result<(), Error>,
}

/// Resolves `argv[0]` against the subcommand table and runs the handler.
///
/// `argv` holds the tokens after the `gpio` group name, subcommand
/// included. Bare `gpio` or an unknown subcommand prints the table and
/// fails with `-EINVAL`.
pub fn dispatch<D: PortDriver>(
    ports: &mut PortMap<D>,
    out: &mut dyn Write,
    argv: &[&str],
) -> i32 {
    let table: [SubCommand<D>; 3] = [
        SubCommand {
            name: "dir",
            help: "Set GPIO pin direction (input/output)",
            run: cmd_dir,
        },
        SubCommand {
            name: "set",
            help: "Set GPIO pin value (0/1)",
            run: cmd_set,
        },
        SubCommand {
            name: "get",
            help: "Get GPIO pin value",
            run: cmd_get,
        },
    ];

    let Some(&name) = argv.first() else {
        print_help(out, &table);
        return -EINVAL;
    };

    match table.iter().find(|cmd| cmd.name == name) {
        Some(cmd) => match (cmd.run)(ports, out, argv) {
            Ok(()) => 0,
            Err(err) => err.code(),
        },
        None => {
            let _ = writeln!(out, "Unknown subcommand: {name}");
            print_help(out, &table);
            -EINVAL
        }
    }
}

fn print_help<D: PortDriver>(out: &mut dyn Write, table: &[SubCommand<D>]) {
    let _ = writeln!(out, "gpio - GPIO commands");
    for cmd in table {
        let _ = writeln!(out, "  {} - {}", cmd.name, cmd.help);
    }
}

fn cmd_dir<D: PortDriver>(
    ports: &mut PortMap<D>,
    out: &mut dyn Write,
    argv: &[&str],
) -> Result<(), Error> {
    if argv.len() != 4 {
        let _ = writeln!(out, "Usage: gpio dir <port> <pin> <input/output>");
        return Err(Error::BadArgs);
    }

    let port = argv[1];
    let pin = atoi(argv[2]) as u8;
    let dir = argv[3];

    let Some(dev) = Port::parse(port).and_then(|p| ports.get_mut(p)) else {
        let _ = writeln!(out, "Invalid port: {port}");
        return Err(Error::BadPort);
    };

    let function = match dir {
        "input" => Direction::Input,
        "output" => Direction::Output,
        _ => {
            let _ = writeln!(out, "Invalid direction. Use 'input' or 'output'");
            return Err(Error::BadDirection);
        }
    };

    if let Err(err) = dev.configure(pin, function) {
        let _ = writeln!(out, "Failed to configure pin {pin} on port {port}");
        return Err(err);
    }

    let _ = writeln!(out, "Port {port}, Pin {pin} configured as {dir}");
    Ok(())
}

fn cmd_set<D: PortDriver>(
    ports: &mut PortMap<D>,
    out: &mut dyn Write,
    argv: &[&str],
) -> Result<(), Error> {
    if argv.len() != 4 {
        let _ = writeln!(out, "Usage: gpio set <port> <pin> <0/1>");
        return Err(Error::BadArgs);
    }

    let port = argv[1];
    let pin = atoi(argv[2]) as u8;
    let value = atoi(argv[3]);

    let Some(dev) = Port::parse(port).and_then(|p| ports.get_mut(p)) else {
        let _ = writeln!(out, "Invalid port: {port}");
        return Err(Error::BadPort);
    };

    if value != 0 && value != 1 {
        let _ = writeln!(out, "Invalid value. Use 0 or 1.");
        return Err(Error::BadValue);
    }

    let level = if value == 0 { Level::Low } else { Level::High };
    if let Err(err) = dev.set(pin, level) {
        let _ = writeln!(out, "Failed to set pin {pin} on port {port}");
        return Err(err);
    }

    let _ = writeln!(out, "Port {port}, Pin {pin} set to {value}");
    Ok(())
}

fn cmd_get<D: PortDriver>(
    ports: &mut PortMap<D>,
    out: &mut dyn Write,
    argv: &[&str],
) -> Result<(), Error> {
    if argv.len() != 3 {
        let _ = writeln!(out, "Usage: gpio get <port> <pin>");
        return Err(Error::BadArgs);
    }

    let port = argv[1];
    let pin = atoi(argv[2]) as u8;

    let Some(dev) = Port::parse(port).and_then(|p| ports.get_mut(p)) else {
        let _ = writeln!(out, "Invalid port: {port}");
        return Err(Error::BadPort);
    };

    match dev.get(pin) {
        Ok(level) => {
            let _ = writeln!(out, "Port {port}, Pin {pin} is {}", level.bit());
            Ok(())
        }
        Err(err) => {
            let _ = writeln!(out, "Failed to get state of pin {pin} on port {port}");
            Err(err)
        }
    }
}

/// C `atoi` conversion: optional sign, leading digits, anything else is 0.
fn atoi(token: &str) -> i32 {
    let bytes = token.as_bytes();
    let (neg, digits) = match bytes.split_first() {
        Some((b'-', rest)) => (true, rest),
        Some((b'+', rest)) => (false, rest),
        _ => (false, bytes),
    };

    let mut value: i32 = 0;
    for &b in digits {
        if !b.is_ascii_digit() {
            break;
        }
        value = value.wrapping_mul(10).wrapping_add((b - b'0') as i32);
    }

    if neg {
        value.wrapping_neg()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use heapless::String;

    use super::*;
    use crate::mock::MockPort;

    fn single_port() -> PortMap<MockPort> {
        let mut ports = PortMap::new();
        ports.insert(Port::A, MockPort::new());
        ports
    }

    fn run(ports: &mut PortMap<MockPort>, argv: &[&str]) -> (i32, String<256>) {
        let mut out: String<256> = String::new();
        let status = dispatch(ports, &mut out, argv);
        (status, out)
    }

    #[test]
    fn dir_configures_a_pin() {
        let mut ports = single_port();

        let (status, out) = run(&mut ports, &["dir", "A", "3", "output"]);

        assert_eq!(status, 0);
        assert!(out.contains("Port A, Pin 3 configured as output"));
        assert_eq!(
            ports.get_mut(Port::A).unwrap().dirs[3],
            Some(Direction::Output)
        );
    }

    #[test]
    fn dir_with_wrong_arity_prints_usage_and_touches_nothing() {
        let mut ports = single_port();

        let (status, out) = run(&mut ports, &["dir", "A", "3"]);

        assert_eq!(status, -EINVAL);
        assert!(out.starts_with("Usage: gpio dir"));
        assert!(ports
            .get_mut(Port::A)
            .unwrap()
            .dirs
            .iter()
            .all(Option::is_none));
    }

    #[test]
    fn dir_rejects_unresolved_ports() {
        let mut ports = single_port();

        let (status, out) = run(&mut ports, &["dir", "Z", "0", "output"]);

        assert_eq!(status, -EINVAL);
        assert!(out.contains("Invalid port: Z"));
    }

    #[test]
    fn dir_rejects_unknown_directions() {
        let mut ports = single_port();

        let (status, out) = run(&mut ports, &["dir", "A", "3", "sideways"]);

        assert_eq!(status, -EINVAL);
        assert!(out.contains("Invalid direction. Use 'input' or 'output'"));
        assert!(ports
            .get_mut(Port::A)
            .unwrap()
            .dirs
            .iter()
            .all(Option::is_none));
    }

    #[test]
    fn set_then_get_round_trips() {
        let mut ports = single_port();

        assert_eq!(run(&mut ports, &["dir", "A", "3", "output"]).0, 0);
        assert_eq!(run(&mut ports, &["set", "A", "3", "1"]).0, 0);
        let (status, out) = run(&mut ports, &["get", "A", "3"]);
        assert_eq!(status, 0);
        assert!(out.contains("Port A, Pin 3 is 1"));

        assert_eq!(run(&mut ports, &["set", "A", "3", "0"]).0, 0);
        let (status, out) = run(&mut ports, &["get", "A", "3"]);
        assert_eq!(status, 0);
        assert!(out.contains("Port A, Pin 3 is 0"));
    }

    #[test]
    fn set_rejects_values_outside_zero_and_one() {
        let mut ports = single_port();

        let (status, out) = run(&mut ports, &["set", "A", "3", "2"]);

        assert_eq!(status, -EINVAL);
        assert!(out.contains("Invalid value. Use 0 or 1."));
        assert_eq!(ports.get_mut(Port::A).unwrap().writes, 0);
    }

    #[test]
    fn set_parses_values_the_lenient_way() {
        // atoi turns a non-numeric token into 0, so this drives the pin low
        let mut ports = single_port();

        let (status, out) = run(&mut ports, &["set", "A", "3", "junk"]);

        assert_eq!(status, 0);
        assert!(out.contains("Port A, Pin 3 set to 0"));
        assert_eq!(ports.get_mut(Port::A).unwrap().levels[3], Level::Low);
        assert_eq!(ports.get_mut(Port::A).unwrap().writes, 1);
    }

    #[test]
    fn get_with_missing_pin_prints_usage_and_touches_nothing() {
        let mut ports = single_port();

        let (status, out) = run(&mut ports, &["get", "A"]);

        assert_eq!(status, -EINVAL);
        assert!(out.starts_with("Usage: gpio get"));
        assert_eq!(ports.get_mut(Port::A).unwrap().reads, 0);
        assert_eq!(ports.get_mut(Port::A).unwrap().writes, 0);
    }

    #[test]
    fn lowercase_port_tokens_resolve_and_are_echoed_back() {
        let mut ports = single_port();

        let (status, out) = run(&mut ports, &["set", "a", "3", "1"]);

        assert_eq!(status, 0);
        assert!(out.contains("Port a, Pin 3 set to 1"));
    }

    #[test]
    fn unknown_subcommands_print_the_table() {
        let mut ports = single_port();

        let (status, out) = run(&mut ports, &["frobnicate"]);

        assert_eq!(status, -EINVAL);
        assert!(out.contains("Unknown subcommand: frobnicate"));
        assert!(out.contains("dir"));
        assert!(out.contains("set"));
        assert!(out.contains("get"));
    }

    #[test]
    fn bare_group_prints_the_table() {
        let mut ports = single_port();

        let (status, out) = run(&mut ports, &[]);

        assert_eq!(status, -EINVAL);
        assert!(out.contains("gpio - GPIO commands"));
    }

    #[test]
    fn driver_failures_propagate_their_status() {
        let mut ports = single_port();
        ports.get_mut(Port::A).unwrap().fail_configure = Some(-5);

        let (status, out) = run(&mut ports, &["dir", "A", "3", "output"]);

        assert_eq!(status, -5);
        assert!(out.contains("Failed to configure pin 3 on port A"));
    }

    #[test]
    fn out_of_range_pins_are_rejected_by_the_driver() {
        let mut ports = single_port();

        let (status, out) = run(&mut ports, &["set", "A", "99", "1"]);

        assert_eq!(status, -EINVAL);
        assert!(out.contains("Failed to set pin 99 on port A"));
        assert_eq!(ports.get_mut(Port::A).unwrap().writes, 0);
    }

    #[test]
    fn atoi_is_a_lenient_conversion() {
        assert_eq!(atoi("123"), 123);
        assert_eq!(atoi("-7"), -7);
        assert_eq!(atoi("+4"), 4);
        assert_eq!(atoi("12ab"), 12);
        assert_eq!(atoi("junk"), 0);
        assert_eq!(atoi(""), 0);
    }
}
