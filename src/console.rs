//! Interactive operator console over USB-Serial-JTAG.

use embedded_io_async::Read;
use esp_hal::usb_serial_jtag::UsbSerialJtagRx;
use esp_hal::Async;
use esp_println::{print, println, Printer};
use gpio_shell_core::cmd;
use heapless::{String, Vec};
use log::debug;

use crate::SharedGpio;

const PROMPT: &str = "shell> ";
const LINE_MAX: usize = 128;
const ARGV_MAX: usize = 8;

/// Reads operator input byte by byte and services complete lines. Runs on
/// the main task for the lifetime of the process.
pub async fn run(gpio: &'static SharedGpio, mut rx: UsbSerialJtagRx<'static, Async>) -> ! {
    let mut line: String<LINE_MAX> = String::new();
    print!("{PROMPT}");
    loop {
        let mut buf = [0u8; 1];
        match rx.read(&mut buf).await {
            Ok(0) | Err(_) => continue,
            Ok(_) => {}
        }
        match buf[0] {
            b'\r' | b'\n' => {
                println!();
                handle_line(gpio, line.as_str()).await;
                line.clear();
                print!("{PROMPT}");
            }
            // backspace and DEL both erase
            0x08 | 0x7f => {
                if line.pop().is_some() {
                    print!("\x08 \x08");
                }
            }
            byte @ 0x20..=0x7e => {
                if line.push(byte as char).is_ok() {
                    print!("{}", byte as char);
                }
            }
            _ => {}
        }
    }
}

async fn handle_line(gpio: &'static SharedGpio, line: &str) {
    let mut argv: Vec<&str, ARGV_MAX> = Vec::new();
    for token in line.split_whitespace() {
        if argv.push(token).is_err() {
            println!("Too many arguments");
            return;
        }
    }

    match argv.split_first() {
        None => {}
        Some((&"gpio", rest)) => {
            let mut ports = gpio.lock().await;
            let status = cmd::dispatch(&mut *ports, &mut Printer, rest);
            if status != 0 {
                debug!("gpio command failed with status {status}");
            }
        }
        Some((&"help", _)) => {
            println!("gpio - GPIO commands");
        }
        Some((&other, _)) => println!("Unknown command: {other}"),
    }
}
