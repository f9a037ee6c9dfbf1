//! GPIO shell firmware for the ESP32-C3 super mini.
//!
//! Two tasks blink LEDs forever while the main task services an operator
//! console over USB-Serial-JTAG (`gpio dir/set/get`, see the `console`
//! module).
//!
//! The following wiring is assumed:
//! - LED0 => GPIO8 (onboard LED)
//! - LED1 => GPIO10

#![no_std]
#![no_main]

mod board;
mod console;

use embassy_executor::Spawner;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{Duration, Timer};
use esp_backtrace as _;
use esp_hal::gpio::Flex;
use esp_hal::timer::timg::TimerGroup;
use esp_hal::usb_serial_jtag::UsbSerialJtag;
use esp_println::println;
use gpio_shell_core::blink::{BlinkSpec, Blinker};
use gpio_shell_core::gpio::{Port, PortMap};
use log::{error, info};
use static_cell::StaticCell;

use crate::board::Bank;

/// Port table shared between the console and the blink tasks. The mutex
/// is what serializes conflicting accesses to the same controller.
pub type SharedGpio = Mutex<CriticalSectionRawMutex, PortMap<Bank>>;

/// Onboard LED.
const LED0: BlinkSpec = BlinkSpec {
    port: Port::A,
    pin: 8,
    period_ms: 1000,
    id: 0,
};

/// Second LED role, wired externally.
const LED1: BlinkSpec = BlinkSpec {
    port: Port::A,
    pin: 10,
    period_ms: 5000,
    id: 1,
};

static GPIO: StaticCell<SharedGpio> = StaticCell::new();

#[embassy_executor::task(pool_size = 2)]
async fn blink_task(gpio: &'static SharedGpio, spec: BlinkSpec) {
    let mut blinker = Blinker::new(spec);
    {
        let mut ports = gpio.lock().await;
        if let Err(err) = blinker.start(&mut ports) {
            error!("LED {}: {}", spec.id, err);
            return;
        }
    }
    info!(
        "LED {} blinking on pin {} every {} ms",
        spec.id, spec.pin, spec.period_ms
    );

    loop {
        {
            let mut ports = gpio.lock().await;
            blinker.toggle(&mut ports).ok();
        }
        Timer::after(Duration::from_millis(spec.period_ms)).await;
    }
}

#[esp_hal_embassy::main]
async fn main(spawner: Spawner) {
    let peripherals = esp_hal::init(esp_hal::Config::default());
    esp_println::logger::init_logger_from_env();

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_hal_embassy::init(timg0.timer0);

    println!("GPIO shell v{}", env!("CARGO_PKG_VERSION"));

    // Pins broken out on the super mini; GPIO11..17 belong to the flash.
    let bank = Bank::new([
        (0, Flex::new(peripherals.GPIO0)),
        (1, Flex::new(peripherals.GPIO1)),
        (2, Flex::new(peripherals.GPIO2)),
        (3, Flex::new(peripherals.GPIO3)),
        (4, Flex::new(peripherals.GPIO4)),
        (5, Flex::new(peripherals.GPIO5)),
        (6, Flex::new(peripherals.GPIO6)),
        (7, Flex::new(peripherals.GPIO7)),
        (8, Flex::new(peripherals.GPIO8)),
        (9, Flex::new(peripherals.GPIO9)),
        (10, Flex::new(peripherals.GPIO10)),
        (20, Flex::new(peripherals.GPIO20)),
        (21, Flex::new(peripherals.GPIO21)),
    ]);

    let mut ports = PortMap::new();
    ports.insert(Port::A, bank);
    let gpio = GPIO.init(Mutex::new(ports));

    let usb_serial = UsbSerialJtag::new(peripherals.USB_DEVICE).into_async();
    let (rx, _tx) = usb_serial.split();

    spawner.spawn(blink_task(gpio, LED0)).ok();
    spawner.spawn(blink_task(gpio, LED1)).ok();

    console::run(gpio, rx).await
}
