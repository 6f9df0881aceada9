//! Peripatos - Quadruped Walking Robot Firmware
//!
//! Main firmware binary for RP2040-based quadruped robots with LX-16A
//! serial bus servos. Brings up the servo bus UART, runs boot
//! diagnostics and then walks a diagonal-trot demo sequence.
//!
//! Named after the Greek "peripatos" meaning "a walk" - both the
//! covered walkway of Aristotle's school and what this robot does.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::UART1;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use crate::channels::RUN_STATUS;

mod channels;
mod tasks;

bind_interrupts!(struct Irqs {
    UART1_IRQ => BufferedInterruptHandler<UART1>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Peripatos firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Servo bus UART behind the BusLinker board: 115200 8N1, the board
    // handles the half-duplex line direction
    let uart_config = {
        let mut cfg = UartConfig::default();
        cfg.baudrate = 115_200;
        cfg
    };

    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart = Uart::new_blocking(p.UART1, p.PIN_4, p.PIN_5, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);

    info!("Servo bus UART initialized");

    spawner.spawn(tasks::frame_log_task()).unwrap();
    spawner.spawn(tasks::gait_task(uart)).unwrap();

    info!("All tasks spawned, firmware running");

    let status = RUN_STATUS.wait().await;
    info!("demo sequence finished: {}", status);

    // Nothing left to do; the gait task holds the bus
    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
