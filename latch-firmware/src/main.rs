//! Latch - nRF52840 memory-watch and GPIO task/event firmware
//!
//! Example firmware for the nRF52840-DK. The button raises a GPIOTE event,
//! the LED is driven by a GPIOTE task, and the MWU reports writes to a
//! canary window of RAM. The board layout comes from board.toml.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use nrf52840_pac::interrupt;
use {defmt_rtt as _, panic_probe as _};

use latch_core::config::PinConfig;
use latch_core::GpioteError;
use latch_drivers::{ChannelHandle, EventHandler, Gpiote, WatchUnit};
use latch_hal::{Pin, Polarity};
use latch_hal_nrf52840::{irq, Interrupt, Peripherals};

use crate::shared::GpioteDriver;

mod config;
mod shared;
mod tasks;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Latch firmware starting...");

    let board = match config::board_config() {
        Ok(board) => board,
        Err(e) => {
            error!("Invalid board configuration: {}", e);
            return;
        }
    };
    info!("Board: {}", board.name.as_str());

    let Some(p) = Peripherals::take() else {
        error!("Peripherals already taken");
        return;
    };
    let Some(mut cp) = cortex_m::Peripherals::take() else {
        error!("Core peripherals already taken");
        return;
    };

    let mut gpiote = Gpiote::new(p.gpiote, p.gpio, board.gpiote);
    if let Err(e) = gpiote.init() {
        error!("GPIOTE init failed: {}", e);
        return;
    }
    let button = board
        .button
        .and_then(|pin| setup_button(&mut gpiote, &pin));
    let led = board.led.and_then(|pin| setup_led(&mut gpiote, &pin));
    info!("GPIOTE initialized");

    let mut mwu = WatchUnit::new(p.mwu);
    for watch in &board.watches {
        match mwu.apply(watch) {
            Ok(()) => info!("Watching {} ({})", watch.label.as_str(), watch.region),
            Err(e) => warn!("Watch {} rejected: {}", watch.label.as_str(), e),
        }
    }
    // First writable user region doubles as the canary
    let canary = board
        .watches
        .iter()
        .find(|w| w.region.is_user() && w.writes)
        .map(|w| w.start);
    info!("MWU initialized");

    shared::install(gpiote, mwu);

    let priority = board.gpiote.irq_priority;
    // SAFETY: both handlers only reach the drivers through the shared slots
    unsafe {
        irq::enable(&mut cp.NVIC, Interrupt::Gpiote, priority);
        irq::enable(&mut cp.NVIC, Interrupt::Mwu, priority);
    }

    // Spawn tasks
    match button {
        Some(button) => {
            let config = tasks::button::ButtonConfig {
                button,
                led,
                canary,
            };
            spawner.spawn(tasks::button_task(config)).unwrap();
        }
        None => warn!("No button configured"),
    }
    spawner.spawn(tasks::watch_task()).unwrap();

    info!("All tasks spawned, firmware running");
}

/// Bind the button as an input event channel
fn setup_button(gpiote: &mut GpioteDriver, pin: &PinConfig) -> Option<ChannelHandle> {
    let handler: EventHandler = on_button;
    let result = Pin::new(pin.pin)
        .ok_or(GpioteError::InvalidPin)
        .and_then(|p| gpiote.in_init(p, config::button_input(pin), Some(handler)))
        .and_then(|handle| gpiote.in_event_enable(handle).map(|_| handle));

    match result {
        Ok(handle) => {
            info!("Button on pin {}", pin.pin);
            Some(handle)
        }
        Err(e) => {
            warn!("Button unavailable: {}", e);
            None
        }
    }
}

/// Bind the LED as a toggling task output
fn setup_led(gpiote: &mut GpioteDriver, pin: &PinConfig) -> Option<ChannelHandle> {
    let result = Pin::new(pin.pin)
        .ok_or(GpioteError::InvalidPin)
        .and_then(|p| gpiote.out_init(p, config::led_output(pin)))
        .and_then(|handle| gpiote.out_task_enable(handle).map(|_| handle));

    match result {
        Ok(handle) => {
            info!("LED on pin {}", pin.pin);
            Some(handle)
        }
        Err(e) => {
            warn!("LED unavailable: {}", e);
            None
        }
    }
}

/// Called from the GPIOTE interrupt
fn on_button(handle: ChannelHandle, pin: Pin, polarity: Polarity) {
    trace!("Button event on pin {} ({})", pin.number(), polarity);
    shared::BUTTON_EVENT.signal(handle);
}

#[interrupt]
fn GPIOTE() {
    shared::with_gpiote(|gpiote| gpiote.handle_interrupt());
}

#[interrupt]
fn MWU() {
    if let Some(events) = shared::with_mwu(|mwu| mwu.take_events()) {
        if !events.is_empty() {
            shared::MWU_EVENTS.signal(events);
        }
    }
}
