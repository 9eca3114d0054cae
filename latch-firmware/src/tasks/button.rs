//! Button task
//!
//! Toggles the LED through its GPIOTE task on every press and stamps the
//! press count into the canary word, which the MWU reports as a write.

use defmt::*;
use latch_drivers::ChannelHandle;

use crate::shared::{with_gpiote, BUTTON_EVENT};

/// Button task configuration
pub struct ButtonConfig {
    /// Button input channel
    pub button: ChannelHandle,
    /// LED task channel
    pub led: Option<ChannelHandle>,
    /// Address of a watched RAM word outside the linked sections
    pub canary: Option<u32>,
}

#[embassy_executor::task]
pub async fn button_task(config: ButtonConfig) {
    info!("Button task started");

    let mut presses: u32 = 0;

    loop {
        let handle = BUTTON_EVENT.wait().await;
        if handle != config.button {
            continue;
        }

        presses = presses.wrapping_add(1);
        info!("Button press {}", presses);

        if let Some(led) = config.led {
            if let Some(Err(e)) = with_gpiote(|gpiote| gpiote.out_task_toggle(led)) {
                warn!("LED toggle failed: {}", e);
            }
        }

        if let Some(canary) = config.canary {
            // SAFETY: memory.x keeps watched user regions out of the link,
            // so nothing else owns this word
            unsafe { core::ptr::write_volatile(canary as *mut u32, presses) };
        }
    }
}
