//! Memory watch reporting task

use defmt::*;
use latch_core::MwuError;
use latch_hal::{Access, MwuEvent};

use crate::shared::{with_mwu, MwuDriver, MWU_EVENTS};

#[embassy_executor::task]
pub async fn watch_task() {
    info!("Watch task started");

    loop {
        let events = MWU_EVENTS.wait().await;
        for event in events {
            report(event);
        }
    }
}

fn report(event: MwuEvent) {
    let region = event.region();
    let Some(info) = with_mwu(|mwu| mwu.region_info(region)) else {
        return;
    };

    if region.is_user() {
        info!(
            "{} access in {} [{:#010x}..={:#010x}]",
            event.access(),
            region,
            info.start,
            info.end
        );
        return;
    }

    match with_mwu(|mwu| take_subregions(mwu, event)) {
        Some(Ok(hits)) => info!("{} access in {} sub-regions {:#010x}", event.access(), region, hits),
        Some(Err(e)) => warn!("Sub-region status unavailable: {}", e),
        None => {}
    }
}

/// Read and clear the sub-regions hit by a peripheral-region event
fn take_subregions(mwu: &mut MwuDriver, event: MwuEvent) -> Result<u32, MwuError> {
    let region = event.region();
    match event.access() {
        Access::Read => {
            let hits = mwu.subregion_reads(region)?;
            mwu.subregion_reads_clear(region, hits)?;
            Ok(hits)
        }
        Access::Write => {
            let hits = mwu.subregion_writes(region)?;
            mwu.subregion_writes_clear(region, hits)?;
            Ok(hits)
        }
    }
}
