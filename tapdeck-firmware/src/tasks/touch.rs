//! Touch polling task
//!
//! Samples the touch controller every 10 ms, turns press/release into
//! clicks against the widget tree and forwards button clicks as key events.

use defmt::*;
use embassy_time::{Duration, Ticker};
use tapdeck_core::traits::TouchInput;
use tapdeck_core::ui::{ClickDetector, TouchCalibration};

use crate::board::Touch;
use crate::channels::Ui;

/// Touch sampling period
const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[embassy_executor::task]
pub async fn touch_task(ui: &'static Ui, mut touch: Touch, calibration: TouchCalibration) {
    info!("Touch task started");

    let mut detector = ClickDetector::new();
    let mut ticker = Ticker::every(POLL_INTERVAL);

    loop {
        ticker.next().await;

        let sample = match touch.read().await {
            Ok(sample) => sample,
            Err(e) => {
                warn!("Touch read error: {:?}", e);
                None
            }
        };
        let point = sample.and_then(|raw| calibration.map(raw));

        let clicked = {
            let tree = ui.display().lock().await;
            detector.feed(point, &tree)
        };

        let Some(widget) = clicked else {
            continue;
        };

        match ui.click(widget) {
            Some(Ok(event)) => debug!("Key event queued: {:?}", event),
            Some(Err(e)) => warn!(
                "Key event dropped: {:?} ({} dropped so far)",
                e,
                ui.dispatcher().dropped()
            ),
            None => {}
        }
    }
}
