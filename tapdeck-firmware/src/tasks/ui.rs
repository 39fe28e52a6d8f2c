//! Panel render task
//!
//! Waits for a redraw request, snapshots the widget tree under the display
//! lock and draws the snapshot to the panel band by band.

use defmt::*;
use embedded_graphics::pixelcolor::Rgb666;
use embassy_rp::gpio::Output;
use tapdeck_display::BandRenderer;

use crate::board::Panel;
use crate::channels::{DisplayMutex, REDRAW};

#[embassy_executor::task]
pub async fn ui_task(
    display: &'static DisplayMutex,
    mut panel: Panel,
    _backlight: Output<'static>,
    renderer: BandRenderer,
    front: &'static mut [Rgb666],
    mut back: Option<&'static mut [Rgb666]>,
) {
    info!("UI task started");

    loop {
        REDRAW.wait().await;

        let tree = {
            let mut tree = display.lock().await;
            if !tree.is_dirty() {
                continue;
            }
            tree.mark_clean();
            tree.clone()
        };

        let start = embassy_time::Instant::now();
        match renderer
            .render(&tree, &mut panel, front, back.as_deref_mut())
            .await
        {
            Ok(()) => trace!("Frame drawn in {} ms", start.elapsed().as_millis()),
            Err(e) => {
                warn!("Panel write failed: {:?}", e);
                // Try again with the next redraw
                display.lock().await.mark_dirty();
            }
        }
    }
}
