//! Audio control task
//!
//! Owns the MP3 module and the player state. Waits on key envelopes and
//! module status reports, applies the resulting commands and keeps the file
//! label in step with the track that is playing.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_time::Timer;
use tapdeck_core::player::{PlayerController, Reaction};
use tapdeck_core::traits::AudioPipeline;

use crate::board::Mp3;
use crate::channels::{Ui, KEY_CHANNEL, REDRAW};

/// Time the module needs after a reset to mount its card
const MODULE_BOOT_MS: u64 = 1500;

#[embassy_executor::task]
pub async fn audio_task(ui: &'static Ui, mut module: Mp3, mut player: PlayerController) {
    info!("Audio task started, {} tracks", player.playlist().len());

    if let Err(e) = module.reset().await {
        warn!("MP3 module reset failed: {:?}", e);
    }
    Timer::after_millis(MODULE_BOOT_MS).await;
    let reaction = player.start_up();
    apply(ui, &mut module, &player, reaction).await;

    loop {
        let reaction = match select(KEY_CHANNEL.receive(), module.next_status()).await {
            Either::First(event) => {
                debug!("Key event: {:?}", event);
                player.handle_key(event)
            }
            Either::Second(Ok(status)) => {
                debug!("Module status: {:?}", status);
                player.handle_status(status)
            }
            Either::Second(Err(e)) => {
                warn!("MP3 module read error: {:?}", e);
                continue;
            }
        };

        apply(ui, &mut module, &player, reaction).await;
    }
}

async fn apply(ui: &Ui, module: &mut Mp3, player: &PlayerController, reaction: Reaction) {
    for command in reaction.commands {
        if let Err(e) = module.apply(command).await {
            warn!("MP3 command {:?} failed: {:?}", command, e);
        }
    }

    if !reaction.label_changed {
        return;
    }

    if let Some(name) = player.now_playing() {
        info!("Now playing: {=str}", name);
        // A busy display is logged inside; the label just stays as it was
        if ui.set_file_label(name).await.is_ok() {
            REDRAW.signal(());
        }
    }
}
