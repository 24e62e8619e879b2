// Minimal prop loop: initialize the module, play a cue, and retrigger
// it every time the previous one finishes.
//
// Usage: cargo run --example scare_cue -- /dev/ttyUSB0

use std::time::Duration;

use anyhow::{bail, Context, Result};
use hauntlib::yx5300::models::dfplayer_mini;
use hauntlib::yx5300::Yx5300PlayerBuilder;
use hauntlib::PlayerEvent;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let port = std::env::args()
        .nth(1)
        .context("usage: scare_cue <serial-port>")?;

    let mut player = Yx5300PlayerBuilder::new(dfplayer_mini())
        .serial_port(&port)
        .build()
        .await?;
    let mut events = player.subscribe();

    player.reset().await?;
    while player.handshake_active() {
        player.poll().await?;
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    if player.selected_source().is_none() {
        bail!("module never became ready; check wiring and the SD card");
    }

    player.set_volume(20).await?;
    player.play_track(1, 1).await?;

    loop {
        player.poll().await?;
        while let Ok(event) = events.try_recv() {
            if let PlayerEvent::TrackFinished { file_index, .. } = event {
                tracing::info!(file_index, "cue finished, retriggering");
                player.play_track(1, 1).await?;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
