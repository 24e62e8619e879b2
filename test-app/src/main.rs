// hauntlib test application -- CLI tool for exercising the YX5300 driver
// against a real module on a serial port or a scripted mock transport.
//
// Usage:
//   hauntlib-test-app list
//   hauntlib-test-app --port /dev/ttyUSB0 init
//   hauntlib-test-app --mock init
//   hauntlib-test-app --port /dev/ttyUSB0 play --folder 1 --track 5
//   hauntlib-test-app --port /dev/ttyUSB0 volume 20
//   hauntlib-test-app --port /dev/ttyUSB0 query
//   hauntlib-test-app --port /dev/ttyUSB0 monitor --duration 30

use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tokio::time::Instant;

use hauntlib::yx5300::frame::Frame;
use hauntlib::yx5300::models::{self, PlayerModel};
use hauntlib::yx5300::{Yx5300Player, Yx5300PlayerBuilder};
use hauntlib::PlayerEvent;
use hauntlib_test_harness::MockTransport;

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// hauntlib test application -- exercises the audio module driver from
/// the command line.
#[derive(Parser)]
#[command(name = "hauntlib-test-app", version, about)]
struct Cli {
    /// Serial port path (e.g. /dev/ttyUSB0, COM3).
    #[arg(long)]
    port: Option<String>,

    /// Use a scripted mock transport instead of real hardware.
    #[arg(long)]
    mock: bool,

    /// Board model: dfplayer, catalex, flyron.
    #[arg(long, default_value = "dfplayer")]
    model: String,

    /// Override the model's default baud rate.
    #[arg(long)]
    baud: Option<u32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the supported board models.
    List,
    /// Reset the module and run the initialization handshake.
    Init,
    /// Play a track by folder and track number.
    Play {
        #[arg(long, default_value_t = 1)]
        folder: u16,
        #[arg(long, default_value_t = 1)]
        track: u16,
    },
    /// Set the volume (0-30).
    Volume { level: i16 },
    /// Issue the status, volume, equalizer, and firmware queries and
    /// print whatever comes back.
    Query,
    /// Print every decoded event for a while.
    Monitor {
        /// How long to listen, in seconds.
        #[arg(long, default_value_t = 30)]
        duration: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hauntlib=info".into()),
        )
        .init();

    let cli = Cli::parse();

    if let Command::List = cli.command {
        for model in models::supported_players() {
            println!(
                "{:<28} chip {:<12} {} baud{}{}",
                model.name,
                model.chip,
                model.default_baud_rate,
                if model.has_usb_port { "  USB" } else { "" },
                if model.has_sd_slot { "  SD" } else { "" },
            );
        }
        return Ok(());
    }

    let mut player = build_player(&cli).await?;
    let mut events = player.subscribe();

    match cli.command {
        Command::List => unreachable!("handled above"),
        Command::Init => {
            player.reset().await?;
            pump(&mut player, &mut events, Duration::from_secs(15), |p| {
                !p.handshake_active()
            })
            .await?;
            match player.selected_source() {
                Some(source) => println!(
                    "ready: {} selected, {} files, {} folders",
                    source,
                    player.file_count(),
                    player.folder_count()
                ),
                None => bail!("handshake failed; check wiring and storage"),
            }
        }
        Command::Play { folder, track } => {
            player.play_track(folder, track).await?;
            pump(&mut player, &mut events, Duration::from_secs(1), |_| false).await?;
        }
        Command::Volume { level } => {
            player.set_volume(level).await?;
            pump(&mut player, &mut events, Duration::from_secs(1), |_| false).await?;
        }
        Command::Query => {
            player.query_status().await?;
            pump(&mut player, &mut events, Duration::from_millis(400), |_| false).await?;
            player.query_volume().await?;
            pump(&mut player, &mut events, Duration::from_millis(400), |_| false).await?;
            player.query_eq().await?;
            pump(&mut player, &mut events, Duration::from_millis(400), |_| false).await?;
            player.query_firmware_version().await?;
            pump(&mut player, &mut events, Duration::from_millis(400), |_| false).await?;
        }
        Command::Monitor { duration } => {
            println!("listening for {duration}s...");
            pump(
                &mut player,
                &mut events,
                Duration::from_secs(duration),
                |_| false,
            )
            .await?;
        }
    }

    player.close().await?;
    Ok(())
}

/// Poll the player until `done` reports true or the deadline passes,
/// printing every decoded event along the way.
async fn pump(
    player: &mut Yx5300Player,
    events: &mut tokio::sync::broadcast::Receiver<PlayerEvent>,
    window: Duration,
    done: impl Fn(&Yx5300Player) -> bool,
) -> Result<()> {
    let deadline = Instant::now() + window;
    loop {
        player.poll().await?;
        while let Ok(event) = events.try_recv() {
            print_event(&event);
        }
        if done(player) || Instant::now() >= deadline {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

fn print_event(event: &PlayerEvent) {
    match event {
        // Raw wire traffic is only interesting at trace level.
        PlayerEvent::FrameSent { bytes } => tracing::trace!(?bytes, "sent"),
        PlayerEvent::FrameReceived { bytes } => tracing::trace!(?bytes, "received"),
        other => println!("event: {other:?}"),
    }
}

fn model_by_name(name: &str) -> Result<PlayerModel> {
    match name {
        "dfplayer" => Ok(models::dfplayer_mini()),
        "catalex" => Ok(models::catalex_yx5300()),
        "flyron" => Ok(models::flyron_fn_m16p()),
        other => bail!("unknown model '{other}' (expected dfplayer, catalex, or flyron)"),
    }
}

async fn build_player(cli: &Cli) -> Result<Yx5300Player> {
    let model = model_by_name(&cli.model)?;
    let mut builder = Yx5300PlayerBuilder::new(model);
    if let Some(baud) = cli.baud {
        builder = builder.baud_rate(baud);
    }

    if cli.mock {
        let player = builder
            .build_with_transport(Box::new(scripted_mock()))
            .await?;
        return Ok(player);
    }

    let Some(port) = &cli.port else {
        bail!("either --port or --mock is required");
    };
    Ok(builder.serial_port(port).build().await?)
}

/// A mock module with 57 files in 9 folders on its SD card, scripted
/// through the whole initialization handshake.
fn scripted_mock() -> MockTransport {
    let out = |msg_id, param, feedback| Frame::assemble(msg_id, param, feedback).bytes().to_vec();
    let back = |msg_id, param| Frame::assemble(msg_id, param, false).bytes().to_vec();

    let mock = MockTransport::new();
    // reset -> init complete (SD present)
    mock.expect(&out(0x0C, 0, false), &back(0x3F, 0x0002));
    // firmware version query -> 2.5
    mock.expect(&out(0x46, 0, false), &back(0x46, 0x0205));
    // USB file count -> 0, then SD file count -> 57
    mock.expect(&out(0x47, 0, false), &back(0x47, 0));
    mock.expect(&out(0x48, 0, false), &back(0x48, 57));
    // select SD -> ACK, folder count -> 9
    mock.expect(&out(0x09, 0x0002, true), &back(0x41, 0));
    mock.expect(&out(0x4F, 0, false), &back(0x4F, 9));
    mock
}
