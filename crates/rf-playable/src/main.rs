//! Headless playable runner
//!
//! Usage:
//!   playable                              - Ancient Treasures, normal timing
//!   playable --config creative.yaml       - Load a creative
//!   playable --profile studio --seed 7    - Fast, reproducible run

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};

use rf_playable::{CreativeConfig, GameState, PlayableSession, TimingConfig, TimingProfile};

#[derive(Parser)]
#[command(name = "playable", about = "Scripted slot playable runner")]
struct Cli {
    /// Creative config (.json, .yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured timing profile
    #[arg(short, long, value_enum)]
    profile: Option<Profile>,

    /// Seed for reel strip randomization
    #[arg(short, long)]
    seed: Option<u64>,

    /// Give up after this many spins without an end-card
    #[arg(long, default_value_t = 20)]
    max_spins: u64,

    /// Tap the end-card download button once it appears
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    download: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Profile {
    Normal,
    Turbo,
    Studio,
}

impl From<Profile> for TimingProfile {
    fn from(profile: Profile) -> Self {
        match profile {
            Profile::Normal => TimingProfile::Normal,
            Profile::Turbo => TimingProfile::Turbo,
            Profile::Studio => TimingProfile::Studio,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => CreativeConfig::load(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => CreativeConfig::ancient_treasures(),
    };
    if let Some(profile) = cli.profile {
        config = config.with_timing(TimingConfig::from_profile(profile.into()));
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to build runtime")?;

    runtime.block_on(run(cli, config))
}

async fn run(cli: Cli, config: CreativeConfig) -> Result<()> {
    log::info!("Starting '{}'...", config.name);

    let mut builder = PlayableSession::builder(config);
    if let Some(seed) = cli.seed {
        builder = builder.seed(seed);
    }
    let session = builder.start().context("Invalid creative config")?;
    let mut snapshots = session.subscribe();

    session.wait_for_state(GameState::Idle).await?;

    // Jackpot ticks also wake the stream; only act on game progress
    let mut last_seen = None;
    loop {
        let snapshot = snapshots.borrow_and_update().clone();
        let progress = (snapshot.state, snapshot.spin_index);
        if last_seen != Some(progress) {
            last_seen = Some(progress);
            if snapshot.state != GameState::Spinning {
                log::info!("{}", snapshot.status_line());
            }
            match snapshot.state {
                GameState::Idle if snapshot.spin_index >= cli.max_spins => {
                    session.shutdown().await?;
                    bail!("No end-card after {} spins", cli.max_spins);
                }
                GameState::Idle => session.request_spin()?,
                GameState::EndCard => break,
                _ => {}
            }
        }
        snapshots
            .changed()
            .await
            .context("Session closed unexpectedly")?;
    }

    if cli.download {
        session.tap_download()?;
    }

    let summary = session.shutdown().await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
