//! Reel CLI
//!
//! Inspect recorded sessions and replay them headlessly:
//!
//! - `reel info <recording>` - event counts and duration
//! - `reel markers <recording>` - custom-event markers on the timeline
//! - `reel play <recording>` - play back at frame rate, printing the controls

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::ReelConfig;
use reel_controls::{compute_markers, format_time, Controller};
use reel_recorder::replay::{ReplayEngine, Replayer, ReplayerEvent};
use reel_recorder::{EventKind, Recording};
use std::path::{Path, PathBuf};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "reel")]
#[command(about = "Inspect and replay recorded sessions")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a recording
    Info {
        /// Recording file (JSON array of events)
        recording: PathBuf,
    },

    /// List the custom-event markers of a recording
    Markers {
        /// Recording file (JSON array of events)
        recording: PathBuf,

        /// Config file (defaults to ./reel.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Play a recording in the terminal
    Play {
        /// Recording file (JSON array of events)
        recording: PathBuf,

        /// Config file (defaults to ./reel.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Initial playback speed
        #[arg(short, long)]
        speed: Option<f64>,

        /// Fast-forward through inactive spans
        #[arg(long)]
        skip_inactive: Option<bool>,

        /// Start offset in milliseconds
        #[arg(long)]
        from: Option<u64>,

        /// Frames per second
        #[arg(long, default_value = "30")]
        fps: u32,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Info { recording } => cmd_info(&recording),
        Commands::Markers { recording, config } => cmd_markers(&recording, config.as_deref()),
        Commands::Play {
            recording,
            config,
            speed,
            skip_inactive,
            from,
            fps,
        } => {
            let mut config = ReelConfig::resolve(config.as_deref())?;
            config.override_with(speed, skip_inactive);
            cmd_play(&recording, config, from, fps).await
        }
    }
}

fn load_recording(path: &Path) -> Result<Recording> {
    Recording::load(path).with_context(|| format!("Failed to load {}", path.display()))
}

fn cmd_info(path: &Path) -> Result<()> {
    let recording = load_recording(path)?;
    let meta = recording.metadata();

    let mut snapshots = 0;
    let mut incremental = 0;
    let mut interactions = 0;
    for event in recording.events() {
        match event.kind {
            EventKind::FullSnapshot => snapshots += 1,
            EventKind::IncrementalSnapshot { .. } => incremental += 1,
            _ => {}
        }
        if event.is_user_interaction() {
            interactions += 1;
        }
    }

    println!("{}", path.display());
    println!("  events:        {}", recording.len());
    println!("  snapshots:     {snapshots}");
    println!("  incremental:   {incremental}");
    println!("  interactions:  {interactions}");
    println!("  custom:        {}", recording.custom_events().count());
    println!("  duration:      {}", format_time(meta.total_time));
    println!("  start:         {}", meta.start_time);
    println!("  end:           {}", meta.end_time);

    Ok(())
}

fn cmd_markers(path: &Path, config: Option<&Path>) -> Result<()> {
    let config = ReelConfig::resolve(config)?;
    let recording = load_recording(path)?;
    let markers = compute_markers(recording.events(), &config.controller.tags);

    if markers.is_empty() {
        println!("No custom events in {}", path.display());
        return Ok(());
    }

    println!("{:>8}  {:<24}  COLOR", "POSITION", "TAG");
    for marker in &markers {
        println!(
            "{:>8}  {:<24}  {}",
            marker.position, marker.name, marker.background
        );
    }

    Ok(())
}

async fn cmd_play(path: &Path, config: ReelConfig, from: Option<u64>, fps: u32) -> Result<()> {
    let recording = load_recording(path)?;
    let engine = Replayer::new(recording, config.replayer.clone())
        .with_context(|| format!("Cannot replay {}", path.display()))?
        .into_shared();
    let events = engine.lock().subscribe();

    let mut controller = Controller::mount(engine.clone(), config.controller.with_auto_play(false));
    controller.set_target_fps(fps);
    if let Some(from) = from {
        controller.goto(from);
    }
    controller.play();

    let mut interval = tokio::time::interval(controller.frame_interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    info!(
        recording = %path.display(),
        total = %format_time(controller.metadata().total_time),
        fps,
        "playing"
    );

    let mut last_second = None;
    loop {
        interval.tick().await;
        engine.lock().update();
        controller.tick();

        for event in events.try_iter() {
            report(&event);
        }

        let second = controller.current_time() / 1_000;
        if last_second != Some(second) {
            last_second = Some(second);
            println!("{}", controller.view());
        }

        if controller.is_finished() {
            break;
        }
    }

    println!("{}", controller.view());
    controller.destroy();
    Ok(())
}

fn report(event: &ReplayerEvent) {
    match event {
        ReplayerEvent::CustomEvent { tag, offset } => {
            info!(tag = %tag, at = %format_time(*offset), "custom event");
        }
        ReplayerEvent::SkipStart { speed } => info!(speed, "skipping inactivity"),
        ReplayerEvent::SkipEnd => info!("back to normal speed"),
        ReplayerEvent::Finish => info!("finished"),
        ReplayerEvent::StateChange(change) => debug!(?change, "state change"),
    }
}
