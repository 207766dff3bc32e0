//! rps - play rock-paper-scissors against the live gesture pipeline
//!
//! This binary:
//! 1. Connects the configured camera source (synthetic `stub://` or a still directory)
//! 2. Opens the capture view and samples frames in real time
//! 3. Commits a move once the debouncer sees a stable gesture
//! 4. Reopens the capture view after each round until enough rounds are played
//! 5. Prints the round history (optionally as JSON)

use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rps_live::config::GameConfig;
use rps_live::ui::{round_summary, CaptureView, Ui};
use rps_live::{CameraSource, Clock, GameSession, SessionEvent, SystemClock};

/// Longest single sleep, so Ctrl-C is noticed promptly.
const MAX_IDLE: Duration = Duration::from_millis(50);

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Number of rounds to play (overrides config).
    #[arg(long)]
    rounds: Option<u32>,
    /// Camera source: `stub://<name>` or a local directory of stills.
    #[arg(long, env = "RPS_SOURCE_URL")]
    source: Option<String>,
    /// Seed for the computer's moves.
    #[arg(long)]
    seed: Option<u64>,
    /// Print the final history as JSON on stdout.
    #[arg(long)]
    json: bool,
    /// Write the final history as JSON to this path.
    #[arg(long)]
    history: Option<PathBuf>,
    /// Output style: plain, pretty or auto.
    #[arg(long)]
    ui: Option<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut cfg = GameConfig::load()?;
    if let Some(rounds) = args.rounds {
        cfg.rounds = rounds;
    }
    if let Some(url) = args.source {
        cfg.source.url = url;
    }
    if args.seed.is_some() {
        cfg.rng_seed = args.seed;
    }
    if args.history.is_some() {
        cfg.history_path = args.history;
    }
    cfg.validate().context("invalid command-line override")?;

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))
            .context("installing Ctrl-C handler")?;
    }

    let mut source = CameraSource::new(cfg.source.camera_config())?;
    source.connect()?;

    let clock = SystemClock;
    let mut session = GameSession::new(source, clock, cfg.rng_seed);
    let ui = Ui::from_args(args.ui.as_deref(), std::io::stderr().is_terminal());

    log::info!(
        "playing {} rounds against {}",
        cfg.rounds,
        cfg.source.url
    );

    let mut round = 1;
    session.open_capture()?;
    let mut view: Option<CaptureView> = Some(ui.capture_view(round));

    while running.load(Ordering::SeqCst) && session.scoreboard().rounds() < cfg.rounds {
        session.advance();

        for event in session.drain_events() {
            match event {
                SessionEvent::LiveDetection(detection) => {
                    if let Some(view) = &view {
                        view.show_detection(detection);
                    }
                }
                SessionEvent::RoundCommitted(outcome) => {
                    if let Some(view) = view.take() {
                        view.finish(&outcome);
                    }
                }
            }
        }

        if !session.is_capturing()
            && !session.is_processing()
            && session.scoreboard().rounds() < cfg.rounds
        {
            session.open_capture()?;
            round += 1;
            view = Some(ui.capture_view(round));
        }

        let idle = session
            .next_wakeup()
            .map(|due| Duration::from_millis(due.saturating_sub(clock.now_ms())))
            .unwrap_or(MAX_IDLE)
            .min(MAX_IDLE);
        std::thread::sleep(idle);
    }

    session.close_capture();
    if let Some(view) = view.take() {
        view.abandon();
    }
    if !running.load(Ordering::SeqCst) {
        log::warn!("interrupted; stopping early");
    }

    let stats = session.source().stats();
    let score = session.scoreboard();
    println!("rps summary:");
    println!("  rounds played: {}", score.rounds());
    println!(
        "  wins: {}  losses: {}  draws: {}",
        score.wins, score.losses, score.draws
    );
    println!("  frames captured: {} ({})", stats.frames_captured, stats.url);
    println!("recent rounds (newest first):");
    for outcome in session.history().iter() {
        println!("  #{} {}", outcome.id, round_summary(outcome));
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(session.history())?);
    }
    if let Some(path) = &cfg.history_path {
        let bytes = serde_json::to_vec_pretty(session.history())?;
        std::fs::write(path, bytes)
            .with_context(|| format!("writing history to {}", path.display()))?;
        log::info!("history written to {}", path.display());
    }

    Ok(())
}
