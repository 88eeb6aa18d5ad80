//! padconf - controller mapping companion for PCSX2
//!
//! Provisions the emulator install if needed, then runs an interactive pad
//! configuration session: a background listener correlates gamepad events
//! while the REPL drives arming, reset, auto-configure, and save.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use gilrs::Gilrs;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use padconf::cli;
use padconf::devices;
use padconf::listener::PadListener;
use padconf::mapping::MappingSet;
use padconf::paths::EmulatorPaths;
use padconf::provision;
use padconf::session::PadSession;

/// Controller mapping companion for PCSX2
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Emulator install root (defaults to the platform data directory)
    #[arg(short, long, env = "PADCONF_EMULATOR_ROOT")]
    emulator_root: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// List connected input devices and exit
    #[arg(long)]
    list_devices: bool,

    /// Skip emulator provisioning (download, seeding)
    #[arg(long)]
    no_provision: bool,
}

fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_logging(&args.log_level)?;

    if args.list_devices {
        return list_devices();
    }

    let paths = EmulatorPaths::detect(args.emulator_root.clone());
    info!("Emulator root: {}", paths.root.display());

    if args.no_provision {
        paths.ensure_directories()?;
    } else if let Err(e) = provision::prepare_emulator(&paths) {
        // Provisioning failure never blocks configuration
        warn!(
            "Emulator provisioning failed: {}. Continuing with configuration only.",
            e
        );
        paths.ensure_directories()?;
    }

    let mapping = MappingSet::load(&paths.pad_ini())?;
    let session = PadSession::new(mapping);
    let listener = PadListener::spawn(session.clone());

    cli::run_repl(&session, &paths)?;

    info!("Closing session...");
    listener.close();
    info!("Pad configuration session complete");
    Ok(())
}

/// One-shot device enumeration, no session.
fn list_devices() -> Result<()> {
    let gilrs = match Gilrs::new() {
        Ok(g) => g,
        Err(e) => {
            warn!("Failed to initialize gamepad backend: {:?}", e);
            return Ok(());
        },
    };

    let found = devices::scan(&gilrs);
    if found.is_empty() {
        println!("No joysticks detected.");
    } else {
        for device in found {
            println!("{}", device);
        }
    }
    Ok(())
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .init();

    Ok(())
}
