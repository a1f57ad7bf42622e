// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Context, Result};
use clap::Parser;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

use tangible_dashboard::config::{
    apply_cli_overrides, apply_environment_overrides, load_config, validate_config, ConfigError,
    DashboardConfig,
};
use tangible_dashboard::io::{BusListener, LightController, TracingSink, ZmqBusSubscriber};
use tangible_dashboard::observability::{debug_flags_help, init_logging, parse_debug_flags, LogRetention};
use tangible_dashboard::router::{AnimationSink, Router};
use tangible_dashboard::VERSION;

/// Tangible Dashboard - tracks proxies on the board and animates their changes
#[derive(Parser, Debug)]
#[command(name = "tangible-dashboard", version, author, long_about = None, after_help = debug_flags_help())]
struct Args {
    /// Path to tangible_dashboard.toml (searched for when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Hub publisher endpoint, e.g. tcp://10.0.0.2:5556
    #[arg(long)]
    broker: Option<String>,

    /// Serial device of the light controller
    #[arg(long)]
    device: Option<PathBuf>,

    /// Serial line speed of the light controller
    #[arg(long)]
    baud: Option<u32>,

    #[arg(long)]
    log_level: Option<String>,

    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Log animations instead of writing them to the light controller
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Skip the boot animation
    #[arg(long, default_value_t = false)]
    no_boot: bool,

    /// Enable debug logging for a crate (repeatable, or `all`)
    #[arg(long = "debug", value_name = "CRATE")]
    debug: Vec<String>,
}

impl Args {
    fn overrides(&self) -> HashMap<String, String> {
        let mut overrides = HashMap::new();
        if let Some(broker) = &self.broker {
            overrides.insert("broker_address".to_string(), broker.clone());
        }
        if let Some(device) = &self.device {
            overrides.insert("device_path".to_string(), device.display().to_string());
        }
        if let Some(baud) = self.baud {
            overrides.insert("baud_rate".to_string(), baud.to_string());
        }
        if let Some(level) = &self.log_level {
            overrides.insert("log_level".to_string(), level.clone());
        }
        if let Some(dir) = &self.log_dir {
            overrides.insert("log_dir".to_string(), dir.display().to_string());
        }
        overrides
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_dashboard_config(&args)?;
    validate_config(&config)?;

    let debug_flags = parse_debug_flags(args.debug.iter().cloned());
    let logging = init_logging(
        &debug_flags,
        &config.system.log_level,
        Some(config.system.log_dir.clone()),
        LogRetention {
            days: config.system.log_retention_days,
            runs: config.system.log_retention_runs,
        },
    )?;
    info!(version = VERSION, log_dir = %logging.log_dir().display(), "Tangible Dashboard starting");

    let controller = if args.dry_run {
        info!("Dry run: animations are logged only");
        None
    } else {
        let controller = LightController::open(&config.light_controller).with_context(|| {
            format!(
                "Failed to open light controller at {}",
                config.light_controller.device_path.display()
            )
        })?;
        Some(Arc::new(controller))
    };
    let sink: Arc<dyn AnimationSink> = match &controller {
        Some(controller) => Arc::clone(controller) as Arc<dyn AnimationSink>,
        None => Arc::new(TracingSink),
    };

    let router = Router::from_config(&config, sink)?;
    if config.light_controller.play_boot_sequence && !args.no_boot {
        router.sink().play_boot_sequence();
    }

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        info!("Shutdown signal received...");
        r.store(false, Ordering::SeqCst);
    })?;

    let subscriber = ZmqBusSubscriber::new(&config.broker);
    let mut listener = BusListener::new(subscriber, router.into_shared(), config.broker.receive_timeout());

    info!(
        broker = %config.broker.address,
        proxies = ?config.proxies.ids,
        "Listening for hub messages (Press Ctrl+C to stop)"
    );
    let result = listener.run(&running);

    if let Some(controller) = controller {
        controller.stop();
    }
    result?;

    info!("Shutdown complete");
    Ok(())
}

/// Load the config file, falling back to defaults when none is found and no
/// path was given explicitly
fn load_dashboard_config(args: &Args) -> Result<DashboardConfig> {
    let overrides = args.overrides();
    match load_config(args.config.as_deref(), Some(&overrides)) {
        Ok(config) => Ok(config),
        Err(ConfigError::FileNotFound(reason)) if args.config.is_none() => {
            // Logging is not up yet
            eprintln!("{}\nUsing built-in defaults.", reason);
            let mut config = DashboardConfig::default();
            apply_environment_overrides(&mut config)?;
            apply_cli_overrides(&mut config, &overrides)?;
            Ok(config)
        }
        Err(e) => Err(e.into()),
    }
}
