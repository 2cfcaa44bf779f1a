//! Hands-free mouse: head motion moves the pointer, facial gestures click.

use anyhow::Result;
use clap::Parser;
use head_mouse::{
    app::{AppConfig, HeadMouseApp},
    config::{Config, EXAMPLE_CONFIG},
};
use log::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Camera index to use (overrides the configuration file)
    #[arg(long)]
    cam: Option<i32>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<String>,

    /// Log pointer actions instead of performing them
    #[arg(long)]
    dry_run: bool,

    /// Enable debug output and the debug window
    #[arg(short, long)]
    debug: bool,

    /// Print an example configuration file and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    if args.print_config {
        print!("{EXAMPLE_CONFIG}");
        return Ok(());
    }

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!("Head Mouse");

    // Load configuration if provided
    let mut config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path);
        match Config::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("Failed to load config file: {}. Using defaults.", e);
                Config::default()
            }
        }
    } else {
        Config::default()
    };

    if let Some(cam) = args.cam {
        config.camera.index = cam;
    }
    if args.debug {
        config.controls.debug = true;
    }
    config.validate()?;

    let mut app = HeadMouseApp::new(AppConfig {
        config,
        dry_run: args.dry_run,
    })?;
    app.run()?;

    Ok(())
}
