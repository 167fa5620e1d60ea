//! Alive Camera CLI
//!
//! Command-line interface for testing and demonstrating the capture
//! core against the mock driver.

use alive_camera::{
    AuthorizationStatus, BurstScheduler, CameraConfig, CameraError, CaptureMode, CaptureSession,
    DeviceConfigurator, FlashCoordinator, MockDriver, MockScreen, FRAMES_PER_BURST,
};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Single still photo.
    Still,
    /// Five-frame Alive burst.
    Alive,
}

#[derive(Parser)]
#[command(version, about = "Capture a still or Alive burst with the mock camera")]
struct Args {
    /// Capture mode
    #[arg(long, value_enum, default_value = "alive")]
    mode: Mode,

    /// Request flash for the capture
    #[arg(long)]
    flash: bool,

    /// Switch to the front camera before capturing
    #[arg(long)]
    front: bool,

    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    info!("Alive Camera v{}", alive_camera::VERSION);
    info!("This is a demonstration using the mock camera driver");

    let config = match &args.config {
        Some(path) => match CameraConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config: {}", e);
                std::process::exit(1);
            }
        },
        None => CameraConfig::default(),
    };

    // Start unauthorized to exercise the permission retry flow the real
    // screen goes through on first launch.
    let driver = MockDriver::new().with_authorization(AuthorizationStatus::NotDetermined);
    let probe = driver.probe();
    let mut session = CaptureSession::new(Box::new(driver));

    if let Err(e) = session.prepare().await {
        if e == CameraError::AuthorizationRequired {
            info!("camera permission not determined, requesting access");
            probe.grant_authorization();
            if let Err(e) = session.prepare().await {
                eprintln!("Failed to prepare camera: {}", e);
                std::process::exit(1);
            }
        } else {
            eprintln!("Failed to prepare camera: {}", e);
            std::process::exit(1);
        }
    }

    let mut configurator = DeviceConfigurator::new(config.tap, config.zoom);
    let mut flash = FlashCoordinator::new(Box::new(MockScreen::new(0.5)));

    if args.front {
        match session.switch_input() {
            Ok(position) => info!(%position, "switched camera"),
            Err(e) => warn!(error = %e, "camera switch failed"),
        }
    }

    let mode = match args.mode {
        Mode::Still => CaptureMode::Still,
        Mode::Alive => CaptureMode::Alive,
    };
    flash.sync_capture_mode(&mut session, mode, args.flash);

    match mode {
        CaptureMode::Still => {
            let flash_mode = session.flash_mode();
            match session.capture_one_photo(flash_mode).await {
                Ok(frame) => {
                    println!(
                        "Captured still: {}x{} px, orientation {:?}",
                        frame.data().width,
                        frame.data().height,
                        frame.orientation()
                    );
                }
                Err(e) => {
                    eprintln!("Capture failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
        CaptureMode::Alive => {
            let mut scheduler = BurstScheduler::new(config.burst);
            let result = scheduler
                .run(&mut session, &mut configurator, &mut flash, args.flash, |n| {
                    info!("captured frame {}/{}", n, FRAMES_PER_BURST);
                })
                .await;
            match result {
                Ok(alive) => {
                    println!(
                        "Captured Alive sequence: {} frames in order {:?}",
                        alive.frames().len(),
                        alive
                            .frames()
                            .iter()
                            .map(|f| f.sequence())
                            .collect::<Vec<_>>()
                    );
                }
                Err(e) => {
                    eprintln!("Burst failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }

    session.stop();
    info!("Done.");
}
