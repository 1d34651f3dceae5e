//#![cfg_attr(target_os = "windows", windows_subsystem = "windows")]
mod api;
mod app;
mod config;
mod constants;
mod data;
mod models;
mod services;
mod state;
mod utils;

use app::{OrbApp, OrbImages};
use config::AppConfig;
use constants::*;
use eframe::egui;
use state::OrbKind;

// App version and metadata
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
const APP_NAME: &str = "OrbOnTheGo";
const APP_TITLE: &str = "Image Sound Player";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger with default settings
    // Set RUST_LOG=debug for verbose output, RUST_LOG=info for normal logs
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .filter_module("wgpu_core", log::LevelFilter::Warn)
        .filter_module("wgpu_hal", log::LevelFilter::Warn)
        .filter_module("naga", log::LevelFilter::Warn)
        .init();

    log::info!("[Main] Starting {} v{}", APP_NAME, APP_VERSION);

    let config = AppConfig::from_env();
    log::info!(
        "[Main] Counter endpoint: {} | resources: {}",
        config.counter_url,
        config.resource_dir.display()
    );

    // Fetch missing resources; failures are logged and startup continues
    if config.skip_bootstrap {
        log::info!("[Main] Resource bootstrap disabled");
    } else {
        let specs = models::default_resources(&config.resource_base_url);
        match data::ensure_resources(&config.resource_dir, &specs) {
            Ok(report) => log::info!(
                "[Main] Resources: {} downloaded, {} present, {} failed ({} request(s)), sounds extracted: {}",
                report.downloaded.len(),
                report.skipped.len(),
                report.failed.len(),
                report.requests,
                report.extracted
            ),
            Err(e) => log::error!("[Main] Resource bootstrap failed: {}", e),
        }
    }

    // Orb images are required - a missing file ends startup here
    let load_orb = |kind: OrbKind| {
        utils::artwork::load_orb_image(&config.resource_dir.join(kind.image_file()), ORB_SIZE_PX)
    };
    let images = OrbImages {
        blue: load_orb(OrbKind::Blue)?,
        red: load_orb(OrbKind::Red)?,
    };
    let icon_data = utils::artwork::load_icon(&config.resource_dir.join(FAVICON_FILE));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(APP_TITLE)
            .with_inner_size([APP_WIDTH, APP_HEIGHT])
            .with_resizable(true)
            .with_decorations(true) // OS window decorations enabled
            .with_icon(icon_data),
        renderer: eframe::Renderer::Glow, // Two textures and a label; no GPU pipeline needed
        ..Default::default()
    };

    eframe::run_native(
        APP_NAME,
        options,
        Box::new(move |cc| Ok(Box::new(OrbApp::new(cc, &config, images)))),
    )?;

    log::info!("[Main] Window closed, exiting");
    Ok(())
}
