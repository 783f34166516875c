// Timebox Notes
// Main entry point

use timebox_notes::services::backend::SqliteBackend;
use timebox_notes::services::config::AppConfig;
use timebox_notes::ui_egui::TimeboxApp;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting Timebox Notes");

    let config = AppConfig::load_or_default();
    if let Some(parent) = config.database_path.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(err) = std::fs::create_dir_all(parent) {
                log::error!("Failed to create data directory {}: {}", parent.display(), err);
                std::process::exit(1);
            }
        }
    }

    let database_path = config.database_path.to_string_lossy().to_string();
    let backend = match SqliteBackend::open(&database_path) {
        Ok(backend) => backend,
        Err(err) => {
            log::error!("Failed to open database {}: {:#}", database_path, err);
            std::process::exit(1);
        }
    };
    log::info!("Using database at {}", database_path);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Timebox Notes")
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Timebox Notes",
        options,
        Box::new(move |cc| Ok(Box::new(TimeboxApp::new(cc, config, backend)))),
    )
}
