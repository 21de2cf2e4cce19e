mod app;
mod color;
mod state;
mod ui;

use std::path::PathBuf;

use app::BookingFreqApp;
use booking_freq::Config;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = Config::load().unwrap_or_else(|e| {
        log::warn!("Ignoring config at {}: {e}", Config::config_path().display());
        Config::default()
    });

    // Optional: a booking sheet to open straight away.
    let initial_file = std::env::args_os().nth(1).map(PathBuf::from);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.display.window_width, config.display.window_height])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Booking Frequency Analysis",
        options,
        Box::new(move |_cc| {
            let mut app = BookingFreqApp::new(config);
            if let Some(path) = initial_file {
                app.state.load_path(&path);
            }
            Ok(Box::new(app))
        }),
    )
}
