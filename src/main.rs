mod app;
mod ui;

use eframe::NativeOptions;
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use lunar_chart::Config;

use crate::app::LunarChartApp;

// ---------- CONFIGURE LOGGING ----------

fn init_tracing() {
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .compact()
        .init();
}

// ---------- MAIN FUNCTION ----------

fn main() -> Result<(), eframe::Error> {
    init_tracing();

    let config = Config::from_env();
    info!(
        target: "config",
        "Price history {} ({} days), refresh every {}s",
        config.price_file.display(),
        config.lookback_days,
        config.refresh_interval.as_secs()
    );

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size([640.0, 420.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Lunar Chart",
        options,
        Box::new(move |_cc| Box::new(LunarChartApp::new(config))),
    )
}
