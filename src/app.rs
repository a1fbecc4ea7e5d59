use std::time::Instant;

use chrono::{Local, NaiveDate};
use eframe::{App, Frame};
use egui::Context;
use tracing::info;

use lunar_chart::metrics::Metrics;
use lunar_chart::{
    moon_phase, Config, CsvPriceSource, EventExtractor, MoonEvent, PhaseDescriptor, PriceChart,
    PriceSource,
};

use crate::ui::{chart_view, moon_panel};

// ---------- DEFINE `LunarChartApp` STRUCT ----------

pub struct LunarChartApp {
    config: Config,
    source: CsvPriceSource,
    extractor: EventExtractor,
    today: NaiveDate,
    phase: PhaseDescriptor,
    upcoming: Vec<MoonEvent<()>>,
    // At most one live chart, replaced wholesale on rebuild
    chart: Option<PriceChart>,
    last_refresh: Instant,
    metrics: Metrics,
}

impl LunarChartApp {
    pub fn new(config: Config) -> Self {
        let today = Local::now().date_naive();
        let extractor = EventExtractor::new(config.forecast_horizon_days);

        let mut app = Self {
            source: CsvPriceSource::new(config.price_file.clone()),
            extractor,
            today,
            phase: moon_phase(today),
            upcoming: Vec::new(),
            chart: None,
            last_refresh: Instant::now(),
            metrics: Metrics::new(),
            config,
        };

        app.refresh_moon();
        app.rebuild_chart();
        app
    }

    // Recompute today's phase and the upcoming events
    fn refresh_moon(&mut self) {
        self.today = Local::now().date_naive();
        self.phase = moon_phase(self.today);
        self.upcoming = self.extractor.forecast_events(self.today);
        self.last_refresh = Instant::now();
        self.metrics.record_moon_refresh();

        info!(
            target: "moon_events",
            "{}: {} ({:.1}% lit), {} upcoming events",
            self.today,
            self.phase.phase,
            self.phase.illumination_percent(),
            self.upcoming.len()
        );
    }

    // Fetch the price history and swap in a freshly built chart
    fn rebuild_chart(&mut self) {
        let start = Instant::now();
        let points = self.source.fetch(self.today, self.config.lookback_days);
        let count = points.len();

        self.chart = PriceChart::rebuild(self.chart.take(), points, &self.extractor);

        self.metrics.record_chart_build(start.elapsed(), count);
        info!(target: "chart", "{}", self.metrics.report());
    }
}

// ---------- IMPLEMENT `App` FOR `LunarChartApp` ----------

impl App for LunarChartApp {
    fn update(&mut self, ctx: &Context, _frame: &mut Frame) {
        if self.last_refresh.elapsed() >= self.config.refresh_interval {
            self.refresh_moon();
        }

        egui::SidePanel::left("moon_panel")
            .resizable(false)
            .min_width(260.0)
            .show(ctx, |ui| {
                moon_panel::render_moon_phase(ui, &self.phase);
                ui.separator();
                moon_panel::render_upcoming_events(ui, &self.upcoming);
            });

        let mut reload = false;
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Price vs. Moon Phase");
                if ui.button("⟳ Reload").clicked() {
                    reload = true;
                }
            });
            ui.separator();

            match self.chart.as_mut() {
                Some(chart) => chart_view::render_price_chart(ui, chart),
                None => {
                    ui.label(format!(
                        "No price history in {} for the {} days up to {}",
                        self.source.path().display(),
                        self.config.lookback_days,
                        self.today
                    ));
                }
            }
        });

        if reload {
            self.rebuild_chart();
        }

        ctx.request_repaint_after(self.config.refresh_interval);
    }
}
