use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

// Performance metrics tracking
#[derive(Debug, Default)]
pub struct Metrics {
    chart_builds: AtomicU64,
    chart_build_time: AtomicU64,
    moon_refreshes: AtomicU64,
    price_points: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_chart_build(&self, duration: Duration, points: usize) {
        self.chart_builds.fetch_add(1, Ordering::Relaxed);
        self.chart_build_time
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        self.price_points.store(points as u64, Ordering::Relaxed);
    }

    pub fn record_moon_refresh(&self) {
        self.moon_refreshes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn chart_builds(&self) -> u64 {
        self.chart_builds.load(Ordering::Relaxed)
    }

    pub fn moon_refreshes(&self) -> u64 {
        self.moon_refreshes.load(Ordering::Relaxed)
    }

    pub fn report(&self) -> String {
        format!(
            "Performance Metrics:\n\
             Chart Builds: {}\n\
             Chart Build Time: {}µs\n\
             Price Points: {}\n\
             Moon Refreshes: {}",
            self.chart_builds(),
            self.chart_build_time.load(Ordering::Relaxed),
            self.price_points.load(Ordering::Relaxed),
            self.moon_refreshes()
        )
    }
}
