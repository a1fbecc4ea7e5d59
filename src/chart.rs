//! Chart model for the annotated price view.
//!
//! A `PriceChart` owns one price series together with its per-sample moon
//! phases, the extracted events and the current pan/zoom window. The front
//! end holds at most one chart; rebuilding hands the previous chart back to
//! `PriceChart::rebuild`, which releases it before the new one is built.

use std::ops::RangeInclusive;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::astronomical::{moon_phase, PhaseDescriptor};
use crate::events::{EventExtractor, MoonEvent};
use crate::prices::{to_samples, PricePoint};

/// Fewest samples a zoomed view may span
pub const MIN_VISIBLE_SPAN: f64 = 5.0;

/// Visible slice of the series, in fractional sample indices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewWindow {
    pub start: f64,
    pub end: f64,
}

impl ViewWindow {
    pub fn span(&self) -> f64 {
        self.end - self.start
    }
}

// ---------- DEFINE `PriceChart` STRUCT ----------

#[derive(Debug, Clone)]
pub struct PriceChart {
    points: Vec<PricePoint>,
    phases: Vec<PhaseDescriptor>,
    events: Vec<MoonEvent<f64>>,
    view: ViewWindow,
}

impl PriceChart {
    /// Build a chart for an ascending price history, None when there is nothing to draw
    pub fn build(points: Vec<PricePoint>, extractor: &EventExtractor) -> Option<Self> {
        if points.is_empty() {
            info!(target: "chart", "No price history, skipping chart");
            return None;
        }

        let start = Instant::now();
        let phases: Vec<PhaseDescriptor> = points
            .par_iter()
            .map(|point| moon_phase(point.date))
            .collect();
        let events = extractor.extract_events(&to_samples(&points));

        let view = full_view(points.len());
        info!(
            target: "chart",
            "Built chart with {} points and {} moon events in {}µs",
            points.len(),
            events.len(),
            start.elapsed().as_micros()
        );

        Some(Self {
            points,
            phases,
            events,
            view,
        })
    }

    /// Release the previous chart, then build a new one
    pub fn rebuild(
        previous: Option<PriceChart>,
        points: Vec<PricePoint>,
        extractor: &EventExtractor,
    ) -> Option<Self> {
        if let Some(old) = previous {
            debug!(target: "chart", "Releasing chart with {} points", old.len());
            drop(old);
        }
        Self::build(points, extractor)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn phases(&self) -> &[PhaseDescriptor] {
        &self.phases
    }

    pub fn events(&self) -> &[MoonEvent<f64>] {
        &self.events
    }

    pub fn view(&self) -> ViewWindow {
        self.view
    }

    pub fn event_at(&self, index: usize) -> Option<&MoonEvent<f64>> {
        self.events.iter().find(|event| event.sample_index == index)
    }

    /// Axis label for a sample, e.g. "Mar 7"
    pub fn label(&self, index: usize) -> Option<String> {
        self.points
            .get(index)
            .map(|point| point.date.format("%b %-d").to_string())
    }

    /// Tooltip text for a hovered sample
    pub fn tooltip_lines(&self, index: usize) -> Vec<String> {
        let (Some(point), Some(phase)) = (self.points.get(index), self.phases.get(index)) else {
            return Vec::new();
        };

        let mut lines = vec![
            point.date.format("%b %-d, %Y").to_string(),
            format!("Price: {}", format_usd(point.price)),
            format!("Moon: {} {}", phase.phase.emoji(), phase.phase.name()),
        ];
        if let Some(event) = self.event_at(index) {
            lines.push(event.kind.banner().to_string());
        }
        lines
    }

    /// Sample indices touched by the current view
    pub fn visible_indices(&self) -> RangeInclusive<usize> {
        let last = self.len().saturating_sub(1);
        let first = (self.view.start.floor().max(0.0) as usize).min(last);
        let end = (self.view.end.ceil().max(0.0) as usize).min(last);
        first..=end
    }

    /// Lowest and highest price within the view, padded when flat
    pub fn price_range(&self) -> (f64, f64) {
        let (min, max) = self.points[self.visible_indices()]
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), point| {
                (min.min(point.price), max.max(point.price))
            });
        if max - min < f64::EPSILON {
            let pad = (min.abs() * 0.01).max(1.0);
            (min - pad, max + pad)
        } else {
            (min, max)
        }
    }

    /// Horizontal position of a sample as a fraction of the view width
    pub fn x_fraction(&self, index: f64) -> f64 {
        let span = self.view.span();
        if span <= 0.0 {
            return 0.5;
        }
        (index - self.view.start) / span
    }

    /// Nearest sample to a fractional position across the view
    pub fn index_at(&self, fraction: f64) -> Option<usize> {
        if self.is_empty() || !(0.0..=1.0).contains(&fraction) {
            return None;
        }
        let index = (self.view.start + fraction * self.view.span()).round();
        Some((index.max(0.0) as usize).min(self.len() - 1))
    }

    /// Zoom by `factor` (>1 zooms in) keeping `anchor` (a fraction of the width) in place
    pub fn zoom(&mut self, factor: f64, anchor: f64) {
        if factor <= 0.0 || !factor.is_finite() {
            return;
        }
        let full = full_view(self.len()).span();
        let span = self.view.span();
        let min_span = MIN_VISIBLE_SPAN.min(full);
        let new_span = (span / factor).clamp(min_span, full);
        if (new_span - span).abs() < f64::EPSILON {
            return;
        }

        let anchor = anchor.clamp(0.0, 1.0);
        let pivot = self.view.start + anchor * span;
        let start = pivot - anchor * new_span;
        self.view = self.clamped(start, start + new_span);
    }

    /// Shift the view by `delta` samples
    pub fn pan(&mut self, delta: f64) {
        if !delta.is_finite() {
            return;
        }
        self.view = self.clamped(self.view.start + delta, self.view.end + delta);
    }

    pub fn reset_view(&mut self) {
        self.view = full_view(self.len());
    }

    pub fn is_zoomed(&self) -> bool {
        self.view != full_view(self.len())
    }

    // Keep the window inside the original data bounds without changing its span
    fn clamped(&self, start: f64, end: f64) -> ViewWindow {
        let max = full_view(self.len()).end;
        let span = end - start;
        let (start, end) = if start < 0.0 {
            (0.0, span)
        } else if end > max {
            (max - span, max)
        } else {
            (start, end)
        };
        ViewWindow {
            start: start.max(0.0),
            end: end.min(max),
        }
    }
}

fn full_view(len: usize) -> ViewWindow {
    ViewWindow {
        start: 0.0,
        end: len.saturating_sub(1) as f64,
    }
}

/// Whole-dollar price with thousands separators, e.g. "$42,150"
pub fn format_usd(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_utils::day_after;
    use crate::events::EventKind;
    use chrono::NaiveDate;

    fn series(start: NaiveDate, days: u32) -> Vec<PricePoint> {
        (0..days)
            .map(|i| PricePoint::new(day_after(start, i).unwrap(), 100.0 + i as f64))
            .collect()
    }

    fn chart(days: u32) -> PriceChart {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        PriceChart::build(series(start, days), &EventExtractor::default()).unwrap()
    }

    #[test]
    fn empty_history_builds_nothing() {
        assert!(PriceChart::build(Vec::new(), &EventExtractor::default()).is_none());
    }

    #[test]
    fn phases_line_up_with_points() {
        let chart = chart(90);
        assert_eq!(chart.phases().len(), chart.len());
        for (point, phase) in chart.points().iter().zip(chart.phases()) {
            assert_eq!(*phase, moon_phase(point.date));
        }
    }

    #[test]
    fn events_match_extractor() {
        let chart = chart(120);
        let expected = EventExtractor::default().extract_events(&to_samples(chart.points()));
        assert_eq!(chart.events(), expected.as_slice());
        assert!(chart.events().iter().any(|e| e.kind == EventKind::Full));
        assert!(chart.events().iter().any(|e| e.kind == EventKind::New));
    }

    #[test]
    fn tooltip_marks_event_samples() {
        let chart = chart(60);
        let event = chart.events()[0].clone();
        let lines = chart.tooltip_lines(event.sample_index);
        assert_eq!(lines.last().map(String::as_str), Some(event.kind.banner()));
        assert!(lines[1].starts_with("Price: $"));
        assert!(lines[2].starts_with("Moon: "));

        assert!(chart.tooltip_lines(10_000).is_empty());
    }

    #[test]
    fn rebuild_replaces_previous_chart() {
        let old = chart(30);
        let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let new = PriceChart::rebuild(Some(old), series(start, 45), &EventExtractor::default())
            .unwrap();
        assert_eq!(new.len(), 45);
        assert_eq!(new.points()[0].date, start);

        let gone = PriceChart::rebuild(Some(new), Vec::new(), &EventExtractor::default());
        assert!(gone.is_none());
    }

    #[test]
    fn zoom_and_pan_stay_in_bounds() {
        let mut chart = chart(100);
        assert!(!chart.is_zoomed());

        chart.zoom(4.0, 0.5);
        assert!(chart.is_zoomed());
        let view = chart.view();
        assert!((view.span() - 99.0 / 4.0).abs() < 1e-9);
        assert!((view.start + view.span() / 2.0 - 49.5).abs() < 1e-9);

        chart.pan(-1_000.0);
        assert_eq!(chart.view().start, 0.0);
        assert!((chart.view().span() - 99.0 / 4.0).abs() < 1e-9);

        chart.pan(1_000.0);
        assert_eq!(chart.view().end, 99.0);

        chart.zoom(1_000.0, 0.0);
        assert!((chart.view().span() - MIN_VISIBLE_SPAN).abs() < 1e-9);

        chart.zoom(0.001, 0.5);
        assert_eq!(chart.view(), ViewWindow { start: 0.0, end: 99.0 });

        chart.zoom(2.0, 1.0);
        chart.reset_view();
        assert!(!chart.is_zoomed());
    }

    #[test]
    fn index_and_fraction_round_trip() {
        let chart = chart(11);
        assert_eq!(chart.index_at(0.0), Some(0));
        assert_eq!(chart.index_at(0.5), Some(5));
        assert_eq!(chart.index_at(1.0), Some(10));
        assert_eq!(chart.index_at(1.5), None);
        assert!((chart.x_fraction(5.0) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn price_range_follows_view() {
        let mut chart = chart(50);
        assert_eq!(chart.price_range(), (100.0, 149.0));
        chart.zoom(5.0, 0.0);
        let (low, high) = chart.price_range();
        assert_eq!(low, 100.0);
        assert!(high < 149.0);
    }

    #[test]
    fn single_point_chart_is_drawable() {
        let chart = chart(1);
        assert_eq!(chart.visible_indices(), 0..=0);
        let (low, high) = chart.price_range();
        assert!(low < 100.0 && high > 100.0);
        assert_eq!(chart.x_fraction(0.0), 0.5);
    }

    #[test]
    fn usd_formatting() {
        assert_eq!(format_usd(0.0), "$0");
        assert_eq!(format_usd(999.4), "$999");
        assert_eq!(format_usd(1_000.0), "$1,000");
        assert_eq!(format_usd(42_150.6), "$42,151");
        assert_eq!(format_usd(1_234_567.0), "$1,234,567");
        assert_eq!(format_usd(-5_000.0), "-$5,000");
    }

    #[test]
    fn axis_labels() {
        let chart = chart(3);
        assert_eq!(chart.label(0).as_deref(), Some("Jan 1"));
        assert_eq!(chart.label(5), None);
    }
}
