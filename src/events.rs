//! Full and new moon event detection over dated samples.
//!
//! Historical mode walks a caller-supplied series and collapses each run of
//! candidate samples into a single event. Forecast mode walks a synthetic
//! daily series from a start date and keeps only the first full and the
//! first new moon it meets.

use std::time::Instant;

use chrono::NaiveDate;
use tracing::debug;

use crate::astronomical::{moon_phase, PhaseDescriptor};
use crate::date_utils::day_after;
use crate::special_moons::{special_moon_for, SpecialMoon};

/// Days scanned by the forecaster when no horizon is configured
pub const DEFAULT_FORECAST_HORIZON: u32 = 60;

/// Fewest samples between two historical events of the same kind
pub const DEFAULT_DEDUP_DISTANCE: usize = 10;

// ---------- DEFINE `EventKind` ENUM ----------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Full,
    New,
}

impl EventKind {
    pub fn icon(&self) -> &'static str {
        match self {
            EventKind::Full => "🌕",
            EventKind::New => "🌑",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EventKind::Full => "Full Moon (Bull)",
            EventKind::New => "New Moon (Bear)",
        }
    }

    /// Line appended to a chart tooltip on an event sample
    pub fn banner(&self) -> &'static str {
        match self {
            EventKind::Full => "🌕 FULL MOON (Bull)",
            EventKind::New => "🌑 NEW MOON (Bear)",
        }
    }
}

// ---------- DEFINE `Sample` AND `MoonEvent` ----------

/// A dated payload, e.g. a closing price
#[derive(Debug, Clone, PartialEq)]
pub struct Sample<T> {
    pub date: NaiveDate,
    pub payload: T,
}

impl<T> Sample<T> {
    pub fn new(date: NaiveDate, payload: T) -> Self {
        Self { date, payload }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoonEvent<T> {
    pub kind: EventKind,
    /// Index of the originating sample (day offset in forecast mode)
    pub sample_index: usize,
    pub date: NaiveDate,
    pub payload: T,
    /// Named full moon of the event's month, full moons only
    pub special_moon: Option<&'static SpecialMoon>,
}

impl<T> MoonEvent<T> {
    fn new(kind: EventKind, sample_index: usize, date: NaiveDate, payload: T) -> Self {
        let special_moon = match kind {
            EventKind::Full => special_moon_for(date),
            EventKind::New => None,
        };
        Self {
            kind,
            sample_index,
            date,
            payload,
            special_moon,
        }
    }
}

// ---------- DEFINE `EventWindows` ----------

/// Age windows that make a sample a full or new moon candidate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventWindows {
    /// Inclusive age range of a full moon candidate
    pub full_min: f64,
    pub full_max: f64,
    /// New moon candidates sit at or below this age...
    pub new_max: f64,
    /// ...or at or above this one
    pub new_min: f64,
}

impl EventWindows {
    /// Wide windows for scanning a full price history
    pub const HISTORICAL: EventWindows = EventWindows {
        full_min: 13.5,
        full_max: 16.5,
        new_max: 1.5,
        new_min: 28.0,
    };

    /// Tight windows for the first-hit lookahead
    pub const FORECAST: EventWindows = EventWindows {
        full_min: 14.5,
        full_max: 15.5,
        new_max: 0.5,
        new_min: 29.0,
    };

    pub fn is_full(&self, age: f64) -> bool {
        age >= self.full_min && age <= self.full_max
    }

    pub fn is_new(&self, age: f64) -> bool {
        age <= self.new_max || age >= self.new_min
    }

    /// Candidate kinds for an age, full first
    fn candidates(&self, age: f64) -> impl Iterator<Item = EventKind> {
        let full = self.is_full(age).then_some(EventKind::Full);
        let new = self.is_new(age).then_some(EventKind::New);
        full.into_iter().chain(new)
    }
}

// Per-kind history of the historical scan
#[derive(Default)]
struct KindTrack {
    last_candidate: Option<usize>,
    last_emitted: Option<usize>,
}

#[derive(Default)]
struct DedupState {
    full: KindTrack,
    new: KindTrack,
}

impl DedupState {
    fn track(&mut self, kind: EventKind) -> &mut KindTrack {
        match kind {
            EventKind::Full => &mut self.full,
            EventKind::New => &mut self.new,
        }
    }

    /// Record a candidate at `index`; true when it becomes an event. A candidate
    /// directly after another of its kind continues that run, and one under
    /// `distance` samples after the last emitted event of its kind is dropped.
    fn admit(&mut self, kind: EventKind, index: usize, distance: usize) -> bool {
        let track = self.track(kind);
        let continues_run = index > 0 && track.last_candidate == Some(index - 1);
        let too_close = track
            .last_emitted
            .map_or(false, |last| index.abs_diff(last) < distance);

        track.last_candidate = Some(index);
        if continues_run || too_close {
            return false;
        }
        track.last_emitted = Some(index);
        true
    }
}

// ---------- DEFINE `EventExtractor` ----------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventExtractor {
    pub historical: EventWindows,
    pub forecast: EventWindows,
    /// Historical mode only; the forecast keeps the first hit of each kind
    pub dedup_distance: usize,
    pub horizon_days: u32,
}

impl Default for EventExtractor {
    fn default() -> Self {
        Self {
            historical: EventWindows::HISTORICAL,
            forecast: EventWindows::FORECAST,
            dedup_distance: DEFAULT_DEDUP_DISTANCE,
            horizon_days: DEFAULT_FORECAST_HORIZON,
        }
    }
}

impl EventExtractor {
    pub fn new(horizon_days: u32) -> Self {
        Self {
            horizon_days,
            ..Self::default()
        }
    }

    /// Detect every full and new moon in an ascending series of samples
    pub fn extract_events<T: Clone>(&self, samples: &[Sample<T>]) -> Vec<MoonEvent<T>> {
        self.extract_events_with(samples, moon_phase)
    }

    /// Historical scan with a caller-supplied phase function
    pub fn extract_events_with<T, F>(&self, samples: &[Sample<T>], phase_of: F) -> Vec<MoonEvent<T>>
    where
        T: Clone,
        F: Fn(NaiveDate) -> PhaseDescriptor,
    {
        let start = Instant::now();
        let windows = self.historical;
        let mut dedup = DedupState::default();
        let mut events = Vec::new();

        for (index, sample) in samples.iter().enumerate() {
            let phase = phase_of(sample.date);
            for kind in windows.candidates(phase.age) {
                if dedup.admit(kind, index, self.dedup_distance) {
                    events.push(MoonEvent::new(kind, index, sample.date, sample.payload.clone()));
                }
            }
        }

        debug!(
            target: "moon_events",
            "Extracted {} events from {} samples in {}µs",
            events.len(),
            samples.len(),
            start.elapsed().as_micros()
        );

        events
    }

    /// First upcoming full and new moon, scanning daily from `start`
    pub fn forecast_events(&self, start: NaiveDate) -> Vec<MoonEvent<()>> {
        self.forecast_events_with(start, moon_phase)
    }

    /// Forecast scan with a caller-supplied phase function
    pub fn forecast_events_with<F>(&self, start: NaiveDate, phase_of: F) -> Vec<MoonEvent<()>>
    where
        F: Fn(NaiveDate) -> PhaseDescriptor,
    {
        let windows = self.forecast;
        let mut events: Vec<MoonEvent<()>> = Vec::with_capacity(2);
        let mut scanned = 0;

        for offset in 0..self.horizon_days {
            let Some(date) = day_after(start, offset) else {
                break;
            };
            scanned += 1;

            let phase = phase_of(date);
            for kind in windows.candidates(phase.age) {
                if !events.iter().any(|event| event.kind == kind) {
                    events.push(MoonEvent::new(kind, offset as usize, date, ()));
                }
            }

            if events.len() >= 2 {
                break;
            }
        }

        // Discovery order is not date order once both windows are in play
        events.sort_by_key(|event| event.date);

        debug!(
            target: "moon_events",
            "Forecast from {} found {} events after {} days",
            start,
            events.len(),
            scanned
        );

        events
    }
}
