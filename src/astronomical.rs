//! Lunar phase arithmetic on the mean synodic month.
//!
//! Ages are measured in days from the reference new moon of 2000-01-06 and
//! folded into a single cycle. Two classifications are derived from an age:
//! the named phase (eight wedges centred on the principal phases) and the
//! marker index (eight equal buckets starting at the new moon). They use
//! different boundaries and are kept apart on purpose.

use std::f64::consts::PI;
use std::fmt;

use chrono::NaiveDate;

use crate::date_utils::{days_since_reference, REFERENCE_NEW_MOON_JD};

/// Mean synodic month in days
pub const SYNODIC_MONTH: f64 = 29.53058867;

// Upper bounds (exclusive) of the named phases, past the last one it is new moon again
const PHASE_NAME_BOUNDS: [(f64, MoonPhase); 8] = [
    (1.84566, MoonPhase::NewMoon),
    (5.53699, MoonPhase::WaxingCrescent),
    (9.22831, MoonPhase::FirstQuarter),
    (12.91963, MoonPhase::WaxingGibbous),
    (16.61096, MoonPhase::FullMoon),
    (20.30228, MoonPhase::WaningGibbous),
    (23.99361, MoonPhase::LastQuarter),
    (27.68493, MoonPhase::WaningCrescent),
];

// Upper bounds (exclusive) of the phase marker buckets
const MARKER_BOUNDS: [f64; 8] = [3.69, 7.38, 11.07, 14.76, 18.45, 22.14, 25.83, 29.53];

// ---------- DEFINE `MoonPhase` ENUM ----------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoonPhase {
    NewMoon,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    FullMoon,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

impl MoonPhase {
    /// All phases in cycle order, matching the marker row
    pub const ALL: [MoonPhase; 8] = [
        MoonPhase::NewMoon,
        MoonPhase::WaxingCrescent,
        MoonPhase::FirstQuarter,
        MoonPhase::WaxingGibbous,
        MoonPhase::FullMoon,
        MoonPhase::WaningGibbous,
        MoonPhase::LastQuarter,
        MoonPhase::WaningCrescent,
    ];

    /// Classify a phase age into its named phase
    pub fn from_age(age: f64) -> Self {
        PHASE_NAME_BOUNDS
            .iter()
            .find(|(bound, _)| age < *bound)
            .map(|(_, phase)| *phase)
            .unwrap_or(MoonPhase::NewMoon)
    }

    pub fn name(&self) -> &'static str {
        match self {
            MoonPhase::NewMoon => "New Moon",
            MoonPhase::WaxingCrescent => "Waxing Crescent",
            MoonPhase::FirstQuarter => "First Quarter",
            MoonPhase::WaxingGibbous => "Waxing Gibbous",
            MoonPhase::FullMoon => "Full Moon",
            MoonPhase::WaningGibbous => "Waning Gibbous",
            MoonPhase::LastQuarter => "Last Quarter",
            MoonPhase::WaningCrescent => "Waning Crescent",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            MoonPhase::NewMoon => "🌑",
            MoonPhase::WaxingCrescent => "🌒",
            MoonPhase::FirstQuarter => "🌓",
            MoonPhase::WaxingGibbous => "🌔",
            MoonPhase::FullMoon => "🌕",
            MoonPhase::WaningGibbous => "🌖",
            MoonPhase::LastQuarter => "🌗",
            MoonPhase::WaningCrescent => "🌘",
        }
    }
}

impl fmt::Display for MoonPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.emoji(), self.name())
    }
}

/// Marker bucket (0-7) for a phase age, evenly spaced at a synodic eighth
pub fn marker_index(age: f64) -> u8 {
    MARKER_BOUNDS
        .iter()
        .position(|bound| age < *bound)
        .map(|index| index as u8)
        .unwrap_or(0)
}

/// Fraction of the disk lit at a given phase age
pub fn illumination(age: f64) -> f64 {
    (1.0 - (age / SYNODIC_MONTH * 2.0 * PI).cos()) / 2.0
}

// ---------- DEFINE `PhaseDescriptor` STRUCT ----------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseDescriptor {
    pub age: f64,
    pub illumination: f64,
    pub phase: MoonPhase,
    pub phase_index: u8,
}

impl PhaseDescriptor {
    /// Build a descriptor from a phase age, folding it into one cycle first
    pub fn from_age(age: f64) -> Self {
        let age = fold_age(age);
        Self {
            age,
            illumination: illumination(age),
            phase: MoonPhase::from_age(age),
            phase_index: marker_index(age),
        }
    }

    /// Whole days into the current cycle
    pub fn cycle_day(&self) -> u32 {
        self.age.floor() as u32
    }

    pub fn illumination_percent(&self) -> f64 {
        self.illumination * 100.0
    }
}

fn fold_age(age: f64) -> f64 {
    let folded = age.rem_euclid(SYNODIC_MONTH);
    // rem_euclid can round up to the modulus itself for tiny negative inputs
    if folded >= SYNODIC_MONTH {
        0.0
    } else {
        folded
    }
}

/// Phase descriptor for a Julian Date
pub fn phase_from_julian(jd: f64) -> PhaseDescriptor {
    phase_from_elapsed(jd - REFERENCE_NEW_MOON_JD)
}

/// Compute the moon phase for a civil date
pub fn moon_phase(date: NaiveDate) -> PhaseDescriptor {
    phase_from_elapsed(days_since_reference(date))
}

fn phase_from_elapsed(elapsed_days: f64) -> PhaseDescriptor {
    let cycles = elapsed_days / SYNODIC_MONTH;
    let age = (cycles - cycles.floor()) * SYNODIC_MONTH;
    PhaseDescriptor::from_age(age)
}
