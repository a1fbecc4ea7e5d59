//! Lunar phases, full/new moon events and the price chart they annotate.

pub mod astronomical;
pub mod chart;
pub mod config;
pub mod date_utils;
pub mod events;
pub mod metrics;
pub mod prices;
pub mod special_moons;

pub use astronomical::{moon_phase, phase_from_julian, MoonPhase, PhaseDescriptor, SYNODIC_MONTH};
pub use chart::PriceChart;
pub use config::Config;
pub use events::{EventExtractor, EventKind, EventWindows, MoonEvent, Sample};
pub use prices::{CsvPriceSource, PriceError, PricePoint, PriceSource};
pub use special_moons::SpecialMoon;
