use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use lazy_static::lazy_static;

/// Traditional name of the full moon in a given month
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialMoon {
    /// Zero-based civil month (0 = January)
    pub month0: u32,
    pub name: &'static str,
    pub emoji: &'static str,
}

lazy_static! {
    // Full moon names keyed by zero-based month
    static ref SPECIAL_MOONS: HashMap<u32, SpecialMoon> = {
        let table = [
            ("Wolf Moon", "🐺"),
            ("Snow Moon", "❄️"),
            ("Worm Moon", "🪱"),
            ("Pink Moon", "🌸"),
            ("Flower Moon", "🌺"),
            ("Strawberry Moon", "🍓"),
            ("Buck Moon", "🦌"),
            ("Sturgeon Moon", "🐟"),
            ("Corn Moon", "🌽"),
            ("Hunter's Moon", "🏹"),
            ("Beaver Moon", "🦫"),
            ("Cold Moon", "🥶"),
        ];
        table
            .into_iter()
            .enumerate()
            .map(|(month0, (name, emoji))| {
                let month0 = month0 as u32;
                (month0, SpecialMoon { month0, name, emoji })
            })
            .collect()
    };
}

/// Special full moon for a zero-based month, None outside 0-11
pub fn special_moon(month0: u32) -> Option<&'static SpecialMoon> {
    SPECIAL_MOONS.get(&month0)
}

/// Special full moon for the civil month of `date`
pub fn special_moon_for(date: NaiveDate) -> Option<&'static SpecialMoon> {
    special_moon(date.month0())
}
