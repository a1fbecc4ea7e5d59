use chrono::NaiveDate;

use lunar_chart::date_utils::{day_after, julian_date};
use lunar_chart::{moon_phase, phase_from_julian, MoonPhase, PhaseDescriptor, SYNODIC_MONTH};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// Distance between two ages on the cycle
fn cyclic_gap(a: f64, b: f64) -> f64 {
    let gap = (a - b).abs();
    gap.min(SYNODIC_MONTH - gap)
}

#[test]
fn age_repeats_every_synodic_month() {
    let mut date = ymd(1990, 1, 1);
    for _ in 0..500 {
        let jd = julian_date(date);
        let here = phase_from_julian(jd).age;
        let next = phase_from_julian(jd + SYNODIC_MONTH).age;
        assert!(
            cyclic_gap(here, next) < 1e-6,
            "{}: {} vs {}",
            date,
            here,
            next
        );
        date = day_after(date, 37).unwrap();
    }
}

#[test]
fn civil_and_julian_entry_points_agree() {
    let date = ymd(2031, 7, 19);
    assert_eq!(moon_phase(date), phase_from_julian(julian_date(date)));
}

#[test]
fn age_and_illumination_stay_in_range() {
    let mut date = ymd(1900, 1, 1);
    let end = ymd(2100, 12, 31);
    while date <= end {
        let phase = moon_phase(date);
        assert!(phase.age >= 0.0 && phase.age < SYNODIC_MONTH, "{}: age {}", date, phase.age);
        assert!(
            (0.0..=1.0).contains(&phase.illumination),
            "{}: illumination {}",
            date,
            phase.illumination
        );
        assert!(phase.phase_index <= 7);
        date = day_after(date, 3).unwrap();
    }
}

#[test]
fn far_dates_still_respect_invariants() {
    for date in [ymd(-4000, 3, 1), ymd(1, 1, 1), ymd(9999, 12, 31)] {
        let phase = moon_phase(date);
        assert!(phase.age >= 0.0 && phase.age < SYNODIC_MONTH);
        assert!((0.0..=1.0).contains(&phase.illumination));
    }
}

#[test]
fn illumination_depends_only_on_age() {
    let a = moon_phase(ymd(2024, 1, 25));
    let b = PhaseDescriptor::from_age(a.age);
    assert_eq!(a.illumination, b.illumination);
    assert_eq!(a.phase, b.phase);
    assert_eq!(a.phase_index, b.phase_index);
}

#[test]
fn illumination_extremes() {
    assert!(PhaseDescriptor::from_age(0.0).illumination < 1e-3);
    assert!((PhaseDescriptor::from_age(14.765).illumination - 1.0).abs() < 1e-3);
}

#[test]
fn reference_anchor_is_new_moon() {
    let age = moon_phase(ymd(2000, 1, 6)).age;
    assert!(age < 1e-6 || SYNODIC_MONTH - age < 1e-6, "age {}", age);
}

#[test]
fn known_lunations_of_2024() {
    let new = moon_phase(ymd(2024, 1, 11));
    assert_eq!(new.phase, MoonPhase::NewMoon);
    assert!(new.age < 1.0);

    let full = moon_phase(ymd(2024, 1, 25));
    assert_eq!(full.phase, MoonPhase::FullMoon);
    assert!(full.illumination > 0.99);

    let first_quarter = moon_phase(ymd(2024, 1, 18));
    assert_eq!(first_quarter.phase, MoonPhase::FirstQuarter);
    assert_eq!(first_quarter.phase_index, 2);
}

#[test]
fn consecutive_days_advance_one_day_of_age() {
    let mut date = ymd(2024, 1, 1);
    for _ in 0..120 {
        let next = day_after(date, 1).unwrap();
        let step = (moon_phase(next).age - moon_phase(date).age).rem_euclid(SYNODIC_MONTH);
        assert!((step - 1.0).abs() < 1e-6, "{} -> {}: {}", date, next, step);
        date = next;
    }
}
