use egui::{Color32, RichText, Ui};

use lunar_chart::{MoonEvent, MoonPhase, PhaseDescriptor};

const ACTIVE_MARKER: Color32 = Color32::from_rgb(255, 215, 0);
const IDLE_MARKER: Color32 = Color32::from_gray(110);

/// Renders today's phase, illumination and the eight-marker cycle row
pub fn render_moon_phase(ui: &mut Ui, phase: &PhaseDescriptor) {
    ui.heading("🌙 Moon Phase");
    ui.vertical_centered(|ui| {
        ui.label(RichText::new(phase.phase.emoji()).size(64.0));
        ui.label(RichText::new(phase.phase.name()).size(20.0).strong());
        ui.label(format!("{:.1}% illuminated", phase.illumination_percent()));
        ui.label(format!("Day {} of 29.5", phase.cycle_day()));
    });

    ui.add_space(8.0);
    ui.horizontal(|ui| {
        for (index, marker) in MoonPhase::ALL.iter().enumerate() {
            let active = index == usize::from(phase.phase_index);
            let color = if active { ACTIVE_MARKER } else { IDLE_MARKER };
            let mut text = RichText::new(marker.emoji()).size(18.0).color(color);
            if active {
                text = text.strong();
            }
            ui.label(text).on_hover_text(marker.name());
        }
    });
}

/// Renders the next full and new moon, with the month's named moon above a full moon
pub fn render_upcoming_events(ui: &mut Ui, events: &[MoonEvent<()>]) {
    ui.heading("Upcoming");
    if events.is_empty() {
        ui.label("No full or new moon in the lookahead window.");
        return;
    }

    for event in events {
        let when = event.date.format("%b %-d, %Y").to_string();
        if let Some(special) = event.special_moon {
            event_row(ui, special.emoji, special.name, &when);
        }
        event_row(ui, event.kind.icon(), event.kind.label(), &when);
    }
}

fn event_row(ui: &mut Ui, icon: &str, title: &str, when: &str) {
    ui.horizontal(|ui| {
        ui.label(RichText::new(icon).size(24.0));
        ui.vertical(|ui| {
            ui.label(RichText::new(title).strong());
            ui.label(RichText::new(when).weak());
        });
    });
}
