use egui::{Align2, Color32, FontId, Pos2, Rect, Response, Sense, Shape, Stroke, Ui};

use lunar_chart::chart::format_usd;
use lunar_chart::{EventKind, PriceChart};

const PRICE_LINE: Color32 = Color32::from_rgb(247, 147, 26);
const GRID: Color32 = Color32::from_rgb(42, 47, 74);
const AXIS_TEXT: Color32 = Color32::from_rgb(154, 160, 166);
const FULL_MARKER: Color32 = Color32::from_rgb(255, 215, 0);
const NEW_MARKER: Color32 = Color32::from_rgb(100, 100, 255);

const MARGIN_LEFT: f32 = 72.0;
const MARGIN_RIGHT: f32 = 16.0;
const MARGIN_TOP: f32 = 12.0;
const MARGIN_BOTTOM: f32 = 28.0;

const PRICE_TICKS: usize = 5;
const MAX_DATE_TICKS: usize = 20;

/// Draws the price line with moon event markers; drag pans, pinch zooms, double-click resets
pub fn render_price_chart(ui: &mut Ui, chart: &mut PriceChart) {
    let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
    let frame = response.rect;
    let plot = Rect::from_min_max(
        Pos2::new(frame.left() + MARGIN_LEFT, frame.top() + MARGIN_TOP),
        Pos2::new(frame.right() - MARGIN_RIGHT, frame.bottom() - MARGIN_BOTTOM),
    );
    if plot.width() <= 1.0 || plot.height() <= 1.0 {
        return;
    }

    handle_input(ui, &response, plot, chart);

    let (low, high) = chart.price_range();
    let to_screen = |index: f64, price: f64| {
        let x = plot.left() + chart.x_fraction(index) as f32 * plot.width();
        let y = plot.bottom() - ((price - low) / (high - low)) as f32 * plot.height();
        Pos2::new(x, y)
    };

    // Price grid
    for tick in 0..=PRICE_TICKS {
        let price = low + (high - low) * tick as f64 / PRICE_TICKS as f64;
        let y = to_screen(0.0, price).y;
        painter.line_segment(
            [Pos2::new(plot.left(), y), Pos2::new(plot.right(), y)],
            Stroke::new(1.0, GRID),
        );
        painter.text(
            Pos2::new(plot.left() - 6.0, y),
            Align2::RIGHT_CENTER,
            format_usd(price),
            FontId::proportional(11.0),
            AXIS_TEXT,
        );
    }

    // Date ticks
    let visible = chart.visible_indices();
    let step = (visible.clone().count() / MAX_DATE_TICKS).max(1);
    for index in visible.clone().step_by(step) {
        let x = to_screen(index as f64, low).x;
        if x < plot.left() || x > plot.right() {
            continue;
        }
        if let Some(label) = chart.label(index) {
            painter.text(
                Pos2::new(x, plot.bottom() + 4.0),
                Align2::CENTER_TOP,
                label,
                FontId::proportional(10.0),
                AXIS_TEXT,
            );
        }
    }

    let clipped = painter.with_clip_rect(plot.expand(10.0));
    let points = chart.points();
    let line: Vec<Pos2> = visible
        .clone()
        .map(|index| to_screen(index as f64, points[index].price))
        .collect();
    clipped.add(Shape::line(line, Stroke::new(2.0, PRICE_LINE)));

    for event in chart.events() {
        if !visible.contains(&event.sample_index) {
            continue;
        }
        let fill = match event.kind {
            EventKind::Full => FULL_MARKER,
            EventKind::New => NEW_MARKER,
        };
        let center = to_screen(event.sample_index as f64, event.payload);
        clipped.circle(center, 8.0, fill, Stroke::new(2.0, Color32::WHITE));
    }

    let hovered = response
        .hover_pos()
        .filter(|pointer| plot.contains(*pointer))
        .and_then(|pointer| chart.index_at(((pointer.x - plot.left()) / plot.width()) as f64));

    if let Some(index) = hovered {
        let center = to_screen(index as f64, points[index].price);
        painter.line_segment(
            [
                Pos2::new(center.x, plot.top()),
                Pos2::new(center.x, plot.bottom()),
            ],
            Stroke::new(1.0, AXIS_TEXT),
        );
        painter.circle(center, 6.0, PRICE_LINE, Stroke::new(2.0, Color32::WHITE));

        let lines = chart.tooltip_lines(index);
        response.on_hover_ui_at_pointer(|ui| {
            for line in lines {
                ui.label(line);
            }
        });
    }
}

fn handle_input(ui: &Ui, response: &Response, plot: Rect, chart: &mut PriceChart) {
    if response.double_clicked() {
        chart.reset_view();
        return;
    }

    if response.dragged() {
        let samples_per_pixel = chart.view().span() / plot.width() as f64;
        chart.pan(-(response.drag_delta().x as f64) * samples_per_pixel);
    }

    if response.hovered() {
        let zoom = ui.input(|input| input.zoom_delta()) as f64;
        if (zoom - 1.0).abs() > f64::EPSILON {
            let anchor = response
                .hover_pos()
                .map(|pointer| ((pointer.x - plot.left()) / plot.width()) as f64)
                .unwrap_or(0.5);
            chart.zoom(zoom, anchor);
        }
    }
}
